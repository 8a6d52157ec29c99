use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AccountResult;
use crate::users::password::{is_password_usable, make_unusable_password, CredentialHasher};

/// Account record, identified by its normalized email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String, // hasher output or unusable marker, never plaintext
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: OffsetDateTime,
    pub last_login: Option<OffsetDateTime>,
}

impl User {
    /// Hashes `raw` into the record, or marks the password unusable when `None`.
    pub fn set_password(
        &mut self,
        hasher: &dyn CredentialHasher,
        raw: Option<&str>,
    ) -> AccountResult<()> {
        self.password = match raw {
            Some(plain) => hasher.hash(plain)?,
            None => make_unusable_password(),
        };
        Ok(())
    }

    pub fn set_unusable_password(&mut self) {
        self.password = make_unusable_password();
    }

    pub fn has_usable_password(&self) -> bool {
        is_password_usable(&self.password)
    }

    pub fn check_password(&self, hasher: &dyn CredentialHasher, raw: &str) -> AccountResult<bool> {
        if !self.has_usable_password() {
            return Ok(false);
        }
        hasher.verify(raw, &self.password)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn short_name(&self) -> &str {
        &self.first_name
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::password::Argon2Hasher;

    fn sample() -> User {
        User {
            id: Uuid::new_v4(),
            email: "jane@example.com".into(),
            password: String::new(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            date_joined: OffsetDateTime::now_utc(),
            last_login: None,
        }
    }

    #[test]
    fn display_is_the_email() {
        assert_eq!(sample().to_string(), "jane@example.com");
    }

    #[test]
    fn serialization_hides_password() {
        let mut user = sample();
        user.password = "secret-hash".into();
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("jane@example.com"));
        assert!(!json.contains("password"));
        assert!(!json.contains("secret-hash"));
    }

    #[test]
    fn set_and_check_password() {
        let hasher = Argon2Hasher;
        let mut user = sample();
        user.set_password(&hasher, Some("hunter22")).unwrap();
        assert!(user.has_usable_password());
        assert!(user.check_password(&hasher, "hunter22").unwrap());
        assert!(!user.check_password(&hasher, "hunter23").unwrap());
    }

    #[test]
    fn unusable_password_never_matches() {
        let hasher = Argon2Hasher;
        let mut user = sample();
        user.set_password(&hasher, Some("hunter22")).unwrap();
        user.set_unusable_password();
        assert!(!user.has_usable_password());
        assert!(!user.check_password(&hasher, "hunter22").unwrap());
    }

    #[test]
    fn names() {
        let mut user = sample();
        assert_eq!(user.full_name(), "Jane Doe");
        assert_eq!(user.short_name(), "Jane");
        user.last_name.clear();
        assert_eq!(user.full_name(), "Jane");
    }
}
