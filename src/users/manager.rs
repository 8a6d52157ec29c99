use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::{AccountError, AccountResult};
use crate::users::{
    dto::ExtraFields,
    email::{normalize_email, EmailNormalization},
    model::User,
    password::CredentialHasher,
    repo::UserRepository,
};

/// Builds, validates and persists [`User`] records.
///
/// Every user enters storage through `create_user` or `create_superuser`;
/// all validation runs before the single repository insert.
#[derive(Clone)]
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHasher>,
    normalization: EmailNormalization,
}

impl UserManager {
    pub fn new(repo: Arc<dyn UserRepository>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self {
            repo,
            hasher,
            normalization: EmailNormalization::default(),
        }
    }

    pub fn with_normalization(mut self, normalization: EmailNormalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn hasher(&self) -> &dyn CredentialHasher {
        self.hasher.as_ref()
    }

    pub fn normalize_email(&self, raw: &str) -> String {
        normalize_email(raw, self.normalization)
    }

    #[instrument(skip(self, password, extra))]
    pub async fn create_user(
        &self,
        email: &str,
        password: Option<&str>,
        extra: ExtraFields,
    ) -> AccountResult<User> {
        if email.trim().is_empty() {
            warn!("rejected user without email");
            return Err(AccountError::validation("the email field must be set"));
        }
        let email = self.normalize_email(email);

        let is_staff = extra.is_staff.unwrap_or(false);
        let is_superuser = extra.is_superuser.unwrap_or(false);
        if is_superuser && !is_staff {
            warn!(email = %email, "rejected superuser flag without staff flag");
            return Err(AccountError::validation(
                "a superuser must have is_staff=true",
            ));
        }

        let mut user = User {
            id: Uuid::new_v4(),
            email,
            password: String::new(),
            first_name: extra.first_name.unwrap_or_default(),
            last_name: extra.last_name.unwrap_or_default(),
            is_active: extra.is_active.unwrap_or(true),
            is_staff,
            is_superuser,
            date_joined: OffsetDateTime::now_utc(),
            last_login: None,
        };
        user.set_password(self.hasher.as_ref(), password)?;

        if let Err(e) = self.repo.insert(&user).await {
            warn!(email = %user.email, error = %e, "user insert failed");
            return Err(e);
        }
        info!(user_id = %user.id, email = %user.email, "user created");
        Ok(user)
    }

    #[instrument(skip(self, password, extra))]
    pub async fn create_superuser(
        &self,
        email: &str,
        password: Option<&str>,
        mut extra: ExtraFields,
    ) -> AccountResult<User> {
        if !*extra.is_staff.get_or_insert(true) {
            return Err(AccountError::validation("superuser must have is_staff=true"));
        }
        if !*extra.is_superuser.get_or_insert(true) {
            return Err(AccountError::validation(
                "superuser must have is_superuser=true",
            ));
        }
        self.create_user(email, password, extra).await
    }

    pub async fn get_by_natural_key(&self, email: &str) -> AccountResult<Option<User>> {
        self.repo.find_by_email(&self.normalize_email(email)).await
    }

    /// Returns the user only when it is active and `password` verifies.
    /// A successful login stamps `last_login`.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> AccountResult<Option<User>> {
        let Some(mut user) = self.get_by_natural_key(email).await? else {
            // Spend the same hashing time as a mismatch would.
            let _ = self.hasher.hash(password);
            debug!("no such user");
            return Ok(None);
        };
        if !user.check_password(self.hasher.as_ref(), password)? {
            debug!(user_id = %user.id, "password mismatch");
            return Ok(None);
        }
        if !user.is_active {
            debug!(user_id = %user.id, "inactive user");
            return Ok(None);
        }
        let now = OffsetDateTime::now_utc();
        self.repo.touch_last_login(user.id, now).await?;
        user.last_login = Some(now);
        Ok(Some(user))
    }
}
