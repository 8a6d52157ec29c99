use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use tracing::error;

use crate::error::{AccountError, AccountResult};

/// Stored passwords starting with this prefix can never be verified.
pub const UNUSABLE_PASSWORD_PREFIX: &str = "!";
const UNUSABLE_PASSWORD_SUFFIX_LEN: usize = 40;

/// Turns plaintext passwords into opaque stored strings and checks them back.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plain: &str) -> AccountResult<String>;
    fn verify(&self, plain: &str, hash: &str) -> AccountResult<bool>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> AccountResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                AccountError::Hashing(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    fn verify(&self, plain: &str, hash: &str) -> AccountResult<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            AccountError::Hashing(e.to_string())
        })?;
        Ok(Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }
}

pub fn make_unusable_password() -> String {
    let suffix: String = OsRng
        .sample_iter(&Alphanumeric)
        .take(UNUSABLE_PASSWORD_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{UNUSABLE_PASSWORD_PREFIX}{suffix}")
}

pub fn is_password_usable(stored: &str) -> bool {
    !stored.is_empty() && !stored.starts_with(UNUSABLE_PASSWORD_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> Box<dyn CredentialHasher> {
        Box::new(Argon2Hasher)
    }

    #[test]
    fn argon2_output_is_a_salted_phc_string() {
        let h = hasher();
        let first = h.hash("same input").unwrap();
        let second = h.hash("same input").unwrap();
        assert!(first.starts_with("$argon2id$"));
        assert!(is_password_usable(&first));
        assert_ne!(first, second);
        assert!(h.verify("same input", &first).unwrap());
        assert!(h.verify("same input", &second).unwrap());
        assert!(!h.verify("other input", &first).unwrap());
    }

    #[test]
    fn unusable_marker_is_rejected_as_a_hash() {
        let marker = make_unusable_password();
        let err = hasher().verify("anything", &marker).unwrap_err();
        assert!(matches!(err, AccountError::Hashing(_)));
    }

    #[test]
    fn unusable_passwords_are_marked_and_random() {
        let a = make_unusable_password();
        let b = make_unusable_password();
        assert_eq!(a.len(), 1 + UNUSABLE_PASSWORD_SUFFIX_LEN);
        assert!(!is_password_usable(&a));
        assert!(!is_password_usable(""));
        assert_ne!(a, b);
    }
}
