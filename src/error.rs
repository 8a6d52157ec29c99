use thiserror::Error;

/// Errors surfaced by user creation and lookup.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Input rejected before anything reached storage.
    #[error("validation error: {0}")]
    Validation(String),

    /// The normalized email is already taken.
    #[error("a user with email {email} already exists")]
    UniquenessViolation { email: String },

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl AccountError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_uniqueness_violation(&self) -> bool {
        matches!(self, Self::UniquenessViolation { .. })
    }
}

pub type AccountResult<T> = Result<T, AccountError>;
