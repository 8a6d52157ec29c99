pub mod dto;
pub mod email;
pub mod manager;
pub mod model;
pub mod password;
pub mod repo;

pub use dto::ExtraFields;
pub use email::{is_valid_email, normalize_email, EmailNormalization};
pub use manager::UserManager;
pub use model::User;
pub use password::{Argon2Hasher, CredentialHasher};
pub use repo::{InMemoryUserRepository, PgUserRepository, UserRepository};
