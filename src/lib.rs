//! Email-keyed user accounts: a record type, a manager that is the only way
//! to create records, and Postgres/in-memory storage behind a trait.

pub mod config;
pub mod db;
pub mod error;
pub mod users;

pub use error::{AccountError, AccountResult};
