use std::{fmt, str::FromStr};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

/// How an email address is canonicalized before it is stored or looked up.
///
/// The stored form is what the uniqueness constraint compares, so the two
/// policies disagree on whether `Jane@example.com` and `jane@example.com`
/// are the same account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailNormalization {
    /// Lowercase the whole address.
    #[default]
    Full,
    /// Lowercase only the part after the last `@`.
    #[serde(alias = "domain_only")]
    Domain,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown email normalization: {0}")]
pub struct UnknownNormalization(pub String);

impl FromStr for EmailNormalization {
    type Err = UnknownNormalization;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "domain" | "domain_only" => Ok(Self::Domain),
            other => Err(UnknownNormalization(other.to_string())),
        }
    }
}

impl fmt::Display for EmailNormalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("full"),
            Self::Domain => f.write_str("domain"),
        }
    }
}

pub fn normalize_email(raw: &str, policy: EmailNormalization) -> String {
    let trimmed = raw.trim();
    match policy {
        EmailNormalization::Full => trimmed.to_lowercase(),
        EmailNormalization::Domain => match trimmed.rsplit_once('@') {
            Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
            None => trimmed.to_string(),
        },
    }
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}
