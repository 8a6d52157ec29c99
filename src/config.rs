use anyhow::Context;
use serde::Deserialize;

use crate::users::email::EmailNormalization;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub email_normalization: EmailNormalization,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let max_connections = var("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);
        let email_normalization = match var("EMAIL_NORMALIZATION") {
            Some(v) => v
                .parse::<EmailNormalization>()
                .context("invalid EMAIL_NORMALIZATION")?,
            None => EmailNormalization::default(),
        };
        Ok(Self {
            database_url,
            max_connections,
            email_normalization,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_only_database_url_is_set() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/accounts")]).unwrap();
        assert_eq!(config.database_url, "postgres://localhost/accounts");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.email_normalization, EmailNormalization::Full);
    }

    #[test]
    fn reads_domain_normalization_and_pool_size() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/accounts"),
            ("DB_MAX_CONNECTIONS", "12"),
            ("EMAIL_NORMALIZATION", "domain"),
        ])
        .unwrap();
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.email_normalization, EmailNormalization::Domain);
    }

    #[test]
    fn invalid_normalization_is_an_error() {
        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/accounts"),
            ("EMAIL_NORMALIZATION", "upper"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("EMAIL_NORMALIZATION"));
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }
}
