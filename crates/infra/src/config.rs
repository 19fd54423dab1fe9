//! Configuration for infrastructure adapters, loaded from environment
//! variables.
//!
//! Each loader takes a lookup function so tests can feed values without
//! touching the process environment; `from_env` wires in `std::env::var`.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn invalid(key: &'static str, value: impl Into<String>, reason: impl ToString) -> Self {
        Self::Invalid {
            key,
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

/// Read `key` through `lookup`, parsing it as `T`, or return `default` when the
/// variable is unset or blank.
pub fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match non_blank(lookup, key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(key, raw.clone(), e)),
    }
}

/// Read `key`, treating blank values as unset.
pub fn non_blank<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Postgres connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// `None` when `DATABASE_URL` is not set: the process then runs without a
    /// directory or persistent activity log.
    ///
    /// | Variable                   | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `DATABASE_URL`             | yes      | none    |
    /// | `DATABASE_MAX_CONNECTIONS` | no       | `5`     |
    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(url) = non_blank(&lookup, "DATABASE_URL") else {
            return Ok(None);
        };
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        if max_connections == 0 {
            return Err(ConfigError::invalid("DATABASE_MAX_CONNECTIONS", "0", "must be at least 1"));
        }
        Ok(Some(Self { url, max_connections }))
    }

    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }
}

const DEFAULT_MAIL_API_URL: &str = "https://api.resend.com/emails";
const DEFAULT_MAIL_FROM: &str = "UNIASIA <alerts@uniasia.local>";
const DEFAULT_MAIL_TIMEOUT_SECS: u64 = 10;

/// HTTP mail provider settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
    pub timeout: Duration,
}

impl MailConfig {
    /// `None` when `MAIL_API_KEY` is not set: mail delivery is disabled.
    ///
    /// | Variable            | Required | Default                          |
    /// |---------------------|----------|----------------------------------|
    /// | `MAIL_API_KEY`      | yes      | none                             |
    /// | `MAIL_API_URL`      | no       | `https://api.resend.com/emails`  |
    /// | `MAIL_FROM`         | no       | `UNIASIA <alerts@uniasia.local>` |
    /// | `MAIL_TIMEOUT_SECS` | no       | `10`                             |
    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(api_key) = non_blank(&lookup, "MAIL_API_KEY") else {
            return Ok(None);
        };
        let api_url = non_blank(&lookup, "MAIL_API_URL").unwrap_or_else(|| DEFAULT_MAIL_API_URL.to_string());
        if !(api_url.starts_with("https://") || api_url.starts_with("http://")) {
            return Err(ConfigError::invalid("MAIL_API_URL", api_url, "must be an http(s) URL"));
        }
        let from = non_blank(&lookup, "MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string());
        let timeout_secs = parse_or(&lookup, "MAIL_TIMEOUT_SECS", DEFAULT_MAIL_TIMEOUT_SECS)?;

        Ok(Some(Self {
            api_url,
            api_key,
            from,
            timeout: Duration::from_secs(timeout_secs),
        }))
    }

    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn database_is_optional() {
        assert_eq!(DatabaseConfig::from_lookup(lookup(&[])).unwrap(), None);
        assert_eq!(DatabaseConfig::from_lookup(lookup(&[("DATABASE_URL", "  ")])).unwrap(), None);
    }

    #[test]
    fn database_defaults_pool_size() {
        let cfg = DatabaseConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/uniasia")]))
            .unwrap()
            .unwrap();
        assert_eq!(cfg.max_connections, 5);
    }

    #[test]
    fn database_rejects_bad_pool_size() {
        let err = DatabaseConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/uniasia"),
            ("DATABASE_MAX_CONNECTIONS", "lots"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DATABASE_MAX_CONNECTIONS"));

        assert!(DatabaseConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/uniasia"),
            ("DATABASE_MAX_CONNECTIONS", "0"),
        ]))
        .is_err());
    }

    #[test]
    fn mail_requires_api_key() {
        assert_eq!(MailConfig::from_lookup(lookup(&[("MAIL_FROM", "x@y.com")])).unwrap(), None);
    }

    #[test]
    fn mail_fills_defaults() {
        let cfg = MailConfig::from_lookup(lookup(&[("MAIL_API_KEY", "re_123")])).unwrap().unwrap();
        assert_eq!(cfg.api_url, "https://api.resend.com/emails");
        assert_eq!(cfg.from, "UNIASIA <alerts@uniasia.local>");
        assert_eq!(cfg.timeout, Duration::from_secs(10));
    }

    #[test]
    fn mail_rejects_non_http_url() {
        let err = MailConfig::from_lookup(lookup(&[
            ("MAIL_API_KEY", "re_123"),
            ("MAIL_API_URL", "smtp://mail.local"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "MAIL_API_URL", .. }));
    }
}
