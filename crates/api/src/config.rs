use uniasia_core::EmailAddress;
use uniasia_infra::config::{non_blank, parse_or};
use uniasia_infra::directory::postgres::DEFAULT_ADMIN_ROLE;
use uniasia_infra::{ConfigError, DatabaseConfig, MailConfig};
use uniasia_inventory::{ExpiryWindow, Threshold};

const DEV_WEBHOOK_SECRET: &str = "dev-webhook-secret";

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development; in production the
/// webhook secret, database and mail provider are expected to be set.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Shared secret inbound callers must present.
    pub webhook_secret: String,
    pub threshold: Threshold,
    pub expiry_window: ExpiryWindow,
    /// Recipients used when the admin directory is empty.
    pub fallback_recipients: Vec<EmailAddress>,
    /// Role name that marks administrator profiles.
    pub admin_role: String,
    pub database: Option<DatabaseConfig>,
    pub mail: Option<MailConfig>,
}

impl ApiConfig {
    /// | Env Var                 | Default              |
    /// |-------------------------|----------------------|
    /// | `HOST`                  | `0.0.0.0`            |
    /// | `PORT`                  | `8080`               |
    /// | `WEBHOOK_SECRET`        | dev default (warns)  |
    /// | `LOW_STOCK_THRESHOLD`   | `5`                  |
    /// | `EXPIRY_WINDOW_DAYS`    | `30`                 |
    /// | `ADMIN_FALLBACK_EMAILS` | empty                |
    /// | `ADMIN_ROLE`            | `admin`              |
    ///
    /// Database and mail settings are read by [`DatabaseConfig`] and
    /// [`MailConfig`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = non_blank(&lookup, "HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = parse_or(&lookup, "PORT", 8080)?;

        let webhook_secret = non_blank(&lookup, "WEBHOOK_SECRET").unwrap_or_else(|| {
            tracing::warn!("WEBHOOK_SECRET not set; using insecure dev default");
            DEV_WEBHOOK_SECRET.to_string()
        });

        let threshold = Threshold::new(parse_or(&lookup, "LOW_STOCK_THRESHOLD", Threshold::DEFAULT.get())?);
        let expiry_window = ExpiryWindow::days(parse_or(&lookup, "EXPIRY_WINDOW_DAYS", ExpiryWindow::DEFAULT.get())?);

        let fallback_raw = non_blank(&lookup, "ADMIN_FALLBACK_EMAILS").unwrap_or_default();
        let fallback_recipients = EmailAddress::parse_list(&fallback_raw)
            .map_err(|e| ConfigError::invalid("ADMIN_FALLBACK_EMAILS", fallback_raw.clone(), e))?;

        let admin_role = non_blank(&lookup, "ADMIN_ROLE").unwrap_or_else(|| DEFAULT_ADMIN_ROLE.to_string());

        let database = DatabaseConfig::from_lookup(&lookup)?;
        let mail = MailConfig::from_lookup(&lookup)?;

        Ok(Self {
            host,
            port,
            webhook_secret,
            threshold,
            expiry_window,
            fallback_recipients,
            admin_role,
            database,
            mail,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }
}
