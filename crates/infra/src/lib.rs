//! Infrastructure layer: Postgres adapters, the HTTP mail client and
//! environment configuration for them.

pub mod activity;
pub mod config;
pub mod db;
pub mod directory;
pub mod mail;

pub use config::{ConfigError, DatabaseConfig, MailConfig};
