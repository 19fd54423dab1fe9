//! Administrator directory adapters.

pub mod postgres;

pub use postgres::PgAdminDirectory;
