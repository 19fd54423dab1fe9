//! Activity-log adapters.

pub mod postgres;

pub use postgres::PgActivityLog;
