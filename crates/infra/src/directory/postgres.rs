//! Postgres-backed administrator directory.
//!
//! Reads the `profiles` table the backend keeps alongside its auth users:
//!
//! ```sql
//! CREATE TABLE profiles (
//!     id    uuid PRIMARY KEY,
//!     email text,
//!     role  text NOT NULL DEFAULT 'customer'
//! );
//! ```

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use uniasia_core::EmailAddress;
use uniasia_notifications::{DirectoryError, RecipientDirectory};

pub const DEFAULT_ADMIN_ROLE: &str = "admin";

pub struct PgAdminDirectory {
    pool: PgPool,
    role: String,
}

impl PgAdminDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self::with_role(pool, DEFAULT_ADMIN_ROLE)
    }

    pub fn with_role(pool: PgPool, role: impl Into<String>) -> Self {
        Self {
            pool,
            role: role.into(),
        }
    }
}

#[async_trait]
impl RecipientDirectory for PgAdminDirectory {
    async fn admin_emails(&self) -> Result<Vec<EmailAddress>, DirectoryError> {
        let rows = sqlx::query(
            r#"
            SELECT email
            FROM profiles
            WHERE role = $1
            ORDER BY email
            "#,
        )
        .bind(&self.role)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DirectoryError::Unavailable(format!("query admin profiles: {e}")))?;

        let mut raw = Vec::with_capacity(rows.len());
        for row in rows {
            let email: Option<String> = row
                .try_get("email")
                .map_err(|e| DirectoryError::Unavailable(format!("read email column: {e}")))?;
            raw.push(email);
        }

        Ok(collect_addresses(raw))
    }
}

/// Keep the valid, distinct addresses; skip NULLs and log malformed ones.
fn collect_addresses(raw: Vec<Option<String>>) -> Vec<EmailAddress> {
    let mut out: Vec<EmailAddress> = Vec::with_capacity(raw.len());
    for value in raw.into_iter().flatten() {
        match EmailAddress::parse(&value) {
            Ok(email) if !out.contains(&email) => out.push(email),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "skipping admin profile with invalid email"),
        }
    }
    out
}
