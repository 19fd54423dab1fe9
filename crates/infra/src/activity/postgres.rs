//! Postgres-backed activity log.
//!
//! ```sql
//! CREATE TABLE activity_logs (
//!     id         uuid PRIMARY KEY,
//!     action     text NOT NULL,
//!     entity     text NOT NULL,
//!     details    jsonb NOT NULL DEFAULT '{}'::jsonb,
//!     created_at timestamptz NOT NULL DEFAULT now()
//! );
//! ```

use async_trait::async_trait;
use sqlx::PgPool;

use uniasia_notifications::{ActivityLog, ActivityLogError, ActivityRecord};

pub struct PgActivityLog {
    pool: PgPool,
}

impl PgActivityLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityLog for PgActivityLog {
    async fn record(&self, record: ActivityRecord) -> Result<(), ActivityLogError> {
        sqlx::query(
            r#"
            INSERT INTO activity_logs (id, action, entity, details, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.action)
        .bind(&record.entity)
        .bind(sqlx::types::Json(&record.details))
        .bind(record.occurred_at)
        .execute(&self.pool)
        .await
        .map_err(|e| ActivityLogError::Write(e.to_string()))?;

        Ok(())
    }
}
