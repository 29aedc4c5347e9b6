use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use rolegrid_application::{StoreResult, UserDirectory};
use rolegrid_domain::{Identity, UserId};

use crate::postgres_store::map_sqlx_error;

/// PostgreSQL-backed user directory reading the identity subsystem's table.
#[derive(Clone)]
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct IdentityRow {
    id: String,
    email: Option<String>,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn list_identities(&self) -> StoreResult<Vec<Identity>> {
        let rows = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT id, email, created_at
            FROM identities
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_sqlx_error(error, "failed to list identities"))?;

        Ok(rows
            .into_iter()
            .map(|row| Identity {
                id: UserId::new(row.id),
                email: row.email,
                created_at: row.created_at,
            })
            .collect())
    }
}
