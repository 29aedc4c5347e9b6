use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use rolegrid_application::{Filter, Row, StoreAdapter, StoreResult, Table};
use rolegrid_core::StoreError;

use crate::row_schema::{ensure_known_filter, ensure_known_row};

mod statements;

use statements::{delete_statement, insert_statement, select_statement, update_statement};

/// PostgreSQL-backed store adapter.
///
/// `replace` runs its delete and insert inside one transaction.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps driver failures onto store error kinds.
///
/// Integrity and data-format violations are constraint failures; everything
/// else is treated as transport.
pub(crate) fn map_sqlx_error(error: sqlx::Error, context: &str) -> StoreError {
    if let sqlx::Error::Database(database_error) = &error
        && matches!(
            database_error.code().as_deref(),
            Some("23502" | "23503" | "23505" | "22P02" | "22007" | "22008")
        )
    {
        return StoreError::constraint(format!("{context}: {}", database_error.message()));
    }

    if matches!(error, sqlx::Error::RowNotFound) {
        return StoreError::not_found(context.to_owned());
    }

    StoreError::transport(format!("{context}: {error}"))
}

fn into_rows(rows: Vec<Json<Row>>) -> Vec<Row> {
    rows.into_iter().map(|Json(row)| row).collect()
}

#[async_trait]
impl StoreAdapter for PostgresStore {
    async fn list(&self, table: Table, filter: &Filter) -> StoreResult<Vec<Row>> {
        ensure_known_filter(table, filter)?;
        let mut builder = select_statement(table, filter);

        let rows = builder
            .build_query_scalar::<Json<Row>>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                map_sqlx_error(error, &format!("failed to list {}", table.as_str()))
            })?;

        Ok(into_rows(rows))
    }

    async fn insert(&self, table: Table, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
        for row in &rows {
            ensure_known_row(table, row)?;
        }
        let Some(mut builder) = insert_statement(table, &rows)? else {
            return Ok(Vec::new());
        };

        let inserted = builder
            .build_query_scalar::<Json<Row>>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                map_sqlx_error(error, &format!("failed to insert into {}", table.as_str()))
            })?;

        Ok(into_rows(inserted))
    }

    async fn update(&self, table: Table, filter: &Filter, patch: Row) -> StoreResult<Vec<Row>> {
        ensure_known_filter(table, filter)?;
        ensure_known_row(table, &patch)?;
        let Some(mut builder) = update_statement(table, filter, &patch) else {
            return self.list(table, filter).await;
        };

        let updated = builder
            .build_query_scalar::<Json<Row>>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                map_sqlx_error(error, &format!("failed to update {}", table.as_str()))
            })?;

        Ok(into_rows(updated))
    }

    async fn delete(&self, table: Table, filter: &Filter) -> StoreResult<u64> {
        ensure_known_filter(table, filter)?;
        let mut builder = delete_statement(table, filter);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|error| {
                map_sqlx_error(error, &format!("failed to delete from {}", table.as_str()))
            })?;

        Ok(result.rows_affected())
    }

    async fn replace(
        &self,
        table: Table,
        filter: &Filter,
        rows: Vec<Row>,
    ) -> StoreResult<Option<Vec<Row>>> {
        ensure_known_filter(table, filter)?;
        for row in &rows {
            ensure_known_row(table, row)?;
        }

        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| map_sqlx_error(error, "failed to begin transaction"))?;

        let removed = delete_statement(table, filter)
            .build()
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                map_sqlx_error(error, &format!("failed to clear {}", table.as_str()))
            })?
            .rows_affected();

        let inserted = match insert_statement(table, &rows)? {
            Some(mut builder) => builder
                .build_query_scalar::<Json<Row>>()
                .fetch_all(&mut *transaction)
                .await
                .map_err(|error| {
                    map_sqlx_error(error, &format!("failed to refill {}", table.as_str()))
                })?,
            None => Vec::new(),
        };

        transaction
            .commit()
            .await
            .map_err(|error| map_sqlx_error(error, "failed to commit transaction"))?;

        debug!(
            table = table.as_str(),
            removed,
            inserted = inserted.len(),
            "rows replaced in one transaction"
        );

        Ok(Some(into_rows(inserted)))
    }
}

/// Text form used for binding a JSON value into a typed column.
fn bind_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn push_filter(builder: &mut QueryBuilder<'static, Postgres>, filter: &Filter) {
    for (index, (column, value)) in filter.conditions().iter().enumerate() {
        builder.push(if index == 0 { " WHERE " } else { " AND " });
        builder.push(format!("\"{column}\""));
        if value.is_null() {
            builder.push(" IS NULL");
        } else {
            builder.push(" = ");
            builder.push_bind(bind_text(value));
            builder.push(statements::column_cast(column));
        }
    }
}
