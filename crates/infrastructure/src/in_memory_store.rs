use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use rolegrid_application::{Filter, Row, StoreAdapter, StoreResult, Table};
use rolegrid_core::StoreError;

use crate::row_schema::{ensure_known_filter, ensure_known_row, violated_unique_key};

/// In-memory store adapter.
///
/// Every table lives behind one lock, so `replace` is atomic with respect to
/// all other calls.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<HashMap<Table, Vec<Row>>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn with_generated_identity(table: Table, mut row: Row) -> Row {
    if table.has_generated_identity() {
        row.entry("id")
            .or_insert_with(|| Value::from(Uuid::new_v4().to_string()));
        row.entry("created_at")
            .or_insert_with(|| Value::from(Utc::now().to_rfc3339()));
    }
    row
}

/// Appends rows to `stored`, failing without side effects on the first
/// unique key violation.
fn append_rows(table: Table, stored: &mut Vec<Row>, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
    let mut inserted: Vec<Row> = Vec::with_capacity(rows.len());
    for row in rows {
        ensure_known_row(table, &row)?;
        let row = with_generated_identity(table, row);
        if let Some(columns) = violated_unique_key(table, stored.iter().chain(inserted.iter()), &row)
        {
            return Err(StoreError::constraint(format!(
                "duplicate value for ({}) in '{}'",
                columns.join(", "),
                table.as_str()
            )));
        }
        inserted.push(row);
    }

    stored.extend(inserted.iter().cloned());
    Ok(inserted)
}

#[async_trait]
impl StoreAdapter for InMemoryStore {
    async fn list(&self, table: Table, filter: &Filter) -> StoreResult<Vec<Row>> {
        ensure_known_filter(table, filter)?;
        let tables = self.tables.read().await;

        Ok(tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| filter.matches(row))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, table: Table, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
        let mut tables = self.tables.write().await;
        append_rows(table, tables.entry(table).or_default(), rows)
    }

    async fn update(&self, table: Table, filter: &Filter, patch: Row) -> StoreResult<Vec<Row>> {
        ensure_known_filter(table, filter)?;
        ensure_known_row(table, &patch)?;
        let mut tables = self.tables.write().await;
        let stored = tables.entry(table).or_default();

        let (mut updated, untouched): (Vec<Row>, Vec<Row>) =
            stored.iter().cloned().partition(|row| filter.matches(row));
        for row in &mut updated {
            for (column, value) in &patch {
                row.insert(column.clone(), value.clone());
            }
        }

        for (index, row) in updated.iter().enumerate() {
            let others = untouched
                .iter()
                .chain(updated.iter().take(index))
                .chain(updated.iter().skip(index + 1));
            if let Some(columns) = violated_unique_key(table, others, row) {
                return Err(StoreError::constraint(format!(
                    "duplicate value for ({}) in '{}'",
                    columns.join(", "),
                    table.as_str()
                )));
            }
        }

        let mut patched = updated.iter();
        for row in stored.iter_mut() {
            if filter.matches(row)
                && let Some(next) = patched.next()
            {
                *row = next.clone();
            }
        }

        Ok(updated)
    }

    async fn delete(&self, table: Table, filter: &Filter) -> StoreResult<u64> {
        ensure_known_filter(table, filter)?;
        let mut tables = self.tables.write().await;
        let stored = tables.entry(table).or_default();

        let before = stored.len();
        stored.retain(|row| !filter.matches(row));
        u64::try_from(before - stored.len())
            .map_err(|error| StoreError::transport(format!("delete count overflow: {error}")))
    }

    async fn replace(
        &self,
        table: Table,
        filter: &Filter,
        rows: Vec<Row>,
    ) -> StoreResult<Option<Vec<Row>>> {
        ensure_known_filter(table, filter)?;
        let mut tables = self.tables.write().await;
        let stored = tables.entry(table).or_default();

        let mut next: Vec<Row> = stored
            .iter()
            .filter(|row| !filter.matches(row))
            .cloned()
            .collect();
        let inserted = append_rows(table, &mut next, rows)?;
        *stored = next;

        Ok(Some(inserted))
    }
}
