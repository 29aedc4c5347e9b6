use serde::de::DeserializeOwned;
use serde_json::Value;

use rolegrid_core::{AppError, AppResult, StoreError, StoreErrorKind};

use crate::store_ports::{Filter, Row, StoreAdapter, Table};

/// Decodes stored rows into typed records.
pub(crate) fn decode_rows<T: DeserializeOwned>(table: Table, rows: Vec<Row>) -> AppResult<Vec<T>> {
    rows.into_iter()
        .map(|row| decode_row(table, row))
        .collect()
}

pub(crate) fn decode_row<T: DeserializeOwned>(table: Table, row: Row) -> AppResult<T> {
    serde_json::from_value(Value::Object(row)).map_err(|error| {
        AppError::Internal(format!(
            "invalid stored row in '{}': {error}",
            table.as_str()
        ))
    })
}

/// Lists and decodes rows in one call.
pub(crate) async fn fetch<T: DeserializeOwned>(
    store: &dyn StoreAdapter,
    table: Table,
    filter: &Filter,
) -> AppResult<Vec<T>> {
    let rows = store
        .list(table, filter)
        .await
        .map_err(|error| map_store_error(error, &format!("failed to list {}", table.as_str())))?;

    decode_rows(table, rows)
}

/// Maps an adapter failure onto the application taxonomy.
///
/// Constraint violations become conflicts, missing rows become not-found and
/// transport failures are propagated unchanged.
pub(crate) fn map_store_error(error: StoreError, context: &str) -> AppError {
    match error.kind {
        StoreErrorKind::Constraint => AppError::Conflict(format!("{context}: {}", error.detail)),
        StoreErrorKind::NotFound => AppError::NotFound(format!("{context}: {}", error.detail)),
        StoreErrorKind::Transport => AppError::Store(error),
    }
}
