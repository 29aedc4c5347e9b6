use rolegrid_application::{Filter, Row, StoreResult, Table};
use rolegrid_core::StoreError;

/// Rejects rows and filters naming columns the table does not have.
pub(crate) fn ensure_known_columns<'a>(
    table: Table,
    columns: impl IntoIterator<Item = &'a str>,
) -> StoreResult<()> {
    let known = table.columns();
    for column in columns {
        if !known.contains(&column) {
            return Err(StoreError::constraint(format!(
                "unknown column '{column}' in '{}'",
                table.as_str()
            )));
        }
    }

    Ok(())
}

pub(crate) fn ensure_known_row(table: Table, row: &Row) -> StoreResult<()> {
    ensure_known_columns(table, row.keys().map(String::as_str))
}

pub(crate) fn ensure_known_filter(table: Table, filter: &Filter) -> StoreResult<()> {
    ensure_known_columns(
        table,
        filter.conditions().iter().map(|(column, _)| column.as_str()),
    )
}

/// Returns the first unique key the candidate shares with an existing row.
pub(crate) fn violated_unique_key<'a>(
    table: Table,
    existing: impl IntoIterator<Item = &'a Row> + Clone,
    candidate: &Row,
) -> Option<&'static [&'static str]> {
    table.unique_keys().iter().copied().find(|columns| {
        existing.clone().into_iter().any(|row| {
            columns
                .iter()
                .all(|column| row.get(*column) == candidate.get(*column))
        })
    })
}
