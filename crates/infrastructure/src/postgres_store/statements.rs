use super::*;

/// Cast applied to bound text parameters for a column.
pub(super) fn column_cast(column: &str) -> &'static str {
    if column == "created_at" {
        "::timestamptz"
    } else {
        "::text"
    }
}

pub(super) fn select_statement(table: Table, filter: &Filter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT to_jsonb(t) FROM {} AS t",
        table.as_str()
    ));
    push_filter(&mut builder, filter);
    builder
}

/// Builds a multi-row insert; columns missing from a row take their default.
pub(super) fn insert_statement(
    table: Table,
    rows: &[Row],
) -> StoreResult<Option<QueryBuilder<'static, Postgres>>> {
    if rows.is_empty() {
        return Ok(None);
    }

    let columns: Vec<&'static str> = table
        .columns()
        .iter()
        .copied()
        .filter(|column| rows.iter().any(|row| row.contains_key(*column)))
        .collect();
    if columns.is_empty() {
        return Err(StoreError::constraint(format!(
            "insert into '{}' names no columns",
            table.as_str()
        )));
    }

    let mut builder = QueryBuilder::new(format!("INSERT INTO {} AS t (", table.as_str()));
    for (index, column) in columns.iter().enumerate() {
        if index > 0 {
            builder.push(", ");
        }
        builder.push(format!("\"{column}\""));
    }
    builder.push(") VALUES ");

    for (row_index, row) in rows.iter().enumerate() {
        builder.push(if row_index == 0 { "(" } else { ", (" });
        for (index, column) in columns.iter().enumerate() {
            if index > 0 {
                builder.push(", ");
            }
            match row.get(*column) {
                Some(value) => {
                    builder.push_bind(bind_text(value));
                    builder.push(column_cast(column));
                }
                None => {
                    builder.push("DEFAULT");
                }
            }
        }
        builder.push(")");
    }

    builder.push(" RETURNING to_jsonb(t)");
    Ok(Some(builder))
}

/// Builds an update; `None` when the patch is empty.
pub(super) fn update_statement(
    table: Table,
    filter: &Filter,
    patch: &Row,
) -> Option<QueryBuilder<'static, Postgres>> {
    if patch.is_empty() {
        return None;
    }

    let mut builder = QueryBuilder::new(format!("UPDATE {} AS t SET ", table.as_str()));
    for (index, (column, value)) in patch.iter().enumerate() {
        if index > 0 {
            builder.push(", ");
        }
        builder.push(format!("\"{column}\" = "));
        builder.push_bind(bind_text(value));
        builder.push(column_cast(column));
    }
    push_filter(&mut builder, filter);
    builder.push(" RETURNING to_jsonb(t)");
    Some(builder)
}

pub(super) fn delete_statement(table: Table, filter: &Filter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("DELETE FROM {}", table.as_str()));
    push_filter(&mut builder, filter);
    builder
}
