use rusqlite::Statement;
use rusqlite::types::Value as SqliteValue;

use crate::error::DbResult;
use crate::results::{ColumnNames, RowTable};
use crate::types::Value;

impl From<SqliteValue> for Value {
    fn from(value: SqliteValue) -> Self {
        match value {
            SqliteValue::Null => Value::Null,
            SqliteValue::Integer(i) => Value::Integer(i),
            SqliteValue::Real(f) => Value::Real(f),
            SqliteValue::Text(s) => Value::Text(s),
            SqliteValue::Blob(b) => Value::Blob(b),
        }
    }
}

/// Extract one cell from a `SQLite` row.
///
/// # Errors
///
/// Returns the classified `rusqlite` error if the column cannot be read.
pub(crate) fn extract_value(row: &rusqlite::Row<'_>, idx: usize) -> DbResult<Value> {
    let value: SqliteValue = row.get(idx)?;
    Ok(value.into())
}

pub(crate) fn column_names(stmt: &Statement<'_>) -> ColumnNames {
    ColumnNames::new(
        stmt.column_names()
            .iter()
            .map(std::string::ToString::to_string)
            .collect(),
    )
}

/// Read every column of the row a statement is stepped onto.
pub(crate) fn read_row(row: &rusqlite::Row<'_>, width: usize) -> DbResult<Vec<Value>> {
    (0..width).map(|i| extract_value(row, i)).collect()
}

/// Step `stmt` to completion with its current bindings and collect every row.
///
/// The statement is reset afterwards and keeps its bindings.
pub(crate) fn fetch_rows(stmt: &mut Statement<'_>) -> DbResult<Vec<Vec<Value>>> {
    let width = stmt.column_count();
    let mut rows_iter = stmt.raw_query();
    let mut rows = Vec::new();
    while let Some(row) = rows_iter.next()? {
        rows.push(read_row(row, width)?);
    }
    Ok(rows)
}

/// Run `stmt` and materialize its rows into a table.
pub(crate) fn build_row_table(stmt: &mut Statement<'_>) -> DbResult<RowTable> {
    let mut table = RowTable::new(column_names(stmt));
    for row in fetch_rows(stmt)? {
        table.push_row(row);
    }
    Ok(table)
}
