use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::mysql::{MySqlRow, MySqlStatement};
use sqlx::{Column, Row, Statement as _, TypeInfo, ValueRef};

use crate::error::DbResult;
use crate::results::{ColumnNames, RowTable};
use crate::types::Value;

/// How a result column is decoded into a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnKind {
    Signed,
    Unsigned,
    Float,
    Double,
    DateTime,
    Timestamp,
    Date,
    Time,
    Binary,
    Text,
    Null,
}

impl ColumnKind {
    /// Classify by the server's type name, e.g. `INT UNSIGNED` or `VARBINARY`.
    pub(crate) fn from_type_name(name: &str) -> Self {
        let mut words = name.split_whitespace();
        let base = words.next().unwrap_or_default();
        let unsigned = words.any(|w| w.eq_ignore_ascii_case("UNSIGNED"));

        match base.to_ascii_uppercase().as_str() {
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT" if unsigned => {
                ColumnKind::Unsigned
            }
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT" | "BOOLEAN"
            | "YEAR" => ColumnKind::Signed,
            "FLOAT" => ColumnKind::Float,
            "DOUBLE" => ColumnKind::Double,
            "DATETIME" => ColumnKind::DateTime,
            "TIMESTAMP" => ColumnKind::Timestamp,
            "DATE" => ColumnKind::Date,
            "TIME" => ColumnKind::Time,
            "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT"
            | "GEOMETRY" => ColumnKind::Binary,
            "NULL" => ColumnKind::Null,
            // CHAR, VARCHAR, TEXT, DECIMAL, ENUM, SET, JSON
            _ => ColumnKind::Text,
        }
    }
}

/// Column names and decode kinds of a prepared statement's result.
#[derive(Debug, Clone, Default)]
pub(crate) struct ColumnLayout {
    pub(crate) names: ColumnNames,
    pub(crate) kinds: Vec<ColumnKind>,
}

impl ColumnLayout {
    pub(crate) fn of(stmt: &MySqlStatement<'_>) -> Self {
        let columns = stmt.columns();
        Self {
            names: ColumnNames::new(columns.iter().map(|c| c.name().to_owned()).collect()),
            kinds: columns
                .iter()
                .map(|c| ColumnKind::from_type_name(c.type_info().name()))
                .collect(),
        }
    }
}

fn decode_cell(row: &MySqlRow, idx: usize, kind: ColumnKind) -> DbResult<Value> {
    if row.try_get_raw(idx)?.is_null() {
        return Ok(Value::Null);
    }
    let value = match kind {
        ColumnKind::Signed => Value::Integer(row.try_get_unchecked::<i64, _>(idx)?),
        ColumnKind::Unsigned => {
            let v = row.try_get_unchecked::<u64, _>(idx)?;
            // values past i64::MAX keep their exact digits as text
            i64::try_from(v).map_or_else(|_| Value::Text(v.to_string()), Value::Integer)
        }
        ColumnKind::Float => Value::Real(f64::from(row.try_get_unchecked::<f32, _>(idx)?)),
        ColumnKind::Double => Value::Real(row.try_get_unchecked::<f64, _>(idx)?),
        ColumnKind::DateTime => {
            Value::Text(row.try_get_unchecked::<NaiveDateTime, _>(idx)?.to_string())
        }
        ColumnKind::Timestamp => Value::Text(
            row.try_get_unchecked::<DateTime<Utc>, _>(idx)?
                .naive_utc()
                .to_string(),
        ),
        ColumnKind::Date => Value::Text(row.try_get_unchecked::<NaiveDate, _>(idx)?.to_string()),
        ColumnKind::Time => Value::Text(row.try_get_unchecked::<NaiveTime, _>(idx)?.to_string()),
        ColumnKind::Binary => Value::Blob(row.try_get_unchecked::<Vec<u8>, _>(idx)?),
        ColumnKind::Text => Value::Text(row.try_get_unchecked::<String, _>(idx)?),
        ColumnKind::Null => Value::Null,
    };
    Ok(value)
}

/// Decode one row, one cell per entry of `kinds`.
pub(crate) fn decode_row(row: &MySqlRow, kinds: &[ColumnKind]) -> DbResult<Vec<Value>> {
    kinds
        .iter()
        .enumerate()
        .map(|(idx, kind)| decode_cell(row, idx, *kind))
        .collect()
}

pub(crate) fn build_row_table(layout: &ColumnLayout, rows: &[MySqlRow]) -> DbResult<RowTable> {
    let mut table = RowTable::new(layout.names.clone());
    for row in rows {
        table.push_row(decode_row(row, &layout.kinds)?);
    }
    Ok(table)
}
