use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{Value, ValueType};

/// Column names of a cursor or result set, with a name-to-position index.
///
/// Shared by reference so every row buffer and every clone of the metadata
/// points at the same allocation.
#[derive(Debug, Clone, Default)]
pub struct ColumnNames {
    names: Arc<Vec<String>>,
    index: Arc<HashMap<String, usize>>,
}

impl ColumnNames {
    #[must_use]
    pub fn new(names: Vec<String>) -> Self {
        // first occurrence wins for duplicated names, matching a linear scan
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            index.entry(name.clone()).or_insert(i);
        }
        Self {
            names: Arc::new(names),
            index: Arc::new(index),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn name(&self, col: usize) -> Option<&str> {
        self.names.get(col).map(String::as_str)
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.names
    }
}

/// Something that selects a column: a 0-based position or a column name.
pub trait ColumnIndex {
    /// Resolve to a position inside `fields`, or `None` if there is no such column.
    fn position<F: Fields + ?Sized>(&self, fields: &F) -> Option<usize>;
}

impl ColumnIndex for usize {
    fn position<F: Fields + ?Sized>(&self, fields: &F) -> Option<usize> {
        (*self < fields.num_fields()).then_some(*self)
    }
}

impl ColumnIndex for &str {
    fn position<F: Fields + ?Sized>(&self, fields: &F) -> Option<usize> {
        fields.field_index(self)
    }
}

impl ColumnIndex for &String {
    fn position<F: Fields + ?Sized>(&self, fields: &F) -> Option<usize> {
        fields.field_index(self)
    }
}

/// Field access on the current row of a cursor or result set.
///
/// Implementors provide the three required methods; the typed getters are
/// derived from them. A NULL field, a position past the last column, an
/// unknown column name and "no current row" all read the same way: the
/// getter returns the caller's default and `field_is_null` is `true`.
pub trait Fields {
    fn num_fields(&self) -> usize;

    fn field_name(&self, col: usize) -> Option<&str>;

    /// The raw value at `col` on the current row.
    fn value(&self, col: usize) -> Option<&Value>;

    /// Position of the first column called `name`.
    fn field_index(&self, name: &str) -> Option<usize> {
        (0..self.num_fields()).find(|&i| self.field_name(i) == Some(name))
    }

    fn field<C: ColumnIndex>(&self, col: C) -> Option<&Value> {
        col.position(self).and_then(|i| self.value(i))
    }

    /// Text form of a field, `None` when it is NULL or absent.
    fn field_value<C: ColumnIndex>(&self, col: C) -> Option<Cow<'_, str>> {
        self.field(col).and_then(Value::to_text)
    }

    fn field_is_null<C: ColumnIndex>(&self, col: C) -> bool {
        self.field(col).is_none_or(Value::is_null)
    }

    fn field_type<C: ColumnIndex>(&self, col: C) -> Option<ValueType> {
        self.field(col).map(Value::value_type)
    }

    /// Field as a 32-bit integer; wider values keep their low 32 bits.
    fn get_int<C: ColumnIndex>(&self, col: C, default: i32) -> i32 {
        #[allow(clippy::cast_possible_truncation)]
        let value = self
            .field(col)
            .and_then(Value::coerce_i64)
            .map_or(default, |v| v as i32);
        value
    }

    fn get_int64<C: ColumnIndex>(&self, col: C, default: i64) -> i64 {
        self.field(col).and_then(Value::coerce_i64).unwrap_or(default)
    }

    fn get_double<C: ColumnIndex>(&self, col: C, default: f64) -> f64 {
        self.field(col).and_then(Value::coerce_f64).unwrap_or(default)
    }

    fn get_string<'a, C: ColumnIndex>(&'a self, col: C, default: &'a str) -> Cow<'a, str> {
        self.field(col)
            .and_then(Value::to_text)
            .unwrap_or(Cow::Borrowed(default))
    }

    /// Bytes of a blob or text field.
    fn get_blob<C: ColumnIndex>(&self, col: C) -> Option<&[u8]> {
        self.field(col).and_then(Value::as_bytes)
    }
}

/// Column names and the single row a forward cursor is positioned on.
#[derive(Debug, Default)]
pub(crate) struct CurrentRow {
    columns: ColumnNames,
    row: Option<Vec<Value>>,
}

impl CurrentRow {
    pub(crate) fn new(columns: ColumnNames, row: Option<Vec<Value>>) -> Self {
        Self { columns, row }
    }

    pub(crate) fn columns(&self) -> &ColumnNames {
        &self.columns
    }

    pub(crate) fn eof(&self) -> bool {
        self.row.is_none()
    }

    /// Replace the current row; `None` moves to end of stream.
    pub(crate) fn set(&mut self, row: Option<Vec<Value>>) {
        self.row = row;
    }

    pub(crate) fn value(&self, col: usize) -> Option<&Value> {
        self.row.as_ref().and_then(|row| row.get(col))
    }

    /// Forget the row and the column names.
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Row-major cell store for a materialized result set.
#[derive(Debug, Default)]
pub(crate) struct RowTable {
    columns: ColumnNames,
    cells: Vec<Value>,
    num_rows: usize,
    current: usize,
}

impl RowTable {
    pub(crate) fn new(columns: ColumnNames) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    /// Append one row; short rows are padded with NULL, long rows truncated.
    pub(crate) fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.cells.extend(row);
        self.num_rows += 1;
    }

    pub(crate) fn columns(&self) -> &ColumnNames {
        &self.columns
    }

    pub(crate) fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub(crate) fn current_row(&self) -> usize {
        self.current
    }

    pub(crate) fn eof(&self) -> bool {
        self.current >= self.num_rows
    }

    pub(crate) fn next_row(&mut self) {
        if self.current < self.num_rows {
            self.current += 1;
        }
    }

    pub(crate) fn seek_row(&mut self, row: usize) {
        if self.num_rows == 0 {
            return;
        }
        self.current = row.min(self.num_rows - 1);
    }

    pub(crate) fn value(&self, col: usize) -> Option<&Value> {
        let width = self.columns.len();
        if self.eof() || col >= width {
            return None;
        }
        self.cells.get(self.current * width + col)
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OneRow {
        columns: ColumnNames,
        row: Vec<Value>,
    }

    impl Fields for OneRow {
        fn num_fields(&self) -> usize {
            self.columns.len()
        }

        fn field_name(&self, col: usize) -> Option<&str> {
            self.columns.name(col)
        }

        fn value(&self, col: usize) -> Option<&Value> {
            self.row.get(col)
        }
    }

    fn sample() -> OneRow {
        OneRow {
            columns: ColumnNames::new(vec![
                "id".into(),
                "name".into(),
                "score".into(),
                "photo".into(),
                "note".into(),
            ]),
            row: vec![
                Value::Integer(7),
                Value::Text("Alice".into()),
                Value::Real(2.5),
                Value::Blob(vec![0xDE, 0xAD, 0xBE, 0xEF]),
                Value::Null,
            ],
        }
    }

    #[test]
    fn lookup_by_name_and_position() {
        let row = sample();
        assert_eq!(row.field_index("name"), Some(1));
        assert_eq!(row.field_index("missing"), None);
        assert_eq!(row.field_name(0), Some("id"));
        assert_eq!(row.field_name(9), None);
        assert_eq!(row.get_int("id", -1), 7);
        assert_eq!(row.get_int(0, -1), 7);
        let name = String::from("name");
        assert_eq!(row.get_string(&name, "?"), "Alice");
    }

    #[test]
    fn null_and_missing_fields_return_defaults() {
        let row = sample();
        assert!(row.field_is_null("note"));
        assert!(row.field_is_null(42));
        assert!(row.field_is_null("nope"));
        assert_eq!(row.get_string("note", "n/a"), "n/a");
        assert_eq!(row.get_int64(42, 99), 99);
        assert_eq!(row.get_double("nope", 1.25), 1.25);
        assert_eq!(row.field_value("note"), None);
        assert_eq!(row.get_blob("note"), None);
    }

    #[test]
    fn typed_getters_read_stored_values() {
        let row = sample();
        assert!(!row.field_is_null("score"));
        assert!((row.get_double("score", 0.0) - 2.5).abs() < f64::EPSILON);
        assert_eq!(row.get_int("score", 0), 2);
        assert_eq!(row.field_value("id").as_deref(), Some("7"));
        assert_eq!(row.get_blob("photo"), Some(&[0xDE, 0xAD, 0xBE, 0xEF][..]));
        assert_eq!(row.field_type("photo"), Some(ValueType::Blob));
        assert_eq!(row.field_type("note"), Some(ValueType::Null));
        assert_eq!(row.field_type(5), None);
    }

    #[test]
    fn duplicate_names_resolve_to_first() {
        let columns = ColumnNames::new(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(columns.position("a"), Some(0));
        assert_eq!(columns.len(), 3);
    }

    fn people() -> RowTable {
        let mut table = RowTable::new(ColumnNames::new(vec!["id".into(), "name".into()]));
        table.push_row(vec![Value::Integer(1), Value::Text("Alice".into())]);
        table.push_row(vec![Value::Integer(2), Value::Text("Bob".into())]);
        table.push_row(vec![Value::Integer(3)]);
        table
    }

    #[test]
    fn table_seek_clamps_to_last_row() {
        let mut table = people();
        assert_eq!(table.num_rows(), 3);
        table.seek_row(999);
        assert_eq!(table.current_row(), 2);
        assert_eq!(table.value(1), Some(&Value::Null));
        table.seek_row(0);
        assert_eq!(table.value(1), Some(&Value::Text("Alice".into())));
    }

    #[test]
    fn table_walks_forward_to_eof() {
        let mut table = people();
        let mut seen = Vec::new();
        while !table.eof() {
            seen.push(table.value(0).cloned());
            table.next_row();
        }
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2], Some(Value::Integer(3)));
        assert_eq!(table.value(0), None);
        table.next_row();
        assert_eq!(table.current_row(), 3);
    }

    #[test]
    fn empty_table_ignores_seek() {
        let mut table = RowTable::new(ColumnNames::new(vec!["x".into()]));
        assert!(table.eof());
        table.seek_row(5);
        assert_eq!(table.current_row(), 0);
        assert!(table.eof());
    }

    #[test]
    fn cleared_table_has_no_rows() {
        let mut table = people();
        table.clear();
        assert_eq!(table.num_rows(), 0);
        assert!(table.columns().is_empty());
        assert!(table.eof());
    }

    #[test]
    fn cleared_row_forgets_columns() {
        let columns = ColumnNames::new(vec!["n".into(), "label".into()]);
        let mut current = CurrentRow::new(columns, Some(vec![Value::Integer(1), Value::Null]));
        assert!(!current.eof());
        assert_eq!(current.value(0), Some(&Value::Integer(1)));
        current.set(None);
        assert!(current.eof());
        assert_eq!(current.value(0), None);
        assert_eq!(current.columns().len(), 2);
        current.clear();
        assert!(current.columns().is_empty());
    }
}
