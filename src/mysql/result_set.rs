use crate::backend::ResultSet;
use crate::results::{Fields, RowTable};
use crate::types::Value;

/// Materialized MySQL query result with random row access.
#[derive(Debug, Default)]
pub struct MysqlResultSet {
    table: RowTable,
}

impl MysqlResultSet {
    pub(crate) fn new(table: RowTable) -> Self {
        Self { table }
    }
}

impl Fields for MysqlResultSet {
    fn num_fields(&self) -> usize {
        self.table.columns().len()
    }

    fn field_name(&self, col: usize) -> Option<&str> {
        self.table.columns().name(col)
    }

    fn value(&self, col: usize) -> Option<&Value> {
        self.table.value(col)
    }

    fn field_index(&self, name: &str) -> Option<usize> {
        self.table.columns().position(name)
    }
}

impl ResultSet for MysqlResultSet {
    fn num_rows(&self) -> usize {
        self.table.num_rows()
    }

    fn eof(&self) -> bool {
        self.table.eof()
    }

    fn next_row(&mut self) {
        self.table.next_row();
    }

    fn seek_row(&mut self, row: usize) {
        self.table.seek_row(row);
    }

    fn current_row(&self) -> usize {
        self.table.current_row()
    }

    fn finalize(&mut self) {
        self.table.clear();
    }
}
