use sqlx::mysql::{MySql, MySqlArguments};
use sqlx::query::Query;

use crate::error::{DbError, DbResult};
use crate::types::Param;

/// Storage cell for one statement parameter.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BoundParam {
    /// Never bound since compile or reset; sent as NULL.
    #[default]
    Unbound,
    Null,
    Int(i32),
    Int64(i64),
    Double(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// One owned cell per parameter of a prepared statement.
///
/// The array is sized once when the statement is compiled. Binding writes the
/// cell for that position in place; text and blob cells reuse their buffers
/// across binds. Every cell is sent with each execution.
#[derive(Debug, Clone, Default)]
pub struct ParamSlots {
    slots: Box<[BoundParam]>,
}

impl ParamSlots {
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            slots: vec![BoundParam::Unbound; count].into_boxed_slice(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The cell at a 1-based position.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&BoundParam> {
        position.checked_sub(1).and_then(|i| self.slots.get(i))
    }

    /// Write `value` into the cell at a 1-based position.
    ///
    /// # Errors
    ///
    /// `OutOfRange` when `position` is 0 or past the last slot; no cell is
    /// touched in that case.
    pub fn set(&mut self, position: usize, value: Param<'_>) -> DbResult<()> {
        let count = self.slots.len();
        let slot = position
            .checked_sub(1)
            .and_then(|i| self.slots.get_mut(i))
            .ok_or_else(|| DbError::param_out_of_range(position, count))?;

        match (slot, value) {
            (BoundParam::Text(buf), Param::Text(v)) => {
                buf.clear();
                buf.push_str(v);
            }
            (BoundParam::Blob(buf), Param::Blob(v)) => {
                buf.clear();
                buf.extend_from_slice(v);
            }
            (slot, value) => *slot = BoundParam::from(value),
        }
        Ok(())
    }

    /// Return every cell to `Unbound`.
    pub fn clear(&mut self) {
        self.slots.fill(BoundParam::Unbound);
    }

    /// Attach every cell, in order, to `query`.
    pub(crate) fn bind_all<'q>(
        &'q self,
        query: Query<'q, MySql, MySqlArguments>,
    ) -> Query<'q, MySql, MySqlArguments> {
        self.slots.iter().fold(query, |query, slot| match slot {
            BoundParam::Unbound | BoundParam::Null => query.bind(None::<i64>),
            BoundParam::Int(v) => query.bind(*v),
            BoundParam::Int64(v) => query.bind(*v),
            BoundParam::Double(v) => query.bind(*v),
            BoundParam::Text(v) => query.bind(v.as_str()),
            BoundParam::Blob(v) => query.bind(v.as_slice()),
        })
    }
}

impl From<Param<'_>> for BoundParam {
    fn from(value: Param<'_>) -> Self {
        match value {
            Param::Null => BoundParam::Null,
            Param::Int(v) => BoundParam::Int(v),
            Param::Int64(v) => BoundParam::Int64(v),
            Param::Double(v) => BoundParam::Double(v),
            Param::Text(v) => BoundParam::Text(v.to_owned()),
            Param::Blob(v) => BoundParam::Blob(v.to_vec()),
        }
    }
}
