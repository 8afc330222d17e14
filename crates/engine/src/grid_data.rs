//! Row data paired with an editor model.
//!
//! A cell's row index is a position in `data_keys`, never the row identifier
//! itself, so rows added on the client get placeholder identifiers without
//! disturbing existing ones.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use gridedit_core::value_text;

/// Field key -> value, in column order.
pub type Row = serde_json::Map<String, Value>;

/// Identifier of a data row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RowId {
    /// Assigned by the server; the row exists in storage.
    Persisted(String),
    /// Created on the client and never saved.
    Placeholder(u64),
}

impl RowId {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, RowId::Placeholder(_))
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowId::Persisted(id) => write!(f, "{}", id),
            RowId::Placeholder(n) => write!(f, "__editable_grid_row_{}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridData {
    pub data_keys: Vec<RowId>,
    pub data: FxHashMap<RowId, Row>,
    next_placeholder: u64,
}

impl GridData {
    /// Build from server rows, keyed by the text of `pk_field`.
    pub fn from_rows(rows: Vec<Row>, pk_field: &str) -> Self {
        let mut grid = Self::default();
        for row in rows {
            let id = match row.get(pk_field) {
                Some(v) if !v.is_null() => RowId::Persisted(value_text(v)),
                _ => grid.next_placeholder_id(),
            };
            grid.data_keys.push(id.clone());
            grid.data.insert(id, row);
        }
        grid
    }

    pub fn row_count(&self) -> usize {
        self.data_keys.len()
    }

    pub fn row_at(&self, row_idx: usize) -> Option<&Row> {
        self.data_keys.get(row_idx).and_then(|id| self.data.get(id))
    }

    /// Allocate the next placeholder identifier.
    pub fn next_placeholder_id(&mut self) -> RowId {
        let id = RowId::Placeholder(self.next_placeholder);
        self.next_placeholder += 1;
        id
    }

    /// Whether the row at `row_idx` has a primary key value in `read_only_ids`.
    pub fn is_read_only_row(
        &self,
        row_idx: usize,
        pk_field: &str,
        read_only_ids: &FxHashSet<String>,
    ) -> bool {
        self.row_at(row_idx)
            .and_then(|row| row.get(pk_field))
            .is_some_and(|v| read_only_ids.contains(&value_text(v)))
    }

    /// Apply `f` to every row, producing new grid data.
    pub(crate) fn map_rows(&self, f: impl Fn(&Row) -> Row) -> Self {
        Self {
            data_keys: self.data_keys.clone(),
            data: self.data.iter().map(|(id, row)| (id.clone(), f(row))).collect(),
            next_placeholder: self.next_placeholder,
        }
    }
}
