//! Structural column edits: replace, insert and remove columns.
//!
//! Every edit rebuilds the cell maps in a single pass into fresh maps, so a
//! key that moves onto a position another key is leaving can never be read
//! after it was overwritten.

use rustc_hash::FxHashMap;
use serde_json::Value;

use gridedit_core::CellKey;

use crate::grid_data::{GridData, Row};
use crate::model::{EditorModel, EditorModelDelta};
use crate::schema::{QueryColumn, QueryInfo};

/// Result of a structural edit.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuralOutcome {
    /// The edit targeted nothing; model, data and schema are unchanged.
    NoOp,
    Changed {
        model: EditorModelDelta,
        data: GridData,
        query_info: QueryInfo,
    },
}

impl StructuralOutcome {
    pub fn is_noop(&self) -> bool {
        matches!(self, StructuralOutcome::NoOp)
    }
}

/// Rebuild `map` with every key passed through `remap`; `None` drops the entry.
pub(crate) fn reindex<V: Clone>(
    map: &FxHashMap<CellKey, V>,
    remap: impl Fn(CellKey) -> Option<CellKey>,
) -> FxHashMap<CellKey, V> {
    map.iter().fold(FxHashMap::default(), |mut acc, (key, value)| {
        if let Some(new_key) = remap(*key) {
            acc.insert(new_key, value.clone());
        }
        acc
    })
}

/// Replace the column `existing_field_key` with `new_column` in place.
///
/// Cells of the replaced column are dropped; every other cell keeps its key.
pub fn change_column(
    model: &EditorModel,
    query_info: &QueryInfo,
    data: &GridData,
    existing_field_key: &str,
    new_column: &QueryColumn,
) -> StructuralOutcome {
    let Some(idx) = query_info.editable_columns().index_of(existing_field_key) else {
        log::debug!("change_column: '{}' is not an editable column", existing_field_key);
        return StructuralOutcome::NoOp;
    };
    if !new_column.is_insertable() {
        log::debug!("change_column: replacement '{}' is not editable", new_column.field_key);
        return StructuralOutcome::NoOp;
    }

    let keep = |key: CellKey| (key.col != idx).then_some(key);
    let delta = EditorModelDelta {
        cell_values: Some(reindex(&model.cell_values, keep)),
        cell_messages: Some(reindex(&model.cell_messages, keep)),
        ..EditorModelDelta::clear_selection()
    };

    let new_field = new_column.field_key.clone();
    let data = data.map_rows(|row| {
        let mut replaced = false;
        let mut out: Row = row
            .iter()
            .map(|(k, v)| {
                if k.eq_ignore_ascii_case(existing_field_key) {
                    replaced = true;
                    (new_field.clone(), Value::Null)
                } else {
                    (k.clone(), v.clone())
                }
            })
            .collect();
        if !replaced {
            out.insert(new_field.clone(), Value::Null);
        }
        out
    });

    StructuralOutcome::Changed {
        model: delta,
        data,
        query_info: query_info.with_column_replaced(existing_field_key, new_column),
    }
}

/// Insert `new_columns` after `after_field_key`, or first when it is absent,
/// unknown or not an editable column.
///
/// Cells at or right of the insertion index shift right by the number of new
/// editable columns; every row gets an empty cell in each of them.
pub fn add_columns(
    model: &EditorModel,
    query_info: &QueryInfo,
    data: &GridData,
    new_columns: &[QueryColumn],
    after_field_key: Option<&str>,
) -> StructuralOutcome {
    if new_columns.is_empty() {
        return StructuralOutcome::NoOp;
    }

    let editable = query_info.editable_columns();
    let anchor = after_field_key.and_then(|fk| editable.index_of(fk));
    let insert_idx = anchor.map(|i| i + 1).unwrap_or(0);

    // Schema position follows the same anchor, so cell indices and the
    // editable projection stay aligned.
    let schema_position = anchor
        .and_then(|i| editable.get(i))
        .and_then(|column| query_info.position(&column.field_key))
        .map(|p| p + 1)
        .unwrap_or(0);

    let n = new_columns.iter().filter(|c| c.is_insertable()).count();
    let shift = |key: CellKey| {
        if key.col >= insert_idx {
            Some(CellKey::new(key.col + n, key.row))
        } else {
            Some(key)
        }
    };

    let mut cell_values = reindex(&model.cell_values, shift);
    for row in 0..model.row_count {
        for col in insert_idx..insert_idx + n {
            cell_values.insert(CellKey::new(col, row), Vec::new());
        }
    }

    let delta = EditorModelDelta {
        cell_values: Some(cell_values),
        cell_messages: Some(reindex(&model.cell_messages, shift)),
        col_count: Some(model.col_count + n),
        ..EditorModelDelta::clear_selection()
    };

    let data = data.map_rows(|row| {
        let mut out = row.clone();
        for column in new_columns {
            out.entry(column.field_key.clone()).or_insert(Value::Null);
        }
        out
    });

    StructuralOutcome::Changed {
        model: delta,
        data,
        query_info: query_info.with_columns_inserted(schema_position, new_columns),
    }
}

/// Remove the column `field_key`. Cells to its right shift left by one.
pub fn remove_column(
    model: &EditorModel,
    query_info: &QueryInfo,
    data: &GridData,
    field_key: &str,
) -> StructuralOutcome {
    let Some(delete_idx) = query_info.editable_columns().index_of(field_key) else {
        log::debug!("remove_column: '{}' is not an editable column", field_key);
        return StructuralOutcome::NoOp;
    };

    let shift = |key: CellKey| match key.col.cmp(&delete_idx) {
        std::cmp::Ordering::Less => Some(key),
        std::cmp::Ordering::Equal => None,
        std::cmp::Ordering::Greater => Some(CellKey::new(key.col - 1, key.row)),
    };

    let delta = EditorModelDelta {
        cell_values: Some(reindex(&model.cell_values, shift)),
        cell_messages: Some(reindex(&model.cell_messages, shift)),
        col_count: Some(model.col_count.saturating_sub(1)),
        ..EditorModelDelta::clear_selection()
    };

    let data = data.map_rows(|row| {
        row.iter()
            .filter(|(k, _)| !k.eq_ignore_ascii_case(field_key))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    });

    StructuralOutcome::Changed {
        model: delta,
        data,
        query_info: query_info.with_column_removed(field_key),
    }
}
