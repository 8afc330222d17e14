//! The editor model: sparse cell store plus selection and focus state.
//!
//! An `EditorModel` is never mutated by the engine. Every operation returns an
//! [`EditorModelDelta`] and the owner of the model applies it with
//! [`EditorModel::merge`].

use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;

use gridedit_core::{is_empty_cell, CellKey, CellMessage, ValueDescriptor};

use crate::grid_data::{GridData, Row, RowId};
use crate::schema::EditableColumns;

pub type CellValues = FxHashMap<CellKey, Vec<ValueDescriptor>>;
pub type CellMessages = FxHashMap<CellKey, CellMessage>;
pub type SelectionCells = FxHashSet<CellKey>;

#[derive(Debug, Clone, PartialEq)]
pub struct EditorModel {
    /// Distinguishes grid instances (drag bookkeeping).
    pub id: String,
    pub cell_values: CellValues,
    pub cell_messages: CellMessages,
    pub col_count: usize,
    pub row_count: usize,
    /// Single-cell selection anchor.
    pub selected: Option<CellKey>,
    /// Cell in edit mode.
    pub focus: Option<CellKey>,
    /// Value of the focused cell when editing began.
    pub focus_value: Option<Vec<ValueDescriptor>>,
    /// Multi-cell selection. May be empty while `selected` is set.
    pub selection_cells: SelectionCells,
    /// Rows removed since the last save.
    pub deleted_ids: FxHashSet<RowId>,
}

impl EditorModel {
    pub fn new(id: impl Into<String>, col_count: usize, row_count: usize) -> Self {
        Self {
            id: id.into(),
            cell_values: CellValues::default(),
            cell_messages: CellMessages::default(),
            col_count,
            row_count,
            selected: None,
            focus: None,
            focus_value: None,
            selection_cells: SelectionCells::default(),
            deleted_ids: FxHashSet::default(),
        }
    }

    /// Build a model holding the values of `data` for every editable column.
    ///
    /// A field value may be a plain value, an array (multi-value cell) or an
    /// object `{"value": .., "displayValue": ..}` carrying a display form.
    pub fn from_grid_data(id: impl Into<String>, data: &GridData, columns: &EditableColumns) -> Self {
        let mut model = Self::new(id, columns.len(), data.row_count());
        for (row_idx, row_id) in data.data_keys.iter().enumerate() {
            let Some(row) = data.data.get(row_id) else { continue };
            for (col_idx, column) in columns.iter().enumerate() {
                let values = row
                    .iter()
                    .find(|(k, _)| column.matches(k))
                    .map(|(_, v)| descriptors_from_value(v))
                    .unwrap_or_default();
                model.cell_values.insert(CellKey::new(col_idx, row_idx), values);
            }
        }
        model
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn get_value(&self, col: usize, row: usize) -> &[ValueDescriptor] {
        self.cell_values
            .get(&CellKey::new(col, row))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn get_message(&self, col: usize, row: usize) -> Option<&CellMessage> {
        self.cell_messages.get(&CellKey::new(col, row))
    }

    pub fn has_focus(&self) -> bool {
        self.focus.is_some()
    }

    pub fn has_selection(&self) -> bool {
        self.selected.is_some()
    }

    pub fn has_multiple_selection(&self) -> bool {
        self.selection_cells.len() > 1
    }

    pub fn is_in_bounds(&self, col: usize, row: usize) -> bool {
        col < self.col_count && row < self.row_count
    }

    pub fn is_focused(&self, col: usize, row: usize) -> bool {
        self.focus == Some(CellKey::new(col, row))
    }

    pub fn is_selected(&self, col: usize, row: usize) -> bool {
        self.selected == Some(CellKey::new(col, row))
    }

    pub fn in_selection(&self, col: usize, row: usize) -> bool {
        self.selection_cells.contains(&CellKey::new(col, row))
    }

    pub fn is_cell_empty(&self, key: CellKey) -> bool {
        is_empty_cell(self.get_value(key.col, key.row))
    }

    /// Whether any cell holds a usable raw value.
    pub fn has_data(&self) -> bool {
        self.cell_values.values().any(|values| !is_empty_cell(values))
    }

    /// Removed rows that exist on the server. Placeholder rows are left out.
    pub fn deleted_ids(&self) -> Vec<RowId> {
        let mut ids: Vec<RowId> = self
            .deleted_ids
            .iter()
            .filter(|id| !id.is_placeholder())
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    /// The multi-cell selection plus the anchor.
    pub fn selection_keys(&self) -> SelectionCells {
        let mut keys = self.selection_cells.clone();
        keys.extend(self.selected);
        keys
    }

    // =========================================================================
    // Updates
    // =========================================================================

    /// Apply a delta, producing the next model.
    pub fn merge(&self, delta: EditorModelDelta) -> Self {
        Self {
            id: self.id.clone(),
            cell_values: delta.cell_values.unwrap_or_else(|| self.cell_values.clone()),
            cell_messages: delta.cell_messages.unwrap_or_else(|| self.cell_messages.clone()),
            col_count: delta.col_count.unwrap_or(self.col_count),
            row_count: delta.row_count.unwrap_or(self.row_count),
            selected: delta.selected.unwrap_or(self.selected),
            focus: delta.focus.unwrap_or(self.focus),
            focus_value: delta.focus_value.unwrap_or_else(|| self.focus_value.clone()),
            selection_cells: delta.selection_cells.unwrap_or_else(|| self.selection_cells.clone()),
            deleted_ids: delta.deleted_ids.unwrap_or_else(|| self.deleted_ids.clone()),
        }
    }

    /// Rows carrying the model's raw values, merged over the original rows.
    ///
    /// Multi-value columns produce an array; other columns the first raw value
    /// (null when empty).
    pub fn rows_from_model(&self, data: &GridData, columns: &EditableColumns) -> Vec<(RowId, Row)> {
        data.data_keys
            .iter()
            .take(self.row_count)
            .enumerate()
            .map(|(row_idx, row_id)| {
                let mut row = data.data.get(row_id).cloned().unwrap_or_default();
                for (col_idx, column) in columns.iter().enumerate() {
                    let values = self.get_value(col_idx, row_idx);
                    let raw = if column.multi_value {
                        Value::Array(values.iter().map(|v| v.raw.clone()).collect())
                    } else {
                        values.first().map(|v| v.raw.clone()).unwrap_or(Value::Null)
                    };
                    row.insert(column.field_key.clone(), raw);
                }
                (row_id.clone(), row)
            })
            .collect()
    }
}

/// Partial update of an [`EditorModel`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditorModelDelta {
    pub cell_values: Option<CellValues>,
    pub cell_messages: Option<CellMessages>,
    pub selection_cells: Option<SelectionCells>,
    pub selected: Option<Option<CellKey>>,
    pub focus: Option<Option<CellKey>>,
    pub focus_value: Option<Option<Vec<ValueDescriptor>>>,
    pub row_count: Option<usize>,
    pub col_count: Option<usize>,
    pub deleted_ids: Option<FxHashSet<RowId>>,
}

impl EditorModelDelta {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Delta that drops selection, multi-selection and focus.
    pub fn clear_selection() -> Self {
        Self {
            selection_cells: Some(SelectionCells::default()),
            selected: Some(None),
            focus: Some(None),
            focus_value: Some(None),
            ..Self::default()
        }
    }

    /// Combine with a later delta; fields set in `later` win.
    pub fn then(self, later: EditorModelDelta) -> Self {
        Self {
            cell_values: later.cell_values.or(self.cell_values),
            cell_messages: later.cell_messages.or(self.cell_messages),
            selection_cells: later.selection_cells.or(self.selection_cells),
            selected: later.selected.or(self.selected),
            focus: later.focus.or(self.focus),
            focus_value: later.focus_value.or(self.focus_value),
            row_count: later.row_count.or(self.row_count),
            col_count: later.col_count.or(self.col_count),
            deleted_ids: later.deleted_ids.or(self.deleted_ids),
        }
    }
}

fn descriptors_from_value(value: &Value) -> Vec<ValueDescriptor> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().flat_map(descriptors_from_value).collect(),
        Value::Object(obj) if obj.contains_key("value") => {
            let raw = obj.get("value").cloned().unwrap_or(Value::Null);
            let display = obj
                .get("displayValue")
                .or_else(|| obj.get("formattedValue"))
                .cloned()
                .unwrap_or_else(|| raw.clone());
            vec![ValueDescriptor { raw, display }]
        }
        other => vec![ValueDescriptor::new(other.clone(), other.clone())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{QueryColumn, QueryInfo};
    use serde_json::json;

    fn columns() -> EditableColumns {
        QueryInfo::new(
            vec![
                QueryColumn::new("Name", "Name"),
                QueryColumn::new("Tags", "Tags").with_multi_value(true),
            ],
            vec!["Id".into()],
        )
        .editable_columns()
    }

    fn data() -> GridData {
        GridData::from_rows(
            vec![
                json!({"Id": 1, "Name": "a", "Tags": [{"value": 7, "displayValue": "seven"}]})
                    .as_object()
                    .cloned()
                    .unwrap(),
                json!({"Id": 2, "Name": null, "Tags": []}).as_object().cloned().unwrap(),
            ],
            "Id",
        )
    }

    #[test]
    fn test_from_grid_data() {
        let model = EditorModel::from_grid_data("grid", &data(), &columns());
        assert_eq!(model.col_count, 2);
        assert_eq!(model.row_count, 2);
        assert_eq!(model.get_value(0, 0), &[ValueDescriptor::literal("a")]);
        assert_eq!(model.get_value(1, 0), &[ValueDescriptor::new(7, "seven")]);
        assert!(model.get_value(0, 1).is_empty());
        assert!(model.has_data());
    }

    #[test]
    fn test_state_flags() {
        let mut model = EditorModel::new("grid", 3, 3);
        assert!(!model.has_selection());
        assert!(!model.has_focus());
        model.selected = Some(CellKey::new(1, 2));
        model.selection_cells.insert(CellKey::new(0, 0));
        assert!(model.has_selection());
        assert!(model.is_selected(1, 2));
        assert!(!model.has_multiple_selection());
        assert!(model.in_selection(0, 0));
        assert_eq!(model.selection_keys().len(), 2);
        assert!(model.is_in_bounds(2, 2));
        assert!(!model.is_in_bounds(3, 0));
    }

    #[test]
    fn test_merge_leaves_original_untouched() {
        let model = EditorModel::new("grid", 2, 2);
        let mut values = CellValues::default();
        values.insert(CellKey::new(0, 0), vec![ValueDescriptor::literal("x")]);
        let delta = EditorModelDelta {
            cell_values: Some(values),
            selected: Some(Some(CellKey::new(0, 0))),
            ..Default::default()
        };
        let next = model.merge(delta);
        assert!(model.cell_values.is_empty());
        assert!(!model.has_selection());
        assert_eq!(next.get_value(0, 0), &[ValueDescriptor::literal("x")]);
        assert!(next.is_selected(0, 0));
        assert_eq!(next.row_count, 2);
    }

    #[test]
    fn test_deleted_ids_skip_placeholders() {
        let mut model = EditorModel::new("grid", 1, 1);
        model.deleted_ids.insert(RowId::Placeholder(0));
        model.deleted_ids.insert(RowId::Persisted("9".into()));
        assert_eq!(model.deleted_ids(), vec![RowId::Persisted("9".into())]);
    }

    #[test]
    fn test_rows_from_model() {
        let data = data();
        let model = EditorModel::from_grid_data("grid", &data, &columns());
        let rows = model.rows_from_model(&data, &columns());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].1["Name"], json!("a"));
        assert_eq!(rows[0].1["Tags"], json!([7]));
        assert_eq!(rows[1].1["Name"], json!(null));
        assert_eq!(rows[1].1["Id"], json!(2));
    }

    #[test]
    fn test_delta_then() {
        let a = EditorModelDelta { row_count: Some(3), col_count: Some(1), ..Default::default() };
        let b = EditorModelDelta { row_count: Some(5), ..Default::default() };
        let c = a.then(b);
        assert_eq!(c.row_count, Some(5));
        assert_eq!(c.col_count, Some(1));
        assert!(EditorModelDelta::default().is_empty());
    }
}
