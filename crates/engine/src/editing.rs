//! Direct cell edits outside of paste and fill.
//!
//! Handles:
//! - Writing one cell (commit from an editor widget or lookup picker)
//! - Delete key on the selection

use gridedit_core::{CellKey, CellMessage, ValueDescriptor};

use crate::model::{EditorModel, EditorModelDelta};
use crate::schema::EditableColumns;

/// Write `values` into one cell. The cell's message is replaced by `message`
/// (or removed).
pub fn set_cell_values(
    model: &EditorModel,
    key: CellKey,
    values: Vec<ValueDescriptor>,
    message: Option<CellMessage>,
) -> EditorModelDelta {
    let mut cell_values = model.cell_values.clone();
    let mut cell_messages = model.cell_messages.clone();

    cell_values.insert(key, values);
    match message {
        Some(message) => cell_messages.insert(key, message),
        None => cell_messages.remove(&key),
    };

    EditorModelDelta {
        cell_values: Some(cell_values),
        cell_messages: Some(cell_messages),
        ..EditorModelDelta::default()
    }
}

/// Blank every selected cell outside read-only columns.
///
/// Does nothing while a cell is in edit mode; the key goes to the editor.
pub fn clear_selected_cells(model: &EditorModel, columns: &EditableColumns) -> EditorModelDelta {
    if model.has_focus() {
        return EditorModelDelta::default();
    }

    let mut cell_values = model.cell_values.clone();
    let mut cell_messages = model.cell_messages.clone();
    let mut cleared = 0;

    for key in model.selection_keys() {
        match columns.get(key.col) {
            Some(column) if !column.read_only && key.row < model.row_count => {
                cell_values.insert(key, Vec::new());
                cell_messages.remove(&key);
                cleared += 1;
            }
            _ => {}
        }
    }

    if cleared == 0 {
        return EditorModelDelta::default();
    }
    EditorModelDelta {
        cell_values: Some(cell_values),
        cell_messages: Some(cell_messages),
        ..EditorModelDelta::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{QueryColumn, QueryInfo};
    use crate::selection::{extend_selection, focus_cell, select_cell, SelectionMode};

    fn setup() -> (EditorModel, EditableColumns) {
        let columns = QueryInfo::new(
            vec![QueryColumn::new("A", "A"), QueryColumn::new("B", "B").with_read_only(true)],
            vec![],
        )
        .editable_columns();
        let mut model = EditorModel::new("grid", 2, 2);
        for col in 0..2 {
            for row in 0..2 {
                model
                    .cell_values
                    .insert(CellKey::new(col, row), vec![ValueDescriptor::literal(format!("{col}{row}"))]);
            }
        }
        (model, columns)
    }

    #[test]
    fn test_set_cell_values_replaces_message() {
        let (model, _) = setup();
        let key = CellKey::new(0, 1);
        let next = model.merge(set_cell_values(
            &model,
            key,
            vec![ValueDescriptor::literal("x")],
            Some(CellMessage::new("bad")),
        ));
        assert_eq!(next.get_value(0, 1), &[ValueDescriptor::literal("x")]);
        assert_eq!(next.get_message(0, 1), Some(&CellMessage::new("bad")));

        let cleared = next.merge(set_cell_values(&next, key, vec![], None));
        assert!(cleared.get_message(0, 1).is_none());
        assert!(cleared.get_value(0, 1).is_empty());
    }

    #[test]
    fn test_clear_selected_cells_skips_read_only() {
        let (model, columns) = setup();
        let m = model.merge(select_cell(0, 0));
        let m = m.merge(extend_selection(&m, 1, 1, SelectionMode::Area));
        let next = m.merge(clear_selected_cells(&m, &columns));
        assert!(next.get_value(0, 0).is_empty());
        assert!(next.get_value(0, 1).is_empty());
        assert_eq!(next.get_value(1, 0), &[ValueDescriptor::literal("10")]);
        assert_eq!(next.selection_cells.len(), 4);
    }

    #[test]
    fn test_clear_ignored_while_focused() {
        let (model, columns) = setup();
        let m = model.merge(select_cell(0, 0));
        let focused = m.merge(focus_cell(&m, 0, 0, false));
        assert!(clear_selected_cells(&focused, &columns).is_empty());
        assert!(clear_selected_cells(&model, &columns).is_empty());
    }
}
