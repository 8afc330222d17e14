//! Selection and focus transitions.
//!
//! Contains:
//! - Single-cell selection (click / navigate)
//! - Selection extension (shift+click, drag) in ALL, AREA and SINGLE modes
//! - Focus (edit mode) enter and exit

use gridedit_core::{CellKey, CellRange, ValueDescriptor};

use crate::model::{EditorModel, EditorModelDelta, SelectionCells};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Every cell in the grid.
    All,
    /// Rectangle from the anchor to the target cell.
    Area,
    /// Add the target cell to the current selection.
    Single,
}

/// Select one cell, dropping any multi-selection and focus.
pub fn select_cell(col: usize, row: usize) -> EditorModelDelta {
    EditorModelDelta {
        selected: Some(Some(CellKey::new(col, row))),
        ..EditorModelDelta::clear_selection()
    }
}

/// Drop selection and focus entirely.
pub fn clear_selection() -> EditorModelDelta {
    EditorModelDelta::clear_selection()
}

/// Extend the selection to `(col, row)`.
///
/// The anchor, if any, is always part of the resulting selection set.
pub fn extend_selection(
    model: &EditorModel,
    col: usize,
    row: usize,
    mode: SelectionMode,
) -> EditorModelDelta {
    let mut cells: SelectionCells = match mode {
        SelectionMode::All => CellRange::grid(model.col_count, model.row_count)
            .map(|r| r.cells().collect())
            .unwrap_or_default(),
        SelectionMode::Area => match model.selected {
            Some(anchor) => CellRange::between(anchor, CellKey::new(col, row))
                .clamp(model.col_count, model.row_count)
                .map(|r| r.cells().collect())
                .unwrap_or_default(),
            None => SelectionCells::default(),
        },
        SelectionMode::Single => {
            let mut cells = model.selection_cells.clone();
            cells.insert(CellKey::new(col, row));
            cells
        }
    };

    cells.extend(model.selected);

    EditorModelDelta {
        selection_cells: Some(cells),
        ..EditorModelDelta::default()
    }
}

/// Put `(col, row)` in edit mode.
///
/// Snapshots the current value so an abandoned edit can be reverted, clears
/// the cell's message and makes the cell the selection anchor. With
/// `clear_value` the cell is blanked immediately (type-to-replace).
pub fn focus_cell(model: &EditorModel, col: usize, row: usize, clear_value: bool) -> EditorModelDelta {
    let key = CellKey::new(col, row);
    let current = model.get_value(col, row).to_vec();

    let mut cell_messages = model.cell_messages.clone();
    cell_messages.remove(&key);

    let cell_values = if clear_value {
        let mut values = model.cell_values.clone();
        values.insert(key, Vec::new());
        Some(values)
    } else {
        None
    };

    EditorModelDelta {
        cell_values,
        cell_messages: Some(cell_messages),
        selection_cells: Some(SelectionCells::default()),
        selected: Some(Some(key)),
        focus: Some(Some(key)),
        focus_value: Some(Some(current)),
        ..EditorModelDelta::default()
    }
}

/// Leave edit mode.
///
/// `Some(values)` commits the edited value; `None` abandons the edit and
/// restores the value captured when focus began.
pub fn end_focus(model: &EditorModel, commit: Option<Vec<ValueDescriptor>>) -> EditorModelDelta {
    let Some(key) = model.focus else {
        return EditorModelDelta::default();
    };

    let mut cell_values = model.cell_values.clone();
    match commit {
        Some(values) => {
            cell_values.insert(key, values);
        }
        None => match &model.focus_value {
            Some(original) => {
                cell_values.insert(key, original.clone());
            }
            None => {
                cell_values.remove(&key);
            }
        },
    }

    EditorModelDelta {
        cell_values: Some(cell_values),
        focus: Some(None),
        focus_value: Some(None),
        ..EditorModelDelta::default()
    }
}
