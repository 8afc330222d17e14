//! Drag coordination across grid instances.
//!
//! One `DragCoordinator` is owned by the application and shared by reference
//! with every grid. Both the drag lock and the drag-handle initial selection
//! are keyed by grid id, so drags in different grids never interfere.

use rustc_hash::FxHashMap;

use gridedit_core::{sorted_cell_keys, CellKey};

use crate::model::EditorModel;

#[derive(Debug, Default)]
pub struct DragCoordinator {
    dragging: FxHashMap<String, bool>,
    initial_selection: FxHashMap<String, Vec<CellKey>>,
}

impl DragCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mouse down on a grid. The lock is only taken when no cell is in edit
    /// mode. A drag from the fill handle also records the source selection.
    ///
    /// Returns whether the lock was taken.
    pub fn begin_drag(&mut self, model: &EditorModel, from_fill_handle: bool) -> bool {
        if model.has_focus() {
            return false;
        }
        self.dragging.insert(model.id.clone(), true);
        if from_fill_handle {
            let selection = sorted_cell_keys(model.selection_keys(), model.row_count);
            self.initial_selection.insert(model.id.clone(), selection);
        } else {
            self.initial_selection.remove(&model.id);
        }
        true
    }

    /// Mouse up. Releases the lock and hands back the fill source, if any.
    pub fn end_drag(&mut self, grid_id: &str) -> Option<Vec<CellKey>> {
        self.dragging.remove(grid_id);
        self.initial_selection.remove(grid_id)
    }

    pub fn is_dragging(&self, grid_id: &str) -> bool {
        self.dragging.get(grid_id).copied().unwrap_or(false)
    }

    pub fn initial_selection(&self, grid_id: &str) -> Option<&[CellKey]> {
        self.initial_selection.get(grid_id).map(Vec::as_slice)
    }
}
