//! Keyboard navigation
//!
//! Contains:
//! - Cell movement (arrow keys)
//! - Jump navigation (Ctrl+Arrow)
//! - Row start/end (Home/End)
//!
//! Navigation only applies while a cell is selected and no cell is in edit mode.

use gridedit_core::CellKey;

use crate::model::{EditorModel, EditorModelDelta};
use crate::selection::select_cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKey {
    Arrow(Direction),
    Home,
    End,
}

/// Handle a navigation key. `jump` is Ctrl held.
///
/// Returns `None` when the key has no effect.
pub fn navigate(model: &EditorModel, key: NavigationKey, jump: bool) -> Option<EditorModelDelta> {
    if model.has_focus() {
        return None;
    }
    let anchor = model.selected?;

    let target = match key {
        NavigationKey::Home => CellKey::new(0, anchor.row),
        NavigationKey::End => CellKey::new(model.col_count.checked_sub(1)?, anchor.row),
        NavigationKey::Arrow(dir) if jump => jump_target(model, anchor, dir),
        NavigationKey::Arrow(dir) => move_target(model, anchor, dir)?,
    };

    Some(select_cell(target.col, target.row))
}

// =========================================================================
// Cell Movement
// =========================================================================

/// One step from `key`, or `None` past the top/left edge.
fn step(key: CellKey, dir: Direction) -> Option<CellKey> {
    let (dc, dr) = dir.delta();
    let col = key.col.checked_add_signed(dc)?;
    let row = key.row.checked_add_signed(dr)?;
    Some(CellKey::new(col, row))
}

/// Arrow key target. A step past the last row snaps back to the last row;
/// steps above row 0 or outside the columns are ignored.
fn move_target(model: &EditorModel, anchor: CellKey, dir: Direction) -> Option<CellKey> {
    let next = step(anchor, dir)?;
    if next.col >= model.col_count || model.row_count == 0 {
        return None;
    }
    Some(CellKey::new(next.col, next.row.min(model.row_count - 1)))
}

// =========================================================================
// Jump Navigation (Ctrl+Arrow)
// =========================================================================

/// Next non-empty cell in `dir`, or the last in-bounds cell if there is none.
fn jump_target(model: &EditorModel, anchor: CellKey, dir: Direction) -> CellKey {
    let mut last = anchor;
    let mut current = step(anchor, dir);
    while let Some(key) = current.filter(|k| model.is_in_bounds(k.col, k.row)) {
        if !model.is_cell_empty(key) {
            return key;
        }
        last = key;
        current = step(key, dir);
    }
    last
}
