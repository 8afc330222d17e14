use crate::cell_key::CellKey;

/// A rectangular block of cells, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start_col: usize,
    pub start_row: usize,
    pub end_col: usize,
    pub end_row: usize,
}

impl CellRange {
    /// Create a new range, automatically normalizing so start <= end.
    pub fn new(c1: usize, r1: usize, c2: usize, r2: usize) -> Self {
        Self {
            start_col: c1.min(c2),
            start_row: r1.min(r2),
            end_col: c1.max(c2),
            end_row: r1.max(r2),
        }
    }

    /// Range spanning two cells.
    pub fn between(a: CellKey, b: CellKey) -> Self {
        Self::new(a.col, a.row, b.col, b.row)
    }

    /// The whole `col_count x row_count` grid, or `None` when it has no cells.
    pub fn grid(col_count: usize, row_count: usize) -> Option<Self> {
        if col_count == 0 || row_count == 0 {
            return None;
        }
        Some(Self::new(0, 0, col_count - 1, row_count - 1))
    }

    /// Clamp to a `col_count x row_count` grid. `None` if nothing is left.
    pub fn clamp(&self, col_count: usize, row_count: usize) -> Option<Self> {
        if self.start_col >= col_count || self.start_row >= row_count {
            return None;
        }
        Some(Self {
            start_col: self.start_col,
            start_row: self.start_row,
            end_col: self.end_col.min(col_count - 1),
            end_row: self.end_row.min(row_count - 1),
        })
    }

    /// Iterate over all cells, column by column.
    pub fn cells(&self) -> impl Iterator<Item = CellKey> {
        let (start_row, end_row) = (self.start_row, self.end_row);
        (self.start_col..=self.end_col)
            .flat_map(move |c| (start_row..=end_row).map(move |r| CellKey::new(c, r)))
    }
}
