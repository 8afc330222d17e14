//! Cell addressing.
//!
//! A `CellKey` identifies one grid cell by column and row. The textual form
//! `"<col>-<row>"` is what the grid hands to its collaborators and what the
//! key serializes to; inside the engine the key is a plain integer pair.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Position of a cell in the editable grid (both 0-based).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub col: usize,
    pub row: usize,
}

impl CellKey {
    #[inline]
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Total order grouping by column, then row.
    ///
    /// `row_count` must be the same value for every key being compared;
    /// a different multiplier yields a different order.
    #[inline]
    pub fn sortable_index(&self, row_count: usize) -> usize {
        self.col * row_count + self.row
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.col, self.row)
    }
}

/// A string that is not a `"<col>-<row>"` cell key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellKeyError {
    pub input: String,
}

impl fmt::Display for CellKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed cell key: {:?}", self.input)
    }
}

impl std::error::Error for CellKeyError {}

impl FromStr for CellKey {
    type Err = CellKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || CellKeyError { input: s.to_string() };
        let (col, row) = s.split_once('-').ok_or_else(err)?;
        let col = col.parse::<usize>().map_err(|_| err())?;
        let row = row.parse::<usize>().map_err(|_| err())?;
        Ok(Self { col, row })
    }
}

impl Serialize for CellKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Format a cell key as `"<col>-<row>"`.
pub fn gen_cell_key(col: usize, row: usize) -> String {
    CellKey::new(col, row).to_string()
}

/// Parse a `"<col>-<row>"` cell key.
pub fn parse_cell_key(key: &str) -> Result<CellKey, CellKeyError> {
    key.parse()
}

/// `col * row_count + row`.
pub fn sortable_index(key: &CellKey, row_count: usize) -> usize {
    key.sortable_index(row_count)
}

/// Sort keys by [`sortable_index`]. The sort is stable.
pub fn sorted_cell_keys<I>(keys: I, row_count: usize) -> Vec<CellKey>
where
    I: IntoIterator<Item = CellKey>,
{
    let mut keys: Vec<CellKey> = keys.into_iter().collect();
    keys.sort_by_key(|k| k.sortable_index(row_count));
    keys
}
