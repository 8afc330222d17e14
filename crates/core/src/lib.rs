pub mod cell_key;
pub mod range;
pub mod value;

pub use cell_key::{gen_cell_key, parse_cell_key, sortable_index, sorted_cell_keys, CellKey, CellKeyError};
pub use range::CellRange;
pub use value::{is_empty_cell, value_text, CellMessage, ValueDescriptor};
