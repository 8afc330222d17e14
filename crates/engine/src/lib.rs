//! `gridedit-engine`: editable grid engine.
//!
//! Pure engine crate: holds the sparse cell store of a grid bound to a query,
//! and turns user gestures (selection, navigation, paste, drag fill, column
//! and row edits) into deltas over it. Remote lookups go through
//! [`LookupService`]; rendering and persistence live elsewhere.

pub mod clipboard;
pub mod decimal;
pub mod drag;
pub mod editing;
pub mod error;
pub mod fill;
pub mod grid_data;
pub mod lookup;
pub mod model;
pub mod navigation;
pub mod rows;
pub mod schema;
pub mod selection;
pub mod structure;
pub mod validation;

pub use clipboard::{copy_value, paste, PasteOptions, PasteOutcome};
pub use drag::DragCoordinator;
pub use error::EditorError;
pub use fill::{apply_fill, fill_sequence};
pub use grid_data::{GridData, Row, RowId};
pub use lookup::{LookupService, StaticLookupService};
pub use model::{EditorModel, EditorModelDelta};
pub use schema::{EditableColumns, LookupInfo, QueryColumn, QueryInfo};
pub use structure::StructuralOutcome;
pub use validation::{validate_data, ValidationReport};
