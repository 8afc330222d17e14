//! Query schema: the ordered column list a grid is bound to.
//!
//! Field keys are matched case-insensitively everywhere. Cell column indices
//! are positions in [`EditableColumns`], the insertable projection of the
//! schema, which is computed once per schema snapshot.

use serde::{Deserialize, Serialize};

/// Where a lookup column's values come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupInfo {
    pub schema_name: String,
    pub query_name: String,
    /// Column holding the stored (raw) value.
    pub key_column: String,
    /// Column shown to the user.
    pub display_column: String,
    #[serde(default)]
    pub container_path: Option<String>,
    /// Lookups into non-public queries cannot be resolved by display text.
    #[serde(default = "default_true")]
    pub is_public: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryColumn {
    pub field_key: String,
    pub caption: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub key_field: bool,
    #[serde(default)]
    pub lookup: Option<LookupInfo>,
    #[serde(default)]
    pub multi_value: bool,
    #[serde(default)]
    pub file_input: bool,
    #[serde(default = "default_true")]
    pub shown_in_insert_view: bool,
}

impl QueryColumn {
    pub fn new(field_key: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            field_key: field_key.into(),
            caption: caption.into(),
            required: false,
            read_only: false,
            key_field: false,
            lookup: None,
            multi_value: false,
            file_input: false,
            shown_in_insert_view: true,
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_key_field(mut self, key_field: bool) -> Self {
        self.key_field = key_field;
        self
    }

    pub fn with_lookup(mut self, lookup: LookupInfo) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn with_multi_value(mut self, multi_value: bool) -> Self {
        self.multi_value = multi_value;
        self
    }

    pub fn with_file_input(mut self, file_input: bool) -> Self {
        self.file_input = file_input;
        self
    }

    /// Editable in the grid: shown in the insert view and not a file upload.
    pub fn is_insertable(&self) -> bool {
        self.shown_in_insert_view && !self.file_input
    }

    pub fn is_public_lookup(&self) -> bool {
        self.lookup.as_ref().is_some_and(|l| l.is_public)
    }

    pub fn matches(&self, field_key: &str) -> bool {
        self.field_key.eq_ignore_ascii_case(field_key)
    }
}

/// Schema snapshot. Structural edits return a new snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryInfo {
    pub columns: Vec<QueryColumn>,
    /// Primary key field keys.
    #[serde(default)]
    pub pk_cols: Vec<String>,
}

impl QueryInfo {
    pub fn new(columns: Vec<QueryColumn>, pk_cols: Vec<String>) -> Self {
        Self { columns, pk_cols }
    }

    pub fn column(&self, field_key: &str) -> Option<&QueryColumn> {
        self.columns.iter().find(|c| c.matches(field_key))
    }

    /// Position in the full column list.
    pub fn position(&self, field_key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.matches(field_key))
    }

    pub fn editable_columns(&self) -> EditableColumns {
        EditableColumns {
            columns: self.columns.iter().filter(|c| c.is_insertable()).cloned().collect(),
        }
    }

    /// The single primary key field, if there is exactly one.
    ///
    /// Row-level read-only and delete checks only support single-column keys;
    /// with a composite key they fall back to their conservative default.
    pub fn single_pk(&self) -> Option<&str> {
        match self.pk_cols.as_slice() {
            [pk] => Some(pk.as_str()),
            [] => None,
            _ => {
                log::warn!(
                    "composite primary key ({}) is not supported for row-level checks",
                    self.pk_cols.join(", ")
                );
                None
            }
        }
    }

    pub fn with_columns_inserted(&self, position: usize, new_columns: &[QueryColumn]) -> Self {
        let mut columns = self.columns.clone();
        let position = position.min(columns.len());
        columns.splice(position..position, new_columns.iter().cloned());
        Self { columns, pk_cols: self.pk_cols.clone() }
    }

    pub fn with_column_removed(&self, field_key: &str) -> Self {
        let columns = self.columns.iter().filter(|c| !c.matches(field_key)).cloned().collect();
        Self { columns, pk_cols: self.pk_cols.clone() }
    }

    pub fn with_column_replaced(&self, field_key: &str, new_column: &QueryColumn) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|c| if c.matches(field_key) { new_column.clone() } else { c.clone() })
            .collect();
        Self { columns, pk_cols: self.pk_cols.clone() }
    }
}

/// The insertable columns of a schema, in schema order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditableColumns {
    columns: Vec<QueryColumn>,
}

impl EditableColumns {
    pub fn index_of(&self, field_key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.matches(field_key))
    }

    pub fn get(&self, idx: usize) -> Option<&QueryColumn> {
        self.columns.get(idx)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryColumn> {
        self.columns.iter()
    }
}
