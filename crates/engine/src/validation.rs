//! Data validation before save.
//!
//! Scans every row once for required cells left empty and for duplicate
//! values in the key columns or a designated unique column. Failures are
//! reported, never enforced: data entry is not blocked.
//!
//! ## Case Sensitivity
//!
//! - **Key columns**: case-sensitive. "A1" and "a1" are different keys.
//! - **Unique column**: case-insensitive and trimmed.

use std::collections::BTreeMap;

use gridedit_core::{is_empty_cell, ValueDescriptor};

use crate::model::EditorModel;
use crate::schema::{EditableColumns, QueryColumn};

/// Validation findings. Row numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    /// Column caption -> rows with no usable value.
    pub missing_required: BTreeMap<String, Vec<usize>>,
    /// Label -> duplicated value -> rows holding it.
    pub unique_key_violations: BTreeMap<String, BTreeMap<String, Vec<usize>>>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.missing_required.is_empty() && self.unique_key_violations.is_empty()
    }

    /// One line per missing-value group and per duplicated value.
    pub fn messages(&self) -> Vec<String> {
        let missing = self.missing_required.iter().map(|(caption, rows)| {
            format!("{} is required. Missing value in row(s): {}.", caption, join_rows(rows))
        });
        let duplicates = self.unique_key_violations.iter().flat_map(|(label, groups)| {
            groups.iter().map(move |(value, rows)| {
                format!("Duplicate value ({}) for {} in row(s): {}.", value, label, join_rows(rows))
            })
        });
        missing.chain(duplicates).collect()
    }
}

fn join_rows(rows: &[usize]) -> String {
    rows.iter().map(usize::to_string).collect::<Vec<_>>().join(", ")
}

fn cell_raw_text(values: &[ValueDescriptor]) -> String {
    values
        .iter()
        .map(|v| v.raw_text().trim().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Validate every row of `model`.
///
/// `key_columns` are the key fields in key order; a unique column that is also
/// a key field is not checked separately.
pub fn validate_data(
    model: &EditorModel,
    columns: &EditableColumns,
    key_columns: &[QueryColumn],
    unique_field_key: Option<&str>,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    let key_indices: Vec<usize> = key_columns
        .iter()
        .filter(|c| c.key_field)
        .filter_map(|c| columns.index_of(&c.field_key))
        .collect();
    let key_label = key_indices
        .iter()
        .filter_map(|&i| columns.get(i))
        .map(|c| c.caption.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let unique = unique_field_key.and_then(|fk| {
        let idx = columns.index_of(fk)?;
        let column = columns.get(idx)?;
        (!column.key_field).then_some((idx, column))
    });

    let mut key_groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    let mut unique_groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();

    for row in 0..model.row_count {
        let row_number = row + 1;

        for (col, column) in columns.iter().enumerate() {
            if column.required && is_empty_cell(model.get_value(col, row)) {
                report
                    .missing_required
                    .entry(column.caption.clone())
                    .or_default()
                    .push(row_number);
            }
        }

        if !key_indices.is_empty() {
            let parts: Vec<String> =
                key_indices.iter().map(|&col| cell_raw_text(model.get_value(col, row))).collect();
            if parts.iter().any(|p| !p.is_empty()) {
                key_groups.entry(parts.join(", ")).or_default().push(row_number);
            }
        }

        if let Some((col, _)) = unique {
            let value = cell_raw_text(model.get_value(col, row)).to_lowercase();
            if !value.is_empty() {
                unique_groups.entry(value).or_default().push(row_number);
            }
        }
    }

    let duplicates = |groups: BTreeMap<String, Vec<usize>>| -> BTreeMap<String, Vec<usize>> {
        groups.into_iter().filter(|(_, rows)| rows.len() > 1).collect()
    };

    let key_duplicates = duplicates(key_groups);
    if !key_duplicates.is_empty() {
        report.unique_key_violations.insert(key_label, key_duplicates);
    }
    if let Some((_, column)) = unique {
        let unique_duplicates = duplicates(unique_groups);
        if !unique_duplicates.is_empty() {
            report.unique_key_violations.insert(column.caption.clone(), unique_duplicates);
        }
    }

    report
}
