//! Clipboard operations for the editor model.
//!
//! This module contains:
//! - Copy: serialize the selection as tab/newline-delimited text
//! - Paste parse and validate phases
//! - Lookup pre-resolution for pasted display values
//! - Paste write-back (multi-cell selection and rectangular algorithms)

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};

use gridedit_config::EditorSettings;
use gridedit_core::{CellKey, CellMessage, ValueDescriptor};

use crate::error::EditorError;
use crate::grid_data::GridData;
use crate::lookup::{
    join_cell_values, parse_paste_cell_lookup, resolve_by_display, split_cell_values,
    LookupDescriptors, LookupService,
};
use crate::model::{EditorModel, EditorModelDelta, SelectionCells};
use crate::rows::add_rows_to_grid_data;
use crate::schema::{EditableColumns, QueryColumn, QueryInfo};

// ============================================================================
// Copy
// ============================================================================

/// Clipboard text for the current selection.
///
/// Only available with a selection and no cell in edit mode. Each row that has
/// a selected cell contributes one line of its selected cells' display values,
/// joined by tabs. Unselected cells contribute nothing.
pub fn copy_value(model: &EditorModel, columns: &EditableColumns) -> Option<String> {
    if !model.has_selection() || model.has_focus() {
        return None;
    }

    let selection = model.selection_keys();
    let mut out = String::new();
    for row in 0..model.row_count {
        let cells: Vec<String> = (0..columns.len())
            .filter(|&col| selection.contains(&CellKey::new(col, row)))
            .map(|col| copy_cell_text(model.get_value(col, row)))
            .collect();
        if !cells.is_empty() {
            out.push_str(&cells.join("\t"));
            out.push('\n');
        }
    }

    if out.ends_with('\n') {
        out.pop();
    }
    Some(out)
}

fn copy_cell_text(values: &[ValueDescriptor]) -> String {
    match values {
        [] => String::new(),
        [single] => single.display_text().trim().to_string(),
        many => {
            let displays: Vec<String> = many.iter().map(|v| v.display_text().trim().to_string()).collect();
            join_cell_values(displays.iter().map(String::as_str))
        }
    }
}

// ============================================================================
// Parse
// ============================================================================

/// Pasted text split into a rectangle of cell texts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PastePayload {
    pub data: Vec<Vec<String>>,
    pub num_rows: usize,
    pub num_cols: usize,
}

impl PastePayload {
    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    /// More than one row or column.
    pub fn is_block(&self) -> bool {
        self.num_rows > 1 || self.num_cols > 1
    }

    pub fn first_value(&self) -> &str {
        self.data
            .first()
            .and_then(|row| row.first())
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Split clipboard text on newlines and tabs.
///
/// One trailing newline is dropped and `\r\n` line endings are accepted.
/// Short rows are padded with empty cells to the widest row.
pub fn parse_paste(text: &str) -> PastePayload {
    let text = text.strip_suffix('\n').unwrap_or(text);
    let text = text.strip_suffix('\r').unwrap_or(text);
    if text.is_empty() {
        return PastePayload::default();
    }

    let mut data: Vec<Vec<String>> = text
        .split('\n')
        .map(|line| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            line.split('\t').map(String::from).collect()
        })
        .collect();

    let num_cols = data.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut data {
        row.resize(num_cols, String::new());
    }

    PastePayload { num_rows: data.len(), num_cols, data }
}

// ============================================================================
// Validate
// ============================================================================

/// Target rectangle of an accepted paste.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasteBounds {
    pub col_min: usize,
    pub row_min: usize,
    pub col_max: usize,
    pub row_max: usize,
    /// Rows the grid must grow by to hold every pasted row.
    pub rows_to_add: usize,
}

/// Why a paste was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteRejection {
    /// A multi-cell block onto a multi-cell selection.
    BlockOntoSelection,
    /// The block reaches past the last column.
    PastLastColumn { col_max: usize, col_count: usize },
    /// More rows than the paste cap allows.
    TooManyRows { num_rows: usize, max: usize },
}

impl fmt::Display for PasteRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlockOntoSelection => write!(
                f,
                "Unable to paste. Paste is not supported against multiple selected cells."
            ),
            Self::PastLastColumn { .. } => {
                write!(f, "Unable to paste. Cannot paste columns beyond the columns found in the grid.")
            }
            Self::TooManyRows { max, .. } => {
                write!(f, "Unable to paste. Cannot paste more than {} rows.", max)
            }
        }
    }
}

/// Check a parsed paste against the selection and grid bounds.
///
/// `read_only_row_count` is the number of read-only rows the write-back will
/// step over; each one needs an extra physical row.
pub fn validate_paste(
    model: &EditorModel,
    payload: &PastePayload,
    col_min: usize,
    row_min: usize,
    read_only_row_count: usize,
    settings: &EditorSettings,
) -> Result<PasteBounds, PasteRejection> {
    let col_max = col_min + payload.num_cols.saturating_sub(1);
    let row_max = row_min + payload.num_rows.saturating_sub(1);
    let rows_to_add = (row_min + payload.num_rows + read_only_row_count).saturating_sub(model.row_count);

    if payload.is_block() && model.has_multiple_selection() {
        return Err(PasteRejection::BlockOntoSelection);
    }
    if col_max >= model.col_count {
        return Err(PasteRejection::PastLastColumn { col_max, col_count: model.col_count });
    }
    if payload.num_rows > settings.max_paste_rows {
        return Err(PasteRejection::TooManyRows {
            num_rows: payload.num_rows,
            max: settings.max_paste_rows,
        });
    }

    Ok(PasteBounds { col_min, row_min, col_max, row_max, rows_to_add })
}

/// Rows that receive each pasted row, starting at `row_min` and stepping over
/// rows whose primary key is in `readonly_rows`.
///
/// Read-only skipping needs a single-column primary key; with a composite key
/// no row is skipped.
pub fn paste_target_rows(
    data: &GridData,
    query_info: &QueryInfo,
    readonly_rows: &FxHashSet<String>,
    row_min: usize,
    num_rows: usize,
) -> Vec<usize> {
    let pk = if readonly_rows.is_empty() { None } else { query_info.single_pk() };

    let mut rows = Vec::with_capacity(num_rows);
    let mut row_idx = row_min;
    for _ in 0..num_rows {
        if let Some(pk) = pk {
            while data.is_read_only_row(row_idx, pk, readonly_rows) {
                row_idx += 1;
            }
        }
        rows.push(row_idx);
        row_idx += 1;
    }
    rows
}

// ============================================================================
// Write-back
// ============================================================================

/// Caller-supplied paste context.
#[derive(Debug, Clone, Default)]
pub struct PasteOptions {
    /// Per lookup column (by field key), the display values a paste may
    /// resolve against. Replaces the pasted tokens as lookup candidates.
    pub filtered_lookup_values: FxHashMap<String, Vec<String>>,
    /// Primary key values of rows a paste must step over.
    pub readonly_rows: FxHashSet<String>,
    /// Never grow the grid; rows past the end are dropped.
    pub lock_row_count: bool,
}

impl PasteOptions {
    pub fn new(settings: &EditorSettings) -> Self {
        Self { lock_row_count: settings.lock_row_count, ..Self::default() }
    }

    pub fn with_filtered_lookup_values(mut self, field_key: impl Into<String>, values: Vec<String>) -> Self {
        self.filtered_lookup_values.insert(field_key.into(), values);
        self
    }

    pub fn with_readonly_rows<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.readonly_rows.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_lock_row_count(mut self, lock: bool) -> Self {
        self.lock_row_count = lock;
        self
    }

    fn allowlist(&self, column: &QueryColumn) -> Option<&Vec<String>> {
        self.filtered_lookup_values
            .iter()
            .find(|(field_key, _)| column.matches(field_key))
            .map(|(_, values)| values)
    }
}

/// Result of a paste.
#[derive(Debug, Clone, PartialEq)]
pub enum PasteOutcome {
    /// Nothing to paste, or no paste target.
    NoOp,
    /// Refused; the delta only carries the message at the paste anchor.
    Rejected { model: EditorModelDelta },
    /// Written. `data` is set when rows were appended.
    Applied { model: EditorModelDelta, data: Option<GridData> },
}

/// Write a validated payload into the model.
///
/// With a multi-cell selection the first pasted value goes into every
/// selected cell. Otherwise pasted row `i` lands on `target_rows[i]`; with
/// `lock_row_count` set, rows at or past the current row count are dropped.
/// Read-only columns are never written but still join the new selection.
#[allow(clippy::too_many_arguments)]
pub fn paste_cell_load(
    model: &EditorModel,
    columns: &EditableColumns,
    payload: &PastePayload,
    bounds: &PasteBounds,
    target_rows: &[usize],
    descriptors: &LookupDescriptors,
    lock_row_count: bool,
    message_limit: usize,
) -> EditorModelDelta {
    let mut cell_values = model.cell_values.clone();
    let mut cell_messages = model.cell_messages.clone();
    let mut selection = SelectionCells::default();

    let mut write = |key: CellKey, text: &str| {
        selection.insert(key);
        let Some(column) = columns.get(key.col) else { return };
        if column.read_only {
            return;
        }
        let (values, message) = cell_from_text(column, text, descriptors, message_limit);
        cell_values.insert(key, values);
        match message {
            Some(message) => cell_messages.insert(key, message),
            None => cell_messages.remove(&key),
        };
    };

    let row_count = if model.has_multiple_selection() {
        let text = payload.first_value();
        for key in model.selection_keys() {
            write(key, text);
        }
        model.row_count
    } else {
        for (pasted, &row) in payload.data.iter().zip(target_rows) {
            if lock_row_count && row >= model.row_count {
                log::debug!("paste: row limit {} reached, dropping remaining rows", model.row_count);
                break;
            }
            for (offset, text) in pasted.iter().enumerate() {
                write(CellKey::new(bounds.col_min + offset, row), text);
            }
        }
        if lock_row_count {
            model.row_count
        } else {
            model.row_count + bounds.rows_to_add
        }
    };

    EditorModelDelta {
        cell_values: Some(cell_values),
        cell_messages: Some(cell_messages),
        row_count: Some(row_count),
        selection_cells: Some(selection),
        ..EditorModelDelta::default()
    }
}

fn cell_from_text(
    column: &QueryColumn,
    text: &str,
    descriptors: &LookupDescriptors,
    message_limit: usize,
) -> (Vec<ValueDescriptor>, Option<CellMessage>) {
    if column.is_public_lookup() {
        let resolved = descriptors.get(&column.field_key).map(Vec::as_slice).unwrap_or(&[]);
        parse_paste_cell_lookup(resolved, text, message_limit)
    } else {
        (vec![ValueDescriptor::literal(text)], None)
    }
}

/// Resolve display candidates for every public lookup column the paste
/// touches, or that has an allowlist.
async fn resolve_paste_lookups(
    service: &dyn LookupService,
    model: &EditorModel,
    columns: &EditableColumns,
    payload: &PastePayload,
    bounds: &PasteBounds,
    options: &PasteOptions,
) -> Result<LookupDescriptors, EditorError> {
    let multi = model.has_multiple_selection();
    let selected_cols: FxHashSet<usize> = if multi {
        model.selection_keys().iter().map(|k| k.col).collect()
    } else {
        FxHashSet::default()
    };

    let mut requests = Vec::new();
    for (idx, column) in columns.iter().enumerate() {
        if !column.is_public_lookup() {
            continue;
        }
        let in_range = if multi {
            selected_cols.contains(&idx)
        } else {
            (bounds.col_min..=bounds.col_max).contains(&idx)
        };
        let candidates = match options.allowlist(column) {
            Some(values) => values.clone(),
            None if in_range && multi => split_cell_values(payload.first_value()),
            None if in_range => pasted_tokens(payload, idx - bounds.col_min),
            None => continue,
        };
        requests.push((column, candidates));
    }

    resolve_by_display(service, &requests).await
}

/// Distinct lookup tokens pasted into one payload column.
fn pasted_tokens(payload: &PastePayload, offset: usize) -> Vec<String> {
    let mut seen = FxHashSet::default();
    payload
        .data
        .iter()
        .filter_map(|row| row.get(offset))
        .flat_map(|text| split_cell_values(text))
        .filter(|token| seen.insert(token.to_lowercase()))
        .collect()
}

/// Paste clipboard text at the current selection.
///
/// Lookup values are resolved before anything is written. A rejected paste
/// leaves cell values untouched and puts a message on the anchor cell.
pub async fn paste(
    service: &dyn LookupService,
    model: &EditorModel,
    data: &GridData,
    query_info: &QueryInfo,
    text: &str,
    options: &PasteOptions,
    settings: &EditorSettings,
) -> Result<PasteOutcome, EditorError> {
    if model.has_focus() {
        return Ok(PasteOutcome::NoOp);
    }
    let Some(anchor) = model.selected else {
        return Ok(PasteOutcome::NoOp);
    };
    let payload = parse_paste(text);
    if payload.is_empty() {
        return Ok(PasteOutcome::NoOp);
    }

    let target_rows = if model.has_multiple_selection() {
        Vec::new()
    } else {
        paste_target_rows(data, query_info, &options.readonly_rows, anchor.row, payload.num_rows)
    };
    let skipped = target_rows
        .last()
        .map(|last| last + 1 - anchor.row - payload.num_rows)
        .unwrap_or(0);

    let bounds = match validate_paste(model, &payload, anchor.col, anchor.row, skipped, settings) {
        Ok(bounds) => bounds,
        Err(rejection) => {
            log::debug!("paste rejected at {}: {:?}", anchor, rejection);
            let mut cell_messages = model.cell_messages.clone();
            cell_messages.insert(anchor, CellMessage::new(rejection.to_string()));
            return Ok(PasteOutcome::Rejected {
                model: EditorModelDelta { cell_messages: Some(cell_messages), ..EditorModelDelta::default() },
            });
        }
    };

    let columns = query_info.editable_columns();
    let descriptors = resolve_paste_lookups(service, model, &columns, &payload, &bounds, options).await?;

    let data = (bounds.rows_to_add > 0 && !options.lock_row_count)
        .then(|| add_rows_to_grid_data(data, bounds.rows_to_add, None));
    let delta = paste_cell_load(
        model,
        &columns,
        &payload,
        &bounds,
        &target_rows,
        &descriptors,
        options.lock_row_count,
        settings.lookup_message_limit,
    );

    Ok(PasteOutcome::Applied { model: delta, data })
}
