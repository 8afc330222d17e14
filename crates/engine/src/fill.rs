//! Drag fill: pattern detection and generation for the fill handle.
//!
//! - One source cell, or any non-numeric display: copy the source cycle
//! - Two or more numeric displays: extend the linear step from first to last
//!
//! Detection reads `display`, not `raw`: a lookup column whose keys are
//! numbers but whose text is not must still be copied.

use gridedit_core::{sorted_cell_keys, CellKey, ValueDescriptor};

use crate::decimal::Decimal;
use crate::model::{CellValues, EditorModel, EditorModelDelta};

// ============================================================================
// Core Types
// ============================================================================

/// Detected fill pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum FillPattern {
    /// Repeat the source cells cyclically.
    Copy,
    /// Every display is a decimal literal and at least one is not an integer.
    Float(Linear),
    /// Every display is an integer literal (exponent notation allowed).
    Int(Linear),
}

/// Linear continuation: value `i` past the source is `last + diff * (i + 1) / span`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Linear {
    pub last: Decimal,
    pub diff: Decimal,
    /// Number of steps between the first and last source value.
    pub span: usize,
}

impl Linear {
    fn new(first: Decimal, last: Decimal, count: usize) -> Option<Self> {
        Some(Self { last, diff: last.checked_sub(first)?, span: count - 1 })
    }

    /// Value at 0-based destination position `i`.
    pub fn value_at(&self, i: usize) -> Option<Decimal> {
        let offset = self
            .diff
            .checked_mul_int(i as i128 + 1)?
            .checked_div_int(self.span as i128)?;
        self.last.checked_add(offset)
    }
}

// ============================================================================
// Detection
// ============================================================================

/// Integer literal: optional sign, digits, optional exponent (`1e3`).
fn is_int_format(text: &str) -> bool {
    let text = text.trim();
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(pos) => (&text[..pos], Some(&text[pos + 1..])),
        None => (text, None),
    };
    let digits = mantissa.strip_prefix(['-', '+']).unwrap_or(mantissa);
    let exponent_ok = exponent.map_or(true, |e| {
        let e = e.strip_prefix('+').unwrap_or(e);
        !e.is_empty() && e.bytes().all(|b| b.is_ascii_digit())
    });
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) && exponent_ok
}

/// Decimal literal.
fn is_float_format(text: &str) -> bool {
    Decimal::parse(text).is_some()
}

/// Classify source displays. Float is checked first and requires that the
/// sequence is not entirely integers.
pub fn detect_pattern(displays: &[String]) -> FillPattern {
    if displays.len() < 2 {
        return FillPattern::Copy;
    }

    let linear = || {
        let first = Decimal::parse(displays.first()?)?;
        let last = Decimal::parse(displays.last()?)?;
        Linear::new(first, last, displays.len())
    };

    let all_int = displays.iter().all(|d| is_int_format(d));
    let all_float = displays.iter().all(|d| is_float_format(d));

    match (all_float && !all_int, all_int) {
        (true, _) => linear().map(FillPattern::Float).unwrap_or(FillPattern::Copy),
        (false, true) => linear().map(FillPattern::Int).unwrap_or(FillPattern::Copy),
        _ => FillPattern::Copy,
    }
}

// ============================================================================
// Generation
// ============================================================================

/// Values for `fill_selection`, continuing `init_selection`.
///
/// The source is put in grid order (column-major) first. Only destination
/// cells are in the returned map, and every destination cell is present.
pub fn fill_sequence(
    model: &EditorModel,
    init_selection: &[CellKey],
    fill_selection: &[CellKey],
) -> CellValues {
    let source = sorted_cell_keys(init_selection.iter().copied(), model.row_count);
    if source.is_empty() {
        return fill_selection.iter().map(|key| (*key, Vec::new())).collect();
    }

    let displays: Vec<String> = source
        .iter()
        .map(|key| {
            model
                .get_value(key.col, key.row)
                .first()
                .map(ValueDescriptor::display_text)
                .unwrap_or_default()
        })
        .collect();

    let linear = match detect_pattern(&displays) {
        FillPattern::Copy => None,
        FillPattern::Float(linear) | FillPattern::Int(linear) => Some(linear),
    };

    fill_selection
        .iter()
        .enumerate()
        .map(|(i, key)| {
            let values = match linear.and_then(|l| l.value_at(i)) {
                Some(value) => {
                    let n = value.to_json();
                    vec![ValueDescriptor::new(n.clone(), n)]
                }
                None => {
                    let src = source[i % source.len()];
                    model.get_value(src.col, src.row).to_vec()
                }
            };
            (*key, values)
        })
        .collect()
}

/// Apply a drag fill: write the generated values, clear messages on the
/// destination and select source plus destination.
pub fn apply_fill(
    model: &EditorModel,
    init_selection: &[CellKey],
    fill_selection: &[CellKey],
) -> EditorModelDelta {
    let filled = fill_sequence(model, init_selection, fill_selection);

    let mut cell_values = model.cell_values.clone();
    let mut cell_messages = model.cell_messages.clone();
    for (key, values) in filled {
        cell_messages.remove(&key);
        cell_values.insert(key, values);
    }

    let mut selection = model.selection_cells.clone();
    selection.extend(init_selection.iter().copied());
    selection.extend(fill_selection.iter().copied());

    EditorModelDelta {
        cell_values: Some(cell_values),
        cell_messages: Some(cell_messages),
        selection_cells: Some(selection),
        ..EditorModelDelta::default()
    }
}
