//! Lookup value resolution.
//!
//! Lookup columns store a foreign key (`raw`) and show text from another query
//! (`display`). Resolving pasted text or template keys needs the remote query
//! service, which is reached through the [`LookupService`] trait. All requests
//! of one operation are issued together and awaited as a group before any
//! cell is written.

use futures_util::future::{try_join_all, LocalBoxFuture};
use rustc_hash::FxHashMap;
use serde_json::Value;

use gridedit_core::{value_text, CellMessage, ValueDescriptor};

use crate::error::EditorError;
use crate::schema::{LookupInfo, QueryColumn};

/// Resolved descriptors per lookup column, keyed by field key.
pub type LookupDescriptors = FxHashMap<String, Vec<ValueDescriptor>>;

/// Remote lookup query service.
pub trait LookupService {
    /// Rows of the lookup query whose display column matches one of `displays`.
    fn find_by_display<'a>(
        &'a self,
        lookup: &'a LookupInfo,
        displays: &'a [String],
    ) -> LocalBoxFuture<'a, Result<Vec<ValueDescriptor>, EditorError>>;

    /// Rows of the lookup query whose key column matches one of `raws`.
    fn find_by_raw<'a>(
        &'a self,
        lookup: &'a LookupInfo,
        raws: &'a [Value],
    ) -> LocalBoxFuture<'a, Result<Vec<ValueDescriptor>, EditorError>>;
}

/// In-memory lookup service over fixed descriptor lists, keyed by
/// `"<schema>.<query>"`.
///
/// For embedders whose lookup tables are preloaded or small enough to ship
/// with the grid, and for running the editor offline. Matching follows the
/// remote contract: display matches are trimmed and case-insensitive, raw
/// matches compare value text.
#[derive(Debug, Clone, Default)]
pub struct StaticLookupService {
    tables: FxHashMap<String, Vec<ValueDescriptor>>,
}

impl StaticLookupService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, schema: &str, query: &str, values: Vec<ValueDescriptor>) -> Self {
        self.tables.insert(format!("{}.{}", schema, query), values);
        self
    }

    fn table(&self, lookup: &LookupInfo) -> &[ValueDescriptor] {
        self.tables
            .get(&format!("{}.{}", lookup.schema_name, lookup.query_name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl LookupService for StaticLookupService {
    fn find_by_display<'a>(
        &'a self,
        lookup: &'a LookupInfo,
        displays: &'a [String],
    ) -> LocalBoxFuture<'a, Result<Vec<ValueDescriptor>, EditorError>> {
        Box::pin(async move {
            let wanted: Vec<String> = displays.iter().map(|d| normalize(d)).collect();
            Ok(self
                .table(lookup)
                .iter()
                .filter(|v| wanted.contains(&normalize(&v.display_text())))
                .cloned()
                .collect())
        })
    }

    fn find_by_raw<'a>(
        &'a self,
        lookup: &'a LookupInfo,
        raws: &'a [Value],
    ) -> LocalBoxFuture<'a, Result<Vec<ValueDescriptor>, EditorError>> {
        Box::pin(async move {
            let wanted: Vec<String> = raws.iter().map(value_text).collect();
            Ok(self
                .table(lookup)
                .iter()
                .filter(|v| wanted.contains(&v.raw_text()))
                .cloned()
                .collect())
        })
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Resolve display candidates for several lookup columns concurrently.
///
/// Columns without a lookup descriptor are an error; columns with no
/// candidates are skipped.
pub async fn resolve_by_display(
    service: &dyn LookupService,
    requests: &[(&QueryColumn, Vec<String>)],
) -> Result<LookupDescriptors, EditorError> {
    let futures = requests
        .iter()
        .filter(|(_, candidates)| !candidates.is_empty())
        .map(|(column, candidates)| async move {
            let lookup = column
                .lookup
                .as_ref()
                .ok_or_else(|| EditorError::NotALookup(column.field_key.clone()))?;
            let found = service.find_by_display(lookup, candidates).await?;
            Ok::<_, EditorError>((column.field_key.clone(), found))
        });
    Ok(try_join_all(futures).await?.into_iter().collect())
}

/// Resolve raw keys for several lookup columns concurrently.
pub async fn resolve_by_raw(
    service: &dyn LookupService,
    requests: &[(&QueryColumn, Vec<Value>)],
) -> Result<LookupDescriptors, EditorError> {
    let futures = requests
        .iter()
        .filter(|(_, raws)| !raws.is_empty())
        .map(|(column, raws)| async move {
            let lookup = column
                .lookup
                .as_ref()
                .ok_or_else(|| EditorError::NotALookup(column.field_key.clone()))?;
            let found = service.find_by_raw(lookup, raws).await?;
            Ok::<_, EditorError>((column.field_key.clone(), found))
        });
    Ok(try_join_all(futures).await?.into_iter().collect())
}

/// Split one cell's text into comma-separated values.
///
/// Quoted segments may contain commas; quotes are removed and every value is
/// trimmed. Empty values are dropped.
pub fn split_cell_values(text: &str) -> Vec<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut values = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) => values.extend(
                record.iter().map(str::trim).filter(|v| !v.is_empty()).map(String::from),
            ),
            Err(e) => {
                log::debug!("unparseable cell text {:?}: {}", text, e);
                values.extend(
                    text.split(',').map(str::trim).filter(|v| !v.is_empty()).map(String::from),
                );
                break;
            }
        }
    }
    values
}

/// Join display values into one cell's text, quoting values that contain a
/// comma or a quote.
pub fn join_cell_values<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    let record: Vec<&str> = values.into_iter().collect();
    if writer.write_record(&record).is_err() {
        return record.join(",");
    }
    match writer.into_inner() {
        Ok(bytes) => String::from_utf8_lossy(&bytes).trim_end_matches('\n').to_string(),
        Err(_) => record.join(","),
    }
}

/// Message listing lookup values that could not be resolved.
pub fn unmatched_message(unmatched: &[String], limit: usize) -> String {
    let listed: Vec<String> = unmatched.iter().take(limit).map(|v| format!("\"{}\"", v)).collect();
    format!("Could not find data for {}", listed.join(", "))
}

/// Match a pasted cell's text against resolved lookup descriptors.
///
/// Every comma-separated value is matched case-insensitively on display
/// text. If any value has no match the whole text is kept as a literal and a
/// message lists the misses.
pub fn parse_paste_cell_lookup(
    descriptors: &[ValueDescriptor],
    text: &str,
    message_limit: usize,
) -> (Vec<ValueDescriptor>, Option<CellMessage>) {
    let tokens = split_cell_values(text);
    let mut matched = Vec::with_capacity(tokens.len());
    let mut unmatched = Vec::new();

    for token in tokens {
        let wanted = normalize(&token);
        match descriptors.iter().find(|d| normalize(&d.display_text()) == wanted) {
            Some(d) => matched.push(d.clone()),
            None => unmatched.push(token),
        }
    }

    if unmatched.is_empty() {
        (matched, None)
    } else {
        (
            vec![ValueDescriptor::literal(text)],
            Some(CellMessage::new(unmatched_message(&unmatched, message_limit))),
        )
    }
}
