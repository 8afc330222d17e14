//! Row structural operations: add rows (optionally per pivot value), bulk
//! update and remove rows.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use serde_json::Value;

use gridedit_core::{value_text, CellKey, ValueDescriptor};

use crate::error::EditorError;
use crate::grid_data::{GridData, Row, RowId};
use crate::lookup::{resolve_by_raw, LookupService};
use crate::model::{EditorModel, EditorModelDelta, SelectionCells};
use crate::schema::EditableColumns;
use crate::structure::reindex;

/// Append `count` placeholder rows, each a copy of `template` (or empty).
pub fn add_rows_to_grid_data(data: &GridData, count: usize, template: Option<&Row>) -> GridData {
    let mut data = data.clone();
    for _ in 0..count {
        let id = data.next_placeholder_id();
        data.data_keys.push(id.clone());
        data.data.insert(id, template.cloned().unwrap_or_default());
    }
    data
}

/// Write `template` into `num_to_add` rows starting at `row_offset`.
///
/// Every editable column of every new row gets a cell (empty when the template
/// has no value for it). Lookup columns are resolved by raw key before
/// anything is written. The new cells become the selection.
pub async fn add_rows_to_editor_model(
    service: &dyn LookupService,
    model: &EditorModel,
    columns: &EditableColumns,
    template: &Row,
    num_to_add: usize,
    row_offset: usize,
) -> Result<EditorModelDelta, EditorError> {
    let template_values = template_descriptors(service, columns, template).await?;

    let mut cell_values = model.cell_values.clone();
    let mut cell_messages = model.cell_messages.clone();
    let mut selection = SelectionCells::default();

    for row in row_offset..row_offset + num_to_add {
        for (col, values) in template_values.iter().enumerate() {
            let key = CellKey::new(col, row);
            cell_values.insert(key, values.clone().unwrap_or_default());
            cell_messages.remove(&key);
            selection.insert(key);
        }
    }

    Ok(EditorModelDelta {
        cell_values: Some(cell_values),
        cell_messages: Some(cell_messages),
        row_count: Some((row_offset + num_to_add).max(model.row_count)),
        selection_cells: Some(selection),
        ..EditorModelDelta::default()
    })
}

/// Add `num_per_pivot` rows for each of `pivot_values`, writing the pivot
/// value into `pivot_field` of each block.
///
/// Blocks are appended one after another; each depends on the row count left
/// by the previous one.
pub async fn add_rows_per_pivot_value(
    service: &dyn LookupService,
    model: &EditorModel,
    data: &GridData,
    columns: &EditableColumns,
    template: &Row,
    num_per_pivot: usize,
    pivot_field: &str,
    pivot_values: &[Value],
) -> Result<(EditorModelDelta, GridData), EditorError> {
    let mut working = model.clone();
    let mut data = data.clone();
    let mut selection = SelectionCells::default();

    for pivot in pivot_values {
        let mut block_template = template.clone();
        block_template.insert(pivot_field.to_string(), pivot.clone());

        let row_offset = working.row_count;
        data = add_rows_to_grid_data(&data, num_per_pivot, Some(&block_template));
        let delta = add_rows_to_editor_model(
            service,
            &working,
            columns,
            &block_template,
            num_per_pivot,
            row_offset,
        )
        .await?;
        if let Some(cells) = &delta.selection_cells {
            selection.extend(cells.iter().copied());
        }
        working = working.merge(delta);
    }

    let delta = EditorModelDelta {
        cell_values: Some(working.cell_values),
        cell_messages: Some(working.cell_messages),
        row_count: Some(working.row_count),
        selection_cells: Some(selection),
        ..EditorModelDelta::default()
    };
    Ok((delta, data))
}

/// Write the same field values into existing rows.
///
/// Only fields present in `values` are written; read-only columns are
/// skipped. The written cells become the selection.
pub async fn update_rows_from_bulk(
    service: &dyn LookupService,
    model: &EditorModel,
    columns: &EditableColumns,
    row_indices: &[usize],
    values: &Row,
) -> Result<EditorModelDelta, EditorError> {
    let template_values = template_descriptors(service, columns, values).await?;

    let mut cell_values = model.cell_values.clone();
    let mut cell_messages = model.cell_messages.clone();
    let mut selection = SelectionCells::default();

    for &row in row_indices.iter().filter(|&&r| r < model.row_count) {
        for (col, column) in columns.iter().enumerate() {
            let Some(Some(cell)) = template_values.get(col) else { continue };
            if column.read_only {
                continue;
            }
            let key = CellKey::new(col, row);
            cell_values.insert(key, cell.clone());
            cell_messages.remove(&key);
            selection.insert(key);
        }
    }

    Ok(EditorModelDelta {
        cell_values: Some(cell_values),
        cell_messages: Some(cell_messages),
        selection_cells: Some(selection),
        ..EditorModelDelta::default()
    })
}

/// Remove rows by index.
///
/// Surviving cells move to their row's new position; cells of removed rows
/// are dropped. Removed identifiers accumulate in `deleted_ids`.
pub fn remove_rows(
    model: &EditorModel,
    data: &GridData,
    rows_to_delete: &BTreeSet<usize>,
) -> (EditorModelDelta, GridData) {
    let mut new_data = data.clone();
    let mut deleted_ids = model.deleted_ids.clone();

    new_data.data_keys.clear();
    for (idx, id) in data.data_keys.iter().enumerate() {
        if rows_to_delete.contains(&idx) {
            new_data.data.remove(id);
            deleted_ids.insert(id.clone());
        } else {
            new_data.data_keys.push(id.clone());
        }
    }

    let new_index: FxHashMap<&RowId, usize> =
        new_data.data_keys.iter().enumerate().map(|(i, id)| (id, i)).collect();
    let remap = |key: CellKey| {
        let id = data.data_keys.get(key.row)?;
        let row = *new_index.get(id)?;
        Some(CellKey::new(key.col, row))
    };

    let removed = rows_to_delete.iter().filter(|&&r| r < model.row_count).count();
    let delta = EditorModelDelta {
        cell_values: Some(reindex(&model.cell_values, remap)),
        cell_messages: Some(reindex(&model.cell_messages, remap)),
        row_count: Some(model.row_count - removed),
        deleted_ids: Some(deleted_ids),
        ..EditorModelDelta::clear_selection()
    };
    (delta, new_data)
}

/// Descriptors for each editable column from a template row; `None` where the
/// template has no entry for the column.
async fn template_descriptors(
    service: &dyn LookupService,
    columns: &EditableColumns,
    template: &Row,
) -> Result<Vec<Option<Vec<ValueDescriptor>>>, EditorError> {
    let raws: Vec<Option<Vec<Value>>> = columns
        .iter()
        .map(|column| {
            template
                .iter()
                .find(|(k, _)| column.matches(k))
                .map(|(_, v)| flatten_raw(v))
        })
        .collect();

    let requests: Vec<_> = columns
        .iter()
        .zip(&raws)
        .filter(|(column, _)| column.lookup.is_some())
        .filter_map(|(column, raw)| raw.as_ref().map(|r| (column, r.clone())))
        .collect();
    let resolved = resolve_by_raw(service, &requests).await?;

    Ok(columns
        .iter()
        .zip(raws)
        .map(|(column, raw)| {
            let raw = raw?;
            let descriptors = match resolved.get(&column.field_key) {
                Some(found) if column.lookup.is_some() => raw
                    .into_iter()
                    .map(|r| {
                        let text = value_text(&r);
                        found
                            .iter()
                            .find(|d| d.raw_text() == text)
                            .cloned()
                            .unwrap_or_else(|| ValueDescriptor::new(r.clone(), r))
                    })
                    .collect(),
                _ => raw.into_iter().map(|r| ValueDescriptor::new(r.clone(), r)).collect(),
            };
            Some(descriptors)
        })
        .collect())
}

fn flatten_raw(value: &Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().filter(|v| !v.is_null()).cloned().collect(),
        other => vec![other.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::StaticLookupService;
    use crate::schema::{LookupInfo, QueryColumn, QueryInfo};
    use serde_json::json;

    fn schema() -> QueryInfo {
        QueryInfo::new(
            vec![
                QueryColumn::new("Name", "Name"),
                QueryColumn::new("Owner", "Owner").with_lookup(LookupInfo {
                    schema_name: "core".into(),
                    query_name: "Users".into(),
                    key_column: "UserId".into(),
                    display_column: "DisplayName".into(),
                    container_path: None,
                    is_public: true,
                }),
                QueryColumn::new("Locked", "Locked").with_read_only(true),
            ],
            vec!["Id".into()],
        )
    }

    fn service() -> StaticLookupService {
        StaticLookupService::new().with_table(
            "core",
            "Users",
            vec![ValueDescriptor::new(1, "Ann"), ValueDescriptor::new(2, "Bob")],
        )
    }

    fn row(v: Value) -> Row {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_add_rows_to_grid_data() {
        let data = GridData::from_rows(vec![row(json!({"Id": 5}))], "Id");
        let grown = add_rows_to_grid_data(&data, 2, Some(&row(json!({"Name": "x"}))));
        assert_eq!(grown.row_count(), 3);
        assert_eq!(grown.data_keys[1], RowId::Placeholder(0));
        assert_eq!(grown.data_keys[2], RowId::Placeholder(1));
        assert_eq!(grown.row_at(2).unwrap()["Name"], json!("x"));
        assert_eq!(data.row_count(), 1);
    }

    #[test]
    fn test_add_rows_to_editor_model_resolves_lookups() {
        let columns = schema().editable_columns();
        let model = EditorModel::new("grid", 3, 2);
        let template = row(json!({"Name": "n", "Owner": 2}));
        let delta = smol::block_on(add_rows_to_editor_model(
            &service(), &model, &columns, &template, 2, 2,
        ))
        .unwrap();
        let next = model.merge(delta);
        assert_eq!(next.row_count, 4);
        assert_eq!(next.get_value(0, 3), &[ValueDescriptor::new("n", "n")]);
        assert_eq!(next.get_value(1, 2), &[ValueDescriptor::new(2, "Bob")]);
        assert!(next.get_value(2, 2).is_empty());
        assert_eq!(next.selection_cells.len(), 6);
    }

    #[test]
    fn test_add_rows_per_pivot_value() {
        let columns = schema().editable_columns();
        let data = GridData::from_rows(vec![row(json!({"Id": 1, "Name": "a"}))], "Id");
        let model = EditorModel::from_grid_data("grid", &data, &columns);
        let (delta, data) = smol::block_on(add_rows_per_pivot_value(
            &service(),
            &model,
            &data,
            &columns,
            &row(json!({"Name": "child"})),
            2,
            "Owner",
            &[json!(1), json!(2)],
        ))
        .unwrap();
        let next = model.merge(delta);
        assert_eq!(next.row_count, 5);
        assert_eq!(data.row_count(), 5);
        assert_eq!(next.get_value(1, 1), &[ValueDescriptor::new(1, "Ann")]);
        assert_eq!(next.get_value(1, 2), &[ValueDescriptor::new(1, "Ann")]);
        assert_eq!(next.get_value(1, 3), &[ValueDescriptor::new(2, "Bob")]);
        assert_eq!(next.get_value(1, 4), &[ValueDescriptor::new(2, "Bob")]);
        assert_eq!(data.row_at(4).unwrap()["Owner"], json!(2));
        assert_eq!(next.selection_cells.len(), 12);
    }

    #[test]
    fn test_update_rows_from_bulk_skips_read_only() {
        let columns = schema().editable_columns();
        let model = EditorModel::new("grid", 3, 3);
        let values = row(json!({"Owner": [1, 2], "Locked": "x"}));
        let delta = smol::block_on(update_rows_from_bulk(
            &service(), &model, &columns, &[0, 2, 9], &values,
        ))
        .unwrap();
        let next = model.merge(delta);
        assert_eq!(next.get_value(1, 0).len(), 2);
        assert_eq!(next.get_value(1, 2)[1], ValueDescriptor::new(2, "Bob"));
        assert!(next.get_value(2, 0).is_empty());
        assert!(next.get_value(0, 0).is_empty());
        assert_eq!(next.selection_cells.len(), 2);
    }

    #[test]
    fn test_remove_rows_remaps() {
        let columns = schema().editable_columns();
        let data = add_rows_to_grid_data(
            &GridData::from_rows(
                (0..4).map(|i| row(json!({"Id": i, "Name": format!("r{i}")}))).collect(),
                "Id",
            ),
            1,
            Some(&row(json!({"Name": "new"}))),
        );
        let model = EditorModel::from_grid_data("grid", &data, &columns);
        let to_delete: BTreeSet<usize> = [1, 4].into_iter().collect();
        let (delta, new_data) = remove_rows(&model, &data, &to_delete);
        let next = model.merge(delta);

        assert_eq!(next.row_count, 3);
        assert_eq!(new_data.row_count(), 3);
        assert_eq!(next.get_value(0, 0), &[ValueDescriptor::new("r0", "r0")]);
        assert_eq!(next.get_value(0, 1), &[ValueDescriptor::new("r2", "r2")]);
        assert_eq!(next.get_value(0, 2), &[ValueDescriptor::new("r3", "r3")]);
        assert!(next.cell_values.keys().all(|k| k.row < 3));
        assert_eq!(next.deleted_ids(), vec![RowId::Persisted("1".into())]);
        assert_eq!(next.deleted_ids.len(), 2);
    }
}
