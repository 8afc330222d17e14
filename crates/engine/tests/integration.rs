use std::collections::BTreeSet;

use serde_json::{json, Value};

use gridedit_config::EditorSettings;
use gridedit_core::{parse_cell_key, CellKey, ValueDescriptor};
use gridedit_engine::clipboard::{copy_value, paste, PasteOptions, PasteOutcome};
use gridedit_engine::drag::DragCoordinator;
use gridedit_engine::fill::apply_fill;
use gridedit_engine::rows::{add_rows_to_editor_model, add_rows_to_grid_data, remove_rows};
use gridedit_engine::selection::{extend_selection, select_cell, SelectionMode};
use gridedit_engine::structure::{add_columns, remove_column, StructuralOutcome};
use gridedit_engine::validation::validate_data;
use gridedit_engine::{
    EditorModel, GridData, LookupInfo, QueryColumn, QueryInfo, Row, RowId, StaticLookupService,
};

const SAMPLE_FIELDS: [&str; 5] = [
    "ParticipantId",
    "MaterialInputs/SampleSet1",
    "MaterialInputs/SampleSet2",
    "Description",
    "MaterialInputs/SampleSet3",
];

fn row(v: Value) -> Row {
    v.as_object().cloned().unwrap()
}

fn sample_grid() -> (EditorModel, GridData, QueryInfo) {
    let qi = QueryInfo::new(
        SAMPLE_FIELDS
            .iter()
            .map(|f| QueryColumn::new(*f, *f))
            .chain([QueryColumn::new("Attachment", "Attachment").with_file_input(true)])
            .collect(),
        vec!["RowId".into()],
    );
    let rows = (0..3)
        .map(|r| {
            let mut out = Row::new();
            out.insert("RowId".into(), json!(100 + r));
            for (c, f) in SAMPLE_FIELDS.iter().enumerate() {
                out.insert(f.to_string(), json!(format!("v{c}{r}")));
            }
            out
        })
        .collect();
    let data = GridData::from_rows(rows, "RowId");
    let model = EditorModel::from_grid_data("samples", &data, &qi.editable_columns());
    (model, data, qi)
}

fn lookup_grid() -> (EditorModel, GridData, QueryInfo, StaticLookupService) {
    let qi = QueryInfo::new(
        vec![
            QueryColumn::new("Name", "Name").with_required(true),
            QueryColumn::new("Owners", "Owners").with_multi_value(true).with_lookup(LookupInfo {
                schema_name: "core".into(),
                query_name: "Users".into(),
                key_column: "UserId".into(),
                display_column: "DisplayName".into(),
                container_path: None,
                is_public: true,
            }),
            QueryColumn::new("Amount", "Amount"),
        ],
        vec!["Id".into()],
    );
    let data = GridData::from_rows(
        vec![
            row(json!({"Id": 1, "Name": "first", "Owners": null, "Amount": 1})),
            row(json!({"Id": 2, "Name": "second", "Owners": null, "Amount": 3})),
        ],
        "Id",
    );
    let model = EditorModel::from_grid_data("lookups", &data, &qi.editable_columns());
    let service = StaticLookupService::new().with_table(
        "core",
        "Users",
        vec![
            ValueDescriptor::new(10, "Smith, John"),
            ValueDescriptor::new(11, "Jones"),
        ],
    );
    (model, data, qi, service)
}

fn text(model: &EditorModel, col: usize, row: usize) -> String {
    model.get_value(col, row).first().map(ValueDescriptor::display_text).unwrap_or_default()
}

// -------------------------------------------------------------------------
// Structural edits
// -------------------------------------------------------------------------

#[test]
fn add_column_after_last_insert_column() {
    let (model, data, qi) = sample_grid();
    assert_eq!(model.col_count, 5);
    assert_eq!(model.row_count, 3);

    let outcome = add_columns(
        &model,
        &qi,
        &data,
        &[QueryColumn::new("MaterialInputs/SampleSet4", "Sample Set 4")],
        Some("MaterialInputs/SampleSet3"),
    );
    let StructuralOutcome::Changed { model: delta, data: new_data, query_info } = outcome else {
        panic!("expected a structural change");
    };
    let next = model.merge(delta);

    assert_eq!(next.col_count, 6);
    for (key, values) in &model.cell_values {
        assert_eq!(next.cell_values.get(key), Some(values));
    }
    for r in 0..3 {
        assert_eq!(next.get_value(5, r), &[] as &[ValueDescriptor]);
        assert_eq!(new_data.row_at(r).unwrap()["MaterialInputs/SampleSet4"], Value::Null);
    }
    assert_eq!(query_info.editable_columns().index_of("MaterialInputs/SampleSet4"), Some(5));
    assert_eq!(query_info.position("MaterialInputs/SampleSet4"), Some(5));
}

#[test]
fn structural_noop_leaves_inputs_unchanged() {
    let (model, data, qi) = sample_grid();
    let before = (model.clone(), data.clone(), qi.clone());

    assert!(remove_column(&model, &qi, &data, "NotAField").is_noop());
    assert!(add_columns(&model, &qi, &data, &[], Some("Description")).is_noop());
    assert_eq!((model, data, qi), before);
}

#[test]
fn removing_file_input_column_is_noop() {
    let (model, data, qi) = sample_grid();
    assert!(remove_column(&model, &qi, &data, "Attachment").is_noop());
}

// -------------------------------------------------------------------------
// Clipboard
// -------------------------------------------------------------------------

#[test]
fn paste_grows_grid_and_resolves_lookups() {
    let (model, data, qi, service) = lookup_grid();
    let m = model.merge(select_cell(0, 1));
    let clip = "second*\t\"smith, john\",Jones\r\nthird\tJones\r\n";

    let outcome = smol::block_on(paste(
        &service,
        &m,
        &data,
        &qi,
        clip,
        &PasteOptions::default(),
        &EditorSettings::default(),
    ))
    .unwrap();
    let PasteOutcome::Applied { model: delta, data: Some(new_data) } = outcome else {
        panic!("expected paste to grow the grid");
    };
    let next = m.merge(delta);

    assert_eq!(next.row_count, 3);
    assert_eq!(new_data.row_count(), 3);
    assert_eq!(new_data.data_keys[2], RowId::Placeholder(0));
    assert_eq!(text(&next, 0, 1), "second*");
    assert_eq!(
        next.get_value(1, 1),
        &[ValueDescriptor::new(10, "Smith, John"), ValueDescriptor::new(11, "Jones")]
    );
    assert_eq!(next.get_value(1, 2), &[ValueDescriptor::new(11, "Jones")]);
    assert!(next.cell_messages.is_empty());

    let rows = next.rows_from_model(&new_data, &qi.editable_columns());
    assert_eq!(rows[1].1["Owners"], json!([10, 11]));
    assert_eq!(rows[2].1["Name"], json!("third"));
}

#[test]
fn copy_then_paste_preserves_multi_value_cells() {
    let (model, data, qi, service) = lookup_grid();
    let mut m = model.clone();
    m.cell_values.insert(
        CellKey::new(1, 0),
        vec![ValueDescriptor::new(10, "Smith, John"), ValueDescriptor::new(11, "Jones")],
    );
    let m = m.merge(select_cell(1, 0));
    let copied = copy_value(&m, &qi.editable_columns()).unwrap();
    assert_eq!(copied, "\"Smith, John\",Jones");

    let target = m.merge(select_cell(1, 1));
    let outcome = smol::block_on(paste(
        &service,
        &target,
        &data,
        &qi,
        &copied,
        &PasteOptions::default(),
        &EditorSettings::default(),
    ))
    .unwrap();
    let PasteOutcome::Applied { model: delta, data: None } = outcome else {
        panic!("expected paste in place");
    };
    let next = target.merge(delta);
    assert_eq!(next.get_value(1, 1), next.get_value(1, 0));
}

#[test]
fn paste_over_row_cap_is_rejected() {
    let (model, data, qi, service) = lookup_grid();
    let m = model.merge(select_cell(0, 0));
    let text = vec!["x"; 1001].join("\n");

    let outcome = smol::block_on(paste(
        &service,
        &m,
        &data,
        &qi,
        &text,
        &PasteOptions::default(),
        &EditorSettings::default(),
    ))
    .unwrap();
    let PasteOutcome::Rejected { model: delta } = outcome else {
        panic!("expected rejection");
    };
    let next = m.merge(delta);
    assert_eq!(next.cell_values, m.cell_values);
    assert_eq!(next.row_count, 2);
    assert!(next.get_message(0, 0).is_some());
}

#[test]
fn paste_block_onto_block_is_rejected() {
    let (model, data, qi, service) = lookup_grid();
    let m = model.merge(select_cell(0, 0));
    let m = m.merge(extend_selection(&m, 2, 1, SelectionMode::Area));

    let outcome = smol::block_on(paste(
        &service,
        &m,
        &data,
        &qi,
        "a\tb\nc\td",
        &PasteOptions::default(),
        &EditorSettings::default(),
    ))
    .unwrap();
    let PasteOutcome::Rejected { model: delta } = outcome else {
        panic!("expected rejection");
    };
    assert!(delta.cell_values.is_none());
}

#[test]
fn settings_row_cap_applies_to_paste() {
    let (model, data, qi, service) = lookup_grid();
    let m = model.merge(select_cell(0, 0));
    let settings = EditorSettings::from_json(r#"{ "paste.maxRows": 2 }"#).unwrap();

    let outcome = smol::block_on(paste(
        &service,
        &m,
        &data,
        &qi,
        "a\nb\nc",
        &PasteOptions::new(&settings),
        &settings,
    ))
    .unwrap();
    assert!(matches!(outcome, PasteOutcome::Rejected { .. }));
}

// -------------------------------------------------------------------------
// Drag fill
// -------------------------------------------------------------------------

#[test]
fn drag_fill_continues_sequence() {
    let (model, data, qi, service) = lookup_grid();
    let columns = qi.editable_columns();
    let grown = add_rows_to_grid_data(&data, 3, None);
    let delta = smol::block_on(add_rows_to_editor_model(
        &service,
        &model,
        &columns,
        &Row::new(),
        3,
        model.row_count,
    ))
    .unwrap();
    let model = model.merge(delta);
    assert_eq!(model.row_count, 5);
    assert_eq!(grown.row_count(), 5);

    let m = model.merge(select_cell(2, 0));
    let m = m.merge(extend_selection(&m, 2, 1, SelectionMode::Area));

    let mut drag = DragCoordinator::new();
    assert!(drag.begin_drag(&m, true));
    let source = drag.end_drag(&m.id).unwrap();
    let fill: Vec<CellKey> = (2..5).map(|r| CellKey::new(2, r)).collect();

    let next = m.merge(apply_fill(&m, &source, &fill));
    assert_eq!(text(&next, 2, 2), "5");
    assert_eq!(text(&next, 2, 3), "7");
    assert_eq!(text(&next, 2, 4), "9");
    assert_eq!(text(&next, 2, 0), "1");
}

// -------------------------------------------------------------------------
// Rows and validation
// -------------------------------------------------------------------------

#[test]
fn remove_rows_then_validate() {
    let (model, data, qi, _) = lookup_grid();
    let columns = qi.editable_columns();
    let data = add_rows_to_grid_data(&data, 2, None);
    let mut model = model;
    model.row_count = 4;

    let report = validate_data(&model, &columns, &[], None);
    assert_eq!(report.missing_required.get("Name"), Some(&vec![3, 4]));

    let to_delete: BTreeSet<usize> = [0, 3].into_iter().collect();
    let (delta, data) = remove_rows(&model, &data, &to_delete);
    let next = model.merge(delta);

    assert_eq!(next.row_count, 2);
    assert_eq!(data.row_count(), 2);
    assert_eq!(text(&next, 0, 0), "second");
    assert_eq!(next.deleted_ids(), vec![RowId::Persisted("1".into())]);

    let report = validate_data(&next, &columns, &[], None);
    assert_eq!(report.missing_required.get("Name"), Some(&vec![2]));
}

#[test]
fn cell_keys_round_trip_through_text() {
    let (model, ..) = sample_grid();
    for key in model.cell_values.keys() {
        assert_eq!(parse_cell_key(&key.to_string()).unwrap(), *key);
    }
}
