//! Worked examples of the diff rules

use crate::common::*;

fn ops(delta: &RecordDelta) -> Vec<(String, DeltaOperation)> {
    delta
        .deltas
        .iter()
        .map(|d| (d.path.to_string(), d.operation))
        .collect()
}

#[test]
fn title_change_and_tag_append() {
    let delta = calculate_delta(
        "r1",
        NOTES,
        Some(&json!({"title": "A", "tags": ["x"]})),
        Some(&json!({"title": "B", "tags": ["x", "y"]})),
    );

    assert_eq!(delta.deltas.len(), 2);
    let title = delta
        .deltas
        .iter()
        .find(|d| d.path.to_string() == "title")
        .expect("title delta");
    assert_eq!(title.operation, DeltaOperation::FieldModified);
    assert_eq!(title.old_value, Some(json!("A")));
    assert_eq!(title.new_value, Some(json!("B")));

    let tags = delta
        .deltas
        .iter()
        .find(|d| d.path.to_string() == "tags")
        .expect("tags delta");
    assert_eq!(tags.operation, DeltaOperation::ArrayItemAdded);
    assert_eq!(tags.new_value, Some(json!("y")));
    assert_eq!(tags.old_value, None);
}

#[test]
fn duplicate_removal_is_counted_once() {
    let delta = calculate_delta("r1", NOTES, Some(&json!([1, 2, 2])), Some(&json!([2, 1])));
    assert_eq!(ops(&delta), vec![("$".to_string(), DeltaOperation::ArrayItemRemoved)]);
    assert_eq!(delta.deltas[0].old_value, Some(json!(2)));
}

#[test]
fn pure_reorder_is_one_delta() {
    let delta = calculate_delta(
        "r1",
        NOTES,
        Some(&json!({"tags": ["a", "b"]})),
        Some(&json!({"tags": ["b", "a"]})),
    );
    assert_eq!(
        ops(&delta),
        vec![("tags".to_string(), DeltaOperation::ArrayReordered)]
    );
    assert_eq!(
        apply_delta(Some(&json!({"tags": ["a", "b"]})), &delta),
        Some(json!({"tags": ["b", "a"]}))
    );
}

#[test]
fn top_level_type_change_replaces_object() {
    let delta = calculate_delta("r1", NOTES, Some(&json!({"a": 1})), Some(&json!([1])));
    assert_eq!(ops(&delta), vec![("$".to_string(), DeltaOperation::ObjectReplaced)]);
}

#[test]
fn nested_type_change_is_field_modified() {
    let delta = calculate_delta(
        "r1",
        NOTES,
        Some(&json!({"meta": {"n": 1}})),
        Some(&json!({"meta": [1]})),
    );
    assert_eq!(
        ops(&delta),
        vec![("meta".to_string(), DeltaOperation::FieldModified)]
    );
}

#[test]
fn nested_fields_are_addressed_by_path() {
    let delta = calculate_delta(
        "r1",
        NOTES,
        Some(&json!({"meta": {"author": "ann", "rev": 1}})),
        Some(&json!({"meta": {"author": "ann", "rev": 2, "draft": true}})),
    );
    let mut paths: Vec<(String, DeltaOperation)> = ops(&delta);
    paths.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        paths,
        vec![
            ("meta.draft".to_string(), DeltaOperation::FieldAdded),
            ("meta.rev".to_string(), DeltaOperation::FieldModified),
        ]
    );
}

#[test]
fn null_and_absent_are_different() {
    let delta = calculate_delta(
        "r1",
        NOTES,
        Some(&json!({"body": null})),
        Some(&json!({})),
    );
    assert_eq!(
        ops(&delta),
        vec![("body".to_string(), DeltaOperation::FieldRemoved)]
    );
    assert_eq!(delta.deltas[0].old_value, Some(Value::Null));
}

#[test]
fn nested_paths_conflict_with_their_parents() {
    let base = json!({"meta": {"rev": 1, "author": "ann"}, "title": "A"});
    let rev = calculate_delta("r1", NOTES, Some(&base), Some(&json!({"meta": {"rev": 2, "author": "ann"}, "title": "A"})));
    let meta = calculate_delta("r1", NOTES, Some(&base), Some(&json!({"meta": null, "title": "A"})));
    let title = calculate_delta("r1", NOTES, Some(&base), Some(&json!({"meta": {"rev": 1, "author": "ann"}, "title": "B"})));

    assert!(deltas_conflict(&rev, &meta));
    assert!(!deltas_conflict(&rev, &title));

    let merged = merge_non_conflicting_deltas(Some(&base), &rev, &title);
    assert!(merged.is_merged());
    assert_eq!(
        merged.merged,
        Some(json!({"meta": {"rev": 2, "author": "ann"}, "title": "B"}))
    );
}
