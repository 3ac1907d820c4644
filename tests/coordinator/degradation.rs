//! Store outages and failed reads or writes

use crate::common::*;

#[test]
fn not_ready_store_fails_without_logging() {
    let store = shared_store();
    let tab = coordinator(&store, "tab-1");
    store.set_ready(false);

    let result = tab.insert(NOTES, "r1", json!({"title": "A"}));
    assert!(!result.success);
    assert_eq!(result.version, -1);
    assert!(matches!(result.error, Some(MutationError::NotReady { .. })));
    assert_eq!(result.error_message().as_deref(), Some("notes db not ready"));

    store.set_ready(true);
    assert!(store.rows("mutation_log").is_empty());
    assert!(store.rows(NOTES).is_empty());
}

#[test]
fn store_write_failure_marks_entry_failed() {
    let store = shared_store();
    let tab = coordinator(&store, "tab-1");
    store.fail_writes(NOTES, "disk full");

    let result = tab.insert(NOTES, "r1", json!({"title": "A"}));
    assert!(!result.success);
    assert_eq!(result.version, -1);
    assert!(result.error_message().unwrap().contains("disk full"));
    assert!(!result.is_conflict());

    let entry = tab.log().get(result.mutation_id).unwrap().unwrap();
    assert_eq!(entry.status, MutationStatus::Failed);
    assert!(entry.error.unwrap().contains("disk full"));
}

#[test]
fn undeclared_relation_is_written_without_prior_state() {
    let store = shared_store();
    let tab = coordinator(&store, "tab-1");

    let result = tab.insert("scratch", "s1", json!({"note": "hi", "n": 1}));
    assert!(result.success, "{:?}", result.error);

    let delta = result.delta.unwrap();
    assert_eq!(delta.deltas.len(), 1);
    assert!(delta.deltas[0].path.is_root());
    assert_eq!(delta.deltas[0].operation, DeltaOperation::FieldAdded);

    let row = store.row("scratch", &json!("s1")).unwrap();
    assert_eq!(row["note"], json!("hi"));
    assert_eq!(row["n"], json!(1));
}

#[test]
fn failed_state_read_diffs_against_absent() {
    let store = shared_store();
    let tab = coordinator(&store, "tab-1");
    tab.insert(NOTES, "r1", json!({"title": "A"}));
    store.fail_reads(NOTES, "replica lagging");

    let result = tab.update(NOTES, "r1", json!({"title": "B"}));
    assert!(result.success);
    let delta = result.delta.unwrap();
    assert!(delta.before_snapshot.is_none());
    assert!(delta.deltas[0].path.is_root());

    store.clear_faults();
    assert_eq!(store.row(NOTES, &json!("r1")).unwrap()["title"], json!("B"));
}

#[test]
fn log_outage_does_not_block_mutations() {
    let store = shared_store();
    let tab = coordinator(&store, "tab-1");
    store.fail_writes("mutation_log", "log offline");
    store.fail_reads("mutation_log", "log offline");

    let result = tab.insert(NOTES, "r1", json!({"title": "A"}));
    assert!(result.success, "{:?}", result.error);
    assert_eq!(store.row(NOTES, &json!("r1")).unwrap()["title"], json!("A"));

    assert!(tab.get_mutation_history("r1", None).is_empty());
    assert!(tab.get_conflicted_mutations().is_empty());
}

#[test]
fn update_of_missing_record_is_an_apply_failure() {
    let store = shared_store();
    let tab = coordinator(&store, "tab-1");
    tab.insert(NOTES, "r0", json!({"title": "seed"}));

    let result = tab.update(NOTES, "missing", json!({"title": "B"}));
    assert!(!result.success);
    assert!(matches!(result.error, Some(MutationError::ApplyFailure { .. })));
}

#[test]
fn upsert_creates_then_replaces() {
    let store = shared_store();
    let tab = coordinator(&store, "tab-1");

    assert!(tab.upsert(NOTES, "r1", json!({"title": "A", "body": "x"})).success);
    assert!(tab.upsert(NOTES, "r1", json!({"title": "B"})).success);

    let row = store.row(NOTES, &json!("r1")).unwrap();
    assert_eq!(row["title"], json!("B"));
    assert_eq!(row["body"], Value::Null);
}

#[test]
fn non_object_data_is_rejected_before_the_store() {
    let store = shared_store();
    let tab = coordinator(&store, "tab-1");
    tab.insert(NOTES, "r1", json!({"title": "A"}));
    let writes = store.write_count(NOTES);

    let result = tab.update(NOTES, "r1", json!("oops"));
    assert!(!result.success);
    assert!(matches!(result.error, Some(MutationError::ApplyFailure { .. })));
    assert_eq!(store.write_count(NOTES), writes);
    assert_eq!(store.row(NOTES, &json!("r1")).unwrap()["title"], json!("A"));

    let entry = tab.log().get(result.mutation_id).unwrap().unwrap();
    assert_eq!(entry.status, MutationStatus::Failed);
    assert!(entry.applied_at.is_none());
    assert!(entry.error.unwrap().contains("must be an object"));

    let insert = tab.insert(NOTES, "r2", json!([1, 2]));
    assert!(!insert.success);
    assert!(store.row(NOTES, &json!("r2")).is_none());
}

#[test]
fn conflict_survives_log_outage() {
    let store = shared_store();
    let tab = coordinator(&store, "tab-1");
    tab.insert(NOTES, "r1", json!({"title": "A"}));
    foreign_pending(&tab, "r1", Some(json!({"title": "A"})), json!({"title": "X"}));
    store.fail_writes("mutation_log", "log offline");
    let writes = store.write_count(NOTES);

    let result = tab.update(NOTES, "r1", json!({"title": "B"}));
    assert!(result.is_conflict());
    assert!(!result.conflicts.is_empty());
    assert_eq!(store.write_count(NOTES), writes);
    assert_eq!(store.row(NOTES, &json!("r1")).unwrap()["title"], json!("A"));

    store.clear_faults();
    assert!(tab.log().get(result.mutation_id).unwrap().is_none());
}
