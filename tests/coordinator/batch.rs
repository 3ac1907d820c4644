//! Sequential batches

use crate::common::*;

#[test]
fn batch_applies_in_order() {
    let store = shared_store();
    let tab = coordinator(&store, "tab-1");

    let results = tab.batch_mutations(vec![
        tab.request(MutationOperation::Insert, NOTES, "r1", json!({"title": "A"})),
        tab.request(MutationOperation::Update, NOTES, "r1", json!({"title": "B"})),
        tab.request(MutationOperation::Update, NOTES, "r1", json!({"body": "text"})),
    ]);

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.success));
    let row = store.row(NOTES, &json!("r1")).unwrap();
    assert_eq!(row["title"], json!("B"));
    assert_eq!(row["body"], json!("text"));
}

#[test]
fn conflicts_do_not_halt_the_batch() {
    let store = shared_store();
    let tab = coordinator(&store, "tab-1");
    tab.insert(NOTES, "r1", json!({"title": "A"}));
    foreign_pending(&tab, "r1", Some(json!({"title": "A"})), json!({"title": "X"}));

    let results = tab.batch_mutations(vec![
        tab.request(MutationOperation::Update, NOTES, "r1", json!({"title": "B"})),
        tab.request(MutationOperation::Insert, NOTES, "r2", json!({"title": "C"})),
    ]);

    assert_eq!(results.len(), 2);
    assert!(results[0].is_conflict());
    assert!(results[1].success);
    assert!(store.row(NOTES, &json!("r2")).is_some());
}

#[test]
fn failures_halt_the_batch() {
    let store = shared_store();
    let tab = coordinator(&store, "tab-1");
    tab.insert(NOTES, "r1", json!({"title": "A"}));

    let results = tab.batch_mutations(vec![
        tab.request(MutationOperation::Insert, NOTES, "r2", json!({"title": "B"})),
        tab.request(MutationOperation::Insert, NOTES, "r1", json!({"title": "dup"})),
        tab.request(MutationOperation::Insert, NOTES, "r3", json!({"title": "never"})),
    ]);

    assert_eq!(results.len(), 2);
    assert!(results[0].success);
    assert!(matches!(
        results[1].error,
        Some(MutationError::ApplyFailure { .. })
    ));
    assert!(store.row(NOTES, &json!("r3")).is_none());
}

#[test]
fn empty_batch() {
    let store = shared_store();
    let tab = coordinator(&store, "tab-1");
    assert!(tab.batch_mutations(Vec::new()).is_empty());
}

#[test]
fn batch_requests_keep_their_attribution() {
    let store = shared_store();
    let tab = MutationCoordinator::builder()
        .session_id("tab-1")
        .user_id("ann")
        .relation(NOTES, NOTE_FIELDS)
        .build(store.clone())
        .unwrap();

    let parent = tab.insert(NOTES, "r1", json!({"title": "A"})).mutation_id;
    let undo = tab
        .request(MutationOperation::Update, NOTES, "r1", json!({"title": "A2"}))
        .with_entity_type("note")
        .with_parent(parent);
    let results = tab.batch_mutations([undo]);

    let entry = tab.log().get(results[0].mutation_id).unwrap().unwrap();
    assert_eq!(entry.user_id.unwrap().as_str(), "ann");
    assert_eq!(entry.entity_type.as_deref(), Some("note"));
    assert_eq!(entry.parent_mutation_id, Some(parent));
}
