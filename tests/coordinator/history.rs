//! History and conflict queries

use crate::common::*;

#[test]
fn history_is_newest_first() {
    let store = shared_store();
    let tab = coordinator(&store, "tab-1");

    tab.insert(NOTES, "r1", json!({"title": "A"}));
    for title in ["B", "C"] {
        std::thread::sleep(std::time::Duration::from_millis(2));
        tab.update(NOTES, "r1", json!({ "title": title }));
    }

    let history = tab.get_mutation_history("r1", None);
    let operations: Vec<MutationOperation> = history.iter().map(|e| e.operation).collect();
    assert_eq!(
        operations,
        vec![
            MutationOperation::Update,
            MutationOperation::Update,
            MutationOperation::Insert
        ]
    );
    assert!(history
        .windows(2)
        .all(|pair| pair[0].timestamp >= pair[1].timestamp));
    assert_eq!(history[0].after_state, Some(json!({"title": "C", "body": null, "tags": null})));
}

#[test]
fn history_respects_limit() {
    let store = shared_store();
    let tab = coordinator(&store, "tab-1");
    tab.insert(NOTES, "r1", json!({"title": "A"}));
    tab.update(NOTES, "r1", json!({"title": "B"}));
    tab.update(NOTES, "r1", json!({"title": "C"}));

    assert_eq!(tab.get_mutation_history("r1", Some(2)).len(), 2);
    assert!(tab.get_mutation_history("nothing", None).is_empty());
}

#[test]
fn history_records_states_and_delta() {
    let store = shared_store();
    let tab = coordinator(&store, "tab-1");
    tab.insert(NOTES, "r1", json!({"title": "A", "tags": ["x"]}));
    tab.update(NOTES, "r1", json!({"tags": ["x", "y"]}));

    let latest = &tab.get_mutation_history("r1", Some(1))[0];
    assert_eq!(latest.status, MutationStatus::Applied);
    assert_eq!(
        latest.before_state,
        Some(json!({"title": "A", "body": null, "tags": ["x"]}))
    );
    assert_eq!(latest.delta.deltas.len(), 1);
    assert_eq!(latest.delta.deltas[0].operation, DeltaOperation::ArrayItemAdded);
    assert!(latest.applied_at.is_some());
}

#[test]
fn conflicted_mutations_are_listed() {
    let store = shared_store();
    let tab1 = coordinator(&store, "tab-1");
    let tab2 = coordinator(&store, "tab-2");
    tab1.insert(NOTES, "r1", json!({"title": "A"}));
    tab1.insert(NOTES, "r2", json!({"title": "A"}));
    foreign_pending(&tab1, "r1", Some(json!({"title": "A"})), json!({"title": "X"}));
    foreign_pending(&tab1, "r2", Some(json!({"title": "A"})), json!({"title": "X"}));

    let first = tab1.update(NOTES, "r1", json!({"title": "B"}));
    std::thread::sleep(std::time::Duration::from_millis(2));
    let second = tab2.update(NOTES, "r2", json!({"title": "B"}));

    let conflicted = tab1.get_conflicted_mutations();
    let ids: Vec<MutationId> = conflicted.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![second.mutation_id, first.mutation_id]);
    assert_eq!(tab2.get_conflicted_mutations().len(), 2);
}
