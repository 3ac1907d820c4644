//! Conflict detection between sessions

use crate::common::*;

// ============================================================================
// Pending entries from other sessions
// ============================================================================

#[test]
fn overlapping_pending_entry_blocks_write() {
    let store = shared_store();
    let tab = coordinator(&store, "tab-1");
    assert!(tab.insert(NOTES, "r1", json!({"title": "A"})).success);
    let writes_before = store.write_count(NOTES);

    let other = foreign_pending(&tab, "r1", Some(json!({"title": "A"})), json!({"title": "X"}));

    let result = tab.update(NOTES, "r1", json!({"title": "B"}));
    assert!(!result.success);
    assert_eq!(result.version, -1);
    assert!(result
        .error_message()
        .unwrap()
        .contains("Concurrent modification"));
    assert_eq!(result.conflicts, vec![other]);

    assert_eq!(store.write_count(NOTES), writes_before);
    let row = store.row(NOTES, &json!("r1")).unwrap();
    assert_eq!(row["title"], json!("A"));
}

#[test]
fn conflicted_attempt_is_logged() {
    let store = shared_store();
    let tab = coordinator(&store, "tab-1");
    tab.insert(NOTES, "r1", json!({"title": "A"}));
    let other = foreign_pending(&tab, "r1", Some(json!({"title": "A"})), json!({"title": "X"}));

    let result = tab.update(NOTES, "r1", json!({"title": "B"}));

    let entry = tab.log().get(result.mutation_id).unwrap().unwrap();
    assert_eq!(entry.status, MutationStatus::Conflicted);
    assert_eq!(entry.conflict_with, vec![other]);
    assert_eq!(entry.session_id.as_str(), "tab-1");
}

#[test]
fn disjoint_fields_do_not_conflict() {
    let store = shared_store();
    let tab = coordinator(&store, "tab-1");
    tab.insert(NOTES, "r1", json!({"title": "A", "body": "old"}));
    foreign_pending(&tab, "r1", Some(json!({"title": "A"})), json!({"title": "X"}));

    let result = tab.update(NOTES, "r1", json!({"body": "new"}));
    assert!(result.success, "{:?}", result.error);
    assert_eq!(store.row(NOTES, &json!("r1")).unwrap()["body"], json!("new"));
}

#[test]
fn whole_record_pending_entry_blocks_any_field() {
    let store = shared_store();
    let tab = coordinator(&store, "tab-1");
    tab.insert(NOTES, "r1", json!({"title": "A"}));
    foreign_pending(&tab, "r1", None, json!({"title": "X", "body": "y"}));

    let result = tab.update(NOTES, "r1", json!({"body": "new"}));
    assert!(result.is_conflict());
}

#[test]
fn pending_entries_on_other_records_are_ignored() {
    let store = shared_store();
    let tab = coordinator(&store, "tab-1");
    tab.insert(NOTES, "r1", json!({"title": "A"}));
    foreign_pending(&tab, "r2", None, json!({"title": "X"}));

    assert!(tab.update(NOTES, "r1", json!({"title": "B"})).success);
}

#[test]
fn resolved_pending_entry_stops_conflicting() {
    let store = shared_store();
    let tab = coordinator(&store, "tab-1");
    tab.insert(NOTES, "r1", json!({"title": "A"}));
    let other = foreign_pending(&tab, "r1", Some(json!({"title": "A"})), json!({"title": "X"}));

    assert!(tab.update(NOTES, "r1", json!({"title": "B"})).is_conflict());

    // The other process finishes its write
    tab.log()
        .mark_applied(other, deltaguard::types::Timestamp::now())
        .unwrap();
    assert!(tab.update(NOTES, "r1", json!({"title": "B"})).success);
}

// ============================================================================
// Sessions sharing a store
// ============================================================================

#[test]
fn sessions_see_each_others_log() {
    let store = shared_store();
    let tab1 = coordinator(&store, "tab-1");
    let tab2 = coordinator(&store, "tab-2");

    assert!(tab1.insert(NOTES, "r1", json!({"title": "A"})).success);
    assert!(tab2.update(NOTES, "r1", json!({"title": "B"})).success);

    let history = tab1.get_mutation_history("r1", None);
    let sessions: Vec<&str> = history.iter().map(|e| e.session_id.as_str()).collect();
    assert_eq!(history.len(), 2);
    assert!(sessions.contains(&"tab-1"));
    assert!(sessions.contains(&"tab-2"));
}

#[test]
fn concurrent_writes_through_one_coordinator() {
    let store = shared_store();
    let tab = Arc::new(coordinator(&store, "tab-1"));

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let tab = Arc::clone(&tab);
            scope.spawn(move || {
                for n in 0..5 {
                    let record = format!("w{worker}-{n}");
                    let result = tab.insert(NOTES, &record, json!({ "title": record.clone() }));
                    assert!(result.success, "{:?}", result.error);
                }
            });
        }
    });

    assert_eq!(store.rows(NOTES).len(), 20);
    assert_eq!(store.rows("mutation_log").len(), 20);
    assert!(store
        .rows("mutation_log")
        .iter()
        .all(|row| row["status"] == json!("APPLIED")));
}
