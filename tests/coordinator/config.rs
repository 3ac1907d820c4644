//! File-based configuration

use crate::common::*;
use deltaguard::coordinator::ConfigError;
use std::io::Write;

fn write_config(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn coordinator_from_config_file() {
    let file = write_config(
        r#"
        log_relation = "audit_log"
        history_limit = 1

        [relations]
        notes = ["id", "title"]
        "#,
    );
    let config = CoordinatorConfig::from_path(file.path()).unwrap();

    let store = shared_store();
    let tab = MutationCoordinator::builder()
        .session_id("tab-1")
        .config(config)
        .build(store.clone())
        .unwrap();

    tab.insert(NOTES, "r1", json!({"title": "A", "ignored": true}));
    tab.update(NOTES, "r1", json!({"title": "B"}));

    assert_eq!(store.rows("audit_log").len(), 2);
    assert!(store.rows("mutation_log").is_empty());
    assert_eq!(tab.get_mutation_history("r1", None).len(), 1);

    let row = store.row(NOTES, &json!("r1")).unwrap();
    assert!(!row.contains_key("ignored"));
}

#[test]
fn builder_relations_override_config() {
    let file = write_config("[relations]\nnotes = [\"title\"]\n");
    let config = CoordinatorConfig::from_path(file.path()).unwrap();

    let tab = MutationCoordinator::builder()
        .config(config)
        .relation(NOTES, NOTE_FIELDS)
        .build(shared_store())
        .unwrap();
    assert_eq!(tab.schema().get(NOTES).unwrap().fields().len(), 4);
}

#[test]
fn invalid_config_file_is_rejected() {
    let file = write_config("history_limit = \"lots\"");
    assert!(matches!(
        CoordinatorConfig::from_path(file.path()),
        Err(ConfigError::Parse(_))
    ));

    let file = write_config("[relations]\n\"bad table\" = [\"title\"]\n");
    assert!(matches!(
        CoordinatorConfig::from_path(file.path()),
        Err(ConfigError::InvalidIdentifier(_))
    ));
}

#[test]
fn config_errors_convert_to_crate_error() {
    fn load(path: &std::path::Path) -> deltaguard::Result<CoordinatorConfig> {
        Ok(CoordinatorConfig::from_path(path)?)
    }

    let dir = tempfile::tempdir().unwrap();
    let err = load(&dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Io { .. })));
    assert!(!err.is_retryable());
}
