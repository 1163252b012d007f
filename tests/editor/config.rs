//! Building editors from configuration files.

use std::sync::Arc;

use record_editor::{BufferSink, Command, EditorConfig, Mode, RecordEditorController};

use crate::support::{enter_key, fill, init_tracing, ALICE};

#[tokio::test]
async fn local_config_persists_to_file() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("employees.json");
    let config_path = dir.path().join("editor.json");
    std::fs::write(
        &config_path,
        serde_json::json!({
            "schema": "employee",
            "store": { "backend": "local", "path": data },
            "message_ttl_ms": 1000
        })
        .to_string(),
    )
    .unwrap();

    let config = EditorConfig::from_path(&config_path).unwrap();
    let schema = Arc::new(config.schema().unwrap());
    let store = config.build_store(schema.clone()).unwrap();
    let sink = Arc::new(BufferSink::new());
    let mut editor = RecordEditorController::new(schema, store, sink);

    enter_key(&mut editor, "E9").await;
    fill(&mut editor, ALICE).await;
    editor.dispatch(Command::OnSave).await;
    assert_eq!(editor.state().mode(), Mode::Empty);

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&data).unwrap()).unwrap();
    assert!(saved.get("employee_E9").is_some());
}

#[test]
fn missing_config_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = EditorConfig::from_path(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, record_editor::ConfigError::Io(_)));
}

#[cfg(feature = "remote")]
#[tokio::test]
async fn remote_config_reads_token_from_env() {
    use crate::support::fake_db::{FakeDb, TOKEN};

    init_tracing();
    let db = FakeDb::new();
    let base = db.start().await;
    let config = EditorConfig::from_json_str(
        &serde_json::json!({
            "schema": "student",
            "store": {
                "backend": "remote",
                "base_url": base,
                "db_name": "SCHOOL-DB",
                "relation": "STUDENT-TABLE",
                "token_env": "SCHOOL_DB_TOKEN",
                "timeout_ms": 2000
            }
        })
        .to_string(),
    )
    .unwrap();

    let schema = Arc::new(config.schema().unwrap());
    let store = config
        .build_store_with_env(schema.clone(), |var| {
            (var == "SCHOOL_DB_TOKEN").then(|| TOKEN.to_string())
        })
        .unwrap();
    let sink = Arc::new(BufferSink::new());
    let mut editor = RecordEditorController::new(schema, store, sink.clone());

    enter_key(&mut editor, "7").await;
    assert_eq!(editor.state().mode(), Mode::New);
    assert_eq!(
        sink.last().unwrap().text,
        "Roll No 7 not found. Please enter new data."
    );
}
