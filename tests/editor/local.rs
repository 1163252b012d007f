//! Full editor flows against the local store.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use record_editor::{Buttons, Command, Level, LocalStore, Mode, Record, Schema, Store};

use crate::support::stores::{CountingStore, FailingStore};
use crate::support::{employee_editor, enter_key, fill, last_text, ALICE};

fn counting_store() -> Arc<CountingStore<LocalStore>> {
    Arc::new(CountingStore::new(LocalStore::new(Schema::employee())))
}

#[tokio::test]
async fn new_record_is_saved_and_form_resets() {
    let store = counting_store();
    let (mut editor, sink) = employee_editor(store.clone());

    enter_key(&mut editor, "E1").await;
    assert_eq!(editor.state().mode(), Mode::New);
    fill(&mut editor, ALICE).await;
    editor.dispatch(Command::OnSave).await;

    let stored = store.lookup("E1").await.unwrap().unwrap();
    assert_eq!(stored.get("id"), Some("E1"));
    assert_eq!(stored.get("name"), Some("Alice"));
    assert_eq!(stored.get("deduction"), Some("1000"));
    assert_eq!(store.creates.load(Ordering::SeqCst), 1);

    assert_eq!(editor.state().mode(), Mode::Empty);
    assert_eq!(editor.state().key(), "");
    assert_eq!(
        last_text(&sink),
        "Employee Alice (Employee ID: E1) saved successfully!"
    );
}

#[tokio::test]
async fn numeric_fields_are_stored_as_numbers() {
    let store = Arc::new(LocalStore::new(Schema::employee()));
    let (mut editor, _) = employee_editor(store.clone());

    enter_key(&mut editor, "E1").await;
    fill(&mut editor, ALICE).await;
    editor.dispatch(Command::OnSave).await;

    let raw: serde_json::Value =
        serde_json::from_str(&store.raw("E1").unwrap().unwrap()).unwrap();
    assert_eq!(raw["salary"], 50000);
    assert_eq!(raw["name"], "Alice");
}

#[tokio::test]
async fn existing_record_is_updated() {
    let store = counting_store();
    store
        .create(
            "E1",
            &Record::new()
                .with("id", "E1")
                .with("name", "Alice")
                .with("salary", "50000"),
        )
        .await
        .unwrap();
    let (mut editor, sink) = employee_editor(store.clone());

    enter_key(&mut editor, "E1").await;
    assert_eq!(editor.state().mode(), Mode::Existing);
    assert_eq!(editor.state().value("name"), Some("Alice"));
    assert!(!editor.state().is_enabled("id"));
    assert_eq!(
        last_text(&sink),
        "Employee ID E1 found. You can update the data."
    );

    fill(&mut editor, ALICE).await;
    editor.dispatch(Command::input("name", "Bob")).await;
    editor.dispatch(Command::OnUpdate).await;

    let stored = store.lookup("E1").await.unwrap().unwrap();
    assert_eq!(stored.get("name"), Some("Bob"));
    assert_eq!(stored.get("salary"), Some("50000"));
    assert_eq!(stored.get("hra"), Some("5000"));
    assert_eq!(store.updates.load(Ordering::SeqCst), 1);
    assert_eq!(editor.state().mode(), Mode::Empty);
    assert_eq!(sink.last().unwrap().level, Level::Success);
}

#[tokio::test]
async fn incomplete_record_is_never_written() {
    let store = counting_store();
    let (mut editor, sink) = employee_editor(store.clone());

    enter_key(&mut editor, "E1").await;
    fill(&mut editor, &ALICE[..4]).await;
    editor.dispatch(Command::OnSave).await;

    assert_eq!(store.writes(), 0);
    assert!(store.inner().is_empty());
    assert_eq!(editor.state().mode(), Mode::New);
    assert_eq!(editor.state().invalid_fields(), vec!["deduction"]);
    assert_eq!(last_text(&sink), "Please fill in all required fields.");
}

#[tokio::test]
async fn reset_and_empty_key_restore_initial_state() {
    let store = counting_store();
    let (mut editor, sink) = employee_editor(store);

    enter_key(&mut editor, "E1").await;
    fill(&mut editor, ALICE).await;
    editor.dispatch(Command::OnReset).await;
    assert_eq!(last_text(&sink), "Form has been reset.");
    assert_initial(&editor.state().fields(), editor.state().buttons());

    editor.dispatch(Command::OnReset).await;
    assert_initial(&editor.state().fields(), editor.state().buttons());

    enter_key(&mut editor, "E2").await;
    fill(&mut editor, ALICE).await;
    editor.dispatch(Command::input("id", "")).await;
    assert_eq!(editor.state().mode(), Mode::Empty);
    assert_initial(&editor.state().fields(), editor.state().buttons());
}

fn assert_initial(fields: &[record_editor::FieldView<'_>], buttons: Buttons) {
    assert_eq!(buttons, Buttons::NONE);
    for field in fields {
        assert_eq!(field.value, "", "field {} not cleared", field.spec.id);
        assert!(!field.invalid);
        assert_eq!(field.enabled, field.spec.key);
    }
}

#[tokio::test]
async fn saving_a_key_created_elsewhere_conflicts() {
    let store = counting_store();
    let (mut editor, sink) = employee_editor(store.clone());

    enter_key(&mut editor, "E1").await;
    store
        .create("E1", &Record::new().with("id", "E1").with("name", "Eve"))
        .await
        .unwrap();
    fill(&mut editor, ALICE).await;
    editor.dispatch(Command::OnSave).await;

    assert_eq!(editor.state().mode(), Mode::New);
    assert_eq!(editor.state().value("name"), Some("Alice"));
    assert_eq!(
        last_text(&sink),
        "Employee with Employee ID E1 already exists. Use Update to change it."
    );
    let stored = store.lookup("E1").await.unwrap().unwrap();
    assert_eq!(stored.get("name"), Some("Eve"));
}

#[tokio::test]
async fn write_failure_keeps_entered_values() {
    let (mut editor, sink) = employee_editor(Arc::new(FailingStore::network_down()));

    enter_key(&mut editor, "E1").await;
    fill(&mut editor, ALICE).await;
    editor.dispatch(Command::OnSave).await;

    assert_eq!(editor.state().mode(), Mode::New);
    assert_eq!(editor.state().value("salary"), Some("50000"));
    assert!(editor.state().buttons().save);
    let message = sink.last().unwrap();
    assert_eq!(message.level, Level::Danger);
    assert!(message.text.contains("network unreachable"));
}

#[tokio::test]
async fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("employees.json");

    {
        let store = Arc::new(LocalStore::open(Schema::employee(), &path).unwrap());
        let (mut editor, _) = employee_editor(store);
        enter_key(&mut editor, "E1").await;
        fill(&mut editor, ALICE).await;
        editor.dispatch(Command::OnSave).await;
    }

    let store = Arc::new(LocalStore::open(Schema::employee(), &path).unwrap());
    let (mut editor, _) = employee_editor(store);
    enter_key(&mut editor, "E1").await;
    assert_eq!(editor.state().mode(), Mode::Existing);
    assert_eq!(editor.state().value("name"), Some("Alice"));
}
