//! EditorHandle: the controller running in its own task.

use std::sync::Arc;
use std::time::Duration;

use record_editor::{
    BufferSink, Command, EditorHandle, EditorStats, LocalStore, Message, Mode,
    RecordEditorController, Schema, Store,
};

use crate::support::init_tracing;
use crate::support::stores::{GatedStore, PanickingStore};

fn gated_editor() -> (EditorHandle, Arc<GatedStore<LocalStore>>, BufferSink) {
    init_tracing();
    let store = Arc::new(GatedStore::new(LocalStore::new(Schema::employee())));
    let sink = BufferSink::new();
    let controller =
        RecordEditorController::new(Schema::employee(), store.clone(), Arc::new(sink.clone()));
    (EditorHandle::spawn(controller), store, sink)
}

#[tokio::test]
async fn form_is_checking_while_lookup_is_held() {
    let (handle, store, _) = gated_editor();
    handle.send(Command::input("id", "E1")).unwrap();
    handle.send(Command::OnKeyBlur).unwrap();

    let state = handle.snapshot().await.unwrap();
    assert_eq!(state.mode(), Mode::Checking);
    assert!(state.is_busy());
    assert!(!state.is_enabled("id"));

    store.release(1);
    handle.settled().await.unwrap();
    assert_eq!(handle.snapshot().await.unwrap().mode(), Mode::New);
}

#[tokio::test]
async fn triggers_while_busy_are_rejected() {
    let (handle, store, sink) = gated_editor();
    handle.send(Command::input("id", "E1")).unwrap();
    handle.send(Command::OnKeyBlur).unwrap();
    handle.send(Command::OnReset).unwrap();
    handle.send(Command::OnKeyBlur).unwrap();
    handle.send(Command::input("id", "E2")).unwrap();

    let state = handle.snapshot().await.unwrap();
    assert_eq!(state.mode(), Mode::Checking);
    assert_eq!(state.key(), "E1");
    assert_eq!(
        sink.messages(),
        vec![Message::warning("Another operation is still in progress.")]
    );

    store.release(1);
    handle.settled().await.unwrap();
    let state = handle.snapshot().await.unwrap();
    assert_eq!(state.mode(), Mode::New);
    assert_eq!(state.key(), "E1");

    let stats = handle.stop().await;
    assert_eq!(
        stats,
        EditorStats {
            commands: 5,
            store_calls: 1,
            stale_results: 0
        }
    );
}

#[tokio::test]
async fn save_round_trip_through_handle() {
    let (handle, store, sink) = gated_editor();
    store.release(2);

    handle.send(Command::input("id", "E1")).unwrap();
    handle.send(Command::OnKeyBlur).unwrap();
    handle.settled().await.unwrap();
    for (field, value) in crate::support::ALICE {
        handle.send(Command::input(*field, *value)).unwrap();
    }
    handle.send(Command::OnSave).unwrap();
    handle.settled().await.unwrap();

    assert_eq!(handle.snapshot().await.unwrap().mode(), Mode::Empty);
    store.release(1);
    assert!(store.lookup("E1").await.unwrap().is_some());
    assert_eq!(
        sink.last().unwrap().text,
        "Employee Alice (Employee ID: E1) saved successfully!"
    );
}

#[tokio::test]
async fn idle_handle_stops_cleanly() {
    let (handle, _, _) = gated_editor();
    handle.settled().await.unwrap();
    assert_eq!(handle.snapshot().await.unwrap().mode(), Mode::Empty);

    let stats = handle.stop().await;
    assert_eq!(stats, EditorStats::default());
}

#[tokio::test]
async fn stop_with_call_in_flight_does_not_wait_for_store() {
    let (handle, _, _) = gated_editor();
    handle.send(Command::input("id", "E1")).unwrap();
    handle.send(Command::OnKeyBlur).unwrap();
    handle.snapshot().await.unwrap();

    let stats = handle.stop().await;
    assert_eq!(stats.store_calls, 1);
    assert_eq!(stats.commands, 2);
}

#[tokio::test]
async fn panicking_store_call_releases_the_form() {
    init_tracing();
    let sink = BufferSink::new();
    let controller = RecordEditorController::new(
        Schema::employee(),
        Arc::new(PanickingStore),
        Arc::new(sink.clone()),
    );
    let handle = EditorHandle::spawn(controller);

    handle.send(Command::input("id", "E1")).unwrap();
    handle.send(Command::OnKeyBlur).unwrap();
    tokio::time::timeout(Duration::from_secs(2), handle.settled())
        .await
        .expect("form settles after a failed store call")
        .unwrap();

    let state = handle.snapshot().await.unwrap();
    assert_eq!(state.mode(), Mode::Empty);
    assert!(!state.is_busy());
    assert_eq!(state.key(), "E1");
    let message = sink.last().unwrap();
    assert_eq!(message.level, record_editor::Level::Danger);
    assert!(message.text.starts_with("Error: store call failed"));

    handle.send(Command::OnReset).unwrap();
    handle.settled().await.unwrap();
    assert_eq!(sink.last(), Some(Message::success("Form has been reset.")));

    let stats = handle.stop().await;
    assert_eq!(stats.store_calls, 1);
    assert_eq!(stats.stale_results, 0);
}
