use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::{perform, RecordEditorController};
use crate::error::{EditorError, StoreError};
use crate::form::{Command, Effect, Event, FormState, Ticket};
use crate::store::Store;

/// Counters reported by an editor task when it stops.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EditorStats {
    /// Commands received.
    pub commands: usize,
    /// Store calls started.
    pub store_calls: usize,
    /// Completions that arrived for a call the form no longer waited on.
    pub stale_results: usize,
}

#[derive(Debug)]
enum Inbox {
    Command(Command),
    Completed(Event),
    Snapshot(oneshot::Sender<FormState>),
    Settled(oneshot::Sender<()>),
    Stop,
}

/// The completion a store call owes, known before the call runs.
#[derive(Debug, Clone, Copy)]
enum CallKind {
    Lookup(Ticket),
    Write(Ticket),
}

impl CallKind {
    fn of(effect: &Effect) -> Option<Self> {
        match effect {
            Effect::Lookup { ticket, .. } => Some(CallKind::Lookup(*ticket)),
            Effect::Create { ticket, .. } | Effect::Update { ticket, .. } => {
                Some(CallKind::Write(*ticket))
            }
            Effect::Notify(_) => None,
        }
    }

    fn ticket(self) -> Ticket {
        match self {
            CallKind::Lookup(ticket) | CallKind::Write(ticket) => ticket,
        }
    }

    /// Completion reporting that the call never produced a result.
    fn failed(self, error: StoreError) -> Event {
        match self {
            CallKind::Lookup(ticket) => Event::LookupCompleted {
                ticket,
                result: Err(error),
            },
            CallKind::Write(ticket) => Event::WriteCompleted {
                ticket,
                result: Err(error),
            },
        }
    }
}

/// Handle to a controller running in its own tokio task. Drop or call
/// `stop()` to shut down.
///
/// The form is only ever touched by that task. Store calls run as separate
/// tasks and post their completions back into the same inbox, so commands
/// keep flowing while a call is in flight.
///
/// ## Example
///
/// ```ignore
/// let handle = EditorHandle::spawn(controller);
/// handle.send(Command::input("id", "E1"))?;
/// handle.send(Command::OnKeyBlur)?;
/// handle.settled().await?;
/// assert_eq!(handle.snapshot().await?.mode(), Mode::New);
/// let stats = handle.stop().await;
/// ```
pub struct EditorHandle {
    inbox: mpsc::UnboundedSender<Inbox>,
    task: Option<JoinHandle<EditorStats>>,
}

impl EditorHandle {
    /// Move `controller` into a new task on the current tokio runtime.
    pub fn spawn<S>(controller: RecordEditorController<S>) -> Self
    where
        S: Store + ?Sized + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(controller, tx.clone(), rx));
        Self {
            inbox: tx,
            task: Some(task),
        }
    }

    pub fn send(&self, command: Command) -> Result<(), EditorError> {
        self.inbox
            .send(Inbox::Command(command))
            .map_err(|_| EditorError::Closed)
    }

    /// Copy of the form state once every earlier message has been handled.
    pub async fn snapshot(&self) -> Result<FormState, EditorError> {
        let (tx, rx) = oneshot::channel();
        self.inbox
            .send(Inbox::Snapshot(tx))
            .map_err(|_| EditorError::Closed)?;
        rx.await.map_err(|_| EditorError::Closed)
    }

    /// Wait until every earlier command has been handled and no store call
    /// is in flight.
    pub async fn settled(&self) -> Result<(), EditorError> {
        let (tx, rx) = oneshot::channel();
        self.inbox
            .send(Inbox::Settled(tx))
            .map_err(|_| EditorError::Closed)?;
        rx.await.map_err(|_| EditorError::Closed)
    }

    /// Stop the task and wait for it to finish. Returns stats.
    pub async fn stop(mut self) -> EditorStats {
        let _ = self.inbox.send(Inbox::Stop);
        match self.task.take() {
            Some(task) => task.await.unwrap_or_default(),
            None => EditorStats::default(),
        }
    }
}

impl Drop for EditorHandle {
    fn drop(&mut self) {
        let _ = self.inbox.send(Inbox::Stop);
    }
}

async fn run<S>(
    mut controller: RecordEditorController<S>,
    inbox: mpsc::UnboundedSender<Inbox>,
    mut rx: mpsc::UnboundedReceiver<Inbox>,
) -> EditorStats
where
    S: Store + ?Sized + 'static,
{
    let mut stats = EditorStats::default();
    let mut in_flight = 0usize;
    let mut waiting: Vec<oneshot::Sender<()>> = Vec::new();

    while let Some(message) = rx.recv().await {
        let event = match message {
            Inbox::Command(command) => {
                stats.commands += 1;
                Some(Event::from(command))
            }
            Inbox::Completed(event) => {
                in_flight = in_flight.saturating_sub(1);
                if event.ticket() != controller.state().pending_ticket() {
                    stats.stale_results += 1;
                }
                Some(event)
            }
            Inbox::Snapshot(reply) => {
                let _ = reply.send(controller.state().clone());
                None
            }
            Inbox::Settled(reply) => {
                waiting.push(reply);
                None
            }
            Inbox::Stop => break,
        };

        if let Some(event) = event {
            for call in controller.step(event) {
                let Some(kind) = CallKind::of(&call) else {
                    continue;
                };
                stats.store_calls += 1;
                in_flight += 1;
                let store = Arc::clone(controller.store());
                let inbox = inbox.clone();
                let call = tokio::spawn(async move { perform(store.as_ref(), call).await });
                tokio::spawn(async move {
                    let completion = match call.await {
                        Ok(completion) => completion,
                        Err(e) => {
                            tracing::error!(ticket = kind.ticket(), error = %e, "store call died");
                            Some(kind.failed(StoreError::Transport(format!(
                                "store call failed: {}",
                                e
                            ))))
                        }
                    };
                    if let Some(completion) = completion {
                        let _ = inbox.send(Inbox::Completed(completion));
                    }
                });
            }
        }

        if in_flight == 0 {
            for reply in waiting.drain(..) {
                let _ = reply.send(());
            }
        }
    }

    tracing::debug!(
        commands = stats.commands,
        store_calls = stats.store_calls,
        stale_results = stats.stale_results,
        "editor task stopped"
    );
    stats
}
