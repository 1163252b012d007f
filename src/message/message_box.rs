use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{Message, MessageSink};

/// Default time a message stays visible.
pub const DEFAULT_TTL: Duration = Duration::from_millis(3000);

/// A single-slot message display that hides itself after a fixed delay.
///
/// Showing a message replaces whatever is visible and schedules a hide on the
/// current tokio runtime. Earlier hides are not cancelled, so a hide scheduled
/// for a previous message can clear a newer one early. Outside a runtime the
/// message simply stays until the next one arrives or [`MessageBox::hide`].
#[derive(Debug, Clone)]
pub struct MessageBox {
    visible: Arc<Mutex<Option<Message>>>,
    ttl: Duration,
}

impl Default for MessageBox {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl MessageBox {
    pub fn new(ttl: Duration) -> Self {
        Self {
            visible: Arc::new(Mutex::new(None)),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The message currently on display, if any.
    pub fn visible(&self) -> Option<Message> {
        match self.visible.lock() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn hide(&self) {
        if let Ok(mut slot) = self.visible.lock() {
            *slot = None;
        }
    }
}

impl MessageSink for MessageBox {
    fn show(&self, message: &Message) {
        if let Ok(mut slot) = self.visible.lock() {
            *slot = Some(message.clone());
        }

        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let visible = Arc::clone(&self.visible);
            let ttl = self.ttl;
            runtime.spawn(async move {
                tokio::time::sleep(ttl).await;
                if let Ok(mut slot) = visible.lock() {
                    *slot = None;
                }
            });
        }
    }
}
