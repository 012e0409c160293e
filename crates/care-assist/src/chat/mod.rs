pub mod engine;
pub mod scheduler;

use parking_lot::Mutex;
use serde::Serialize;

use crate::types::ChatMessage;

/// Emitted once per message appended to the transcript, in transcript order.
pub const EVENT_CHAT_MESSAGE: &str = "chat_message";
/// Emitted when the session is reset by a scenario change.
pub const EVENT_SESSION_RESET: &str = "session_reset";
/// Emitted after knowledge spaces were switched on.
pub const EVENT_SPACES_CHANGED: &str = "spaces_changed";

/// Event sink for transcript and sidebar updates.
///
/// Called while the session lock is held, so implementations must not call
/// back into the [`engine::ChatEngine`].
pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: &str, data: serde_json::Value);
}

/// No-op emitter for callers that only read the session directly.
pub struct NoopEmitter;
impl EventEmitter for NoopEmitter {
    fn emit(&self, _event: &str, _data: serde_json::Value) {}
}

/// Keeps every event in memory. Used by tests and scripted runs.
#[derive(Default)]
pub struct CollectingEmitter {
    events: Mutex<Vec<(String, serde_json::Value)>>,
}

impl CollectingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, serde_json::Value)> {
        self.events.lock().clone()
    }

    /// Messages received through [`EVENT_CHAT_MESSAGE`], in order.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.events
            .lock()
            .iter()
            .filter(|(name, _)| name == EVENT_CHAT_MESSAGE)
            .filter_map(|(_, data)| serde_json::from_value(data.clone()).ok())
            .collect()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.lock().iter().filter(|(name, _)| name == event).count()
    }
}

impl EventEmitter for CollectingEmitter {
    fn emit(&self, event: &str, data: serde_json::Value) {
        self.events.lock().push((event.to_string(), data));
    }
}

pub(crate) fn emit_json<T: Serialize>(emitter: &dyn EventEmitter, event: &str, value: &T) {
    match serde_json::to_value(value) {
        Ok(data) => emitter.emit(event, data),
        Err(e) => tracing::warn!(event, "failed to serialize event payload: {}", e),
    }
}

pub(crate) fn emit_messages(emitter: &dyn EventEmitter, messages: &[ChatMessage]) {
    for msg in messages {
        emit_json(emitter, EVENT_CHAT_MESSAGE, msg);
    }
}
