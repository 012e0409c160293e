use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use super::scheduler::{ReplyScheduler, SchedulerSignals};
use super::{emit_json, emit_messages, EventEmitter, EVENT_SESSION_RESET, EVENT_SPACES_CHANGED};
use crate::action::Action;
use crate::config::AssistConfig;
use crate::error::Result;
use crate::scenario::{Scenario, ScenarioId};
use crate::session::Session;

/// Owns the session and the scheduler that plays out its delayed replies.
///
/// Every method applies its change synchronously and emits the resulting
/// messages before returning; staged follow-ups arrive later through the same
/// emitter. Must be created inside a tokio runtime.
pub struct ChatEngine {
    session: Arc<Mutex<Session>>,
    emitter: Arc<dyn EventEmitter>,
    signals: SchedulerSignals,
    scheduler: Option<JoinHandle<()>>,
    config: AssistConfig,
}

impl ChatEngine {
    pub fn new(config: AssistConfig, emitter: Arc<dyn EventEmitter>) -> Self {
        let session = Arc::new(Mutex::new(Session::new(config.delays)));
        let signals = SchedulerSignals::default();
        let scheduler = ReplyScheduler::new(session.clone(), emitter.clone(), signals.clone());
        let handle = tokio::spawn(scheduler.run());

        Self {
            session,
            emitter,
            signals,
            scheduler: Some(handle),
            config,
        }
    }

    pub fn config(&self) -> &AssistConfig {
        &self.config
    }

    /// Read the current session state.
    pub fn with_session<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        f(&self.session.lock())
    }

    pub fn start_scenario(&self, id: ScenarioId) -> Result<()> {
        self.apply(|s| s.start(Scenario::get(id)))
    }

    pub fn back_to_selector(&self) {
        // back_to_selector cannot fail
        let _ = self.apply(|s| {
            s.back_to_selector();
            Ok(())
        });
    }

    pub fn set_input(&self, text: &str) {
        self.session.lock().set_input(text);
    }

    pub fn submit_input(&self) -> Result<bool> {
        self.apply(|s| s.submit_input())
    }

    pub fn send_message(&self, content: &str) -> Result<()> {
        self.apply(|s| s.send_message(content))
    }

    pub fn trigger(&self, action: Action) -> Result<()> {
        self.apply(|s| s.trigger(action))
    }

    /// Dispatch a raw button token; unknown tokens are ignored.
    pub fn trigger_token(&self, token: &str) -> Result<()> {
        self.apply(|s| s.trigger_token(token))
    }

    fn apply<R>(&self, op: impl FnOnce(&mut Session) -> Result<R>) -> Result<R> {
        let mut session = self.session.lock();
        let epoch = session.epoch();
        let before = session.transcript().len();
        let spaces_before = session.spaces().clone();

        let result = op(&mut session);

        let reset = session.epoch() != epoch;
        if reset {
            emit_json(
                self.emitter.as_ref(),
                EVENT_SESSION_RESET,
                &serde_json::json!({
                    "sessionId": session.id(),
                    "scenario": session.scenario().map(|s| s.id),
                }),
            );
        }
        if reset || session.spaces() != &spaces_before {
            emit_json(self.emitter.as_ref(), EVENT_SPACES_CHANGED, session.spaces());
        }

        let fresh = if reset { 0 } else { before };
        if let Some(new_messages) = session.transcript().get(fresh..) {
            emit_messages(self.emitter.as_ref(), new_messages);
        }

        let queued = session.has_pending();
        drop(session);

        if reset {
            self.signals.reset.notify_waiters();
        }
        if queued {
            self.signals.wake.notify_one();
        }
        result
    }

    /// Stop the scheduler. Queued replies are abandoned.
    pub async fn shutdown(mut self) {
        self.signals.cancel();
        if let Some(handle) = self.scheduler.take() {
            if let Err(e) = handle.await {
                tracing::warn!("reply scheduler ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for ChatEngine {
    fn drop(&mut self) {
        if let Some(handle) = self.scheduler.take() {
            self.signals.cancel();
            handle.abort();
        }
    }
}
