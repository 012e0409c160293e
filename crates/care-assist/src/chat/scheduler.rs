//! Single-loop consumer of the session's pending events.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use super::{emit_messages, EventEmitter};
use crate::session::Session;

/// Signals shared between the scheduler loop and its owner.
#[derive(Clone, Default)]
pub struct SchedulerSignals {
    /// New events were queued.
    pub wake: Arc<Notify>,
    /// The session was reset; cut the current wait short.
    pub reset: Arc<Notify>,
    pub cancelled: Arc<AtomicBool>,
}

impl SchedulerSignals {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.wake.notify_one();
        self.reset.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

pub struct ReplyScheduler {
    session: Arc<Mutex<Session>>,
    emitter: Arc<dyn EventEmitter>,
    signals: SchedulerSignals,
}

impl ReplyScheduler {
    pub fn new(
        session: Arc<Mutex<Session>>,
        emitter: Arc<dyn EventEmitter>,
        signals: SchedulerSignals,
    ) -> Self {
        Self {
            session,
            emitter,
            signals,
        }
    }

    /// Run until cancelled. Events are handled strictly one at a time, so a
    /// stage's delay only starts once the previous stage has fired.
    pub async fn run(self) {
        tracing::debug!("reply scheduler started");
        loop {
            if self.signals.is_cancelled() {
                break;
            }

            // Register for resets before taking the event so none slip through.
            let reset = self.signals.reset.notified();
            tokio::pin!(reset);
            reset.as_mut().enable();

            let next = self.session.lock().pop_pending();
            let Some(pending) = next else {
                self.signals.wake.notified().await;
                continue;
            };

            if !pending.delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(pending.delay) => {}
                    _ = &mut reset => {
                        tracing::debug!("wait interrupted by session reset");
                    }
                }
            }
            if self.signals.is_cancelled() {
                break;
            }

            // Emit under the lock so listeners see messages in transcript order.
            let mut session = self.session.lock();
            let before = session.transcript().len();
            let appended = session.fire(pending);
            if appended > 0 {
                emit_messages(self.emitter.as_ref(), &session.transcript()[before..]);
            }
        }
        tracing::debug!("reply scheduler stopped");
    }
}
