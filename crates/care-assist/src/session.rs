//! Session state and controller
//!
//! A [`Session`] owns everything the assistant shows: the chosen scenario, its
//! knowledge spaces, the transcript and the pending input. Simulated latency
//! is modelled as a queue of [`Pending`] events; the session never sleeps
//! itself. A scheduler (or [`Session::drain`]) pops events, waits out their
//! delay and hands them back through [`Session::fire`].
//!
//! Every reset bumps the session epoch. Events carry the epoch they were
//! queued under and are dropped on fire if the session has moved on, so a
//! slow reply from an abandoned consultation never lands in the next one.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::action::{Action, ActionEffect};
use crate::config::DelayConfig;
use crate::error::{Result, SessionError};
use crate::scenario::Scenario;
use crate::space::SpaceSet;
use crate::templates;
use crate::types::{ChatMessage, MessageIds, Sender};
use crate::workflow;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Run the scenario workflow against `query`.
    Respond { query: String },
    /// Append one scripted stage of a reply.
    Post(ChatMessage),
}

/// An event waiting for its delay to elapse.
#[derive(Debug, Clone, PartialEq)]
pub struct Pending {
    pub delay: Duration,
    pub epoch: u64,
    pub event: SessionEvent,
}

#[derive(Debug)]
pub struct Session {
    id: String,
    scenario: Option<Scenario>,
    spaces: SpaceSet,
    transcript: Vec<ChatMessage>,
    input: String,
    queue: VecDeque<Pending>,
    epoch: u64,
    ids: MessageIds,
    delays: DelayConfig,
}

impl Session {
    pub fn new(delays: DelayConfig) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            scenario: None,
            spaces: SpaceSet::default(),
            transcript: Vec::new(),
            input: String::new(),
            queue: VecDeque::new(),
            epoch: 0,
            ids: MessageIds::default(),
            delays,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn scenario(&self) -> Option<&Scenario> {
        self.scenario.as_ref()
    }

    pub fn spaces(&self) -> &SpaceSet {
        &self.spaces
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    // ------------------------------------------------------------------
    // Scenario lifecycle
    // ------------------------------------------------------------------

    /// Reset and load a scenario's spaces and welcome messages.
    pub fn start(&mut self, scenario: Scenario) -> Result<()> {
        let spaces = SpaceSet::new(
            scenario.initial_personal_spaces.clone(),
            scenario.initial_org_spaces.clone(),
            scenario.shared_spaces.clone(),
        )?;

        self.reset();
        tracing::info!(
            session_id = %self.id,
            scenario = %scenario.id,
            epoch = self.epoch,
            "starting scenario"
        );
        self.spaces = spaces;
        self.transcript = scenario.initial_messages.clone();
        self.scenario = Some(scenario);
        Ok(())
    }

    /// Return to the scenario selector with every piece of state cleared.
    pub fn back_to_selector(&mut self) {
        tracing::info!(session_id = %self.id, "back to scenario selector");
        self.reset();
    }

    fn reset(&mut self) {
        let dropped = self.queue.len();
        if dropped > 0 {
            tracing::debug!(dropped, "discarding queued replies on reset");
        }
        self.scenario = None;
        self.spaces = SpaceSet::default();
        self.transcript.clear();
        self.input.clear();
        self.queue.clear();
        self.epoch += 1;
    }

    fn require_scenario(&self) -> Result<&Scenario> {
        self.scenario.as_ref().ok_or(SessionError::NoActiveScenario)
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Send the pending input if it has any non-whitespace content.
    ///
    /// Returns whether anything was sent. The input is cleared on send.
    pub fn submit_input(&mut self) -> Result<bool> {
        if self.input.trim().is_empty() {
            return Ok(false);
        }
        self.require_scenario()?;
        let text = std::mem::take(&mut self.input);
        self.send_message(&text)?;
        Ok(true)
    }

    /// Record the user's message and schedule the workflow.
    ///
    /// Blank content adds nothing to the transcript but still schedules the
    /// workflow, which is how activations re-run it.
    pub fn send_message(&mut self, content: &str) -> Result<()> {
        self.require_scenario()?;

        if !content.trim().is_empty() {
            let msg = ChatMessage::new(self.ids.next("user"), Sender::User, content);
            self.transcript.push(msg);
        }

        let delay = self.delays.response();
        self.enqueue(delay, SessionEvent::Respond { query: content.to_string() });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    /// Dispatch a raw button token. Unknown tokens are ignored.
    pub fn trigger_token(&mut self, token: &str) -> Result<()> {
        match token.parse::<Action>() {
            Ok(action) => self.trigger(action),
            Err(e) => {
                tracing::warn!(token, "ignoring action: {}", e);
                Ok(())
            }
        }
    }

    pub fn trigger(&mut self, action: Action) -> Result<()> {
        self.require_scenario()?;
        tracing::debug!(action = %action, "dispatching action");

        match action.effect() {
            ActionEffect::Query(text) => self.send_message(text)?,
            ActionEffect::ActivateAndRespond { scope, query } => {
                let targets = scope.resolve(&self.spaces);
                if targets.is_empty() {
                    tracing::warn!(action = %action, "no spaces to activate in this scenario");
                    return Ok(());
                }
                self.spaces = self.spaces.activated(targets.as_slice())?;
                tracing::info!(spaces = ?targets, "activated knowledge spaces");

                let delay = self.delays.activation();
                self.enqueue(delay, SessionEvent::Respond { query: query.to_string() });
            }
            ActionEffect::Activate { space_id } => {
                let Some(name) = self.spaces.get(space_id).map(|s| s.name.clone()) else {
                    tracing::warn!(action = %action, space_id, "space not in this scenario");
                    return Ok(());
                };
                self.spaces = self.spaces.activated(&[space_id])?;
                tracing::info!(space_id, "activated knowledge space");

                let confirm = ChatMessage::new(
                    self.ids.next("confirm"),
                    Sender::System,
                    templates::space_added(&name),
                );
                self.transcript.push(confirm);
            }
            ActionEffect::Post => {
                if let Some(msg) = action.reply(&self.spaces, &mut self.ids) {
                    self.transcript.push(msg);
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Pending events
    // ------------------------------------------------------------------

    fn enqueue(&mut self, delay: Duration, event: SessionEvent) {
        self.queue.push_back(Pending {
            delay,
            epoch: self.epoch,
            event,
        });
    }

    pub fn pop_pending(&mut self) -> Option<Pending> {
        self.queue.pop_front()
    }

    /// Apply an event whose delay has elapsed. Returns how many messages were
    /// appended to the transcript.
    pub fn fire(&mut self, pending: Pending) -> usize {
        if pending.epoch != self.epoch {
            tracing::debug!(
                event_epoch = pending.epoch,
                session_epoch = self.epoch,
                "dropping stale reply"
            );
            return 0;
        }

        match pending.event {
            SessionEvent::Post(mut msg) => {
                // Staged messages are built early; date them when they land.
                msg.timestamp = Utc::now();
                self.transcript.push(msg);
                1
            }
            SessionEvent::Respond { query } => {
                let Some(kind) = self.scenario.as_ref().map(|s| s.workflow) else {
                    return 0;
                };
                let plan =
                    workflow::respond(kind, &query, &self.spaces, &self.delays, &mut self.ids);
                let appended = plan.immediate.len();
                self.transcript.extend(plan.immediate);

                // Stages run before anything queued earlier, in their own order.
                for stage in plan.staged.into_iter().rev() {
                    self.queue.push_front(Pending {
                        delay: stage.delay,
                        epoch: self.epoch,
                        event: SessionEvent::Post(stage.message),
                    });
                }
                appended
            }
        }
    }

    /// Fire every pending event without waiting, including the stages they
    /// schedule. Returns the total delay that a real scheduler would have spent.
    pub fn drain(&mut self) -> Duration {
        let mut elapsed = Duration::ZERO;
        while let Some(pending) = self.pop_pending() {
            elapsed += pending.delay;
            self.fire(pending);
        }
        elapsed
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DelayConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScenarioId;
    use crate::types::{Relevance, SpaceKind};

    fn started(id: ScenarioId) -> Session {
        let mut session = Session::default();
        session.start(Scenario::get(id)).unwrap();
        session
    }

    #[test]
    fn test_send_requires_scenario() {
        let mut session = Session::default();
        assert!(matches!(
            session.send_message("protocol"),
            Err(SessionError::NoActiveScenario)
        ));
        assert!(matches!(
            session.trigger(Action::ShowActive),
            Err(SessionError::NoActiveScenario)
        ));
    }

    #[test]
    fn test_user_message_appended_before_reply() {
        let mut session = started(ScenarioId::Diabetes);
        let before = session.transcript().len();

        session.send_message("  Any protocol for DKA?  ").unwrap();
        assert_eq!(session.transcript().len(), before + 1);
        let user = session.transcript().last().unwrap();
        assert_eq!(user.sender, Sender::User);
        assert_eq!(user.content, "  Any protocol for DKA?  ");
        assert_eq!(session.pending_len(), 1);

        session.drain();
        let after: Vec<_> = session.transcript()[before..].iter().map(|m| m.sender).collect();
        assert_eq!(after, vec![Sender::User, Sender::Assistant, Sender::Assistant, Sender::System]);
    }

    #[test]
    fn test_blank_message_not_recorded() {
        let mut session = started(ScenarioId::Diabetes);
        let before = session.transcript().len();
        session.send_message("   ").unwrap();
        assert_eq!(session.transcript().len(), before);
        assert_eq!(session.pending_len(), 1);
    }

    #[test]
    fn test_submit_input_clears_and_skips_blank() {
        let mut session = started(ScenarioId::Diabetes);
        session.set_input("   ");
        assert!(!session.submit_input().unwrap());

        session.set_input("treatment options");
        assert!(session.submit_input().unwrap());
        assert_eq!(session.input(), "");
        assert_eq!(session.transcript().last().unwrap().content, "treatment options");
    }

    #[test]
    fn test_drain_reports_chained_delay() {
        let mut session = started(ScenarioId::Diabetes);
        session.send_message("diabetes protocol").unwrap();
        assert_eq!(session.drain(), Duration::from_millis(1000 + 1000 + 500));
        assert!(!session.has_pending());
    }

    #[test]
    fn test_stages_fire_before_later_messages() {
        let mut session = started(ScenarioId::Diabetes);
        session.send_message("diabetes protocol").unwrap();
        session.send_message("hello").unwrap();

        let first = session.pop_pending().unwrap();
        session.fire(first);
        // the two staged follow-ups now sit in front of the second question
        assert_eq!(session.pending_len(), 3);
        assert!(matches!(session.pop_pending().unwrap().event, SessionEvent::Post(_)));
    }

    #[test]
    fn test_include_all_org_is_idempotent() {
        let mut session = started(ScenarioId::Diabetes);
        session.trigger(Action::IncludeAllOrg).unwrap();
        let once = session.spaces().clone();
        session.trigger(Action::IncludeAllOrg).unwrap();
        assert_eq!(session.spaces(), &once);
        assert_eq!(session.spaces().active(SpaceKind::Organization).len(), 3);
    }

    #[test]
    fn test_include_all_org_responds_with_protocol() {
        let mut session = started(ScenarioId::Diabetes);
        session.trigger(Action::IncludeAllOrg).unwrap();
        assert_eq!(session.drain(), Duration::from_millis(500));

        let msg = session.transcript().last().unwrap();
        let ids: Vec<_> = msg.sources.iter().map(|s| s.space_id.as_str()).collect();
        assert_eq!(ids, vec!["o1", "o2", "o3"]);
        assert!(msg.sources.iter().all(|s| s.relevance == Relevance::High));
    }

    #[test]
    fn test_select_single_space_confirms() {
        let mut session = started(ScenarioId::Diabetes);
        session.trigger(Action::SelectPharmacy).unwrap();
        assert!(session.spaces().get("o3").unwrap().is_active);
        assert!(!session.spaces().get("o1").unwrap().is_active);
        assert!(!session.has_pending());
        assert_eq!(
            session.transcript().last().unwrap().content,
            "✓ Added Pharmacy Treatment Standards to your search scope."
        );
    }

    #[test]
    fn test_select_space_outside_scenario_is_noop() {
        let mut session = started(ScenarioId::MultiDomain);
        let before = session.transcript().len();
        let spaces = session.spaces().clone();

        session.trigger_token("select_emergency").unwrap();
        assert_eq!(session.transcript().len(), before);
        assert_eq!(session.spaces(), &spaces);
        assert!(!session.has_pending());
    }

    #[test]
    fn test_staged_messages_dated_when_appended() {
        let mut session = started(ScenarioId::Diabetes);
        session.send_message("diabetes protocol").unwrap();
        let respond = session.pop_pending().unwrap();
        session.fire(respond);

        std::thread::sleep(Duration::from_millis(20));
        session.send_message("hello").unwrap();
        std::thread::sleep(Duration::from_millis(20));
        let suggestion = session.pop_pending().unwrap();
        session.fire(suggestion);

        let transcript = session.transcript();
        assert_eq!(transcript.last().unwrap().sender, Sender::Assistant);
        for pair in transcript.windows(2) {
            assert!(
                pair[0].timestamp <= pair[1].timestamp,
                "{} is dated before {}",
                pair[1].id,
                pair[0].id
            );
        }
    }

    #[test]
    fn test_quick_reply_submits_canned_question() {
        let mut session = started(ScenarioId::Diabetes);
        session.trigger_token("search_diabetes_protocols").unwrap();

        let question = session.transcript().last().unwrap();
        assert_eq!(question.sender, Sender::User);
        assert_eq!(question.content, "What are the current diabetes management protocols?");
        assert_eq!(session.pending_len(), 1);

        session.drain();
        let replies = &session.transcript()[2..];
        assert_eq!(replies.len(), 3);
        assert!(replies[0].sources.iter().all(|s| s.relevance == Relevance::Low));
        assert!(replies[1].system_suggestion);
        assert_eq!(replies[2].sender, Sender::System);
    }

    #[test]
    fn test_heart_quick_reply_reaches_cardiology_gap() {
        let mut session = started(ScenarioId::MultiDomain);
        session.trigger(Action::SearchHeartLifestyle).unwrap();
        assert_eq!(
            session.transcript().last().unwrap().content,
            "How do we manage heart failure in diabetic patients?"
        );

        session.drain();
        let gap = &session.transcript()[2];
        assert_eq!(gap.sender, Sender::Assistant);
        assert_eq!(gap.content, templates::CARDIOLOGY_GAP);
        let tokens: Vec<_> = session.transcript()[3]
            .actions
            .iter()
            .map(|a| a.action.as_str())
            .collect();
        assert_eq!(tokens, vec!["include_cardiology_spaces", "select_cardiology", "select_peer"]);
    }

    #[test]
    fn test_unknown_token_is_noop() {
        let mut session = started(ScenarioId::Diabetes);
        let before = session.transcript().to_vec();
        session.trigger_token("open_pod_bay_doors").unwrap();
        assert_eq!(session.transcript(), before.as_slice());
        assert!(!session.has_pending());
    }

    #[test]
    fn test_cardiology_bulk_activation_skipped_without_spaces() {
        let mut session = started(ScenarioId::Diabetes);
        session.trigger(Action::IncludeCardiologySpaces).unwrap();
        assert!(!session.has_pending());
    }

    #[test]
    fn test_back_to_selector_clears_everything() {
        let mut session = started(ScenarioId::MultiDomain);
        session.set_input("half typed");
        session.send_message("heart failure").unwrap();

        session.back_to_selector();
        assert!(session.scenario().is_none());
        assert!(session.spaces().is_empty());
        assert!(session.transcript().is_empty());
        assert_eq!(session.input(), "");
        assert!(!session.has_pending());
    }

    #[test]
    fn test_stale_event_dropped_after_reset() {
        let mut session = started(ScenarioId::Diabetes);
        session.send_message("diabetes protocol").unwrap();
        let stale = session.pop_pending().unwrap();

        session.start(Scenario::get(ScenarioId::MultiDomain)).unwrap();
        let before = session.transcript().len();
        assert_eq!(session.fire(stale), 0);
        assert_eq!(session.transcript().len(), before);
    }

    #[test]
    fn test_show_active_lists_shared_only_when_present() {
        let mut session = started(ScenarioId::Diabetes);
        session.trigger(Action::ShowActive).unwrap();
        assert!(!session.transcript().last().unwrap().content.contains("Shared"));

        let mut session = started(ScenarioId::MultiDomain);
        session.trigger(Action::ShowActive).unwrap();
        let content = &session.transcript().last().unwrap().content;
        assert!(content.contains("**Shared (0 active):**"));
        assert!(content.contains("• Nutrition Guidelines for Diabetes (95 documents)"));
    }
}
