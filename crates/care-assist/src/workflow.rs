//! Workflow handlers
//!
//! Given a question and the current knowledge spaces, pick the scripted answer
//! and the follow-up narration. The state of each workflow is implied by which
//! spaces are active; nothing else is remembered between turns.

use std::time::Duration;

use crate::action::Action;
use crate::config::DelayConfig;
use crate::router::QueryClassifier;
use crate::scenario::WorkflowKind;
use crate::space::{SpaceSet, CARDIOLOGY_TAG};
use crate::templates;
use crate::types::{
    ActionVariant, ChatMessage, KnowledgeSpace, MessageAction, MessageIds, Relevance, Sender,
    SourceReference, SpaceKind,
};

/// A message that appears some time after the previous stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedMessage {
    pub delay: Duration,
    pub message: ChatMessage,
}

/// What one workflow turn produces.
///
/// `immediate` is appended when the turn fires; each entry of `staged` is
/// appended after its delay, counted from the previous stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplyPlan {
    pub immediate: Vec<ChatMessage>,
    pub staged: Vec<StagedMessage>,
}

impl ReplyPlan {
    fn now(message: ChatMessage) -> Self {
        Self {
            immediate: vec![message],
            staged: Vec::new(),
        }
    }

    fn then(mut self, delay: Duration, message: ChatMessage) -> Self {
        self.staged.push(StagedMessage { delay, message });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.immediate.is_empty() && self.staged.is_empty()
    }

    pub fn len(&self) -> usize {
        self.immediate.len() + self.staged.len()
    }
}

pub fn respond(
    kind: WorkflowKind,
    query: &str,
    spaces: &SpaceSet,
    delays: &DelayConfig,
    ids: &mut MessageIds,
) -> ReplyPlan {
    match kind {
        WorkflowKind::Diabetes => diabetes(query, spaces, delays, ids),
        WorkflowKind::MultiDomain => multi_domain(query, spaces, delays, ids),
    }
}

fn button(id: &str, label: &str, action: Action, variant: ActionVariant) -> MessageAction {
    MessageAction::new(id, label, action.token(), variant)
}

fn cite(spaces: &[&KnowledgeSpace], relevance: Relevance) -> Vec<SourceReference> {
    spaces.iter().map(|s| s.source(relevance)).collect()
}

fn protocol_actions() -> Vec<MessageAction> {
    vec![
        button("save-protocol", "Save to My Notes", Action::SaveToNotes, ActionVariant::Primary),
        button(
            "view-medication-guide",
            "View Medication Guide",
            Action::ViewMedicationGuide,
            ActionVariant::Secondary,
        ),
        button(
            "print-protocol",
            "Print Quick Reference",
            Action::PrintProtocol,
            ActionVariant::Ghost,
        ),
    ]
}

/// The comprehensive protocol, attributed to every active organization space.
fn protocol_message(spaces: &SpaceSet, ids: &mut MessageIds) -> ChatMessage {
    let active_org = spaces.active(SpaceKind::Organization);
    let body = templates::diabetes_protocol(&active_org);
    ChatMessage::new(ids.next("comprehensive"), Sender::Assistant, body)
        .with_sources(cite(&active_org, Relevance::High))
        .with_actions(protocol_actions())
}

fn diabetes(
    query: &str,
    spaces: &SpaceSet,
    delays: &DelayConfig,
    ids: &mut MessageIds,
) -> ReplyPlan {
    let topics = QueryClassifier::new().classify(query);
    let org_active = spaces.any_active(SpaceKind::Organization);
    let personal = spaces.active(SpaceKind::Personal);
    let first_two = &personal[..personal.len().min(2)];

    if topics.needs_org && !org_active {
        tracing::debug!("diabetes workflow: personal search only, suggesting organization spaces");
        let limited = ChatMessage::new(
            ids.next("search"),
            Sender::Assistant,
            templates::LIMITED_PERSONAL_RESULTS,
        )
        .with_sources(cite(first_two, Relevance::Low));
        let suggestion = ChatMessage::new(
            ids.next("suggest"),
            Sender::Assistant,
            templates::ORG_EXPANSION_SUGGESTION,
        )
        .with_actions(vec![
            button("include-all", "Include All", Action::IncludeAllOrg, ActionVariant::Primary),
            button(
                "select-specific",
                "Select Specific",
                Action::SelectSpecific,
                ActionVariant::Secondary,
            ),
            button("no-thanks", "No, thanks", Action::DeclineOrg, ActionVariant::Ghost),
        ])
        .as_suggestion();
        let options = ChatMessage::new(
            ids.next("org-options"),
            Sender::System,
            templates::ORG_RESOURCES_OVERVIEW,
        );

        return ReplyPlan::now(limited)
            .then(delays.suggestion(), suggestion)
            .then(delays.options(), options);
    }

    if org_active {
        tracing::debug!("diabetes workflow: answering from organization spaces");
        return ReplyPlan::now(protocol_message(spaces, ids));
    }

    tracing::debug!("diabetes workflow: personal results");
    let msg = ChatMessage::new(ids.next("personal"), Sender::Assistant, templates::PERSONAL_RESULTS)
        .with_sources(cite(first_two, Relevance::Medium))
        .with_actions(vec![
            button(
                "search-org",
                "Search Organization Resources",
                Action::SearchOrgDiabetes,
                ActionVariant::Primary,
            ),
            button(
                "view-personal",
                "View Personal Notes",
                Action::ViewPersonalNotes,
                ActionVariant::Secondary,
            ),
        ]);
    ReplyPlan::now(msg)
}

fn multi_domain(
    query: &str,
    spaces: &SpaceSet,
    delays: &DelayConfig,
    ids: &mut MessageIds,
) -> ReplyPlan {
    let topics = QueryClassifier::new().classify(query);
    let cardiology_active = spaces.is_tagged_active(CARDIOLOGY_TAG);

    if topics.is_diabetes && !topics.is_heart {
        tracing::debug!("multi-domain workflow: diabetes-only question");
        return ReplyPlan::now(protocol_message(spaces, ids));
    }

    if topics.is_heart && !cardiology_active {
        tracing::debug!("multi-domain workflow: cardiology gap");
        let gap = ChatMessage::new(ids.next("gap"), Sender::Assistant, templates::CARDIOLOGY_GAP)
            .with_sources(cite(&spaces.active_all(), Relevance::Medium));
        let suggestion = ChatMessage::new(
            ids.next("suggest"),
            Sender::Assistant,
            templates::CARDIOLOGY_SUGGESTION,
        )
        .with_actions(vec![
            button(
                "include-cardiology",
                "Include Both",
                Action::IncludeCardiologySpaces,
                ActionVariant::Primary,
            ),
            button(
                "select-cardiology",
                "Cardiology Guidelines Only",
                Action::SelectCardiology,
                ActionVariant::Secondary,
            ),
            button("select-peer", "Peer Network Only", Action::SelectPeer, ActionVariant::Ghost),
        ])
        .as_suggestion();
        let resources = ChatMessage::new(
            ids.next("specialized-options"),
            Sender::System,
            templates::CARDIOLOGY_RESOURCES,
        );

        return ReplyPlan::now(gap)
            .then(delays.suggestion(), suggestion)
            .then(delays.options(), resources);
    }

    if cardiology_active {
        tracing::debug!("multi-domain workflow: integrated heart and diabetes plan");
        let active = spaces.active_all();
        let sources = active
            .iter()
            .map(|s| {
                let relevance = if s.has_tag(CARDIOLOGY_TAG) {
                    Relevance::High
                } else {
                    Relevance::Medium
                };
                s.source(relevance)
            })
            .collect();
        let body = templates::integrated_care_plan(&active);
        let msg = ChatMessage::new(ids.next("integrated"), Sender::Assistant, body)
            .with_sources(sources)
            .with_actions(vec![
                button(
                    "save-care-plan",
                    "Save Care Plan",
                    Action::SaveCarePlan,
                    ActionVariant::Primary,
                ),
                button(
                    "share-care-plan",
                    "Share with Care Team",
                    Action::ShareCarePlan,
                    ActionVariant::Secondary,
                ),
            ]);
        return ReplyPlan::now(msg);
    }

    tracing::debug!("multi-domain workflow: no branch matched, staying silent");
    ReplyPlan::default()
}
