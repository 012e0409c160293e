//! Button dispatch
//!
//! Quick replies and message actions carry an opaque token. Tokens parse into
//! the closed [`Action`] set; each action maps to exactly one [`ActionEffect`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SessionError;
use crate::space::{SpaceSet, CARDIOLOGY_TAG};
use crate::templates;
use crate::types::{
    ActionVariant, ChatMessage, MessageAction, MessageIds, QuickReply, Sender, SpaceKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    // Quick replies
    ShowActive,
    SearchDiabetesProtocols,
    SearchProtocols,
    SearchResearch,
    SearchHeartLifestyle,
    SearchCulturalMeals,

    // Organization scope
    IncludeAllOrg,
    SelectSpecific,
    SelectEmergency,
    SelectCritical,
    SelectPharmacy,
    DeclineOrg,
    SearchOrgDiabetes,

    // Cardiology scope
    IncludeCardiologySpaces,
    SelectCardiology,
    SelectPeer,

    // Follow-ups on answers
    SaveToNotes,
    ViewMedicationGuide,
    PrintProtocol,
    ViewPersonalNotes,
    SaveCarePlan,
    ShareCarePlan,
}

/// Which spaces a bulk activation switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Kind(SpaceKind),
    Tag(&'static str),
}

impl Scope {
    pub fn resolve(&self, spaces: &SpaceSet) -> Vec<String> {
        match self {
            Scope::Kind(kind) => spaces.ids(*kind),
            Scope::Tag(tag) => spaces.tagged(tag).iter().map(|s| s.id.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionEffect {
    /// Switch a group of spaces on, then re-run the workflow with `query`
    /// after the activation delay.
    ActivateAndRespond { scope: Scope, query: &'static str },
    /// Switch one space on and confirm it, no workflow re-run.
    Activate { space_id: &'static str },
    /// Submit a synthetic question as if the user typed it.
    Query(&'static str),
    /// Append a scripted reply, no state change.
    Post,
}

impl Action {
    pub const ALL: [Action; 22] = [
        Action::ShowActive,
        Action::SearchDiabetesProtocols,
        Action::SearchProtocols,
        Action::SearchResearch,
        Action::SearchHeartLifestyle,
        Action::SearchCulturalMeals,
        Action::IncludeAllOrg,
        Action::SelectSpecific,
        Action::SelectEmergency,
        Action::SelectCritical,
        Action::SelectPharmacy,
        Action::DeclineOrg,
        Action::SearchOrgDiabetes,
        Action::IncludeCardiologySpaces,
        Action::SelectCardiology,
        Action::SelectPeer,
        Action::SaveToNotes,
        Action::ViewMedicationGuide,
        Action::PrintProtocol,
        Action::ViewPersonalNotes,
        Action::SaveCarePlan,
        Action::ShareCarePlan,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            Action::ShowActive => "show_active",
            Action::SearchDiabetesProtocols => "search_diabetes_protocols",
            Action::SearchProtocols => "search_protocols",
            Action::SearchResearch => "search_research",
            Action::SearchHeartLifestyle => "search_heart_lifestyle",
            Action::SearchCulturalMeals => "search_cultural_meals",
            Action::IncludeAllOrg => "include_all_org",
            Action::SelectSpecific => "select_specific",
            Action::SelectEmergency => "select_emergency",
            Action::SelectCritical => "select_critical",
            Action::SelectPharmacy => "select_pharmacy",
            Action::DeclineOrg => "decline_org",
            Action::SearchOrgDiabetes => "search_org_diabetes",
            Action::IncludeCardiologySpaces => "include_cardiology_spaces",
            Action::SelectCardiology => "select_cardiology",
            Action::SelectPeer => "select_peer",
            Action::SaveToNotes => "save_to_notes",
            Action::ViewMedicationGuide => "view_medication_guide",
            Action::PrintProtocol => "print_protocol",
            Action::ViewPersonalNotes => "view_personal_notes",
            Action::SaveCarePlan => "save_care_plan",
            Action::ShareCarePlan => "share_care_plan",
        }
    }

    pub fn effect(&self) -> ActionEffect {
        match self {
            Action::SearchDiabetesProtocols | Action::SearchProtocols => {
                ActionEffect::Query("What are the current diabetes management protocols?")
            }
            Action::SearchResearch => ActionEffect::Query("Show me recent research on emergency medicine"),
            Action::SearchHeartLifestyle => {
                ActionEffect::Query("How do we manage heart failure in diabetic patients?")
            }
            Action::SearchCulturalMeals => {
                ActionEffect::Query("Which cultural meal adaptations work for diabetic patients?")
            }
            Action::IncludeAllOrg => ActionEffect::ActivateAndRespond {
                scope: Scope::Kind(SpaceKind::Organization),
                query: "",
            },
            Action::IncludeCardiologySpaces => ActionEffect::ActivateAndRespond {
                scope: Scope::Tag(CARDIOLOGY_TAG),
                query: "",
            },
            Action::SelectEmergency => ActionEffect::Activate { space_id: "o1" },
            Action::SelectCritical => ActionEffect::Activate { space_id: "o2" },
            Action::SelectPharmacy => ActionEffect::Activate { space_id: "o3" },
            Action::SelectCardiology => ActionEffect::Activate { space_id: "ms1" },
            Action::SelectPeer => ActionEffect::Activate { space_id: "ms2" },
            Action::ShowActive
            | Action::SelectSpecific
            | Action::DeclineOrg
            | Action::SearchOrgDiabetes
            | Action::SaveToNotes
            | Action::ViewMedicationGuide
            | Action::PrintProtocol
            | Action::ViewPersonalNotes
            | Action::SaveCarePlan
            | Action::ShareCarePlan => ActionEffect::Post,
        }
    }

    /// The single-space selection that switches `space_id` on, if any.
    pub fn selecting(space_id: &str) -> Option<Action> {
        Action::ALL.iter().copied().find(|a| {
            matches!(a.effect(), ActionEffect::Activate { space_id: id } if id == space_id)
        })
    }

    /// Scripted reply for a [`ActionEffect::Post`] action. Other effects
    /// produce their messages through the session and return `None` here.
    pub fn reply(&self, spaces: &SpaceSet, ids: &mut MessageIds) -> Option<ChatMessage> {
        let msg = match self {
            Action::ShowActive => ChatMessage::new(
                ids.next("status"),
                Sender::System,
                templates::active_status(
                    &spaces.active(SpaceKind::Personal),
                    &spaces.active(SpaceKind::Organization),
                    &spaces.active(SpaceKind::Shared),
                    !spaces.shared().is_empty(),
                ),
            ),
            Action::SelectSpecific => {
                let replies: Vec<QuickReply> = spaces
                    .organization()
                    .iter()
                    .filter(|s| !s.is_active)
                    .filter_map(|s| {
                        let action = Action::selecting(&s.id)?;
                        Some(QuickReply::new(&format!("select-{}", s.id), &s.name, action.token()))
                    })
                    .collect();
                if replies.is_empty() {
                    tracing::debug!("no organization spaces left to select");
                    return None;
                }
                ChatMessage::new(
                    ids.next("select"),
                    Sender::Assistant,
                    templates::SELECT_ORG_PROMPT,
                )
                .with_quick_replies(replies)
            }
            Action::DeclineOrg => {
                ChatMessage::new(ids.next("decline"), Sender::Assistant, templates::DECLINE_ORG)
            }
            Action::SearchOrgDiabetes => ChatMessage::new(
                ids.next("suggest-org"),
                Sender::Assistant,
                templates::SEARCH_ORG_SUGGESTION,
            )
            .with_actions(vec![
                MessageAction::new(
                    "include-all",
                    "Yes, Include All",
                    Action::IncludeAllOrg.token(),
                    ActionVariant::Primary,
                ),
                MessageAction::new(
                    "select-specific",
                    "Select Specific",
                    Action::SelectSpecific.token(),
                    ActionVariant::Secondary,
                ),
            ])
            .as_suggestion(),
            Action::SaveToNotes => {
                ChatMessage::new(ids.next("saved"), Sender::System, templates::SAVED_TO_NOTES)
            }
            Action::ViewMedicationGuide => {
                ChatMessage::new(
                    ids.next("med-guide"),
                    Sender::Assistant,
                    templates::MEDICATION_GUIDE,
                )
            }
            Action::PrintProtocol => {
                ChatMessage::new(ids.next("print"), Sender::System, templates::PRINT_PROTOCOL)
            }
            Action::ViewPersonalNotes => {
                ChatMessage::new(ids.next("notes"), Sender::Assistant, templates::PERSONAL_NOTES)
            }
            Action::SaveCarePlan => {
                ChatMessage::new(ids.next("saved"), Sender::System, templates::CARE_PLAN_SAVED)
            }
            Action::ShareCarePlan => {
                ChatMessage::new(ids.next("shared"), Sender::System, templates::CARE_PLAN_SHARED)
            }
            _ => return None,
        };
        Some(msg)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Action {
    type Err = SessionError;

    /// Exact token match; no trimming or case folding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .iter()
            .copied()
            .find(|a| a.token() == s)
            .ok_or_else(|| SessionError::UnknownAction(s.to_string()))
    }
}
