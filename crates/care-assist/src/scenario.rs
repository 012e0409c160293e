//! Preset consultation scenarios
//!
//! Each scenario bundles its initial knowledge spaces, a welcome message and
//! the workflow that answers questions inside it. Scenarios are immutable;
//! the session copies what it needs when one is started.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::action::Action;
use crate::error::{Result, SessionError};
use crate::space::CARDIOLOGY_TAG;
use crate::types::{AccessLevel, ChatMessage, KnowledgeSpace, QuickReply, Sender, SpaceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioId {
    Diabetes,
    MultiDomain,
}

impl ScenarioId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioId::Diabetes => "diabetes",
            ScenarioId::MultiDomain => "multi-domain",
        }
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioId {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "diabetes" => Ok(ScenarioId::Diabetes),
            "multi-domain" | "multidomain" | "multi_domain" => Ok(ScenarioId::MultiDomain),
            other => Err(SessionError::UnknownScenario(other.to_string())),
        }
    }
}

/// Which decision tree answers free-text questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowKind {
    Diabetes,
    MultiDomain,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: ScenarioId,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub initial_personal_spaces: Vec<KnowledgeSpace>,
    pub initial_org_spaces: Vec<KnowledgeSpace>,
    #[serde(default)]
    pub shared_spaces: Vec<KnowledgeSpace>,
    pub initial_messages: Vec<ChatMessage>,
    pub workflow: WorkflowKind,
}

impl Scenario {
    /// Every scenario offered by the selector, in display order.
    pub fn catalog() -> Vec<Scenario> {
        vec![diabetes(), multi_domain()]
    }

    pub fn get(id: ScenarioId) -> Scenario {
        match id {
            ScenarioId::Diabetes => diabetes(),
            ScenarioId::MultiDomain => multi_domain(),
        }
    }
}

fn welcome(id: &str, content: &str, replies: [(&str, &str, Action); 3]) -> ChatMessage {
    let replies = replies
        .iter()
        .map(|(rid, text, action)| QuickReply::new(rid, text, action.token()))
        .collect();
    ChatMessage::new(id.to_string(), Sender::Assistant, content).with_quick_replies(replies)
}

/// Personal spaces start switched on and are private to the clinician.
fn personal(id: &str, name: &str, document_count: usize, description: &str) -> KnowledgeSpace {
    KnowledgeSpace::new(id, name, SpaceKind::Personal, true, document_count, description)
        .with_access(AccessLevel::Private)
}

fn organization(
    id: &str,
    name: &str,
    is_active: bool,
    document_count: usize,
    description: &str,
) -> KnowledgeSpace {
    KnowledgeSpace::new(id, name, SpaceKind::Organization, is_active, document_count, description)
        .with_access(AccessLevel::Organization)
}

/// Specialized spaces come from another department and start switched off.
fn shared(id: &str, name: &str, document_count: usize, description: &str) -> KnowledgeSpace {
    KnowledgeSpace::new(id, name, SpaceKind::Shared, false, document_count, description)
        .with_access(AccessLevel::Department)
        .with_tag(CARDIOLOGY_TAG)
}

fn updated(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, 0)
        .single()
        .unwrap_or_default()
}

fn diabetes() -> Scenario {
    Scenario {
        id: ScenarioId::Diabetes,
        name: "Diabetes Management".to_string(),
        description: "Focused consultation for diabetes treatment protocols and management guidelines"
            .to_string(),
        icon: "🩺".to_string(),
        initial_personal_spaces: vec![
            personal("p1", "My Clinical Notes", 47, "Personal clinical observations")
                .with_last_updated(updated(2024, 6, 3, 14, 30)),
            personal("p2", "Saved Research", 23, "Research papers and articles")
                .with_last_updated(updated(2024, 6, 2, 9, 15)),
            personal("p3", "Case Studies", 15, "Interesting clinical cases")
                .with_last_updated(updated(2024, 6, 1, 11, 20)),
        ],
        initial_org_spaces: vec![
            organization(
                "o1",
                "Emergency Medicine Protocols",
                false,
                156,
                "Hospital emergency procedures",
            )
            .with_category("Emergency")
            .with_last_updated(updated(2024, 6, 4, 8, 0)),
            organization("o2", "Critical Care Guidelines", false, 89, "ICU and critical care protocols")
                .with_category("Critical Care"),
            organization("o3", "Pharmacy Treatment Standards", false, 234, "Drug protocols and formulary")
                .with_category("Pharmacy"),
        ],
        shared_spaces: Vec::new(),
        initial_messages: vec![welcome(
            "welcome-diabetes",
            "Welcome to Diabetes Management consultation! I can search your personal knowledge \
             spaces and suggest organizational resources when needed. What would you like to know?",
            [
                ("q1", "Show my active spaces", Action::ShowActive),
                ("q2", "Diabetes management protocols", Action::SearchDiabetesProtocols),
                ("q3", "Recent medical research", Action::SearchResearch),
            ],
        )],
        workflow: WorkflowKind::Diabetes,
    }
}

fn multi_domain() -> Scenario {
    Scenario {
        id: ScenarioId::MultiDomain,
        name: "Care Coordinator Consultation".to_string(),
        description:
            "Multi-domain lifestyle and diet coordination for patients with complex health conditions"
                .to_string(),
        icon: "🫀".to_string(),
        initial_personal_spaces: vec![
            personal(
                "mp1",
                "Patient Lifestyle Assessments",
                42,
                "Patient dietary habits, exercise patterns, and lifestyle data",
            ),
            personal(
                "mp2",
                "Care Coordination Notes",
                38,
                "Personal notes on patient progress and adherence",
            ),
        ],
        initial_org_spaces: vec![
            // active from the previous consultation
            organization(
                "mo1",
                "Nutrition Guidelines for Diabetes",
                true,
                95,
                "Evidence-based dietary recommendations for diabetic patients",
            ),
            organization(
                "mo2",
                "Exercise & Physical Activity Protocols",
                false,
                78,
                "Safe exercise guidelines for various health conditions",
            ),
            organization(
                "mo3",
                "Behavioral Change Strategies",
                false,
                62,
                "Motivational techniques and habit formation protocols",
            )
            .with_icon("🎯"),
            organization(
                "mo4",
                "Meal Planning Resources",
                false,
                84,
                "Culturally diverse meal plans and recipes",
            )
            .with_icon("🍽️"),
        ],
        shared_spaces: vec![
            shared(
                "ms1",
                "Cardiology Lifestyle Guidelines",
                71,
                "Cardiac diet, activity limits and medication interactions",
            )
            .with_icon("❤️"),
            shared(
                "ms2",
                "Cardiac Care Peer Network",
                53,
                "Shared insights from cardiologists, dietitians and cardiac rehab coaches",
            )
            .with_icon("🤝"),
        ],
        initial_messages: vec![welcome(
            "welcome-multidomain",
            "Welcome to your Care Coordination session! I have nutrition guidelines for diabetes \
             already active from your previous consultation. I can help create personalized diet \
             and lifestyle plans for your patients.",
            [
                ("q1", "View active lifestyle resources", Action::ShowActive),
                ("q2", "Patient has heart condition too", Action::SearchHeartLifestyle),
                ("q3", "Need cultural meal adaptations", Action::SearchCulturalMeals),
            ],
        )],
        workflow: WorkflowKind::MultiDomain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::SpaceSet;

    #[test]
    fn test_catalog_order() {
        let ids: Vec<_> = Scenario::catalog().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![ScenarioId::Diabetes, ScenarioId::MultiDomain]);
    }

    #[test]
    fn test_parse_ids() {
        assert_eq!("diabetes".parse::<ScenarioId>().unwrap(), ScenarioId::Diabetes);
        assert_eq!(" Multi-Domain ".parse::<ScenarioId>().unwrap(), ScenarioId::MultiDomain);
        assert!(matches!(
            "oncology".parse::<ScenarioId>(),
            Err(SessionError::UnknownScenario(s)) if s == "oncology"
        ));
    }

    #[test]
    fn test_scenarios_build_valid_space_sets() {
        for scenario in Scenario::catalog() {
            let set = SpaceSet::new(
                scenario.initial_personal_spaces.clone(),
                scenario.initial_org_spaces.clone(),
                scenario.shared_spaces.clone(),
            );
            assert!(set.is_ok(), "{} has duplicate space ids", scenario.id);
            assert_eq!(scenario.initial_messages.len(), 1);
            assert_eq!(scenario.initial_messages[0].quick_replies.len(), 3);
        }
    }

    #[test]
    fn test_diabetes_org_spaces_start_inactive() {
        let scenario = Scenario::get(ScenarioId::Diabetes);
        assert_eq!(scenario.workflow, WorkflowKind::Diabetes);
        assert!(scenario.initial_org_spaces.iter().all(|s| !s.is_active));
        assert!(scenario.initial_personal_spaces.iter().all(|s| s.is_active));
    }

    #[test]
    fn test_multi_domain_cardiology_pair() {
        let scenario = Scenario::get(ScenarioId::MultiDomain);
        let tagged: Vec<_> = scenario
            .shared_spaces
            .iter()
            .filter(|s| s.has_tag(CARDIOLOGY_TAG))
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(tagged, vec!["ms1", "ms2"]);
    }

    #[test]
    fn test_access_levels_follow_space_kind() {
        let scenario = Scenario::get(ScenarioId::MultiDomain);
        let levels = |spaces: &[KnowledgeSpace]| -> Vec<Option<AccessLevel>> {
            spaces.iter().map(|s| s.access_level).collect()
        };
        assert!(levels(&scenario.initial_personal_spaces)
            .iter()
            .all(|l| *l == Some(AccessLevel::Private)));
        assert!(levels(&scenario.initial_org_spaces)
            .iter()
            .all(|l| *l == Some(AccessLevel::Organization)));
        assert!(levels(&scenario.shared_spaces)
            .iter()
            .all(|l| *l == Some(AccessLevel::Department)));
    }

    #[test]
    fn test_last_updated_dates() {
        let scenario = Scenario::get(ScenarioId::Diabetes);
        let notes = &scenario.initial_personal_spaces[0];
        assert_eq!(
            notes.last_updated.map(|d| d.to_rfc3339()),
            Some("2024-06-03T14:30:00+00:00".to_string())
        );
        assert!(scenario.initial_org_spaces[1].last_updated.is_none());
    }
}
