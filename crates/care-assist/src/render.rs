//! Plain-text presentation of the selector, sidebar and transcript.
//!
//! Everything here is derived from session state. The only view-local state
//! is which sidebar sections are collapsed and the confirmation toast.

use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::{Duration, Instant};

use crate::scenario::Scenario;
use crate::space::SpaceSet;
use crate::types::{ActionVariant, ChatMessage, KnowledgeSpace, Sender, SpaceKind};

static SPACE_ADDED_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"✓ Added (.+?) to your search scope").expect("space added regex is valid")
});

// ============================================================================
// Scenario selector
// ============================================================================

pub fn render_selector(scenarios: &[Scenario]) -> String {
    let mut out =
        String::from("Knowledge Spaces Healthcare Assistant\n\nChoose a consultation scenario:\n");
    for scenario in scenarios {
        out.push_str(&format!(
            "\n  {} {}  (/start {})\n     {}\n     {} personal · {} organization",
            scenario.icon,
            scenario.name,
            scenario.id,
            scenario.description,
            scenario.initial_personal_spaces.len(),
            scenario.initial_org_spaces.len(),
        ));
        if !scenario.shared_spaces.is_empty() {
            out.push_str(&format!(" · {} specialized", scenario.shared_spaces.len()));
        }
        out.push('\n');
    }
    out
}

// ============================================================================
// Sidebar
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct SidebarView {
    collapsed: HashSet<SpaceKind>,
}

impl SidebarView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a section between collapsed and expanded. Returns the new state.
    pub fn toggle(&mut self, kind: SpaceKind) -> bool {
        if !self.collapsed.remove(&kind) {
            self.collapsed.insert(kind);
            return true;
        }
        false
    }

    pub fn is_collapsed(&self, kind: SpaceKind) -> bool {
        self.collapsed.contains(&kind)
    }

    /// Personal spaces are always listed. Organization and shared sections
    /// only appear once one of their spaces is active, and then list only
    /// the active ones.
    pub fn render(&self, spaces: &SpaceSet) -> String {
        let mut sections = Vec::new();
        for kind in SpaceKind::ALL {
            let listed: Vec<&KnowledgeSpace> = match kind {
                SpaceKind::Personal => spaces.personal().iter().collect(),
                _ if spaces.any_active(kind) => spaces.active(kind),
                _ => continue,
            };

            let marker = if self.is_collapsed(kind) { "▸" } else { "▾" };
            let mut section = format!("{} {} ({})", marker, kind.label(), listed.len());
            if !self.is_collapsed(kind) {
                for space in listed {
                    section.push('\n');
                    section.push_str(&render_space(space));
                }
            }
            sections.push(section);
        }
        sections.join("\n\n")
    }
}

fn render_space(space: &KnowledgeSpace) -> String {
    let toggle = if space.is_active { "[on] " } else { "[off]" };
    let icon = space.icon.as_deref().map(|i| format!("{} ", i)).unwrap_or_default();
    let mut line = format!("  {} {}{} · {} docs", toggle, icon, space.name, space.document_count);
    if let Some(level) = space.access_level {
        line.push_str(&format!(" · {}", level.label()));
    }
    if let Some(at) = space.last_updated {
        line.push_str(&format!(" · updated {}", at.format("%Y-%m-%d")));
    }
    format!("{}\n        {}", line, space.description)
}

// ============================================================================
// Transcript
// ============================================================================

pub fn render_message(msg: &ChatMessage) -> String {
    let who = match msg.sender {
        Sender::User => "You",
        Sender::Assistant => "Assistant",
        Sender::System => "System",
    };
    let mut out = format!("[{}] {}", msg.timestamp.format("%H:%M:%S"), who);
    if msg.system_suggestion {
        out.push_str(" · System Suggestion");
    }
    out.push('\n');
    out.push_str(&msg.content);

    if !msg.sources.is_empty() {
        out.push_str("\n\nSources:");
        for source in &msg.sources {
            match &source.document_name {
                Some(doc) => out.push_str(&format!(
                    "\n  - {}: {} ({})",
                    source.space_name, doc, source.relevance
                )),
                None => {
                    out.push_str(&format!("\n  - {} ({})", source.space_name, source.relevance))
                }
            }
        }
    }

    if let Some(confidence) = msg.metadata.as_ref().and_then(|m| m.confidence) {
        out.push_str(&format!("\nConfidence: {}%", (confidence * 100.0).round()));
    }

    if !msg.actions.is_empty() {
        out.push('\n');
        for action in &msg.actions {
            let style = match action.variant {
                Some(ActionVariant::Primary) => "*",
                Some(ActionVariant::Secondary) => "-",
                Some(ActionVariant::Ghost) | None => " ",
            };
            out.push_str(&format!("\n  {} {}  (/do {})", style, action.label, action.action));
        }
    }

    if !msg.quick_replies.is_empty() {
        out.push('\n');
        for reply in &msg.quick_replies {
            out.push_str(&format!("\n  > {}  (/do {})", reply.text, reply.action));
        }
    }
    out
}

pub fn render_transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(render_message)
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ============================================================================
// Toast
// ============================================================================

/// Short-lived notice shown when a space is added to the search scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub text: String,
    pub shown_at: Instant,
    pub lifetime: Duration,
}

impl Toast {
    /// Build a toast if the latest message confirms an added space.
    pub fn detect(messages: &[ChatMessage], lifetime: Duration) -> Option<Toast> {
        let latest = messages.last()?;
        let caps = SPACE_ADDED_RE.captures(&latest.content)?;
        Some(Toast {
            text: format!("{} is now part of your search scope", &caps[1]),
            shown_at: Instant::now(),
            lifetime,
        })
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) < self.lifetime
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScenarioId;
    use crate::types::{AccessLevel, MessageAction, MessageMetadata, QuickReply, Relevance};

    fn diabetes_spaces() -> SpaceSet {
        let s = Scenario::get(ScenarioId::Diabetes);
        SpaceSet::new(s.initial_personal_spaces, s.initial_org_spaces, s.shared_spaces).unwrap()
    }

    #[test]
    fn test_selector_lists_both_scenarios() {
        let text = render_selector(&Scenario::catalog());
        assert!(text.contains("Diabetes Management  (/start diabetes)"));
        assert!(text.contains("Care Coordinator Consultation  (/start multi-domain)"));
        assert!(text.contains("2 personal · 4 organization · 2 specialized"));
    }

    #[test]
    fn test_sidebar_hides_inactive_org_section() {
        let view = SidebarView::new();
        let spaces = diabetes_spaces();
        let text = view.render(&spaces);
        assert!(text.contains("▾ Personal (3)"));
        assert!(!text.contains("Organization"));

        let spaces = spaces.activated(&["o1"]).unwrap();
        let text = view.render(&spaces);
        assert!(text.contains("▾ Organization (1)"));
        assert!(text.contains("Emergency Medicine Protocols"));
        assert!(!text.contains("Critical Care Guidelines"));
    }

    #[test]
    fn test_sidebar_collapse() {
        let mut view = SidebarView::new();
        assert!(view.toggle(SpaceKind::Personal));
        let text = view.render(&diabetes_spaces());
        assert!(text.contains("▸ Personal (3)"));
        assert!(!text.contains("My Clinical Notes"));
        assert!(!view.toggle(SpaceKind::Personal));
    }

    #[test]
    fn test_message_blocks() {
        let space = KnowledgeSpace::new(
            "o1",
            "Emergency Medicine Protocols",
            SpaceKind::Organization,
            true,
            156,
            "",
        );
        let msg = ChatMessage::new("m-1".into(), Sender::Assistant, "Body")
            .with_sources(vec![space.source(Relevance::High)])
            .with_actions(vec![MessageAction::new(
                "a",
                "Include All",
                "include_all_org",
                ActionVariant::Primary,
            )])
            .with_quick_replies(vec![QuickReply::new("q", "Show my active spaces", "show_active")])
            .as_suggestion();

        let text = render_message(&msg);
        assert!(text.contains("Assistant · System Suggestion"));
        assert!(text.contains("  - Emergency Medicine Protocols (high)"));
        assert!(text.contains("  * Include All  (/do include_all_org)"));
        assert!(text.contains("  > Show my active spaces  (/do show_active)"));
    }

    #[test]
    fn test_optional_details() {
        let space =
            KnowledgeSpace::new("p1", "My Clinical Notes", SpaceKind::Personal, true, 47, "")
                .with_access(AccessLevel::Private);
        let mut source = space.source(Relevance::Medium);
        source.document_name = Some("Glucose log".to_string());
        let mut msg =
            ChatMessage::new("m-1".into(), Sender::Assistant, "Body").with_sources(vec![source]);
        msg.metadata = Some(MessageMetadata {
            sources: vec!["p1".to_string()],
            confidence: Some(0.87),
        });

        let text = render_message(&msg);
        assert!(text.contains("  - My Clinical Notes: Glucose log (medium)"));
        assert!(text.contains("Confidence: 87%"));

        let spaces = SpaceSet::new(vec![space], vec![], vec![]).unwrap();
        let sidebar = SidebarView::new().render(&spaces);
        assert!(sidebar.contains("My Clinical Notes · 47 docs · private"));
    }

    #[test]
    fn test_toast_on_added_confirmation() {
        let msg = ChatMessage::new(
            "c-1".into(),
            Sender::System,
            "✓ Added Critical Care Guidelines to your search scope.",
        );
        let toast = Toast::detect(&[msg], Duration::from_secs(3)).unwrap();
        assert_eq!(toast.text, "Critical Care Guidelines is now part of your search scope");
        assert!(toast.is_visible_at(toast.shown_at + Duration::from_secs(2)));
        assert!(!toast.is_visible_at(toast.shown_at + Duration::from_secs(3)));
    }

    #[test]
    fn test_no_toast_for_other_messages() {
        let msg = ChatMessage::new("m-1".into(), Sender::Assistant, "Added nothing");
        assert!(Toast::detect(&[msg], Duration::from_secs(3)).is_none());
        assert!(Toast::detect(&[], Duration::from_secs(3)).is_none());
    }
}
