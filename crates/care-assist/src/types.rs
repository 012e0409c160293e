use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Knowledge spaces
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceKind {
    Personal,
    Organization,
    #[serde(alias = "specialized")]
    Shared,
}

impl SpaceKind {
    pub const ALL: [SpaceKind; 3] =
        [SpaceKind::Personal, SpaceKind::Organization, SpaceKind::Shared];

    pub fn label(&self) -> &'static str {
        match self {
            SpaceKind::Personal => "Personal",
            SpaceKind::Organization => "Organization",
            SpaceKind::Shared => "Shared",
        }
    }
}

/// Who may read a space's documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Private,
    Department,
    Organization,
}

impl AccessLevel {
    pub fn label(&self) -> &'static str {
        match self {
            AccessLevel::Private => "private",
            AccessLevel::Department => "department",
            AccessLevel::Organization => "organization",
        }
    }
}

/// A named bucket of documents that can be switched into the search scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeSpace {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SpaceKind,
    pub is_active: bool,
    pub document_count: usize,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_level: Option<AccessLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl KnowledgeSpace {
    pub fn new(
        id: &str,
        name: &str,
        kind: SpaceKind,
        is_active: bool,
        document_count: usize,
        description: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            is_active,
            document_count,
            description: description.to_string(),
            last_updated: None,
            access_level: None,
            category: None,
            icon: None,
            tags: Vec::new(),
        }
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }

    pub fn with_last_updated(mut self, at: DateTime<Utc>) -> Self {
        self.last_updated = Some(at);
        self
    }

    pub fn with_access(mut self, level: AccessLevel) -> Self {
        self.access_level = Some(level);
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Attribute a message to this space.
    pub fn source(&self, relevance: Relevance) -> SourceReference {
        SourceReference {
            space_id: self.id.clone(),
            space_name: self.name.clone(),
            document_name: None,
            relevance,
        }
    }
}

// ============================================================================
// Chat messages
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    High,
    Medium,
    Low,
}

impl fmt::Display for Relevance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Relevance::High => "high",
            Relevance::Medium => "medium",
            Relevance::Low => "low",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceReference {
    pub space_id: String,
    pub space_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    pub relevance: Relevance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    pub id: String,
    pub text: String,
    pub action: String,
}

impl QuickReply {
    pub fn new(id: &str, text: &str, action: &str) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            action: action.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionVariant {
    Primary,
    Secondary,
    Ghost,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAction {
    pub id: String,
    pub label: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<ActionVariant>,
}

impl MessageAction {
    pub fn new(id: &str, label: &str, action: &str, variant: ActionVariant) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            action: action.to_string(),
            variant: Some(variant),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

/// One entry of the transcript. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quick_replies: Vec<QuickReply>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<MessageAction>,
    #[serde(default)]
    pub system_suggestion: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

impl ChatMessage {
    pub fn new(id: String, sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            sender,
            timestamp: Utc::now(),
            sources: Vec::new(),
            quick_replies: Vec::new(),
            actions: Vec::new(),
            system_suggestion: false,
            metadata: None,
        }
    }

    pub fn with_sources(mut self, sources: Vec<SourceReference>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_quick_replies(mut self, replies: Vec<QuickReply>) -> Self {
        self.quick_replies = replies;
        self
    }

    pub fn with_actions(mut self, actions: Vec<MessageAction>) -> Self {
        self.actions = actions;
        self
    }

    pub fn as_suggestion(mut self) -> Self {
        self.system_suggestion = true;
        self
    }
}

/// Hands out transcript ids such as `search-7`, unique within a session.
#[derive(Debug, Clone, Default)]
pub struct MessageIds {
    next: u64,
}

impl MessageIds {
    pub fn next(&mut self, prefix: &str) -> String {
        self.next += 1;
        format!("{}-{}", prefix, self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_serializes_camel_case() {
        let space = KnowledgeSpace::new(
            "o1",
            "Emergency Medicine Protocols",
            SpaceKind::Organization,
            false,
            156,
            "Hospital emergency procedures",
        );
        let json = serde_json::to_value(&space).unwrap();
        assert_eq!(json["type"], "organization");
        assert_eq!(json["isActive"], false);
        assert_eq!(json["documentCount"], 156);
        assert!(json.get("tags").is_none());
        assert!(json.get("lastUpdated").is_none());
        assert!(json.get("accessLevel").is_none());
    }

    #[test]
    fn test_optional_fields_use_wire_names() {
        let json = r#"{
            "id": "personal-1", "name": "My Clinical Notes", "type": "personal",
            "isActive": true, "documentCount": 47, "description": "",
            "lastUpdated": "2024-06-03T14:30:00Z", "accessLevel": "private"
        }"#;
        let space: KnowledgeSpace = serde_json::from_str(json).unwrap();
        assert_eq!(space.access_level, Some(AccessLevel::Private));
        assert!(space.last_updated.is_some());

        let mut source = space.source(Relevance::High);
        assert!(serde_json::to_value(&source).unwrap().get("documentName").is_none());
        source.document_name = Some("Insulin titration".to_string());
        assert_eq!(serde_json::to_value(&source).unwrap()["documentName"], "Insulin titration");

        let msg: ChatMessage = serde_json::from_str(
            r#"{"id":"m-1","content":"x","sender":"assistant","timestamp":"2024-06-03T14:30:00Z",
                "metadata":{"sources":["personal-1"],"confidence":0.9}}"#,
        )
        .unwrap();
        assert_eq!(msg.metadata.and_then(|m| m.confidence), Some(0.9));
    }

    #[test]
    fn test_specialized_alias() {
        let json = r#"{"id":"ms1","name":"Cardiology","type":"specialized","isActive":false,"documentCount":3,"description":""}"#;
        let space: KnowledgeSpace = serde_json::from_str(json).unwrap();
        assert_eq!(space.kind, SpaceKind::Shared);
    }

    #[test]
    fn test_message_builders() {
        let space =
            KnowledgeSpace::new("p1", "My Clinical Notes", SpaceKind::Personal, true, 47, "");
        let msg = ChatMessage::new("m-1".into(), Sender::Assistant, "hello")
            .with_sources(vec![space.source(Relevance::Low)])
            .as_suggestion();

        assert_eq!(msg.sources[0].space_name, "My Clinical Notes");
        assert_eq!(msg.sources[0].relevance, Relevance::Low);
        assert!(msg.system_suggestion);
        assert!(msg.actions.is_empty());
    }

    #[test]
    fn test_message_ids_unique() {
        let mut ids = MessageIds::default();
        let a = ids.next("user");
        let b = ids.next("user");
        assert_ne!(a, b);
        assert!(a.starts_with("user-"));
    }
}
