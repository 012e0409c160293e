pub mod action;
pub mod chat;
pub mod config;
pub mod error;
pub mod render;
pub mod router;
pub mod scenario;
pub mod session;
pub mod space;
pub mod templates;
pub mod types;
pub mod workflow;

// Re-export primary types for convenience
pub use action::Action;
pub use chat::engine::ChatEngine;
pub use chat::{CollectingEmitter, EventEmitter, NoopEmitter};
pub use config::{AssistConfig, DelayConfig};
pub use error::{Result, SessionError};
pub use scenario::{Scenario, ScenarioId, WorkflowKind};
pub use session::Session;
pub use space::SpaceSet;

// Re-export common types
pub use types::{
    AccessLevel, ChatMessage, KnowledgeSpace, MessageAction, MessageMetadata, QuickReply,
    Relevance, Sender, SourceReference, SpaceKind,
};
