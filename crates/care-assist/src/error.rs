use thiserror::Error;

/// Errors surfaced by the session controller and its configuration layer.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no scenario is active; pick one from the selector first")]
    NoActiveScenario,

    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),

    #[error("knowledge space '{0}' not found")]
    UnknownSpace(String),

    #[error("knowledge space id '{0}' appears more than once")]
    DuplicateSpace(String),

    #[error("unknown action token '{0}'")]
    UnknownAction(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
