use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, SessionError};
use crate::scenario::ScenarioId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistConfig {
    pub delays: DelayConfig,
    /// How long a confirmation toast stays visible
    pub toast_ms: u64,
    /// Scenario to open directly instead of showing the selector
    pub default_scenario: Option<ScenarioId>,
}

/// Simulated latencies for the staged reply narration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DelayConfig {
    /// Between a submitted message and the workflow dispatch
    pub response_ms: u64,
    /// Between the first search result and the expansion suggestion
    pub suggestion_ms: u64,
    /// Between the suggestion and the list of available resources
    pub options_ms: u64,
    /// Between a bulk activation and the re-run of the workflow
    pub activation_ms: u64,
}

impl DelayConfig {
    /// All stages fire back to back. Handy for tests and scripted runs.
    pub fn immediate() -> Self {
        Self {
            response_ms: 0,
            suggestion_ms: 0,
            options_ms: 0,
            activation_ms: 0,
        }
    }

    pub fn response(&self) -> Duration {
        Duration::from_millis(self.response_ms)
    }

    pub fn suggestion(&self) -> Duration {
        Duration::from_millis(self.suggestion_ms)
    }

    pub fn options(&self) -> Duration {
        Duration::from_millis(self.options_ms)
    }

    pub fn activation(&self) -> Duration {
        Duration::from_millis(self.activation_ms)
    }
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            response_ms: 1000,
            suggestion_ms: 1000,
            options_ms: 500,
            activation_ms: 500,
        }
    }
}

const MAX_DELAY_MS: u64 = 60_000;

impl AssistConfig {
    /// Validate config values, returning errors for clearly broken configurations.
    pub fn validate(&self) -> Result<()> {
        let d = &self.delays;
        for (name, value) in [
            ("delays.response_ms", d.response_ms),
            ("delays.suggestion_ms", d.suggestion_ms),
            ("delays.options_ms", d.options_ms),
            ("delays.activation_ms", d.activation_ms),
        ] {
            if value > MAX_DELAY_MS {
                return Err(SessionError::InvalidConfig(format!(
                    "{} must be <= {}",
                    name, MAX_DELAY_MS
                )));
            }
        }
        if self.toast_ms == 0 {
            return Err(SessionError::InvalidConfig("toast_ms must be > 0".into()));
        }
        Ok(())
    }

    /// Load config from a JSON file, falling back to defaults for missing fields.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_ms)
    }
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            delays: DelayConfig::default(),
            toast_ms: 3000,
            default_scenario: None,
        }
    }
}
