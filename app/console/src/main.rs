mod commands;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};

use care_assist::chat::{EVENT_CHAT_MESSAGE, EVENT_SESSION_RESET, EVENT_SPACES_CHANGED};
use care_assist::render::{self, SidebarView, Toast};
use care_assist::{
    AssistConfig, ChatEngine, ChatMessage, EventEmitter, Scenario, ScenarioId, SpaceSet,
};
use commands::Command;

const CONFIG_ENV: &str = "CARE_ASSIST_CONFIG";
const SCENARIO_ENV: &str = "CARE_ASSIST_SCENARIO";

/// Prints transcript updates as they arrive and tracks the current toast.
struct ConsoleEmitter {
    toast_lifetime: std::time::Duration,
    toast: Mutex<Option<Toast>>,
    sidebar: Mutex<SidebarView>,
}

impl ConsoleEmitter {
    fn new(config: &AssistConfig) -> Self {
        Self {
            toast_lifetime: config.toast_duration(),
            toast: Mutex::new(None),
            sidebar: Mutex::new(SidebarView::new()),
        }
    }

    fn print_sidebar(&self, spaces: &SpaceSet) {
        println!("\n{}\n", self.sidebar.lock().render(spaces));
    }

    fn active_toast(&self) -> Option<String> {
        let mut slot = self.toast.lock();
        match slot.as_ref() {
            Some(toast) if toast.is_visible_at(Instant::now()) => Some(toast.text.clone()),
            Some(_) => {
                *slot = None;
                None
            }
            None => None,
        }
    }
}

impl EventEmitter for ConsoleEmitter {
    fn emit(&self, event: &str, data: serde_json::Value) {
        match event {
            EVENT_CHAT_MESSAGE => match serde_json::from_value::<ChatMessage>(data) {
                Ok(msg) => {
                    println!("\n{}", render::render_message(&msg));
                    let latest = std::slice::from_ref(&msg);
                    if let Some(toast) = Toast::detect(latest, self.toast_lifetime) {
                        println!("\n  🔔 {}", toast.text);
                        *self.toast.lock() = Some(toast);
                    }
                }
                Err(e) => tracing::warn!("unreadable chat message event: {}", e),
            },
            EVENT_SPACES_CHANGED => match serde_json::from_value::<SpaceSet>(data) {
                Ok(spaces) if !spaces.is_empty() => self.print_sidebar(&spaces),
                Ok(_) => {}
                Err(e) => tracing::warn!("unreadable spaces event: {}", e),
            },
            EVENT_SESSION_RESET => {
                *self.toast.lock() = None;
                if data["scenario"].is_null() {
                    println!("\n{}", render::render_selector(&Scenario::catalog()));
                }
            }
            _ => {}
        }
    }
}

fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    let default = dirs::config_dir()?.join("care-assist").join("config.json");
    default.exists().then_some(default)
}

fn load_config() -> Result<AssistConfig> {
    let mut config = match config_path() {
        Some(path) => {
            tracing::info!("Loading config from {}", path.display());
            AssistConfig::from_file(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => AssistConfig::default(),
    };

    if let Ok(raw) = std::env::var(SCENARIO_ENV) {
        let id: ScenarioId = raw
            .parse()
            .with_context(|| format!("Invalid {} value", SCENARIO_ENV))?;
        config.default_scenario = Some(id);
    }
    Ok(config)
}

fn handle(engine: &ChatEngine, emitter: &ConsoleEmitter, command: Command) -> Result<bool> {
    match command {
        Command::Empty => {}
        Command::Quit => return Ok(false),
        Command::Help => println!("{}", commands::HELP),
        Command::Scenarios => println!("{}", render::render_selector(&Scenario::catalog())),
        Command::Start(id) => engine.start_scenario(id).context("Failed to start scenario")?,
        Command::Back => engine.back_to_selector(),
        Command::Do(token) => engine.trigger_token(&token).context("Action failed")?,
        Command::Spaces => {
            let spaces = engine.with_session(|s| s.spaces().clone());
            emitter.print_sidebar(&spaces);
        }
        Command::Collapse(kind) => {
            emitter.sidebar.lock().toggle(kind);
            let spaces = engine.with_session(|s| s.spaces().clone());
            emitter.print_sidebar(&spaces);
        }
        Command::History => {
            let transcript = engine.with_session(|s| s.transcript().to_vec());
            println!("{}", render::render_transcript(&transcript));
        }
        Command::Say(text) => {
            engine.set_input(&text);
            engine.submit_input().context("Failed to send message")?;
        }
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config()?;
    let emitter = Arc::new(ConsoleEmitter::new(&config));
    let engine = ChatEngine::new(config, emitter.clone());

    println!("{}", render::render_selector(&Scenario::catalog()));
    println!("Type /help for commands.");
    if let Some(id) = engine.config().default_scenario {
        engine.start_scenario(id)?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if let Some(text) = emitter.active_toast() {
            println!("  🔔 {}", text);
        }
        match commands::parse(&line) {
            Ok(command) => match handle(&engine, &emitter, command) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => eprintln!("error: {:#}", e),
            },
            Err(msg) => eprintln!("{}", msg),
        }
    }

    engine.shutdown().await;
    Ok(())
}
