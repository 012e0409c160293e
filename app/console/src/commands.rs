//! Console command parsing.
//! Session behavior lives in care_assist::ChatEngine; this only maps lines to calls.

use care_assist::{ScenarioId, SpaceKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start(ScenarioId),
    Back,
    Do(String),
    Spaces,
    Collapse(SpaceKind),
    Scenarios,
    History,
    Help,
    Quit,
    Say(String),
    Empty,
}

pub const HELP: &str = "\
Commands:
  /start <diabetes|multi-domain>   start a consultation scenario
  /back                            return to the scenario selector
  /do <action>                     press a quick reply or action button
  /spaces                          show the knowledge space sidebar
  /collapse <personal|organization|shared>
                                   collapse or expand a sidebar section
  /scenarios                       list scenarios
  /history                         reprint the conversation
  /help                            show this help
  /quit                            exit
Anything else is sent to the assistant.";

pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Empty);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Say(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match name {
        "start" => arg
            .parse::<ScenarioId>()
            .map(Command::Start)
            .map_err(|e| e.to_string()),
        "back" => Ok(Command::Back),
        "do" if !arg.is_empty() => Ok(Command::Do(arg.to_string())),
        "do" => Err("usage: /do <action>".to_string()),
        "spaces" => Ok(Command::Spaces),
        "collapse" => parse_kind(arg).map(Command::Collapse),
        "scenarios" => Ok(Command::Scenarios),
        "history" => Ok(Command::History),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command: /{}", other)),
    }
}

fn parse_kind(arg: &str) -> Result<SpaceKind, String> {
    match arg.to_lowercase().as_str() {
        "personal" => Ok(SpaceKind::Personal),
        "organization" | "org" => Ok(SpaceKind::Organization),
        "shared" | "specialized" => Ok(SpaceKind::Shared),
        _ => Err("usage: /collapse <personal|organization|shared>".to_string()),
    }
}
