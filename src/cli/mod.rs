//! Line commands for the interactive `chat` binary.
//!
//! Anything that is not a command is a prompt for the current backend.

use crate::helpers::HelperKind;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Leave the REPL (`exit`, `quit`).
    Exit,
    /// Show the command list (`/help`).
    Help,
    /// Switch backend (`/backend micro`).
    Backend(HelperKind),
    /// `/backend` with a name that is not a helper key.
    UnknownBackend(String),
    /// Print the master helper's recall snippet (`/recall`).
    Recall,
    /// Store a fact through the master helper (`/store ...`).
    Store(String),
    /// A prompt for the current backend.
    Prompt(String),
    /// Blank line.
    Empty,
}

impl std::fmt::Display for ChatCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exit => write!(f, "exit"),
            Self::Help => write!(f, "/help"),
            Self::Backend(kind) => write!(f, "/backend {kind}"),
            Self::UnknownBackend(name) => write!(f, "/backend {name}"),
            Self::Recall => write!(f, "/recall"),
            Self::Store(text) => write!(f, "/store {text}"),
            Self::Prompt(text) => write!(f, "{text}"),
            Self::Empty => Ok(()),
        }
    }
}

pub const HELP: &str = "\
Commands:
  /backend <scriptor|master|micro|patcher|multimodel|rewriter>
  /recall             show recalled memory
  /store <text>       remember a fact
  /help               this list
  exit | quit         leave";

/// Parse one input line.
pub fn parse_command(line: &str) -> ChatCommand {
    let line = line.trim();
    if line.is_empty() {
        return ChatCommand::Empty;
    }
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return ChatCommand::Exit;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return ChatCommand::Prompt(line.to_string());
    };

    let (name, arg) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let arg = arg.trim();
    match name {
        "help" => ChatCommand::Help,
        "recall" => ChatCommand::Recall,
        "store" => ChatCommand::Store(arg.to_string()),
        "backend" => match HelperKind::from_key(arg) {
            Some(kind) => ChatCommand::Backend(kind),
            None => ChatCommand::UnknownBackend(arg.to_string()),
        },
        _ => ChatCommand::Prompt(line.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("  "), ChatCommand::Empty);
        assert_eq!(parse_command("QUIT"), ChatCommand::Exit);
        assert_eq!(parse_command("/backend Patcher"), ChatCommand::Backend(HelperKind::Patcher));
        assert_eq!(
            parse_command("/backend oracle"),
            ChatCommand::UnknownBackend("oracle".to_string())
        );
        assert_eq!(parse_command("/store tea, no sugar"), ChatCommand::Store("tea, no sugar".to_string()));
        assert_eq!(parse_command("/recall"), ChatCommand::Recall);
        assert_eq!(parse_command("/usr/bin is where?"), ChatCommand::Prompt("/usr/bin is where?".to_string()));
        assert_eq!(parse_command("hello"), ChatCommand::Prompt("hello".to_string()));
    }
}
