//! Text front-end command parser.
//!
//! Parses lines read from stdin into `Command` variants the main loop
//! dispatches on.

use tracing::warn;

use crate::board::Position;
use crate::game::GameMode;

/// A parsed front-end command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load a map and start a match: `newgame <computer|human> <mapfile>`.
    NewGame { mode: GameMode, path: String },

    /// Tap a cell: `click <x> <y>`.
    Click(Position),

    /// End the active human's window early.
    Pass,

    /// Reset the board and start over.
    Restart,

    /// Print the board.
    Show,

    /// Change a rule for the next match: `setoption name <id> value <x>`.
    SetOption { name: String, value: String },

    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (&head, _) = tokens.split_first()?;

    match head {
        "quit" => Some(Command::Quit),
        "pass" => Some(Command::Pass),
        "restart" => Some(Command::Restart),
        "show" => Some(Command::Show),

        "newgame" => parse_newgame(&tokens),
        "click" => parse_click(&tokens),
        "setoption" => parse_setoption(&tokens),

        other => {
            warn!(command = other, "unknown command");
            None
        }
    }
}

/// Parses `newgame <computer|human> <mapfile>`. The path may contain
/// spaces.
fn parse_newgame(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 3 {
        warn!("malformed newgame: expected 'newgame <computer|human> <mapfile>'");
        return None;
    }
    let Some(mode) = GameMode::parse(tokens[1]) else {
        warn!(mode = tokens[1], "unknown game mode");
        return None;
    };
    Some(Command::NewGame {
        mode,
        path: tokens[2..].join(" "),
    })
}

/// Parses `click <x> <y>`.
fn parse_click(tokens: &[&str]) -> Option<Command> {
    if tokens.len() != 3 {
        warn!("malformed click: expected 'click <x> <y>'");
        return None;
    }
    match (tokens[1].parse(), tokens[2].parse()) {
        (Ok(x), Ok(y)) => Some(Command::Click(Position::new(x, y))),
        _ => {
            warn!(x = tokens[1], y = tokens[2], "malformed click coordinates");
            None
        }
    }
}

/// Parses `setoption name <id> value <x>`. Option ids and values are
/// single tokens, matching the names `Rules::set_option` accepts.
fn parse_setoption(tokens: &[&str]) -> Option<Command> {
    match tokens {
        [_, "name", name, "value", value] if *name != "value" => Some(Command::SetOption {
            name: (*name).to_string(),
            value: (*value).to_string(),
        }),
        _ => {
            warn!("malformed setoption: expected 'setoption name <id> value <x>'");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_commands() {
        assert_eq!(parse_command("quit"), Some(Command::Quit));
        assert_eq!(parse_command("  pass  "), Some(Command::Pass));
        assert_eq!(parse_command("restart"), Some(Command::Restart));
        assert_eq!(parse_command("show"), Some(Command::Show));
    }

    #[test]
    fn parse_empty_line_returns_none() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("   "), None);
        assert_eq!(parse_command("\n"), None);
    }

    #[test]
    fn parse_unknown_command_returns_none() {
        assert_eq!(parse_command("foobar"), None);
    }

    #[test]
    fn parse_newgame_modes() {
        assert_eq!(
            parse_command("newgame computer maps/duel.map"),
            Some(Command::NewGame {
                mode: GameMode::VsComputer,
                path: "maps/duel.map".to_string(),
            })
        );
        assert_eq!(
            parse_command("newgame human my maps/two words.map"),
            Some(Command::NewGame {
                mode: GameMode::VsHuman,
                path: "my maps/two words.map".to_string(),
            })
        );
    }

    #[test]
    fn parse_newgame_malformed_returns_none() {
        assert_eq!(parse_command("newgame computer"), None);
        assert_eq!(parse_command("newgame robot maps/duel.map"), None);
    }

    #[test]
    fn parse_click_coordinates() {
        assert_eq!(parse_command("click 3 4"), Some(Command::Click(Position::new(3, 4))));
        assert_eq!(parse_command("click -1 0"), Some(Command::Click(Position::new(-1, 0))));
    }

    #[test]
    fn parse_click_malformed_returns_none() {
        assert_eq!(parse_command("click 3"), None);
        assert_eq!(parse_command("click a b"), None);
        assert_eq!(parse_command("click 1 2 3"), None);
    }

    #[test]
    fn parse_setoption_with_value() {
        assert_eq!(
            parse_command("setoption name MovesPerPlayer value 3"),
            Some(Command::SetOption {
                name: "MovesPerPlayer".to_string(),
                value: "3".to_string(),
            })
        );
        assert_eq!(
            parse_command("setoption name Placement value separated"),
            Some(Command::SetOption {
                name: "Placement".to_string(),
                value: "separated".to_string(),
            })
        );
    }

    #[test]
    fn parse_setoption_requires_a_value() {
        assert_eq!(parse_command("setoption name Seed"), None);
        assert_eq!(parse_command("setoption name Seed value"), None);
    }

    #[test]
    fn parse_setoption_rejects_multi_word_parts() {
        assert_eq!(parse_command("setoption name Max Turns value 3"), None);
        assert_eq!(parse_command("setoption name Seed value 1 2"), None);
    }

    #[test]
    fn parse_setoption_malformed_returns_none() {
        assert_eq!(parse_command("setoption"), None);
        assert_eq!(parse_command("setoption Seed 3"), None);
        assert_eq!(parse_command("setoption name value 3"), None);
        assert_eq!(parse_command("setoption name value value 3"), None);
    }
}
