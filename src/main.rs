//! Andwars -- interactive text front end.
//!
//! Reads commands from stdin and renders the match to stdout, one
//! notification per line. Diagnostics go to stderr through `tracing`;
//! set `RUST_LOG=andwars=debug` to follow every move.

use std::io::{self, BufRead, BufWriter, Stdout, Write};

use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use andwars::board::{Color, Map, Move};
use andwars::protocol::load_map;
use andwars::protocol::parser::{parse_command, Command};
use andwars::{Game, GameMode, GameResult, Renderer, Rules};

/// Writes render notifications as protocol lines.
///
/// The board is printed as `board <name>`, one `cell <x>,<y> <owner> <units>`
/// line per cell, then `end`.
struct TextRenderer {
    out: BufWriter<Stdout>,
}

impl TextRenderer {
    fn new() -> Self {
        TextRenderer {
            out: BufWriter::new(io::stdout()),
        }
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{}", args) {
            warn!(error = %e, "failed to write to stdout");
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.out.flush() {
            warn!(error = %e, "failed to flush stdout");
        }
    }

    fn board(&mut self, map: &Map) {
        self.line(format_args!("board {}", map.name()));
        for cell in map.cells() {
            let owner = cell.owner.map_or("neutral", |s| s.name());
            self.line(format_args!("cell {} {} {}", cell.position, owner, cell.units));
        }
        self.line(format_args!("end"));
    }
}

impl Renderer for TextRenderer {
    fn update(&mut self, map: &Map) {
        self.board(map);
    }

    fn update_with_move(&mut self, map: &Map, mv: &Move) {
        self.line(format_args!("move {}", mv));
        self.board(map);
    }

    fn update_turn_number(&mut self, turn: u32) {
        self.line(format_args!("turn {}", turn));
    }

    fn lock_buttons(&mut self) {
        self.line(format_args!("locked"));
    }

    fn unlock_buttons(&mut self) {
        self.line(format_args!("unlocked"));
    }

    fn show_end_message(&mut self, result: GameResult, color: Color) {
        self.line(format_args!("result {} {}", result, color));
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn new_game(mode: GameMode, path: &str, rules: &Rules) -> Option<Game<TextRenderer>> {
    let map = match load_map(path) {
        Ok(map) => map,
        Err(e) => {
            error!(path, error = %e, "failed to load map");
            return None;
        }
    };
    let mut game = match Game::new(mode, map, rules.clone(), TextRenderer::new()) {
        Ok(game) => game,
        Err(e) => {
            error!(path, error = %e, "cannot start match");
            return None;
        }
    };
    if let Err(e) = game.start() {
        error!(error = %e, "match setup failed");
    }
    Some(game)
}

/// Runs the command loop until `quit` or end of input.
fn main() {
    init_logging();

    let mut rules = Rules::default();
    let mut game: Option<Game<TextRenderer>> = None;

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        let outcome = match cmd {
            Command::Quit => break,
            Command::NewGame { mode, path } => {
                if let Some(old) = game.as_mut() {
                    old.renderer_mut().flush();
                }
                game = new_game(mode, &path, &rules);
                Ok(())
            }
            Command::SetOption { name, value } => {
                if let Err(e) = rules.set_option(&name, &value) {
                    warn!(error = %e, "setoption rejected");
                }
                Ok(())
            }
            Command::Click(position) => game.as_mut().map_or(Ok(()), |g| g.on_click(position)),
            Command::Pass => game.as_mut().map_or(Ok(()), |g| g.pass_turn().map(|_| ())),
            Command::Restart => game.as_mut().map_or(Ok(()), Game::restart),
            Command::Show => {
                if let Some(g) = game.as_mut() {
                    g.update_map();
                }
                Ok(())
            }
        };
        if let Err(e) = outcome {
            error!(error = %e, "command failed");
        }

        if let Some(g) = game.as_mut() {
            if let Err(e) = g.run_pending() {
                error!(error = %e, "match halted");
            }
            g.renderer_mut().flush();
        }
    }

    if let Some(g) = game.as_mut() {
        g.renderer_mut().flush();
    }
}
