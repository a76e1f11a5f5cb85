//! Headless computer-vs-computer matches.
//!
//! Plays batches of matches on one map with both sides computer
//! controlled, optionally in parallel, and records each result as a
//! JSON line. Game `i` is seeded with `seed + i` (wrapping, and bumped
//! to 1 where that lands on 0) so any single match can be replayed on its
//! own.

use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::board::{Color, Map, Move, Side};
use crate::error::EngineError;
use crate::game::{Game, GameResult, Renderer};
use crate::player::Player;
use crate::rules::Rules;

/// Configuration for a self-play batch.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    pub num_games: usize,
    /// Worker threads; 1 runs sequentially on the caller's thread.
    pub threads: usize,
    /// Base seed; 0 draws each game's seed from entropy.
    pub seed: u64,
    pub rules: Rules,
    /// Suppress per-game progress logging.
    pub quiet: bool,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            threads: 4,
            seed: 0,
            rules: Rules::default(),
            quiet: false,
        }
    }
}

/// Outcome of one self-play match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub game_id: usize,
    pub map: String,
    pub seed: u64,
    /// `None` if the match never reached a result.
    pub result: Option<GameResult>,
    pub turns: u32,
    pub moves: usize,
    pub blue_cells: usize,
    pub red_cells: usize,
    pub blue_units: u64,
    pub red_units: u64,
}

/// Renderer that only counts applied moves.
#[derive(Debug, Clone, Copy, Default)]
struct MoveCounter {
    moves: usize,
}

impl Renderer for MoveCounter {
    fn update(&mut self, _map: &Map) {}
    fn update_with_move(&mut self, _map: &Map, _mv: &Move) {
        self.moves += 1;
    }
    fn update_turn_number(&mut self, _turn: u32) {}
    fn lock_buttons(&mut self) {}
    fn unlock_buttons(&mut self) {}
    fn show_end_message(&mut self, _result: GameResult, _color: Color) {}
}

/// Plays one computer-vs-computer match to completion.
pub fn play_match(map: &Map, rules: &Rules, game_id: usize) -> Result<MatchRecord, EngineError> {
    let players = [Player::computer(Side::Blue), Player::computer(Side::Red)];
    let mut game = Game::with_players(map.clone(), players, rules.clone(), MoveCounter::default())?;
    game.start()?;
    game.run_pending()?;

    let board = game.map();
    Ok(MatchRecord {
        game_id,
        map: board.name().to_string(),
        seed: rules.seed,
        result: game.result(),
        turns: game.turn_manager().map_or(0, |tm| tm.turn()),
        moves: game.renderer().moves,
        blue_cells: board.count_owned(Side::Blue),
        red_cells: board.count_owned(Side::Red),
        blue_units: board.units_of(Side::Blue),
        red_units: board.units_of(Side::Red),
    })
}

/// Per-game rules. The seed is never 0, so every record can be replayed.
fn rules_for(config: &SelfPlayConfig, game_id: usize) -> Rules {
    let mut rules = config.rules.clone();
    rules.seed = if config.seed != 0 {
        config.seed.wrapping_add(game_id as u64).max(1)
    } else {
        rand::random::<u64>().max(1)
    };
    rules
}

/// Plays all configured games and returns their records in game order.
/// Matches that fail are logged and left out.
pub fn run_self_play(map: &Map, config: &SelfPlayConfig) -> Vec<MatchRecord> {
    let mut records = Vec::with_capacity(config.num_games);
    run_self_play_with(map, config, |outcome| match outcome {
        Ok(record) => records.push(record),
        Err(e) => warn!(error = %e, "self-play match failed"),
    });
    records.sort_by_key(|r| r.game_id);
    records
}

/// Plays all configured games, handing each outcome to `on_game` as it
/// completes.
pub fn run_self_play_with<F>(map: &Map, config: &SelfPlayConfig, on_game: F)
where
    F: FnMut(Result<MatchRecord, EngineError>) + Send,
{
    if config.threads <= 1 {
        run_self_play_sequential(map, config, on_game);
    } else {
        run_self_play_parallel(map, config, on_game);
    }
}

fn run_self_play_sequential<F>(map: &Map, config: &SelfPlayConfig, mut on_game: F)
where
    F: FnMut(Result<MatchRecord, EngineError>),
{
    for i in 0..config.num_games {
        let started = Instant::now();
        let outcome = play_match(map, &rules_for(config, i), i);
        log_progress(config, i + 1, &outcome, started);
        on_game(outcome);
    }
}

/// Plays games on a rayon pool and delivers them back on the caller's
/// thread through a channel.
fn run_self_play_parallel<F>(map: &Map, config: &SelfPlayConfig, mut on_game: F)
where
    F: FnMut(Result<MatchRecord, EngineError>) + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let pool = match rayon::ThreadPoolBuilder::new().num_threads(config.threads).build() {
        Ok(pool) => pool,
        Err(e) => {
            warn!(error = %e, "falling back to sequential self-play");
            return run_self_play_sequential(map, config, on_game);
        }
    };

    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<Result<MatchRecord, EngineError>>();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            pool.install(|| {
                (0..config.num_games).into_par_iter().for_each_with(tx, |tx, i| {
                    let started = Instant::now();
                    let outcome = play_match(map, &rules_for(config, i), i);
                    let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    log_progress(config, n, &outcome, started);
                    let _ = tx.send(outcome);
                });
            });
        });

        for outcome in rx {
            on_game(outcome);
        }
    });
}

fn log_progress(config: &SelfPlayConfig, n: usize, outcome: &Result<MatchRecord, EngineError>, started: Instant) {
    if config.quiet {
        return;
    }
    if let Ok(record) = outcome {
        let result = record.result.map_or_else(|| "unfinished".to_string(), |r| r.to_string());
        info!(
            game = n,
            of = config.num_games,
            %result,
            turns = record.turns,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "self-play match complete"
        );
    }
}

/// Writes records as JSONL, one object per line.
pub fn write_jsonl<W: Write>(records: &[MatchRecord], out: &mut W) -> std::io::Result<()> {
    for record in records {
        serde_json::to_writer(&mut *out, record)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Aggregate results of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub games: usize,
    pub blue_wins: usize,
    pub red_wins: usize,
    pub ties: usize,
    pub unfinished: usize,
    pub total_turns: u64,
}

impl Summary {
    pub fn from_records(records: &[MatchRecord]) -> Summary {
        let mut summary = Summary {
            games: records.len(),
            ..Summary::default()
        };
        for record in records {
            match record.result {
                Some(GameResult::Blue) => summary.blue_wins += 1,
                Some(GameResult::Red) => summary.red_wins += 1,
                Some(GameResult::Tie) => summary.ties += 1,
                None => summary.unfinished += 1,
            }
            summary.total_turns += u64::from(record.turns);
        }
        summary
    }

    pub fn average_turns(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.total_turns as f64 / self.games as f64
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Self-Play Summary ===")?;
        writeln!(f, "Games: {}", self.games)?;
        writeln!(f, "Blue wins: {}", self.blue_wins)?;
        writeln!(f, "Red wins: {}", self.red_wins)?;
        writeln!(f, "Ties: {}", self.ties)?;
        if self.unfinished > 0 {
            writeln!(f, "Unfinished: {}", self.unfinished)?;
        }
        write!(f, "Average turns: {:.1}", self.average_turns())
    }
}
