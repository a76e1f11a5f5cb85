//! Match lifecycle and input routing.
//!
//! `Game` owns the map, both players, and the turn manager. It turns cell
//! selections into moves for the active human, runs computer windows as
//! deferred tasks, and reports every state change to a [`Renderer`].
//!
//! Deferred work sits in a FIFO that the front end drains with
//! [`Game::run_pending`]. The screen stays locked while a computer window
//! is open, during initialization, and while a move is being applied, so
//! input is never accepted against a half-updated board.

use std::collections::VecDeque;
use std::fmt;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};

use crate::board::{Cell, Color, Map, Move, Position, Side};
use crate::error::{EngineError, InvariantViolation, MapError};
use crate::player::{Player, TurnAction};
use crate::rules::Rules;
use crate::turn::{initialize, Outcome, Progress, TurnManager};

/// Which kind of opponent sits on the Red side. Blue is always human.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    VsComputer,
    VsHuman,
}

impl GameMode {
    pub fn parse(s: &str) -> Option<GameMode> {
        match s {
            "computer" | "vs-computer" => Some(GameMode::VsComputer),
            "human" | "vs-human" => Some(GameMode::VsHuman),
            _ => None,
        }
    }

    /// The two players this mode seats, Blue first.
    pub fn players(self) -> [Player; 2] {
        match self {
            GameMode::VsComputer => [Player::human(Side::Blue), Player::computer(Side::Red)],
            GameMode::VsHuman => [Player::human(Side::Blue), Player::human(Side::Red)],
        }
    }
}

/// Final result shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Blue,
    Red,
    Tie,
}

impl From<Outcome> for GameResult {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Winner(Side::Blue) => GameResult::Blue,
            Outcome::Winner(Side::Red) => GameResult::Red,
            Outcome::Tie => GameResult::Tie,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GameResult::Blue => "blue",
            GameResult::Red => "red",
            GameResult::Tie => "tie",
        })
    }
}

/// Notifications sent to the render collaborator. Fire and forget.
pub trait Renderer {
    fn update(&mut self, map: &Map);
    /// Redraw with the most recent move highlighted.
    fn update_with_move(&mut self, map: &Map, mv: &Move);
    fn update_turn_number(&mut self, turn: u32);
    fn lock_buttons(&mut self);
    fn unlock_buttons(&mut self);
    fn show_end_message(&mut self, result: GameResult, color: Color);
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn update(&mut self, _map: &Map) {}
    fn update_with_move(&mut self, _map: &Map, _mv: &Move) {}
    fn update_turn_number(&mut self, _turn: u32) {}
    fn lock_buttons(&mut self) {}
    fn unlock_buttons(&mut self) {}
    fn show_end_message(&mut self, _result: GameResult, _color: Color) {}
}

/// A recorded render notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    Update,
    Moved(Move),
    Turn(u32),
    Locked,
    Unlocked,
    End(GameResult, Color),
}

/// Keeps every notification in order. Useful for tests and replays.
#[derive(Debug, Clone, Default)]
pub struct RenderLog {
    pub events: Vec<RenderEvent>,
}

impl RenderLog {
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Renderer for RenderLog {
    fn update(&mut self, _map: &Map) {
        self.events.push(RenderEvent::Update);
    }
    fn update_with_move(&mut self, _map: &Map, mv: &Move) {
        self.events.push(RenderEvent::Moved(*mv));
    }
    fn update_turn_number(&mut self, turn: u32) {
        self.events.push(RenderEvent::Turn(turn));
    }
    fn lock_buttons(&mut self) {
        self.events.push(RenderEvent::Locked);
    }
    fn unlock_buttons(&mut self) {
        self.events.push(RenderEvent::Unlocked);
    }
    fn show_end_message(&mut self, result: GameResult, color: Color) {
        self.events.push(RenderEvent::End(result, color));
    }
}

/// Deferred work scheduled on the game's cooperative queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    /// Open the active player's window.
    BeginWindow,
    /// Ask the active computer for its next action.
    ComputerStep,
}

/// Callback fired for every accepted cell selection.
pub type CellListener = Box<dyn FnMut(&Cell)>;

/// The match mediator.
pub struct Game<R: Renderer> {
    map: Map,
    players: [Player; 2],
    rules: Rules,
    renderer: R,
    turn_manager: Option<TurnManager>,
    rng: SmallRng,
    pending: VecDeque<Task>,
    listeners: Vec<CellListener>,
    result: Option<GameResult>,
    started: bool,
    finished: bool,
    screen_locked: bool,
}

impl<R: Renderer> Game<R> {
    /// Creates a match in the given mode.
    pub fn new(mode: GameMode, map: Map, rules: Rules, renderer: R) -> Result<Self, EngineError> {
        Self::with_players(map, mode.players(), rules, renderer)
    }

    /// Creates a match with explicit players, Blue first.
    ///
    /// Fails before anything is bound if the rules are invalid or the map
    /// cannot supply both sides' starting cells.
    pub fn with_players(
        map: Map,
        mut players: [Player; 2],
        rules: Rules,
        renderer: R,
    ) -> Result<Self, EngineError> {
        rules.validate()?;

        let available = map.cells().iter().filter(|c| c.is_neutral()).count();
        let required = rules.required_cells();
        if available < required {
            return Err(MapError::TooFewCells { required, available }.into());
        }

        if players[0].side() == players[1].side() {
            return Err(InvariantViolation::new("both players share one side").into());
        }
        if players[0].side() != Side::Blue {
            players.swap(0, 1);
        }

        for player in &mut players {
            player.initialize(&rules);
        }

        let rng = if rules.seed != 0 {
            SmallRng::seed_from_u64(rules.seed)
        } else {
            SmallRng::from_entropy()
        };

        Ok(Game {
            map,
            players,
            rules,
            renderer,
            turn_manager: None,
            rng,
            pending: VecDeque::new(),
            listeners: Vec::new(),
            result: None,
            started: false,
            finished: false,
            screen_locked: true,
        })
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    pub fn player(&self, side: Side) -> &Player {
        &self.players[side.index()]
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn turn_manager(&self) -> Option<&TurnManager> {
        self.turn_manager.as_ref()
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_screen_locked(&self) -> bool {
        self.screen_locked
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Registers a callback for accepted cell selections.
    pub fn add_cell_listener(&mut self, listener: CellListener) {
        self.listeners.push(listener);
    }

    /// Starts the match: assigns starting cells and opens Blue's window.
    pub fn start(&mut self) -> Result<(), EngineError> {
        self.started = true;
        self.finished = false;
        self.lock_screen();
        self.update_map();
        info!(map = self.map.name(), "starting match");
        self.run_initialization()
    }

    /// Resets the board and players and starts over.
    pub fn restart(&mut self) -> Result<(), EngineError> {
        self.started = true;
        self.finished = false;
        self.result = None;
        self.pending.clear();
        self.turn_manager = None;

        self.lock_screen();
        for player in &mut self.players {
            player.restart();
        }
        self.map.restart();
        self.update_map();
        info!(map = self.map.name(), "restarting match");
        self.run_initialization()
    }

    fn run_initialization(&mut self) -> Result<(), EngineError> {
        initialize(&mut self.map, &self.rules, &mut self.rng)?;
        self.update_map();
        self.game_initialized();
        Ok(())
    }

    /// Builds and starts a fresh turn manager once starting cells are set.
    fn game_initialized(&mut self) {
        let mut tm = TurnManager::new(&self.rules);
        tm.start();
        self.renderer.update_turn_number(tm.turn());
        self.turn_manager = Some(tm);
        self.schedule(Task::BeginWindow);
    }

    fn schedule(&mut self, task: Task) {
        self.pending.push_back(task);
    }

    /// Runs deferred tasks until the queue is empty. Returns how many ran.
    ///
    /// An invariant violation halts the match and is returned.
    pub fn run_pending(&mut self) -> Result<usize, EngineError> {
        let mut count = 0;
        while self.step()? {
            count += 1;
        }
        Ok(count)
    }

    /// Runs one deferred task. Returns false if there was none.
    pub fn step(&mut self) -> Result<bool, EngineError> {
        let Some(task) = self.pending.pop_front() else {
            return Ok(false);
        };
        if self.finished {
            return Ok(true);
        }
        let Some(side) = self.turn_manager.as_ref().and_then(TurnManager::awaiting) else {
            return Ok(true);
        };

        if !self.players[side.index()].is_human() {
            self.lock_screen();
        }
        let player = &mut self.players[side.index()];
        let action = match task {
            Task::BeginWindow => player.on_turn_start(&self.map),
            Task::ComputerStep => player.next_action(&self.map),
        };
        self.handle_action(side, action)?;
        Ok(true)
    }

    fn handle_action(&mut self, side: Side, action: TurnAction) -> Result<(), EngineError> {
        match action {
            TurnAction::Submit(mv) => self.submit(side, mv),
            TurnAction::Pass => self.end_window(),
            TurnAction::AwaitInput => {
                self.unlock_screen(true);
                Ok(())
            }
        }
    }

    /// Feeds a move to the turn manager and reacts to the result.
    fn submit(&mut self, side: Side, mv: Move) -> Result<(), EngineError> {
        self.lock_screen();
        let Some(tm) = self.turn_manager.as_mut() else {
            return Ok(());
        };
        match tm.submit(&mut self.map, mv) {
            Ok((_, progress)) => {
                self.renderer.update_with_move(&self.map, &mv);
                self.after_progress(progress);
                Ok(())
            }
            Err(EngineError::IllegalMove(reason)) => {
                warn!(%mv, %reason, "discarded move");
                if self.players[side.index()].is_human() {
                    self.unlock_screen(true);
                    Ok(())
                } else {
                    self.end_window()
                }
            }
            Err(e) => Err(self.halt(e)),
        }
    }

    fn end_window(&mut self) -> Result<(), EngineError> {
        let Some(tm) = self.turn_manager.as_mut() else {
            return Ok(());
        };
        match tm.pass_turn(&mut self.map) {
            Ok(progress) => {
                self.after_progress(progress);
                Ok(())
            }
            Err(EngineError::IllegalMove(reason)) => {
                debug!(%reason, "pass ignored");
                Ok(())
            }
            Err(e) => Err(self.halt(e)),
        }
    }

    fn after_progress(&mut self, progress: Progress) {
        match progress {
            Progress::WindowOpen { side, .. } => {
                if self.players[side.index()].is_human() {
                    self.unlock_screen(true);
                } else {
                    self.schedule(Task::ComputerStep);
                }
            }
            Progress::TurnPassed { next, turn, produced } => {
                if produced {
                    self.update_map();
                    self.update_turn_number(turn);
                }
                debug!(side = %next, turn, "window opened");
                self.lock_screen();
                self.schedule(Task::BeginWindow);
            }
            Progress::Finished(Outcome::Winner(side)) => self.game_finished(side),
            Progress::Finished(Outcome::Tie) => self.game_tie(),
        }
    }

    fn halt(&mut self, err: EngineError) -> EngineError {
        error!(%err, "match halted");
        self.finished = true;
        self.pending.clear();
        self.lock_screen();
        err
    }

    /// Handles a tap on the board.
    ///
    /// Ignored while the screen is locked or when no cell sits at
    /// `position`. Otherwise listeners are told, and the active human
    /// player, if any, receives the selection.
    pub fn on_click(&mut self, position: Position) -> Result<(), EngineError> {
        if self.is_screen_locked() {
            debug!(%position, "click ignored while locked");
            return Ok(());
        }
        let Some(cell) = self.map.cell_at(position).copied() else {
            return Ok(());
        };
        for listener in &mut self.listeners {
            listener(&cell);
        }

        let Some(side) = self.turn_manager.as_ref().and_then(TurnManager::awaiting) else {
            return Ok(());
        };
        let player = &mut self.players[side.index()];
        if !player.is_human() {
            return Ok(());
        }
        match player.on_cell_selected(&self.map, position) {
            Some(mv) => self.submit(side, mv),
            None => Ok(()),
        }
    }

    /// Ends the active human's window early. Returns false when ignored.
    pub fn pass_turn(&mut self) -> Result<bool, EngineError> {
        if self.is_screen_locked() || self.turn_manager.is_none() {
            return Ok(false);
        }
        self.lock_screen();
        self.end_window()?;
        Ok(true)
    }

    pub fn lock_screen(&mut self) {
        if !self.screen_locked {
            self.screen_locked = true;
            self.renderer.lock_buttons();
        }
    }

    /// Accepts input again. `notify_ui` also re-enables the front end's
    /// controls.
    pub fn unlock_screen(&mut self, notify_ui: bool) {
        self.screen_locked = false;
        if notify_ui {
            self.renderer.unlock_buttons();
        }
    }

    pub fn update_map(&mut self) {
        self.renderer.update(&self.map);
    }

    pub fn update_turn_number(&mut self, turn: u32) {
        self.renderer.update_turn_number(turn);
    }

    fn game_finished(&mut self, winner: Side) {
        self.finished = true;
        self.pending.clear();
        self.lock_screen();
        let result = if self.players[winner.index()].is_blue() {
            GameResult::Blue
        } else {
            GameResult::Red
        };
        self.result = Some(result);
        info!(%result, "game finished");
        let color = self.players[winner.index()].color();
        self.renderer.show_end_message(result, color);
    }

    fn game_tie(&mut self) {
        self.finished = true;
        self.pending.clear();
        self.lock_screen();
        self.result = Some(GameResult::Tie);
        info!("game tied");
        self.renderer.show_end_message(GameResult::Tie, Color::BLACK);
    }
}

impl<R: Renderer + fmt::Debug> fmt::Debug for Game<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("map", &self.map.name())
            .field("turn_manager", &self.turn_manager)
            .field("pending", &self.pending)
            .field("result", &self.result)
            .field("screen_locked", &self.screen_locked)
            .finish_non_exhaustive()
    }
}
