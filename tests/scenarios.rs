//! Rule scenarios exercised through the public API.

use andwars::board::{Cell, Map, Move, MoveOutcome, Position, Side, Topology};
use andwars::error::{EngineError, IllegalMove, MapError};
use andwars::game::{NullRenderer, RenderEvent, RenderLog};
use andwars::player::Player;
use andwars::protocol::{load_map, parse_grid};
use andwars::turn::{initialize, Outcome, Progress, TurnManager, TurnState};
use andwars::{Game, GameMode, GameResult, Rules};
use rand::rngs::SmallRng;
use rand::SeedableRng;

const A: Position = Position::new(0, 0);
const B: Position = Position::new(1, 0);

fn pair(blue: u32, red: u32) -> Map {
    Map::new(
        "pair",
        vec![
            Cell::new(A, Some(Side::Blue), blue),
            Cell::new(B, Some(Side::Red), red),
        ],
        Topology::Grid,
    )
    .unwrap()
}

fn map_path(name: &str) -> String {
    format!("{}/maps/{}", env!("CARGO_MANIFEST_DIR"), name)
}

#[test]
fn scenario_a_all_but_one_captures() {
    let mut map = pair(5, 3);
    let outcome = map.apply_move(&Move::new(Side::Blue, A, B, 4)).unwrap();

    assert_eq!(outcome, MoveOutcome::Captured { previous_owner: Some(Side::Red) });
    let dest = map.cell_at(B).unwrap();
    assert_eq!(dest.owner, Some(Side::Blue));
    assert_eq!(dest.units, 1);
    assert_eq!(map.cell_at(A).unwrap().units, 1);
}

#[test]
fn scenario_b_weak_attack_is_repelled() {
    let mut map = pair(5, 3);
    let outcome = map.apply_move(&Move::new(Side::Blue, A, B, 2)).unwrap();

    assert_eq!(outcome, MoveOutcome::Repelled);
    let dest = map.cell_at(B).unwrap();
    assert_eq!(dest.owner, Some(Side::Red));
    assert_eq!(dest.units, 1);
    assert_eq!(map.cell_at(A).unwrap().units, 3);
}

#[test]
fn equal_strength_attack_does_not_capture() {
    let mut map = pair(5, 3);
    map.apply_move(&Move::new(Side::Blue, A, B, 3)).unwrap();
    let dest = map.cell_at(B).unwrap();
    assert_eq!(dest.owner, Some(Side::Red));
    assert_eq!(dest.units, 0);
}

#[test]
fn scenario_c_non_adjacent_move_is_rejected() {
    let mut map = parse_grid("name gap\nB.3\n").unwrap();
    let before = map.clone();
    let far = Position::new(2, 0);

    let err = map.apply_move(&Move::new(Side::Blue, A, far, 4)).unwrap_err();
    assert_eq!(err, IllegalMove::NotAdjacent { from: A, to: far });
    assert_eq!(map, before);
}

#[test]
fn scenario_c_through_the_turn_manager() {
    let mut map = parse_grid("name gap\nB.R\n").unwrap();
    let before = map.clone();
    let mut tm = TurnManager::new(&Rules::default());
    tm.start();

    let err = tm
        .submit(&mut map, Move::new(Side::Blue, A, Position::new(2, 0), 4))
        .unwrap_err();
    assert!(matches!(err, EngineError::IllegalMove(IllegalMove::NotAdjacent { .. })));
    assert_eq!(map, before);
    assert_eq!(tm.state(), TurnState::AwaitingPlayerTurn(Side::Blue));
    assert_eq!(tm.moves_made(), 0);
}

#[test]
fn out_of_turn_submission_is_rejected() {
    let mut map = pair(5, 3);
    let before = map.clone();
    let mut tm = TurnManager::new(&Rules::default());
    tm.start();

    let err = tm.submit(&mut map, Move::new(Side::Red, B, A, 2)).unwrap_err();
    assert!(matches!(err, EngineError::IllegalMove(IllegalMove::OutOfTurn(Side::Red))));
    assert_eq!(map, before);
    assert_eq!(tm.state(), TurnState::AwaitingPlayerTurn(Side::Blue));
}

#[test]
fn scenario_d_exact_minimum_initializes() {
    let mut map = parse_grid("name ten\n33333\n33333\n").unwrap();
    let mut rng = SmallRng::seed_from_u64(4);
    let assignment = initialize(&mut map, &Rules::default(), &mut rng).unwrap();

    assert_eq!(assignment.blue.len(), 5);
    assert_eq!(assignment.red.len(), 5);
    assert!(assignment.blue.iter().all(|p| !assignment.red.contains(p)));
    assert_eq!(map.count_owned(Side::Blue), 5);
    assert_eq!(map.count_owned(Side::Red), 5);
}

#[test]
fn scenario_d_too_few_cells_fails_match_setup() {
    let map = parse_grid("name nine\n333\n333\n333\n").unwrap();
    let err = Game::new(GameMode::VsComputer, map, Rules::default(), NullRenderer).unwrap_err();
    assert!(matches!(
        err,
        EngineError::MapLoad(MapError::TooFewCells { required: 10, available: 9 })
    ));
}

#[test]
fn elimination_finishes_immediately() {
    let mut map = pair(5, 3);
    let mut tm = TurnManager::new(&Rules::default());
    tm.start();

    let (_, progress) = tm.submit(&mut map, Move::new(Side::Blue, A, B, 4)).unwrap();
    assert_eq!(progress, Progress::Finished(Outcome::Winner(Side::Blue)));
    assert_eq!(tm.state(), TurnState::Finished(Outcome::Winner(Side::Blue)));
    assert!(tm.submit(&mut map, Move::new(Side::Blue, B, A, 0)).is_err());
}

#[test]
fn production_fires_after_red_window() {
    let mut map = pair(5, 3);
    let rules = Rules { production: 2, ..Rules::default() };
    let mut tm = TurnManager::new(&rules);
    tm.start();

    let progress = tm.pass_turn(&mut map).unwrap();
    assert_eq!(progress, Progress::TurnPassed { next: Side::Red, turn: 1, produced: false });
    assert_eq!(map.cell_at(A).unwrap().units, 5);

    let progress = tm.pass_turn(&mut map).unwrap();
    assert_eq!(progress, Progress::TurnPassed { next: Side::Blue, turn: 2, produced: true });
    assert_eq!(map.cell_at(A).unwrap().units, 7);
    assert_eq!(map.cell_at(B).unwrap().units, 5);
}

#[test]
fn window_closes_after_move_limit() {
    let mut map = parse_grid("name row\nB33R\n").unwrap();
    let mut tm = TurnManager::new(&Rules::default());
    tm.start();

    let (_, progress) = tm.submit(&mut map, Move::new(Side::Blue, A, B, 4)).unwrap();
    assert_eq!(progress, Progress::WindowOpen { side: Side::Blue, moves_left: 1 });
    let (outcome, progress) = tm.submit(&mut map, Move::new(Side::Blue, B, A, 1)).unwrap();
    assert_eq!(outcome, MoveOutcome::Reinforced);
    assert_eq!(progress, Progress::TurnPassed { next: Side::Red, turn: 1, produced: false });
    assert_eq!(tm.moves_made(), 0);
}

#[test]
fn turn_limit_ends_in_tie() {
    let mut map = pair(5, 3);
    let rules = Rules { max_turns: 1, ..Rules::default() };
    let mut tm = TurnManager::new(&rules);
    tm.start();

    tm.pass_turn(&mut map).unwrap();
    let progress = tm.pass_turn(&mut map).unwrap();
    assert_eq!(progress, Progress::Finished(Outcome::Tie));
    assert_eq!(tm.turn(), 2);
}

#[test]
fn restart_restores_the_loaded_board() {
    let mut map = pair(5, 3);
    map.apply_move(&Move::new(Side::Blue, A, B, 4)).unwrap();
    map.produce(1);
    map.restart();
    assert_eq!(map, pair(5, 3));
}

fn play_blue_passes(seed: u64) -> (Map, Vec<RenderEvent>, Option<GameResult>) {
    let map = load_map(map_path("duel.map")).unwrap();
    let rules = Rules { seed, max_turns: 30, ..Rules::default() };
    let mut game = Game::new(GameMode::VsComputer, map, rules, RenderLog::default()).unwrap();
    game.start().unwrap();
    game.run_pending().unwrap();
    while !game.is_finished() {
        assert!(game.pass_turn().unwrap());
        game.run_pending().unwrap();
    }
    (game.map().clone(), game.renderer().events.clone(), game.result())
}

#[test]
fn seeded_matches_are_deterministic() {
    let first = play_blue_passes(2024);
    let second = play_blue_passes(2024);
    assert_eq!(first, second);
    assert!(first.2.is_some());
}

#[test]
fn passive_blue_never_wins() {
    let (_, events, result) = play_blue_passes(8);
    assert_ne!(result, Some(GameResult::Blue));
    assert!(matches!(events.last(), Some(RenderEvent::End(..))));
}

#[test]
fn computer_vs_computer_on_a_graph_map() {
    let map = load_map(map_path("ring.json")).unwrap();
    assert_eq!(map.len(), 13);
    let rules = Rules { seed: 3, initial_cells: 3, ..Rules::default() };
    let players = [Player::computer(Side::Blue), Player::computer(Side::Red)];
    let mut game = Game::with_players(map, players, rules, NullRenderer).unwrap();
    game.start().unwrap();
    game.run_pending().unwrap();
    assert!(game.is_finished());
    assert!(game.result().is_some());
}
