use std::time::{Duration, Instant};

use hackmatch_bot::core::{parse_text, render_text, Board};
use hackmatch_bot::engine::{Solver, SolverConfig, StopReason};
use hackmatch_bot::input::{encode, total_delay};
use hackmatch_bot::types::{Action, Move, Symbol};
use hackmatch_bot::vision::{render, BoardParser};

const VERTICAL_RUN: &str =
    ".......\n.......\n.......\n.......\n.......\n.......\n.......\n..r....\ny.r.gbr\n___@___";

fn far() -> Instant {
    Instant::now() + Duration::from_secs(30)
}

fn solver(max_depth: usize) -> Solver {
    Solver::new(SolverConfig {
        max_depth,
        ..SolverConfig::default()
    })
}

#[test]
fn text_board_survives_render_and_parse() {
    let parser = BoardParser::default();
    let board = parse_text(VERTICAL_RUN).unwrap();
    let frame = render(&board, parser.table());
    let parsed = parser.parse_frame(&frame).unwrap();
    assert_eq!(parsed, board);
    assert_eq!(render_text(&parsed), render_text(&board));
}

#[test]
fn screen_to_keys() {
    let parser = BoardParser::default();
    let board = parse_text(VERTICAL_RUN).unwrap();
    let parsed = parser.parse_frame(&render(&board, parser.table())).unwrap();

    let (plan, stats) = solver(6).search(&parsed, far());
    assert_eq!(stats.reason, StopReason::Completed);
    assert_eq!(plan.score, 29);
    assert_eq!(plan.to_string(), "grab(6) left left left left release");

    let actions = encode(&plan, parsed.cursor());
    let keys: Vec<Action> = actions.iter().map(|a| a.action).collect();
    assert_eq!(
        keys,
        vec![
            Action::ShiftRight,
            Action::ShiftRight,
            Action::ShiftRight,
            Action::Grab,
            Action::ShiftLeft,
            Action::ShiftLeft,
            Action::ShiftLeft,
            Action::ShiftLeft,
            Action::Release,
            Action::ShiftRight,
        ]
    );
    // nine presses at one frame each, one release waiting for the board
    assert_eq!(total_delay(&actions), Duration::from_millis(9 * 17 + 200));
}

#[test]
fn replayed_plan_reaches_projected_board() {
    let board = parse_text(VERTICAL_RUN).unwrap();
    let (plan, _) = solver(6).search(&board, far());
    let end = plan
        .moves
        .iter()
        .fold(board.clone(), |b, mv| b.apply_move(*mv).unwrap());
    assert_eq!(end, plan.board);
    assert_eq!(end.held(), None);
    assert_eq!(end.get(8, 2), Some(Symbol::Empty));
}

#[test]
fn expired_deadline_still_returns_a_plan() {
    let board = parse_text(VERTICAL_RUN).unwrap();
    let (plan, stats) = solver(16).search(&board, Instant::now());
    assert_eq!(stats.reason, StopReason::Timeout);
    assert!(!plan.is_empty());
    assert!(plan.moves.first().is_some_and(|m| matches!(m, Move::Grab(_))));
}

#[test]
fn empty_board_needs_no_keys() {
    let board = Board::new();
    let (plan, _) = solver(6).search(&board, far());
    assert!(plan.is_empty());
    assert!(encode(&plan, board.cursor()).is_empty());
}
