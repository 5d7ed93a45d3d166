use std::cmp::Ordering;
use std::fmt;

use hackmatch_core::{Board, ScorePolicy};

use crate::types::Move;

/// A move sequence with the board it leads to and its objective value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub moves: Vec<Move>,
    /// Projected board after every move is applied
    pub board: Board,
    pub score: i64,
}

impl Plan {
    /// The "do nothing" plan for `board`
    pub fn empty(board: &Board, policy: &ScorePolicy) -> Self {
        Self {
            moves: Vec::new(),
            board: board.clone(),
            score: policy.score_delta(board, board),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Number of releases, i.e. pieces placed
    pub fn releases(&self) -> usize {
        self.moves.iter().filter(|m| **m == Move::Release).count()
    }

    /// Preference order: higher score, then fewer moves, then the
    /// lexicographically smaller move encoding. `Less` means `self` is better.
    pub fn rank(&self, other: &Plan) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.moves.len().cmp(&other.moves.len()))
            .then_with(|| {
                let a = self.moves.iter().map(Move::code);
                let b = other.moves.iter().map(Move::code);
                a.cmp(b)
            })
    }

    pub fn better_than(&self, other: &Plan) -> bool {
        self.rank(other) == Ordering::Less
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.moves.is_empty() {
            return write!(f, "(no moves)");
        }
        for (i, mv) in self.moves.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{mv}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(moves: &[Move], score: i64) -> Plan {
        Plan {
            moves: moves.to_vec(),
            board: Board::new(),
            score,
        }
    }

    #[test]
    fn higher_score_wins() {
        let a = plan(&[Move::Grab(0), Move::Release, Move::Grab(1), Move::Release], 10);
        let b = plan(&[Move::Grab(0), Move::Release], 5);
        assert!(a.better_than(&b));
        assert!(!b.better_than(&a));
    }

    #[test]
    fn shorter_wins_on_equal_score() {
        let a = plan(&[Move::Grab(3), Move::Release], 5);
        let b = plan(&[Move::Grab(0), Move::ShiftRight, Move::Release], 5);
        assert!(a.better_than(&b));
    }

    #[test]
    fn lexicographic_code_breaks_remaining_ties() {
        let a = plan(&[Move::Grab(1), Move::ShiftLeft, Move::Release], 5);
        let b = plan(&[Move::Grab(1), Move::ShiftRight, Move::Release], 5);
        let c = plan(&[Move::Grab(2), Move::ShiftLeft, Move::Release], 5);
        assert!(a.better_than(&b));
        assert!(b.better_than(&c));
        assert_eq!(a.rank(&a), Ordering::Equal);
        assert!(!a.better_than(&a));
    }

    #[test]
    fn empty_plan_scores_height() {
        let mut board = Board::new();
        board.set(8, 0, crate::types::Symbol::Red);
        let p = Plan::empty(&board, &ScorePolicy::DEFAULT);
        assert!(p.is_empty());
        assert_eq!(p.score, -1);
        assert_eq!(p.to_string(), "(no moves)");
        assert_eq!(
            plan(&[Move::Grab(2), Move::ShiftRight, Move::Release], 0).to_string(),
            "grab(2) right release"
        );
    }
}
