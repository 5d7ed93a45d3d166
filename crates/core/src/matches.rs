//! Match detection, clearing, gravity and chain resolution.
//!
//! A run is a maximal horizontal or vertical line of at least [`MIN_RUN`] cells
//! of the same color. Wildcards join a run of any color, but a run made only of
//! wildcards does not count. Bombs clear in runs of [`MIN_BOMB_RUN`] of the same
//! bomb and never join a color run. Obstacles, empty cells and cells that are
//! already animating (`matching`) break runs.
//!
//! [`MIN_RUN`]: crate::types::MIN_RUN
//! [`MIN_BOMB_RUN`]: crate::types::MIN_BOMB_RUN

use arrayvec::ArrayVec;

use crate::board::{Board, BOARD_SIZE};
use crate::scoring::ScorePolicy;
use crate::types::{Symbol, BOARD_COLS, BOARD_ROWS};

const ROWS: usize = BOARD_ROWS as usize;
const COLS: usize = BOARD_COLS as usize;
const MAX_LINE: usize = if ROWS > COLS { ROWS } else { COLS };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// One run of matching cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup {
    /// The color or bomb of the run (never `Wildcard`)
    pub symbol: Symbol,
    pub axis: Axis,
    /// (row, col) of every cell, in scan order
    pub cells: ArrayVec<(u8, u8), MAX_LINE>,
}

impl MatchGroup {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Outcome of resolving the cascade triggered by one release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChainReport {
    /// Number of clear steps (0 = nothing cleared)
    pub depth: usize,
    /// Distinct cells cleared across all steps
    pub cleared: usize,
    /// Points awarded across all steps
    pub points: i64,
}

/// Scan one line of cells for runs, pushing them into `out`
fn scan_line(
    line: &[(usize, usize)],
    board: &Board,
    axis: Axis,
    out: &mut Vec<MatchGroup>,
) {
    let mut found: ArrayVec<(usize, usize, Symbol), MAX_LINE> = ArrayVec::new();

    for color in Symbol::COLORS.into_iter().chain(Symbol::BOMBS) {
        let Some(min_run) = color.min_run() else {
            continue;
        };
        let wild = color.is_color();
        let mut start = 0usize;
        while start < line.len() {
            let joins = |i: usize| {
                let (row, col) = line[i];
                let symbol = board.get(row, col).unwrap_or(Symbol::Empty);
                !board.is_matching(row, col)
                    && (symbol == color || (wild && symbol == Symbol::Wildcard))
            };
            if !joins(start) {
                start += 1;
                continue;
            }
            let mut end = start;
            let mut has_color = false;
            while end < line.len() && joins(end) {
                let (row, col) = line[end];
                has_color |= board.get(row, col) == Some(color);
                end += 1;
            }
            if end - start >= min_run && has_color && !found.is_full() {
                found.push((start, end, color));
            }
            start = end;
        }
    }

    found.sort_by_key(|&(start, _, color)| (start, color));
    for (start, end, color) in found {
        let mut cells = ArrayVec::new();
        for &(row, col) in &line[start..end] {
            cells.push((row as u8, col as u8));
        }
        out.push(MatchGroup {
            symbol: color,
            axis,
            cells,
        });
    }
}

/// Find every run that clears
///
/// Horizontal runs come first (top to bottom, left to right), then vertical
/// runs (left to right, top to bottom). A cell may appear in one horizontal and
/// one vertical group.
pub fn find_matches(board: &Board) -> Vec<MatchGroup> {
    let mut out = Vec::new();
    let mut line: ArrayVec<(usize, usize), MAX_LINE> = ArrayVec::new();

    for row in 0..ROWS {
        line.clear();
        line.extend((0..COLS).map(|col| (row, col)));
        scan_line(&line, board, Axis::Horizontal, &mut out);
    }
    for col in 0..COLS {
        line.clear();
        line.extend((0..ROWS).map(|row| (row, col)));
        scan_line(&line, board, Axis::Vertical, &mut out);
    }
    out
}

/// Empty every cell in `groups`; does not settle
pub fn apply_clear(board: &Board, groups: &[MatchGroup]) -> Board {
    let mut next = board.clone();
    for group in groups {
        for &(row, col) in &group.cells {
            next.set(row as usize, col as usize, Symbol::Empty);
        }
    }
    next
}

/// Apply gravity: every column is compacted downward independently
///
/// Cells flagged `matching` are anchors: they stay where they are and the
/// pieces above them come to rest on top of them.
pub fn settle(board: &Board) -> Board {
    let mut next = board.clone();
    for col in 0..COLS {
        let mut write = ROWS as isize - 1;
        for row in (0..ROWS).rev() {
            if board.is_matching(row, col) {
                write = row as isize - 1;
                continue;
            }
            let symbol = board.get(row, col).unwrap_or(Symbol::Empty);
            if !symbol.is_piece() {
                continue;
            }
            let target = write as usize;
            if target != row {
                next.set(target, col, symbol);
                next.set(row, col, Symbol::Empty);
            }
            write -= 1;
        }
    }
    next
}

/// True if any run can currently clear
pub fn has_match(board: &Board) -> bool {
    !find_matches(board).is_empty()
}

/// Clear and settle until the board is stable, accumulating chain points
///
/// Step `depth` (1-based) awards `clear_points * sum(group sizes) *
/// multiplier(depth)`; a cell in two crossing runs counts in both groups.
pub fn resolve_chains(board: &Board, policy: &ScorePolicy) -> (Board, ChainReport) {
    let mut current = board.clone();
    let mut report = ChainReport::default();

    loop {
        let groups = find_matches(&current);
        if groups.is_empty() {
            break;
        }
        report.depth += 1;

        let mut cleared = [false; BOARD_SIZE];
        let mut group_cells = 0usize;
        for group in &groups {
            group_cells += group.len();
            for &(row, col) in &group.cells {
                cleared[row as usize * COLS + col as usize] = true;
            }
        }
        report.cleared += cleared.iter().filter(|c| **c).count();

        let points = policy.chain_points(report.depth, group_cells);
        report.points = report.points.saturating_add(points);
        current.add_points(points);

        current = settle(&apply_clear(&current, &groups));
    }

    (current, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::parse_text;

    fn board(text: &str) -> Board {
        parse_text(text).expect("valid board text")
    }

    #[test]
    fn test_no_runs() {
        let b = board(
            ".......\n.......\n.......\n.......\n.......\n.......\n.......\nrr.....\nbbgrr..",
        );
        assert!(find_matches(&b).is_empty());
    }

    #[test]
    fn test_single_horizontal_run() {
        let b = board(
            ".......\n.......\n.......\n.......\n.......\n.......\n.......\n.......\n.yyyy..",
        );
        let groups = find_matches(&b);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].symbol, Symbol::Yellow);
        assert_eq!(groups[0].axis, Axis::Horizontal);
        assert_eq!(groups[0].cells.as_slice(), &[(8, 1), (8, 2), (8, 3), (8, 4)]);
    }

    #[test]
    fn test_crossing_runs_share_a_cell() {
        let b = board(
            ".......\n.......\n.......\n.......\n.......\n.......\n..g....\n..g....\nggg....",
        );
        let groups = find_matches(&b);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].axis, Axis::Horizontal);
        assert_eq!(groups[1].axis, Axis::Vertical);
        assert!(groups[0].cells.contains(&(8, 2)));
        assert!(groups[1].cells.contains(&(8, 2)));
    }

    #[test]
    fn test_wildcard_joins_runs() {
        let b = board(
            ".......\n.......\n.......\n.......\n.......\n.......\n.......\n.......\nr*r.***",
        );
        let groups = find_matches(&b);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].symbol, Symbol::Red);
        assert_eq!(groups[0].len(), 3);
    }

    #[test]
    fn test_obstacles_and_matching_cells_break_runs() {
        let b = board(
            ".......\n.......\n.......\n.......\n.......\n.......\n.......\n.......\nrr#rrRr",
        );
        assert!(find_matches(&b).is_empty());
    }

    #[test]
    fn test_bomb_pairs_clear() {
        let b = board(
            ".......\n.......\n.......\n.......\n.......\n.......\n...1...\n...1...\n33.r2r.",
        );
        let groups = find_matches(&b);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].symbol, Symbol::RedBomb);
        assert_eq!(groups[0].cells.as_slice(), &[(8, 0), (8, 1)]);
        assert_eq!(groups[1].symbol, Symbol::YellowBomb);
        assert_eq!(groups[1].axis, Axis::Vertical);
        assert_eq!(groups[1].len(), 2);
    }

    #[test]
    fn test_bombs_only_match_their_own_kind() {
        // Different bombs, a bomb between two colors, and a bomb next to a
        // wildcard never clear.
        let b = board(
            ".......\n.......\n.......\n.......\n.......\n.......\n.......\n4*.....\n12rr3r*",
        );
        assert!(find_matches(&b).is_empty());
    }

    #[test]
    fn test_bomb_pair_scores_like_a_run() {
        let b = board(
            ".......\n.......\n.......\n.......\n.......\n.......\n.......\n5......\n5g.....",
        );
        let policy = ScorePolicy::DEFAULT;
        let (after, report) = resolve_chains(&b, &policy);
        assert_eq!(report.depth, 1);
        assert_eq!(report.cleared, 2);
        assert_eq!(report.points, policy.chain_points(1, 2));
        assert_eq!(after.piece_count(), 1);
    }

    #[test]
    fn test_settle_drops_pieces() {
        let b = board(
            "r......\n.......\ng......\n.......\n.......\n.......\n.......\n.......\n.......",
        );
        let settled = settle(&b);
        assert_eq!(settled.get(8, 0), Some(Symbol::Green));
        assert_eq!(settled.get(7, 0), Some(Symbol::Red));
        assert_eq!(settled.piece_count(), 2);
    }

    #[test]
    fn test_settle_rests_on_matching_anchor() {
        let b = board(
            ".b.....\n.......\n.......\n.......\n.R.....\n.......\n.......\n.......\n.......",
        );
        let settled = settle(&b);
        assert_eq!(settled.get(4, 1), Some(Symbol::Red));
        assert!(settled.is_matching(4, 1));
        assert_eq!(settled.get(3, 1), Some(Symbol::Blue));
        assert_eq!(settled.get(8, 1), Some(Symbol::Empty));
    }

    #[test]
    fn test_settle_idempotent() {
        let b = board(
            "y.....b\n.......\n.g...#.\n.......\n.r.*...\n.......\np......\n.......\n..b....",
        );
        let once = settle(&b);
        assert_eq!(settle(&once), once);
    }

    #[test]
    fn test_apply_clear_does_not_settle() {
        let b = board(
            ".......\n.......\n.......\n.......\n.......\n.......\n.b.....\n.r.....\nrrr....",
        );
        let groups = find_matches(&b);
        let cleared = apply_clear(&b, &groups);
        assert_eq!(cleared.get(8, 1), Some(Symbol::Empty));
        assert_eq!(cleared.get(7, 1), Some(Symbol::Red));
        assert_eq!(cleared.get(6, 1), Some(Symbol::Blue));
    }

    #[test]
    fn test_cascade_scores_two_steps() {
        // Clearing the green row drops the top red into a vertical run of 3.
        let b = board(
            ".......\n.......\n.......\n.......\n.......\nr......\nggg....\nrby....\nryb....",
        );
        let policy = ScorePolicy::DEFAULT;
        let (after, report) = resolve_chains(&b, &policy);
        assert_eq!(report.depth, 2);
        assert_eq!(report.cleared, 6);
        assert_eq!(
            report.points,
            policy.chain_points(1, 3) + policy.chain_points(2, 3)
        );
        assert_eq!(after.points(), report.points);
        assert_eq!(after.get(8, 0), Some(Symbol::Empty));
        assert_eq!(after.get(8, 1), Some(Symbol::Yellow));
        assert_eq!(after.piece_count(), 4);
    }
}
