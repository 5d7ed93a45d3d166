//! Textual board format
//!
//! Nine lines of seven characters, top row first, optionally followed by a
//! cursor line:
//!
//! ```text
//! .......
//! .......
//! .......
//! .......
//! .......
//! .......
//! .......
//! ..r....
//! r.R.ybg
//! __@____
//! ```
//!
//! Cells use [`Symbol::as_char`], with bombs written as the digits `1`-`5`
//! (yellow, green, red, pink, blue). An uppercase color letter (or `+` for a
//! wildcard) marks a cell that is already matching. The cursor line is `_`
//! everywhere except the cursor column, which holds `@` when nothing is held
//! or the held symbol's character. Lines may also be joined with `-`.

use std::fmt;

use thiserror::Error;

use crate::board::Board;
use crate::types::{Symbol, BOARD_COLS, BOARD_ROWS, CENTER_COLUMN};

const ROWS: usize = BOARD_ROWS as usize;
const COLS: usize = BOARD_COLS as usize;

const GROUND: char = '_';
const CURSOR: char = '@';
const MATCHING_WILDCARD: char = '+';
const SEPARATOR: char = '-';

/// Error positions are 1-based
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("expected 9 board lines plus an optional cursor line, got {0} lines")]
    LineCount(usize),
    #[error("line {line}: expected 7 cells, got {len}")]
    LineLength { line: usize, len: usize },
    #[error("line {line}, column {col}: invalid cell {ch:?}")]
    InvalidCell { line: usize, col: usize, ch: char },
    #[error("line {line}, column {col}: invalid cursor mark {ch:?}")]
    InvalidCursor { line: usize, col: usize, ch: char },
    #[error("line {line}: cursor line needs exactly one cursor, found {found}")]
    CursorCount { line: usize, found: usize },
}

fn split_lines(s: &str) -> Vec<&str> {
    let s = s.trim();
    let lines: Vec<&str> = if s.contains('\n') {
        s.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
    } else {
        s.split(SEPARATOR).map(str::trim).collect()
    };
    lines
}

fn parse_cell(ch: char) -> Option<(Symbol, bool)> {
    if ch == MATCHING_WILDCARD {
        return Some((Symbol::Wildcard, true));
    }
    if ch.is_ascii_uppercase() {
        let symbol = Symbol::from_char(ch.to_ascii_lowercase())?;
        return symbol.is_color().then_some((symbol, true));
    }
    match Symbol::from_char(ch)? {
        Symbol::Unknown => None,
        symbol => Some((symbol, false)),
    }
}

fn parse_cursor_line(board: &mut Board, line: &str, line_no: usize) -> Result<(), TextError> {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() != COLS {
        return Err(TextError::LineLength {
            line: line_no,
            len: chars.len(),
        });
    }

    let mut found = 0usize;
    for (col, &ch) in chars.iter().enumerate() {
        if ch == GROUND {
            continue;
        }
        let held = match ch {
            CURSOR => None,
            _ => match Symbol::from_char(ch) {
                Some(symbol) if symbol.is_movable() => Some(symbol),
                _ => {
                    return Err(TextError::InvalidCursor {
                        line: line_no,
                        col: col + 1,
                        ch,
                    })
                }
            },
        };
        found += 1;
        board.set_cursor(col as u8);
        board.set_held(held);
    }

    if found != 1 {
        return Err(TextError::CursorCount {
            line: line_no,
            found,
        });
    }
    Ok(())
}

/// Parse a board from its textual form
pub fn parse_text(s: &str) -> Result<Board, TextError> {
    let lines = split_lines(s);
    if lines.len() != ROWS && lines.len() != ROWS + 1 {
        return Err(TextError::LineCount(lines.len()));
    }

    let mut board = Board::new();
    for (row, line) in lines.iter().take(ROWS).enumerate() {
        let len = line.chars().count();
        if len != COLS {
            return Err(TextError::LineLength { line: row + 1, len });
        }
        for (col, ch) in line.chars().enumerate() {
            let (symbol, matching) = parse_cell(ch).ok_or(TextError::InvalidCell {
                line: row + 1,
                col: col + 1,
                ch,
            })?;
            board.set(row, col, symbol);
            if matching {
                board.set_matching(row, col, true);
            }
        }
    }

    if let Some(line) = lines.get(ROWS) {
        parse_cursor_line(&mut board, line, ROWS + 1)?;
    } else {
        board.set_cursor(CENTER_COLUMN);
    }
    Ok(board)
}

fn render_rows(board: &Board) -> Vec<String> {
    let mut rows = Vec::with_capacity(ROWS + 1);
    for row in 0..ROWS {
        let line: String = (0..COLS)
            .map(|col| {
                let symbol = board.get(row, col).unwrap_or(Symbol::Empty);
                match (symbol, board.is_matching(row, col)) {
                    (Symbol::Wildcard, true) => MATCHING_WILDCARD,
                    (symbol, true) => symbol.as_char().to_ascii_uppercase(),
                    (symbol, false) => symbol.as_char(),
                }
            })
            .collect();
        rows.push(line);
    }

    let cursor: String = (0..COLS)
        .map(|col| {
            if col != board.cursor() as usize {
                GROUND
            } else {
                board.held().map(|s| s.as_char()).unwrap_or(CURSOR)
            }
        })
        .collect();
    rows.push(cursor);
    rows
}

/// Canonical multi-line form, cursor line included
pub fn render_text(board: &Board) -> String {
    render_rows(board).join("\n")
}

/// Single-line form joined with `-`, used in logs and CLI arguments
pub fn render_line(board: &Board) -> String {
    render_rows(board).join("-")
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_text(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = ".......\n.......\n.......\n.......\n.......\n.......\n.......\n..r....\nr.R.ybg\n__@____";

    #[test]
    fn test_parse_sample() {
        let board = parse_text(SAMPLE).unwrap();
        assert_eq!(board.get(8, 0), Some(Symbol::Red));
        assert_eq!(board.get(8, 2), Some(Symbol::Red));
        assert!(board.is_matching(8, 2));
        assert!(!board.is_matching(7, 2));
        assert_eq!(board.get(8, 6), Some(Symbol::Green));
        assert_eq!(board.cursor(), 2);
        assert_eq!(board.held(), None);
    }

    #[test]
    fn test_render_roundtrip() {
        assert_eq!(render_text(&parse_text(SAMPLE).unwrap()), SAMPLE);

        let holding = ".......\n.......\n.......\n.......\n.......\n.......\n.*.....\n.+#....\nyGbPy..\n_____b_";
        assert_eq!(render_text(&parse_text(holding).unwrap()), holding);
    }

    #[test]
    fn test_single_line_form() {
        let board = parse_text(SAMPLE).unwrap();
        let line = render_line(&board);
        assert!(!line.contains('\n'));
        assert_eq!(line.split('-').count(), 10);
        assert_eq!(parse_text(&line).unwrap(), board);
        assert_eq!(board.to_string(), SAMPLE);
    }

    #[test]
    fn test_bombs_use_digits() {
        let text = ".......\n.......\n.......\n.......\n.......\n.......\n.......\n...2...\nr3.y5.1\n____4__";
        let board = parse_text(text).unwrap();
        assert_eq!(board.get(7, 3), Some(Symbol::GreenBomb));
        assert_eq!(board.get(8, 1), Some(Symbol::RedBomb));
        assert_eq!(board.get(8, 6), Some(Symbol::YellowBomb));
        assert_eq!(board.held(), Some(Symbol::PinkBomb));
        assert_eq!(render_text(&board), text);

        // Bombs are never flagged as clearing, so they have no uppercase form.
        let mut flagged = board.clone();
        assert!(!flagged.set_matching(8, 1, true));
        assert_eq!(render_text(&flagged), text);
    }

    #[test]
    fn test_cursor_line_is_optional() {
        let rows = ".......\n.......\n.......\n.......\n.......\n.......\n.......\n.......\n...y...";
        let board = parse_text(rows).unwrap();
        assert_eq!(board.cursor(), CENTER_COLUMN);
        assert_eq!(board.held(), None);
    }

    #[test]
    fn test_errors_report_positions() {
        assert_eq!(parse_text(".......\n......."), Err(TextError::LineCount(2)));

        let bad_len = ".......\n.......\n.......\n......\n.......\n.......\n.......\n.......\n.......";
        assert_eq!(
            parse_text(bad_len),
            Err(TextError::LineLength { line: 4, len: 6 })
        );

        let unknown = ".......\n.......\n.......\n.......\n.......\n.......\n.......\n.......\n..?....";
        assert_eq!(
            parse_text(unknown),
            Err(TextError::InvalidCell {
                line: 9,
                col: 3,
                ch: '?'
            })
        );

        let not_a_color = unknown.replace('?', "X");
        assert!(matches!(
            parse_text(&not_a_color),
            Err(TextError::InvalidCell { ch: 'X', .. })
        ));

        let two_cursors = format!("{}\n@_____@", unknown.replace('?', "."));
        assert_eq!(
            parse_text(&two_cursors),
            Err(TextError::CursorCount { line: 10, found: 2 })
        );

        let held_obstacle = format!("{}\n___#___", unknown.replace('?', "."));
        assert_eq!(
            parse_text(&held_obstacle),
            Err(TextError::InvalidCursor {
                line: 10,
                col: 4,
                ch: '#'
            })
        );
    }
}
