//! Structural checks on FEN strings.
//!
//! Only the shape is checked: eight ranks of eight squares each and, when
//! present, a side-to-move field. Legality of the position is left to the
//! renderer.

use crate::error::BoardError;

const PIECES: &str = "pnbrqkPNBRQK";

/// Validates `fen` and returns its board part (the first whitespace-separated field).
pub fn board_part(fen: &str) -> Result<&str, BoardError> {
    let invalid = |reason: String| BoardError::InvalidFen {
        fen: fen.to_string(),
        reason,
    };

    let mut fields = fen.split_whitespace();
    let board = fields.next().ok_or_else(|| invalid("empty".into()))?;

    let ranks: Vec<&str> = board.split('/').collect();
    if ranks.len() != 8 {
        return Err(invalid(format!("expected 8 ranks, found {}", ranks.len())));
    }

    for (i, rank) in ranks.iter().enumerate() {
        let mut width = 0u32;
        let mut prev_digit = false;
        for c in rank.chars() {
            if let Some(d) = c.to_digit(10) {
                if !(1..=8).contains(&d) || prev_digit {
                    return Err(invalid(format!("bad empty-square run in rank {}", 8 - i)));
                }
                width += d;
                prev_digit = true;
            } else if PIECES.contains(c) {
                width += 1;
                prev_digit = false;
            } else {
                return Err(invalid(format!("unexpected character {c:?}")));
            }
        }
        if width != 8 {
            return Err(invalid(format!("rank {} spans {width} squares", 8 - i)));
        }
    }

    match fields.next() {
        Some(turn) if turn != "w" && turn != "b" => {
            return Err(invalid(format!("side to move must be w or b, got {turn:?}")));
        }
        _ => {}
    }

    Ok(board)
}
