use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("invalid square name: {0:?}")]
    InvalidSquare(String),
    #[error("invalid uci move: {0:?}")]
    InvalidMove(String),
    #[error("invalid fen {fen:?}: {reason}")]
    InvalidFen { fen: String, reason: String },
    #[error("invalid bounding box ({x_min},{y_min},{x_max},{y_max}): {reason}")]
    InvalidBox {
        x_min: u32,
        y_min: u32,
        x_max: u32,
        y_max: u32,
        reason: &'static str,
    },
}
