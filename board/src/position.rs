use serde::{Deserialize, Serialize};

use crate::{
    error::BoardError,
    fen,
    square::{Square, UciMove},
};

/// One entry of the FEN pool file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRecord {
    pub fen: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_move: Option<UciMove>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<Square>,
}

impl PositionRecord {
    pub fn new(fen: impl Into<String>) -> Result<Self, BoardError> {
        let rec = Self {
            fen: fen.into(),
            last_move: None,
            check: None,
        };
        rec.validate()?;
        Ok(rec)
    }

    pub fn with_last_move(mut self, mv: UciMove) -> Self {
        self.last_move = Some(mv);
        self
    }

    pub fn with_check(mut self, sq: Square) -> Self {
        self.check = Some(sq);
        self
    }

    /// Move and square fields are checked during deserialization; this checks the FEN.
    pub fn validate(&self) -> Result<(), BoardError> {
        fen::board_part(&self.fen).map(|_| ())
    }
}
