use std::fmt;

use board::{Orientation, PositionRecord, Square, UciMove};
use rand::{Rng, prelude::IndexedRandom};
use serde::Serialize;

use crate::error::{SynthError, SynthResult};

/// Piece sets the renderer ships.
pub const PIECE_SETS: [&str; 35] = [
    "alpha",
    "anarcandy",
    "caliente",
    "california",
    "cardinal",
    "cburnett",
    "celtic",
    "chess7",
    "chessnut",
    "companion",
    "cooke",
    "dubrovny",
    "fantasy",
    "fresca",
    "gioco",
    "governor",
    "horsey",
    "icpieces",
    "kiwen-suwi",
    "kosal",
    "leipzig",
    "letter",
    "libra",
    "maestro",
    "merida",
    "monarchy",
    "mpchess",
    "pirouetti",
    "pixel",
    "reillycraig",
    "riohacha",
    "shapes",
    "spatial",
    "staunty",
    "tatiana",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorTheme {
    Wikipedia,
    LichessBrown,
    LichessBlue,
    /// The renderer generates a palette on the fly.
    Random,
}

impl ColorTheme {
    pub const ALL: [ColorTheme; 4] = [
        ColorTheme::Wikipedia,
        ColorTheme::LichessBrown,
        ColorTheme::LichessBlue,
        ColorTheme::Random,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColorTheme::Wikipedia => "wikipedia",
            ColorTheme::LichessBrown => "lichess-brown",
            ColorTheme::LichessBlue => "lichess-blue",
            ColorTheme::Random => "random",
        }
    }
}

impl fmt::Display for ColorTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side length of the rendered diagram in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BoardSize(u32);

impl BoardSize {
    pub const MIN: u32 = 16;
    pub const MAX: u32 = 1024;

    pub fn new(px: u32) -> SynthResult<Self> {
        if !(Self::MIN..=Self::MAX).contains(&px) {
            return Err(SynthError::Config(format!(
                "board size {px} outside [{}, {}]",
                Self::MIN,
                Self::MAX
            )));
        }
        Ok(Self(px))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for BoardSize {
    fn default() -> Self {
        Self(1000)
    }
}

/// Everything the renderer needs to draw one diagram.
///
/// Serialized as-is into the sample metadata, so field names follow the
/// renderer's query parameters.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub fen: String,
    pub orientation: Orientation,
    pub size: BoardSize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_move: Option<UciMove>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<Square>,
    pub colors: ColorTheme,
    pub piece_set: &'static str,
}

impl RenderRequest {
    /// Query pairs for the renderer; unset options are left out and the
    /// coordinate margin is always switched off.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut q = vec![
            ("fen", self.fen.clone()),
            ("orientation", self.orientation.to_string()),
            ("size", self.size.get().to_string()),
        ];
        if let Some(mv) = self.last_move {
            q.push(("lastMove", mv.to_string()));
        }
        if let Some(sq) = self.check {
            q.push(("check", sq.to_string()));
        }
        // square boxes assume the 8x8 grid fills the whole image, no margin
        q.push(("coordinates", "false".to_string()));
        q.push(("colors", self.colors.to_string()));
        q.push(("pieceSet", self.piece_set.to_string()));
        q
    }
}

/// Fixed per-run settings of the request builder.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuilderConfig {
    pub size: BoardSize,
}

pub struct RenderRequestBuilder {
    cfg: BuilderConfig,
}

impl RenderRequestBuilder {
    pub fn new(cfg: BuilderConfig) -> Self {
        Self { cfg }
    }

    /// Picks orientation, theme and piece set; the position's move and check
    /// square are carried over unchanged.
    pub fn build<R: Rng>(&self, position: &PositionRecord, rng: &mut R) -> RenderRequest {
        let orientation = Orientation::ALL[rng.random_range(0..Orientation::ALL.len())];
        let colors = ColorTheme::ALL[rng.random_range(0..ColorTheme::ALL.len())];
        let piece_set = PIECE_SETS.choose(rng).copied().unwrap_or(PIECE_SETS[0]);

        RenderRequest {
            fen: position.fen.clone(),
            orientation,
            size: self.cfg.size,
            last_move: position.last_move,
            check: position.check,
            colors,
            piece_set,
        }
    }
}
