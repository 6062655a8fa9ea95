use std::{fmt, ops::Index};

use serde::{Deserialize, Serialize};

use crate::{error::BoardError, square::Square};

/// Which side is drawn at the bottom of the diagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    White,
    Black,
}

impl Orientation {
    pub const ALL: [Orientation; 2] = [Orientation::White, Orientation::Black];

    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::White => "white",
            Orientation::Black => "black",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel rectangle of the whole board inside the composite image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardBox {
    x_min: u32,
    y_min: u32,
    x_max: u32,
    y_max: u32,
}

impl BoardBox {
    pub fn new(x_min: u32, y_min: u32, x_max: u32, y_max: u32) -> Result<Self, BoardError> {
        let invalid = |reason| BoardError::InvalidBox {
            x_min,
            y_min,
            x_max,
            y_max,
            reason,
        };
        if x_max <= x_min || y_max <= y_min {
            return Err(invalid("empty box"));
        }
        if x_max - x_min != y_max - y_min {
            return Err(invalid("board box must be square"));
        }
        Ok(Self {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// Box of side `size` with its top-left corner at `(x, y)`.
    pub fn at(x: u32, y: u32, size: u32) -> Result<Self, BoardError> {
        Self::new(x, y, x + size, y + size)
    }

    pub fn x_min(&self) -> u32 {
        self.x_min
    }

    pub fn y_min(&self) -> u32 {
        self.y_min
    }

    pub fn x_max(&self) -> u32 {
        self.x_max
    }

    pub fn y_max(&self) -> u32 {
        self.y_max
    }

    pub fn side(&self) -> u32 {
        self.x_max - self.x_min
    }

    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x_max <= width && self.y_max <= height
    }
}

impl fmt::Display for BoardBox {
    /// `x_min,y_min,x_max,y_max`, the on-disk label format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x_min, self.y_min, self.x_max, self.y_max)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct SquareBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl SquareBox {
    pub fn to_array(self) -> [f64; 4] {
        [self.x_min, self.y_min, self.x_max, self.y_max]
    }

    pub fn area(&self) -> f64 {
        (self.x_max - self.x_min) * (self.y_max - self.y_min)
    }

    /// Area shared with `other`, zero when they only touch at an edge.
    pub fn overlap(&self, other: &SquareBox) -> f64 {
        let w = self.x_max.min(other.x_max) - self.x_min.max(other.x_min);
        let h = self.y_max.min(other.y_max) - self.y_min.max(other.y_min);
        if w <= 0.0 || h <= 0.0 { 0.0 } else { w * h }
    }
}

/// Boxes of all 64 squares, indexed by [`Square`].
#[derive(Clone, Debug, PartialEq)]
pub struct SquareBoxMap([SquareBox; Square::COUNT]);

impl SquareBoxMap {
    pub fn get(&self, sq: Square) -> &SquareBox {
        &self.0[sq.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Square, &SquareBox)> {
        Square::all().zip(self.0.iter())
    }
}

impl Index<Square> for SquareBoxMap {
    type Output = SquareBox;

    fn index(&self, sq: Square) -> &SquareBox {
        self.get(sq)
    }
}

/// Splits the board box into the 8x8 grid the renderer draws.
///
/// With `White` orientation a8 is top-left. With `Black` the renderer flips
/// the diagram on both axes, so h1 is top-left.
pub fn square_boxes(board: BoardBox, orientation: Orientation) -> SquareBoxMap {
    let side = f64::from(board.side()) / 8.0;
    let x0 = f64::from(board.x_min);
    let y0 = f64::from(board.y_min);

    let mut boxes = [SquareBox::default(); Square::COUNT];
    for sq in Square::all() {
        let file = f64::from(sq.file().index());
        let rank = f64::from(sq.rank().index());
        let (row, col) = match orientation {
            Orientation::White => (7.0 - rank, file),
            Orientation::Black => (rank, 7.0 - file),
        };

        boxes[sq.index()] = SquareBox {
            x_min: x0 + col * side,
            y_min: y0 + row * side,
            x_max: x0 + (col + 1.0) * side,
            y_max: y0 + (row + 1.0) * side,
        };
    }
    SquareBoxMap(boxes)
}
