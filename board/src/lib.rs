pub mod error;
pub mod fen;
pub mod geometry;
pub mod position;
pub mod square;

pub use error::BoardError;
pub use geometry::{BoardBox, Orientation, SquareBox, SquareBoxMap, square_boxes};
pub use position::PositionRecord;
pub use square::{File, Rank, Square, UciMove};
