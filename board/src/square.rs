use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::BoardError;

/// Board column, `a` = 0 through `h` = 7.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct File(u8);

/// Board row, white's back rank = 0 through black's back rank = 7.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rank(u8);

impl File {
    pub fn index(self) -> u8 {
        self.0
    }

    pub fn to_char(self) -> char {
        (b'a' + self.0) as char
    }

    fn from_char(c: char) -> Option<Self> {
        ('a'..='h')
            .contains(&c)
            .then(|| Self(c as u8 - b'a'))
    }
}

impl Rank {
    pub fn index(self) -> u8 {
        self.0
    }

    pub fn to_char(self) -> char {
        (b'1' + self.0) as char
    }

    fn from_char(c: char) -> Option<Self> {
        ('1'..='8')
            .contains(&c)
            .then(|| Self(c as u8 - b'1'))
    }
}

/// One of the 64 squares, numbered `a1 = 0, b1 = 1, ..., h8 = 63`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square(u8);

impl Square {
    pub const COUNT: usize = 64;

    pub fn new(file: File, rank: Rank) -> Self {
        Self(rank.0 * 8 + file.0)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn file(self) -> File {
        File(self.0 % 8)
    }

    pub fn rank(self) -> Rank {
        Rank(self.0 / 8)
    }

    /// All squares in index order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file().to_char(), self.rank().to_char())
    }
}

impl FromStr for Square {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(f), Some(r), None) => match (File::from_char(f), Rank::from_char(r)) {
                (Some(file), Some(rank)) => Ok(Square::new(file, rank)),
                _ => Err(BoardError::InvalidSquare(s.to_string())),
            },
            _ => Err(BoardError::InvalidSquare(s.to_string())),
        }
    }
}

impl TryFrom<String> for Square {
    type Error = BoardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Square> for String {
    fn from(sq: Square) -> Self {
        sq.to_string()
    }
}

/// A move in UCI long algebraic notation, e.g. `e2e4` or `e7e8q`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UciMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<char>,
}

impl fmt::Display for UciMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(p) = self.promotion {
            write!(f, "{p}")?;
        }
        Ok(())
    }
}

impl FromStr for UciMove {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BoardError::InvalidMove(s.to_string());
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(invalid());
        }
        let from: Square = s[0..2].parse().map_err(|_| invalid())?;
        let to: Square = s[2..4].parse().map_err(|_| invalid())?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(p @ ('q' | 'r' | 'b' | 'n')) => Some(p),
            Some(_) => return Err(invalid()),
        };
        if from == to {
            return Err(invalid());
        }
        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}

impl TryFrom<String> for UciMove {
    type Error = BoardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UciMove> for String {
    fn from(mv: UciMove) -> Self {
        mv.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_names_follow_index_order() {
        let names: Vec<String> = Square::all().map(|s| s.to_string()).collect();
        assert_eq!(names.len(), 64);
        assert_eq!(names[0], "a1");
        assert_eq!(names[1], "b1");
        assert_eq!(names[8], "a2");
        assert_eq!(names[63], "h8");
    }

    #[test]
    fn square_parse_roundtrips_and_rejects_garbage() {
        for sq in Square::all() {
            assert_eq!(sq.to_string().parse::<Square>().unwrap(), sq);
        }
        for bad in ["", "a", "a9", "i1", "a10", "A1"] {
            assert!(bad.parse::<Square>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn file_and_rank_of_square() {
        let e4: Square = "e4".parse().unwrap();
        assert_eq!(e4.file().index(), 4);
        assert_eq!(e4.rank().index(), 3);
        assert_eq!(e4.index(), 28);
    }

    #[test]
    fn uci_moves() {
        let mv: UciMove = "e2e4".parse().unwrap();
        assert_eq!(mv.from.to_string(), "e2");
        assert_eq!(mv.to.to_string(), "e4");
        assert_eq!(mv.promotion, None);

        let promo: UciMove = "e7e8q".parse().unwrap();
        assert_eq!(promo.promotion, Some('q'));
        assert_eq!(promo.to_string(), "e7e8q");

        for bad in ["e2", "e2e2", "e7e8k", "e2e9", "e2e4qq", "é2e4"] {
            assert!(bad.parse::<UciMove>().is_err(), "{bad} should not parse");
        }
    }
}
