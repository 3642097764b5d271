use crate::board::Board;
use std::fmt::{Display, Formatter};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Side {
    One,
    Two,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Rank {
    Man,
    King,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Piece {
    side: Side,
    rank: Rank,
}

pub const DIAGONALS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ONE_DIRECTIONS: [(i8, i8); 2] = [(-1, 1), (1, 1)];
const TWO_DIRECTIONS: [(i8, i8); 2] = [(-1, -1), (1, -1)];

impl Side {
    pub fn other(&self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    /// Row delta of a man's step.
    pub fn forward(&self) -> i8 {
        match self {
            Self::One => 1,
            Self::Two => -1,
        }
    }

    pub fn promotion_row(&self) -> i8 {
        match self {
            Self::One => Board::HEIGHT - 1,
            Self::Two => 0,
        }
    }

    /// Rows a side's men fill in the opening.
    pub fn home_rows(&self) -> std::ops::Range<i8> {
        match self {
            Self::One => 0..3,
            Self::Two => Board::HEIGHT - 3..Board::HEIGHT,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        self.number() as usize - 1
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "side {}", self.number())
    }
}

impl Piece {
    pub fn new(side: Side, rank: Rank) -> Self {
        Self { side, rank }
    }

    pub fn man(side: Side) -> Self {
        Self::new(side, Rank::Man)
    }

    pub fn king(side: Side) -> Self {
        Self::new(side, Rank::King)
    }

    pub fn from_fen_char(value: char) -> Option<Self> {
        let rank = match value.to_ascii_lowercase() {
            'm' => Rank::Man,
            'k' => Rank::King,
            _ => return None,
        };

        let side = if value.is_ascii_uppercase() { Side::Two } else { Side::One };
        Some(Self::new(side, rank))
    }

    pub fn fen_char(&self) -> char {
        let result = match self.rank {
            Rank::Man => 'm',
            Rank::King => 'k',
        };
        match self.side {
            Side::One => result,
            Side::Two => result.to_ascii_uppercase(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn is_king(&self) -> bool {
        self.rank == Rank::King
    }

    pub fn is_opponent(&self, other: &Piece) -> bool {
        self.side != other.side
    }

    /// Promotes in place, returns whether the rank changed.
    pub fn promote(&mut self) -> bool {
        let promoted = self.rank == Rank::Man;
        self.rank = Rank::King;
        promoted
    }

    /// Diagonals this piece may step or jump along.
    pub fn directions(&self) -> &'static [(i8, i8)] {
        match (self.rank, self.side) {
            (Rank::King, _) => &DIAGONALS,
            (Rank::Man, Side::One) => &ONE_DIRECTIONS,
            (Rank::Man, Side::Two) => &TWO_DIRECTIONS,
        }
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.fen_char())
    }
}
