use crate::board::Board;
use std::fmt::Formatter;
use std::str::FromStr;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Square {
    column: i8,
    row: i8,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Square {
    pub fn new() -> Self {
        Self { column: 0, row: 0 }
    }

    pub fn from_xy(column: i8, row: i8) -> Option<Self> {
        Self::new().shift_xy(column, row)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        if index >= (Board::WIDTH * Board::HEIGHT) as usize {
            return None;
        }
        let column = index as i8 % Board::WIDTH;
        let row = index as i8 / Board::WIDTH;
        Self::from_xy(column, row)
    }

    pub fn shift_x(&self, x: i8) -> Option<Self> {
        let column = self.column.checked_add(x)?;
        if 0 > column || column >= Board::WIDTH {
            return None;
        }
        Some(Self { column, row: self.row })
    }

    pub fn shift_y(&self, y: i8) -> Option<Self> {
        let row = self.row.checked_add(y)?;
        if 0 > row || row >= Board::HEIGHT {
            return None;
        }
        Some(Self { column: self.column, row })
    }

    pub fn shift_xy(&self, x: i8, y: i8) -> Option<Self> {
        self.shift_x(x)?.shift_y(y)
    }

    pub fn index(&self) -> usize {
        (self.column + self.row * Board::WIDTH) as usize
    }

    pub fn column(&self) -> i8 {
        self.column
    }

    pub fn row(&self) -> i8 {
        self.row
    }

    /// Dark squares, the only ones a piece may ever stand on.
    pub fn is_playable(&self) -> bool {
        (self.column + self.row) % 2 != 0
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        (0..(Board::WIDTH * Board::HEIGHT) as usize).filter_map(Self::from_index)
    }
}

impl Default for Square {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.column, self.row)
    }
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }

    pub fn from_xy(from: (i8, i8), to: (i8, i8)) -> Option<Self> {
        Some(Self {
            from: Square::from_xy(from.0, from.1)?,
            to: Square::from_xy(to.0, to.1)?,
        })
    }

    /// Reads `<fromCol> <fromRow> <toCol> <toRow>` off the front of a token stream.
    /// Anything short, non-numeric or off the board gives `None`; trailing tokens are left alone.
    pub fn from_parts<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Option<Self> {
        let mut next = || -> Option<i8> { parts.next()?.parse().ok() };
        let from = (next()?, next()?);
        let to = (next()?, next()?);
        Self::from_xy(from, to)
    }

    pub fn column_delta(&self) -> i8 {
        self.to.column - self.from.column
    }

    pub fn row_delta(&self) -> i8 {
        self.to.row - self.from.row
    }

    /// Square jumped over by a two-step diagonal move.
    pub fn midpoint(&self) -> Option<Square> {
        if self.column_delta().abs() != 2 || self.row_delta().abs() != 2 {
            return None;
        }
        self.from.shift_xy(self.column_delta() / 2, self.row_delta() / 2)
    }
}

impl FromStr for Move {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_parts(&mut s.split_whitespace()).ok_or(())
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.from, self.to)
    }
}
