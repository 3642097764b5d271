use crate::location::Square;
use crate::piece::{Piece, Side};
use std::fmt::Formatter;
use std::ops::Index;

const SQUARES: usize = 64;

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Board {
    pieces: [Option<Piece>; SQUARES],
}

impl Board {
    pub const WIDTH: i8 = 8;
    pub const HEIGHT: i8 = 8;

    pub fn new() -> Self {
        Self {
            pieces: [None; SQUARES],
        }
    }

    /// Rows from the top (row 7) down separated by `/`, digits for runs of empty squares,
    /// `m`/`k` for side one and `M`/`K` for side two.
    pub fn from_fen(fen: &str) -> Option<Self> {
        let mut board = Self::new();
        let mut rows = fen.trim().split('/');

        for row in (0..Self::HEIGHT).rev() {
            let mut column: i8 = 0;
            for current in rows.next()?.chars() {
                match current {
                    '1'..='8' => column = column.checked_add(current.to_digit(10)? as i8)?,
                    _ => {
                        let piece = Piece::from_fen_char(current)?;
                        let square = Square::from_xy(column, row)?;
                        if !square.is_playable() {
                            return None;
                        }
                        board.place(piece, square);
                        column += 1;
                    }
                }
            }

            if column != Self::WIDTH {
                return None;
            }
        }

        if rows.next().is_some() {
            return None;
        }
        Some(board)
    }

    pub fn opening() -> Self {
        let mut board = Self::new();
        for side in [Side::One, Side::Two] {
            for row in side.home_rows() {
                for column in 0..Self::WIDTH {
                    if let Some(square) = Square::from_xy(column, row).filter(Square::is_playable) {
                        board.place(Piece::man(side), square);
                    }
                }
            }
        }
        board
    }

    pub fn fen(&self) -> String {
        let mut result = String::new();
        for row in (0..Self::HEIGHT).rev() {
            let mut empty = 0;
            for column in 0..Self::WIDTH {
                match Square::from_xy(column, row).and_then(|square| self.piece_at(square)) {
                    Some(piece) => {
                        if empty > 0 {
                            result.push_str(&empty.to_string());
                            empty = 0;
                        }
                        result.push(piece.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                result.push_str(&empty.to_string());
            }
            if row > 0 {
                result.push('/');
            }
        }
        result
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.pieces[square.index()]
    }

    pub fn place(&mut self, piece: Piece, square: Square) {
        self.pieces[square.index()] = Some(piece);
    }

    pub fn remove(&mut self, square: Square) -> Option<Piece> {
        self.pieces[square.index()].take()
    }

    pub fn count_pieces(&self, side: Side) -> u32 {
        self.iter_pieces(side).count() as u32
    }

    pub fn iter_pieces(&self, side: Side) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces.iter().enumerate().filter_map(move |(index, piece)| {
            let piece = (*piece)?;
            if piece.side() != side {
                return None;
            }
            Some((Square::from_index(index)?, piece))
        })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<Square> for Board {
    type Output = Option<Piece>;
    fn index(&self, index: Square) -> &Self::Output {
        &self.pieces[index.index()]
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for row in (0..Self::HEIGHT).rev() {
            write!(f, "{row} ")?;
            for column in 0..Self::WIDTH {
                let Some(square) = Square::from_xy(column, row) else {
                    continue;
                };
                match self.piece_at(square) {
                    Some(piece) => write!(f, " {piece}")?,
                    None if square.is_playable() => write!(f, " .")?,
                    None => write!(f, "  ")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "  ")?;
        for column in 0..Self::WIDTH {
            write!(f, " {column}")?;
        }
        writeln!(f)
    }
}
