use crate::board::Board;
use crate::location::{Move, Square};
use crate::piece::{Piece, Rank, Side, DIAGONALS};
use std::fmt::{Display, Formatter};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MoveKind {
    None,
    Normal,
    Capture,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum MoveOutcome {
    None,
    Normal,
    Capture { square: Square, piece: Piece },
}

impl MoveKind {
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Normal => "NORMAL",
            Self::Capture => "KILL",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        match name {
            "NONE" => Some(Self::None),
            "NORMAL" => Some(Self::Normal),
            "KILL" => Some(Self::Capture),
            _ => None,
        }
    }
}

impl Display for MoveKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

impl MoveOutcome {
    pub fn kind(&self) -> MoveKind {
        match self {
            Self::None => MoveKind::None,
            Self::Normal => MoveKind::Normal,
            Self::Capture { .. } => MoveKind::Capture,
        }
    }

    pub fn captured(&self) -> Option<(Square, Piece)> {
        match *self {
            Self::Capture { square, piece } => Some((square, piece)),
            _ => None,
        }
    }

    pub fn is_capture(&self) -> bool {
        self.kind() == MoveKind::Capture
    }
}

/// Geometry check for a single step or jump of whatever stands on `mv.from`.
/// Does not look at whose turn it is or whether a capture is mandatory.
pub fn try_move(board: &Board, mv: Move) -> MoveOutcome {
    let Some(piece) = board.piece_at(mv.from) else {
        return MoveOutcome::None;
    };

    if board.piece_at(mv.to).is_some() || !mv.to.is_playable() {
        return MoveOutcome::None;
    }

    let (dx, dy) = (mv.column_delta(), mv.row_delta());

    let step = match piece.rank() {
        Rank::Man => dx.abs() == 1 && dy == piece.side().forward(),
        Rank::King => dx.abs() == 1 && dy.abs() == 1,
    };
    if step {
        return MoveOutcome::Normal;
    }

    // men and kings jump the same way, only their enumeration differs
    match mv.midpoint().and_then(|square| Some((square, board.piece_at(square)?))) {
        Some((square, captured)) if piece.is_opponent(&captured) => MoveOutcome::Capture {
            square,
            piece: captured,
        },
        _ => MoveOutcome::None,
    }
}

pub fn find_possible_captures(board: &Board, from: Square) -> Vec<(Move, MoveOutcome)> {
    let Some(piece) = board.piece_at(from) else {
        return Vec::new();
    };

    piece
        .directions()
        .iter()
        .filter_map(|&(dx, dy)| {
            let mv = Move::new(from, from.shift_xy(dx * 2, dy * 2)?);
            let outcome = try_move(board, mv);
            outcome.is_capture().then_some((mv, outcome))
        })
        .collect()
}

/// Captures available to `side`; with `restrict_to` set only that square's piece is considered,
/// so a multi-jump cannot be satisfied by some other piece.
pub fn find_all_possible_captures(board: &Board, side: Side, restrict_to: Option<Square>) -> Vec<(Move, MoveOutcome)> {
    if let Some(from) = restrict_to {
        return find_possible_captures(board, from);
    }

    board
        .iter_pieces(side)
        .flat_map(|(from, _)| find_possible_captures(board, from))
        .collect()
}

pub fn normal_moves(board: &Board, from: Square) -> Vec<Move> {
    let Some(piece) = board.piece_at(from) else {
        return Vec::new();
    };

    piece
        .directions()
        .iter()
        .filter_map(|&(dx, dy)| from.shift_xy(dx, dy))
        .map(|to| Move::new(from, to))
        .filter(|&mv| try_move(board, mv) == MoveOutcome::Normal)
        .collect()
}

/// Every jump `try_move` accepts from `from`, including a man jumping backwards.
/// Wider than [`find_possible_captures`], which drives the mandatory capture.
pub fn find_any_jumps(board: &Board, from: Square) -> Vec<(Move, MoveOutcome)> {
    DIAGONALS
        .iter()
        .filter_map(|&(dx, dy)| {
            let mv = Move::new(from, from.shift_xy(dx * 2, dy * 2)?);
            let outcome = try_move(board, mv);
            outcome.is_capture().then_some((mv, outcome))
        })
        .collect()
}

pub fn has_legal_move(board: &Board, side: Side, restrict_to: Option<Square>) -> bool {
    let movable = |from: Square| !find_any_jumps(board, from).is_empty() || !normal_moves(board, from).is_empty();
    match restrict_to {
        Some(from) => movable(from),
        None => board.iter_pieces(side).any(|(from, _)| movable(from)),
    }
}
