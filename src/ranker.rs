use crate::board::Board;
use crate::location::{Move, Square};
use crate::piece::{Side, DIAGONALS};
use crate::rules::{self, MoveOutcome};
use rand::Rng;
use std::fmt::{Display, Formatter};

const CAPTURE_VALUE: i32 = 10;
const KING_CAPTURE_BONUS: i32 = 2;
const PROMOTION_BONUS: i32 = 1;
const PROMOTION_VALUE: i32 = 8;
const KING_VALUE: i32 = 3;
const AGGRESSION_BONUS: i32 = 1;
const SAFETY_BONUS: i32 = 2;

/// One-ply move picker for a fixed side.
pub struct Ranker<R> {
    side: Side,
    random: R,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Entry {
    pub mv: Move,
    pub outcome: MoveOutcome,
    pub value: i32,
}

impl Display for Entry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} - {}", self.mv, self.outcome.kind(), self.value)
    }
}

impl<R> Ranker<R> {
    pub fn new(side: Side, random: R) -> Self {
        Self { side, random }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Every candidate with its value; captures only when at least one exists, backward
    /// jumps only when nothing else does.
    pub fn rank(&self, board: &Board, restrict_to: Option<Square>) -> Vec<Entry> {
        let froms: Vec<Square> = match restrict_to {
            Some(from) => vec![from],
            None => board.iter_pieces(self.side).map(|(square, _)| square).collect(),
        };
        let froms: Vec<Square> = froms
            .into_iter()
            .filter(|&from| board.piece_at(from).is_some_and(|piece| piece.side() == self.side))
            .collect();

        let captures: Vec<(Move, MoveOutcome)> = froms
            .iter()
            .flat_map(|&from| rules::find_possible_captures(board, from))
            .collect();

        let mut candidates = if !captures.is_empty() {
            captures
        } else if restrict_to.is_some() {
            Vec::new()
        } else {
            froms
                .iter()
                .flat_map(|&from| rules::normal_moves(board, from))
                .map(|mv| (mv, MoveOutcome::Normal))
                .collect()
        };

        // a man jumping backwards is a last resort
        if candidates.is_empty() {
            candidates = froms
                .iter()
                .flat_map(|&from| rules::find_any_jumps(board, from))
                .collect();
        }

        candidates
            .into_iter()
            .map(|(mv, outcome)| Entry {
                mv,
                outcome,
                value: self.evaluate(board, mv, outcome),
            })
            .collect()
    }

    fn evaluate(&self, board: &Board, mv: Move, outcome: MoveOutcome) -> i32 {
        let Some(piece) = board.piece_at(mv.from) else {
            return 0;
        };

        let promotes = !piece.is_king() && mv.to.row() == self.side.promotion_row();
        let after = Self::simulate(board, mv, outcome);

        let mut value = match outcome.captured() {
            Some((_, captured)) => {
                let mut value = CAPTURE_VALUE;
                if captured.is_king() {
                    value += KING_CAPTURE_BONUS;
                }
                if promotes {
                    value += PROMOTION_BONUS;
                }
                value
            }
            None if promotes => PROMOTION_VALUE,
            None if piece.is_king() => {
                if self.next_to_opponent(&after, mv.to) {
                    KING_VALUE + AGGRESSION_BONUS
                } else {
                    KING_VALUE
                }
            }
            // rows already advanced, larger closer to promotion
            None => Board::HEIGHT as i32 - 1 - (self.side.promotion_row() - mv.to.row()).abs() as i32,
        };

        if !self.vulnerable(&after, mv.to) {
            value += SAFETY_BONUS;
        }
        value
    }

    fn simulate(board: &Board, mv: Move, outcome: MoveOutcome) -> Board {
        let mut board = board.clone();
        if let Some((square, _)) = outcome.captured() {
            board.remove(square);
        }
        if let Some(mut piece) = board.remove(mv.from) {
            if mv.to.row() == piece.side().promotion_row() {
                piece.promote();
            }
            board.place(piece, mv.to);
        }
        board
    }

    fn next_to_opponent(&self, board: &Board, square: Square) -> bool {
        DIAGONALS
            .iter()
            .filter_map(|&(dx, dy)| square.shift_xy(dx, dy))
            .filter_map(|near| board.piece_at(near))
            .any(|piece| piece.side() != self.side)
    }

    /// Whether any opposing piece could jump `square` on the very next move.
    fn vulnerable(&self, board: &Board, square: Square) -> bool {
        board.iter_pieces(self.side.other()).any(|(from, _)| {
            rules::find_possible_captures(board, from)
                .iter()
                .any(|(_, outcome)| outcome.captured().map(|(captured, _)| captured) == Some(square))
        })
    }
}

impl<R: Rng> Ranker<R> {
    /// Uniformly random among the highest valued candidates.
    pub fn best(&mut self, board: &Board, restrict_to: Option<Square>) -> Option<Move> {
        let entries = self.rank(board, restrict_to);
        let max = entries.iter().map(|entry| entry.value).max()?;
        let best: Vec<&Entry> = entries.iter().filter(|entry| entry.value == max).collect();
        Some(best[self.random.random_range(0..best.len())].mv)
    }

    /// Like [`Ranker::best`], but never comes back empty handed: with nothing to play it makes up
    /// a random move for the arbiter to reject.
    pub fn generate(&mut self, board: &Board, restrict_to: Option<Square>) -> Move {
        if let Some(mv) = self.best(board, restrict_to) {
            return mv;
        }

        let squares = (Board::WIDTH * Board::HEIGHT) as usize;
        let mut square = || Square::from_index(self.random.random_range(0..squares)).unwrap_or_default();
        let from = square();
        let to = square();
        Move::new(from, to)
    }
}
