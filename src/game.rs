use crate::board::Board;
use crate::location::{Move, Square};
use crate::piece::{Rank, Side};
use crate::rules::{self, MoveOutcome};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Consecutive turns without a capture after which the match is drawn.
pub const MOVE_RULE: u32 = 40;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Outcome {
    Won(Side),
    Draw, // from the 40-move rule
}

impl Outcome {
    pub fn winner(&self) -> Option<Side> {
        match self {
            Self::Won(side) => Some(*side),
            Self::Draw => None,
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Won(side) => write!(f, "{side} won"),
            Self::Draw => write!(f, "draw by {MOVE_RULE}-move rule"),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Error)]
pub enum Rejection {
    #[error("the match is already over")]
    GameOver,
    #[error("malformed move request")]
    Malformed,
    #[error("no piece on {0}")]
    EmptyOrigin(Square),
    #[error("piece on {0} does not belong to {1}")]
    WrongSide(Square, Side),
    #[error("the jump must continue from {0}")]
    MustContinueJump(Square),
    #[error("a capture is available and must be taken")]
    CaptureRequired,
    #[error("illegal move {0}")]
    IllegalMove(Move),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct MatchState {
    pub current: Side,
    pub must_capture: bool,
    pub multi_jump: Option<Square>,
    pub moves_without_capture: u32,
    pieces: [u32; 2],
}

impl MatchState {
    fn new(board: &Board, current: Side) -> Self {
        let mut state = Self {
            current,
            must_capture: false,
            multi_jump: None,
            moves_without_capture: 0,
            pieces: [board.count_pieces(Side::One), board.count_pieces(Side::Two)],
        };
        state.update_must_capture(board);
        state
    }

    pub fn pieces(&self, side: Side) -> u32 {
        self.pieces[side.index()]
    }

    fn update_must_capture(&mut self, board: &Board) {
        self.must_capture = !rules::find_all_possible_captures(board, self.current, self.multi_jump).is_empty();
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Played {
    pub side: Side,
    pub mv: Move,
    pub outcome: MoveOutcome,
    pub promoted: bool,
    /// The same piece has to jump again before the turn passes.
    pub continues: bool,
}

impl Played {
    pub fn squares(&self) -> impl Iterator<Item = Square> {
        let captured = self.outcome.captured().map(|(square, _)| square);
        [self.mv.from, self.mv.to].into_iter().chain(captured)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Event {
    Played(Played),
    Ended(Outcome),
}

type Listener = Box<dyn FnMut(&Event) + Send>;

pub struct Game {
    board: Board,
    state: MatchState,
    history: Vec<Played>,
    outcome: Option<Outcome>,
    listeners: Vec<Listener>,
}

impl Game {
    pub fn new(board: Board, first: Side) -> Self {
        let state = MatchState::new(&board, first);
        let mut game = Self {
            board,
            state,
            history: Vec::new(),
            outcome: None,
            listeners: Vec::new(),
        };
        game.outcome = game.evaluate();
        game
    }

    /// Standard layout, side two to move.
    pub fn opening() -> Self {
        Self::new(Board::opening(), Side::Two)
    }

    pub fn from_fen(fen: &str, first: Side) -> Option<Self> {
        Some(Self::new(Board::from_fen(fen)?, first))
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Event) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Takes a raw `<fromCol> <fromRow> <toCol> <toRow>` request from the side to move.
    pub fn submit(&mut self, line: &str) -> Result<Played, Rejection> {
        let mv = line.parse::<Move>().map_err(|_| Rejection::Malformed)?;
        self.play(mv)
    }

    pub fn play(&mut self, mv: Move) -> Result<Played, Rejection> {
        if self.outcome.is_some() {
            return Err(Rejection::GameOver);
        }

        let side = self.state.current;
        let piece = self.board.piece_at(mv.from).ok_or(Rejection::EmptyOrigin(mv.from))?;
        if piece.side() != side {
            return Err(Rejection::WrongSide(mv.from, side));
        }

        if let Some(jumping) = self.state.multi_jump {
            if jumping != mv.from {
                return Err(Rejection::MustContinueJump(jumping));
            }
        }

        let outcome = rules::try_move(&self.board, mv);
        if outcome == MoveOutcome::None {
            return Err(Rejection::IllegalMove(mv));
        }
        if self.state.must_capture && !outcome.is_capture() {
            return Err(Rejection::CaptureRequired);
        }

        let promoted = self.apply(mv, outcome);

        let continues = outcome.is_capture() && !rules::find_possible_captures(&self.board, mv.to).is_empty();
        if continues {
            self.state.multi_jump = Some(mv.to);
        } else {
            self.state.multi_jump = None;
            self.state.current = side.other();
        }
        self.state.update_must_capture(&self.board);

        let played = Played {
            side,
            mv,
            outcome,
            promoted,
            continues,
        };
        self.history.push(played);
        self.notify(&Event::Played(played));

        self.outcome = self.evaluate();
        if let Some(outcome) = self.outcome {
            self.notify(&Event::Ended(outcome));
        }

        Ok(played)
    }

    fn apply(&mut self, mv: Move, outcome: MoveOutcome) -> bool {
        let Some(mut piece) = self.board.remove(mv.from) else {
            return false;
        };

        if let Some((square, captured)) = outcome.captured() {
            self.board.remove(square);
            let count = &mut self.state.pieces[captured.side().index()];
            *count = count.saturating_sub(1);
            self.state.moves_without_capture = 0;
        } else {
            self.state.moves_without_capture += 1;
        }

        let promoted = piece.rank() == Rank::Man && mv.to.row() == piece.side().promotion_row() && piece.promote();
        self.board.place(piece, mv.to);
        promoted
    }

    fn evaluate(&self) -> Option<Outcome> {
        for side in [Side::One, Side::Two] {
            if self.state.pieces(side) == 0 {
                return Some(Outcome::Won(side.other()));
            }
        }

        if self.state.moves_without_capture >= MOVE_RULE {
            return Some(Outcome::Draw);
        }

        // a side left without any move loses
        let current = self.state.current;
        if !rules::has_legal_move(&self.board, current, self.state.multi_jump) {
            return Some(Outcome::Won(current.other()));
        }

        None
    }

    fn notify(&mut self, event: &Event) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn to_move(&self) -> Side {
        self.state.current
    }

    pub fn must_capture(&self) -> bool {
        self.state.must_capture
    }

    pub fn multi_jump(&self) -> Option<Square> {
        self.state.multi_jump
    }

    pub fn moves_without_capture(&self) -> u32 {
        self.state.moves_without_capture
    }

    pub fn pieces(&self, side: Side) -> u32 {
        self.state.pieces(side)
    }

    pub fn history(&self) -> &[Played] {
        &self.history
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }
}

impl Display for Game {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board)?;

        if let Some(played) = self.history.last() {
            write!(f, "({}) {} {} - ", self.history.len(), played.mv, played.outcome.kind())?;
        }

        if let Some(outcome) = self.outcome {
            return writeln!(f, "{outcome}");
        }

        write!(f, "{} to play", self.state.current)?;
        if let Some(square) = self.state.multi_jump {
            write!(f, ", jump again from {square}")?;
        } else if self.state.must_capture {
            write!(f, ", capture is mandatory")?;
        }
        writeln!(f, " ({} moves without capture)", self.state.moves_without_capture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Piece;
    use std::sync::{Arc, Mutex};

    fn mv(from: (i8, i8), to: (i8, i8)) -> Move {
        Move::from_xy(from, to).unwrap()
    }

    fn square(column: i8, row: i8) -> Square {
        Square::from_xy(column, row).unwrap()
    }

    fn game(pieces: &[((i8, i8), Piece)], first: Side) -> Game {
        let mut board = Board::new();
        for &((column, row), piece) in pieces {
            board.place(piece, square(column, row));
        }
        Game::new(board, first)
    }

    #[test]
    fn opening_starts_with_side_two() {
        let game = Game::opening();
        assert_eq!(game.to_move(), Side::Two);
        assert!(!game.must_capture());
        assert_eq!(game.pieces(Side::One), 12);
        assert_eq!(game.pieces(Side::Two), 12);
        assert_eq!(game.outcome(), None);
    }

    #[test]
    fn normal_move_switches_turn() {
        let mut game = Game::opening();
        let played = game.play(mv((2, 5), (3, 4))).unwrap();
        assert_eq!(played.outcome, MoveOutcome::Normal);
        assert!(!played.continues);
        assert_eq!(game.to_move(), Side::One);
        assert_eq!(game.moves_without_capture(), 1);
        assert_eq!(game.board().piece_at(square(3, 4)), Some(Piece::man(Side::Two)));
        assert_eq!(game.board().piece_at(square(2, 5)), None);
    }

    #[test]
    fn rejections_leave_the_match_untouched() {
        let mut game = Game::opening();
        let board = game.board().clone();
        let state = *game.state();

        assert_eq!(game.play(mv((1, 2), (2, 3))), Err(Rejection::WrongSide(square(1, 2), Side::Two)));
        assert_eq!(game.play(mv((3, 4), (4, 3))), Err(Rejection::EmptyOrigin(square(3, 4))));
        assert_eq!(game.play(mv((2, 5), (2, 4))), Err(Rejection::IllegalMove(mv((2, 5), (2, 4)))));
        assert_eq!(game.play(mv((2, 5), (3, 6))), Err(Rejection::IllegalMove(mv((2, 5), (3, 6)))));
        assert_eq!(game.submit("2 5 3"), Err(Rejection::Malformed));
        assert_eq!(game.submit("2 5 a 4"), Err(Rejection::Malformed));
        assert_eq!(game.submit("2 5 3 9"), Err(Rejection::Malformed));

        assert_eq!(game.board(), &board);
        assert_eq!(game.state(), &state);
        assert!(game.history().is_empty());
    }

    #[test]
    fn capture_is_mandatory_and_resets_the_counter() {
        let mut game = game(
            &[
                ((1, 2), Piece::man(Side::One)),
                ((4, 5), Piece::man(Side::Two)),
                ((7, 6), Piece::king(Side::Two)),
            ],
            Side::One,
        );

        game.play(mv((1, 2), (2, 3))).unwrap();
        game.play(mv((4, 5), (3, 4))).unwrap();
        assert_eq!(game.moves_without_capture(), 2);
        assert!(game.must_capture());

        // geometrically fine, but the jump over (3, 4) is available
        assert_eq!(game.play(mv((2, 3), (1, 4))), Err(Rejection::CaptureRequired));
        assert_eq!(game.to_move(), Side::One);

        let played = game.play(mv((2, 3), (4, 5))).unwrap();
        assert_eq!(
            played.outcome,
            MoveOutcome::Capture {
                square: square(3, 4),
                piece: Piece::man(Side::Two)
            }
        );
        assert_eq!(game.moves_without_capture(), 0);
        assert_eq!(game.pieces(Side::Two), 1);
        assert_eq!(game.board().piece_at(square(3, 4)), None);
        assert_eq!(game.to_move(), Side::Two);
        assert_eq!(played.squares().collect::<Vec<_>>(), vec![square(2, 3), square(4, 5), square(3, 4)]);
    }

    #[test]
    fn multi_jump_keeps_the_turn_for_the_same_piece() {
        let mut game = game(
            &[
                ((1, 0), Piece::man(Side::One)),
                ((5, 2), Piece::man(Side::One)),
                ((2, 1), Piece::man(Side::Two)),
                ((2, 3), Piece::man(Side::Two)),
                ((6, 3), Piece::man(Side::Two)),
            ],
            Side::One,
        );
        assert!(game.must_capture());

        let first = game.play(mv((1, 0), (3, 2))).unwrap();
        assert!(first.continues);
        assert_eq!(game.to_move(), Side::One);
        assert_eq!(game.multi_jump(), Some(square(3, 2)));
        assert!(game.must_capture());

        // another piece's capture does not count while a jump is in progress
        assert_eq!(game.play(mv((5, 2), (7, 4))), Err(Rejection::MustContinueJump(square(3, 2))));
        assert_eq!(game.play(mv((3, 2), (4, 3))), Err(Rejection::CaptureRequired));
        assert_eq!(game.to_move(), Side::One);

        let second = game.play(mv((3, 2), (1, 4))).unwrap();
        assert!(!second.continues);
        assert_eq!(game.multi_jump(), None);
        assert_eq!(game.to_move(), Side::Two);
        assert_eq!(game.pieces(Side::Two), 1);

        // side two now has its own jump over (5, 2)
        assert!(game.must_capture());
    }

    #[test]
    fn men_promote_once() {
        let mut game = game(
            &[((1, 6), Piece::man(Side::One)), ((6, 5), Piece::man(Side::Two))],
            Side::One,
        );

        let played = game.play(mv((1, 6), (2, 7))).unwrap();
        assert!(played.promoted);
        assert_eq!(game.board().piece_at(square(2, 7)), Some(Piece::king(Side::One)));

        game.play(mv((6, 5), (5, 4))).unwrap();

        let played = game.play(mv((2, 7), (3, 6))).unwrap();
        assert!(!played.promoted);
        assert_eq!(game.board().piece_at(square(3, 6)), Some(Piece::king(Side::One)));
    }

    #[test]
    fn promotion_by_capture() {
        let mut game = game(
            &[
                ((2, 5), Piece::man(Side::One)),
                ((3, 6), Piece::man(Side::Two)),
                ((0, 5), Piece::man(Side::Two)),
            ],
            Side::One,
        );
        let played = game.play(mv((2, 5), (4, 7))).unwrap();
        assert!(played.promoted);
        assert!(played.outcome.is_capture());
        assert!(!played.continues);
        assert_eq!(game.board().piece_at(square(4, 7)), Some(Piece::king(Side::One)));
    }

    #[test]
    fn eliminating_a_side_ends_the_match() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut game = game(
            &[((2, 3), Piece::man(Side::One)), ((3, 4), Piece::man(Side::Two))],
            Side::Two,
        );
        {
            let events = events.clone();
            game.subscribe(move |event| events.lock().unwrap().push(*event));
        }

        let played = game.play(mv((3, 4), (1, 2))).unwrap();
        assert_eq!(game.pieces(Side::One), 0);
        assert_eq!(game.outcome(), Some(Outcome::Won(Side::Two)));
        assert_eq!(game.play(mv((1, 2), (0, 1))), Err(Rejection::GameOver));

        let events = events.lock().unwrap();
        assert_eq!(*events, vec![Event::Played(played), Event::Ended(Outcome::Won(Side::Two))]);
    }

    #[test]
    fn forty_quiet_turns_draw() {
        let mut game = game(
            &[((1, 0), Piece::king(Side::One)), ((6, 7), Piece::king(Side::Two))],
            Side::One,
        );

        let shuffle = [
            mv((1, 0), (2, 1)),
            mv((6, 7), (5, 6)),
            mv((2, 1), (1, 0)),
            mv((5, 6), (6, 7)),
        ];

        for (turn, &mv) in shuffle.iter().cycle().take(MOVE_RULE as usize).enumerate() {
            assert_eq!(game.outcome(), None, "ended early at turn {turn}");
            game.play(mv).unwrap();
        }

        assert_eq!(game.moves_without_capture(), MOVE_RULE);
        assert_eq!(game.outcome(), Some(Outcome::Draw));
        assert_eq!(game.pieces(Side::One), 1);
        assert_eq!(game.pieces(Side::Two), 1);
    }

    #[test]
    fn blocked_side_loses() {
        let mut game = game(
            &[
                ((0, 7), Piece::man(Side::Two)),
                ((1, 6), Piece::man(Side::One)),
                ((2, 5), Piece::man(Side::One)),
                ((3, 2), Piece::man(Side::One)),
            ],
            Side::One,
        );
        assert_eq!(game.outcome(), None);

        game.play(mv((3, 2), (4, 3))).unwrap();
        assert_eq!(game.outcome(), Some(Outcome::Won(Side::One)));
    }

    #[test]
    fn a_backward_jump_keeps_the_side_alive() {
        let mut game = game(
            &[
                ((2, 5), Piece::man(Side::One)),
                ((1, 6), Piece::man(Side::Two)),
                ((3, 6), Piece::man(Side::Two)),
                ((0, 7), Piece::man(Side::Two)),
                ((4, 7), Piece::man(Side::Two)),
                ((1, 4), Piece::man(Side::Two)),
            ],
            Side::One,
        );
        assert_eq!(game.outcome(), None);
        assert!(!game.must_capture());

        let played = game.play(mv((2, 5), (0, 3))).unwrap();
        assert_eq!(
            played.outcome,
            MoveOutcome::Capture {
                square: square(1, 4),
                piece: Piece::man(Side::Two)
            }
        );
        assert_eq!(game.pieces(Side::Two), 4);
        assert_eq!(game.to_move(), Side::Two);
        assert_eq!(game.outcome(), None);
    }

    #[test]
    fn promotion_mid_jump_continues_as_a_king() {
        let mut game = game(
            &[
                ((2, 5), Piece::man(Side::One)),
                ((3, 6), Piece::man(Side::Two)),
                ((5, 6), Piece::man(Side::Two)),
            ],
            Side::One,
        );

        let first = game.play(mv((2, 5), (4, 7))).unwrap();
        assert!(first.promoted);
        assert!(first.continues);
        assert_eq!(game.multi_jump(), Some(square(4, 7)));
        assert_eq!(game.to_move(), Side::One);

        // the new king jumps back down over (5, 6)
        let second = game.play(mv((4, 7), (6, 5))).unwrap();
        assert!(!second.promoted);
        assert!(!second.continues);
        assert_eq!(game.board().piece_at(square(6, 5)), Some(Piece::king(Side::One)));
        assert_eq!(game.outcome(), Some(Outcome::Won(Side::One)));
    }
}
