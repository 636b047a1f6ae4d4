// =============================================================================
// Game state and move acceptance
//
// A Game owns the board, the side to move, the castling has-moved flags and
// the legal-move set for the side to move. The only way to change it is
// try_move/attempt_move, which either applies a fully validated move or
// leaves everything untouched.
//
// Look-ahead (self-check guard, legal-move filtering) always runs on clones
// of the board and rights; the live game is written once, at commit.
// =============================================================================

use indexmap::IndexSet;
use tracing::{debug, info, trace};

use crate::board::{Board, Generation};
use crate::castling::{CastlingRights, CastlingSide};
use crate::error::{RulesError, RulesResult};
use crate::moves::{square, Move, Square};
use crate::piece::{Cell, Color, Piece, PieceType};
use crate::snapshot::Snapshot;

/// Side effects of applying a move beyond relocating the piece.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
struct Applied {
    captured: Cell,
    castled: Option<CastlingSide>,
    promoted: bool,
}

/// Apply `mv` for `mover`: relocate, move the rook when castling, promote a
/// pawn reaching the last row and record has-moved flags.
///
/// Assumes `mv` came from the generator, so `mv.start` holds a `mover` piece.
fn apply(board: &mut Board, rights: &mut CastlingRights, mv: &Move, mover: Color) -> Applied {
    let mut applied = Applied::default();
    let Some(piece) = board.at(mv.start) else {
        return applied;
    };

    applied.captured = board.relocate(mv);

    match piece.piece_type {
        PieceType::King => {
            if let Some(side) = CastlingSide::of_king_move(mover, mv) {
                let row = mover.home_row();
                let rook = Move::new((row, side.rook_col()), (row, side.rook_to_col()));
                board.relocate(&rook);
                rights.touch(rook.start);
                applied.castled = Some(side);
            }
        }
        PieceType::Pawn if mv.end.0 == mover.promotion_row() => {
            board.set(mv.end, Some(Piece::new(PieceType::Queen, mover)));
            applied.promoted = true;
        }
        _ => {}
    }

    rights.touch(mv.start);
    rights.touch(mv.end);
    applied
}

/// Pseudo-legal moves for `color` that do not leave its own king attacked.
fn legal_moves_for(board: &Board, rights: &CastlingRights, color: Color) -> IndexSet<Move> {
    board
        .generate_moves(color, rights, Generation::Moves)
        .into_iter()
        .filter(|mv| {
            let mut trial = board.clone();
            let mut trial_rights = *rights;
            apply(&mut trial, &mut trial_rights, mv, color);
            !trial.is_in_check(color)
        })
        .collect()
}

#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    turn: Color,
    rights: CastlingRights,
    check: bool,
    checkmate: bool,
    stalemate: bool,
    legal_moves: IndexSet<Move>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// A new game from the standard starting position, White to move.
    pub fn new() -> Self {
        Self::from_parts(Board::new(), Color::White, CastlingRights::unmoved())
    }

    /// Assemble a game and evaluate it exactly as after a committed move.
    pub(crate) fn from_parts(board: Board, turn: Color, rights: CastlingRights) -> Self {
        let mut game = Game {
            board,
            turn,
            rights,
            check: false,
            checkmate: false,
            stalemate: false,
            legal_moves: IndexSet::new(),
        };
        game.evaluate();
        debug!(turn = %game.turn, legal_moves = game.legal_moves.len(), "game ready");
        game
    }

    /// Boolean form of [`Game::try_move`]. Rejection never changes anything.
    pub fn attempt_move(&mut self, start: (i32, i32), end: (i32, i32)) -> bool {
        match self.try_move(start, end) {
            Ok(()) => true,
            Err(err) => {
                debug!(?start, ?end, %err, "move rejected");
                false
            }
        }
    }

    /// Validate and apply a move, reporting why it was refused.
    pub fn try_move(&mut self, start: (i32, i32), end: (i32, i32)) -> RulesResult<()> {
        if self.is_over() {
            return Err(RulesError::GameOver);
        }
        let mv = Move::from_coords(start, end)?;
        if !self.legal_moves.contains(&mv) {
            return Err(RulesError::IllegalMove { mv });
        }

        // Self-check guard, on a copy.
        let mut board = self.board.clone();
        let mut rights = self.rights;
        let applied = apply(&mut board, &mut rights, &mv, self.turn);
        if board.is_in_check(self.turn) {
            return Err(RulesError::LeavesKingInCheck { mv });
        }

        self.commit(mv, board, rights, applied);
        Ok(())
    }

    fn commit(&mut self, mv: Move, board: Board, rights: CastlingRights, applied: Applied) {
        if let Some(side) = applied.castled {
            trace!(color = %self.turn, ?side, "castled");
        }
        if applied.promoted {
            trace!(color = %self.turn, square = ?mv.end, "pawn promoted to queen");
        }
        if let Some(captured) = applied.captured {
            trace!(%captured, square = ?mv.end, "captured");
        }

        self.board = board;
        self.rights = rights;
        self.turn = self.turn.opposite();
        self.evaluate();

        debug!(%mv, turn = %self.turn, legal_moves = self.legal_moves.len(), check = self.check, "move accepted");
    }

    /// Recompute check, the legal-move set and terminal flags for the side to move.
    fn evaluate(&mut self) {
        self.check = self.board.is_in_check(self.turn);
        self.legal_moves = legal_moves_for(&self.board, &self.rights, self.turn);

        let stuck = self.legal_moves.is_empty();
        self.checkmate = stuck && self.check;
        self.stalemate = (stuck && !self.check) || self.board.only_kings_remain();

        if self.checkmate {
            info!(loser = %self.turn, "checkmate");
        } else if self.stalemate {
            info!(turn = %self.turn, "stalemate");
        }
        if self.is_over() {
            self.legal_moves.clear();
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Read-only 8×8 grid.
    pub fn current_board(&self) -> &[[Cell; 8]; 8] {
        self.board.squares()
    }

    pub fn cell(&self, row: i32, col: i32) -> RulesResult<Cell> {
        self.board.cell(row, col)
    }

    pub fn side_to_move(&self) -> Color {
        self.turn
    }

    pub fn in_check(&self) -> bool {
        self.check
    }

    pub fn in_checkmate(&self) -> bool {
        self.checkmate
    }

    pub fn in_stalemate(&self) -> bool {
        self.stalemate
    }

    pub fn is_over(&self) -> bool {
        self.checkmate || self.stalemate
    }

    /// Every legal move for the side to move. Empty once the game is over.
    pub fn legal_moves(&self) -> &IndexSet<Move> {
        &self.legal_moves
    }

    /// Legal destinations of the piece on `(row, col)`.
    pub fn legal_moves_from(&self, row: i32, col: i32) -> RulesResult<Vec<Square>> {
        let from = square(row, col)?;
        Ok(self
            .legal_moves
            .iter()
            .filter(|m| m.start == from)
            .map(|m| m.end)
            .collect())
    }

    pub fn king_location(&self, color: Color) -> Square {
        self.board.king_location(color)
    }

    pub fn castling_rights(&self) -> &CastlingRights {
        &self.rights
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::of(self)
    }
}
