use crate::board::Board;
use crate::castling::{CastlingRights, CastlingSide, KING_COL};
use crate::error::{RulesError, RulesResult};
use crate::game::Game;
use crate::moves::square;
use crate::piece::{Cell, Color, Piece, PieceType};

/// Builder for games that start from something other than the standard position.
///
/// Has-moved flags are inferred: a king or rook only keeps its castling right
/// if it stands on its home square.
#[derive(Clone, Debug)]
pub struct Setup {
    squares: [[Cell; 8]; 8],
    turn: Color,
}

impl Default for Setup {
    fn default() -> Self {
        Self::standard()
    }
}

impl Setup {
    pub fn empty() -> Self {
        Setup {
            squares: [[None; 8]; 8],
            turn: Color::White,
        }
    }

    pub fn standard() -> Self {
        Setup {
            squares: *Board::new().squares(),
            turn: Color::White,
        }
    }

    pub fn place(&mut self, row: i32, col: i32, piece: Piece) -> RulesResult<&mut Self> {
        let (r, c) = square(row, col)?;
        self.squares[r][c] = Some(piece);
        Ok(self)
    }

    pub fn remove(&mut self, row: i32, col: i32) -> RulesResult<&mut Self> {
        let (r, c) = square(row, col)?;
        self.squares[r][c] = None;
        Ok(self)
    }

    pub fn side_to_move(&mut self, color: Color) -> &mut Self {
        self.turn = color;
        self
    }

    fn inferred_rights(&self) -> CastlingRights {
        let mut rights = CastlingRights::unmoved();
        for color in [Color::White, Color::Black] {
            let row = color.home_row();
            if self.squares[row][KING_COL] != Some(Piece::new(PieceType::King, color)) {
                rights.revoke_king(color);
            }
            for side in CastlingSide::ALL {
                if self.squares[row][side.rook_col()] != Some(Piece::new(PieceType::Rook, color)) {
                    rights.revoke_rook(color, side);
                }
            }
        }
        rights
    }

    /// Validate the position and start a game from it.
    pub fn build(&self) -> RulesResult<Game> {
        let board = Board::from_squares(self.squares)?;
        let waiting = self.turn.opposite();
        if board.is_in_check(waiting) {
            return Err(RulesError::OpponentInCheck(waiting));
        }
        Ok(Game::from_parts(board, self.turn, self.inferred_rights()))
    }
}
