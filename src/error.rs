//! Error types for the rules engine
//!
//! Every rejected request leaves the game untouched. Callers that only need a
//! yes/no answer use [`Game::attempt_move`](crate::game::Game::attempt_move);
//! [`Game::try_move`](crate::game::Game::try_move) reports why.

use thiserror::Error;

use crate::moves::Move;
use crate::piece::Color;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    /// Coordinate outside rows/columns 0-7
    #[error("square ({row}, {col}) is off the board")]
    OffBoard { row: i32, col: i32 },

    /// Not in the side to move's legal-move set
    #[error("{mv} is not a legal move")]
    IllegalMove { mv: Move },

    /// Would leave the mover's own king attacked
    #[error("{mv} would leave the king in check")]
    LeavesKingInCheck { mv: Move },

    #[error("the game is over")]
    GameOver,

    #[error("no {0} king on the board")]
    MissingKing(Color),

    #[error("more than one {0} king on the board")]
    ExtraKing(Color),

    #[error("pawn on back rank at ({row}, {col})")]
    PawnOnBackRank { row: usize, col: usize },

    /// The side not to move is in check, so its king could be captured
    #[error("{0} is in check but it is not {0}'s turn")]
    OpponentInCheck(Color),
}

pub type RulesResult<T> = Result<T, RulesError>;
