pub mod board;
pub mod castling;
pub mod error;
pub mod game;
pub mod moves;
pub mod piece;
pub mod setup;
pub mod snapshot;

pub use error::{RulesError, RulesResult};
pub use game::Game;
pub use moves::Move;
pub use piece::{Cell, Color, Piece, PieceType};
pub use setup::Setup;
pub use snapshot::Snapshot;
