use serde::{Deserialize, Serialize};

use crate::castling::CastlingRights;
use crate::game::Game;
use crate::moves::Move;
use crate::piece::{describe_cell, Cell, Color};

/// Everything a display layer needs to draw the game, detached from the engine.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct Snapshot {
    pub squares: [[Cell; 8]; 8],
    /// Row-major descriptions, `"empty"` or e.g. `"white knight"`.
    pub cells: Vec<String>,
    pub side_to_move: Color,
    pub check: bool,
    pub checkmate: bool,
    pub stalemate: bool,
    pub castling_rights: CastlingRights,
    pub legal_moves: Vec<Move>,
}

impl Snapshot {
    pub fn of(game: &Game) -> Self {
        let squares = *game.current_board();
        Snapshot {
            squares,
            cells: squares.iter().flatten().map(|&c| describe_cell(c)).collect(),
            side_to_move: game.side_to_move(),
            check: game.in_check(),
            checkmate: game.in_checkmate(),
            stalemate: game.in_stalemate(),
            castling_rights: *game.castling_rights(),
            legal_moves: game.legal_moves().iter().copied().collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}
