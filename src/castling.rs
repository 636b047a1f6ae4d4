use serde::{Deserialize, Serialize};

use crate::moves::{Move, Square};
use crate::piece::Color;

/// Column both kings start on.
pub const KING_COL: usize = 4;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub enum CastlingSide {
    Kingside,
    Queenside,
}

impl CastlingSide {
    pub const ALL: [CastlingSide; 2] = [CastlingSide::Kingside, CastlingSide::Queenside];

    pub fn rook_col(self) -> usize {
        match self {
            CastlingSide::Kingside => 7,
            CastlingSide::Queenside => 0,
        }
    }

    pub fn king_to_col(self) -> usize {
        match self {
            CastlingSide::Kingside => 6,
            CastlingSide::Queenside => 2,
        }
    }

    pub fn rook_to_col(self) -> usize {
        match self {
            CastlingSide::Kingside => 5,
            CastlingSide::Queenside => 3,
        }
    }

    /// Columns strictly between king and rook; all must be empty.
    pub fn between_cols(self) -> &'static [usize] {
        match self {
            CastlingSide::Kingside => &[5, 6],
            CastlingSide::Queenside => &[1, 2, 3],
        }
    }

    /// Columns the king crosses or lands on; none may be attacked.
    pub fn transit_cols(self) -> &'static [usize] {
        match self {
            CastlingSide::Kingside => &[5, 6],
            CastlingSide::Queenside => &[3, 2],
        }
    }

    /// Which castle a king move performs, if it is one: two files sideways from the home square.
    pub fn of_king_move(color: Color, mv: &Move) -> Option<CastlingSide> {
        let home = (color.home_row(), KING_COL);
        if mv.start != home || mv.end.0 != home.0 {
            return None;
        }
        match mv.col_delta() {
            2 => Some(CastlingSide::Kingside),
            -2 => Some(CastlingSide::Queenside),
            _ => None,
        }
    }
}

/// Has-moved flags for both kings and all four rooks.
///
/// Flags only ever go from `false` to `true`; there is no way to clear one.
#[derive(Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Debug)]
pub struct CastlingRights {
    white_king_moved: bool,
    black_king_moved: bool,
    white_kingside_rook_moved: bool,
    white_queenside_rook_moved: bool,
    black_kingside_rook_moved: bool,
    black_queenside_rook_moved: bool,
}

impl CastlingRights {
    /// Nothing has moved yet.
    pub fn unmoved() -> Self {
        Self::default()
    }

    pub fn king_moved(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_king_moved,
            Color::Black => self.black_king_moved,
        }
    }

    pub fn rook_moved(&self, color: Color, side: CastlingSide) -> bool {
        match (color, side) {
            (Color::White, CastlingSide::Kingside) => self.white_kingside_rook_moved,
            (Color::White, CastlingSide::Queenside) => self.white_queenside_rook_moved,
            (Color::Black, CastlingSide::Kingside) => self.black_kingside_rook_moved,
            (Color::Black, CastlingSide::Queenside) => self.black_queenside_rook_moved,
        }
    }

    /// Neither the king nor the rook on `side` has moved.
    pub fn may_castle(&self, color: Color, side: CastlingSide) -> bool {
        !self.king_moved(color) && !self.rook_moved(color, side)
    }

    pub fn revoke_king(&mut self, color: Color) {
        match color {
            Color::White => self.white_king_moved = true,
            Color::Black => self.black_king_moved = true,
        }
    }

    pub fn revoke_rook(&mut self, color: Color, side: CastlingSide) {
        let flag = match (color, side) {
            (Color::White, CastlingSide::Kingside) => &mut self.white_kingside_rook_moved,
            (Color::White, CastlingSide::Queenside) => &mut self.white_queenside_rook_moved,
            (Color::Black, CastlingSide::Kingside) => &mut self.black_kingside_rook_moved,
            (Color::Black, CastlingSide::Queenside) => &mut self.black_queenside_rook_moved,
        };
        *flag = true;
    }

    /// Record that whatever stood on `sq` has left it or been captured there.
    /// Only the six home squares matter.
    pub fn touch(&mut self, sq: Square) {
        for color in [Color::White, Color::Black] {
            let row = color.home_row();
            if sq == (row, KING_COL) {
                self.revoke_king(color);
            }
            for side in CastlingSide::ALL {
                if sq == (row, side.rook_col()) {
                    self.revoke_rook(color, side);
                }
            }
        }
    }
}
