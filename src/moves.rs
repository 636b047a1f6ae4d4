use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RulesError, RulesResult};

/// A `(row, col)` pair that is known to lie on the board.
pub type Square = (usize, usize);

/// A move is just its two endpoints. Castling and promotion follow from
/// the endpoints and the board, they are not separate kinds of move.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub struct Move {
    pub start: Square,
    pub end: Square,
}

impl Move {
    pub const fn new(start: Square, end: Square) -> Self {
        Move { start, end }
    }

    /// Build a move from caller-supplied coordinates, rejecting anything off the board.
    pub fn from_coords(start: (i32, i32), end: (i32, i32)) -> RulesResult<Move> {
        Ok(Move {
            start: square(start.0, start.1)?,
            end: square(end.0, end.1)?,
        })
    }

    pub fn row_delta(&self) -> i32 {
        self.end.0 as i32 - self.start.0 as i32
    }

    pub fn col_delta(&self) -> i32 {
        self.end.1 as i32 - self.start.1 as i32
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})->({},{})",
            self.start.0, self.start.1, self.end.0, self.end.1
        )
    }
}

pub fn in_bounds(row: i32, col: i32) -> bool {
    (0..8).contains(&row) && (0..8).contains(&col)
}

/// Validate a signed coordinate pair.
pub fn square(row: i32, col: i32) -> RulesResult<Square> {
    if in_bounds(row, col) {
        Ok((row as usize, col as usize))
    } else {
        Err(RulesError::OffBoard { row, col })
    }
}

/// Step from `sq` by `(dr, dc)`, or `None` when that leaves the board.
pub fn offset(sq: Square, dr: i32, dc: i32) -> Option<Square> {
    square(sq.0 as i32 + dr, sq.1 as i32 + dc).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_board_coordinates_are_rejected() {
        assert!(Move::from_coords((6, 4), (4, 4)).is_ok());
        assert!(matches!(
            Move::from_coords((-1, 4), (4, 4)),
            Err(RulesError::OffBoard { row: -1, col: 4 })
        ));
        assert!(matches!(
            Move::from_coords((6, 4), (6, 8)),
            Err(RulesError::OffBoard { row: 6, col: 8 })
        ));
    }

    #[test]
    fn equality_is_by_endpoints() {
        assert_eq!(Move::new((6, 4), (4, 4)), Move::new((6, 4), (4, 4)));
        assert_ne!(Move::new((6, 4), (4, 4)), Move::new((6, 4), (5, 4)));
    }

    #[test]
    fn offset_stops_at_the_edge() {
        assert_eq!(offset((0, 0), 1, 2), Some((1, 2)));
        assert_eq!(offset((0, 0), -1, 0), None);
        assert_eq!(offset((7, 7), 0, 1), None);
    }
}
