use std::fmt;

use indexmap::IndexSet;

use crate::castling::{CastlingRights, CastlingSide, KING_COL};
use crate::error::{RulesError, RulesResult};
use crate::moves::{offset, square, Move, Square};
use crate::piece::{Cell, Color, Piece, PieceType};

const ORTHOGONAL: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONAL: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ALL_DIRECTIONS: [(i32, i32); 8] = [
    (-1, 0), (1, 0), (0, -1), (0, 1),
    (-1, -1), (-1, 1), (1, -1), (1, 1),
];
const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// What the generator should produce.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Generation {
    /// Pseudo-legal moves, castling included.
    Moves,
    /// Attacked squares as move endpoints. King moves exclude castling, so
    /// castling safety can ask for the opponent's attacks without recursing.
    /// Pawns contribute their two diagonals whatever stands there, and no pushes.
    Attacks,
}

/// The 8×8 grid plus the cached king squares.
///
/// Row 0 is Black's home rank, row 7 White's. Only the game may write cells.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    squares: [[Cell; 8]; 8],
    white_king: Square,
    black_king: Square,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Standard starting position.
    pub fn new() -> Self {
        let mut squares = [[None; 8]; 8];

        for (col, &pt) in BACK_RANK.iter().enumerate() {
            squares[Color::Black.home_row()][col] = Some(Piece::new(pt, Color::Black));
            squares[Color::White.home_row()][col] = Some(Piece::new(pt, Color::White));
        }
        for col in 0..8 {
            squares[Color::Black.pawn_row()][col] = Some(Piece::new(PieceType::Pawn, Color::Black));
            squares[Color::White.pawn_row()][col] = Some(Piece::new(PieceType::Pawn, Color::White));
        }

        Board {
            squares,
            white_king: (Color::White.home_row(), KING_COL),
            black_king: (Color::Black.home_row(), KING_COL),
        }
    }

    /// Build a board from an arbitrary grid. Each side needs exactly one king
    /// and no pawn may stand on row 0 or row 7.
    pub fn from_squares(squares: [[Cell; 8]; 8]) -> RulesResult<Self> {
        let mut white_king = None;
        let mut black_king = None;

        for (r, row) in squares.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let Some(p) = cell else { continue };
                match p.piece_type {
                    PieceType::King => {
                        let slot = match p.color {
                            Color::White => &mut white_king,
                            Color::Black => &mut black_king,
                        };
                        if slot.replace((r, c)).is_some() {
                            return Err(RulesError::ExtraKing(p.color));
                        }
                    }
                    PieceType::Pawn if r == 0 || r == 7 => {
                        return Err(RulesError::PawnOnBackRank { row: r, col: c });
                    }
                    _ => {}
                }
            }
        }

        Ok(Board {
            squares,
            white_king: white_king.ok_or(RulesError::MissingKing(Color::White))?,
            black_king: black_king.ok_or(RulesError::MissingKing(Color::Black))?,
        })
    }

    pub fn squares(&self) -> &[[Cell; 8]; 8] {
        &self.squares
    }

    /// Read one cell, validating the coordinates.
    pub fn cell(&self, row: i32, col: i32) -> RulesResult<Cell> {
        let (r, c) = square(row, col)?;
        Ok(self.squares[r][c])
    }

    pub fn at(&self, sq: Square) -> Cell {
        self.squares[sq.0][sq.1]
    }

    pub fn king_location(&self, color: Color) -> Square {
        match color {
            Color::White => self.white_king,
            Color::Black => self.black_king,
        }
    }

    fn is_color(&self, sq: Square, color: Color) -> bool {
        self.at(sq).map(|p| p.color == color).unwrap_or(false)
    }

    /// Nothing but the two kings left.
    pub fn only_kings_remain(&self) -> bool {
        self.squares
            .iter()
            .flatten()
            .flatten()
            .all(|p| p.piece_type == PieceType::King)
    }

    /// Move the piece on `mv.start` to `mv.end`, clearing the origin and
    /// keeping the king cache in step. Returns whatever was captured.
    ///
    /// Castling rook relocation and promotion are the caller's business.
    pub(crate) fn relocate(&mut self, mv: &Move) -> Cell {
        let piece = self.squares[mv.start.0][mv.start.1].take();
        let captured = std::mem::replace(&mut self.squares[mv.end.0][mv.end.1], piece);

        if let Some(p) = piece {
            if p.piece_type == PieceType::King {
                match p.color {
                    Color::White => self.white_king = mv.end,
                    Color::Black => self.black_king = mv.end,
                }
            }
        }
        captured
    }

    pub(crate) fn set(&mut self, sq: Square, cell: Cell) {
        self.squares[sq.0][sq.1] = cell;
    }

    // ---------------------------------------------------------------------
    // Generation
    // ---------------------------------------------------------------------

    /// Pseudo-legal moves (or attacks) for `color`. Self-check is not considered.
    pub fn generate_moves(
        &self,
        color: Color,
        rights: &CastlingRights,
        generation: Generation,
    ) -> IndexSet<Move> {
        let mut moves = IndexSet::new();

        for row in 0..8usize {
            for col in 0..8usize {
                let Some(piece) = self.squares[row][col] else { continue };
                if piece.color != color {
                    continue;
                }
                let from = (row, col);
                match piece.piece_type {
                    PieceType::Pawn => self.generate_pawn_moves(from, color, generation, &mut moves),
                    PieceType::Knight => self.generate_steps(from, color, &KNIGHT_OFFSETS, &mut moves),
                    PieceType::Bishop => self.generate_sliding_moves(from, color, &DIAGONAL, &mut moves),
                    PieceType::Rook => self.generate_sliding_moves(from, color, &ORTHOGONAL, &mut moves),
                    PieceType::Queen => self.generate_sliding_moves(from, color, &ALL_DIRECTIONS, &mut moves),
                    PieceType::King => {
                        self.generate_steps(from, color, &ALL_DIRECTIONS, &mut moves);
                        if generation == Generation::Moves {
                            self.generate_castling(from, color, rights, &mut moves);
                        }
                    }
                }
            }
        }

        moves
    }

    fn generate_pawn_moves(
        &self,
        from: Square,
        color: Color,
        generation: Generation,
        moves: &mut IndexSet<Move>,
    ) {
        let dir = color.forward();

        if generation == Generation::Moves {
            if let Some(one) = offset(from, dir, 0).filter(|&sq| self.at(sq).is_none()) {
                moves.insert(Move::new(from, one));

                if from.0 == color.pawn_row() {
                    if let Some(two) = offset(one, dir, 0).filter(|&sq| self.at(sq).is_none()) {
                        moves.insert(Move::new(from, two));
                    }
                }
            }
        }

        for dc in [-1, 1] {
            let Some(target) = offset(from, dir, dc) else { continue };
            let capture = self.is_color(target, color.opposite());
            if capture || generation == Generation::Attacks {
                moves.insert(Move::new(from, target));
            }
        }
    }

    /// Single-step pieces: knight offsets, king adjacency.
    fn generate_steps(
        &self,
        from: Square,
        color: Color,
        offsets: &[(i32, i32)],
        moves: &mut IndexSet<Move>,
    ) {
        for &(dr, dc) in offsets {
            let Some(to) = offset(from, dr, dc) else { continue };
            if !self.is_color(to, color) {
                moves.insert(Move::new(from, to));
            }
        }
    }

    /// Walk each direction until blocked: empty squares continue the walk,
    /// an enemy ends it as a capture, a friend ends it without a move.
    fn generate_sliding_moves(
        &self,
        from: Square,
        color: Color,
        directions: &[(i32, i32)],
        moves: &mut IndexSet<Move>,
    ) {
        for &(dr, dc) in directions {
            let mut cur = from;
            while let Some(to) = offset(cur, dr, dc) {
                match self.at(to) {
                    None => {
                        moves.insert(Move::new(from, to));
                    }
                    Some(p) => {
                        if p.color != color {
                            moves.insert(Move::new(from, to));
                        }
                        break;
                    }
                }
                cur = to;
            }
        }
    }

    fn generate_castling(
        &self,
        from: Square,
        color: Color,
        rights: &CastlingRights,
        moves: &mut IndexSet<Move>,
    ) {
        let row = color.home_row();
        if from != (row, KING_COL) {
            return;
        }

        let candidates: Vec<CastlingSide> = CastlingSide::ALL
            .into_iter()
            .filter(|&side| rights.may_castle(color, side))
            .filter(|&side| {
                self.at((row, side.rook_col())) == Some(Piece::new(PieceType::Rook, color))
            })
            .filter(|&side| side.between_cols().iter().all(|&c| self.at((row, c)).is_none()))
            .collect();
        if candidates.is_empty() {
            return;
        }

        let attacked = self.attacked_squares(color.opposite());
        if attacked.contains(&from) {
            return;
        }

        for side in candidates {
            if side.transit_cols().iter().all(|&c| !attacked.contains(&(row, c))) {
                moves.insert(Move::new(from, (row, side.king_to_col())));
            }
        }
    }

    // ---------------------------------------------------------------------
    // Attacks
    // ---------------------------------------------------------------------

    /// Every square `attacker` hits, as the endpoints of its attack generation.
    pub fn attacked_squares(&self, attacker: Color) -> IndexSet<Square> {
        // Attack generation never looks at castling rights.
        let rights = CastlingRights::unmoved();
        self.generate_moves(attacker, &rights, Generation::Attacks)
            .into_iter()
            .map(|m| m.end)
            .collect()
    }

    pub fn is_square_attacked_by(&self, sq: Square, attacker: Color) -> bool {
        self.attacked_squares(attacker).contains(&sq)
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        self.is_square_attacked_by(self.king_location(color), color.opposite())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.squares {
            let line: String = row
                .iter()
                .map(|cell| cell.map(Piece::glyph).unwrap_or('.'))
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece(pt: PieceType, color: Color) -> Cell {
        Some(Piece::new(pt, color))
    }

    /// Kings on their home squares and nothing else; callers add pieces.
    fn bare_kings() -> [[Cell; 8]; 8] {
        let mut squares = [[None; 8]; 8];
        squares[7][4] = piece(PieceType::King, Color::White);
        squares[0][4] = piece(PieceType::King, Color::Black);
        squares
    }

    fn moves_from(board: &Board, color: Color, from: Square) -> Vec<Square> {
        let mut ends: Vec<Square> = board
            .generate_moves(color, &CastlingRights::unmoved(), Generation::Moves)
            .into_iter()
            .filter(|m| m.start == from)
            .map(|m| m.end)
            .collect();
        ends.sort();
        ends
    }

    #[test]
    fn standard_position_layout() {
        let board = Board::new();
        assert_eq!(board.at((0, 4)), piece(PieceType::King, Color::Black));
        assert_eq!(board.at((0, 3)), piece(PieceType::Queen, Color::Black));
        assert_eq!(board.at((7, 4)), piece(PieceType::King, Color::White));
        assert_eq!(board.at((7, 0)), piece(PieceType::Rook, Color::White));
        assert_eq!(board.at((6, 2)), piece(PieceType::Pawn, Color::White));
        assert_eq!(board.at((1, 5)), piece(PieceType::Pawn, Color::Black));
        assert_eq!(board.at((4, 4)), None);
        assert_eq!(board.king_location(Color::White), (7, 4));
        assert_eq!(board.king_location(Color::Black), (0, 4));
    }

    #[test]
    fn cell_rejects_out_of_range() {
        let board = Board::new();
        assert!(board.cell(0, 0).is_ok());
        assert_eq!(board.cell(8, 0), Err(RulesError::OffBoard { row: 8, col: 0 }));
        assert_eq!(board.cell(0, -1), Err(RulesError::OffBoard { row: 0, col: -1 }));
    }

    #[test]
    fn from_squares_validates_kings_and_pawns() {
        let mut squares = bare_kings();
        squares[0][4] = None;
        assert_eq!(Board::from_squares(squares), Err(RulesError::MissingKing(Color::Black)));

        let mut squares = bare_kings();
        squares[3][3] = piece(PieceType::King, Color::White);
        assert_eq!(Board::from_squares(squares), Err(RulesError::ExtraKing(Color::White)));

        let mut squares = bare_kings();
        squares[0][0] = piece(PieceType::Pawn, Color::White);
        assert_eq!(
            Board::from_squares(squares),
            Err(RulesError::PawnOnBackRank { row: 0, col: 0 })
        );
    }

    #[test]
    fn pawn_double_step_needs_both_squares_empty() {
        let mut squares = bare_kings();
        squares[6][0] = piece(PieceType::Pawn, Color::White);
        squares[6][1] = piece(PieceType::Pawn, Color::White);
        squares[5][1] = piece(PieceType::Knight, Color::Black);
        squares[6][2] = piece(PieceType::Pawn, Color::White);
        squares[4][2] = piece(PieceType::Knight, Color::Black);
        let board = Board::from_squares(squares).unwrap();

        assert_eq!(moves_from(&board, Color::White, (6, 0)), vec![(4, 0), (5, 0), (5, 1)]);
        assert!(moves_from(&board, Color::White, (6, 1)).is_empty());
        assert_eq!(moves_from(&board, Color::White, (6, 2)), vec![(5, 1), (5, 2)]);
    }

    #[test]
    fn black_pawns_walk_toward_row_seven() {
        let mut squares = bare_kings();
        squares[1][3] = piece(PieceType::Pawn, Color::Black);
        squares[4][6] = piece(PieceType::Pawn, Color::Black);
        squares[5][7] = piece(PieceType::Rook, Color::White);
        let board = Board::from_squares(squares).unwrap();

        assert_eq!(moves_from(&board, Color::Black, (1, 3)), vec![(2, 3), (3, 3)]);
        assert_eq!(moves_from(&board, Color::Black, (4, 6)), vec![(5, 6), (5, 7)]);
    }

    #[test]
    fn pawns_do_not_capture_straight_ahead_or_own_pieces() {
        let mut squares = bare_kings();
        squares[4][4] = piece(PieceType::Pawn, Color::White);
        squares[3][4] = piece(PieceType::Pawn, Color::Black);
        squares[3][3] = piece(PieceType::Knight, Color::White);
        let board = Board::from_squares(squares).unwrap();
        assert!(moves_from(&board, Color::White, (4, 4)).is_empty());
    }

    #[test]
    fn knight_in_the_corner_has_two_moves() {
        let mut squares = bare_kings();
        squares[7][0] = piece(PieceType::Knight, Color::White);
        squares[6][2] = piece(PieceType::Pawn, Color::Black);
        let board = Board::from_squares(squares).unwrap();
        assert_eq!(moves_from(&board, Color::White, (7, 0)), vec![(5, 1), (6, 2)]);
    }

    #[test]
    fn rook_walk_stops_at_blockers() {
        let mut squares = bare_kings();
        squares[4][0] = piece(PieceType::Rook, Color::White);
        squares[2][0] = piece(PieceType::Pawn, Color::Black);
        squares[4][2] = piece(PieceType::Pawn, Color::White);
        let board = Board::from_squares(squares).unwrap();
        assert_eq!(
            moves_from(&board, Color::White, (4, 0)),
            vec![(2, 0), (3, 0), (4, 1), (5, 0), (6, 0), (7, 0)]
        );
    }

    #[test]
    fn queen_is_rook_plus_bishop() {
        let mut squares = bare_kings();
        squares[4][3] = piece(PieceType::Queen, Color::Black);
        squares[6][5] = piece(PieceType::Pawn, Color::White);
        squares[2][3] = piece(PieceType::Pawn, Color::Black);
        let queen = Board::from_squares(squares).unwrap();

        squares[4][3] = piece(PieceType::Rook, Color::Black);
        let rook = Board::from_squares(squares).unwrap();
        squares[4][3] = piece(PieceType::Bishop, Color::Black);
        let bishop = Board::from_squares(squares).unwrap();

        let mut union = moves_from(&rook, Color::Black, (4, 3));
        union.extend(moves_from(&bishop, Color::Black, (4, 3)));
        union.sort();
        assert_eq!(moves_from(&queen, Color::Black, (4, 3)), union);
    }

    #[test]
    fn king_steps_exclude_own_pieces() {
        let mut squares = bare_kings();
        squares[6][4] = piece(PieceType::Pawn, Color::White);
        squares[6][3] = piece(PieceType::Pawn, Color::Black);
        let board = Board::from_squares(squares).unwrap();
        let rights = CastlingRights::unmoved();
        let king: Vec<Square> = board
            .generate_moves(Color::White, &rights, Generation::Moves)
            .into_iter()
            .filter(|m| m.start == (7, 4))
            .map(|m| m.end)
            .collect();
        assert_eq!(king.len(), 4, "d1, f1, d2 capture and f2: {king:?}");
        assert!(!king.contains(&(6, 4)));
        assert!(king.contains(&(6, 3)));
    }

    #[test]
    fn pawn_attacks_are_diagonals_only() {
        let mut squares = bare_kings();
        squares[1][0] = piece(PieceType::Pawn, Color::Black);
        let board = Board::from_squares(squares).unwrap();
        let attacked = board.attacked_squares(Color::Black);
        assert!(attacked.contains(&(2, 1)));
        assert!(!attacked.contains(&(2, 0)), "pushes do not attack");
        assert!(!attacked.contains(&(3, 0)));
    }

    #[test]
    fn check_is_an_attack_on_the_cached_king_square() {
        let mut squares = bare_kings();
        squares[3][4] = piece(PieceType::Rook, Color::Black);
        let board = Board::from_squares(squares).unwrap();
        assert!(board.is_in_check(Color::White));
        assert!(!board.is_in_check(Color::Black));

        squares[5][4] = piece(PieceType::Knight, Color::White);
        let blocked = Board::from_squares(squares).unwrap();
        assert!(!blocked.is_in_check(Color::White));
    }

    #[test]
    fn castling_is_offered_when_the_path_is_clear_and_safe() {
        let mut squares = bare_kings();
        squares[7][7] = piece(PieceType::Rook, Color::White);
        squares[7][0] = piece(PieceType::Rook, Color::White);
        let board = Board::from_squares(squares).unwrap();
        let king = moves_from(&board, Color::White, (7, 4));
        assert!(king.contains(&(7, 6)));
        assert!(king.contains(&(7, 2)));
    }

    #[test]
    fn castling_refused_through_attacked_square() {
        let mut squares = bare_kings();
        squares[7][7] = piece(PieceType::Rook, Color::White);
        squares[7][0] = piece(PieceType::Rook, Color::White);
        squares[2][5] = piece(PieceType::Rook, Color::Black); // hits f1
        let board = Board::from_squares(squares).unwrap();
        let king = moves_from(&board, Color::White, (7, 4));
        assert!(!king.contains(&(7, 6)));
        assert!(king.contains(&(7, 2)));
    }

    #[test]
    fn queenside_castling_ignores_attacks_on_b_file() {
        let mut squares = bare_kings();
        squares[0][0] = piece(PieceType::Rook, Color::Black);
        squares[5][1] = piece(PieceType::Rook, Color::White); // hits b8 only
        let board = Board::from_squares(squares).unwrap();
        assert!(moves_from(&board, Color::Black, (0, 4)).contains(&(0, 2)));
    }

    #[test]
    fn castling_refused_while_in_check_or_blocked_or_revoked() {
        let mut squares = bare_kings();
        squares[7][7] = piece(PieceType::Rook, Color::White);
        squares[3][4] = piece(PieceType::Rook, Color::Black);
        let checked = Board::from_squares(squares).unwrap();
        assert!(!moves_from(&checked, Color::White, (7, 4)).contains(&(7, 6)));

        squares[3][4] = None;
        squares[7][6] = piece(PieceType::Knight, Color::White);
        let blocked = Board::from_squares(squares).unwrap();
        assert!(!moves_from(&blocked, Color::White, (7, 4)).contains(&(7, 6)));

        squares[7][6] = None;
        let open = Board::from_squares(squares).unwrap();
        let mut rights = CastlingRights::unmoved();
        rights.revoke_rook(Color::White, CastlingSide::Kingside);
        let castles = open
            .generate_moves(Color::White, &rights, Generation::Moves)
            .contains(&Move::new((7, 4), (7, 6)));
        assert!(!castles);
    }

    #[test]
    fn relocate_tracks_the_king_and_reports_captures() {
        let mut squares = bare_kings();
        squares[6][3] = piece(PieceType::Pawn, Color::Black);
        let mut board = Board::from_squares(squares).unwrap();
        let captured = board.relocate(&Move::new((7, 4), (6, 3)));
        assert_eq!(captured, piece(PieceType::Pawn, Color::Black));
        assert_eq!(board.king_location(Color::White), (6, 3));
        assert_eq!(board.at((7, 4)), None);
    }

    #[test]
    fn only_kings_remain_detects_bare_kings() {
        let board = Board::from_squares(bare_kings()).unwrap();
        assert!(board.only_kings_remain());
        assert!(!Board::new().only_kings_remain());
    }

    #[test]
    fn display_draws_the_diagram() {
        let text = Board::new().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "rnbqkbnr");
        assert_eq!(lines[4], "........");
        assert_eq!(lines[7], "RNBQKBNR");
    }
}
