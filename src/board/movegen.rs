/*
 * Heron, a UCI-compatible chess engine
 * Copyright (C) 2025 the Heron developers
 *
 * Heron is free software: you can redistribute it and/or modify it under the
 * terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or (at your option) any later
 * version.
 *
 * Heron is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
 * FOR A PARTICULAR PURPOSE. See the GNU General Public License for more
 * details.
 *
 * You should have received a copy of the GNU General Public License along with
 * Heron. If not, see <https://www.gnu.org/licenses/>.
 */

//! Move generation: pseudo-legal moves by piece type, filtered down to legal
//! moves by playing each one and rejecting self-checks.

use std::fmt::{self, Display, Formatter};
use std::ops::{BitOr, BitOrAssign};

use arrayvec::ArrayVec;

use super::{Board, CastlingRights};
use crate::defs::{File, Piece, PieceType, Rank, Side, Square};

/// The most legal moves any reachable position can have, rounded up.
pub const MAX_LEGAL_MOVES: usize = 256;

/// A list of moves. Lives on the stack, one per search node.
pub type Moves = ArrayVec<Move, MAX_LEGAL_MOVES>;

/// A set of flags describing what kind of move a [`Move`] is.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MoveFlags(u8);

/// A single move: where from, where to, who moves, who dies, and what a pawn
/// turns into.
///
/// Two moves are equal iff all fields match. [`Move::NULL`] is the reserved
/// all-zero sentinel meaning "no move".
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Move {
    /// The origin square.
    pub from: Square,
    /// The destination square.
    pub to: Square,
    /// The piece being moved. Never [`Piece::NONE`] for a real move.
    pub moving: Piece,
    /// The captured piece, or [`Piece::NONE`]. For en passant this is the
    /// enemy pawn, which does not sit on `to`.
    pub captured: Piece,
    /// The piece a promoting pawn becomes, or [`Piece::NONE`].
    pub promotion: Piece,
    /// What kind of move this is.
    pub flags: MoveFlags,
}

#[allow(missing_docs)]
impl MoveFlags {
    pub const NONE: Self = Self(0);
    pub const CAPTURE: Self = Self(1);
    pub const DOUBLE_PAWN_PUSH: Self = Self(1 << 1);
    pub const EN_PASSANT: Self = Self(1 << 2);
    pub const CASTLE_KING_SIDE: Self = Self(1 << 3);
    pub const CASTLE_QUEEN_SIDE: Self = Self(1 << 4);
    pub const PROMOTION: Self = Self(1 << 5);
}

impl BitOr for MoveFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for MoveFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl MoveFlags {
    /// Checks if all flags in `flags` are set in `self`.
    pub const fn contains(self, flags: Self) -> bool {
        self.0 & flags.0 == flags.0
    }
}

impl Display for Move {
    /// Writes the move in UCI coordinate notation, e.g. `e2e4` or `e7e8q`.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if self.is_promotion() {
            let letter = match self.promotion.piece_type() {
                PieceType::QUEEN => 'q',
                PieceType::ROOK => 'r',
                PieceType::BISHOP => 'b',
                _ => 'n',
            };
            write!(f, "{letter}")?;
        }
        Ok(())
    }
}

impl Move {
    /// The "no move" sentinel.
    pub const NULL: Self = Self {
        from: Square::A1,
        to: Square::A1,
        moving: Piece::NONE,
        captured: Piece::NONE,
        promotion: Piece::NONE,
        flags: MoveFlags::NONE,
    };

    /// Creates a move with every field given explicitly.
    pub const fn new(
        from: Square,
        to: Square,
        moving: Piece,
        captured: Piece,
        promotion: Piece,
        flags: MoveFlags,
    ) -> Self {
        Self {
            from,
            to,
            moving,
            captured,
            promotion,
            flags,
        }
    }

    /// Creates a quiet move: no capture, no promotion, no flags.
    pub const fn quiet(from: Square, to: Square, moving: Piece) -> Self {
        Self::new(from, to, moving, Piece::NONE, Piece::NONE, MoveFlags::NONE)
    }

    /// Creates a plain capture.
    pub const fn capture(from: Square, to: Square, moving: Piece, captured: Piece) -> Self {
        Self::new(from, to, moving, captured, Piece::NONE, MoveFlags::CAPTURE)
    }

    /// Checks if `self` is the "no move" sentinel.
    pub const fn is_null(self) -> bool {
        self.moving.is_none()
    }

    /// Checks if `self` captures something.
    pub const fn is_capture(self) -> bool {
        self.flags.contains(MoveFlags::CAPTURE)
    }

    /// Checks if `self` is a pawn double push.
    pub const fn is_double_pawn_push(self) -> bool {
        self.flags.contains(MoveFlags::DOUBLE_PAWN_PUSH)
    }

    /// Checks if `self` is an en passant capture.
    pub const fn is_en_passant(self) -> bool {
        self.flags.contains(MoveFlags::EN_PASSANT)
    }

    /// Checks if `self` is a king-side castle.
    pub const fn is_king_side_castle(self) -> bool {
        self.flags.contains(MoveFlags::CASTLE_KING_SIDE)
    }

    /// Checks if `self` is a queen-side castle.
    pub const fn is_queen_side_castle(self) -> bool {
        self.flags.contains(MoveFlags::CASTLE_QUEEN_SIDE)
    }

    /// Checks if `self` is a castle of either kind.
    pub const fn is_castle(self) -> bool {
        self.is_king_side_castle() || self.is_queen_side_castle()
    }

    /// Checks if `self` is a promotion.
    pub const fn is_promotion(self) -> bool {
        self.flags.contains(MoveFlags::PROMOTION)
    }
}

/// The file/rank steps of a knight.
const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// The file/rank steps of a king.
const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// The ray directions of a bishop.
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// The ray directions of a rook.
const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

impl Board {
    /// Generates every legal move in the current position.
    ///
    /// Each pseudo-legal move is played and rejected if it leaves the mover's
    /// own king attacked; the board is returned to its original state before
    /// this function returns.
    pub fn generate_legal_moves(&mut self) -> Moves {
        let mover = self.side_to_move();
        let mut legal = Moves::new();

        for mv in self.generate_pseudo_legal_moves() {
            self.make_move(mv);
            if !self.is_in_check(mover) {
                legal.push(mv);
            }
            self.undo_move();
        }

        legal
    }

    /// Generates every pseudo-legal move: moves that follow the movement
    /// rules but may leave the mover's own king in check.
    fn generate_pseudo_legal_moves(&self) -> Moves {
        let us = self.side_to_move();
        let mut moves = Moves::new();

        for square in 0..64 {
            let from = Square::new(square);
            let piece = self.piece_at(from);
            if !piece.is_side(us) {
                continue;
            }

            match piece.piece_type() {
                PieceType::PAWN => self.generate_pawn_moves(from, piece, &mut moves),
                PieceType::KNIGHT => {
                    self.generate_leaper_moves(from, piece, &KNIGHT_OFFSETS, &mut moves);
                }
                PieceType::BISHOP => {
                    self.generate_slider_moves(from, piece, &BISHOP_DIRECTIONS, &mut moves);
                }
                PieceType::ROOK => {
                    self.generate_slider_moves(from, piece, &ROOK_DIRECTIONS, &mut moves);
                }
                PieceType::QUEEN => {
                    self.generate_slider_moves(from, piece, &BISHOP_DIRECTIONS, &mut moves);
                    self.generate_slider_moves(from, piece, &ROOK_DIRECTIONS, &mut moves);
                }
                _ => {
                    self.generate_leaper_moves(from, piece, &KING_OFFSETS, &mut moves);
                    self.generate_castling_moves(from, piece, &mut moves);
                }
            }
        }

        moves
    }

    /// Generates pushes, double pushes, captures, en passant and promotions
    /// for the pawn on `from`.
    fn generate_pawn_moves(&self, from: Square, piece: Piece, moves: &mut Moves) {
        let us = self.side_to_move();
        let (direction, start_rank, promotion_rank) = if us == Side::WHITE {
            (1, Rank::R2, Rank::R7)
        } else {
            (-1, Rank::R7, Rank::R2)
        };

        if let Some(forward) = from.try_offset(0, direction) {
            if self.piece_at(forward).is_none() {
                if from.rank_of() == promotion_rank {
                    self.push_promotions(from, forward, piece, Piece::NONE, moves);
                } else {
                    moves.push(Move::quiet(from, forward, piece));

                    if from.rank_of() == start_rank {
                        // the single-push square is empty, so only the
                        // landing square needs checking
                        let double = Square::new(
                            (from.inner() as i8 + 16 * direction) as u8,
                        );
                        if self.piece_at(double).is_none() {
                            moves.push(Move::new(
                                from,
                                double,
                                piece,
                                Piece::NONE,
                                Piece::NONE,
                                MoveFlags::DOUBLE_PAWN_PUSH,
                            ));
                        }
                    }
                }
            }
        }

        for file_delta in [-1, 1] {
            let Some(target) = from.try_offset(file_delta, direction) else {
                continue;
            };
            let victim = self.piece_at(target);

            if victim.is_side(us.flip()) {
                if from.rank_of() == promotion_rank {
                    self.push_promotions(from, target, piece, victim, moves);
                } else {
                    moves.push(Move::capture(from, target, piece, victim));
                }
            }

            if self.ep_square() == Some(target) {
                let enemy_pawn = if us == Side::WHITE {
                    Piece::BPAWN
                } else {
                    Piece::WPAWN
                };
                moves.push(Move::new(
                    from,
                    target,
                    piece,
                    enemy_pawn,
                    Piece::NONE,
                    MoveFlags::EN_PASSANT | MoveFlags::CAPTURE,
                ));
            }
        }
    }

    /// Pushes the four promotion moves from `from` to `to`.
    fn push_promotions(
        &self,
        from: Square,
        to: Square,
        piece: Piece,
        victim: Piece,
        moves: &mut Moves,
    ) {
        let us = self.side_to_move();
        let flags = if victim.is_none() {
            MoveFlags::PROMOTION
        } else {
            MoveFlags::PROMOTION | MoveFlags::CAPTURE
        };

        for promotion_type in [
            PieceType::QUEEN,
            PieceType::ROOK,
            PieceType::BISHOP,
            PieceType::KNIGHT,
        ] {
            moves.push(Move::new(
                from,
                to,
                piece,
                victim,
                Piece::from_parts(us, promotion_type),
                flags,
            ));
        }
    }

    /// Generates the moves of a knight or king on `from`.
    fn generate_leaper_moves(
        &self,
        from: Square,
        piece: Piece,
        offsets: &[(i8, i8); 8],
        moves: &mut Moves,
    ) {
        let us = self.side_to_move();

        for &(file_delta, rank_delta) in offsets {
            let Some(target) = from.try_offset(file_delta, rank_delta) else {
                continue;
            };
            let victim = self.piece_at(target);
            if victim.is_none() {
                moves.push(Move::quiet(from, target, piece));
            } else if victim.is_side(us.flip()) {
                moves.push(Move::capture(from, target, piece, victim));
            }
        }
    }

    /// Generates the moves of a sliding piece on `from`, walking each ray
    /// until it hits the edge, a friend, or a foe.
    fn generate_slider_moves(
        &self,
        from: Square,
        piece: Piece,
        directions: &[(i8, i8); 4],
        moves: &mut Moves,
    ) {
        let us = self.side_to_move();

        for &(file_delta, rank_delta) in directions {
            let mut current = from;
            while let Some(target) = current.try_offset(file_delta, rank_delta) {
                let victim = self.piece_at(target);
                if victim.is_none() {
                    moves.push(Move::quiet(from, target, piece));
                } else {
                    if victim.is_side(us.flip()) {
                        moves.push(Move::capture(from, target, piece, victim));
                    }
                    break;
                }
                current = target;
            }
        }
    }

    /// Generates castling for the king on `from`.
    ///
    /// The castling-rights invariant guarantees the king and rook are on
    /// their home squares whenever a right is set, so only emptiness and
    /// attacks on the king's path need checking here.
    fn generate_castling_moves(&self, from: Square, piece: Piece, moves: &mut Moves) {
        let us = self.side_to_move();
        let them = us.flip();
        let (king_side, queen_side, home_rank) = if us == Side::WHITE {
            (
                CastlingRights::WHITE_KING_SIDE,
                CastlingRights::WHITE_QUEEN_SIDE,
                Rank::R1,
            )
        } else {
            (
                CastlingRights::BLACK_KING_SIDE,
                CastlingRights::BLACK_QUEEN_SIDE,
                Rank::R8,
            )
        };
        let at = |file| Square::from_coords(file, home_rank);

        if self.castling_rights().contains(king_side)
            && self.piece_at(at(File::F)).is_none()
            && self.piece_at(at(File::G)).is_none()
            && !self.is_square_attacked(at(File::E), them)
            && !self.is_square_attacked(at(File::F), them)
            && !self.is_square_attacked(at(File::G), them)
        {
            moves.push(Move::new(
                from,
                at(File::G),
                piece,
                Piece::NONE,
                Piece::NONE,
                MoveFlags::CASTLE_KING_SIDE,
            ));
        }

        if self.castling_rights().contains(queen_side)
            && self.piece_at(at(File::D)).is_none()
            && self.piece_at(at(File::C)).is_none()
            && self.piece_at(at(File::B)).is_none()
            && !self.is_square_attacked(at(File::E), them)
            && !self.is_square_attacked(at(File::D), them)
            && !self.is_square_attacked(at(File::C), them)
        {
            moves.push(Move::new(
                from,
                at(File::C),
                piece,
                Piece::NONE,
                Piece::NONE,
                MoveFlags::CASTLE_QUEEN_SIDE,
            ));
        }
    }

    /// Checks if `square` is attacked by any piece of `by`.
    pub fn is_square_attacked(&self, square: Square, by: Side) -> bool {
        // a pawn of `by` attacks `square` if it sits one rank towards `by`'s
        // side, one file to either side
        let pawn_rank_delta = if by == Side::WHITE { -1 } else { 1 };
        let enemy_pawn = if by == Side::WHITE {
            Piece::WPAWN
        } else {
            Piece::BPAWN
        };
        for file_delta in [-1, 1] {
            if let Some(from) = square.try_offset(file_delta, pawn_rank_delta) {
                if self.piece_at(from) == enemy_pawn {
                    return true;
                }
            }
        }

        let knight = Piece::from_parts(by, PieceType::KNIGHT);
        for &(file_delta, rank_delta) in &KNIGHT_OFFSETS {
            if let Some(from) = square.try_offset(file_delta, rank_delta) {
                if self.piece_at(from) == knight {
                    return true;
                }
            }
        }

        let king = Piece::from_parts(by, PieceType::KING);
        for &(file_delta, rank_delta) in &KING_OFFSETS {
            if let Some(from) = square.try_offset(file_delta, rank_delta) {
                if self.piece_at(from) == king {
                    return true;
                }
            }
        }

        let bishop = Piece::from_parts(by, PieceType::BISHOP);
        let rook = Piece::from_parts(by, PieceType::ROOK);
        let queen = Piece::from_parts(by, PieceType::QUEEN);

        for &(file_delta, rank_delta) in &BISHOP_DIRECTIONS {
            let mut current = square;
            while let Some(from) = current.try_offset(file_delta, rank_delta) {
                let piece = self.piece_at(from);
                if !piece.is_none() {
                    if piece == bishop || piece == queen {
                        return true;
                    }
                    break;
                }
                current = from;
            }
        }

        for &(file_delta, rank_delta) in &ROOK_DIRECTIONS {
            let mut current = square;
            while let Some(from) = current.try_offset(file_delta, rank_delta) {
                let piece = self.piece_at(from);
                if !piece.is_none() {
                    if piece == rook || piece == queen {
                        return true;
                    }
                    break;
                }
                current = from;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::{Move, MoveFlags};
    use crate::board::Board;
    use crate::defs::{Piece, Side, Square};

    #[test]
    fn startpos_has_twenty_moves() {
        let mut board = Board::startpos();
        assert_eq!(board.generate_legal_moves().len(), 20);
    }

    #[test]
    fn no_legal_move_leaves_own_king_in_check() {
        let mut board: Board = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap();
        let mover = board.side_to_move();
        for mv in board.generate_legal_moves() {
            board.make_move(mv);
            assert!(!board.is_in_check(mover), "{mv} leaves the king in check");
            board.undo_move();
        }
    }

    #[test]
    fn castling_is_blocked_through_attacked_squares() {
        // the rook on g8 covers g1, so O-O is out but O-O-O is fine
        let mut board: Board = "r3k1r1/8/8/8/8/8/8/R3K2R w KQq - 0 1".parse().unwrap();
        let moves: Vec<String> = board
            .generate_legal_moves()
            .iter()
            .map(Move::to_string)
            .collect();
        assert!(!moves.contains(&"e1g1".to_string()));
        assert!(moves.contains(&"e1c1".to_string()));
    }

    #[test]
    fn en_passant_is_generated() {
        let mut board: Board = "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3"
            .parse()
            .unwrap();
        let ep = board
            .generate_legal_moves()
            .into_iter()
            .find(|mv| mv.to_string() == "e5d6")
            .expect("en passant capture should be generated");
        assert!(ep.is_en_passant());
        assert!(ep.is_capture());
        assert_eq!(ep.captured, Piece::BPAWN);
    }

    #[test]
    fn pinned_en_passant_is_rejected() {
        // capturing en passant would clear rank 5 and expose the king on a5
        // to the rook on d5
        let mut board: Board = "4k3/8/8/KPpr4/8/8/8/8 w - c6 0 1".parse().unwrap();
        assert!(!board
            .generate_legal_moves()
            .iter()
            .any(|mv| mv.to_string() == "b5c6"));
    }

    #[test]
    fn promotions_come_in_fours() {
        let mut board: Board = "4k3/P7/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let promotions: Vec<Move> = board
            .generate_legal_moves()
            .into_iter()
            .filter(|mv| mv.is_promotion())
            .collect();
        assert_eq!(promotions.len(), 4);
        assert!(promotions.iter().all(|mv| mv.to == Square::A8));
        assert!(promotions
            .iter()
            .any(|mv| mv.promotion == Piece::WQUEEN && mv.to_string() == "a7a8q"));
    }

    #[test]
    fn attack_detection_sees_every_piece_type() {
        let board: Board = "4k3/8/2n5/8/8/1b6/3p4/q3K3 w - - 0 1".parse().unwrap();
        // the queen on a1 covers d1 along the rank, the bishop on b3 covers
        // c4, the knight on c6 covers e5, the pawn on d2 covers c1, and the
        // king on e8 covers d7; h5 is covered by nothing
        assert!(board.is_square_attacked(Square::D1, Side::BLACK));
        assert!(board.is_square_attacked(Square::new(26), Side::BLACK));
        assert!(board.is_square_attacked(Square::new(36), Side::BLACK));
        assert!(board.is_square_attacked(Square::C1, Side::BLACK));
        assert!(board.is_square_attacked(Square::new(51), Side::BLACK));
        assert!(!board.is_square_attacked(Square::new(39), Side::BLACK));
    }

    #[test]
    fn null_move_sentinel_is_zero() {
        assert!(Move::NULL.is_null());
        assert_eq!(Move::NULL.from, Square::A1);
        assert_eq!(Move::NULL.to, Square::A1);
        assert_eq!(Move::NULL.flags, MoveFlags::NONE);
    }
}
