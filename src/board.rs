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

//! The board: a 64-square mailbox, the irreversible state that travels with
//! it, and reversible make/unmake.

use std::fmt::{self, Display, Formatter};

use crate::defs::{File, Piece, Rank, Side, Square};
use self::movegen::Move;
use self::zobrist::Key;

/// FEN parsing and serialisation.
pub mod fen;
/// Move generation and attack detection.
pub mod movegen;
/// Standard algebraic notation.
pub mod san;
/// Zobrist hashing.
pub mod zobrist;

/// The FEN string of the standard start position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Stores castling rights, encoded as `KQkq` in the low four bits.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CastlingRights(u8);

/// The part of a position that a move cannot reconstruct: whose turn it is,
/// castling rights, the en passant target and the move clocks.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BoardState {
    /// The side to move.
    pub side_to_move: Side,
    /// The castling rights.
    pub castling_rights: CastlingRights,
    /// The square behind a pawn that has just double-pushed, if any.
    pub ep_square: Option<Square>,
    /// Plies since the last pawn move or capture.
    pub halfmove_clock: u32,
    /// Starts at 1 and increments after each Black move.
    pub fullmove_number: u32,
}

/// Everything needed to reverse one call to [`Board::make_move`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Undo {
    /// The state before the move.
    state: BoardState,
    /// The zobrist key before the move.
    key: Key,
    /// The captured piece, or [`Piece::NONE`].
    captured: Piece,
    /// The move itself. [`Move::NULL`] for a null move.
    mv: Move,
}

/// A chess position: piece placement, state, zobrist key and the stack of
/// undo frames since the last FEN load.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Board {
    /// The piece on each square.
    squares: [Piece; Square::TOTAL],
    /// The irreversible state.
    state: BoardState,
    /// The zobrist key of the current position.
    key: Key,
    /// One frame per ply played since the last FEN load.
    undo_stack: Vec<Undo>,
}

#[allow(missing_docs)]
impl CastlingRights {
    pub const WHITE_KING_SIDE: Self = Self(0b0001);
    pub const WHITE_QUEEN_SIDE: Self = Self(0b0010);
    pub const BLACK_KING_SIDE: Self = Self(0b0100);
    pub const BLACK_QUEEN_SIDE: Self = Self(0b1000);
    pub const ALL: Self = Self(0b1111);
    pub const NONE: Self = Self(0b0000);
}

impl CastlingRights {
    /// Checks if all rights in `rights` are present in `self`.
    pub const fn contains(self, rights: Self) -> bool {
        self.0 & rights.0 == rights.0
    }

    /// Adds the rights in `rights` to `self`.
    pub fn add(&mut self, rights: Self) {
        self.0 |= rights.0;
    }

    /// Removes the rights in `rights` from `self`. They do not have to be
    /// present.
    pub fn remove(&mut self, rights: Self) {
        self.0 &= !rights.0;
    }

    /// Checks if no rights are present.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the contents of `self` as a `usize`, for table lookups.
    pub const fn to_index(self) -> usize {
        self.0 as usize
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::startpos()
    }
}

impl Display for Board {
    /// Writes the board as an 8x8 grid with rank and file labels, followed by
    /// the FEN and the zobrist key.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} |", rank + 1)?;
            for file in 0..8 {
                let square = Square::from_coords(File::new(file), Rank::new(rank));
                let piece = self.piece_at(square);
                write!(f, " {}", if piece.is_none() { '.' } else { piece.to_char() })?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   ----------------")?;
        writeln!(f, "    a b c d e f g h")?;
        writeln!(f, "FEN: {}", self.to_fen())?;
        write!(f, "Key: {:#018x}", self.key())
    }
}

impl Board {
    /// Creates a new [`Board`] set to the standard start position.
    pub fn startpos() -> Self {
        START_FEN.parse().expect("the standard start position FEN parses")
    }

    /// Returns the piece on `square`.
    pub fn piece_at(&self, square: Square) -> Piece {
        self.squares[square.to_index()]
    }

    /// Places `piece` on `square`, overwriting whatever was there.
    ///
    /// This is a bulk-loading utility for setting up positions. It does not
    /// maintain the zobrist key; call [`refresh_key`](Board::refresh_key)
    /// when the position is complete. It must not be used mid-game.
    pub fn set_piece_at(&mut self, square: Square, piece: Piece) {
        self.squares[square.to_index()] = piece;
    }

    /// Returns the side to move.
    pub const fn side_to_move(&self) -> Side {
        self.state.side_to_move
    }

    /// Returns the castling rights.
    pub const fn castling_rights(&self) -> CastlingRights {
        self.state.castling_rights
    }

    /// Returns the en passant target square, if any.
    pub const fn ep_square(&self) -> Option<Square> {
        self.state.ep_square
    }

    /// Returns the halfmove clock: plies since the last pawn move or capture.
    pub const fn halfmove_clock(&self) -> u32 {
        self.state.halfmove_clock
    }

    /// Returns the fullmove number.
    pub const fn fullmove_number(&self) -> u32 {
        self.state.fullmove_number
    }

    /// Returns the zobrist key of the current position.
    pub const fn key(&self) -> Key {
        self.key
    }

    /// Returns how many plies have been played since the last FEN load.
    pub fn played_plies(&self) -> usize {
        self.undo_stack.len()
    }

    /// Finds the square of the king of `side`.
    ///
    /// A position loaded through FEN parsing always has exactly one king per
    /// side, so this only returns [`None`] on a board mid-bulk-load.
    pub fn king_square(&self, side: Side) -> Option<Square> {
        let king = if side == Side::WHITE {
            Piece::WKING
        } else {
            Piece::BKING
        };
        (0..64).map(Square::new).find(|&sq| self.piece_at(sq) == king)
    }

    /// Checks if the king of `side` is attacked.
    pub fn is_in_check(&self, side: Side) -> bool {
        self.king_square(side)
            .is_some_and(|king| self.is_square_attacked(king, side.flip()))
    }

    /// Applies `mv` to the board.
    ///
    /// `mv` must come from [`generate_legal_moves`](Board::generate_legal_moves)
    /// on the current position (or be a pseudo-legal move that is immediately
    /// unmade again); anything else is outside the contract.
    pub fn make_move(&mut self, mv: Move) {
        self.undo_stack.push(Undo {
            state: self.state,
            key: self.key,
            captured: mv.captured,
            mv,
        });

        let mover = self.state.side_to_move;

        if mover == Side::BLACK {
            self.state.fullmove_number += 1;
        }

        if mv.moving.is_pawn() || !mv.captured.is_none() {
            self.state.halfmove_clock = 0;
        } else {
            self.state.halfmove_clock += 1;
        }

        self.state.ep_square = None;

        if mv.is_en_passant() {
            // the captured pawn sits behind the target square
            let capture_square = if mover == Side::WHITE {
                Square::new(mv.to.inner() - 8)
            } else {
                Square::new(mv.to.inner() + 8)
            };
            self.squares[capture_square.to_index()] = Piece::NONE;
        }

        if mv.is_king_side_castle() {
            self.move_castling_rook(mover, File::H, File::F);
        } else if mv.is_queen_side_castle() {
            self.move_castling_rook(mover, File::A, File::D);
        }

        self.squares[mv.from.to_index()] = Piece::NONE;
        self.squares[mv.to.to_index()] = if mv.is_promotion() {
            mv.promotion
        } else {
            mv.moving
        };

        self.update_castling_rights(mv);

        if mv.is_double_pawn_push() {
            self.state.ep_square = Some(if mover == Side::WHITE {
                Square::new(mv.from.inner() + 8)
            } else {
                Square::new(mv.from.inner() - 8)
            });
        }

        self.state.side_to_move = mover.flip();

        self.refresh_key();
    }

    /// Reverses the most recent [`make_move`](Board::make_move).
    ///
    /// Does nothing if no move has been made since the last FEN load.
    pub fn undo_move(&mut self) {
        let Some(undo) = self.undo_stack.pop() else {
            return;
        };
        let mv = undo.mv;
        let mover = self.state.side_to_move.flip();

        if mv.is_king_side_castle() {
            self.unmove_castling_rook(mover, File::H, File::F);
        } else if mv.is_queen_side_castle() {
            self.unmove_castling_rook(mover, File::A, File::D);
        }

        self.squares[mv.from.to_index()] = mv.moving;

        if mv.is_en_passant() {
            self.squares[mv.to.to_index()] = Piece::NONE;
            let capture_square = if mover == Side::WHITE {
                Square::new(mv.to.inner() - 8)
            } else {
                Square::new(mv.to.inner() + 8)
            };
            self.squares[capture_square.to_index()] = undo.captured;
        } else {
            self.squares[mv.to.to_index()] = undo.captured;
        }

        self.state = undo.state;
        self.key = undo.key;
    }

    /// Passes the turn: flips the side to move and clears the en passant
    /// target, leaving everything else (including the move clocks) untouched.
    ///
    /// Must not be called while the side to move is in check. Reversed by
    /// [`undo_null_move`](Board::undo_null_move).
    pub fn make_null_move(&mut self) {
        self.undo_stack.push(Undo {
            state: self.state,
            key: self.key,
            captured: Piece::NONE,
            mv: Move::NULL,
        });

        self.state.ep_square = None;
        self.state.side_to_move = self.state.side_to_move.flip();
        self.refresh_key();
    }

    /// Reverses the most recent [`make_null_move`](Board::make_null_move).
    pub fn undo_null_move(&mut self) {
        let Some(undo) = self.undo_stack.pop() else {
            return;
        };
        self.state = undo.state;
        self.key = undo.key;
    }

    /// Moves the rook of `side` from `from_file` to `to_file` on the side's
    /// back rank, as part of castling.
    fn move_castling_rook(&mut self, side: Side, from_file: File, to_file: File) {
        let rank = if side == Side::WHITE { Rank::R1 } else { Rank::R8 };
        let from = Square::from_coords(from_file, rank);
        let to = Square::from_coords(to_file, rank);
        self.squares[to.to_index()] = self.squares[from.to_index()];
        self.squares[from.to_index()] = Piece::NONE;
    }

    /// Reverses [`move_castling_rook`](Board::move_castling_rook).
    fn unmove_castling_rook(&mut self, side: Side, from_file: File, to_file: File) {
        let rank = if side == Side::WHITE { Rank::R1 } else { Rank::R8 };
        let from = Square::from_coords(from_file, rank);
        let to = Square::from_coords(to_file, rank);
        self.squares[from.to_index()] = self.squares[to.to_index()];
        self.squares[to.to_index()] = Piece::NONE;
    }

    /// Removes whichever castling rights `mv` forfeits: both for a king move,
    /// one for a rook moving off (or being captured on) its home corner.
    fn update_castling_rights(&mut self, mv: Move) {
        match mv.moving {
            Piece::WKING => {
                self.state
                    .castling_rights
                    .remove(CastlingRights::WHITE_KING_SIDE);
                self.state
                    .castling_rights
                    .remove(CastlingRights::WHITE_QUEEN_SIDE);
            }
            Piece::BKING => {
                self.state
                    .castling_rights
                    .remove(CastlingRights::BLACK_KING_SIDE);
                self.state
                    .castling_rights
                    .remove(CastlingRights::BLACK_QUEEN_SIDE);
            }
            Piece::WROOK => {
                if mv.from == Square::A1 {
                    self.state
                        .castling_rights
                        .remove(CastlingRights::WHITE_QUEEN_SIDE);
                } else if mv.from == Square::H1 {
                    self.state
                        .castling_rights
                        .remove(CastlingRights::WHITE_KING_SIDE);
                }
            }
            Piece::BROOK => {
                if mv.from == Square::A8 {
                    self.state
                        .castling_rights
                        .remove(CastlingRights::BLACK_QUEEN_SIDE);
                } else if mv.from == Square::H8 {
                    self.state
                        .castling_rights
                        .remove(CastlingRights::BLACK_KING_SIDE);
                }
            }
            _ => (),
        }

        match mv.captured {
            Piece::WROOK => {
                if mv.to == Square::A1 {
                    self.state
                        .castling_rights
                        .remove(CastlingRights::WHITE_QUEEN_SIDE);
                } else if mv.to == Square::H1 {
                    self.state
                        .castling_rights
                        .remove(CastlingRights::WHITE_KING_SIDE);
                }
            }
            Piece::BROOK => {
                if mv.to == Square::A8 {
                    self.state
                        .castling_rights
                        .remove(CastlingRights::BLACK_QUEEN_SIDE);
                } else if mv.to == Square::H8 {
                    self.state
                        .castling_rights
                        .remove(CastlingRights::BLACK_KING_SIDE);
                }
            }
            _ => (),
        }
    }
}
