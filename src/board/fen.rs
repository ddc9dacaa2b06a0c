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

//! Forsyth-Edwards notation: [`Board`] from and to the six-field string.

use std::str::FromStr;

use thiserror::Error;

use super::{Board, BoardState, CastlingRights};
use crate::defs::{File, Piece, Rank, Side, Square};

/// The ways a FEN string can be malformed.
///
/// A failed parse never replaces an existing [`Board`]: the caller keeps
/// whatever position it had.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum FenError {
    /// The string is empty.
    #[error("FEN string is missing the piece placement field")]
    MissingPlacement,
    /// The placement field does not have 8 ranks.
    #[error("piece placement has {0} ranks, expected 8")]
    BadRankCount(usize),
    /// A rank of the placement field does not describe 8 files.
    #[error("rank {0} of the piece placement does not have 8 files")]
    BadRankWidth(u8),
    /// A character in the placement field is not a piece or a digit.
    #[error("'{0}' is not a piece or an empty-square count")]
    BadPiece(char),
    /// The side-to-move field is not `w` or `b`.
    #[error("side to move is \"{0}\", expected \"w\" or \"b\"")]
    BadSideToMove(String),
    /// A character in the castling field is not in `KQkq-`.
    #[error("'{0}' is not a castling right")]
    BadCastling(char),
    /// The en passant field is not `-` or a square on rank 3 or 6.
    #[error("\"{0}\" is not a valid en passant target")]
    BadEnPassant(String),
    /// The halfmove clock is not a number.
    #[error("\"{0}\" is not a valid halfmove clock")]
    BadHalfmoveClock(String),
    /// The fullmove number is not a number.
    #[error("\"{0}\" is not a valid fullmove number")]
    BadFullmoveNumber(String),
    /// A side has no king or more than one.
    #[error("{side} has {count} kings, expected exactly 1")]
    BadKingCount {
        /// `"White"` or `"Black"`.
        side: &'static str,
        /// How many kings the placement contains for that side.
        count: usize,
    },
    /// The side that just moved left its own king in check.
    #[error("the waiting side's king is in check")]
    WaitingSideInCheck,
}

impl FromStr for Board {
    type Err = FenError;

    /// Parses a six-field FEN string.
    ///
    /// The placement field is mandatory; the remaining fields may be omitted
    /// from the right and default to White to move, all castling rights, no
    /// en passant target and clocks of 0 and 1. Fields that are present must
    /// be well formed. Castling rights whose king or rook is not on its home
    /// square are dropped silently, so a successfully parsed board always
    /// satisfies the castling invariant.
    fn from_str(fen: &str) -> Result<Self, Self::Err> {
        let mut fields = fen.split_whitespace();

        let placement = fields.next().ok_or(FenError::MissingPlacement)?;
        let squares = parse_placement(placement)?;

        let side_to_move = match fields.next() {
            None | Some("w") => Side::WHITE,
            Some("b") => Side::BLACK,
            Some(other) => return Err(FenError::BadSideToMove(other.to_string())),
        };

        let mut castling_rights = match fields.next() {
            None => CastlingRights::ALL,
            Some(castling) => parse_castling(castling)?,
        };
        mask_inconsistent_rights(&squares, &mut castling_rights);

        let ep_square = match fields.next() {
            None | Some("-") => None,
            Some(ep) => {
                let square =
                    Square::from_string(ep).ok_or_else(|| FenError::BadEnPassant(ep.to_string()))?;
                if square.rank_of() != Rank::R3 && square.rank_of() != Rank::R6 {
                    return Err(FenError::BadEnPassant(ep.to_string()));
                }
                Some(square)
            }
        };

        let halfmove_clock = match fields.next() {
            None => 0,
            Some(clock) => clock
                .parse()
                .map_err(|_| FenError::BadHalfmoveClock(clock.to_string()))?,
        };

        let fullmove_number = match fields.next() {
            None => 1,
            Some(number) => number
                .parse()
                .map_err(|_| FenError::BadFullmoveNumber(number.to_string()))?,
        };

        let mut board = Self {
            squares,
            state: BoardState {
                side_to_move,
                castling_rights,
                ep_square,
                halfmove_clock,
                fullmove_number,
            },
            key: 0,
            undo_stack: Vec::new(),
        };
        board.refresh_key();

        if board.is_in_check(side_to_move.flip()) {
            return Err(FenError::WaitingSideInCheck);
        }

        Ok(board)
    }
}

impl Board {
    /// Produces the canonical six-field FEN of the current position.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);

        for rank in (0..8).rev() {
            let mut empty_count = 0;
            for file in 0..8 {
                let piece = self.piece_at(Square::from_coords(File::new(file), Rank::new(rank)));
                if piece.is_none() {
                    empty_count += 1;
                } else {
                    if empty_count > 0 {
                        fen.push((b'0' + empty_count) as char);
                        empty_count = 0;
                    }
                    fen.push(piece.to_char());
                }
            }
            if empty_count > 0 {
                fen.push((b'0' + empty_count) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(if self.side_to_move() == Side::WHITE {
            'w'
        } else {
            'b'
        });

        fen.push(' ');
        let rights = self.castling_rights();
        if rights.is_empty() {
            fen.push('-');
        } else {
            for (right, letter) in [
                (CastlingRights::WHITE_KING_SIDE, 'K'),
                (CastlingRights::WHITE_QUEEN_SIDE, 'Q'),
                (CastlingRights::BLACK_KING_SIDE, 'k'),
                (CastlingRights::BLACK_QUEEN_SIDE, 'q'),
            ] {
                if rights.contains(right) {
                    fen.push(letter);
                }
            }
        }

        fen.push(' ');
        match self.ep_square() {
            None => fen.push('-'),
            Some(square) => fen.push_str(&square.to_string()),
        }

        fen.push(' ');
        fen.push_str(&self.halfmove_clock().to_string());
        fen.push(' ');
        fen.push_str(&self.fullmove_number().to_string());

        fen
    }
}

/// Parses the piece placement field into a square array.
fn parse_placement(placement: &str) -> Result<[Piece; Square::TOTAL], FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::BadRankCount(ranks.len()));
    }

    let mut squares = [Piece::NONE; Square::TOTAL];
    let mut white_kings = 0;
    let mut black_kings = 0;

    // the first segment of the field is rank 8
    for (segment, rank_chars) in ranks.iter().enumerate() {
        let rank = 7 - segment as u8;
        let mut file = 0u8;

        for symbol in rank_chars.chars() {
            if let Some(skip) = symbol.to_digit(10) {
                file += skip as u8;
                if file > 8 {
                    return Err(FenError::BadRankWidth(rank + 1));
                }
            } else {
                let piece = Piece::from_char(symbol).ok_or(FenError::BadPiece(symbol))?;
                if file >= 8 {
                    return Err(FenError::BadRankWidth(rank + 1));
                }
                match piece {
                    Piece::WKING => white_kings += 1,
                    Piece::BKING => black_kings += 1,
                    _ => (),
                }
                squares[Square::from_coords(File::new(file), Rank::new(rank)).to_index()] = piece;
                file += 1;
            }
        }

        if file != 8 {
            return Err(FenError::BadRankWidth(rank + 1));
        }
    }

    if white_kings != 1 {
        return Err(FenError::BadKingCount {
            side: "White",
            count: white_kings,
        });
    }
    if black_kings != 1 {
        return Err(FenError::BadKingCount {
            side: "Black",
            count: black_kings,
        });
    }

    Ok(squares)
}

/// Parses the castling rights field.
fn parse_castling(castling: &str) -> Result<CastlingRights, FenError> {
    let mut rights = CastlingRights::NONE;
    for symbol in castling.chars() {
        match symbol {
            'K' => rights.add(CastlingRights::WHITE_KING_SIDE),
            'Q' => rights.add(CastlingRights::WHITE_QUEEN_SIDE),
            'k' => rights.add(CastlingRights::BLACK_KING_SIDE),
            'q' => rights.add(CastlingRights::BLACK_QUEEN_SIDE),
            '-' => (),
            _ => return Err(FenError::BadCastling(symbol)),
        }
    }
    Ok(rights)
}

/// Drops any right whose king or rook is no longer on its home square.
fn mask_inconsistent_rights(squares: &[Piece; Square::TOTAL], rights: &mut CastlingRights) {
    let piece = |square: Square| squares[square.to_index()];

    if piece(Square::E1) != Piece::WKING {
        rights.remove(CastlingRights::WHITE_KING_SIDE);
        rights.remove(CastlingRights::WHITE_QUEEN_SIDE);
    }
    if piece(Square::H1) != Piece::WROOK {
        rights.remove(CastlingRights::WHITE_KING_SIDE);
    }
    if piece(Square::A1) != Piece::WROOK {
        rights.remove(CastlingRights::WHITE_QUEEN_SIDE);
    }
    if piece(Square::E8) != Piece::BKING {
        rights.remove(CastlingRights::BLACK_KING_SIDE);
        rights.remove(CastlingRights::BLACK_QUEEN_SIDE);
    }
    if piece(Square::H8) != Piece::BROOK {
        rights.remove(CastlingRights::BLACK_KING_SIDE);
    }
    if piece(Square::A8) != Piece::BROOK {
        rights.remove(CastlingRights::BLACK_QUEEN_SIDE);
    }
}

#[cfg(test)]
mod tests {
    use super::FenError;
    use crate::board::{Board, CastlingRights, START_FEN};
    use crate::defs::{Side, Square};

    #[test]
    fn startpos_round_trips() {
        let board: Board = START_FEN.parse().unwrap();
        assert_eq!(board.to_fen(), START_FEN);
        assert_eq!(board.side_to_move(), Side::WHITE);
        assert!(board.castling_rights().contains(CastlingRights::ALL));
        assert_eq!(board.ep_square(), None);
    }

    #[test]
    fn kiwipete_round_trips() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let board: Board = fen.parse().unwrap();
        assert_eq!(board.to_fen(), fen);
    }

    #[test]
    fn ep_target_round_trips() {
        let fen = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2";
        let board: Board = fen.parse().unwrap();
        assert_eq!(board.ep_square(), Some(Square::new(44)));
        assert_eq!(board.to_fen(), fen);
    }

    #[test]
    fn missing_fields_get_defaults() {
        let board: Board = "k7/8/8/8/8/8/8/K7 w".parse().unwrap();
        assert_eq!(board.to_fen(), "k7/8/8/8/8/8/8/K7 w - - 0 1");
    }

    #[test]
    fn inconsistent_castling_rights_are_dropped() {
        // the white king is on d1, so White cannot castle at all
        let board: Board = "r3k2r/8/8/8/8/8/8/R2K3R w KQkq - 0 1".parse().unwrap();
        assert!(!board
            .castling_rights()
            .contains(CastlingRights::WHITE_KING_SIDE));
        assert!(!board
            .castling_rights()
            .contains(CastlingRights::WHITE_QUEEN_SIDE));
        assert!(board
            .castling_rights()
            .contains(CastlingRights::BLACK_KING_SIDE));
    }

    #[test]
    fn malformed_fens_are_rejected() {
        assert_eq!("".parse::<Board>(), Err(FenError::MissingPlacement));
        assert_eq!(
            "8/8/8/8/8/8/8 w - - 0 1".parse::<Board>(),
            Err(FenError::BadRankCount(7))
        );
        assert_eq!(
            "9/8/8/8/8/8/k7/K7 w - - 0 1".parse::<Board>(),
            Err(FenError::BadRankWidth(8))
        );
        assert_eq!(
            "x7/8/8/8/8/8/k7/K7 w - - 0 1".parse::<Board>(),
            Err(FenError::BadPiece('x'))
        );
        assert_eq!(
            "k7/8/8/8/8/8/8/K7 x - - 0 1".parse::<Board>(),
            Err(FenError::BadSideToMove("x".to_string()))
        );
        assert_eq!(
            "k7/8/8/8/8/8/8/K7 w X - 0 1".parse::<Board>(),
            Err(FenError::BadCastling('X'))
        );
        assert_eq!(
            "k7/8/8/8/8/8/8/K7 w - e5 0 1".parse::<Board>(),
            Err(FenError::BadEnPassant("e5".to_string()))
        );
        assert_eq!(
            "k7/8/8/8/8/8/8/K7 w - - x 1".parse::<Board>(),
            Err(FenError::BadHalfmoveClock("x".to_string()))
        );
        assert_eq!(
            "k7/8/8/8/8/8/8/K7 w - - 0 x".parse::<Board>(),
            Err(FenError::BadFullmoveNumber("x".to_string()))
        );
        assert_eq!(
            "8/8/8/8/8/8/8/K7 w - - 0 1".parse::<Board>(),
            Err(FenError::BadKingCount {
                side: "Black",
                count: 0
            })
        );
        assert_eq!(
            "kk6/8/8/8/8/8/8/K7 w - - 0 1".parse::<Board>(),
            Err(FenError::BadKingCount {
                side: "Black",
                count: 2
            })
        );
        // White to move, but Black's king is already attacked
        assert_eq!(
            "4k3/4R3/8/8/8/8/8/4K3 w - - 0 1".parse::<Board>(),
            Err(FenError::WaitingSideInCheck)
        );
    }
}
