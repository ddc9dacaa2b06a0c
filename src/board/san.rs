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

//! Standard algebraic notation: rendering a move in the position it is about
//! to be played in, with disambiguation and check/mate suffixes.

use super::movegen::Move;
use super::Board;
use crate::defs::{File, Piece, PieceType};

/// The SAN letter of a piece, or an empty string for pawns.
const fn piece_letter(piece: Piece) -> &'static str {
    match piece.piece_type() {
        PieceType::KNIGHT => "N",
        PieceType::BISHOP => "B",
        PieceType::ROOK => "R",
        PieceType::QUEEN => "Q",
        PieceType::KING => "K",
        _ => "",
    }
}

impl Board {
    /// Renders `mv` in standard algebraic notation.
    ///
    /// `self` must be the position *before* the move is played. `mv` must be
    /// legal in that position.
    pub fn san(&self, mv: Move) -> String {
        if mv.is_castle() {
            let san = if mv.to.file_of() == File::G {
                "O-O"
            } else {
                "O-O-O"
            };
            return format!("{san}{}", self.check_suffix(mv));
        }

        let is_pawn = mv.moving.is_pawn();
        let mut san = String::with_capacity(8);

        san.push_str(piece_letter(mv.moving));

        if !is_pawn {
            san.push_str(&self.disambiguation(mv));
        }

        if mv.is_capture() {
            if is_pawn {
                san.push((b'a' + mv.from.file_of().inner()) as char);
            }
            san.push('x');
        }

        san.push_str(&mv.to.to_string());

        if mv.is_promotion() {
            san.push('=');
            san.push_str(piece_letter(mv.promotion));
        }

        san.push_str(self.check_suffix(mv));
        san
    }

    /// Works out which part of the origin square is needed to tell `mv`
    /// apart from other legal moves of the same piece to the same square:
    /// nothing, the file, the rank, or both.
    fn disambiguation(&self, mv: Move) -> String {
        let mut copy = self.clone();
        let competitors: Vec<Move> = copy
            .generate_legal_moves()
            .into_iter()
            .filter(|other| {
                other.to == mv.to && other.from != mv.from && other.moving == mv.moving
            })
            .collect();

        if competitors.is_empty() {
            return String::new();
        }

        let from_file = mv.from.file_of();
        let from_rank = mv.from.rank_of();
        let file_unique = competitors.iter().all(|other| other.from.file_of() != from_file);
        let rank_unique = competitors.iter().all(|other| other.from.rank_of() != from_rank);

        let file_char = (b'a' + from_file.inner()) as char;
        let rank_char = (b'1' + from_rank.inner()) as char;

        if file_unique {
            file_char.to_string()
        } else if rank_unique {
            rank_char.to_string()
        } else {
            format!("{file_char}{rank_char}")
        }
    }

    /// Returns `"#"` if `mv` mates, `"+"` if it merely checks, and `""`
    /// otherwise. Plays the move on a copy to find out.
    fn check_suffix(&self, mv: Move) -> &'static str {
        let mut copy = self.clone();
        copy.make_move(mv);

        if !copy.is_in_check(copy.side_to_move()) {
            return "";
        }
        if copy.generate_legal_moves().is_empty() {
            "#"
        } else {
            "+"
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::board::Board;

    /// Renders the move with the given UCI string from `fen`.
    fn san_of(fen: &str, uci: &str) -> String {
        let mut board: Board = fen.parse().unwrap();
        let mv = board
            .generate_legal_moves()
            .into_iter()
            .find(|mv| mv.to_string() == uci)
            .unwrap_or_else(|| panic!("{uci} is not legal in {fen}"));
        board.san(mv)
    }

    #[test]
    fn pawn_pushes() {
        let board = Board::startpos();
        assert_eq!(san_of(&board.to_fen(), "e2e4"), "e4");
    }

    #[test]
    fn knight_development() {
        assert_eq!(
            san_of(
                "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2",
                "g1f3"
            ),
            "Nf3"
        );
    }

    #[test]
    fn castling_both_ways() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        assert_eq!(san_of(fen, "e1g1"), "O-O");
        assert_eq!(san_of(fen, "e1c1"), "O-O-O");
    }

    #[test]
    fn pawn_captures_keep_their_file() {
        assert_eq!(
            san_of(
                "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2",
                "e4d5"
            ),
            "exd5"
        );
    }

    #[test]
    fn file_disambiguation_wins() {
        // knights on a1 and c1 can both reach b3
        assert_eq!(san_of("4k3/8/8/8/8/8/8/N1N1K3 w - - 0 1", "a1b3"), "Nab3");
    }

    #[test]
    fn rank_disambiguation_when_files_collide() {
        // knights on a1 and a5 can both reach b3
        assert_eq!(san_of("4k3/8/8/N7/8/8/8/N3K3 w - - 0 1", "a1b3"), "N1b3");
    }

    #[test]
    fn check_and_mate_suffixes() {
        // the back-rank rook lift is mate thanks to the pawn shield
        assert_eq!(san_of("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1", "a1a8"), "Ra8#");
        // the same idea without the mate is just a check
        assert_eq!(san_of("4k3/8/8/8/8/8/8/Q3K3 w - - 0 1", "a1a8"), "Qa8+");
    }

    #[test]
    fn promotion_with_check() {
        assert_eq!(san_of("4k3/P7/8/8/8/8/8/4K3 w - - 0 1", "a7a8q"), "a8=Q+");
    }
}
