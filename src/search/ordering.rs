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

//! Move ordering: the transposition-table move first, then captures by
//! MVV-LVA, then promotions, killers and history.

use arrayvec::ArrayVec;

use super::Searcher;
use crate::board::movegen::{Move, Moves, MAX_LEGAL_MOVES};
use crate::defs::Side;
use crate::evaluation::{piece_value, Eval};

/// The score of the move the transposition table suggests.
const TT_MOVE_SCORE: Eval = 1_000_000;
/// The base score of a capture; MVV-LVA differentiates within the band.
const CAPTURE_SCORE: Eval = 900_000;
/// The base score of a quiet promotion.
const QUIET_PROMOTION_SCORE: Eval = 850_000;
/// The score of the primary killer at this ply.
const PRIMARY_KILLER_SCORE: Eval = 800_000;
/// The score of the secondary killer at this ply.
const SECONDARY_KILLER_SCORE: Eval = 795_000;

/// A [`Move`] paired with its ordering score.
#[derive(Clone, Copy)]
struct ScoredMove {
    /// The ordering score. Not an evaluation; only the order matters.
    score: Eval,
    /// The move itself.
    mv: Move,
}

/// Most valuable victim, least valuable attacker: prefer taking big pieces
/// with small ones.
fn mvv_lva(mv: Move) -> Eval {
    piece_value(mv.captured) * 10 - piece_value(mv.moving)
}

impl Searcher {
    /// Reorders `moves` from most to least promising.
    ///
    /// The sort is stable, so equally scored moves keep their generation
    /// order.
    pub(super) fn order_moves(&self, tt_move: Move, ply: i32, side: Side, moves: &mut Moves) {
        let killers = self
            .killers
            .get(ply as usize)
            .copied()
            .unwrap_or([Move::NULL; 2]);

        let mut scored: ArrayVec<ScoredMove, MAX_LEGAL_MOVES> = moves
            .iter()
            .map(|&mv| ScoredMove {
                score: self.score_move(mv, tt_move, killers, side),
                mv,
            })
            .collect();

        scored.sort_by(|lhs, rhs| rhs.score.cmp(&lhs.score));

        moves.clear();
        moves.extend(scored.into_iter().map(|scored_move| scored_move.mv));
    }

    /// Scores a single move for ordering.
    fn score_move(&self, mv: Move, tt_move: Move, killers: [Move; 2], side: Side) -> Eval {
        if mv == tt_move {
            TT_MOVE_SCORE
        } else if mv.is_capture() {
            let promotion_bonus = if mv.is_promotion() {
                piece_value(mv.promotion)
            } else {
                0
            };
            CAPTURE_SCORE + mvv_lva(mv) + promotion_bonus
        } else if mv.is_promotion() {
            QUIET_PROMOTION_SCORE + piece_value(mv.promotion)
        } else if mv == killers[0] {
            PRIMARY_KILLER_SCORE
        } else if mv == killers[1] {
            SECONDARY_KILLER_SCORE
        } else {
            self.history[side.to_index()][mv.from.to_index()][mv.to.to_index()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::Searcher;
    use crate::board::movegen::Move;
    use crate::board::Board;
    use crate::defs::Side;

    #[test]
    fn tt_move_comes_first_and_captures_beat_quiets() {
        // a position with a hanging queen: exd5 exists among many quiets
        let mut board: Board = "rnb1kbnr/ppp1pppp/8/3q4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 3"
            .parse()
            .unwrap();
        let mut moves = board.generate_legal_moves();
        let searcher = Searcher::new();

        let tt_move = moves
            .iter()
            .copied()
            .find(|mv| mv.to_string() == "g1f3")
            .unwrap();

        searcher.order_moves(tt_move, 0, Side::WHITE, &mut moves);

        assert_eq!(moves[0], tt_move);
        assert_eq!(moves[1].to_string(), "e4d5", "the queen capture goes next");
    }

    #[test]
    fn better_victims_are_tried_before_worse_ones() {
        // the knight on d4 can take the queen on b5 or the pawn on f5
        let mut board: Board = "4k3/8/8/1q3p2/3N4/8/8/4K3 w - - 0 1".parse().unwrap();
        let mut moves = board.generate_legal_moves();
        let searcher = Searcher::new();

        searcher.order_moves(Move::NULL, 0, Side::WHITE, &mut moves);

        let queen_take = moves.iter().position(|mv| mv.to_string() == "d4b5").unwrap();
        let pawn_take = moves.iter().position(|mv| mv.to_string() == "d4f5").unwrap();
        assert!(queen_take < pawn_take);
    }

    #[test]
    fn killers_outrank_plain_quiets() {
        let mut board = Board::startpos();
        let mut searcher = Searcher::new();

        let killer = board
            .generate_legal_moves()
            .into_iter()
            .find(|mv| mv.to_string() == "b1c3")
            .unwrap();
        searcher.reward_quiet_cutoff(killer, 0, Side::WHITE, 2);

        let mut moves = board.generate_legal_moves();
        searcher.order_moves(Move::NULL, 0, Side::WHITE, &mut moves);
        assert_eq!(moves[0], killer);
    }
}
