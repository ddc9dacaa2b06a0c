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

//! Static evaluation: tapered material, piece-square tables, pawn structure,
//! king safety and piece activity.

use std::ops::{Add, AddAssign, Neg, Sub};

use crate::board::Board;
use crate::defs::{File, Piece, PieceType, Rank, Side, Square};
use self::piece_square_tables::{
    BISHOP_PST, KING_ENDGAME_PST, KING_MIDGAME_PST, KNIGHT_PST, PAWN_PST, QUEEN_PST, ROOK_PST,
};

/// The piece-square tables.
pub mod piece_square_tables;

/// The result of an evaluation or a search, in centipawn-like units.
pub type Eval = i32;

/// The score of delivering checkmate right now.
///
/// Mate in N plies scores `MATE - N`, which still dwarfs any positional
/// evaluation.
pub const MATE: Eval = 30_000;

/// Scores at or beyond this magnitude are mate scores.
pub const MATE_THRESHOLD: Eval = MATE - 1024;

/// A sentinel outside any reachable score, used as the widest search window.
pub const INFINITY: Eval = i32::MAX / 16;

/// The score of a drawn position.
pub const DRAW: Eval = 0;

/// The phase value of a position with all minor and major pieces on the
/// board: 4 knights + 4 bishops + 4 rooks at 2 + 2 queens at 4.
pub const MAX_PHASE: i32 = 24;

/// A midgame/endgame score pair. Terms accumulate into one of these and the
/// pair is blended by game phase at the very end.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct Score {
    /// The midgame component.
    mg: i32,
    /// The endgame component.
    eg: i32,
}

impl Score {
    /// Creates a [`Score`] from its midgame and endgame components.
    const fn new(mg: i32, eg: i32) -> Self {
        Self { mg, eg }
    }

    /// Blends the two components: full `mg` at `MAX_PHASE`, full `eg` at 0.
    const fn taper(self, phase: i32) -> Eval {
        (self.mg * phase + self.eg * (MAX_PHASE - phase)) / MAX_PHASE
    }
}

impl Add for Score {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.mg + rhs.mg, self.eg + rhs.eg)
    }
}

impl AddAssign for Score {
    fn add_assign(&mut self, rhs: Self) {
        self.mg += rhs.mg;
        self.eg += rhs.eg;
    }
}

impl Sub for Score {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.mg - rhs.mg, self.eg - rhs.eg)
    }
}

impl Neg for Score {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.mg, -self.eg)
    }
}

/// Penalty per extra pawn stacked on a file.
const DOUBLED_PAWN: Score = Score::new(-12, -18);
/// Penalty for a pawn with no friends on the neighbouring files.
const ISOLATED_PAWN: Score = Score::new(-14, -8);
/// Penalty for a pawn that cannot advance safely and cannot be defended by
/// its neighbours.
const BACKWARD_PAWN: Score = Score::new(-10, -6);
/// Bonus for a passed pawn, by its relative rank.
const PASSED_PAWN: [Score; 8] = [
    Score::new(0, 0),
    Score::new(5, 10),
    Score::new(10, 20),
    Score::new(20, 35),
    Score::new(35, 60),
    Score::new(60, 100),
    Score::new(100, 150),
    Score::new(0, 0),
];

/// Penalty per missing pawn-shield file in front of the king.
const MISSING_SHIELD_FILE: Score = Score::new(-18, 0);
/// Penalty for a fully open file next to the king.
const OPEN_FILE_NEAR_KING: Score = Score::new(-22, 0);
/// Penalty for a file next to the king with no friendly pawn on it.
const SEMI_OPEN_FILE_NEAR_KING: Score = Score::new(-12, 0);
/// Bonus for a king tucked into a castled corner.
const CASTLED_KING: Score = Score::new(30, 0);
/// Penalty for a king still on its starting square in the middlegame.
const UNCASTLED_KING: Score = Score::new(-25, 0);
/// Penalties for enemy pieces loitering within two king steps, by type.
const NEARBY_MINOR: Score = Score::new(-8, 0);
/// See [`NEARBY_MINOR`].
const NEARBY_ROOK: Score = Score::new(-12, 0);
/// See [`NEARBY_MINOR`].
const NEARBY_QUEEN: Score = Score::new(-20, 0);

/// Bonus for a minor piece that has left its back rank.
const DEVELOPED_MINOR: Score = Score::new(8, 0);
/// Bonus for a knight in the extended centre.
const CENTRAL_KNIGHT: Score = Score::new(6, 4);
/// Penalty for a knight on the rim.
const EDGE_KNIGHT: Score = Score::new(-10, -6);
/// Bonus for a rook on a file with no pawns at all.
const ROOK_ON_OPEN_FILE: Score = Score::new(20, 10);
/// Bonus for a rook on a file with no friendly pawns.
const ROOK_ON_SEMI_OPEN_FILE: Score = Score::new(10, 5);
/// Bonus for a rook on the seventh rank.
const ROOK_ON_SEVENTH: Score = Score::new(20, 30);
/// Bonus for a queen operating in the enemy half.
const ACTIVE_QUEEN: Score = Score::new(8, 4);

/// Returns the material value of `piece`, ignoring its square.
///
/// The king is worth a mate so that no exchange sequence ever looks better
/// than taking it would be.
pub const fn piece_value(piece: Piece) -> Eval {
    if piece.is_none() {
        return 0;
    }
    match piece.piece_type() {
        PieceType::PAWN => 100,
        PieceType::KNIGHT => 320,
        PieceType::BISHOP => 330,
        PieceType::ROOK => 500,
        PieceType::QUEEN => 900,
        _ => MATE,
    }
}

/// Checks if `eval` is a mate score for either side.
pub const fn is_mate(eval: Eval) -> bool {
    eval >= MATE_THRESHOLD || eval <= -MATE_THRESHOLD
}

/// Evaluates `board` from the perspective of the side to move: positive
/// means the mover is better.
pub fn evaluate(board: &Board) -> Eval {
    let white = side_score(board, Side::WHITE);
    let black = side_score(board, Side::BLACK);
    let score = (white - black).taper(game_phase(board));

    if board.side_to_move() == Side::BLACK {
        -score
    } else {
        score
    }
}

/// Sums the phase weights of the minor and major pieces still on the board,
/// clamped to [`MAX_PHASE`].
fn game_phase(board: &Board) -> i32 {
    let mut phase = 0;
    for square in 0..64 {
        let piece = board.piece_at(Square::new(square));
        if piece.is_none() {
            continue;
        }
        phase += match piece.piece_type() {
            PieceType::KNIGHT | PieceType::BISHOP => 1,
            PieceType::ROOK => 2,
            PieceType::QUEEN => 4,
            _ => 0,
        };
    }
    phase.min(MAX_PHASE)
}

/// Sums every evaluation term for one side.
fn side_score(board: &Board, side: Side) -> Score {
    material_and_pst(board, side)
        + pawn_structure(board, side)
        + king_safety(board, side)
        + piece_activity(board, side)
}

/// Reads a piece-square table for `side`, mirroring Black by rank.
const fn pst(table: &[i32; 64], side: Side, square: Square) -> i32 {
    let index = if side.inner() == 0 {
        square.flip_rank().to_index()
    } else {
        square.to_index()
    };
    table[index]
}

/// Material plus piece-square bonuses. Only the king's table differs between
/// midgame and endgame.
fn material_and_pst(board: &Board, side: Side) -> Score {
    let mut score = Score::default();

    for square in 0..64 {
        let square = Square::new(square);
        let piece = board.piece_at(square);
        if !piece.is_side(side) {
            continue;
        }

        let value = match piece.piece_type() {
            PieceType::PAWN => 100 + pst(&PAWN_PST, side, square),
            PieceType::KNIGHT => 320 + pst(&KNIGHT_PST, side, square),
            PieceType::BISHOP => 330 + pst(&BISHOP_PST, side, square),
            PieceType::ROOK => 500 + pst(&ROOK_PST, side, square),
            PieceType::QUEEN => 900 + pst(&QUEEN_PST, side, square),
            _ => {
                score += Score::new(
                    pst(&KING_MIDGAME_PST, side, square),
                    pst(&KING_ENDGAME_PST, side, square),
                );
                continue;
            }
        };
        score += Score::new(value, value);
    }

    score
}

/// Doubled, isolated, backward and passed pawns.
fn pawn_structure(board: &Board, side: Side) -> Score {
    let us_pawn = Piece::from_parts(side, PieceType::PAWN);
    let them_pawn = Piece::from_parts(side.flip(), PieceType::PAWN);
    let forward: i8 = if side == Side::WHITE { 1 } else { -1 };

    let mut our_files = [0u8; File::TOTAL];
    for square in 0..64 {
        let square = Square::new(square);
        if board.piece_at(square) == us_pawn {
            our_files[square.file_of().to_index()] += 1;
        }
    }

    let mut score = Score::default();

    for &count in &our_files {
        if count > 1 {
            let extra = i32::from(count) - 1;
            score += Score::new(DOUBLED_PAWN.mg * extra, DOUBLED_PAWN.eg * extra);
        }
    }

    for square in 0..64 {
        let square = Square::new(square);
        if board.piece_at(square) != us_pawn {
            continue;
        }

        let file = square.file_of().to_index();
        let rank = square.rank_of().inner();
        let relative_rank = if side == Side::WHITE { rank } else { 7 - rank };

        let has_neighbour = (file > 0 && our_files[file - 1] > 0)
            || (file < 7 && our_files[file + 1] > 0);

        if !has_neighbour {
            score += ISOLATED_PAWN;
        } else if is_backward(board, side, square, forward) {
            score += BACKWARD_PAWN;
        }

        if is_passed(board, side, square, them_pawn) {
            score += PASSED_PAWN[relative_rank as usize];
        }
    }

    score
}

/// Checks if the pawn on `square` is backward: nobody on the neighbouring
/// files can ever defend it, and its advance square is contested.
fn is_backward(board: &Board, side: Side, square: Square, forward: i8) -> bool {
    let us_pawn = Piece::from_parts(side, PieceType::PAWN);
    let them_pawn = Piece::from_parts(side.flip(), PieceType::PAWN);

    // a supporting pawn is one on an adjacent file, level or behind
    for file_delta in [-1, 1] {
        let mut current = Some(square);
        while let Some(sq) = current {
            if let Some(neighbour) = sq.try_offset(file_delta, 0) {
                if board.piece_at(neighbour) == us_pawn {
                    return false;
                }
            }
            current = sq.try_offset(0, -forward);
        }
    }

    // enemy pawn on the same file blocks the advance outright
    let mut ahead = square.try_offset(0, forward);
    while let Some(sq) = ahead {
        if board.piece_at(sq) == them_pawn {
            return true;
        }
        ahead = sq.try_offset(0, forward);
    }

    // otherwise backward only if the stop square is covered by an enemy pawn
    square.try_offset(0, forward).is_some_and(|stop| {
        [-1, 1].iter().any(|&file_delta| {
            stop.try_offset(file_delta, forward)
                .is_some_and(|attacker| board.piece_at(attacker) == them_pawn)
        })
    })
}

/// Checks if the pawn on `square` is passed: no enemy pawn ahead of it on
/// its own or a neighbouring file.
fn is_passed(board: &Board, side: Side, square: Square, them_pawn: Piece) -> bool {
    let forward: i8 = if side == Side::WHITE { 1 } else { -1 };

    for file_delta in [-1, 0, 1] {
        let mut current = square.try_offset(file_delta, forward);
        while let Some(sq) = current {
            if board.piece_at(sq) == them_pawn {
                return false;
            }
            current = sq.try_offset(0, forward);
        }
    }

    true
}

/// Pawn shield, open files near the king, castling status and enemy pieces
/// crowding the king. Almost entirely a midgame concern.
fn king_safety(board: &Board, side: Side) -> Score {
    let Some(king) = board.king_square(side) else {
        return Score::default();
    };

    let us_pawn = Piece::from_parts(side, PieceType::PAWN);
    let them_pawn = Piece::from_parts(side.flip(), PieceType::PAWN);
    let them = side.flip();
    let forward: i8 = if side == Side::WHITE { 1 } else { -1 };
    let home_rank = if side == Side::WHITE { Rank::R1 } else { Rank::R8 };

    let mut score = Score::default();

    let king_file = king.file_of().inner() as i8;
    for file_delta in -1..=1 {
        let file = king_file + file_delta;
        if !(0..8).contains(&file) {
            continue;
        }

        // shield: a friendly pawn up to two ranks ahead on this file
        let shielded = (1..=2).any(|rank_delta| {
            king.try_offset(file_delta, forward * rank_delta)
                .is_some_and(|sq| board.piece_at(sq) == us_pawn)
        });
        if !shielded {
            score += MISSING_SHIELD_FILE;
        }

        let mut ours = 0;
        let mut theirs = 0;
        for rank in 0..8 {
            let sq = Square::from_coords(File::new(file as u8), Rank::new(rank));
            let piece = board.piece_at(sq);
            if piece == us_pawn {
                ours += 1;
            } else if piece == them_pawn {
                theirs += 1;
            }
        }
        if ours == 0 {
            score += if theirs == 0 {
                OPEN_FILE_NEAR_KING
            } else {
                SEMI_OPEN_FILE_NEAR_KING
            };
        }
    }

    if king.rank_of() == home_rank {
        let file = king.file_of();
        if file >= File::G || file <= File::C {
            score += CASTLED_KING;
        } else if file == File::E && board.fullmove_number() > 10 {
            score += UNCASTLED_KING;
        }
    } else if board.fullmove_number() > 10 {
        score += UNCASTLED_KING;
    }

    for square in 0..64 {
        let square = Square::new(square);
        let piece = board.piece_at(square);
        if !piece.is_side(them) || piece.is_pawn() || piece.is_king() {
            continue;
        }
        if king.chebyshev_distance(square) <= 2 {
            score += match piece.piece_type() {
                PieceType::KNIGHT | PieceType::BISHOP => NEARBY_MINOR,
                PieceType::ROOK => NEARBY_ROOK,
                _ => NEARBY_QUEEN,
            };
        }
    }

    score
}

/// Development, knight placement, rook files and queen activity.
fn piece_activity(board: &Board, side: Side) -> Score {
    let us_pawn = Piece::from_parts(side, PieceType::PAWN);
    let them_pawn = Piece::from_parts(side.flip(), PieceType::PAWN);
    let home_rank = if side == Side::WHITE { Rank::R1 } else { Rank::R8 };

    let mut pawns_on_file = [(0u8, 0u8); File::TOTAL];
    for square in 0..64 {
        let square = Square::new(square);
        let piece = board.piece_at(square);
        let file = square.file_of().to_index();
        if piece == us_pawn {
            pawns_on_file[file].0 += 1;
        } else if piece == them_pawn {
            pawns_on_file[file].1 += 1;
        }
    }

    let mut score = Score::default();

    for square in 0..64 {
        let square = Square::new(square);
        let piece = board.piece_at(square);
        if !piece.is_side(side) {
            continue;
        }

        let rank = square.rank_of();
        let file = square.file_of();
        let relative_rank = if side == Side::WHITE {
            rank.inner()
        } else {
            7 - rank.inner()
        };

        match piece.piece_type() {
            PieceType::KNIGHT => {
                if rank != home_rank {
                    score += DEVELOPED_MINOR;
                }
                if (2..=5).contains(&file.inner()) && (2..=5).contains(&rank.inner()) {
                    score += CENTRAL_KNIGHT;
                }
                if file == File::A || file == File::H || rank == Rank::R1 || rank == Rank::R8 {
                    score += EDGE_KNIGHT;
                }
            }
            PieceType::BISHOP => {
                if rank != home_rank {
                    score += DEVELOPED_MINOR;
                }
            }
            PieceType::ROOK => {
                let (ours, theirs) = pawns_on_file[file.to_index()];
                if ours == 0 {
                    score += if theirs == 0 {
                        ROOK_ON_OPEN_FILE
                    } else {
                        ROOK_ON_SEMI_OPEN_FILE
                    };
                }
                if relative_rank == 6 {
                    score += ROOK_ON_SEVENTH;
                }
            }
            PieceType::QUEEN => {
                if relative_rank >= 4 {
                    score += ACTIVE_QUEEN;
                }
            }
            _ => (),
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::{
        evaluate, game_phase, is_backward, is_mate, king_safety, piece_activity, piece_value,
        MATE, MAX_PHASE,
    };
    use crate::board::Board;
    use crate::defs::{Piece, Side, Square};

    /// The e3 square, home of the pawn in the backward-pawn fixtures.
    const E3: Square = Square::new(20);

    #[test]
    fn startpos_is_balanced() {
        assert_eq!(evaluate(&Board::startpos()), 0);
    }

    #[test]
    fn evaluation_is_symmetric_in_the_side_to_move() {
        let white: Board = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
            .parse()
            .unwrap();
        let black: Board = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1"
            .parse()
            .unwrap();
        assert_eq!(evaluate(&white), -evaluate(&black));
    }

    #[test]
    fn an_extra_queen_is_winning() {
        let board: Board = "4k3/8/8/8/8/8/8/Q3K3 w - - 0 1".parse().unwrap();
        assert!(evaluate(&board) > 800);

        let board: Board = "4k3/8/8/8/8/8/8/Q3K3 b - - 0 1".parse().unwrap();
        assert!(evaluate(&board) < -800);
    }

    #[test]
    fn passed_pawns_grow_with_their_rank() {
        let far: Board = "4k3/8/P7/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let near: Board = "4k3/8/8/8/8/P7/8/4K3 w - - 0 1".parse().unwrap();
        assert!(evaluate(&far) > evaluate(&near));
    }

    #[test]
    fn backward_pawns_need_a_contested_stop_or_a_blocked_file() {
        // d4 and f4 are ahead of e3 and can never defend it, and the d5 pawn
        // covers the stop square e4: backward
        let contested: Board = "4k3/8/8/3p4/3P1P2/4P3/8/4K3 w - - 0 1".parse().unwrap();
        assert!(is_backward(&contested, Side::WHITE, E3, 1));

        // the f2 pawn sits behind e3 on an adjacent file and can still come
        // to its defence: not backward
        let supported: Board = "4k3/8/8/3p4/3P4/4P3/5P2/4K3 w - - 0 1".parse().unwrap();
        assert!(!is_backward(&supported, Side::WHITE, E3, 1));

        // an enemy pawn anywhere ahead on the same file blocks the advance
        // outright, no stop-square attacker needed
        let blocked: Board = "4k3/8/4p3/8/8/4P3/8/4K3 w - - 0 1".parse().unwrap();
        assert!(is_backward(&blocked, Side::WHITE, E3, 1));

        // same structure as the first case but with the black pawn on d6:
        // nothing contests e4 and the e-file is free, so e3 can just advance
        let free: Board = "4k3/8/3p4/8/3P1P2/4P3/8/4K3 w - - 0 1".parse().unwrap();
        assert!(!is_backward(&free, Side::WHITE, E3, 1));
    }

    #[test]
    fn a_pawn_shield_keeps_the_king_safer() {
        let shielded: Board = "6k1/8/8/8/8/8/5PPP/6K1 w - - 0 1".parse().unwrap();
        let exposed: Board = "6k1/8/8/8/8/8/8/6K1 w - - 0 1".parse().unwrap();
        assert!(king_safety(&shielded, Side::WHITE).mg > king_safety(&exposed, Side::WHITE).mg);
    }

    #[test]
    fn castling_beats_lingering_in_the_centre() {
        // both kings keep a full shield with no open files nearby, so after
        // move 10 the castled corner and the e1 penalty are all that differ
        let castled: Board = "6k1/8/8/8/8/8/5PPP/6K1 w - - 0 20".parse().unwrap();
        let uncastled: Board = "4k3/8/8/8/8/8/3PPP2/4K3 w - - 0 20".parse().unwrap();
        assert!(king_safety(&castled, Side::WHITE).mg > king_safety(&uncastled, Side::WHITE).mg);
    }

    #[test]
    fn a_rook_on_the_seventh_outranks_one_at_home() {
        let seventh: Board = "4k3/2R5/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let second: Board = "4k3/8/8/8/8/8/2R5/4K3 w - - 0 1".parse().unwrap();
        // both rooks enjoy the same open file, so only the seventh-rank
        // bonus separates them, in both game phases
        let high = piece_activity(&seventh, Side::WHITE);
        let low = piece_activity(&second, Side::WHITE);
        assert!(high.mg > low.mg);
        assert!(high.eg > low.eg);
    }

    #[test]
    fn queens_earn_their_bonus_in_the_enemy_half() {
        let active: Board = "4k3/8/8/3Q4/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let passive: Board = "4k3/8/8/8/3Q4/8/8/4K3 w - - 0 1".parse().unwrap();
        assert!(
            piece_activity(&active, Side::WHITE).mg > piece_activity(&passive, Side::WHITE).mg
        );
    }

    #[test]
    fn phase_tapers_from_full_to_empty() {
        assert_eq!(game_phase(&Board::startpos()), MAX_PHASE);

        let endgame: Board = "4k3/8/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        assert_eq!(game_phase(&endgame), 0);
    }

    #[test]
    fn piece_values_are_the_classical_ones() {
        assert_eq!(piece_value(Piece::WPAWN), 100);
        assert_eq!(piece_value(Piece::BKNIGHT), 320);
        assert_eq!(piece_value(Piece::WBISHOP), 330);
        assert_eq!(piece_value(Piece::BROOK), 500);
        assert_eq!(piece_value(Piece::WQUEEN), 900);
        assert_eq!(piece_value(Piece::NONE), 0);
    }

    #[test]
    fn mate_scores_are_recognised() {
        assert!(is_mate(MATE - 1));
        assert!(is_mate(-(MATE - 10)));
        assert!(!is_mate(250));
    }
}
