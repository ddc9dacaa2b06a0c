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

#![cfg(test)]

use lazy_static::lazy_static;

use crate::board::Board;
use crate::perft::perft;

/// A position with a known perft result.
#[derive(Clone, Copy)]
struct TestPosition<'a> {
    /// The position itself.
    fen: &'a str,
    /// The depth to count to.
    depth: u32,
    /// The expected number of leaf nodes.
    nodes: u64,
}

impl<'a> TestPosition<'a> {
    const fn new(fen: &'a str, depth: u32, nodes: u64) -> Self {
        Self { fen, depth, nodes }
    }
}

lazy_static! {
    /// Positions used to check the correctness of movegen and make/unmake.
    static ref TEST_POSITIONS: Vec<TestPosition<'static>> = vec![
        // startpos
        TestPosition::new(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            4,
            197_281,
        ),
        // kiwipete: castling, pins, promotions and checks all at once
        TestPosition::new(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            3,
            97_862,
        ),
        // en passant discovering an attack on the mover's own king
        TestPosition::new("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", 5, 674_624),
        // a rack of promotions
        TestPosition::new(
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            3,
            9_467,
        ),
        // an enemy knight parked on the back rank spoiling castling
        TestPosition::new(
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            3,
            62_379,
        ),
        // a quiet middlegame with a symmetric structure
        TestPosition::new(
            "r4rk1/1pp1qppp/p1np1n2/2b1p1b1/2B1P1B1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
            3,
            89_890,
        ),
    ];
}

#[test]
fn perft_suite() {
    for position in TEST_POSITIONS.iter() {
        let mut board: Board = position.fen.parse().unwrap();
        assert_eq!(
            perft::<false>(&mut board, position.depth),
            position.nodes,
            "wrong perft({}) for {}",
            position.depth,
            position.fen,
        );
    }
}

// around five million leaves; noticeably slow without optimisations, hence
// `--ignored`
#[test]
#[ignore = "slow in debug builds"]
fn perft_startpos_depth_5() {
    let mut board = Board::startpos();
    assert_eq!(perft::<false>(&mut board, 5), 4_865_609);
}
