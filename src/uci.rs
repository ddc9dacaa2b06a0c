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

//! The UCI dispatcher.
//!
//! Accepted commands:
//! - `uci`, `isready`, `ucinewgame`
//! - `position startpos|fen <fen> [moves <m1> <m2> ...]`
//! - `go [depth N] [movetime M]`
//! - `d`: pretty-print the current board
//! - `perft <depth>`: run perft from the current position
//! - `stop` (a no-op: the search is synchronous)
//! - `quit`
//!
//! Anything else is ignored silently, as the protocol asks.

use std::io::{self, BufRead};
use std::time::Instant;

use crate::board::Board;
use crate::perft::perft;
use crate::search::{Searcher, MAX_DEPTH};

/// The name of this engine.
const ID_NAME: &str = "Heron";
/// The author of this engine.
const ID_AUTHOR: &str = "the Heron developers";
/// The version of this engine.
const ID_VERSION: &str = env!("CARGO_PKG_VERSION");
/// The search depth used when `go` gives no limits at all.
const DEFAULT_DEPTH: i32 = 6;

/// The dispatcher: a board, a searcher, and a command loop mutating them.
pub struct Uci {
    /// The current position.
    board: Board,
    /// The searcher, reused across `go` commands.
    searcher: Searcher,
}

impl Default for Uci {
    fn default() -> Self {
        Self::new()
    }
}

impl Uci {
    /// Creates a new dispatcher sitting at the start position.
    pub fn new() -> Self {
        Self {
            board: Board::startpos(),
            searcher: Searcher::new(),
        }
    }

    /// Reads commands from standard input until `quit` or end of input.
    pub fn main_loop(&mut self) -> io::Result<()> {
        let stdin = io::stdin();

        for line in stdin.lock().lines() {
            if !self.dispatch(&line?) {
                break;
            }
        }

        Ok(())
    }

    /// Executes one command line.
    ///
    /// Returns `false` when the dispatcher should exit.
    fn dispatch(&mut self, line: &str) -> bool {
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("uci") => {
                println!("id name {ID_NAME} {ID_VERSION}");
                println!("id author {ID_AUTHOR}");
                println!("uciok");
            }
            Some("isready") => {
                println!("readyok");
            }
            Some("ucinewgame") => {
                self.board = Board::startpos();
                self.searcher = Searcher::new();
            }
            Some("position") => {
                self.handle_position(tokens);
            }
            Some("go") => {
                self.handle_go(tokens);
            }
            Some("d") => {
                println!("{}", self.board);
            }
            Some("perft") => {
                self.handle_perft(tokens);
            }
            Some("stop") => {
                // the search is synchronous; by the time we read this it is
                // already done
            }
            Some("quit") => {
                return false;
            }
            _ => (),
        }

        true
    }

    /// Executes a `position` command: a base position, then a move list.
    ///
    /// A FEN that fails to parse leaves the current position untouched. An
    /// illegal or unparseable move token stops the move list there.
    fn handle_position<'a, T>(&mut self, mut tokens: T)
    where
        T: Iterator<Item = &'a str>,
    {
        let board = match tokens.next() {
            Some("startpos") => Board::startpos(),
            Some("fen") => {
                let fen_fields: Vec<&str> = tokens.by_ref().take(6).collect();
                match fen_fields.join(" ").parse() {
                    Ok(board) => board,
                    Err(err) => {
                        eprintln!("info string rejected FEN: {err}");
                        return;
                    }
                }
            }
            _ => return,
        };
        self.board = board;

        if tokens.next() == Some("moves") {
            for token in tokens {
                if !self.apply_uci_move(token) {
                    eprintln!("info string illegal move \"{token}\"");
                    break;
                }
            }
        }
    }

    /// Plays the move written as `token` if it is legal in the current
    /// position.
    fn apply_uci_move(&mut self, token: &str) -> bool {
        let token = token.to_ascii_lowercase();
        let Some(mv) = self
            .board
            .generate_legal_moves()
            .into_iter()
            .find(|mv| mv.to_string() == token)
        else {
            return false;
        };

        self.board.make_move(mv);
        true
    }

    /// Executes a `go` command and prints the `bestmove` reply.
    ///
    /// `depth` caps the iterative deepening; `movetime` is an absolute
    /// budget in milliseconds. With neither, the search runs to depth
    /// [`DEFAULT_DEPTH`]; with only `movetime`, depth is capped at
    /// [`MAX_DEPTH`].
    fn handle_go<'a, T>(&mut self, mut tokens: T)
    where
        T: Iterator<Item = &'a str>,
    {
        let mut depth = None;
        let mut movetime = None;

        while let Some(token) = tokens.next() {
            match token {
                "depth" => depth = parse_positive(tokens.next()),
                "movetime" => movetime = parse_positive(tokens.next()),
                _ => (),
            }
        }

        let max_depth = depth
            .map_or(
                if movetime.is_some() {
                    MAX_DEPTH
                } else {
                    DEFAULT_DEPTH
                },
                |d| d as i32,
            );
        let (time_limit_ms, use_absolute_time) = match movetime {
            Some(ms) => (ms, true),
            None => (0, false),
        };

        let report =
            self.searcher
                .find_best_move(&mut self.board, max_depth, time_limit_ms, use_absolute_time);

        if report.best_move.is_null() {
            println!("bestmove 0000");
        } else {
            println!("bestmove {}", report.best_move);
        }
    }

    /// Executes a `perft <depth>` command with per-move subtotals and
    /// timing.
    fn handle_perft<'a, T>(&mut self, mut tokens: T)
    where
        T: Iterator<Item = &'a str>,
    {
        let Some(depth) = parse_positive(tokens.next()) else {
            return;
        };

        let start = Instant::now();
        let nodes = perft::<true>(&mut self.board, depth as u32);
        let elapsed_ms = start.elapsed().as_millis().max(1) as u64;
        println!(
            "Time taken: {elapsed_ms} ms; NPS: {}",
            nodes * 1000 / elapsed_ms
        );
    }
}

/// Parses a token into a positive number; `None` for absent, unparseable or
/// zero values.
fn parse_positive(token: Option<&str>) -> Option<u64> {
    token
        .and_then(|t| t.parse::<u64>().ok())
        .filter(|&value| value > 0)
}

#[cfg(test)]
mod tests {
    use super::Uci;
    use crate::board::START_FEN;

    #[test]
    fn position_startpos_with_moves() {
        let mut uci = Uci::new();
        uci.dispatch("position startpos moves e2e4 e7e5");
        assert_eq!(
            uci.board.to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2"
        );
    }

    #[test]
    fn position_fen_with_moves() {
        let mut uci = Uci::new();
        uci.dispatch(
            "position fen r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1 \
             moves e1g1",
        );
        assert_eq!(
            uci.board.to_fen(),
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R4RK1 b kq - 1 1"
        );
    }

    #[test]
    fn illegal_move_token_stops_the_list() {
        let mut uci = Uci::new();
        uci.dispatch("position startpos moves e2e4 e2e4 d7d5");
        // the second e2e4 is illegal, so d7d5 is never applied
        assert_eq!(
            uci.board.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
    }

    #[test]
    fn a_bad_fen_keeps_the_current_position() {
        let mut uci = Uci::new();
        uci.dispatch("position startpos moves e2e4");
        let before = uci.board.to_fen();

        uci.dispatch("position fen this is not a fen at all x");
        assert_eq!(uci.board.to_fen(), before);
    }

    #[test]
    fn ucinewgame_resets_the_board() {
        let mut uci = Uci::new();
        uci.dispatch("position startpos moves e2e4");
        uci.dispatch("ucinewgame");
        assert_eq!(uci.board.to_fen(), START_FEN);
    }

    #[test]
    fn go_leaves_the_position_in_place() {
        let mut uci = Uci::new();
        uci.dispatch("position startpos moves e2e4 e7e5");
        let before = uci.board.clone();
        uci.dispatch("go depth 1");
        assert_eq!(uci.board, before);
    }

    #[test]
    fn quit_ends_the_loop_and_noise_does_not() {
        let mut uci = Uci::new();
        assert!(uci.dispatch("isready"));
        assert!(uci.dispatch("stop"));
        assert!(uci.dispatch("flugelhorn"));
        assert!(uci.dispatch(""));
        assert!(!uci.dispatch("quit"));
    }
}
