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

//! Perft throughput benchmarks over a few well-known positions.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use heron::board::Board;
use heron::perft::perft;

/// A perft benchmark case with its expected node count as a sanity check.
#[derive(Clone, Copy)]
struct BenchCase {
    name: &'static str,
    fen: &'static str,
    depth: u32,
    nodes: u64,
}

const CASES: &[BenchCase] = &[
    BenchCase {
        name: "startpos",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        depth: 4,
        nodes: 197_281,
    },
    BenchCase {
        name: "kiwipete",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        depth: 3,
        nodes: 97_862,
    },
    BenchCase {
        name: "position_3",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        depth: 4,
        nodes: 43_238,
    },
];

fn perft_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");

    for case in CASES {
        let mut board: Board = case.fen.parse().expect("benchmark FENs are valid");
        assert_eq!(perft::<false>(&mut board, case.depth), case.nodes);

        group.throughput(Throughput::Elements(case.nodes));
        group.bench_with_input(
            BenchmarkId::new(case.name, case.depth),
            &case.depth,
            |b, &depth| b.iter(|| perft::<false>(black_box(&mut board), depth)),
        );
    }

    group.finish();
}

criterion_group!(benches, perft_benches);
criterion_main!(benches);
