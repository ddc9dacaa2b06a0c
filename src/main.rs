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

//! The binary entry point: argument parsing and the UCI loop.

use std::io;

use clap::Parser;

use heron::uci::Uci;

/// Heron, a UCI-compatible chess engine.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Run the UCI dispatcher on standard input and output.
    #[arg(long)]
    uci: bool,
}

fn main() -> Result<(), io::Error> {
    let cli = Cli::parse();

    if cli.uci {
        Uci::new().main_loop()?;
    } else {
        println!("Heron is a UCI chess engine; run it with --uci under a UCI front end.");
    }

    Ok(())
}
