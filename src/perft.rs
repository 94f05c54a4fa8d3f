use std::time::{Duration, Instant};

use log::{debug, info, trace};
use thiserror::Error;

use crate::{
    fen::FenError,
    move_gen::{generate_black, generate_white, MoveList},
    piece::Color,
    position::Position,
};

/// Represents errors that can occur during perft (performance test) operations.
#[derive(Error, Debug)]
pub enum PerftError {
    #[error("Invalid FEN ({}): {}", .0, .1)]
    InvalidFen(String, FenError),
}

/// The outcome of a timed perft run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerftReport {
    pub nodes: u64,
    pub duration: Duration,
}

impl PerftReport {
    /// Returns the walking speed. A run too fast to be timed reports 0.
    pub fn nodes_per_second(&self) -> f64 {
        let seconds = self.duration.as_secs_f64();
        if seconds > 0.0 {
            self.nodes as f64 / seconds
        } else {
            0.0
        }
    }
}

fn perft_color<const COLOR: u8>(position: &mut Position, depth: u32, verbose: bool) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut moves = MoveList::new();
    match COLOR {
        Color::WHITE_VALUE => generate_white(position, &mut moves),
        Color::BLACK_VALUE => generate_black(position, &mut moves),
        _ => panic!("Invalid color value"),
    }

    // Every legal move is a leaf, there is no need to play them.
    if depth == 1 {
        if verbose {
            for mv in moves.iter() {
                println!("{}: 1", mv);
            }
        }
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for mv in moves.iter() {
        let undo = position.do_move(mv);
        let count = match COLOR {
            Color::WHITE_VALUE => perft_black(position, depth - 1, false),
            _ => perft_white(position, depth - 1, false),
        };
        position.undo_move(undo);

        if verbose {
            println!("{}: {}", mv, count);
            trace!("{} {}", mv, count);
        }
        nodes += count;
    }

    nodes
}

/// Counts the leaves of the move tree of `depth` plies, white to move.
pub fn perft_white(position: &mut Position, depth: u32, verbose: bool) -> u64 {
    perft_color::<{ Color::WHITE_VALUE }>(position, depth, verbose)
}

/// Counts the leaves of the move tree of `depth` plies, black to move.
pub fn perft_black(position: &mut Position, depth: u32, verbose: bool) -> u64 {
    perft_color::<{ Color::BLACK_VALUE }>(position, depth, verbose)
}

/// Counts the leaves of the move tree of `depth` plies from `position`.
///
/// The position is modified while walking the tree and is left as it was found. With `verbose`, the count below each
/// root move is printed, which is the usual way of locating a move generation bug against a reference engine.
pub fn perft(position: &mut Position, depth: u32, verbose: bool) -> u64 {
    match position.turn() {
        Color::White => perft_white(position, depth, verbose),
        Color::Black => perft_black(position, depth, verbose),
    }
}

/// Validates `fen`, then times a perft walk of `depth` plies on it.
pub fn run_perft(fen: &str, depth: u32, verbose: bool) -> Result<PerftReport, PerftError> {
    let mut position = Position::from_fen(fen).map_err(|e| PerftError::InvalidFen(fen.to_string(), e))?;
    debug!("Perft ({}) for position {}", depth, fen);

    let start = Instant::now();
    let nodes = perft(&mut position, depth, verbose);
    let report = PerftReport { nodes, duration: start.elapsed() };

    info!(
        "Perft ({}): {} nodes in {:.3}s ({:.0} nodes per second)",
        depth,
        report.nodes,
        report.duration.as_secs_f64(),
        report.nodes_per_second()
    );

    Ok(report)
}
