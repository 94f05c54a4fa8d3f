use clap::Parser;
use cobalt::{
    config::{self, get_config},
    fen::fen_is_ok,
    perft::run_perft,
    position::Position,
};
use log::info;
use thiserror::Error;

#[derive(Error, Debug)]
enum CobaltError {
    #[error("Error reading the configuration: {0}")]
    ConfigError(#[from] cobalt::config::ConfigError),

    #[error("Error during the perft command: {0}")]
    PerftError(#[from] cobalt::perft::PerftError),

    #[error("Invalid FEN ({0}): {1}")]
    InvalidFen(String, cobalt::fen::FenError),
}

mod arguments {
    use std::path::PathBuf;

    use clap::{Parser, Subcommand};

    /// Bitboard chess position toolkit
    #[derive(Parser)]
    #[command(name = "cobalt", version, about = "Bitboard chess position toolkit")]
    pub struct CobaltArgs {
        /// Configuration file (TOML) overriding the defaults
        #[arg(short, long, global = true)]
        pub config: Option<PathBuf>,

        #[command(subcommand)]
        pub command: Commands,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Commands {
        /// Count the leaves of the move tree of a position
        Perft {
            /// The depth of the move tree
            #[arg(short, long)]
            depth: u32,

            /// FEN string of the position
            #[arg(short, long, default_value = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")]
            fen: String,

            /// Print the node count below each root move
            #[arg(short, long)]
            verbose: bool,
        },

        /// Check whether a FEN string describes a legal position
        Validate {
            /// FEN string of the position
            fen: String,
        },

        /// Draw the board of a position
        Show {
            /// FEN string of the position
            fen: String,
        },

        /// Play random legal moves from the starting position and print the result
        Random {
            /// Number of plies to play
            #[arg(short, long)]
            plies: Option<u32>,
        },
    }
}

fn show(position: &Position) {
    if get_config().unicode_board {
        println!("{position:#}");
    } else {
        println!("{position}");
    }
    println!("\n{}", position.to_fen());
    println!("Key: {:016x}", position.zobrist_key());
}

fn run() -> Result<(), CobaltError> {
    // Parse command line arguments
    let args = arguments::CobaltArgs::parse();

    // Initialize the library and the configuration
    cobalt::initialize();
    config::initialize(args.config)?;
    let config = get_config();

    // Run the command
    match args.command {
        arguments::Commands::Perft { depth, fen, verbose } => {
            let report = run_perft(&fen, depth, verbose || config.perft_verbose)?;
            println!("\nNodes: {}", report.nodes);
            println!("Time: {:.3}", report.duration.as_secs_f64());
            println!("Nodes per second: {:.0}", report.nodes_per_second());
        }
        arguments::Commands::Validate { fen } => match fen_is_ok(&fen) {
            Ok(()) => println!("valid"),
            Err(error) => println!("invalid: {error}"),
        },
        arguments::Commands::Show { fen } => {
            let position = Position::from_fen(&fen).map_err(|e| CobaltError::InvalidFen(fen.clone(), e))?;
            show(&position);
        }
        arguments::Commands::Random { plies } => {
            let plies = plies.unwrap_or(config.random_plies);
            info!("Playing {} random plies", plies);
            let position = Position::random_pos(plies, &mut rand::rng());
            show(&position);
        }
    }

    Ok(())
}

/// Main entry point for the cobalt command line tool.
fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
