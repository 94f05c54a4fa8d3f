use std::sync::Once;

pub mod bitboard;
pub mod config;
pub mod coordinates;
pub mod fen;
pub mod r#move;
pub mod move_gen;
pub mod notation;
pub mod perft;
pub mod piece;
pub mod position;
pub mod zobrist;

static INIT: Once = Once::new();

/// Builds the lookup tables of the library. Calling it is optional, the tables are otherwise built on first use.
pub fn initialize() {
    INIT.call_once(|| {
        bitboard::initialize();
        move_gen::attacks::initialize();
        zobrist::initialize();
    });
}
