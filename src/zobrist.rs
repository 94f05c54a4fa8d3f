use once_cell::sync::Lazy;
use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::{
    coordinates::{File, Square},
    piece::Piece,
    r#move::CastlingRights,
};

/// Type alias for the Zobrist hash value
pub type Zobrist = u64;

/// The keys are drawn from a fixed seed so that hashes are stable from one run to the next.
const SEED: u64 = 0x9e37_79b9_7f4a_7c15;

struct ZobristKeys {
    piece_square: [Zobrist; Piece::COUNT * Square::COUNT],
    en_passant: [Zobrist; File::COUNT],
    white_to_move: Zobrist,
    castling: [Zobrist; CastlingRights::COUNT],
}

static KEYS: Lazy<ZobristKeys> = Lazy::new(|| {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(SEED);

    let piece_square = std::array::from_fn(|_| rng.next_u64());
    let en_passant = std::array::from_fn(|_| rng.next_u64());
    let white_to_move = rng.next_u64();

    // Index zero keeps the value 0 so that a position without castling rights does not depend on the castling key.
    let mut castling = [0; CastlingRights::COUNT];
    for key in castling.iter_mut().skip(1) {
        *key = rng.next_u64();
    }

    ZobristKeys { piece_square, en_passant, white_to_move, castling }
});

/// Draws the keys ahead of their first use.
pub fn initialize() {
    Lazy::force(&KEYS);
}

/// Returns the key of a piece standing on a square.
pub fn piece_key(piece: Piece, square: Square) -> Zobrist {
    KEYS.piece_square[piece.index() * Square::COUNT + usize::from(square)]
}

/// Returns the key XORed in while white is to move.
pub fn turn_key() -> Zobrist {
    KEYS.white_to_move
}

/// Returns the key of a castling availability mask.
pub fn castle_key(rights: CastlingRights) -> Zobrist {
    KEYS.castling[rights.bits() as usize]
}

/// Returns the key of an en passant square. Only the file of the square matters.
pub fn en_passant_key(square: Square) -> Zobrist {
    KEYS.en_passant[usize::from(square.file())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_deterministic() {
        assert_eq!(piece_key(Piece::WHITE_KING, Square::E1), piece_key(Piece::WHITE_KING, Square::E1));
        assert_eq!(turn_key(), turn_key());
    }

    #[test]
    fn test_piece_keys_are_distinct() {
        let mut keys: Vec<Zobrist> =
            Piece::ALL.iter().flat_map(|&piece| Square::ALL.map(|square| piece_key(piece, square))).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), Piece::COUNT * Square::COUNT);
    }

    #[test]
    fn test_castle_keys() {
        assert_eq!(castle_key(CastlingRights::empty()), 0);
        assert_ne!(castle_key(CastlingRights::all()), 0);
        assert_ne!(castle_key(CastlingRights::WHITE_KINGSIDE), castle_key(CastlingRights::BLACK_KINGSIDE));
    }

    #[test]
    fn test_en_passant_key_only_depends_on_file() {
        assert_eq!(en_passant_key(Square::E3), en_passant_key(Square::E6));
        assert_ne!(en_passant_key(Square::E3), en_passant_key(Square::D3));
    }
}
