use once_cell::sync::Lazy;

use crate::{
    bitboard::Bitboard,
    coordinates::Square,
    piece::{Color, PieceType},
};

type Shift = fn(Bitboard) -> Bitboard;

/// The eight ray directions. The first four run towards higher square indices, the last four towards lower ones.
const RAY_SHIFTS: [Shift; 8] = [
    Bitboard::north,
    Bitboard::east,
    Bitboard::north_east,
    Bitboard::north_west,
    Bitboard::south,
    Bitboard::west,
    Bitboard::south_west,
    Bitboard::south_east,
];

const ROOK_DIRECTIONS: [usize; 4] = [0, 1, 4, 5];
const BISHOP_DIRECTIONS: [usize; 4] = [2, 3, 6, 7];

/// For every direction and square, the squares reached on an empty board, excluding the origin.
static RAYS: Lazy<[[Bitboard; Square::COUNT]; 8]> = Lazy::new(|| {
    let mut rays = [[Bitboard::EMPTY; Square::COUNT]; 8];
    for (direction, shift) in RAY_SHIFTS.iter().enumerate() {
        for square in Square::ALL {
            let mut bb = shift(Bitboard::from(square));
            while bb.has_any() {
                rays[direction][usize::from(square)] |= bb;
                bb = shift(bb);
            }
        }
    }
    rays
});

static KNIGHT_ATTACKS: Lazy<[Bitboard; Square::COUNT]> = Lazy::new(|| {
    std::array::from_fn(|index| {
        let bb = Bitboard::from(Square::from(index as u8));
        bb.north_north().east()
            | bb.north_north().west()
            | bb.south_south().east()
            | bb.south_south().west()
            | bb.east().north_east()
            | bb.east().south_east()
            | bb.west().north_west()
            | bb.west().south_west()
    })
});

static KING_ATTACKS: Lazy<[Bitboard; Square::COUNT]> = Lazy::new(|| {
    std::array::from_fn(|index| {
        let bb = Bitboard::from(Square::from(index as u8));
        RAY_SHIFTS.iter().fold(Bitboard::EMPTY, |attacks, shift| attacks | shift(bb))
    })
});

static PAWN_ATTACKS: Lazy<[[Bitboard; Square::COUNT]; Color::COUNT]> = Lazy::new(|| {
    let mut attacks = [[Bitboard::EMPTY; Square::COUNT]; Color::COUNT];
    for square in Square::ALL {
        attacks[usize::from(Color::White)][usize::from(square)] = pawns_attacks(Color::White, square.into());
        attacks[usize::from(Color::Black)][usize::from(square)] = pawns_attacks(Color::Black, square.into());
    }
    attacks
});

/// Builds the attack tables ahead of their first use.
pub fn initialize() {
    Lazy::force(&RAYS);
    Lazy::force(&KNIGHT_ATTACKS);
    Lazy::force(&KING_ATTACKS);
    Lazy::force(&PAWN_ATTACKS);
}

/// Returns the attacks along a single ray. The first blocker is included, the squares behind it are not.
fn ray_attacks(direction: usize, square: Square, occupied: Bitboard) -> Bitboard {
    let ray = RAYS[direction][usize::from(square)];
    let blockers = ray & occupied;
    let first_blocker = if direction < 4 { blockers.lsb() } else { blockers.msb() };

    match first_blocker {
        Some(blocker) => ray ^ RAYS[direction][usize::from(blocker)],
        None => ray,
    }
}

/// Returns a bitboard with all squares attacked by a knight on a given square.
pub fn knight_attacks(square: Square) -> Bitboard {
    KNIGHT_ATTACKS[usize::from(square)]
}

/// Returns a bitboard with all squares attacked by a king on a given square.
pub fn king_attacks(square: Square) -> Bitboard {
    KING_ATTACKS[usize::from(square)]
}

/// Returns the two (or one, on the edge files) squares a pawn of the given color attacks from a square.
pub fn pawn_attacks(color: Color, square: Square) -> Bitboard {
    PAWN_ATTACKS[usize::from(color)][usize::from(square)]
}

/// Returns every square attacked by a set of pawns of the given color.
pub fn pawns_attacks(color: Color, pawns: Bitboard) -> Bitboard {
    match color {
        Color::White => pawns.north_east() | pawns.north_west(),
        Color::Black => pawns.south_east() | pawns.south_west(),
    }
}

/// Returns a bitboard with all squares attacked by a rook on a given square, given the occupied squares.
pub fn rook_attacks(square: Square, occupied: Bitboard) -> Bitboard {
    ROOK_DIRECTIONS
        .iter()
        .fold(Bitboard::EMPTY, |attacks, &direction| attacks | ray_attacks(direction, square, occupied))
}

/// Returns a bitboard with all squares attacked by a bishop on a given square, given the occupied squares.
pub fn bishop_attacks(square: Square, occupied: Bitboard) -> Bitboard {
    BISHOP_DIRECTIONS
        .iter()
        .fold(Bitboard::EMPTY, |attacks, &direction| attacks | ray_attacks(direction, square, occupied))
}

/// Returns a bitboard with all squares attacked by a queen on a given square, given the occupied squares.
pub fn queen_attacks(square: Square, occupied: Bitboard) -> Bitboard {
    rook_attacks(square, occupied) | bishop_attacks(square, occupied)
}

/// Returns a bitboard with all squares attacked by a specific piece type from a given square.
///
/// # Type Parameters
/// * `PIECE_TYPE_VALUE` - One of `PieceType::KNIGHT_VALUE`, `BISHOP_VALUE`, `ROOK_VALUE`, `QUEEN_VALUE` or
///   `KING_VALUE`. Pawns attack differently depending on their color and are served by `pawn_attacks`.
///
/// # Parameters
/// * `occupied` - The occupied squares, only used to block the rays of the sliding pieces
/// * `sq` - The square from which to calculate attacks
#[inline(always)]
pub fn attacks_from<const PIECE_TYPE_VALUE: u8>(occupied: Bitboard, sq: Square) -> Bitboard {
    match PIECE_TYPE_VALUE {
        PieceType::KNIGHT_VALUE => knight_attacks(sq),
        PieceType::BISHOP_VALUE => bishop_attacks(sq, occupied),
        PieceType::ROOK_VALUE => rook_attacks(sq, occupied),
        PieceType::QUEEN_VALUE => queen_attacks(sq, occupied),
        PieceType::KING_VALUE => king_attacks(sq),
        _ => unimplemented!("Piece type not implemented"),
    }
}
