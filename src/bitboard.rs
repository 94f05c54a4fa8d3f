use once_cell::sync::Lazy;

use crate::{
    coordinates::{File, Rank, Square},
    r#move::CastlingRights,
};

/// A bitboard is a 64-bit integer that represents a set of squares on a chess board. Each bit represents a square on
/// the board, bit 0 being A1 and bit 63 being H8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bitboard(pub u64);

/// The eight compass directions as (file, rank) steps, rook directions first.
const DIRECTIONS: [(i8, i8); 8] = [(1, 0), (0, 1), (-1, 0), (0, -1), (1, 1), (-1, 1), (-1, -1), (1, -1)];

/// Returns the square one step away in the given direction, if it is on the board.
fn step(square: Square, (file_step, rank_step): (i8, i8)) -> Option<Square> {
    let file = u8::from(square.file()) as i8 + file_step;
    let rank = u8::from(square.rank()) as i8 + rank_step;
    if (0..8).contains(&file) && (0..8).contains(&rank) {
        Some(Square::new(File::from(file as u8), Rank::from(rank as u8)))
    } else {
        None
    }
}

static BETWEEN: Lazy<Box<[Bitboard]>> = Lazy::new(|| {
    let mut between = vec![Bitboard::EMPTY; Square::COUNT * Square::COUNT];
    for from in Square::ALL {
        for direction in DIRECTIONS {
            let mut bb = Bitboard::EMPTY;
            let mut next = step(from, direction);
            while let Some(to) = next {
                between[usize::from(from) * Square::COUNT + usize::from(to)] = bb;
                bb |= to;
                next = step(to, direction);
            }
        }
    }
    between.into_boxed_slice()
});

static LINE: Lazy<Box<[Bitboard]>> = Lazy::new(|| {
    let mut line = vec![Bitboard::EMPTY; Square::COUNT * Square::COUNT];
    for from in Square::ALL {
        for (file_step, rank_step) in DIRECTIONS {
            // The full line is the ray in both directions plus the origin square.
            let mut full = Bitboard::from(from);
            for direction in [(file_step, rank_step), (-file_step, -rank_step)] {
                let mut next = step(from, direction);
                while let Some(sq) = next {
                    full |= sq;
                    next = step(sq, direction);
                }
            }

            let mut next = step(from, (file_step, rank_step));
            while let Some(to) = next {
                line[usize::from(from) * Square::COUNT + usize::from(to)] = full;
                next = step(to, (file_step, rank_step));
            }
        }
    }
    line.into_boxed_slice()
});

static CASTLE: Lazy<Box<[CastlingRights]>> = Lazy::new(|| {
    let mut castle = vec![CastlingRights::empty(); Square::COUNT * Square::COUNT];
    let moves = [
        (Square::E1, Square::G1, CastlingRights::WHITE_KINGSIDE),
        (Square::E1, Square::C1, CastlingRights::WHITE_QUEENSIDE),
        (Square::E8, Square::G8, CastlingRights::BLACK_KINGSIDE),
        (Square::E8, Square::C8, CastlingRights::BLACK_QUEENSIDE),
    ];
    for (from, to, right) in moves {
        castle[usize::from(from) * Square::COUNT + usize::from(to)] = right;
    }
    castle.into_boxed_slice()
});

/// Builds the geometry tables ahead of their first use.
pub fn initialize() {
    Lazy::force(&BETWEEN);
    Lazy::force(&LINE);
    Lazy::force(&CASTLE);
}

impl Bitboard {
    /// Represents an empty bitboard.
    pub const EMPTY: Bitboard = Bitboard(0);

    /// Represents a filled bitboard.
    pub const ALL: Bitboard = Bitboard(u64::MAX);

    /// Returns the value of a single square on the bitboard.
    pub fn get(self, square: Square) -> bool {
        self.0 & (1u64 << u8::from(square)) != 0
    }

    /// Returns a copy of the bitboard with the square set.
    pub fn with(self, square: Square) -> Bitboard {
        self | square
    }

    /// Returns a copy of the bitboard with the square cleared.
    pub fn without(self, square: Square) -> Bitboard {
        self & !Bitboard::from(square)
    }

    /// Returns the least significant bit of the bitboard.
    pub fn lsb(self) -> Option<Square> {
        if self.0 == 0 {
            return None;
        }

        Some((self.0.trailing_zeros() as u8).into())
    }

    /// Returns the least significant bit of a bitboard known to be non-empty.
    ///
    /// Calling this on an empty bitboard is a precondition violation: it panics in debug builds and returns a
    /// meaningless square in release builds.
    #[inline(always)]
    pub fn lsb_unchecked(self) -> Square {
        debug_assert!(self.0 != 0, "lsb of an empty bitboard");
        ((self.0.trailing_zeros() & 63) as u8).into()
    }

    /// Returns the most significant bit of the bitboard.
    pub fn msb(self) -> Option<Square> {
        if self.0 == 0 {
            return None;
        }

        Some((63 - self.0.leading_zeros() as u8).into())
    }

    /// Returns the number of set bits in the bitboard.
    pub fn popcnt(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns whether the bitboard is empty.
    pub fn has_none(self) -> bool {
        self.0 == 0
    }

    /// Returns whether the bitboard has at least one square set.
    pub fn has_any(self) -> bool {
        self.0 != 0
    }

    /// Returns whether exactly one square is set.
    pub fn has_one(self) -> bool {
        self.0 != 0 && self.0 & (self.0 - 1) == 0
    }

    /// Returns whether more than one square is set.
    pub fn has_many(self) -> bool {
        self.0 & self.0.wrapping_sub(1) != 0
    }

    /// Shifts every square one rank up. Squares on the eighth rank fall off the board.
    pub fn north(self) -> Bitboard {
        Bitboard(self.0 << 8)
    }

    /// Shifts every square one rank down.
    pub fn south(self) -> Bitboard {
        Bitboard(self.0 >> 8)
    }

    /// Shifts every square one file toward the h-file, without wrapping around the board.
    pub fn east(self) -> Bitboard {
        Bitboard((self.0 << 1) & !FILE_A)
    }

    /// Shifts every square one file toward the a-file, without wrapping around the board.
    pub fn west(self) -> Bitboard {
        Bitboard((self.0 >> 1) & !FILE_H)
    }

    /// Diagonal shifts. Like `east` and `west`, they never wrap around the board.
    pub fn north_east(self) -> Bitboard {
        Bitboard((self.0 << 9) & !FILE_A)
    }

    pub fn north_west(self) -> Bitboard {
        Bitboard((self.0 << 7) & !FILE_H)
    }

    pub fn south_east(self) -> Bitboard {
        Bitboard((self.0 >> 7) & !FILE_A)
    }

    pub fn south_west(self) -> Bitboard {
        Bitboard((self.0 >> 9) & !FILE_H)
    }

    /// Shifts every square two ranks up, as a white pawn's double push.
    pub fn north_north(self) -> Bitboard {
        Bitboard(self.0 << 16)
    }

    /// Shifts every square two ranks down.
    pub fn south_south(self) -> Bitboard {
        Bitboard(self.0 >> 16)
    }

    /// Returns a bitboard with all squares strictly between two squares. The result is empty when the squares are not
    /// on a common rank, file or diagonal.
    pub fn between(from: Square, to: Square) -> Bitboard {
        BETWEEN[usize::from(from) * Square::COUNT + usize::from(to)]
    }

    /// Returns the full line (rank, file or diagonal, edge to edge) going through both squares, or an empty bitboard
    /// when they are not aligned.
    pub fn line(from: Square, to: Square) -> Bitboard {
        LINE[usize::from(from) * Square::COUNT + usize::from(to)]
    }

    /// Returns whether moving a king from `source` to `target` is a castle permitted by the castling rights `rights`.
    pub fn castle(source: Square, target: Square, rights: CastlingRights) -> bool {
        let required = CASTLE[usize::from(source) * Square::COUNT + usize::from(target)];
        !required.is_empty() && rights.contains(required)
    }
}

const FILE_A: u64 = 0x0101010101010101;
const FILE_H: u64 = FILE_A << 7;

impl From<Square> for Bitboard {
    fn from(square: Square) -> Self {
        Bitboard(1u64 << u8::from(square))
    }
}

impl From<File> for Bitboard {
    fn from(file: File) -> Self {
        Bitboard(FILE_A << u8::from(file))
    }
}

impl From<Rank> for Bitboard {
    fn from(rank: Rank) -> Self {
        Bitboard(0xff << (8 * u8::from(rank)))
    }
}

impl std::ops::BitAnd for Bitboard {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 & rhs.0)
    }
}

impl std::ops::BitAnd<Square> for Bitboard {
    type Output = Self;
    fn bitand(self, rhs: Square) -> Self::Output {
        self & Bitboard::from(rhs)
    }
}

impl std::ops::BitOr for Bitboard {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 | rhs.0)
    }
}

impl std::ops::BitOr<Square> for Bitboard {
    type Output = Self;
    fn bitor(self, rhs: Square) -> Self::Output {
        self | Bitboard::from(rhs)
    }
}

impl std::ops::BitOr<Square> for Square {
    type Output = Bitboard;
    fn bitor(self, rhs: Square) -> Self::Output {
        Bitboard::from(self) | Bitboard::from(rhs)
    }
}

impl std::ops::BitXor for Bitboard {
    type Output = Self;
    fn bitxor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 ^ rhs.0)
    }
}

impl std::ops::BitXor<Square> for Bitboard {
    type Output = Self;
    fn bitxor(self, rhs: Square) -> Self::Output {
        self ^ Bitboard::from(rhs)
    }
}

impl std::ops::Not for Bitboard {
    type Output = Self;
    fn not(self) -> Self::Output {
        Bitboard(!self.0)
    }
}

impl std::ops::BitAndAssign for Bitboard {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl std::ops::BitOrAssign for Bitboard {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl std::ops::BitOrAssign<Square> for Bitboard {
    fn bitor_assign(&mut self, rhs: Square) {
        *self |= Bitboard::from(rhs);
    }
}

impl std::ops::BitXorAssign for Bitboard {
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

impl std::ops::BitXorAssign<Square> for Bitboard {
    fn bitxor_assign(&mut self, rhs: Square) {
        *self ^= Bitboard::from(rhs);
    }
}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = BitboardIterator;

    fn into_iter(self) -> Self::IntoIter {
        BitboardIterator(self.0)
    }
}

/// An iterator over the set bits in a bitboard, from the least significant to the most significant.
pub struct BitboardIterator(u64);

impl Iterator for BitboardIterator {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            return None;
        }

        let square: Square = (self.0.trailing_zeros() as u8).into();
        self.0 &= self.0 - 1;
        Some(square)
    }
}
