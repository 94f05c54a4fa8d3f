use bitflags::bitflags;

use crate::{
    coordinates::Square,
    piece::{Color, PieceType},
};

//======================================================================================================================
// Castling
//======================================================================================================================

/// The two sides a king can castle to.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CastlingSide {
    Kingside = 0,
    Queenside = 1,
}

impl CastlingSide {
    pub const COUNT: usize = 2;
    pub const ALL: [CastlingSide; CastlingSide::COUNT] = [CastlingSide::Kingside, CastlingSide::Queenside];
}

bitflags! {
    /// The castling availability mask. Bit 0 is white kingside, bit 1 white queenside, bit 2 black kingside and bit 3
    /// black queenside.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CastlingRights: u8 {
        const WHITE_KINGSIDE = 0b0001;
        const WHITE_QUEENSIDE = 0b0010;
        const BLACK_KINGSIDE = 0b0100;
        const BLACK_QUEENSIDE = 0b1000;
    }
}

impl CastlingRights {
    /// Number of distinct castling masks.
    pub const COUNT: usize = 16;

    /// Returns the single right for a color and a side.
    pub fn new(color: Color, side: CastlingSide) -> Self {
        match (color, side) {
            (Color::White, CastlingSide::Kingside) => CastlingRights::WHITE_KINGSIDE,
            (Color::White, CastlingSide::Queenside) => CastlingRights::WHITE_QUEENSIDE,
            (Color::Black, CastlingSide::Kingside) => CastlingRights::BLACK_KINGSIDE,
            (Color::Black, CastlingSide::Queenside) => CastlingRights::BLACK_QUEENSIDE,
        }
    }
}

//======================================================================================================================
// Move
//======================================================================================================================

/// The special flag of a move.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MoveFlag {
    None = 0,
    EnPassant = 1,
    Promotion = 2,
    Castle = 3,
}

impl From<u8> for MoveFlag {
    fn from(value: u8) -> Self {
        match value & 0b11 {
            0 => MoveFlag::None,
            1 => MoveFlag::EnPassant,
            2 => MoveFlag::Promotion,
            _ => MoveFlag::Castle,
        }
    }
}

/// A chess move packed in a single 64-bit value.
///
/// The move generator only fills the source, target, flag and promotion fields. When the move is applied to a position
/// the remaining fields receive everything that the move destroys, so the very same value is enough to take the move
/// back without any history stack.
///
/// Bits     Content
/// -------  ---------
///  0 - 5   Source square
///  6 - 11  Target square
/// 12 - 13  Flag (none, en passant, promotion, castle)
/// 14 - 15  Promotion piece (knight, bishop, rook, queen)
/// 16 - 18  Captured piece (none, pawn, knight, bishop, rook, queen)
/// 19 - 22  Castling rights before the move
/// 24 - 29  En passant square before the move (0 when there was none)
/// 30 - 39  Halfmove clock before the move
/// 40 - 63  Fullmove number before the move
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
pub struct Move(u64);

impl Move {
    const FROM_SHIFT: u32 = 0;
    const TO_SHIFT: u32 = 6;
    const FLAG_SHIFT: u32 = 12;
    const PROMOTION_SHIFT: u32 = 14;
    const CAPTURE_SHIFT: u32 = 16;
    const CASTLE_SHIFT: u32 = 19;
    const EN_PASSANT_SHIFT: u32 = 24;
    const HALFMOVE_SHIFT: u32 = 30;
    const FULLMOVE_SHIFT: u32 = 40;

    const SQUARE_MASK: u64 = 0x3f;
    const CAPTURE_MASK: u64 = 0x7;
    const CASTLE_MASK: u64 = 0xf;
    const HALFMOVE_MASK: u64 = 0x3ff;
    const FULLMOVE_MASK: u64 = 0xff_ffff;

    /// Largest halfmove clock the undo payload can hold. Positions saturate their clock at this value.
    pub const MAX_HALFMOVE: u32 = Self::HALFMOVE_MASK as u32;

    /// Largest fullmove number the undo payload can hold.
    pub const MAX_FULLMOVE: u32 = Self::FULLMOVE_MASK as u32;

    /// The null move, used as a sentinel. It can never be legal since its source and target are both A1.
    pub const NULL: Move = Move(0);

    /// Creates a move with only the fields known to the move generator.
    pub fn new(from: Square, to: Square, flag: MoveFlag, promotion: PieceType) -> Self {
        let promotion = match promotion {
            PieceType::Bishop => 1,
            PieceType::Rook => 2,
            PieceType::Queen => 3,
            _ => 0,
        };

        Move(
            (u8::from(from) as u64) << Self::FROM_SHIFT
                | (u8::from(to) as u64) << Self::TO_SHIFT
                | (flag as u64) << Self::FLAG_SHIFT
                | promotion << Self::PROMOTION_SHIFT,
        )
    }

    /// Creates a move without any special flag.
    pub fn new_basic(from: Square, to: Square) -> Self {
        Self::new(from, to, MoveFlag::None, PieceType::Knight)
    }

    pub fn is_null(self) -> bool {
        self == Move::NULL
    }

    /// Returns the source square of the move.
    pub fn from(self) -> Square {
        Square::from(((self.0 >> Self::FROM_SHIFT) & Self::SQUARE_MASK) as u8)
    }

    /// Returns the target square of the move.
    pub fn to(self) -> Square {
        Square::from(((self.0 >> Self::TO_SHIFT) & Self::SQUARE_MASK) as u8)
    }

    pub fn flag(self) -> MoveFlag {
        MoveFlag::from((self.0 >> Self::FLAG_SHIFT) as u8)
    }

    /// Returns the promotion piece. Only meaningful when the flag is `MoveFlag::Promotion`.
    pub fn promotion(self) -> PieceType {
        PieceType::PROMOTIONS[((self.0 >> Self::PROMOTION_SHIFT) & 0b11) as usize]
    }

    /// Returns the kind of the piece captured by the move, once the move has been applied.
    pub fn captured(self) -> Option<PieceType> {
        match (self.0 >> Self::CAPTURE_SHIFT) & Self::CAPTURE_MASK {
            0 => None,
            value => Some(PieceType::from(value as u8)),
        }
    }

    /// Returns the castling rights as they were before the move.
    pub fn castle(self) -> CastlingRights {
        CastlingRights::from_bits_truncate(((self.0 >> Self::CASTLE_SHIFT) & Self::CASTLE_MASK) as u8)
    }

    /// Returns the en passant square as it was before the move.
    pub fn en_passant(self) -> Option<Square> {
        match (self.0 >> Self::EN_PASSANT_SHIFT) & Self::SQUARE_MASK {
            0 => None,
            value => Some(Square::from(value as u8)),
        }
    }

    /// Returns the halfmove clock as it was before the move.
    pub fn halfmove(self) -> u32 {
        ((self.0 >> Self::HALFMOVE_SHIFT) & Self::HALFMOVE_MASK) as u32
    }

    /// Returns the fullmove number as it was before the move.
    pub fn fullmove(self) -> u32 {
        (self.0 >> Self::FULLMOVE_SHIFT) as u32
    }

    fn with_field(self, shift: u32, mask: u64, value: u64) -> Self {
        debug_assert!(value <= mask, "value does not fit in the move field");
        Move((self.0 & !(mask << shift)) | ((value & mask) << shift))
    }

    /// Records the kind of the captured piece. A king can never be captured.
    pub fn with_captured(self, captured: Option<PieceType>) -> Self {
        debug_assert_ne!(captured, Some(PieceType::King));
        self.with_field(Self::CAPTURE_SHIFT, Self::CAPTURE_MASK, captured.map_or(0, |kind| u8::from(kind) as u64))
    }

    /// Records the castling rights held before the move.
    pub fn with_castle(self, castle: CastlingRights) -> Self {
        self.with_field(Self::CASTLE_SHIFT, Self::CASTLE_MASK, castle.bits() as u64)
    }

    /// Records the en passant square held before the move.
    pub fn with_en_passant(self, en_passant: Option<Square>) -> Self {
        self.with_field(Self::EN_PASSANT_SHIFT, Self::SQUARE_MASK, en_passant.map_or(0, |sq| u8::from(sq) as u64))
    }

    /// Records the halfmove clock. It must not exceed `MAX_HALFMOVE`.
    pub fn with_halfmove(self, halfmove: u32) -> Self {
        self.with_field(Self::HALFMOVE_SHIFT, Self::HALFMOVE_MASK, halfmove as u64)
    }

    /// Records the fullmove number. It must not exceed `MAX_FULLMOVE`.
    pub fn with_fullmove(self, fullmove: u32) -> Self {
        self.with_field(Self::FULLMOVE_SHIFT, Self::FULLMOVE_MASK, fullmove as u64)
    }

    /// Returns the move stripped of its undo payload, as the move generator would have produced it.
    pub fn without_payload(self) -> Self {
        Move(self.0 & 0xffff)
    }
}

impl From<Move> for u64 {
    fn from(mv: Move) -> u64 {
        mv.0
    }
}

impl From<u64> for Move {
    fn from(value: u64) -> Self {
        Move(value)
    }
}
