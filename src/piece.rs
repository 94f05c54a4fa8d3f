use std::fmt::Display;

use thiserror::Error;

/// Represents an error that occurs when converting a character to a piece.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PieceError {
    #[error("Invalid piece character: {0:?}")]
    InvalidCharacter(char),
}

/// Represents the color of a chess piece.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub const COUNT: usize = 2;

    pub const WHITE_VALUE: u8 = 0;
    pub const BLACK_VALUE: u8 = 1;

    /// Represents all colors of chess pieces.
    pub const ALL: [Color; Color::COUNT] = [Color::White, Color::Black];
}

impl std::ops::Not for Color {
    type Output = Color;

    /// Returns the opposite color.
    fn not(self) -> Self::Output {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

impl From<Color> for u8 {
    fn from(color: Color) -> Self {
        color as u8
    }
}

impl From<Color> for usize {
    fn from(color: Color) -> Self {
        color as usize
    }
}

impl From<u8> for Color {
    fn from(value: u8) -> Self {
        match value {
            Color::WHITE_VALUE => Color::White,
            Color::BLACK_VALUE => Color::Black,
            _ => panic!("Invalid color value"),
        }
    }
}

impl From<Color> for char {
    /// Converts a color to the side-to-move token used by FEN.
    fn from(color: Color) -> Self {
        match color {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
}

/// The kind of a chess piece, independent of its color.
///
/// The discriminants start at one so that a per-side array of bitboards can keep the union of all its pieces at index
/// zero.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PieceType {
    Pawn = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
    King = 6,
}

impl PieceType {
    pub const COUNT: usize = 6;

    pub const PAWN_VALUE: u8 = 1;
    pub const KNIGHT_VALUE: u8 = 2;
    pub const BISHOP_VALUE: u8 = 3;
    pub const ROOK_VALUE: u8 = 4;
    pub const QUEEN_VALUE: u8 = 5;
    pub const KING_VALUE: u8 = 6;

    /// Represents all piece types.
    pub const ALL: [PieceType; PieceType::COUNT] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    /// The pieces a pawn can promote to, in the order of their two-bit promotion code.
    pub const PROMOTIONS: [PieceType; 4] = [PieceType::Knight, PieceType::Bishop, PieceType::Rook, PieceType::Queen];
}

impl From<PieceType> for u8 {
    fn from(piece_type: PieceType) -> Self {
        piece_type as u8
    }
}

impl From<PieceType> for usize {
    fn from(piece_type: PieceType) -> Self {
        piece_type as usize
    }
}

impl From<u8> for PieceType {
    /// Converts a `u8` value (1 to 6) to a `PieceType`.
    fn from(value: u8) -> Self {
        assert!((1..=6).contains(&value), "Invalid piece type value");
        PieceType::ALL[value as usize - 1]
    }
}

impl From<PieceType> for char {
    fn from(piece_type: PieceType) -> Self {
        match piece_type {
            PieceType::Pawn => 'P',
            PieceType::Knight => 'N',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            PieceType::Queen => 'Q',
            PieceType::King => 'K',
        }
    }
}

impl TryFrom<char> for PieceType {
    type Error = PieceError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase() {
            'p' => Ok(PieceType::Pawn),
            'n' => Ok(PieceType::Knight),
            'b' => Ok(PieceType::Bishop),
            'r' => Ok(PieceType::Rook),
            'q' => Ok(PieceType::Queen),
            'k' => Ok(PieceType::King),
            _ => Err(PieceError::InvalidCharacter(value)),
        }
    }
}

impl Display for PieceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PieceType::Pawn => write!(f, "Pawn"),
            PieceType::Knight => write!(f, "Knight"),
            PieceType::Bishop => write!(f, "Bishop"),
            PieceType::Rook => write!(f, "Rook"),
            PieceType::Queen => write!(f, "Queen"),
            PieceType::King => write!(f, "King"),
        }
    }
}

/// Represents a chess piece.
///
/// A `Piece` is stored as its mailbox code: 1 to 6 for the white pawn to king, 7 to 12 for the black pawn to king. The
/// value 0 is reserved for an empty square and is never a valid `Piece`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Piece(u8);

#[allow(dead_code)]
impl Piece {
    pub const WHITE_PAWN: Piece = Piece(1);
    pub const WHITE_KNIGHT: Piece = Piece(2);
    pub const WHITE_BISHOP: Piece = Piece(3);
    pub const WHITE_ROOK: Piece = Piece(4);
    pub const WHITE_QUEEN: Piece = Piece(5);
    pub const WHITE_KING: Piece = Piece(6);
    pub const BLACK_PAWN: Piece = Piece(7);
    pub const BLACK_KNIGHT: Piece = Piece(8);
    pub const BLACK_BISHOP: Piece = Piece(9);
    pub const BLACK_ROOK: Piece = Piece(10);
    pub const BLACK_QUEEN: Piece = Piece(11);
    pub const BLACK_KING: Piece = Piece(12);

    pub const COUNT: usize = 12;

    /// Represents all possible chess pieces, in mailbox code order.
    pub const ALL: [Piece; Piece::COUNT] = [
        Piece::WHITE_PAWN,
        Piece::WHITE_KNIGHT,
        Piece::WHITE_BISHOP,
        Piece::WHITE_ROOK,
        Piece::WHITE_QUEEN,
        Piece::WHITE_KING,
        Piece::BLACK_PAWN,
        Piece::BLACK_KNIGHT,
        Piece::BLACK_BISHOP,
        Piece::BLACK_ROOK,
        Piece::BLACK_QUEEN,
        Piece::BLACK_KING,
    ];

    const CHARACTERS: &'static str = "PNBRQKpnbrqk";
    const GLYPHS: [char; Piece::COUNT] = ['♙', '♘', '♗', '♖', '♕', '♔', '♟', '♞', '♝', '♜', '♛', '♚'];

    /// Creates a new `Piece` with the given `Color` and `PieceType`.
    pub fn new(color: Color, piece_type: PieceType) -> Self {
        Piece(u8::from(piece_type) + 6 * u8::from(color))
    }

    /// Returns the Color of the piece.
    pub fn color(self) -> Color {
        if self.0 > 6 {
            Color::Black
        } else {
            Color::White
        }
    }

    /// Returns the PieceType of the piece.
    pub fn piece_type(self) -> PieceType {
        PieceType::from((self.0 - 1) % 6 + 1)
    }

    /// Returns the mailbox code of the piece (1 to 12).
    pub fn code(self) -> u8 {
        self.0
    }

    /// Returns the zero based index of the piece, used to address per-piece tables such as the Zobrist keys.
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// Returns the Unicode chess glyph of the piece.
    pub fn glyph(self) -> char {
        Self::GLYPHS[self.index()]
    }
}

impl From<Piece> for u8 {
    fn from(piece: Piece) -> Self {
        piece.0
    }
}

impl From<u8> for Piece {
    /// Converts a mailbox code (1 to 12) to a `Piece`.
    fn from(value: u8) -> Self {
        assert!((1..=12).contains(&value), "Invalid piece code");
        Piece(value)
    }
}

impl From<Piece> for char {
    /// Converts a `Piece` to its FEN character.
    fn from(piece: Piece) -> Self {
        Piece::CHARACTERS.as_bytes()[piece.index()] as char
    }
}

impl TryFrom<char> for Piece {
    type Error = PieceError;

    /// Converts a FEN character to a `Piece`.
    fn try_from(value: char) -> Result<Self, Self::Error> {
        Piece::CHARACTERS
            .find(value)
            .map(|index| Piece(index as u8 + 1))
            .ok_or(PieceError::InvalidCharacter(value))
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.color(), self.piece_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod color_tests {
        use super::*;

        #[test]
        fn test_color_display() {
            assert_eq!(format!("{}", Color::White), "White");
            assert_eq!(format!("{}", Color::Black), "Black");
        }

        #[test]
        fn test_opposite() {
            assert_eq!(!Color::White, Color::Black);
            assert_eq!(!Color::Black, Color::White);
        }

        #[test]
        fn test_color_to_fen_char() {
            assert_eq!(char::from(Color::White), 'w');
            assert_eq!(char::from(Color::Black), 'b');
        }
    }

    mod piece_type_tests {
        use super::*;

        #[test]
        fn test_piece_type_conversion() {
            assert_eq!(u8::from(PieceType::Pawn), 1);
            assert_eq!(u8::from(PieceType::King), 6);
            assert_eq!(PieceType::from(1), PieceType::Pawn);
            assert_eq!(PieceType::from(4), PieceType::Rook);
            assert!(std::panic::catch_unwind(|| PieceType::from(0)).is_err());
        }

        #[test]
        fn test_piece_type_from_character() {
            assert_eq!(PieceType::try_from('p'), Ok(PieceType::Pawn));
            assert_eq!(PieceType::try_from('N'), Ok(PieceType::Knight));
            assert_eq!(PieceType::try_from('q'), Ok(PieceType::Queen));
            assert!(PieceType::try_from('x').is_err());
            assert!(PieceType::try_from('1').is_err());
        }
    }

    mod piece_tests {
        use super::*;

        #[test]
        fn test_piece_creation() {
            for color in Color::ALL {
                for piece_type in PieceType::ALL {
                    let piece = Piece::new(color, piece_type);
                    assert_eq!(piece.color(), color);
                    assert_eq!(piece.piece_type(), piece_type);
                }
            }
        }

        #[test]
        fn test_mailbox_codes() {
            assert_eq!(Piece::new(Color::White, PieceType::Pawn).code(), 1);
            assert_eq!(Piece::new(Color::White, PieceType::King).code(), 6);
            assert_eq!(Piece::new(Color::Black, PieceType::Pawn).code(), 7);
            assert_eq!(Piece::new(Color::Black, PieceType::King).code(), 12);
            assert_eq!(Piece::BLACK_KING.index(), 11);
        }

        #[test]
        fn test_char_conversions() {
            for piece in Piece::ALL {
                assert_eq!(Piece::try_from(char::from(piece)), Ok(piece));
            }
            assert_eq!(char::from(Piece::WHITE_KNIGHT), 'N');
            assert_eq!(char::from(Piece::BLACK_QUEEN), 'q');
            assert_eq!(Piece::try_from('x'), Err(PieceError::InvalidCharacter('x')));
        }

        #[test]
        fn test_display_for_piece() {
            assert_eq!(format!("{}", Piece::WHITE_PAWN), "White Pawn");
            assert_eq!(format!("{}", Piece::BLACK_KING), "Black King");
        }

        #[test]
        fn test_glyph() {
            assert_eq!(Piece::WHITE_KING.glyph(), '♔');
            assert_eq!(Piece::BLACK_PAWN.glyph(), '♟');
        }
    }
}
