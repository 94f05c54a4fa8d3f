use log::debug;
use thiserror::Error;

use crate::{
    coordinates::{algebraic, File, Rank, Square},
    piece::{Color, Piece, PieceType},
    position::Position,
    r#move::CastlingRights,
};

/// The reasons a FEN string can be rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("Expected 4 to 6 fields, found {0}")]
    InvalidFieldCount(usize),

    #[error("Invalid piece placement {0:?}: {1}")]
    InvalidPiecePlacement(String, &'static str),

    #[error("Expected exactly one {0} king, found {1}")]
    InvalidKingCount(Color, usize),

    #[error("Invalid side to move: {0:?}")]
    InvalidActiveColor(String),

    #[error("Invalid castling availability: {0:?}")]
    InvalidCastlingAvailability(String),

    #[error("Castling right {0:?} requires the king and the rook on their original squares")]
    CastlingPiecesMissing(char),

    #[error("Invalid en passant square: {0:?}")]
    InvalidEnPassantSquare(String),

    #[error("Invalid halfmove clock: {0:?}")]
    InvalidHalfmoveClock(String),

    #[error("Invalid fullmove number: {0:?}")]
    InvalidFullmoveNumber(String),

    #[error("Pawn on the first or last rank ({0})")]
    PawnOnBackRank(Square),

    #[error("The side not to move is in check")]
    OpponentInCheck,
}

const MAX_HALFMOVE: u32 = 100;
const MAX_FULLMOVE: u32 = 6000;

/// Renders a castling mask as in FEN ("KQkq" order), or "-" when no right is left.
pub fn castle_string(rights: CastlingRights) -> String {
    let result: String = [
        (CastlingRights::WHITE_KINGSIDE, 'K'),
        (CastlingRights::WHITE_QUEENSIDE, 'Q'),
        (CastlingRights::BLACK_KINGSIDE, 'k'),
        (CastlingRights::BLACK_QUEENSIDE, 'q'),
    ]
    .into_iter()
    .filter(|(right, _)| rights.contains(*right))
    .map(|(_, c)| c)
    .collect();

    if result.is_empty() {
        String::from("-")
    } else {
        result
    }
}

fn castling_right(c: char) -> Option<CastlingRights> {
    match c {
        'K' => Some(CastlingRights::WHITE_KINGSIDE),
        'Q' => Some(CastlingRights::WHITE_QUEENSIDE),
        'k' => Some(CastlingRights::BLACK_KINGSIDE),
        'q' => Some(CastlingRights::BLACK_QUEENSIDE),
        _ => None,
    }
}

//======================================================================================================================
// Validation
//======================================================================================================================

fn read_clock(text: &str, max: u32, error: fn(String) -> FenError) -> Result<u32, FenError> {
    match text.parse::<u32>() {
        Ok(value) if value <= max && text.bytes().all(|b| b.is_ascii_digit()) => Ok(value),
        _ => Err(error(text.to_string())),
    }
}

fn read_piece_placement(text: &str) -> Result<[Option<Piece>; Square::COUNT], FenError> {
    let invalid = |reason| FenError::InvalidPiecePlacement(text.to_string(), reason);

    let mut mailbox = [None; Square::COUNT];
    let mut rank = Rank::COUNT - 1;
    let mut file = 0;

    for c in text.chars() {
        match c {
            '/' => {
                if file != File::COUNT {
                    return Err(invalid("a rank does not have exactly 8 squares"));
                }
                if rank == 0 {
                    return Err(invalid("too many ranks"));
                }
                rank -= 1;
                file = 0;
            }
            '1'..='8' => {
                file += c as usize - '0' as usize;
                if file > File::COUNT {
                    return Err(invalid("a rank has more than 8 squares"));
                }
            }
            _ => {
                let piece = Piece::try_from(c).map_err(|_| invalid("unexpected character"))?;
                if file >= File::COUNT {
                    return Err(invalid("a rank has more than 8 squares"));
                }
                mailbox[rank * File::COUNT + file] = Some(piece);
                file += 1;
            }
        }
    }

    if rank != 0 || file != File::COUNT {
        return Err(invalid("the placement does not cover the 64 squares"));
    }

    Ok(mailbox)
}

fn read_active_color(text: &str) -> Result<Color, FenError> {
    match text {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        _ => Err(FenError::InvalidActiveColor(text.to_string())),
    }
}

fn read_castling(text: &str, mailbox: &[Option<Piece>; Square::COUNT]) -> Result<CastlingRights, FenError> {
    if text == "-" {
        return Ok(CastlingRights::empty());
    }

    let invalid = || FenError::InvalidCastlingAvailability(text.to_string());
    if text.is_empty() || text.len() > 4 {
        return Err(invalid());
    }

    let mut rights = CastlingRights::empty();
    for c in text.chars() {
        let right = castling_right(c).ok_or_else(invalid)?;
        if rights.contains(right) {
            return Err(invalid());
        }
        rights |= right;

        let (king, rook, king_square, rook_square) = match c {
            'K' => (Piece::WHITE_KING, Piece::WHITE_ROOK, Square::E1, Square::H1),
            'Q' => (Piece::WHITE_KING, Piece::WHITE_ROOK, Square::E1, Square::A1),
            'k' => (Piece::BLACK_KING, Piece::BLACK_ROOK, Square::E8, Square::H8),
            _ => (Piece::BLACK_KING, Piece::BLACK_ROOK, Square::E8, Square::A8),
        };
        if mailbox[usize::from(king_square)] != Some(king) || mailbox[usize::from(rook_square)] != Some(rook) {
            return Err(FenError::CastlingPiecesMissing(c));
        }
    }

    Ok(rights)
}

fn read_en_passant(
    text: &str,
    turn: Color,
    mailbox: &[Option<Piece>; Square::COUNT],
) -> Result<Option<Square>, FenError> {
    if text == "-" {
        return Ok(None);
    }

    let invalid = || FenError::InvalidEnPassantSquare(text.to_string());
    let target = Square::try_from(text).map_err(|_| invalid())?;

    // The pawn that just moved two squares stands in front of the target, the square it came from is behind it.
    let (mover, pawn_square, origin) = match (target.rank(), turn) {
        (Rank::R3, Color::Black) => (Piece::WHITE_PAWN, target.offset(8), target.offset(-8)),
        (Rank::R6, Color::White) => (Piece::BLACK_PAWN, target.offset(-8), target.offset(8)),
        _ => return Err(invalid()),
    };

    if mailbox[usize::from(pawn_square)] != Some(mover)
        || mailbox[usize::from(target)].is_some()
        || mailbox[usize::from(origin)].is_some()
    {
        return Err(invalid());
    }

    Ok(Some(target))
}

fn validate(fen: &str) -> Result<(), FenError> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if !(4..=6).contains(&fields.len()) {
        return Err(FenError::InvalidFieldCount(fields.len()));
    }

    let halfmove = match fields.get(4) {
        Some(text) => read_clock(text, MAX_HALFMOVE, FenError::InvalidHalfmoveClock)?,
        None => 0,
    };
    let fullmove = match fields.get(5) {
        Some(text) => read_clock(text, MAX_FULLMOVE, FenError::InvalidFullmoveNumber)?,
        None => 1,
    };

    let mailbox = read_piece_placement(fields[0])?;
    for color in Color::ALL {
        let king = Piece::new(color, PieceType::King);
        let count = mailbox.iter().filter(|piece| **piece == Some(king)).count();
        if count != 1 {
            return Err(FenError::InvalidKingCount(color, count));
        }
    }

    let turn = read_active_color(fields[1])?;
    let castle = read_castling(fields[2], &mailbox)?;
    let en_passant = read_en_passant(fields[3], turn, &mailbox)?;

    for file in File::ALL {
        for rank in [Rank::R1, Rank::R8] {
            let square = Square::new(file, rank);
            if mailbox[usize::from(square)].is_some_and(|piece| piece.piece_type() == PieceType::Pawn) {
                return Err(FenError::PawnOnBackRank(square));
            }
        }
    }

    // The side that just moved can not have left its king in check.
    let position = Position::from_parts(&mailbox, turn, castle, en_passant, halfmove, fullmove);
    if (position.generate_attacked(!turn) & position.bitboard(!turn, PieceType::King)).has_any() {
        return Err(FenError::OpponentInCheck);
    }

    Ok(())
}

/// Validates a FEN string without building a position for the caller.
///
/// Besides the syntax of each field, the validator checks that the position could arise in a game: one king per side,
/// no pawn on the first or last rank, castling rights backed by a king and a rook on their original squares, an en
/// passant square behind a pawn that just moved two squares, and the side not to move not in check.
pub fn fen_is_ok(fen: &str) -> Result<(), FenError> {
    let result = validate(fen);
    if let Err(error) = &result {
        debug!("Rejected FEN {:?}: {}", fen, error);
    }
    result
}

//======================================================================================================================
// Parsing and serialization
//======================================================================================================================

impl Position {
    /// Creates a position from a FEN string that is assumed to be valid.
    ///
    /// This is a single pass over the text without any check. Characters that do not belong to the placement are
    /// skipped and the optional clocks default to 0 and 1. Use `Position::from_fen` for text coming from outside.
    pub fn from_fen_unchecked(fen: &str) -> Position {
        let mut fields = fen.split_whitespace();

        let mut mailbox = [None; Square::COUNT];
        let mut cursor: i32 = 56;
        for c in fields.next().unwrap_or_default().chars() {
            match c {
                '/' => cursor -= 16,
                '1'..='8' => cursor += c as i32 - '0' as i32,
                _ => {
                    if let Ok(piece) = Piece::try_from(c) {
                        if (0..Square::COUNT as i32).contains(&cursor) {
                            mailbox[cursor as usize] = Some(piece);
                        }
                        cursor += 1;
                    }
                }
            }
        }

        let turn = if fields.next() == Some("b") { Color::Black } else { Color::White };
        let castle = fields
            .next()
            .unwrap_or_default()
            .chars()
            .filter_map(castling_right)
            .fold(CastlingRights::empty(), |rights, right| rights | right);
        let en_passant = fields.next().and_then(|text| Square::try_from(text).ok());
        let halfmove = fields.next().and_then(|text| text.parse().ok()).unwrap_or(0);
        let fullmove = fields.next().and_then(|text| text.parse().ok()).unwrap_or(1);

        Position::from_parts(&mailbox, turn, castle, en_passant, halfmove, fullmove)
    }

    /// Creates a position from a FEN string, rejecting any string that `fen_is_ok` rejects.
    pub fn from_fen(fen: &str) -> Result<Position, FenError> {
        fen_is_ok(fen)?;
        Ok(Position::from_fen_unchecked(fen))
    }

    fn write_piece_placement(&self) -> String {
        let mut result = String::with_capacity(72);
        for rank in Rank::ALL.iter().rev() {
            let mut empty_count = 0;
            for file in File::ALL {
                match self[Square::new(file, *rank)] {
                    Some(piece) => {
                        if empty_count > 0 {
                            result.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        result.push(piece.into());
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                result.push_str(&empty_count.to_string());
            }
            if *rank != Rank::R1 {
                result.push('/');
            }
        }
        result
    }

    /// Returns the FEN representation of the position.
    pub fn to_fen(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.write_piece_placement(),
            char::from(self.turn()),
            castle_string(self.castle()),
            algebraic(self.en_passant()),
            self.halfmove(),
            self.fullmove()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::Bitboard;

    #[test]
    fn test_from_fen_initial_position() {
        let position = Position::from_fen(Position::START_FEN).unwrap();
        assert_eq!(position, Position::default());
        assert_eq!(position.bitboard(Color::White, PieceType::Rook), Square::A1 | Square::H1);
        assert_eq!(position.bitboard(Color::Black, PieceType::King), Bitboard::from(Square::E8));
    }

    #[test]
    fn test_from_fen_black_to_play_with_en_passant() {
        let position =
            Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
        assert_eq!(position.turn(), Color::Black);
        assert_eq!(position.en_passant(), Some(Square::E3));
        assert_eq!(position.zobrist_key(), position.zobrist_from_scratch());
    }

    #[test]
    fn test_from_fen_without_clocks() {
        let position = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - -").unwrap();
        assert_eq!(position.halfmove(), 0);
        assert_eq!(position.fullmove(), 1);
        assert_eq!(position.to_fen(), "4k3/8/8/8/8/8/8/4K3 w - - 0 1");
    }

    #[test]
    fn test_to_fen_round_trip() {
        let fens = [
            Position::START_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbqkbnr/pp1ppppp/8/2pP4/8/8/PPP1PPPP/RNBQKBNR w Kq c6 0 3",
            "r3k2r/8/8/8/8/8/8/R3K2R b Qk - 99 5999",
        ];
        for fen in fens {
            assert_eq!(Position::from_fen(fen).unwrap().to_fen(), fen);
        }
    }

    #[test]
    fn test_to_fen_canonical_castling_order() {
        let position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w qkQK - 0 1").unwrap();
        assert_eq!(position.to_fen(), "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    }

    #[test]
    fn test_castle_string() {
        assert_eq!(castle_string(CastlingRights::all()), "KQkq");
        assert_eq!(castle_string(CastlingRights::empty()), "-");
        assert_eq!(castle_string(CastlingRights::WHITE_QUEENSIDE | CastlingRights::BLACK_KINGSIDE), "Qk");
    }

    #[test]
    fn test_fen_is_ok_accepts_initial_position() {
        assert_eq!(fen_is_ok(Position::START_FEN), Ok(()));
    }

    #[test]
    fn test_fen_is_ok_rejects_missing_kings() {
        assert_eq!(fen_is_ok("8/8/8/8/8/8/8/8 w - - 0 1"), Err(FenError::InvalidKingCount(Color::White, 0)));
        assert_eq!(
            fen_is_ok("4k3/8/8/8/8/8/8/3KK3 w - - 0 1"),
            Err(FenError::InvalidKingCount(Color::White, 2))
        );
    }

    #[test]
    fn test_fen_is_ok_rejects_field_count() {
        assert_eq!(fen_is_ok("4k3/8/8/8/8/8/8/4K3 w -"), Err(FenError::InvalidFieldCount(3)));
        assert_eq!(fen_is_ok("4k3/8/8/8/8/8/8/4K3 w - - 0 1 1"), Err(FenError::InvalidFieldCount(7)));
    }

    #[test]
    fn test_fen_is_ok_rejects_bad_placement() {
        for fen in [
            "4k3/8/8/8/8/8/8/4K4 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K2 w - - 0 1",
            "4k3/8/8/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8//4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K2x w - - 0 1",
            "4k3/8/8/8/8/8/8/4K3/ w - - 0 1",
            "4k3/8/8/8/8/8/8/4K03 w - - 0 1",
        ] {
            assert!(matches!(fen_is_ok(fen), Err(FenError::InvalidPiecePlacement(_, _))), "{}", fen);
        }
    }

    #[test]
    fn test_fen_is_ok_rejects_bad_side_to_move() {
        assert!(matches!(fen_is_ok("4k3/8/8/8/8/8/8/4K3 x - - 0 1"), Err(FenError::InvalidActiveColor(_))));
        assert!(matches!(fen_is_ok("4k3/8/8/8/8/8/8/4K3 wb - - 0 1"), Err(FenError::InvalidActiveColor(_))));
    }

    #[test]
    fn test_fen_is_ok_rejects_castling_without_rook() {
        assert_eq!(fen_is_ok("4k3/8/8/8/8/8/8/R3K3 w K - 0 1"), Err(FenError::CastlingPiecesMissing('K')));
        assert_eq!(fen_is_ok("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1"), Ok(()));
        assert_eq!(fen_is_ok("r3k3/8/8/8/8/8/8/R2K4 w Q - 0 1"), Err(FenError::CastlingPiecesMissing('Q')));
        assert!(matches!(
            fen_is_ok("r3k2r/8/8/8/8/8/8/R3K2R w KQkqK - 0 1"),
            Err(FenError::InvalidCastlingAvailability(_))
        ));
        assert!(matches!(
            fen_is_ok("r3k2r/8/8/8/8/8/8/R3K2R w KK - 0 1"),
            Err(FenError::InvalidCastlingAvailability(_))
        ));
        assert!(matches!(
            fen_is_ok("r3k2r/8/8/8/8/8/8/R3K2R w -K - 0 1"),
            Err(FenError::InvalidCastlingAvailability(_))
        ));
    }

    #[test]
    fn test_fen_is_ok_en_passant() {
        assert_eq!(fen_is_ok("4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1"), Ok(()));
        assert_eq!(fen_is_ok("4k3/8/8/3p4/8/8/8/4K3 w - d6 0 1"), Ok(()));

        for fen in [
            "4k3/8/8/8/4P3/8/8/4K3 w - e3 0 1",
            "4k3/8/8/8/8/8/8/4K3 b - e3 0 1",
            "4k3/8/8/8/4P3/8/4N3/4K3 b - e3 0 1",
            "4k3/8/8/8/4P3/8/8/4K3 b - e4 0 1",
            "4k3/8/8/8/4P3/8/8/4K3 b - e 0 1",
            "4k3/8/8/8/4P3/8/8/4K3 b - e33 0 1",
        ] {
            assert!(matches!(fen_is_ok(fen), Err(FenError::InvalidEnPassantSquare(_))), "{}", fen);
        }
    }

    #[test]
    fn test_fen_is_ok_rejects_clocks() {
        assert!(matches!(fen_is_ok("4k3/8/8/8/8/8/8/4K3 w - - 101 1"), Err(FenError::InvalidHalfmoveClock(_))));
        assert!(matches!(fen_is_ok("4k3/8/8/8/8/8/8/4K3 w - - -1 1"), Err(FenError::InvalidHalfmoveClock(_))));
        assert!(matches!(fen_is_ok("4k3/8/8/8/8/8/8/4K3 w - - 0 6001"), Err(FenError::InvalidFullmoveNumber(_))));
        assert!(matches!(fen_is_ok("4k3/8/8/8/8/8/8/4K3 w - - 0 x"), Err(FenError::InvalidFullmoveNumber(_))));
        assert_eq!(fen_is_ok("4k3/8/8/8/8/8/8/4K3 w - - 100 6000"), Ok(()));
    }

    #[test]
    fn test_fen_is_ok_rejects_pawns_on_back_ranks() {
        assert_eq!(fen_is_ok("4k3/8/8/8/8/8/8/P3K3 w - - 0 1"), Err(FenError::PawnOnBackRank(Square::A1)));
        assert_eq!(fen_is_ok("4k2p/8/8/8/8/8/8/4K3 w - - 0 1"), Err(FenError::PawnOnBackRank(Square::H8)));
    }

    #[test]
    fn test_fen_is_ok_rejects_side_not_to_move_in_check() {
        assert_eq!(fen_is_ok("4k3/8/8/8/8/8/8/4K2R w - - 0 1"), Ok(()));
        assert_eq!(fen_is_ok("4k3/8/8/8/8/8/8/4R1K1 w - - 0 1"), Err(FenError::OpponentInCheck));
        assert_eq!(fen_is_ok("4k3/8/8/8/8/8/8/4R1K1 b - - 0 1"), Ok(()));
    }

    #[test]
    fn test_from_fen_unchecked_is_lenient() {
        let position = Position::from_fen_unchecked("4k3/8/8/8/8/8/8/4K3");
        assert_eq!(position.turn(), Color::White);
        assert_eq!(position.castle(), CastlingRights::empty());
        assert_eq!(position.fullmove(), 1);
        assert_eq!(position[Square::E1], Some(Piece::WHITE_KING));
    }
}
