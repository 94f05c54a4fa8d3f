use std::fmt::Display;

use thiserror::Error;

use crate::{
    bitboard::Bitboard,
    coordinates::{CoordinatesError, Rank, Square},
    piece::{PieceError, PieceType},
    position::Position,
    r#move::{CastlingRights, CastlingSide, Move, MoveFlag},
};

/// Represents errors that can occur when parsing chess move notation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    /// The notation is not 4 or 5 ASCII characters long.
    #[error("Invalid notation: {0:?}")]
    InvalidNotation(String),

    #[error("Invalid from square: {0}")]
    InvalidFromSquare(CoordinatesError),

    #[error("Invalid to square: {0}")]
    InvalidToSquare(CoordinatesError),

    /// The fifth character does not name a piece a pawn can promote to.
    #[error("Invalid promotion piece: {0}")]
    InvalidPromotion(PieceError),

    #[error("There is no piece on the from square: {0}")]
    NoPieceAtFromSquare(Square),

    /// A pawn reaching the last rank must name the piece it promotes to, and only such a pawn can.
    #[error("Promotion mismatch in {0:?}")]
    PromotionMismatch(String),
}

impl Display for Move {
    /// Formats the move in coordinate notation ("e2e4", "e7e8q"). The null move is written "0000".
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            return write!(f, "0000");
        }

        write!(f, "{}{}", self.from(), self.to())?;
        if self.flag() == MoveFlag::Promotion {
            write!(f, "{}", char::from(self.promotion()).to_ascii_lowercase())?;
        }
        Ok(())
    }
}

/// Parses a move in coordinate notation in the context of `position`.
///
/// The notation only gives the squares and the promotion piece, the position supplies the rest: a king moving two
/// squares from its original square is a castle and a pawn moving to the en passant square captures en passant. The
/// move is not checked for legality.
pub fn parse_move(position: &Position, notation: &str) -> Result<Move, NotationError> {
    if !notation.is_ascii() || !(4..=5).contains(&notation.len()) {
        return Err(NotationError::InvalidNotation(notation.to_string()));
    }

    let from = Square::try_from(&notation[0..2]).map_err(NotationError::InvalidFromSquare)?;
    let to = Square::try_from(&notation[2..4]).map_err(NotationError::InvalidToSquare)?;
    let piece = position[from].ok_or(NotationError::NoPieceAtFromSquare(from))?;

    let promotion = notation[4..]
        .chars()
        .next()
        .map(|c| match PieceType::try_from(c) {
            Ok(piece_type) if PieceType::PROMOTIONS.contains(&piece_type) => Ok(piece_type),
            Ok(_) => Err(NotationError::InvalidPromotion(PieceError::InvalidCharacter(c))),
            Err(error) => Err(NotationError::InvalidPromotion(error)),
        })
        .transpose()?;

    let reaches_last_rank =
        piece.piece_type() == PieceType::Pawn && (to.rank() == Rank::R8 || to.rank() == Rank::R1);
    if reaches_last_rank != promotion.is_some() {
        return Err(NotationError::PromotionMismatch(notation.to_string()));
    }

    // Only the rights of the king's own colour can make its move a castle.
    let own_rights = CastlingRights::new(piece.color(), CastlingSide::Kingside)
        | CastlingRights::new(piece.color(), CastlingSide::Queenside);

    let mv = match (piece.piece_type(), promotion) {
        (_, Some(promotion)) => Move::new(from, to, MoveFlag::Promotion, promotion),
        (PieceType::King, None) if Bitboard::castle(from, to, own_rights) => {
            Move::new(from, to, MoveFlag::Castle, PieceType::Knight)
        }
        (PieceType::Pawn, None) if position.en_passant() == Some(to) => {
            Move::new(from, to, MoveFlag::EnPassant, PieceType::Knight)
        }
        _ => Move::new_basic(from, to),
    };

    Ok(mv)
}
