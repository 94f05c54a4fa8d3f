use crate::{
    bitboard::Bitboard,
    coordinates::{File, Rank, Square},
    piece::{Color, PieceType},
    position::Position,
    r#move::{CastlingRights, CastlingSide, Move, MoveFlag},
};

use super::{
    attacks::{attacks_from, bishop_attacks, knight_attacks, pawn_attacks, rook_attacks},
    move_list::MoveList,
};

/// Everything the generators of one side need to know about the position, computed once per call.
struct Context {
    king: Square,
    enemy: Bitboard,
    occupied: Bitboard,
    pinned: Bitboard,
    targets: Bitboard,
}

impl Context {
    /// Returns the squares a piece standing on `from` may move to, given the pin restrictions.
    fn allowed(&self, from: Square) -> Bitboard {
        if self.pinned.get(from) {
            self.targets & Bitboard::line(self.king, from)
        } else {
            self.targets
        }
    }
}

fn push_forward<const COLOR: u8>(bb: Bitboard) -> Bitboard {
    match COLOR {
        Color::WHITE_VALUE => bb.north(),
        Color::BLACK_VALUE => bb.south(),
        _ => panic!("Invalid color value"),
    }
}

/// Returns whether capturing en passant from `from` leaves the king out of check. The whole occupancy is recomputed
/// since the move empties two squares on the same rank, which can uncover a rook or queen.
fn en_passant_is_legal<const COLOR: u8>(position: &Position, context: &Context, from: Square, to: Square) -> bool {
    let us = Color::from(COLOR);
    let them = !us;
    let captured = Square::new(to.file(), from.rank());
    let occupied = (context.occupied ^ from ^ captured) | to;

    let queens = position.bitboard(them, PieceType::Queen);
    let rooks = position.bitboard(them, PieceType::Rook) | queens;
    let bishops = position.bitboard(them, PieceType::Bishop) | queens;
    let knights = position.bitboard(them, PieceType::Knight);
    let pawns = position.bitboard(them, PieceType::Pawn).without(captured);

    let attackers = (rook_attacks(context.king, occupied) & rooks)
        | (bishop_attacks(context.king, occupied) & bishops)
        | (knight_attacks(context.king) & knights)
        | (pawn_attacks(us, context.king) & pawns);

    attackers.has_none()
}

fn generate_pawn_moves<const COLOR: u8>(position: &Position, context: &Context, list: &mut MoveList) {
    let us = Color::from(COLOR);
    let (double_push_rank, last_rank) = match us {
        Color::White => (Rank::R4, Rank::R8),
        Color::Black => (Rank::R5, Rank::R1),
    };
    let empty = !context.occupied;

    for from in position.bitboard(us, PieceType::Pawn) {
        let single = push_forward::<COLOR>(Bitboard::from(from)) & empty;
        let double = push_forward::<COLOR>(single) & empty & Bitboard::from(double_push_rank);
        let captures = pawn_attacks(us, from) & context.enemy;

        for to in (single | double | captures) & context.allowed(from) {
            if to.rank() == last_rank {
                for promotion in PieceType::PROMOTIONS {
                    list.push(Move::new(from, to, MoveFlag::Promotion, promotion));
                }
            } else {
                list.push(Move::new_basic(from, to));
            }
        }

        // The en passant capture does not land on the captured pawn, so the target mask does not apply to it.
        if let Some(to) = position.en_passant() {
            if pawn_attacks(us, from).get(to) && en_passant_is_legal::<COLOR>(position, context, from, to) {
                list.push(Move::new(from, to, MoveFlag::EnPassant, PieceType::Knight));
            }
        }
    }
}

fn generate_piece_moves<const COLOR: u8, const PIECE_TYPE: u8>(
    position: &Position,
    context: &Context,
    list: &mut MoveList,
) {
    let mut bb_from = position.bitboard(COLOR.into(), PIECE_TYPE.into());

    // A pinned knight can never stay on the line of its pin.
    if PIECE_TYPE == PieceType::KNIGHT_VALUE {
        bb_from &= !context.pinned;
    }

    for from in bb_from {
        for to in attacks_from::<PIECE_TYPE>(context.occupied, from) & context.allowed(from) {
            list.push(Move::new_basic(from, to));
        }
    }
}

fn generate_castlings<const COLOR: u8>(
    position: &Position,
    context: &Context,
    attacked: Bitboard,
    list: &mut MoveList,
) {
    let us = Color::from(COLOR);
    let rank = match us {
        Color::White => Rank::R1,
        Color::Black => Rank::R8,
    };
    let square = |file: File| Square::new(file, rank);

    for side in CastlingSide::ALL {
        if !position.castle().contains(CastlingRights::new(us, side)) {
            continue;
        }

        let (path, transit, king_to) = match side {
            CastlingSide::Kingside => (square(File::F) | square(File::G), square(File::F) | square(File::G), File::G),
            CastlingSide::Queenside => (
                square(File::B) | square(File::C) | square(File::D),
                square(File::C) | square(File::D),
                File::C,
            ),
        };

        if (path & context.occupied).has_none() && (transit & attacked).has_none() {
            list.push(Move::new(context.king, square(king_to), MoveFlag::Castle, PieceType::Knight));
        }
    }
}

fn generate_moves_color<const COLOR: u8>(position: &Position, list: &mut MoveList) {
    let us = Color::from(COLOR);
    let king = position.king_square(us);
    let own = position.side(us);
    let attacked = position.generate_attacked(us);
    let checkers = position.generate_checkers(us);

    for to in attacks_from::<{ PieceType::KING_VALUE }>(Bitboard::EMPTY, king) & !own & !attacked {
        list.push(Move::new_basic(king, to));
    }

    // Only the king can escape a double check.
    if checkers.has_many() {
        return;
    }

    let targets = match checkers.lsb() {
        Some(checker) => checkers | Bitboard::between(king, checker),
        None => !own,
    };

    let context = Context {
        king,
        enemy: position.side(!us),
        occupied: position.occupied(),
        pinned: position.generate_pinned(us),
        targets,
    };

    generate_pawn_moves::<COLOR>(position, &context, list);
    generate_piece_moves::<COLOR, { PieceType::KNIGHT_VALUE }>(position, &context, list);
    generate_piece_moves::<COLOR, { PieceType::BISHOP_VALUE }>(position, &context, list);
    generate_piece_moves::<COLOR, { PieceType::ROOK_VALUE }>(position, &context, list);
    generate_piece_moves::<COLOR, { PieceType::QUEEN_VALUE }>(position, &context, list);

    if checkers.has_none() {
        generate_castlings::<COLOR>(position, &context, attacked, list);
    }
}

/// Appends every legal move of white to the list. White must be the side to move.
pub fn generate_white(position: &Position, list: &mut MoveList) {
    debug_assert_eq!(position.turn(), Color::White);
    generate_moves_color::<{ Color::WHITE_VALUE }>(position, list);
}

/// Appends every legal move of black to the list. Black must be the side to move.
pub fn generate_black(position: &Position, list: &mut MoveList) {
    debug_assert_eq!(position.turn(), Color::Black);
    generate_moves_color::<{ Color::BLACK_VALUE }>(position, list);
}

/// Appends every legal move of the side to move to the list.
pub fn generate_all(position: &Position, list: &mut MoveList) {
    match position.turn() {
        Color::White => generate_white(position, list),
        Color::Black => generate_black(position, list),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legal_moves(fen: &str) -> MoveList {
        let position = Position::from_fen(fen).expect("test FEN should be valid");
        let mut list = MoveList::new();
        generate_all(&position, &mut list);
        list
    }

    #[test]
    fn test_initial_position() {
        let list = legal_moves(Position::START_FEN);
        assert_eq!(list.len(), 20);
        assert!(list.contains(Move::new_basic(Square::E2, Square::E4)));
        assert!(list.contains(Move::new_basic(Square::G1, Square::F3)));
    }

    #[test]
    fn test_double_check_only_king_moves() {
        let list = legal_moves("4k3/8/8/8/1b6/5n2/8/4K3 w - - 0 1");
        assert!(list.iter().all(|mv| mv.from() == Square::E1));
        assert!(!list.is_empty());
    }

    #[test]
    fn test_single_check_block_or_capture() {
        let list = legal_moves("4k3/4r3/8/8/8/8/3B4/R3K3 w - - 0 1");
        assert!(list.contains(Move::new_basic(Square::D2, Square::E3)));
        assert!(!list.contains(Move::new_basic(Square::A1, Square::A2)));
        assert!(!list.contains(Move::new_basic(Square::E1, Square::E2)));
    }

    #[test]
    fn test_pinned_piece_moves_along_pin() {
        let list = legal_moves("4k3/4r3/8/8/8/8/4R3/4K3 w - - 0 1");
        assert!(list.contains(Move::new_basic(Square::E2, Square::E7)));
        assert!(list.contains(Move::new_basic(Square::E2, Square::E4)));
        assert!(!list.contains(Move::new_basic(Square::E2, Square::D2)));

        let list = legal_moves("4k3/4r3/8/8/8/8/4N3/4K3 w - - 0 1");
        assert!(list.iter().all(|mv| mv.from() != Square::E2));
    }

    #[test]
    fn test_promotions() {
        let list = legal_moves("4k3/1P6/8/8/8/8/8/4K3 w - - 0 1");
        for promotion in PieceType::PROMOTIONS {
            assert!(list.contains(Move::new(Square::B7, Square::B8, MoveFlag::Promotion, promotion)));
        }
    }

    #[test]
    fn test_en_passant() {
        let list = legal_moves("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        assert!(list.contains(Move::new(Square::E5, Square::D6, MoveFlag::EnPassant, PieceType::Knight)));
    }

    #[test]
    fn test_en_passant_discovered_check_on_rank() {
        let list = legal_moves("8/8/8/K2pP2r/8/8/8/7k w - d6 0 2");
        assert!(!list.contains(Move::new(Square::E5, Square::D6, MoveFlag::EnPassant, PieceType::Knight)));
    }

    #[test]
    fn test_castling() {
        let list = legal_moves("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert!(list.contains(Move::new(Square::E1, Square::G1, MoveFlag::Castle, PieceType::Knight)));
        assert!(list.contains(Move::new(Square::E1, Square::C1, MoveFlag::Castle, PieceType::Knight)));

        assert_eq!(list.iter().filter(|mv| mv.flag() == MoveFlag::Castle).count(), 2);

        // The king may not cross an attacked square, but the rook may.
        let list = legal_moves("1r2k3/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(list.contains(Move::new(Square::E1, Square::C1, MoveFlag::Castle, PieceType::Knight)));
        let list = legal_moves("3rk3/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!list.contains(Move::new(Square::E1, Square::C1, MoveFlag::Castle, PieceType::Knight)));
    }
}
