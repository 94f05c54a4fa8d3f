use std::{fmt::Display, ops::Index};

use rand::Rng;

use crate::{
    bitboard::Bitboard,
    coordinates::{File, Rank, Square},
    move_gen::{
        attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, pawns_attacks, rook_attacks},
        generation::generate_all,
        move_list::MoveList,
    },
    piece::{Color, Piece, PieceType},
    r#move::{CastlingRights, Move, MoveFlag},
    zobrist::{self, Zobrist},
};

/// Halfmove clock at which the fifty-move rule ends the game.
const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// Index of the union of all the pieces of a side in the per-side bitboard arrays.
const ALL: usize = 0;

/// Returns the castling rights that are lost when a piece leaves or lands on a square.
fn rights_lost(square: Square) -> CastlingRights {
    match square {
        Square::A1 => CastlingRights::WHITE_QUEENSIDE,
        Square::E1 => CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE,
        Square::H1 => CastlingRights::WHITE_KINGSIDE,
        Square::A8 => CastlingRights::BLACK_QUEENSIDE,
        Square::E8 => CastlingRights::BLACK_KINGSIDE | CastlingRights::BLACK_QUEENSIDE,
        Square::H8 => CastlingRights::BLACK_KINGSIDE,
        _ => CastlingRights::empty(),
    }
}

/// Returns the source and target squares of the rook for a castle whose king lands on `king_to`.
fn castle_rook_squares(king_to: Square) -> (Square, Square) {
    let rank = king_to.rank();
    match king_to.file() {
        File::G => (Square::new(File::H, rank), Square::new(File::F, rank)),
        _ => (Square::new(File::A, rank), Square::new(File::D, rank)),
    }
}

//======================================================================================================================
// Position implementation
//======================================================================================================================

/// A chess position.
///
/// The pieces are stored twice: once as bitboards, per side and per piece type, and once as a mailbox giving the piece
/// standing on each square. Both views are only ever changed together by `put_piece`, `remove_piece` and `move_piece`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    white_pieces: [Bitboard; PieceType::COUNT + 1],
    black_pieces: [Bitboard; PieceType::COUNT + 1],
    pieces: Bitboard,
    mailbox: [Option<Piece>; Square::COUNT],
    turn: Color,
    castle: CastlingRights,
    en_passant: Option<Square>,
    halfmove: u32,
    fullmove: u32,
    zobrist_key: Zobrist,
}

impl Position {
    /// FEN of the standard starting position.
    pub const START_FEN: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Returns a position without any piece, white to move.
    pub(crate) fn empty() -> Self {
        Position {
            white_pieces: [Bitboard::EMPTY; PieceType::COUNT + 1],
            black_pieces: [Bitboard::EMPTY; PieceType::COUNT + 1],
            pieces: Bitboard::EMPTY,
            mailbox: [None; Square::COUNT],
            turn: Color::White,
            castle: CastlingRights::empty(),
            en_passant: None,
            halfmove: 0,
            fullmove: 1,
            zobrist_key: zobrist::turn_key(),
        }
    }

    /// Builds a position from a mailbox and the game state. The bitboards are derived from the mailbox and the Zobrist
    /// key is computed from scratch.
    pub(crate) fn from_parts(
        mailbox: &[Option<Piece>; Square::COUNT],
        turn: Color,
        castle: CastlingRights,
        en_passant: Option<Square>,
        halfmove: u32,
        fullmove: u32,
    ) -> Self {
        let mut position = Position::empty();
        for square in Square::ALL {
            if let Some(piece) = mailbox[usize::from(square)] {
                position.put::<false>(piece, square);
            }
        }
        position.turn = turn;
        position.castle = castle;
        position.en_passant = en_passant;
        position.halfmove = halfmove.min(Move::MAX_HALFMOVE);
        position.fullmove = fullmove.min(Move::MAX_FULLMOVE);
        position.zobrist_key = position.zobrist_from_scratch();
        position
    }

    /// Returns the side to move.
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Returns the castling rights that are still available.
    pub fn castle(&self) -> CastlingRights {
        self.castle
    }

    /// Returns the en passant target square, if the last move was a double pawn push.
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// Returns the number of plies since the last capture or pawn move. It saturates at `Move::MAX_HALFMOVE`.
    pub fn halfmove(&self) -> u32 {
        self.halfmove
    }

    /// Returns the move number, starting at 1 and incremented after each black move.
    pub fn fullmove(&self) -> u32 {
        self.fullmove
    }

    /// Returns the Zobrist key of the position.
    ///
    /// `do_move` leaves the key stale until the move is undone. `do_move_zobrist` keeps it current.
    pub fn zobrist_key(&self) -> Zobrist {
        self.zobrist_key
    }

    /// Returns every occupied square.
    pub fn occupied(&self) -> Bitboard {
        self.pieces
    }

    /// Returns the squares occupied by the pieces of one side.
    pub fn side(&self, color: Color) -> Bitboard {
        self.pieces_of(color)[ALL]
    }

    /// Returns the squares occupied by the pieces of one side and one type.
    pub fn bitboard(&self, color: Color, piece_type: PieceType) -> Bitboard {
        self.pieces_of(color)[usize::from(piece_type)]
    }

    /// Returns the square of the king of the given color.
    ///
    /// # Panics
    /// Panics if there is no king of that color, which can not happen on a position that was validated.
    pub fn king_square(&self, color: Color) -> Square {
        self.bitboard(color, PieceType::King).lsb().expect("There should always be a king on the board.")
    }

    fn pieces_of(&self, color: Color) -> &[Bitboard; PieceType::COUNT + 1] {
        match color {
            Color::White => &self.white_pieces,
            Color::Black => &self.black_pieces,
        }
    }

    fn pieces_of_mut(&mut self, color: Color) -> &mut [Bitboard; PieceType::COUNT + 1] {
        match color {
            Color::White => &mut self.white_pieces,
            Color::Black => &mut self.black_pieces,
        }
    }

    //==================================================================================================================
    // Piece operations
    //==================================================================================================================

    #[inline(always)]
    fn put<const HASH: bool>(&mut self, piece: Piece, square: Square) {
        debug_assert_eq!(self.mailbox[usize::from(square)], None);

        self.mailbox[usize::from(square)] = Some(piece);
        let bitboards = self.pieces_of_mut(piece.color());
        bitboards[usize::from(piece.piece_type())] |= square;
        bitboards[ALL] |= square;
        self.pieces |= square;

        if HASH {
            self.zobrist_key ^= zobrist::piece_key(piece, square);
        }
    }

    #[inline(always)]
    fn remove<const HASH: bool>(&mut self, square: Square) -> Piece {
        let piece =
            self.mailbox[usize::from(square)].expect("It is not possible to remove a piece from an empty square.");

        self.mailbox[usize::from(square)] = None;
        let bitboards = self.pieces_of_mut(piece.color());
        bitboards[usize::from(piece.piece_type())] ^= square;
        bitboards[ALL] ^= square;
        self.pieces ^= square;

        if HASH {
            self.zobrist_key ^= zobrist::piece_key(piece, square);
        }

        piece
    }

    #[inline(always)]
    fn shift<const HASH: bool>(&mut self, from: Square, to: Square) {
        debug_assert_eq!(self.mailbox[usize::from(to)], None);

        let piece =
            self.mailbox[usize::from(from)].expect("It is not possible to move a piece from an empty square.");
        self.mailbox[usize::from(from)] = None;
        self.mailbox[usize::from(to)] = Some(piece);

        let bb = from | to;
        let bitboards = self.pieces_of_mut(piece.color());
        bitboards[usize::from(piece.piece_type())] ^= bb;
        bitboards[ALL] ^= bb;
        self.pieces ^= bb;

        if HASH {
            self.zobrist_key ^= zobrist::piece_key(piece, from) ^ zobrist::piece_key(piece, to);
        }
    }

    /// Places a piece on an empty square, keeping the Zobrist key up to date.
    pub fn put_piece(&mut self, piece: Piece, square: Square) {
        self.put::<true>(piece, square);
    }

    /// Removes and returns the piece standing on a square, keeping the Zobrist key up to date.
    ///
    /// # Panics
    /// Panics if the square is empty.
    pub fn remove_piece(&mut self, square: Square) -> Piece {
        self.remove::<true>(square)
    }

    /// Moves the piece standing on `from` to the empty square `to`, keeping the Zobrist key up to date.
    pub fn move_piece(&mut self, from: Square, to: Square) {
        self.shift::<true>(from, to);
    }

    //==================================================================================================================
    // Attacks, checks and pins
    //==================================================================================================================

    /// Returns every square attacked by the opponent of `side`.
    ///
    /// The king of `side` is removed from the occupancy before the sliding attacks are computed. Squares behind the
    /// king on a checking ray are therefore reported as attacked, which keeps the king from stepping back along that
    /// ray.
    pub fn generate_attacked(&self, side: Color) -> Bitboard {
        let them = !side;
        let enemy = self.pieces_of(them);
        let occupied = self.pieces ^ self.bitboard(side, PieceType::King);

        let mut attacked = pawns_attacks(them, enemy[usize::from(PieceType::Pawn)]);
        for square in enemy[usize::from(PieceType::Knight)] {
            attacked |= knight_attacks(square);
        }
        for square in enemy[usize::from(PieceType::Bishop)] | enemy[usize::from(PieceType::Queen)] {
            attacked |= bishop_attacks(square, occupied);
        }
        for square in enemy[usize::from(PieceType::Rook)] | enemy[usize::from(PieceType::Queen)] {
            attacked |= rook_attacks(square, occupied);
        }
        for square in enemy[usize::from(PieceType::King)] {
            attacked |= king_attacks(square);
        }

        attacked
    }

    /// Returns the enemy pieces giving check to the king of `side`.
    pub fn generate_checkers(&self, side: Color) -> Bitboard {
        let king = self.king_square(side);
        let enemy = self.pieces_of(!side);
        let queens = enemy[usize::from(PieceType::Queen)];

        (pawn_attacks(side, king) & enemy[usize::from(PieceType::Pawn)])
            | (knight_attacks(king) & enemy[usize::from(PieceType::Knight)])
            | (bishop_attacks(king, self.pieces) & (enemy[usize::from(PieceType::Bishop)] | queens))
            | (rook_attacks(king, self.pieces) & (enemy[usize::from(PieceType::Rook)] | queens))
    }

    /// Returns the pieces of `side` that are absolutely pinned to their king.
    ///
    /// Potential pinners are found by looking from the king through the friendly pieces as if they were transparent.
    /// A friendly piece is pinned when it is the only piece standing between such a pinner and the king.
    pub fn generate_pinned(&self, side: Color) -> Bitboard {
        let king = self.king_square(side);
        let enemy = self.pieces_of(!side);
        let queens = enemy[usize::from(PieceType::Queen)];

        let pinners = (rook_attacks(king, enemy[ALL]) & (enemy[usize::from(PieceType::Rook)] | queens))
            | (bishop_attacks(king, enemy[ALL]) & (enemy[usize::from(PieceType::Bishop)] | queens));

        let friendly = self.side(side);
        let mut pinned = Bitboard::EMPTY;
        for pinner in pinners {
            let blockers = Bitboard::between(pinner, king) & friendly;
            if blockers.has_one() {
                pinned |= blockers;
            }
        }

        pinned
    }

    /// Returns whether the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.generate_checkers(self.turn).has_any()
    }

    //==================================================================================================================
    // Move application
    //==================================================================================================================

    fn apply<const HASH: bool>(&mut self, mv: Move) -> Move {
        let us = self.turn;
        let from = mv.from();
        let to = mv.to();

        let mut mv = mv
            .with_captured(None)
            .with_castle(self.castle)
            .with_en_passant(self.en_passant)
            .with_halfmove(self.halfmove)
            .with_fullmove(self.fullmove);

        if HASH {
            self.zobrist_key ^= zobrist::castle_key(self.castle) ^ zobrist::turn_key();
            if let Some(square) = self.en_passant {
                self.zobrist_key ^= zobrist::en_passant_key(square);
            }
        }

        self.en_passant = None;
        self.halfmove = (self.halfmove + 1).min(Move::MAX_HALFMOVE);

        match mv.flag() {
            MoveFlag::None => {
                if self.mailbox[usize::from(to)].is_some() {
                    let captured = self.remove::<HASH>(to);
                    mv = mv.with_captured(Some(captured.piece_type()));
                    self.halfmove = 0;
                }
                self.shift::<HASH>(from, to);

                if self.bitboard(us, PieceType::Pawn).get(to) {
                    self.halfmove = 0;
                    if u8::from(from).abs_diff(u8::from(to)) == 16 {
                        self.en_passant = Some(Square::from((u8::from(from) + u8::from(to)) / 2));
                    }
                }
            }
            MoveFlag::EnPassant => {
                self.remove::<HASH>(Square::new(to.file(), from.rank()));
                self.shift::<HASH>(from, to);
                mv = mv.with_captured(Some(PieceType::Pawn));
                self.halfmove = 0;
            }
            MoveFlag::Promotion => {
                if self.mailbox[usize::from(to)].is_some() {
                    let captured = self.remove::<HASH>(to);
                    mv = mv.with_captured(Some(captured.piece_type()));
                }
                self.remove::<HASH>(from);
                self.put::<HASH>(Piece::new(us, mv.promotion()), to);
                self.halfmove = 0;
            }
            MoveFlag::Castle => {
                let (rook_from, rook_to) = castle_rook_squares(to);
                self.shift::<HASH>(from, to);
                self.shift::<HASH>(rook_from, rook_to);
            }
        }

        self.castle &= !(rights_lost(from) | rights_lost(to));
        if us == Color::Black {
            self.fullmove = (self.fullmove + 1).min(Move::MAX_FULLMOVE);
        }
        self.turn = !us;

        if HASH {
            self.zobrist_key ^= zobrist::castle_key(self.castle);
            if let Some(square) = self.en_passant {
                self.zobrist_key ^= zobrist::en_passant_key(square);
            }
        }

        mv
    }

    fn revert<const HASH: bool>(&mut self, mv: Move) {
        let us = !self.turn;
        let from = mv.from();
        let to = mv.to();

        if HASH {
            self.zobrist_key ^= zobrist::castle_key(self.castle) ^ zobrist::turn_key();
            if let Some(square) = self.en_passant {
                self.zobrist_key ^= zobrist::en_passant_key(square);
            }
        }

        match mv.flag() {
            MoveFlag::None => {
                self.shift::<HASH>(to, from);
                if let Some(captured) = mv.captured() {
                    self.put::<HASH>(Piece::new(!us, captured), to);
                }
            }
            MoveFlag::EnPassant => {
                self.shift::<HASH>(to, from);
                self.put::<HASH>(Piece::new(!us, PieceType::Pawn), Square::new(to.file(), from.rank()));
            }
            MoveFlag::Promotion => {
                self.remove::<HASH>(to);
                self.put::<HASH>(Piece::new(us, PieceType::Pawn), from);
                if let Some(captured) = mv.captured() {
                    self.put::<HASH>(Piece::new(!us, captured), to);
                }
            }
            MoveFlag::Castle => {
                let (rook_from, rook_to) = castle_rook_squares(to);
                self.shift::<HASH>(to, from);
                self.shift::<HASH>(rook_to, rook_from);
            }
        }

        self.turn = us;
        self.castle = mv.castle();
        self.en_passant = mv.en_passant();
        self.halfmove = mv.halfmove();
        self.fullmove = mv.fullmove();

        if HASH {
            self.zobrist_key ^= zobrist::castle_key(self.castle);
            if let Some(square) = self.en_passant {
                self.zobrist_key ^= zobrist::en_passant_key(square);
            }
        }
    }

    /// Plays a move without maintaining the Zobrist key.
    ///
    /// The returned move carries everything needed to take it back with `undo_move`. The Zobrist key is left untouched,
    /// so it is stale until the move is undone.
    pub fn do_move(&mut self, mv: Move) -> Move {
        self.apply::<false>(mv)
    }

    /// Takes back a move returned by `do_move`.
    pub fn undo_move(&mut self, mv: Move) {
        self.revert::<false>(mv);
    }

    /// Plays a move and updates the Zobrist key incrementally. Returns the move with its undo payload filled.
    pub fn do_move_zobrist(&mut self, mv: Move) -> Move {
        self.apply::<true>(mv)
    }

    /// Takes back a move returned by `do_move_zobrist`, restoring the Zobrist key.
    pub fn undo_move_zobrist(&mut self, mv: Move) {
        self.revert::<true>(mv);
    }

    /// Computes the Zobrist key of the position without using the incrementally maintained one.
    pub fn zobrist_from_scratch(&self) -> Zobrist {
        let mut key = zobrist::castle_key(self.castle);
        if self.turn == Color::White {
            key ^= zobrist::turn_key();
        }
        if let Some(square) = self.en_passant {
            key ^= zobrist::en_passant_key(square);
        }
        for square in self.pieces {
            if let Some(piece) = self.mailbox[usize::from(square)] {
                key ^= zobrist::piece_key(piece, square);
            }
        }
        key
    }

    /// Returns a position reached by playing `plies` random legal moves from the starting position. The walk stops
    /// early when the side to move has no legal move or when the fifty-move rule ends the game.
    pub fn random_pos<R: Rng + ?Sized>(plies: u32, rng: &mut R) -> Position {
        let mut position = Position::default();
        let mut moves = MoveList::new();

        for _ in 0..plies {
            if position.halfmove >= FIFTY_MOVE_HALFMOVES {
                break;
            }

            moves.clear();
            generate_all(&position, &mut moves);
            if moves.is_empty() {
                break;
            }

            let mv = moves.as_slice()[rng.random_range(0..moves.len())];
            position.do_move_zobrist(mv);
        }

        position
    }
}

impl Default for Position {
    /// Returns the standard starting position.
    fn default() -> Self {
        Position::from_fen_unchecked(Position::START_FEN)
    }
}

impl Index<Square> for Position {
    type Output = Option<Piece>;

    fn index(&self, index: Square) -> &Self::Output {
        &self.mailbox[usize::from(index)]
    }
}

impl Display for Position {
    /// Draws the board from white's point of view. The alternate flag (`{:#}`) draws the pieces with Unicode glyphs.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const FILES: &str = "       a   b   c   d   e   f   g   h";
        const SEPARATOR: &str = "     +---+---+---+---+---+---+---+---+";

        writeln!(f, "{}", FILES)?;
        for rank in Rank::ALL.iter().rev() {
            writeln!(f, "{}", SEPARATOR)?;
            write!(f, "   {} |", rank)?;
            for file in File::ALL {
                let symbol = match self[Square::new(file, *rank)] {
                    Some(piece) if f.alternate() => piece.glyph(),
                    Some(piece) => char::from(piece),
                    None => ' ',
                };
                write!(f, " {} |", symbol)?;
            }
            writeln!(f, " {}", rank)?;
        }
        writeln!(f, "{}", SEPARATOR)?;
        write!(f, "{}", FILES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn fen(fen: &str) -> Position {
        Position::from_fen(fen).expect("test FEN should be valid")
    }

    #[test]
    fn test_position_default() {
        let position = Position::default();
        assert_eq!(position.turn(), Color::White);
        assert_eq!(position.castle(), CastlingRights::all());
        assert_eq!(position.en_passant(), None);
        assert_eq!(position.halfmove(), 0);
        assert_eq!(position.fullmove(), 1);
        assert_eq!(position.occupied(), Bitboard(0xffff00000000ffff));
        assert_eq!(position.side(Color::White), Bitboard(0x000000000000ffff));
        assert_eq!(position.bitboard(Color::Black, PieceType::Pawn), Bitboard::from(Rank::R7));
        assert_eq!(position[Square::E1], Some(Piece::WHITE_KING));
        assert_eq!(position[Square::D8], Some(Piece::BLACK_QUEEN));
        assert_eq!(position[Square::E4], None);
        assert_eq!(position.zobrist_key(), position.zobrist_from_scratch());
    }

    #[test]
    fn test_put_piece() {
        let mut position = Position::empty();
        assert_eq!(position.zobrist_key(), position.zobrist_from_scratch());

        position.put_piece(Piece::WHITE_KNIGHT, Square::C3);

        assert_eq!(position[Square::C3], Some(Piece::WHITE_KNIGHT));
        assert_eq!(position.bitboard(Color::White, PieceType::Knight), Bitboard::from(Square::C3));
        assert_eq!(position.side(Color::White), Bitboard::from(Square::C3));
        assert_eq!(position.occupied(), Bitboard::from(Square::C3));
        assert_eq!(position.zobrist_key(), position.zobrist_from_scratch());
    }

    #[test]
    fn test_remove_piece() {
        let mut position = Position::default();
        assert_eq!(position.remove_piece(Square::D8), Piece::BLACK_QUEEN);

        assert_eq!(position[Square::D8], None);
        assert_eq!(position.bitboard(Color::Black, PieceType::Queen), Bitboard::EMPTY);
        assert!(!position.side(Color::Black).get(Square::D8));
        assert!(!position.occupied().get(Square::D8));
        assert_eq!(position.zobrist_key(), position.zobrist_from_scratch());
    }

    #[test]
    fn test_move_piece() {
        let mut position = Position::default();
        position.move_piece(Square::G1, Square::F3);

        assert_eq!(position[Square::G1], None);
        assert_eq!(position[Square::F3], Some(Piece::WHITE_KNIGHT));
        assert_eq!(position.bitboard(Color::White, PieceType::Knight), Square::B1 | Square::F3);
        assert_eq!(position.zobrist_key(), position.zobrist_from_scratch());
    }

    #[test]
    fn test_generate_attacked() {
        let position = fen("4k3/8/8/8/8/8/8/R3K3 b - - 0 1");
        let attacked = position.generate_attacked(Color::Black);
        assert!(attacked.get(Square::A8));
        assert!(!attacked.get(Square::H8));
        assert!(attacked.get(Square::D2));
        assert!(attacked.get(Square::A7));

        let position = fen("4k3/8/8/8/8/8/8/4K2R b - - 0 1");
        let attacked = position.generate_attacked(Color::Black);
        assert!(!attacked.get(Square::E8));
        assert!(attacked.get(Square::H8));
    }

    #[test]
    fn test_generate_attacked_through_king() {
        let position = fen("8/8/8/8/r3K3/8/8/7k w - - 0 1");
        let attacked = position.generate_attacked(Color::White);
        assert!(attacked.get(Square::F4));
        assert!(attacked.get(Square::H4));
    }

    #[test]
    fn test_generate_checkers() {
        let position = Position::default();
        assert_eq!(position.generate_checkers(Color::White), Bitboard::EMPTY);

        let position = fen("4k3/8/8/8/1b6/5n2/8/4K3 w - - 0 1");
        assert_eq!(position.generate_checkers(Color::White), Square::B4 | Square::F3);
        assert!(position.is_check());

        let position = fen("4k3/8/8/8/8/8/3p4/4K3 w - - 0 1");
        assert_eq!(position.generate_checkers(Color::White), Bitboard::from(Square::D2));
    }

    #[test]
    fn test_generate_pinned() {
        let position = fen("4k3/8/8/8/1b6/8/3N4/4K3 w - - 0 1");
        assert_eq!(position.generate_pinned(Color::White), Bitboard::from(Square::D2));

        let position = fen("4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1");
        assert_eq!(position.generate_pinned(Color::White), Bitboard::from(Square::E2));

        let position = fen("4k3/4r3/8/8/1b6/8/3N4/4K3 w - - 0 1");
        assert_eq!(position.generate_pinned(Color::White), Bitboard::from(Square::D2));

        assert_eq!(Position::default().generate_pinned(Color::White), Bitboard::EMPTY);
    }

    #[test]
    fn test_generate_pinned_ignores_double_blockers() {
        let position = fen("4k3/4r3/8/4P3/8/8/4N3/4K3 w - - 0 1");
        assert_eq!(position.generate_pinned(Color::White), Bitboard::EMPTY);

        let position = fen("4k3/8/8/8/1b6/2N5/3P4/4K3 w - - 0 1");
        assert_eq!(position.generate_pinned(Color::White), Bitboard::EMPTY);

        // An enemy piece on the ray shields the king.
        let position = fen("4k3/4r3/8/4p3/8/8/4N3/4K3 w - - 0 1");
        assert_eq!(position.generate_pinned(Color::White), Bitboard::EMPTY);
    }

    #[test]
    fn test_do_undo_quiet_move() {
        let mut position = Position::default();
        let original = position.clone();

        let mv = position.do_move(Move::new_basic(Square::G1, Square::F3));
        assert_eq!(position[Square::F3], Some(Piece::WHITE_KNIGHT));
        assert_eq!(position.turn(), Color::Black);
        assert_eq!(position.halfmove(), 1);
        assert_eq!(mv.castle(), CastlingRights::all());
        assert_eq!(mv.fullmove(), 1);

        position.undo_move(mv);
        assert_eq!(position, original);
    }

    #[test]
    fn test_double_push_sets_en_passant() {
        let mut position = Position::default();
        position.do_move_zobrist(Move::new_basic(Square::E2, Square::E4));
        assert_eq!(position.en_passant(), Some(Square::E3));
        assert_eq!(position.halfmove(), 0);
        assert_eq!(position.zobrist_key(), position.zobrist_from_scratch());

        position.do_move_zobrist(Move::new_basic(Square::G8, Square::F6));
        assert_eq!(position.en_passant(), None);
        assert_eq!(position.fullmove(), 2);
        assert_eq!(position.zobrist_key(), position.zobrist_from_scratch());
    }

    #[test]
    fn test_capture_and_undo() {
        let mut position = fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 7 30");
        let original = position.clone();

        let mv = position.do_move_zobrist(Move::new_basic(Square::E4, Square::D5));
        assert_eq!(mv.captured(), Some(PieceType::Pawn));
        assert_eq!(mv.halfmove(), 7);
        assert_eq!(position.halfmove(), 0);
        assert_eq!(position.bitboard(Color::Black, PieceType::Pawn), Bitboard::EMPTY);
        assert_eq!(position.zobrist_key(), position.zobrist_from_scratch());

        position.undo_move_zobrist(mv);
        assert_eq!(position, original);
    }

    #[test]
    fn test_en_passant_and_undo() {
        let mut position = fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        let original = position.clone();

        let mv = position.do_move_zobrist(Move::new(Square::E5, Square::D6, MoveFlag::EnPassant, PieceType::Knight));
        assert_eq!(position[Square::D5], None);
        assert_eq!(position[Square::D6], Some(Piece::WHITE_PAWN));
        assert_eq!(mv.en_passant(), Some(Square::D6));
        assert_eq!(position.zobrist_key(), position.zobrist_from_scratch());

        position.undo_move_zobrist(mv);
        assert_eq!(position, original);
    }

    #[test]
    fn test_promotion_capture_and_undo() {
        let mut position = fen("1r2k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        let original = position.clone();

        let mv = position.do_move_zobrist(Move::new(Square::A7, Square::B8, MoveFlag::Promotion, PieceType::Queen));
        assert_eq!(position[Square::B8], Some(Piece::WHITE_QUEEN));
        assert_eq!(position[Square::A7], None);
        assert_eq!(mv.captured(), Some(PieceType::Rook));
        assert_eq!(position.zobrist_key(), position.zobrist_from_scratch());

        position.undo_move_zobrist(mv);
        assert_eq!(position, original);
    }

    #[test]
    fn test_castle_and_undo() {
        let mut position = fen("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 3 10");
        let original = position.clone();

        let mv = position.do_move_zobrist(Move::new(Square::E8, Square::C8, MoveFlag::Castle, PieceType::Knight));
        assert_eq!(position[Square::C8], Some(Piece::BLACK_KING));
        assert_eq!(position[Square::D8], Some(Piece::BLACK_ROOK));
        assert_eq!(position[Square::A8], None);
        assert_eq!(position.castle(), CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE);
        assert_eq!(position.fullmove(), 11);
        assert_eq!(position.zobrist_key(), position.zobrist_from_scratch());

        position.undo_move_zobrist(mv);
        assert_eq!(position, original);
    }

    #[test]
    fn test_rook_capture_clears_castling_right() {
        let mut position = fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        position.do_move_zobrist(Move::new_basic(Square::H1, Square::H8));
        assert_eq!(position.castle(), CastlingRights::WHITE_QUEENSIDE | CastlingRights::BLACK_QUEENSIDE);
        assert_eq!(position.zobrist_key(), position.zobrist_from_scratch());
    }

    #[test]
    fn test_do_move_leaves_key_untouched() {
        let mut position = Position::default();
        let key = position.zobrist_key();
        let mv = position.do_move(Move::new_basic(Square::E2, Square::E4));
        assert_eq!(position.zobrist_key(), key);
        position.undo_move(mv);
        assert_eq!(position.zobrist_key(), key);
    }

    #[test]
    fn test_random_pos_is_consistent() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        for plies in [0, 1, 10, 60] {
            let position = Position::random_pos(plies, &mut rng);
            assert_eq!(position.zobrist_key(), position.zobrist_from_scratch());
            assert!(crate::fen::fen_is_ok(&position.to_fen()).is_ok());
        }
    }

    #[test]
    fn test_halfmove_clock_saturates_and_undoes() {
        let mut position = fen("4k3/8/8/8/8/8/8/R3K3 w - - 100 1");
        let original = position.clone();
        let shuffle = [
            Move::new_basic(Square::A1, Square::A2),
            Move::new_basic(Square::E8, Square::D8),
            Move::new_basic(Square::A2, Square::A1),
            Move::new_basic(Square::D8, Square::E8),
        ];

        let mut played = Vec::new();
        for mv in shuffle.iter().cycle().take(1100) {
            played.push(position.do_move_zobrist(*mv));
        }
        assert_eq!(position.halfmove(), Move::MAX_HALFMOVE);
        assert_eq!(position.fullmove(), 551);
        assert_eq!(position.zobrist_key(), position.zobrist_from_scratch());

        let mv = position.do_move_zobrist(shuffle[0]);
        assert_eq!(mv.halfmove(), Move::MAX_HALFMOVE);
        position.undo_move_zobrist(mv);
        assert_eq!(position.halfmove(), Move::MAX_HALFMOVE);

        for mv in played.into_iter().rev() {
            position.undo_move_zobrist(mv);
        }
        assert_eq!(position, original);
    }

    #[test]
    fn test_random_pos_stops_at_fifty_moves() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        for _ in 0..4 {
            let position = Position::random_pos(3000, &mut rng);
            assert!(position.halfmove() <= FIFTY_MOVE_HALFMOVES);
            assert!(crate::fen::fen_is_ok(&position.to_fen()).is_ok(), "{}", position.to_fen());
        }
    }

    #[test]
    fn test_display() {
        let position = Position::default();
        let text = format!("{}", position);
        assert!(text.contains("   8 | r | n | b | q | k | b | n | r | 8"));
        assert!(text.contains("   1 | R | N | B | Q | K | B | N | R | 1"));
        assert!(text.contains("   4 |   |   |   |   |   |   |   |   | 4"));

        let text = format!("{:#}", position);
        assert!(text.contains("♔"));
        assert!(text.contains("♟"));
    }
}
