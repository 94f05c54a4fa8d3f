use crate::r#move::Move;

/// Maximum number of moves in any legal chess position is 218, 256 leaves some headroom.
pub const MAX_MOVES: usize = 256;

/// A fixed capacity list of moves filled by the move generator.
///
/// Slots past `count` hold `Move::NULL`, so the buffer is always terminated by a null move when it is not full.
#[derive(Debug, Clone)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    count: usize,
}

impl Default for MoveList {
    fn default() -> Self {
        Self { moves: [Move::NULL; MAX_MOVES], count: 0 }
    }
}

impl MoveList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a move to the list.
    ///
    /// # Panics
    /// In debug builds, panics if the list is already full.
    pub fn push(&mut self, mv: Move) {
        debug_assert!(self.count < MAX_MOVES);

        self.moves[self.count] = mv;
        self.count += 1;
    }

    /// Empties the list so that the buffer can be reused.
    pub fn clear(&mut self) {
        self.moves[..self.count].fill(Move::NULL);
        self.count = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the number of moves in the list.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns the move at `index`, or `None` past the end of the list.
    pub fn get(&self, index: usize) -> Option<Move> {
        self.as_slice().get(index).copied()
    }

    pub fn contains(&self, mv: Move) -> bool {
        self.as_slice().contains(&mv)
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.count]
    }

    /// Iterates over the moves by value.
    pub fn iter(&self) -> impl Iterator<Item = Move> + '_ {
        self.as_slice().iter().copied()
    }
}

/// Counts the moves stored in a buffer, stopping at the first null move.
pub fn move_count(moves: &[Move]) -> usize {
    moves.iter().take_while(|mv| !mv.is_null()).count()
}

impl FromIterator<Move> for MoveList {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> Self {
        let mut list = Self::default();
        for mv in iter {
            list.push(mv);
        }
        list
    }
}
