pub mod attacks;
pub mod generation;
pub mod move_list;

pub use generation::{generate_all, generate_black, generate_white};
pub use move_list::{move_count, MoveList};
