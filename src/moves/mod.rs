pub mod analysis;
pub mod execute;
pub mod movegen;
pub mod perft;
pub mod types;

use crate::board::Color;
use crate::square::{NORTH, SOUTH, Square};

/// The square an en-passant victim actually occupies: one rank behind
/// the target square, from the mover's point of view.
#[inline]
pub(crate) fn ep_victim_square(mover: Color, ep_target: Square) -> Square {
    match mover {
        Color::White => ep_target.offset(SOUTH),
        Color::Black => ep_target.offset(NORTH),
    }
}
