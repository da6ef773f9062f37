pub mod engine;
pub mod eval;
mod minimax;
mod ordering;
pub mod pesto;
pub mod tt;

pub use engine::{Engine, EngineError, MoveInfo, SearchReport};
