//! The greedy Klondike bot: one action per call, first applicable rule wins.
mod hint;
mod planner;

pub use crate::hint::{FALLBACK_HINT, hint, hint_action};
pub use crate::planner::next_action;
