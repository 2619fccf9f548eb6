//! A running game of Klondike. The host owns the clock and calls in.

mod config;
mod cycle;
mod event;
mod session;

pub use config::Config;
pub use cycle::{CycleVerdict, MAX_IDLE_CYCLES, StockCycleTracker};
pub use event::{GameEvent, MoveRecord, RestartReason};
pub use session::{POINTS_PER_MOVE, Session, Source, Tick, UNDO_UNAVAILABLE};
