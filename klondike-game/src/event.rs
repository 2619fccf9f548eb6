use std::time::{Duration, SystemTime};

/// Notifications for whoever renders the session. Drained with `Session::take_events`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Piles or counters changed.
    StateChanged,
    /// Emitted once per game.
    Won {
        score: u32,
        moves: u32,
        elapsed: Duration,
        /// The bot was playing when the last card went home.
        by_bot: bool,
    },
    /// The bot found nothing to play with stock and waste exhausted. The host
    /// should start a new game after `Config::restart_delay`.
    Stuck,
    Restarted(RestartReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartReason {
    NewGame,
    /// The bot cycled the stock too often without progress.
    StockCycles,
}

/// One entry of the move log. The log is only informational; it cannot be replayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub description: String,
    pub timestamp: SystemTime,
}
