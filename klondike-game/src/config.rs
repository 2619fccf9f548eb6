use std::time::Duration;

/// Cadences the host drives the session with, plus the deck seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Seed for the shuffles; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Delay between two bot ticks.
    pub bot_interval: Duration,
    /// Delay between two cards while dealing.
    pub deal_interval: Duration,
    /// Delay before a new game once the bot got stuck or won.
    pub restart_delay: Duration,
    /// How long a win is celebrated before anything else happens.
    pub celebration: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            bot_interval: Duration::from_millis(1200),
            deal_interval: Duration::from_millis(50),
            restart_delay: Duration::from_millis(2000),
            celebration: Duration::from_millis(5000),
        }
    }
}
