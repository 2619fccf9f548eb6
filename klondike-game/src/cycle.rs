/// Idle stock cycles the bot may go through before the deal is abandoned.
pub const MAX_IDLE_CYCLES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleVerdict {
    Continue,
    Restart,
}

/// Counts stock resets that happened without a foundation or tableau move in between.
///
/// Only fed while the bot plays; a human can cycle the stock forever.
#[derive(Debug, Clone, Default)]
pub struct StockCycleTracker {
    cycles: u32,
    used_this_cycle: bool,
}

impl StockCycleTracker {
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn used_this_cycle(&self) -> bool {
        self.used_this_cycle
    }

    pub fn record_productive_move(&mut self) {
        self.used_this_cycle = true;
    }

    /// Called when the stock is about to be rebuilt from the waste.
    pub fn on_stock_reset(&mut self) -> CycleVerdict {
        if self.used_this_cycle {
            self.cycles = 0;
        } else {
            self.cycles += 1;
        }

        if self.cycles >= MAX_IDLE_CYCLES {
            self.reset();
            return CycleVerdict::Restart;
        }

        self.used_this_cycle = false;
        CycleVerdict::Continue
    }

    pub fn reset(&mut self) {
        self.cycles = 0;
        self.used_this_cycle = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_idle_cycles_restart() {
        let mut tracker = StockCycleTracker::default();
        assert_eq!(tracker.on_stock_reset(), CycleVerdict::Continue);
        assert_eq!(tracker.on_stock_reset(), CycleVerdict::Continue);
        assert_eq!(tracker.cycles(), 2);
        assert_eq!(tracker.on_stock_reset(), CycleVerdict::Restart);
        assert_eq!(tracker.cycles(), 0);
        assert!(!tracker.used_this_cycle());
    }

    #[test]
    fn test_productive_cycle_clears_counter() {
        let mut tracker = StockCycleTracker::default();
        tracker.on_stock_reset();
        tracker.on_stock_reset();
        tracker.record_productive_move();
        assert_eq!(tracker.on_stock_reset(), CycleVerdict::Continue);
        assert_eq!(tracker.cycles(), 0);
        assert!(!tracker.used_this_cycle());

        assert_eq!(tracker.on_stock_reset(), CycleVerdict::Continue);
        assert_eq!(tracker.cycles(), 1);
    }
}
