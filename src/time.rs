use core::sync::atomic::{AtomicU64, Ordering};

/// Timer ticks since the PIT was programmed.
///
/// The timer ISR is the only writer and the shell the only reader.
pub struct TickCounter {
    ticks: AtomicU64,
}

impl TickCounter {
    pub const fn new() -> Self {
        TickCounter {
            ticks: AtomicU64::new(0),
        }
    }

    /// Called from the timer interrupt handler.
    pub fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub(crate) fn reset(&self) {
        self.ticks.store(0, Ordering::Relaxed);
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        TickCounter::new()
    }
}

#[cfg(test)]
mod tests {
    use super::TickCounter;

    #[test]
    fn counts_every_tick() {
        let ticks = TickCounter::new();
        for _ in 0..25 {
            ticks.tick();
        }
        assert_eq!(ticks.get(), 25);
    }

    #[test]
    fn reset_returns_to_zero() {
        let ticks = TickCounter::new();
        ticks.tick();
        ticks.reset();
        assert_eq!(ticks.get(), 0);
    }
}
