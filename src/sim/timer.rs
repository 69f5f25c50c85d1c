/// Fixed-interval tick gate for the game loop.

use std::time::{Duration, Instant};

pub struct IntervalTimer {
    interval: Duration,
    last_tick: Instant,
}

impl IntervalTimer {
    pub fn new(interval: Duration) -> Self {
        IntervalTimer { interval, last_tick: Instant::now() }
    }

    pub fn from_millis(ms: u64) -> Self {
        IntervalTimer::new(Duration::from_millis(ms))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True once per elapsed interval. Restarts the interval when it fires.
    pub fn expired(&mut self) -> bool {
        if self.last_tick.elapsed() >= self.interval {
            self.last_tick = Instant::now();
            true
        } else {
            false
        }
    }

    /// Start a fresh interval from now.
    pub fn restart(&mut self) {
        self.last_tick = Instant::now();
    }
}

/// Block the calling thread for `ms` milliseconds.
pub fn pause(ms: u64) {
    std::thread::sleep(Duration::from_millis(ms));
}
