//! Minimum busy period for create.
//!
//! Keeps the loading indicator visible for a floor duration measured from the
//! start of an operation, even when the store answers quickly.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimumDwell {
    floor: Duration,
}

impl MinimumDwell {
    pub fn new(floor: Duration) -> Self {
        Self { floor }
    }

    /// Time still to wait for an operation that began at `started`.
    pub fn remaining(&self, started: Instant) -> Duration {
        self.floor.saturating_sub(started.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn remaining_shrinks_with_elapsed_time() {
        let dwell = MinimumDwell::new(Duration::from_millis(4000));
        let started = Instant::now();

        assert_eq!(dwell.remaining(started), Duration::from_millis(4000));

        tokio::time::advance(Duration::from_millis(1500)).await;
        assert_eq!(dwell.remaining(started), Duration::from_millis(2500));

        tokio::time::advance(Duration::from_millis(5000)).await;
        assert_eq!(dwell.remaining(started), Duration::ZERO);
    }

    #[test]
    fn zero_floor_never_waits() {
        let dwell = MinimumDwell::new(Duration::ZERO);
        assert_eq!(dwell.remaining(Instant::now()), Duration::ZERO);
    }
}
