use std::time::Duration;

use chrono::{DateTime, Utc};

/// Source of discovery timestamps.
///
/// `pause` is called after every successful save so records found together on
/// the same day still get strictly increasing timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
    async fn pause(&mut self);
}

/// Wall-clock time; pausing actually waits.
pub struct SystemClock {
    spacing: Duration,
}

impl SystemClock {
    pub fn new(spacing: Duration) -> Self {
        Self { spacing }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn pause(&mut self) {
        tokio::time::sleep(self.spacing).await;
    }
}

/// Synthetic time for batch runs and tests: starts at a fixed instant and moves
/// forward one step per pause, without sleeping.
pub struct SteppedClock {
    current: DateTime<Utc>,
    step: chrono::Duration,
}

impl SteppedClock {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            current: start,
            step: chrono::Duration::seconds(1),
        }
    }
}

impl Clock for SteppedClock {
    fn now(&self) -> DateTime<Utc> {
        self.current
    }

    async fn pause(&mut self) {
        self.current += self.step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stepped_clock_advances_only_on_pause() {
        let start = DateTime::parse_from_rfc3339("2024-03-03T15:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut clock = SteppedClock::starting_at(start);
        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start);

        clock.pause().await;
        let next = clock.now();
        assert!(next > start);
        clock.pause().await;
        assert!(clock.now() > next);
    }

    #[tokio::test]
    async fn system_clock_pause_separates_timestamps() {
        let mut clock = SystemClock::new(Duration::from_millis(5));
        let before = clock.now();
        clock.pause().await;
        assert!(clock.now() > before);
    }
}
