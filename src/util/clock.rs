//! Wall-clock source for publication checks and cache expiry.

use std::sync::Mutex;

use time::{Duration, OffsetDateTime};

use super::lock::recover;

pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<OffsetDateTime>,
}

impl ManualClock {
    pub fn new(start: OffsetDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = recover(self.now.lock(), "util::clock", "advance");
        *now = now.saturating_add(by);
    }

    pub fn set(&self, at: OffsetDateTime) {
        *recover(self.now.lock(), "util::clock", "set") = at;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        *recover(self.now.lock(), "util::clock", "now")
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn manual_clock_moves_only_when_advanced() {
        let clock = ManualClock::new(datetime!(2021-03-05 12:00 UTC));
        assert_eq!(clock.now(), datetime!(2021-03-05 12:00 UTC));

        clock.advance(Duration::hours(1));
        assert_eq!(clock.now(), datetime!(2021-03-05 13:00 UTC));

        clock.set(datetime!(2020-01-01 00:00 UTC));
        assert_eq!(clock.now(), datetime!(2020-01-01 00:00 UTC));
    }
}
