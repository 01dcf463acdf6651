//! Clock that always reports the same instant.

use chrono::{DateTime, Utc};

use crate::ports::clock::Clock;

/// Returns a preset time on every call, so recorded cassettes are
/// byte-for-byte reproducible.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<Utc>,
}

impl FixedClock {
    /// A clock frozen at `at`.
    #[must_use]
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn serves_the_same_instant_repeatedly() {
        let at = Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap();
        let clock = FixedClock::new(at);
        assert_eq!(clock.now(), at);
        assert_eq!(clock.now().to_rfc3339(), "2024-06-15T10:30:00+00:00");
    }
}
