//! System clock.

use chrono::{DateTime, Utc};

use crate::ports::clock::Clock;

/// Stamps interactions with the real current time.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveClock;

impl Clock for LiveClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_current_time() {
        let before = Utc::now();
        let now = LiveClock.now();
        let after = Utc::now();

        assert!(before <= now && now <= after);
    }
}
