//! Clock port for timestamping recorded interactions.

use chrono::{DateTime, Utc};

/// Provides the current time.
///
/// Abstracting time access keeps `recorded_at` deterministic in tests by
/// substituting a fixed clock.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}
