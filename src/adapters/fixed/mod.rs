//! Deterministic adapters for tests.

pub mod clock;

pub use clock::FixedClock;
