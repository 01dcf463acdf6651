//! Port traits defining external boundaries.
//!
//! The record/replay core only talks to the outside world through these
//! traits. Implementations live in `src/adapters/`.

pub mod clock;
pub mod network;

pub use clock::Clock;
pub use network::{ForwardedResponse, NetworkBridge};
