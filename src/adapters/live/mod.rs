//! Live adapters for real external interactions.

pub mod clock;
pub mod network;

pub use clock::LiveClock;
pub use network::ReqwestBridge;
