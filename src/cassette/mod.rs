//! Cassettes: named, file-backed lists of recorded HTTP interactions.

pub mod format;
pub mod name;
pub mod recorder;
pub mod replayer;
pub mod session;
pub mod store;

pub use format::{
    Cassette, Interaction, RecordedRequest, RecordedResponse, RequestDescriptor,
    ResponseDescriptor,
};
pub use session::{CassetteSession, Exchange, Mode, ResponseSource, VcrOptions};
