//! Record HTTP exchanges to cassette files and replay them in tests.
//!
//! The interception layer hands each outgoing request to a
//! [`CassetteSession`], which serves it from the cassette, forwards it over a
//! [`NetworkBridge`] and records the result, or bypasses the cassette
//! entirely, depending on its [`Mode`].
//!
//! ```no_run
//! use vcrkit::{CassetteSession, Mode, Payload, RequestDescriptor, VcrOptions};
//! use vcrkit::adapters::live::ReqwestBridge;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = VcrOptions::new("github users", "tests/cassettes").mode(Mode::Record);
//! let session = CassetteSession::new(options, ReqwestBridge::new()?);
//! let request = RequestDescriptor::from_url("GET", "https://api.github.com/users?per_page=1")?;
//! let exchange = session.handle(&request, &Payload::Empty)?;
//! println!("{} bytes", exchange.body.len());
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod body;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod headers;
pub mod json;
pub mod logging;
pub mod matching;
pub mod ports;

pub use body::{Body, BodyType, Payload};
pub use cassette::{
    Cassette, CassetteSession, Exchange, Interaction, Mode, RequestDescriptor, ResponseDescriptor,
    ResponseSource, VcrOptions,
};
pub use config::Config;
pub use error::{ForwardError, VcrError};
pub use filter::{FilterChain, PatternFilter};
pub use matching::{Dimension, MatchCriteria};
pub use ports::{Clock, NetworkBridge};

use clap::error::ErrorKind;
use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };
    logging::init(cli.log_level.as_deref())?;
    commands::dispatch(&cli.command)
}
