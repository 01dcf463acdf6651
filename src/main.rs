//! Binary entrypoint for the `vcrkit` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    match vcrkit::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
