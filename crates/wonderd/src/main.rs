//! Entry point for `wonderd`.
//!
//! Configuration comes from `--config-path`, `WONDER_*` variables, and flags;
//! see [`wonder_config::Config`].

use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match wonderd::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let mut stderr = io::stderr().lock();
            let _ = writeln!(stderr, "wonderd: {error}");
            ExitCode::FAILURE
        }
    }
}
