//! The main entry point for the finch kernel.

use std::process::ExitCode;

fn main() -> ExitCode {
    let opts = match finch_cli::parse_args(std::env::args_os()) {
        Ok(opts) => opts,
        Err(e) => e.exit(),
    };
    finch_cli::run(opts)
}
