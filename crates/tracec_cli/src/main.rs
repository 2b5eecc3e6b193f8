//! `tracec` binary entry point. All argument parsing and dispatch lives in
//! [`tracec_cli::cli`]; this wrapper just forwards the exit code.

use std::process::ExitCode;

fn main() -> ExitCode {
    tracec_cli::run_cli()
}
