//! `scrubber`: sanitize HTML from stdin with a TOML policy.
//!
//! ```text
//! scrubber policy.toml < untrusted.html > clean.html
//! ```

use clap::Parser;
use log::{error, warn};
use mimalloc::MiMalloc;
use sanitizer::{ParseError, PolicyConfig};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(name = "scrubber", version, about = "Sanitize untrusted HTML with a whitelist policy")]
struct Cli {
    /// Policy file (TOML).
    policy: PathBuf,

    /// Log lexing and nesting anomalies found in the input.
    #[arg(long)]
    report_errors: bool,
}

fn run(cli: &Cli) -> Result<(), String> {
    let policy = PolicyConfig::load(&cli.policy)
        .and_then(|config| config.build())
        .map_err(|err| err.to_string())?;

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .map_err(|err| format!("failed to read stdin: {err}"))?;

    let mut output = String::with_capacity(input.len());
    let mut errors: Vec<ParseError> = Vec::new();
    policy
        .sanitize_with_errors(&input, &mut output, &mut errors)
        .map_err(|err| format!("failed to render output: {err}"))?;
    if cli.report_errors {
        for anomaly in &errors {
            warn!("{anomaly}");
        }
    }

    io::stdout()
        .lock()
        .write_all(output.as_bytes())
        .map_err(|err| format!("failed to write stdout: {err}"))
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");
            eprintln!("scrubber: {message}");
            ExitCode::FAILURE
        }
    }
}
