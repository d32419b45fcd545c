//! varlint entry point.
//!
//! ```bash
//! varlint --vars group_vars/all.yml --rules lint/rules.yml
//! ```

use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use varlint_cli::{Cli, ERROR_EXIT_CODE};

fn main() -> ExitCode {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let mut cli = Cli::parse();
    if !io::stdout().is_terminal() {
        cli.no_color = true;
    }

    let cwd = std::env::current_dir().unwrap_or_default();
    let mut stdout = io::stdout().lock();

    match varlint_cli::run(&cli, &cwd, &mut stdout) {
        Ok(outcome) => {
            // Explicitly ignored: nothing useful to do if stdout is gone
            let _ = stdout.flush();
            outcome.exit_code()
        }
        Err(err) => {
            let _ = stdout.flush();
            eprintln!("error: {err:#}");
            ExitCode::from(ERROR_EXIT_CODE)
        }
    }
}
