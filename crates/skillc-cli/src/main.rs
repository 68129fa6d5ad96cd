//! skillc command-line entry point.
//!
//! # Examples
//!
//! ```bash
//! # Scaffold a project
//! skillc init weather-skill --dir weather-skill
//!
//! # Compile it
//! skillc compile --project weather-skill
//!
//! # Inspect the result
//! skillc tools --project weather-skill --format json
//! ```

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use skillc_cli::cli::Cli;
use skillc_cli::runner::{execute_command, exit_code_for, init_logging};
use skillc_core::cli::{ExitCode, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_json)?;

    let output_format = match cli.format.parse::<OutputFormat>() {
        Ok(format) => format,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            std::process::exit(ExitCode::for_error(&e).as_i32());
        }
    };

    let exit_code = match execute_command(cli.command, output_format).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            exit_code_for(&e)
        }
    };

    std::process::exit(exit_code.as_i32());
}
