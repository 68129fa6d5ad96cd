//! Command execution and runtime logic.
//!
//! Contains the command dispatch and logging initialization.

use anyhow::Result;
use skillc_core::Error;
use skillc_core::cli::{ExitCode, OutputFormat};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};
use crate::commands;

/// Initializes logging infrastructure.
///
/// Logs go to stderr so command output on stdout stays parseable.
/// `--verbose` forces debug level; otherwise `RUST_LOG` applies, falling
/// back to info.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }

    Ok(())
}

/// Maps a failed command to its exit code.
///
/// The first `skillc` error in the context chain decides; anything else is
/// a plain failure.
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<Error>())
        .map_or(ExitCode::ERROR, ExitCode::for_error)
}

/// Executes the specified CLI command.
///
/// Routes commands to their respective handlers and returns an exit code.
///
/// # Errors
///
/// Returns an error if command execution fails.
pub async fn execute_command(command: Commands, output_format: OutputFormat) -> Result<ExitCode> {
    match command {
        Commands::Compile {
            project,
            entry,
            output,
            no_bundle,
            strict_schemas,
        } => {
            commands::compile::run(
                commands::compile::CompileArgs {
                    project,
                    entry,
                    output,
                    no_bundle,
                    strict_schemas,
                },
                output_format,
            )
            .await
        }
        Commands::Init {
            name,
            dir,
            org_id,
            agent_id,
            force,
        } => commands::init::run(name, dir, org_id, agent_id, force, output_format).await,
        Commands::Tools { project } => commands::tools::run(project, output_format).await,
        Commands::Completions { shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            commands::completions::run(shell, &mut cmd).await
        }
    }
}
