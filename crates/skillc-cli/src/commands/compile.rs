//! Compile command.
//!
//! Loads `skill.toml`, applies command-line overrides and writes the deploy
//! manifest. Skipped declarations are reported but do not fail the command.

use crate::formatters::format_output;
use anyhow::{Context, Result};
use skillc_compiler::{CompileOptions, CompileReport, SkillCompiler};
use skillc_core::ProjectConfig;
use skillc_core::cli::{ExitCode, OutputFormat};
use std::path::PathBuf;
use tracing::{info, warn};

/// Arguments of `skillc compile`.
#[derive(Debug, Clone, Default)]
pub struct CompileArgs {
    /// Project directory containing `skill.toml`
    pub project: PathBuf,
    /// Entry module override
    pub entry: Option<PathBuf>,
    /// Output directory override
    pub output: Option<PathBuf>,
    /// Disable the external bundler
    pub no_bundle: bool,
    /// Skip tools with unsupported schema fields
    pub strict_schemas: bool,
}

/// Resolves compile options from the descriptor and overrides.
///
/// Flags only ever switch behavior on: `--no-bundle` disables bundling and
/// `--strict-schemas` enables strict schemas, otherwise `skill.toml` decides.
pub fn resolve_options(args: &CompileArgs) -> Result<CompileOptions> {
    let config = ProjectConfig::load(&args.project).with_context(|| {
        format!(
            "failed to load {} from {}",
            ProjectConfig::FILE_NAME,
            args.project.display()
        )
    })?;

    let mut options = CompileOptions::from_config(&config, &args.project);
    if let Some(entry) = &args.entry {
        options = options.with_entry(entry);
    }
    if let Some(output) = &args.output {
        options = options.with_output_dir(output);
    }
    if args.no_bundle {
        options = options.with_bundle(false);
    }
    if args.strict_schemas {
        options = options.with_strict_schemas(true);
    }
    Ok(options)
}

/// Compiles the project and returns the report without printing it.
pub async fn compile_project(args: &CompileArgs) -> Result<CompileReport> {
    let options = resolve_options(args)?;
    let compiler = SkillCompiler::new(options).context("failed to initialize compiler")?;
    let report = compiler.compile().await.context("compile failed")?;

    for skipped in &report.skipped {
        warn!("Skipped {}: {}", skipped.site, skipped.reason);
    }
    Ok(report)
}

/// Runs the compile command.
pub async fn run(args: CompileArgs, output_format: OutputFormat) -> Result<ExitCode> {
    info!("Compiling project at {}", args.project.display());

    let report = compile_project(&args).await?;
    let formatted = format_output(&report, output_format)?;
    println!("{formatted}");

    Ok(ExitCode::SUCCESS)
}
