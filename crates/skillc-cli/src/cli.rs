//! CLI argument definitions and parsing.
//!
//! Defines the command-line interface structure using clap:
//! - `Cli` - Main CLI entry point
//! - `Commands` - Available subcommands

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// skillc - compile TypeScript skills into self-contained deploy manifests.
///
/// Every tool registered in the skill's entry module becomes a JSON manifest
/// entry whose `execute` function carries its own dependencies.
#[derive(Parser, Debug)]
#[command(name = "skillc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Output format (json, text, pretty)
    #[arg(long = "format", global = true, default_value = "pretty")]
    pub format: String,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a skill project into a deploy manifest.
    ///
    /// Reads `skill.toml`, extracts every registered tool from the entry
    /// module and writes `deploy.json` plus one `.js` file per tool.
    /// Declarations that cannot be compiled are skipped with a warning.
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Compile the project in the current directory
    /// skillc compile
    ///
    /// # Fallback packages only, strict schemas
    /// skillc compile --project weather-skill --no-bundle --strict-schemas
    /// ```
    Compile {
        /// Project directory containing `skill.toml`
        #[arg(short, long, default_value = ".")]
        project: PathBuf,

        /// Entry module, overriding `skill.entry`
        #[arg(short, long)]
        entry: Option<PathBuf>,

        /// Output directory, overriding `compile.output_dir`
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not run the external bundler; only fallbacks apply
        #[arg(long)]
        no_bundle: bool,

        /// Skip tools whose schemas contain unsupported fields
        #[arg(long)]
        strict_schemas: bool,
    },

    /// Create a new skill project.
    ///
    /// Writes `skill.toml`, `package.json`, `tsconfig.json` and a starter
    /// entry module with one inline and one class-based tool.
    ///
    /// # Examples
    ///
    /// ```bash
    /// skillc init weather-skill --dir weather-skill --org-id org_123
    /// ```
    Init {
        /// Skill name (prompted for when omitted)
        name: Option<String>,

        /// Directory to create the project in
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Platform organization id
        #[arg(long, env = "SKILLC_ORG_ID")]
        org_id: Option<String>,

        /// Platform agent id
        #[arg(long, env = "SKILLC_AGENT_ID")]
        agent_id: Option<String>,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// List the tools in a compiled manifest.
    Tools {
        /// Project directory containing `skill.toml`
        #[arg(short, long, default_value = ".")]
        project: PathBuf,
    },

    /// Generate shell completions.
    ///
    /// Generates completion scripts for various shells that can be
    /// sourced or saved to enable tab completion for this CLI.
    Completions {
        /// Target shell for completion generation
        #[arg(value_enum)]
        shell: Shell,
    },
}
