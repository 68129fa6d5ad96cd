//! Init command.
//!
//! Scaffolds a new skill project. When no name is given on the command
//! line the user is prompted for one, defaulting to the target directory's
//! name.

use crate::formatters::format_output;
use anyhow::{Context, Result};
use dialoguer::Input;
use serde::Serialize;
use skillc_compiler::{ScaffoldOptions, TemplateEngine, scaffold_project};
use skillc_core::SkillName;
use skillc_core::cli::{ExitCode, OutputFormat};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Result of `skillc init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitResult {
    /// Skill name written to `skill.toml`
    pub skill_name: String,
    /// Project directory
    pub directory: PathBuf,
    /// Files written
    pub files: Vec<PathBuf>,
    /// Command that compiles the new project
    pub next_step: String,
}

/// Writes a starter project into `dir`.
pub fn init_project(dir: &Path, options: &ScaffoldOptions) -> Result<InitResult> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))?;

    let templates = TemplateEngine::new().context("failed to load project templates")?;
    let files = scaffold_project(&templates, dir, options)
        .with_context(|| format!("failed to scaffold project in {}", dir.display()))?;

    Ok(InitResult {
        skill_name: options.name.as_str().to_string(),
        directory: dir.to_path_buf(),
        next_step: format!("skillc compile --project {}", dir.display()),
        files,
    })
}

/// Prompts for a skill name until a valid one is entered.
fn prompt_skill_name(dir: &Path) -> Result<SkillName> {
    let default_name = dir
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_lowercase()))
        .filter(|n| SkillName::new(n).is_ok())
        .unwrap_or_else(|| "my-skill".to_string());

    loop {
        let input: String = Input::new()
            .with_prompt("Skill name (lowercase, alphanumeric, hyphens)")
            .default(default_name.clone())
            .interact()
            .context("failed to read user input")?;

        match SkillName::new(&input) {
            Ok(name) => return Ok(name),
            Err(e) => {
                eprintln!("Invalid skill name: {e}");
                eprintln!("Requirements: 1-64 chars, [a-z0-9-_], start with letter");
            }
        }
    }
}

/// Runs the init command.
pub async fn run(
    name: Option<String>,
    dir: PathBuf,
    org_id: Option<String>,
    agent_id: Option<String>,
    force: bool,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    let name = match name {
        Some(name) => SkillName::new(&name).context("invalid skill name")?,
        None => prompt_skill_name(&dir)?,
    };
    info!("Initializing skill '{}' in {}", name, dir.display());

    let options = ScaffoldOptions {
        name,
        org_id,
        agent_id,
        force,
    };
    let result = init_project(&dir, &options)?;
    let formatted = format_output(&result, output_format)?;
    println!("{formatted}");

    Ok(ExitCode::SUCCESS)
}
