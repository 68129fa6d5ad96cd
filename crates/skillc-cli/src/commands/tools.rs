//! Tools command.
//!
//! Lists the tools of the last compiled manifest without recompiling.

use crate::formatters::format_output;
use anyhow::{Context, Result};
use serde::Serialize;
use skillc_compiler::load_manifest;
use skillc_compiler::manifest::MANIFEST_FILE;
use skillc_core::cli::{ExitCode, OutputFormat};
use skillc_core::{CompiledTool, DeployManifest, ProjectConfig};
use std::path::{Path, PathBuf};
use tracing::info;

/// One manifest entry, without its execute source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolSummary {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// Input field names
    pub input: Vec<String>,
    /// Output field names
    pub output: Vec<String>,
}

impl From<&CompiledTool> for ToolSummary {
    fn from(tool: &CompiledTool) -> Self {
        let names = |fields: Vec<&str>| fields.into_iter().map(str::to_string).collect();
        Self {
            name: tool.name.as_str().to_string(),
            description: tool.description.clone(),
            input: names(tool.input_schema.field_names()),
            output: names(tool.output_schema.field_names()),
        }
    }
}

/// Listing printed by `skillc tools`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolListing {
    /// Skill name
    pub skill_name: String,
    /// Skill version
    pub version: String,
    /// Manifest the listing was read from
    pub manifest_path: PathBuf,
    /// Tools in manifest order
    pub tools: Vec<ToolSummary>,
}

impl ToolListing {
    fn new(manifest: &DeployManifest, manifest_path: PathBuf) -> Self {
        Self {
            skill_name: manifest.skills_name.clone(),
            version: manifest.version.clone(),
            manifest_path,
            tools: manifest.tools.iter().map(ToolSummary::from).collect(),
        }
    }
}

/// Reads the compiled manifest of a project.
pub fn list_tools(project: &Path) -> Result<ToolListing> {
    let config = ProjectConfig::load(project).with_context(|| {
        format!(
            "failed to load {} from {}",
            ProjectConfig::FILE_NAME,
            project.display()
        )
    })?;
    let manifest_path = config.output_dir(project).join(MANIFEST_FILE);
    let manifest = load_manifest(&manifest_path).with_context(|| {
        format!(
            "no compiled manifest at {}; run `skillc compile` first",
            manifest_path.display()
        )
    })?;

    Ok(ToolListing::new(&manifest, manifest_path))
}

/// Runs the tools command.
pub async fn run(project: PathBuf, output_format: OutputFormat) -> Result<ExitCode> {
    info!("Listing tools for {}", project.display());

    let listing = list_tools(&project)?;
    let formatted = format_output(&listing, output_format)?;
    println!("{formatted}");

    Ok(ExitCode::SUCCESS)
}
