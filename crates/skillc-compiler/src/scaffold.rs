//! Project scaffolding for `skillc init`.
//!
//! Writes a compilable starter project: `skill.toml`, `package.json`,
//! `tsconfig.json`, an entry module with one inline tool, and one
//! class-based tool in its own file.

use crate::template_engine::TemplateEngine;
use serde::Serialize;
use skillc_core::{Error, ProjectConfig, Result, SkillName};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Files written by [`scaffold_project`]: `(template, relative path)`.
const SCAFFOLD_FILES: &[(&str, &str)] = &[
    ("scaffold/skill.toml", ProjectConfig::FILE_NAME),
    ("scaffold/package.json", "package.json"),
    ("scaffold/tsconfig.json", "tsconfig.json"),
    ("scaffold/index.ts", "src/index.ts"),
    ("scaffold/tool.ts", "src/tools/GreetingTool.ts"),
];

/// Inputs for a new project.
#[derive(Debug, Clone)]
pub struct ScaffoldOptions {
    /// Skill name
    pub name: SkillName,
    /// Platform organization id, if known
    pub org_id: Option<String>,
    /// Platform agent id, if known
    pub agent_id: Option<String>,
    /// Overwrite existing files
    pub force: bool,
}

#[derive(Serialize)]
struct ScaffoldContext<'a> {
    name: &'a str,
    org_id: Option<&'a str>,
    agent_id: Option<&'a str>,
}

/// Writes a starter project into `dir` and returns the written paths.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if any target file exists and
/// `force` is not set, or an I/O error if writing fails.
pub fn scaffold_project(
    templates: &TemplateEngine<'_>,
    dir: &Path,
    options: &ScaffoldOptions,
) -> Result<Vec<PathBuf>> {
    let targets: Vec<PathBuf> = SCAFFOLD_FILES.iter().map(|(_, rel)| dir.join(rel)).collect();
    if !options.force {
        let existing: Vec<String> = targets
            .iter()
            .filter(|p| p.exists())
            .map(|p| p.display().to_string())
            .collect();
        if !existing.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "refusing to overwrite existing files ({}); pass --force to replace them",
                existing.join(", ")
            )));
        }
    }

    let context = ScaffoldContext {
        name: options.name.as_str(),
        org_id: options.org_id.as_deref(),
        agent_id: options.agent_id.as_deref(),
    };

    // Render everything before touching the disk.
    let rendered = SCAFFOLD_FILES
        .iter()
        .map(|(template, _)| templates.render(template, &context))
        .collect::<Result<Vec<_>>>()?;

    for (path, contents) in targets.iter().zip(rendered) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::write(path, contents).map_err(|e| Error::io(path, e))?;
        debug!("Wrote {}", path.display());
    }
    Ok(targets)
}
