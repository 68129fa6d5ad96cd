//! Project descriptor (`skill.toml`).
//!
//! The descriptor associates a project with a platform organisation and
//! agent, names the skill, and carries compile settings. It is loaded once
//! by the CLI and handed to the compiler as plain data.
//!
//! # Examples
//!
//! ```
//! use skillc_core::ProjectConfig;
//!
//! let config = ProjectConfig::from_toml_str(r#"
//! [skill]
//! name = "weather-skill"
//! version = "0.1.0"
//! "#).unwrap();
//!
//! assert_eq!(config.skill.entry.to_str(), Some("src/index.ts"));
//! assert!(config.compile.bundle);
//! ```

use crate::{Error, Result, SkillName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Parsed `skill.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Skill identity and entry point
    pub skill: SkillSection,
    /// Platform association (not used by the compiler)
    #[serde(default)]
    pub platform: PlatformSection,
    /// Compile settings
    #[serde(default)]
    pub compile: CompileSection,
}

/// `[skill]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkillSection {
    /// Skill name, written to the manifest as `skillsName`
    pub name: SkillName,
    /// Skill version, written to the manifest as `version`
    pub version: String,
    /// Entry source file, relative to the project root
    #[serde(default = "default_entry")]
    pub entry: PathBuf,
}

/// `[platform]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformSection {
    /// Organisation the skill belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    /// Agent the skill is attached to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

/// `[compile]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileSection {
    /// Directory receiving `deploy.json` and per-tool files
    pub output_dir: PathBuf,
    /// Bundle external packages (fallbacks still apply when `false`)
    pub bundle: bool,
    /// Bundler command name or path
    pub bundler: String,
    /// Packages that provide the tool contract and are dropped from output
    pub framework_packages: Vec<String>,
    /// Schema libraries passed through as `require(...)`
    pub schema_packages: Vec<String>,
    /// Call names that register a tool
    pub registration_calls: Vec<String>,
    /// How many local-import hops the closure resolver follows
    pub max_local_depth: usize,
    /// Skip tools whose schemas contain unsupported field shapes
    pub strict_schemas: bool,
    /// Extra fallback providers: package name to CommonJS file
    pub fallbacks: BTreeMap<String, PathBuf>,
}

impl Default for CompileSection {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(".skillc"),
            bundle: true,
            bundler: "esbuild".to_string(),
            framework_packages: vec!["lua-cli".to_string()],
            schema_packages: vec!["zod".to_string()],
            registration_calls: vec!["registerTool".to_string()],
            max_local_depth: 1,
            strict_schemas: false,
            fallbacks: BTreeMap::new(),
        }
    }
}

fn default_entry() -> PathBuf {
    PathBuf::from("src/index.ts")
}

impl ProjectConfig {
    /// Descriptor file name looked up in the project root.
    pub const FILE_NAME: &'static str = "skill.toml";

    /// Creates a descriptor with default compile settings.
    #[must_use]
    pub fn new(name: SkillName, version: impl Into<String>) -> Self {
        Self {
            skill: SkillSection {
                name,
                version: version.into(),
                entry: default_entry(),
            },
            platform: PlatformSection::default(),
            compile: CompileSection::default(),
        }
    }

    /// Loads `skill.toml` from a project root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceNotFound`] if the descriptor does not exist,
    /// [`Error::Io`] if it cannot be read, and [`Error::ConfigError`] if it
    /// does not parse or fails validation.
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(Self::FILE_NAME);
        if !path.is_file() {
            return Err(Error::SourceNotFound { path });
        }

        let text = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded project descriptor from {}", path.display());
        Ok(config)
    }

    /// Parses and validates a descriptor from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] on parse or validation failure.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::ConfigError {
            message: format!("invalid {}: {e}", Self::FILE_NAME),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the descriptor to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::ConfigError {
            message: format!("failed to serialize {}: {e}", Self::FILE_NAME),
        })
    }

    /// Checks cross-field constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.skill.version.trim().is_empty() {
            return Err(Error::ConfigError {
                message: "skill.version cannot be empty".to_string(),
            });
        }
        if self.skill.entry.as_os_str().is_empty() {
            return Err(Error::ConfigError {
                message: "skill.entry cannot be empty".to_string(),
            });
        }
        if self.compile.output_dir.as_os_str().is_empty() {
            return Err(Error::ConfigError {
                message: "compile.output_dir cannot be empty".to_string(),
            });
        }
        if self.compile.bundle && self.compile.bundler.trim().is_empty() {
            return Err(Error::ConfigError {
                message: "compile.bundler cannot be empty when bundling is enabled".to_string(),
            });
        }
        if self.compile.registration_calls.is_empty() {
            return Err(Error::ConfigError {
                message: "compile.registration_calls needs at least one call name".to_string(),
            });
        }
        Ok(())
    }

    /// Absolute entry file path for a project root.
    #[must_use]
    pub fn entry_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.skill.entry)
    }

    /// Absolute output directory for a project root.
    #[must_use]
    pub fn output_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.compile.output_dir)
    }
}
