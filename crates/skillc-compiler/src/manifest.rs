//! Manifest Writer.
//!
//! Persists a [`DeployManifest`] as `deploy.json` plus one `<tool>.js` file
//! per tool holding exactly that tool's execute string. Every write is a
//! full regeneration: existing files are overwritten and tool files left
//! over from the previous manifest are removed.
//!
//! ```text
//! .skillc/
//! ├── deploy.json
//! ├── echo.js
//! └── weather.js
//! ```

use skillc_core::{DeployManifest, Error, Result};
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use tempfile::NamedTempFile;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the aggregate manifest inside the output directory.
pub const MANIFEST_FILE: &str = "deploy.json";

/// Extension of per-tool execute files.
pub const TOOL_FILE_EXTENSION: &str = "js";

/// Files produced by one [`ManifestWriter::write`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenManifest {
    /// Path of `deploy.json`
    pub manifest_path: PathBuf,
    /// Per-tool files, in manifest order
    pub tool_files: Vec<PathBuf>,
    /// Stale tool files that were removed
    pub removed: Vec<PathBuf>,
}

/// Writes compile output into one directory.
#[derive(Debug, Clone)]
pub struct ManifestWriter {
    output_dir: PathBuf,
}

impl ManifestWriter {
    /// Creates a writer targeting `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Returns the path of the manifest file.
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(MANIFEST_FILE)
    }

    /// Writes the manifest and tool files, replacing previous output.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or a file
    /// cannot be written.
    pub fn write(&self, manifest: &DeployManifest) -> Result<WrittenManifest> {
        fs::create_dir_all(&self.output_dir).map_err(|e| Error::io(&self.output_dir, e))?;

        let manifest_path = self.manifest_path();
        let previous = self.previous_tool_files(&manifest_path);

        // Everything is staged before anything is renamed into place, so a
        // failed write leaves the previous output untouched.
        let mut used = BTreeSet::new();
        let mut staged = Vec::with_capacity(manifest.tools.len() + 1);
        for tool in &manifest.tools {
            let stem = unique_stem(&tool.name.file_stem(), &used);
            used.insert(stem.clone());
            let path = self.tool_path(&stem);
            staged.push((self.stage(&path, tool.execute.as_bytes())?, path));
        }
        let tool_files: Vec<PathBuf> = staged.iter().map(|(_, path)| path.clone()).collect();

        let mut json = serde_json::to_string_pretty(manifest).map_err(|e| Error::SerializationError {
            message: "cannot serialize deploy manifest".to_string(),
            source: Some(e),
        })?;
        json.push('\n');
        staged.push((self.stage(&manifest_path, json.as_bytes())?, manifest_path.clone()));

        for (file, path) in staged {
            file.persist(&path).map_err(|e| Error::io(&path, e.error))?;
            debug!(path = %path.display(), "Wrote output file");
        }

        let mut removed = Vec::new();
        for path in previous {
            if tool_files.contains(&path) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!("Removed stale tool file {}", path.display());
                    removed.push(path);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove stale tool file {}: {e}", path.display()),
            }
        }

        Ok(WrittenManifest {
            manifest_path,
            tool_files,
            removed,
        })
    }

    fn tool_path(&self, stem: &str) -> PathBuf {
        self.output_dir.join(format!("{stem}.{TOOL_FILE_EXTENSION}"))
    }

    /// Tool files named by the manifest currently on disk, if any.
    fn previous_tool_files(&self, manifest_path: &Path) -> Vec<PathBuf> {
        if !manifest_path.exists() {
            return Vec::new();
        }
        match load_manifest(manifest_path) {
            Ok(previous) => {
                let mut used = BTreeSet::new();
                previous
                    .tools
                    .iter()
                    .map(|tool| {
                        let stem = unique_stem(&tool.name.file_stem(), &used);
                        used.insert(stem.clone());
                        self.tool_path(&stem)
                    })
                    .collect()
            }
            Err(e) => {
                warn!("Ignoring unreadable previous manifest: {e}");
                Vec::new()
            }
        }
    }

    /// Writes `contents` to a temporary file next to `path`. Persisting it
    /// renames it over `path`, so readers never see a half-written file.
    fn stage(&self, path: &Path, contents: &[u8]) -> Result<NamedTempFile> {
        if path.is_dir() {
            return Err(Error::io(
                path,
                io::Error::new(io::ErrorKind::IsADirectory, "a directory is in the way"),
            ));
        }
        let mut file =
            NamedTempFile::new_in(&self.output_dir).map_err(|e| Error::io(&self.output_dir, e))?;
        file.write_all(contents).map_err(|e| Error::io(path, e))?;
        Ok(file)
    }
}

/// `stem`, or `stem_2`, `stem_3`, ... if already taken.
fn unique_stem(stem: &str, used: &BTreeSet<String>) -> String {
    if !used.contains(stem) {
        return stem.to_string();
    }
    (2..)
        .map(|n| format!("{stem}_{n}"))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or_else(|| stem.to_string())
}

/// Reads a manifest written by [`ManifestWriter::write`].
///
/// # Errors
///
/// Returns [`Error::SourceNotFound`] if the file does not exist and
/// [`Error::SerializationError`] if it is not a valid manifest.
pub fn load_manifest(path: &Path) -> Result<DeployManifest> {
    let text = fs::read_to_string(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            Error::SourceNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Error::io(path, e)
        }
    })?;
    serde_json::from_str(&text).map_err(|e| Error::SerializationError {
        message: format!("invalid manifest {}", path.display()),
        source: Some(e),
    })
}
