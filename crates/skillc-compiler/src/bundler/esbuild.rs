//! Bundler implementations.

use super::{BundleRequest, Bundler};
use async_trait::async_trait;
use skillc_core::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runs `esbuild` (or a compatible command) as a subprocess.
///
/// The synthetic entry is written to a fresh temporary directory inside the
/// project root, so the package resolves from the project's `node_modules`
/// and concurrent bundles of the same package never share a file. The
/// directory is removed when the call returns.
#[derive(Debug, Clone)]
pub struct EsbuildBundler {
    command: String,
}

impl EsbuildBundler {
    /// Creates a bundler for a command name or path.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Locates the bundler executable.
    ///
    /// Paths are taken relative to the project root. Bare names are looked
    /// up on `PATH` first, then in `node_modules/.bin`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BundleFailed`] if the executable cannot be found.
    pub fn locate(&self, project_root: &Path, package: &str) -> Result<PathBuf> {
        let as_path = Path::new(&self.command);
        if as_path.components().count() > 1 || as_path.is_absolute() {
            let path = project_root.join(as_path);
            return if path.is_file() {
                Ok(path)
            } else {
                Err(Error::BundleFailed {
                    package: package.to_string(),
                    message: format!("bundler not found at {}", path.display()),
                })
            };
        }

        if let Ok(path) = which::which(&self.command) {
            return Ok(path);
        }
        let local = project_root
            .join("node_modules")
            .join(".bin")
            .join(&self.command);
        if local.is_file() {
            return Ok(local);
        }
        Err(Error::BundleFailed {
            package: package.to_string(),
            message: format!(
                "'{}' is not on PATH or in node_modules/.bin",
                self.command
            ),
        })
    }
}

impl Default for EsbuildBundler {
    fn default() -> Self {
        Self::new("esbuild")
    }
}

#[async_trait]
impl Bundler for EsbuildBundler {
    async fn bundle(&self, request: &BundleRequest) -> Result<String> {
        let failed = |message: String| Error::BundleFailed {
            package: request.package.clone(),
            message,
        };

        let executable = self.locate(&request.project_root, &request.package)?;
        let workdir = tempfile::Builder::new()
            .prefix(".skillc-bundle-")
            .tempdir_in(&request.project_root)
            .map_err(|e| Error::io(&request.project_root, e))?;
        let entry = workdir.path().join("entry.js");
        let outfile = workdir.path().join("bundle.js");

        tokio::fs::write(&entry, &request.entry_source)
            .await
            .map_err(|e| Error::io(&entry, e))?;

        debug!(
            package = %request.package,
            bundler = %executable.display(),
            "Running bundler"
        );
        let output = Command::new(&executable)
            .arg(&entry)
            .args(["--bundle", "--platform=node", "--format=cjs", "--log-level=error"])
            .arg(format!("--outfile={}", outfile.display()))
            .current_dir(&request.project_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| failed(format!("cannot run {}: {e}", executable.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failed(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        let code = tokio::fs::read_to_string(&outfile)
            .await
            .map_err(|e| failed(format!("no bundle produced: {e}")))?;
        drop(workdir);
        Ok(code)
    }

    fn name(&self) -> &str {
        &self.command
    }
}

/// Bundler used when bundling is turned off; every call fails so that only
/// fallback providers apply.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledBundler;

#[async_trait]
impl Bundler for DisabledBundler {
    async fn bundle(&self, request: &BundleRequest) -> Result<String> {
        Err(Error::BundleFailed {
            package: request.package.clone(),
            message: "bundling is disabled".to_string(),
        })
    }

    fn name(&self) -> &str {
        "disabled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(root: &Path) -> BundleRequest {
        BundleRequest {
            package: "axios".to_string(),
            entry_source: "module.exports = require(\"axios\");\n".to_string(),
            project_root: root.to_path_buf(),
        }
    }

    #[tokio::test]
    async fn test_disabled_bundler_always_fails() {
        let err = DisabledBundler
            .bundle(&request(Path::new("/p")))
            .await
            .unwrap_err();
        assert!(err.is_bundle_error());
    }

    #[test]
    fn test_locate_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let bundler = EsbuildBundler::new("tools/esbuild");
        let err = bundler.locate(dir.path(), "axios").unwrap_err();
        assert!(err.is_bundle_error());
    }

    #[test]
    fn test_locate_node_modules_bin() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("node_modules/.bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("skillc-test-bundler"), "#!/bin/sh\n").unwrap();

        let bundler = EsbuildBundler::new("skillc-test-bundler");
        let found = bundler.locate(dir.path(), "axios").unwrap();
        assert_eq!(found, bin.join("skillc-test-bundler"));
    }

    #[tokio::test]
    async fn test_missing_bundler_reports_bundle_error() {
        let dir = tempfile::tempdir().unwrap();
        let bundler = EsbuildBundler::new("skillc-no-such-bundler");
        let err = bundler.bundle(&request(dir.path())).await.unwrap_err();
        assert!(err.is_bundle_error());
        assert!(err.to_string().contains("axios"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_bundler_output_is_read_and_workdir_removed() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-bundler.sh");
        // Copies the entry to the --outfile argument.
        std::fs::write(
            &script,
            "#!/bin/sh\nentry=\"$1\"\nfor arg in \"$@\"; do case \"$arg\" in --outfile=*) out=\"${arg#--outfile=}\";; esac; done\ncp \"$entry\" \"$out\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let bundler = EsbuildBundler::new(script.to_string_lossy().to_string());
        let code = bundler.bundle(&request(dir.path())).await.unwrap();
        assert_eq!(code, "module.exports = require(\"axios\");\n");

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(".skillc-bundle-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_bundler_failure_carries_stderr() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("failing-bundler.sh");
        std::fs::write(&script, "#!/bin/sh\necho 'Could not resolve \"axios\"' >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let bundler = EsbuildBundler::new(script.to_string_lossy().to_string());
        let err = bundler.bundle(&request(dir.path())).await.unwrap_err();
        assert!(err.to_string().contains("Could not resolve"));
    }
}
