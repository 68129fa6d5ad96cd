//! Output formats and process exit codes of the `skillc` binary.
//!
//! # Examples
//!
//! ```
//! use skillc_core::cli::{ExitCode, OutputFormat};
//!
//! let format: OutputFormat = "json".parse().unwrap();
//! assert_eq!(format, OutputFormat::Json);
//! assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
//! ```

use crate::Error;
use std::fmt;
use std::str::FromStr;

/// How a command prints its result on stdout.
///
/// Selected with `--format`. Logs never go to stdout, whatever the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Indented JSON, for `jq` and other tools
    Json,
    /// Single-line JSON, one result per line
    Text,
    /// Colored `key: value` listing for a terminal
    #[default]
    Pretty,
}

impl OutputFormat {
    /// Name accepted by `--format`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Pretty => "pretty",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Json, Self::Text, Self::Pretty]
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "unknown --format '{s}'; use json, text or pretty"
                ))
            })
    }
}

/// Process exit status of `skillc`.
///
/// A compile that skipped some tool declarations still exits with
/// [`ExitCode::SUCCESS`]; skips are reported as warnings and in the
/// command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// The command finished. For `compile` the manifest was written, even
    /// if some declarations were skipped.
    pub const SUCCESS: Self = Self(0);

    /// The command aborted: no `skill.toml` or entry file, a source that
    /// cannot be read, or an output that cannot be written.
    pub const ERROR: Self = Self(1);

    /// A flag or name was rejected before any work started, such as an
    /// unknown `--format` or an invalid skill name.
    pub const INVALID_INPUT: Self = Self(2);

    /// Exit status for a command that failed with `err`.
    ///
    /// # Examples
    ///
    /// ```
    /// use skillc_core::Error;
    /// use skillc_core::cli::ExitCode;
    ///
    /// let bad_name = Error::ValidationError {
    ///     field: "skill name".to_string(),
    ///     reason: "must start with a letter".to_string(),
    /// };
    /// assert_eq!(ExitCode::for_error(&bad_name), ExitCode::INVALID_INPUT);
    /// ```
    #[must_use]
    pub const fn for_error(err: &Error) -> Self {
        if err.is_validation_error() || matches!(err, Error::InvalidArgument(_)) {
            Self::INVALID_INPUT
        } else {
            Self::ERROR
        }
    }

    /// Value passed to `std::process::exit`.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }
}

impl Default for ExitCode {
    fn default() -> Self {
        Self::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_names_parse_in_any_case() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("Text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!(
            "PRETTY".parse::<OutputFormat>().unwrap(),
            OutputFormat::Pretty
        );
        assert_eq!(OutputFormat::default().to_string(), "pretty");
    }

    #[test]
    fn test_unknown_format_is_invalid_input() {
        let err = "yaml".parse::<OutputFormat>().unwrap_err();
        assert!(err.to_string().contains("--format 'yaml'"));
        assert_eq!(ExitCode::for_error(&err), ExitCode::INVALID_INPUT);
        assert!("".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_missing_entry_is_an_error_exit() {
        let err = Error::SourceNotFound {
            path: PathBuf::from("src/index.ts"),
        };
        assert_eq!(ExitCode::for_error(&err), ExitCode::ERROR);
        assert_eq!(ExitCode::ERROR.as_i32(), 1);
        assert_eq!(ExitCode::INVALID_INPUT.as_i32(), 2);
        assert_eq!(ExitCode::default(), ExitCode::SUCCESS);
    }
}
