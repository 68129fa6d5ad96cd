//! Error types for skillc.
//!
//! One error hierarchy is shared by every crate in the workspace. Per-tool
//! problems found while compiling are not errors: the compiler logs them and
//! moves on to the next declaration. Only conditions that abort a whole
//! compile end up here.
//!
//! # Examples
//!
//! ```
//! use skillc_core::{Error, Result};
//!
//! fn require_entry(entry: &str) -> Result<()> {
//!     if entry.is_empty() {
//!         return Err(Error::ConfigError {
//!             message: "entry file cannot be empty".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! let err = require_entry("").unwrap_err();
//! assert!(err.is_config_error());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for skillc.
#[derive(Error, Debug)]
pub enum Error {
    /// A required input file does not exist.
    ///
    /// Raised for the entry source file and the project descriptor. This is
    /// always fatal for the compile.
    #[error("Required file not found: {}", path.display())]
    SourceNotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// Reading or writing a file failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    ///
    /// Raised when `skill.toml` is malformed or contains contradictory
    /// settings.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// Invalid argument error.
    ///
    /// Raised when CLI arguments or function parameters are invalid.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Validation error for domain types.
    ///
    /// Raised when creating validated types such as [`SkillName`](crate::SkillName).
    #[error("Validation error in {field}: {reason}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Detailed reason for the validation failure
        reason: String,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Description of the serialization failure
        message: String,
        /// Underlying serde error
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Template registration or rendering failed.
    #[error("Template error: {message}")]
    TemplateError {
        /// Description of the template failure
        message: String,
    },

    /// The external bundler could not produce a bundle for a package.
    #[error("Bundling '{package}' failed: {message}")]
    BundleFailed {
        /// Import path of the package
        package: String,
        /// Bundler diagnostics
        message: String,
    },

    /// A schema contains field shapes that cannot be represented.
    #[error("Schema '{schema}' has unsupported fields: {}", fields.join(", "))]
    UnsupportedSchema {
        /// Name of the schema binding
        schema: String,
        /// Fields whose builder expression is not a primitive
        fields: Vec<String>,
    },
}

impl Error {
    /// Creates an I/O error bound to a path.
    ///
    /// # Examples
    ///
    /// ```
    /// use skillc_core::Error;
    /// use std::io;
    ///
    /// let err = Error::io("src/index.ts", io::Error::other("denied"));
    /// assert!(err.to_string().contains("src/index.ts"));
    /// ```
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if a required file was missing.
    ///
    /// # Examples
    ///
    /// ```
    /// use skillc_core::Error;
    ///
    /// let err = Error::SourceNotFound {
    ///     path: "skill.toml".into(),
    /// };
    /// assert!(err.is_not_found());
    /// ```
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::SourceNotFound { .. })
    }

    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }

    /// Returns `true` if this is a validation error.
    ///
    /// # Examples
    ///
    /// ```
    /// use skillc_core::Error;
    ///
    /// let err = Error::ValidationError {
    ///     field: "skill name".to_string(),
    ///     reason: "Invalid characters".to_string(),
    /// };
    /// assert!(err.is_validation_error());
    /// ```
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        matches!(self, Self::ValidationError { .. })
    }

    /// Returns `true` if the bundler failed for a package.
    #[must_use]
    pub const fn is_bundle_error(&self) -> bool {
        matches!(self, Self::BundleFailed { .. })
    }
}

/// Result type alias for skillc operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error_detection() {
        let err = Error::SourceNotFound {
            path: PathBuf::from("src/index.ts"),
        };
        assert!(err.is_not_found());
        assert!(!err.is_config_error());
        assert!(err.to_string().contains("src/index.ts"));
    }

    #[test]
    fn test_config_error_detection() {
        let err = Error::ConfigError {
            message: "Invalid configuration".to_string(),
        };
        assert!(err.is_config_error());
        assert!(!err.is_bundle_error());
    }

    #[test]
    fn test_bundle_error_display() {
        let err = Error::BundleFailed {
            package: "axios".to_string(),
            message: "Could not resolve \"axios\"".to_string(),
        };
        assert!(err.is_bundle_error());
        let display = err.to_string();
        assert!(display.contains("axios"));
        assert!(display.contains("Could not resolve"));
    }

    #[test]
    fn test_unsupported_schema_lists_fields() {
        let err = Error::UnsupportedSchema {
            schema: "WeatherInput".to_string(),
            fields: vec!["tags".to_string(), "location".to_string()],
        };
        assert!(!err.is_config_error());
        assert_eq!(
            err.to_string(),
            "Schema 'WeatherInput' has unsupported fields: tags, location"
        );
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error as _;

        let err = Error::io("out/deploy.json", std::io::Error::other("disk full"));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("disk full"));
    }
}
