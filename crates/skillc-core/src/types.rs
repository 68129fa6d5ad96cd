//! Strong domain types for skillc.
//!
//! # Examples
//!
//! ```
//! use skillc_core::{SkillName, ToolName};
//!
//! let skill = SkillName::new("weather-skill").unwrap();
//! let tool = ToolName::new("get_weather");
//! assert_eq!(tool.file_stem(), "get_weather");
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated skill name.
///
/// Skill names end up in directory names, `package.json` and the deploy
/// manifest, so they are restricted to lowercase letters, digits, hyphens
/// and underscores, starting with a letter.
///
/// # Examples
///
/// ```
/// use skillc_core::SkillName;
///
/// assert!(SkillName::new("weather").is_ok());
/// assert!(SkillName::new("Weather Skill").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SkillName(String);

impl SkillName {
    /// Maximum length of a skill name.
    pub const MAX_LEN: usize = 64;

    /// Creates a validated skill name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] if the name is empty, too long,
    /// does not start with a lowercase letter, or contains characters other
    /// than lowercase letters, digits, `-` and `_`.
    pub fn new(name: impl AsRef<str>) -> Result<Self> {
        let name = name.as_ref();

        if name.is_empty() || name.len() > Self::MAX_LEN {
            return Err(Error::ValidationError {
                field: "skill name".to_string(),
                reason: format!("must be 1-{} characters, got {}", Self::MAX_LEN, name.len()),
            });
        }

        if !name.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
            return Err(Error::ValidationError {
                field: "skill name".to_string(),
                reason: "must start with a lowercase letter".to_string(),
            });
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(Error::ValidationError {
                field: "skill name".to_string(),
                reason: "must contain only lowercase letters, numbers, hyphens, and underscores"
                    .to_string(),
            });
        }

        Ok(Self(name.to_string()))
    }

    /// Returns the skill name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SkillName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SkillName> for String {
    fn from(name: SkillName) -> Self {
        name.0
    }
}

impl fmt::Display for SkillName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tool name as declared in the entry source.
///
/// The name is the durable identifier of a compiled tool; it is kept
/// verbatim in the manifest and only sanitised when used as a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolName(String);

impl ToolName {
    /// Creates a new tool name.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the tool name as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a file-system safe stem for the per-tool output file.
    ///
    /// Characters outside `[A-Za-z0-9_-]` are replaced with `_`.
    ///
    /// # Examples
    ///
    /// ```
    /// use skillc_core::ToolName;
    ///
    /// assert_eq!(ToolName::new("get weather").file_stem(), "get_weather");
    /// assert_eq!(ToolName::new("../etc").file_stem(), "___etc");
    /// ```
    #[must_use]
    pub fn file_stem(&self) -> String {
        let stem: String = self
            .0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if stem.is_empty() {
            "_".to_string()
        } else {
            stem
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ToolName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_name_valid() {
        assert!(SkillName::new("weather").is_ok());
        assert!(SkillName::new("weather-skill_2").is_ok());
    }

    #[test]
    fn test_skill_name_invalid() {
        assert!(SkillName::new("").is_err());
        assert!(SkillName::new("Weather").is_err());
        assert!(SkillName::new("1weather").is_err());
        assert!(SkillName::new("weather skill").is_err());
        assert!(SkillName::new("a".repeat(65)).is_err());
    }

    #[test]
    fn test_skill_name_serde_validates() {
        let ok: SkillName = serde_json::from_str("\"weather\"").unwrap();
        assert_eq!(ok.as_str(), "weather");
        assert!(serde_json::from_str::<SkillName>("\"Bad Name\"").is_err());
    }

    #[test]
    fn test_tool_name_file_stem() {
        assert_eq!(ToolName::new("echo").file_stem(), "echo");
        assert_eq!(ToolName::new("a/b").file_stem(), "a_b");
        assert_eq!(ToolName::new("").file_stem(), "_");
    }

    #[test]
    fn test_tool_name_is_transparent_in_json() {
        let json = serde_json::to_string(&ToolName::new("echo")).unwrap();
        assert_eq!(json, "\"echo\"");
    }
}
