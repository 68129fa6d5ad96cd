//! Core types, configuration, and errors for skillc.
//!
//! This crate provides the foundational types used across all other crates
//! in the skillc workspace.
//!
//! # Architecture
//!
//! The core consists of:
//! - Strong domain types (`SkillName`, `ToolName`)
//! - Error hierarchy with contextual information
//! - The deploy manifest data model (`DeployManifest`, `CompiledTool`, `SchemaShape`)
//! - The project descriptor (`ProjectConfig`, loaded from `skill.toml`)
//! - CLI primitives (`OutputFormat`, `ExitCode`)

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod cli;
mod config;
mod error;
mod manifest;
mod types;

pub use config::{CompileSection, PlatformSection, ProjectConfig, SkillSection};
pub use error::{Error, Result};
pub use manifest::{CompiledTool, DeployManifest, PrimitiveType, SchemaShape};
pub use types::{SkillName, ToolName};
