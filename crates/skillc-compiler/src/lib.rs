//! Skill compiler: turns a TypeScript skill project into a deploy manifest.
//!
//! Each registered tool becomes a [`CompiledTool`](skillc_core::CompiledTool)
//! whose `execute` string is a self-contained `async (input) => { ... }`
//! function: the local declarations it references, its schema-library
//! imports and its bundled external packages are all inlined ahead of the
//! original body.
//!
//! # Pipeline
//!
//! - [`syntax`]: lexer, top-level module scan and type stripping
//! - [`extractor`]: finds inline and class-based tool declarations
//! - [`schema`]: translates object schemas into [`SchemaShape`](skillc_core::SchemaShape)
//! - [`closure`]: resolves the dependency closure of an execute body
//! - [`bundler`]: binds external packages via a bundler or fallback
//! - [`manifest`]: writes `deploy.json` and per-tool files
//! - [`compiler`]: runs the above for a project
//!
//! # Examples
//!
//! ```no_run
//! use skillc_compiler::{CompileOptions, SkillCompiler};
//! use skillc_core::ProjectConfig;
//! use std::path::Path;
//!
//! # async fn example() -> skillc_core::Result<()> {
//! let root = Path::new(".");
//! let config = ProjectConfig::load(root)?;
//! let options = CompileOptions::from_config(&config, root).with_bundle(false);
//! let report = SkillCompiler::new(options)?.compile().await?;
//! assert_eq!(report.skipped_count(), 0);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod bundler;
pub mod closure;
pub mod compiler;
pub mod extractor;
pub mod manifest;
pub mod scaffold;
pub mod schema;
pub mod syntax;
pub mod template_engine;

pub use compiler::{CompileOptions, CompileReport, CompiledSkill, SkillCompiler, SkippedEntry};
pub use manifest::{ManifestWriter, load_manifest};
pub use scaffold::{ScaffoldOptions, scaffold_project};
pub use template_engine::TemplateEngine;
