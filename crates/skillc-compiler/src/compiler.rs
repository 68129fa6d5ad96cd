//! Compile pipeline.
//!
//! Reads the entry module, extracts tool declarations, resolves each
//! execute body's dependency closure, binds its packages and writes the
//! deploy manifest:
//!
//! ```text
//! entry.ts ─► ToolExtractor ─► ClosureResolver ─► PackageBinder ─► ManifestWriter
//! ```
//!
//! Declarations that cannot be extracted are skipped with a warning. Only a
//! missing entry file or a failure to write output aborts the compile, and
//! in that case nothing is written.

use crate::bundler::{
    Bundler, DisabledBundler, EsbuildBundler, FallbackRegistry, FileFallback, PackageBinder,
    require_statement,
};
use crate::closure::{ClosureResolver, ImportClassifier, ModuleGraph};
use crate::extractor::{ExtractedTool, SkippedTool, ToolExtractor};
use crate::manifest::ManifestWriter;
use crate::template_engine::TemplateEngine;
use serde::Serialize;
use skillc_core::{CompiledTool, DeployManifest, ProjectConfig, Result, ToolName};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Settings for one compile, resolved against the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Project root; bundles resolve packages from its `node_modules`
    pub project_root: PathBuf,
    /// Skill name written as `skillsName`
    pub skill_name: String,
    /// Skill version
    pub version: String,
    /// Entry module
    pub entry: PathBuf,
    /// Output directory
    pub output_dir: PathBuf,
    /// Whether to run the external bundler
    pub bundle: bool,
    /// Bundler command or path
    pub bundler: String,
    /// Framework packages, dropped from execute strings
    pub framework_packages: Vec<String>,
    /// Schema packages, passed through as `require(...)`
    pub schema_packages: Vec<String>,
    /// Function names that register a tool
    pub registration_calls: Vec<String>,
    /// Local import hops followed from a tool's module
    pub max_local_depth: usize,
    /// Skip tools with unrepresentable schema fields
    pub strict_schemas: bool,
    /// Extra fallback providers: package to CommonJS file
    pub fallbacks: BTreeMap<String, PathBuf>,
}

impl CompileOptions {
    /// Builds options from a project descriptor.
    #[must_use]
    pub fn from_config(config: &ProjectConfig, project_root: &Path) -> Self {
        let compile = &config.compile;
        Self {
            project_root: project_root.to_path_buf(),
            skill_name: config.skill.name.as_str().to_string(),
            version: config.skill.version.clone(),
            entry: config.entry_path(project_root),
            output_dir: config.output_dir(project_root),
            bundle: compile.bundle,
            bundler: compile.bundler.clone(),
            framework_packages: compile.framework_packages.clone(),
            schema_packages: compile.schema_packages.clone(),
            registration_calls: compile.registration_calls.clone(),
            max_local_depth: compile.max_local_depth,
            strict_schemas: compile.strict_schemas,
            fallbacks: compile
                .fallbacks
                .iter()
                .map(|(package, path)| (package.clone(), project_root.join(path)))
                .collect(),
        }
    }

    /// Overrides the entry module; relative paths resolve against the
    /// project root.
    #[must_use]
    pub fn with_entry(mut self, entry: impl AsRef<Path>) -> Self {
        self.entry = self.project_root.join(entry);
        self
    }

    /// Overrides the output directory; relative paths resolve against the
    /// project root.
    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl AsRef<Path>) -> Self {
        self.output_dir = self.project_root.join(output_dir);
        self
    }

    /// Turns the external bundler on or off.
    #[must_use]
    pub const fn with_bundle(mut self, bundle: bool) -> Self {
        self.bundle = bundle;
        self
    }

    /// Turns strict schema handling on or off.
    #[must_use]
    pub const fn with_strict_schemas(mut self, strict: bool) -> Self {
        self.strict_schemas = strict;
        self
    }
}

/// A skipped declaration, as reported to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    /// `file:line` of the declaration
    pub site: String,
    /// Why it was skipped
    pub reason: String,
}

impl From<&SkippedTool> for SkippedEntry {
    fn from(skipped: &SkippedTool) -> Self {
        Self {
            site: skipped.site.clone(),
            reason: skipped.reason.to_string(),
        }
    }
}

/// Manifest plus the declarations left out of it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSkill {
    /// The compiled manifest
    pub manifest: DeployManifest,
    /// Skipped declarations
    pub skipped: Vec<SkippedTool>,
}

/// Summary of a compile that wrote its output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileReport {
    /// Skill name
    pub skill_name: String,
    /// Skill version
    pub version: String,
    /// Compiled tool names in manifest order
    pub tools: Vec<String>,
    /// Skipped declarations
    pub skipped: Vec<SkippedEntry>,
    /// Path of the written manifest
    pub manifest_path: PathBuf,
    /// Per-tool files
    pub tool_files: Vec<PathBuf>,
}

impl CompileReport {
    /// Number of skipped declarations.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Compiles a skill project.
///
/// # Examples
///
/// ```no_run
/// use skillc_compiler::{CompileOptions, SkillCompiler};
/// use skillc_core::ProjectConfig;
/// use std::path::Path;
///
/// # async fn example() -> skillc_core::Result<()> {
/// let root = Path::new("weather-skill");
/// let config = ProjectConfig::load(root)?;
/// let compiler = SkillCompiler::new(CompileOptions::from_config(&config, root))?;
/// let report = compiler.compile().await?;
/// println!("{} tools written to {}", report.tools.len(), report.manifest_path.display());
/// # Ok(())
/// # }
/// ```
pub struct SkillCompiler {
    options: CompileOptions,
    templates: TemplateEngine<'static>,
    bundler: Box<dyn Bundler>,
    fallbacks: FallbackRegistry,
    classifier: ImportClassifier,
}

impl fmt::Debug for SkillCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillCompiler")
            .field("options", &self.options)
            .field("bundler", &self.bundler.name())
            .field("fallbacks", &self.fallbacks)
            .finish_non_exhaustive()
    }
}

impl SkillCompiler {
    /// Creates a compiler with the bundler and fallbacks the options name.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in templates fail to register.
    pub fn new(options: CompileOptions) -> Result<Self> {
        let bundler: Box<dyn Bundler> = if options.bundle {
            Box::new(EsbuildBundler::new(options.bundler.clone()))
        } else {
            Box::new(DisabledBundler)
        };

        let mut fallbacks = FallbackRegistry::with_builtins();
        for (package, path) in &options.fallbacks {
            fallbacks.register(FileFallback::new(package.clone(), path.clone()));
        }
        debug!(
            packages = ?fallbacks.packages().collect::<Vec<_>>(),
            "Fallback providers registered"
        );

        let classifier = ImportClassifier::new(
            options.framework_packages.clone(),
            options.schema_packages.clone(),
        );

        Ok(Self {
            options,
            templates: TemplateEngine::new()?,
            bundler,
            fallbacks,
            classifier,
        })
    }

    /// Replaces the bundler.
    #[must_use]
    pub fn with_bundler(mut self, bundler: Box<dyn Bundler>) -> Self {
        self.bundler = bundler;
        self
    }

    /// Replaces the fallback registry.
    #[must_use]
    pub fn with_fallbacks(mut self, fallbacks: FallbackRegistry) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    /// Returns the options.
    #[must_use]
    pub const fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Builds the manifest without writing anything.
    ///
    /// # Errors
    ///
    /// Returns [`skillc_core::Error::SourceNotFound`] if the entry module
    /// does not exist, or an error if a fallback provider fails.
    pub async fn build(&self) -> Result<CompiledSkill> {
        info!(
            skill = %self.options.skill_name,
            entry = %self.options.entry.display(),
            "Compiling skill"
        );
        let mut graph = ModuleGraph::new();
        let entry = graph.load(&self.options.entry)?;

        let extraction = ToolExtractor::new(
            &mut graph,
            &self.classifier,
            &self.options.registration_calls,
        )
        .strict_schemas(self.options.strict_schemas)
        .extract(entry);

        let binder = PackageBinder::new(
            self.bundler.as_ref(),
            &self.fallbacks,
            &self.templates,
            &self.options.project_root,
        );
        let mut tools = Vec::with_capacity(extraction.tools.len());
        for tool in &extraction.tools {
            tools.push(self.assemble(&mut graph, &binder, tool).await?);
        }

        info!(
            tools = tools.len(),
            skipped = extraction.skipped.len(),
            "Extracted tools"
        );
        Ok(CompiledSkill {
            manifest: DeployManifest::new(&self.options.version, &self.options.skill_name, tools),
            skipped: extraction.skipped,
        })
    }

    /// Builds the manifest and writes it to the output directory.
    ///
    /// # Errors
    ///
    /// Returns an error if building fails or the output cannot be written.
    pub async fn compile(&self) -> Result<CompileReport> {
        let compiled = self.build().await?;
        let written = ManifestWriter::new(&self.options.output_dir).write(&compiled.manifest)?;
        info!(
            "Wrote {} tools to {}",
            compiled.manifest.tool_count(),
            written.manifest_path.display()
        );

        Ok(CompileReport {
            skill_name: compiled.manifest.skills_name.clone(),
            version: compiled.manifest.version.clone(),
            tools: compiled
                .manifest
                .tools
                .iter()
                .map(|t| t.name.as_str().to_string())
                .collect(),
            skipped: compiled.skipped.iter().map(SkippedEntry::from).collect(),
            manifest_path: written.manifest_path,
            tool_files: written.tool_files,
        })
    }

    /// Turns an extracted tool into a self-contained execute function.
    async fn assemble(
        &self,
        graph: &mut ModuleGraph,
        binder: &PackageBinder<'_>,
        tool: &ExtractedTool,
    ) -> Result<CompiledTool> {
        let execute = &tool.execute;
        let code = format!("{}\n{}", execute.params, execute.body);
        let exclude: Vec<&str> = execute.param_names.iter().map(String::as_str).collect();
        let closure = ClosureResolver::new(graph, &self.classifier, self.options.max_local_depth)
            .resolve(tool.module, &code, &exclude);

        for name in &closure.unresolved {
            warn!(
                "Tool '{}': '{name}' comes from a local module beyond the import depth limit and is not inlined",
                tool.name
            );
        }

        let mut preamble: Vec<String> = closure.schema_imports.iter().map(require_statement).collect();
        for import in &closure.external_imports {
            if let Some(bound) = binder.bind(import).await? {
                preamble.push(bound.code);
            }
        }
        preamble.extend(closure.fragments.iter().map(|f| f.code.clone()));
        debug!(
            tool = %tool.name,
            fragments = closure.fragments.len(),
            packages = closure.external_imports.len(),
            "Resolved execute closure"
        );

        Ok(CompiledTool {
            name: ToolName::new(&tool.name),
            description: tool.description.clone(),
            input_schema: tool.input_schema.clone(),
            output_schema: tool.output_schema.clone(),
            execute: execute_function(&execute.params, &preamble, &execute.body),
        })
    }
}

/// `async <params> => { ... }` with the preamble ahead of the body.
///
/// The body goes in its own block when there is a preamble, so a body
/// declaration may shadow an inlined name.
fn execute_function(params: &str, preamble: &[String], body: &str) -> String {
    if preamble.is_empty() {
        return format!("async {params} => {{\n{body}\n}}");
    }
    format!("async {params} => {{\n{}\n{{\n{body}\n}}\n}}", preamble.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::MockBundler;
    use skillc_core::{Error, SkillName};
    use std::fs;

    const ENTRY: &str = r"import { z } from 'zod';
import axios from 'axios';

const Input = z.object({ city: z.string() });
const Output = z.object({ weather: z.string() });

registerTool({
  name: 'weather',
  description: 'Gets the weather',
  inputSchema: Input,
  outputSchema: Output,
  execute: async (input: { city: string }) => {
    const city = z.string().parse(input.city);
    const res = await axios.get('https://example.com/' + city);
    return { weather: res.data };
  },
});
";

    fn project(entry: &str) -> (tempfile::TempDir, CompileOptions) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/index.ts"), entry).unwrap();
        let config = ProjectConfig::new(SkillName::new("weather-skill").unwrap(), "0.1.0");
        let options = CompileOptions::from_config(&config, dir.path());
        (dir, options)
    }

    #[test]
    fn test_execute_function_layout() {
        assert_eq!(
            execute_function("(input)", &[], "return input;"),
            "async (input) => {\nreturn input;\n}"
        );
        assert_eq!(
            execute_function("(input)", &["const a = 1;".to_string()], "return a;"),
            "async (input) => {\nconst a = 1;\n{\nreturn a;\n}\n}"
        );
    }

    #[test]
    fn test_options_overrides_resolve_against_root() {
        let config = ProjectConfig::new(SkillName::new("s").unwrap(), "1.0.0");
        let options = CompileOptions::from_config(&config, Path::new("/p"))
            .with_entry("lib/main.ts")
            .with_output_dir("/abs/out")
            .with_bundle(false)
            .with_strict_schemas(true);
        assert_eq!(options.entry, PathBuf::from("/p/lib/main.ts"));
        assert_eq!(options.output_dir, PathBuf::from("/abs/out"));
        assert!(!options.bundle);
        assert!(options.strict_schemas);
    }

    #[tokio::test]
    async fn test_bundled_package_is_inlined() {
        let (_dir, options) = project(ENTRY);
        let mut bundler = MockBundler::new();
        bundler
            .expect_bundle()
            .times(1)
            .returning(|req| Ok(format!("module.exports = {{ from: '{}' }};\n", req.package)));
        bundler.expect_name().return_const("mock".to_string());

        let compiler = SkillCompiler::new(options).unwrap().with_bundler(Box::new(bundler));
        let compiled = compiler.build().await.unwrap();

        let execute = &compiled.manifest.tool("weather").unwrap().execute;
        assert!(execute.starts_with("async (input) => {\nconst { z } = require('zod');\nconst { axios } = (function () {"));
        assert!(execute.contains("module.exports = { from: 'axios' };"));
        assert!(execute.contains("axios: interop"));
        assert!(execute.ends_with("return { weather: res.data };\n}\n}"));
        assert!(!execute.contains(": string"));
    }

    #[tokio::test]
    async fn test_bundle_failure_uses_fallback() {
        let (_dir, options) = project(ENTRY);
        let mut bundler = MockBundler::new();
        bundler.expect_bundle().returning(|req| {
            Err(Error::BundleFailed {
                package: req.package.clone(),
                message: "not installed".to_string(),
            })
        });
        bundler.expect_name().return_const("mock".to_string());

        let compiler = SkillCompiler::new(options).unwrap().with_bundler(Box::new(bundler));
        let compiled = compiler.build().await.unwrap();
        let execute = &compiled.manifest.tools[0].execute;
        assert!(execute.contains("// axios stand-in built on the global fetch API."));
    }

    #[tokio::test]
    async fn test_unbindable_package_is_left_out() {
        let (_dir, options) = project(ENTRY);
        let compiler = SkillCompiler::new(options.with_bundle(false))
            .unwrap()
            .with_fallbacks(FallbackRegistry::empty());
        let compiled = compiler.build().await.unwrap();
        let execute = &compiled.manifest.tools[0].execute;
        assert!(!execute.contains("(function () {"));
        assert!(execute.contains("axios.get("));
    }

    #[tokio::test]
    async fn test_missing_entry_is_fatal_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProjectConfig::new(SkillName::new("s").unwrap(), "1.0.0");
        let options = CompileOptions::from_config(&config, dir.path());
        let output_dir = options.output_dir.clone();

        let err = SkillCompiler::new(options).unwrap().compile().await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!output_dir.exists());
    }

    #[tokio::test]
    async fn test_compile_writes_report() {
        let (dir, options) = project(ENTRY);
        let compiler = SkillCompiler::new(options.with_bundle(false)).unwrap();
        let report = compiler.compile().await.unwrap();

        assert_eq!(report.skill_name, "weather-skill");
        assert_eq!(report.tools, vec!["weather"]);
        assert_eq!(report.skipped_count(), 0);
        assert_eq!(report.manifest_path, dir.path().join(".skillc/deploy.json"));
        assert!(dir.path().join(".skillc/weather.js").is_file());
    }
}
