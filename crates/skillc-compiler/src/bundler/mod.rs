//! External Package Bundler.
//!
//! Turns each external import a tool depends on into JavaScript that binds
//! the same local names the source file used. The package is bundled into
//! a single CommonJS blob by an external bundler and wrapped in an
//! immediately-invoked function, so nothing outside the execute string is
//! needed at run time. When bundling fails, a registered fallback
//! implementation is used instead; with neither, the binding is left out
//! and a warning is logged.
//!
//! Every tool binds its packages independently: two tools importing the
//! same package each carry their own copy.

mod esbuild;
mod fallback;

pub use esbuild::{DisabledBundler, EsbuildBundler};
pub use fallback::{AxiosFallback, FallbackProvider, FallbackRegistry, FileFallback};

use crate::closure::PackageImport;
use crate::syntax::ImportBinding;
use crate::template_engine::TemplateEngine;
use async_trait::async_trait;
use serde_json::json;
use skillc_core::Result;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Input for one bundler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRequest {
    /// Import path of the package, e.g. `axios` or `lodash/get`
    pub package: String,
    /// Source of the synthetic CommonJS entry module
    pub entry_source: String,
    /// Project root; packages resolve from its `node_modules`
    pub project_root: PathBuf,
}

/// Produces a self-contained CommonJS bundle for a package.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Bundler: Send + Sync {
    /// Bundles `request.entry_source` with all its dependencies inlined.
    ///
    /// # Errors
    ///
    /// Returns [`skillc_core::Error::BundleFailed`] if the bundler cannot
    /// run or reports an error.
    async fn bundle(&self, request: &BundleRequest) -> Result<String>;

    /// Short name for log messages.
    fn name(&self) -> &str;
}

/// Where the code for a bound package came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageOrigin {
    /// Produced by the external bundler
    Bundled,
    /// Produced by a fallback provider
    Fallback,
}

/// JavaScript that binds one package's imported names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundPackage {
    /// Import path
    pub package: String,
    /// Source of the code
    pub origin: PackageOrigin,
    /// Statement binding every imported local name
    pub code: String,
}

/// Binds package imports through a bundler, falling back to registered
/// providers.
pub struct PackageBinder<'a> {
    bundler: &'a dyn Bundler,
    fallbacks: &'a FallbackRegistry,
    templates: &'a TemplateEngine<'static>,
    project_root: &'a Path,
}

impl fmt::Debug for PackageBinder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackageBinder")
            .field("bundler", &self.bundler.name())
            .field("fallbacks", &self.fallbacks)
            .field("project_root", &self.project_root)
            .finish_non_exhaustive()
    }
}

impl<'a> PackageBinder<'a> {
    /// Creates a binder.
    #[must_use]
    pub const fn new(
        bundler: &'a dyn Bundler,
        fallbacks: &'a FallbackRegistry,
        templates: &'a TemplateEngine<'static>,
        project_root: &'a Path,
    ) -> Self {
        Self {
            bundler,
            fallbacks,
            templates,
            project_root,
        }
    }

    /// Binds one external import.
    ///
    /// Returns `Ok(None)` when the package can be neither bundled nor
    /// provided by a fallback; the tool then references an unbound name and
    /// fails only when executed.
    ///
    /// # Errors
    ///
    /// Returns an error only if a built-in template fails to render or a
    /// file-backed fallback cannot be read.
    pub async fn bind(&self, import: &PackageImport) -> Result<Option<BoundPackage>> {
        let entry_source = self.templates.render(
            "bundle/entry",
            &json!({ "package_literal": js_string(&import.package) }),
        )?;
        let request = BundleRequest {
            package: import.package.clone(),
            entry_source,
            project_root: self.project_root.to_path_buf(),
        };

        let (origin, module_source) = match self.bundler.bundle(&request).await {
            Ok(code) => {
                debug!(
                    package = %import.package,
                    bytes = code.len(),
                    "Bundled package with {}",
                    self.bundler.name()
                );
                (PackageOrigin::Bundled, code)
            }
            Err(e) => {
                let Some(provider) = self.fallbacks.lookup(&import.package) else {
                    warn!(
                        "Could not bundle '{}' and no fallback is registered; \
                         the tool will fail when it uses {}: {e}",
                        import.package,
                        local_names(import).join(", ")
                    );
                    return Ok(None);
                };
                info!(
                    "Could not bundle '{}', using fallback implementation: {e}",
                    import.package
                );
                (PackageOrigin::Fallback, provider.module_source(self.templates)?)
            }
        };

        let code = self.wrap(import, &module_source)?;
        Ok(Some(BoundPackage {
            package: import.package.clone(),
            origin,
            code,
        }))
    }

    fn wrap(&self, import: &PackageImport, module_source: &str) -> Result<String> {
        let members: Vec<String> = import
            .bindings
            .iter()
            .map(|binding| format!("{}: {}", binding.local(), binding_expression(binding)))
            .collect();
        let code = self.templates.render(
            "bundle/wrap",
            &json!({
                "locals": local_names(import).join(", "),
                "members": members.join(", "),
                "code": module_source.trim_end(),
            }),
        )?;
        Ok(code.trim_end().to_string())
    }
}

/// `require(...)` passthrough for a schema-library import.
///
/// # Examples
///
/// ```
/// use skillc_compiler::bundler::require_statement;
/// use skillc_compiler::closure::PackageImport;
/// use skillc_compiler::syntax::ImportBinding;
///
/// let import = PackageImport {
///     package: "zod".into(),
///     bindings: vec![ImportBinding::Named { imported: "z".into(), local: "z".into() }],
/// };
/// assert_eq!(require_statement(&import), "const { z } = require('zod');");
/// ```
#[must_use]
pub fn require_statement(import: &PackageImport) -> String {
    let module = format!("require({})", js_quote(&import.package));
    let mut named = Vec::new();
    let mut lines = Vec::new();
    for binding in &import.bindings {
        match binding {
            ImportBinding::Named { imported, local } if imported == local => named.push(local.clone()),
            ImportBinding::Named { imported, local } => named.push(format!("{imported}: {local}")),
            ImportBinding::Namespace(local) => lines.push(format!("const {local} = {module};")),
            ImportBinding::Default(local) => lines.push(format!(
                "const {local} = ((m) => (m && m.__esModule && 'default' in m ? m.default : m))({module});"
            )),
        }
    }
    if !named.is_empty() {
        lines.insert(0, format!("const {{ {} }} = {module};", named.join(", ")));
    }
    lines.join("\n")
}

/// Root package name of an import path: `lodash/get` is `lodash`,
/// `@scope/pkg/sub` is `@scope/pkg`.
#[must_use]
pub fn package_root(specifier: &str) -> &str {
    let mut parts = specifier.splitn(3, '/');
    let first = parts.next().unwrap_or_default();
    if first.starts_with('@')
        && let Some(second) = parts.next()
    {
        return &specifier[..first.len() + 1 + second.len()];
    }
    first
}

fn binding_expression(binding: &ImportBinding) -> String {
    match binding {
        ImportBinding::Default(_) => "interop".to_string(),
        ImportBinding::Named { imported, .. } if imported == "default" => "interop".to_string(),
        ImportBinding::Named { imported, .. } => format!("pick({})", js_quote(imported)),
        ImportBinding::Namespace(_) => "pkg".to_string(),
    }
}

fn local_names(import: &PackageImport) -> Vec<&str> {
    import.bindings.iter().map(ImportBinding::local).collect()
}

/// Single-quoted JavaScript string literal.
fn js_quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Double-quoted JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
