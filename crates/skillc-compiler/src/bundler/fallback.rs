//! Fallback implementations for packages the bundler cannot provide.
//!
//! A provider supplies CommonJS source that assigns the package's API to
//! `module.exports`; it is wrapped exactly like a bundle. Providers are
//! keyed by root package name, so `axios` also serves `axios/index`.

use super::package_root;
use crate::template_engine::TemplateEngine;
use serde_json::json;
use skillc_core::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Supplies a stand-in module for one package.
pub trait FallbackProvider: Send + Sync {
    /// Root package name this provider stands in for.
    fn package(&self) -> &str;

    /// CommonJS source assigning the package API to `module.exports`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be produced.
    fn module_source(&self, templates: &TemplateEngine<'_>) -> Result<String>;
}

/// Built-in stand-in for `axios` built on the global `fetch`.
///
/// Covers `axios(config)`, `request`, the method helpers, `create`,
/// `baseURL`, `params`, JSON bodies, timeouts and the `{ data, status,
/// statusText, headers, config }` response shape. Non-2xx responses and
/// network failures reject with an error carrying `response` and
/// `isAxiosError`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AxiosFallback;

impl FallbackProvider for AxiosFallback {
    fn package(&self) -> &str {
        "axios"
    }

    fn module_source(&self, templates: &TemplateEngine<'_>) -> Result<String> {
        templates.render("fallback/axios", &json!({ "package": self.package() }))
    }
}

/// Stand-in read from a user-supplied CommonJS file.
#[derive(Debug, Clone)]
pub struct FileFallback {
    package: String,
    path: PathBuf,
}

impl FileFallback {
    /// Creates a provider for `package` backed by the file at `path`.
    #[must_use]
    pub fn new(package: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            package: package.into(),
            path: path.into(),
        }
    }
}

impl FallbackProvider for FileFallback {
    fn package(&self) -> &str {
        &self.package
    }

    fn module_source(&self, _templates: &TemplateEngine<'_>) -> Result<String> {
        std::fs::read_to_string(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::SourceNotFound {
                    path: self.path.clone(),
                }
            } else {
                Error::io(&self.path, e)
            }
        })
    }
}

/// Fallback providers keyed by root package name.
#[derive(Default)]
pub struct FallbackRegistry {
    providers: BTreeMap<String, Box<dyn FallbackProvider>>,
}

impl fmt::Debug for FallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.packages()).finish()
    }
}

impl FallbackRegistry {
    /// Registry with no providers.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with the built-in providers.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(AxiosFallback);
        registry
    }

    /// Registers a provider, replacing any previous one for its package.
    pub fn register(&mut self, provider: impl FallbackProvider + 'static) {
        self.providers
            .insert(provider.package().to_string(), Box::new(provider));
    }

    /// Provider for an import path.
    #[must_use]
    pub fn lookup(&self, specifier: &str) -> Option<&dyn FallbackProvider> {
        self.providers
            .get(specifier)
            .or_else(|| self.providers.get(package_root(specifier)))
            .map(|provider| &**provider)
    }

    /// Registered package names.
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }
}
