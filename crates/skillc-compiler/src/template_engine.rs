//! Template engine for generated JavaScript and project scaffolding.
//!
//! Wraps Handlebars with the built-in templates registered up front:
//! the synthetic bundler entry, the wrapper that exposes a bundled module
//! under the importing file's binding names, fallback package
//! implementations, and the files written by `skillc init`.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use skillc_compiler::template_engine::TemplateEngine;
//!
//! let engine = TemplateEngine::new().unwrap();
//! let entry = engine
//!     .render("bundle/entry", &json!({"package_literal": "\"axios\""}))
//!     .unwrap();
//! assert!(entry.contains("require(\"axios\")"));
//! ```

use handlebars::Handlebars;
use serde::Serialize;
use skillc_core::{Error, Result};

/// Built-in templates: `(name, source)`.
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("bundle/entry", include_str!("../templates/bundle/entry.js.hbs")),
    ("bundle/wrap", include_str!("../templates/bundle/wrap.js.hbs")),
    ("fallback/axios", include_str!("../templates/fallback/axios.js.hbs")),
    ("scaffold/skill.toml", include_str!("../templates/scaffold/skill.toml.hbs")),
    ("scaffold/package.json", include_str!("../templates/scaffold/package.json.hbs")),
    ("scaffold/tsconfig.json", include_str!("../templates/scaffold/tsconfig.json.hbs")),
    ("scaffold/index.ts", include_str!("../templates/scaffold/index.ts.hbs")),
    ("scaffold/tool.ts", include_str!("../templates/scaffold/tool.ts.hbs")),
];

/// Template engine for generated code.
///
/// Output is JavaScript or TOML, never HTML, so escaping is disabled.
#[derive(Debug)]
pub struct TemplateEngine<'a> {
    handlebars: Handlebars<'a>,
}

impl<'a> TemplateEngine<'a> {
    /// Creates a new template engine with the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateError`] if a built-in template fails to
    /// register.
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();

        // Strict mode: fail on missing variables
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        for (name, source) in BUILTIN_TEMPLATES {
            handlebars
                .register_template_string(name, source)
                .map_err(|e| Error::TemplateError {
                    message: format!("Failed to register {name} template: {e}"),
                })?;
        }

        Ok(Self { handlebars })
    }

    /// Renders a template with the given context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateError`] if the template is unknown or the
    /// context is missing a variable it uses.
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        self.handlebars
            .render(template_name, context)
            .map_err(|e| Error::TemplateError {
                message: format!("Rendering {template_name} failed: {e}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_templates_registered() {
        let engine = TemplateEngine::new().unwrap();
        for (name, _) in BUILTIN_TEMPLATES {
            assert!(engine.handlebars.has_template(name), "{name} missing");
        }
    }

    #[test]
    fn test_output_is_not_html_escaped() {
        let engine = TemplateEngine::new().unwrap();
        let out = engine
            .render("bundle/entry", &json!({"package_literal": "\"a & <b>\""}))
            .unwrap();
        assert!(out.contains("require(\"a & <b>\")"));
    }

    #[test]
    fn test_strict_mode_rejects_missing_variables() {
        let engine = TemplateEngine::new().unwrap();
        let err = engine.render("bundle/entry", &json!({})).unwrap_err();
        assert!(matches!(err, Error::TemplateError { .. }));
    }

    #[test]
    fn test_unknown_template() {
        let engine = TemplateEngine::new().unwrap();
        assert!(engine.render("nope", &json!({})).is_err());
    }
}
