//! Schema Translator.
//!
//! Converts object-of-primitives schema builder expressions such as
//!
//! ```text
//! const WeatherInput = z.object({
//!   city: z.string(),
//!   days: z.number().optional(),
//! });
//! ```
//!
//! into a [`SchemaShape`]. Only direct fields whose value is a zero-argument
//! builder call (optionally followed by modifier calls) are represented.
//! Every other field is reported in [`SchemaTranslation::unsupported`] so the
//! caller can warn about it instead of silently dropping it.

use crate::syntax::{Lexed, TokenKind, entries, string_value};
use regex::Regex;
use skillc_core::{Error, PrimitiveType, Result, SchemaShape};
use std::sync::LazyLock;

/// `<builder>.<kind>()` at the start of a field value.
static PRIMITIVE_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][\w$]*\s*\.\s*([A-Za-z_$][\w$]*)\s*\(\s*\)").expect("valid regex")
});

/// Zero-argument builders that still describe a composite value.
const COMPOSITE_KINDS: &[&str] = &[
    "object", "array", "tuple", "union", "enum", "record", "map", "set", "lazy",
];

/// Modifier calls that change the shape of the value.
const SHAPE_CHANGING_MODIFIERS: &[&str] = &["array", "or", "and", "pipe"];

/// Result of translating one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaTranslation {
    /// Represented fields
    pub shape: SchemaShape,
    /// Fields that could not be represented, in declaration order
    pub unsupported: Vec<String>,
}

impl SchemaTranslation {
    /// Translation with no fields.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            shape: SchemaShape::empty(),
            unsupported: Vec::new(),
        }
    }

    /// Returns `true` if every field was represented.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unsupported.is_empty()
    }

    /// Returns the shape, or an error naming the unsupported fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedSchema`] if any field is unsupported.
    pub fn into_strict(self, schema: &str) -> Result<SchemaShape> {
        if self.unsupported.is_empty() {
            Ok(self.shape)
        } else {
            Err(Error::UnsupportedSchema {
                schema: schema.to_string(),
                fields: self.unsupported,
            })
        }
    }
}

/// Translates an inline builder expression, e.g. `z.object({ a: z.string() })`.
///
/// Returns `None` if the expression is not an object builder call.
///
/// # Examples
///
/// ```
/// use skillc_compiler::schema::translate_expression;
///
/// let t = translate_expression("z.object({ message: z.string() })").unwrap();
/// assert_eq!(t.shape.field_names(), vec!["message"]);
/// assert!(t.is_complete());
/// ```
#[must_use]
pub fn translate_expression(expr: &str) -> Option<SchemaTranslation> {
    let lx = Lexed::new(expr);
    translate_at(&lx, 0)
}

/// Translates a `const X = <builder>.object({...})` declaration.
///
/// Returns `None` if the initializer is not an object builder call.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use skillc_compiler::schema::translate_declaration;
///
/// let t = translate_declaration("const Out = z.object({ ok: z.boolean() });").unwrap();
/// assert_eq!(
///     serde_json::to_value(&t.shape).unwrap(),
///     json!({"type": "object", "properties": {"ok": {"type": "boolean"}}, "required": ["ok"]})
/// );
/// ```
#[must_use]
pub fn translate_declaration(declaration: &str) -> Option<SchemaTranslation> {
    let lx = Lexed::new(declaration);
    let eq = lx.position_of_punct(1, "=")?;
    translate_at(&lx, eq + 1)
}

fn translate_at(lx: &Lexed<'_>, start: usize) -> Option<SchemaTranslation> {
    lx.ident(start)?;
    let is_object_call = lx.is_punct(start + 1, ".")
        && lx.is_ident(start + 2, "object")
        && lx.is_punct(start + 3, "(")
        && lx.is_punct(start + 4, "{");
    if !is_object_call {
        return None;
    }
    let body = start + 4;
    lx.matching(body)?;

    let mut translation = SchemaTranslation::empty();
    for (first, end) in entries(lx, body) {
        let key = match lx.kind(first) {
            Some(TokenKind::Ident) => Some(lx.text(first).to_string()),
            Some(TokenKind::Str) => string_value(lx.text(first)),
            _ => None,
        };
        let Some(key) = key else {
            translation
                .unsupported
                .push(lx.slice(first, end - 1).to_string());
            continue;
        };
        if !lx.is_punct(first + 1, ":") {
            translation.unsupported.push(key);
            continue;
        }
        match primitive_kind(lx, first + 2, end) {
            Some(kind) => translation
                .shape
                .push_field(key, PrimitiveType::from_builder(kind)),
            None => {
                tracing::debug!(field = %key, "Schema field is not a primitive builder");
                translation.unsupported.push(key);
            }
        }
    }
    Some(translation)
}

/// Base kind of a `<builder>.<kind>()[.modifier(...)]*` value in tokens
/// `first..end`.
fn primitive_kind<'a>(lx: &Lexed<'a>, first: usize, end: usize) -> Option<&'a str> {
    if first >= end || !PRIMITIVE_FIELD.is_match(lx.slice(first, end - 1)) {
        return None;
    }
    let kind = lx.text(first + 2);
    if COMPOSITE_KINDS.contains(&kind) {
        return None;
    }

    let mut j = first + 5;
    while j < end {
        if !lx.is_punct(j, ".") {
            return None;
        }
        let modifier = lx.ident(j + 1)?;
        if SHAPE_CHANGING_MODIFIERS.contains(&modifier) || !lx.is_punct(j + 2, "(") {
            return None;
        }
        j = lx.matching(j + 2)? + 1;
    }
    Some(kind)
}
