//! Tool Extractor.
//!
//! Finds registration calls in the entry module and turns each into an
//! [`ExtractedTool`]: name, description, translated schemas, and an execute
//! function whose body still has to be closed over by the
//! [`ClosureResolver`](crate::closure::ClosureResolver).
//!
//! Two declaration shapes are recognised:
//!
//! - inline: `registerTool({ name, description, inputSchema, outputSchema, execute })`,
//!   where the argument may also be an identifier bound to such an object;
//! - class-based: `registerTool(new WeatherTool())`, where the class is
//!   declared in the entry module or imported from a local file and sets
//!   its fields in the constructor or as class fields.
//!
//! A declaration that cannot be extracted is skipped with a warning; the
//! remaining declarations are still extracted.

use crate::closure::{ImportClassifier, ImportKind, ModuleGraph, ModuleId};
use crate::schema::{SchemaTranslation, translate_declaration, translate_expression};
use crate::syntax::{
    DeclKind, ImportBinding, Lexed, TokenKind, entries, statement_end, string_value, strip_types,
};
use skillc_core::SchemaShape;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Object fields a tool declaration is made of.
const TOOL_FIELDS: [&str; 5] = ["name", "description", "inputSchema", "outputSchema", "execute"];

/// Local bound to the tool instance in class-based execute bodies.
const INSTANCE_NAME: &str = "toolInstance";

/// How a tool was declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolShape {
    /// Object literal passed to the registration call
    Inline,
    /// Instance of a class passed to the registration call
    Class {
        /// Class name as declared in its own module
        class_name: String,
    },
}

/// An execute function split into parameters and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteSource {
    /// Parameter list including parentheses, type annotations removed
    pub params: String,
    /// Names bound by the parameters
    pub param_names: Vec<String>,
    /// Body statements, type annotations removed
    pub body: String,
}

impl ExecuteSource {
    fn call(function: &str) -> Self {
        Self {
            params: "(input)".to_string(),
            param_names: vec!["input".to_string()],
            body: format!("return {function}(input);"),
        }
    }
}

/// A tool declaration with everything but its dependency closure resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTool {
    /// Declared tool name
    pub name: String,
    /// Declared description
    pub description: String,
    /// Translated input schema
    pub input_schema: SchemaShape,
    /// Translated output schema
    pub output_schema: SchemaShape,
    /// Declaration shape
    pub shape: ToolShape,
    /// Module in which the execute body's names are resolved
    pub module: ModuleId,
    /// Execute function
    pub execute: ExecuteSource,
}

/// Why a declaration was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// A required field is absent or not statically known.
    #[error("'{0}' is missing or not a literal")]
    MissingField(&'static str),

    /// The input schema does not name an object schema declaration.
    #[error("input schema '{0}' has no matching object schema declaration")]
    MissingInputSchema(String),

    /// The tool class could not be found.
    #[error("cannot resolve class '{0}' to a local declaration")]
    UnresolvedClass(String),

    /// The registration call argument is not a recognised shape.
    #[error("unsupported registration argument '{0}'")]
    UnsupportedArgument(String),

    /// Strict schemas are on and a schema has unsupported fields.
    #[error("{0}")]
    UnsupportedSchema(String),

    /// An earlier declaration already uses this tool name.
    #[error("tool name '{0}' is already registered")]
    DuplicateName(String),
}

/// A declaration that was not extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTool {
    /// `file:line` of the registration call
    pub site: String,
    /// Why it was skipped
    pub reason: SkipReason,
}

/// Result of one extraction pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Extracted tools: inline declarations first, then class-based ones,
    /// each in source order
    pub tools: Vec<ExtractedTool>,
    /// Skipped declarations in source order
    pub skipped: Vec<SkippedTool>,
}

enum Argument {
    Object(usize),
    Instance(String),
    Unsupported(String),
}

struct CallSite {
    line: usize,
    argument: Argument,
}

#[derive(Clone, Copy)]
enum FieldValue {
    /// Value tokens `first..end`
    Value(usize, usize),
    /// Method shorthand spanning tokens `first..end`
    Method(usize, usize),
}

enum SchemaLookup {
    Found(SchemaTranslation),
    NotFound(String),
}

/// Extracts tool declarations from an entry module.
#[derive(Debug)]
pub struct ToolExtractor<'a> {
    graph: &'a mut ModuleGraph,
    classifier: &'a ImportClassifier,
    registration_calls: &'a [String],
    strict_schemas: bool,
}

impl<'a> ToolExtractor<'a> {
    /// Creates an extractor recognising calls to any of
    /// `registration_calls`.
    pub const fn new(
        graph: &'a mut ModuleGraph,
        classifier: &'a ImportClassifier,
        registration_calls: &'a [String],
    ) -> Self {
        Self {
            graph,
            classifier,
            registration_calls,
            strict_schemas: false,
        }
    }

    /// Skips tools whose schemas contain unsupported fields instead of
    /// dropping those fields.
    #[must_use]
    pub const fn strict_schemas(mut self, strict: bool) -> Self {
        self.strict_schemas = strict;
        self
    }

    /// Extracts every tool registered in `entry`.
    pub fn extract(&mut self, entry: ModuleId) -> Extraction {
        let source = self.graph.module(entry).source.clone();
        let path = self.graph.module(entry).path.display().to_string();
        let lx = Lexed::new(&source);

        let mut inline = Vec::new();
        let mut class = Vec::new();
        let mut skipped = Vec::new();

        for site in self.call_sites(entry, &lx) {
            let site_label = format!("{path}:{}", site.line);
            let (result, is_class) = match site.argument {
                Argument::Object(open) => (self.inline_tool(entry, &lx, open), false),
                Argument::Instance(class_name) => (self.class_tool(entry, &class_name), true),
                Argument::Unsupported(text) => (Err(SkipReason::UnsupportedArgument(text)), false),
            };
            match result {
                Ok(tool) => {
                    debug!(tool = %tool.name, site = %site_label, "Extracted tool declaration");
                    if is_class {
                        class.push(tool);
                    } else {
                        inline.push(tool);
                    }
                }
                Err(reason) => {
                    warn!("Skipping tool declared at {site_label}: {reason}");
                    skipped.push(SkippedTool {
                        site: site_label,
                        reason,
                    });
                }
            }
        }

        let mut tools: Vec<ExtractedTool> = Vec::with_capacity(inline.len() + class.len());
        for tool in inline.into_iter().chain(class) {
            if tools.iter().any(|t| t.name == tool.name) {
                warn!("Skipping second declaration of tool '{}'", tool.name);
                skipped.push(SkippedTool {
                    site: path.clone(),
                    reason: SkipReason::DuplicateName(tool.name),
                });
                continue;
            }
            tools.push(tool);
        }

        Extraction { tools, skipped }
    }

    fn call_sites(&self, entry: ModuleId, lx: &Lexed<'_>) -> Vec<CallSite> {
        let scan = &self.graph.module(entry).scan;
        let mut sites = Vec::new();

        for i in 0..lx.len() {
            let Some(word) = lx.ident(i) else {
                continue;
            };
            if !self.registration_calls.iter().any(|c| c == word) || !lx.is_punct(i + 1, "(") {
                continue;
            }
            if i > 0 && (lx.is_ident(i - 1, "function") || lx.is_ident(i - 1, "async")) {
                continue;
            }
            let Some(close) = lx.matching(i + 1) else {
                continue;
            };
            // Method definitions, not calls.
            if lx.is_punct(close + 1, "{") || lx.is_punct(close + 1, "=>") || lx.is_punct(close + 1, ":") {
                continue;
            }

            let line = lx
                .token(i)
                .map_or(1, |t| lx.src()[..t.start].matches('\n').count() + 1);
            let Some(&(first, end)) = entries(lx, i + 1).first() else {
                sites.push(CallSite {
                    line,
                    argument: Argument::Unsupported(String::new()),
                });
                continue;
            };

            let argument = if lx.is_punct(first, "{") && lx.matching(first) == Some(end - 1) {
                Argument::Object(first)
            } else if lx.is_ident(first, "new") && let Some(class_name) = lx.ident(first + 1) {
                Argument::Instance(class_name.to_string())
            } else if end == first + 1
                && let Some(name) = lx.ident(first)
                && let Some(decl) = scan.declaration(name)
            {
                match decl.kind {
                    DeclKind::Instantiation => decl
                        .class_name
                        .clone()
                        .map_or_else(|| Argument::Unsupported(name.to_string()), Argument::Instance),
                    DeclKind::Binding => lx
                        .position_of_punct(decl.first + 1, "=")
                        .filter(|&eq| lx.is_punct(eq + 1, "{") && eq < decl.last)
                        .map_or_else(
                            || Argument::Unsupported(name.to_string()),
                            |eq| Argument::Object(eq + 1),
                        ),
                    DeclKind::Enum | DeclKind::Class | DeclKind::Function => {
                        Argument::Unsupported(name.to_string())
                    }
                }
            } else {
                Argument::Unsupported(lx.slice(first, end - 1).to_string())
            };
            sites.push(CallSite { line, argument });
        }
        sites
    }

    fn inline_tool(
        &mut self,
        module: ModuleId,
        lx: &Lexed<'_>,
        open: usize,
    ) -> Result<ExtractedTool, SkipReason> {
        let fields = object_fields(lx, open);
        let field = |name: &'static str| fields.get(name).copied().ok_or(SkipReason::MissingField(name));

        let name = self.string_field(module, lx, field("name")?).ok_or(SkipReason::MissingField("name"))?;
        let description = self
            .string_field(module, lx, field("description")?)
            .ok_or(SkipReason::MissingField("description"))?;
        let input = field("inputSchema")?;
        let output = field("outputSchema")?;

        let execute = match field("execute")? {
            FieldValue::Value(first, end) if end == first + 1 && lx.ident(first).is_some() => {
                ExecuteSource::call(lx.text(first))
            }
            FieldValue::Value(first, end) | FieldValue::Method(first, end) => {
                parse_execute(lx.slice(first, end - 1)).ok_or(SkipReason::MissingField("execute"))?
            }
        };

        let input_schema = self.input_schema(module, lx, input, &name)?;
        let output_schema = self.output_schema(module, lx, output, &name)?;

        Ok(ExtractedTool {
            name,
            description,
            input_schema,
            output_schema,
            shape: ToolShape::Inline,
            module,
            execute,
        })
    }

    fn class_tool(&mut self, entry: ModuleId, class_name: &str) -> Result<ExtractedTool, SkipReason> {
        let (module, local_name) = self
            .locate_class(entry, class_name)
            .ok_or_else(|| SkipReason::UnresolvedClass(class_name.to_string()))?;
        let source = self.graph.module(module).source.clone();
        let Some(decl) = self.graph.module(module).scan.declaration(&local_name).cloned() else {
            return Err(SkipReason::UnresolvedClass(class_name.to_string()));
        };
        let lx = Lexed::new(&source);

        let mut body = decl.first;
        while body <= decl.last && !lx.is_punct(body, "{") {
            body = if lx.is_opener(body) {
                lx.matching(body).map_or(decl.last + 1, |m| m + 1)
            } else {
                body + 1
            };
        }
        let close = lx
            .matching(body)
            .ok_or_else(|| SkipReason::UnresolvedClass(class_name.to_string()))?;
        let (fields, has_execute) = class_fields(&lx, body, close);
        let field = |name: &'static str| fields.get(name).copied().ok_or(SkipReason::MissingField(name));

        let name = self.string_field(module, &lx, field("name")?).ok_or(SkipReason::MissingField("name"))?;
        let description = self
            .string_field(module, &lx, field("description")?)
            .ok_or(SkipReason::MissingField("description"))?;
        if !has_execute {
            return Err(SkipReason::MissingField("execute"));
        }
        let input_schema = self.input_schema(module, &lx, field("inputSchema")?, &name)?;
        let output_schema = self.output_schema(module, &lx, field("outputSchema")?, &name)?;

        Ok(ExtractedTool {
            name,
            description,
            input_schema,
            output_schema,
            shape: ToolShape::Class {
                class_name: local_name.clone(),
            },
            module,
            execute: ExecuteSource {
                params: "(input)".to_string(),
                param_names: vec!["input".to_string()],
                body: format!(
                    "const {INSTANCE_NAME} = new {local_name}();\nreturn {INSTANCE_NAME}.execute(input);"
                ),
            },
        })
    }

    /// Module and local name of the class `name` as seen from `entry`.
    fn locate_class(&mut self, entry: ModuleId, name: &str) -> Option<(ModuleId, String)> {
        let scan = &self.graph.module(entry).scan;
        if scan.declaration(name).is_some_and(|d| d.kind == DeclKind::Class) {
            return Some((entry, name.to_string()));
        }
        let (import, binding) = scan.import_of(name)?;
        if self.classifier.classify(&import.source) != ImportKind::Local {
            warn!("Class '{name}' is imported from package '{}'", import.source);
            return None;
        }
        let specifier = import.source.clone();
        let exported = match binding {
            ImportBinding::Default(_) => "default".to_string(),
            ImportBinding::Named { imported, .. } => imported.clone(),
            ImportBinding::Namespace(_) => return None,
        };

        let target = self.graph.resolve(entry, &specifier)?;
        let scan = &self.graph.module(target).scan;
        let local = scan
            .exported(&exported)
            .or_else(|| scan.declaration(&exported).map(|_| exported.as_str()))?;
        scan.declaration(local)
            .filter(|d| d.kind == DeclKind::Class)
            .map(|_| (target, local.to_string()))
    }

    fn string_field(&self, module: ModuleId, lx: &Lexed<'_>, value: FieldValue) -> Option<String> {
        let FieldValue::Value(first, end) = value else {
            return None;
        };
        if end != first + 1 {
            return None;
        }
        match lx.kind(first)? {
            TokenKind::Str | TokenKind::Template => string_value(lx.text(first)),
            TokenKind::Ident => self.const_string(module, lx.text(first)),
            _ => None,
        }
    }

    /// Value of `const name = 'literal'` in `module`.
    fn const_string(&self, module: ModuleId, name: &str) -> Option<String> {
        let source = self.graph.module(module);
        let decl = source.scan.declaration(name)?;
        let lx = Lexed::new(decl.text(&source.source));
        let eq = lx.position_of_punct(1, "=")?;
        let is_literal_only = eq + 2 == lx.len() || (eq + 3 == lx.len() && lx.is_punct(eq + 2, ";"));
        if !is_literal_only {
            return None;
        }
        string_value(lx.text(eq + 1))
    }

    fn input_schema(
        &mut self,
        module: ModuleId,
        lx: &Lexed<'_>,
        value: FieldValue,
        tool: &str,
    ) -> Result<SchemaShape, SkipReason> {
        match self.schema(module, lx, value) {
            SchemaLookup::Found(translation) => self.finish_schema(translation, tool, "input"),
            SchemaLookup::NotFound(label) => Err(SkipReason::MissingInputSchema(label)),
        }
    }

    fn output_schema(
        &mut self,
        module: ModuleId,
        lx: &Lexed<'_>,
        value: FieldValue,
        tool: &str,
    ) -> Result<SchemaShape, SkipReason> {
        match self.schema(module, lx, value) {
            SchemaLookup::Found(translation) => self.finish_schema(translation, tool, "output"),
            SchemaLookup::NotFound(label) => {
                warn!("Tool '{tool}': output schema '{label}' not found, using an empty object schema");
                Ok(SchemaShape::empty())
            }
        }
    }

    fn finish_schema(
        &self,
        translation: SchemaTranslation,
        tool: &str,
        which: &str,
    ) -> Result<SchemaShape, SkipReason> {
        if translation.is_complete() {
            return Ok(translation.shape);
        }
        if self.strict_schemas {
            return translation
                .into_strict(&format!("{tool} {which}"))
                .map_err(|err| SkipReason::UnsupportedSchema(err.to_string()));
        }
        warn!(
            "Tool '{tool}': {which} schema fields not representable, left out: {}",
            translation.unsupported.join(", ")
        );
        Ok(translation.shape)
    }

    fn schema(&mut self, module: ModuleId, lx: &Lexed<'_>, value: FieldValue) -> SchemaLookup {
        let FieldValue::Value(first, end) = value else {
            return SchemaLookup::NotFound("method".to_string());
        };
        if end == first + 1
            && let Some(name) = lx.ident(first)
        {
            return self.named_schema(module, name);
        }
        let text = lx.slice(first, end - 1);
        translate_expression(text).map_or_else(|| SchemaLookup::NotFound(text.to_string()), SchemaLookup::Found)
    }

    /// Schema declared as `const name = <builder>.object({...})` in `module`
    /// or in a local module it imports `name` from.
    fn named_schema(&mut self, module: ModuleId, name: &str) -> SchemaLookup {
        let not_found = || SchemaLookup::NotFound(name.to_string());
        let source = self.graph.module(module);
        if let Some(decl) = source.scan.declaration(name) {
            return translate_declaration(decl.text(&source.source))
                .map_or_else(not_found, SchemaLookup::Found);
        }

        let Some((import, binding)) = source.scan.import_of(name) else {
            return not_found();
        };
        if self.classifier.classify(&import.source) != ImportKind::Local {
            return not_found();
        }
        let specifier = import.source.clone();
        let exported = match binding {
            ImportBinding::Named { imported, .. } => imported.clone(),
            ImportBinding::Default(_) => "default".to_string(),
            ImportBinding::Namespace(_) => return not_found(),
        };
        let Some(target) = self.graph.resolve(module, &specifier) else {
            return not_found();
        };
        let target = self.graph.module(target);
        target
            .scan
            .exported(&exported)
            .and_then(|local| target.scan.declaration(local))
            .and_then(|decl| translate_declaration(decl.text(&target.source)))
            .map_or_else(not_found, SchemaLookup::Found)
    }
}

/// Tool fields of an object literal, keyed by field name.
fn object_fields(lx: &Lexed<'_>, open: usize) -> HashMap<&'static str, FieldValue> {
    let mut fields = HashMap::new();
    for (first, end) in entries(lx, open) {
        let key_index = if lx.is_ident(first, "async") && lx.ident(first + 1).is_some() {
            first + 1
        } else {
            first
        };
        let key = match lx.kind(key_index) {
            Some(TokenKind::Ident) => Some(lx.text(key_index).to_string()),
            Some(TokenKind::Str) => string_value(lx.text(key_index)),
            _ => None,
        };
        let Some(field) = key.and_then(|k| TOOL_FIELDS.iter().copied().find(|f| *f == k)) else {
            continue;
        };

        let value = if lx.is_punct(key_index + 1, ":") {
            FieldValue::Value(key_index + 2, end)
        } else if lx.is_punct(key_index + 1, "(") {
            FieldValue::Method(first, end)
        } else if end == first + 1 {
            // Shorthand `{ name }`
            FieldValue::Value(first, end)
        } else {
            continue;
        };
        fields.entry(field).or_insert(value);
    }
    fields
}

/// Tool fields assigned in a class body (`this.x = ...` or `x = ...`), and
/// whether the class has an `execute` member.
fn class_fields(lx: &Lexed<'_>, body: usize, close: usize) -> (HashMap<&'static str, FieldValue>, bool) {
    let mut fields = HashMap::new();
    let mut has_execute = false;

    for k in body + 1..close {
        let Some(word) = lx.ident(k) else {
            continue;
        };
        let Some(field) = TOOL_FIELDS.iter().copied().find(|f| *f == word) else {
            continue;
        };
        let after_dot = k > 0 && lx.is_punct(k - 1, ".");

        let eq = if after_dot && lx.is_ident(k - 2, "this") && lx.is_punct(k + 1, "=") {
            Some(k + 1)
        } else if !after_dot && lx.parent(k) == Some(body) {
            if field == "execute" && lx.is_punct(k + 1, "(") {
                has_execute = true;
                continue;
            }
            let mut j = k + 1;
            if lx.is_punct(j, "?") || lx.is_punct(j, "!") {
                j += 1;
            }
            if lx.is_punct(j, "=") {
                Some(j)
            } else if lx.is_punct(j, ":") {
                let last = statement_end(lx, k);
                lx.position_of_punct(j, "=").filter(|&eq| eq < last)
            } else {
                None
            }
        } else {
            None
        };
        let Some(eq) = eq else {
            continue;
        };

        let last = statement_end(lx, if after_dot { k - 2 } else { k });
        let end = if lx.is_punct(last, ";") { last } else { last + 1 };
        if end <= eq + 1 {
            continue;
        }
        if field == "execute" {
            has_execute = true;
        }
        fields.entry(field).or_insert(FieldValue::Value(eq + 1, end));
    }
    (fields, has_execute)
}

/// Splits an execute function (arrow, function expression or method
/// shorthand) into parameters and body, removing type annotations.
fn parse_execute(text: &str) -> Option<ExecuteSource> {
    let stripped = strip_types(text);
    let lx = Lexed::new(&stripped);
    let mut j = 0;
    if lx.is_ident(j, "async") && !lx.is_punct(j + 1, "=>") {
        j += 1;
    }

    let mut arrow = true;
    if lx.is_ident(j, "function") {
        arrow = false;
        j += 1;
        if lx.is_punct(j, "*") {
            j += 1;
        }
        if lx.ident(j).is_some() && lx.is_punct(j + 1, "(") {
            j += 1;
        }
    } else if lx.ident(j).is_some() && lx.is_punct(j + 1, "(") {
        arrow = false;
        j += 1;
    }

    let (params, param_names, mut k) = if lx.is_punct(j, "(") {
        let close = lx.matching(j)?;
        let names = lx.references(j + 1..close).into_iter().map(str::to_string).collect();
        (lx.slice(j, close).to_string(), names, close + 1)
    } else if arrow && let Some(param) = lx.ident(j) {
        (format!("({param})"), vec![param.to_string()], j + 1)
    } else {
        return None;
    };

    if arrow {
        if !lx.is_punct(k, "=>") {
            return None;
        }
        k += 1;
    }

    let body = if lx.is_punct(k, "{") {
        if lx.matching(k)? + 1 != lx.len() {
            return None;
        }
        lx.inner(k)?.trim().to_string()
    } else if arrow && k < lx.len() {
        format!("return {};", lx.slice(k, lx.len() - 1).trim())
    } else {
        return None;
    };

    Some(ExecuteSource {
        params,
        param_names,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn classifier() -> ImportClassifier {
        ImportClassifier::new(vec!["lua-cli".to_string()], vec!["zod".to_string()])
    }

    fn extract_with(graph: &mut ModuleGraph, entry: ModuleId, strict: bool) -> Extraction {
        let classifier = classifier();
        let calls = vec!["registerTool".to_string()];
        ToolExtractor::new(graph, &classifier, &calls)
            .strict_schemas(strict)
            .extract(entry)
    }

    fn extract(source: &str) -> Extraction {
        let mut graph = ModuleGraph::new();
        let entry = graph.add("/project/src/index.ts", source);
        extract_with(&mut graph, entry, false)
    }

    const ECHO: &str = r"
import { z } from 'zod';
import { registerTool } from 'lua-cli';

const EchoInput = z.object({ message: z.string() });
const EchoOutput = z.object({ response: z.string() });

registerTool({
  name: 'echo',
  description: 'Echoes the message',
  inputSchema: EchoInput,
  outputSchema: EchoOutput,
  execute: async (input: { message: string }) => {
    return { response: input.message };
  },
});
";

    #[test]
    fn test_inline_tool() {
        let extraction = extract(ECHO);
        assert!(extraction.skipped.is_empty());
        let tool = &extraction.tools[0];
        assert_eq!(tool.name, "echo");
        assert_eq!(tool.description, "Echoes the message");
        assert_eq!(tool.input_schema.field_names(), vec!["message"]);
        assert_eq!(tool.output_schema.field_names(), vec!["response"]);
        assert_eq!(tool.shape, ToolShape::Inline);
        assert_eq!(tool.execute.params, "(input)");
        assert_eq!(tool.execute.param_names, vec!["input"]);
        assert_eq!(tool.execute.body, "return { response: input.message };");
    }

    #[test]
    fn test_missing_description_is_skipped_not_fatal() {
        let source = format!(
            "{ECHO}\nregisterTool({{ name: 'broken', inputSchema: EchoInput, outputSchema: EchoOutput, execute: async (input) => input }});\n"
        );
        let extraction = extract(&source);
        assert_eq!(extraction.tools.len(), 1);
        assert_eq!(extraction.tools[0].name, "echo");
        assert_eq!(extraction.skipped.len(), 1);
        assert_eq!(extraction.skipped[0].reason, SkipReason::MissingField("description"));
        assert!(extraction.skipped[0].site.ends_with(":18"));
    }

    #[test]
    fn test_missing_input_schema_declaration_skips() {
        let extraction = extract(
            "registerTool({ name: 'a', description: 'd', inputSchema: Nowhere, outputSchema: Nowhere, execute: async (input) => input });",
        );
        assert!(extraction.tools.is_empty());
        assert_eq!(
            extraction.skipped[0].reason,
            SkipReason::MissingInputSchema("Nowhere".to_string())
        );
    }

    #[test]
    fn test_missing_output_schema_declaration_is_empty() {
        let extraction = extract(
            "const In = z.object({ q: z.string() });\nregisterTool({ name: 'a', description: 'd', inputSchema: In, outputSchema: Out, execute: async (input) => input });",
        );
        assert_eq!(extraction.tools.len(), 1);
        assert!(extraction.tools[0].output_schema.is_empty());
        assert_eq!(extraction.tools[0].execute.body, "return input;");
    }

    #[test]
    fn test_inline_schemas_and_const_strings() {
        let extraction = extract(
            "const NAME = 'lookup';\nconst DESC = `Looks things up`;\nregisterTool({\n  name: NAME,\n  description: DESC,\n  inputSchema: z.object({ id: z.number() }),\n  outputSchema: z.object({ ok: z.boolean() }),\n  async execute(input: { id: number }): Promise<Out> {\n    return { ok: input.id > 0 };\n  },\n});",
        );
        let tool = &extraction.tools[0];
        assert_eq!(tool.name, "lookup");
        assert_eq!(tool.description, "Looks things up");
        assert_eq!(tool.input_schema.properties["id"]["type"], "number");
        assert_eq!(tool.execute.params, "(input)");
        assert_eq!(tool.execute.body, "return { ok: input.id > 0 };");
    }

    #[test]
    fn test_tool_object_bound_to_identifier() {
        let extraction = extract(
            "const S = z.object({ a: z.string() });\nconst tool = { name: 't', description: 'd', inputSchema: S, outputSchema: S, execute: async ({ a }) => ({ a }) };\nregisterTool(tool);",
        );
        let tool = &extraction.tools[0];
        assert_eq!(tool.execute.params, "({ a })");
        assert_eq!(tool.execute.param_names, vec!["a"]);
        assert_eq!(tool.execute.body, "return ({ a });");
    }

    #[test]
    fn test_execute_referencing_function() {
        let extraction = extract(
            "const S = z.object({ a: z.string() });\nasync function run(input) { return input; }\nregisterTool({ name: 't', description: 'd', inputSchema: S, outputSchema: S, execute: run });",
        );
        assert_eq!(extraction.tools[0].execute.body, "return run(input);");
    }

    #[test]
    fn test_strict_schemas_skip_unsupported_fields() {
        let source = "const S = z.object({ a: z.string(), tags: z.array(z.string()) });\nregisterTool({ name: 't', description: 'd', inputSchema: S, outputSchema: S, execute: async (input) => input });";
        let lenient = extract(source);
        assert_eq!(lenient.tools[0].input_schema.field_names(), vec!["a"]);

        let mut graph = ModuleGraph::new();
        let entry = graph.add("/project/src/index.ts", source);
        let strict = extract_with(&mut graph, entry, true);
        assert!(strict.tools.is_empty());
        assert_eq!(
            strict.skipped[0].reason,
            SkipReason::UnsupportedSchema("Schema 't input' has unsupported fields: tags".to_string())
        );
    }

    #[test]
    fn test_registration_function_definition_is_not_a_call() {
        let extraction = extract("function registerTool(tool) { tools.push(tool); }\nconst skill = { registerTool(t) { return t; } };");
        assert!(extraction.tools.is_empty());
        assert!(extraction.skipped.is_empty());
    }

    #[test]
    fn test_unsupported_argument() {
        let extraction = extract("registerTool(makeTool('x'));");
        assert_eq!(
            extraction.skipped[0].reason,
            SkipReason::UnsupportedArgument("makeTool('x')".to_string())
        );
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let source = format!("{ECHO}\n{}", &ECHO[ECHO.find("registerTool({").unwrap()..]);
        let extraction = extract(&source);
        assert_eq!(extraction.tools.len(), 1);
        assert_eq!(
            extraction.skipped[0].reason,
            SkipReason::DuplicateName("echo".to_string())
        );
    }

    #[test]
    fn test_class_tool_in_entry_module() {
        let extraction = extract(
            r"
import { LuaTool } from 'lua-cli';
const In = z.object({ city: z.string() });
const Out = z.object({ weather: z.string() });
class WeatherTool extends LuaTool {
  constructor() {
    super();
    this.name = 'weather';
    this.description = 'Gets the weather';
    this.inputSchema = In;
    this.outputSchema = Out;
  }
  async execute(input: { city: string }) {
    return { weather: 'sunny' };
  }
}
registerTool(new WeatherTool());
",
        );
        assert!(extraction.skipped.is_empty(), "{:?}", extraction.skipped);
        let tool = &extraction.tools[0];
        assert_eq!(tool.name, "weather");
        assert_eq!(
            tool.shape,
            ToolShape::Class {
                class_name: "WeatherTool".to_string()
            }
        );
        assert_eq!(
            tool.execute.body,
            "const toolInstance = new WeatherTool();\nreturn toolInstance.execute(input);"
        );
        assert_eq!(tool.input_schema.field_names(), vec!["city"]);
    }

    #[test]
    fn test_class_fields_form() {
        let extraction = extract(
            "const S = z.object({ a: z.string() });\nclass T {\n  name = 't';\n  description: string = 'd';\n  readonly inputSchema = S;\n  outputSchema = S;\n  execute = async (input) => input;\n}\nconst instance = new T();\nregisterTool(instance);",
        );
        assert!(extraction.skipped.is_empty(), "{:?}", extraction.skipped);
        assert_eq!(extraction.tools[0].description, "d");
    }

    #[test]
    fn test_class_without_execute_is_skipped() {
        let extraction = extract(
            "const S = z.object({ a: z.string() });\nclass T { constructor() { this.name = 't'; this.description = 'd'; this.inputSchema = S; this.outputSchema = S; } }\nregisterTool(new T());",
        );
        assert_eq!(extraction.skipped[0].reason, SkipReason::MissingField("execute"));
    }

    #[test]
    fn test_inline_tools_come_before_class_tools() {
        let source = format!(
            "class C {{ constructor() {{ this.name = 'c'; this.description = 'd'; this.inputSchema = EchoInput; this.outputSchema = EchoOutput; }} async execute(input) {{ return input; }} }}\nregisterTool(new C());\n{ECHO}"
        );
        let extraction = extract(&source);
        let names: Vec<&str> = extraction.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["echo", "c"]);
    }

    #[test]
    fn test_class_tool_from_local_import() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("tools")).unwrap();
        fs::write(
            src.join("tools/GreetingTool.ts"),
            "import { z } from 'zod';\nimport { LuaTool } from 'lua-cli';\nconst GreetingInput = z.object({ name: z.string() });\nconst GreetingOutput = z.object({ greeting: z.string() });\nexport default class GreetingTool extends LuaTool {\n  constructor() {\n    super();\n    this.name = 'greeting';\n    this.description = 'Greets';\n    this.inputSchema = GreetingInput;\n    this.outputSchema = GreetingOutput;\n  }\n  async execute(input: { name: string }) {\n    return { greeting: `Hello ${input.name}` };\n  }\n}\n",
        )
        .unwrap();
        let index = src.join("index.ts");
        fs::write(
            &index,
            "import Greeting from './tools/GreetingTool';\nregisterTool(new Greeting());\n",
        )
        .unwrap();

        let mut graph = ModuleGraph::new();
        let entry = graph.load(&index).unwrap();
        let extraction = extract_with(&mut graph, entry, false);

        let tool = &extraction.tools[0];
        assert_eq!(tool.name, "greeting");
        assert_ne!(tool.module, entry);
        assert_eq!(
            tool.shape,
            ToolShape::Class {
                class_name: "GreetingTool".to_string()
            }
        );
        assert_eq!(tool.output_schema.field_names(), vec!["greeting"]);
    }

    #[test]
    fn test_unresolvable_class_import_is_skipped() {
        let extraction = extract("import Missing from './tools/Missing';\nregisterTool(new Missing());");
        assert_eq!(
            extraction.skipped[0].reason,
            SkipReason::UnresolvedClass("Missing".to_string())
        );
    }

    #[test]
    fn test_schema_imported_from_local_module() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("schemas.ts"),
            "import { z } from 'zod';\nexport const Input = z.object({ q: z.string() });\n",
        )
        .unwrap();
        let index = dir.path().join("index.ts");
        fs::write(
            &index,
            "import { Input } from './schemas';\nregisterTool({ name: 's', description: 'd', inputSchema: Input, outputSchema: Input, execute: async (input) => input });",
        )
        .unwrap();

        let mut graph = ModuleGraph::new();
        let entry = graph.load(&index).unwrap();
        let extraction = extract_with(&mut graph, entry, false);
        assert_eq!(extraction.tools[0].input_schema.field_names(), vec!["q"]);
    }

    #[test]
    fn test_parse_execute_forms() {
        let arrow = parse_execute("async (input: In): Promise<Out> => {\n  return input;\n}").unwrap();
        assert_eq!(arrow.params, "(input)");
        assert_eq!(arrow.body, "return input;");

        let single = parse_execute("async input => input.x").unwrap();
        assert_eq!(single.params, "(input)");
        assert_eq!(single.body, "return input.x;");

        let function = parse_execute("async function (input) { return 1; }").unwrap();
        assert_eq!(function.body, "return 1;");

        let method = parse_execute("execute(input) { return 2; }").unwrap();
        assert_eq!(method.body, "return 2;");

        assert!(parse_execute("42").is_none());
        assert!(parse_execute("makeExecute(config)").is_none());
    }
}
