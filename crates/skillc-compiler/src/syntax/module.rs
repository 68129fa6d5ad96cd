//! Top-level declaration scan.
//!
//! Walks the depth-0 tokens of a module once and records its imports,
//! enums, classes, functions, variable bindings and instantiations, plus
//! the names it exports. Fragments are recorded as token and byte spans; the text of
//! a declaration never includes its `export` or `export default` prefix.

use super::lexer::{Lexed, TokenKind, is_keyword, string_value};

/// One binding introduced by an import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportBinding {
    /// `import local from 'x'`
    Default(String),
    /// `import * as local from 'x'`
    Namespace(String),
    /// `import { imported as local } from 'x'`
    Named {
        /// Name exported by the source module
        imported: String,
        /// Name bound in the importing module
        local: String,
    },
}

impl ImportBinding {
    /// Name bound in the importing module.
    #[must_use]
    pub fn local(&self) -> &str {
        match self {
            Self::Default(local) | Self::Namespace(local) | Self::Named { local, .. } => local,
        }
    }
}

/// One runtime import statement (`import type` statements are dropped).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Module specifier, e.g. `./services/weather` or `axios`
    pub source: String,
    /// Bound names; empty for side-effect imports
    pub bindings: Vec<ImportBinding>,
}

/// Kinds of top-level declarations, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeclKind {
    /// `enum Name { ... }` or `const enum Name { ... }`
    Enum,
    /// `class Name { ... }`
    Class,
    /// `function name(...) { ... }`
    Function,
    /// `const|let|var name = <expr>`
    Binding,
    /// `const|let|var name = new ClassName(...)`
    Instantiation,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Declaration kind
    pub kind: DeclKind,
    /// Names introduced (several for destructuring or multiple declarators)
    pub names: Vec<String>,
    /// Instantiated class for [`DeclKind::Instantiation`]
    pub class_name: Option<String>,
    /// First token (after any `export` prefix)
    pub first: usize,
    /// Last token, inclusive
    pub last: usize,
    /// Byte offset of the first token
    pub start: usize,
    /// Byte offset one past the last token
    pub end: usize,
}

impl Declaration {
    /// Source text of the declaration.
    #[must_use]
    pub fn text<'s>(&self, src: &'s str) -> &'s str {
        &src[self.start..self.end]
    }

    /// Returns `true` if the declaration introduces `name`.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

/// Result of scanning one module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleScan {
    /// Runtime imports in source order
    pub imports: Vec<ImportDecl>,
    /// Top-level declarations in source order
    pub declarations: Vec<Declaration>,
    /// `(exported name, local name)` pairs; the default export uses `"default"`
    pub exports: Vec<(String, String)>,
}

impl ModuleScan {
    /// Scans a tokenized module.
    ///
    /// # Examples
    ///
    /// ```
    /// use skillc_compiler::syntax::{DeclKind, Lexed, ModuleScan};
    ///
    /// let src = "import { z } from 'zod';\nexport class A {}\nconst a = new A();";
    /// let scan = ModuleScan::new(&Lexed::new(src));
    /// assert_eq!(scan.imports[0].source, "zod");
    /// assert_eq!(scan.declarations[0].kind, DeclKind::Class);
    /// assert_eq!(scan.declarations[1].kind, DeclKind::Instantiation);
    /// assert_eq!(scan.exported("A"), Some("A"));
    /// ```
    #[must_use]
    pub fn new(lx: &Lexed<'_>) -> Self {
        let mut scan = Self::default();
        let n = lx.len();
        let mut i = 0;

        while i < n {
            if lx.is_opener(i) {
                i = lx.matching(i).map_or(n, |m| m + 1);
                continue;
            }
            let Some(word) = lx.ident(i) else {
                i += 1;
                continue;
            };
            if i > 0 && (lx.is_punct(i - 1, ".") || lx.is_punct(i - 1, "?.")) {
                i += 1;
                continue;
            }

            i = match word {
                "import" if !lx.is_punct(i + 1, "(") && !lx.is_punct(i + 1, ".") => {
                    scan.import_at(lx, i)
                }
                "export" => scan.export_at(lx, i),
                "enum" | "class" | "abstract" | "function" | "async" | "const" | "let" | "var" => {
                    scan.declaration_at(lx, i).map_or(i + 1, |(_, next)| next)
                }
                "interface" | "declare" | "type" => skip_type_statement(lx, i),
                _ => i + 1,
            };
        }

        scan
    }

    /// Local name bound to an exported name.
    #[must_use]
    pub fn exported(&self, name: &str) -> Option<&str> {
        self.exports
            .iter()
            .find(|(exported, _)| exported == name)
            .map(|(_, local)| local.as_str())
    }

    /// First declaration introducing `name`.
    #[must_use]
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.declares(name))
    }

    /// Import statement and binding that bind `local`.
    #[must_use]
    pub fn import_of(&self, local: &str) -> Option<(&ImportDecl, &ImportBinding)> {
        self.imports.iter().find_map(|import| {
            import
                .bindings
                .iter()
                .find(|b| b.local() == local)
                .map(|b| (import, b))
        })
    }

    fn import_at(&mut self, lx: &Lexed<'_>, i: usize) -> usize {
        let mut j = i + 1;

        if lx.kind(j) == Some(TokenKind::Str) {
            if let Some(source) = string_value(lx.text(j)) {
                self.imports.push(ImportDecl {
                    source,
                    bindings: Vec::new(),
                });
            }
            return skip_semicolon(lx, j + 1);
        }

        let mut type_only = false;
        if lx.is_ident(j, "type") && !lx.is_ident(j + 1, "from") && !lx.is_punct(j + 1, ",") {
            type_only = true;
            j += 1;
        }

        let mut bindings = Vec::new();
        if let Some(name) = lx.ident(j).filter(|name| *name != "from") {
            bindings.push(ImportBinding::Default(name.to_string()));
            j += 1;
            if lx.is_punct(j, ",") {
                j += 1;
            }
        }
        if lx.is_punct(j, "*") && lx.is_ident(j + 1, "as") {
            if let Some(name) = lx.ident(j + 2) {
                bindings.push(ImportBinding::Namespace(name.to_string()));
            }
            j += 3;
        }
        if lx.is_punct(j, "{") {
            let Some(close) = lx.matching(j) else {
                return lx.len();
            };
            for (first, end) in entries(lx, j) {
                if end - first > 1 && lx.is_ident(first, "type") {
                    continue;
                }
                let imported = lx.text(first).to_string();
                let local = if lx.is_ident(first + 1, "as") {
                    lx.text(first + 2).to_string()
                } else {
                    imported.clone()
                };
                bindings.push(ImportBinding::Named { imported, local });
            }
            j = close + 1;
        }

        if !(lx.is_ident(j, "from") && lx.kind(j + 1) == Some(TokenKind::Str)) {
            return statement_end(lx, i) + 1;
        }
        let source = string_value(lx.text(j + 1)).unwrap_or_default();
        j += 2;

        if (lx.is_ident(j, "with") || lx.is_ident(j, "assert")) && lx.is_punct(j + 1, "{") {
            j = lx.matching(j + 1).map_or(lx.len(), |m| m + 1);
        }

        if !type_only {
            self.imports.push(ImportDecl { source, bindings });
        }
        skip_semicolon(lx, j)
    }

    fn export_at(&mut self, lx: &Lexed<'_>, i: usize) -> usize {
        let j = i + 1;

        if lx.is_ident(j, "default") {
            let head = j + 1;
            if let Some((names, next)) = self.declaration_at(lx, head) {
                if let Some(name) = names.first() {
                    self.exports.push(("default".to_string(), name.clone()));
                }
                return next;
            }
            let end = statement_end(lx, head);
            if let Some(name) = lx.ident(head)
                && (end == head || (end == head + 1 && lx.is_punct(end, ";")))
            {
                self.exports.push(("default".to_string(), name.to_string()));
            }
            return end + 1;
        }

        if lx.is_punct(j, "{") {
            let is_reexport = lx
                .matching(j)
                .is_some_and(|close| lx.is_ident(close + 1, "from"));
            if !is_reexport {
                for (first, end) in entries(lx, j) {
                    if end - first > 1 && lx.is_ident(first, "type") {
                        continue;
                    }
                    let local = lx.text(first).to_string();
                    let exported = if lx.is_ident(first + 1, "as") {
                        lx.text(first + 2).to_string()
                    } else {
                        local.clone()
                    };
                    self.exports.push((exported, local));
                }
            }
            return statement_end(lx, i) + 1;
        }

        if matches!(lx.ident(j), Some("type" | "interface" | "declare")) {
            return skip_type_statement(lx, j);
        }

        if let Some((names, next)) = self.declaration_at(lx, j) {
            self.exports
                .extend(names.into_iter().map(|name| (name.clone(), name)));
            return next;
        }

        statement_end(lx, i) + 1
    }

    /// Parses a declaration starting at `head`, returning the introduced
    /// names and the index after it. `None` when `head` does not start a
    /// declaration.
    fn declaration_at(&mut self, lx: &Lexed<'_>, head: usize) -> Option<(Vec<String>, usize)> {
        let decl = match lx.ident(head)? {
            "enum" => enum_at(lx, head, head),
            "const" if lx.is_ident(head + 1, "enum") => enum_at(lx, head, head + 1),
            "abstract" if lx.is_ident(head + 1, "class") => class_at(lx, head, head + 1),
            "class" => class_at(lx, head, head),
            "async" if lx.is_ident(head + 1, "function") => function_at(lx, head, head + 1),
            "function" => function_at(lx, head, head),
            "const" | "let" | "var" => binding_at(lx, head),
            _ => return None,
        };

        match decl {
            Ok(decl) => {
                let names = decl.names.clone();
                let next = decl.last + 1;
                tracing::trace!(kind = ?decl.kind, names = ?names, "Found top-level declaration");
                self.declarations.push(decl);
                Some((names, next))
            }
            // Unbalanced or anonymous: nothing is recorded, scanning resumes.
            Err(resume) => Some((Vec::new(), resume)),
        }
    }
}

fn enum_at(lx: &Lexed<'_>, head: usize, kw: usize) -> Result<Declaration, usize> {
    let name = lx.ident(kw + 1).ok_or(kw + 1)?;
    if !lx.is_punct(kw + 2, "{") {
        return Err(kw + 2);
    }
    let close = lx.matching(kw + 2).ok_or(lx.len())?;
    Ok(declaration(lx, DeclKind::Enum, vec![name.to_string()], head, close))
}

fn class_at(lx: &Lexed<'_>, head: usize, kw: usize) -> Result<Declaration, usize> {
    let name = lx
        .ident(kw + 1)
        .filter(|n| !matches!(*n, "extends" | "implements"));

    let mut j = kw + 1;
    while j < lx.len() && !lx.is_punct(j, "{") {
        if lx.is_opener(j) {
            j = lx.matching(j).ok_or(lx.len())? + 1;
        } else {
            j += 1;
        }
    }
    let close = lx.matching(j).ok_or(j + 1)?;
    let name = name.ok_or(close + 1)?;

    Ok(declaration(lx, DeclKind::Class, vec![name.to_string()], head, close))
}

fn function_at(lx: &Lexed<'_>, head: usize, kw: usize) -> Result<Declaration, usize> {
    let mut j = kw + 1;
    if lx.is_punct(j, "*") {
        j += 1;
    }
    let name = lx.ident(j).ok_or(j)?;

    while j < lx.len() && !lx.is_punct(j, "(") {
        j += 1;
    }
    let params_close = lx.matching(j).ok_or(j + 1)?;

    let mut b = params_close + 1;
    while b < lx.len() && !lx.is_punct(b, "{") {
        if lx.is_punct(b, ";") {
            // Overload signature without a body.
            return Err(b + 1);
        }
        if lx.is_opener(b) {
            b = lx.matching(b).ok_or(lx.len())? + 1;
        } else {
            b += 1;
        }
    }
    let close = lx.matching(b).ok_or(b + 1)?;

    Ok(declaration(lx, DeclKind::Function, vec![name.to_string()], head, close))
}

fn binding_at(lx: &Lexed<'_>, kw: usize) -> Result<Declaration, usize> {
    let target = kw + 1;
    let mut names = Vec::new();
    let after_target = if let Some(name) = lx.ident(target) {
        names.push(name.to_string());
        target + 1
    } else if lx.is_punct(target, "{") || lx.is_punct(target, "[") {
        pattern_names(lx, target, &mut names);
        lx.matching(target).ok_or(lx.len())? + 1
    } else {
        return Err(target);
    };

    let last = statement_end(lx, kw);

    // Further declarators: `const a = 1, b = 2`
    let mut eq = None;
    let mut j = after_target;
    while j <= last {
        if lx.is_opener(j) {
            j = lx.matching(j).map_or(last + 1, |m| m + 1);
            continue;
        }
        if eq.is_none() && lx.is_punct(j, "=") {
            eq = Some(j);
        }
        if lx.is_punct(j, ",")
            && let Some(name) = lx.ident(j + 1)
            && (lx.is_punct(j + 2, "=") || lx.is_punct(j + 2, ":"))
        {
            names.push(name.to_string());
        }
        j += 1;
    }

    if names.is_empty() {
        return Err(last + 1);
    }

    let mut decl = declaration(lx, DeclKind::Binding, names, kw, last);
    if decl.names.len() == 1
        && let Some(class_name) = eq.and_then(|eq| instantiated_class(lx, eq + 1, last))
    {
        decl.kind = DeclKind::Instantiation;
        decl.class_name = Some(class_name.to_string());
    }
    Ok(decl)
}

/// `new ClassName(...)` or `new ClassName<T>(...)` spanning exactly
/// `start..=last` (an optional trailing `;` is allowed).
fn instantiated_class<'a>(lx: &Lexed<'a>, start: usize, last: usize) -> Option<&'a str> {
    if !lx.is_ident(start, "new") {
        return None;
    }
    let class_name = lx.ident(start + 1).filter(|n| !is_keyword(n))?;
    let mut j = start + 2;
    if lx.is_punct(j, "<") {
        while j <= last && !lx.is_punct(j, ">") {
            j += 1;
        }
        j += 1;
    }
    let end = if lx.is_punct(j, "(") {
        lx.matching(j)?
    } else {
        j - 1
    };
    (end == last || (end + 1 == last && lx.is_punct(last, ";"))).then_some(class_name)
}

fn declaration(
    lx: &Lexed<'_>,
    kind: DeclKind,
    names: Vec<String>,
    first: usize,
    last: usize,
) -> Declaration {
    let start = lx.token(first).map_or(0, |t| t.start);
    let end = lx.token(last).map_or(start, |t| t.end);
    Declaration {
        kind,
        names,
        class_name: None,
        first,
        last,
        start,
        end,
    }
}

/// Names bound by a destructuring pattern.
fn pattern_names(lx: &Lexed<'_>, open: usize, names: &mut Vec<String>) {
    let is_object = lx.is_punct(open, "{");
    for (first, end) in entries(lx, open) {
        let mut k = first;
        if lx.is_punct(k, "...") {
            k += 1;
        }
        if is_object
            && let Some(colon) = (k..end).find(|&c| lx.is_punct(c, ":"))
        {
            k = colon + 1;
        }
        if lx.is_opener(k) {
            pattern_names(lx, k, names);
        } else if let Some(name) = lx.ident(k) {
            names.push(name.to_string());
        }
    }
}

/// One member of an `enum` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumMember {
    /// Token of the member name (an identifier or a string literal)
    pub name: usize,
    /// Initializer tokens as `(first, end)` with `end` exclusive
    pub init: Option<(usize, usize)>,
}

/// Members of the enum body opened at `open`.
#[must_use]
pub fn enum_members(lx: &Lexed<'_>, open: usize) -> Vec<EnumMember> {
    entries(lx, open)
        .into_iter()
        .filter(|&(first, _)| matches!(lx.kind(first), Some(TokenKind::Ident | TokenKind::Str)))
        .map(|(first, end)| EnumMember {
            name: first,
            init: (lx.is_punct(first + 1, "=") && first + 2 < end).then_some((first + 2, end)),
        })
        .collect()
}

/// Names referenced by the initializers of the first enum in `lx`.
///
/// Member names are keys, not references.
#[must_use]
pub fn enum_references<'a>(lx: &Lexed<'a>) -> Vec<&'a str> {
    let Some(open) = (0..lx.len()).find(|&j| lx.is_punct(j, "{")) else {
        return Vec::new();
    };
    let mut out: Vec<&'a str> = Vec::new();
    for (first, end) in enum_members(lx, open).into_iter().filter_map(|m| m.init) {
        for name in lx.references(first..end) {
            if !out.contains(&name) {
                out.push(name);
            }
        }
    }
    out
}

/// Comma-separated entries directly inside the group opened at `open`, as
/// `(first, end)` token ranges with `end` exclusive.
#[must_use]
pub fn entries(lx: &Lexed<'_>, open: usize) -> Vec<(usize, usize)> {
    let Some(close) = lx.matching(open) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let mut first = open + 1;
    let mut j = open + 1;
    while j < close {
        if lx.is_opener(j) {
            j = lx.matching(j).map_or(close, |m| m + 1);
            continue;
        }
        if lx.is_punct(j, ",") {
            if j > first {
                out.push((first, j));
            }
            first = j + 1;
        }
        j += 1;
    }
    if close > first {
        out.push((first, close));
    }
    out
}

/// Last token index of the statement starting at `from`.
///
/// Ends at a depth-0 `;`, at an unmatched closing bracket, or at a line
/// break that separates a complete expression from a new statement.
#[must_use]
pub fn statement_end(lx: &Lexed<'_>, from: usize) -> usize {
    let n = lx.len();
    let mut last = from;
    let mut j = from + 1;
    while j < n {
        if lx.newline_before(j) && ends_expression(lx, last) && starts_statement(lx, j) {
            return last;
        }
        if lx.is_punct(j, ";") {
            return j;
        }
        if lx.kind(j) == Some(TokenKind::Punct) && matches!(lx.text(j), ")" | "]" | "}") {
            return last;
        }
        if lx.is_opener(j) {
            let Some(close) = lx.matching(j) else {
                return n - 1;
            };
            last = close;
            j = close + 1;
            continue;
        }
        last = j;
        j += 1;
    }
    last
}

pub(crate) fn ends_expression(lx: &Lexed<'_>, i: usize) -> bool {
    match lx.kind(i) {
        Some(TokenKind::Ident) => {
            let word = lx.text(i);
            !is_keyword(word) || matches!(word, "this" | "true" | "false" | "null" | "super")
        }
        Some(TokenKind::Number | TokenKind::Str | TokenKind::Regex) => true,
        Some(TokenKind::Template) => lx.text(i).ends_with('`') && lx.text(i).len() > 1,
        Some(TokenKind::Punct) => matches!(lx.text(i), ")" | "]" | "}" | "++" | "--"),
        None => false,
    }
}

fn starts_statement(lx: &Lexed<'_>, i: usize) -> bool {
    match lx.kind(i) {
        Some(TokenKind::Ident) => {
            !matches!(lx.text(i), "in" | "instanceof" | "as" | "satisfies")
        }
        Some(TokenKind::Number | TokenKind::Str) => true,
        Some(TokenKind::Template) => lx.text(i).starts_with('`'),
        _ => false,
    }
}

fn skip_semicolon(lx: &Lexed<'_>, j: usize) -> usize {
    if lx.is_punct(j, ";") { j + 1 } else { j }
}

/// Skips `interface`, `type` and `declare` statements.
fn skip_type_statement(lx: &Lexed<'_>, i: usize) -> usize {
    match lx.text(i) {
        "interface" => {
            let mut j = i + 1;
            while j < lx.len() && !lx.is_punct(j, "{") {
                j += 1;
            }
            lx.matching(j).map_or(j + 1, |m| m + 1)
        }
        "type" if lx.ident(i + 1).is_some()
            && (lx.is_punct(i + 2, "=") || lx.is_punct(i + 2, "<")) =>
        {
            statement_end(lx, i) + 1
        }
        "declare" => statement_end(lx, i) + 1,
        _ => i + 1,
    }
}
