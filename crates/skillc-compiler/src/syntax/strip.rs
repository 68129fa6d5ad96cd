//! TypeScript-only syntax removal.
//!
//! Works on tokens rather than characters, so annotations are removed
//! without touching string or template contents. Handles the annotations
//! that show up in tool sources: parameter, return, variable and class
//! field types, optional markers, access modifiers, `implements` clauses,
//! generic parameters and arguments (including an arrow's own `<T>`),
//! `as`/`satisfies` casts, non-null assertions and local `interface`/`type`
//! statements. Anything beyond that passes through unchanged.
//!
//! `enum` is the one construct that needs code: it is lowered to a frozen
//! object, with a reverse entry for each numeric member.

use super::lexer::{Lexed, TokenKind, is_keyword, string_value};
use super::module::{ends_expression, entries, enum_members, statement_end};
use std::collections::HashMap;

const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "readonly",
    "override",
    "declare",
    "abstract",
];

/// Words that may precede a method name in a class body or object literal.
const METHOD_PREFIXES: &[&str] = &[
    "async",
    "static",
    "get",
    "set",
    "public",
    "private",
    "protected",
    "readonly",
    "override",
    "abstract",
];

/// Operators that end an `as`/`satisfies` cast.
const CAST_STOPS: &[&str] = &[
    ",", ";", "=", "?", ":", "&&", "||", "??", "=>", "+", "-", "*", "/", "%", "==", "===", "!=",
    "!==", "<=", ">=", "?.",
];

#[derive(Debug)]
struct Edit {
    start: usize,
    end: usize,
    text: String,
}

struct Stripper<'l, 'a> {
    lx: &'l Lexed<'a>,
    edits: Vec<Edit>,
}

/// Value of one enum member.
#[derive(Debug, Clone)]
enum EnumValue {
    Number(i64),
    Text(String),
    Computed(String),
}

impl EnumValue {
    fn js(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(literal) => literal.clone(),
            Self::Computed(expr) => format!("({expr})"),
        }
    }

    /// Value of a following member without an initializer.
    fn successor(&self) -> Option<Self> {
        match self {
            Self::Number(n) => Some(n.checked_add(1).map_or_else(
                || Self::Computed(format!("{n} + 1")),
                Self::Number,
            )),
            Self::Computed(expr) => Some(Self::Computed(format!("({expr}) + 1"))),
            Self::Text(_) => None,
        }
    }
}

/// Removes TypeScript-only syntax from a source fragment.
///
/// # Examples
///
/// ```
/// use skillc_compiler::syntax::strip_types;
///
/// let js = strip_types("function add(a: number, b?: number): number { return a + (b as number); }");
/// assert_eq!(js, "function add(a, b) { return a + (b); }");
/// ```
#[must_use]
pub fn strip_types(src: &str) -> String {
    let lx = Lexed::new(src);
    let mut stripper = Stripper {
        lx: &lx,
        edits: Vec::new(),
    };
    stripper.run();
    apply(src, stripper.edits)
}

/// Drops `extends <base>` from class headers whose base is one of `bases`,
/// along with `super(...)` calls.
///
/// Used for classes that extend a framework type which does not exist at
/// execution time.
///
/// # Examples
///
/// ```
/// use skillc_compiler::syntax::remove_base_class;
///
/// let js = remove_base_class(
///     "class T extends LuaTool { constructor() { super(); this.name = 'x'; } }",
///     &["LuaTool"],
/// );
/// assert_eq!(js, "class T { constructor() {  this.name = 'x'; } }");
/// ```
#[must_use]
pub fn remove_base_class(src: &str, bases: &[&str]) -> String {
    let lx = Lexed::new(src);
    let mut edits = Vec::new();
    let mut dropped = false;

    for i in 1..lx.len() {
        if !lx.is_ident(i, "extends") {
            continue;
        }
        let Some(base) = lx.ident(i + 1) else {
            continue;
        };
        if !bases.contains(&base) {
            continue;
        }
        let mut last = i + 1;
        if lx.is_punct(last + 1, "<")
            && let Some(close) = generic_close(&lx, last + 1)
        {
            last = close;
        }
        if let (Some(prev), Some(end)) = (lx.token(i - 1), lx.token(last)) {
            edits.push(Edit {
                start: prev.end,
                end: end.end,
                text: String::new(),
            });
            dropped = true;
        }
    }

    if dropped {
        for i in 0..lx.len() {
            if !(lx.is_ident(i, "super") && lx.is_punct(i + 1, "(")) {
                continue;
            }
            let Some(close) = lx.matching(i + 1) else {
                continue;
            };
            let last = if lx.is_punct(close + 1, ";") {
                close + 1
            } else {
                close
            };
            if let (Some(a), Some(b)) = (lx.token(i), lx.token(last)) {
                edits.push(Edit {
                    start: a.start,
                    end: b.end,
                    text: String::new(),
                });
            }
        }
    }

    apply(src, edits)
}

impl Stripper<'_, '_> {
    fn cut_bytes(&mut self, start: usize, end: usize) {
        if start < end {
            self.edits.push(Edit {
                start,
                end,
                text: String::new(),
            });
        }
    }

    fn cut_tokens(&mut self, first: usize, last: usize) {
        if let (Some(a), Some(b)) = (self.lx.token(first), self.lx.token(last)) {
            self.cut_bytes(a.start, b.end);
        }
    }

    fn replace_tokens(&mut self, first: usize, last: usize, text: String) {
        if let (Some(a), Some(b)) = (self.lx.token(first), self.lx.token(last)) {
            self.edits.push(Edit {
                start: a.start,
                end: b.end,
                text,
            });
        }
    }

    /// Cuts token `i` together with the whitespace after it.
    fn cut_word(&mut self, i: usize) {
        if let (Some(a), Some(b)) = (self.lx.token(i), self.lx.token(i + 1)) {
            self.cut_bytes(a.start, b.start);
        }
    }

    fn run(&mut self) {
        let lx = self.lx;
        let class_bodies = self.class_headers();
        let params: Vec<usize> = (0..lx.len())
            .filter(|&i| lx.is_punct(i, "(") && is_param_list(lx, i))
            .collect();

        for &open in &params {
            self.param_list(open, &class_bodies);
        }
        for &body in &class_bodies {
            self.class_members(body);
        }
        for i in 0..lx.len() {
            match lx.kind(i) {
                Some(TokenKind::Ident) => self.ident_rule(i),
                Some(TokenKind::Punct) => self.punct_rule(i),
                _ => {}
            }
        }
    }

    /// Handles `abstract` and `implements` in class headers and returns the
    /// indices of class body braces.
    fn class_headers(&mut self) -> Vec<usize> {
        let lx = self.lx;
        let mut bodies = Vec::new();
        for i in 0..lx.len() {
            if !lx.is_ident(i, "class") || (i > 0 && lx.is_punct(i - 1, ".")) {
                continue;
            }
            if i > 0 && lx.is_ident(i - 1, "abstract") {
                self.cut_word(i - 1);
            }
            let mut j = i + 1;
            while j < lx.len() && !lx.is_punct(j, "{") {
                j = if lx.is_opener(j) {
                    lx.matching(j).map_or(lx.len(), |m| m + 1)
                } else {
                    j + 1
                };
            }
            if j >= lx.len() {
                continue;
            }
            if let Some(k) = (i + 1..j).find(|&k| lx.is_ident(k, "implements"))
                && let (Some(before), Some(last)) = (lx.token(k - 1), lx.token(j - 1))
            {
                self.cut_bytes(before.end, last.end);
            }
            bodies.push(j);
        }
        bodies
    }

    fn param_list(&mut self, open: usize, class_bodies: &[usize]) {
        let lx = self.lx;
        let Some(close) = lx.matching(open) else {
            return;
        };
        let is_constructor = open > 0
            && lx.is_ident(open - 1, "constructor")
            && lx
                .parent(open - 1)
                .is_some_and(|p| class_bodies.contains(&p));
        let mut properties = Vec::new();

        for (first, end) in entries(lx, open) {
            let mut k = first;
            let mut has_modifier = false;
            while k + 1 < end
                && lx.ident(k).is_some_and(|w| MODIFIERS.contains(&w))
                && (lx.ident(k + 1).is_some() || lx.is_opener(k + 1))
            {
                self.cut_word(k);
                has_modifier = true;
                k += 1;
            }
            if lx.is_punct(k, "...") {
                k += 1;
            }
            let name_last = if lx.is_opener(k) {
                match lx.matching(k) {
                    Some(m) => m,
                    None => continue,
                }
            } else {
                k
            };
            if has_modifier && let Some(name) = lx.ident(k) {
                properties.push(name.to_string());
            }

            let mut m = name_last + 1;
            let optional = lx.is_punct(m, "?") && m < end;
            if optional {
                m += 1;
            }
            if m < end && lx.is_punct(m, ":") {
                let last = type_end(lx, m + 1, &[",", "="], false);
                let from = if optional { name_last + 1 } else { m };
                self.cut_tokens(from, last.max(m));
            } else if optional {
                self.cut_tokens(name_last + 1, name_last + 1);
            }
        }

        if lx.is_punct(close + 1, ":") {
            let last = type_end(lx, close + 2, &["{", "=>", ";", ","], false);
            self.cut_tokens(close + 1, last.max(close + 1));
        }

        if is_constructor && !properties.is_empty() {
            self.assign_parameter_properties(close, &properties);
        }
    }

    /// `constructor(private api: Api)` also assigns `this.api`.
    fn assign_parameter_properties(&mut self, params_close: usize, properties: &[String]) {
        let lx = self.lx;
        let Some(body) = (params_close + 1..lx.len()).find(|&j| lx.is_punct(j, "{")) else {
            return;
        };
        let Some(body_close) = lx.matching(body) else {
            return;
        };

        let super_call = (body + 1..body_close).find(|&j| {
            lx.parent(j) == Some(body) && lx.is_ident(j, "super") && lx.is_punct(j + 1, "(")
        });
        let after = super_call.map_or(body, |s| statement_end(lx, s));
        let Some(at) = lx.token(after).map(|t| t.end) else {
            return;
        };

        let text: String = properties
            .iter()
            .map(|p| format!(" this.{p} = {p};"))
            .collect();
        self.edits.push(Edit {
            start: at,
            end: at,
            text,
        });
    }

    fn class_members(&mut self, body: usize) {
        let Some(close) = self.lx.matching(body) else {
            return;
        };
        let mut k = body + 1;
        while k < close {
            k = self.member(k, close).max(k + 1);
        }
    }

    /// Strips one class member starting at `k`; returns the next member
    /// start.
    fn member(&mut self, start: usize, close: usize) -> usize {
        let lx = self.lx;
        let mut k = start;
        if lx.is_punct(k, ";") {
            return k + 1;
        }

        while lx.ident(k).is_some_and(|w| MODIFIERS.contains(&w)) && is_member_name_start(lx, k + 1)
        {
            self.cut_word(k);
            k += 1;
        }
        while matches!(lx.ident(k), Some("static" | "async" | "get" | "set"))
            && is_member_name_start(lx, k + 1)
        {
            k += 1;
        }
        if lx.is_punct(k, "*") || lx.is_punct(k, "#") {
            k += 1;
        }

        let name_last = if lx.is_punct(k, "[") {
            lx.matching(k).unwrap_or(k)
        } else {
            k
        };

        // Index signature: `[key: string]: unknown;`
        if lx.is_punct(k, "[") && lx.is_punct(name_last + 1, ":") {
            let last = type_end(lx, name_last + 2, &[";"], true);
            let last = if lx.is_punct(last + 1, ";") {
                last + 1
            } else {
                last
            };
            self.cut_tokens(start, last);
            return last + 1;
        }

        let mut m = name_last + 1;
        let marker = lx.is_punct(m, "?") || lx.is_punct(m, "!");
        if marker {
            m += 1;
        }
        if lx.is_punct(m, ":") {
            let last = type_end(lx, m + 1, &["=", ";"], true);
            let from = if marker { name_last + 1 } else { m };
            self.cut_tokens(from, last.max(m));
            m = last.max(m) + 1;
        } else if marker && lx.is_punct(m, "(") {
            self.cut_tokens(name_last + 1, name_last + 1);
        }

        let mut j = m;
        while j < close {
            if lx.is_punct(j, ";") {
                return j + 1;
            }
            if lx.is_punct(j, "{") {
                return lx.matching(j).map_or(close, |c| c + 1);
            }
            if lx.is_opener(j) {
                j = lx.matching(j).map_or(close, |c| c + 1);
                continue;
            }
            if j > name_last
                && lx.newline_before(j)
                && ends_expression(lx, j - 1)
                && (lx.ident(j).is_some() || lx.is_punct(j, "#"))
            {
                return j;
            }
            j += 1;
        }
        close
    }

    fn ident_rule(&mut self, i: usize) {
        let lx = self.lx;
        match lx.text(i) {
            "as" | "satisfies" => {
                if i == 0 || !ends_expression(lx, i - 1) || !starts_type(lx, i + 1) {
                    return;
                }
                let last = type_end(lx, i + 1, CAST_STOPS, true);
                if let (Some(prev), Some(end)) = (lx.token(i - 1), lx.token(last)) {
                    self.cut_bytes(prev.end, end.end);
                }
            }
            "const" | "let" | "var" => {
                let target = i + 1;
                let name_last = if lx.is_opener(target) {
                    lx.matching(target)
                } else {
                    lx.ident(target).map(|_| target)
                };
                let Some(name_last) = name_last else {
                    return;
                };
                let mut colon = name_last + 1;
                if lx.is_punct(colon, "!") {
                    colon += 1;
                }
                if lx.is_punct(colon, ":") {
                    let last = type_end(lx, colon + 1, &["=", ";", ","], true);
                    self.cut_tokens(name_last + 1, last.max(colon));
                }
            }
            "interface" if at_statement_start(lx, i) && lx.ident(i + 1).is_some() => {
                let mut j = i + 2;
                while j < lx.len() && !lx.is_punct(j, "{") {
                    j += 1;
                }
                if let Some(close) = lx.matching(j) {
                    self.cut_tokens(i, close);
                }
            }
            "type"
                if at_statement_start(lx, i)
                    && lx.ident(i + 1).is_some()
                    && (lx.is_punct(i + 2, "=") || lx.is_punct(i + 2, "<")) =>
            {
                self.cut_tokens(i, statement_end(lx, i));
            }
            "declare" if at_statement_start(lx, i) && lx.ident(i + 1).is_some() => {
                self.cut_tokens(i, statement_end(lx, i));
            }
            "enum" if lx.ident(i + 1).is_some() && lx.is_punct(i + 2, "{") => {
                let first = if i > 0 && lx.is_ident(i - 1, "const") {
                    i - 1
                } else {
                    i
                };
                if at_statement_start(lx, first) {
                    self.lower_enum(first, i);
                }
            }
            _ => {}
        }
    }

    /// `enum Level { Low, High = 5 }` becomes
    /// `const Level = Object.freeze({ Low: 0, High: 5, "0": "Low", "5": "High" });`
    fn lower_enum(&mut self, first: usize, kw: usize) {
        let lx = self.lx;
        let open = kw + 2;
        let (Some(name), Some(close)) = (lx.ident(kw + 1), lx.matching(open)) else {
            return;
        };

        let mut forward = Vec::new();
        let mut reverse = Vec::new();
        let mut seen: HashMap<String, EnumValue> = HashMap::new();
        let mut next = EnumValue::Number(0);

        for member in enum_members(lx, open) {
            let key = lx.text(member.name);
            let label = if lx.kind(member.name) == Some(TokenKind::Str) {
                key.to_string()
            } else {
                format!("\"{key}\"")
            };
            let value = match member.init {
                Some((start, end)) => enum_value(lx, start, end, &seen),
                None => next.clone(),
            };

            forward.push(format!("{key}: {}", value.js()));
            match &value {
                EnumValue::Number(n) => reverse.push(format!("\"{n}\": {label}")),
                EnumValue::Computed(_) => reverse.push(format!("[{}]: {label}", value.js())),
                EnumValue::Text(_) => {}
            }
            // String members leave the counter alone.
            if let Some(successor) = value.successor() {
                next = successor;
            }
            let bare = string_value(key).unwrap_or_else(|| key.to_string());
            seen.insert(bare, value);
        }

        forward.extend(reverse);
        let body = if forward.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", forward.join(", "))
        };
        let last = if lx.is_punct(close + 1, ";") {
            close + 1
        } else {
            close
        };
        self.replace_tokens(first, last, format!("const {name} = Object.freeze({body});"));
    }

    /// `<T>(x: T) => x`: type parameters opening an arrow function.
    fn arrow_generics(&mut self, open: usize) -> bool {
        let lx = self.lx;
        if open > 0 && ends_expression(lx, open - 1) {
            return false;
        }
        let Some(close) = generic_close(lx, open) else {
            return false;
        };
        if !(lx.is_punct(close + 1, "(") && is_param_list(lx, close + 1)) {
            return false;
        }
        self.cut_tokens(open, close);
        true
    }

    fn punct_rule(&mut self, i: usize) {
        let lx = self.lx;
        if lx.is_punct(i, "<") && self.arrow_generics(i) {
            return;
        }
        if i == 0 {
            return;
        }
        let (Some(prev), Some(tok)) = (lx.token(i - 1), lx.token(i)) else {
            return;
        };
        let adjacent = prev.end == tok.start;

        match lx.text(i) {
            "<" if adjacent && lx.ident(i - 1).is_some_and(|w| !is_keyword(w)) => {
                let Some(close) = generic_close(lx, i) else {
                    return;
                };
                let follows = lx.is_punct(close + 1, "(")
                    || lx.is_punct(close + 1, "{")
                    || lx.is_ident(close + 1, "extends")
                    || lx.is_ident(close + 1, "implements")
                    || lx.kind(close + 1) == Some(TokenKind::Template);
                if follows {
                    self.cut_tokens(i, close);
                }
            }
            "!" if adjacent && ends_expression(lx, i - 1) => self.cut_tokens(i, i),
            _ => {}
        }
    }
}

/// Value of an enum initializer spanning tokens `start..end`.
fn enum_value(
    lx: &Lexed<'_>,
    start: usize,
    end: usize,
    seen: &HashMap<String, EnumValue>,
) -> EnumValue {
    let single = end == start + 1;
    match lx.kind(start) {
        Some(TokenKind::Str) if single => return EnumValue::Text(lx.text(start).to_string()),
        Some(TokenKind::Template) if single && string_value(lx.text(start)).is_some() => {
            return EnumValue::Text(lx.text(start).to_string());
        }
        Some(TokenKind::Number) if single => {
            if let Some(n) = integer_literal(lx.text(start)) {
                return EnumValue::Number(n);
            }
        }
        Some(TokenKind::Ident) if single => {
            if let Some(value) = seen.get(lx.text(start)) {
                return value.clone();
            }
        }
        Some(TokenKind::Punct)
            if end == start + 2
                && lx.is_punct(start, "-")
                && lx.kind(start + 1) == Some(TokenKind::Number) =>
        {
            if let Some(n) = integer_literal(lx.text(start + 1)).and_then(i64::checked_neg) {
                return EnumValue::Number(n);
            }
        }
        _ => {}
    }
    EnumValue::Computed(strip_types(lx.slice(start, end - 1)).trim().to_string())
}

/// Parses a decimal, hex, octal or binary integer literal.
fn integer_literal(text: &str) -> Option<i64> {
    let digits = text.replace('_', "");
    let (body, radix) = match digits.get(..2) {
        Some("0x" | "0X") => (&digits[2..], 16),
        Some("0o" | "0O") => (&digits[2..], 8),
        Some("0b" | "0B") => (&digits[2..], 2),
        _ => (digits.as_str(), 10),
    };
    i64::from_str_radix(body, radix).ok()
}

/// Returns `true` if the `(` at `open` starts a parameter list rather than
/// a call or grouping.
fn is_param_list(lx: &Lexed<'_>, open: usize) -> bool {
    let Some(close) = lx.matching(open) else {
        return false;
    };
    if lx.is_punct(close + 1, "=>") {
        return true;
    }
    // `(x): T => ...`
    if lx.is_punct(close + 1, ":") {
        let last = type_end(lx, close + 2, &["=>", ";", ","], true);
        if lx.is_punct(last + 1, "=>") {
            return true;
        }
    }
    if open == 0 {
        return false;
    }

    let mut p = open - 1;
    if lx.is_punct(p, ">") {
        match generic_open(lx, p) {
            Some(lt) if lt > 0 => p = lt - 1,
            _ => return false,
        }
    }

    if lx.is_ident(p, "function") || lx.is_ident(p, "catch") {
        return true;
    }
    let Some(name) = lx.ident(p) else {
        return false;
    };
    if p > 0 && (lx.is_ident(p - 1, "function") || lx.is_punct(p - 1, "*")) {
        return true;
    }
    if is_keyword(name) && name != "constructor" {
        return false;
    }

    let head_position = p == 0
        || lx.newline_before(p)
        || ["{", "}", ";", ","].iter().any(|s| lx.is_punct(p - 1, s))
        || lx.ident(p - 1).is_some_and(|w| METHOD_PREFIXES.contains(&w));
    if !head_position {
        return false;
    }

    if lx.is_punct(close + 1, "{") {
        return true;
    }
    if lx.is_punct(close + 1, ":") {
        let last = type_end(lx, close + 2, &["{", ";", ",", "=>", "="], false);
        return lx.is_punct(last + 1, "{");
    }
    false
}

/// Last token index of a type expression starting at `start`.
///
/// Stops before any of `stops` at angle depth zero, before an unmatched
/// closing bracket and, when `newline_stops` is set, before a line break
/// that does not continue the type. Returns `start - 1` if the type is
/// empty.
fn type_end(lx: &Lexed<'_>, start: usize, stops: &[&str], newline_stops: bool) -> usize {
    let mut angle = 0usize;
    let mut last = start.saturating_sub(1);
    let mut j = start;

    while j < lx.len() {
        let is_punct = lx.kind(j) == Some(TokenKind::Punct);
        let text = lx.text(j);

        if angle == 0 {
            let continues = (is_punct && matches!(text, "|" | "&" | "."))
                || lx.is_punct(last, "|")
                || lx.is_punct(last, "&");
            if newline_stops && j > start && lx.newline_before(j) && !continues {
                break;
            }
            if is_punct && (stops.contains(&text) || text == ">") {
                break;
            }
        }
        if is_punct && matches!(text, ")" | "]" | "}") {
            break;
        }
        if lx.is_opener(j) {
            let Some(close) = lx.matching(j) else {
                break;
            };
            last = close;
            j = close + 1;
            continue;
        }
        if is_punct && text == "<" {
            angle += 1;
        } else if is_punct && text == ">" {
            angle -= 1;
        }
        last = j;
        j += 1;
    }
    last
}

/// Index of the `>` closing a generic argument list opened at `open`.
fn generic_close(lx: &Lexed<'_>, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut j = open;
    while j < lx.len() {
        match lx.kind(j)? {
            TokenKind::Punct => match lx.text(j) {
                "<" => depth += 1,
                ">" => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(j);
                    }
                }
                "(" | "[" | "{" => j = lx.matching(j)?,
                "," | "." | "|" | "&" | "?" | ":" | "=" | "=>" | "..." => {}
                _ => return None,
            },
            TokenKind::Ident | TokenKind::Str | TokenKind::Number => {}
            TokenKind::Template | TokenKind::Regex => return None,
        }
        j += 1;
    }
    None
}

/// Index of the `<` opening the generic list that ends at `close`.
fn generic_open(lx: &Lexed<'_>, close: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut j = close;
    loop {
        if lx.is_punct(j, ">") {
            depth += 1;
        } else if lx.is_punct(j, "<") {
            depth -= 1;
            if depth == 0 {
                return Some(j);
            }
        } else if lx.is_punct(j, ";") || lx.is_punct(j, "{") || lx.is_punct(j, "}") {
            return None;
        }
        j = j.checked_sub(1)?;
    }
}

fn starts_type(lx: &Lexed<'_>, i: usize) -> bool {
    matches!(
        lx.kind(i),
        Some(TokenKind::Ident | TokenKind::Str | TokenKind::Number)
    ) || lx.is_opener(i)
}

fn is_member_name_start(lx: &Lexed<'_>, i: usize) -> bool {
    matches!(
        lx.kind(i),
        Some(TokenKind::Ident | TokenKind::Str | TokenKind::Number)
    ) || lx.is_punct(i, "[")
        || lx.is_punct(i, "#")
        || lx.is_punct(i, "*")
}

fn at_statement_start(lx: &Lexed<'_>, i: usize) -> bool {
    i == 0
        || lx.newline_before(i)
        || lx.is_punct(i - 1, "{")
        || lx.is_punct(i - 1, "}")
        || lx.is_punct(i - 1, ";")
}

fn apply(src: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|e| (e.start, e.end));
    let mut out = String::with_capacity(src.len());
    let mut cursor = 0;
    for edit in edits {
        if edit.start < cursor {
            // Inside an earlier cut; insertions there are dropped too.
            cursor = cursor.max(edit.end);
            continue;
        }
        out.push_str(&src[cursor..edit.start]);
        out.push_str(&edit.text);
        cursor = cursor.max(edit.end);
    }
    out.push_str(&src[cursor..]);
    out
}
