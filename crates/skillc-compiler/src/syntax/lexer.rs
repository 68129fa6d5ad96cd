//! Tokenizer for TypeScript source.
//!
//! Produces a flat token list with byte spans. Comments and whitespace are
//! dropped; every token remembers whether a line break preceded it so the
//! module scanner can approximate automatic semicolon insertion.
//!
//! Template literals are split into chunks at `${` and `}` so interpolated
//! code is tokenized like any other code and never confuses bracket
//! matching.

use std::collections::HashSet;

/// Token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword
    Ident,
    /// Numeric literal
    Number,
    /// Single- or double-quoted string literal
    Str,
    /// Template literal chunk (from a backtick or `}` up to `${` or a backtick)
    Template,
    /// Regular expression literal
    Regex,
    /// Operator or bracket
    Punct,
}

/// One token with its byte span in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// Token category
    pub kind: TokenKind,
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
    /// Whether a line break occurs between the previous token and this one
    pub newline_before: bool,
}

/// Multi-character punctuators, longest first.
const PUNCTUATORS: &[&str] = &[
    "===", "!==", "...", "**=", "&&=", "||=", "??=", "=>", "==", "!=", "<=", ">=", "&&", "||",
    "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "**",
];

/// Keywords after which a `/` starts a regular expression.
const REGEX_PREFIX_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "instanceof",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "case",
    "do",
    "else",
    "yield",
    "await",
];

/// Reserved words that never name a top-level declaration.
pub const KEYWORDS: &[&str] = &[
    "async",
    "await",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "import",
    "in",
    "instanceof",
    "let",
    "new",
    "null",
    "of",
    "return",
    "static",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    "yield",
];

/// Returns `true` if `word` is a reserved word.
#[must_use]
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

const fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

const fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token>,
    newline: bool,
    brace_depth: usize,
    templates: Vec<usize>,
}

impl<'a> Lexer<'a> {
    const fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
            newline: false,
            brace_depth: 0,
            templates: Vec::new(),
        }
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        let end = self.pos.min(self.bytes.len());
        self.tokens.push(Token {
            kind,
            start,
            end,
            newline_before: self.newline,
        });
        self.newline = false;
    }

    fn run(mut self) -> Vec<Token> {
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            match b {
                b'\n' => {
                    self.newline = true;
                    self.pos += 1;
                }
                b' ' | b'\t' | b'\r' | 0x0b | 0x0c => self.pos += 1,
                b'/' if self.peek(1) == Some(b'/') => self.line_comment(),
                b'/' if self.peek(1) == Some(b'*') => self.block_comment(),
                b'\'' | b'"' => self.string(b),
                b'`' => {
                    let start = self.pos;
                    self.pos += 1;
                    self.template_chunk(start);
                }
                b'}' if self.templates.last() == Some(&self.brace_depth) => {
                    self.templates.pop();
                    let start = self.pos;
                    self.pos += 1;
                    self.template_chunk(start);
                }
                b'/' if self.regex_allowed() => self.regex(),
                b'0'..=b'9' => self.number(),
                b'.' if self.peek(1).is_some_and(|c| c.is_ascii_digit()) => self.number(),
                _ if is_ident_start(b) => self.ident(),
                _ => self.punct(),
            }
        }
        self.tokens
    }

    fn line_comment(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
            self.pos += 1;
        }
    }

    fn block_comment(&mut self) {
        self.pos += 2;
        while self.pos < self.bytes.len() {
            if self.bytes[self.pos] == b'*' && self.peek(1) == Some(b'/') {
                self.pos += 2;
                return;
            }
            if self.bytes[self.pos] == b'\n' {
                self.newline = true;
            }
            self.pos += 1;
        }
    }

    fn string(&mut self, quote: u8) {
        let start = self.pos;
        self.pos += 1;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\\' => self.pos += 2,
                b'\n' => break,
                c if c == quote => {
                    self.pos += 1;
                    break;
                }
                _ => self.pos += 1,
            }
        }
        self.push(TokenKind::Str, start);
    }

    fn template_chunk(&mut self, start: usize) {
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\\' => self.pos += 2,
                b'`' => {
                    self.pos += 1;
                    self.push(TokenKind::Template, start);
                    return;
                }
                b'$' if self.peek(1) == Some(b'{') => {
                    self.pos += 2;
                    self.push(TokenKind::Template, start);
                    self.templates.push(self.brace_depth);
                    return;
                }
                _ => self.pos += 1,
            }
        }
        self.push(TokenKind::Template, start);
    }

    fn regex_allowed(&self) -> bool {
        let Some(last) = self.tokens.last() else {
            return true;
        };
        let text = &self.src[last.start..last.end];
        match last.kind {
            TokenKind::Punct => !matches!(text, ")" | "]" | "}"),
            TokenKind::Ident => REGEX_PREFIX_KEYWORDS.contains(&text),
            TokenKind::Template => text.ends_with("${"),
            TokenKind::Number | TokenKind::Str | TokenKind::Regex => false,
        }
    }

    fn regex(&mut self) {
        let start = self.pos;
        self.pos += 1;
        let mut in_class = false;
        loop {
            match self.bytes.get(self.pos) {
                None | Some(b'\n') => {
                    // Not a regex after all; treat the slash as division.
                    self.pos = start;
                    self.punct();
                    return;
                }
                Some(b'\\') => self.pos += 2,
                Some(b'[') => {
                    in_class = true;
                    self.pos += 1;
                }
                Some(b']') => {
                    in_class = false;
                    self.pos += 1;
                }
                Some(b'/') if !in_class => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        while self.pos < self.bytes.len() && is_ident_continue(self.bytes[self.pos]) {
            self.pos += 1;
        }
        self.push(TokenKind::Regex, start);
    }

    fn number(&mut self) {
        let start = self.pos;
        while self.pos < self.bytes.len()
            && (is_ident_continue(self.bytes[self.pos]) || self.bytes[self.pos] == b'.')
        {
            self.pos += 1;
        }
        self.push(TokenKind::Number, start);
    }

    fn ident(&mut self) {
        let start = self.pos;
        while self.pos < self.bytes.len() && is_ident_continue(self.bytes[self.pos]) {
            self.pos += 1;
        }
        self.push(TokenKind::Ident, start);
    }

    fn punct(&mut self) {
        let start = self.pos;
        let rest = &self.bytes[self.pos..];
        let len = PUNCTUATORS
            .iter()
            .find(|p| {
                rest.starts_with(p.as_bytes())
                    && !(**p == "?." && rest.get(2).is_some_and(u8::is_ascii_digit))
            })
            .map_or(1, |p| p.len());

        match self.bytes[self.pos] {
            b'{' => self.brace_depth += 1,
            b'}' => self.brace_depth = self.brace_depth.saturating_sub(1),
            _ => {}
        }
        self.pos += len;
        self.push(TokenKind::Punct, start);
    }
}

/// A tokenized source with bracket matching.
#[derive(Debug, Clone)]
pub struct Lexed<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    matching: Vec<Option<usize>>,
    parents: Vec<Option<usize>>,
}

impl<'a> Lexed<'a> {
    /// Tokenizes `src` and pairs up `()`, `[]` and `{}`.
    ///
    /// # Examples
    ///
    /// ```
    /// use skillc_compiler::syntax::Lexed;
    ///
    /// let lexed = Lexed::new("class A { m() { return '}'; } }");
    /// let open = lexed.position_of_punct(0, "{").unwrap();
    /// let close = lexed.matching(open).unwrap();
    /// assert_eq!(close, lexed.len() - 1);
    /// ```
    #[must_use]
    pub fn new(src: &'a str) -> Self {
        let tokens = Lexer::new(src).run();
        let mut matching = vec![None; tokens.len()];
        let mut parents = vec![None; tokens.len()];
        let mut stack: Vec<usize> = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            parents[i] = stack.last().copied();
            if token.kind != TokenKind::Punct {
                continue;
            }
            let text = &src[token.start..token.end];
            match text {
                "(" | "[" | "{" => stack.push(i),
                ")" | "]" | "}" => {
                    let opener = match text {
                        ")" => "(",
                        "]" => "[",
                        _ => "{",
                    };
                    if let Some(pos) = stack
                        .iter()
                        .rposition(|&o| &src[tokens[o].start..tokens[o].end] == opener)
                    {
                        let open = stack[pos];
                        matching[open] = Some(i);
                        matching[i] = Some(open);
                        parents[i] = parents[open];
                        stack.truncate(pos);
                    }
                }
                _ => {}
            }
        }

        Self {
            src,
            tokens,
            matching,
            parents,
        }
    }

    /// The source text.
    #[must_use]
    pub const fn src(&self) -> &'a str {
        self.src
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if the source has no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token at index `i`.
    #[must_use]
    pub fn token(&self, i: usize) -> Option<&Token> {
        self.tokens.get(i)
    }

    /// Text of token `i`, or `""` when out of range.
    #[must_use]
    pub fn text(&self, i: usize) -> &'a str {
        self.tokens
            .get(i)
            .map_or("", |t| &self.src[t.start..t.end])
    }

    /// Kind of token `i`.
    #[must_use]
    pub fn kind(&self, i: usize) -> Option<TokenKind> {
        self.tokens.get(i).map(|t| t.kind)
    }

    /// Returns `true` if token `i` is the punctuator `p`.
    #[must_use]
    pub fn is_punct(&self, i: usize, p: &str) -> bool {
        self.kind(i) == Some(TokenKind::Punct) && self.text(i) == p
    }

    /// Returns `true` if token `i` is the identifier `name`.
    #[must_use]
    pub fn is_ident(&self, i: usize, name: &str) -> bool {
        self.kind(i) == Some(TokenKind::Ident) && self.text(i) == name
    }

    /// Identifier text of token `i`, if it is an identifier.
    #[must_use]
    pub fn ident(&self, i: usize) -> Option<&'a str> {
        (self.kind(i) == Some(TokenKind::Ident)).then(|| self.text(i))
    }

    /// Returns `true` if a line break precedes token `i`.
    #[must_use]
    pub fn newline_before(&self, i: usize) -> bool {
        self.tokens.get(i).is_some_and(|t| t.newline_before)
    }

    /// Index of the bracket paired with token `i`.
    #[must_use]
    pub fn matching(&self, i: usize) -> Option<usize> {
        self.matching.get(i).copied().flatten()
    }

    /// Index of the innermost opening bracket enclosing token `i`.
    #[must_use]
    pub fn parent(&self, i: usize) -> Option<usize> {
        self.parents.get(i).copied().flatten()
    }

    /// Returns `true` if token `i` opens a bracket group.
    #[must_use]
    pub fn is_opener(&self, i: usize) -> bool {
        self.kind(i) == Some(TokenKind::Punct) && matches!(self.text(i), "(" | "[" | "{")
    }

    /// First index at or after `from` holding punctuator `p` at the same
    /// nesting level, skipping over nested groups.
    #[must_use]
    pub fn position_of_punct(&self, from: usize, p: &str) -> Option<usize> {
        let mut i = from;
        while i < self.len() {
            if self.is_punct(i, p) {
                return Some(i);
            }
            if self.is_opener(i) {
                i = self.matching(i)? + 1;
                continue;
            }
            if self.kind(i) == Some(TokenKind::Punct) && matches!(self.text(i), ")" | "]" | "}") {
                return None;
            }
            i += 1;
        }
        None
    }

    /// Source text spanning tokens `first..=last`.
    #[must_use]
    pub fn slice(&self, first: usize, last: usize) -> &'a str {
        match (self.tokens.get(first), self.tokens.get(last)) {
            (Some(a), Some(b)) if a.start <= b.end => &self.src[a.start..b.end],
            _ => "",
        }
    }

    /// Source text strictly between the brackets of group `open`.
    #[must_use]
    pub fn inner(&self, open: usize) -> Option<&'a str> {
        let close = self.matching(open)?;
        Some(&self.src[self.tokens[open].end..self.tokens[close].start])
    }

    /// Identifiers in tokens `range` that are not property names.
    ///
    /// Identifiers following `.` or `?.` are member accesses and are
    /// skipped, as are reserved words. Order of first occurrence is kept.
    #[must_use]
    pub fn references(&self, range: std::ops::Range<usize>) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for i in range {
            let Some(name) = self.ident(i) else {
                continue;
            };
            if i > 0 && (self.is_punct(i - 1, ".") || self.is_punct(i - 1, "?.")) {
                continue;
            }
            if is_keyword(name) {
                continue;
            }
            if seen.insert(name) {
                out.push(name);
            }
        }
        out
    }
}

/// Decodes a string literal or an interpolation-free template literal.
///
/// Returns `None` for template literals containing `${`.
///
/// # Examples
///
/// ```
/// use skillc_compiler::syntax::string_value;
///
/// assert_eq!(string_value("'it\\'s'").as_deref(), Some("it's"));
/// assert_eq!(string_value("`plain`").as_deref(), Some("plain"));
/// assert_eq!(string_value("`a ${b}`"), None);
/// ```
#[must_use]
pub fn string_value(literal: &str) -> Option<String> {
    let quote = literal.chars().next()?;
    if !matches!(quote, '\'' | '"' | '`') || literal.len() < 2 || !literal.ends_with(quote) {
        return None;
    }
    let body = &literal[1..literal.len() - 1];
    if quote == '`' && body.contains("${") {
        return None;
    }

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\n') | None => {}
            Some(other) => out.push(other),
        }
    }
    Some(out)
}
