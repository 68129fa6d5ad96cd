//! Structural scanning of TypeScript sources.
//!
//! The compiler never builds a full syntax tree. Instead it tokenizes each
//! file once ([`Lexed`]), records top-level declarations and imports
//! ([`ModuleScan`]), and removes type-only syntax from emitted fragments
//! ([`strip_types`]).

mod lexer;
mod module;
mod strip;

pub use lexer::{KEYWORDS, Lexed, Token, TokenKind, is_keyword, string_value};
pub use module::{
    DeclKind, Declaration, EnumMember, ImportBinding, ImportDecl, ModuleScan, entries,
    enum_members, enum_references, statement_end,
};
pub use strip::{remove_base_class, strip_types};
