//! Command implementations for the skillc CLI.
//!
//! Each command module runs one subcommand and prints its result through
//! [`crate::formatters::format_output`].

pub mod compile;
pub mod completions;
pub mod init;
pub mod tools;
