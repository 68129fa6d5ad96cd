//! skillc CLI library.
//!
//! Exposes argument parsing, command handlers and output formatters so they
//! can be exercised without spawning the binary.

#![allow(clippy::format_push_string)]
#![allow(clippy::unused_async)]
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod commands;
pub mod formatters;
pub mod runner;
