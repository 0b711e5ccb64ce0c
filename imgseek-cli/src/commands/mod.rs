//! Subcommand implementations.

pub mod history;
pub mod search;
pub mod session;
pub mod shell;
