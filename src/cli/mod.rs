//! CLI module for gepetto - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
