//! This module defines the command-line interface and the report output formats.

/// Argument parsing and command handling.
pub mod commands;
/// Table and JSON rendering of shard rows.
pub mod formatters;

// Re-export the main handler and the argument struct for the binary
pub use commands::{handle_command, normalize_legacy_flags, run_report, CliArgs};
