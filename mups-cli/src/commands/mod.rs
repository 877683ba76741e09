//! Subcommand implementations.

pub mod config;
pub mod filename;
pub mod info;
pub mod validate;
