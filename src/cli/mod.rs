//! Command-line interface for seo-forge.
//!
//! Provides the `run` pipeline command and the single-sitemap `classify`
//! command.

mod commands;

pub use commands::{parse_cli, run_with_cli, Cli};
