//! Command-line interface for Tollgate.
//!
//! This crate provides the `tollgate` binary. It includes commands for:
//!
//! - **Calls**: Call an endpoint, paying for it within the budget
//! - **Budget**: Show today's spend and remaining allowance
//! - **Diagnostics**: Check configuration and API reachability
//!
//! # Quick Start
//!
//! ```bash
//! # Check the setup
//! tollgate self-test
//!
//! # Call an API
//! tollgate call joe/weather -X POST -d '{"city": "Oslo"}'
//!
//! # See what was spent today
//! tollgate budget
//! ```
//!
//! # Output Formats
//!
//! All commands support `--format` for output control:
//!
//! - `human` (default): Human-readable with colors
//! - `json`: Machine-readable JSON (the call envelope for `call`)
//!
//! # Configuration
//!
//! Configuration is loaded from `config.toml` in the platform config
//! directory. Override with `--config` or `TOLLGATE_CONFIG`; individual
//! settings can be overridden with `TOLLGATE_*` variables.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

// Re-export main types
pub use cli::{Cli, Commands, CompletionShell, MethodArg, OutputFormatArg};
pub use config::CliConfig;
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, Render};
