//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tollgate_client::HttpMethod;

use crate::output::OutputFormat;

/// Tollgate CLI.
#[derive(Parser, Debug)]
#[command(name = "tollgate")]
#[command(author = "Tollgate Contributors")]
#[command(version)]
#[command(about = "Call pay-per-use APIs under a spending budget")]
#[command(
    long_about = "Tollgate calls marketplace APIs, pays x402 payment requests through a configured signer, \
and refuses any payment that would break the per-call or daily budget.\n\nRun 'tollgate self-test' to check your setup."
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "TOLLGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format (human or json).
    #[arg(short, long, global = true, default_value = "human")]
    pub format: OutputFormatArg,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Output format argument for clap.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormatArg {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

/// CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Call an API endpoint, paying for it if it asks.
    ///
    /// The endpoint may be a link path (`joe/weather`), a path under the
    /// link prefix (`/api/link/joe/weather`) or a full URL.
    Call {
        /// Endpoint to call.
        endpoint: String,

        /// HTTP method.
        #[arg(short = 'X', long, default_value = "get", ignore_case = true)]
        method: MethodArg,

        /// JSON request body.
        #[arg(short = 'd', long = "data")]
        data: Option<String>,

        /// Extra request header, as 'Name: value'. May be repeated.
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,
    },

    /// Show today's spend against the budget.
    Budget,

    /// Check configuration, wallets and API reachability.
    SelfTest {
        /// Skip the reachability request.
        #[arg(long)]
        no_network: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

/// HTTP method argument.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum MethodArg {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl From<MethodArg> for HttpMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Get => HttpMethod::Get,
            MethodArg::Post => HttpMethod::Post,
            MethodArg::Put => HttpMethod::Put,
            MethodArg::Delete => HttpMethod::Delete,
            MethodArg::Patch => HttpMethod::Patch,
        }
    }
}

/// Shell for completions.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}

/// Parse a `Name: value` header.
fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("header '{}' must look like 'Name: value'", s))?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(format!("invalid header name in '{}'", s));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
