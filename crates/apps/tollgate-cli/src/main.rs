//! Tollgate CLI binary entry point.

use clap::Parser;
use colored::Colorize;
use tollgate_client::CallEnvelope;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tollgate_cli::{
    cli::{Cli, Commands},
    commands,
    config::{default_config_path, CliConfig},
    error::{CliError, CliResult},
    output::OutputFormat,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging based on --verbose flag or RUST_LOG env var
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if cli.verbose || has_rust_log {
        let mut filter = EnvFilter::from_default_env();
        if cli.verbose {
            if let Ok(directive) = "tollgate=debug".parse() {
                filter = filter.add_directive(directive);
            }
        }
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    let format: OutputFormat = cli.format.into();

    // Run the command
    if let Err(e) = run(cli).await {
        print_error(&e, format);
        std::process::exit(e.exit_code());
    }
}

/// Print a user-friendly error message with error code and recovery hint.
///
/// In JSON mode a failed call still prints its envelope on stdout.
fn print_error(e: &CliError, format: OutputFormat) {
    if let (OutputFormat::Json, CliError::Client(client)) = (format, e) {
        println!("{}", CallEnvelope::from(client).to_json_pretty());
    }

    eprintln!(
        "{} [{}]: {}",
        "Error".red().bold(),
        e.error_code().yellow(),
        e
    );

    if let Some(suggestion) = e.suggestion() {
        eprintln!("{}: {}", "Hint".cyan(), suggestion);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    // Load configuration; each command decides how a bad config is reported
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = CliConfig::load(&config_path);

    // Get output format
    let format: OutputFormat = cli.format.into();

    // Dispatch command
    let output = match cli.command {
        Commands::Call {
            endpoint,
            method,
            data,
            headers,
        } => {
            commands::call(
                &config?,
                format,
                &endpoint,
                method.into(),
                data.as_deref(),
                headers,
            )
            .await?
        }

        Commands::Budget => commands::budget(&config?, format)?,

        Commands::SelfTest { no_network } => {
            let config = config.map_err(|e| CliError::SelfTest(e.to_string()))?;
            commands::self_test(
                &config,
                &config_path,
                format,
                no_network,
                &mut std::io::stderr(),
            )
            .await?
        }

        Commands::Completions { shell } => commands::completions(shell)?,
    };

    // Print output
    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(())
}
