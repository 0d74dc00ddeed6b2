mod commands;
mod helpers;

use clap::Parser;

pub fn run_from_env() -> i32 {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();
    match run(args) {
        Ok(code) => code,
        Err(CliError::Usage(message)) => {
            eprintln!("{message}");
            2
        }
        Err(error) => {
            eprintln!("error: {error}");
            1
        }
    }
}

fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{err}");
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(name = "steinhardt-rs", about = "Steinhardt order-parameter analysis")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Compute per-particle order parameters for a snapshot
    Compute(commands::ComputeArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Compute(args) => commands::run_compute_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(#[from] steinhardt_core::OrderError),
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}
