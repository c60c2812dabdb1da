//! Command-line interface for streetwise street extraction.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};
use log::{LevelFilter, debug};

mod boundary;
mod error;
mod fetch;

pub use error::CliError;

use boundary::{BoundaryArgs, run_boundary};
use fetch::{FetchArgs, run_fetch};

const ARG_REGION: &str = "region";
const ARG_CITY: &str = "city";
const ARG_STATE: &str = "state";
const ARG_COUNTRY: &str = "country";
const ARG_OUTPUT_DIR: &str = "output-dir";
const ARG_BOUNDARY_DIR: &str = "boundary-dir";
const ARG_OVERPASS_URL: &str = "overpass-url";
const ARG_OUTPUT: &str = "output";
const ENV_FETCH_STATE: &str = "STREETWISE_CMDS_FETCH_STATE";
const ENV_BOUNDARY_CITY: &str = "STREETWISE_CMDS_BOUNDARY_CITY";
const ENV_BOUNDARY_STATE: &str = "STREETWISE_CMDS_BOUNDARY_STATE";

const DEFAULT_COUNTRY: &str = "United States";
const DEFAULT_OUTPUT_DIR: &str = "data";
const DEFAULT_BOUNDARY_DIR: &str = "boundary";

/// Run the streetwise CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid or the
/// selected command fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    init_logging(cli.verbose);
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &mut stdout)
}

fn dispatch(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Fetch(args) => run_fetch(args, writer),
        Command::Boundary(args) => run_boundary(args, writer),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let result = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level.as_str()),
    )
    .try_init();
    if let Err(err) = result {
        debug!("logger already installed: {err}");
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "streetwise",
    about = "Extract named city streets from OpenStreetMap",
    version
)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract the streets of a catalogue region or a city and save them.
    Fetch(FetchArgs),
    /// Fetch a city boundary and store it in the boundary directory.
    Boundary(BoundaryArgs),
}

#[cfg(test)]
mod tests;
