//! Error types emitted by the streetwise CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use thiserror::Error;
use streetwise_core::{BoundaryError, ExtractError};
use streetwise_data::{ClientBuildError, DatasetError};

/// Errors emitted by the streetwise CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name without dashes.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// Neither a region nor a city was given.
    #[error("specify either --region or --city")]
    MissingTarget,
    /// Both a region and a city were given.
    #[error("--region and --city cannot be combined")]
    ConflictingTargets,
    /// Constructing an HTTP adapter failed.
    #[error("failed to build {service} client for {url:?}: {source}")]
    BuildClient {
        /// Which adapter was being built.
        service: &'static str,
        /// Endpoint it would have used.
        url: String,
        /// Underlying failure.
        #[source]
        source: ClientBuildError,
    },
    /// The extraction run failed.
    #[error("street extraction failed: {0}")]
    Extract(#[source] Box<ExtractError>),
    /// The run produced no streets.
    #[error("no street data was fetched for {target}")]
    NoStreets {
        /// Region key or dataset name.
        target: String,
    },
    /// Writing the dataset failed.
    #[error("failed to write street dataset: {0}")]
    WriteDataset(#[from] DatasetError),
    /// The boundary could not be fetched.
    #[error("could not fetch boundary for {city}, {state}: {source}")]
    FetchBoundary {
        /// Requested city.
        city: String,
        /// Requested state.
        state: String,
        /// Underlying failure.
        #[source]
        source: BoundaryError,
    },
    /// The boundary could not be written to the cache.
    #[error("failed to save boundary: {0}")]
    SaveBoundary(#[source] BoundaryError),
    /// Writing the report to the output stream failed.
    #[error("failed to write report: {0}")]
    WriteOutput(#[source] std::io::Error),
}

impl From<ExtractError> for CliError {
    fn from(value: ExtractError) -> Self {
        Self::Extract(Box::new(value))
    }
}
