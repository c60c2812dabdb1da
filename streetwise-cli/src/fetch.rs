//! Fetch command: extract streets and write the dataset.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use log::{info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use streetwise_core::{
    BoundarySource, ExtractionReport, FilterOutcome, RoadNetworkSource, StreetExtractor,
};
use streetwise_data::boundary::file_stem;
use streetwise_data::{
    BoundaryCache, CachedBoundarySource, HttpBoundaryRepository, HttpOverpassSource,
    OverpassSourceConfig, StreetDataset, StreetSummary, write_dataset,
};

use crate::{
    ARG_BOUNDARY_DIR, ARG_CITY, ARG_COUNTRY, ARG_OUTPUT_DIR, ARG_OVERPASS_URL, ARG_REGION,
    ARG_STATE, CliError, DEFAULT_BOUNDARY_DIR, DEFAULT_COUNTRY, DEFAULT_OUTPUT_DIR,
    ENV_FETCH_STATE,
};

/// CLI arguments for the `fetch` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Extract the named streets of a catalogue region (by bounding \
                 box) or of a city (by its boundary polygon) and write them to \
                 `{output-dir}/{name}_streets.json`.",
    about = "Extract streets for a region or city"
)]
#[ortho_config(prefix = "STREETWISE")]
pub(crate) struct FetchArgs {
    /// Catalogue region key (e.g. "san-francisco").
    #[arg(long = ARG_REGION, value_name = "key")]
    #[serde(default)]
    pub(crate) region: Option<String>,
    /// City name (e.g. "San Francisco").
    #[arg(long = ARG_CITY, value_name = "name")]
    #[serde(default)]
    pub(crate) city: Option<String>,
    /// State name or abbreviation; required with --city.
    #[arg(long = ARG_STATE, value_name = "state")]
    #[serde(default)]
    pub(crate) state: Option<String>,
    /// Country name (default: United States).
    #[arg(long = ARG_COUNTRY, value_name = "country")]
    #[serde(default)]
    pub(crate) country: Option<String>,
    /// Directory for dataset files (default: data).
    #[arg(long = ARG_OUTPUT_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) output_dir: Option<Utf8PathBuf>,
    /// Directory for cached boundary files (default: boundary).
    #[arg(long = ARG_BOUNDARY_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) boundary_dir: Option<Utf8PathBuf>,
    /// Overpass interpreter endpoint.
    #[arg(long = ARG_OVERPASS_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) overpass_url: Option<String>,
}

impl FetchArgs {
    pub(crate) fn into_config(self) -> Result<FetchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        FetchConfig::try_from(merged)
    }
}

/// What to extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FetchTarget {
    /// A catalogue region, queried by bounding box.
    Region(String),
    /// A city, queried by its boundary polygon.
    City {
        city: String,
        state: String,
        country: String,
    },
}

impl FetchTarget {
    /// Name of the dataset written for this target.
    pub(crate) fn dataset_name(&self) -> String {
        match self {
            Self::Region(key) => key.clone(),
            Self::City { city, state, .. } => file_stem(city, Some(state)),
        }
    }
}

/// Resolved `fetch` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FetchConfig {
    pub(crate) target: FetchTarget,
    pub(crate) output_dir: Utf8PathBuf,
    pub(crate) boundary_dir: Utf8PathBuf,
    pub(crate) overpass_url: String,
}

impl TryFrom<FetchArgs> for FetchConfig {
    type Error = CliError;

    fn try_from(args: FetchArgs) -> Result<Self, Self::Error> {
        let target = match (args.region, args.city) {
            (Some(_), Some(_)) => return Err(CliError::ConflictingTargets),
            (None, None) => return Err(CliError::MissingTarget),
            (Some(key), None) => FetchTarget::Region(key),
            (None, Some(city)) => FetchTarget::City {
                city,
                state: args.state.ok_or(CliError::MissingArgument {
                    field: ARG_STATE,
                    env: ENV_FETCH_STATE,
                })?,
                country: args
                    .country
                    .unwrap_or_else(|| DEFAULT_COUNTRY.to_owned()),
            },
        };
        Ok(Self {
            target,
            output_dir: args
                .output_dir
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT_DIR)),
            boundary_dir: args
                .boundary_dir
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_BOUNDARY_DIR)),
            overpass_url: args
                .overpass_url
                .unwrap_or_else(|| OverpassSourceConfig::default().url),
        })
    }
}

/// Builds the collaborators for one fetch invocation.
pub(crate) trait SourceFactory {
    fn road_network(
        &self,
        config: &FetchConfig,
    ) -> Result<Box<dyn RoadNetworkSource + '_>, CliError>;

    fn boundaries(&self, config: &FetchConfig) -> Result<Box<dyn BoundarySource + '_>, CliError>;
}

/// Overpass over HTTP plus the cached boundary repository.
pub(crate) struct HttpSourceFactory;

impl SourceFactory for HttpSourceFactory {
    fn road_network(
        &self,
        config: &FetchConfig,
    ) -> Result<Box<dyn RoadNetworkSource + '_>, CliError> {
        let source = HttpOverpassSource::new(config.overpass_url.clone()).map_err(|source| {
            CliError::BuildClient {
                service: "Overpass",
                url: config.overpass_url.clone(),
                source,
            }
        })?;
        Ok(Box::new(source))
    }

    fn boundaries(&self, config: &FetchConfig) -> Result<Box<dyn BoundarySource + '_>, CliError> {
        let repository = HttpBoundaryRepository::new().map_err(|source| CliError::BuildClient {
            service: "boundary repository",
            url: streetwise_data::boundary::DEFAULT_BOUNDARY_BASE_URL.to_owned(),
            source,
        })?;
        let cache = BoundaryCache::new(config.boundary_dir.clone());
        Ok(Box::new(CachedBoundarySource::new(cache, repository)))
    }
}

/// Outcome of a successful fetch.
#[derive(Debug)]
pub(crate) struct FetchOutcome {
    pub(crate) path: Utf8PathBuf,
    pub(crate) summary: StreetSummary,
}

pub(crate) fn run_fetch(args: FetchArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    run_fetch_with(args, &HttpSourceFactory, writer)
}

pub(crate) fn run_fetch_with(
    args: FetchArgs,
    factory: &dyn SourceFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let outcome = execute_fetch(&config, factory)?;
    writeln!(writer, "{}", outcome.summary).map_err(CliError::WriteOutput)?;
    writeln!(writer, "Data saved to {}", outcome.path).map_err(CliError::WriteOutput)?;
    Ok(())
}

pub(crate) fn execute_fetch(
    config: &FetchConfig,
    factory: &dyn SourceFactory,
) -> Result<FetchOutcome, CliError> {
    let source = factory.road_network(config)?;
    let extractor = StreetExtractor::new(source.as_ref());
    let report = match &config.target {
        FetchTarget::Region(key) => {
            info!("Fetching streets for predefined region: {key}");
            extractor.extract_region(key)?
        }
        FetchTarget::City {
            city,
            state,
            country,
        } => {
            info!("Fetching streets for city: {city}, {state}");
            let boundaries = factory.boundaries(config)?;
            extractor.extract_city(&boundaries.as_ref(), city, state, country)?
        }
    };
    log_filter_outcome(&report);

    let name = config.target.dataset_name();
    if report.streets.is_empty() {
        return Err(CliError::NoStreets { target: name });
    }
    let dataset = StreetDataset::from_report(name, report);
    let path = write_dataset(&config.output_dir, &dataset)?;
    let summary = StreetSummary::from_streets(dataset.region.as_str(), &dataset.streets);
    Ok(FetchOutcome { path, summary })
}

fn log_filter_outcome(report: &ExtractionReport) {
    match &report.filter {
        FilterOutcome::Applied { retained, dropped } => {
            info!("Boundary filter kept {retained} streets and dropped {dropped}");
        }
        FilterOutcome::Skipped { reason } => {
            warn!("Boundary filter skipped: {reason}");
        }
        FilterOutcome::NotRequested => info!("No boundary filter for bounding-box extraction"),
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<FetchConfig, CliError> {
    let merged = FetchArgs::merge_from_layers(layers).map_err(CliError::from)?;
    FetchConfig::try_from(merged)
}
