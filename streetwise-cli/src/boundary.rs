//! Boundary command: fetch a city boundary and store it for later runs.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use streetwise_core::{Boundary, BoundarySource};
use streetwise_data::{BoundaryCache, HttpBoundaryRepository};

use crate::{
    ARG_BOUNDARY_DIR, ARG_CITY, ARG_COUNTRY, ARG_OUTPUT, ARG_STATE, CliError,
    DEFAULT_BOUNDARY_DIR, DEFAULT_COUNTRY, ENV_BOUNDARY_CITY, ENV_BOUNDARY_STATE,
};

/// CLI arguments for the `boundary` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Download a city boundary from the boundary repository and \
                 save it as `{boundary-dir}/{city}_{state}.geojson`, or under \
                 the name given by --output. Any cached copy is replaced.",
    about = "Fetch and store a city boundary"
)]
#[ortho_config(prefix = "STREETWISE")]
pub(crate) struct BoundaryArgs {
    /// City name.
    #[arg(value_name = "city")]
    #[serde(default)]
    pub(crate) city: Option<String>,
    /// State name or abbreviation.
    #[arg(long = ARG_STATE, value_name = "state")]
    #[serde(default)]
    pub(crate) state: Option<String>,
    /// Country name (default: United States).
    #[arg(long = ARG_COUNTRY, value_name = "country")]
    #[serde(default)]
    pub(crate) country: Option<String>,
    /// Directory for cached boundary files (default: boundary).
    #[arg(long = ARG_BOUNDARY_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) boundary_dir: Option<Utf8PathBuf>,
    /// File name to save under inside the boundary directory.
    #[arg(long = ARG_OUTPUT, value_name = "name")]
    #[serde(default)]
    pub(crate) output: Option<String>,
}

impl BoundaryArgs {
    fn into_config(self) -> Result<BoundaryConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        BoundaryConfig::try_from(merged)
    }
}

/// Resolved `boundary` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BoundaryConfig {
    pub(crate) city: String,
    pub(crate) state: String,
    pub(crate) country: String,
    pub(crate) boundary_dir: Utf8PathBuf,
    /// Overrides the `{city}_{state}` file stem when set.
    pub(crate) output: Option<String>,
}

impl TryFrom<BoundaryArgs> for BoundaryConfig {
    type Error = CliError;

    fn try_from(args: BoundaryArgs) -> Result<Self, Self::Error> {
        let city = args.city.ok_or(CliError::MissingArgument {
            field: ARG_CITY,
            env: ENV_BOUNDARY_CITY,
        })?;
        let state = args.state.ok_or(CliError::MissingArgument {
            field: ARG_STATE,
            env: ENV_BOUNDARY_STATE,
        })?;
        Ok(Self {
            city,
            state,
            country: args
                .country
                .unwrap_or_else(|| DEFAULT_COUNTRY.to_owned()),
            boundary_dir: args
                .boundary_dir
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_BOUNDARY_DIR)),
            output: args.output,
        })
    }
}

pub(crate) fn run_boundary(args: BoundaryArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let repository =
        HttpBoundaryRepository::new().map_err(|source| CliError::BuildClient {
            service: "boundary repository",
            url: streetwise_data::boundary::DEFAULT_BOUNDARY_BASE_URL.to_owned(),
            source,
        })?;
    run_boundary_with(args, &repository, writer)
}

pub(crate) fn run_boundary_with(
    args: BoundaryArgs,
    source: &dyn BoundarySource,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let boundary = source
        .boundary(&config.city, &config.state, &config.country)
        .map_err(|err| CliError::FetchBoundary {
            city: config.city.clone(),
            state: config.state.clone(),
            source: err,
        })?;
    let cache = BoundaryCache::new(config.boundary_dir.clone());
    let saved = match config.output.as_deref() {
        Some(name) => cache.save_as(name, &boundary),
        None => cache.save(&boundary),
    };
    let path = saved.map_err(CliError::SaveBoundary)?;
    info!("Saved boundary for {} to {path}", boundary.name);
    describe_boundary(&boundary, &path, writer).map_err(CliError::WriteOutput)
}

fn describe_boundary(
    boundary: &Boundary,
    path: &Utf8Path,
    writer: &mut dyn Write,
) -> std::io::Result<()> {
    let [south, west, north, east]: [f64; 4] = boundary.bbox.into();
    writeln!(writer, "Boundary: {}", boundary.name)?;
    writeln!(writer, "Geometry: {}", boundary.geometry_kind())?;
    writeln!(writer, "Area: {:.2} km²", boundary.area_km2)?;
    writeln!(
        writer,
        "Bounding box: {south:.4}, {west:.4}, {north:.4}, {east:.4}"
    )?;
    writeln!(writer, "Saved to {path}")
}

#[cfg(test)]
pub(crate) fn boundary_config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<BoundaryConfig, CliError> {
    let merged = BoundaryArgs::merge_from_layers(layers).map_err(CliError::from)?;
    BoundaryConfig::try_from(merged)
}
