//! Argument parsing tests for the top-level command.

use super::*;
use camino::Utf8PathBuf;
use rstest::rstest;

#[rstest]
fn parses_fetch_region_with_global_verbose_flag() {
    let cli = Cli::try_parse_from(["streetwise", "fetch", "--region", "san-francisco", "-v"])
        .expect("fetch arguments parse");
    assert!(cli.verbose);
    match cli.command {
        Command::Fetch(args) => {
            assert_eq!(args.region.as_deref(), Some("san-francisco"));
            assert!(args.city.is_none());
        }
        Command::Boundary(_) => panic!("expected fetch command"),
    }
}

#[rstest]
fn parses_boundary_city_as_positional_argument() {
    let cli = Cli::try_parse_from([
        "streetwise",
        "boundary",
        "San Francisco",
        "--state",
        "CA",
        "--boundary-dir",
        "cache",
    ])
    .expect("boundary arguments parse");
    assert!(!cli.verbose);
    match cli.command {
        Command::Boundary(args) => {
            assert_eq!(args.city.as_deref(), Some("San Francisco"));
            assert_eq!(args.state.as_deref(), Some("CA"));
            assert_eq!(args.boundary_dir, Some(Utf8PathBuf::from("cache")));
        }
        Command::Fetch(_) => panic!("expected boundary command"),
    }
}

#[rstest]
fn missing_subcommand_is_an_argument_error() {
    let err = Cli::try_parse_from(["streetwise"]).expect_err("subcommand required");
    let mapped = CliError::from(err);
    assert!(matches!(mapped, CliError::ArgumentParsing(_)));
}

#[rstest]
fn unknown_flags_are_rejected() {
    let result = Cli::try_parse_from(["streetwise", "fetch", "--bbox", "1,2,3,4"]);
    assert!(result.is_err());
}
