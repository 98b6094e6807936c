use super::commands::{build_generator, property_spec};
use super::*;

use std::fs;

use clap::Parser;
use cliquegen_core::{GeneratorError, PropertySpec, PropertyTarget};
use cliquegen_sinks_jsonl::{JsonLinesError, NamingError};
use rstest::rstest;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn parse(args: &[&str]) -> Cli {
    match Cli::try_parse_from(std::iter::once("cliquegen").chain(args.iter().copied())) {
        Ok(cli) => cli,
        Err(err) => panic!("arguments must parse: {err}"),
    }
}

fn run_expecting_error(args: &[&str], panic_msg: &str) -> CliError {
    match run_cli(parse(args)) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}

fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

#[rstest]
#[case::undirected(&["clique", "-s", "5"], 20)]
#[case::directed(&["--directed", "clique", "-s", "5"], 10)]
#[case::single_storage(&["--single-undirected-edge", "clique", "-s", "5"], 10)]
#[case::self_loops(&["--self-loops", "clique", "-s", "5"], 25)]
fn count_only_clique_edges(#[case] args: &[&str], #[case] expected: u64) -> TestResult {
    let mut full = vec!["--count-only", "--workers", "2"];
    full.extend_from_slice(args);
    let summary = run_cli(parse(&full))?;
    assert_eq!(summary.sink, "counting");
    assert_eq!(summary.summary.vertices, 5);
    assert_eq!(summary.summary.edges, expected);
    Ok(())
}

#[rstest]
fn k_partite_without_omission_is_complete_multipartite() -> TestResult {
    let cli = parse(&[
        "--count-only",
        "--directed",
        "k-partite",
        "-k",
        "3",
        "--min-size-part",
        "2",
        "--max-size-part",
        "2",
        "--prob-missing-one-between",
        "0",
    ]);
    let summary = run_cli(cli)?;
    assert_eq!(summary.summary.vertices, 6);
    assert_eq!(summary.summary.partitions, 3);
    assert_eq!(summary.summary.edges, 12);
    Ok(())
}

#[rstest]
fn json_lines_output_uses_naming_flags() -> TestResult {
    let dir = temp_dir();
    let out = dir.path().join("graph");
    let out_arg = out.to_string_lossy().into_owned();
    let cli = parse(&[
        "--output-dir",
        &out_arg,
        "--vertex-collection",
        "people",
        "--edge-collection",
        "knows",
        "--vertex-property-type",
        "list",
        "--vertex-property",
        "a,b,c",
        "--smart-by-part",
        "cliques-graph",
        "--num-cliques",
        "1",
        "--min-size-clique",
        "3",
        "--max-size-clique",
        "3",
    ]);
    let summary = run_cli(cli)?;
    assert_eq!(summary.summary.vertices, 3);

    let vertices = fs::read_to_string(out.join("people.jsonl"))?;
    let first: serde_json::Value = serde_json::from_str(vertices.lines().next().unwrap_or(""))?;
    assert_eq!(first, serde_json::json!({"_key": "0:0", "part": "0", "color": "a"}));

    let edges = fs::read_to_string(out.join("knows.jsonl"))?;
    assert_eq!(edges.lines().count(), 6);
    assert!(edges.contains("\"_from\":\"people/0:0\""));
    Ok(())
}

#[rstest]
fn smart_attribute_clashing_with_vertex_attribute_is_rejected() {
    let dir = temp_dir();
    let out_arg = dir.path().to_string_lossy().into_owned();
    let err = run_expecting_error(
        &[
            "--output-dir",
            &out_arg,
            "--smart-attribute",
            "color",
            "clique",
            "-s",
            "2",
        ],
        "clashing smart attribute must fail",
    );
    assert!(matches!(
        err,
        CliError::Sink(JsonLinesError::Naming(NamingError::SmartAttributeClash { .. }))
    ));
}

#[rstest]
#[case::none_without_values(PropertyKind::None, &[], Some(PropertySpec::None))]
#[case::random(
    PropertyKind::Random,
    &["1", " 2.5"],
    Some(PropertySpec::Random { min: 1.0, max: 2.5 }),
)]
#[case::list(PropertyKind::List, &["x", "y"], Some(PropertySpec::list(["x", "y"])))]
#[case::random_arity(PropertyKind::Random, &["1"], None)]
#[case::random_not_number(PropertyKind::Random, &["1", "ten"], None)]
#[case::empty_list(PropertyKind::List, &[], None)]
#[case::unused_values(PropertyKind::None, &["1"], None)]
fn property_flags_map_to_specs(
    #[case] kind: PropertyKind,
    #[case] raw: &[&str],
    #[case] expected: Option<PropertySpec>,
) {
    let values: Vec<String> = raw.iter().map(|value| (*value).to_owned()).collect();
    let result = property_spec(PropertyTarget::Edge, kind, &values);
    match (result, expected) {
        (Ok(spec), Some(expected)) => assert_eq!(spec, expected),
        (Err(_), None) => {}
        (other, expected) => panic!("expected {expected:?}, got {other:?}"),
    }
}

#[rstest]
fn random_bounds_out_of_order_fail_before_generation() {
    let err = run_expecting_error(
        &[
            "--count-only",
            "--edge-property-type",
            "random",
            "--edge-property",
            "5,1",
            "clique",
            "-s",
            "3",
        ],
        "min > max must fail",
    );
    assert!(matches!(
        err,
        CliError::Generator(GeneratorError::InvalidRandomBounds { .. })
    ));
}

#[rstest]
#[case::zero_bulk(&["--count-only", "--bulk-size", "0", "clique"], "GENERATOR_INVALID_BULK_SIZE")]
#[case::zero_workers(&["--count-only", "--workers", "0", "clique"], "GENERATOR_INVALID_WORKER_COUNT")]
#[case::bad_probability(
    &["--count-only", "clique", "--prob-missing", "1.5"],
    "GENERATOR_INVALID_PROBABILITY",
)]
#[case::empty_size_range(
    &["--count-only", "k-partite", "-k", "2", "--min-size-part", "4", "--max-size-part", "3"],
    "GENERATOR_INVALID_SIZE_RANGE",
)]
#[case::short_edge_list(
    &["--count-only", "--edge-property-type", "list", "--edge-property", "1,2,3", "clique", "-s", "2"],
    "GENERATOR_PROPERTY_LIST_TOO_SHORT",
)]
fn generator_errors_keep_their_codes(#[case] args: &[&str], #[case] code: &str) {
    let err = run_expecting_error(args, "invalid configuration must fail");
    match err {
        CliError::Generator(core) => assert_eq!(core.code().as_str(), code),
        other => panic!("expected generator error, got {other:?}"),
    }
}

#[rstest]
fn build_generator_applies_generation_flags() -> TestResult {
    let cli = parse(&[
        "--count-only",
        "--bulk-size",
        "7",
        "--workers",
        "3",
        "--seed",
        "42",
        "clique",
    ]);
    let generator = build_generator(&cli.generation)?;
    assert_eq!(generator.bulk_size().get(), 7);
    assert_eq!(generator.workers().get(), 3);
    assert_eq!(generator.seed(), 42);
    Ok(())
}

#[rstest]
#[case::no_output(&["clique"])]
#[case::both_outputs(&["--count-only", "--output-dir", "out", "clique"])]
#[case::both_smart_modes(&["--count-only", "--smart-attribute", "s", "--smart-by-part", "clique"])]
#[case::unknown_property_type(&["--count-only", "--vertex-property-type", "fancy", "clique"])]
#[case::missing_clique_count(&["--count-only", "cliques-graph", "--min-size-clique", "1", "--max-size-clique", "2"])]
fn clap_rejects_inconsistent_arguments(#[case] args: &[&str]) {
    let result = Cli::try_parse_from(std::iter::once("cliquegen").chain(args.iter().copied()));
    assert!(result.is_err());
}

#[rstest]
fn clique_defaults_match_documented_values() {
    let cli = parse(&["--count-only", "clique"]);
    match cli.command {
        Command::Clique(args) => {
            assert_eq!(args.num_vertices, 10_000);
            assert!(args.prob_missing.abs() < f64::EPSILON);
        }
        other => panic!("unexpected command {other:?}"),
    }
    assert_eq!(cli.generation.bulk_size, cliquegen_core::DEFAULT_BULK_SIZE);
}

#[rstest]
fn render_summary_lists_every_counter() -> TestResult {
    let summary = run_cli(parse(&["--count-only", "--bulk-size", "4", "clique", "-s", "3"]))?;
    let mut buffer = Vec::new();
    render_summary(&summary, &mut buffer)?;
    let text = String::from_utf8(buffer)?;
    assert_eq!(
        text,
        "graph: clique of 3 vertices\n\
         sink: counting\n\
         vertices: 3\n\
         edges: 6\n\
         partitions: 1\n\
         vertex batches: 1\n\
         edge batches: 2\n"
    );
    Ok(())
}
