//! Span coverage of a CLI run.

use clap::Parser;
use cliquegen_cli::cli::{Cli, run_cli};
use cliquegen_test_support::tracing::RecordingLayer;
use rstest::rstest;
use tracing::Level;

fn cli(args: &[&str]) -> Cli {
    match Cli::try_parse_from(std::iter::once("cliquegen").chain(args.iter().copied())) {
        Ok(cli) => cli,
        Err(err) => panic!("arguments must parse: {err}"),
    }
}

#[rstest]
#[case::clique(&["--count-only", "--workers", "1", "clique", "-s", "4"], "clique")]
#[case::k_partite(
    &["--count-only", "--workers", "1", "k-partite", "-k", "2", "--min-size-part", "1", "--max-size-part", "3"],
    "k-partite",
)]
fn run_span_records_command_and_output(#[case] args: &[&str], #[case] command: &str) {
    let (result, layer) = RecordingLayer::capture(|| run_cli(cli(args)));
    assert!(result.is_ok());

    let span = layer.span_named("cli.run").expect("cli.run span must close");
    assert_eq!(span.fields.get("command").map(String::as_str), Some(command));
    assert_eq!(span.fields.get("output").map(String::as_str), Some("count-only"));

    let names = layer.span_names();
    assert_eq!(names.last().map(String::as_str), Some("cli.run"));
    assert!(names.iter().any(|name| name == "generator.run"));
    assert!(layer.messages().iter().any(|m| m == "command completed"));
}

#[test]
fn failed_run_reports_an_error_event() {
    let (result, layer) =
        RecordingLayer::capture(|| run_cli(cli(&["--count-only", "--bulk-size", "0", "clique"])));
    assert!(result.is_err());
    let errors = layer.events_at(Level::ERROR);
    assert!(
        errors
            .iter()
            .any(|event| event.fields.get("error").is_some_and(|e| e.contains("bulk_size"))),
        "expected an error event naming bulk_size, got {errors:?}"
    );
    assert!(layer.span_named("generator.run").is_none());
}
