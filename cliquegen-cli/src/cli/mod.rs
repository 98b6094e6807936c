//! Command-line interface for generating clique-structured graphs.
//!
//! One subcommand per graph shape. Shared flags configure the generator, the
//! property attachment, the document naming and where documents are written.

mod commands;

pub use commands::{
    Cli, CliError, CliqueArgs, CliquesGraphArgs, Command, ExecutionSummary, GenerationArgs,
    KPartiteArgs, NamingArgs, OutputArgs, PropertyKind, render_summary, run_cli,
};

#[cfg(test)]
mod tests;
