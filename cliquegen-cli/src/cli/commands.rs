//! Argument parsing and command execution for the cliquegen CLI.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use cliquegen_core::{
    BulkSink, CountingSink, DEFAULT_BULK_SIZE, GenerationSummary, Generator, GeneratorBuilder,
    GeneratorError, GraphShape, GraphSpec, PartitionedParams, PropertySpec, PropertyTarget,
    UndirectedStorage,
};
use cliquegen_sinks_jsonl::{DocumentNaming, JsonLinesError, JsonLinesSink, SmartKeys};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

const DEFAULT_NUM_VERTICES: u64 = 10_000;
const DEFAULT_PROB_MISSING_ONE_BETWEEN: f64 = 0.5;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "cliquegen",
    about = "Generate clique-structured benchmark graphs in bulk batches."
)]
pub struct Cli {
    /// Generator and property configuration.
    #[command(flatten)]
    pub generation: GenerationArgs,

    /// Output selection.
    #[command(flatten)]
    pub output: OutputArgs,

    /// Collection and attribute naming of JSON-lines documents.
    #[command(flatten)]
    pub naming: NamingArgs,

    /// Graph shape to generate.
    #[command(subcommand)]
    pub command: Command,
}

/// Graph shapes.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// A single clique.
    Clique(CliqueArgs),
    /// Cliques of random sizes joined by random cross-clique edges.
    CliquesGraph(CliquesGraphArgs),
    /// Edgeless parts of random sizes joined by random cross-part edges.
    KPartite(KPartiteArgs),
}

/// Options of the `clique` command.
#[derive(Debug, Args, Clone)]
pub struct CliqueArgs {
    /// Number of vertices.
    #[arg(long, short = 's', default_value_t = DEFAULT_NUM_VERTICES)]
    pub num_vertices: u64,

    /// Probability that an individual edge is omitted.
    #[arg(long, default_value_t = 0.0)]
    pub prob_missing: f64,
}

/// Options of the `cliques-graph` command.
#[derive(Debug, Args, Clone)]
pub struct CliquesGraphArgs {
    /// Number of cliques.
    #[arg(long)]
    pub num_cliques: u64,

    /// Smallest clique size.
    #[arg(long)]
    pub min_size_clique: u64,

    /// Largest clique size.
    #[arg(long)]
    pub max_size_clique: u64,

    /// Probability that an edge inside a clique is omitted.
    #[arg(long, default_value_t = 0.0)]
    pub prob_missing_one: f64,

    /// Probability that a pair of cliques gets no edges at all.
    #[arg(long, default_value_t = 0.0)]
    pub prob_missing_all: f64,

    /// Probability that an edge between two connected cliques is omitted.
    #[arg(long, default_value_t = DEFAULT_PROB_MISSING_ONE_BETWEEN)]
    pub prob_missing_one_between: f64,
}

/// Options of the `k-partite` command.
#[derive(Debug, Args, Clone)]
pub struct KPartiteArgs {
    /// Number of parts.
    #[arg(long, short = 'k')]
    pub num_parts: u64,

    /// Smallest part size.
    #[arg(long)]
    pub min_size_part: u64,

    /// Largest part size.
    #[arg(long)]
    pub max_size_part: u64,

    /// Probability that an edge between two parts is omitted.
    #[arg(long, default_value_t = DEFAULT_PROB_MISSING_ONE_BETWEEN)]
    pub prob_missing_one_between: f64,
}

/// How a property is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PropertyKind {
    /// No property.
    None,
    /// Uniform draw from `[min, max)`; takes two values.
    Random,
    /// Lookup by vertex id or by `from * n + to` for edges.
    List,
}

/// Options shared by every graph shape.
#[derive(Debug, Args, Clone)]
pub struct GenerationArgs {
    /// Maximum number of documents per committed batch.
    #[arg(long, default_value_t = DEFAULT_BULK_SIZE)]
    pub bulk_size: usize,

    /// Worker threads for edge generation (defaults to available parallelism).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Seed of every random draw of the run.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Generate a directed graph.
    #[arg(long)]
    pub directed: bool,

    /// Store each undirected pair as one edge instead of two.
    #[arg(long)]
    pub single_undirected_edge: bool,

    /// Give every vertex one self loop.
    #[arg(long)]
    pub self_loops: bool,

    /// Flush the pending batch after every enumerated row.
    #[arg(long)]
    pub row_flush: bool,

    /// How vertex properties are attached.
    #[arg(long, value_enum, default_value_t = PropertyKind::None)]
    pub vertex_property_type: PropertyKind,

    /// Vertex property values, comma-separated or repeated.
    #[arg(long, value_delimiter = ',')]
    pub vertex_property: Vec<String>,

    /// How edge properties are attached.
    #[arg(long, value_enum, default_value_t = PropertyKind::None)]
    pub edge_property_type: PropertyKind,

    /// Edge property values, comma-separated or repeated.
    #[arg(long, value_delimiter = ',')]
    pub edge_property: Vec<String>,
}

/// Where documents go.
#[derive(Debug, Args, Clone)]
#[group(required = true, multiple = false)]
pub struct OutputArgs {
    /// Write `<collection>.jsonl` files into this directory.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Generate and count documents without writing them.
    #[arg(long)]
    pub count_only: bool,
}

/// Naming of JSON-lines documents.
#[derive(Debug, Args, Clone)]
pub struct NamingArgs {
    /// Vertex collection name.
    #[arg(long, default_value = "v")]
    pub vertex_collection: String,

    /// Edge collection name.
    #[arg(long, default_value = "e")]
    pub edge_collection: String,

    /// Attribute holding the vertex property.
    #[arg(long, default_value = "color")]
    pub vertex_attribute: String,

    /// Attribute holding the edge property.
    #[arg(long, default_value = "weight")]
    pub edge_attribute: String,

    /// Emit smart-graph keys sharded by this attribute.
    #[arg(long, conflicts_with = "smart_by_part")]
    pub smart_attribute: Option<String>,

    /// Emit smart-graph keys sharded by the partition label.
    #[arg(long)]
    pub smart_by_part: bool,
}

impl NamingArgs {
    fn document_naming(self) -> DocumentNaming {
        let smart = match (self.smart_attribute, self.smart_by_part) {
            (_, true) => Some(SmartKeys::ByPart),
            (Some(attribute), false) => Some(SmartKeys::ById { attribute }),
            (None, false) => None,
        };
        DocumentNaming {
            vertex_collection: self.vertex_collection,
            edge_collection: self.edge_collection,
            vertex_attribute: self.vertex_attribute,
            edge_attribute: self.edge_attribute,
            smart,
        }
    }
}

impl Command {
    fn shape(&self) -> GraphShape {
        match self {
            Self::Clique(args) => GraphShape::Clique {
                size: args.num_vertices,
                prob_missing: args.prob_missing,
            },
            Self::CliquesGraph(args) => GraphShape::CliquesGraph(
                PartitionedParams::new(args.num_cliques, args.min_size_clique, args.max_size_clique)
                    .with_prob_missing_one(args.prob_missing_one)
                    .with_prob_missing_all(args.prob_missing_all)
                    .with_prob_missing_one_between(args.prob_missing_one_between),
            ),
            Self::KPartite(args) => GraphShape::KPartite(
                PartitionedParams::new(args.num_parts, args.min_size_part, args.max_size_part)
                    .with_prob_missing_one_between(args.prob_missing_one_between),
            ),
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// A `random` property did not receive exactly `min` and `max`.
    #[error("random {target} property takes exactly two values (min, max), got {got}")]
    RandomPropertyArity {
        /// Property being configured.
        target: PropertyTarget,
        /// Number of values supplied.
        got: usize,
    },
    /// A `random` property bound was not a number.
    #[error("random {target} property bound `{value}` is not a number")]
    InvalidPropertyNumber {
        /// Property being configured.
        target: PropertyTarget,
        /// Rejected raw value.
        value: String,
    },
    /// A `list` property received no values.
    #[error("{target} property list must not be empty")]
    EmptyPropertyList {
        /// Property being configured.
        target: PropertyTarget,
    },
    /// Property values were supplied without a property type.
    #[error("{target} property values were given but the {target} property type is `none`")]
    UnusedPropertyValues {
        /// Property being configured.
        target: PropertyTarget,
    },
    /// The JSON-lines sink could not be prepared.
    #[error(transparent)]
    Sink(#[from] JsonLinesError),
    /// Configuration or generation failed.
    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

/// Outcome of a generation command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Human-readable description of the generated shape.
    pub shape: String,
    /// Name reported by the sink.
    pub sink: String,
    /// Counters reported by the generator.
    pub summary: GenerationSummary,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when the arguments are inconsistent, the sink cannot
/// be prepared, or generation fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// use clap::Parser;
/// use cliquegen_cli::cli::{Cli, run_cli};
///
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let cli = Cli::try_parse_from([
///     "cliquegen", "--count-only", "--workers", "2", "clique", "--num-vertices", "4",
/// ])?;
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.summary.vertices, 4);
/// assert_eq!(summary.summary.edges, 12);
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty, output = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    let Cli {
        generation,
        output,
        naming,
        command,
    } = cli;
    let shape = command.shape();
    let span = Span::current();
    span.record("command", field::display(shape.kind()));

    let generator = build_generator(&generation)?;
    let summary = match output.output_dir {
        Some(dir) => {
            span.record("output", field::display(dir.display()));
            let sink = JsonLinesSink::create(&dir, naming.document_naming())?;
            execute(&generator, &shape, &sink)?
        }
        None => {
            span.record("output", field::display("count-only"));
            execute(&generator, &shape, &CountingSink::default())?
        }
    };

    info!(
        sink = summary.sink.as_str(),
        vertices = summary.summary.vertices,
        edges = summary.summary.edges,
        "command completed"
    );
    Ok(summary)
}

pub(super) fn build_generator(args: &GenerationArgs) -> Result<Generator, CliError> {
    let storage = if args.single_undirected_edge {
        UndirectedStorage::Single
    } else {
        UndirectedStorage::Mirrored
    };
    let graph = GraphSpec::default()
        .with_directed(args.directed)
        .with_self_loops(args.self_loops)
        .with_undirected_storage(storage)
        .with_vertex_property(property_spec(
            PropertyTarget::Vertex,
            args.vertex_property_type,
            &args.vertex_property,
        )?)
        .with_edge_property(property_spec(
            PropertyTarget::Edge,
            args.edge_property_type,
            &args.edge_property,
        )?);

    let mut builder = GeneratorBuilder::new()
        .with_bulk_size(args.bulk_size)
        .with_seed(args.seed)
        .with_row_flush(args.row_flush)
        .with_graph(graph);
    if let Some(workers) = args.workers {
        builder = builder.with_workers(workers);
    }
    Ok(builder.build()?)
}

pub(super) fn property_spec(
    target: PropertyTarget,
    kind: PropertyKind,
    values: &[String],
) -> Result<PropertySpec, CliError> {
    match kind {
        PropertyKind::None if values.is_empty() => Ok(PropertySpec::None),
        PropertyKind::None => Err(CliError::UnusedPropertyValues { target }),
        PropertyKind::Random => {
            let [min, max] = values else {
                return Err(CliError::RandomPropertyArity {
                    target,
                    got: values.len(),
                });
            };
            Ok(PropertySpec::Random {
                min: parse_bound(target, min)?,
                max: parse_bound(target, max)?,
            })
        }
        PropertyKind::List if values.is_empty() => Err(CliError::EmptyPropertyList { target }),
        PropertyKind::List => Ok(PropertySpec::list(values.iter().cloned())),
    }
}

fn parse_bound(target: PropertyTarget, raw: &str) -> Result<f64, CliError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| CliError::InvalidPropertyNumber {
            target,
            value: raw.to_owned(),
        })
}

fn execute(
    generator: &Generator,
    shape: &GraphShape,
    sink: &dyn BulkSink,
) -> Result<ExecutionSummary, CliError> {
    let summary = generator.run(shape, sink)?;
    Ok(ExecutionSummary {
        shape: shape.to_string(),
        sink: sink.name().to_owned(),
        summary,
    })
}

/// Renders `summary` to `writer` as `key: value` lines.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// use cliquegen_cli::cli::{ExecutionSummary, render_summary};
/// use cliquegen_core::GenerationSummary;
///
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = ExecutionSummary {
///     shape: "clique of 3 vertices".into(),
///     sink: "counting".into(),
///     summary: GenerationSummary { vertices: 3, edges: 6, partitions: 1, vertex_batches: 1, edge_batches: 1 },
/// };
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// assert!(String::from_utf8(buffer)?.starts_with("graph: clique of 3 vertices\n"));
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let counts = &summary.summary;
    writeln!(writer, "graph: {}", summary.shape)?;
    writeln!(writer, "sink: {}", summary.sink)?;
    writeln!(writer, "vertices: {}", counts.vertices)?;
    writeln!(writer, "edges: {}", counts.edges)?;
    writeln!(writer, "partitions: {}", counts.partitions)?;
    writeln!(writer, "vertex batches: {}", counts.vertex_batches)?;
    writeln!(writer, "edge batches: {}", counts.edge_batches)?;
    Ok(())
}
