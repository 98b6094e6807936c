//! End-to-end generation benchmarks.
//!
//! Runs every phase of a cliques-graph against a counting sink at several
//! worker counts to show how the edge phases scale.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Criterion bench_with_input closures rebind parameter names"
)]
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use cliquegen_benches::{error::BenchSetupError, params::GraphBenchParams};
use cliquegen_core::{CountingSink, GeneratorBuilder, GraphShape, PartitionedParams};

const SEED: u64 = 42;

const WORKER_COUNTS: &[usize] = &[1, 2, 4, 8];

fn cliques_graph_run_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("cliques_graph_run");
    group.sample_size(10);

    for &workers in WORKER_COUNTS {
        let params = GraphBenchParams {
            cliques: 20,
            min_size: 50,
            max_size: 200,
            workers,
        };
        let generator = GeneratorBuilder::new()
            .with_workers(workers)
            .with_seed(SEED)
            .build()?;
        let shape = GraphShape::CliquesGraph(
            PartitionedParams::new(params.cliques, params.min_size, params.max_size)
                .with_prob_missing_one(0.1)
                .with_prob_missing_all(0.5)
                .with_prob_missing_one_between(0.9),
        );
        group.bench_with_input(
            BenchmarkId::from_parameter(params),
            &(generator, shape),
            |b, (generator, shape)| {
                b.iter(|| generator.run(shape, &CountingSink::default()));
            },
        );
    }

    group.finish();
    Ok(())
}

fn cliques_graph_run(c: &mut Criterion) {
    if let Err(err) = cliques_graph_run_impl(c) {
        panic!("generation benchmark setup failed: {err}");
    }
}

criterion_group!(benches, cliques_graph_run);
criterion_main!(benches);
