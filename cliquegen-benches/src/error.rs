//! Benchmark setup error type.

use cliquegen_core::GeneratorError;

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Building or running the generator failed.
    #[error("generator setup failed: {0}")]
    Generator(#[from] GeneratorError),
    /// A zero value was passed where a non-zero integer was required.
    #[error("expected a non-zero value for {context}")]
    ZeroValue {
        /// A description of the parameter that was unexpectedly zero.
        context: &'static str,
    },
}
