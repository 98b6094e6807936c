//! Shared test utilities for `cliquegen-core`.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use cliquegen_test_support::ci::property_test_profile::ProptestRunProfile;
use proptest::test_runner::Config as ProptestConfig;

use crate::{
    document::VertexDocument,
    error::SinkError,
    sink::{Batch, BulkSink},
};

/// Builds a standard proptest configuration from the shared CI profile.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// Bare vertex document with the given id.
#[must_use]
pub(crate) fn vertex(id: u64) -> VertexDocument {
    VertexDocument {
        id,
        part: None,
        property: None,
    }
}

/// [`BulkSink`] that accepts a fixed number of batches and rejects the rest.
#[derive(Debug)]
pub(crate) struct FailingSink {
    remaining: AtomicUsize,
    rejected: AtomicUsize,
}

impl FailingSink {
    /// Accepts `accepted` batches before failing every commit.
    #[must_use]
    pub(crate) fn after(accepted: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(accepted),
            rejected: AtomicUsize::new(0),
        }
    }

    /// Number of commits rejected so far.
    #[must_use]
    pub(crate) fn rejected(&self) -> usize {
        self.rejected.load(Ordering::Relaxed)
    }
}

impl BulkSink for FailingSink {
    fn name(&self) -> &str {
        "failing"
    }

    fn commit(&self, batch: Batch<'_>) -> Result<(), SinkError> {
        let accepted = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |left| left.checked_sub(1))
            .is_ok();
        if accepted {
            return Ok(());
        }
        self.rejected.fetch_add(1, Ordering::Relaxed);
        Err(SinkError::Rejected {
            role: batch.role(),
            documents: batch.len(),
            reason: Arc::from("test sink refuses further batches"),
        })
    }
}
