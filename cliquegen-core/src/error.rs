//! Error types for the cliquegen core library.
//!
//! Defines the sink and generator error enums exposed by the public API, their
//! stable machine-readable codes, and a convenient result alias.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::{property::PropertyTarget, sink::Role};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced by a [`crate::BulkSink`] while committing a batch.
///
/// A sink returning an error guarantees the batch was not applied.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SinkError {
    /// Writing to the underlying storage failed.
    #[error("i/o failure while committing {role} batch: {message}")]
    Io {
        /// Role of the batch that failed.
        role: Role,
        /// Rendered operating system error.
        message: Arc<str>,
    },
    /// The backend refused the batch.
    #[error("{role} batch of {documents} documents was rejected: {reason}")]
    Rejected {
        /// Role of the rejected batch.
        role: Role,
        /// Number of documents in the rejected batch.
        documents: usize,
        /// Backend-provided reason.
        reason: Arc<str>,
    },
    /// A lock guarding the sink became poisoned after a panic.
    #[error("lock for {resource} is poisoned")]
    Poisoned {
        /// Name of the poisoned resource.
        resource: &'static str,
    },
    /// A document could not be encoded for the backend.
    #[error("failed to encode {role} document: {message}")]
    Serialization {
        /// Role of the batch being encoded.
        role: Role,
        /// Encoder message.
        message: Arc<str>,
    },
}

define_error_codes! {
    /// Stable codes describing [`SinkError`] variants.
    enum SinkErrorCode for SinkError {
        /// Writing to the underlying storage failed.
        Io => Io { .. } => "SINK_IO",
        /// The backend refused the batch.
        Rejected => Rejected { .. } => "SINK_REJECTED",
        /// A lock guarding the sink became poisoned.
        Poisoned => Poisoned { .. } => "SINK_POISONED",
        /// A document could not be encoded.
        Serialization => Serialization { .. } => "SINK_SERIALIZATION",
    }
}

/// Error type produced when configuring or running a [`crate::Generator`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GeneratorError {
    /// Bulk size must be greater than zero.
    #[error("bulk_size must be at least 1 (got {got})")]
    InvalidBulkSize {
        /// The invalid bulk size supplied by the caller.
        got: usize,
    },
    /// Worker count must be greater than zero.
    #[error("workers must be at least 1 (got {got})")]
    InvalidWorkerCount {
        /// The invalid worker count supplied by the caller.
        got: usize,
    },
    /// An omission probability was outside `[0, 1]` or not finite.
    #[error("{parameter} must be a probability in [0, 1] (got {value})")]
    InvalidProbability {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// A partition size range was empty or started at zero.
    #[error("{parameter}: size range [{min}, {max}] is invalid")]
    InvalidSizeRange {
        /// Name of the offending parameter group.
        parameter: &'static str,
        /// Lower bound supplied by the caller.
        min: u64,
        /// Upper bound supplied by the caller.
        max: u64,
    },
    /// Random property bounds were not finite or had `min > max`.
    #[error("random {target} property bounds [{min}, {max}) are invalid")]
    InvalidRandomBounds {
        /// Whether the property decorates vertices or edges.
        target: PropertyTarget,
        /// Lower bound supplied by the caller.
        min: f64,
        /// Upper bound supplied by the caller.
        max: f64,
    },
    /// A list property cannot address every entity it is applied to.
    #[error("{target} property list has {actual} values but {required} are required")]
    PropertyListTooShort {
        /// Whether the property decorates vertices or edges.
        target: PropertyTarget,
        /// Number of values the generation run may address.
        required: u128,
        /// Number of values supplied.
        actual: usize,
    },
    /// Mutually exclusive inputs were supplied together.
    #[error("`{first}` cannot be combined with `{second}`")]
    ConfigurationConflict {
        /// First conflicting input.
        first: &'static str,
        /// Second conflicting input.
        second: &'static str,
    },
    /// Neither of two alternative inputs was supplied.
    #[error("either `{first}` or `{second}` must be supplied")]
    MissingTarget {
        /// First alternative input.
        first: &'static str,
        /// Second alternative input.
        second: &'static str,
    },
    /// A partition index did not name a closed partition.
    #[error("partition {index} does not exist ({partitions} closed partitions)")]
    UnknownPartition {
        /// Requested partition index.
        index: usize,
        /// Number of closed partitions in the table.
        partitions: usize,
    },
    /// A batch flush failed.
    #[error("sink `{sink}` failed: {error}")]
    Sink {
        /// Name reported by the failing sink.
        sink: Arc<str>,
        #[source]
        /// Underlying sink error.
        error: SinkError,
    },
    /// The run was cancelled before this worker finished its range.
    #[error("generation was cancelled")]
    Cancelled,
    /// The worker pool could not be created.
    #[error("failed to build worker pool: {message}")]
    WorkerPool {
        /// Rendered pool construction error.
        message: Arc<str>,
    },
}

define_error_codes! {
    /// Stable codes describing [`GeneratorError`] variants.
    enum GeneratorErrorCode for GeneratorError {
        /// Bulk size must be greater than zero.
        InvalidBulkSize => InvalidBulkSize { .. } => "GENERATOR_INVALID_BULK_SIZE",
        /// Worker count must be greater than zero.
        InvalidWorkerCount => InvalidWorkerCount { .. } => "GENERATOR_INVALID_WORKER_COUNT",
        /// An omission probability was outside `[0, 1]`.
        InvalidProbability => InvalidProbability { .. } => "GENERATOR_INVALID_PROBABILITY",
        /// A partition size range was invalid.
        InvalidSizeRange => InvalidSizeRange { .. } => "GENERATOR_INVALID_SIZE_RANGE",
        /// Random property bounds were invalid.
        InvalidRandomBounds => InvalidRandomBounds { .. } => "GENERATOR_INVALID_RANDOM_BOUNDS",
        /// A list property was too short.
        PropertyListTooShort => PropertyListTooShort { .. } => "GENERATOR_PROPERTY_LIST_TOO_SHORT",
        /// Mutually exclusive inputs were supplied together.
        ConfigurationConflict => ConfigurationConflict { .. } => "GENERATOR_CONFIGURATION_CONFLICT",
        /// Neither alternative input was supplied.
        MissingTarget => MissingTarget { .. } => "GENERATOR_MISSING_TARGET",
        /// A partition index did not exist.
        UnknownPartition => UnknownPartition { .. } => "GENERATOR_UNKNOWN_PARTITION",
        /// A batch flush failed.
        SinkFailure => Sink { .. } => "GENERATOR_SINK_FAILURE",
        /// The run was cancelled.
        Cancelled => Cancelled => "GENERATOR_CANCELLED",
        /// The worker pool could not be created.
        WorkerPool => WorkerPool { .. } => "GENERATOR_WORKER_POOL",
    }
}

impl GeneratorError {
    /// Retrieve the inner [`SinkErrorCode`] when the error originated in a sink.
    #[must_use]
    pub const fn sink_code(&self) -> Option<SinkErrorCode> {
        match self {
            Self::Sink { error, .. } => Some(error.code()),
            _ => None,
        }
    }

    /// Returns `true` for errors detected before any batch was produced.
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::InvalidBulkSize { .. }
                | Self::InvalidWorkerCount { .. }
                | Self::InvalidProbability { .. }
                | Self::InvalidSizeRange { .. }
                | Self::InvalidRandomBounds { .. }
                | Self::PropertyListTooShort { .. }
                | Self::ConfigurationConflict { .. }
                | Self::MissingTarget { .. }
                | Self::UnknownPartition { .. }
        )
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, GeneratorError>;
