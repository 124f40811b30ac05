//! Error types for search-eval

use thiserror::Error;

/// Result type for search-eval operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of [`Error`] values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A parameter was outside the range the operation accepts
    InvalidArgument,
    /// The operation is undefined for the data currently held
    InvalidState,
}

/// Error types for evaluation operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Cutoff larger than the ranked result
    #[error("cutoff exceeds result size: {k} > {size}")]
    CutoffOutOfRange {
        /// Requested cutoff
        k: usize,
        /// Number of ranked datapoints
        size: usize,
    },

    /// Window bounds outside the ranked result
    #[error("window [{from}, {to}) out of range for result of size {len}")]
    WindowOutOfRange {
        /// Inclusive lower bound
        from: usize,
        /// Exclusive upper bound
        to: usize,
        /// Number of ranked datapoints
        len: usize,
    },

    /// Parameter outside its accepted domain
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Too few samples for the requested statistic
    #[error("{operation} requires at least {required} sample(s), got {actual}")]
    InsufficientSamples {
        /// Operation that was attempted
        operation: &'static str,
        /// Minimum number of samples
        required: usize,
        /// Number of samples present
        actual: usize,
    },

    /// Ordering rule disagrees with the distances it orders
    #[error("minimum distance {min} exceeds maximum distance {max}, comparator inconsistent with distances")]
    InconsistentOrdering {
        /// Distance of the first ranked datapoint
        min: f64,
        /// Distance of the last ranked datapoint
        max: f64,
    },

    /// A datapoint of this result is absent from a compared result
    #[error("element at rank {position} absent from a compared result")]
    MissingDatapoint {
        /// Rank of the datapoint in the reference result
        position: usize,
    },
}

impl Error {
    /// Classify this error as an argument or a state violation
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CutoffOutOfRange { .. }
            | Self::WindowOutOfRange { .. }
            | Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::InsufficientSamples { .. }
            | Self::InconsistentOrdering { .. }
            | Self::MissingDatapoint { .. } => ErrorKind::InvalidState,
        }
    }

    pub(crate) fn empty(operation: &'static str) -> Self {
        Self::InsufficientSamples {
            operation,
            required: 1,
            actual: 0,
        }
    }
}
