//! Error types for lanemat
//!
//! Only the checked dispatch layer ([`crate::runtime::KernelClient`]) reports
//! errors. Raw kernels in [`crate::kernels`] trust their arguments.

use thiserror::Error;

/// Result type alias using lanemat's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while validating a kernel launch
#[derive(Error, Debug)]
pub enum Error {
    /// Matrix extents disagree between operands
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected `[height, width]` (or `[len]`)
        expected: Vec<usize>,
        /// Actual extents
        got: Vec<usize>,
    },

    /// A buffer is shorter than the extents it is launched with
    #[error("Buffer '{arg}' too small: need {required} elements, got {got}")]
    BufferTooSmall {
        /// The argument name
        arg: &'static str,
        /// Elements the launch will touch
        required: usize,
        /// Elements actually available
        got: usize,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Launch geometry cannot run the kernel
    #[error("Invalid launch: {reason}")]
    InvalidLaunch {
        /// Description of the problem
        reason: String,
    },

    /// Compressed-row arrays violate their structural invariants
    #[error("Invalid sparse matrix: {reason}")]
    InvalidSparse {
        /// Description of the violated invariant
        reason: String,
    },

    /// The random stream bank was used before being seeded
    #[error("Random stream bank is not initialized; call init_random first")]
    RandomNotInitialized,

    /// I/O failure (multiplier files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create a buffer-too-small error
    pub fn buffer_too_small(arg: &'static str, required: usize, got: usize) -> Self {
        Self::BufferTooSmall { arg, required, got }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create an invalid sparse structure error
    pub fn invalid_sparse(reason: impl Into<String>) -> Self {
        Self::InvalidSparse {
            reason: reason.into(),
        }
    }
}
