//! Error types for kernel construction and invocation

use super::shape::{MAX_INPUTS, MAX_OUTPUTS};
use super::simd::SimdLevel;
use std::fmt;
use thiserror::Error;

/// Which side of the kernel a shard belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShardKind {
    Input,
    Output,
}

impl fmt::Display for ShardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShardKind::Input => write!(f, "input"),
            ShardKind::Output => write!(f, "output"),
        }
    }
}

/// Errors reported before a kernel touches any shard data
///
/// Every check runs once per call, ahead of the chunk loop. When an error is
/// returned no output byte has been written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    /// Shard counts outside the range covered by specialised kernels
    #[error(
        "Unsupported shape: {inputs} inputs x {outputs} outputs (supported: 1..={max_inputs} inputs, 1..={max_outputs} outputs)",
        max_inputs = MAX_INPUTS,
        max_outputs = MAX_OUTPUTS
    )]
    UnsupportedShape { inputs: usize, outputs: usize },

    /// Coefficient rows of differing length
    #[error("Coefficient matrix row {row} has {len} entries, expected {expected}")]
    RaggedMatrix {
        row: usize,
        len: usize,
        expected: usize,
    },

    /// Flat coefficient data does not hold `outputs * inputs` entries
    #[error("Coefficient data has {len} entries, which does not fit a {outputs}x{inputs} matrix")]
    MatrixDataLength {
        outputs: usize,
        inputs: usize,
        len: usize,
    },

    /// Shard counts disagree with the coefficient matrix
    #[error(
        "Matrix is {matrix_outputs}x{matrix_inputs} but call has {outputs} outputs and {inputs} inputs"
    )]
    MatrixShapeMismatch {
        matrix_inputs: usize,
        matrix_outputs: usize,
        inputs: usize,
        outputs: usize,
    },

    /// Range with `start` past `stop`
    #[error("Invalid range: start {start} is greater than stop {stop}")]
    InvalidRange { start: usize, stop: usize },

    /// A shard cannot be sliced to `[start, stop)`
    #[error("{kind} shard {index} has {len} bytes but range ends at {stop}")]
    ShardTooShort {
        kind: ShardKind,
        index: usize,
        len: usize,
        stop: usize,
    },

    /// A forced backend is not available on this CPU
    #[error("SIMD backend {0:?} is not supported on this CPU")]
    BackendUnavailable(SimdLevel),
}

/// Type alias for kernel results
pub type KernelResult<T> = Result<T, KernelError>;
