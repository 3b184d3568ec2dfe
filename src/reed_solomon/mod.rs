//! GF(2^8) multiply-accumulate core for Reed-Solomon erasure coding
//!
//! Transforms a set of input shards into a set of output shards under a
//! coefficient matrix: `output[j] ^= Σ matrix[j][i] · input[i]` (or `=` in
//! overwrite mode), 32 bytes per step with PSHUFB nibble lookups.
//!
//! Building blocks, leaf first:
//! - [`galois`]: the field and its reference multiply
//! - [`tables`]: split nibble tables and per-shape table sets
//! - [`shape`]: supported shapes and their register strategy
//! - [`simd`]: the kernels themselves
//! - [`dispatch`]: [`MulKernel`] and the `mul_slices` entry point

pub mod dispatch;
pub mod error;
pub mod galois;
pub mod matrix;
pub mod parallel;
pub mod shape;
pub mod simd;
pub mod tables;

pub use dispatch::{mul_slices, processed_len, MulKernel};
pub use error::{KernelError, KernelResult, ShardKind};
pub use galois::{multiply_bitwise, Galois8};
pub use matrix::CoefficientMatrix;
pub use shape::{OutputPointers, Shape, Strategy, TableResidency, MAX_INPUTS, MAX_OUTPUTS};
pub use simd::{detect_simd_support, SimdLevel, CHUNK_SIZE};
pub use tables::{build_split_table, split_table, SplitTable, TableSet, TableWidth};
