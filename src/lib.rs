//! Vectorised GF(2^8) multiply-accumulate kernels for Reed-Solomon erasure coding
//!
//! The arithmetic core of an erasure coder: given an O×I coefficient matrix,
//! I input shards and O output shards, compute every output as the GF(2^8)
//! matrix product of the inputs, either overwriting or XOR-accumulating.
//!
//! ```
//! use galmul::{CoefficientMatrix, MulKernel};
//!
//! let matrix = CoefficientMatrix::from_rows(&[[1u8, 1]])?;
//! let kernel = MulKernel::new(&matrix)?;
//!
//! let a = vec![0x0Fu8; 64];
//! let b = vec![0xF0u8; 64];
//! let mut parity = vec![vec![0u8; 64]];
//! let processed = kernel.mul_slices(&[&a, &b], &mut parity, 0, 64, false)?;
//!
//! assert_eq!(processed, 64);
//! assert!(parity[0].iter().all(|&x| x == 0xFF));
//! # Ok::<(), galmul::KernelError>(())
//! ```
//!
//! Shapes from 1×1 up to 12 inputs × 10 outputs are supported; anything larger
//! is rejected with [`KernelError::UnsupportedShape`] so callers can fall back
//! to a generic implementation. Only whole 32-byte chunks are processed.

pub mod config;
pub mod reed_solomon;

pub use config::KernelConfig;
pub use reed_solomon::*;
