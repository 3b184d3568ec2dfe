//! Vectorised GF(2^8) multiply-accumulate kernels
//!
//! Provides the backends a [`MulKernel`](super::MulKernel) can run on:
//! - x86_64: AVX2 PSHUFB kernels, one specialisation per shape
//! - everywhere: a portable kernel with the same chunked semantics
//!
//! Every backend processes whole 32-byte chunks only and produces bit-identical
//! results. Based on the "Screaming Fast Galois Field Arithmetic" paper.
//!
//! # Note
//! This module is public for benchmarks and tests but not part of the stable API.
//! Use `MulKernel` from the parent module instead.

pub mod portable;
#[cfg(target_arch = "x86_64")]
pub mod pshufb;

use super::error::{KernelError, KernelResult};
use super::shape::Shape;
use super::tables::TableSet;
use std::sync::OnceLock;

/// Bytes per shard processed in one loop iteration (one YMM register)
pub const CHUNK_SIZE: usize = 32;

/// log2 of [`CHUNK_SIZE`]
pub const CHUNK_SHIFT: u32 = 5;

/// SIMD implementation to use for the current platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimdLevel {
    /// x86_64 AVX2 (256-bit PSHUFB), per-shape specialised kernels
    Avx2,
    /// Scalar nibble lookups over the same 32-byte chunks
    Portable,
}

impl SimdLevel {
    /// Whether the running CPU can execute this backend
    pub fn is_supported(&self) -> bool {
        match self {
            SimdLevel::Avx2 => {
                #[cfg(target_arch = "x86_64")]
                {
                    is_x86_feature_detected!("avx2")
                }
                #[cfg(not(target_arch = "x86_64"))]
                {
                    false
                }
            }
            SimdLevel::Portable => true,
        }
    }
}

/// Detect best available SIMD implementation for current platform
pub fn detect_simd_support() -> SimdLevel {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            return SimdLevel::Avx2;
        }
    }

    SimdLevel::Portable
}

/// Detected level, cached after the first call
pub fn simd_level() -> SimdLevel {
    static SIMD_LEVEL: OnceLock<SimdLevel> = OnceLock::new();
    *SIMD_LEVEL.get_or_init(detect_simd_support)
}

/// A kernel specialised for one shape
///
/// Arguments: the table set, the input windows, the output windows and the
/// number of 32-byte chunks to process.
///
/// # Safety
/// - `inputs.len()` and `outputs.len()` must equal the shape the kernel was
///   selected for, and the table set must have been built for that shape.
/// - Every window must hold at least `chunks * CHUNK_SIZE` bytes.
/// - The backend the kernel belongs to must be supported by the running CPU.
pub type KernelFn = unsafe fn(&TableSet, &[&[u8]], &mut [&mut [u8]], usize);

/// Overwrite and accumulate variants of one shape's kernel
#[derive(Debug, Clone, Copy)]
pub struct ShapeKernels {
    pub(crate) overwrite: KernelFn,
    pub(crate) accumulate: KernelFn,
}

impl ShapeKernels {
    #[inline]
    pub fn get(&self, accumulate: bool) -> KernelFn {
        if accumulate {
            self.accumulate
        } else {
            self.overwrite
        }
    }
}

/// Kernels for `shape` on `level`, failing when the CPU lacks the backend
pub fn select_kernels(level: SimdLevel, shape: Shape) -> KernelResult<ShapeKernels> {
    if !level.is_supported() {
        return Err(KernelError::BackendUnavailable(level));
    }

    match level {
        #[cfg(target_arch = "x86_64")]
        SimdLevel::Avx2 => Ok(pshufb::kernels(shape)),
        #[cfg(not(target_arch = "x86_64"))]
        SimdLevel::Avx2 => Err(KernelError::BackendUnavailable(level)),
        SimdLevel::Portable => Ok(portable::kernels(shape)),
    }
}

/// Whole chunks in a window of `len` bytes
#[inline]
pub const fn chunk_count(len: usize) -> usize {
    len >> CHUNK_SHIFT
}
