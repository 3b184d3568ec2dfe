//! PSHUFB-based GF(2^8) multiply-accumulate kernels (AVX2)
//!
//! ## PSHUFB Technique
//!
//! This implements the "Screaming Fast Galois Field Arithmetic" technique from
//! James Plank's paper: "Screaming Fast Galois Field Arithmetic Using Intel SIMD Instructions"
//! (http://web.eecs.utk.edu/~plank/plank/papers/FAST-2013-GF.html)
//!
//! Each 32-byte input chunk is split into low and high nibbles. `VPSHUFB` uses
//! them as indices into the 16-byte low/high tables of a coefficient (one copy
//! per 128-bit lane), and the two lookups XOR to the field product of all 32
//! bytes at once.
//!
//! ## Specialisation
//!
//! [`mul_avx2`] is generic over the shape and the accumulate flag, so the
//! compiler emits one routine per (inputs, outputs, accumulate) with fully
//! unrolled input/output loops and fixed-size register arrays. The shape's
//! [`Strategy`] is a constant inside each instance:
//!
//! - resident tables are broadcast into registers before the chunk loop;
//! - reloaded tables are fetched with one 256-bit load from doubled-width
//!   storage on every (input, output) visit;
//! - output pointers are either held for the whole loop or recomputed from
//!   the output slices at each load/store.
//!
//! [`kernels`] maps a runtime shape onto the matching instance through a
//! table of function pointers covering every supported shape.

use super::{KernelFn, ShapeKernels, CHUNK_SIZE};
use crate::reed_solomon::shape::{Shape, Strategy, MAX_INPUTS, MAX_OUTPUTS};
use crate::reed_solomon::tables::{TableSet, TableWidth};
use std::arch::x86_64::*;

/// Bytes in one 16-entry nibble table
const TABLE_BYTES: usize = 16;

/// Multiply-accumulate `I` inputs into `O` outputs over `chunks` 32-byte chunks
///
/// For every processed byte position `p`:
/// `out[j][p] = (XOR ? out[j][p] : 0) ^ Σ_i matrix[j][i] · in[i][p]`
///
/// # Safety
/// - Requires AVX2. Caller must ensure the CPU has it before calling.
/// - `inputs.len() == I`, `outputs.len() == O`.
/// - `tables` must be built for shape (I, O) at the width its strategy uses.
/// - Every input and output window must hold at least `chunks * 32` bytes.
/// - Loads and stores are unaligned; no alignment is required.
#[target_feature(enable = "avx2")]
pub unsafe fn mul_avx2<const I: usize, const O: usize, const XOR: bool>(
    tables: &TableSet,
    inputs: &[&[u8]],
    outputs: &mut [&mut [u8]],
    chunks: usize,
) {
    debug_assert_eq!(inputs.len(), I);
    debug_assert_eq!(outputs.len(), O);
    debug_assert_eq!(
        (tables.shape().inputs(), tables.shape().outputs()),
        (I, O)
    );
    debug_assert!(inputs.iter().all(|s| s.len() >= chunks * CHUNK_SIZE));
    debug_assert!(outputs.iter().all(|s| s.len() >= chunks * CHUNK_SIZE));

    if chunks == 0 {
        return;
    }

    let strategy = Strategy::for_counts(I, O);
    let resident = strategy.tables_resident();
    let hold_outputs = strategy.outputs_held();
    debug_assert_eq!(
        tables.width(),
        if resident {
            TableWidth::Single
        } else {
            TableWidth::Doubled
        }
    );

    // Resident tables: broadcast each 128-bit table into both lanes once
    let mut table_lo = [[_mm256_setzero_si256(); O]; I];
    let mut table_hi = [[_mm256_setzero_si256(); O]; I];
    if resident {
        for i in 0..I {
            for j in 0..O {
                let (lo, hi) = tables.pair(i, j);
                table_lo[i][j] =
                    _mm256_broadcastsi128_si256(_mm_loadu_si128(lo.as_ptr() as *const __m128i));
                table_hi[i][j] =
                    _mm256_broadcastsi128_si256(_mm_loadu_si128(hi.as_ptr() as *const __m128i));
            }
        }
    }
    let low_ptr = tables.low_bytes().as_ptr();
    let high_ptr = tables.high_bytes().as_ptr();

    let in_ptrs: [*const u8; I] = std::array::from_fn(|i| inputs[i].as_ptr());
    let mut out_ptrs = [std::ptr::null_mut::<u8>(); O];
    if hold_outputs {
        for (ptr, out) in out_ptrs.iter_mut().zip(outputs.iter_mut()) {
            *ptr = out.as_mut_ptr();
        }
    }

    let mask_0x0f = _mm256_set1_epi8(0x0F);
    let mut offset = 0usize;

    for _ in 0..chunks {
        // Load or clear O outputs
        let mut dst = [_mm256_setzero_si256(); O];
        if XOR {
            for (j, acc) in dst.iter_mut().enumerate() {
                let ptr = if hold_outputs {
                    out_ptrs[j]
                } else {
                    outputs[j].as_mut_ptr()
                };
                *acc = _mm256_loadu_si256(ptr.add(offset) as *const __m256i);
            }
        }

        for i in 0..I {
            // Load and process 32 bytes from input i to O outputs
            let in_vec = _mm256_loadu_si256(in_ptrs[i].add(offset) as *const __m256i);
            let in_low = _mm256_and_si256(in_vec, mask_0x0f);
            let in_high = _mm256_and_si256(_mm256_srli_epi64(in_vec, 4), mask_0x0f);

            for j in 0..O {
                let (look_low, look_high) = if resident {
                    (table_lo[i][j], table_hi[i][j])
                } else {
                    let at = (i * O + j) * 2 * TABLE_BYTES;
                    (
                        _mm256_loadu_si256(low_ptr.add(at) as *const __m256i),
                        _mm256_loadu_si256(high_ptr.add(at) as *const __m256i),
                    )
                };
                let product = _mm256_xor_si256(
                    _mm256_shuffle_epi8(look_low, in_low),
                    _mm256_shuffle_epi8(look_high, in_high),
                );
                dst[j] = _mm256_xor_si256(dst[j], product);
            }
        }

        // Store O outputs
        for (j, acc) in dst.iter().enumerate() {
            let ptr = if hold_outputs {
                out_ptrs[j]
            } else {
                outputs[j].as_mut_ptr()
            };
            _mm256_storeu_si256(ptr.add(offset) as *mut __m256i, *acc);
        }

        offset += CHUNK_SIZE;
    }
}

macro_rules! kernel_row {
    ($i:literal; $($o:literal),+) => {
        [$(ShapeKernels {
            overwrite: mul_avx2::<$i, $o, false> as KernelFn,
            accumulate: mul_avx2::<$i, $o, true> as KernelFn,
        }),+]
    };
}

/// Specialised kernels indexed by `[inputs - 1][outputs - 1]`
static AVX2_KERNELS: [[ShapeKernels; MAX_OUTPUTS]; MAX_INPUTS] = [
    kernel_row!(1; 1, 2, 3, 4, 5, 6, 7, 8, 9, 10),
    kernel_row!(2; 1, 2, 3, 4, 5, 6, 7, 8, 9, 10),
    kernel_row!(3; 1, 2, 3, 4, 5, 6, 7, 8, 9, 10),
    kernel_row!(4; 1, 2, 3, 4, 5, 6, 7, 8, 9, 10),
    kernel_row!(5; 1, 2, 3, 4, 5, 6, 7, 8, 9, 10),
    kernel_row!(6; 1, 2, 3, 4, 5, 6, 7, 8, 9, 10),
    kernel_row!(7; 1, 2, 3, 4, 5, 6, 7, 8, 9, 10),
    kernel_row!(8; 1, 2, 3, 4, 5, 6, 7, 8, 9, 10),
    kernel_row!(9; 1, 2, 3, 4, 5, 6, 7, 8, 9, 10),
    kernel_row!(10; 1, 2, 3, 4, 5, 6, 7, 8, 9, 10),
    kernel_row!(11; 1, 2, 3, 4, 5, 6, 7, 8, 9, 10),
    kernel_row!(12; 1, 2, 3, 4, 5, 6, 7, 8, 9, 10),
];

/// AVX2 kernels specialised for `shape`
#[inline]
pub fn kernels(shape: Shape) -> ShapeKernels {
    AVX2_KERNELS[shape.inputs() - 1][shape.outputs() - 1]
}
