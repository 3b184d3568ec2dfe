//! Portable multiply-accumulate kernel
//!
//! Runs the same chunk loop as the PSHUFB kernels with scalar nibble lookups,
//! so results are bit-identical on every platform. Used on CPUs without AVX2
//! and as the cross-check for the specialised kernels in tests.

use super::{ShapeKernels, CHUNK_SIZE};
use crate::reed_solomon::shape::{Shape, MAX_OUTPUTS};
use crate::reed_solomon::tables::TableSet;

/// Portable kernel for any supported shape
///
/// Only the first `chunks * CHUNK_SIZE` bytes of each window are touched.
/// With `XOR` the outputs are accumulated into, otherwise overwritten.
///
/// # Panics
/// If a window is shorter than `chunks * CHUNK_SIZE` or the shard counts
/// exceed the table set's shape. The dispatcher validates both beforehand.
pub fn mul_portable<const XOR: bool>(
    tables: &TableSet,
    inputs: &[&[u8]],
    outputs: &mut [&mut [u8]],
    chunks: usize,
) {
    let len = chunks * CHUNK_SIZE;
    let mut accumulators = [[0u8; CHUNK_SIZE]; MAX_OUTPUTS];
    let acc = &mut accumulators[..outputs.len()];

    for offset in (0..len).step_by(CHUNK_SIZE) {
        let end = offset + CHUNK_SIZE;

        for (dst, out) in acc.iter_mut().zip(outputs.iter()) {
            if XOR {
                dst.copy_from_slice(&out[offset..end]);
            } else {
                *dst = [0; CHUNK_SIZE];
            }
        }

        for (i, input) in inputs.iter().enumerate() {
            let data = &input[offset..end];
            for (j, dst) in acc.iter_mut().enumerate() {
                let (low, high) = tables.pair(i, j);
                for (d, &x) in dst.iter_mut().zip(data) {
                    *d ^= low[(x & 0x0F) as usize] ^ high[(x >> 4) as usize];
                }
            }
        }

        for (dst, out) in acc.iter().zip(outputs.iter_mut()) {
            out[offset..end].copy_from_slice(dst);
        }
    }
}

/// The portable kernel serves every shape
pub fn kernels(_shape: Shape) -> ShapeKernels {
    ShapeKernels {
        overwrite: mul_portable::<false>,
        accumulate: mul_portable::<true>,
    }
}
