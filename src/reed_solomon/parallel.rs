//! Range-partitioned parallel execution
//!
//! Large windows are cut into disjoint sub-ranges of whole chunks, and each
//! sub-range runs the same kernel on the rayon pool. The kernel only touches
//! its own window and the table set is read-only, so no synchronisation is
//! needed beyond the join.
//!
//! The ranges run on a pool of [`KernelConfig::effective_threads`] workers.
//! The global rayon pool is used directly when it already has that size.

use super::dispatch::{processed_len, validate_windows, MulKernel};
use super::error::KernelResult;
use super::shape::{MAX_INPUTS, MAX_OUTPUTS};
use super::simd::chunk_count;
use crate::config::KernelConfig;
use log::{trace, warn};
use rayon::prelude::*;
use smallvec::SmallVec;

impl MulKernel {
    /// Same contract as [`MulKernel::mul_slices`], split across threads
    ///
    /// Produces byte-identical output; `config` controls how the aligned range
    /// is divided and how many worker threads run the pieces.
    pub fn par_mul_slices<In, Out>(
        &self,
        inputs: &[In],
        outputs: &mut [Out],
        start: usize,
        stop: usize,
        accumulate: bool,
        config: &KernelConfig,
    ) -> KernelResult<usize>
    where
        In: AsRef<[u8]> + Sync,
        Out: AsMut<[u8]>,
    {
        self.check_counts(inputs.len(), outputs.len())?;
        validate_windows(inputs, outputs, start, stop)?;

        let processed = processed_len(start, stop);
        let split = config.split_len(processed);
        if processed == 0 || split >= processed {
            return self.mul_slices(inputs, outputs, start, stop, accumulate);
        }

        let ranges = processed.div_ceil(split);
        let threads = config.effective_threads();
        trace!(
            "par_mul_slices {}: {} bytes in {} ranges of {} on {} threads",
            self.shape(),
            processed,
            ranges,
            split,
            threads
        );

        // Transpose outputs into one window set per range
        let mut per_range: Vec<SmallVec<[&mut [u8]; MAX_OUTPUTS]>> =
            (0..ranges).map(|_| SmallVec::new()).collect();
        for out in outputs.iter_mut() {
            let window = &mut out.as_mut()[start..start + processed];
            for (range, piece) in window.chunks_mut(split).enumerate() {
                per_range[range].push(piece);
            }
        }

        in_pool(threads, || {
            per_range
                .into_par_iter()
                .enumerate()
                .for_each(|(range, mut outs)| {
                    let from = start + range * split;
                    let len = outs[0].len();
                    let ins: SmallVec<[&[u8]; MAX_INPUTS]> = inputs
                        .iter()
                        .map(|s| &s.as_ref()[from..from + len])
                        .collect();
                    self.run(&ins, &mut outs, chunk_count(len), accumulate);
                })
        });

        Ok(processed)
    }
}

/// Run `op` on a pool of `threads` workers
///
/// Falls back to the current pool when it already has `threads` workers or a
/// dedicated pool cannot be built.
pub(crate) fn in_pool<R, F>(threads: usize, op: F) -> R
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    if threads == rayon::current_num_threads() {
        return op();
    }

    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(op),
        Err(e) => {
            warn!(
                "Could not build a {} thread pool, using the current one: {}",
                threads, e
            );
            op()
        }
    }
}
