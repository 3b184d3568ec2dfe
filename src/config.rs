//! Configuration for kernel execution

use crate::reed_solomon::simd::{SimdLevel, CHUNK_SIZE};

/// Smallest range worth handing to another thread
pub const DEFAULT_MIN_SPLIT_BYTES: usize = 64 * 1024;

/// Configuration for multiply-accumulate calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelConfig {
    /// Number of ranges to split into (0 = auto-detect)
    pub threads: usize,
    /// Whether to use parallel execution (false = one range on the calling thread)
    pub parallel: bool,
    /// Ranges are never split below this many bytes
    pub min_split_bytes: usize,
    /// Force a backend instead of detecting the best one
    pub simd_level: Option<SimdLevel>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            threads: 0, // Auto-detect CPU cores
            parallel: true,
            min_split_bytes: DEFAULT_MIN_SPLIT_BYTES,
            simd_level: None,
        }
    }
}

impl KernelConfig {
    pub fn new(threads: usize, parallel: bool) -> Self {
        Self {
            threads,
            parallel,
            ..Self::default()
        }
    }

    pub fn with_min_split_bytes(mut self, bytes: usize) -> Self {
        self.min_split_bytes = bytes;
        self
    }

    pub fn with_simd_level(mut self, level: SimdLevel) -> Self {
        self.simd_level = Some(level);
        self
    }

    /// Get effective thread count (auto-detect if 0)
    pub fn effective_threads(&self) -> usize {
        match (self.parallel, self.threads) {
            (false, _) => 1, // Sequential mode always uses single thread
            (true, 0) => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4), // Auto-detect CPU cores
            (true, n) => n,  // Use specified thread count
        }
    }

    /// Size of each range when `total` aligned bytes are split for parallel work
    ///
    /// Always a multiple of [`CHUNK_SIZE`] so every range except the last holds
    /// whole chunks; returns `total` when no split should happen.
    pub fn split_len(&self, total: usize) -> usize {
        let threads = self.effective_threads();
        if threads <= 1 || total <= self.min_split_bytes {
            return total;
        }

        let per_thread = total.div_ceil(threads).max(self.min_split_bytes);
        let aligned = per_thread.div_ceil(CHUNK_SIZE) * CHUNK_SIZE;
        aligned.min(total).max(CHUNK_SIZE)
    }
}
