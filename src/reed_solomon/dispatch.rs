//! Shape dispatch and the multiply-accumulate entry point
//!
//! A [`MulKernel`] is built once per coefficient matrix: it validates the
//! shape, materialises the table set and picks the specialised kernel pair for
//! that shape on the selected backend. Each call then only validates the shard
//! windows and runs the chunk loop.
//!
//! Only `((stop - start) / 32) * 32` bytes are processed. The returned length
//! tells the caller where the unprocessed remainder starts.

use super::error::{KernelError, KernelResult, ShardKind};
use super::matrix::CoefficientMatrix;
use super::shape::{Shape, MAX_INPUTS, MAX_OUTPUTS};
use super::simd::{chunk_count, select_kernels, simd_level, ShapeKernels, SimdLevel, CHUNK_SIZE};
use super::tables::TableSet;
use crate::config::KernelConfig;
use log::{debug, trace};
use smallvec::SmallVec;

/// Bytes of `[start, stop)` a kernel call processes
#[inline]
pub const fn processed_len(start: usize, stop: usize) -> usize {
    chunk_count(stop.saturating_sub(start)) * CHUNK_SIZE
}

/// Multiply-accumulate kernel with tables cached for one coefficient matrix
#[derive(Debug, Clone)]
pub struct MulKernel {
    tables: TableSet,
    level: SimdLevel,
    kernels: ShapeKernels,
}

impl MulKernel {
    /// Build for `matrix` on the best backend for this CPU
    pub fn new(matrix: &CoefficientMatrix) -> KernelResult<Self> {
        Self::with_level(matrix, simd_level())
    }

    /// Build using the backend named in `config`, if any
    pub fn with_config(matrix: &CoefficientMatrix, config: &KernelConfig) -> KernelResult<Self> {
        Self::with_level(matrix, config.simd_level.unwrap_or_else(simd_level))
    }

    /// Build for `matrix` on a specific backend
    pub fn with_level(matrix: &CoefficientMatrix, level: SimdLevel) -> KernelResult<Self> {
        let tables = TableSet::build(matrix)?;
        let shape = tables.shape();
        let kernels = select_kernels(level, shape)?;

        let strategy = shape.strategy();
        debug!(
            "Built {} kernel on {:?}: {} registers estimated, {:?} tables, {:?} output pointers",
            shape,
            level,
            shape.register_estimate(),
            strategy.tables,
            strategy.outputs
        );

        Ok(Self {
            tables,
            level,
            kernels,
        })
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.tables.shape()
    }

    #[inline]
    pub fn tables(&self) -> &TableSet {
        &self.tables
    }

    #[inline]
    pub fn simd_level(&self) -> SimdLevel {
        self.level
    }

    /// Multiply inputs by the matrix into outputs over `[start, stop)`
    ///
    /// With `accumulate` the products are XORed into the outputs, otherwise
    /// the outputs are overwritten. Returns the number of bytes processed from
    /// `start`; bytes past that are left untouched.
    pub fn mul_slices<In, Out>(
        &self,
        inputs: &[In],
        outputs: &mut [Out],
        start: usize,
        stop: usize,
        accumulate: bool,
    ) -> KernelResult<usize>
    where
        In: AsRef<[u8]>,
        Out: AsMut<[u8]>,
    {
        self.check_counts(inputs.len(), outputs.len())?;
        validate_windows(inputs, outputs, start, stop)?;

        let processed = processed_len(start, stop);
        let chunks = chunk_count(processed);
        trace!(
            "mul_slices {}: {} chunks ({} of {} bytes), accumulate={}",
            self.shape(),
            chunks,
            processed,
            stop - start,
            accumulate
        );
        if chunks == 0 {
            return Ok(0);
        }

        let ins: SmallVec<[&[u8]; MAX_INPUTS]> = inputs
            .iter()
            .map(|s| &s.as_ref()[start..start + processed])
            .collect();
        let mut outs: SmallVec<[&mut [u8]; MAX_OUTPUTS]> = outputs
            .iter_mut()
            .map(|s| &mut s.as_mut()[start..start + processed])
            .collect();

        self.run(&ins, &mut outs, chunks, accumulate);
        Ok(processed)
    }

    /// Shard counts must form a supported shape equal to the kernel's
    pub(crate) fn check_counts(&self, inputs: usize, outputs: usize) -> KernelResult<()> {
        let requested = Shape::new(inputs, outputs)?;
        let shape = self.shape();
        if requested != shape {
            return Err(KernelError::MatrixShapeMismatch {
                matrix_inputs: shape.inputs(),
                matrix_outputs: shape.outputs(),
                inputs,
                outputs,
            });
        }
        Ok(())
    }

    /// Run the selected kernel on pre-validated windows
    pub(crate) fn run(
        &self,
        inputs: &[&[u8]],
        outputs: &mut [&mut [u8]],
        chunks: usize,
        accumulate: bool,
    ) {
        let shape = self.shape();
        assert_eq!(inputs.len(), shape.inputs());
        assert_eq!(outputs.len(), shape.outputs());
        let len = chunks * CHUNK_SIZE;
        assert!(inputs.iter().all(|s| s.len() >= len));
        assert!(outputs.iter().all(|s| s.len() >= len));

        let kernel = self.kernels.get(accumulate);
        // SAFETY: counts match the shape the kernels and tables were built for,
        // every window holds `chunks` whole chunks, and `select_kernels` only
        // returned this backend after confirming the CPU supports it.
        unsafe { kernel(&self.tables, inputs, outputs, chunks) }
    }
}

/// Check `[start, stop)` against every shard and return its length
pub(crate) fn validate_windows<In, Out>(
    inputs: &[In],
    outputs: &mut [Out],
    start: usize,
    stop: usize,
) -> KernelResult<usize>
where
    In: AsRef<[u8]>,
    Out: AsMut<[u8]>,
{
    if start > stop {
        return Err(KernelError::InvalidRange { start, stop });
    }

    for (index, shard) in inputs.iter().enumerate() {
        let len = shard.as_ref().len();
        if len < stop {
            return Err(KernelError::ShardTooShort {
                kind: ShardKind::Input,
                index,
                len,
                stop,
            });
        }
    }

    for (index, shard) in outputs.iter_mut().enumerate() {
        let len = shard.as_mut().len();
        if len < stop {
            return Err(KernelError::ShardTooShort {
                kind: ShardKind::Output,
                index,
                len,
                stop,
            });
        }
    }

    Ok(stop - start)
}

/// One-shot multiply-accumulate: build tables for `matrix` and run once
///
/// Prefer [`MulKernel`] when the same matrix is applied repeatedly, since
/// table materialisation is the only per-matrix cost.
pub fn mul_slices<In, Out>(
    matrix: &CoefficientMatrix,
    inputs: &[In],
    outputs: &mut [Out],
    start: usize,
    stop: usize,
    accumulate: bool,
) -> KernelResult<usize>
where
    In: AsRef<[u8]>,
    Out: AsMut<[u8]>,
{
    // Report an out-of-range shard count before any matrix mismatch
    Shape::new(inputs.len(), outputs.len())?;
    MulKernel::new(matrix)?.mul_slices(inputs, outputs, start, stop, accumulate)
}
