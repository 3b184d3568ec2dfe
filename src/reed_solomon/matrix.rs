//! Coefficient matrices for the multiply-accumulate kernels
//!
//! A matrix has one row per output shard and one column per input shard:
//! `output[j] = Σ matrix[j][i] · input[i]` over GF(2^8). Construction and
//! inversion of encoding/decoding matrices happen elsewhere; this type only
//! carries the coefficients into a kernel.

use super::error::{KernelError, KernelResult};
use super::galois::Galois8;
use super::shape::Shape;

/// Row-major (by output) matrix of GF(2^8) coefficients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoefficientMatrix {
    outputs: usize,
    inputs: usize,
    data: Vec<u8>,
}

impl CoefficientMatrix {
    /// Build from flat row-major data of `outputs * inputs` bytes
    pub fn new(outputs: usize, inputs: usize, data: Vec<u8>) -> KernelResult<Self> {
        let len = data.len();
        if outputs.checked_mul(inputs) != Some(len) {
            return Err(KernelError::MatrixDataLength {
                outputs,
                inputs,
                len,
            });
        }
        Ok(Self {
            outputs,
            inputs,
            data,
        })
    }

    /// Build from one slice per output row
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> KernelResult<Self> {
        let inputs = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * inputs);

        for (row, r) in rows.iter().enumerate() {
            let r = r.as_ref();
            if r.len() != inputs {
                return Err(KernelError::RaggedMatrix {
                    row,
                    len: r.len(),
                    expected: inputs,
                });
            }
            data.extend_from_slice(r);
        }

        Ok(Self {
            outputs: rows.len(),
            inputs,
            data,
        })
    }

    /// Square identity matrix
    pub fn identity(size: usize) -> Self {
        let mut data = vec![0u8; size * size];
        for i in 0..size {
            data[i * size + i] = 1;
        }
        Self {
            outputs: size,
            inputs: size,
            data,
        }
    }

    #[inline]
    pub fn outputs(&self) -> usize {
        self.outputs
    }

    #[inline]
    pub fn inputs(&self) -> usize {
        self.inputs
    }

    /// Validated kernel shape for this matrix
    pub fn shape(&self) -> KernelResult<Shape> {
        Shape::new(self.inputs, self.outputs)
    }

    /// Coefficient applied to `input` when producing `output`
    #[inline]
    pub fn get(&self, output: usize, input: usize) -> Galois8 {
        Galois8::new(self.data[output * self.inputs + input])
    }

    /// Coefficients for one output
    #[inline]
    pub fn row(&self, output: usize) -> &[u8] {
        &self.data[output * self.inputs..(output + 1) * self.inputs]
    }

    /// Element-wise field sum, `None` when dimensions differ
    pub fn add(&self, other: &Self) -> Option<Self> {
        if self.outputs != other.outputs || self.inputs != other.inputs {
            return None;
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a ^ b)
            .collect();
        Some(Self {
            outputs: self.outputs,
            inputs: self.inputs,
            data,
        })
    }
}
