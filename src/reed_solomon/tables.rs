//! Split multiplication tables for PSHUFB-style GF(2^8) lookups
//!
//! ## Technique
//!
//! PSHUFB performs sixteen parallel 4-bit table lookups per 128-bit lane. A
//! full multiplication table has 256 entries, so each byte is split into its
//! two nibbles and looked up twice:
//!
//! ```text
//! c · x = low[x & 0x0F] ^ high[x >> 4]
//! low[n]  = c · n
//! high[n] = c · (n << 4)
//! ```
//!
//! This works because multiplication by a constant is linear over XOR and
//! `x = (x & 0x0F) ^ (x & 0xF0)`.
//!
//! ## Table sets
//!
//! A kernel for shape (I, O) needs `I·O` table pairs. [`TableSet`] stores them
//! input-major (`index = i·O + j`), the order the chunk loop visits them. Shapes
//! whose tables stay resident in registers get single-width storage, broadcast
//! into both 128-bit lanes once. Shapes that reload tables every iteration get
//! doubled-width storage, each table written twice back to back, so one
//! unaligned 256-bit load yields the lane-replicated table directly.

use super::error::KernelResult;
use super::galois::{multiply_bitwise, Galois8};
use super::matrix::CoefficientMatrix;
use super::shape::{Shape, TableResidency};
use std::sync::OnceLock;

/// Low/high nibble tables for one coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct SplitTable {
    /// `coefficient · n` for n in 0..16
    pub low: [u8; 16],
    /// `coefficient · (n << 4)` for n in 0..16
    pub high: [u8; 16],
}

impl SplitTable {
    /// Multiply one byte through the two nibble lookups
    #[inline]
    pub fn lookup(&self, x: u8) -> u8 {
        self.low[(x & 0x0F) as usize] ^ self.high[(x >> 4) as usize]
    }
}

/// Build the nibble tables for a coefficient
///
/// Entries are computed with the bitwise field product, so the result does
/// not depend on any shared state. Zero yields all-zero tables.
pub fn build_split_table(coefficient: Galois8) -> SplitTable {
    let c = coefficient.value();
    let mut low = [0u8; 16];
    let mut high = [0u8; 16];

    for nib in 0..16u8 {
        low[nib as usize] = multiply_bitwise(c, nib);
        high[nib as usize] = multiply_bitwise(c, nib << 4);
    }

    SplitTable { low, high }
}

/// Shared split tables for every coefficient, built on first use
pub fn split_tables() -> &'static [SplitTable; 256] {
    static TABLES: OnceLock<Box<[SplitTable; 256]>> = OnceLock::new();
    TABLES.get_or_init(|| {
        let mut tables = Box::new(
            [SplitTable {
                low: [0; 16],
                high: [0; 16],
            }; 256],
        );
        for (c, table) in tables.iter_mut().enumerate() {
            *table = build_split_table(Galois8::new(c as u8));
        }
        tables
    })
}

/// Cached split table for one coefficient
#[inline]
pub fn split_table(coefficient: u8) -> &'static SplitTable {
    &split_tables()[coefficient as usize]
}

/// Storage width of a materialised table set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableWidth {
    /// One 16-byte copy per table
    Single,
    /// Two adjacent 16-byte copies per table
    Doubled,
}

impl TableWidth {
    /// Copies of each table stored
    #[inline]
    pub const fn copies(&self) -> usize {
        match self {
            TableWidth::Single => 1,
            TableWidth::Doubled => 2,
        }
    }
}

impl From<TableResidency> for TableWidth {
    fn from(residency: TableResidency) -> Self {
        match residency {
            TableResidency::Resident => TableWidth::Single,
            TableResidency::Reload => TableWidth::Doubled,
        }
    }
}

/// Every table pair a kernel of one shape needs, laid out for that kernel
///
/// Built once per coefficient matrix and read-only afterwards; share it
/// freely across threads and calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSet {
    shape: Shape,
    width: TableWidth,
    low: Vec<[u8; 16]>,
    high: Vec<[u8; 16]>,
}

impl TableSet {
    /// Materialise tables for a matrix at the width its shape's strategy needs
    pub fn build(matrix: &CoefficientMatrix) -> KernelResult<Self> {
        let shape = matrix.shape()?;
        Ok(Self::with_width(matrix, shape, shape.strategy().tables.into()))
    }

    fn with_width(matrix: &CoefficientMatrix, shape: Shape, width: TableWidth) -> Self {
        let copies = width.copies();
        let mut low = Vec::with_capacity(shape.pairs() * copies);
        let mut high = Vec::with_capacity(shape.pairs() * copies);

        for input in 0..shape.inputs() {
            for output in 0..shape.outputs() {
                let table = split_table(matrix.get(output, input).value());
                for _ in 0..copies {
                    low.push(table.low);
                    high.push(table.high);
                }
            }
        }

        Self {
            shape,
            width,
            low,
            high,
        }
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    #[inline]
    pub fn width(&self) -> TableWidth {
        self.width
    }

    /// Slot of the first copy for (input, output)
    #[inline]
    pub fn slot(&self, input: usize, output: usize) -> usize {
        (input * self.shape.outputs() + output) * self.width.copies()
    }

    /// Low/high tables applied to `input` when producing `output`
    #[inline]
    pub fn pair(&self, input: usize, output: usize) -> (&[u8; 16], &[u8; 16]) {
        let slot = self.slot(input, output);
        (&self.low[slot], &self.high[slot])
    }

    /// All low tables as contiguous bytes
    #[inline]
    pub fn low_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.low)
    }

    /// All high tables as contiguous bytes
    #[inline]
    pub fn high_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.high)
    }
}
