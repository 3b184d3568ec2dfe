//! Kernel shapes and the register-budget strategy for each one
//!
//! A shape is the pair (inputs, outputs). Every supported shape gets its own
//! specialised kernel, and each specialised kernel decides up front how it
//! spends the sixteen 256-bit vector registers of the target:
//!
//! - **Table residency**: with few inputs and outputs, every low/high table
//!   pair is broadcast into a register once, before the chunk loop. Otherwise
//!   the pair is reloaded from memory on each use, which requires the table set
//!   to be stored at doubled width so one 256-bit load fetches both lanes.
//! - **Output pointers**: when tables are reloaded and `inputs + outputs > 13`,
//!   general-purpose registers run out before vector registers do, so output
//!   addresses are recomputed from the output slices at each load/store instead
//!   of being held across the loop.
//!
//! ## Register estimate
//!
//! `2·I·O` table registers, one accumulator per output, plus five working
//! registers (input low/high nibbles, two lookup temporaries, nibble mask).
//! A single-output shape does not keep a copy of the input, saving two.

use super::error::{KernelError, KernelResult};
use std::fmt;

/// Largest supported input count
pub const MAX_INPUTS: usize = 12;

/// Largest supported output count
pub const MAX_OUTPUTS: usize = 10;

/// Vector registers available on the reference target (YMM0-YMM15)
pub const VECTOR_REGISTERS: usize = 16;

/// Above this many shard pointers, output pointers stop being held in registers
pub const POINTER_REGISTER_LIMIT: usize = 13;

/// Working vector registers needed besides tables and accumulators
const WORKING_REGISTERS: usize = 5;

/// Estimated vector registers needed to keep every table resident
pub const fn register_estimate(inputs: usize, outputs: usize) -> usize {
    let mut estimate = 2 * inputs * outputs + outputs + WORKING_REGISTERS;
    if outputs == 1 {
        // No held copy of the input when it feeds a single output
        estimate -= 2;
    }
    estimate
}

/// Where the per-(input, output) tables live during the chunk loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableResidency {
    /// Loaded into registers once, single-width storage
    Resident,
    /// Reloaded from memory on every use, doubled-width storage
    Reload,
}

/// How output addresses are obtained inside the chunk loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputPointers {
    /// Computed once and kept for the whole loop
    Held,
    /// Recomputed from the output slice at each load and store
    Reloaded,
}

/// The two register-allocation decisions made for a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strategy {
    pub tables: TableResidency,
    pub outputs: OutputPointers,
}

impl Strategy {
    /// Strategy for a shape, usable in const context by the generic kernels
    pub const fn for_counts(inputs: usize, outputs: usize) -> Self {
        if register_estimate(inputs, outputs) <= VECTOR_REGISTERS {
            return Strategy {
                tables: TableResidency::Resident,
                outputs: OutputPointers::Held,
            };
        }

        let pointers = if inputs + outputs > POINTER_REGISTER_LIMIT {
            OutputPointers::Reloaded
        } else {
            OutputPointers::Held
        };
        Strategy {
            tables: TableResidency::Reload,
            outputs: pointers,
        }
    }

    #[inline]
    pub const fn tables_resident(&self) -> bool {
        matches!(self.tables, TableResidency::Resident)
    }

    #[inline]
    pub const fn outputs_held(&self) -> bool {
        matches!(self.outputs, OutputPointers::Held)
    }
}

/// A validated (inputs, outputs) pair within the supported range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    inputs: usize,
    outputs: usize,
}

impl Shape {
    /// Validate shard counts against the supported range
    pub fn new(inputs: usize, outputs: usize) -> KernelResult<Self> {
        if Self::is_supported(inputs, outputs) {
            Ok(Self { inputs, outputs })
        } else {
            Err(KernelError::UnsupportedShape { inputs, outputs })
        }
    }

    pub const fn is_supported(inputs: usize, outputs: usize) -> bool {
        inputs >= 1 && inputs <= MAX_INPUTS && outputs >= 1 && outputs <= MAX_OUTPUTS
    }

    #[inline]
    pub const fn inputs(&self) -> usize {
        self.inputs
    }

    #[inline]
    pub const fn outputs(&self) -> usize {
        self.outputs
    }

    /// Number of (input, output) coefficient pairs
    #[inline]
    pub const fn pairs(&self) -> usize {
        self.inputs * self.outputs
    }

    pub const fn register_estimate(&self) -> usize {
        register_estimate(self.inputs, self.outputs)
    }

    pub const fn strategy(&self) -> Strategy {
        Strategy::for_counts(self.inputs, self.outputs)
    }

    /// Every supported shape, inputs-major
    pub fn all() -> impl Iterator<Item = Shape> {
        (1..=MAX_INPUTS).flat_map(|inputs| {
            (1..=MAX_OUTPUTS).map(move |outputs| Shape { inputs, outputs })
        })
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.inputs, self.outputs)
    }
}
