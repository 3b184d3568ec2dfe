//! Galois Field GF(2^8) arithmetic for the multiply-accumulate kernels
//!
//! ## Field Polynomial
//!
//! The field is generated by the primitive irreducible polynomial
//! **0x11D** (x⁸ + x⁴ + x³ + x² + 1), the usual choice for byte-oriented
//! Reed-Solomon erasure codes. Only this one field is supported.
//!
//! Addition and subtraction are XOR. Multiplication and division go through
//! log/exp tables that are built once and shared by every thread.
//!
//! [`multiply_bitwise`] is the unaccelerated shift-and-xor product. It does not
//! touch any table and serves as the reference the split tables are checked
//! against.

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};
use std::sync::OnceLock;

/// GF(2^8) field polynomial: 0x11D (x⁸ + x⁴ + x³ + x² + 1)
pub const GF8_GENERATOR: u32 = 0x11D;

/// Number of field elements
const COUNT: usize = 256;

/// Order of the multiplicative group
const LIMIT: usize = COUNT - 1;

/// Log/exp tables for fast field arithmetic
///
/// `exp` is stored twice over so that `exp[log a + log b]` never needs a
/// modulo reduction.
pub struct GaloisTable {
    pub log: [u8; COUNT],
    pub exp: [u8; 2 * LIMIT],
}

impl Default for GaloisTable {
    fn default() -> Self {
        Self::new()
    }
}

impl GaloisTable {
    pub fn new() -> Self {
        let mut table = GaloisTable {
            log: [0; COUNT],
            exp: [0; 2 * LIMIT],
        };
        table.build_tables();
        table
    }

    fn build_tables(&mut self) {
        let mut b = 1u32;

        for l in 0..LIMIT {
            self.log[b as usize] = l as u8;
            self.exp[l] = b as u8;
            self.exp[l + LIMIT] = b as u8;

            b <<= 1;
            if b & COUNT as u32 != 0 {
                b ^= GF8_GENERATOR;
            }
        }

        // log(0) is undefined; keep a sentinel so lookups never go out of range
        self.log[0] = 0;
    }

    /// Shared table instance, built on first use
    pub fn get() -> &'static GaloisTable {
        static TABLE: OnceLock<GaloisTable> = OnceLock::new();
        TABLE.get_or_init(GaloisTable::new)
    }
}

/// Multiply two field elements with the shift-and-xor method
///
/// This is the reference product: no tables, one conditional reduction per bit.
#[inline]
pub const fn multiply_bitwise(a: u8, b: u8) -> u8 {
    let mut a = a as u32;
    let mut b = b as u32;
    let mut product = 0u32;

    while b != 0 {
        if b & 1 != 0 {
            product ^= a;
        }
        a <<= 1;
        if a & COUNT as u32 != 0 {
            a ^= GF8_GENERATOR;
        }
        b >>= 1;
    }

    product as u8
}

/// GF(2^8) field element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Galois8 {
    value: u8,
}

impl Galois8 {
    pub const ZERO: Self = Self { value: 0 };
    pub const ONE: Self = Self { value: 1 };

    #[inline]
    pub const fn new(value: u8) -> Self {
        Self { value }
    }

    #[inline]
    pub const fn value(&self) -> u8 {
        self.value
    }

    /// Power operation
    pub fn pow(&self, exponent: u32) -> Self {
        if exponent == 0 {
            return Self::ONE;
        }
        if self.value == 0 {
            return Self::ZERO;
        }

        let table = GaloisTable::get();
        let log_val = table.log[self.value as usize] as u64;
        let result_log = (log_val * exponent as u64) % LIMIT as u64;
        Self::new(table.exp[result_log as usize])
    }

    /// Multiplicative inverse, `None` for zero
    pub fn inverse(&self) -> Option<Self> {
        if self.value == 0 {
            return None;
        }
        let table = GaloisTable::get();
        let log_val = table.log[self.value as usize] as usize;
        Some(Self::new(table.exp[LIMIT - log_val]))
    }

    /// Discrete logarithm to base 2, `None` for zero
    pub fn log(&self) -> Option<u8> {
        if self.value == 0 {
            return None;
        }
        Some(GaloisTable::get().log[self.value as usize])
    }

    /// 2 raised to `power`
    pub fn exp(power: u8) -> Self {
        Self::new(GaloisTable::get().exp[power as usize % LIMIT])
    }
}

// Addition (XOR in Galois fields)
impl Add for Galois8 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.value ^ rhs.value)
    }
}

impl AddAssign for Galois8 {
    fn add_assign(&mut self, rhs: Self) {
        self.value ^= rhs.value;
    }
}

// Subtraction (same as addition in GF(2^n))
impl Sub for Galois8 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.value ^ rhs.value)
    }
}

impl SubAssign for Galois8 {
    fn sub_assign(&mut self, rhs: Self) {
        self.value ^= rhs.value;
    }
}

// Multiplication using log tables
impl Mul for Galois8 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        if self.value == 0 || rhs.value == 0 {
            return Self::ZERO;
        }

        let table = GaloisTable::get();
        let log_sum =
            table.log[self.value as usize] as usize + table.log[rhs.value as usize] as usize;
        Self::new(table.exp[log_sum])
    }
}

impl MulAssign for Galois8 {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

// Division using log tables
impl Div for Galois8 {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        if rhs.value == 0 {
            panic!("Division by zero in Galois field");
        }
        if self.value == 0 {
            return Self::ZERO;
        }

        let table = GaloisTable::get();
        let log_diff = table.log[self.value as usize] as usize + LIMIT
            - table.log[rhs.value as usize] as usize;
        Self::new(table.exp[log_diff])
    }
}

impl DivAssign for Galois8 {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl From<u8> for Galois8 {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<Galois8> for u8 {
    fn from(val: Galois8) -> Self {
        val.value
    }
}

impl std::fmt::Display for Galois8 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#04x}", self.value)
    }
}
