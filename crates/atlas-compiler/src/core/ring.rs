//! Ring operations on class indices (mod 96).
//!
//! Class indices form the ring ℤ₉₆. Addition, subtraction and
//! multiplication wrap modulo 96; the overflow-tracking variants also report
//! whether the unreduced result fell outside `[0, 96)`.
//!
//! `gcd`/`lcm` run the Euclidean algorithm on the residues themselves, so the
//! results are ring-relative: `lcm(12, 40)` is `120 mod 96 = 24`, not 120.

use super::class::ClassIndex;
use super::constants::MODULUS;
use core::fmt;
use serde::{Deserialize, Serialize};

/// How a ring operation treats results outside `[0, 96)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowMode {
    /// Reduce modulo 96 and continue.
    #[default]
    Drop,
    /// Reduce modulo 96 and stop execution, reporting the overflow flag.
    Track,
}

impl OverflowMode {
    /// Surface-syntax keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Track => "track",
        }
    }
}

impl fmt::Display for OverflowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Result of an overflow-tracking ring operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RingResult {
    /// Reduced value.
    pub value: ClassIndex,
    /// True iff the unreduced result fell outside `[0, 96)`.
    pub overflow: bool,
}

impl RingResult {
    #[inline]
    fn reduce(unreduced: i32) -> Self {
        let m = MODULUS as i32;
        Self {
            value: ClassIndex::wrapping(unreduced.rem_euclid(m) as u64),
            overflow: !(0..m).contains(&unreduced),
        }
    }
}

/// Addition with overflow report.
///
/// # Example
///
/// ```
/// use atlas_compiler::{ClassIndex, ring};
///
/// let r = ring::add(ClassIndex::new(50).unwrap(), ClassIndex::new(60).unwrap());
/// assert_eq!(r.value.value(), 14);
/// assert!(r.overflow);
/// ```
#[inline]
#[must_use]
pub fn add(a: ClassIndex, b: ClassIndex) -> RingResult {
    RingResult::reduce(a.value() as i32 + b.value() as i32)
}

/// Subtraction with overflow (underflow) report.
#[inline]
#[must_use]
pub fn sub(a: ClassIndex, b: ClassIndex) -> RingResult {
    RingResult::reduce(a.value() as i32 - b.value() as i32)
}

/// Multiplication with overflow report.
#[inline]
#[must_use]
pub fn mul(a: ClassIndex, b: ClassIndex) -> RingResult {
    RingResult::reduce(a.value() as i32 * b.value() as i32)
}

/// Additive inverse (`96 - a mod 96`).
#[inline]
#[must_use]
pub fn neg(a: ClassIndex) -> ClassIndex {
    ClassIndex::wrapping((MODULUS - a.value() as u16) as u64)
}

/// Euclidean gcd of two residues. `gcd(0, 0) = 0`.
#[inline]
#[must_use]
pub const fn gcd_raw(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Ring-relative gcd.
#[inline]
#[must_use]
pub fn gcd(a: ClassIndex, b: ClassIndex) -> ClassIndex {
    ClassIndex::wrapping(gcd_raw(a.value() as u64, b.value() as u64))
}

/// Ring-relative lcm, reduced modulo 96. `lcm(0, x) = 0`.
#[inline]
#[must_use]
pub fn lcm(a: ClassIndex, b: ClassIndex) -> ClassIndex {
    let (x, y) = (a.value() as u64, b.value() as u64);
    if x == 0 || y == 0 {
        return ClassIndex::ZERO;
    }
    ClassIndex::wrapping(x / gcd_raw(x, y) * y)
}

/// Sum of all values modulo 96. The empty sum is 0.
#[must_use]
pub fn sum(values: &[ClassIndex]) -> ClassIndex {
    let total = values
        .iter()
        .fold(0u64, |acc, v| (acc + v.value() as u64) % MODULUS as u64);
    ClassIndex::wrapping(total)
}

/// Product of all values modulo 96. The empty product is 1.
#[must_use]
pub fn product(values: &[ClassIndex]) -> ClassIndex {
    let total = values
        .iter()
        .fold(1u64, |acc, v| (acc * v.value() as u64) % MODULUS as u64);
    ClassIndex::wrapping(total)
}

/// Largest value, `None` for an empty slice.
#[must_use]
pub fn max(values: &[ClassIndex]) -> Option<ClassIndex> {
    values.iter().copied().max()
}

/// Smallest value, `None` for an empty slice.
#[must_use]
pub fn min(values: &[ClassIndex]) -> Option<ClassIndex> {
    values.iter().copied().min()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(v: u8) -> ClassIndex {
        ClassIndex::new(v).unwrap()
    }

    #[test]
    fn test_add_overflow() {
        assert_eq!(add(c(50), c(60)), RingResult { value: c(14), overflow: true });
        assert_eq!(add(c(40), c(55)), RingResult { value: c(95), overflow: false });
        assert!(add(c(48), c(48)).overflow);
    }

    #[test]
    fn test_sub_underflow() {
        assert_eq!(sub(c(10), c(20)), RingResult { value: c(86), overflow: true });
        assert_eq!(sub(c(20), c(10)), RingResult { value: c(10), overflow: false });
        assert!(!sub(c(0), c(0)).overflow);
    }

    #[test]
    fn test_mul_overflow() {
        assert_eq!(mul(c(7), c(11)), RingResult { value: c(77), overflow: false });
        assert_eq!(mul(c(12), c(8)), RingResult { value: c(0), overflow: true });
    }

    #[test]
    fn test_neg_is_additive_inverse() {
        for x in ClassIndex::all() {
            assert_eq!(add(x, neg(x)).value, ClassIndex::ZERO);
        }
    }

    #[test]
    fn test_gcd_lcm_ring_relative() {
        assert_eq!(gcd(c(12), c(40)), c(4));
        assert_eq!(lcm(c(12), c(40)), c(24)); // 120 mod 96
        assert_eq!(gcd(c(0), c(0)), c(0));
        assert_eq!(gcd(c(0), c(9)), c(9));
        assert_eq!(lcm(c(0), c(9)), c(0));
    }

    #[test]
    fn test_reductions() {
        let xs = [c(50), c(60), c(3)];
        assert_eq!(sum(&xs), c(17));
        assert_eq!(product(&xs), c(72)); // 9000 mod 96
        assert_eq!(max(&xs), Some(c(60)));
        assert_eq!(min(&xs), Some(c(3)));
        assert_eq!(sum(&[]), c(0));
        assert_eq!(product(&[]), c(1));
        assert_eq!(max(&[]), None);
    }
}
