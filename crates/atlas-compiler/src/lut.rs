//! Precomputed lookup tables for O(1) arithmetic over ℤ₉₆.
//!
//! All tables are evaluated at compile time and stored in read-only memory,
//! so no initialization or synchronization happens at run time.
//!
//! # Tables Provided
//!
//! - **Coprime residues**: the 32 units of ℤ₉₆ (φ(96) = 32)
//! - **Unit flags**: `gcd(n, 96) = 1` for every residue
//! - **Factor96**: factorization of every residue over the coprime residues
//! - **Orbit distance**: transform-word distance from the prime generator 37
//!
//! # Example
//!
//! ```
//! use atlas_compiler::lut::{factor96_raw, is_prime96_raw, orbit_distance_raw};
//!
//! assert_eq!(factor96_raw(77), &[7, 11]);
//! assert!(is_prime96_raw(37));
//! assert!(!is_prime96_raw(12));
//! assert_eq!(orbit_distance_raw(37), 0);
//! ```

use crate::core::class::ClassIndex;
use crate::core::constants::{CLASS_COUNT, COPRIME_COUNT, MODULUS, PRIME_GENERATOR};
use crate::core::ring::gcd_raw;
use crate::transform::Transform;

// ============================================================================
// Unit (coprime residue) tables
// ============================================================================

const fn unit_table() -> [bool; CLASS_COUNT] {
    let mut table = [false; CLASS_COUNT];
    let mut n = 0;
    while n < CLASS_COUNT {
        table[n] = gcd_raw(n as u64, MODULUS as u64) == 1;
        n += 1;
    }
    table
}

const fn coprime_table() -> [u8; COPRIME_COUNT] {
    let units = unit_table();
    let mut table = [0u8; COPRIME_COUNT];
    let mut n = 0;
    let mut i = 0;
    while n < CLASS_COUNT {
        if units[n] {
            table[i] = n as u8;
            i += 1;
        }
        n += 1;
    }
    table
}

/// `IS_UNIT[n]` is true iff `gcd(n, 96) = 1`.
pub static IS_UNIT: [bool; CLASS_COUNT] = unit_table();

/// The 32 residues coprime to 96, ascending.
pub static COPRIME_RESIDUES: [u8; COPRIME_COUNT] = coprime_table();

// ============================================================================
// Factorization table
// ============================================================================

/// Most factors any residue has (5 · 5 · 5 = 125 already exceeds 95).
pub const MAX_FACTORS: usize = 2;

/// `FACTOR96[n] = (len, factors)`.
///
/// Units are trial-divided by the coprime residues in ascending order, so
/// their factors are the integer prime factors of `n`. `1` and every
/// non-unit factor as themselves. In all cases the factors multiply back to
/// `n` modulo 96.
pub static FACTOR96: [(u8, [u8; MAX_FACTORS]); CLASS_COUNT] = {
    let units = unit_table();
    let coprimes = coprime_table();
    let mut table = [(0u8, [0u8; MAX_FACTORS]); CLASS_COUNT];
    let mut n = 0;
    while n < CLASS_COUNT {
        if n <= 1 || !units[n] {
            table[n] = (1, [n as u8, 0]);
        } else {
            let mut m = n;
            let mut len = 0;
            let mut factors = [0u8; MAX_FACTORS];
            let mut i = 1; // skip residue 1
            while m > 1 {
                let p = coprimes[i] as usize;
                if m % p == 0 {
                    factors[len] = p as u8;
                    len += 1;
                    m /= p;
                } else {
                    i += 1;
                }
            }
            table[n] = (len as u8, factors);
        }
        n += 1;
    }
    table
};

/// O(1) factorization of a raw residue. Values ≥ 96 are reduced first.
#[inline]
#[must_use]
pub fn factor96_raw(n: u8) -> &'static [u8] {
    let (len, factors) = &FACTOR96[n as usize % CLASS_COUNT];
    &factors[..*len as usize]
}

/// O(1) factorization of a class index.
#[must_use]
pub fn factor96(class: ClassIndex) -> Vec<ClassIndex> {
    factor96_raw(class.value())
        .iter()
        .map(|f| ClassIndex::wrapping(*f as u64))
        .collect()
}

/// O(1) unit test on a raw residue. Values ≥ 96 are reduced first.
#[inline]
#[must_use]
pub const fn is_prime96_raw(n: u8) -> bool {
    IS_UNIT[n as usize % CLASS_COUNT]
}

/// A class is prime in ℤ₉₆ iff it is coprime to 96.
#[inline]
#[must_use]
pub const fn is_prime96(class: ClassIndex) -> bool {
    is_prime96_raw(class.value())
}

// ============================================================================
// Orbit distance table
// ============================================================================

const GENERATORS: [Transform; 4] = [Transform::R(1), Transform::D(1), Transform::T(1), Transform::M];

/// `ORBIT_DISTANCE[n]` = fewest applications of `R1`, `D1`, `T1`, `M` that
/// take class 37 to class `n` (breadth-first search over the Cayley graph).
pub static ORBIT_DISTANCE: [u8; CLASS_COUNT] = {
    let mut dist = [u8::MAX; CLASS_COUNT];
    let mut queue = [0u8; CLASS_COUNT];
    let (mut head, mut tail) = (0, 1);
    queue[0] = PRIME_GENERATOR;
    dist[PRIME_GENERATOR as usize] = 0;
    while head < tail {
        let cur = queue[head];
        head += 1;
        let mut g = 0;
        while g < GENERATORS.len() {
            let next = GENERATORS[g].apply_class(ClassIndex::wrapping(cur as u64)).value();
            if dist[next as usize] == u8::MAX {
                dist[next as usize] = dist[cur as usize] + 1;
                queue[tail] = next;
                tail += 1;
            }
            g += 1;
        }
    }
    dist
};

/// O(1) orbit distance of a raw residue from class 37.
#[inline]
#[must_use]
pub const fn orbit_distance_raw(n: u8) -> u8 {
    ORBIT_DISTANCE[n as usize % CLASS_COUNT]
}

/// O(1) orbit distance of a class from the prime generator.
#[inline]
#[must_use]
pub const fn orbit_distance(class: ClassIndex) -> u8 {
    orbit_distance_raw(class.value())
}

// ============================================================================
// Hierarchical (base-96) factorization
// ============================================================================

/// One base-96 digit with its ℤ₉₆ factorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Base96Digit {
    /// Digit value.
    pub value: ClassIndex,
    /// Position, 0 = least significant.
    pub position: usize,
    /// Factorization of the digit.
    pub factors: Vec<ClassIndex>,
}

/// Split `n` into little-endian base-96 digits, each factored.
///
/// Zero has the single digit 0.
///
/// ```
/// use atlas_compiler::lut::{factor_hierarchical, recompose};
///
/// let digits = factor_hierarchical(1000); // 1000 = 40 + 10·96
/// assert_eq!(digits.len(), 2);
/// assert_eq!(digits[0].value.value(), 40);
/// assert_eq!(recompose(&digits), Some(1000));
/// ```
#[must_use]
pub fn factor_hierarchical(mut n: u64) -> Vec<Base96Digit> {
    let mut digits = Vec::new();
    let mut position = 0;
    loop {
        let value = ClassIndex::wrapping(n);
        digits.push(Base96Digit {
            value,
            position,
            factors: factor96(value),
        });
        n /= CLASS_COUNT as u64;
        position += 1;
        if n == 0 {
            break;
        }
    }
    digits
}

/// Recompose digits into an integer, `None` on u64 overflow.
#[must_use]
pub fn recompose(digits: &[Base96Digit]) -> Option<u64> {
    digits.iter().rev().try_fold(0u64, |acc, d| {
        acc.checked_mul(CLASS_COUNT as u64)?
            .checked_add(d.value.value() as u64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coprime_residues() {
        assert_eq!(COPRIME_RESIDUES.len(), 32);
        assert_eq!(&COPRIME_RESIDUES[..6], &[1, 5, 7, 11, 13, 17]);
        assert_eq!(COPRIME_RESIDUES[31], 95);
        for r in COPRIME_RESIDUES {
            assert!(r % 2 != 0 && r % 3 != 0);
        }
    }

    #[test]
    fn test_factor96_known_values() {
        assert_eq!(factor96_raw(77), &[7, 11]);
        assert_eq!(factor96_raw(25), &[5, 5]);
        assert_eq!(factor96_raw(37), &[37]);
        assert_eq!(factor96_raw(95), &[5, 19]);
        assert_eq!(factor96_raw(1), &[1]);
        assert_eq!(factor96_raw(0), &[0]);
        assert_eq!(factor96_raw(12), &[12]);
    }

    #[test]
    fn test_factors_multiply_back() {
        for n in 0..96u8 {
            let product = factor96_raw(n)
                .iter()
                .fold(1u64, |acc, f| acc * *f as u64 % 96);
            assert_eq!(product, n as u64, "factor96({n})");
        }
    }

    #[test]
    fn test_unit_factors_are_units() {
        for n in COPRIME_RESIDUES {
            for f in factor96_raw(n) {
                assert!(is_prime96_raw(*f), "factor {f} of {n}");
            }
        }
    }

    #[test]
    fn test_is_prime96_is_gcd_one() {
        for n in 0..96u8 {
            assert_eq!(is_prime96_raw(n), gcd_raw(n as u64, 96) == 1);
        }
    }

    #[test]
    fn test_orbit_distance_reaches_every_class() {
        assert_eq!(orbit_distance_raw(37), 0);
        for n in 0..96u8 {
            assert!(orbit_distance_raw(n) < u8::MAX, "{n} unreachable");
        }
        // one step: R1, D1, T1, M
        for g in GENERATORS {
            let next = g.apply_class(ClassIndex::wrapping(37));
            assert_eq!(orbit_distance(next), 1);
        }
    }

    #[test]
    fn test_hierarchical_digits() {
        assert_eq!(factor_hierarchical(0).len(), 1);
        let digits = factor_hierarchical(77 + 96 * 12);
        assert_eq!(digits[0].factors, factor96(ClassIndex::wrapping(77)));
        assert_eq!(digits[1].value.value(), 12);
        assert_eq!(recompose(&digits), Some(77 + 96 * 12));
        assert_eq!(recompose(&factor_hierarchical(u64::MAX)), Some(u64::MAX));
    }
}
