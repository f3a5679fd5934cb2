//! Real group algebras ℝ[ℤₙ] of finite cyclic groups.
//!
//! An element is a formal sum `Σ cᵢ gⁱ` over powers of the generator `g`,
//! stored as its coefficient vector. Multiplication is cyclic convolution:
//!
//! ```text
//! (a · b)ₖ = Σ_{i + j ≡ k (mod n)} aᵢ bⱼ
//! ```
//!
//! The two instances used by the SGA are [`Z4Element`] (quadrant factor,
//! generator `r`) and [`Z3Element`] (triality factor, generator `τ`).
//!
//! # Example
//!
//! ```
//! use atlas_compiler::algebra::Z4Element;
//!
//! let r = Z4Element::generator();
//! assert!(r.power(4).approx_eq(&Z4Element::identity()));
//! assert_eq!(r.power(3).pure_power(), Some(3));
//! ```

use crate::core::constants::EPSILON;
use crate::error::{Error, Result};
use core::fmt;

/// Element of ℝ[ℤₙ].
#[derive(Clone, Copy, PartialEq)]
pub struct CyclicElement<const N: usize> {
    coeffs: [f64; N],
}

/// Element of ℝ[ℤ₄] (quadrant factor).
pub type Z4Element = CyclicElement<4>;

/// Element of ℝ[ℤ₃] (triality factor).
pub type Z3Element = CyclicElement<3>;

impl<const N: usize> CyclicElement<N> {
    /// Group order.
    pub const ORDER: usize = N;

    /// Build from a coefficient vector (index i holds the coefficient of gⁱ).
    #[inline]
    #[must_use]
    pub const fn from_coeffs(coeffs: [f64; N]) -> Self {
        Self { coeffs }
    }

    /// The zero element.
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self { coeffs: [0.0; N] }
    }

    /// The identity `g⁰`.
    #[inline]
    #[must_use]
    pub fn identity() -> Self {
        Self::power_of(0)
    }

    /// The generator `g`.
    #[inline]
    #[must_use]
    pub fn generator() -> Self {
        Self::power_of(1)
    }

    /// The pure power `gᵏ` (k reduced modulo n).
    #[must_use]
    pub fn power_of(k: usize) -> Self {
        let mut coeffs = [0.0; N];
        coeffs[k % N] = 1.0;
        Self { coeffs }
    }

    /// `selfᵏ` by repeated multiplication.
    #[must_use]
    pub fn power(&self, k: usize) -> Self {
        (0..k).fold(Self::identity(), |acc, _| acc.mul(self))
    }

    /// Coefficient vector.
    #[inline]
    #[must_use]
    pub const fn coeffs(&self) -> &[f64; N] {
        &self.coeffs
    }

    /// Cyclic convolution.
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        let mut coeffs = [0.0; N];
        for (i, a) in self.coeffs.iter().enumerate() {
            if *a == 0.0 {
                continue;
            }
            for (j, b) in other.coeffs.iter().enumerate() {
                coeffs[(i + j) % N] += a * b;
            }
        }
        Self { coeffs }
    }

    /// Coefficient-wise sum.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        Self {
            coeffs: core::array::from_fn(|i| self.coeffs[i] + other.coeffs[i]),
        }
    }

    /// Coefficient-wise difference.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        Self {
            coeffs: core::array::from_fn(|i| self.coeffs[i] - other.coeffs[i]),
        }
    }

    /// Scalar multiple.
    #[must_use]
    pub fn scale(&self, s: f64) -> Self {
        Self {
            coeffs: self.coeffs.map(|c| c * s),
        }
    }

    /// Multiply by `gᵏ`; on coefficient vectors this is a cyclic rotation.
    #[must_use]
    pub fn shift(&self, k: usize) -> Self {
        let k = k % N;
        Self {
            coeffs: core::array::from_fn(|i| self.coeffs[(i + N - k) % N]),
        }
    }

    /// Apply the group automorphism `g ↦ g⁻¹` (coefficient i moves to −i).
    #[must_use]
    pub fn mirror(&self) -> Self {
        Self {
            coeffs: core::array::from_fn(|i| self.coeffs[(N - i) % N]),
        }
    }

    /// Exponent `k` if this element is exactly `gᵏ` within [`EPSILON`].
    #[must_use]
    pub fn pure_power(&self) -> Option<u8> {
        let mut found = None;
        for (i, c) in self.coeffs.iter().enumerate() {
            if (c - 1.0).abs() < EPSILON {
                if found.is_some() {
                    return None;
                }
                found = Some(i as u8);
            } else if c.abs() >= EPSILON {
                return None;
            }
        }
        found
    }

    /// Inverse of a pure power.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArithmeticDomain`] unless the element is a pure power.
    pub fn invert(&self) -> Result<Self> {
        let k = self.pure_power().ok_or_else(|| {
            Error::arithmetic_domain(format!(
                "cannot invert {self:?} in R[Z{N}]: only pure powers are invertible"
            ))
        })?;
        Ok(Self::power_of(N - k as usize))
    }

    /// Equality within [`EPSILON`].
    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.coeffs
            .iter()
            .zip(other.coeffs.iter())
            .all(|(a, b)| (a - b).abs() < EPSILON)
    }
}

impl<const N: usize> Default for CyclicElement<N> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const N: usize> fmt::Debug for CyclicElement<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pure_power() {
            Some(k) => write!(f, "Z{N}(g^{k})"),
            None => write!(f, "Z{N}{:?}", self.coeffs),
        }
    }
}
