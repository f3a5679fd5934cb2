//! Class indices and their (h₂, d, ℓ) coordinates.
//!
//! A class index is an integer in `[0, 95]`, uniquely decomposed as
//!
//! ```text
//! class = 24·h₂ + 8·d + ℓ      h₂ ∈ ℤ₄, d ∈ ℤ₃, ℓ ∈ ℤ₈
//! ```
//!
//! # Example
//!
//! ```
//! use atlas_compiler::{ClassIndex, ClassCoords};
//!
//! let c = ClassIndex::new(29).unwrap();
//! assert_eq!(c.coords(), ClassCoords { h2: 1, d: 0, l: 5 });
//! assert_eq!(ClassIndex::from_coords(c.coords()), c);
//! ```

use super::constants::{CLASS_COUNT, CONTEXTS, MODALITIES, MODALITY_STRIDE, QUADRANTS, QUADRANT_STRIDE};
use crate::error::{Error, Result};
use core::fmt;
use serde::{Deserialize, Serialize};

/// A validated class index in `[0, 95]`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ClassIndex(u8);

/// The three coordinates of a class index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassCoords {
    /// Quadrant, `h₂ ∈ {0..3}`.
    pub h2: u8,
    /// Modality, `d ∈ {0..2}`.
    pub d: u8,
    /// Context slot, `ℓ ∈ {0..7}`; 0 is the scalar slot.
    pub l: u8,
}

impl ClassIndex {
    /// The zero class (h₂ = d = ℓ = 0).
    pub const ZERO: Self = Self(0);

    /// The multiplicative unit class.
    pub const ONE: Self = Self(1);

    /// Largest class index.
    pub const MAX: Self = Self(CLASS_COUNT as u8 - 1);

    /// Create a class index, rejecting values outside `[0, 95]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when `value >= 96`.
    pub fn new(value: u8) -> Result<Self> {
        Self::checked(value).ok_or_else(|| {
            Error::validation("class", format!("class index {value} out of range [0, 95]"))
        })
    }

    /// Create a class index, returning `None` when out of range.
    #[inline]
    #[must_use]
    pub const fn checked(value: u8) -> Option<Self> {
        if (value as usize) < CLASS_COUNT {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Reduce an arbitrary integer modulo 96.
    #[inline]
    #[must_use]
    pub const fn wrapping(value: u64) -> Self {
        Self((value % CLASS_COUNT as u64) as u8)
    }

    /// Build a class from raw coordinates, reducing each modulo its order.
    #[inline]
    #[must_use]
    pub const fn from_parts(h2: u8, d: u8, l: u8) -> Self {
        let h2 = h2 % QUADRANTS as u8;
        let d = d % MODALITIES as u8;
        let l = l % CONTEXTS as u8;
        Self(QUADRANT_STRIDE * h2 + MODALITY_STRIDE * d + l)
    }

    /// Recompose a class from its coordinates.
    #[inline]
    #[must_use]
    pub const fn from_coords(c: ClassCoords) -> Self {
        Self::from_parts(c.h2, c.d, c.l)
    }

    /// Decompose into (h₂, d, ℓ).
    #[inline]
    #[must_use]
    pub const fn coords(self) -> ClassCoords {
        let h2 = self.0 / QUADRANT_STRIDE;
        let rem = self.0 % QUADRANT_STRIDE;
        ClassCoords {
            h2,
            d: rem / MODALITY_STRIDE,
            l: rem % MODALITY_STRIDE,
        }
    }

    /// Raw value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Iterate over all 96 classes in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..CLASS_COUNT as u8).map(Self)
    }
}

/// Decompose a raw integer, rejecting out-of-range values.
///
/// # Errors
///
/// Returns [`Error::ArithmeticDomain`] when `value >= 96`.
pub fn decompose(value: u64) -> Result<ClassCoords> {
    if value >= CLASS_COUNT as u64 {
        return Err(Error::arithmetic_domain(format!(
            "cannot decompose {value}: class indices lie in [0, 95]"
        )));
    }
    Ok(ClassIndex(value as u8).coords())
}

impl TryFrom<u8> for ClassIndex {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ClassIndex> for u8 {
    fn from(c: ClassIndex) -> u8 {
        c.0
    }
}

impl fmt::Debug for ClassIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.coords();
        write!(f, "Class({}: h2={}, d={}, l={})", self.0, c.h2, c.d, c.l)
    }
}

impl fmt::Display for ClassIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
