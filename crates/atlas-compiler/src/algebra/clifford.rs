//! The Clifford algebra Cl(0,7).
//!
//! Seven basis vectors `e₁..e₇` that pairwise anticommute and each square to
//! −1. A basis element ("blade") is a sorted subset of `{1..7}`, stored as a
//! bitmask where bit `i-1` marks `eᵢ`; the empty blade is the scalar.
//!
//! # Context slots
//!
//! The class coordinate ℓ ranges over an 8-slot ring: slot 0 is the scalar
//! and slot `i` is `eᵢ`. Relabelling transforms act on that ring. A blade of
//! any grade is viewed as an odd-sized set of slots (its vector indices,
//! plus slot 0 when its grade is even), so shifting or reflecting the slot
//! ring is a bijection on all 128 blades that agrees with the ℓ action on
//! the scalar and the seven vectors.
//!
//! # Example
//!
//! ```
//! use atlas_compiler::algebra::CliffordElement;
//!
//! let e1 = CliffordElement::basis(1).unwrap();
//! let e2 = CliffordElement::basis(2).unwrap();
//! // e₁² = −1
//! assert!(e1.mul(&e1).approx_eq(&CliffordElement::scalar(-1.0)));
//! // e₁e₂ = −e₂e₁
//! assert!(e1.mul(&e2).approx_eq(&e2.mul(&e1).neg()));
//! ```

use crate::core::constants::{BASIS_VECTORS, EPSILON, MAX_GRADE};
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;

/// A basis blade of Cl(0,7), as a bitmask over `e₁..e₇`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Blade(u8);

impl Blade {
    /// The scalar (empty) blade.
    pub const SCALAR: Self = Self(0);

    /// Bitmask covering all seven basis vectors.
    const FULL: u8 = (1 << BASIS_VECTORS) - 1;

    /// Blade from a raw bitmask; bits above the seventh are ignored.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::FULL)
    }

    /// The single basis vector `eᵢ`, `i ∈ 1..=7`.
    #[inline]
    #[must_use]
    pub const fn vector(i: u8) -> Option<Self> {
        if i >= 1 && i as usize <= BASIS_VECTORS {
            Some(Self(1 << (i - 1)))
        } else {
            None
        }
    }

    /// The blade occupying context slot `ℓ` (0 is the scalar).
    #[inline]
    #[must_use]
    pub const fn slot(l: u8) -> Self {
        match Self::vector(l % 8) {
            Some(b) => b,
            None => Self::SCALAR,
        }
    }

    /// Raw bitmask.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Number of basis vectors in the blade.
    #[inline]
    #[must_use]
    pub const fn grade(self) -> u8 {
        self.0.count_ones() as u8
    }

    /// Context slot of a grade ≤ 1 blade.
    #[inline]
    #[must_use]
    pub const fn as_slot(self) -> Option<u8> {
        match self.grade() {
            0 => Some(0),
            1 => Some(self.0.trailing_zeros() as u8 + 1),
            _ => None,
        }
    }

    /// Sorted basis-vector indices.
    pub fn indices(self) -> impl Iterator<Item = u8> {
        (1..=BASIS_VECTORS as u8).filter(move |i| self.0 & (1 << (i - 1)) != 0)
    }

    /// Geometric product of two blades: resulting blade and sign.
    ///
    /// The sign collects one factor −1 per transposition needed to sort the
    /// concatenated indices, and one per repeated vector (`eᵢ² = −1`).
    #[must_use]
    pub const fn product(self, other: Self) -> (Self, f64) {
        let mut a = self.0 >> 1;
        let mut swaps = 0u32;
        while a != 0 {
            swaps += (a & other.0).count_ones();
            a >>= 1;
        }
        swaps += (self.0 & other.0).count_ones();
        let sign = if swaps % 2 == 0 { 1.0 } else { -1.0 };
        (Self(self.0 ^ other.0), sign)
    }

    /// Encode as an odd-sized subset of the 8 context slots.
    const fn to_slots(self) -> u8 {
        let shifted = self.0 << 1;
        if self.grade() % 2 == 0 {
            shifted | 1
        } else {
            shifted
        }
    }

    /// Inverse of [`Blade::to_slots`].
    const fn from_slots(slots: u8) -> Self {
        Self((slots >> 1) & Self::FULL)
    }

    /// Relabel every slot `s` to `s + k (mod 8)`.
    #[inline]
    #[must_use]
    pub const fn shift_slots(self, k: u8) -> Self {
        Self::from_slots(self.to_slots().rotate_left((k % 8) as u32))
    }

    /// Relabel every slot `s` to `−s (mod 8)`.
    #[must_use]
    pub const fn mirror_slots(self) -> Self {
        let slots = self.to_slots();
        let mut out = slots & 1;
        let mut s = 1;
        while s < 8 {
            if slots & (1 << s) != 0 {
                out |= 1 << (8 - s);
            }
            s += 1;
        }
        Self::from_slots(out)
    }
}

impl fmt::Debug for Blade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("1");
        }
        f.write_str("e")?;
        for i in self.indices() {
            write!(f, "{i}")?;
        }
        Ok(())
    }
}

/// A multivector: a sparse map from blade to real coefficient.
#[derive(Clone, PartialEq, Default)]
pub struct CliffordElement {
    terms: BTreeMap<Blade, f64>,
}

impl CliffordElement {
    /// The zero multivector.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// The scalar 1.
    #[must_use]
    pub fn identity() -> Self {
        Self::scalar(1.0)
    }

    /// A pure scalar.
    #[must_use]
    pub fn scalar(s: f64) -> Self {
        Self::from_blade(Blade::SCALAR, s)
    }

    /// `c · blade`.
    #[must_use]
    pub fn from_blade(blade: Blade, c: f64) -> Self {
        let mut terms = BTreeMap::new();
        if c.abs() >= EPSILON {
            terms.insert(blade, c);
        }
        Self { terms }
    }

    /// The basis vector `eᵢ`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] unless `1 ≤ i ≤ 7`.
    pub fn basis(i: u8) -> Result<Self> {
        let blade = Blade::vector(i).ok_or_else(|| {
            Error::validation("basis", format!("basis vector index {i} out of range [1, 7]"))
        })?;
        Ok(Self::from_blade(blade, 1.0))
    }

    /// Coefficient of `blade` (0 when absent).
    #[must_use]
    pub fn coefficient(&self, blade: Blade) -> f64 {
        self.terms.get(&blade).copied().unwrap_or(0.0)
    }

    /// Non-zero terms in blade order.
    pub fn terms(&self) -> impl Iterator<Item = (Blade, f64)> + '_ {
        self.terms.iter().map(|(b, c)| (*b, *c))
    }

    /// Number of non-zero terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True for the zero multivector.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    fn accumulate(terms: &mut BTreeMap<Blade, f64>, blade: Blade, c: f64) {
        let entry = terms.entry(blade).or_insert(0.0);
        *entry += c;
        if entry.abs() < EPSILON {
            terms.remove(&blade);
        }
    }

    fn map_terms(&self, f: impl Fn(Blade, f64) -> (Blade, f64)) -> Self {
        let mut terms = BTreeMap::new();
        for (b, c) in self.terms() {
            let (nb, nc) = f(b, c);
            Self::accumulate(&mut terms, nb, nc);
        }
        Self { terms }
    }

    /// Geometric product.
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        let mut terms = BTreeMap::new();
        for (a, ca) in self.terms() {
            for (b, cb) in other.terms() {
                let (blade, sign) = a.product(b);
                Self::accumulate(&mut terms, blade, sign * ca * cb);
            }
        }
        Self { terms }
    }

    /// Sum.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let mut terms = self.terms.clone();
        for (b, c) in other.terms() {
            Self::accumulate(&mut terms, b, c);
        }
        Self { terms }
    }

    /// Difference.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Scalar multiple.
    #[must_use]
    pub fn scale(&self, s: f64) -> Self {
        self.map_terms(|b, c| (b, c * s))
    }

    /// Additive inverse.
    #[must_use]
    pub fn neg(&self) -> Self {
        self.scale(-1.0)
    }

    /// Keep only the blades of grade `grade`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when `grade > 7`.
    pub fn grade_project(&self, grade: u8) -> Result<Self> {
        if grade > MAX_GRADE {
            return Err(Error::validation(
                "grade",
                format!("grade {grade} out of range [0, {MAX_GRADE}]"),
            ));
        }
        Ok(Self {
            terms: self
                .terms
                .iter()
                .filter(|(b, _)| b.grade() == grade)
                .map(|(b, c)| (*b, *c))
                .collect(),
        })
    }

    /// Grade involution: negate odd-grade blades.
    #[must_use]
    pub fn grade_involution(&self) -> Self {
        self.map_terms(|b, c| (b, if b.grade() % 2 == 1 { -c } else { c }))
    }

    /// Reversion: reverse the vector order within each blade.
    #[must_use]
    pub fn reversion(&self) -> Self {
        self.map_terms(|b, c| {
            let g = b.grade() as u32;
            (b, if (g * g.saturating_sub(1) / 2) % 2 == 1 { -c } else { c })
        })
    }

    /// Clifford conjugation: reversion composed with grade involution.
    #[must_use]
    pub fn conjugate(&self) -> Self {
        self.reversion().grade_involution()
    }

    /// Shift every blade around the slot ring by `k`.
    #[must_use]
    pub fn shift_slots(&self, k: u8) -> Self {
        self.map_terms(|b, c| (b.shift_slots(k), c))
    }

    /// Reflect every blade through slot 0.
    #[must_use]
    pub fn mirror_slots(&self) -> Self {
        self.map_terms(|b, c| (b.mirror_slots(), c))
    }

    /// Equality within [`EPSILON`] on every blade.
    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.terms
            .keys()
            .chain(other.terms.keys())
            .all(|b| (self.coefficient(*b) - other.coefficient(*b)).abs() < EPSILON)
    }
}

impl fmt::Debug for CliffordElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return f.write_str("0");
        }
        let mut first = true;
        for (b, c) in self.terms() {
            if !first {
                f.write_str(" + ")?;
            }
            first = false;
            write!(f, "{c}·{b:?}")?;
        }
        Ok(())
    }
}
