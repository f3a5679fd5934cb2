//! Transform automorphisms R, D, T and M.
//!
//! | Transform | Class action            | SGA action                          |
//! |-----------|-------------------------|-------------------------------------|
//! | `R(k)`    | `h₂ ↦ h₂ + k (mod 4)`   | left-multiply ℤ₄ factor by `rᵏ`      |
//! | `D(k)`    | `d ↦ d + k (mod 3)`     | right-multiply ℤ₃ factor by `τᵏ`     |
//! | `T(k)`    | `ℓ ↦ ℓ + k (mod 8)`     | shift every blade's context slots   |
//! | `M`       | negate all three coords | invert both cyclic factors, reflect slots |
//!
//! The group relations `R⁴ = D³ = T⁸ = M² = id`, pairwise commutation of
//! R, D and T, and `MRM = R⁻¹`, `MDM = D⁻¹`, `MTM = T⁻¹` hold on both
//! representations, and the two actions agree on rank-1 elements.
//!
//! # Example
//!
//! ```
//! use atlas_compiler::{ClassIndex, Transform};
//!
//! let x = ClassIndex::new(5).unwrap();
//! assert_eq!(Transform::rotate(1).apply_class(x).value(), 29);
//! assert_eq!(Transform::mirror().apply_class(ClassIndex::new(8).unwrap()).value(), 16);
//! ```

use crate::algebra::SgaElement;
use crate::core::class::ClassIndex;
use crate::core::constants::{CONTEXTS, MODALITIES, QUADRANTS};
use core::fmt;
use serde::{Deserialize, Serialize};

/// The four transform families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransformKind {
    /// Quadrant rotation.
    Rotate,
    /// Modality (triality) rotation.
    Triality,
    /// Context twist.
    Twist,
    /// Mirror.
    Mirror,
}

impl TransformKind {
    /// Order of the generator.
    #[must_use]
    pub const fn order(self) -> u8 {
        match self {
            Self::Rotate => QUADRANTS as u8,
            Self::Triality => MODALITIES as u8,
            Self::Twist => CONTEXTS as u8,
            Self::Mirror => 2,
        }
    }
}

/// A single transform with its exponent.
///
/// Exponents are reduced modulo the generator order by the constructors;
/// the actions reduce again, so a hand-built `R(9)` behaves as `R(1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transform {
    /// `R(k)`, k mod 4.
    R(u8),
    /// `D(k)`, k mod 3.
    D(u8),
    /// `T(k)`, k mod 8.
    T(u8),
    /// `M`.
    M,
}

impl Transform {
    /// `R(k mod 4)`.
    #[must_use]
    pub const fn rotate(k: i64) -> Self {
        Self::R(k.rem_euclid(QUADRANTS as i64) as u8)
    }

    /// `D(k mod 3)`.
    #[must_use]
    pub const fn triality(k: i64) -> Self {
        Self::D(k.rem_euclid(MODALITIES as i64) as u8)
    }

    /// `T(k mod 8)`.
    #[must_use]
    pub const fn twist(k: i64) -> Self {
        Self::T(k.rem_euclid(CONTEXTS as i64) as u8)
    }

    /// `M`.
    #[must_use]
    pub const fn mirror() -> Self {
        Self::M
    }

    /// The transform family.
    #[must_use]
    pub const fn kind(self) -> TransformKind {
        match self {
            Self::R(_) => TransformKind::Rotate,
            Self::D(_) => TransformKind::Triality,
            Self::T(_) => TransformKind::Twist,
            Self::M => TransformKind::Mirror,
        }
    }

    /// Exponent reduced modulo the order (`M` counts as 1).
    #[must_use]
    pub const fn exponent(self) -> u8 {
        match self {
            Self::R(k) | Self::D(k) | Self::T(k) => k % self.kind().order(),
            Self::M => 1,
        }
    }

    /// Same transform with its exponent reduced.
    #[must_use]
    pub const fn reduced(self) -> Self {
        match self {
            Self::R(k) => Self::rotate(k as i64),
            Self::D(k) => Self::triality(k as i64),
            Self::T(k) => Self::twist(k as i64),
            Self::M => Self::M,
        }
    }

    /// True for `R(0)`, `D(0)` and `T(0)`.
    #[must_use]
    pub const fn is_identity(self) -> bool {
        !matches!(self, Self::M) && self.exponent() == 0
    }

    /// Transform of the same family with exponent `k`.
    #[must_use]
    pub const fn of_kind(kind: TransformKind, k: i64) -> Self {
        match kind {
            TransformKind::Rotate => Self::rotate(k),
            TransformKind::Triality => Self::triality(k),
            TransformKind::Twist => Self::twist(k),
            TransformKind::Mirror => Self::M,
        }
    }

    /// Group inverse.
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::M => Self::M,
            g => Self::of_kind(g.kind(), -(g.exponent() as i64)),
        }
    }

    /// Direct action on a class index.
    #[must_use]
    pub const fn apply_class(self, class: ClassIndex) -> ClassIndex {
        let c = class.coords();
        match self {
            Self::R(k) => ClassIndex::from_parts(c.h2 + k % 4, c.d, c.l),
            Self::D(k) => ClassIndex::from_parts(c.h2, c.d + k % 3, c.l),
            Self::T(k) => ClassIndex::from_parts(c.h2, c.d, c.l + k % 8),
            Self::M => ClassIndex::from_parts(4 - c.h2, 3 - c.d, 8 - c.l),
        }
    }

    /// Action on an SGA element.
    #[must_use]
    pub fn apply_sga(self, x: &SgaElement) -> SgaElement {
        match self.reduced() {
            Self::R(k) => x.shift_quadrant(k),
            Self::D(k) => x.shift_modality(k),
            Self::T(k) => x.shift_context(k),
            Self::M => x.mirror(),
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::R(k) => write!(f, "R{k}"),
            Self::D(k) => write!(f, "D{k}"),
            Self::T(k) => write!(f, "T{k}"),
            Self::M => f.write_str("M"),
        }
    }
}

/// A canonical element of the transform group, `M^m ∘ Rʳ ∘ Dᵈ ∘ Tᵗ`.
///
/// Every finite word over R, D, T, M reduces to exactly one chain, so two
/// words denote the same automorphism iff their chains are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TransformChain {
    /// Mirror parity.
    pub mirror: bool,
    /// Rotation exponent, mod 4.
    pub r: u8,
    /// Triality exponent, mod 3.
    pub d: u8,
    /// Twist exponent, mod 8.
    pub t: u8,
}

impl TransformChain {
    /// The identity chain.
    pub const IDENTITY: Self = Self { mirror: false, r: 0, d: 0, t: 0 };

    /// Reduce a transform word, given outermost first.
    ///
    /// ```
    /// use atlas_compiler::{Transform, TransformChain};
    ///
    /// // M ∘ R1 ∘ M = R3
    /// let chain = TransformChain::from_outer([Transform::M, Transform::R(1), Transform::M]);
    /// assert_eq!(chain.to_transforms(), vec![Transform::R(3)]);
    /// ```
    pub fn from_outer(word: impl IntoIterator<Item = Transform>) -> Self {
        let word: Vec<Transform> = word.into_iter().collect();
        word.iter()
            .rev()
            .fold(Self::IDENTITY, |chain, g| chain.then(*g))
    }

    /// `g ∘ self`: apply `g` after this chain.
    #[must_use]
    pub const fn then(self, g: Transform) -> Self {
        // Moving g inside M^m conjugates it; for R, D and T that negates the exponent.
        let sign: i64 = if self.mirror { -1 } else { 1 };
        match g.reduced() {
            Transform::R(k) => Self {
                r: (self.r as i64 + sign * k as i64).rem_euclid(4) as u8,
                ..self
            },
            Transform::D(k) => Self {
                d: (self.d as i64 + sign * k as i64).rem_euclid(3) as u8,
                ..self
            },
            Transform::T(k) => Self {
                t: (self.t as i64 + sign * k as i64).rem_euclid(8) as u8,
                ..self
            },
            Transform::M => Self {
                mirror: !self.mirror,
                ..self
            },
        }
    }

    /// `self ∘ inner`.
    #[must_use]
    pub const fn compose(self, inner: Self) -> Self {
        let mut out = inner;
        out = out.then(Transform::T(self.t));
        out = out.then(Transform::D(self.d));
        out = out.then(Transform::R(self.r));
        if self.mirror {
            out = out.then(Transform::M);
        }
        out
    }

    /// Group inverse.
    #[must_use]
    pub const fn inverse(self) -> Self {
        if self.mirror {
            // M ∘ g is an involution for every g in ⟨R, D, T⟩.
            self
        } else {
            Self {
                mirror: false,
                r: (4 - self.r) % 4,
                d: (3 - self.d) % 3,
                t: (8 - self.t) % 8,
            }
        }
    }

    /// True for the identity chain.
    #[must_use]
    pub const fn is_identity(self) -> bool {
        !self.mirror && self.r == 0 && self.d == 0 && self.t == 0
    }

    /// Canonical word, outermost first, with identity factors dropped.
    #[must_use]
    pub fn to_transforms(self) -> Vec<Transform> {
        let mut out = Vec::with_capacity(4);
        if self.mirror {
            out.push(Transform::M);
        }
        for g in [Transform::R(self.r), Transform::D(self.d), Transform::T(self.t)] {
            if !g.is_identity() {
                out.push(g);
            }
        }
        out
    }

    /// Action on a class index.
    #[must_use]
    pub fn apply_class(self, class: ClassIndex) -> ClassIndex {
        self.to_transforms()
            .iter()
            .rev()
            .fold(class, |c, g| g.apply_class(c))
    }

    /// Action on an SGA element.
    #[must_use]
    pub fn apply_sga(self, x: &SgaElement) -> SgaElement {
        self.to_transforms()
            .iter()
            .rev()
            .fold(x.clone(), |acc, g| g.apply_sga(&acc))
    }
}

impl From<Transform> for TransformChain {
    fn from(g: Transform) -> Self {
        Self::IDENTITY.then(g)
    }
}

impl fmt::Display for TransformChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = self.to_transforms();
        if word.is_empty() {
            return f.write_str("id");
        }
        for (i, g) in word.iter().enumerate() {
            if i > 0 {
                f.write_str("∘")?;
            }
            write!(f, "{g}")?;
        }
        Ok(())
    }
}
