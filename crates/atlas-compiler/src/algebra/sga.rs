//! The sigmatics geometric algebra: Cl(0,7) ⊗ ℝ[ℤ₄] ⊗ ℝ[ℤ₃].
//!
//! An [`SgaElement`] is stored as a pure tensor `c ⊗ z₄ ⊗ z₃`. The three
//! factors act on disjoint data and commute, so multiplication distributes
//! factor by factor. Addition is also taken factor by factor; that is exact
//! for the rank-1 elements the bridge produces, which is the domain the
//! compiler relies on.

use super::clifford::CliffordElement;
use super::cyclic::{Z3Element, Z4Element};
use crate::error::Result;
use core::fmt;

/// Element of the tensor algebra Cl(0,7) ⊗ ℝ[ℤ₄] ⊗ ℝ[ℤ₃].
#[derive(Clone, PartialEq, Default)]
pub struct SgaElement {
    clifford: CliffordElement,
    z4: Z4Element,
    z3: Z3Element,
}

impl SgaElement {
    /// Assemble from the three tensor factors.
    #[must_use]
    pub fn new(clifford: CliffordElement, z4: Z4Element, z3: Z3Element) -> Self {
        Self { clifford, z4, z3 }
    }

    /// Multiplicative identity `1 ⊗ 1 ⊗ 1`.
    #[must_use]
    pub fn identity() -> Self {
        Self::new(CliffordElement::identity(), Z4Element::identity(), Z3Element::identity())
    }

    /// The zero element.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Clifford factor.
    #[must_use]
    pub fn clifford(&self) -> &CliffordElement {
        &self.clifford
    }

    /// Quadrant factor.
    #[must_use]
    pub fn z4(&self) -> &Z4Element {
        &self.z4
    }

    /// Triality factor.
    #[must_use]
    pub fn z3(&self) -> &Z3Element {
        &self.z3
    }

    /// Factor-wise product.
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        Self {
            clifford: self.clifford.mul(&other.clifford),
            z4: self.z4.mul(&other.z4),
            z3: self.z3.mul(&other.z3),
        }
    }

    /// Factor-wise sum.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        Self {
            clifford: self.clifford.add(&other.clifford),
            z4: self.z4.add(&other.z4),
            z3: self.z3.add(&other.z3),
        }
    }

    /// Factor-wise difference.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        Self {
            clifford: self.clifford.sub(&other.clifford),
            z4: self.z4.sub(&other.z4),
            z3: self.z3.sub(&other.z3),
        }
    }

    /// Scalar multiple. The scalar is carried by the Clifford factor.
    #[must_use]
    pub fn scale(&self, s: f64) -> Self {
        Self {
            clifford: self.clifford.scale(s),
            ..self.clone()
        }
    }

    /// Project the Clifford factor onto a single grade.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Validation`] when `grade > 7`.
    pub fn grade_project(&self, grade: u8) -> Result<Self> {
        Ok(Self {
            clifford: self.clifford.grade_project(grade)?,
            ..self.clone()
        })
    }

    /// Multiply the quadrant factor by `rᵏ`.
    #[must_use]
    pub fn shift_quadrant(&self, k: u8) -> Self {
        Self {
            z4: Z4Element::power_of(k as usize).mul(&self.z4),
            ..self.clone()
        }
    }

    /// Multiply the triality factor by `τᵏ` on the right.
    #[must_use]
    pub fn shift_modality(&self, k: u8) -> Self {
        Self {
            z3: self.z3.mul(&Z3Element::power_of(k as usize)),
            ..self.clone()
        }
    }

    /// Relabel the context slots of every blade by `+k (mod 8)`.
    #[must_use]
    pub fn shift_context(&self, k: u8) -> Self {
        Self {
            clifford: self.clifford.shift_slots(k),
            ..self.clone()
        }
    }

    /// Orientation reversal: invert both cyclic factors and reflect the
    /// context slots.
    #[must_use]
    pub fn mirror(&self) -> Self {
        Self {
            clifford: self.clifford.mirror_slots(),
            z4: self.z4.mirror(),
            z3: self.z3.mirror(),
        }
    }

    /// Equality within the algebra tolerance on every factor.
    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.clifford.approx_eq(&other.clifford)
            && self.z4.approx_eq(&other.z4)
            && self.z3.approx_eq(&other.z3)
    }
}

impl fmt::Debug for SgaElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}) ⊗ {:?} ⊗ {:?}", self.clifford, self.z4, self.z3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SgaElement {
        let c = CliffordElement::basis(3).unwrap().add(&CliffordElement::scalar(0.5));
        SgaElement::new(c, Z4Element::power_of(1), Z3Element::power_of(2))
    }

    #[test]
    fn test_identity_is_neutral() {
        let x = sample();
        assert!(x.mul(&SgaElement::identity()).approx_eq(&x));
        assert!(SgaElement::identity().mul(&x).approx_eq(&x));
    }

    #[test]
    fn test_shifts_have_group_orders() {
        let x = sample();
        let mut y = x.clone();
        for _ in 0..4 {
            y = y.shift_quadrant(1);
        }
        assert!(y.approx_eq(&x));
        assert!(x.shift_modality(3).approx_eq(&x));
        assert!(x.shift_context(8).approx_eq(&x));
        assert!(x.mirror().mirror().approx_eq(&x));
    }

    #[test]
    fn test_grade_project_keeps_cyclic_factors() {
        let x = sample().grade_project(1).unwrap();
        assert_eq!(x.clifford().len(), 1);
        assert_eq!(x.z4().pure_power(), Some(1));
        assert_eq!(x.z3().pure_power(), Some(2));
    }

    #[test]
    fn test_scale_and_sub() {
        let x = sample();
        assert!(x.scale(2.0).clifford().approx_eq(&x.clifford().add(x.clifford())));
        assert!(x.sub(&x).clifford().is_empty());
    }
}
