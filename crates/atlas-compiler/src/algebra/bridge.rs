//! The bridge between class indices and rank-1 SGA elements.
//!
//! `lift` sends class `24·h₂ + 8·d + ℓ` to `e_ℓ ⊗ r^h₂ ⊗ τ^d` (with `e₀ = 1`);
//! `project` inverts it on rank-1 elements and reports anything else as not
//! representable.
//!
//! # Example
//!
//! ```
//! use atlas_compiler::ClassIndex;
//! use atlas_compiler::algebra::{lift, project};
//!
//! for c in ClassIndex::all() {
//!     assert_eq!(project(&lift(c)), Some(c));
//! }
//! ```

use super::clifford::{Blade, CliffordElement};
use super::cyclic::{Z3Element, Z4Element};
use super::sga::SgaElement;
use crate::core::class::ClassIndex;
use crate::core::constants::EPSILON;
use crate::error::{Error, Result};

/// Build `r^h ⊗ e_ℓ ⊗ τ^d`; each coordinate is reduced modulo its order.
#[must_use]
pub fn create_rank1_basis(h2: u8, d: u8, l: u8) -> SgaElement {
    SgaElement::new(
        CliffordElement::from_blade(Blade::slot(l), 1.0),
        Z4Element::power_of(h2 as usize),
        Z3Element::power_of(d as usize),
    )
}

/// Lift a class index to its rank-1 element.
#[must_use]
pub fn lift(class: ClassIndex) -> SgaElement {
    let c = class.coords();
    create_rank1_basis(c.h2, c.d, c.l)
}

/// Context slot of a rank-1 Clifford factor.
fn rank1_slot(clifford: &CliffordElement) -> Option<u8> {
    let mut terms = clifford.terms();
    let (blade, coeff) = terms.next()?;
    if terms.next().is_some() || (coeff - 1.0).abs() >= EPSILON {
        return None;
    }
    blade.as_slot()
}

/// True iff `x` is the lift of some class index.
#[must_use]
pub fn is_rank1(x: &SgaElement) -> bool {
    project(x).is_some()
}

/// Recover the class index of a rank-1 element, `None` otherwise.
#[must_use]
pub fn project(x: &SgaElement) -> Option<ClassIndex> {
    let l = rank1_slot(x.clifford())?;
    let h2 = x.z4().pure_power()?;
    let d = x.z3().pure_power()?;
    Some(ClassIndex::from_parts(h2, d, l))
}

/// Like [`project`], failing on elements that are not rank-1.
///
/// # Errors
///
/// Returns [`Error::ArithmeticDomain`] when `x` is not rank-1.
pub fn project_strict(x: &SgaElement) -> Result<ClassIndex> {
    project(x).ok_or_else(|| {
        Error::arithmetic_domain(format!("{x:?} is not rank-1 and has no class index"))
    })
}
