//! Algebraic foundation: group algebras, Cl(0,7), and their tensor product.
//!
//! - [`cyclic`]: ℝ[ℤ₄] and ℝ[ℤ₃] with cyclic-convolution products
//! - [`clifford`]: multivectors over seven anticommuting, square −1 vectors
//! - [`sga`]: the tensor product of the three
//! - [`bridge`]: `lift`/`project` between class indices and rank-1 elements
//!
//! All coefficient comparisons use [`EPSILON`](crate::core::constants::EPSILON).

pub mod bridge;
pub mod clifford;
pub mod cyclic;
pub mod sga;

pub use bridge::{create_rank1_basis, is_rank1, lift, project, project_strict};
pub use clifford::{Blade, CliffordElement};
pub use cyclic::{CyclicElement, Z3Element, Z4Element};
pub use sga::SgaElement;
