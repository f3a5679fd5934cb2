//! Constants of the 96-class structure.
//!
//! Every constant derives from the three cyclic factors of the class
//! decomposition `class = 24·h₂ + 8·d + ℓ`. No constant is arbitrary.

/// Quadrant count (order of ℤ₄, the h₂ coordinate).
pub const QUADRANTS: usize = 4;

/// Modality count (order of ℤ₃, the d coordinate).
///
/// Triality: the same three-fold symmetry that partitions bytes into domains.
pub const MODALITIES: usize = 3;

/// Context slot count (order of the ℓ ring).
///
/// Slot 0 is the scalar, slots 1..=7 are the basis vectors of Cl(0,7).
pub const CONTEXTS: usize = 8;

/// Number of anticommuting basis vectors in Cl(0,7).
pub const BASIS_VECTORS: usize = CONTEXTS - 1;

/// Stride of one modality step inside a quadrant (8).
pub const MODALITY_STRIDE: u8 = CONTEXTS as u8;

/// Stride of one quadrant step (24).
pub const QUADRANT_STRIDE: u8 = (MODALITIES * CONTEXTS) as u8;

/// Total number of classes (96 = 4 × 3 × 8).
pub const CLASS_COUNT: usize = QUADRANTS * MODALITIES * CONTEXTS;

/// Ring modulus for class arithmetic.
pub const MODULUS: u16 = CLASS_COUNT as u16;

/// Number of residues coprime to 96 (Euler's φ(96) = 32).
pub const COPRIME_COUNT: usize = 32;

/// Prime generator class with minimal orbit complexity.
pub const PRIME_GENERATOR: u8 = 37;

/// Highest grade a Clifford blade can have.
pub const MAX_GRADE: u8 = BASIS_VECTORS as u8;

/// Tolerance for floating-point comparisons in the algebra layers.
pub const EPSILON: f64 = 1e-9;
