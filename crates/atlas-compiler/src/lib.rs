//! Atlas model compiler
//!
//! Compiles small declarative models over the 96-class Atlas structure
//! into executable plans. A model is an expression tree of atoms (ring
//! operations mod 96, reductions, table lookups, lift/project),
//! combinators (sequence, parallel) and transforms (R, D, T, M).
//!
//! # Pipeline
//!
//! ```text
//! ModelDescriptor ─▶ validate ─▶ normalize ─▶ analyze ─▶ select ─▶ lower ─▶ CompiledModel
//! ```
//!
//! - **Normalize** pushes every transform down to the leaves and collapses
//!   each leaf's chain to canonical form `[M?, Rʳ, Dᵈ, Tᵗ]`.
//! - **Analyze** measures the tree and assigns a complexity class C0 to C3.
//! - **Select** picks the class backend (96-entry tables, fused when fully
//!   compile-time) for C0/C1 and the SGA backend (Clifford ⊗ ℤ₄ ⊗ ℤ₃) for
//!   C2/C3, unless the descriptor names a backend.
//!
//! # Class Structure
//!
//! | Coordinate | Range | Transform |
//! |------------|-------|-----------|
//! | `h₂` (quadrant) | 0..4 | `R` |
//! | `d` (modality) | 0..3 | `D` |
//! | `ℓ` (context) | 0..8 | `T` |
//!
//! `class = 24·h₂ + 8·d + ℓ`; `M` negates all three coordinates.
//!
//! # Example: Ring Arithmetic
//!
//! ```
//! use atlas_compiler::{ring, ClassIndex};
//!
//! let a = ClassIndex::new(50).unwrap();
//! let b = ClassIndex::new(60).unwrap();
//! let r = ring::add(a, b);
//! assert_eq!((r.value.value(), r.overflow), (14, true));
//! ```
//!
//! # Example: Transforms
//!
//! ```
//! use atlas_compiler::{ClassIndex, Transform, TransformChain};
//!
//! let chain = TransformChain::from_outer([Transform::mirror(), Transform::rotate(1)]);
//! assert_eq!(chain.apply_class(ClassIndex::new(8).unwrap()).value(), 88);
//! assert!(chain.compose(chain.inverse()).is_identity());
//! ```
//!
//! # Example: Compiling a Model
//!
//! ```
//! use atlas_compiler::ir::build::{mirror, param, rotate, seq, factor96};
//! use atlas_compiler::{compile, BackendKind, Inputs, ModelDescriptor, ParamKind, Value};
//!
//! let body = rotate(1, seq(param("x"), mirror(factor96())));
//! let model = compile(ModelDescriptor::new("demo", body).with_runtime("x", ParamKind::Class)).unwrap();
//! assert_eq!(model.backend(), BackendKind::Class);
//!
//! let out = model.run(&Inputs::new().with("x", 77u64)).unwrap();
//! assert!(matches!(out, Value::Classes(_)));
//! ```
//!
//! # Example: Ready-made Models
//!
//! ```
//! use atlas_compiler::{models, Inputs, OverflowMode, Value};
//!
//! let sub = models::sub96(OverflowMode::Drop).unwrap();
//! let out = sub.run(&Inputs::new().with("a", 10u64).with("b", 20u64)).unwrap();
//! assert_eq!(out.as_class().map(|c| c.value()), Some(86));
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

pub mod algebra;
pub mod analysis;
pub mod backend;
pub mod conformance;
pub mod core;
pub mod descriptor;
pub mod error;
pub mod ir;
pub mod lut;
pub mod model;
pub mod models;
pub mod rewrite;
pub mod select;
pub mod transform;
pub mod value;

pub use crate::core::class::{ClassCoords, ClassIndex};
pub use crate::core::ring::{self as ring, OverflowMode, RingResult};
pub use crate::core::constants;
pub use analysis::ComplexityClass;
pub use descriptor::ModelDescriptor;
pub use error::{Error, Result};
pub use model::{compile, compile_with, CompiledModel};
pub use select::{BackendKind, CompilerConfig, SelectorPolicy};
pub use transform::{Transform, TransformChain};
pub use value::{InputValue, Inputs, ParamKind, Value};
