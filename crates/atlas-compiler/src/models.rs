//! Ready-made models for the standard operations.
//!
//! Binary ring models take classes `a` and `b`; reductions take a class
//! array `xs`; `factor96` and `is_prime96` take a class `n`;
//! `factor_hierarchical` takes an integer `n`; transforms and bridge
//! models take a class `x`.
//!
//! ```
//! use atlas_compiler::{models, Inputs, OverflowMode};
//!
//! let add = models::add96(OverflowMode::Track).unwrap();
//! let r = add.run(&Inputs::new().with("a", 50u64).with("b", 60u64)).unwrap();
//! let r = r.as_ring().unwrap();
//! assert_eq!((r.value.value(), r.overflow), (14, true));
//! ```

use crate::core::ring::OverflowMode;
use crate::descriptor::ModelDescriptor;
use crate::error::Result;
use crate::ir::build::{self, param, seq};
use crate::ir::Node;
use crate::model::{compile, CompiledModel};
use crate::value::ParamKind;

fn binary(name: &str, op: Node) -> Result<CompiledModel> {
    compile(
        ModelDescriptor::new(name, seq(param("a"), op))
            .with_runtime("a", ParamKind::Class)
            .with_runtime("b", ParamKind::Class),
    )
}

fn over_array(name: &str, op: Node) -> Result<CompiledModel> {
    compile(ModelDescriptor::new(name, seq(param("xs"), op)).with_runtime("xs", ParamKind::ClassArray))
}

fn unary(name: &str, input: &str, kind: ParamKind, body: Node) -> Result<CompiledModel> {
    compile(ModelDescriptor::new(name, body).with_runtime(input, kind))
}

/// `a + b` mod 96.
pub fn add96(mode: OverflowMode) -> Result<CompiledModel> {
    binary("add96", build::add96("b", mode))
}

/// `a - b` mod 96.
pub fn sub96(mode: OverflowMode) -> Result<CompiledModel> {
    binary("sub96", build::sub96("b", mode))
}

/// `a · b` mod 96.
pub fn mul96(mode: OverflowMode) -> Result<CompiledModel> {
    binary("mul96", build::mul96("b", mode))
}

/// Ring-relative gcd of `a` and `b`.
pub fn gcd96() -> Result<CompiledModel> {
    binary("gcd96", build::gcd96("b"))
}

/// Ring-relative lcm of `a` and `b`.
pub fn lcm96() -> Result<CompiledModel> {
    binary("lcm96", build::lcm96("b"))
}

/// Sum of `xs` mod 96.
pub fn sum() -> Result<CompiledModel> {
    over_array("sum", build::sum())
}

/// Product of `xs` mod 96.
pub fn product() -> Result<CompiledModel> {
    over_array("product", build::product())
}

/// Largest element of `xs`.
pub fn max() -> Result<CompiledModel> {
    over_array("max", build::max())
}

/// Smallest element of `xs`.
pub fn min() -> Result<CompiledModel> {
    over_array("min", build::min())
}

/// Factorization of `n` in ℤ₉₆.
pub fn factor96() -> Result<CompiledModel> {
    unary("factor96", "n", ParamKind::Class, seq(param("n"), build::factor96()))
}

/// Whether `n` is a unit of ℤ₉₆.
pub fn is_prime96() -> Result<CompiledModel> {
    unary("is_prime96", "n", ParamKind::Class, seq(param("n"), build::is_prime96()))
}

/// Base-96 digits of the integer `n`, each factored.
pub fn factor_hierarchical() -> Result<CompiledModel> {
    unary(
        "factor_hierarchical",
        "n",
        ParamKind::Integer,
        seq(param("n"), build::factor_hierarchical()),
    )
}

/// `R(k)` applied to `x`.
pub fn rotate(k: i64) -> Result<CompiledModel> {
    unary("rotate", "x", ParamKind::Class, build::rotate(k, param("x")))
}

/// `D(k)` applied to `x`.
pub fn triality(k: i64) -> Result<CompiledModel> {
    unary("triality", "x", ParamKind::Class, build::triality(k, param("x")))
}

/// `T(k)` applied to `x`.
pub fn twist(k: i64) -> Result<CompiledModel> {
    unary("twist", "x", ParamKind::Class, build::twist(k, param("x")))
}

/// `M` applied to `x`.
pub fn mirror() -> Result<CompiledModel> {
    unary("mirror", "x", ParamKind::Class, build::mirror(param("x")))
}

/// The rank-1 SGA element of `x`.
pub fn lift() -> Result<CompiledModel> {
    unary("lift", "x", ParamKind::Class, seq(param("x"), build::lift()))
}

/// Grade `grade` of the lift of `x`.
///
/// # Errors
///
/// Returns [`crate::Error::Validation`] when `grade > 7`.
pub fn project(grade: u8) -> Result<CompiledModel> {
    unary("project", "x", ParamKind::Class, seq(param("x"), build::project(grade)?))
}
