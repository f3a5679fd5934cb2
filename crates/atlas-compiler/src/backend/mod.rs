//! Execution backends.
//!
//! Both backends lower the same normalized tree through
//! [`linearize`](crate::ir::linearize) and execute it as a fold over one
//! accumulator. A stage either continues with a new accumulator or halts
//! the whole plan (an overflow-tracking ring op); a halt still passes out
//! through every enclosing conjugation.
//!
//! - [`class`]: O(1) integer and permutation-table operations on class
//!   indices, with compile-time fusion of constant trees
//! - [`sga`]: the same pipeline over rank-1 SGA elements; the oracle

pub mod class;
pub mod sga;

use crate::core::class::ClassIndex;
use crate::core::ring::{self, OverflowMode, RingResult};
use crate::error::{Error, Result};
use crate::ir::{Operand, Reduction, RingOp};
use crate::value::Value;
use core::ops::ControlFlow;
use std::collections::BTreeMap;

pub use class::{ClassOp, ClassPlan, Permutation};
pub use sga::{SgaOp, SgaPlan, SgaValue};

/// Bound runtime inputs, by parameter name.
pub type Env = BTreeMap<String, Value>;

/// Outcome of one stage: `Continue` with the next accumulator, or `Break`
/// with the final value of the whole plan.
pub type Flow<T> = ControlFlow<T, T>;

/// Right operand of a lowered ring operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rhs {
    /// Read from the bound inputs.
    Input(String),
    /// A literal.
    Const(ClassIndex),
}

impl Rhs {
    fn lower(operand: &Operand) -> Self {
        match operand {
            Operand::Param(name) => Self::Input(name.clone()),
            Operand::Class(c) => Self::Const(*c),
        }
    }

    fn resolve(&self, env: &Env) -> Result<ClassIndex> {
        match self {
            Self::Const(c) => Ok(*c),
            Self::Input(name) => match env.get(name) {
                Some(Value::Class(c)) => Ok(*c),
                Some(other) => Err(Error::validation(
                    name.as_str(),
                    format!("ring operand must be a class, got {}", other.kind_name()),
                )),
                None => Err(unbound(name)),
            },
        }
    }
}

fn unbound(name: &str) -> Error {
    Error::backend_invariant(format!("parameter `{name}` is not bound"))
}

fn load(env: &Env, name: &str) -> Result<Value> {
    env.get(name).cloned().ok_or_else(|| unbound(name))
}

/// One ring operation on residues; a tracked add/sub/mul halts.
fn ring_step(op: RingOp, mode: OverflowMode, a: ClassIndex, b: ClassIndex) -> ControlFlow<RingResult, ClassIndex> {
    let tracked = match op {
        RingOp::Add => ring::add(a, b),
        RingOp::Sub => ring::sub(a, b),
        RingOp::Mul => ring::mul(a, b),
        RingOp::Gcd => return ControlFlow::Continue(ring::gcd(a, b)),
        RingOp::Lcm => return ControlFlow::Continue(ring::lcm(a, b)),
    };
    match mode {
        OverflowMode::Drop => ControlFlow::Continue(tracked.value),
        OverflowMode::Track => ControlFlow::Break(tracked),
    }
}

fn reduce(r: Reduction, xs: &[ClassIndex]) -> Result<ClassIndex> {
    let empty = || Error::validation(r.keyword(), "cannot reduce an empty class array");
    match r {
        Reduction::Sum => Ok(ring::sum(xs)),
        Reduction::Product => Ok(ring::product(xs)),
        Reduction::Max => ring::max(xs).ok_or_else(empty),
        Reduction::Min => ring::min(xs).ok_or_else(empty),
    }
}

fn unexpected(stage: impl core::fmt::Display, found: &str) -> Error {
    Error::backend_invariant(format!("`{stage}` cannot consume {found}"))
}
