//! The class backend: O(1) operations on class indices.
//!
//! Lowering turns the flattened pipeline into a list of [`ClassOp`]s.
//! Transform runs become [`Permutation`] tables built once at lowering
//! time, so a conjugation costs two table lookups per class at run time.
//!
//! A tree that references no parameter is evaluated during lowering and
//! stored as [`ClassPlan::Fused`]; running it returns the stored value.
//!
//! Grade atoms never reach this backend: `project` and `projectClass`
//! raise [`Error::BackendInvariant`](crate::Error::BackendInvariant), as
//! does any stage after a `lift` other than an enclosing conjugation.
//!
//! ```
//! use atlas_compiler::backend::{ClassPlan, Env};
//! use atlas_compiler::ir::build::*;
//! use atlas_compiler::{ClassIndex, Value};
//!
//! let body = rotate(1, class_literal(ClassIndex::new(5).unwrap()));
//! let plan = ClassPlan::lower(&body).unwrap();
//! assert!(plan.is_fused());
//! assert_eq!(plan.run(&Env::new()).unwrap(), Value::Class(ClassIndex::new(29).unwrap()));
//! ```

use super::{load, reduce, ring_step, unexpected, Env, Flow, Rhs};
use crate::algebra;
use crate::core::class::ClassIndex;
use crate::core::constants::CLASS_COUNT;
use crate::core::ring::{OverflowMode, RingResult};
use crate::error::{Error, Result};
use crate::ir::{linearize, Atom, Node, Reduction, RingOp, Step};
use crate::lut;
use crate::transform::TransformChain;
use crate::value::Value;
use core::ops::ControlFlow;
use tracing::trace;

/// A transform chain with its class action tabulated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    chain: TransformChain,
    table: [ClassIndex; CLASS_COUNT],
}

impl Permutation {
    /// Tabulate `chain` over all 96 classes.
    #[must_use]
    pub fn new(chain: TransformChain) -> Self {
        Self {
            chain,
            table: core::array::from_fn(|i| chain.apply_class(ClassIndex::wrapping(i as u64))),
        }
    }

    /// The tabulated chain.
    #[must_use]
    pub fn chain(&self) -> TransformChain {
        self.chain
    }

    /// Table lookup.
    #[inline]
    #[must_use]
    pub fn apply_class(&self, class: ClassIndex) -> ClassIndex {
        self.table[class.value() as usize]
    }

    /// Move a value: classes through the table, SGA elements through the
    /// algebra action, tuples componentwise. Other values are fixed.
    #[must_use]
    pub fn apply(&self, value: Value) -> Value {
        match value {
            Value::Class(c) => Value::Class(self.apply_class(c)),
            Value::Classes(cs) => Value::Classes(cs.into_iter().map(|c| self.apply_class(c)).collect()),
            Value::Ring(r) => Value::Ring(RingResult {
                value: self.apply_class(r.value),
                overflow: r.overflow,
            }),
            Value::Sga(x) => Value::Sga(self.chain.apply_sga(&x)),
            Value::Tuple(vs) => Value::Tuple(vs.into_iter().map(|v| self.apply(v)).collect()),
            fixed => fixed,
        }
    }
}

/// One class-backend operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassOp {
    /// Replace the accumulator with a constant.
    Const(Value),
    /// Replace the accumulator with a bound input.
    Load(String),
    /// `acc op rhs` mod 96.
    Ring {
        /// Operation.
        op: RingOp,
        /// Right operand.
        rhs: Rhs,
        /// Overflow handling.
        mode: OverflowMode,
    },
    /// Reduce a class array.
    Reduce(Reduction),
    /// Factor-table lookup.
    Factor96,
    /// Unit-table lookup.
    IsPrime96,
    /// Base-96 digits, each factored.
    FactorHierarchical,
    /// Switch to the SGA representation. Always terminal.
    Lift,
    /// `forward ∘ body ∘ inverse`.
    Conjugate {
        /// Applied to the body's result.
        forward: Permutation,
        /// Applied to the incoming accumulator.
        inverse: Permutation,
        /// Conjugated operations.
        body: Vec<ClassOp>,
    },
    /// Run both lists on the same accumulator and join.
    Branch(Vec<ClassOp>, Vec<ClassOp>),
}

impl ClassOp {
    fn name(&self) -> &'static str {
        match self {
            Self::Const(_) => "const",
            Self::Load(_) => "load",
            Self::Ring { op, .. } => op.keyword(),
            Self::Reduce(r) => r.keyword(),
            Self::Factor96 => "factor96",
            Self::IsPrime96 => "isPrime96",
            Self::FactorHierarchical => "factorHierarchical",
            Self::Lift => "lift",
            Self::Conjugate { .. } => "conjugate",
            Self::Branch(..) => "par",
        }
    }

    fn apply(&self, acc: Value, env: &Env) -> Result<Flow<Value>> {
        let next = match (self, acc) {
            (Self::Const(v), _) => v.clone(),
            (Self::Load(name), _) => load(env, name)?,
            (Self::Ring { op, rhs, mode }, Value::Class(a)) => {
                return Ok(match ring_step(*op, *mode, a, rhs.resolve(env)?) {
                    ControlFlow::Continue(c) => ControlFlow::Continue(Value::Class(c)),
                    ControlFlow::Break(r) => ControlFlow::Break(Value::Ring(r)),
                });
            }
            (Self::Reduce(r), Value::Classes(xs)) => Value::Class(reduce(*r, &xs)?),
            (Self::Factor96, Value::Class(c)) => Value::Classes(lut::factor96(c)),
            (Self::IsPrime96, Value::Class(c)) => Value::Bool(lut::is_prime96(c)),
            (Self::FactorHierarchical, Value::Class(c)) => {
                Value::Digits(lut::factor_hierarchical(c.value() as u64))
            }
            (Self::FactorHierarchical, Value::Integer(n)) => Value::Digits(lut::factor_hierarchical(n)),
            (Self::Lift, Value::Class(c)) => Value::Sga(algebra::lift(c)),
            (Self::Conjugate { forward, inverse, body }, acc) => {
                return Ok(match run_ops(body, inverse.apply(acc), env)? {
                    ControlFlow::Continue(v) => ControlFlow::Continue(forward.apply(v)),
                    ControlFlow::Break(v) => ControlFlow::Break(forward.apply(v)),
                });
            }
            (Self::Branch(left, right), acc) => {
                let l = match run_ops(left, acc.clone(), env)? {
                    ControlFlow::Continue(v) => v,
                    halted => return Ok(halted),
                };
                let r = match run_ops(right, acc, env)? {
                    ControlFlow::Continue(v) => v,
                    halted => return Ok(halted),
                };
                Value::join(l, r)
            }
            (op, acc) => return Err(unexpected(op.name(), acc.kind_name())),
        };
        Ok(ControlFlow::Continue(next))
    }

    fn count(&self) -> usize {
        match self {
            Self::Conjugate { body, .. } => 1 + count_ops(body),
            Self::Branch(l, r) => 1 + count_ops(l) + count_ops(r),
            _ => 1,
        }
    }
}

fn count_ops(ops: &[ClassOp]) -> usize {
    ops.iter().map(ClassOp::count).sum()
}

fn run_ops(ops: &[ClassOp], input: Value, env: &Env) -> Result<Flow<Value>> {
    let mut acc = input;
    for op in ops {
        match op.apply(acc, env)? {
            ControlFlow::Continue(v) => acc = v,
            halted @ ControlFlow::Break(_) => return Ok(halted),
        }
    }
    Ok(ControlFlow::Continue(acc))
}

/// A lowered class-backend program.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassPlan {
    /// Operations to fold over the accumulator.
    Ops(Vec<ClassOp>),
    /// A value computed during lowering.
    Fused(Value),
}

impl ClassPlan {
    /// Lower a normalized tree, fusing it when it references no parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackendInvariant`] for grade atoms or a non-terminal
    /// `lift`, and any error that evaluating a fused tree raises.
    pub fn lower(node: &Node) -> Result<Self> {
        let ops = lower_steps(&linearize(node), true)?;
        if node.param_refs().is_empty() {
            let value = flatten(run_ops(&ops, Value::Unit, &Env::new())?);
            trace!(ops = count_ops(&ops), "fused constant tree");
            return Ok(Self::Fused(value));
        }
        Ok(Self::Ops(ops))
    }

    /// Execute against bound inputs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty `max`/`min` input or a
    /// non-class ring operand, and [`Error::BackendInvariant`] for an
    /// unbound parameter.
    pub fn run(&self, env: &Env) -> Result<Value> {
        match self {
            Self::Fused(v) => Ok(v.clone()),
            Self::Ops(ops) => {
                trace!(ops = ops.len(), "running class plan");
                run_ops(ops, Value::Unit, env).map(flatten)
            }
        }
    }

    /// Number of operations, counting nested ones. Zero when fused.
    #[must_use]
    pub fn op_count(&self) -> usize {
        match self {
            Self::Fused(_) => 0,
            Self::Ops(ops) => count_ops(ops),
        }
    }

    /// True for a plan evaluated at compile time.
    #[must_use]
    pub fn is_fused(&self) -> bool {
        matches!(self, Self::Fused(_))
    }
}

fn flatten(flow: Flow<Value>) -> Value {
    match flow {
        ControlFlow::Continue(v) | ControlFlow::Break(v) => v,
    }
}

// `tail` is true when nothing but enclosing conjugations runs after `steps`.
fn lower_steps(steps: &[Step<'_>], tail: bool) -> Result<Vec<ClassOp>> {
    let last = steps.len().saturating_sub(1);
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| lower_step(step, tail && i == last))
        .collect()
}

fn lower_step(step: &Step<'_>, tail: bool) -> Result<ClassOp> {
    Ok(match step {
        Step::Atom(atom) => lower_atom(atom, tail)?,
        Step::Conjugate(chain, body) => ClassOp::Conjugate {
            forward: Permutation::new(*chain),
            inverse: Permutation::new(chain.inverse()),
            body: lower_steps(body, tail)?,
        },
        Step::Branch(left, right) => ClassOp::Branch(lower_steps(left, false)?, lower_steps(right, false)?),
    })
}

fn lower_atom(atom: &Atom, tail: bool) -> Result<ClassOp> {
    Ok(match atom {
        Atom::ClassLiteral(c) => ClassOp::Const(Value::Class(*c)),
        Atom::IntegerLiteral(n) => ClassOp::Const(Value::Integer(*n)),
        Atom::ConstantArray(cs) => ClassOp::Const(Value::Classes(cs.clone())),
        Atom::Param(name) => ClassOp::Load(name.clone()),
        Atom::Ring { op, rhs, mode } => ClassOp::Ring {
            op: *op,
            rhs: Rhs::lower(rhs),
            mode: *mode,
        },
        Atom::Reduce(r) => ClassOp::Reduce(*r),
        Atom::Factor96 => ClassOp::Factor96,
        Atom::IsPrime96 => ClassOp::IsPrime96,
        Atom::FactorHierarchical => ClassOp::FactorHierarchical,
        Atom::Lift if tail => ClassOp::Lift,
        Atom::Lift => {
            return Err(Error::backend_invariant(
                "`lift` must be the final stage on the class backend",
            ))
        }
        Atom::Project { .. } | Atom::ProjectClass { .. } => {
            return Err(Error::backend_invariant(format!(
                "grade atom `{atom}` reached the class backend"
            )))
        }
    })
}
