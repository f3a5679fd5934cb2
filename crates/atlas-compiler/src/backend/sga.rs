//! The SGA backend: the same pipeline over tensor-algebra elements.
//!
//! Every class travels as its rank-1 lift. Transforms act through the
//! algebra automorphisms rather than permutation tables, and the grade
//! atoms run natively. Ring operations project their operands, compute in
//! ℤ₉₆ and lift the result, so any operand that is not rank-1 raises
//! [`Error::ArithmeticDomain`](crate::Error::ArithmeticDomain).
//!
//! This backend accepts every well-shaped tree and serves as the oracle
//! the class backend is checked against. A tree with no parameter
//! reference is evaluated once during lowering and stored as
//! [`SgaPlan::Fused`].

use super::{load, reduce, ring_step, Env, Flow, Rhs};
use crate::algebra::{lift, project_strict, SgaElement};
use crate::core::class::ClassIndex;
use crate::core::ring::{OverflowMode, RingResult};
use crate::error::Result;
use crate::ir::{linearize, Atom, Node, Reduction, RingOp, Step};
use crate::lut::{self, Base96Digit};
use crate::transform::TransformChain;
use crate::value::Value;
use core::ops::ControlFlow;
use tracing::trace;

/// The accumulator of an SGA plan.
#[derive(Debug, Clone, PartialEq)]
pub enum SgaValue {
    /// Nothing yet.
    Unit,
    /// A class, as its rank-1 lift.
    Class(SgaElement),
    /// A class array, lifted elementwise.
    Classes(Vec<SgaElement>),
    /// A general element produced by `lift` or `project`.
    Sga(SgaElement),
    /// A predicate result.
    Bool(bool),
    /// An integer outside the class range.
    Integer(u64),
    /// Base-96 digits.
    Digits(Vec<Base96Digit>),
    /// A tracked ring result: lifted value and overflow flag.
    Ring(SgaElement, bool),
    /// A heterogeneous `par` result.
    Tuple(Vec<SgaValue>),
}

impl SgaValue {
    /// Lift a class-backend value.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Unit => Self::Unit,
            Value::Class(c) => Self::Class(lift(*c)),
            Value::Classes(cs) => Self::Classes(cs.iter().map(|c| lift(*c)).collect()),
            Value::Bool(b) => Self::Bool(*b),
            Value::Integer(n) => Self::Integer(*n),
            Value::Digits(ds) => Self::Digits(ds.clone()),
            Value::Ring(r) => Self::Ring(lift(r.value), r.overflow),
            Value::Sga(x) => Self::Sga(x.clone()),
            Value::Tuple(vs) => Self::Tuple(vs.iter().map(Self::from_value).collect()),
        }
    }

    /// Project back to a class-backend value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ArithmeticDomain`] if a class-valued slot holds an
    /// element that is not rank-1.
    pub fn into_value(self) -> Result<Value> {
        Ok(match self {
            Self::Unit => Value::Unit,
            Self::Class(x) => Value::Class(project_strict(&x)?),
            Self::Classes(xs) => Value::Classes(project_all(&xs)?),
            Self::Sga(x) => Value::Sga(x),
            Self::Bool(b) => Value::Bool(b),
            Self::Integer(n) => Value::Integer(n),
            Self::Digits(ds) => Value::Digits(ds),
            Self::Ring(x, overflow) => Value::Ring(RingResult {
                value: project_strict(&x)?,
                overflow,
            }),
            Self::Tuple(vs) => Value::Tuple(vs.into_iter().map(Self::into_value).collect::<Result<_>>()?),
        })
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Class(_) => "class",
            Self::Classes(_) => "class array",
            Self::Sga(_) => "SGA element",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Digits(_) => "digits",
            Self::Ring(..) => "ring result",
            Self::Tuple(_) => "tuple",
        }
    }

    fn transformed(self, chain: TransformChain) -> Self {
        match self {
            Self::Class(x) => Self::Class(chain.apply_sga(&x)),
            Self::Classes(xs) => Self::Classes(xs.iter().map(|x| chain.apply_sga(x)).collect()),
            Self::Sga(x) => Self::Sga(chain.apply_sga(&x)),
            Self::Ring(x, overflow) => Self::Ring(chain.apply_sga(&x), overflow),
            Self::Tuple(vs) => Self::Tuple(vs.into_iter().map(|v| v.transformed(chain)).collect()),
            fixed => fixed,
        }
    }

    fn join(left: Self, right: Self) -> Self {
        match (left, right) {
            (Self::Class(a), Self::Class(b)) => Self::Classes(vec![a, b]),
            (Self::Class(a), Self::Classes(mut bs)) => {
                bs.insert(0, a);
                Self::Classes(bs)
            }
            (Self::Classes(mut a), Self::Class(b)) => {
                a.push(b);
                Self::Classes(a)
            }
            (Self::Classes(mut a), Self::Classes(b)) => {
                a.extend(b);
                Self::Classes(a)
            }
            (l, r) => Self::Tuple(vec![l, r]),
        }
    }
}

fn project_all(xs: &[SgaElement]) -> Result<Vec<ClassIndex>> {
    xs.iter().map(project_strict).collect()
}

/// One SGA-backend operation.
#[derive(Debug, Clone, PartialEq)]
pub enum SgaOp {
    /// Replace the accumulator with a constant.
    Const(SgaValue),
    /// Replace the accumulator with a bound input, lifted.
    Load(String),
    /// Ring operation through project/lift.
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
    /// Factor the projected class.
    Factor96,
    /// Unit test on the projected class.
    IsPrime96,
    /// Base-96 digits, each factored.
    FactorHierarchical,
    /// Expose the class element as a general element.
    Lift,
    /// Keep one Clifford grade.
    Project(u8),
    /// Run the body, then project its result to a class.
    ProjectClass(Vec<SgaOp>),
    /// `chain ∘ body ∘ chain⁻¹` through the algebra action.
    Conjugate(TransformChain, Vec<SgaOp>),
    /// Run both lists on the same accumulator and join.
    Branch(Vec<SgaOp>, Vec<SgaOp>),
}

impl SgaOp {
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
            Self::Project(_) => "project",
            Self::ProjectClass(_) => "projectClass",
            Self::Conjugate(..) => "conjugate",
            Self::Branch(..) => "par",
        }
    }

    fn apply(&self, acc: SgaValue, env: &Env) -> Result<Flow<SgaValue>> {
        let next = match (self, acc) {
            (Self::Const(v), _) => v.clone(),
            (Self::Load(name), _) => SgaValue::from_value(&load(env, name)?),
            (Self::Ring { op, rhs, mode }, SgaValue::Class(x)) => {
                let a = project_strict(&x)?;
                return Ok(match ring_step(*op, *mode, a, rhs.resolve(env)?) {
                    ControlFlow::Continue(c) => ControlFlow::Continue(SgaValue::Class(lift(c))),
                    ControlFlow::Break(r) => ControlFlow::Break(SgaValue::Ring(lift(r.value), r.overflow)),
                });
            }
            (Self::Reduce(r), SgaValue::Classes(xs)) => SgaValue::Class(lift(reduce(*r, &project_all(&xs)?)?)),
            (Self::Factor96, SgaValue::Class(x)) => {
                SgaValue::Classes(lut::factor96(project_strict(&x)?).into_iter().map(lift).collect())
            }
            (Self::IsPrime96, SgaValue::Class(x)) => SgaValue::Bool(lut::is_prime96(project_strict(&x)?)),
            (Self::FactorHierarchical, SgaValue::Class(x)) => {
                SgaValue::Digits(lut::factor_hierarchical(project_strict(&x)?.value() as u64))
            }
            (Self::FactorHierarchical, SgaValue::Integer(n)) => SgaValue::Digits(lut::factor_hierarchical(n)),
            (Self::Lift, SgaValue::Class(x)) => SgaValue::Sga(x),
            (Self::Project(grade), SgaValue::Class(x) | SgaValue::Sga(x)) => {
                SgaValue::Sga(x.grade_project(*grade)?)
            }
            (Self::ProjectClass(body), acc) => match run_ops(body, acc, env)? {
                ControlFlow::Continue(SgaValue::Class(x) | SgaValue::Sga(x)) => {
                    SgaValue::Class(lift(project_strict(&x)?))
                }
                ControlFlow::Continue(other) => return Err(super::unexpected("projectClass", other.kind_name())),
                halted @ ControlFlow::Break(_) => return Ok(halted),
            },
            (Self::Conjugate(chain, body), acc) => {
                return Ok(match run_ops(body, acc.transformed(chain.inverse()), env)? {
                    ControlFlow::Continue(v) => ControlFlow::Continue(v.transformed(*chain)),
                    ControlFlow::Break(v) => ControlFlow::Break(v.transformed(*chain)),
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
                SgaValue::join(l, r)
            }
            (op, acc) => return Err(super::unexpected(op.name(), acc.kind_name())),
        };
        Ok(ControlFlow::Continue(next))
    }

    fn count(&self) -> usize {
        match self {
            Self::ProjectClass(body) | Self::Conjugate(_, body) => 1 + count_ops(body),
            Self::Branch(l, r) => 1 + count_ops(l) + count_ops(r),
            _ => 1,
        }
    }
}

fn count_ops(ops: &[SgaOp]) -> usize {
    ops.iter().map(SgaOp::count).sum()
}

fn run_ops(ops: &[SgaOp], input: SgaValue, env: &Env) -> Result<Flow<SgaValue>> {
    let mut acc = input;
    for op in ops {
        match op.apply(acc, env)? {
            ControlFlow::Continue(v) => acc = v,
            halted @ ControlFlow::Break(_) => return Ok(halted),
        }
    }
    Ok(ControlFlow::Continue(acc))
}

/// A lowered SGA-backend program.
#[derive(Debug, Clone, PartialEq)]
pub enum SgaPlan {
    /// Operations to fold over the accumulator.
    Ops(Vec<SgaOp>),
    /// A value computed during lowering, already projected back.
    Fused(Value),
}

impl SgaPlan {
    /// Lower a normalized tree, fusing it when it references no parameter.
    ///
    /// # Errors
    ///
    /// Returns any error that evaluating a fused tree raises, such as
    /// [`crate::Error::ArithmeticDomain`] for a non-rank-1 class operand.
    pub fn lower(node: &Node) -> Result<Self> {
        let ops = lower_steps(&linearize(node));
        if node.param_refs().is_empty() {
            let value = settle(run_ops(&ops, SgaValue::Unit, &Env::new())?)?;
            trace!(ops = count_ops(&ops), "fused constant tree");
            return Ok(Self::Fused(value));
        }
        Ok(Self::Ops(ops))
    }

    /// The lowered operations; empty when fused.
    #[must_use]
    pub fn ops(&self) -> &[SgaOp] {
        match self {
            Self::Fused(_) => &[],
            Self::Ops(ops) => ops,
        }
    }

    /// Number of operations, counting nested ones. Zero when fused.
    #[must_use]
    pub fn op_count(&self) -> usize {
        count_ops(self.ops())
    }

    /// True for a plan evaluated at compile time.
    #[must_use]
    pub fn is_fused(&self) -> bool {
        matches!(self, Self::Fused(_))
    }

    /// Execute against bound inputs and project the result back.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ArithmeticDomain`] when a class-consuming
    /// stage receives an element that is not rank-1, and
    /// [`crate::Error::Validation`] for an empty `max`/`min` input.
    pub fn run(&self, env: &Env) -> Result<Value> {
        match self {
            Self::Fused(v) => Ok(v.clone()),
            Self::Ops(ops) => {
                trace!(ops = ops.len(), "running SGA plan");
                settle(run_ops(ops, SgaValue::Unit, env)?)
            }
        }
    }
}

fn settle(flow: Flow<SgaValue>) -> Result<Value> {
    match flow {
        ControlFlow::Continue(v) | ControlFlow::Break(v) => v.into_value(),
    }
}

fn lower_steps(steps: &[Step<'_>]) -> Vec<SgaOp> {
    steps.iter().map(lower_step).collect()
}

fn lower_step(step: &Step<'_>) -> SgaOp {
    match step {
        Step::Atom(atom) => lower_atom(atom),
        Step::Conjugate(chain, body) => SgaOp::Conjugate(*chain, lower_steps(body)),
        Step::Branch(left, right) => SgaOp::Branch(lower_steps(left), lower_steps(right)),
    }
}

fn lower_atom(atom: &Atom) -> SgaOp {
    match atom {
        Atom::ClassLiteral(c) => SgaOp::Const(SgaValue::Class(lift(*c))),
        Atom::IntegerLiteral(n) => SgaOp::Const(SgaValue::Integer(*n)),
        Atom::ConstantArray(cs) => SgaOp::Const(SgaValue::Classes(cs.iter().map(|c| lift(*c)).collect())),
        Atom::Param(name) => SgaOp::Load(name.clone()),
        Atom::Lift => SgaOp::Lift,
        Atom::Project { grade } => SgaOp::Project(*grade),
        Atom::ProjectClass { child } => SgaOp::ProjectClass(lower_steps(&linearize(child))),
        Atom::Ring { op, rhs, mode } => SgaOp::Ring {
            op: *op,
            rhs: Rhs::lower(rhs),
            mode: *mode,
        },
        Atom::Reduce(r) => SgaOp::Reduce(*r),
        Atom::Factor96 => SgaOp::Factor96,
        Atom::IsPrime96 => SgaOp::IsPrime96,
        Atom::FactorHierarchical => SgaOp::FactorHierarchical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ClassPlan;
    use crate::ir::build::*;
    use crate::ir::build::lift;

    fn c(v: u8) -> ClassIndex {
        ClassIndex::new(v).unwrap()
    }

    fn env(pairs: &[(&str, Value)]) -> Env {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn both(body: &Node, inputs: &Env) -> (Value, Value) {
        let class = ClassPlan::lower(body).unwrap().run(inputs).unwrap();
        let sga = SgaPlan::lower(body).unwrap().run(inputs).unwrap();
        (class, sga)
    }

    #[test]
    fn test_agrees_with_class_backend() {
        let inputs = env(&[("a", Value::Class(c(50))), ("b", Value::Class(c(60)))]);
        for body in [
            seq(param("a"), add96("b", OverflowMode::Drop)),
            seq(param("a"), mul96("b", OverflowMode::Track)),
            mirror(seq(param("a"), sub96("b", OverflowMode::Drop))),
            seq(param("a"), par(triality(1, twist(3, factor96())), is_prime96())),
            seq(par(param("a"), param("b")), rotate(2, sum())),
            seq(param("a"), gcd96("b")),
        ] {
            let (class, sga) = both(&body, &inputs);
            assert!(class.approx_eq(&sga), "{body}: {class:?} vs {sga:?}");
        }
    }

    #[test]
    fn test_lift_agrees_as_elements() {
        let inputs = env(&[("x", Value::Class(c(13)))]);
        let (class, sga) = both(&seq(param("x"), rotate(1, lift())), &inputs);
        assert!(class.approx_eq(&sga));
        assert!(sga.as_sga().unwrap().approx_eq(&crate::algebra::lift(c(37))));
    }

    #[test]
    fn test_grade_atoms_run_natively() {
        let inputs = env(&[("x", Value::Class(c(3)))]);
        let plan = SgaPlan::lower(&seq(param("x"), project(1).unwrap())).unwrap();
        // class 3 lifts to e₃, a vector: grade 1 keeps it
        assert!(plan.run(&inputs).unwrap().as_sga().unwrap().approx_eq(&crate::algebra::lift(c(3))));
        let plan = SgaPlan::lower(&seq(param("x"), project(0).unwrap())).unwrap();
        let scalar_part = plan.run(&inputs).unwrap();
        assert!(scalar_part.as_sga().unwrap().clifford().is_empty());

        let round_trip = seq(param("x"), project_class(seq(lift(), project(1).unwrap())));
        let out = SgaPlan::lower(&round_trip).unwrap().run(&inputs).unwrap();
        assert_eq!(out, Value::Class(c(3)));
    }

    #[test]
    fn test_non_rank1_is_domain_error() {
        let inputs = env(&[("x", Value::Class(c(3)))]);
        let body = seq(param("x"), project_class(project(0).unwrap()));
        let err = SgaPlan::lower(&body).unwrap().run(&inputs).unwrap_err();
        assert!(err.is_arithmetic_domain());
    }

    #[test]
    fn test_value_conversion() {
        let v = Value::Tuple(vec![Value::Classes(vec![c(1), c(95)]), Value::Integer(1000)]);
        assert_eq!(SgaValue::from_value(&v).into_value().unwrap(), v);
        let plan = SgaPlan::lower(&seq(param("x"), factor96())).unwrap();
        assert_eq!(plan.op_count(), 2);
        assert_eq!(plan.ops().len(), 2);
        assert!(!plan.is_fused());
    }

    #[test]
    fn test_constant_tree_fuses() {
        let body = seq(class_literal(c(3)), project(1).unwrap());
        let plan = SgaPlan::lower(&body).unwrap();
        assert!(plan.is_fused());
        assert_eq!(plan.op_count(), 0);
        assert!(plan.ops().is_empty());
        let out = plan.run(&Env::new()).unwrap();
        assert!(out.as_sga().unwrap().approx_eq(&crate::algebra::lift(c(3))));

        // fused value matches the class plan's fused value
        let conjugated = rotate(1, class_literal(c(5)));
        let (class, sga) = both(&conjugated, &Env::new());
        assert!(SgaPlan::lower(&conjugated).unwrap().is_fused());
        assert_eq!(sga, class);
    }

    #[test]
    fn test_constant_domain_error_surfaces_at_lowering() {
        let body = seq(class_literal(c(3)), project_class(project(0).unwrap()));
        assert!(SgaPlan::lower(&body).unwrap_err().is_arithmetic_domain());
    }
}
