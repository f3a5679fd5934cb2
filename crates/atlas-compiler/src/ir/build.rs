//! IR builders, one per atom, combinator and transform.
//!
//! The names follow the surface grammar so a parser can emit calls
//! directly. Only [`project`] can fail; every other argument is already a
//! validated type.

use super::{Atom, Node, Operand, Reduction, RingOp};
use crate::core::class::ClassIndex;
use crate::core::constants::MAX_GRADE;
use crate::core::ring::OverflowMode;
use crate::error::{Error, Result};
use crate::transform::Transform;

/// `class(c)`.
#[must_use]
pub fn class_literal(c: ClassIndex) -> Node {
    Atom::ClassLiteral(c).into()
}

/// `int(n)`.
#[must_use]
pub fn integer_literal(n: u64) -> Node {
    Atom::IntegerLiteral(n).into()
}

/// `const[c₀, c₁, …]`.
#[must_use]
pub fn constant_array(values: impl IntoIterator<Item = ClassIndex>) -> Node {
    Atom::ConstantArray(values.into_iter().collect()).into()
}

/// `param(name)`.
#[must_use]
pub fn param(name: impl Into<String>) -> Node {
    Atom::Param(name.into()).into()
}

/// `lift`.
#[must_use]
pub fn lift() -> Node {
    Atom::Lift.into()
}

/// `project(grade)`.
///
/// # Errors
///
/// Returns [`Error::Validation`] when `grade > 7`.
pub fn project(grade: u8) -> Result<Node> {
    if grade > MAX_GRADE {
        return Err(Error::validation(
            "grade",
            format!("grade {grade} out of range [0, {MAX_GRADE}]"),
        ));
    }
    Ok(Atom::Project { grade }.into())
}

/// `projectClass(child)`.
#[must_use]
pub fn project_class(child: Node) -> Node {
    Atom::ProjectClass {
        child: Box::new(child),
    }
    .into()
}

fn ring(op: RingOp, rhs: impl Into<Operand>, mode: OverflowMode) -> Node {
    Atom::Ring {
        op,
        rhs: rhs.into(),
        mode,
    }
    .into()
}

/// `add96[mode](rhs)`.
#[must_use]
pub fn add96(rhs: impl Into<Operand>, mode: OverflowMode) -> Node {
    ring(RingOp::Add, rhs, mode)
}

/// `sub96[mode](rhs)`.
#[must_use]
pub fn sub96(rhs: impl Into<Operand>, mode: OverflowMode) -> Node {
    ring(RingOp::Sub, rhs, mode)
}

/// `mul96[mode](rhs)`.
#[must_use]
pub fn mul96(rhs: impl Into<Operand>, mode: OverflowMode) -> Node {
    ring(RingOp::Mul, rhs, mode)
}

/// `gcd96(rhs)`.
#[must_use]
pub fn gcd96(rhs: impl Into<Operand>) -> Node {
    ring(RingOp::Gcd, rhs, OverflowMode::Drop)
}

/// `lcm96(rhs)`.
#[must_use]
pub fn lcm96(rhs: impl Into<Operand>) -> Node {
    ring(RingOp::Lcm, rhs, OverflowMode::Drop)
}

/// `sum`.
#[must_use]
pub fn sum() -> Node {
    Atom::Reduce(Reduction::Sum).into()
}

/// `product`.
#[must_use]
pub fn product() -> Node {
    Atom::Reduce(Reduction::Product).into()
}

/// `max`.
#[must_use]
pub fn max() -> Node {
    Atom::Reduce(Reduction::Max).into()
}

/// `min`.
#[must_use]
pub fn min() -> Node {
    Atom::Reduce(Reduction::Min).into()
}

/// `factor96`.
#[must_use]
pub fn factor96() -> Node {
    Atom::Factor96.into()
}

/// `isPrime96`.
#[must_use]
pub fn is_prime96() -> Node {
    Atom::IsPrime96.into()
}

/// `factorHierarchical`.
#[must_use]
pub fn factor_hierarchical() -> Node {
    Atom::FactorHierarchical.into()
}

/// `seq(left, right)`.
#[must_use]
pub fn seq(left: Node, right: Node) -> Node {
    Node::Seq {
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// `par(left, right)`.
#[must_use]
pub fn par(left: Node, right: Node) -> Node {
    Node::Par {
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// Left-nested `seq` over a list of stages; `None` when empty.
#[must_use]
pub fn pipeline(stages: impl IntoIterator<Item = Node>) -> Option<Node> {
    stages.into_iter().reduce(seq)
}

/// Wrap `child` in a transform.
#[must_use]
pub fn transform(op: Transform, child: Node) -> Node {
    Node::Transform {
        op,
        child: Box::new(child),
    }
}

/// `R(k mod 4)(child)`.
#[must_use]
pub fn rotate(k: i64, child: Node) -> Node {
    transform(Transform::rotate(k), child)
}

/// `D(k mod 3)(child)`.
#[must_use]
pub fn triality(k: i64, child: Node) -> Node {
    transform(Transform::triality(k), child)
}

/// `T(k mod 8)(child)`.
#[must_use]
pub fn twist(k: i64, child: Node) -> Node {
    transform(Transform::twist(k), child)
}

/// `M(child)`.
#[must_use]
pub fn mirror(child: Node) -> Node {
    transform(Transform::M, child)
}
