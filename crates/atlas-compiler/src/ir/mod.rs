//! Intermediate representation of model bodies.
//!
//! A body is an immutable tree of [`Node`]s: atoms, the two combinators
//! `seq` and `par`, and transform wrappers. Every node runs as one stage of
//! a pipeline over a single accumulator value:
//!
//! - `seq(a, b)` runs `a`, then `b` on `a`'s output
//! - `par(a, b)` runs both on the same input and joins the results
//! - `R1(x)` is the conjugate `R1 ∘ x ∘ R1⁻¹`
//!
//! Source atoms (`class`, `param`, `const`, `int`) ignore their input, so
//! a transform around a source simply moves its result.
//!
//! Trees are built with the functions in [`build`], deserialized from a
//! descriptor, or printed back in surface syntax through `Display`:
//!
//! ```
//! use atlas_compiler::ir::build::*;
//! use atlas_compiler::OverflowMode;
//!
//! let body = seq(param("a"), add96("b", OverflowMode::Drop));
//! assert_eq!(body.to_string(), "seq(param(a), add96[drop](b))");
//! ```

pub mod build;
pub mod shape;
pub mod steps;

use crate::core::class::ClassIndex;
use crate::core::ring::OverflowMode;
use crate::error::Result;
use crate::transform::Transform;
use core::fmt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub use shape::Shape;
pub use steps::{linearize, Step};

/// Binary ring operations over ℤ₉₆.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RingOp {
    /// `add96`.
    Add,
    /// `sub96`.
    Sub,
    /// `mul96`.
    Mul,
    /// `gcd96`, ring-relative.
    Gcd,
    /// `lcm96`, ring-relative.
    Lcm,
}

impl RingOp {
    /// Surface-syntax keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Add => "add96",
            Self::Sub => "sub96",
            Self::Mul => "mul96",
            Self::Gcd => "gcd96",
            Self::Lcm => "lcm96",
        }
    }

    /// Whether the operation honours an overflow mode.
    #[must_use]
    pub const fn tracks_overflow(self) -> bool {
        matches!(self, Self::Add | Self::Sub | Self::Mul)
    }
}

/// Array reductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Reduction {
    /// Sum mod 96; empty is 0.
    Sum,
    /// Product mod 96; empty is 1.
    Product,
    /// Largest element.
    Max,
    /// Smallest element.
    Min,
}

impl Reduction {
    /// Surface-syntax keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Product => "product",
            Self::Max => "max",
            Self::Min => "min",
        }
    }
}

/// Right operand of a ring operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operand {
    /// A named runtime (or compile-time) parameter.
    Param(String),
    /// A literal class.
    Class(ClassIndex),
}

impl From<&str> for Operand {
    fn from(name: &str) -> Self {
        Self::Param(name.to_owned())
    }
}

impl From<String> for Operand {
    fn from(name: String) -> Self {
        Self::Param(name)
    }
}

impl From<ClassIndex> for Operand {
    fn from(c: ClassIndex) -> Self {
        Self::Class(c)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Param(name) => f.write_str(name),
            Self::Class(c) => write!(f, "class({c})"),
        }
    }
}

/// Leaf operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Atom {
    /// A literal class.
    ClassLiteral(ClassIndex),
    /// A literal integer outside the class range.
    IntegerLiteral(u64),
    /// A literal class array.
    ConstantArray(Vec<ClassIndex>),
    /// A named parameter.
    Param(String),
    /// Lift the class accumulator to its rank-1 SGA element.
    Lift,
    /// Keep only the given Clifford grade of the accumulator.
    Project {
        /// Grade in `[0, 7]`.
        grade: u8,
    },
    /// Run `child`, then project its result back to a class index.
    ProjectClass {
        /// Sub-pipeline producing a rank-1 element.
        child: Box<Node>,
    },
    /// `accumulator op rhs` over ℤ₉₆.
    Ring {
        /// Which operation.
        op: RingOp,
        /// Right operand.
        rhs: Operand,
        /// Overflow handling; only add/sub/mul honour `track`.
        #[serde(default)]
        mode: OverflowMode,
    },
    /// Reduce a class array to a class.
    Reduce(Reduction),
    /// Factor the class accumulator.
    Factor96,
    /// Test the class accumulator for coprimality with 96.
    IsPrime96,
    /// Base-96 digits of the accumulator, each factored.
    FactorHierarchical,
}

impl Atom {
    /// True for grade and bridge atoms that need the SGA representation.
    #[must_use]
    pub fn is_grade_atom(&self) -> bool {
        matches!(self, Self::Project { .. } | Self::ProjectClass { .. })
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClassLiteral(c) => write!(f, "class({c})"),
            Self::IntegerLiteral(n) => write!(f, "int({n})"),
            Self::ConstantArray(cs) => {
                f.write_str("const[")?;
                for (i, c) in cs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{c}")?;
                }
                f.write_str("]")
            }
            Self::Param(name) => write!(f, "param({name})"),
            Self::Lift => f.write_str("lift"),
            Self::Project { grade } => write!(f, "project({grade})"),
            Self::ProjectClass { child } => write!(f, "projectClass({child})"),
            Self::Ring { op, rhs, mode } if op.tracks_overflow() => {
                write!(f, "{}[{mode}]({rhs})", op.keyword())
            }
            Self::Ring { op, rhs, .. } => write!(f, "{}({rhs})", op.keyword()),
            Self::Reduce(r) => f.write_str(r.keyword()),
            Self::Factor96 => f.write_str("factor96"),
            Self::IsPrime96 => f.write_str("isPrime96"),
            Self::FactorHierarchical => f.write_str("factorHierarchical"),
        }
    }
}

/// An IR node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Node {
    /// A leaf operation.
    Atom(Atom),
    /// Sequential composition.
    Seq {
        /// Runs first.
        left: Box<Node>,
        /// Runs on `left`'s output.
        right: Box<Node>,
    },
    /// Parallel composition.
    Par {
        /// First branch.
        left: Box<Node>,
        /// Second branch.
        right: Box<Node>,
    },
    /// A transform conjugating its child.
    Transform {
        /// The transform.
        op: Transform,
        /// The wrapped subtree.
        child: Box<Node>,
    },
}

impl Node {
    /// Total number of nodes, including those inside `projectClass`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        match self {
            Self::Atom(Atom::ProjectClass { child }) => 1 + child.node_count(),
            Self::Atom(_) => 1,
            Self::Seq { left, right } | Self::Par { left, right } => {
                1 + left.node_count() + right.node_count()
            }
            Self::Transform { child, .. } => 1 + child.node_count(),
        }
    }

    /// Every atom in execution order, descending into `projectClass`.
    pub fn atoms(&self) -> Vec<&Atom> {
        let mut out = Vec::new();
        self.collect_atoms(&mut out);
        out
    }

    fn collect_atoms<'a>(&'a self, out: &mut Vec<&'a Atom>) {
        match self {
            Self::Atom(a) => {
                if let Atom::ProjectClass { child } = a {
                    child.collect_atoms(out);
                }
                out.push(a);
            }
            Self::Seq { left, right } | Self::Par { left, right } => {
                left.collect_atoms(out);
                right.collect_atoms(out);
            }
            Self::Transform { child, .. } => child.collect_atoms(out),
        }
    }

    /// Names of all referenced parameters (sources and operands).
    #[must_use]
    pub fn param_refs(&self) -> BTreeSet<&str> {
        self.atoms()
            .into_iter()
            .filter_map(|a| match a {
                Atom::Param(name) | Atom::Ring { rhs: Operand::Param(name), .. } => {
                    Some(name.as_str())
                }
                _ => None,
            })
            .collect()
    }

    /// Rebuild the tree with every atom passed through `f`.
    ///
    /// `projectClass` children are mapped first; `f` never sees a
    /// `projectClass` atom itself.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `f`.
    pub fn try_map_atoms<F>(&self, f: &mut F) -> Result<Self>
    where
        F: FnMut(&Atom) -> Result<Atom>,
    {
        Ok(match self {
            Self::Atom(Atom::ProjectClass { child }) => Self::Atom(Atom::ProjectClass {
                child: Box::new(child.try_map_atoms(f)?),
            }),
            Self::Atom(a) => Self::Atom(f(a)?),
            Self::Seq { left, right } => build::seq(left.try_map_atoms(f)?, right.try_map_atoms(f)?),
            Self::Par { left, right } => build::par(left.try_map_atoms(f)?, right.try_map_atoms(f)?),
            Self::Transform { op, child } => build::transform(*op, child.try_map_atoms(f)?),
        })
    }
}

impl From<Atom> for Node {
    fn from(a: Atom) -> Self {
        Self::Atom(a)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(a) => write!(f, "{a}"),
            Self::Seq { left, right } => write!(f, "seq({left}, {right})"),
            Self::Par { left, right } => write!(f, "par({left}, {right})"),
            Self::Transform { op, child } => write!(f, "{op}({child})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::build::*;
    use super::*;

    fn c(v: u8) -> ClassIndex {
        ClassIndex::new(v).unwrap()
    }

    #[test]
    fn test_display_surface_syntax() {
        let body = rotate(1, seq(param("x"), mul96(c(3), OverflowMode::Track)));
        assert_eq!(body.to_string(), "R1(seq(param(x), mul96[track](class(3))))");
        let body = par(constant_array([c(1), c(2)]), seq(param("xs"), sum()));
        assert_eq!(body.to_string(), "par(const[1, 2], seq(param(xs), sum))");
        let body = mirror(project_class(seq(lift(), project(1).unwrap())));
        assert_eq!(body.to_string(), "M(projectClass(seq(lift, project(1))))");
        assert_eq!(gcd96("b").to_string(), "gcd96(b)");
    }

    #[test]
    fn test_param_refs() {
        let body = seq(param("a"), seq(add96("b", OverflowMode::Drop), project_class(param("c"))));
        let refs: Vec<_> = body.param_refs().into_iter().collect();
        assert_eq!(refs, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_node_count_and_atoms() {
        let body = twist(2, par(param("x"), project_class(lift())));
        assert_eq!(body.node_count(), 5);
        assert_eq!(body.atoms().len(), 3);
    }

    #[test]
    fn test_serde_roundtrip_preserves_tree() {
        let body = seq(param("a"), triality(2, add96(c(7), OverflowMode::Track)));
        let json = serde_json::to_string(&body).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, body);
    }

    #[test]
    fn test_deserialize_handwritten() {
        let json = r#"{"seq": {"left": {"atom": {"param": "a"}},
                               "right": {"atom": {"ring": {"op": "add", "rhs": {"param": "b"}}}}}}"#;
        let body: Node = serde_json::from_str(json).unwrap();
        assert_eq!(body, seq(param("a"), add96("b", OverflowMode::Drop)));
        let bad = r#"{"atom": {"classLiteral": 96}}"#;
        assert!(serde_json::from_str::<Node>(bad).is_err());
    }

    #[test]
    fn test_try_map_atoms() {
        let body = seq(param("a"), project_class(param("a")));
        let mapped = body
            .try_map_atoms(&mut |a| {
                Ok(match a {
                    Atom::Param(_) => Atom::ClassLiteral(c(9)),
                    other => other.clone(),
                })
            })
            .unwrap();
        assert_eq!(mapped, seq(class_literal(c(9)), project_class(class_literal(c(9)))));
    }
}
