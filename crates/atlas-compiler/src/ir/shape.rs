//! Static shape checking.
//!
//! Infers the shape of the accumulator after every stage and rejects trees
//! whose stages receive a value they cannot consume, before any backend
//! sees them.

use super::{Atom, Node, Operand};
use crate::core::ring::OverflowMode;
use crate::error::{Error, Result};
use crate::value::ParamKind;
use core::fmt;
use std::collections::BTreeMap;

/// Static shape of a pipeline value; mirrors [`crate::Value`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Nothing yet.
    Unit,
    /// A class index.
    Class,
    /// A class array.
    Classes,
    /// A boolean.
    Bool,
    /// An integer.
    Integer,
    /// Base-96 digits.
    Digits,
    /// An overflow-tracked ring result.
    Ring,
    /// An SGA element.
    Sga,
    /// A heterogeneous `par` result.
    Tuple(Vec<Shape>),
}

impl Shape {
    fn join(left: Self, right: Self) -> Self {
        match (&left, &right) {
            (Self::Class | Self::Classes, Self::Class | Self::Classes) => Self::Classes,
            _ => Self::Tuple(vec![left, right]),
        }
    }

    // Bools, integers and digits have no class structure for a transform to act on.
    fn is_transformable(&self) -> bool {
        match self {
            Self::Bool | Self::Integer | Self::Digits => false,
            Self::Tuple(parts) => parts.iter().all(Self::is_transformable),
            _ => true,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => f.write_str("unit"),
            Self::Class => f.write_str("class"),
            Self::Classes => f.write_str("class array"),
            Self::Bool => f.write_str("bool"),
            Self::Integer => f.write_str("integer"),
            Self::Digits => f.write_str("digits"),
            Self::Ring => f.write_str("ring result"),
            Self::Sga => f.write_str("SGA element"),
            Self::Tuple(parts) => {
                f.write_str("(")?;
                for (i, p) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{p}")?;
                }
                f.write_str(")")
            }
        }
    }
}

// A tracked ring op ends execution, so it must be the last stage outside any `par`.
fn halted(node: &Node, context: &str) -> Error {
    Error::validation("body", format!("`{node}` ends execution with a ring result but {context}"))
}

fn mismatch(atom: &Atom, expected: &str, found: &Shape) -> Error {
    Error::validation("body", format!("`{atom}` expects {expected}, found {found}"))
}

/// Infer the output shape of `node` given its input shape.
///
/// `params` declares the shape of every parameter still referenced by the
/// tree.
///
/// # Errors
///
/// Returns [`Error::Validation`] on an undeclared parameter, a class-valued
/// operand bound to a non-class parameter, a stage whose input shape it
/// cannot consume, a transform around a bool, integer or digits result, or
/// an overflow-tracking ring op that is not the final stage.
pub fn infer(node: &Node, input: &Shape, params: &BTreeMap<String, ParamKind>) -> Result<Shape> {
    match node {
        Node::Atom(atom) => infer_atom(atom, input, params),
        Node::Seq { left, right } => {
            let mid = infer(left, input, params)?;
            if mid == Shape::Ring {
                return Err(halted(left, "is followed by another stage"));
            }
            infer(right, &mid, params)
        }
        Node::Par { left, right } => {
            let l = infer(left, input, params)?;
            let r = infer(right, input, params)?;
            if l == Shape::Ring {
                return Err(halted(left, "runs inside `par`"));
            }
            if r == Shape::Ring {
                return Err(halted(right, "runs inside `par`"));
            }
            Ok(Shape::join(l, r))
        }
        Node::Transform { op, child } => {
            let shape = infer(child, input, params)?;
            if !shape.is_transformable() {
                return Err(Error::validation(
                    "body",
                    format!("transform `{op}` cannot act on a {shape} result"),
                ));
            }
            Ok(shape)
        }
    }
}

fn param_kind(name: &str, params: &BTreeMap<String, ParamKind>) -> Result<ParamKind> {
    params
        .get(name)
        .copied()
        .ok_or_else(|| Error::validation("body", format!("parameter `{name}` is not declared")))
}

fn infer_atom(atom: &Atom, input: &Shape, params: &BTreeMap<String, ParamKind>) -> Result<Shape> {
    match atom {
        Atom::ClassLiteral(_) => Ok(Shape::Class),
        Atom::IntegerLiteral(_) => Ok(Shape::Integer),
        Atom::ConstantArray(_) => Ok(Shape::Classes),
        Atom::Param(name) => Ok(match param_kind(name, params)? {
            ParamKind::Class => Shape::Class,
            ParamKind::ClassArray => Shape::Classes,
            ParamKind::Integer => Shape::Integer,
        }),
        Atom::Lift => match input {
            Shape::Class => Ok(Shape::Sga),
            other => Err(mismatch(atom, "a class", other)),
        },
        Atom::Project { .. } => match input {
            Shape::Class | Shape::Sga => Ok(Shape::Sga),
            other => Err(mismatch(atom, "a class or SGA element", other)),
        },
        Atom::ProjectClass { child } => match infer(child, input, params)? {
            Shape::Class | Shape::Sga => Ok(Shape::Class),
            other => Err(mismatch(atom, "a child producing an SGA element", &other)),
        },
        Atom::Ring { op, rhs, mode } => {
            if let Operand::Param(name) = rhs {
                let kind = param_kind(name, params)?;
                if kind != ParamKind::Class {
                    return Err(Error::validation(
                        "body",
                        format!("operand `{name}` of `{atom}` must be a class parameter, not {kind:?}"),
                    ));
                }
            }
            if *input != Shape::Class {
                return Err(mismatch(atom, "a class", input));
            }
            Ok(if op.tracks_overflow() && *mode == OverflowMode::Track {
                Shape::Ring
            } else {
                Shape::Class
            })
        }
        Atom::Reduce(_) => match input {
            Shape::Classes => Ok(Shape::Class),
            other => Err(mismatch(atom, "a class array", other)),
        },
        Atom::Factor96 => match input {
            Shape::Class => Ok(Shape::Classes),
            other => Err(mismatch(atom, "a class", other)),
        },
        Atom::IsPrime96 => match input {
            Shape::Class => Ok(Shape::Bool),
            other => Err(mismatch(atom, "a class", other)),
        },
        Atom::FactorHierarchical => match input {
            Shape::Class | Shape::Integer => Ok(Shape::Digits),
            other => Err(mismatch(atom, "a class or integer", other)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::super::build::*;
    use super::*;
    use crate::core::class::ClassIndex;

    fn env(pairs: &[(&str, ParamKind)]) -> BTreeMap<String, ParamKind> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_ring_pipeline() {
        let params = env(&[("a", ParamKind::Class), ("b", ParamKind::Class)]);
        let drop = seq(param("a"), add96("b", OverflowMode::Drop));
        let track = seq(param("a"), add96("b", OverflowMode::Track));
        assert_eq!(infer(&drop, &Shape::Unit, &params).unwrap(), Shape::Class);
        assert_eq!(infer(&track, &Shape::Unit, &params).unwrap(), Shape::Ring);
    }

    #[test]
    fn test_par_joins() {
        let params = env(&[("x", ParamKind::Class), ("xs", ParamKind::ClassArray)]);
        let classes = par(param("x"), param("xs"));
        assert_eq!(infer(&classes, &Shape::Unit, &params).unwrap(), Shape::Classes);
        let mixed = par(param("x"), seq(param("x"), is_prime96()));
        assert_eq!(
            infer(&mixed, &Shape::Unit, &params).unwrap(),
            Shape::Tuple(vec![Shape::Class, Shape::Bool])
        );
    }

    #[test]
    fn test_rejects_undeclared_and_mismatched() {
        let params = env(&[("xs", ParamKind::ClassArray), ("n", ParamKind::Integer)]);
        assert!(infer(&param("nope"), &Shape::Unit, &params).unwrap_err().is_validation());
        let bad = seq(param("xs"), factor96());
        let err = infer(&bad, &Shape::Unit, &params).unwrap_err();
        assert!(err.to_string().contains("factor96"));
        let bad_operand = seq(class_literal(ClassIndex::ONE), add96("n", OverflowMode::Drop));
        assert!(infer(&bad_operand, &Shape::Unit, &params).is_err());
        let lift_twice = seq(seq(param("n"), lift()), lift());
        assert!(infer(&lift_twice, &Shape::Unit, &params).is_err());
    }

    #[test]
    fn test_tracked_ring_must_be_final() {
        let params = env(&[("a", ParamKind::Class), ("b", ParamKind::Class)]);
        let tracked = seq(param("a"), add96("b", OverflowMode::Track));
        let followed = seq(tracked.clone(), param("a"));
        assert!(infer(&followed, &Shape::Unit, &params).unwrap_err().is_validation());
        let branched = par(tracked.clone(), param("b"));
        assert!(infer(&branched, &Shape::Unit, &params).is_err());
        let conjugated = rotate(1, tracked);
        assert_eq!(infer(&conjugated, &Shape::Unit, &params).unwrap(), Shape::Ring);
    }

    #[test]
    fn test_bridge_shapes() {
        let params = env(&[("x", ParamKind::Class)]);
        let body = seq(param("x"), seq(lift(), project(1).unwrap()));
        assert_eq!(infer(&body, &Shape::Unit, &params).unwrap(), Shape::Sga);
        let back = seq(param("x"), project_class(lift()));
        assert_eq!(infer(&back, &Shape::Unit, &params).unwrap(), Shape::Class);
        let hier = seq(param("x"), factor_hierarchical());
        assert_eq!(infer(&hier, &Shape::Unit, &params).unwrap(), Shape::Digits);
    }

    #[test]
    fn test_transform_needs_class_structure() {
        let params = env(&[("x", ParamKind::Class), ("n", ParamKind::Integer)]);
        for bad in [
            rotate(1, seq(param("x"), is_prime96())),
            mirror(param("n")),
            twist(3, seq(param("x"), factor_hierarchical())),
            triality(1, par(param("x"), seq(param("x"), is_prime96()))),
        ] {
            let err = infer(&bad, &Shape::Unit, &params).unwrap_err();
            assert!(err.is_validation(), "{bad}");
            assert!(err.to_string().contains("cannot act on"), "{err}");
        }
        // a predicate after the conjugated stage is fine
        let ok = seq(rotate(1, seq(param("x"), factor96())), seq(sum(), is_prime96()));
        assert_eq!(infer(&ok, &Shape::Unit, &params).unwrap(), Shape::Bool);
        let lifted = mirror(seq(param("x"), lift()));
        assert_eq!(infer(&lifted, &Shape::Unit, &params).unwrap(), Shape::Sga);
    }
}
