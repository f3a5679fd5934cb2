//! Flattening a tree into the nested step lists both backends lower from.
//!
//! `seq` chains flatten into one ordered list, `par` becomes a branch, and
//! every maximal run of transforms collapses into a single conjugation by
//! its canonical [`TransformChain`].

use super::{Atom, Node};
use crate::transform::TransformChain;

/// One stage of a flattened pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Step<'a> {
    /// A leaf operation.
    Atom(&'a Atom),
    /// Run `body` conjugated by `chain`: apply the inverse, the body, then
    /// the chain itself.
    Conjugate(TransformChain, Vec<Step<'a>>),
    /// Run both lists on the same input and join the results.
    Branch(Vec<Step<'a>>, Vec<Step<'a>>),
}

/// Flatten `node` into execution order.
///
/// ```
/// use atlas_compiler::ir::{build::*, linearize};
///
/// let body = seq(param("a"), seq(sum(), factor96()));
/// assert_eq!(linearize(&body).len(), 3);
/// ```
#[must_use]
pub fn linearize(node: &Node) -> Vec<Step<'_>> {
    let mut out = Vec::new();
    push_steps(node, &mut out);
    out
}

fn push_steps<'a>(node: &'a Node, out: &mut Vec<Step<'a>>) {
    match node {
        Node::Atom(a) => out.push(Step::Atom(a)),
        Node::Seq { left, right } => {
            push_steps(left, out);
            push_steps(right, out);
        }
        Node::Par { left, right } => out.push(Step::Branch(linearize(left), linearize(right))),
        Node::Transform { .. } => {
            let mut word = Vec::new();
            let mut inner = node;
            while let Node::Transform { op, child } = inner {
                word.push(*op);
                inner = &**child;
            }
            let chain = TransformChain::from_outer(word);
            if chain.is_identity() {
                push_steps(inner, out);
            } else {
                out.push(Step::Conjugate(chain, linearize(inner)));
            }
        }
    }
}
