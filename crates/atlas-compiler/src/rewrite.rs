//! Normalization: a terminating, confluent rewrite system over IR trees.
//!
//! Single-step rules, applied leftmost-outermost until none fires:
//!
//! 1. **Push-down**: `g(seq(a, b)) → seq(g(a), g(b))`, same for `par`.
//! 2. **Folding**: `Rᵃ(Rᵇ(x)) → Rᵃ⁺ᵇ(x)` (likewise D and T), `M(M(x)) → x`,
//!    identity transforms vanish.
//! 3. **Mirror conjugation**: `Rᵏ(M(x)) → M(R⁻ᵏ(x))` (likewise D and T),
//!    so mirrors float to the top of each transform run.
//!
//! Any other pair of adjacent transforms stays nested. Once no rule fires,
//! every run of transforms above a leaf is rebuilt in canonical
//! `[M?, Rʳ, Dᵈ, Tᵗ]` order; if that changed anything the loop restarts.
//! The canonical form is a fixpoint of rules 1–3, so the loop ends and
//! `normalize` is idempotent.
//!
//! # Example
//!
//! ```
//! use atlas_compiler::ir::build::*;
//! use atlas_compiler::rewrite::normalize;
//!
//! let body = rotate(1, seq(param("x"), twist(3, mirror(param("y")))));
//! let n = normalize(&body);
//! assert_eq!(n.to_string(), "seq(R1(param(x)), M(R3(T5(param(y)))))");
//! assert_eq!(normalize(&n), n);
//! ```

use crate::ir::build::{par, seq, transform};
use crate::ir::{Atom, Node};
use crate::transform::{Transform, TransformChain};
use tracing::trace;

/// Counters describing one normalization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizeStats {
    /// Single-step rewrites applied.
    pub rewrites: usize,
    /// Chain canonicalization passes (at least 1).
    pub canonicalization_passes: usize,
}

/// Normalize to the canonical fixpoint.
#[must_use]
pub fn normalize(node: &Node) -> Node {
    normalize_with_stats(node).0
}

/// Normalize, also reporting how much work it took.
#[must_use]
pub fn normalize_with_stats(node: &Node) -> (Node, NormalizeStats) {
    let mut stats = NormalizeStats::default();
    let mut current = node.clone();
    loop {
        while let Some(next) = step(&current) {
            current = next;
            stats.rewrites += 1;
        }
        let canonical = canonicalize(&current);
        stats.canonicalization_passes += 1;
        if canonical == current {
            trace!(rewrites = stats.rewrites, passes = stats.canonicalization_passes, "normalized");
            return (current, stats);
        }
        current = canonical;
    }
}

/// Apply one rewrite, leftmost-outermost. `None` at a fixpoint.
#[must_use]
pub fn step(node: &Node) -> Option<Node> {
    if let Some(rewritten) = rewrite_root(node) {
        return Some(rewritten);
    }
    match node {
        Node::Seq { left, right } => step(left)
            .map(|l| seq(l, (**right).clone()))
            .or_else(|| step(right).map(|r| seq((**left).clone(), r))),
        Node::Par { left, right } => step(left)
            .map(|l| par(l, (**right).clone()))
            .or_else(|| step(right).map(|r| par((**left).clone(), r))),
        Node::Transform { op, child } => step(child).map(|c| transform(*op, c)),
        Node::Atom(Atom::ProjectClass { child }) => step(child).map(|c| {
            Node::Atom(Atom::ProjectClass {
                child: Box::new(c),
            })
        }),
        Node::Atom(_) => None,
    }
}

fn rewrite_root(node: &Node) -> Option<Node> {
    let Node::Transform { op, child } = node else {
        return None;
    };
    let g = *op;
    if g.is_identity() {
        return Some((**child).clone());
    }
    match &**child {
        Node::Seq { left, right } => Some(seq(
            transform(g, (**left).clone()),
            transform(g, (**right).clone()),
        )),
        Node::Par { left, right } => Some(par(
            transform(g, (**left).clone()),
            transform(g, (**right).clone()),
        )),
        Node::Transform { op: h, child: inner } => fold(g, *h, inner),
        Node::Atom(_) => None,
    }
}

fn fold(outer: Transform, inner: Transform, x: &Node) -> Option<Node> {
    let merged = match (outer, inner) {
        (Transform::M, Transform::M) => return Some(x.clone()),
        (Transform::R(a), Transform::R(b)) => Transform::rotate(a as i64 + b as i64),
        (Transform::D(a), Transform::D(b)) => Transform::triality(a as i64 + b as i64),
        (Transform::T(a), Transform::T(b)) => Transform::twist(a as i64 + b as i64),
        (g, Transform::M) => {
            return Some(transform(Transform::M, transform(g.inverse(), x.clone())));
        }
        _ => return None,
    };
    Some(if merged.is_identity() {
        x.clone()
    } else {
        transform(merged, x.clone())
    })
}

/// Rebuild every transform run above a leaf in canonical order.
#[must_use]
pub fn canonicalize(node: &Node) -> Node {
    match node {
        Node::Transform { .. } => {
            let mut word = Vec::new();
            let mut inner = node;
            while let Node::Transform { op, child } = inner {
                word.push(*op);
                inner = &**child;
            }
            let base = canonicalize(inner);
            TransformChain::from_outer(word)
                .to_transforms()
                .into_iter()
                .rev()
                .fold(base, |acc, g| transform(g, acc))
        }
        Node::Seq { left, right } => seq(canonicalize(left), canonicalize(right)),
        Node::Par { left, right } => par(canonicalize(left), canonicalize(right)),
        Node::Atom(Atom::ProjectClass { child }) => Node::Atom(Atom::ProjectClass {
            child: Box::new(canonicalize(child)),
        }),
        Node::Atom(_) => node.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::build::*;

    #[test]
    fn test_push_down_over_seq_and_par() {
        let body = rotate(1, seq(param("a"), par(param("b"), param("c"))));
        let n = normalize(&body);
        assert_eq!(
            n,
            seq(rotate(1, param("a")), par(rotate(1, param("b")), rotate(1, param("c"))))
        );
    }

    #[test]
    fn test_same_kind_folds() {
        assert_eq!(normalize(&rotate(3, rotate(2, param("x")))), rotate(1, param("x")));
        assert_eq!(normalize(&twist(5, twist(3, param("x")))), param("x"));
        assert_eq!(normalize(&triality(1, triality(2, param("x")))), param("x"));
        assert_eq!(normalize(&mirror(mirror(param("x")))), param("x"));
    }

    #[test]
    fn test_mirror_moves_outward() {
        let stepped = step(&rotate(1, mirror(param("x")))).unwrap();
        assert_eq!(stepped, mirror(rotate(3, param("x"))));
        // M(R1(x)) is already canonical
        assert_eq!(step(&mirror(rotate(1, param("x")))), None);
    }

    #[test]
    fn test_canonical_order() {
        let body = twist(1, triality(2, rotate(3, mirror(param("x")))));
        let n = normalize(&body);
        assert_eq!(n.to_string(), "M(R1(D1(T7(param(x)))))");
    }

    #[test]
    fn test_identity_transforms_vanish() {
        assert_eq!(normalize(&rotate(0, param("x"))), param("x"));
        assert_eq!(normalize(&rotate(2, mirror(rotate(2, mirror(param("x")))))), param("x"));
    }

    #[test]
    fn test_descends_into_project_class() {
        let body = project_class(rotate(1, seq(lift(), project(1).unwrap())));
        let n = normalize(&body);
        assert_eq!(n.to_string(), "projectClass(seq(R1(lift), R1(project(1))))");
    }

    #[test]
    fn test_idempotent_and_counts() {
        let body = mirror(seq(twist(2, param("a")), rotate(1, mirror(param("b")))));
        let (n, stats) = normalize_with_stats(&body);
        assert!(stats.rewrites > 0);
        assert!(stats.canonicalization_passes >= 1);
        let (again, stats2) = normalize_with_stats(&n);
        assert_eq!(again, n);
        assert_eq!(stats2.rewrites, 0);
        assert_eq!(stats2.canonicalization_passes, 1);
    }
}
