//! Complexity analysis of normalized IR.
//!
//! [`analyze`] measures a tree; [`classify`] turns the measurements into a
//! [`ComplexityClass`] under a [`SelectorPolicy`].
//!
//! | Class | Condition |
//! |-------|-----------|
//! | C0 | no ring op, no runtime parameter, ≥ 1 compile-time parameter, class-pure |
//! | C1 | class-pure, seq depth ≤ 3, par depth ≤ 2 |
//! | C2 | ≤ 2 grade/bridge atoms, seq depth ≤ 5 |
//! | C3 | everything else |
//!
//! A tree is class-pure when it has no `project`/`projectClass` atom and
//! every `lift` is the last non-transform stage of the pipeline, outside
//! any `par`.

use crate::ir::{Atom, Node};
use crate::select::SelectorPolicy;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Coarse complexity classification driving backend choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComplexityClass {
    /// No runtime degrees of freedom; fully compiled.
    C0,
    /// Class-pure, shallow composition.
    C1,
    /// Bounded grade/bridge usage, moderate depth.
    C2,
    /// Everything else.
    C3,
}

impl fmt::Display for ComplexityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Structural measurements of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Metrics {
    /// Most `seq` nodes on any root-to-leaf path.
    pub seq_depth: usize,
    /// Most `par` nodes on any root-to-leaf path.
    pub par_depth: usize,
    /// Number of `project` and `projectClass` atoms.
    pub grade_atoms: usize,
    /// Number of ring operations (`add96` … `lcm96`).
    pub ring_ops: usize,
    /// Number of distinct parameters still referenced.
    pub runtime_params: usize,
    /// Every `lift` is in terminal position.
    pub lift_terminal: bool,
    /// Total node count.
    pub nodes: usize,
}

impl Metrics {
    /// No grade atoms and only terminal lifts.
    #[must_use]
    pub fn is_class_pure(&self) -> bool {
        self.grade_atoms == 0 && self.lift_terminal
    }
}

fn depth(node: &Node, count_seq: bool) -> usize {
    match node {
        Node::Atom(Atom::ProjectClass { child }) => depth(child, count_seq),
        Node::Atom(_) => 0,
        Node::Seq { left, right } => {
            usize::from(count_seq) + depth(left, count_seq).max(depth(right, count_seq))
        }
        Node::Par { left, right } => {
            usize::from(!count_seq) + depth(left, count_seq).max(depth(right, count_seq))
        }
        Node::Transform { child, .. } => depth(child, count_seq),
    }
}

fn lifts_terminal(node: &Node, tail: bool) -> bool {
    match node {
        Node::Atom(Atom::Lift) => tail,
        Node::Atom(Atom::ProjectClass { child }) => lifts_terminal(child, false),
        Node::Atom(_) => true,
        Node::Seq { left, right } => lifts_terminal(left, false) && lifts_terminal(right, tail),
        Node::Par { left, right } => lifts_terminal(left, false) && lifts_terminal(right, false),
        Node::Transform { child, .. } => lifts_terminal(child, tail),
    }
}

/// Measure a tree.
#[must_use]
pub fn analyze(node: &Node) -> Metrics {
    let atoms = node.atoms();
    Metrics {
        seq_depth: depth(node, true),
        par_depth: depth(node, false),
        grade_atoms: atoms.iter().filter(|a| a.is_grade_atom()).count(),
        ring_ops: atoms.iter().filter(|a| matches!(a, Atom::Ring { .. })).count(),
        runtime_params: node.param_refs().len(),
        lift_terminal: lifts_terminal(node, true),
        nodes: node.node_count(),
    }
}

/// Classify measured IR.
///
/// `compiled_params` is the number of compile-time parameters the
/// descriptor supplied (they no longer appear in the tree).
#[must_use]
pub fn classify(metrics: &Metrics, compiled_params: usize, policy: &SelectorPolicy) -> ComplexityClass {
    if metrics.ring_ops == 0
        && metrics.runtime_params == 0
        && compiled_params > 0
        && metrics.is_class_pure()
    {
        ComplexityClass::C0
    } else if metrics.is_class_pure()
        && metrics.seq_depth <= policy.c1_max_seq_depth
        && metrics.par_depth <= policy.c1_max_par_depth
    {
        ComplexityClass::C1
    } else if metrics.grade_atoms <= policy.c2_max_grade_atoms
        && metrics.seq_depth <= policy.c2_max_seq_depth
    {
        ComplexityClass::C2
    } else {
        ComplexityClass::C3
    }
}
