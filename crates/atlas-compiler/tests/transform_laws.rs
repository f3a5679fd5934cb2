//! Property-based tests for the transform group.
//!
//! Classes are drawn from the full range; rank-1 elements are their lifts.

use atlas_compiler::algebra::{lift, project};
use atlas_compiler::{ClassIndex, Transform, TransformChain};
use proptest::prelude::*;

fn class() -> impl Strategy<Value = ClassIndex> {
    (0u8..96).prop_map(|v| ClassIndex::new(v).unwrap())
}

fn transform() -> impl Strategy<Value = Transform> {
    prop_oneof![
        (-12i64..12).prop_map(Transform::rotate),
        (-12i64..12).prop_map(Transform::triality),
        (-12i64..12).prop_map(Transform::twist),
        Just(Transform::mirror()),
    ]
}

fn word() -> impl Strategy<Value = Vec<Transform>> {
    prop::collection::vec(transform(), 0..12)
}

/// Apply a word, outermost first, by direct composition.
fn apply_word(word: &[Transform], c: ClassIndex) -> ClassIndex {
    word.iter().rev().fold(c, |acc, g| g.apply_class(acc))
}

// =============================================================================
// Generator Orders
// =============================================================================

proptest! {
    /// R⁴ = D³ = T⁸ = M² = id
    #[test]
    fn prop_generator_orders(c in class(), k in -20i64..20) {
        let orders = [
            (Transform::rotate(k), 4),
            (Transform::triality(k), 3),
            (Transform::twist(k), 8),
            (Transform::mirror(), 2),
        ];
        for (g, n) in orders {
            let back = (0..n).fold(c, |acc, _| g.apply_class(acc));
            prop_assert_eq!(back, c, "{}^{} is not the identity", g, n);
        }
    }

    /// Exponents reduce modulo the order.
    #[test]
    fn prop_exponent_reduction(c in class(), k in -40i64..40) {
        prop_assert_eq!(Transform::rotate(k).apply_class(c), Transform::rotate(k.rem_euclid(4)).apply_class(c));
        prop_assert_eq!(Transform::triality(k).apply_class(c), Transform::triality(k.rem_euclid(3)).apply_class(c));
        prop_assert_eq!(Transform::twist(k).apply_class(c), Transform::twist(k.rem_euclid(8)).apply_class(c));
    }
}

// =============================================================================
// Commutation and Mirror Conjugation
// =============================================================================

proptest! {
    /// R, D and T commute pairwise.
    #[test]
    fn prop_rdt_commute(c in class(), a in 0i64..4, b in 0i64..3, t in 0i64..8) {
        let (r, d, t) = (Transform::rotate(a), Transform::triality(b), Transform::twist(t));
        prop_assert_eq!(r.apply_class(d.apply_class(c)), d.apply_class(r.apply_class(c)));
        prop_assert_eq!(r.apply_class(t.apply_class(c)), t.apply_class(r.apply_class(c)));
        prop_assert_eq!(d.apply_class(t.apply_class(c)), t.apply_class(d.apply_class(c)));
    }

    /// M g M = g⁻¹
    #[test]
    fn prop_mirror_inverts(c in class(), g in transform()) {
        let m = Transform::mirror();
        let lhs = m.apply_class(g.apply_class(m.apply_class(c)));
        prop_assert_eq!(lhs, g.inverse().apply_class(c));
    }

    /// g ∘ g⁻¹ = id
    #[test]
    fn prop_inverse(c in class(), g in transform()) {
        prop_assert_eq!(g.apply_class(g.inverse().apply_class(c)), c);
    }
}

// =============================================================================
// Chains
// =============================================================================

proptest! {
    /// A canonical chain acts like the word it was built from.
    #[test]
    fn prop_chain_matches_word(c in class(), w in word()) {
        let chain = TransformChain::from_outer(w.iter().copied());
        prop_assert_eq!(chain.apply_class(c), apply_word(&w, c));
    }

    /// Chain composition is composition of actions.
    #[test]
    fn prop_chain_compose(c in class(), a in word(), b in word()) {
        let (ca, cb) = (TransformChain::from_outer(a), TransformChain::from_outer(b));
        prop_assert_eq!(ca.compose(cb).apply_class(c), ca.apply_class(cb.apply_class(c)));
    }

    /// Chain inverse undoes the chain on both sides.
    #[test]
    fn prop_chain_inverse(c in class(), w in word()) {
        let chain = TransformChain::from_outer(w);
        prop_assert!(chain.compose(chain.inverse()).is_identity());
        prop_assert!(chain.inverse().compose(chain).is_identity());
        prop_assert_eq!(chain.inverse().apply_class(chain.apply_class(c)), c);
    }

    /// `to_transforms` rebuilds the same chain.
    #[test]
    fn prop_chain_roundtrip(w in word()) {
        let chain = TransformChain::from_outer(w);
        prop_assert_eq!(TransformChain::from_outer(chain.to_transforms()), chain);
    }
}

// =============================================================================
// Class / SGA Agreement
// =============================================================================

proptest! {
    /// project(g(lift(c))) = g(c)
    #[test]
    fn prop_actions_agree(c in class(), g in transform()) {
        prop_assert_eq!(project(&g.apply_sga(&lift(c))), Some(g.apply_class(c)));
    }

    /// Same for whole chains.
    #[test]
    fn prop_chain_actions_agree(c in class(), w in word()) {
        let chain = TransformChain::from_outer(w);
        prop_assert_eq!(project(&chain.apply_sga(&lift(c))), Some(chain.apply_class(c)));
    }
}
