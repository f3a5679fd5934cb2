//! Shared proptest strategies for IR trees.

#![allow(dead_code)]

use atlas_compiler::backend::Env;
use atlas_compiler::ir::build::*;
use atlas_compiler::ir::Node;
use atlas_compiler::{ClassIndex, OverflowMode, Transform, Value};
use proptest::prelude::*;

pub fn class() -> impl Strategy<Value = ClassIndex> {
    (0u8..96).prop_map(|v| ClassIndex::new(v).unwrap())
}

pub fn transform_op() -> impl Strategy<Value = Transform> {
    prop_oneof![
        (0i64..4).prop_map(Transform::rotate),
        (0i64..3).prop_map(Transform::triality),
        (0i64..8).prop_map(Transform::twist),
        Just(Transform::mirror()),
    ]
}

fn mode() -> impl Strategy<Value = OverflowMode> {
    prop_oneof![Just(OverflowMode::Drop), Just(OverflowMode::Track)]
}

/// Any atom, well-typed or not.
fn any_atom() -> impl Strategy<Value = Node> {
    prop_oneof![
        class().prop_map(class_literal),
        Just(param("a")),
        prop::collection::vec(class(), 0..4).prop_map(constant_array),
        mode().prop_map(|m| add96("b", m)),
        class().prop_map(|c| mul96(c, OverflowMode::Drop)),
        Just(gcd96("b")),
        Just(sum()),
        Just(max()),
        Just(factor96()),
        Just(is_prime96()),
        Just(lift()),
        (0u8..8).prop_map(|g| project(g).unwrap()),
    ]
}

/// Arbitrary trees, including ones no backend accepts.
pub fn any_tree() -> impl Strategy<Value = Node> {
    any_atom().prop_recursive(5, 48, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| seq(l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| par(l, r)),
            (transform_op(), inner.clone()).prop_map(|(g, c)| transform(g, c)),
            inner.prop_map(project_class),
        ]
    })
}

/// Class → class stages over runtime classes `a` and `b`.
fn class_stage() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![
        Just(param("a")),
        class().prop_map(class_literal),
        Just(add96("b", OverflowMode::Drop)),
        Just(sub96("b", OverflowMode::Drop)),
        class().prop_map(|c| mul96(c, OverflowMode::Drop)),
        Just(gcd96("b")),
        class().prop_map(lcm96),
    ];
    leaf.prop_recursive(4, 32, 2, |inner| {
        let reduction = prop_oneof![Just(sum()), Just(product()), Just(max()), Just(min())];
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| seq(l, r)),
            (transform_op(), inner.clone()).prop_map(|(g, c)| transform(g, c)),
            (inner.clone(), inner, reduction).prop_map(|(l, r, red)| seq(par(l, r), red)),
        ]
    })
}

/// How a generated body ends.
#[derive(Debug, Clone)]
enum End {
    Stage,
    /// Conjugated along with the rest of the body.
    Inside(Node),
    /// Appended after the conjugation; predicates carry no class structure.
    After(Node),
}

/// Well-shaped class-pure bodies over runtime classes `a` and `b`, ending
/// in a class stage or one of the terminal stages.
pub fn class_body() -> impl Strategy<Value = Node> {
    let terminal = prop_oneof![
        Just(End::Stage),
        Just(End::Inside(factor96())),
        Just(End::Inside(add96("b", OverflowMode::Track))),
        Just(End::Inside(lift())),
        Just(End::After(is_prime96())),
    ];
    (class_stage(), transform_op(), terminal).prop_map(|(stage, g, end)| {
        let body = seq(param("a"), stage);
        match end {
            End::Stage => transform(g.inverse(), body),
            End::Inside(end) => transform(g.inverse(), seq(body, transform(g, end))),
            End::After(end) => seq(transform(g.inverse(), body), end),
        }
    })
}

pub fn env(a: ClassIndex, b: ClassIndex) -> Env {
    Env::from([
        ("a".to_string(), Value::Class(a)),
        ("b".to_string(), Value::Class(b)),
    ])
}
