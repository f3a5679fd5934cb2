//! Ring operations on both backends against ℤ₉₆ arithmetic written out by
//! hand, over every pair of operands.
//!
//! The differential suite compares the backends with each other; this file
//! pins both of them to plain modular arithmetic.

use atlas_compiler::{
    compile, models, BackendKind, ClassIndex, CompiledModel, Inputs, OverflowMode, RingResult,
    Value,
};

fn euclid(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        euclid(b, a % b)
    }
}

fn c(v: u64) -> ClassIndex {
    ClassIndex::new(v as u8).unwrap()
}

/// The model compiled once for each backend.
fn on_both(model: CompiledModel) -> [CompiledModel; 2] {
    let class = compile(model.descriptor().clone().with_backend(BackendKind::Class)).unwrap();
    let sga = compile(model.descriptor().clone().with_backend(BackendKind::Sga)).unwrap();
    assert_eq!(class.backend(), BackendKind::Class);
    assert_eq!(sga.backend(), BackendKind::Sga);
    [class, sga]
}

/// Run `model` on every `(a, b)` and compare with `expected(a, b)`.
fn check_all_pairs(model: CompiledModel, expected: impl Fn(u64, u64) -> Value) {
    let name = model.descriptor().name.clone();
    for compiled in on_both(model) {
        for a in 0u64..96 {
            for b in 0u64..96 {
                let inputs = Inputs::new().with("a", a).with("b", b);
                let got = compiled.run(&inputs).unwrap();
                assert_eq!(got, expected(a, b), "{name} on {}: a={a}, b={b}", compiled.backend());
            }
        }
    }
}

fn tracked(value: u64, overflow: bool) -> Value {
    Value::Ring(RingResult { value: c(value), overflow })
}

// =============================================================================
// Drop Mode
// =============================================================================

#[test]
fn add_drop_matches_modular_sum() {
    check_all_pairs(models::add96(OverflowMode::Drop).unwrap(), |a, b| {
        Value::Class(c((a + b) % 96))
    });
}

#[test]
fn sub_drop_matches_modular_difference() {
    check_all_pairs(models::sub96(OverflowMode::Drop).unwrap(), |a, b| {
        Value::Class(c((a + 96 - b) % 96))
    });
}

#[test]
fn mul_drop_matches_modular_product() {
    check_all_pairs(models::mul96(OverflowMode::Drop).unwrap(), |a, b| {
        Value::Class(c((a * b) % 96))
    });
}

// =============================================================================
// Track Mode
// =============================================================================

#[test]
fn add_track_flags_carry() {
    check_all_pairs(models::add96(OverflowMode::Track).unwrap(), |a, b| {
        tracked((a + b) % 96, a + b >= 96)
    });
}

#[test]
fn sub_track_flags_borrow() {
    check_all_pairs(models::sub96(OverflowMode::Track).unwrap(), |a, b| {
        tracked((a + 96 - b) % 96, a < b)
    });
}

#[test]
fn mul_track_flags_wrap() {
    check_all_pairs(models::mul96(OverflowMode::Track).unwrap(), |a, b| {
        tracked((a * b) % 96, a * b >= 96)
    });
}

// =============================================================================
// Gcd and Lcm
// =============================================================================

#[test]
fn gcd_matches_euclid() {
    check_all_pairs(models::gcd96().unwrap(), |a, b| Value::Class(c(euclid(a, b))));
}

#[test]
fn lcm_is_reduced_and_absorbs_zero() {
    check_all_pairs(models::lcm96().unwrap(), |a, b| {
        if a == 0 || b == 0 {
            Value::Class(c(0))
        } else {
            Value::Class(c(a / euclid(a, b) * b % 96))
        }
    });
}

// =============================================================================
// Reductions
// =============================================================================

#[test]
fn sum_and_product_fold_modularly() {
    let arrays: [&[u64]; 4] = [&[], &[95], &[50, 60, 70], &[2, 3, 5, 7, 11]];
    for xs in arrays {
        let inputs = Inputs::new().with("xs", xs.to_vec());
        let sum = xs.iter().sum::<u64>() % 96;
        let product = xs.iter().fold(1u64, |acc, x| acc * x % 96);
        for model in on_both(models::sum().unwrap()) {
            assert_eq!(model.run(&inputs).unwrap(), Value::Class(c(sum)), "sum {xs:?}");
        }
        for model in on_both(models::product().unwrap()) {
            assert_eq!(model.run(&inputs).unwrap(), Value::Class(c(product)), "product {xs:?}");
        }
    }
}
