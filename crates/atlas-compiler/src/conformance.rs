//! Exhaustive law validation.
//!
//! Every law the compiler relies on is checked over the whole finite
//! domain: all 96 classes and their 96 rank-1 lifts.
//!
//! # Laws
//!
//! | Law | Statement |
//! |-----|-----------|
//! | Order | `R⁴ = D³ = T⁸ = M² = id` on classes and on rank-1 elements |
//! | Commutation | R, D and T commute pairwise |
//! | Mirror conjugation | `MRM = R⁻¹`, `MDM = D⁻¹`, `MTM = T⁻¹` |
//! | Action agreement | `project(g(lift(c))) = g(c)` for every generator |
//! | Bridge round-trip | `project(lift(c)) = c` |
//! | Factor table | factors multiply back to `n`; `isPrime96(n) ⟺ gcd(n, 96) = 1` |
//! | Orbit reachability | every class is reachable from 37 |
//!
//! # Usage
//!
//! ```
//! use atlas_compiler::conformance;
//!
//! let report = conformance::check_all();
//! assert!(report.is_conformant(), "{report}");
//! ```

use crate::algebra::{lift, project, SgaElement};
use crate::core::class::ClassIndex;
use crate::core::ring::{self, gcd_raw};
use crate::lut;
use crate::transform::{Transform, TransformKind};
use core::fmt;

// =============================================================================
// LAWS AND VIOLATIONS
// =============================================================================

/// The families of laws checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Law {
    /// Generator orders.
    Order,
    /// Pairwise commutation of R, D, T.
    Commutation,
    /// Mirror inverts R, D and T by conjugation.
    MirrorConjugation,
    /// Class and SGA actions agree on rank-1 elements.
    ActionAgreement,
    /// `project ∘ lift = id`.
    BridgeRoundTrip,
    /// Factor and unit tables.
    FactorTable,
    /// Orbit distances are finite.
    OrbitReachability,
}

impl fmt::Display for Law {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Order => "order",
            Self::Commutation => "commutation",
            Self::MirrorConjugation => "mirror conjugation",
            Self::ActionAgreement => "action agreement",
            Self::BridgeRoundTrip => "bridge round-trip",
            Self::FactorTable => "factor table",
            Self::OrbitReachability => "orbit reachability",
        })
    }
}

/// One failed law instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LawViolation {
    /// Which law.
    pub law: Law,
    /// The class the law failed on.
    pub class: ClassIndex,
    /// What was observed.
    pub detail: String,
}

impl fmt::Display for LawViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} violated at class {}: {}", self.law, self.class, self.detail)
    }
}

// =============================================================================
// REPORT
// =============================================================================

/// Outcome of [`check_all`].
#[derive(Debug, Clone, Default)]
pub struct ConformanceReport {
    /// Number of law instances evaluated.
    pub checks: usize,
    /// Every failed instance.
    pub violations: Vec<LawViolation>,
}

impl ConformanceReport {
    /// Create an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one law instance.
    pub fn record(&mut self, law: Law, class: ClassIndex, holds: bool, detail: impl FnOnce() -> String) {
        self.checks += 1;
        if !holds {
            self.violations.push(LawViolation {
                law,
                class,
                detail: detail(),
            });
        }
    }

    /// True when no law failed.
    #[must_use]
    pub fn is_conformant(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of failed instances.
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    /// Failed instances of one law.
    pub fn violations_of(&self, law: Law) -> impl Iterator<Item = &LawViolation> {
        self.violations.iter().filter(move |v| v.law == law)
    }
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Atlas Conformance Report")?;
        writeln!(f, "========================")?;
        writeln!(f, "Checks:     {}", self.checks)?;
        writeln!(f, "Violations: {}", self.violations.len())?;
        for v in &self.violations {
            writeln!(f, "  - {v}")?;
        }
        Ok(())
    }
}

// =============================================================================
// CHECKS
// =============================================================================

const GENERATORS: [Transform; 4] = [Transform::R(1), Transform::D(1), Transform::T(1), Transform::M];

fn power_class(g: Transform, n: u8, c: ClassIndex) -> ClassIndex {
    (0..n).fold(c, |acc, _| g.apply_class(acc))
}

fn power_sga(g: Transform, n: u8, x: &SgaElement) -> SgaElement {
    (0..n).fold(x.clone(), |acc, _| g.apply_sga(&acc))
}

/// Generator orders on classes and rank-1 elements.
pub fn check_orders(report: &mut ConformanceReport) {
    for c in ClassIndex::all() {
        let x = lift(c);
        for g in GENERATORS {
            let n = g.kind().order();
            report.record(Law::Order, c, power_class(g, n, c) == c, || {
                format!("{g}^{n} moved the class")
            });
            report.record(Law::Order, c, power_sga(g, n, &x).approx_eq(&x), || {
                format!("{g}^{n} moved the rank-1 element")
            });
        }
    }
}

/// Pairwise commutation of R, D and T.
pub fn check_commutation(report: &mut ConformanceReport) {
    let pairs = [
        (Transform::R(1), Transform::D(1)),
        (Transform::R(1), Transform::T(1)),
        (Transform::D(1), Transform::T(1)),
    ];
    for c in ClassIndex::all() {
        let x = lift(c);
        for (a, b) in pairs {
            let ab = a.apply_class(b.apply_class(c));
            let ba = b.apply_class(a.apply_class(c));
            report.record(Law::Commutation, c, ab == ba, || format!("{a}{b} = {ab}, {b}{a} = {ba}"));
            let ab = a.apply_sga(&b.apply_sga(&x));
            let ba = b.apply_sga(&a.apply_sga(&x));
            report.record(Law::Commutation, c, ab.approx_eq(&ba), || {
                format!("{a} and {b} do not commute on the lift")
            });
        }
    }
}

/// `M g M = g⁻¹` for g in R, D, T.
pub fn check_mirror_conjugation(report: &mut ConformanceReport) {
    for c in ClassIndex::all() {
        let x = lift(c);
        for kind in [TransformKind::Rotate, TransformKind::Triality, TransformKind::Twist] {
            let g = Transform::of_kind(kind, 1);
            let lhs = Transform::M.apply_class(g.apply_class(Transform::M.apply_class(c)));
            let rhs = g.inverse().apply_class(c);
            report.record(Law::MirrorConjugation, c, lhs == rhs, || format!("M{g}M = {lhs}, expected {rhs}"));
            let lhs = Transform::M.apply_sga(&g.apply_sga(&Transform::M.apply_sga(&x)));
            let rhs = g.inverse().apply_sga(&x);
            report.record(Law::MirrorConjugation, c, lhs.approx_eq(&rhs), || {
                format!("M{g}M differs from {g}⁻¹ on the lift")
            });
        }
    }
}

/// Bridge round-trip and agreement of the two actions.
pub fn check_bridge(report: &mut ConformanceReport) {
    for c in ClassIndex::all() {
        let x = lift(c);
        let back = project(&x);
        report.record(Law::BridgeRoundTrip, c, back == Some(c), || format!("projected to {back:?}"));
        for g in GENERATORS {
            let via_sga = project(&g.apply_sga(&x));
            let direct = g.apply_class(c);
            report.record(Law::ActionAgreement, c, via_sga == Some(direct), || {
                format!("{g}: class action gives {direct}, SGA action gives {via_sga:?}")
            });
        }
    }
}

/// Factor table, unit table and orbit distances.
pub fn check_tables(report: &mut ConformanceReport) {
    for c in ClassIndex::all() {
        let factors = lut::factor96(c);
        let product = ring::product(&factors);
        report.record(Law::FactorTable, c, product == c, || {
            format!("factors {factors:?} multiply to {product}")
        });
        let unit = gcd_raw(c.value() as u64, 96) == 1;
        report.record(Law::FactorTable, c, lut::is_prime96(c) == unit, || {
            format!("isPrime96 disagrees with gcd (unit = {unit})")
        });
        let d = lut::orbit_distance(c);
        report.record(Law::OrbitReachability, c, d != u8::MAX, || "unreachable from 37".to_string());
    }
}

/// Run every check.
#[must_use]
pub fn check_all() -> ConformanceReport {
    let mut report = ConformanceReport::new();
    check_orders(&mut report);
    check_commutation(&mut report);
    check_mirror_conjugation(&mut report);
    check_bridge(&mut report);
    check_tables(&mut report);
    report
}
