//! The compile pipeline and compiled models.
//!
//! ```text
//! descriptor ─validate─▶ bound body ─normalize─▶ IR ─analyze─▶ complexity
//!                                                   │                │
//!                                                   └──── lower ◀── select
//! ```
//!
//! A [`CompiledModel`] is immutable; [`run`](CompiledModel::run) may be
//! called any number of times, from any number of threads.
//!
//! ```
//! use atlas_compiler::{compile, Inputs, ModelDescriptor, OverflowMode, ParamKind, Value};
//! use atlas_compiler::ir::build::*;
//!
//! let model = compile(
//!     ModelDescriptor::new("add96", seq(param("a"), add96("b", OverflowMode::Drop)))
//!         .with_runtime("a", ParamKind::Class)
//!         .with_runtime("b", ParamKind::Class),
//! )
//! .unwrap();
//! let out = model.run(&Inputs::new().with("a", 50u64).with("b", 60u64)).unwrap();
//! assert_eq!(out.as_class().map(|c| c.value()), Some(14));
//! ```

use crate::analysis::{analyze, classify, ComplexityClass, Metrics};
use crate::backend::{ClassPlan, Env, SgaPlan};
use crate::descriptor::ModelDescriptor;
use crate::error::{Error, Result};
use crate::ir::Node;
use crate::rewrite::{normalize, normalize_with_stats};
use crate::select::{select_backend, BackendKind, CompilerConfig};
use crate::value::{Inputs, Value};
use tracing::{debug, instrument, trace};

/// A lowered program for one of the two backends.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Class-backend program.
    Class(ClassPlan),
    /// SGA-backend program.
    Sga(SgaPlan),
}

impl Plan {
    /// Which backend the plan targets.
    #[must_use]
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Class(_) => BackendKind::Class,
            Self::Sga(_) => BackendKind::Sga,
        }
    }

    /// Operation count; zero for a fused plan.
    #[must_use]
    pub fn op_count(&self) -> usize {
        match self {
            Self::Class(p) => p.op_count(),
            Self::Sga(p) => p.op_count(),
        }
    }

    /// True when the plan was evaluated at compile time.
    #[must_use]
    pub fn is_fused(&self) -> bool {
        match self {
            Self::Class(p) => p.is_fused(),
            Self::Sga(p) => p.is_fused(),
        }
    }

    fn run(&self, env: &Env) -> Result<Value> {
        match self {
            Self::Class(p) => p.run(env),
            Self::Sga(p) => p.run(env),
        }
    }
}

/// A validated, normalized, classified and lowered model.
#[derive(Debug, Clone)]
pub struct CompiledModel {
    descriptor: ModelDescriptor,
    ir: Node,
    metrics: Metrics,
    complexity: ComplexityClass,
    plan: Plan,
}

/// Compile with the default configuration.
///
/// # Errors
///
/// See [`compile_with`].
pub fn compile(descriptor: ModelDescriptor) -> Result<CompiledModel> {
    compile_with(descriptor, &CompilerConfig::default())
}

/// Compile a descriptor.
///
/// # Errors
///
/// Returns [`Error::Validation`] for an invalid descriptor or a fused tree
/// that fails to evaluate, and [`Error::BackendInvariant`] when the chosen
/// backend cannot run the tree (only possible with an explicit backend
/// preference) or when normalization verification fails.
#[instrument(skip_all, fields(model = %descriptor.name))]
pub fn compile_with(descriptor: ModelDescriptor, config: &CompilerConfig) -> Result<CompiledModel> {
    descriptor.validate()?;
    let bound = descriptor.bound_body()?;

    let (ir, stats) = normalize_with_stats(&bound);
    debug!(
        rewrites = stats.rewrites,
        passes = stats.canonicalization_passes,
        nodes = ir.node_count(),
        "normalized"
    );
    if config.verify_normalization && normalize(&ir) != ir {
        return Err(Error::backend_invariant(format!(
            "normalization is not idempotent on `{ir}`"
        )));
    }

    let metrics = analyze(&ir);
    let computed = classify(&metrics, descriptor.compiled.len(), &config.policy);
    let complexity = descriptor.complexity_hint.map_or(computed, |hint| computed.max(hint));
    let backend = select_backend(descriptor.backend, complexity);
    debug!(%computed, %complexity, %backend, "selected backend");

    let plan = match backend {
        BackendKind::Class => Plan::Class(ClassPlan::lower(&ir)?),
        BackendKind::Sga => Plan::Sga(SgaPlan::lower(&ir)?),
    };
    debug!(fused = plan.is_fused(), ops = plan.op_count(), "lowered");

    Ok(CompiledModel {
        descriptor,
        ir,
        metrics,
        complexity,
        plan,
    })
}

impl CompiledModel {
    /// The descriptor this model was compiled from.
    #[must_use]
    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    /// The normalized IR.
    #[must_use]
    pub fn ir(&self) -> &Node {
        &self.ir
    }

    /// Structural measurements of the normalized IR.
    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Complexity class after applying the hint.
    #[must_use]
    pub fn complexity(&self) -> ComplexityClass {
        self.complexity
    }

    /// The selected backend.
    #[must_use]
    pub fn backend(&self) -> BackendKind {
        self.plan.kind()
    }

    /// The lowered plan.
    #[must_use]
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Check inputs against the declared runtime parameters.
    fn bind(&self, inputs: &Inputs) -> Result<Env> {
        if let Some((name, _)) = inputs.iter().find(|(name, _)| !self.descriptor.runtime.contains_key(*name)) {
            return Err(Error::validation(name, "is not a runtime parameter of this model"));
        }
        self.descriptor
            .runtime
            .iter()
            .map(|(name, kind)| {
                let input = inputs
                    .get(name)
                    .ok_or_else(|| Error::validation(name.as_str(), "missing runtime input"))?;
                Ok((name.clone(), kind.bind(name, input)?))
            })
            .collect()
    }

    /// Execute the plan.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for missing, unexpected, wrongly
    /// shaped or out-of-range inputs, and whatever the backend raises.
    pub fn run(&self, inputs: &Inputs) -> Result<Value> {
        let env = self.bind(inputs)?;
        trace!(model = %self.descriptor.name, inputs = env.len(), "run");
        self.plan.run(&env)
    }

    /// Run the selected plan and the SGA oracle side by side.
    ///
    /// Returns the selected plan's result when the two agree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackendInvariant`] when the results differ, and any
    /// error either run raises.
    pub fn cross_check(&self, inputs: &Inputs) -> Result<Value> {
        let env = self.bind(inputs)?;
        let selected = self.plan.run(&env)?;
        let oracle = SgaPlan::lower(&self.ir)?.run(&env)?;
        if !selected.approx_eq(&oracle) {
            return Err(Error::backend_invariant(format!(
                "{} backend returned {selected:?}, SGA oracle returned {oracle:?}",
                self.backend()
            )));
        }
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::class::ClassIndex;
    use crate::core::ring::OverflowMode;
    use crate::ir::build::*;
    use crate::value::ParamKind;

    fn c(v: u8) -> ClassIndex {
        ClassIndex::new(v).unwrap()
    }

    fn unary(name: &str, body: Node) -> ModelDescriptor {
        ModelDescriptor::new(name, body).with_runtime("x", ParamKind::Class)
    }

    #[test]
    fn test_compiled_model_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompiledModel>();
    }

    #[test]
    fn test_input_validation() {
        let model = compile(unary("r", rotate(1, param("x")))).unwrap();
        assert!(model.run(&Inputs::new()).unwrap_err().to_string().contains("missing"));
        let extra = Inputs::new().with("x", 1u64).with("y", 2u64);
        assert!(model.run(&extra).unwrap_err().to_string().contains("`y`"));
        assert!(model.run(&Inputs::new().with("x", 96u64)).unwrap_err().is_validation());
        assert!(model.run(&Inputs::new().with("x", [1u64])).unwrap_err().is_validation());
        assert_eq!(model.run(&Inputs::new().with("x", 5u64)).unwrap(), Value::Class(c(29)));
    }

    #[test]
    fn test_selection_and_hint() {
        let shallow = unary("shallow", seq(param("x"), factor96()));
        let model = compile(shallow.clone()).unwrap();
        assert_eq!(model.complexity(), ComplexityClass::C1);
        assert_eq!(model.backend(), BackendKind::Class);

        let hinted = compile(shallow.clone().with_hint(ComplexityClass::C2)).unwrap();
        assert_eq!(hinted.complexity(), ComplexityClass::C2);
        assert_eq!(hinted.backend(), BackendKind::Sga);

        // a hint never lowers the class
        let graded = unary("g", seq(param("x"), project(1).unwrap())).with_hint(ComplexityClass::C0);
        assert_eq!(compile(graded).unwrap().complexity(), ComplexityClass::C2);

        let forced = compile(shallow.with_backend(BackendKind::Sga)).unwrap();
        assert_eq!(forced.backend(), BackendKind::Sga);
    }

    #[test]
    fn test_forcing_class_backend_on_grade_atoms_fails() {
        let d = unary("g", seq(param("x"), project(1).unwrap())).with_backend(BackendKind::Class);
        assert!(compile(d).unwrap_err().is_backend_invariant());
    }

    #[test]
    fn test_compile_time_params_fuse() {
        let d = ModelDescriptor::new("rot", rotate(1, param("x"))).with_compiled("x", 5u64);
        let model = compile(d).unwrap();
        assert_eq!(model.complexity(), ComplexityClass::C0);
        assert!(model.plan().is_fused());
        assert_eq!(model.plan().op_count(), 0);
        let first = model.run(&Inputs::new()).unwrap();
        assert_eq!(first, Value::Class(c(29)));
        assert_eq!(model.run(&Inputs::new()).unwrap(), first);
    }

    #[test]
    fn test_ir_is_normalized() {
        let d = unary("m", mirror(mirror(twist(3, twist(5, param("x"))))));
        let model = compile(d).unwrap();
        assert_eq!(model.ir(), &param("x"));
        assert_eq!(model.metrics().nodes, 1);
    }

    #[test]
    fn test_cross_check() {
        let d = ModelDescriptor::new("mix", seq(param("a"), triality(1, mul96("b", OverflowMode::Track))))
            .with_runtime("a", ParamKind::Class)
            .with_runtime("b", ParamKind::Class);
        let model = compile(d).unwrap();
        let inputs = Inputs::new().with("a", 17u64).with("b", 40u64);
        assert_eq!(model.cross_check(&inputs).unwrap(), model.run(&inputs).unwrap());
    }

    #[test]
    fn test_strict_config_rejects_nothing_valid() {
        let config = CompilerConfig {
            verify_normalization: true,
            ..CompilerConfig::default()
        };
        let d = unary("t", rotate(3, seq(param("x"), mirror(rotate(1, factor96())))));
        compile_with(d, &config).unwrap();
    }
}
