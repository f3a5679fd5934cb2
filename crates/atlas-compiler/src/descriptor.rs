//! Model descriptors: the declarative input to [`compile`](crate::compile).
//!
//! A descriptor names a model, declares its runtime parameters and their
//! shapes, optionally binds compile-time parameters, and carries the IR
//! body. It can be built in code or loaded from JSON:
//!
//! ```
//! use atlas_compiler::{ModelDescriptor, ParamKind};
//!
//! let json = r#"{
//!     "name": "add96",
//!     "runtime": { "a": "class", "b": "class" },
//!     "body": { "seq": {
//!         "left":  { "atom": { "param": "a" } },
//!         "right": { "atom": { "ring": { "op": "add", "rhs": { "param": "b" } } } }
//!     } }
//! }"#;
//! let d = ModelDescriptor::from_json(json).unwrap();
//! assert_eq!(d.version, "1.0.0");
//! assert_eq!(d.runtime["a"], ParamKind::Class);
//! d.validate().unwrap();
//! ```

use crate::analysis::ComplexityClass;
use crate::core::class::ClassIndex;
use crate::core::constants::MAX_GRADE;
use crate::core::ring::OverflowMode;
use crate::error::{Error, Result};
use crate::ir::shape::{self, Shape};
use crate::ir::{Atom, Node, Operand};
use crate::select::BackendKind;
use crate::value::{InputValue, ParamKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_namespace() -> String {
    "atlas".to_string()
}

/// A model to compile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    /// Model name, `[a-z0-9_.-]+`.
    pub name: String,
    /// `MAJOR.MINOR.PATCH`.
    #[serde(default = "default_version")]
    pub version: String,
    /// Namespace, `[a-z0-9_.-]+`.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Parameters bound at compile time.
    #[serde(default)]
    pub compiled: BTreeMap<String, InputValue>,
    /// Parameters supplied on every run, with their shapes.
    #[serde(default)]
    pub runtime: BTreeMap<String, ParamKind>,
    /// Lower bound on the complexity class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity_hint: Option<ComplexityClass>,
    /// Backend override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendKind>,
    /// The IR body.
    pub body: Node,
}

impl ModelDescriptor {
    /// A descriptor with default version and namespace and no parameters.
    pub fn new(name: impl Into<String>, body: Node) -> Self {
        Self {
            name: name.into(),
            version: default_version(),
            namespace: default_namespace(),
            compiled: BTreeMap::new(),
            runtime: BTreeMap::new(),
            complexity_hint: None,
            backend: None,
            body,
        }
    }

    /// Set the version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Declare a runtime parameter.
    #[must_use]
    pub fn with_runtime(mut self, name: impl Into<String>, kind: ParamKind) -> Self {
        self.runtime.insert(name.into(), kind);
        self
    }

    /// Bind a compile-time parameter.
    #[must_use]
    pub fn with_compiled(mut self, name: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.compiled.insert(name.into(), value.into());
        self
    }

    /// Set the complexity hint.
    #[must_use]
    pub fn with_hint(mut self, hint: ComplexityClass) -> Self {
        self.complexity_hint = Some(hint);
        self
    }

    /// Force a backend.
    #[must_use]
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Parse from JSON. The result is not validated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Descriptor`] on malformed JSON, unknown atom tags or
    /// out-of-range class literals.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise as
    /// [`from_json`](Self::from_json).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Descriptor`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Stable 64-bit content hash (FNV-1a over the compact JSON form).
    ///
    /// Maps are ordered, so equal descriptors always hash equally.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Descriptor`] if serialization fails.
    pub fn fingerprint(&self) -> Result<u64> {
        let bytes = serde_json::to_vec(self)?;
        let mut state: u64 = 0xcbf2_9ce4_8422_2325;
        for b in bytes {
            state ^= b as u64;
            state = state.wrapping_mul(0x100_0000_01b3);
        }
        Ok(state)
    }

    /// Check every descriptor rule and the static shape of the body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        check_identifier("name", &self.name)?;
        check_identifier("namespace", &self.namespace)?;
        check_version(&self.version)?;
        for name in self.runtime.keys() {
            if self.compiled.contains_key(name) {
                return Err(Error::validation(
                    format!("compiled.{name}"),
                    "also declared as a runtime parameter",
                ));
            }
        }
        for (name, value) in &self.compiled {
            if let InputValue::Array(vs) = value {
                if let Some(v) = vs.iter().find(|v| **v >= 96) {
                    return Err(Error::validation(
                        format!("compiled.{name}"),
                        format!("class value {v} out of range [0, 95]"),
                    ));
                }
            }
        }
        check_atoms(&self.body)?;
        shape::infer(&self.bound_body()?, &Shape::Unit, &self.runtime)?;
        Ok(())
    }

    /// The body with every compile-time parameter substituted.
    ///
    /// A scalar below 96 becomes a class literal, a larger scalar an
    /// integer literal, an array a constant array. Ring operands can only
    /// take class-valued scalars.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when a bound value cannot stand where
    /// its parameter is used.
    pub fn bound_body(&self) -> Result<Node> {
        if self.compiled.is_empty() {
            return Ok(self.body.clone());
        }
        self.body.try_map_atoms(&mut |atom| {
            Ok(match atom {
                Atom::Param(name) => match self.compiled.get(name) {
                    Some(value) => literal(name, value)?,
                    None => atom.clone(),
                },
                Atom::Ring { op, rhs: Operand::Param(name), mode } => match self.compiled.get(name) {
                    Some(value) => Atom::Ring {
                        op: *op,
                        rhs: Operand::Class(class_operand(name, value)?),
                        mode: *mode,
                    },
                    None => atom.clone(),
                },
                other => other.clone(),
            })
        })
    }
}

fn check_identifier(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::validation(field, "must not be empty"));
    }
    if let Some(ch) = value
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-')))
    {
        return Err(Error::validation(field, format!("invalid character {ch:?} in {value:?}")));
    }
    Ok(())
}

fn check_version(version: &str) -> Result<()> {
    let parts: Vec<&str> = version.split('.').collect();
    let numeric = |p: &&str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    if parts.len() != 3 || !parts.iter().all(numeric) {
        return Err(Error::validation(
            "version",
            format!("{version:?} is not MAJOR.MINOR.PATCH"),
        ));
    }
    Ok(())
}

fn check_atoms(body: &Node) -> Result<()> {
    for atom in body.atoms() {
        match atom {
            Atom::Project { grade } if *grade > MAX_GRADE => {
                return Err(Error::validation(
                    "body",
                    format!("grade {grade} out of range [0, {MAX_GRADE}]"),
                ));
            }
            Atom::Ring { op, mode: OverflowMode::Track, .. } if !op.tracks_overflow() => {
                return Err(Error::validation(
                    "body",
                    format!("`{}` does not support overflow tracking", op.keyword()),
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

fn literal(name: &str, value: &InputValue) -> Result<Atom> {
    Ok(match value {
        InputValue::Scalar(v) => match u8::try_from(*v).ok().and_then(ClassIndex::checked) {
            Some(c) => Atom::ClassLiteral(c),
            None => Atom::IntegerLiteral(*v),
        },
        InputValue::Array(vs) => Atom::ConstantArray(
            vs.iter()
                .map(|v| {
                    u8::try_from(*v).ok().and_then(ClassIndex::checked).ok_or_else(|| {
                        Error::validation(format!("compiled.{name}"), format!("class value {v} out of range [0, 95]"))
                    })
                })
                .collect::<Result<_>>()?,
        ),
    })
}

fn class_operand(name: &str, value: &InputValue) -> Result<ClassIndex> {
    match value {
        InputValue::Scalar(v) => u8::try_from(*v).ok().and_then(ClassIndex::checked),
        InputValue::Array(_) => None,
    }
    .ok_or_else(|| {
        Error::validation(
            format!("compiled.{name}"),
            "a ring operand must be bound to a class value in [0, 95]",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::build::*;

    fn c(v: u8) -> ClassIndex {
        ClassIndex::new(v).unwrap()
    }

    fn adder() -> ModelDescriptor {
        ModelDescriptor::new("add96", seq(param("a"), add96("b", OverflowMode::Drop)))
            .with_runtime("a", ParamKind::Class)
            .with_runtime("b", ParamKind::Class)
    }

    #[test]
    fn test_identifier_and_version_rules() {
        adder().validate().unwrap();
        let err = adder().with_namespace("Atlas").validate().unwrap_err();
        assert!(err.to_string().contains("namespace"));
        assert!(ModelDescriptor { name: String::new(), ..adder() }.validate().is_err());
        for bad in ["1.0", "1.0.x", "1..0", "1.0.0.0"] {
            let err = adder().with_version(bad).validate().unwrap_err();
            assert!(err.to_string().contains("version"), "{bad}");
        }
        adder().with_version("2.10.3").validate().unwrap();
    }

    #[test]
    fn test_names_must_be_disjoint() {
        let err = adder().with_compiled("a", 3u64).validate().unwrap_err();
        assert!(err.to_string().contains("compiled.a"));
    }

    #[test]
    fn test_undeclared_param_rejected() {
        let d = ModelDescriptor::new("m", seq(param("a"), add96("z", OverflowMode::Drop)))
            .with_runtime("a", ParamKind::Class);
        assert!(d.validate().unwrap_err().is_validation());
    }

    #[test]
    fn test_grade_and_mode_checks() {
        let body = seq(param("x"), Atom::Project { grade: 8 }.into());
        let d = ModelDescriptor::new("p", body).with_runtime("x", ParamKind::Class);
        assert!(d.validate().unwrap_err().to_string().contains("grade 8"));

        let body = seq(
            param("x"),
            Atom::Ring { op: crate::ir::RingOp::Gcd, rhs: c(4).into(), mode: OverflowMode::Track }.into(),
        );
        let d = ModelDescriptor::new("g", body).with_runtime("x", ParamKind::Class);
        assert!(d.validate().unwrap_err().to_string().contains("gcd96"));
    }

    #[test]
    fn test_shape_check_runs() {
        let d = ModelDescriptor::new("ok", seq(rotate(1, param("x")), is_prime96()))
            .with_runtime("x", ParamKind::Class);
        d.validate().unwrap();
        let d = ModelDescriptor::new("b", rotate(1, seq(param("x"), is_prime96())))
            .with_runtime("x", ParamKind::Class);
        assert!(d.validate().unwrap_err().is_validation());
        let d = ModelDescriptor::new("bad", seq(param("xs"), is_prime96()))
            .with_runtime("xs", ParamKind::ClassArray);
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_bound_body_substitution() {
        let d = ModelDescriptor::new(
            "bound",
            par(seq(param("a"), add96("b", OverflowMode::Drop)), seq(param("xs"), sum())),
        )
        .with_compiled("a", 5u64)
        .with_compiled("b", 7u64)
        .with_compiled("xs", [1u64, 2]);
        let bound = d.bound_body().unwrap();
        assert!(bound.param_refs().is_empty());
        assert_eq!(
            bound.to_string(),
            "par(seq(class(5), add96[drop](class(7))), seq(const[1, 2], sum))"
        );
        d.validate().unwrap();

        let big = ModelDescriptor::new("big", seq(param("n"), factor_hierarchical())).with_compiled("n", 1000u64);
        assert_eq!(big.bound_body().unwrap(), seq(integer_literal(1000), factor_hierarchical()));

        let bad_operand = ModelDescriptor::new("bad", seq(class_literal(c(1)), add96("b", OverflowMode::Drop)))
            .with_compiled("b", 200u64);
        assert!(bad_operand.bound_body().unwrap_err().is_validation());
        let bad_array = ModelDescriptor::new("bad", seq(param("xs"), sum())).with_compiled("xs", [1u64, 96]);
        assert!(bad_array.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip_and_fingerprint() {
        let d = adder().with_hint(ComplexityClass::C2).with_backend(BackendKind::Sga);
        let back = ModelDescriptor::from_json(&d.to_json().unwrap()).unwrap();
        assert_eq!(back, d);
        assert_eq!(back.fingerprint().unwrap(), d.fingerprint().unwrap());
        assert_ne!(adder().fingerprint().unwrap(), d.fingerprint().unwrap());
        assert_ne!(
            adder().fingerprint().unwrap(),
            adder().with_version("1.0.1").fingerprint().unwrap()
        );
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            ModelDescriptor::load("/nonexistent/model.json").unwrap_err(),
            Error::Io { .. }
        ));
    }
}
