//! Backend selection and compiler configuration.
//!
//! The complexity thresholds are policy, not semantics: they live in a
//! [`SelectorPolicy`] that can be loaded from TOML.
//!
//! ```
//! use atlas_compiler::select::CompilerConfig;
//!
//! let config = CompilerConfig::from_toml_str(r#"
//!     verify_normalization = true
//!
//!     [policy]
//!     c1_max_seq_depth = 4
//! "#).unwrap();
//! assert_eq!(config.policy.c1_max_seq_depth, 4);
//! assert_eq!(config.policy.c2_max_seq_depth, 5);
//! ```

use crate::analysis::ComplexityClass;
use crate::error::{Error, Result};
use core::fmt;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Execution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Integer/permutation plan over class indices.
    Class,
    /// Full tensor-algebra plan; the correctness oracle.
    Sga,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Class => "class",
            Self::Sga => "sga",
        })
    }
}

/// Tunable complexity thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectorPolicy {
    /// Deepest `seq` nesting still classed C1.
    pub c1_max_seq_depth: usize,
    /// Deepest `par` nesting still classed C1.
    pub c1_max_par_depth: usize,
    /// Most grade/bridge atoms still classed C2.
    pub c2_max_grade_atoms: usize,
    /// Deepest `seq` nesting still classed C2.
    pub c2_max_seq_depth: usize,
}

impl Default for SelectorPolicy {
    fn default() -> Self {
        Self {
            c1_max_seq_depth: 3,
            c1_max_par_depth: 2,
            c2_max_grade_atoms: 2,
            c2_max_seq_depth: 5,
        }
    }
}

/// Compiler-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Complexity thresholds.
    pub policy: SelectorPolicy,
    /// Re-normalize every normalized tree and fail if it changes.
    pub verify_normalization: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            policy: SelectorPolicy::default(),
            verify_normalization: cfg!(debug_assertions),
        }
    }
}

impl CompilerConfig {
    /// Parse from TOML; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on malformed TOML or unknown keys.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and [`Error::Config`]
    /// if it does not parse.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Pick a backend: an explicit preference always wins, otherwise C0/C1 run
/// on the class backend and C2/C3 on the SGA backend.
#[must_use]
pub fn select_backend(preference: Option<BackendKind>, complexity: ComplexityClass) -> BackendKind {
    match (preference, complexity) {
        (Some(kind), _) => kind,
        (None, ComplexityClass::C0 | ComplexityClass::C1) => BackendKind::Class,
        (None, ComplexityClass::C2 | ComplexityClass::C3) => BackendKind::Sga,
    }
}
