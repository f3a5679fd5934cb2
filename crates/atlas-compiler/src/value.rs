//! Runtime inputs and execution results.
//!
//! Inputs arrive as a name → [`InputValue`] map and are checked against the
//! model's declared [`ParamKind`]s before a plan runs. Every plan produces a
//! [`Value`].

use crate::algebra::SgaElement;
use crate::core::class::ClassIndex;
use crate::core::ring::RingResult;
use crate::error::{Error, Result};
use crate::lut::Base96Digit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declared shape of a runtime parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamKind {
    /// A single class index in `[0, 95]`.
    Class,
    /// An array of class indices.
    ClassArray,
    /// An unbounded non-negative integer.
    Integer,
}

impl ParamKind {
    /// Check `input` against this kind and convert it to a [`Value`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming `name` when the shape is wrong or
    /// a class value lies outside `[0, 95]`.
    pub fn bind(self, name: &str, input: &InputValue) -> Result<Value> {
        let class = |v: u64| {
            u8::try_from(v)
                .ok()
                .and_then(ClassIndex::checked)
                .ok_or_else(|| Error::validation(name, format!("class value {v} out of range [0, 95]")))
        };
        match (self, input) {
            (Self::Class, InputValue::Scalar(v)) => Ok(Value::Class(class(*v)?)),
            (Self::ClassArray, InputValue::Array(vs)) => Ok(Value::Classes(
                vs.iter().map(|v| class(*v)).collect::<Result<_>>()?,
            )),
            (Self::Integer, InputValue::Scalar(v)) => Ok(Value::Integer(*v)),
            (kind, other) => Err(Error::validation(
                name,
                format!("expected {kind:?}, got {}", other.shape_name()),
            )),
        }
    }
}

/// A raw input value, as written in JSON: a number or an array of numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    /// A single number.
    Scalar(u64),
    /// An array of numbers.
    Array(Vec<u64>),
}

impl InputValue {
    fn shape_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "a scalar",
            Self::Array(_) => "an array",
        }
    }
}

impl From<u64> for InputValue {
    fn from(v: u64) -> Self {
        Self::Scalar(v)
    }
}

impl From<u8> for InputValue {
    fn from(v: u8) -> Self {
        Self::Scalar(v as u64)
    }
}

impl From<ClassIndex> for InputValue {
    fn from(c: ClassIndex) -> Self {
        Self::Scalar(c.value() as u64)
    }
}

impl From<Vec<u64>> for InputValue {
    fn from(v: Vec<u64>) -> Self {
        Self::Array(v)
    }
}

impl<const N: usize> From<[u64; N]> for InputValue {
    fn from(v: [u64; N]) -> Self {
        Self::Array(v.to_vec())
    }
}

/// Named runtime inputs.
///
/// ```
/// use atlas_compiler::Inputs;
///
/// let inputs = Inputs::new().with("a", 50u64).with("xs", [1u64, 2, 3]);
/// assert_eq!(inputs.len(), 2);
/// let parsed = Inputs::from_json(r#"{"a": 50, "xs": [1, 2, 3]}"#).unwrap();
/// assert_eq!(parsed, inputs);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inputs(BTreeMap<String, InputValue>);

impl Inputs {
    /// Empty input map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<InputValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Look up a value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&InputValue> {
        self.0.get(name)
    }

    /// Names and values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &InputValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of inputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no inputs are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Descriptor`] on malformed JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<K: Into<String>, V: Into<InputValue>> FromIterator<(K, V)> for Inputs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// The result of running a plan.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value yet (the initial accumulator).
    Unit,
    /// A class index.
    Class(ClassIndex),
    /// An ordered array of class indices.
    Classes(Vec<ClassIndex>),
    /// A predicate result.
    Bool(bool),
    /// An integer outside the class range.
    Integer(u64),
    /// A hierarchical (base-96) factorization.
    Digits(Vec<Base96Digit>),
    /// An overflow-tracked ring result.
    Ring(RingResult),
    /// A general SGA element.
    Sga(SgaElement),
    /// Results of a parallel composition that are not all classes.
    Tuple(Vec<Value>),
}

impl Value {
    /// The class index, if this is one.
    #[must_use]
    pub fn as_class(&self) -> Option<ClassIndex> {
        match self {
            Self::Class(c) => Some(*c),
            _ => None,
        }
    }

    /// The class array, if this is one.
    #[must_use]
    pub fn as_classes(&self) -> Option<&[ClassIndex]> {
        match self {
            Self::Classes(cs) => Some(cs),
            _ => None,
        }
    }

    /// The ring result, if this is one.
    #[must_use]
    pub fn as_ring(&self) -> Option<RingResult> {
        match self {
            Self::Ring(r) => Some(*r),
            _ => None,
        }
    }

    /// The SGA element, if this is one.
    #[must_use]
    pub fn as_sga(&self) -> Option<&SgaElement> {
        match self {
            Self::Sga(x) => Some(x),
            _ => None,
        }
    }

    /// The boolean, if this is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Class(_) => "class",
            Self::Classes(_) => "class array",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Digits(_) => "digits",
            Self::Ring(_) => "ring result",
            Self::Sga(_) => "SGA element",
            Self::Tuple(_) => "tuple",
        }
    }

    /// Join the two results of a parallel composition.
    ///
    /// Classes and class arrays concatenate into one class array; anything
    /// else pairs up as a tuple.
    #[must_use]
    pub fn join(left: Self, right: Self) -> Self {
        match (left, right) {
            (Self::Class(a), Self::Class(b)) => Self::Classes(vec![a, b]),
            (Self::Class(a), Self::Classes(mut bs)) => {
                bs.insert(0, a);
                Self::Classes(bs)
            }
            (Self::Classes(mut a), Self::Class(b)) => {
                a.push(b);
                Self::Classes(a)
            }
            (Self::Classes(mut a), Self::Classes(b)) => {
                a.extend(b);
                Self::Classes(a)
            }
            (l, r) => Self::Tuple(vec![l, r]),
        }
    }

    /// Structural equality with SGA coefficients compared within tolerance.
    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Sga(a), Self::Sga(b)) => a.approx_eq(b),
            (Self::Tuple(a), Self::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.approx_eq(y))
            }
            (a, b) => a == b,
        }
    }
}

impl From<ClassIndex> for Value {
    fn from(c: ClassIndex) -> Self {
        Self::Class(c)
    }
}

impl From<RingResult> for Value {
    fn from(r: RingResult) -> Self {
        Self::Ring(r)
    }
}
