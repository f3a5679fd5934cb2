//! Core data types and constants.
//!
//! - [`class::ClassIndex`]: validated class index in `[0, 95]`
//! - [`class::ClassCoords`]: the (h₂, d, ℓ) decomposition
//! - [`constants`]: orders of the three cyclic factors and derived values
//! - [`ring`]: ℤ₉₆ arithmetic with overflow tracking

pub mod class;
pub mod constants;
pub mod ring;
