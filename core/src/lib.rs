//! Reflective bridge between host Rust values and an embedded expression
//! engine.
//!
//! - [`reflect`]: runtime type descriptors for host values.
//! - [`bridge`]: type mapping, value adaptation and the [`bridge::Registry`].
//! - [`api`]: environments, programs and the plugin traits.
//! - [`syntax`], [`analyzer`], [`evaluator`]: the reference engine.

extern crate self as hostbind_core;

pub mod analyzer;
pub mod api;
pub mod bridge;
pub mod evaluator;
pub mod reflect;
pub mod syntax;
pub mod values;

pub use hostbind_macros::Native;
pub use hostbind_types as types;
