//! The host bridge: exposes native Rust values, functions and structs to
//! expressions.
//!
//! # Overview
//!
//! - [`TypeMapper`] maps host type descriptors to engine types.
//! - [`StructFieldIndex`] resolves the externally visible fields of a struct
//!   under a naming convention.
//! - [`ValueAdapter`] converts host values to engine values, wrapping structs
//!   as [`NativeObject`]s.
//! - [`FunctionBinder`] validates host functions and stores them as
//!   overloads.
//! - [`capability_overloads`] wires operators for objects that implement
//!   capability traits.
//! - [`VariableStore`] keeps registered values and declarations.
//! - [`Registry`] ties all of the above together and plugs into
//!   [`Env`](crate::api::Env).
//!
//! All caches are safe to share between threads. Registration itself takes
//! `&mut Registry` and happens before the registry is shared.

mod adapter;
mod capabilities;
mod error;
mod fields;
mod functions;
mod native_object;
mod registry;
mod type_mapper;
mod vars;

#[cfg(test)]
mod adapter_test;
#[cfg(test)]
mod capabilities_test;
#[cfg(test)]
mod functions_test;
#[cfg(test)]
mod registry_test;

pub use adapter::{ConversionRule, ValueAdapter};
pub use capabilities::{CapabilityCache, capability_overloads};
pub use error::RegistrationError;
pub use fields::{FieldDescriptor, FieldMap, StructFieldIndex, external_name};
pub use functions::{FnResult, FunctionBinder, IntoNativeFunction, NativeFunction, ResultShape, native};
pub use native_object::NativeObject;
pub use registry::{Registration, Registry, RegistryOptions};
pub use type_mapper::{STRUCT_TRAITS, TypeMapper, is_supported, object_type};
pub use vars::{VariableEntry, VariableStore};
