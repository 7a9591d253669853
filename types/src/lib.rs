//! Hostbind type system.
//!
//! Types are immutable, reference-counted handles. Scalars, `dyn`, `type` and
//! `error` are process-wide singletons, so two calls to [`Type::int`] return the
//! same allocation. Compound types compare structurally.
//!
//! # Example
//!
//! ```
//! use hostbind_types::{Traits, Type};
//!
//! let ints = Type::list(Type::int());
//! assert_eq!(ints.to_string(), "list(int)");
//!
//! let point = Type::object("geo.Point", Traits::FIELD_TESTER | Traits::INDEXER);
//! assert!(point.has_trait(Traits::INDEXER));
//! ```

#![no_std]
extern crate alloc;

// Intermediate Representation
pub mod ir;

pub use ir::{ObjectType, Scalar, Traits, TyData, Type, TypeFlags, TypeKind};
