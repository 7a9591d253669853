//! Type representation shared by the engine and the host bridge.

mod display;
mod scalar;
mod traits;
mod ty;


pub use scalar::Scalar;
pub use traits::Traits;
pub use ty::{ObjectType, TyData, Type, TypeFlags, TypeKind};
