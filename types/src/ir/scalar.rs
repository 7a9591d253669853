//! Scalar type variants.
//!
//! Primitive types of the engine, consolidated into a single enum the same
//! way compound types are kept apart in [`TypeKind`](super::TypeKind).

/// Scalar type variants
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scalar {
    /// The type of `null`. Also used for "no type specified".
    Null,

    /// Boolean type
    Bool,

    /// Signed 64-bit integer
    Int,

    /// Unsigned 64-bit integer
    Uint,

    /// 64-bit floating point
    Double,

    /// UTF-8 string
    String,

    /// Byte sequence
    Bytes,

    /// Wall-clock instant with a fixed offset
    Timestamp,

    /// Signed span of time
    Duration,
}

impl Scalar {
    /// Returns true for Int, Uint and Double.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Scalar::Int | Scalar::Uint | Scalar::Double)
    }

    /// Returns true if values of this scalar have a total order.
    pub fn is_comparable(&self) -> bool {
        !matches!(self, Scalar::Null)
    }

    /// The name used when printing types.
    pub fn name(&self) -> &'static str {
        match self {
            Scalar::Null => "null_type",
            Scalar::Bool => "bool",
            Scalar::Int => "int",
            Scalar::Uint => "uint",
            Scalar::Double => "double",
            Scalar::String => "string",
            Scalar::Bytes => "bytes",
            Scalar::Timestamp => "google.protobuf.Timestamp",
            Scalar::Duration => "google.protobuf.Duration",
        }
    }
}
