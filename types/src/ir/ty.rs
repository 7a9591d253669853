use super::{Scalar, Traits};
use alloc::sync::Arc;
use core::hash::{Hash, Hasher};

use bitflags::bitflags;
use once_cell::race::OnceBox;

bitflags! {
    /// Flags indicating various properties of a type.
    ///
    /// These flags are computed once when a type is built and cached
    /// for efficient queries. This avoids repeated recursive traversals.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct TypeFlags: u16 {
        /// The type is `dyn` or contains `dyn`.
        const HAS_DYN = 1;
        /// The type is or contains an object type.
        const HAS_OBJECT = 1 << 1;
        /// The type is or contains a nullable type.
        const HAS_NULLABLE = 1 << 2;
    }
}

/// A named object type.
///
/// Object types are identified by name. The capability mask travels with the
/// type but does not take part in equality.
#[derive(Clone, Debug)]
pub struct ObjectType {
    pub name: Arc<str>,
    pub traits: Traits,
}

impl PartialEq for ObjectType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ObjectType {}

impl Hash for ObjectType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Logical structure of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Scalar types (null, bool, numbers, strings, time)
    Scalar(Scalar),

    /// Accepts and produces any value. Checked at runtime.
    Dyn,

    /// The type of type values.
    Type,

    /// The type of error values.
    Error,

    /// List type with element type
    List(Type),

    /// Map type with key and value types
    Map(Type, Type),

    /// Named host or library object.
    Object(ObjectType),

    /// Inner type or null.
    Nullable(Type),
}

impl TypeKind {
    /// Compute type flags for this type kind.
    pub fn compute_flags(&self) -> TypeFlags {
        match self {
            TypeKind::Scalar(_) | TypeKind::Type | TypeKind::Error => TypeFlags::empty(),
            TypeKind::Dyn => TypeFlags::HAS_DYN,
            TypeKind::List(elem) => elem.flags(),
            TypeKind::Map(key, val) => key.flags() | val.flags(),
            TypeKind::Object(_) => TypeFlags::HAS_OBJECT,
            TypeKind::Nullable(inner) => inner.flags() | TypeFlags::HAS_NULLABLE,
        }
    }
}

/// Data for a type: kind + cached flags.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct TyData {
    /// The actual type structure
    pub kind: TypeKind,

    /// Cached properties for efficient queries
    pub flags: TypeFlags,
}

/// Shared, immutable type handle.
///
/// Cloning is a reference-count bump. Equality is structural; use
/// [`Type::ptr_eq`] to test identity.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Type(Arc<TyData>);

macro_rules! singleton {
    ($fn_name:ident, $kind:expr) => {
        pub fn $fn_name() -> Type {
            static CELL: OnceBox<Type> = OnceBox::new();
            CELL.get_or_init(|| alloc::boxed::Box::new(Type::new($kind)))
                .clone()
        }
    };
}

impl Type {
    /// Builds a type from its kind, computing flags.
    pub fn new(kind: TypeKind) -> Self {
        let flags = kind.compute_flags();
        Type(Arc::new(TyData { kind, flags }))
    }

    singleton!(null, TypeKind::Scalar(Scalar::Null));
    singleton!(bool, TypeKind::Scalar(Scalar::Bool));
    singleton!(int, TypeKind::Scalar(Scalar::Int));
    singleton!(uint, TypeKind::Scalar(Scalar::Uint));
    singleton!(double, TypeKind::Scalar(Scalar::Double));
    singleton!(string, TypeKind::Scalar(Scalar::String));
    singleton!(bytes, TypeKind::Scalar(Scalar::Bytes));
    singleton!(timestamp, TypeKind::Scalar(Scalar::Timestamp));
    singleton!(duration, TypeKind::Scalar(Scalar::Duration));
    singleton!(dyn_, TypeKind::Dyn);
    singleton!(type_, TypeKind::Type);
    singleton!(error, TypeKind::Error);

    pub fn scalar(scalar: Scalar) -> Type {
        match scalar {
            Scalar::Null => Type::null(),
            Scalar::Bool => Type::bool(),
            Scalar::Int => Type::int(),
            Scalar::Uint => Type::uint(),
            Scalar::Double => Type::double(),
            Scalar::String => Type::string(),
            Scalar::Bytes => Type::bytes(),
            Scalar::Timestamp => Type::timestamp(),
            Scalar::Duration => Type::duration(),
        }
    }

    pub fn list(elem: Type) -> Type {
        Type::new(TypeKind::List(elem))
    }

    pub fn map(key: Type, value: Type) -> Type {
        Type::new(TypeKind::Map(key, value))
    }

    pub fn object(name: impl Into<Arc<str>>, traits: Traits) -> Type {
        Type::new(TypeKind::Object(ObjectType {
            name: name.into(),
            traits,
        }))
    }

    /// Wraps `inner` so it also accepts null.
    ///
    /// Nullable of null, dyn or an already nullable type is the type itself.
    pub fn nullable(inner: Type) -> Type {
        match inner.kind() {
            TypeKind::Scalar(Scalar::Null) | TypeKind::Dyn | TypeKind::Nullable(_) => inner,
            _ => Type::new(TypeKind::Nullable(inner)),
        }
    }

    pub fn kind(&self) -> &TypeKind {
        &self.0.kind
    }

    pub fn flags(&self) -> TypeFlags {
        self.0.flags
    }

    /// Identity comparison: true if both handles share one allocation.
    pub fn ptr_eq(a: &Type, b: &Type) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub fn is_dyn(&self) -> bool {
        matches!(self.kind(), TypeKind::Dyn)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind(), TypeKind::Scalar(Scalar::Null))
    }

    pub fn as_scalar(&self) -> Option<Scalar> {
        match self.kind() {
            TypeKind::Scalar(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self.kind() {
            TypeKind::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Capability mask of an object type; empty for everything else.
    pub fn traits(&self) -> Traits {
        self.as_object().map(|o| o.traits).unwrap_or_default()
    }

    pub fn has_trait(&self, t: Traits) -> bool {
        self.traits().contains(t)
    }

    /// Strips one level of nullability.
    pub fn non_null(&self) -> &Type {
        match self.kind() {
            TypeKind::Nullable(inner) => inner,
            _ => self,
        }
    }

    /// Returns true if a value of type `other` may be used where `self` is
    /// expected. `dyn` on either side is always accepted and defers to runtime.
    pub fn is_assignable_from(&self, other: &Type) -> bool {
        if self.is_dyn() || other.is_dyn() {
            return true;
        }
        match (self.kind(), other.kind()) {
            (TypeKind::Nullable(_), TypeKind::Scalar(Scalar::Null)) => true,
            (TypeKind::Nullable(a), TypeKind::Nullable(b)) => a.is_assignable_from(b),
            (TypeKind::Nullable(a), _) => a.is_assignable_from(other),
            (TypeKind::List(a), TypeKind::List(b)) => a.is_assignable_from(b),
            (TypeKind::Map(ak, av), TypeKind::Map(bk, bv)) => {
                ak.is_assignable_from(bk) && av.is_assignable_from(bv)
            }
            (a, b) => a == b,
        }
    }
}
