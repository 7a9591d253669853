//! Host type descriptors.

use super::{Reflect, StructInfo};
use hashbrown::HashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Rebuilds a pointer-like value around a boxed pointee.
///
/// Returns `None` when the pointee is not of the expected type.
pub type WrapFn = fn(Box<dyn Reflect>) -> Option<Box<dyn Reflect>>;

/// Structural category of a host type.
#[derive(Clone, Debug)]
pub enum HostKind {
    /// `()`
    Unit,
    Bool,
    /// Signed integer with the given bit width.
    Int(u8),
    /// Unsigned integer with the given bit width.
    Uint(u8),
    /// Floating point with the given bit width.
    Float(u8),
    String,
    /// `Vec<T>` (`len: None`) or `[T; N]`.
    List { elem: HostType, len: Option<usize> },
    Map { key: HostType, value: HostType },
    /// `Box<T>` or `Arc<T>`: never nil.
    Pointer { elem: HostType, wrap: WrapFn },
    /// `Option<T>`: the nil-able pointer.
    Optional { elem: HostType, wrap: WrapFn },
    Struct(StructInfo),
    Timestamp,
    Duration,
    /// The engine's own value type, accepted as-is.
    Value,
    Error,
    Channel,
    Function,
    UnsafePointer,
}

struct HostTypeData {
    id: TypeId,
    name: &'static str,
    kind: HostKind,
}

/// Descriptor of a Rust type as seen by the bridge.
///
/// Two descriptors are equal when they describe the same `TypeId`.
#[derive(Clone)]
pub struct HostType(Arc<HostTypeData>);

/// Descriptors by `TypeId`.
///
/// A descriptor is immutable metadata fixed by the Rust type itself, like the
/// field tables `#[derive(Native)]` emits as statics, so it is shared by the
/// whole process. Everything that depends on registration (engine types,
/// field names under a convention, capabilities, conversion rules) is cached
/// in objects owned by a `Registry` instead.
static HOST_TYPES: Lazy<RwLock<HashMap<TypeId, HostType>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

impl HostType {
    /// Builds a fresh descriptor for `T`.
    pub fn new<T: ?Sized + 'static>(kind: HostKind) -> Self {
        HostType(Arc::new(HostTypeData {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            kind,
        }))
    }

    /// Returns the process-wide descriptor for `T`, building it on first use.
    ///
    /// `kind` runs without the cache lock held, so it may itself ask for the
    /// descriptors of component types.
    pub fn cached<T: ?Sized + 'static>(kind: impl FnOnce() -> HostKind) -> Self {
        let id = TypeId::of::<T>();
        if let Some(found) = HOST_TYPES.read().get(&id) {
            return found.clone();
        }
        let built = HostType::new::<T>(kind());
        HOST_TYPES.write().entry(id).or_insert(built).clone()
    }

    pub fn id(&self) -> TypeId {
        self.0.id
    }

    /// The fully qualified Rust name, e.g. `my_app::model::Point`.
    pub fn name(&self) -> &'static str {
        self.0.name
    }

    /// The name with `::` path separators replaced by `.`.
    pub fn qualified_name(&self) -> String {
        self.0.name.replace("::", ".")
    }

    pub fn kind(&self) -> &HostKind {
        &self.0.kind
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.0.id == TypeId::of::<T>()
    }

    /// Target of a `Box`/`Arc`/`Option`, if this is one.
    pub fn pointee(&self) -> Option<&HostType> {
        match self.kind() {
            HostKind::Pointer { elem, .. } | HostKind::Optional { elem, .. } => Some(elem),
            _ => None,
        }
    }

    /// Follows pointer and optional layers down to the innermost type.
    pub fn deref(&self) -> &HostType {
        let mut current = self;
        while let Some(next) = current.pointee() {
            current = next;
        }
        current
    }

    pub fn as_struct(&self) -> Option<&StructInfo> {
        match self.kind() {
            HostKind::Struct(info) => Some(info),
            _ => None,
        }
    }

    /// True if this is a struct, possibly behind pointers.
    pub fn is_struct_like(&self) -> bool {
        self.deref().as_struct().is_some()
    }
}

impl PartialEq for HostType {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for HostType {}

impl Hash for HostType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostType({})", self.0.name)
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.name)
    }
}
