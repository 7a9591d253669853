use super::{Type, TypeKind};
use core::fmt;

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            TypeKind::Scalar(s) => f.write_str(s.name()),
            TypeKind::Dyn => f.write_str("dyn"),
            TypeKind::Type => f.write_str("type"),
            TypeKind::Error => f.write_str("error"),
            TypeKind::List(elem) => write!(f, "list({})", elem),
            TypeKind::Map(key, val) => write!(f, "map({}, {})", key, val),
            TypeKind::Object(obj) => f.write_str(&obj.name),
            TypeKind::Nullable(inner) => write!(f, "nullable({})", inner),
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self)
    }
}
