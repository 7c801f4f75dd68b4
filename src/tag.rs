use std::any::TypeId;
use std::fmt;

/// How a conversion is requested.
///
/// Tags are matched on their lower-cased form; unknown names are an
/// error, never a silent passthrough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    /// No cast requested: the dispatcher returns the value unchanged.
    Pass,
    /// A named conversion rule, matched case-insensitively.
    Name(String),
    /// A concrete Rust type requested directly. Reserved: dispatch by
    /// `TypeId` always fails with `UnsupportedTagForm`.
    Native(TypeId),
}

impl TypeTag {
    /// Tag a conversion by name.
    pub fn name(tag: impl Into<String>) -> Self {
        Self::Name(tag.into())
    }

    /// Request a cast to a concrete Rust type (not implemented).
    pub fn native<T: 'static>() -> Self {
        Self::Native(TypeId::of::<T>())
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl From<&str> for TypeTag {
    fn from(tag: &str) -> Self {
        Self::Name(tag.to_string())
    }
}

impl From<String> for TypeTag {
    fn from(tag: String) -> Self {
        Self::Name(tag)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "<pass>"),
            Self::Name(name) => write!(f, "{name}"),
            Self::Native(_) => write!(f, "<native type>"),
        }
    }
}
