use std::fmt::Display;

use thiserror::Error;

/// Result type for cast operations
pub type CastResult<T> = Result<T, CastError>;

/// Errors raised by the cast dispatcher.
///
/// Every failure is a deterministic function of (value, tag, options):
/// the dispatcher performs no retries, no recovery and no default
/// substitution beyond the documented empty-value rule for bare
/// constructors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CastError {
    /// Tag names neither a structured rule nor a registered constructor
    #[error("Unknown type tag `{0}`")]
    UnknownTag(String),

    /// Tag was requested as a concrete Rust type instead of a name
    #[error("Casting by concrete type is not implemented; request a named tag")]
    UnsupportedTagForm,

    /// Tag names a conversion that is intentionally left unimplemented
    #[error("Typecast `{0}` is not implemented")]
    NotImplemented(String),

    /// Value cannot be parsed under the tag's grammar
    #[error("Typecast `{tag}` error: {reason}")]
    MalformedValue { tag: String, reason: String },

    /// `subcast` option does not resolve to any registered constructor
    #[error("Subcast `{0}` not found")]
    SubcastNotFound(String),

    /// One element of a list cast failed; the whole cast fails
    #[error("List element {index} failed cast: {source}")]
    ElementCast {
        index: usize,
        source: Box<CastError>,
    },
}

impl CastError {
    /// Build a `MalformedValue` from the tag and any displayable cause.
    pub fn malformed(tag: impl Into<String>, reason: impl Display) -> Self {
        Self::MalformedValue {
            tag: tag.into(),
            reason: reason.to_string(),
        }
    }

    /// Wrap an element failure at `index` inside a list cast.
    pub fn element(index: usize, source: CastError) -> Self {
        Self::ElementCast {
            index,
            source: Box::new(source),
        }
    }

    /// Whether this error means "planned but absent" rather than "never valid".
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented(_) | Self::UnsupportedTagForm)
    }
}
