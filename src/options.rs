use std::fmt;
use std::sync::Arc;

use crate::registry::ScalarCtor;
use crate::{CastResult, CastValue};

/// Default separator for the `list` cast.
pub const DEFAULT_DELIMITER: &str = ",";

/// Per-call options for composite casts.
///
/// An open bag of named parameters: unknown tags ignore the options
/// they do not recognize.
#[derive(Clone, Default)]
pub struct CastOptions {
    /// Separator for the `list` cast. Defaults to `,` when unset.
    pub delimiter: Option<String>,
    /// Secondary cast applied to every element of a `list` cast.
    pub subcast: Option<Subcast>,
}

/// Target of a list subcast: the name of a registered bare constructor,
/// or a constructor supplied directly by the host.
#[derive(Clone)]
pub enum Subcast {
    Name(String),
    Ctor(ScalarCtor),
}

impl CastOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split list values on `delimiter` instead of the default `,`.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    /// Cast every list element through the named bare constructor.
    pub fn with_subcast(mut self, name: impl Into<String>) -> Self {
        self.subcast = Some(Subcast::Name(name.into()));
        self
    }

    /// Cast every list element through a constructor supplied directly.
    pub fn with_subcast_ctor<F>(mut self, ctor: F) -> Self
    where
        F: Fn(&CastValue) -> CastResult<CastValue> + Send + Sync + 'static,
    {
        self.subcast = Some(Subcast::Ctor(Arc::new(ctor)));
        self
    }

    pub(crate) fn delimiter(&self) -> &str {
        self.delimiter.as_deref().unwrap_or(DEFAULT_DELIMITER)
    }
}

impl fmt::Debug for CastOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CastOptions")
            .field("delimiter", &self.delimiter)
            .field("subcast", &self.subcast)
            .finish()
    }
}

impl fmt::Debug for Subcast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "Subcast::Name({name:?})"),
            Self::Ctor(_) => write!(f, "Subcast::Ctor(..)"),
        }
    }
}
