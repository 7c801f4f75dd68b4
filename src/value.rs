use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use url::Url;
use uuid::Uuid;

/// A dynamically typed configuration value.
///
/// `CastValue` is both the input and the output of the cast dispatcher:
/// the host hands in raw text (or absence) and receives the converted
/// shape back. Values are immutable and freshly constructed per call.
#[derive(Debug, Clone, PartialEq)]
pub enum CastValue {
    /// Absence: the key was not present and no default was supplied
    None,
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    /// Ordered list; element order equals split order
    List(Vec<CastValue>),
    Json(serde_json::Value),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    Duration(TimeDelta),
    /// Local date-time at an epoch-seconds offset
    Timestamp(DateTime<Local>),
    Url(Url),
    Uuid(Uuid),
    Path(PathBuf),
}

impl CastValue {
    /// Short name of the concrete shape, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Str(_) => "str",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Decimal(_) => "decimal",
            Self::List(_) => "list",
            Self::Json(_) => "json",
            Self::DateTime(_) => "datetime",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::Duration(_) => "timedelta",
            Self::Timestamp(_) => "timestamp",
            Self::Url(_) => "url",
            Self::Uuid(_) => "uuid",
            Self::Path(_) => "path",
        }
    }

    /// True for absence and for the empty string. Drives the empty-value
    /// substitution of bare constructors.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None) || matches!(self, Self::Str(s) if s.is_empty())
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Borrow the raw text if this value is a string.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[CastValue]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            Self::Time(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<TimeDelta> {
        match self {
            Self::Duration(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Local>> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            Self::Url(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::Path(p) => Some(p.as_path()),
            _ => None,
        }
    }

    /// Consume into the inner list, if this value is a list.
    pub fn into_list(self) -> Option<Vec<CastValue>> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Consume into the inner string, if this value is a string.
    pub fn into_string(self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Consume into the inner JSON document, if present.
    pub fn into_json(self) -> Option<serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Consume into the inner path, if present.
    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            Self::Path(p) => Some(p),
            _ => None,
        }
    }

    /// Consume into the inner URL, if present.
    pub fn into_url(self) -> Option<Url> {
        match self {
            Self::Url(u) => Some(u),
            _ => None,
        }
    }
}

impl fmt::Display for CastValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Str(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::List(items) => {
                let mut first = true;
                for item in items {
                    if !first {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                    first = false;
                }
                Ok(())
            }
            Self::Json(v) => write!(f, "{v}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
            Self::Date(d) => write!(f, "{d}"),
            Self::Time(t) => write!(f, "{t}"),
            Self::Duration(d) => write!(f, "{d}"),
            Self::Timestamp(ts) => write!(f, "{ts}"),
            Self::Url(u) => write!(f, "{u}"),
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Path(p) => write!(f, "{}", p.display()),
        }
    }
}

impl From<&str> for CastValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for CastValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for CastValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for CastValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for CastValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<Option<String>> for CastValue {
    fn from(opt: Option<String>) -> Self {
        opt.map_or(Self::None, Self::Str)
    }
}
