use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use crate::{CastError, CastResult, CastValue};

/// A bare scalar constructor: one value in, one typed value out.
///
/// Constructors are shared, immutable and side-effect free, so a
/// registry can be read from any number of threads once built.
pub type ScalarCtor = Arc<dyn Fn(&CastValue) -> CastResult<CastValue> + Send + Sync>;

/// Registry mapping bare constructor names to scalar constructors.
///
/// This is the explicit, injectable counterpart of "look the name up in
/// the host's builtins": the constructor set is fixed here, extended by
/// the host during setup and then handed by value to a
/// [`Caster`](crate::Caster). Lookups compare on the lower-cased name.
///
/// Built-in entries: `str`, `int`, `float`, `decimal`, `bool`.
pub struct CastRegistry {
    constructors: HashMap<String, ScalarCtor>,
}

impl CastRegistry {
    /// An empty registry with no constructors at all.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// A registry populated with the built-in scalar constructors.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.insert("str", str_of);
        registry.insert("int", int_of);
        registry.insert("float", float_of);
        registry.insert("decimal", decimal_of);
        registry.insert("bool", truthy_of);
        registry
    }

    /// Register a host constructor under `name`.
    ///
    /// Must happen before the registry is handed to a dispatcher; there
    /// is no removal operation. Registering an existing name replaces it.
    pub fn register_constructor<F>(&mut self, name: impl Into<String>, ctor: F)
    where
        F: Fn(&CastValue) -> CastResult<CastValue> + Send + Sync + 'static,
    {
        let name = name.into().to_lowercase();
        debug!(name = %name, "registering scalar constructor");
        self.constructors.insert(name, Arc::new(ctor));
    }

    /// Look up a constructor by name (case-insensitive).
    pub fn constructor(&self, name: &str) -> Option<&ScalarCtor> {
        self.constructors.get(&name.to_lowercase())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.constructors.contains_key(&name.to_lowercase())
    }

    /// All registered constructor names.
    pub fn registered_names(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }

    fn insert(&mut self, name: &str, ctor: fn(&CastValue) -> CastResult<CastValue>) {
        self.constructors.insert(name.to_string(), Arc::new(ctor));
    }
}

impl Default for CastRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for CastRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names = self.registered_names();
        names.sort();
        f.debug_struct("CastRegistry").field("constructors", &names).finish()
    }
}

// ---- Built-in constructors ----

fn str_of(value: &CastValue) -> CastResult<CastValue> {
    Ok(CastValue::Str(value.to_string()))
}

fn int_of(value: &CastValue) -> CastResult<CastValue> {
    match value {
        CastValue::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(CastValue::Int)
            .map_err(|e| CastError::malformed("int", format!("invalid integer literal `{s}`: {e}"))),
        CastValue::Int(n) => Ok(CastValue::Int(*n)),
        CastValue::Float(x) => Ok(CastValue::Int(x.trunc() as i64)),
        CastValue::Bool(b) => Ok(CastValue::Int(i64::from(*b))),
        other => Err(CastError::malformed(
            "int",
            format!("cannot convert {} to an integer", other.type_name()),
        )),
    }
}

fn float_of(value: &CastValue) -> CastResult<CastValue> {
    match value {
        CastValue::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(CastValue::Float)
            .map_err(|e| CastError::malformed("float", format!("invalid float literal `{s}`: {e}"))),
        CastValue::Int(n) => Ok(CastValue::Float(*n as f64)),
        CastValue::Float(x) => Ok(CastValue::Float(*x)),
        CastValue::Bool(b) => Ok(CastValue::Float(f64::from(u8::from(*b)))),
        other => Err(CastError::malformed(
            "float",
            format!("cannot convert {} to a float", other.type_name()),
        )),
    }
}

fn decimal_of(value: &CastValue) -> CastResult<CastValue> {
    match value {
        CastValue::Str(s) => {
            let trimmed = s.trim();
            Decimal::from_str(trimmed)
                .or_else(|_| Decimal::from_scientific(trimmed))
                .map(CastValue::Decimal)
                .map_err(|e| CastError::malformed("decimal", format!("invalid decimal literal `{s}`: {e}")))
        }
        CastValue::Int(n) => Ok(CastValue::Decimal(Decimal::from(*n))),
        CastValue::Decimal(d) => Ok(CastValue::Decimal(*d)),
        CastValue::Float(x) => Decimal::from_f64_retain(*x)
            .map(CastValue::Decimal)
            .ok_or_else(|| CastError::malformed("decimal", format!("float {x} has no decimal form"))),
        other => Err(CastError::malformed(
            "decimal",
            format!("cannot convert {} to a decimal", other.type_name()),
        )),
    }
}

/// Truthiness of the raw value, as a host `bool` constructor would see
/// it: empty text is false, anything else is true. The `bool` *tag* has
/// its own lexical rule and never reaches this entry; this one serves
/// `subcast = "bool"` inside list casts.
fn truthy_of(value: &CastValue) -> CastResult<CastValue> {
    let truthy = match value {
        CastValue::None => false,
        CastValue::Str(s) => !s.is_empty(),
        CastValue::Bool(b) => *b,
        CastValue::Int(n) => *n != 0,
        CastValue::Float(x) => *x != 0.0,
        CastValue::Decimal(d) => !d.is_zero(),
        CastValue::List(items) => !items.is_empty(),
        _ => true,
    };
    Ok(CastValue::Bool(truthy))
}
