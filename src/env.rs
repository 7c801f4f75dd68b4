use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

use crate::{CastError, CastOptions, CastRegistry, CastResult, CastValue, Caster, TypeTag};

/// Typed view over a host-supplied key/value snapshot.
///
/// `DogEnv` composes the external loader's result (a plain map of raw
/// string pairs) with a [`Caster`]; it never reaches into process state
/// itself and never mutates the snapshot. Each supported tag gets an
/// explicit accessor method, so there is no dynamic member dispatch:
/// what you can ask for is exactly what is implemented.
///
/// Missing keys flow into the dispatcher as absence, keeping the
/// dispatcher's semantics: `bool` of a missing key is `false`, `int` is
/// `0`, `datetime` is an error.
pub struct DogEnv {
    vars: HashMap<String, String>,
    caster: Caster,
}

impl DogEnv {
    /// Wrap a snapshot with the built-in constructor set.
    pub fn new(vars: HashMap<String, String>) -> Self {
        Self {
            vars,
            caster: Caster::default(),
        }
    }

    /// Wrap a snapshot with a host-extended registry.
    pub fn with_registry(vars: HashMap<String, String>, registry: CastRegistry) -> Self {
        Self {
            vars,
            caster: Caster::new(registry),
        }
    }

    pub fn caster(&self) -> &Caster {
        &self.caster
    }

    /// Raw value for `key`, if present.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn has(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Generic entry point: look `key` up and cast through `tag`.
    pub fn get(&self, key: &str, tag: &TypeTag, options: &CastOptions) -> CastResult<CastValue> {
        self.caster.cast(self.lookup(key), tag, options)
    }

    /// Like [`get`](Self::get), but substitutes `default` as the raw
    /// value when the key is missing or empty, before casting.
    pub fn get_or(
        &self,
        key: &str,
        default: &str,
        tag: &TypeTag,
        options: &CastOptions,
    ) -> CastResult<CastValue> {
        let value = match self.vars.get(key) {
            Some(v) if !v.is_empty() => CastValue::Str(v.clone()),
            _ => CastValue::Str(default.to_string()),
        };
        self.caster.cast(value, tag, options)
    }

    // ---- Explicit per-tag accessors ----

    pub fn str(&self, key: &str) -> CastResult<String> {
        let value = self.tagged(key, "str")?;
        value.into_string().ok_or_else(|| unexpected("str"))
    }

    pub fn bool(&self, key: &str) -> CastResult<bool> {
        let value = self.tagged(key, "bool")?;
        value.as_bool().ok_or_else(|| unexpected("bool"))
    }

    pub fn int(&self, key: &str) -> CastResult<i64> {
        let value = self.tagged(key, "int")?;
        value.as_int().ok_or_else(|| unexpected("int"))
    }

    pub fn float(&self, key: &str) -> CastResult<f64> {
        let value = self.tagged(key, "float")?;
        value.as_float().ok_or_else(|| unexpected("float"))
    }

    pub fn decimal(&self, key: &str) -> CastResult<Decimal> {
        let value = self.tagged(key, "decimal")?;
        value.as_decimal().ok_or_else(|| unexpected("decimal"))
    }

    /// List accessor; `options` carries `delimiter` and `subcast`.
    pub fn list(&self, key: &str, options: &CastOptions) -> CastResult<Vec<CastValue>> {
        let value = self.get(key, &TypeTag::name("list"), options)?;
        value.into_list().ok_or_else(|| unexpected("list"))
    }

    pub fn json(&self, key: &str) -> CastResult<serde_json::Value> {
        let value = self.tagged(key, "json")?;
        value.into_json().ok_or_else(|| unexpected("json"))
    }

    /// Parse a JSON value and deserialize it into a concrete type.
    pub fn json_as<T: DeserializeOwned>(&self, key: &str) -> CastResult<T> {
        let doc = self.json(key)?;
        serde_json::from_value(doc).map_err(|e| CastError::malformed("json", e))
    }

    pub fn datetime(&self, key: &str) -> CastResult<NaiveDateTime> {
        let value = self.tagged(key, "datetime")?;
        value.as_datetime().ok_or_else(|| unexpected("datetime"))
    }

    pub fn date(&self, key: &str) -> CastResult<NaiveDate> {
        let value = self.tagged(key, "date")?;
        value.as_date().ok_or_else(|| unexpected("date"))
    }

    pub fn time(&self, key: &str) -> CastResult<NaiveTime> {
        let value = self.tagged(key, "time")?;
        value.as_time().ok_or_else(|| unexpected("time"))
    }

    pub fn timedelta(&self, key: &str) -> CastResult<TimeDelta> {
        let value = self.tagged(key, "timedelta")?;
        value.as_duration().ok_or_else(|| unexpected("timedelta"))
    }

    pub fn timestamp(&self, key: &str) -> CastResult<DateTime<Local>> {
        let value = self.tagged(key, "timestamp")?;
        value.as_timestamp().ok_or_else(|| unexpected("timestamp"))
    }

    pub fn url(&self, key: &str) -> CastResult<Url> {
        let value = self.tagged(key, "url")?;
        value.into_url().ok_or_else(|| unexpected("url"))
    }

    pub fn uuid(&self, key: &str) -> CastResult<Uuid> {
        let value = self.tagged(key, "uuid")?;
        value.as_uuid().ok_or_else(|| unexpected("uuid"))
    }

    pub fn path(&self, key: &str) -> CastResult<PathBuf> {
        let value = self.tagged(key, "path")?;
        value.into_path().ok_or_else(|| unexpected("path"))
    }

    fn lookup(&self, key: &str) -> CastValue {
        self.vars
            .get(key)
            .map_or(CastValue::None, |v| CastValue::Str(v.clone()))
    }

    fn tagged(&self, key: &str, tag: &str) -> CastResult<CastValue> {
        self.get(key, &TypeTag::name(tag), &CastOptions::default())
    }
}

impl FromIterator<(String, String)> for DogEnv {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl std::fmt::Debug for DogEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.vars.keys().collect();
        keys.sort();
        f.debug_struct("DogEnv").field("keys", &keys).finish()
    }
}

fn unexpected(tag: &str) -> CastError {
    CastError::malformed(tag, "dispatcher returned an unexpected shape")
}
