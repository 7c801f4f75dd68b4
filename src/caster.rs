use std::borrow::Cow;
use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use tracing::trace;
use url::Url;
use uuid::Uuid;

use crate::options::Subcast;
use crate::{CastError, CastOptions, CastRegistry, CastResult, CastValue, TypeTag};

/// Lower-cased display forms that the `bool` tag casts to `false`.
const FALSY: [&str; 5] = ["", "0", "false", "no", "none"];

/// Tags reserved for conversions that are intentionally not implemented.
/// Requesting one fails with `NotImplemented`, distinct from an unknown
/// tag, so callers can tell "planned but absent" from "never valid".
const RESERVED: [&str; 3] = ["dict", "enum", "log_level"];

/// The cast dispatcher: selects a conversion rule for a type tag and
/// applies it to a raw value.
///
/// A `Caster` owns its [`CastRegistry`] and never consults ambient
/// state: every cast is a pure function of (value, tag, options).
/// Construction freezes the constructor set, after which the dispatcher
/// can be shared freely across threads.
pub struct Caster {
    registry: CastRegistry,
}

impl Caster {
    /// Build a dispatcher around an explicit registry.
    pub fn new(registry: CastRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CastRegistry {
        &self.registry
    }

    /// Convert `value` according to `tag`.
    ///
    /// - [`TypeTag::Pass`] returns the value unchanged for any shape.
    /// - [`TypeTag::Native`] fails fast with `UnsupportedTagForm`.
    /// - [`TypeTag::Name`] is lower-cased, then matched against the
    ///   structured rules first and the bare-constructor registry second.
    pub fn cast(&self, value: CastValue, tag: &TypeTag, options: &CastOptions) -> CastResult<CastValue> {
        let name = match tag {
            TypeTag::Pass => return Ok(value),
            TypeTag::Native(_) => return Err(CastError::UnsupportedTagForm),
            TypeTag::Name(name) => name.to_lowercase(),
        };
        trace!(tag = %name, input = %value.type_name(), "dispatching cast");

        match name.as_str() {
            "bool" => Ok(CastValue::Bool(cast_bool(&value))),
            "path" => cast_path(&value),
            "timedelta" => cast_timedelta(&value),
            "timestamp" => cast_timestamp(&value),
            "datetime" => cast_datetime(&value),
            "date" => cast_date(&value),
            "time" => cast_time(&value),
            "json" => cast_json(&value),
            "list" => self.cast_list(&value, options),
            "url" => cast_url(&value),
            "uuid" => cast_uuid(&value),
            _ => self.cast_scalar(&value, &name),
        }
    }

    /// Bare-constructor dispatch with the empty-value substitution rule.
    fn cast_scalar(&self, value: &CastValue, name: &str) -> CastResult<CastValue> {
        if RESERVED.contains(&name) {
            return Err(CastError::NotImplemented(name.to_string()));
        }
        let Some(ctor) = self.registry.constructor(name) else {
            return Err(CastError::UnknownTag(name.to_string()));
        };
        // Empty or absent values substitute "0" for `int` and "" for every
        // other bare tag. Only `int` exactly; `float` and `decimal` keep the
        // empty string and fail in their constructors.
        if value.is_empty() {
            let substitute = if name == "int" { "0" } else { "" };
            return ctor(&CastValue::from(substitute));
        }
        ctor(value)
    }

    fn cast_list(&self, value: &CastValue, options: &CastOptions) -> CastResult<CastValue> {
        let text = value
            .text()
            .ok_or_else(|| expected(value, "list", "a delimited string"))?;

        let ctor = match &options.subcast {
            None => None,
            Some(Subcast::Ctor(ctor)) => Some(ctor.clone()),
            Some(Subcast::Name(name)) => Some(
                self.registry
                    .constructor(name)
                    .cloned()
                    .ok_or_else(|| CastError::SubcastNotFound(name.clone()))?,
            ),
        };

        let mut items = Vec::new();
        for (index, piece) in text.split(options.delimiter()).enumerate() {
            let element = CastValue::Str(piece.trim().to_string());
            match &ctor {
                None => items.push(element),
                Some(ctor) => {
                    let converted = ctor(&element).map_err(|e| CastError::element(index, e))?;
                    items.push(converted);
                }
            }
        }
        Ok(CastValue::List(items))
    }
}

impl std::fmt::Debug for Caster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Caster").field("registry", &self.registry).finish()
    }
}

impl Default for Caster {
    fn default() -> Self {
        Self::new(CastRegistry::with_builtins())
    }
}

// ---- Structured rules ----

/// Lexical boolean: the lower-cased display form decides, so `"NO"`,
/// `"0"`, absence and an already-false value all come out `false`.
fn cast_bool(value: &CastValue) -> bool {
    if let CastValue::Bool(b) = value {
        return *b;
    }
    let lowered = value.to_string().to_lowercase();
    !FALSY.contains(&lowered.as_str())
}

fn cast_path(value: &CastValue) -> CastResult<CastValue> {
    // No existence check: the path is wrapped as-is.
    match value {
        CastValue::Str(s) => Ok(CastValue::Path(PathBuf::from(s))),
        CastValue::Path(p) => Ok(CastValue::Path(p.clone())),
        other => Err(expected(other, "path", "a string")),
    }
}

fn cast_timedelta(value: &CastValue) -> CastResult<CastValue> {
    let secs = numeric_seconds(value, "timedelta")?;
    let whole = TimeDelta::try_seconds(secs.trunc() as i64)
        .ok_or_else(|| CastError::malformed("timedelta", format!("{secs} seconds is out of range")))?;
    let nanos = TimeDelta::nanoseconds((secs.fract() * 1e9).round() as i64);
    Ok(CastValue::Duration(whole + nanos))
}

fn cast_timestamp(value: &CastValue) -> CastResult<CastValue> {
    let secs = numeric_seconds(value, "timestamp")?;
    let mut whole = secs.div_euclid(1.0) as i64;
    let mut nanos = (secs.rem_euclid(1.0) * 1e9).round() as u32;
    if nanos >= 1_000_000_000 {
        whole += 1;
        nanos -= 1_000_000_000;
    }
    DateTime::from_timestamp(whole, nanos)
        .map(|utc| CastValue::Timestamp(utc.with_timezone(&Local)))
        .ok_or_else(|| CastError::malformed("timestamp", format!("{secs} seconds is out of range")))
}

fn cast_datetime(value: &CastValue) -> CastResult<CastValue> {
    let text = value
        .text()
        .ok_or_else(|| expected(value, "datetime", "an ISO-8601 string"))?;
    // Offset-carrying stamps are accepted and normalized to UTC.
    text.parse::<NaiveDateTime>()
        .or_else(|_| DateTime::parse_from_rfc3339(text).map(|dt| dt.naive_utc()))
        .map(CastValue::DateTime)
        .map_err(|e| CastError::malformed("datetime", format!("`{text}`: {e}")))
}

fn cast_date(value: &CastValue) -> CastResult<CastValue> {
    let text = value
        .text()
        .ok_or_else(|| expected(value, "date", "an ISO-8601 string"))?;
    text.parse::<NaiveDate>()
        .map(CastValue::Date)
        .map_err(|e| CastError::malformed("date", format!("`{text}`: {e}")))
}

fn cast_time(value: &CastValue) -> CastResult<CastValue> {
    let text = value
        .text()
        .ok_or_else(|| expected(value, "time", "an ISO-8601 string"))?;
    text.parse::<NaiveTime>()
        .map(CastValue::Time)
        .map_err(|e| CastError::malformed("time", format!("`{text}`: {e}")))
}

fn cast_json(value: &CastValue) -> CastResult<CastValue> {
    let text = value.text().ok_or_else(|| expected(value, "json", "JSON text"))?;
    serde_json::from_str(text)
        .map(CastValue::Json)
        .map_err(|e| CastError::malformed("json", e))
}

fn cast_uuid(value: &CastValue) -> CastResult<CastValue> {
    match value {
        CastValue::Str(s) => Uuid::parse_str(s.trim())
            .map(CastValue::Uuid)
            .map_err(|e| CastError::malformed("uuid", format!("`{s}`: {e}"))),
        CastValue::Uuid(u) => Ok(CastValue::Uuid(*u)),
        other => Err(expected(other, "uuid", "a string")),
    }
}

/// URL normalization: default the scheme to `https` when absent, then
/// let the parser percent-encode the path and fragment. Any parser
/// failure is re-raised as a single cast error carrying the cause.
fn cast_url(value: &CastValue) -> CastResult<CastValue> {
    let text = value.text().ok_or_else(|| expected(value, "url", "a string"))?;
    let candidate: Cow<'_, str> = if has_scheme(text) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(format!("https://{text}"))
    };
    Url::parse(&candidate)
        .map(CastValue::Url)
        .map_err(|e| CastError::malformed("url", format!("`{text}`: {e}")))
}

/// RFC 3986 scheme detection: `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
/// followed by `:`.
fn has_scheme(raw: &str) -> bool {
    match raw.split_once(':') {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

fn numeric_seconds(value: &CastValue, tag: &str) -> CastResult<f64> {
    match value {
        CastValue::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| CastError::malformed(tag, format!("invalid numeric literal `{s}`: {e}"))),
        CastValue::Int(n) => Ok(*n as f64),
        CastValue::Float(x) => Ok(*x),
        other => Err(expected(other, tag, "numeric seconds")),
    }
}

fn expected(value: &CastValue, tag: &str, wanted: &str) -> CastError {
    CastError::malformed(tag, format!("expected {wanted}, got {}", value.type_name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cast(value: impl Into<CastValue>, tag: &str) -> CastResult<CastValue> {
        Caster::default().cast(value.into(), &TypeTag::from(tag), &CastOptions::default())
    }

    #[test]
    fn bool_false_set_is_case_insensitive() {
        for raw in ["", "0", "false", "no", "none", "FALSE", "No", "NONE"] {
            assert_eq!(cast(raw, "bool").unwrap(), CastValue::Bool(false), "`{raw}`");
        }
        for raw in ["1", "true", "yes", "anything", "off"] {
            assert_eq!(cast(raw, "bool").unwrap(), CastValue::Bool(true), "`{raw}`");
        }
    }

    #[test]
    fn bool_of_absence_and_of_typed_values() {
        assert_eq!(cast(CastValue::None, "bool").unwrap(), CastValue::Bool(false));
        assert_eq!(cast(false, "bool").unwrap(), CastValue::Bool(false));
        assert_eq!(cast(true, "bool").unwrap(), CastValue::Bool(true));
        assert_eq!(cast(CastValue::Int(0), "bool").unwrap(), CastValue::Bool(false));
    }

    #[test]
    fn path_wraps_without_existence_check() {
        let value = cast("/no/such/dir/app.sock", "path").unwrap();
        assert_eq!(value.as_path().unwrap(), std::path::Path::new("/no/such/dir/app.sock"));
    }

    #[test]
    fn timedelta_accepts_numeric_seconds_in_any_form() {
        let from_str = cast("90", "timedelta").unwrap();
        assert_eq!(from_str.as_duration().unwrap(), TimeDelta::seconds(90));

        let fractional = cast("1.5", "timedelta").unwrap();
        assert_eq!(fractional.as_duration().unwrap(), TimeDelta::milliseconds(1500));

        let negative = cast("-2", "timedelta").unwrap();
        assert_eq!(negative.as_duration().unwrap(), TimeDelta::seconds(-2));

        let from_int = cast(CastValue::Int(30), "timedelta").unwrap();
        assert_eq!(from_int.as_duration().unwrap(), TimeDelta::seconds(30));

        assert!(cast("ninety", "timedelta").is_err());
    }

    #[test]
    fn timestamp_is_local_time_at_the_epoch_offset() {
        let value = cast("0", "timestamp").unwrap();
        let ts = value.as_timestamp().unwrap();
        assert_eq!(ts.timestamp(), 0);

        let fractional = cast("1700000000.25", "timestamp").unwrap();
        assert_eq!(fractional.as_timestamp().unwrap().timestamp_subsec_millis(), 250);

        assert!(cast("later", "timestamp").is_err());
    }

    #[test]
    fn iso8601_parsing_is_strict() {
        let dt = cast("2024-06-01T08:30:00", "datetime").unwrap();
        assert_eq!(
            dt.as_datetime().unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(8, 30, 0).unwrap()
        );

        let date = cast("2024-06-01", "date").unwrap();
        assert_eq!(date.as_date().unwrap(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());

        let time = cast("23:59:05", "time").unwrap();
        assert_eq!(time.as_time().unwrap(), NaiveTime::from_hms_opt(23, 59, 5).unwrap());

        assert!(cast("01/06/2024", "date").is_err());
        assert!(cast("2024-13-01", "date").is_err());
        assert!(cast("noon", "time").is_err());
        assert!(cast("yesterday", "datetime").is_err());
    }

    #[test]
    fn offset_datetimes_normalize_to_utc() {
        let dt = cast("2024-06-01T10:00:00+02:00", "datetime").unwrap();
        assert_eq!(
            dt.as_datetime().unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(8, 0, 0).unwrap()
        );
    }

    #[test]
    fn json_parses_objects_arrays_and_scalars() {
        let doc = cast(r#"{"a": [1, 2]}"#, "json").unwrap();
        assert_eq!(doc.as_json().unwrap()["a"][1], serde_json::json!(2));

        assert_eq!(cast("42", "json").unwrap().as_json().unwrap(), &serde_json::json!(42));
        assert!(cast("{broken", "json").is_err());
    }

    #[test]
    fn uuid_accepts_hyphenated_and_simple_forms() {
        let hyphenated = cast("67e55044-10b1-426f-9247-bb680e5fe0c8", "uuid").unwrap();
        let simple = cast("67e5504410b1426f9247bb680e5fe0c8", "uuid").unwrap();
        assert_eq!(hyphenated, simple);
        assert!(cast("not-a-uuid", "uuid").is_err());
    }

    #[test]
    fn url_defaults_scheme_and_percent_encodes() {
        let value = cast("example.com/a b", "url").unwrap();
        assert_eq!(value.as_url().unwrap().as_str(), "https://example.com/a%20b");

        let kept = cast("http://example.com/x", "url").unwrap();
        assert_eq!(kept.as_url().unwrap().scheme(), "http");

        let fragment = cast("example.com/p#a b", "url").unwrap();
        assert_eq!(fragment.as_url().unwrap().fragment(), Some("a%20b"));

        match cast("https://", "url") {
            Err(CastError::MalformedValue { tag, .. }) => assert_eq!(tag, "url"),
            other => panic!("expected a malformed-value error, got {other:?}"),
        }
    }

    #[test]
    fn list_splits_trims_and_keeps_order() {
        let value = cast("a, b ,c", "list").unwrap();
        let items: Vec<_> = value.as_list().unwrap().iter().map(ToString::to_string).collect();
        assert_eq!(items, ["a", "b", "c"]);
    }

    #[test]
    fn list_honors_custom_delimiter() {
        let options = CastOptions::new().with_delimiter(";");
        let value = Caster::default()
            .cast(CastValue::from("x;y;z"), &TypeTag::from("list"), &options)
            .unwrap();
        assert_eq!(value.as_list().unwrap().len(), 3);
    }

    #[test]
    fn list_subcast_maps_every_element() {
        let options = CastOptions::new().with_subcast("int");
        let value = Caster::default()
            .cast(CastValue::from("1,2,3"), &TypeTag::from("list"), &options)
            .unwrap();
        assert_eq!(
            value.as_list().unwrap(),
            [CastValue::Int(1), CastValue::Int(2), CastValue::Int(3)]
        );
    }

    #[test]
    fn list_subcast_failure_fails_the_whole_cast() {
        let options = CastOptions::new().with_subcast("int");
        let result = Caster::default().cast(CastValue::from("1,2,x"), &TypeTag::from("list"), &options);
        match result {
            Err(CastError::ElementCast { index, .. }) => assert_eq!(index, 2),
            other => panic!("expected an element failure, got {other:?}"),
        }
    }

    #[test]
    fn list_subcast_resolves_through_the_registry_only() {
        let options = CastOptions::new().with_subcast("json");
        let result = Caster::default().cast(CastValue::from("1,2"), &TypeTag::from("list"), &options);
        assert_eq!(result, Err(CastError::SubcastNotFound("json".to_string())));
    }

    #[test]
    fn list_subcast_accepts_a_direct_constructor() {
        let options = CastOptions::new().with_subcast_ctor(|value| {
            Ok(CastValue::Str(value.to_string().to_uppercase()))
        });
        let value = Caster::default()
            .cast(CastValue::from("a,b"), &TypeTag::from("list"), &options)
            .unwrap();
        assert_eq!(
            value.as_list().unwrap(),
            [CastValue::from("A"), CastValue::from("B")]
        );
    }

    #[test]
    fn bare_constructors_resolve_by_name() {
        assert_eq!(cast("42", "int").unwrap(), CastValue::Int(42));
        assert_eq!(cast("4.5", "float").unwrap(), CastValue::Float(4.5));
        assert_eq!(cast("abc", "str").unwrap(), CastValue::from("abc"));
    }

    // Documented quirk: only `int` substitutes a numeric default for
    // empty input; `float` and `decimal` keep "" and fail to parse it.
    #[test]
    fn empty_value_substitution_special_cases_int_only() {
        assert_eq!(cast("", "int").unwrap(), CastValue::Int(0));
        assert_eq!(cast(CastValue::None, "int").unwrap(), CastValue::Int(0));
        assert_eq!(cast("", "str").unwrap(), CastValue::from(""));
        assert_eq!(cast(CastValue::None, "str").unwrap(), CastValue::from(""));
        assert!(cast("", "float").is_err());
        assert!(cast("", "decimal").is_err());
    }

    #[test]
    fn reserved_tags_are_not_implemented_regardless_of_value() {
        for tag in ["dict", "enum", "log_level", "DICT", "Enum"] {
            let result = cast("anything", tag);
            assert!(
                matches!(result, Err(CastError::NotImplemented(_))),
                "`{tag}` should be reserved, got {result:?}"
            );
        }
    }

    #[test]
    fn unknown_tags_are_an_error_not_a_passthrough() {
        assert_eq!(
            cast("x", "nonexistent_tag"),
            Err(CastError::UnknownTag("nonexistent_tag".to_string()))
        );
    }

    #[test]
    fn native_type_tags_fail_fast() {
        let result = Caster::default().cast(
            CastValue::from("x"),
            &TypeTag::native::<u16>(),
            &CastOptions::default(),
        );
        assert_eq!(result, Err(CastError::UnsupportedTagForm));
    }

    #[test]
    fn pass_tag_is_the_identity_for_any_shape() {
        let caster = Caster::default();
        for value in [
            CastValue::None,
            CastValue::from("raw"),
            CastValue::Bool(true),
            CastValue::Int(-3),
            CastValue::List(vec![CastValue::Int(1)]),
        ] {
            let out = caster.cast(value.clone(), &TypeTag::Pass, &CastOptions::default()).unwrap();
            assert_eq!(out, value);
        }
    }

    #[test]
    fn dispatch_is_case_insensitive() {
        for tag in ["BOOL", "Bool", "bool"] {
            assert_eq!(cast("no", tag).unwrap(), CastValue::Bool(false));
        }
        assert_eq!(cast("7", "INT").unwrap(), CastValue::Int(7));
    }

    #[test]
    fn registered_host_constructor_is_a_first_class_tag() {
        let mut registry = CastRegistry::with_builtins();
        registry.register_constructor("port", |value| match value.text() {
            Some(s) => s
                .parse::<u16>()
                .map(|n| CastValue::Int(i64::from(n)))
                .map_err(|e| CastError::malformed("port", e)),
            None => Err(CastError::malformed("port", value.type_name())),
        });
        let caster = Caster::new(registry);

        let top_level = caster
            .cast(CastValue::from("8080"), &TypeTag::from("port"), &CastOptions::default())
            .unwrap();
        assert_eq!(top_level, CastValue::Int(8080));

        let options = CastOptions::new().with_subcast("port");
        let nested = caster
            .cast(CastValue::from("80, 443"), &TypeTag::from("list"), &options)
            .unwrap();
        assert_eq!(nested.as_list().unwrap(), [CastValue::Int(80), CastValue::Int(443)]);
    }
}
