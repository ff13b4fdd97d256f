//! Conversion of raw request strings into typed [`Value`]s.
//!
//! Built-in kinds are dispatched by [`CoercionKind`]; additional kinds are
//! registered by name on a [`Coercions`] table and referenced with
//! [`CoercionKind::Custom`].
//!
//! Parsing is locale independent:
//!
//! | Kind | Accepts |
//! |------|---------|
//! | `Boolean` | `true/1/yes/y/on/t`, `false/0/no/n/off/f` (any case) |
//! | `Symbol` | any non-blank text |
//! | `Integer` | optional sign and digits |
//! | `Float` | finite decimal or exponent notation |
//! | `Decimal` | fixed-point decimal |
//! | `Date` | `YYYY-MM-DD` |
//! | `DateTime` | RFC 3339, or `YYYY-MM-DD HH:MM[:SS]` read as UTC |
//! | `Time` | `HH:MM[:SS]` |
//! | `Constant` | exactly one of the allowed strings |

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CoercionError;
use crate::value::Value;

/// How a search field's raw string is turned into a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoercionKind {
    Boolean,
    Symbol,
    Integer,
    Float,
    Decimal,
    Date,
    #[serde(rename = "datetime")]
    DateTime,
    Time,
    /// Resolves to one of a fixed set of symbols.
    Constant(Vec<String>),
    /// Delegates to a coercer registered under this name.
    Custom(String),
}

impl CoercionKind {
    /// Builds a `Constant` kind from any list of strings.
    pub fn constant<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CoercionKind::Constant(allowed.into_iter().map(Into::into).collect())
    }

    pub fn name(&self) -> &str {
        match self {
            CoercionKind::Boolean => "boolean",
            CoercionKind::Symbol => "symbol",
            CoercionKind::Integer => "integer",
            CoercionKind::Float => "float",
            CoercionKind::Decimal => "decimal",
            CoercionKind::Date => "date",
            CoercionKind::DateTime => "datetime",
            CoercionKind::Time => "time",
            CoercionKind::Constant(_) => "constant",
            CoercionKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for CoercionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Signature of a registered coercer.
pub type CoerceFn = Arc<dyn Fn(&str) -> Result<Value, CoercionError> + Send + Sync>;

/// Table of coercers: the built-ins plus any named custom ones.
#[derive(Clone, Default)]
pub struct Coercions {
    custom: BTreeMap<String, CoerceFn>,
}

static BUILTIN: Lazy<Coercions> = Lazy::new(Coercions::default);

impl Coercions {
    pub fn new() -> Self {
        Coercions::default()
    }

    /// The shared table with built-in kinds only.
    pub fn builtin() -> &'static Coercions {
        &BUILTIN
    }

    /// Registers (or replaces) a custom coercer.
    pub fn register<F>(&mut self, name: impl Into<String>, coerce: F)
    where
        F: Fn(&str) -> Result<Value, CoercionError> + Send + Sync + 'static,
    {
        self.custom.insert(name.into(), Arc::new(coerce));
    }

    /// Returns `true` if `kind` can be dispatched by this table.
    pub fn supports(&self, kind: &CoercionKind) -> bool {
        match kind {
            CoercionKind::Custom(name) => self.custom.contains_key(name),
            _ => true,
        }
    }

    /// Converts `raw` according to `kind`.
    pub fn coerce(&self, kind: &CoercionKind, raw: &str) -> Result<Value, CoercionError> {
        match kind {
            CoercionKind::Boolean => to_boolean(raw),
            CoercionKind::Symbol => to_symbol(raw),
            CoercionKind::Integer => to_integer(raw),
            CoercionKind::Float => to_float(raw),
            CoercionKind::Decimal => to_decimal(raw),
            CoercionKind::Date => to_date(raw),
            CoercionKind::DateTime => to_datetime(raw),
            CoercionKind::Time => to_time(raw),
            CoercionKind::Constant(allowed) => to_constant(allowed, raw),
            CoercionKind::Custom(name) => match self.custom.get(name) {
                Some(coerce) => coerce(raw),
                None => {
                    warn!(kind = %name, "no coercer registered");
                    Err(CoercionError::new(
                        name.as_str(),
                        raw,
                        "no coercer registered under this name",
                    ))
                }
            },
        }
    }
}

impl fmt::Debug for Coercions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coercions")
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Converts `raw` with the built-in table.
pub fn coerce(kind: &CoercionKind, raw: &str) -> Result<Value, CoercionError> {
    Coercions::builtin().coerce(kind, raw)
}

fn to_boolean(raw: &str) -> Result<Value, CoercionError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" | "on" => Ok(Value::Bool(true)),
        "false" | "f" | "0" | "no" | "n" | "off" => Ok(Value::Bool(false)),
        _ => Err(CoercionError::new("boolean", raw, "not a recognized flag")),
    }
}

fn to_symbol(raw: &str) -> Result<Value, CoercionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoercionError::new("symbol", raw, "blank"));
    }
    Ok(Value::Symbol(trimmed.to_string()))
}

fn to_integer(raw: &str) -> Result<Value, CoercionError> {
    raw.trim()
        .parse::<i64>()
        .map(Value::Integer)
        .map_err(|e| CoercionError::new("integer", raw, e.to_string()))
}

fn to_float(raw: &str) -> Result<Value, CoercionError> {
    let trimmed = raw.trim();
    // f64::from_str also accepts "inf" and "NaN"
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return Err(CoercionError::new("float", raw, "not a decimal number"));
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(Value::Float(n)),
        Ok(_) => Err(CoercionError::new("float", raw, "out of range")),
        Err(e) => Err(CoercionError::new("float", raw, e.to_string())),
    }
}

fn to_decimal(raw: &str) -> Result<Value, CoercionError> {
    Decimal::from_str(raw.trim())
        .map(Value::Decimal)
        .map_err(|e| CoercionError::new("decimal", raw, e.to_string()))
}

fn to_date(raw: &str) -> Result<Value, CoercionError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(Value::Date)
        .map_err(|e| CoercionError::new("date", raw, e.to_string()))
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

fn to_datetime(raw: &str) -> Result<Value, CoercionError> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Value::DateTime(parsed));
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|naive| Value::DateTime(DateTime::from_naive_utc_and_offset(naive, Utc.fix())))
        .ok_or_else(|| CoercionError::new("datetime", raw, "not RFC 3339 or YYYY-MM-DD HH:MM"))
}

fn to_time(raw: &str) -> Result<Value, CoercionError> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map(Value::Time)
        .map_err(|e| CoercionError::new("time", raw, e.to_string()))
}

fn to_constant(allowed: &[String], raw: &str) -> Result<Value, CoercionError> {
    allowed
        .iter()
        .find(|candidate| candidate.as_str() == raw)
        .map(|matched| Value::Symbol(matched.clone()))
        .ok_or_else(|| CoercionError::new("constant", raw, "not one of the allowed values"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn boolean_flags() {
        assert_eq!(coerce(&CoercionKind::Boolean, "true"), Ok(Value::Bool(true)));
        assert_eq!(coerce(&CoercionKind::Boolean, " YES "), Ok(Value::Bool(true)));
        assert_eq!(coerce(&CoercionKind::Boolean, "0"), Ok(Value::Bool(false)));
        assert_eq!(coerce(&CoercionKind::Boolean, "off"), Ok(Value::Bool(false)));
        assert_eq!(coerce(&CoercionKind::Boolean, "Y"), Ok(Value::Bool(true)));
        assert_eq!(coerce(&CoercionKind::Boolean, "n"), Ok(Value::Bool(false)));
        assert!(coerce(&CoercionKind::Boolean, "maybe").is_err());
    }

    #[test]
    fn symbol_trims() {
        assert_eq!(
            coerce(&CoercionKind::Symbol, " pending "),
            Ok(Value::Symbol("pending".into()))
        );
        assert!(coerce(&CoercionKind::Symbol, "   ").is_err());
    }

    #[test]
    fn integers() {
        assert_eq!(coerce(&CoercionKind::Integer, "42"), Ok(Value::Integer(42)));
        assert_eq!(coerce(&CoercionKind::Integer, "-7"), Ok(Value::Integer(-7)));
        assert!(coerce(&CoercionKind::Integer, "4.2").is_err());
        assert!(coerce(&CoercionKind::Integer, "12abc").is_err());
        assert!(coerce(&CoercionKind::Integer, "99999999999999999999").is_err());
    }

    #[test]
    fn floats_reject_non_finite() {
        assert_eq!(coerce(&CoercionKind::Float, "1.5"), Ok(Value::Float(1.5)));
        assert_eq!(coerce(&CoercionKind::Float, "2e3"), Ok(Value::Float(2000.0)));
        assert!(coerce(&CoercionKind::Float, "NaN").is_err());
        assert!(coerce(&CoercionKind::Float, "inf").is_err());
        assert!(coerce(&CoercionKind::Float, "1e999").is_err());
        assert!(coerce(&CoercionKind::Float, "1,5").is_err());
    }

    #[test]
    fn decimals() {
        let value = coerce(&CoercionKind::Decimal, "19.99");
        assert_eq!(value, Ok(Value::Decimal(Decimal::new(1999, 2))));
        assert!(coerce(&CoercionKind::Decimal, "nineteen").is_err());
    }

    #[test]
    fn dates() {
        let value = coerce(&CoercionKind::Date, "2020-01-15");
        let date = value.ok().and_then(|v| v.as_date());
        assert_eq!(date, NaiveDate::from_ymd_opt(2020, 1, 15));
        assert!(coerce(&CoercionKind::Date, "not-a-date").is_err());
        assert!(coerce(&CoercionKind::Date, "2020-02-30").is_err());
        assert!(coerce(&CoercionKind::Date, "15/01/2020").is_err());
    }

    #[test]
    fn datetimes() {
        let with_offset = coerce(&CoercionKind::DateTime, "2020-01-15T10:30:00+02:00")
            .ok()
            .and_then(|v| v.as_datetime());
        assert_eq!(with_offset.map(|t| t.offset().local_minus_utc()), Some(7200));

        let naive = coerce(&CoercionKind::DateTime, "2020-01-15 10:30")
            .ok()
            .and_then(|v| v.as_datetime());
        assert_eq!(naive.map(|t| t.hour()), Some(10));
        assert_eq!(naive.map(|t| t.day()), Some(15));
        assert_eq!(naive.map(|t| t.offset().local_minus_utc()), Some(0));

        assert!(coerce(&CoercionKind::DateTime, "yesterday").is_err());
    }

    #[test]
    fn times() {
        let t = coerce(&CoercionKind::Time, "09:45").ok().and_then(|v| v.as_time());
        assert_eq!(t, NaiveTime::from_hms_opt(9, 45, 0));
        let t = coerce(&CoercionKind::Time, "23:59:30")
            .ok()
            .and_then(|v| v.as_time());
        assert_eq!(t, NaiveTime::from_hms_opt(23, 59, 30));
        assert!(coerce(&CoercionKind::Time, "25:00").is_err());
    }

    #[test]
    fn constants_match_exactly() {
        let kind = CoercionKind::constant(["low", "high"]);
        assert_eq!(coerce(&kind, "low"), Ok(Value::Symbol("low".into())));
        assert!(coerce(&kind, "LOW").is_err());
        assert!(coerce(&kind, "medium").is_err());
    }

    #[test]
    fn custom_coercers() {
        let mut table = Coercions::new();
        table.register("upcase", |raw: &str| Ok(Value::String(raw.to_uppercase())));
        let kind = CoercionKind::Custom("upcase".into());
        assert!(table.supports(&kind));
        assert_eq!(table.coerce(&kind, "asap"), Ok(Value::from("ASAP")));

        let missing = CoercionKind::Custom("nope".into());
        assert!(!table.supports(&missing));
        assert!(table.coerce(&missing, "x").is_err());
    }

    #[test]
    fn kind_names() {
        assert_eq!(CoercionKind::Date.to_string(), "date");
        assert_eq!(CoercionKind::Custom("money".into()).to_string(), "money");
    }
}
