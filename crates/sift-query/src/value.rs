//! Typed values produced by coercion, and sort direction.
//!
//! A [`Value`] is what a search field resolves to once its raw request
//! string has been coerced. It is the argument handed to the named scope
//! on the collection. Sort scopes receive their direction as
//! [`Value::Direction`].

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Parses a request value. Only the exact strings `"asc"` and `"desc"`
    /// are recognized.
    pub fn parse(raw: &str) -> Option<Dir> {
        match raw {
            "asc" => Some(Dir::Asc),
            "desc" => Some(Dir::Desc),
            _ => None,
        }
    }

    /// Returns `true` if this is ascending order.
    pub fn is_asc(self) -> bool {
        matches!(self, Dir::Asc)
    }

    /// Returns `true` if this is descending order.
    pub fn is_desc(self) -> bool {
        matches!(self, Dir::Desc)
    }

    /// Returns the opposite direction.
    pub fn reverse(self) -> Dir {
        match self {
            Dir::Asc => Dir::Desc,
            Dir::Desc => Dir::Asc,
        }
    }

    /// Applies this direction to an ordering.
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    /// Returns the parameter form of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A coerced parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Raw string, passed through unchanged.
    String(String),
    /// Identifier-like string (symbol and constant coercions).
    Symbol(String),
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Integer(i64),
    /// Finite floating point number.
    Float(f64),
    /// Fixed-point decimal.
    Decimal(Decimal),
    /// Calendar date.
    Date(NaiveDate),
    /// Point in time with its UTC offset.
    DateTime(DateTime<FixedOffset>),
    /// Wall-clock time of day.
    Time(NaiveTime),
    /// Sort direction argument.
    Direction(Dir),
}

impl Value {
    /// Returns the text of a `String` or `Symbol` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Value::DateTime(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_dir(&self) -> Option<Dir> {
        match self {
            Value::Direction(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) | Value::Symbol(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(t) => write!(f, "{}", t.to_rfc3339()),
            Value::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
            Value::Direction(d) => write!(f, "{}", d),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<Dir> for Value {
    fn from(d: Dir) -> Self {
        Value::Direction(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn dir_parse_is_exact() {
        assert_eq!(Dir::parse("asc"), Some(Dir::Asc));
        assert_eq!(Dir::parse("desc"), Some(Dir::Desc));
        assert_eq!(Dir::parse("DESC"), None);
        assert_eq!(Dir::parse(" asc"), None);
        assert_eq!(Dir::parse(""), None);
    }

    #[test]
    fn dir_reverse_and_apply() {
        assert_eq!(Dir::Asc.reverse(), Dir::Desc);
        assert_eq!(Dir::Desc.reverse(), Dir::Asc);
        assert_eq!(Dir::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(Dir::Desc.apply(Ordering::Less), Ordering::Greater);
    }

    #[test]
    fn dir_display() {
        assert_eq!(Dir::Asc.to_string(), "asc");
        assert_eq!(Dir::Desc.to_string(), "desc");
        assert_eq!(Dir::default(), Dir::Asc);
    }

    #[test]
    fn value_extractors() {
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::Symbol("s".into()).as_str(), Some("s"));
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Integer(3).as_f64(), Some(3.0));
        assert_eq!(Value::Direction(Dir::Desc).as_dir(), Some(Dir::Desc));

        // Wrong type returns None
        assert_eq!(Value::Bool(true).as_str(), None);
        assert_eq!(Value::from("1").as_i64(), None);
    }

    #[test]
    fn value_display() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 15).map(Value::Date);
        assert_eq!(date.map(|d| d.to_string()), Some("2020-01-15".to_string()));
        assert_eq!(Value::Direction(Dir::Desc).to_string(), "desc");
        assert_eq!(Value::from("ASAP").to_string(), "ASAP");
    }
}
