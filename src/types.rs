use std::borrow::Cow;

use serde::Serialize;

/// A single cell read from a cursor or result set.
///
/// Both backends decode into this one representation so the field accessors
/// behave the same whichever engine produced the row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Null,
    /// Integer value (64-bit)
    Integer(i64),
    /// Floating point value (64-bit)
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// Storage class of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValueType {
    Null,
    Integer,
    Real,
    Text,
    Blob,
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Integer(_) => ValueType::Integer,
            Value::Real(_) => ValueType::Real,
            Value::Text(_) => ValueType::Text,
            Value::Blob(_) => ValueType::Blob,
        }
    }

    /// Text form of the value, `None` for NULL.
    ///
    /// Reals always carry a fractional part (`2.0`, not `2`) so they read back
    /// the way the engines print them.
    #[must_use]
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Null => None,
            Value::Integer(i) => Some(Cow::Owned(i.to_string())),
            Value::Real(f) => Some(Cow::Owned(format_real(*f))),
            Value::Text(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Blob(b) => Some(String::from_utf8_lossy(b)),
        }
    }

    /// Integer coercion: reals truncate toward zero, text and blobs are read
    /// by their leading numeric prefix, anything unreadable is `0`.
    #[must_use]
    pub fn coerce_i64(&self) -> Option<i64> {
        match self {
            Value::Null => None,
            Value::Integer(i) => Some(*i),
            #[allow(clippy::cast_possible_truncation)]
            Value::Real(f) => Some(*f as i64),
            Value::Text(s) => Some(parse_leading_i64(s)),
            Value::Blob(b) => Some(parse_leading_i64(&String::from_utf8_lossy(b))),
        }
    }

    #[must_use]
    pub fn coerce_f64(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            #[allow(clippy::cast_precision_loss)]
            Value::Integer(i) => Some(*i as f64),
            Value::Real(f) => Some(*f),
            Value::Text(s) => Some(parse_leading_f64(s)),
            Value::Blob(b) => Some(parse_leading_f64(&String::from_utf8_lossy(b))),
        }
    }

    /// Raw bytes of text and blob values.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Text(s) => Some(s.as_bytes()),
            Value::Blob(b) => Some(b),
            _ => None,
        }
    }
}

fn format_real(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

/// Length of the `[+-]digits` prefix after leading whitespace.
fn integer_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    &s[..end]
}

fn parse_leading_i64(s: &str) -> i64 {
    let s = s.trim_start();
    let prefix = integer_prefix(s);
    if let Ok(value) = prefix.parse::<i64>() {
        return value;
    }
    // "1.5e3" style text, or integers beyond i64, go through the float path
    #[allow(clippy::cast_possible_truncation)]
    let value = parse_leading_f64(s) as i64;
    value
}

fn parse_leading_f64(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = integer_prefix(s).len();
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().unwrap_or(0.0)
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

/// A value handed to a prepared statement's bind call.
///
/// Text and blob parameters borrow the caller's memory for the duration of the
/// call; each backend copies what it needs before the call returns.
/// ```rust
/// use sql_access::Param;
///
/// assert_eq!(Param::from(7), Param::Int(7));
/// assert_eq!(Param::from("bob"), Param::Text("bob"));
/// assert_eq!(Param::from(None::<i64>), Param::Null);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Param<'a> {
    Null,
    Int(i32),
    Int64(i64),
    Double(f64),
    Text(&'a str),
    Blob(&'a [u8]),
}

impl From<i32> for Param<'_> {
    fn from(value: i32) -> Self {
        Param::Int(value)
    }
}

impl From<i64> for Param<'_> {
    fn from(value: i64) -> Self {
        Param::Int64(value)
    }
}

impl From<f64> for Param<'_> {
    fn from(value: f64) -> Self {
        Param::Double(value)
    }
}

impl<'a> From<&'a str> for Param<'a> {
    fn from(value: &'a str) -> Self {
        Param::Text(value)
    }
}

impl<'a> From<&'a String> for Param<'a> {
    fn from(value: &'a String) -> Self {
        Param::Text(value.as_str())
    }
}

impl<'a> From<&'a [u8]> for Param<'a> {
    fn from(value: &'a [u8]) -> Self {
        Param::Blob(value)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Param<'a> {
    fn from(value: &'a [u8; N]) -> Self {
        Param::Blob(value.as_slice())
    }
}

impl<'a> From<&'a Vec<u8>> for Param<'a> {
    fn from(value: &'a Vec<u8>) -> Self {
        Param::Blob(value.as_slice())
    }
}

impl<'a, T> From<Option<T>> for Param<'a>
where
    T: Into<Param<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Param::Null, Into::into)
    }
}
