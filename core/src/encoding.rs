//! Query-string encoding.
//!
//! # Design
//! Values are typed (`ParamValue`) so serialization is decided by the type,
//! not by inspecting strings: booleans become `1`/`0`, numbers use Rust's
//! `Display`, which is locale-independent and prints the shortest string that
//! round-trips (`-11.0` prints as `-11`). Keys and values are escaped with the
//! RFC 3986 unreserved set, so `&`, `=` and `,` never appear literally inside
//! a value.

use std::fmt::Write as _;

/// A single query parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Skipped entirely when encoding.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Comma-joined, then escaped as one unit.
    List(Vec<ParamValue>),
}

impl ParamValue {
    /// The unescaped wire form of this value, or `None` for `Null`.
    pub fn to_invariant_string(&self) -> Option<String> {
        match self {
            ParamValue::Null => None,
            ParamValue::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            ParamValue::Int(i) => Some(i.to_string()),
            ParamValue::Float(f) => Some(format_float(*f)),
            ParamValue::Str(s) => Some(s.clone()),
            ParamValue::List(items) => Some(
                items
                    .iter()
                    .filter_map(ParamValue::to_invariant_string)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
        }
    }
}

/// Culture-invariant float formatting: `.` separator, no trailing zeros.
pub fn format_float(value: f64) -> String {
    value.to_string()
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<u8> for ParamValue {
    fn from(value: u8) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(value: Vec<T>) -> Self {
        ParamValue::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ParamValue::Null, Into::into)
    }
}

/// Ordered mapping from parameter name to value with unique keys.
///
/// Inserting an existing key replaces its value and keeps its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    entries: Vec<(String, ParamValue)>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style `insert`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Shorthand for [`encode`].
    pub fn encode(&self) -> String {
        encode(self)
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = ParameterSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

/// Encode a parameter set as `k1=v1&k2=v2`, skipping `Null` values.
pub fn encode(params: &ParameterSet) -> String {
    let mut out = String::new();
    for (key, value) in params.iter() {
        let Some(value) = value.to_invariant_string() else {
            continue;
        };
        if !out.is_empty() {
            out.push('&');
        }
        let _ = write!(
            out,
            "{}={}",
            encode_component(key),
            encode_component(&value)
        );
    }
    out
}

/// Percent-escape everything outside the RFC 3986 unreserved set.
pub fn encode_component(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

/// Reverse of [`encode_component`]. Returns `None` if the escapes do not
/// decode to valid UTF-8.
pub fn decode_component(escaped: &str) -> Option<String> {
    urlencoding::decode(escaped).ok().map(|s| s.into_owned())
}
