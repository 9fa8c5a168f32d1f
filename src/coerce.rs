//! Recursive normalization of filter values.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::raw::RawValue;

/// A normalized filter value.
///
/// Serializes untagged, so a filter tree renders as plain JSON.
///
/// ```
/// use json_api_request::{coerce, RawValue};
///
/// let raw = RawValue::map([("active", "true"), ("tags", "a,b")]);
/// let json = serde_json::to_value(coerce(&raw, ',')).unwrap();
///
/// assert_eq!(json, serde_json::json!({ "active": true, "tags": ["a", "b"] }));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// `"true"` / `"false"` literals, or booleans from a JSON body
    Bool(bool),
    /// Integer from a JSON body
    Int(i64),
    /// Non-integer number from a JSON body
    Float(f64),
    /// Any other string, including `""` for null input
    String(String),
    /// Array input, or a string split on the delimiter
    List(Vec<FilterValue>),
    /// Nested filter map
    Map(BTreeMap<String, FilterValue>),
}

impl FilterValue {
    /// Returns the boolean if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FilterValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the string if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FilterValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements if this is a `List`.
    pub fn as_list(&self) -> Option<&[FilterValue]> {
        match self {
            FilterValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries if this is a `Map`.
    pub fn as_map(&self) -> Option<&BTreeMap<String, FilterValue>> {
        match self {
            FilterValue::Map(entries) => Some(entries),
            _ => None,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::String(value.to_string())
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        FilterValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Normalizes a raw filter value.
///
/// - lists and maps are coerced element by element, keys preserved;
/// - a string containing `delimiter` becomes a list of its raw segments;
/// - `"true"` and `"false"` become booleans;
/// - null becomes the empty string;
/// - everything else is kept as is, so `"0"` stays a string.
///
/// Split segments are not coerced further: `"true,false"` yields the strings
/// `"true"` and `"false"`.
pub fn coerce(value: &RawValue, delimiter: char) -> FilterValue {
    match value {
        RawValue::Null => FilterValue::String(String::new()),
        RawValue::Bool(b) => FilterValue::Bool(*b),
        RawValue::Int(n) => FilterValue::Int(*n),
        RawValue::Float(n) => FilterValue::Float(*n),
        RawValue::String(s) => coerce_str(s, delimiter),
        RawValue::List(items) => {
            FilterValue::List(items.iter().map(|v| coerce(v, delimiter)).collect())
        }
        RawValue::Map(entries) => FilterValue::Map(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), coerce(v, delimiter)))
                .collect(),
        ),
    }
}

fn coerce_str(s: &str, delimiter: char) -> FilterValue {
    if s.contains(delimiter) {
        return FilterValue::List(
            s.split(delimiter)
                .map(|segment| FilterValue::String(segment.to_string()))
                .collect(),
        );
    }

    match s {
        "true" => FilterValue::Bool(true),
        "false" => FilterValue::Bool(false),
        _ => FilterValue::String(s.to_string()),
    }
}
