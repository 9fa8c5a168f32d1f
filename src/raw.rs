//! Raw, untrusted parameter values as the HTTP layer hands them over.

use std::collections::BTreeMap;

/// String-keyed entries in request order.
///
/// Form-decoded arrays such as `include[0]=a&include[10]=b` arrive as maps
/// keyed by index, so keys are never sorted: iteration yields entries in the
/// order they were first inserted. Inserting an existing key replaces its
/// value in place.
///
/// ```
/// use json_api_request::RawMap;
///
/// let map: RawMap = [("2", "b"), ("10", "c"), ("0", "a")].into_iter().collect();
/// let keys: Vec<&str> = map.keys().collect();
/// assert_eq!(keys, ["2", "10", "0"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMap {
    entries: Vec<(String, RawValue)>,
}

impl RawMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` under `key`, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Option<RawValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns true if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &RawValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterates over values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &RawValue> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = RawMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for RawMap {
    type Item = (String, RawValue);
    type IntoIter = std::vec::IntoIter<(String, RawValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A raw request parameter value.
///
/// Query strings and form bodies decode into strings, arrays and nested maps;
/// JSON bodies can also carry booleans, numbers and nulls. Nothing in a
/// `RawValue` has been validated yet.
///
/// # Examples
///
/// ```
/// use json_api_request::RawValue;
///
/// let fields = RawValue::map([("users", "name,email")]);
/// assert!(fields.as_map().unwrap().contains_key("users"));
///
/// let sort = RawValue::from(vec!["-name", "id"]);
/// assert_eq!(sort.as_list().unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Explicit null (JSON `null`, or an empty form value converted to null)
    Null,
    /// Boolean literal from a JSON body
    Bool(bool),
    /// Integer from a JSON body
    Int(i64),
    /// Non-integer number from a JSON body
    Float(f64),
    /// String value, the common case for query strings
    String(String),
    /// Array value (`include[]=a&include[]=b`)
    List(Vec<RawValue>),
    /// Nested map value (`fields[users]=name`), in request order
    Map(RawMap),
}

impl RawValue {
    /// Builds a `Map` from key/value pairs.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<RawValue>,
    {
        RawValue::Map(entries.into_iter().collect())
    }

    /// Returns the string if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements if this is a `List`.
    pub fn as_list(&self) -> Option<&[RawValue]> {
        match self {
            RawValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries if this is a `Map`.
    pub fn as_map(&self) -> Option<&RawMap> {
        match self {
            RawValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Renders a scalar as the string it would be in a query string.
    ///
    /// `true` renders as `"1"` and `false` as `""`. Lists and maps have no
    /// scalar form and return `None`, as does `Null`.
    pub fn to_scalar_string(&self) -> Option<String> {
        match self {
            RawValue::Null | RawValue::List(_) | RawValue::Map(_) => None,
            RawValue::Bool(true) => Some("1".to_string()),
            RawValue::Bool(false) => Some(String::new()),
            RawValue::Int(n) => Some(n.to_string()),
            RawValue::Float(n) => Some(n.to_string()),
            RawValue::String(s) => Some(s.clone()),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::String(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::String(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Int(value)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(RawValue::Null, Into::into)
    }
}

impl<T: Into<RawValue>> From<Vec<T>> for RawValue {
    fn from(values: Vec<T>) -> Self {
        RawValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<RawMap> for RawValue {
    fn from(entries: RawMap) -> Self {
        RawValue::Map(entries)
    }
}

impl From<BTreeMap<String, RawValue>> for RawValue {
    fn from(entries: BTreeMap<String, RawValue>) -> Self {
        RawValue::Map(entries.into_iter().collect())
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => RawValue::Null,
            serde_json::Value::Bool(b) => RawValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => RawValue::Int(i),
                None => RawValue::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => RawValue::String(s),
            serde_json::Value::Array(items) => {
                RawValue::List(items.into_iter().map(RawValue::from).collect())
            }
            serde_json::Value::Object(entries) => RawValue::Map(entries.into_iter().collect()),
        }
    }
}
