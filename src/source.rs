//! Boundary between the HTTP layer and the parameter processors.
//!
//! The HTTP collaborator decodes the query string and body into `RawValue`s
//! and exposes them through [`ParameterSource`]. The processors only ever read
//! from a source; they never mutate it.

use std::collections::BTreeMap;

use crate::config::DataSource;
use crate::raw::RawValue;

/// Read-only lookup of raw request parameters.
///
/// Framework integrations implement this for their request type, or build a
/// [`RequestInput`] and hand that over instead.
///
/// # Examples
///
/// ```
/// use json_api_request::{DataSource, ParameterSource, RawValue};
///
/// struct QueryOnly(Vec<(String, RawValue)>);
///
/// impl ParameterSource for QueryOnly {
///     fn get_request_data(&self, source: DataSource, key: &str) -> Option<&RawValue> {
///         if source != DataSource::Query {
///             return None;
///         }
///         self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
///     }
/// }
///
/// let query = QueryOnly(vec![("include".to_string(), RawValue::from("roles"))]);
/// assert!(query.get_request_data(DataSource::Query, "include").is_some());
/// assert!(query.get_request_data(DataSource::Body, "include").is_none());
/// ```
pub trait ParameterSource {
    /// Returns the raw value stored under `key` in the selected data source.
    fn get_request_data(&self, source: DataSource, key: &str) -> Option<&RawValue>;
}

/// A parameter source bound to the configured data source.
///
/// Processors read through a `Reader` so they never need to know which part
/// of the request the parameters came from.
#[derive(Clone, Copy)]
pub struct Reader<'a> {
    source: &'a dyn ParameterSource,
    data_source: DataSource,
}

impl<'a> Reader<'a> {
    /// Binds `source` to `data_source`.
    pub fn new(source: &'a dyn ParameterSource, data_source: DataSource) -> Self {
        Self {
            source,
            data_source,
        }
    }

    /// Returns the raw value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&'a RawValue> {
        self.source.get_request_data(self.data_source, key)
    }

    /// Returns the data source lookups are bound to.
    pub fn data_source(&self) -> DataSource {
        self.data_source
    }
}

impl std::fmt::Debug for Reader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("data_source", &self.data_source)
            .finish_non_exhaustive()
    }
}

/// A single flat map of raw parameters.
///
/// Ignores the data source selector: whatever was inserted is what every
/// lookup sees. Handy for tests and for frameworks that merge query and body.
///
/// # Examples
///
/// ```
/// use json_api_request::{DataSource, ParameterSource, RawParams};
///
/// let params = RawParams::new().with("sort", "-name,id");
/// assert!(params.get_request_data(DataSource::Body, "sort").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawParams {
    values: BTreeMap<String, RawValue>,
}

impl RawParams {
    /// Creates an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds or replaces a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Returns the parameter stored under `key`.
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.values.get(key)
    }

    /// Returns the number of top-level parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no parameter was supplied.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ParameterSource for RawParams {
    fn get_request_data(&self, _source: DataSource, key: &str) -> Option<&RawValue> {
        self.get(key)
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<serde_json::Value> for RawParams {
    /// Uses the entries of a JSON object; anything else yields no parameters.
    fn from(value: serde_json::Value) -> Self {
        match RawValue::from(value) {
            RawValue::Map(values) => Self {
                values: values.into_iter().collect(),
            },
            _ => Self::default(),
        }
    }
}

/// Query string and body parameters of one request, kept apart.
///
/// Lookups honour the [`DataSource`] selector from the configuration.
///
/// # Examples
///
/// ```
/// use json_api_request::{DataSource, ParameterSource, RequestInput};
///
/// let mut input = RequestInput::new();
/// input.add_query_param("include", "roles");
/// input.add_body_param("include", "friends");
///
/// let from_body = input.get_request_data(DataSource::Body, "include");
/// assert_eq!(from_body.and_then(|v| v.as_str()), Some("friends"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestInput {
    query: RawParams,
    body: RawParams,
}

impl RequestInput {
    /// Creates an input with empty query and body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an input from already decoded query and body parameters.
    pub fn from_parts(query: RawParams, body: RawParams) -> Self {
        Self { query, body }
    }

    /// Adds a query string parameter.
    pub fn add_query_param(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        self.query.insert(key, value);
    }

    /// Adds a body parameter.
    pub fn add_body_param(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        self.body.insert(key, value);
    }

    /// Returns the query string parameters.
    pub fn query(&self) -> &RawParams {
        &self.query
    }

    /// Returns the body parameters.
    pub fn body(&self) -> &RawParams {
        &self.body
    }
}

impl ParameterSource for RequestInput {
    fn get_request_data(&self, source: DataSource, key: &str) -> Option<&RawValue> {
        match source {
            DataSource::Query => self.query.get(key),
            DataSource::Body => self.body.get(key),
        }
    }
}

impl<S: ParameterSource + ?Sized> ParameterSource for &S {
    fn get_request_data(&self, source: DataSource, key: &str) -> Option<&RawValue> {
        (**self).get_request_data(source, key)
    }
}
