//! Per-request configuration: parameter names, data source and delimiters.
//!
//! A `Config` is handed to each `JsonApiRequest` at construction. There is no
//! process-wide delimiter state; two requests built with different configs do
//! not observe each other.

use serde::Deserialize;

/// Configuration recognized by the parameter processors.
///
/// Every key has a default, so a partial document deserializes cleanly:
///
/// ```
/// use json_api_request::{Config, DataSource};
///
/// let config: Config = serde_json::from_str(r#"{
///     "parameters": { "sort": "order_by" },
///     "request_data_source": "body"
/// }"#).unwrap();
///
/// assert_eq!(config.parameters.sort, "order_by");
/// assert_eq!(config.parameters.filter, "filter");
/// assert_eq!(config.request_data_source, DataSource::Body);
/// assert_eq!(config.delimiters.includes, ',');
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Names of the request parameters for each kind
    pub parameters: ParameterNames,
    /// Whether parameters are read from the query string or the body
    pub request_data_source: DataSource,
    /// Accept unknown filter names instead of raising `InvalidFilterQuery`
    pub disable_invalid_filter_query_exception: bool,
    /// Array value delimiters for each kind
    pub delimiters: Delimiters,
}

/// Request parameter names, each independently renameable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParameterNames {
    /// Sparse fieldsets parameter, `fields` by default
    pub fields: String,
    /// Includes parameter, `include` by default
    pub include: String,
    /// Appends parameter, `append` by default
    pub append: String,
    /// Sorts parameter, `sort` by default
    pub sort: String,
    /// Filters parameter, `filter` by default
    pub filter: String,
}

impl Default for ParameterNames {
    fn default() -> Self {
        Self {
            fields: "fields".to_string(),
            include: "include".to_string(),
            append: "append".to_string(),
            sort: "sort".to_string(),
            filter: "filter".to_string(),
        }
    }
}

/// Where the raw parameters of a request live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// URL query string
    #[default]
    Query,
    /// Form or JSON body
    Body,
}

/// Delimiters used to split string values into arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Delimiters {
    /// Splits per-table field lists
    pub fields: char,
    /// Splits the include list
    pub includes: char,
    /// Splits the append list
    pub appends: char,
    /// Splits the sort list
    pub sorts: char,
    /// Splits string filter values into arrays
    pub filters: char,
}

impl Delimiters {
    /// Uses the same delimiter for every parameter kind.
    ///
    /// ```
    /// use json_api_request::Delimiters;
    ///
    /// let delimiters = Delimiters::uniform('|');
    /// assert_eq!(delimiters.sorts, '|');
    /// assert_eq!(delimiters.filters, '|');
    /// ```
    pub fn uniform(delimiter: char) -> Self {
        Self {
            fields: delimiter,
            includes: delimiter,
            appends: delimiter,
            sorts: delimiter,
            filters: delimiter,
        }
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::uniform(',')
    }
}
