//! JSON:API query parameter parsing and allow-list validation.
//!
//! This crate turns the raw `fields`, `include`, `append`, `sort` and `filter`
//! parameters of an incoming request into typed values and checks them
//! against allow-lists:
//! - **Fields**: `fields[table]=a,b` sparse fieldsets, qualified as `table.field`
//! - **Includes / appends**: delimited relationship and attribute lists
//! - **Sorts**: `-created_at,name` with direction derived from the `-` prefix
//! - **Filters**: nested `filter[...]` trees with value coercion
//!
//! # Core Types
//!
//! - [`JsonApiRequest`]: Facade owning a parameter source and all processors
//! - [`ParameterSource`]: Where raw parameters come from (query or body)
//! - [`Config`]: Parameter names, data source and delimiters
//! - [`AllowList`]: Ordered, deduplicated allow-list
//! - [`Error`]: Rejections carrying the unknown tokens and the allow-list
//!
//! Requested values are parsed on first access and cached. Allow-lists are
//! validated when set; an allow-list provider is consulted lazily on first
//! access when no allow-list was set.
//!
//! # Examples
//!
//! ```
//! use json_api_request::{Error, JsonApiRequest, RawParams, RawValue};
//!
//! let params = RawParams::new()
//!     .with("include", "roles,secrets")
//!     .with("filter", RawValue::map([("active", "true")]));
//!
//! let mut request = JsonApiRequest::new(params);
//!
//! let err = request.set_allowed_includes(["roles"]).unwrap_err();
//! assert!(matches!(err, Error::InvalidIncludeQuery(_)));
//! assert_eq!(err.rejection().unwrap().unknown, ["secrets"]);
//!
//! let filters = request.filters().unwrap();
//! assert_eq!(filters["active"].as_bool(), Some(true));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod allow_list;
mod coerce;
mod config;
mod error;
mod fields;
mod filters;
mod qualify;
mod raw;
mod request;
mod sort;
mod source;
mod token_set;
mod tokenize;

pub use allow_list::{AllowList, AllowListProvider};
pub use coerce::{coerce, FilterValue};
pub use config::{Config, DataSource, Delimiters, ParameterNames};
pub use error::{Error, ParameterKind, Rejection};
pub use fields::{FieldsProcessor, RequestedFields};
pub use filters::{FiltersProcessor, RequestedFilters};
pub use qualify::{DefaultTableProvider, FieldQualifier};
pub use raw::{RawMap, RawValue};
pub use request::{JsonApiRequest, JsonApiRequestBuilder};
pub use sort::{Sort, SortDirection};
pub use source::{ParameterSource, RawParams, Reader, RequestInput};
pub use token_set::{AllowListedTokenSet, Token};
pub use tokenize::{is_falsy, tokenize};
