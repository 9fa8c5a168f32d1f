//! Filter trees: `filter[name]=value`, `filter[name][nested]=value`.

use std::collections::BTreeMap;

use crate::allow_list::{AllowList, AllowListProvider};
use crate::coerce::{coerce, FilterValue};
use crate::error::{Error, ParameterKind};
use crate::raw::RawValue;
use crate::source::Reader;

/// Requested filters, keyed by top-level filter name.
pub type RequestedFilters = BTreeMap<String, FilterValue>;

/// Parses the filter parameter and validates top-level filter names.
///
/// Only top-level names are checked against the allow-list; nested keys are
/// part of the value.
///
/// # Examples
///
/// ```
/// use json_api_request::{DataSource, FilterValue, FiltersProcessor, RawParams, RawValue, Reader};
///
/// let params = RawParams::new().with("filter", RawValue::map([("active", "true"), ("tags", "a,b")]));
/// let reader = Reader::new(&params, DataSource::Query);
///
/// let mut filters = FiltersProcessor::new("filter", ',');
/// filters.set_allowed(reader, ["active", "tags"]).unwrap();
///
/// let requested = filters.filters(reader).unwrap();
/// assert_eq!(requested["active"], FilterValue::Bool(true));
/// assert_eq!(requested["tags"], FilterValue::from(vec!["a", "b"]));
/// ```
pub struct FiltersProcessor {
    parameter: String,
    delimiter: char,
    enforce: bool,
    allowed: Option<AllowList>,
    provider: Option<AllowListProvider>,
    provided: bool,
    requested: Option<RequestedFilters>,
}

impl FiltersProcessor {
    /// Creates an unrestricted processor reading `parameter`.
    pub fn new(parameter: impl Into<String>, delimiter: char) -> Self {
        Self {
            parameter: parameter.into(),
            delimiter,
            enforce: true,
            allowed: None,
            provider: None,
            provided: false,
            requested: None,
        }
    }

    /// Accepts unknown filter names instead of failing.
    ///
    /// The allow-list is still stored and returned, it is just not enforced.
    pub fn accept_unknown(mut self, accept: bool) -> Self {
        self.enforce = !accept;
        self
    }

    /// Installs a default allow-list provider, consulted lazily.
    pub fn with_provider(mut self, provider: AllowListProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Replaces the allow-list and validates the requested filter names.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidFilterQuery` listing every requested name outside
    /// the allow-list, unless unknown names are accepted. The previous
    /// allow-list is kept on failure.
    pub fn set_allowed<I, S>(&mut self, reader: Reader<'_>, allowed: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.install(reader, AllowList::new(allowed))
    }

    /// Returns the allow-list, consulting the provider if none is set yet.
    pub fn allowed(&mut self, reader: Reader<'_>) -> Result<Option<&AllowList>, Error> {
        self.ensure_provided(reader)?;
        Ok(self.allowed.as_ref())
    }

    /// Returns the coerced filters, parsing them on first call.
    ///
    /// A plain string parameter (for example `filter=foo`) yields no filters.
    /// A list is keyed by index, so `filter[]=a` is the filter named `0`; any
    /// other scalar is the single filter `0`.
    pub fn filters(&mut self, reader: Reader<'_>) -> Result<&RequestedFilters, Error> {
        self.ensure_provided(reader)?;
        Ok(self.parse_requested(reader))
    }

    fn ensure_provided(&mut self, reader: Reader<'_>) -> Result<(), Error> {
        if self.allowed.is_some() || self.provided {
            return Ok(());
        }
        let Some(provider) = &self.provider else {
            return Ok(());
        };

        let candidate = AllowList::new(provider());
        if candidate.is_empty() {
            self.provided = true;
            return Ok(());
        }
        self.install(reader, candidate)
    }

    fn install(&mut self, reader: Reader<'_>, candidate: AllowList) -> Result<(), Error> {
        let enforce = self.enforce;
        let requested = self.parse_requested(reader);
        if enforce {
            candidate.check(ParameterKind::Filters, requested.keys().map(String::as_str))?;
        }

        tracing::debug!(kind = %ParameterKind::Filters, allowed = candidate.len(), enforce, "allow-list installed");
        self.allowed = Some(candidate);
        Ok(())
    }

    fn parse_requested(&mut self, reader: Reader<'_>) -> &RequestedFilters {
        let Self {
            parameter,
            delimiter,
            requested,
            ..
        } = self;

        requested.get_or_insert_with(|| {
            let filters: RequestedFilters = match reader.get(parameter) {
                None | Some(RawValue::Null) | Some(RawValue::String(_)) => RequestedFilters::new(),
                Some(RawValue::Map(entries)) => entries
                    .iter()
                    .map(|(name, raw)| (name.clone(), coerce(raw, *delimiter)))
                    .collect(),
                Some(RawValue::List(items)) => items
                    .iter()
                    .enumerate()
                    .map(|(index, raw)| (index.to_string(), coerce(raw, *delimiter)))
                    .collect(),
                Some(scalar) => [("0".to_string(), coerce(scalar, *delimiter))].into(),
            };

            tracing::debug!(
                kind = %ParameterKind::Filters,
                parameter = %parameter,
                count = filters.len(),
                "parsed requested parameters"
            );
            filters
        })
    }
}

impl std::fmt::Debug for FiltersProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FiltersProcessor")
            .field("parameter", &self.parameter)
            .field("delimiter", &self.delimiter)
            .field("enforce", &self.enforce)
            .field("allowed", &self.allowed)
            .field("has_provider", &self.provider.is_some())
            .field("requested", &self.requested)
            .finish()
    }
}
