use crate::allow_list::{AllowList, AllowListProvider};
use crate::config::Config;
use crate::error::{Error, ParameterKind};
use crate::fields::{FieldsProcessor, RequestedFields};
use crate::filters::{FiltersProcessor, RequestedFilters};
use crate::qualify::{DefaultTableProvider, FieldQualifier};
use crate::sort::Sort;
use crate::source::{ParameterSource, RawParams, Reader};
use crate::token_set::AllowListedTokenSet;

/// JSON:API query parameters of one request.
///
/// Owns the raw parameter source and one processor per parameter kind. Every
/// requested value is parsed on first access and memoized for the lifetime
/// of the request; allow-lists are validated eagerly when set.
///
/// # Examples
///
/// ```
/// use json_api_request::{JsonApiRequest, RawParams, RawValue, SortDirection};
///
/// let params = RawParams::new()
///     .with("include", "roles,friends")
///     .with("sort", "-created_at,id")
///     .with("fields", RawValue::map([("users", "name,email")]));
///
/// let mut request = JsonApiRequest::builder(params).default_table("users").build();
///
/// request.set_allowed_includes(["roles", "friends"])?;
/// request.set_allowed_fields(["name", "email", "posts.title"])?;
///
/// assert_eq!(request.includes()?, ["roles", "friends"]);
/// assert_eq!(request.sorts()?[0].direction(), SortDirection::Descending);
/// assert_eq!(request.fields()?["users"], ["name", "email"]);
/// # Ok::<(), json_api_request::Error>(())
/// ```
#[derive(Debug)]
pub struct JsonApiRequest<S = RawParams> {
    source: S,
    config: Config,
    fields: FieldsProcessor,
    includes: AllowListedTokenSet<String>,
    appends: AllowListedTokenSet<String>,
    sorts: AllowListedTokenSet<Sort>,
    filters: FiltersProcessor,
}

impl<S: ParameterSource> JsonApiRequest<S> {
    /// Creates a request with the default configuration and no providers.
    pub fn new(source: S) -> Self {
        Self::builder(source).build()
    }

    /// Starts building a request over `source`.
    pub fn builder(source: S) -> JsonApiRequestBuilder<S> {
        JsonApiRequestBuilder::new(source)
    }

    /// Returns the configuration this request was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the raw parameter source.
    pub fn source(&self) -> &S {
        &self.source
    }

    // Fields

    /// Sets the table bare allowed fields are qualified with.
    pub fn set_default_table(&mut self, table: impl Into<String>) -> &mut Self {
        self.fields.set_default_table(table);
        self
    }

    /// Returns the default table, deriving it from its provider if needed.
    ///
    /// # Errors
    ///
    /// Returns `Error::DefaultTableNotDefined` if no default table is available.
    pub fn default_table(&mut self) -> Result<&str, Error> {
        self.fields.default_table()
    }

    /// Replaces the allowed fields and validates the requested ones.
    ///
    /// Bare entries are qualified with the default table.
    ///
    /// # Errors
    ///
    /// `Error::InvalidFieldQuery` or `Error::DefaultTableNotDefined`.
    pub fn set_allowed_fields<I, T>(&mut self, fields: I) -> Result<&mut Self, Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let reader = Reader::new(&self.source, self.config.request_data_source);
        self.fields.set_allowed(reader, fields)?;
        Ok(self)
    }

    /// Returns the allowed fields (qualified), or `None` if unrestricted.
    pub fn allowed_fields(&mut self) -> Result<Option<&AllowList>, Error> {
        let reader = Reader::new(&self.source, self.config.request_data_source);
        self.fields.allowed(reader)
    }

    /// Returns the requested fields per table.
    pub fn fields(&mut self) -> Result<&RequestedFields, Error> {
        let reader = Reader::new(&self.source, self.config.request_data_source);
        self.fields.fields(reader)
    }

    /// Returns every requested field as `table.field`.
    pub fn qualified_fields(&mut self) -> Result<Vec<String>, Error> {
        let reader = Reader::new(&self.source, self.config.request_data_source);
        self.fields.qualified(reader)
    }

    // Includes

    /// Replaces the allowed includes and validates the requested ones.
    ///
    /// # Errors
    ///
    /// `Error::InvalidIncludeQuery` listing the unknown includes.
    pub fn set_allowed_includes<I, T>(&mut self, includes: I) -> Result<&mut Self, Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let reader = Reader::new(&self.source, self.config.request_data_source);
        self.includes.set_allowed(reader, includes)?;
        Ok(self)
    }

    /// Returns the allowed includes, or `None` if unrestricted.
    pub fn allowed_includes(&mut self) -> Result<Option<&AllowList>, Error> {
        let reader = Reader::new(&self.source, self.config.request_data_source);
        self.includes.allowed(reader)
    }

    /// Returns the requested includes.
    pub fn includes(&mut self) -> Result<&[String], Error> {
        let reader = Reader::new(&self.source, self.config.request_data_source);
        self.includes.requested(reader)
    }

    // Appends

    /// Replaces the allowed appends and validates the requested ones.
    ///
    /// # Errors
    ///
    /// `Error::InvalidAppendQuery` listing the unknown appends.
    pub fn set_allowed_appends<I, T>(&mut self, appends: I) -> Result<&mut Self, Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let reader = Reader::new(&self.source, self.config.request_data_source);
        self.appends.set_allowed(reader, appends)?;
        Ok(self)
    }

    /// Returns the allowed appends, or `None` if unrestricted.
    pub fn allowed_appends(&mut self) -> Result<Option<&AllowList>, Error> {
        let reader = Reader::new(&self.source, self.config.request_data_source);
        self.appends.allowed(reader)
    }

    /// Returns the requested appends.
    pub fn appends(&mut self) -> Result<&[String], Error> {
        let reader = Reader::new(&self.source, self.config.request_data_source);
        self.appends.requested(reader)
    }

    // Sorts

    /// Replaces the allowed sort fields and validates the requested sorts.
    ///
    /// Entries are field names without direction prefix.
    ///
    /// # Errors
    ///
    /// `Error::InvalidSortQuery` listing the unknown sort fields.
    pub fn set_allowed_sorts<I, T>(&mut self, sorts: I) -> Result<&mut Self, Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let reader = Reader::new(&self.source, self.config.request_data_source);
        self.sorts.set_allowed(reader, sorts)?;
        Ok(self)
    }

    /// Returns the allowed sort fields, or `None` if unrestricted.
    pub fn allowed_sorts(&mut self) -> Result<Option<&AllowList>, Error> {
        let reader = Reader::new(&self.source, self.config.request_data_source);
        self.sorts.allowed(reader)
    }

    /// Returns the requested sorts in request order.
    pub fn sorts(&mut self) -> Result<&[Sort], Error> {
        let reader = Reader::new(&self.source, self.config.request_data_source);
        self.sorts.requested(reader)
    }

    // Filters

    /// Replaces the allowed filter names and validates the requested ones.
    ///
    /// # Errors
    ///
    /// `Error::InvalidFilterQuery` listing the unknown filter names, unless
    /// `disable_invalid_filter_query_exception` is configured.
    pub fn set_allowed_filters<I, T>(&mut self, filters: I) -> Result<&mut Self, Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let reader = Reader::new(&self.source, self.config.request_data_source);
        self.filters.set_allowed(reader, filters)?;
        Ok(self)
    }

    /// Returns the allowed filter names, or `None` if unrestricted.
    pub fn allowed_filters(&mut self) -> Result<Option<&AllowList>, Error> {
        let reader = Reader::new(&self.source, self.config.request_data_source);
        self.filters.allowed(reader)
    }

    /// Returns the coerced filters by name.
    pub fn filters(&mut self) -> Result<&RequestedFilters, Error> {
        let reader = Reader::new(&self.source, self.config.request_data_source);
        self.filters.filters(reader)
    }
}

/// Builder for [`JsonApiRequest`].
///
/// Providers replace overridable "default allow-list" hooks: each one is
/// called lazily, the first time its kind is accessed without an explicit
/// allow-list. A provider returning an empty list leaves the kind
/// unrestricted.
///
/// # Examples
///
/// ```
/// use json_api_request::{Config, Delimiters, Error, JsonApiRequest, RawParams};
///
/// let params = RawParams::new().with("include", "roles|secrets");
/// let config = Config { delimiters: Delimiters::uniform('|'), ..Config::default() };
///
/// let mut request = JsonApiRequest::builder(params)
///     .config(config)
///     .allowed_includes_provider(|| ["roles", "friends"])
///     .build();
///
/// assert!(matches!(request.includes(), Err(Error::InvalidIncludeQuery(_))));
/// ```
pub struct JsonApiRequestBuilder<S> {
    source: S,
    config: Config,
    qualifier: FieldQualifier,
    fields_provider: Option<AllowListProvider>,
    includes_provider: Option<AllowListProvider>,
    appends_provider: Option<AllowListProvider>,
    sorts_provider: Option<AllowListProvider>,
    filters_provider: Option<AllowListProvider>,
}

impl<S: ParameterSource> JsonApiRequestBuilder<S> {
    /// Creates a builder with the default configuration.
    pub fn new(source: S) -> Self {
        Self {
            source,
            config: Config::default(),
            qualifier: FieldQualifier::new(),
            fields_provider: None,
            includes_provider: None,
            appends_provider: None,
            sorts_provider: None,
            filters_provider: None,
        }
    }

    /// Uses `config` for parameter names, data source and delimiters.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets the default table for field qualification.
    pub fn default_table(mut self, table: impl Into<String>) -> Self {
        self.qualifier.set_default_table(table);
        self
    }

    /// Derives the default table lazily when none was set.
    pub fn default_table_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Option<String> + 'static,
    {
        let provider: DefaultTableProvider = Box::new(provider);
        self.qualifier = self.qualifier.with_provider(provider);
        self
    }

    /// Supplies the default allowed fields.
    pub fn allowed_fields_provider<F, I, T>(mut self, provider: F) -> Self
    where
        F: Fn() -> I + 'static,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.fields_provider = Some(boxed_provider(provider));
        self
    }

    /// Supplies the default allowed includes.
    pub fn allowed_includes_provider<F, I, T>(mut self, provider: F) -> Self
    where
        F: Fn() -> I + 'static,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.includes_provider = Some(boxed_provider(provider));
        self
    }

    /// Supplies the default allowed appends.
    pub fn allowed_appends_provider<F, I, T>(mut self, provider: F) -> Self
    where
        F: Fn() -> I + 'static,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.appends_provider = Some(boxed_provider(provider));
        self
    }

    /// Supplies the default allowed sort fields.
    pub fn allowed_sorts_provider<F, I, T>(mut self, provider: F) -> Self
    where
        F: Fn() -> I + 'static,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.sorts_provider = Some(boxed_provider(provider));
        self
    }

    /// Supplies the default allowed filter names.
    pub fn allowed_filters_provider<F, I, T>(mut self, provider: F) -> Self
    where
        F: Fn() -> I + 'static,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.filters_provider = Some(boxed_provider(provider));
        self
    }

    /// Builds the request. Nothing is read from the source yet.
    pub fn build(self) -> JsonApiRequest<S> {
        let Self {
            source,
            config,
            qualifier,
            fields_provider,
            includes_provider,
            appends_provider,
            sorts_provider,
            filters_provider,
        } = self;

        let names = &config.parameters;
        let delimiters = config.delimiters;

        let mut fields =
            FieldsProcessor::new(names.fields.as_str(), delimiters.fields).with_qualifier(qualifier);
        let mut includes = AllowListedTokenSet::new(
            ParameterKind::Includes,
            names.include.as_str(),
            delimiters.includes,
        );
        let mut appends = AllowListedTokenSet::new(
            ParameterKind::Appends,
            names.append.as_str(),
            delimiters.appends,
        );
        let mut sorts =
            AllowListedTokenSet::new(ParameterKind::Sorts, names.sort.as_str(), delimiters.sorts);
        let mut filters = FiltersProcessor::new(names.filter.as_str(), delimiters.filters)
            .accept_unknown(config.disable_invalid_filter_query_exception);

        if let Some(provider) = fields_provider {
            fields = fields.with_provider(provider);
        }
        if let Some(provider) = includes_provider {
            includes = includes.with_provider(provider);
        }
        if let Some(provider) = appends_provider {
            appends = appends.with_provider(provider);
        }
        if let Some(provider) = sorts_provider {
            sorts = sorts.with_provider(provider);
        }
        if let Some(provider) = filters_provider {
            filters = filters.with_provider(provider);
        }

        tracing::debug!(data_source = ?config.request_data_source, "request parameters bound");

        JsonApiRequest {
            source,
            config,
            fields,
            includes,
            appends,
            sorts,
            filters,
        }
    }
}

fn boxed_provider<F, I, T>(provider: F) -> AllowListProvider
where
    F: Fn() -> I + 'static,
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    Box::new(move || provider().into_iter().map(Into::into).collect())
}
