//! Sparse fieldsets: `fields[table]=a,b`.

use std::collections::BTreeMap;

use crate::allow_list::{AllowList, AllowListProvider};
use crate::error::{Error, ParameterKind};
use crate::qualify::FieldQualifier;
use crate::raw::RawValue;
use crate::source::Reader;
use crate::tokenize::{is_falsy_str, tokenize};

/// Requested fields, keyed by table.
pub type RequestedFields = BTreeMap<String, Vec<String>>;

/// Parses and validates the sparse fieldsets parameter.
///
/// Allow-list entries are qualified with the default table when bare, while
/// requested fields are qualified with the table key they were requested
/// under. Both sides are then compared as `table.field` strings.
///
/// # Examples
///
/// ```
/// use json_api_request::{DataSource, FieldsProcessor, RawParams, RawValue, Reader};
///
/// let params = RawParams::new().with("fields", RawValue::map([("users", "name,email")]));
/// let reader = Reader::new(&params, DataSource::Query);
///
/// let mut fields = FieldsProcessor::new("fields", ',');
/// fields.set_default_table("users");
/// fields.set_allowed(reader, ["name", "email", "posts.title"]).unwrap();
///
/// assert_eq!(fields.fields(reader).unwrap()["users"], ["name", "email"]);
/// ```
pub struct FieldsProcessor {
    parameter: String,
    delimiter: char,
    qualifier: FieldQualifier,
    allowed: Option<AllowList>,
    provider: Option<AllowListProvider>,
    provided: bool,
    requested: Option<RequestedFields>,
}

impl FieldsProcessor {
    /// Creates an unrestricted processor reading `parameter`.
    pub fn new(parameter: impl Into<String>, delimiter: char) -> Self {
        Self {
            parameter: parameter.into(),
            delimiter,
            qualifier: FieldQualifier::new(),
            allowed: None,
            provider: None,
            provided: false,
            requested: None,
        }
    }

    /// Replaces the field qualifier (default table and its provider).
    pub fn with_qualifier(mut self, qualifier: FieldQualifier) -> Self {
        self.qualifier = qualifier;
        self
    }

    /// Installs a default allow-list provider, consulted lazily.
    pub fn with_provider(mut self, provider: AllowListProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Sets the table bare allow-list entries are qualified with.
    pub fn set_default_table(&mut self, table: impl Into<String>) {
        self.qualifier.set_default_table(table);
    }

    /// Returns the default table, deriving it from its provider if needed.
    pub fn default_table(&mut self) -> Result<&str, Error> {
        self.qualifier.default_table()
    }

    /// Replaces the allow-list and validates the requested fields against it.
    ///
    /// # Errors
    ///
    /// - `Error::DefaultTableNotDefined` if an entry is bare and no default
    ///   table is available.
    /// - `Error::InvalidFieldQuery` listing every requested `table.field`
    ///   outside the allow-list. The previous allow-list is kept.
    pub fn set_allowed<I, S>(&mut self, reader: Reader<'_>, allowed: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let candidate = self.qualify_allowed(allowed.into_iter().map(Into::into).collect())?;
        self.install(reader, candidate)
    }

    /// Returns the allow-list, consulting the provider if none is set yet.
    pub fn allowed(&mut self, reader: Reader<'_>) -> Result<Option<&AllowList>, Error> {
        self.ensure_provided(reader)?;
        Ok(self.allowed.as_ref())
    }

    /// Returns the requested fields per table, parsing them on first call.
    ///
    /// Tables whose field list ends up empty are dropped.
    pub fn fields(&mut self, reader: Reader<'_>) -> Result<&RequestedFields, Error> {
        self.ensure_provided(reader)?;
        Ok(self.parse_requested(reader))
    }

    /// Returns every requested field as `table.field`, deduplicated.
    pub fn qualified(&mut self, reader: Reader<'_>) -> Result<Vec<String>, Error> {
        self.ensure_provided(reader)?;
        self.qualified_requested(reader)
    }

    fn qualify_allowed(&mut self, entries: Vec<String>) -> Result<AllowList, Error> {
        let qualified = entries
            .into_iter()
            .filter(|field| !is_falsy_str(field))
            .map(|field| self.qualifier.qualify(&field, None))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AllowList::new(qualified))
    }

    fn ensure_provided(&mut self, reader: Reader<'_>) -> Result<(), Error> {
        if self.allowed.is_some() || self.provided {
            return Ok(());
        }
        let Some(provider) = &self.provider else {
            return Ok(());
        };

        let entries = provider();
        if entries.iter().all(|e| is_falsy_str(e)) {
            self.provided = true;
            return Ok(());
        }
        let candidate = self.qualify_allowed(entries)?;
        self.install(reader, candidate)
    }

    fn install(&mut self, reader: Reader<'_>, candidate: AllowList) -> Result<(), Error> {
        let requested = self.qualified_requested(reader)?;
        candidate.check(ParameterKind::Fields, requested.iter().map(String::as_str))?;

        tracing::debug!(kind = %ParameterKind::Fields, allowed = candidate.len(), "allow-list installed");
        self.allowed = Some(candidate);
        Ok(())
    }

    fn qualified_requested(&mut self, reader: Reader<'_>) -> Result<Vec<String>, Error> {
        self.parse_requested(reader);
        let Self {
            qualifier,
            requested,
            ..
        } = self;

        let mut qualified: Vec<String> = Vec::new();
        for (table, fields) in requested.iter().flatten() {
            for field in fields {
                let name = qualifier.qualify(field, Some(table.as_str()))?;
                if !qualified.contains(&name) {
                    qualified.push(name);
                }
            }
        }
        Ok(qualified)
    }

    fn parse_requested(&mut self, reader: Reader<'_>) -> &RequestedFields {
        let Self {
            parameter,
            delimiter,
            requested,
            ..
        } = self;

        requested.get_or_insert_with(|| {
            let per_table: RequestedFields = match reader.get(parameter) {
                Some(RawValue::Map(tables)) => tables
                    .iter()
                    .map(|(table, raw)| (table.clone(), tokenize(Some(raw), *delimiter)))
                    .filter(|(_, fields)| !fields.is_empty())
                    .collect(),
                _ => RequestedFields::new(),
            };

            tracing::debug!(
                kind = %ParameterKind::Fields,
                parameter = %parameter,
                tables = per_table.len(),
                "parsed requested parameters"
            );
            per_table
        })
    }
}

impl std::fmt::Debug for FieldsProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldsProcessor")
            .field("parameter", &self.parameter)
            .field("delimiter", &self.delimiter)
            .field("qualifier", &self.qualifier)
            .field("allowed", &self.allowed)
            .field("has_provider", &self.provider.is_some())
            .field("requested", &self.requested)
            .finish()
    }
}
