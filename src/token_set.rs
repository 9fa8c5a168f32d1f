//! Generic allow-listed token set backing includes, appends and sorts.
//!
//! The three kinds share one state machine:
//!
//! ```text
//! UNSET ──set_allowed / provider──▶ ALLOWLIST_SET ──validation ok──▶ VALIDATED
//! ```
//!
//! Requested tokens are parsed from the source on first use and memoized;
//! every allow-list installation validates the memoized tokens.

use std::collections::HashSet;

use crate::allow_list::{AllowList, AllowListProvider};
use crate::error::{Error, ParameterKind};
use crate::sort::Sort;
use crate::source::Reader;
use crate::tokenize::tokenize;

/// A value parsed from one delimiter-separated token.
pub trait Token: Clone {
    /// Parses a non-falsy token; `None` drops it.
    fn parse(token: String) -> Option<Self>;

    /// The comparison key used for deduplication and allow-list checks.
    fn key(&self) -> &str;
}

impl Token for String {
    fn parse(token: String) -> Option<Self> {
        Some(token)
    }

    fn key(&self) -> &str {
        self
    }
}

impl Token for Sort {
    fn parse(token: String) -> Option<Self> {
        Sort::from_token(&token)
    }

    /// Sorts compare by field name only, ignoring direction.
    fn key(&self) -> &str {
        self.field()
    }
}

/// Requested tokens of one parameter kind, checked against an allow-list.
///
/// # Examples
///
/// ```
/// use json_api_request::{AllowListedTokenSet, DataSource, ParameterKind, RawParams, Reader};
///
/// let params = RawParams::new().with("include", "roles,friends");
/// let reader = Reader::new(&params, DataSource::Query);
///
/// let mut includes = AllowListedTokenSet::<String>::new(ParameterKind::Includes, "include", ',');
/// includes.set_allowed(reader, ["roles", "friends", "posts"]).unwrap();
///
/// assert_eq!(includes.requested(reader).unwrap(), ["roles", "friends"]);
/// assert!(includes.set_allowed(reader, ["roles"]).is_err());
/// ```
pub struct AllowListedTokenSet<T> {
    kind: ParameterKind,
    parameter: String,
    delimiter: char,
    allowed: Option<AllowList>,
    provider: Option<AllowListProvider>,
    provided: bool,
    requested: Option<Vec<T>>,
}

impl<T: Token> AllowListedTokenSet<T> {
    /// Creates an unrestricted set reading `parameter`, split on `delimiter`.
    pub fn new(kind: ParameterKind, parameter: impl Into<String>, delimiter: char) -> Self {
        Self {
            kind,
            parameter: parameter.into(),
            delimiter,
            allowed: None,
            provider: None,
            provided: false,
            requested: None,
        }
    }

    /// Installs a default allow-list provider, consulted lazily.
    pub fn with_provider(mut self, provider: AllowListProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Returns the parameter kind.
    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    /// Returns the request parameter name.
    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    /// Replaces the allow-list and validates the requested tokens against it.
    ///
    /// # Errors
    ///
    /// Returns the kind's `Invalid*Query` error listing every requested token
    /// missing from `allowed`. The previous allow-list is kept in that case.
    pub fn set_allowed<I, S>(&mut self, reader: Reader<'_>, allowed: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.install(reader, AllowList::new(allowed))
    }

    /// Returns the allow-list, consulting the provider if none is set yet.
    ///
    /// `None` means every token is accepted.
    pub fn allowed(&mut self, reader: Reader<'_>) -> Result<Option<&AllowList>, Error> {
        self.ensure_provided(reader)?;
        Ok(self.allowed.as_ref())
    }

    /// Returns the requested tokens, parsing them on first call.
    ///
    /// # Errors
    ///
    /// Fails only when a provider allow-list is installed by this call and
    /// the request contains tokens outside it.
    pub fn requested(&mut self, reader: Reader<'_>) -> Result<&[T], Error> {
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
        let kind = self.kind;
        candidate.check(kind, self.parse_requested(reader).iter().map(|t| t.key()))?;

        tracing::debug!(kind = %kind, allowed = candidate.len(), "allow-list installed");
        self.allowed = Some(candidate);
        Ok(())
    }

    fn parse_requested(&mut self, reader: Reader<'_>) -> &[T] {
        let Self {
            kind,
            parameter,
            delimiter,
            requested,
            ..
        } = self;

        requested.get_or_insert_with(|| {
            let mut seen = HashSet::new();
            let tokens: Vec<T> = tokenize(reader.get(parameter), *delimiter)
                .into_iter()
                .filter_map(T::parse)
                .filter(|t| seen.insert(t.key().to_string()))
                .collect();

            tracing::debug!(kind = %kind, parameter = %parameter, count = tokens.len(), "parsed requested parameters");
            tokens
        })
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for AllowListedTokenSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllowListedTokenSet")
            .field("kind", &self.kind)
            .field("parameter", &self.parameter)
            .field("delimiter", &self.delimiter)
            .field("allowed", &self.allowed)
            .field("has_provider", &self.provider.is_some())
            .field("requested", &self.requested)
            .finish()
    }
}
