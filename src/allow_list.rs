use std::collections::HashSet;

use crate::error::{Error, ParameterKind};
use crate::tokenize::unique_truthy;

/// Supplies a default allow-list the first time one is needed.
///
/// Returning an empty list means "unrestricted".
pub type AllowListProvider = Box<dyn Fn() -> Vec<String>>;

/// Ordered set of permitted tokens for one parameter kind.
///
/// Entries are unique and never falsy (empty string or `"0"`); insertion
/// order is kept for diagnostics.
///
/// # Examples
///
/// ```
/// use json_api_request::AllowList;
///
/// let allowed = AllowList::new(["friends", "roles", "", "friends"]);
/// assert_eq!(allowed.as_slice(), ["friends", "roles"]);
/// assert!(allowed.contains("roles"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    entries: Vec<String>,
}

impl AllowList {
    /// Builds an allow-list, dropping falsy entries and duplicates.
    pub fn new<I, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            entries: unique_truthy(entries.into_iter().map(Into::into)),
        }
    }

    /// Returns true if `token` is permitted.
    pub fn contains(&self, token: &str) -> bool {
        self.entries.iter().any(|e| e == token)
    }

    /// Returns the entries in insertion order.
    pub fn as_slice(&self) -> &[String] {
        &self.entries
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is permitted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the requested tokens that are not permitted, deduplicated.
    pub fn missing<'a, I>(&self, requested: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let allowed: HashSet<&str> = self.iter().collect();
        let mut seen = HashSet::new();
        requested
            .into_iter()
            .filter(|t| !allowed.contains(t) && seen.insert(*t))
            .map(str::to_string)
            .collect()
    }

    /// Fails with the kind's rejection error if any requested token is missing.
    pub(crate) fn check<'a, I>(&self, kind: ParameterKind, requested: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let unknown = self.missing(requested);
        if unknown.is_empty() {
            return Ok(());
        }

        tracing::warn!(kind = %kind, unknown = ?unknown, "requested parameters not allowed");
        Err(Error::rejected(kind, unknown, self.entries.clone()))
    }
}

impl<'a> IntoIterator for &'a AllowList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
