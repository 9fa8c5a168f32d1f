use crate::error::Error;

/// Derives the default table the first time one is needed.
pub type DefaultTableProvider = Box<dyn Fn() -> Option<String>>;

/// Turns bare field names into `table.field`.
///
/// Fields that already contain a `.` are left alone, so qualification is
/// idempotent. Bare fields take an explicit table, or fall back to the default
/// table, which is either set directly or derived once from a provider.
///
/// # Examples
///
/// ```
/// use json_api_request::FieldQualifier;
///
/// let mut qualifier = FieldQualifier::new().with_default_table("users");
///
/// assert_eq!(qualifier.qualify("name", None).unwrap(), "users.name");
/// assert_eq!(qualifier.qualify("title", Some("posts")).unwrap(), "posts.title");
/// assert_eq!(qualifier.qualify("posts.title", None).unwrap(), "posts.title");
/// ```
#[derive(Default)]
pub struct FieldQualifier {
    default_table: Option<String>,
    provider: Option<DefaultTableProvider>,
}

impl FieldQualifier {
    /// Creates a qualifier without default table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default table, builder style.
    pub fn with_default_table(mut self, table: impl Into<String>) -> Self {
        self.set_default_table(table);
        self
    }

    /// Installs a provider for the default table, consulted lazily.
    pub fn with_provider(mut self, provider: DefaultTableProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Sets the default table; an empty name counts as "not set".
    pub fn set_default_table(&mut self, table: impl Into<String>) {
        self.default_table = Some(table.into());
    }

    /// Returns the default table, deriving it from the provider if needed.
    ///
    /// # Errors
    ///
    /// Returns `Error::DefaultTableNotDefined` when neither an explicit table
    /// nor a provider result is available.
    pub fn default_table(&mut self) -> Result<&str, Error> {
        if self.default_table.as_deref().map_or(true, str::is_empty) {
            let derived = self
                .provider
                .as_ref()
                .and_then(|provider| provider())
                .filter(|table| !table.is_empty())
                .ok_or(Error::DefaultTableNotDefined)?;

            tracing::debug!(table = %derived, "default table derived");
            self.default_table = Some(derived);
        }

        self.default_table
            .as_deref()
            .ok_or(Error::DefaultTableNotDefined)
    }

    /// Qualifies `field` with `table`, or with the default table if `None`.
    ///
    /// # Errors
    ///
    /// Returns `Error::DefaultTableNotDefined` when the field is bare, no
    /// table was given and no default table is available.
    pub fn qualify(&mut self, field: &str, table: Option<&str>) -> Result<String, Error> {
        if field.contains('.') {
            return Ok(field.to_string());
        }

        match table {
            Some(table) => Ok(format!("{}.{}", table, field)),
            None => Ok(format!("{}.{}", self.default_table()?, field)),
        }
    }
}

impl std::fmt::Debug for FieldQualifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldQualifier")
            .field("default_table", &self.default_table)
            .field("has_provider", &self.provider.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn qualified_fields_pass_through_without_default_table() {
        let mut qualifier = FieldQualifier::new();
        assert_eq!(qualifier.qualify("users.name", None).unwrap(), "users.name");
    }

    #[test]
    fn qualification_is_idempotent() {
        let mut qualifier = FieldQualifier::new().with_default_table("users");
        let once = qualifier.qualify("name", None).unwrap();
        let twice = qualifier.qualify(&once, None).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn bare_field_without_default_table_fails() {
        let mut qualifier = FieldQualifier::new();
        assert_eq!(
            qualifier.qualify("name", None).unwrap_err(),
            Error::DefaultTableNotDefined
        );
    }

    #[test]
    fn explicit_table_does_not_need_default() {
        let mut qualifier = FieldQualifier::new();
        assert_eq!(qualifier.qualify("name", Some("users")).unwrap(), "users.name");
    }

    #[test]
    fn empty_default_table_counts_as_missing() {
        let mut qualifier = FieldQualifier::new().with_default_table("");
        assert!(qualifier.default_table().is_err());
    }

    #[test]
    fn provider_is_called_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut qualifier = FieldQualifier::new().with_provider(Box::new(move || {
            counter.set(counter.get() + 1);
            Some("accounts".to_string())
        }));

        assert_eq!(qualifier.qualify("id", None).unwrap(), "accounts.id");
        assert_eq!(qualifier.default_table().unwrap(), "accounts");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn provider_returning_nothing_fails() {
        let mut qualifier = FieldQualifier::new().with_provider(Box::new(|| None));
        assert_eq!(
            qualifier.default_table().unwrap_err(),
            Error::DefaultTableNotDefined
        );
    }

    #[test]
    fn explicit_default_wins_over_provider() {
        let mut qualifier = FieldQualifier::new()
            .with_provider(Box::new(|| Some("derived".to_string())))
            .with_default_table("explicit");
        assert_eq!(qualifier.default_table().unwrap(), "explicit");
    }
}
