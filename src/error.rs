use std::fmt;

/// Errors that can occur while reading JSON:API request parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Requested sparse fieldsets contain fields outside the allow-list
    InvalidFieldQuery(Rejection),
    /// Requested includes contain relations outside the allow-list
    InvalidIncludeQuery(Rejection),
    /// Requested appends contain attributes outside the allow-list
    InvalidAppendQuery(Rejection),
    /// Requested sorts contain fields outside the allow-list
    InvalidSortQuery(Rejection),
    /// Requested filters contain names outside the allow-list
    InvalidFilterQuery(Rejection),
    /// A field had to be qualified but no default table is available
    DefaultTableNotDefined,
    /// A sort direction string was neither `asc` nor `desc`
    InvalidDirection(String),
}

impl Error {
    /// Builds the rejection error matching the given parameter kind.
    pub fn rejected(kind: ParameterKind, unknown: Vec<String>, allowed: Vec<String>) -> Self {
        let rejection = Rejection { unknown, allowed };
        match kind {
            ParameterKind::Fields => Error::InvalidFieldQuery(rejection),
            ParameterKind::Includes => Error::InvalidIncludeQuery(rejection),
            ParameterKind::Appends => Error::InvalidAppendQuery(rejection),
            ParameterKind::Sorts => Error::InvalidSortQuery(rejection),
            ParameterKind::Filters => Error::InvalidFilterQuery(rejection),
        }
    }

    /// Returns the rejected and allowed tokens for allow-list failures.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Error::InvalidFieldQuery(r)
            | Error::InvalidIncludeQuery(r)
            | Error::InvalidAppendQuery(r)
            | Error::InvalidSortQuery(r)
            | Error::InvalidFilterQuery(r) => Some(r),
            Error::DefaultTableNotDefined | Error::InvalidDirection(_) => None,
        }
    }

    /// Returns the parameter kind an allow-list failure belongs to.
    pub fn kind(&self) -> Option<ParameterKind> {
        match self {
            Error::InvalidFieldQuery(_) => Some(ParameterKind::Fields),
            Error::InvalidIncludeQuery(_) => Some(ParameterKind::Includes),
            Error::InvalidAppendQuery(_) => Some(ParameterKind::Appends),
            Error::InvalidSortQuery(_) => Some(ParameterKind::Sorts),
            Error::InvalidFilterQuery(_) => Some(ParameterKind::Filters),
            Error::DefaultTableNotDefined | Error::InvalidDirection(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidFieldQuery(r) => write!(f, "Requested field(s) {}", r),
            Error::InvalidIncludeQuery(r) => write!(f, "Requested include(s) {}", r),
            Error::InvalidAppendQuery(r) => write!(f, "Requested append(s) {}", r),
            Error::InvalidSortQuery(r) => write!(f, "Requested sort(s) {}", r),
            Error::InvalidFilterQuery(r) => write!(f, "Requested filter(s) {}", r),
            Error::DefaultTableNotDefined => {
                write!(f, "`defaultTable` is not defined for JsonApiRequest")
            }
            Error::InvalidDirection(given) => write!(
                f,
                "The direction should be either `desc` or `asc`. `{}` given",
                given
            ),
        }
    }
}

impl std::error::Error for Error {}

/// The offending tokens of an allow-list check, with the allow-list itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Requested tokens that are not in the allow-list
    pub unknown: Vec<String>,
    /// The full allow-list the request was checked against
    pub allowed: Vec<String>,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` are not allowed. Allowed: `{}`",
            self.unknown.join(", "),
            self.allowed.join(", ")
        )
    }
}

/// The five parameter kinds a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Sparse fieldsets (`fields[table]=a,b`)
    Fields,
    /// Related resources to include (`include=a,b`)
    Includes,
    /// Computed attributes to append (`append=a,b`)
    Appends,
    /// Sort directives (`sort=-a,b`)
    Sorts,
    /// Filter tree (`filter[name]=value`)
    Filters,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterKind::Fields => write!(f, "fields"),
            ParameterKind::Includes => write!(f, "includes"),
            ParameterKind::Appends => write!(f, "appends"),
            ParameterKind::Sorts => write!(f, "sorts"),
            ParameterKind::Filters => write!(f, "filters"),
        }
    }
}
