use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Direction of a sort directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    /// No prefix on the wire (`sort=name`)
    Ascending,
    /// `-` prefix on the wire (`sort=-name`)
    Descending,
}

impl SortDirection {
    /// Returns the canonical short name, `asc` or `desc`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = Error;

    /// Parses `asc` or `desc`, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Ascending)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Descending)
        } else {
            Err(Error::InvalidDirection(s.to_string()))
        }
    }
}

/// A single requested sort: field name plus direction.
///
/// # Examples
///
/// ```
/// use json_api_request::{Sort, SortDirection};
///
/// let sort = Sort::from_token("-created_at").unwrap();
/// assert_eq!(sort.field(), "created_at");
/// assert_eq!(sort.direction(), SortDirection::Descending);
/// assert_eq!(sort.to_string(), "-created_at");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sort {
    field: String,
    direction: SortDirection,
}

impl Sort {
    /// Creates a sort for `field` in the given direction.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Parses a wire token; a single leading `-` means descending.
    ///
    /// Returns `None` when nothing is left after the prefix.
    pub fn from_token(token: &str) -> Option<Self> {
        let (field, direction) = match token.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Descending),
            None => (token, SortDirection::Ascending),
        };

        if field.is_empty() {
            return None;
        }
        Some(Self::new(field, direction))
    }

    /// Returns the field name without direction prefix.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the direction.
    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Returns true for descending sorts.
    pub fn is_descending(&self) -> bool {
        self.direction == SortDirection::Descending
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortDirection::Ascending => f.write_str(&self.field),
            SortDirection::Descending => write!(f, "-{}", self.field),
        }
    }
}
