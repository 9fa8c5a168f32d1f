//! Delimiter tokenizer shared by every parameter kind.

use std::collections::HashSet;

use crate::raw::RawValue;

/// Splits a raw parameter value into ordered, unique, non-falsy tokens.
///
/// - a string is split on `delimiter`;
/// - a list contributes each scalar element (nested lists and maps are skipped);
/// - a map contributes its values like a list;
/// - any other scalar is a single token;
/// - an absent value yields no tokens.
///
/// Falsy tokens (see [`is_falsy`]) are dropped and the first occurrence of a
/// duplicate wins.
///
/// # Examples
///
/// ```
/// use json_api_request::{tokenize, RawValue};
///
/// let raw = RawValue::from("roles,friends,0,,roles");
/// assert_eq!(tokenize(Some(&raw), ','), vec!["roles", "friends"]);
/// assert!(tokenize(None, ',').is_empty());
/// ```
pub fn tokenize(raw: Option<&RawValue>, delimiter: char) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    match raw {
        RawValue::String(s) => unique_truthy(s.split(delimiter).map(str::to_string)),
        RawValue::List(items) => unique_truthy(items.iter().filter_map(scalar_token)),
        RawValue::Map(entries) => unique_truthy(entries.values().filter_map(scalar_token)),
        other => unique_truthy(scalar_token(other)),
    }
}

/// Returns true for values that never count as a token.
///
/// Mirrors the loose truthiness of form input: null, `false`, the empty
/// string, `"0"`, numeric zero and empty collections are all falsy.
pub fn is_falsy(value: &RawValue) -> bool {
    match value {
        RawValue::Null => true,
        RawValue::Bool(b) => !b,
        RawValue::Int(n) => *n == 0,
        RawValue::Float(n) => *n == 0.0,
        RawValue::String(s) => is_falsy_str(s),
        RawValue::List(items) => items.is_empty(),
        RawValue::Map(entries) => entries.is_empty(),
    }
}

pub(crate) fn is_falsy_str(token: &str) -> bool {
    token.is_empty() || token == "0"
}

/// Drops falsy strings and duplicates, keeping first-occurrence order.
pub(crate) fn unique_truthy<I>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    tokens
        .into_iter()
        .filter(|t| !is_falsy_str(t))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

fn scalar_token(value: &RawValue) -> Option<String> {
    if is_falsy(value) {
        return None;
    }
    value.to_scalar_string()
}
