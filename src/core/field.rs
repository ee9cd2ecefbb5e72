//! Field names and their canonical form
//!
//! Field identifiers arrive from the transport as text and are declared in code
//! as string literals, owned strings or already-normalized [`FieldName`]s. Every
//! source goes through [`normalize`] before any comparison so that set
//! membership and equality checks agree regardless of where a name came from.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::{Borrow, Cow};
use std::fmt;
use std::sync::{Arc, OnceLock};

static SEPARATOR_REGEX: OnceLock<Regex> = OnceLock::new();

/// Canonical form of a request field identifier
///
/// Cheap to clone (the name is shared behind an `Arc`). Hashes and compares
/// like the underlying `str`, so maps keyed by `FieldName` can be queried with
/// a plain `&str`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldName(Arc<str>);

impl FieldName {
    /// Build a field name, normalizing the raw identifier
    pub fn new(raw: impl AsRef<str>) -> Self {
        normalize(raw.as_ref())
    }

    /// The canonical textual form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable label used in error messages
    pub fn humanize(&self) -> String {
        humanize(self.as_str())
    }
}

/// Map a raw identifier to its canonical [`FieldName`]
///
/// Surrounding whitespace is dropped; case is preserved because HTTP field
/// names are case-sensitive. Normalization never fails.
///
/// # Examples
///
/// ```
/// use route_params::core::field::normalize;
///
/// assert_eq!(normalize("  id ").as_str(), "id");
/// assert_eq!(normalize("csrf_token"), normalize(String::from("csrf_token")));
/// ```
pub fn normalize(raw: &str) -> FieldName {
    FieldName(Arc::from(raw.trim()))
}

/// Turn an identifier into a display label
///
/// Runs of `_`, `-` and whitespace become a single space, the result is
/// lowercased and its first letter capitalized.
///
/// # Examples
///
/// ```
/// use route_params::core::field::humanize;
///
/// assert_eq!(humanize("action"), "Action");
/// assert_eq!(humanize("first_name"), "First name");
/// assert_eq!(humanize("csrf-token"), "Csrf token");
/// ```
pub fn humanize(raw: &str) -> String {
    let regex = SEPARATOR_REGEX.get_or_init(|| Regex::new(r"[_\-\s]+").unwrap());
    let spaced = regex.replace_all(raw.trim(), " ");
    let lowered = spaced.trim().to_lowercase();

    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl fmt::Debug for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FieldName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for FieldName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldName {
    fn from(raw: &str) -> Self {
        normalize(raw)
    }
}

impl From<String> for FieldName {
    fn from(raw: String) -> Self {
        normalize(&raw)
    }
}

impl From<&String> for FieldName {
    fn from(raw: &String) -> Self {
        normalize(raw)
    }
}

impl From<Cow<'_, str>> for FieldName {
    fn from(raw: Cow<'_, str>) -> Self {
        normalize(&raw)
    }
}

impl From<&FieldName> for FieldName {
    fn from(name: &FieldName) -> Self {
        name.clone()
    }
}

impl Serialize for FieldName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for FieldName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(normalize(&raw))
    }
}
