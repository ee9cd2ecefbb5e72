//! Per-request parameter sets
//!
//! A [`ParameterSet`] maps canonical field names to their (possibly absent)
//! values and carries an optional [`DefaultPolicy`] consulted when an absent key
//! is fetched. Filtering a set never loses its default policy.

use super::field::{FieldName, normalize};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

type DefaultFn = dyn Fn(&FieldName) -> Option<String> + Send + Sync;

/// Fallback lookup applied to keys that are not present in a [`ParameterSet`]
///
/// Clones share the same function.
#[derive(Clone)]
pub struct DefaultPolicy(Arc<DefaultFn>);

impl DefaultPolicy {
    /// Policy computing the fallback from the missing key
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&FieldName) -> Option<String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Policy returning the same value for every missing key
    pub fn value(value: impl Into<String>) -> Self {
        let value = value.into();
        Self::from_fn(move |_| Some(value.clone()))
    }

    /// Apply the policy to a missing key
    pub fn resolve(&self, key: &FieldName) -> Option<String> {
        (self.0)(key)
    }

    /// Whether two policies share the same function
    pub fn ptr_eq(&self, other: &DefaultPolicy) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for DefaultPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DefaultPolicy(..)")
    }
}

/// Returns true when a value counts as blank: absent, empty or whitespace only
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Request parameters keyed by canonical field name
///
/// Insertion order is preserved. A key mapped to `None` was sent without a
/// value (e.g. JSON `null`); an empty query value such as `?flag` is `Some("")`.
#[derive(Clone, Default)]
pub struct ParameterSet {
    entries: IndexMap<FieldName, Option<String>>,
    default_policy: Option<DefaultPolicy>,
}

impl ParameterSet {
    /// Create an empty set with no default policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from `(key, value)` pairs; later pairs overwrite earlier ones
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<FieldName>,
        V: Into<String>,
    {
        let mut set = Self::new();
        for (key, value) in pairs {
            set.insert(key, Some(value.into()));
        }
        set
    }

    /// Attach a constant default value
    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.default_policy = Some(DefaultPolicy::value(value));
        self
    }

    /// Attach a default function
    pub fn with_default_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&FieldName) -> Option<String> + Send + Sync + 'static,
    {
        self.default_policy = Some(DefaultPolicy::from_fn(f));
        self
    }

    pub fn set_default_policy(&mut self, policy: Option<DefaultPolicy>) {
        self.default_policy = policy;
    }

    pub fn default_policy(&self) -> Option<&DefaultPolicy> {
        self.default_policy.as_ref()
    }

    /// Copy the donor's default policy onto this set
    ///
    /// A donor without a policy leaves this set's policy unchanged.
    pub fn copy_default_policy_from(&mut self, donor: &ParameterSet) {
        if let Some(policy) = donor.default_policy() {
            self.default_policy = Some(policy.clone());
        }
    }

    /// Insert a value, normalizing the key. Returns the previous value if any.
    pub fn insert(
        &mut self,
        key: impl Into<FieldName>,
        value: Option<String>,
    ) -> Option<Option<String>> {
        self.entries.insert(key.into(), value)
    }

    /// Raw value for a key, without applying the default policy
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(|v| v.as_deref())
    }

    /// Value for a key, falling back to the default policy when the key is absent
    pub fn fetch(&self, key: impl Into<FieldName>) -> Option<String> {
        let key = key.into();
        match self.entries.get(&key) {
            Some(value) => value.clone(),
            None => self.default_policy.as_ref().and_then(|p| p.resolve(&key)),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldName> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k, v.as_deref()))
    }

    /// Keep only the entries whose key satisfies the predicate
    pub fn retain_keys(&mut self, mut keep: impl FnMut(&FieldName) -> bool) {
        self.entries.retain(|k, _| keep(k));
    }

    /// Disposable copy with every key re-normalized
    ///
    /// If two source keys collapse onto the same canonical key, the later one
    /// wins.
    pub fn normalized(&self) -> ParameterSet {
        let mut copy = ParameterSet {
            entries: IndexMap::with_capacity(self.entries.len()),
            default_policy: self.default_policy.clone(),
        };
        for (key, value) in &self.entries {
            copy.entries.insert(normalize(key.as_str()), value.clone());
        }
        copy
    }

    /// Whether the value stored under `key` is blank (absent keys are blank)
    pub fn is_blank(&self, key: &str) -> bool {
        is_blank(self.get(key))
    }

    /// JSON object view of the set; keys without a value become `null`
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, v)| {
                let value = v.clone().map(Value::String).unwrap_or(Value::Null);
                (k.to_string(), value)
            })
            .collect();
        Value::Object(map)
    }
}

impl fmt::Debug for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterSet")
            .field("entries", &self.entries)
            .field("default_policy", &self.default_policy.is_some())
            .finish()
    }
}

impl PartialEq for ParameterSet {
    /// Compares entries only; default policies are not comparable
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Into<FieldName>> FromIterator<(K, Option<String>)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (key, value) in iter {
            set.insert(key, value);
        }
        set
    }
}
