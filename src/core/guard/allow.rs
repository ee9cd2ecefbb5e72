//! `allows`: keep only the declared fields plus the global allow-list

use super::{Guard, GuardOutcome};
use crate::config::ParamsConfig;
use crate::core::error::MissingParameterError;
use crate::core::field::{FieldName, normalize};
use crate::core::params::ParameterSet;
use indexmap::IndexSet;

/// Filters a [`ParameterSet`] down to the permitted fields
///
/// Never rejects a route; its only effect is the filtering.
///
/// # Example
///
/// ```
/// use route_params::config::ParamsConfig;
/// use route_params::core::guard::AllowGuard;
/// use route_params::core::params::ParameterSet;
///
/// let config = ParamsConfig::new().with_global_allows(["csrf_token"]);
/// let guard = AllowGuard::new(["id", "action"]);
/// let params = ParameterSet::from_pairs([
///     ("id", "7"),
///     ("action", "show"),
///     ("extra", "x"),
///     ("csrf_token", "abc"),
/// ]);
///
/// let filtered = guard.filter(&params, &config);
/// assert_eq!(filtered.len(), 3);
/// assert!(!filtered.contains_key("extra"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AllowGuard {
    declared: IndexSet<FieldName>,
}

impl AllowGuard {
    pub fn new<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<FieldName>,
    {
        Self {
            declared: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Fields declared on the route
    pub fn declared(&self) -> &IndexSet<FieldName> {
        &self.declared
    }

    /// Normalized union of the global allow-list and the declared fields
    pub fn permitted(&self, config: &ParamsConfig) -> IndexSet<FieldName> {
        config
            .globally_allowed_parameters
            .iter()
            .chain(self.declared.iter())
            .map(|f| normalize(f.as_str()))
            .collect()
    }

    /// Filtered copy of `params`, keeping its default policy
    ///
    /// An empty set is returned unchanged.
    pub fn filter(&self, params: &ParameterSet, config: &ParamsConfig) -> ParameterSet {
        if params.is_empty() {
            return params.clone();
        }

        let permitted = self.permitted(config);
        let mut filtered: ParameterSet = params
            .iter()
            .filter(|(key, _)| permitted.contains(normalize(key.as_str()).as_str()))
            .map(|(key, value)| (key.clone(), value.map(str::to_string)))
            .collect();
        filtered.copy_default_policy_from(params);

        let dropped = params.len() - filtered.len();
        if dropped > 0 {
            tracing::debug!(
                dropped,
                kept = filtered.len(),
                "allows: discarded undeclared parameters"
            );
        }

        filtered
    }
}

impl Guard for AllowGuard {
    fn name(&self) -> &'static str {
        "allows"
    }

    fn evaluate(
        &self,
        params: &mut ParameterSet,
        config: &ParamsConfig,
    ) -> Result<GuardOutcome, MissingParameterError> {
        if !params.is_empty() {
            *params = self.filter(params, config);
        }
        Ok(GuardOutcome::Pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(params: &ParameterSet) -> Vec<&str> {
        params.keys().map(|k| k.as_str()).collect()
    }

    #[test]
    fn test_filters_to_declared_and_global() {
        let config = ParamsConfig::new().with_global_allows(["csrf_token"]);
        let guard = AllowGuard::new(["id", "action"]);
        let mut params = ParameterSet::from_pairs([
            ("id", "7"),
            ("action", "show"),
            ("extra", "x"),
            ("csrf_token", "abc"),
        ]);

        let outcome = guard.evaluate(&mut params, &config).unwrap();

        assert_eq!(outcome, GuardOutcome::Pass);
        assert_eq!(keys(&params), vec!["id", "action", "csrf_token"]);
        assert_eq!(params.get("csrf_token"), Some("abc"));
    }

    #[test]
    fn test_empty_params_is_noop() {
        let guard = AllowGuard::new(["id"]);
        let mut params = ParameterSet::new();

        let outcome = guard.evaluate(&mut params, &ParamsConfig::default()).unwrap();

        assert!(outcome.is_pass());
        assert!(params.is_empty());
    }

    #[test]
    fn test_nothing_declared_empties_the_set() {
        let guard = AllowGuard::new(Vec::<String>::new());
        let mut params = ParameterSet::from_pairs([("id", "7")]);

        guard.evaluate(&mut params, &ParamsConfig::default()).unwrap();

        assert!(params.is_empty());
    }

    #[test]
    fn test_declared_names_are_normalized() {
        let guard = AllowGuard::new([" id ", "action"]);
        let mut params = ParameterSet::from_pairs([("id", "7")]);

        guard.evaluate(&mut params, &ParamsConfig::default()).unwrap();

        assert_eq!(keys(&params), vec!["id"]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let guard = AllowGuard::new(["id", "id", String::from("id").as_str()]);
        assert_eq!(guard.declared().len(), 1);
    }

    #[test]
    fn test_default_policy_survives_filtering() {
        let guard = AllowGuard::new(["id"]);
        let mut params =
            ParameterSet::from_pairs([("id", "7"), ("extra", "x")]).with_default_value("fallback");

        guard.evaluate(&mut params, &ParamsConfig::default()).unwrap();

        assert_eq!(params.fetch("page").as_deref(), Some("fallback"));
        // filtered-out keys now resolve through the default as well
        assert_eq!(params.fetch("extra").as_deref(), Some("fallback"));
    }

    #[test]
    fn test_donor_without_policy_leaves_none() {
        let guard = AllowGuard::new(["id"]);
        let mut params = ParameterSet::from_pairs([("id", "7"), ("extra", "x")]);

        guard.evaluate(&mut params, &ParamsConfig::default()).unwrap();

        assert!(params.default_policy().is_none());
        assert_eq!(params.fetch("extra"), None);
    }

    #[test]
    fn test_keys_without_value_are_kept_when_permitted() {
        let guard = AllowGuard::new(["flag"]);
        let mut params = ParameterSet::new();
        params.insert("flag", None);
        params.insert("other", None);

        guard.evaluate(&mut params, &ParamsConfig::default()).unwrap();

        assert_eq!(keys(&params), vec!["flag"]);
    }
}
