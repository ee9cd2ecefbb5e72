//! `needs`: reject the request when a required field is missing or blank

use super::{Guard, GuardOutcome};
use crate::config::ParamsConfig;
use crate::core::error::MissingParameterError;
use crate::core::field::FieldName;
use crate::core::params::ParameterSet;

/// Checks that every declared field is present and non-blank
///
/// Declaration order decides which field is reported when several are missing.
/// The inspected set is never modified.
#[derive(Debug, Clone, Default)]
pub struct RequireGuard {
    required: Vec<FieldName>,
}

impl RequireGuard {
    /// Declared duplicates are dropped, keeping the first occurrence
    pub fn new<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<FieldName>,
    {
        let mut required: Vec<FieldName> = Vec::new();
        for field in fields {
            let field = field.into();
            if !required.contains(&field) {
                required.push(field);
            }
        }
        Self { required }
    }

    pub fn required(&self) -> &[FieldName] {
        &self.required
    }

    /// Declared fields that are absent or blank in `params`, in declared order
    pub fn missing<'a>(&'a self, params: &ParameterSet) -> Vec<&'a FieldName> {
        let working = params.normalized();
        self.required
            .iter()
            .filter(|field| working.is_blank(field.as_str()))
            .collect()
    }

    /// Run the check against an optional parameter set
    ///
    /// No set at all, or an empty set when fields are required, fails with the
    /// configured generic message. Otherwise the first missing field is named.
    ///
    /// # Example
    ///
    /// ```
    /// use route_params::config::ParamsConfig;
    /// use route_params::core::guard::RequireGuard;
    /// use route_params::core::params::ParameterSet;
    ///
    /// let guard = RequireGuard::new(["id", "action"]);
    /// let params = ParameterSet::from_pairs([("id", "7")]);
    ///
    /// let err = guard.check(Some(&params), &ParamsConfig::default()).unwrap_err();
    /// assert_eq!(err.message(), "Action cannot be blank");
    /// ```
    pub fn check(
        &self,
        params: Option<&ParameterSet>,
        config: &ParamsConfig,
    ) -> Result<(), MissingParameterError> {
        let params = match params {
            Some(params) if !(params.is_empty() && !self.required.is_empty()) => params,
            _ => {
                tracing::debug!("needs: request carries no parameters");
                return Err(MissingParameterError::generic(
                    config.missing_parameter_message.clone(),
                ));
            }
        };

        match self.missing(params).first() {
            Some(field) => {
                tracing::debug!(field = %field, "needs: required parameter is blank");
                Err(MissingParameterError::for_field(*field))
            }
            None => Ok(()),
        }
    }
}

impl Guard for RequireGuard {
    fn name(&self) -> &'static str {
        "needs"
    }

    fn evaluate(
        &self,
        params: &mut ParameterSet,
        config: &ParamsConfig,
    ) -> Result<GuardOutcome, MissingParameterError> {
        self.check(Some(params), config)?;
        Ok(GuardOutcome::Pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MISSING_PARAMETER_MESSAGE;

    #[test]
    fn test_passes_when_all_present() {
        let guard = RequireGuard::new(["id", "action"]);
        let params = ParameterSet::from_pairs([("id", "7"), ("action", "show")]);

        assert!(guard.check(Some(&params), &ParamsConfig::default()).is_ok());
    }

    #[test]
    fn test_names_the_missing_field() {
        let guard = RequireGuard::new(["id", "action"]);
        let params = ParameterSet::from_pairs([("id", "7")]);

        let err = guard
            .check(Some(&params), &ParamsConfig::default())
            .unwrap_err();

        assert_eq!(err.message(), "Action cannot be blank");
        assert_eq!(err.field().map(|f| f.as_str()), Some("action"));
    }

    #[test]
    fn test_reports_first_missing_in_declared_order() {
        let guard = RequireGuard::new(["name", "id", "action"]);
        let params = ParameterSet::from_pairs([("id", "7"), ("other", "x")]);
        let config = ParamsConfig::default();

        let first = guard.check(Some(&params), &config).unwrap_err();
        let second = guard.check(Some(&params), &config).unwrap_err();

        assert_eq!(first.message(), "Name cannot be blank");
        assert_eq!(first, second);
        assert_eq!(
            guard
                .missing(&params)
                .iter()
                .map(|f| f.as_str())
                .collect::<Vec<_>>(),
            vec!["name", "action"]
        );
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let guard = RequireGuard::new(["id", "action"]);
        let mut params = ParameterSet::from_pairs([("id", "   ")]);
        params.insert("action", None);

        let err = guard
            .check(Some(&params), &ParamsConfig::default())
            .unwrap_err();

        assert_eq!(err.message(), "Id cannot be blank");
    }

    #[test]
    fn test_empty_params_use_generic_message() {
        let guard = RequireGuard::new(["id"]);
        let config = ParamsConfig::default().with_missing_parameter_message("Nothing sent");

        let err = guard.check(Some(&ParameterSet::new()), &config).unwrap_err();

        assert_eq!(err.message(), "Nothing sent");
        assert!(err.field().is_none());
    }

    #[test]
    fn test_absent_params_use_generic_message() {
        let guard = RequireGuard::new(Vec::<&str>::new());

        let err = guard.check(None, &ParamsConfig::default()).unwrap_err();

        assert_eq!(err.message(), DEFAULT_MISSING_PARAMETER_MESSAGE);
    }

    #[test]
    fn test_empty_declaration_always_passes() {
        let guard = RequireGuard::new(Vec::<&str>::new());
        let config = ParamsConfig::default();

        assert!(guard.check(Some(&ParameterSet::new()), &config).is_ok());
        assert!(
            guard
                .check(Some(&ParameterSet::from_pairs([("x", "")])), &config)
                .is_ok()
        );
    }

    #[test]
    fn test_default_policy_does_not_satisfy_requirement() {
        let guard = RequireGuard::new(["id", "page"]);
        let params = ParameterSet::from_pairs([("id", "7")]).with_default_value("1");

        let err = guard
            .check(Some(&params), &ParamsConfig::default())
            .unwrap_err();

        assert_eq!(err.message(), "Page cannot be blank");
    }

    #[test]
    fn test_does_not_mutate_params() {
        let guard = RequireGuard::new(["id"]);
        let mut params = ParameterSet::from_pairs([("id", "7"), ("extra", "x")]);
        let before = params.clone();

        guard
            .evaluate(&mut params, &ParamsConfig::default())
            .unwrap();

        assert_eq!(params, before);
    }
}
