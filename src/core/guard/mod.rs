//! Route guards
//!
//! A guard is a pre-condition evaluated against a request's [`ParameterSet`]
//! before the route handler runs. Guards are synchronous and only touch the
//! request-scoped set plus the read-only [`ParamsConfig`].
//!
//! - [`AllowGuard`] (`allows`) filters the set down to permitted fields
//! - [`RequireGuard`] (`needs`) rejects the request when a required field is blank

pub mod allow;
pub mod require;

pub use allow::AllowGuard;
pub use require::RequireGuard;

use crate::config::ParamsConfig;
use crate::core::error::MissingParameterError;
use crate::core::params::ParameterSet;
use std::fmt;

/// Result of a guard that did not raise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Route still matches
    Pass,
    /// Route does not match this request
    NoMatch,
}

impl GuardOutcome {
    pub fn is_pass(self) -> bool {
        matches!(self, GuardOutcome::Pass)
    }
}

impl From<bool> for GuardOutcome {
    fn from(matched: bool) -> Self {
        if matched {
            GuardOutcome::Pass
        } else {
            GuardOutcome::NoMatch
        }
    }
}

/// A pre-condition attached to a route
pub trait Guard: fmt::Debug + Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Evaluate the guard, possibly rewriting `params`
    fn evaluate(
        &self,
        params: &mut ParameterSet,
        config: &ParamsConfig,
    ) -> Result<GuardOutcome, MissingParameterError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_bool() {
        assert_eq!(GuardOutcome::from(true), GuardOutcome::Pass);
        assert_eq!(GuardOutcome::from(false), GuardOutcome::NoMatch);
        assert!(!GuardOutcome::NoMatch.is_pass());
    }
}
