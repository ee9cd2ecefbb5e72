//! Configuration loading and management

use crate::core::field::FieldName;
use anyhow::Result;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Message used when a guarded request carries no parameters at all
pub const DEFAULT_MISSING_PARAMETER_MESSAGE: &str =
    "One or more required parameters were missing.";

fn default_missing_parameter_message() -> String {
    DEFAULT_MISSING_PARAMETER_MESSAGE.to_string()
}

/// Process-wide parameter settings
///
/// Built once at startup and shared read-only (as `Arc<ParamsConfig>`) by every
/// guard evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamsConfig {
    /// Fields passed through every `allows` filter (e.g. `redirect_to`, `csrf_token`)
    #[serde(default)]
    pub globally_allowed_parameters: Vec<FieldName>,

    /// Message reported when a guarded request carries no parameters at all
    #[serde(default = "default_missing_parameter_message")]
    pub missing_parameter_message: String,
}

impl Default for ParamsConfig {
    fn default() -> Self {
        Self {
            globally_allowed_parameters: Vec::new(),
            missing_parameter_message: default_missing_parameter_message(),
        }
    }
}

impl ParamsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add fields to the global allow-list; duplicates are ignored
    pub fn with_global_allows<I, K>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<FieldName>,
    {
        for field in fields {
            let field = field.into();
            if !self.globally_allowed_parameters.contains(&field) {
                self.globally_allowed_parameters.push(field);
            }
        }
        self
    }

    /// Override the generic missing-parameter message
    pub fn with_missing_parameter_message(mut self, message: impl Into<String>) -> Self {
        self.missing_parameter_message = message.into();
        self
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Whether a field is on the global allow-list
    pub fn is_globally_allowed(&self, field: &str) -> bool {
        self.globally_allowed_parameters
            .iter()
            .any(|f| f.as_str() == field.trim())
    }

    /// Merge several configurations into one
    ///
    /// Allow-lists are unioned in first-seen order. The last message that
    /// differs from the default wins.
    pub fn merge(configs: Vec<ParamsConfig>) -> Self {
        let mut allowed: IndexSet<FieldName> = IndexSet::new();
        let mut message = default_missing_parameter_message();

        for config in configs {
            allowed.extend(config.globally_allowed_parameters);
            if config.missing_parameter_message != DEFAULT_MISSING_PARAMETER_MESSAGE {
                message = config.missing_parameter_message;
            }
        }

        Self {
            globally_allowed_parameters: allowed.into_iter().collect(),
            missing_parameter_message: message,
        }
    }
}
