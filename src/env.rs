//! Build environment selection.
//!
//! The environment is read once at startup from a single variable and is
//! immutable for the rest of the run.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Value of the environment variable that selects a production build.
pub const PRODUCTION_VALUE: &str = "production";

/// Build environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development build with eval source maps
    #[default]
    Development,
    /// Packaged production build with constant substitution and minification
    Production,
}

impl Environment {
    /// Interpret the raw value of the environment variable.
    ///
    /// Only the exact string `production` selects a production build;
    /// anything else, including an unset variable, is development.
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some(PRODUCTION_VALUE) => Environment::Production,
            _ => Environment::Development,
        }
    }

    /// Read the environment from the named process variable.
    pub fn from_env(variable: &str) -> Self {
        let value = std::env::var(variable).ok();
        let env = Self::from_value(value.as_deref());
        tracing::debug!(variable, value = ?value, environment = %env, "read build environment");
        env
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const TEST_VAR: &str = "BUNDLEPLAN_TEST_ENV";

    #[test]
    fn test_from_value() {
        assert_eq!(Environment::from_value(Some("production")), Environment::Production);
        assert_eq!(Environment::from_value(Some("development")), Environment::Development);
        assert_eq!(Environment::from_value(Some("Production")), Environment::Development);
        assert_eq!(Environment::from_value(Some("")), Environment::Development);
        assert_eq!(Environment::from_value(None), Environment::Development);
    }

    #[test]
    #[serial]
    fn test_from_env_production() {
        std::env::set_var(TEST_VAR, "production");
        assert_eq!(Environment::from_env(TEST_VAR), Environment::Production);
        std::env::remove_var(TEST_VAR);
    }

    #[test]
    #[serial]
    fn test_from_env_unset() {
        std::env::remove_var(TEST_VAR);
        assert_eq!(Environment::from_env(TEST_VAR), Environment::Development);
    }

    #[test]
    fn test_display_and_serde() {
        assert_eq!(Environment::Production.to_string(), "production");
        assert_eq!(Environment::Development.to_string(), "development");
        assert_eq!(serde_json::to_string(&Environment::Production).unwrap(), "\"production\"");
    }
}
