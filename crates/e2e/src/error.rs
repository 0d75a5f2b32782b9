//! Error types for the suite engine

use std::time::Duration;

use thiserror::Error;

use crate::capability::CapabilityError;

#[derive(Error, Debug)]
pub enum E2eError {
    /// Invalid suite definition or settings. Fatal before or during a run.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The browser environment is unusable (relaunch failed, driver missing).
    #[error("Environment error: {0}")]
    Environment(String),

    #[error("Element not found: {spec} (waited {timeout:?})")]
    ElementNotFound { spec: String, timeout: Duration },

    #[error("Timeout after {timeout:?} waiting for: {what}")]
    Timeout { what: String, timeout: Duration },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Browser session lost: {0}")]
    SessionLost(String),

    #[error("Browser command failed: {0}")]
    Browser(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Config parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Config write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl E2eError {
    /// Errors that stop the scheduler instead of failing a single step.
    pub fn is_fatal(&self) -> bool {
        matches!(self, E2eError::Configuration(_) | E2eError::Environment(_))
    }

    /// Errors a caller may tolerate when the interaction is optional.
    pub fn is_tolerable(&self) -> bool {
        matches!(
            self,
            E2eError::ElementNotFound { .. }
                | E2eError::Timeout { .. }
                | E2eError::AssertionFailed(_)
                | E2eError::Browser(_)
        )
    }
}

impl From<CapabilityError> for E2eError {
    fn from(err: CapabilityError) -> Self {
        match err {
            CapabilityError::SessionLost(msg) => E2eError::SessionLost(msg),
            CapabilityError::Launch(msg) => E2eError::Environment(msg),
            other => E2eError::Browser(other.to_string()),
        }
    }
}

pub type E2eResult<T> = Result<T, E2eError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(E2eError::Configuration("dup".into()).is_fatal());
        assert!(E2eError::Environment("no chrome".into()).is_fatal());
        assert!(!E2eError::AssertionFailed("x".into()).is_fatal());
        assert!(!E2eError::SessionLost("gone".into()).is_fatal());
    }

    #[test]
    fn test_capability_errors_map_to_step_errors() {
        let lost: E2eError = CapabilityError::SessionLost("invalid session id".into()).into();
        assert!(matches!(lost, E2eError::SessionLost(_)));
        assert!(!lost.is_tolerable());

        let launch: E2eError = CapabilityError::Launch("chromedriver missing".into()).into();
        assert!(launch.is_fatal());

        let stale: E2eError = CapabilityError::StaleElement("gone".into()).into();
        assert!(stale.is_tolerable());
    }
}
