//! Per-run credentials fixture

use chrono::Utc;
use serde::Serialize;

use crate::config::FixtureConfig;

/// Account registered and used by the suite. Generated once per run; the
/// email embeds a timestamp so reruns never collide with existing users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    name: String,
    email: String,
    #[serde(skip_serializing)]
    password: String,
}

impl Credentials {
    pub fn generate(config: &FixtureConfig) -> Self {
        Self::with_token(config, Utc::now().timestamp_millis())
    }

    pub fn with_token(config: &FixtureConfig, token: i64) -> Self {
        Self {
            name: config.name.clone(),
            email: format!(
                "{}_{}@{}",
                config.email_prefix, token, config.email_domain
            ),
            password: config.password.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}
