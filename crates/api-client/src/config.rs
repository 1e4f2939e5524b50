//! Configuration for the Carebase API client
//!
//! Supports environment-based configuration with sensible defaults. A
//! configuration is read once at construction and stays immutable for the
//! lifetime of a client.

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default production API URL
const DEFAULT_API_URL: &str = "https://api.carebase.health/v1";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Environment types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development (typically a localhost backend)
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

impl Default for Environment {
    fn default() -> Self {
        Self::Production
    }
}

impl Environment {
    /// Parse from the `CAREBASE_ENV` environment variable
    pub fn from_env() -> Self {
        match env::var("CAREBASE_ENV")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "development" | "dev" | "local" => Self::Development,
            "staging" | "stage" => Self::Staging,
            _ => Self::Production,
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL the adapter resolves relative endpoints against
    pub base_url: String,
    /// Default request timeout (overridable per call)
    #[serde(with = "millis_serde")]
    pub timeout: Duration,
    /// Current environment
    pub environment: Environment,
}

mod millis_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        u64::try_from(duration.as_millis())
            .unwrap_or(u64::MAX)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            environment: Environment::default(),
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `CAREBASE_API_URL`: Base URL for the records backend
    /// - `CAREBASE_ENV`: Environment (development/staging/production)
    /// - `CAREBASE_TIMEOUT_MS`: Request timeout in milliseconds
    pub fn from_env() -> ApiResult<Self> {
        let environment = Environment::from_env();

        let base_url =
            env::var("CAREBASE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let timeout = env::var("CAREBASE_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map_or(DEFAULT_TIMEOUT, Duration::from_millis);

        let config = Self {
            base_url,
            timeout,
            environment,
        };
        config.validate()?;
        Ok(config)
    }

    /// Create development configuration (local backend)
    #[must_use]
    pub fn development() -> Self {
        Self {
            base_url: "http://localhost:9000".to_string(),
            timeout: Duration::from_millis(10_000),
            environment: Environment::Development,
        }
    }

    /// Builder-style method to set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder-style method to set the default timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set the environment
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.base_url.is_empty() {
            return Err(ApiError::config("base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::config(
                "base_url must start with http:// or https://",
            ));
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        Ok(())
    }
}
