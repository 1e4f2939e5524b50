//! Credential sources for bearer authentication
//!
//! The transport never stores a token itself; it asks a [`CredentialProvider`]
//! at the start of every request and uses that snapshot for the whole call. A
//! token refreshed elsewhere mid-request is not observed until the next call.

use std::env;
use std::sync::Arc;

/// Supplies the bearer token attached to outgoing requests
pub trait CredentialProvider: Send + Sync {
    /// Current token, or `None` when no credential is available
    fn token(&self) -> Option<String>;
}

/// A fixed token, handy for service accounts and tests
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wrap a token string
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CredentialProvider for StaticToken {
    fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// No credential; requests go out unauthenticated
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn token(&self) -> Option<String> {
        None
    }
}

/// Reads the token from an environment variable on every request
///
/// Defaults to `CAREBASE_API_TOKEN`. Unlike [`StaticToken`] this observes
/// external refreshes between calls.
#[derive(Debug, Clone)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    /// Read from `CAREBASE_API_TOKEN`
    #[must_use]
    pub fn standard() -> Self {
        Self {
            var: "CAREBASE_API_TOKEN".to_string(),
        }
    }

    /// Read from a specific environment variable
    pub fn var(name: impl Into<String>) -> Self {
        Self { var: name.into() }
    }
}

impl CredentialProvider for EnvToken {
    fn token(&self) -> Option<String> {
        env::var(&self.var).ok().filter(|t| !t.is_empty())
    }
}

impl<P: CredentialProvider + ?Sized> CredentialProvider for Arc<P> {
    fn token(&self) -> Option<String> {
        (**self).token()
    }
}
