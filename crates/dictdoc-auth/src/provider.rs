use std::fmt;
use std::sync::Arc;

use crate::host::{HostError, IdentityHost};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("No token available without prompting")]
    NoSilentToken,

    #[error("Identity host rejected the request: {0}")]
    HostRejected(String),
}

/// Opaque bearer credential
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

#[derive(Clone)]
pub struct TokenProvider {
    host: Arc<dyn IdentityHost>,
}

impl TokenProvider {
    pub fn new(host: Arc<dyn IdentityHost>) -> Self {
        Self { host }
    }

    /// Fetch a token from the identity host. Nothing is cached here.
    pub async fn get_token(&self, interactive: bool) -> Result<AuthToken, AuthError> {
        match self.host.request_token(interactive).await {
            Ok(token) if token.trim().is_empty() => {
                Err(AuthError::HostRejected("Authentication failed".to_string()))
            }
            Ok(token) => Ok(AuthToken::new(token)),
            Err(HostError::NoGrant) if !interactive => Err(AuthError::NoSilentToken),
            Err(e) => {
                tracing::debug!("Identity host error (interactive: {}): {}", interactive, e);
                Err(AuthError::HostRejected(e.to_string()))
            }
        }
    }

    /// Drop whatever the host cached after a service answered 401
    pub async fn invalidate(&self) {
        self.host.invalidate().await;
    }
}
