use crate::provider::TokenProvider;

/// Connection state shown by the status surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    Connected,
    NotConnected,
    Failed(String),
}

impl AuthStatus {
    /// Silent check, never prompts
    pub async fn check(provider: &TokenProvider) -> Self {
        match provider.get_token(false).await {
            Ok(_) => AuthStatus::Connected,
            Err(e) => {
                tracing::debug!("Error checking auth status: {}", e);
                AuthStatus::NotConnected
            }
        }
    }

    /// Interactive connect
    pub async fn connect(provider: &TokenProvider) -> Self {
        match provider.get_token(true).await {
            Ok(_) => AuthStatus::Connected,
            Err(e) => {
                tracing::error!("Authentication error: {}", e);
                AuthStatus::Failed("Connection failed".to_string())
            }
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            AuthStatus::Connected => "✓ Connected to Google Docs",
            AuthStatus::NotConnected | AuthStatus::Failed(_) => "Connect Google Docs",
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            AuthStatus::Connected => "Ready to save words",
            AuthStatus::NotConnected => "Not connected",
            AuthStatus::Failed(message) => message,
        }
    }
}
