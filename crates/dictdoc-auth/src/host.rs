/// The environment's identity subsystem.
///
/// Implementations own whatever grant caching they do; callers re-request
/// a token for every operation.
#[async_trait::async_trait]
pub trait IdentityHost: Send + Sync {
    /// Request a bearer token. With `interactive` set the host may prompt the user.
    async fn request_token(&self, interactive: bool) -> Result<String, HostError>;

    /// Forget a token the remote service refused, so the next request fetches a new one.
    async fn invalidate(&self) {}
}

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("No OAuth grant available")]
    NoGrant,

    #[error("{0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}
