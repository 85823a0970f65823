use std::time::{Duration, Instant};

use dictdoc_config::auth::AuthConfig;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::host::{HostError, IdentityHost};

/// Exchanged tokens are treated as expired this long before Google says so
const EXPIRY_SKEW: Duration = Duration::from_secs(60);

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
    error_description: Option<String>,
}

struct RefreshGrant {
    refresh_token: String,
    client_id: String,
    client_secret: String,
}

struct CachedToken {
    token: String,
    /// `None` for a configured token, which never expires on our side
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.expires_at.is_none_or(|at| Instant::now() < at)
    }
}

/// Identity host backed by configured OAuth material.
///
/// A configured access token is used as-is. Otherwise a refresh grant is
/// exchanged at the token endpoint and the result cached until shortly
/// before its `expires_in`, or until a service refuses it.
pub struct OAuthIdentity {
    client: reqwest::Client,
    token_url: String,
    grant: Option<RefreshGrant>,
    cached: RwLock<Option<CachedToken>>,
}

impl OAuthIdentity {
    pub fn new(config: &AuthConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &AuthConfig) -> Self {
        let grant = match (&config.refresh_token, &config.client_id, &config.client_secret) {
            (Some(refresh_token), Some(client_id), Some(client_secret)) => Some(RefreshGrant {
                refresh_token: refresh_token.clone(),
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
            }),
            _ => None,
        };

        let cached = config.access_token.clone().map(|token| CachedToken {
            token,
            expires_at: None,
        });

        Self {
            client,
            token_url: config.token_url.clone(),
            grant,
            cached: RwLock::new(cached),
        }
    }

    async fn exchange(&self, grant: &RefreshGrant) -> Result<CachedToken, HostError> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", grant.refresh_token.as_str()),
            ("client_id", grant.client_id.as_str()),
            ("client_secret", grant.client_secret.as_str()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        let Ok(body) = serde_json::from_str::<TokenResponse>(&text) else {
            return Err(HostError::Rejected(if status.is_success() {
                "Token endpoint returned an unreadable response".to_string()
            } else {
                format!("Token endpoint returned HTTP {status}")
            }));
        };

        if let Some(error) = body.error {
            let description = body.error_description.unwrap_or_default();
            return Err(HostError::Rejected(
                format!("{} {}", error, description).trim().to_string(),
            ));
        }

        if !status.is_success() {
            return Err(HostError::Rejected(format!("Token endpoint returned HTTP {status}")));
        }

        let token = body
            .access_token
            .ok_or_else(|| HostError::Rejected("Token endpoint returned no access_token".into()))?;

        let expires_at = body
            .expires_in
            .map(|secs| Instant::now() + Duration::from_secs(secs).saturating_sub(EXPIRY_SKEW));

        Ok(CachedToken { token, expires_at })
    }
}

#[async_trait::async_trait]
impl IdentityHost for OAuthIdentity {
    async fn request_token(&self, interactive: bool) -> Result<String, HostError> {
        if let Some(cached) = self.cached.read().await.as_ref() {
            if cached.is_fresh() {
                return Ok(cached.token.clone());
            }
        }

        let Some(grant) = &self.grant else {
            if interactive {
                tracing::warn!(
                    "Interactive sign-in requested but no grant is configured; \
                     set DICTDOC_ACCESS_TOKEN or DICTDOC_REFRESH_TOKEN"
                );
            }
            return Err(HostError::NoGrant);
        };

        tracing::debug!("Exchanging refresh token at {}", self.token_url);
        let fresh = self.exchange(grant).await?;
        let token = fresh.token.clone();
        *self.cached.write().await = Some(fresh);

        Ok(token)
    }

    async fn invalidate(&self) {
        // Without a grant there is nothing to replace the configured token with
        if self.grant.is_some() {
            tracing::info!("Dropping cached access token");
            *self.cached.write().await = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::extract::State;
    use axum::routing::post;
    use axum::{Form, Json, Router};
    use serde_json::json;

    use super::*;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn grant_config(token_url: String) -> AuthConfig {
        AuthConfig {
            refresh_token: Some("refresh".to_string()),
            client_id: Some("client".to_string()),
            client_secret: Some("secret".to_string()),
            token_url,
            ..AuthConfig::default()
        }
    }

    #[tokio::test]
    async fn test_configured_access_token_is_used() {
        let config = AuthConfig {
            access_token: Some("ya29.static".to_string()),
            ..AuthConfig::default()
        };
        let identity = OAuthIdentity::new(&config);

        assert_eq!(identity.request_token(false).await.unwrap(), "ya29.static");
    }

    #[tokio::test]
    async fn test_no_grant() {
        let identity = OAuthIdentity::new(&AuthConfig::default());

        assert!(matches!(
            identity.request_token(false).await,
            Err(HostError::NoGrant)
        ));
        assert!(matches!(
            identity.request_token(true).await,
            Err(HostError::NoGrant)
        ));
    }

    #[tokio::test]
    async fn test_refresh_grant_is_exchanged_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/token",
                post(
                    |State(calls): State<Arc<AtomicUsize>>,
                     Form(form): Form<HashMap<String, String>>| async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        assert_eq!(form.get("grant_type").map(String::as_str), Some("refresh_token"));
                        assert_eq!(form.get("refresh_token").map(String::as_str), Some("refresh"));
                        Json(json!({ "access_token": "ya29.fresh", "expires_in": 3599 }))
                    },
                ),
            )
            .with_state(calls.clone());
        let base = serve(router).await;
        let identity = OAuthIdentity::new(&grant_config(format!("{base}/token")));

        assert_eq!(identity.request_token(false).await.unwrap(), "ya29.fresh");
        assert_eq!(identity.request_token(true).await.unwrap(), "ya29.fresh");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_token_endpoint_error_is_rejected() {
        let router = Router::new().route(
            "/token",
            post(|| async {
                (
                    axum::http::StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_grant",
                        "error_description": "Token has been expired or revoked."
                    })),
                )
            }),
        );
        let base = serve(router).await;
        let identity = OAuthIdentity::new(&grant_config(format!("{base}/token")));

        match identity.request_token(true).await {
            Err(HostError::Rejected(message)) => {
                assert_eq!(message, "invalid_grant Token has been expired or revoked.")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    fn counting_token_endpoint(calls: Arc<AtomicUsize>, expires_in: u64) -> Router {
        Router::new()
            .route(
                "/token",
                post(move |State(calls): State<Arc<AtomicUsize>>| async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "access_token": format!("tok-{n}"), "expires_in": expires_in }))
                }),
            )
            .with_state(calls)
    }

    #[tokio::test]
    async fn test_expired_token_is_exchanged_again() {
        let calls = Arc::new(AtomicUsize::new(0));
        let base = serve(counting_token_endpoint(calls.clone(), 1)).await;
        let identity = OAuthIdentity::new(&grant_config(format!("{base}/token")));

        // One second of lifetime is already inside the expiry margin
        assert_eq!(identity.request_token(false).await.unwrap(), "tok-0");
        assert_eq!(identity.request_token(false).await.unwrap(), "tok-1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_new_exchange() {
        let calls = Arc::new(AtomicUsize::new(0));
        let base = serve(counting_token_endpoint(calls.clone(), 3599)).await;
        let identity = OAuthIdentity::new(&AuthConfig {
            access_token: Some("ya29.revoked".to_string()),
            ..grant_config(format!("{base}/token"))
        });

        assert_eq!(identity.request_token(false).await.unwrap(), "ya29.revoked");
        identity.invalidate().await;
        assert_eq!(identity.request_token(false).await.unwrap(), "tok-0");
        assert_eq!(identity.request_token(false).await.unwrap(), "tok-0");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_keeps_configured_token_without_grant() {
        let identity = OAuthIdentity::new(&AuthConfig {
            access_token: Some("ya29.static".to_string()),
            ..AuthConfig::default()
        });

        identity.invalidate().await;
        assert_eq!(identity.request_token(false).await.unwrap(), "ya29.static");
    }

    #[tokio::test]
    async fn test_non_json_error_page_is_rejected() {
        let router = Router::new().route(
            "/token",
            post(|| async {
                (
                    axum::http::StatusCode::SERVICE_UNAVAILABLE,
                    "<html>Service Unavailable</html>",
                )
            }),
        );
        let base = serve(router).await;
        let identity = OAuthIdentity::new(&grant_config(format!("{base}/token")));

        match identity.request_token(true).await {
            Err(HostError::Rejected(message)) => {
                assert_eq!(message, "Token endpoint returned HTTP 503 Service Unavailable")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
