use serde::{Deserialize, Serialize};

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// OAuth grant material. Everything is optional, a missing grant
/// just means saving will fail until one is provided.
#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    #[serde(default = "default_token_url")]
    pub token_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            refresh_token: None,
            client_id: None,
            client_secret: None,
            token_url: default_token_url(),
        }
    }
}

impl AuthConfig {
    pub(crate) fn apply_env(&mut self) {
        if let Some(token) = crate::env_string("DICTDOC_ACCESS_TOKEN") {
            self.access_token = Some(token);
        }
        if let Some(token) = crate::env_string("DICTDOC_REFRESH_TOKEN") {
            self.refresh_token = Some(token);
        }
        if let Some(id) = crate::env_string("DICTDOC_CLIENT_ID") {
            self.client_id = Some(id);
        }
        if let Some(secret) = crate::env_string("DICTDOC_CLIENT_SECRET") {
            self.client_secret = Some(secret);
        }
        if let Some(url) = crate::env_string("DICTDOC_TOKEN_URL") {
            self.token_url = url;
        }
    }
}
