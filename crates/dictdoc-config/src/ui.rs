use serde::{Deserialize, Serialize};

fn default_banner_ms() -> u64 {
    3000
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct UiConfig {
    /// How long save banners stay visible
    #[serde(default = "default_banner_ms")]
    pub banner_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            banner_ms: default_banner_ms(),
        }
    }
}

impl UiConfig {
    pub(crate) fn apply_env(&mut self) {
        if let Some(ms) = crate::env_parse("DICTDOC_BANNER_MS") {
            self.banner_ms = ms;
        }
    }
}
