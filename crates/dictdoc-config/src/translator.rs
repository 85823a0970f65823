use dictdoc_types::TRANSLATION_FALLBACK;
use serde::{Deserialize, Serialize};

fn default_api_url() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}

fn default_from_lang() -> String {
    "en".to_string()
}

fn default_to_lang() -> String {
    "hi".to_string()
}

fn default_fallback_text() -> String {
    TRANSLATION_FALLBACK.to_string()
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TranslatorConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_from_lang")]
    pub from_lang: String,
    #[serde(default = "default_to_lang")]
    pub to_lang: String,
    /// Substituted when the translation cannot be fetched
    #[serde(default = "default_fallback_text")]
    pub fallback_text: String,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            from_lang: default_from_lang(),
            to_lang: default_to_lang(),
            fallback_text: default_fallback_text(),
        }
    }
}

impl TranslatorConfig {
    pub(crate) fn apply_env(&mut self) {
        if let Some(url) = crate::env_string("DICTDOC_TRANSLATE_URL") {
            self.api_url = url;
        }
    }
}
