use dictdoc_types::MAX_DEFINITIONS;
use serde::{Deserialize, Serialize};

fn default_definitions_url() -> String {
    "https://api.dictionaryapi.dev/api/v2".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_max_definitions() -> usize {
    MAX_DEFINITIONS
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DictionaryConfig {
    /// Base URL, `/entries/{language}/{word}` is appended
    #[serde(default = "default_definitions_url")]
    pub definitions_url: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_max_definitions")]
    pub max_definitions: usize,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            definitions_url: default_definitions_url(),
            language: default_language(),
            max_definitions: default_max_definitions(),
        }
    }
}

impl DictionaryConfig {
    pub(crate) fn apply_env(&mut self) {
        if let Some(url) = crate::env_string("DICTDOC_DEFINITIONS_URL") {
            self.definitions_url = url;
        }
    }
}
