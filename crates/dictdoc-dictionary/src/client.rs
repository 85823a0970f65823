use std::sync::Arc;

use dictdoc_config::dictionary::DictionaryConfig;
use dictdoc_config::translator::TranslatorConfig;
use dictdoc_translator::{GoogleTranslator, Translator};
use dictdoc_types::{DefinitionEntry, LookupResult, MAX_DEFINITIONS, TRANSLATION_FALLBACK};

use crate::definitions::DefinitionsClient;

/// Combined English definition + translation lookup.
///
/// Never fails: a failed definitions fetch degrades to an empty list and a
/// failed translation degrades to the configured fallback text. The two
/// fetches run concurrently and neither one's failure affects the other.
#[derive(Clone)]
pub struct DictionaryClient {
    definitions: DefinitionsClient,
    translator: Arc<dyn Translator>,
    from_lang: String,
    to_lang: String,
    fallback_text: String,
    max_definitions: usize,
}

impl DictionaryClient {
    pub fn new(
        definitions: DefinitionsClient,
        translator: Arc<dyn Translator>,
        dictionary: &DictionaryConfig,
        translator_config: &TranslatorConfig,
    ) -> Self {
        // Profiles can lower the cap, not lift it
        let fallback_text = match translator_config.fallback_text.trim() {
            "" => TRANSLATION_FALLBACK.to_string(),
            text => text.to_string(),
        };

        Self {
            definitions,
            translator,
            from_lang: translator_config.from_lang.clone(),
            to_lang: translator_config.to_lang.clone(),
            fallback_text,
            max_definitions: dictionary.max_definitions.min(MAX_DEFINITIONS),
        }
    }

    pub fn from_config(dictionary: &DictionaryConfig, translator: &TranslatorConfig) -> Self {
        let client = reqwest::Client::new();
        let definitions = DefinitionsClient::new(
            client.clone(),
            dictionary.definitions_url.clone(),
            dictionary.language.clone(),
        );
        let google = GoogleTranslator::with_client(client, translator.api_url.clone());

        Self::new(definitions, Arc::new(google), dictionary, translator)
    }

    pub async fn lookup(&self, word: &str) -> LookupResult {
        let (definitions, translation) =
            tokio::join!(self.english_meaning(word), self.translated_meaning(word));

        tracing::debug!(
            "Lookup '{}': {} definitions, translation '{}'",
            word,
            definitions.len(),
            translation
        );

        LookupResult {
            word: word.to_string(),
            definitions,
            translation,
        }
    }

    async fn english_meaning(&self, word: &str) -> Vec<DefinitionEntry> {
        match self.definitions.fetch(word, self.max_definitions).await {
            Ok(definitions) => definitions,
            Err(e) => {
                tracing::warn!("Error fetching English meaning for '{}': {}", word, e);
                Vec::new()
            }
        }
    }

    async fn translated_meaning(&self, word: &str) -> String {
        match self
            .translator
            .translate(word, self.from_lang.clone(), self.to_lang.clone())
            .await
        {
            Ok(translation) => translation.text,
            Err(e) => {
                tracing::warn!(
                    "Error fetching {} meaning for '{}' via {}: {}",
                    self.to_lang,
                    word,
                    self.translator.metadata().name,
                    e
                );
                self.fallback_text.clone()
            }
        }
    }
}
