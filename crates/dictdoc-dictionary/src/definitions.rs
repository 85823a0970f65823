use dictdoc_types::DefinitionEntry;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum DefinitionsError {
    #[error("Invalid definitions URL: {0}")]
    InvalidUrl(String),

    #[error("Word not found")]
    NotFound,

    #[error("API error: HTTP {0}")]
    Status(StatusCode),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
pub(crate) struct Entry {
    #[serde(default)]
    pub meanings: Vec<Meaning>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Meaning {
    #[serde(rename = "partOfSpeech", default)]
    pub part_of_speech: String,
    #[serde(default)]
    pub definitions: Vec<Sense>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Sense {
    pub definition: String,
    #[serde(default)]
    pub example: Option<String>,
}

/// Client for a `dictionaryapi.dev` compatible endpoint
#[derive(Clone)]
pub struct DefinitionsClient {
    client: reqwest::Client,
    base_url: String,
    language: String,
}

impl DefinitionsClient {
    pub fn new(client: reqwest::Client, base_url: String, language: String) -> Self {
        Self {
            client,
            base_url,
            language,
        }
    }

    /// Fetch at most `limit` definitions for `word`, in the order the API lists them.
    ///
    /// An empty response array or a first entry without meanings yields an empty list.
    pub async fn fetch(
        &self,
        word: &str,
        limit: usize,
    ) -> Result<Vec<DefinitionEntry>, DefinitionsError> {
        let url = self.entry_url(word)?;
        tracing::debug!("Fetching definitions from {}", url);

        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(DefinitionsError::NotFound);
        }

        if !response.status().is_success() {
            return Err(DefinitionsError::Status(response.status()));
        }

        let entries: Vec<Entry> = response.json().await?;

        Ok(entries
            .first()
            .map(|entry| flatten_definitions(entry, limit))
            .unwrap_or_default())
    }

    fn entry_url(&self, word: &str) -> Result<Url, DefinitionsError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| DefinitionsError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| DefinitionsError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["entries", self.language.as_str(), word]);

        Ok(url)
    }
}

/// Flatten every meaning group's definitions into one list, keeping source order
pub(crate) fn flatten_definitions(entry: &Entry, limit: usize) -> Vec<DefinitionEntry> {
    entry
        .meanings
        .iter()
        .flat_map(|meaning| {
            meaning.definitions.iter().map(|sense| DefinitionEntry {
                part_of_speech: meaning.part_of_speech.clone(),
                definition: sense.definition.clone(),
                example: sense.example.clone().filter(|e| !e.trim().is_empty()),
            })
        })
        .take(limit)
        .collect()
}
