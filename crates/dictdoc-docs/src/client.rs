use dictdoc_auth::AuthToken;
use dictdoc_config::docs::DocsConfig;
use dictdoc_types::TargetDocument;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

const DOCUMENT_MIME_TYPE: &str = "application/vnd.google-apps.document";

#[derive(Debug, thiserror::Error)]
pub enum DocError {
    #[error("Document search failed: {0}")]
    SearchFailed(String),

    #[error("Document creation failed: {0}")]
    CreateFailed(String),

    #[error("Failed to append content to document: {0}")]
    AppendFailed(String),

    /// Any endpoint answered 401, the token is no longer accepted
    #[error("Access token was rejected: {0}")]
    Unauthorized(String),
}

/// Client for the Drive file search and the Docs document endpoints
#[derive(Clone)]
pub struct DocumentStore {
    client: reqwest::Client,
    drive_url: String,
    docs_url: String,
}

impl DocumentStore {
    pub fn new(drive_url: String, docs_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), drive_url, docs_url)
    }

    pub fn with_client(client: reqwest::Client, drive_url: String, docs_url: String) -> Self {
        Self {
            client,
            drive_url: drive_url.trim_end_matches('/').to_string(),
            docs_url: docs_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &DocsConfig) -> Self {
        Self::new(config.drive_url.clone(), config.docs_url.clone())
    }

    /// Resolve the document titled `name`, creating it when none exists.
    ///
    /// When several documents share the title the first one listed wins.
    pub async fn find_or_create(
        &self,
        token: &AuthToken,
        name: &str,
    ) -> Result<TargetDocument, DocError> {
        if let Some(document) = self.find(token, name).await? {
            tracing::debug!("Found document '{}' ({})", name, document.id);
            return Ok(document);
        }

        let document = self.create(token, name).await?;
        tracing::info!("Created document '{}' ({})", name, document.id);
        Ok(document)
    }

    /// Insert `"\n" + text + "\n"` at the end of the document body.
    ///
    /// Every call appends, repeated calls produce repeated text.
    pub async fn append(
        &self,
        token: &AuthToken,
        doc_id: &str,
        text: &str,
    ) -> Result<(), DocError> {
        let index = self.end_index(token, doc_id).await?;

        let body = BatchUpdate {
            requests: vec![UpdateRequest {
                insert_text: InsertText {
                    location: Location { index },
                    text: format!("\n{text}\n"),
                },
            }],
        };

        let response = self
            .client
            .post(format!("{}/documents/{}:batchUpdate", self.docs_url, doc_id))
            .bearer_auth(token.secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| DocError::AppendFailed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(DocError::Unauthorized(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(DocError::AppendFailed(format!(
                "Failed to update document: HTTP {status}"
            )));
        }

        tracing::debug!("Appended {} bytes to {} at index {}", text.len(), doc_id, index);
        Ok(())
    }

    async fn find(
        &self,
        token: &AuthToken,
        name: &str,
    ) -> Result<Option<TargetDocument>, DocError> {
        let query = search_query(name);

        let response = self
            .client
            .get(format!("{}/files", self.drive_url))
            .query(&[("q", query.as_str())])
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| DocError::SearchFailed(e.to_string()))?;

        let list: FileList = read_json(response, DocError::SearchFailed).await?;

        Ok(list
            .files
            .into_iter()
            .next()
            .map(|file| TargetDocument { id: file.id }))
    }

    async fn create(&self, token: &AuthToken, name: &str) -> Result<TargetDocument, DocError> {
        let response = self
            .client
            .post(format!("{}/documents", self.docs_url))
            .bearer_auth(token.secret())
            .json(&json!({ "title": name }))
            .send()
            .await
            .map_err(|e| DocError::CreateFailed(e.to_string()))?;

        let created: CreatedDocument = read_json(response, DocError::CreateFailed).await?;

        Ok(TargetDocument {
            id: created.document_id,
        })
    }

    /// Insertion point just before the body's implicit trailing newline
    async fn end_index(&self, token: &AuthToken, doc_id: &str) -> Result<u64, DocError> {
        let response = self
            .client
            .get(format!("{}/documents/{}", self.docs_url, doc_id))
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| DocError::AppendFailed(e.to_string()))?;

        let document: Document = read_json(response, DocError::AppendFailed).await?;

        Ok(insertion_index(&document))
    }
}

async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    failed: fn(String) -> DocError,
) -> Result<T, DocError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(DocError::Unauthorized(format!("HTTP {status}")));
    }
    if !status.is_success() {
        return Err(failed(format!("HTTP {status}")));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| failed(format!("Failed to parse response: {e}")))
}

fn search_query(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
    format!(r#"name="{escaped}" and mimeType="{DOCUMENT_MIME_TYPE}""#)
}

fn insertion_index(document: &Document) -> u64 {
    document
        .body
        .content
        .last()
        .map(|element| element.end_index.saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileRef>,
}

#[derive(Deserialize)]
struct FileRef {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedDocument {
    document_id: String,
}

#[derive(Deserialize)]
struct Document {
    #[serde(default)]
    body: Body,
}

#[derive(Deserialize, Default)]
struct Body {
    #[serde(default)]
    content: Vec<StructuralElement>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructuralElement {
    #[serde(default)]
    end_index: u64,
}

#[derive(Serialize)]
struct BatchUpdate {
    requests: Vec<UpdateRequest>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest {
    insert_text: InsertText,
}

#[derive(Serialize)]
struct InsertText {
    location: Location,
    text: String,
}

#[derive(Serialize)]
struct Location {
    index: u64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::fake::FakeGoogle;

    fn document(value: serde_json::Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_search_query_shape() {
        assert_eq!(
            search_query("My Dictionary"),
            r#"name="My Dictionary" and mimeType="application/vnd.google-apps.document""#
        );
        assert!(search_query(r#"a"b"#).starts_with(r#"name="a\"b""#));
    }

    #[test]
    fn test_insertion_index_is_before_terminator() {
        let doc = document(json!({
            "documentId": "d",
            "body": { "content": [
                { "endIndex": 1, "sectionBreak": {} },
                { "startIndex": 1, "endIndex": 42, "paragraph": {} }
            ]}
        }));
        assert_eq!(insertion_index(&doc), 41);
    }

    #[test]
    fn test_insertion_index_of_blank_document() {
        let doc = document(json!({ "body": { "content": [{ "endIndex": 1 }] } }));
        assert_eq!(insertion_index(&doc), 1);

        let doc = document(json!({}));
        assert_eq!(insertion_index(&doc), 1);
    }

    #[test]
    fn test_batch_update_wire_shape() {
        let body = BatchUpdate {
            requests: vec![UpdateRequest {
                insert_text: InsertText {
                    location: Location { index: 7 },
                    text: "\nhi\n".to_string(),
                },
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "requests": [{ "insertText": { "location": { "index": 7 }, "text": "\nhi\n" } }] })
        );
    }

    #[tokio::test]
    async fn test_find_or_create_is_idempotent() {
        let google = FakeGoogle::start().await.unwrap();
        let store = google.store();
        let token = google.token();

        let first = store.find_or_create(&token, "My Dictionary").await.unwrap();
        let second = store.find_or_create(&token, "My Dictionary").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(google.create_calls(), 1);
        assert_eq!(google.document_count(), 1);
    }

    #[tokio::test]
    async fn test_existing_document_is_found_first_match() {
        let google = FakeGoogle::start().await.unwrap();
        let first = google.insert_document("My Dictionary", "old");
        google.insert_document("My Dictionary", "");
        google.insert_document("Other", "");

        let found = google
            .store()
            .find_or_create(&google.token(), "My Dictionary")
            .await
            .unwrap();

        assert_eq!(found.id, first);
        assert_eq!(google.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_append_is_not_idempotent() {
        let google = FakeGoogle::start().await.unwrap();
        let id = google.insert_document("My Dictionary", "");
        let store = google.store();
        let token = google.token();

        store.append(&token, &id, "Word: cat").await.unwrap();
        store.append(&token, &id, "Word: cat").await.unwrap();

        let text = google.document_text(&id).unwrap();
        assert_eq!(text.matches("Word: cat").count(), 2);
        assert_eq!(text, "\nWord: cat\n\nWord: cat\n");
    }

    #[tokio::test]
    async fn test_append_goes_after_existing_text() {
        let google = FakeGoogle::start().await.unwrap();
        let id = google.insert_document("My Dictionary", "first line");

        google
            .store()
            .append(&google.token(), &id, "second")
            .await
            .unwrap();

        assert_eq!(google.document_text(&id).unwrap(), "first line\nsecond\n");
    }

    #[tokio::test]
    async fn test_append_to_missing_document_fails() {
        let google = FakeGoogle::start().await.unwrap();

        let err = google
            .store()
            .append(&google.token(), "missing", "text")
            .await
            .unwrap_err();

        assert!(matches!(err, DocError::AppendFailed(_)));
    }

    #[tokio::test]
    async fn test_rejected_token_is_reported_as_unauthorized() {
        let google = FakeGoogle::start().await.unwrap();
        let store = google.store();
        let token = crate::fake::token("wrong");

        let err = store.find_or_create(&token, "My Dictionary").await.unwrap_err();
        assert!(matches!(err, DocError::Unauthorized(_)));
        assert_eq!(google.create_calls(), 0);

        let id = google.insert_document("My Dictionary", "");
        let err = store.append(&token, &id, "text").await.unwrap_err();
        assert!(matches!(err, DocError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_failed_create() {
        let google = FakeGoogle::start().await.unwrap();
        google.fail_creates();

        let err = google
            .store()
            .find_or_create(&google.token(), "My Dictionary")
            .await
            .unwrap_err();

        assert!(matches!(err, DocError::CreateFailed(_)));
    }
}
