mod client;
mod template;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use client::{DocError, DocumentStore};
pub use template::SaveTemplate;

use dictdoc_auth::AuthToken;
use dictdoc_types::TargetDocument;

/// Append a formatted entry to the named document, creating it if needed
pub async fn save_entry(
    store: &DocumentStore,
    token: &AuthToken,
    document_name: &str,
    content: &str,
) -> Result<TargetDocument, DocError> {
    let document = store.find_or_create(token, document_name).await?;
    store.append(token, &document.id, content).await?;
    Ok(document)
}
