use std::sync::Arc;

use anyhow::Context;
use dictdoc_auth::{IdentityHost, TokenProvider};
use dictdoc_config::docs::DocsConfig;
use dictdoc_docs::{DocError, DocumentStore};
use dictdoc_types::{HostMessage, SaveResponse, TargetDocument};
use kanal::{AsyncReceiver, AsyncSender};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// One request on the host channel, with the slot its reply goes into
pub struct SaveEnvelope {
    pub id: Uuid,
    pub message: HostMessage,
    pub reply: oneshot::Sender<SaveResponse>,
}

/// Background collaborator: token, find-or-create, append
pub struct SaveService {
    tokens: TokenProvider,
    store: DocumentStore,
    document_name: String,
}

impl SaveService {
    pub fn new(tokens: TokenProvider, store: DocumentStore, document_name: String) -> Self {
        Self {
            tokens,
            store,
            document_name,
        }
    }

    pub fn from_config(config: &DocsConfig, identity: Arc<dyn IdentityHost>) -> Self {
        Self::new(
            TokenProvider::new(identity),
            DocumentStore::from_config(config),
            config.document_name.clone(),
        )
    }

    pub async fn handle(&self, message: HostMessage) -> SaveResponse {
        match message {
            HostMessage::SaveToGoogleDocs { content, word } => {
                match self.save(&content).await {
                    Ok(document) => {
                        tracing::info!("Saved '{}' to document {}", word, document.id);
                        SaveResponse::saved(document.id)
                    }
                    Err(e) => {
                        tracing::error!("Error saving '{}' to Google Docs: {:#}", word, e);
                        SaveResponse::failed(format!("{e:#}"))
                    }
                }
            }
        }
    }

    async fn save(&self, content: &str) -> anyhow::Result<TargetDocument> {
        let token = self
            .tokens
            .get_token(true)
            .await
            .context("Authentication failed")?;

        let saved =
            dictdoc_docs::save_entry(&self.store, &token, &self.document_name, content).await;

        // The next click asks the host for a fresh token
        if let Err(DocError::Unauthorized(_)) = &saved {
            self.tokens.invalidate().await;
        }

        saved.context("Failed to save entry")
    }

    /// Serve save requests until cancelled or every sender is gone
    pub async fn run(
        self: Arc<Self>,
        host_rx: AsyncReceiver<SaveEnvelope>,
        cancel: CancellationToken,
    ) -> anyhow::Result<()> {
        tracing::info!("Save service started for '{}'", self.document_name);

        loop {
            let envelope = tokio::select! {
                received = host_rx.recv() => match received {
                    Ok(envelope) => envelope,
                    Err(_) => break,
                },
                _ = cancel.cancelled() => break,
            };

            tracing::debug!("Save request {} received", envelope.id);

            let response = tokio::select! {
                response = self.handle(envelope.message) => response,
                _ = cancel.cancelled() => {
                    tracing::warn!("Save request {} abandoned on shutdown", envelope.id);
                    break;
                }
            };

            if envelope.reply.send(response).is_err() {
                tracing::debug!("Save request {} has no listener anymore", envelope.id);
            }
        }

        tracing::info!("Save service stopping");
        Ok(())
    }
}

/// Send one message to the save service and wait for its reply.
///
/// Transport failures are reported as a failed response.
pub async fn request_save(host_tx: &AsyncSender<SaveEnvelope>, message: HostMessage) -> SaveResponse {
    let (reply, response) = oneshot::channel();
    let envelope = SaveEnvelope {
        id: Uuid::new_v4(),
        message,
        reply,
    };

    if let Err(e) = host_tx.send(envelope).await {
        tracing::error!("Save service unavailable: {}", e);
        return SaveResponse::failed("Save service unavailable");
    }

    response
        .await
        .unwrap_or_else(|_| SaveResponse::failed("Save service dropped the request"))
}
