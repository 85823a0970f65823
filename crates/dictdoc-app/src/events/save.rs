use dictdoc_types::{AppEvent, HostMessage, SaveResponse};

use crate::context::AppContext;
use crate::service::request_save;

/// Hand the message to the save service and report the outcome to the overlay
pub fn handle_save(ctx: &AppContext, message: HostMessage) {
    let host_tx = ctx.host_tx.clone();
    let event_tx = ctx.event_tx.clone();
    let cancel = ctx.cancel.child_token();

    tokio::spawn(async move {
        let response = tokio::select! {
            response = request_save(&host_tx, message) => response,
            _ = cancel.cancelled() => SaveResponse::failed("Cancelled"),
        };

        if !response.success {
            tracing::warn!(
                "Save failed: {}",
                response.error.as_deref().unwrap_or("unknown error")
            );
        }

        if let Err(e) = event_tx.send(AppEvent::SaveFinished(response)).await {
            tracing::debug!("Save finished after shutdown: {}", e);
        }
    });
}
