use dictdoc_types::AppEvent;

use crate::context::AppContext;
use crate::modal::LookupTicket;

/// Run the lookup in the background and post the result back.
///
/// Nothing cancels it; the overlay drops the answer if it is stale by then.
pub fn handle_selection(ctx: &AppContext, ticket: LookupTicket) {
    let dictionary = ctx.dictionary.clone();
    let event_tx = ctx.event_tx.clone();

    tokio::spawn(async move {
        let LookupTicket { generation, word } = ticket;

        let lookup = tokio::spawn(async move { dictionary.lookup(&word).await });
        let result = lookup.await.map_err(|e| e.to_string());

        if let Err(e) = event_tx
            .send(AppEvent::LookupResolved { generation, result })
            .await
        {
            tracing::debug!("Lookup {} finished after shutdown: {}", generation, e);
        }
    });
}
