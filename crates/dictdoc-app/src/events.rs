use std::time::{Duration, Instant};

use dictdoc_docs::SaveTemplate;
use dictdoc_types::AppEvent;
use kanal::{AsyncReceiver, AsyncSender};

use crate::context::AppContext;
use crate::modal::{LookupModal, ModalView};

pub mod lookup;
pub mod save;

use lookup::handle_selection;
use save::handle_save;

/// Owns the overlay and applies every event to it in order.
///
/// Lookups and saves run as spawned tasks that post their outcome back
/// through `ctx.event_tx`, so the overlay itself is only touched here.
pub async fn event_loop(
    ctx: AppContext,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    app_to_ui_tx: AsyncSender<ModalView>,
) -> anyhow::Result<()> {
    let banner_duration = {
        let config = ctx.state.config.read().await;
        Duration::from_millis(config.ui.banner_ms)
    };
    let mut modal = LookupModal::new(banner_duration, SaveTemplate::default());

    tracing::info!("[EVENT_LOOP] Starting main loop, waiting for events");
    loop {
        let event = tokio::select! {
            event = ui_to_app_rx.recv() => event?,
            _ = ctx.cancel.cancelled() => break,
        };

        if matches!(event, AppEvent::Quit) {
            tracing::info!("[EVENT_LOOP] Quit requested");
            ctx.cancel.cancel();
            break;
        }

        if handle_event(&ctx, &mut modal, event, Instant::now()) {
            app_to_ui_tx.send(modal.view().clone()).await?;
        }
    }

    Ok(())
}

/// Apply one event. Returns true when the view changed.
pub fn handle_event(
    ctx: &AppContext,
    modal: &mut LookupModal,
    event: AppEvent,
    now: Instant,
) -> bool {
    match event {
        AppEvent::Selection(selection) => {
            tracing::debug!("Selection received: '{}'", selection.text);
            let ticket = modal.open(selection);
            handle_selection(ctx, ticket);
            true
        }
        AppEvent::LookupResolved { generation, result } => modal.resolve(generation, result),
        AppEvent::BackdropClicked | AppEvent::CloseClicked => modal.close(),
        AppEvent::KeyPressed(key) => modal.key(key),
        AppEvent::SaveClicked => match modal.begin_save() {
            Some(message) => {
                handle_save(ctx, message);
                true
            }
            None => {
                tracing::debug!("Save ignored in phase {:?}", modal.phase());
                false
            }
        },
        AppEvent::SaveFinished(response) => {
            modal.finish_save(&response, now);
            true
        }
        AppEvent::Tick => modal.tick(now),
        AppEvent::Quit => false,
    }
}
