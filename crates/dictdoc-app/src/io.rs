use std::time::Duration;

use dictdoc_types::{AppEvent, Key, SelectionEvent};
use kanal::AsyncSender;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

pub const HELP_TEXT: &str =
    "Type a word to look it up. Commands: :save  :close  :backdrop  :esc  :key <name>  :quit";

/// Map one line of terminal input to an overlay event
pub fn parse_input(line: &str) -> Option<AppEvent> {
    match line.trim() {
        ":save" | ":s" => Some(AppEvent::SaveClicked),
        ":close" | ":c" => Some(AppEvent::CloseClicked),
        ":backdrop" => Some(AppEvent::BackdropClicked),
        ":esc" | ":escape" => Some(AppEvent::KeyPressed(Key::Escape)),
        ":quit" | ":q" => Some(AppEvent::Quit),
        text if text.starts_with(":key ") => {
            Some(AppEvent::KeyPressed(Key::from_name(&text[":key ".len()..])))
        }
        text => SelectionEvent::from_selection(text).map(AppEvent::Selection),
    }
}

/// Treat every stdin line as a selection or a command
pub async fn watcher_io(
    cancel: CancellationToken,
    event_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    if atty::is(atty::Stream::Stdin) {
        eprintln!("{HELP_TEXT}");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = cancel.cancelled() => {
                tracing::info!("Input watcher stopping");
                return Ok(());
            }
        };

        let Some(line) = line else {
            tracing::info!("Input closed");
            event_tx.send(AppEvent::Quit).await?;
            return Ok(());
        };

        if let Some(event) = parse_input(&line) {
            event_tx.send(event).await?;
        }
    }
}

/// Periodic tick so save banners expire on time
pub async fn tick_loop(
    interval: Duration,
    cancel: CancellationToken,
    event_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if event_tx.send(AppEvent::Tick).await.is_err() {
                    break;
                }
            }
            _ = cancel.cancelled() => break,
        }
    }

    Ok(())
}
