use std::io::Write;

use kanal::AsyncReceiver;

use crate::modal::{BannerKind, ModalView};

/// Print each new overlay state to stdout
pub async fn ui_loop(app_to_ui_rx: AsyncReceiver<ModalView>) -> anyhow::Result<()> {
    let mut last: Option<ModalView> = None;

    while let Ok(view) = app_to_ui_rx.recv().await {
        if last.as_ref() == Some(&view) {
            continue;
        }

        print_view(&view)?;
        last = Some(view);
    }

    tracing::debug!("UI loop exiting");
    Ok(())
}

fn print_view(view: &ModalView) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", render_view(view))?;
    stdout.flush()
}

pub fn render_view(view: &ModalView) -> String {
    let mut out = Vec::new();

    if view.visible {
        out.push(format!("┌─ {}", view.selected_word));

        if view.loading {
            out.push("│ Looking up meanings...".to_string());
        } else if let Some(error) = &view.error_message {
            out.push(format!("│ {error}"));
        } else {
            out.push("│ English Meaning".to_string());
            out.extend(view.english_meaning.lines().map(|l| format!("│   {l}")));
            out.push("│ Hindi Meaning".to_string());
            out.push(format!("│   {}", view.hindi_meaning));
        }

        if view.saving {
            out.push("│ Saving to Google Docs...".to_string());
        }
    } else {
        out.push("(overlay closed)".to_string());
    }

    if let Some(banner) = &view.banner {
        let marker = match banner.kind {
            BannerKind::Success => "ok",
            BannerKind::Failure => "error",
        };
        out.push(format!("└─ [{marker}] {}", banner.text));
    } else if view.visible {
        out.push("└─".to_string());
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use dictdoc_types::{LookupResult, SaveResponse, SelectionEvent};

    use super::*;
    use crate::modal::LookupModal;

    fn modal() -> LookupModal {
        LookupModal::new(std::time::Duration::from_secs(3), Default::default())
    }

    #[test]
    fn test_render_loading() {
        let mut modal = modal();
        modal.open(SelectionEvent::from_selection("word").unwrap());

        let text = render_view(modal.view());
        assert!(text.starts_with("┌─ word"));
        assert!(text.contains("Looking up meanings..."));
    }

    #[test]
    fn test_render_meanings_and_banner() {
        let mut modal = modal();
        let ticket = modal.open(SelectionEvent::from_selection("cat").unwrap());
        modal.resolve(
            ticket.generation,
            Ok(LookupResult {
                word: "cat".to_string(),
                definitions: vec![],
                translation: "बिल्ली".to_string(),
            }),
        );
        modal.begin_save();
        modal.finish_save(&SaveResponse::saved("doc"), Instant::now());

        let text = render_view(modal.view());
        assert!(text.contains("│   English meaning not available"));
        assert!(text.contains("│   बिल्ली"));
        assert!(text.ends_with("└─ [ok] ✓ Saved to Google Docs successfully!"));
    }

    #[test]
    fn test_render_closed() {
        assert_eq!(render_view(&ModalView::default()), "(overlay closed)");
    }
}
