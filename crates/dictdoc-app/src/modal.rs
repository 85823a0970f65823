use std::time::{Duration, Instant};

use dictdoc_docs::SaveTemplate;
use dictdoc_types::{DefinitionEntry, HostMessage, Key, LookupResult, SaveResponse, SelectionEvent};

pub const NOT_FOUND_TEXT: &str = "Sorry, couldn't find the meaning for this word.";
pub const NO_ENGLISH_TEXT: &str = "English meaning not available";
pub const SAVE_SUCCESS_TEXT: &str = "✓ Saved to Google Docs successfully!";
pub const SAVE_FAILURE_TEXT: &str = "✗ Failed to save to Google Docs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Hidden,
    Loading,
    Shown,
    Error,
    Saving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
    expires_at: Instant,
}

/// Everything the overlay displays, held as plain text fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalView {
    pub visible: bool,
    pub selected_word: String,
    pub loading: bool,
    pub saving: bool,
    pub english_meaning: String,
    pub hindi_meaning: String,
    pub error_message: Option<String>,
    pub banner: Option<Banner>,
}

/// Identifies one lookup so late answers can be told apart from current ones
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub generation: u64,
    pub word: String,
}

/// The lookup overlay.
///
/// `Hidden -> Loading -> Shown | Error -> Hidden`, with `Shown | Error -> Saving`
/// returning to where it came from once the save completes. All state is
/// owned here; the event loop drives it and performs the I/O.
pub struct LookupModal {
    phase: Phase,
    resume: Phase,
    generation: u64,
    word: String,
    result: Option<LookupResult>,
    view: ModalView,
    banner_duration: Duration,
    template: SaveTemplate,
}

impl LookupModal {
    pub fn new(banner_duration: Duration, template: SaveTemplate) -> Self {
        Self {
            phase: Phase::Hidden,
            resume: Phase::Shown,
            generation: 0,
            word: String::new(),
            result: None,
            view: ModalView::default(),
            banner_duration,
            template,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn view(&self) -> &ModalView {
        &self.view
    }

    pub fn result(&self) -> Option<&LookupResult> {
        self.result.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.phase != Phase::Hidden
    }

    /// New selection: show the overlay in its loading state.
    ///
    /// Any lookup still in flight becomes stale.
    pub fn open(&mut self, selection: SelectionEvent) -> LookupTicket {
        self.generation += 1;
        self.phase = Phase::Loading;
        self.word = selection.text;
        self.result = None;

        self.view.visible = true;
        self.view.selected_word = self.word.clone();
        self.view.loading = true;
        self.view.saving = false;
        self.view.english_meaning.clear();
        self.view.hindi_meaning.clear();
        self.view.error_message = None;

        LookupTicket {
            generation: self.generation,
            word: self.word.clone(),
        }
    }

    /// Apply a finished lookup. Returns false when the answer is stale.
    pub fn resolve(&mut self, generation: u64, result: Result<LookupResult, String>) -> bool {
        if generation != self.generation || self.phase != Phase::Loading {
            tracing::debug!(
                "Dropping stale lookup (generation {}, current {})",
                generation,
                self.generation
            );
            return false;
        }

        self.view.loading = false;

        match result {
            Ok(result) => {
                self.view.english_meaning = english_text(&result.definitions);
                self.view.hindi_meaning = result.translation.clone();
                self.view.error_message = None;
                self.result = Some(result);
                self.phase = Phase::Shown;
            }
            Err(e) => {
                tracing::error!("Error looking up word '{}': {}", self.word, e);
                self.view.english_meaning.clear();
                self.view.hindi_meaning.clear();
                self.view.error_message = Some(NOT_FOUND_TEXT.to_string());
                self.phase = Phase::Error;
            }
        }

        true
    }

    /// Backdrop click or close button. Does not cancel outstanding requests.
    pub fn close(&mut self) -> bool {
        if self.phase == Phase::Hidden {
            return false;
        }

        // Late lookups for the closed overlay must not repopulate it
        self.generation += 1;
        self.phase = Phase::Hidden;
        self.view.visible = false;
        self.view.loading = false;
        self.view.saving = false;
        self.view.english_meaning.clear();
        self.view.hindi_meaning.clear();
        self.view.error_message = None;

        true
    }

    pub fn key(&mut self, key: Key) -> bool {
        match key {
            Key::Escape if self.is_visible() => self.close(),
            _ => false,
        }
    }

    /// Build the save request from what is currently displayed.
    ///
    /// Only `Shown` and `Error` can start a save; one save runs at a time.
    pub fn begin_save(&mut self) -> Option<HostMessage> {
        if !matches!(self.phase, Phase::Shown | Phase::Error) {
            return None;
        }

        self.resume = self.phase;
        self.phase = Phase::Saving;
        self.view.saving = true;

        let content = self.template.format(
            &self.word,
            &self.view.english_meaning,
            &self.view.hindi_meaning,
        );

        Some(HostMessage::SaveToGoogleDocs {
            content,
            word: self.word.clone(),
        })
    }

    /// Show the outcome banner. The overlay only leaves `Saving` if nothing
    /// else happened in the meantime.
    pub fn finish_save(&mut self, response: &SaveResponse, now: Instant) {
        let (kind, text) = if response.success {
            (BannerKind::Success, SAVE_SUCCESS_TEXT)
        } else {
            (BannerKind::Failure, SAVE_FAILURE_TEXT)
        };

        self.view.banner = Some(Banner {
            kind,
            text: text.to_string(),
            expires_at: now + self.banner_duration,
        });

        if self.phase == Phase::Saving {
            self.phase = self.resume;
            self.view.saving = false;
        }
    }

    /// Expire the banner. Returns true if the view changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match &self.view.banner {
            Some(banner) if now >= banner.expires_at => {
                self.view.banner = None;
                true
            }
            _ => false,
        }
    }
}

/// Plain-text rendering of the English definitions
pub fn english_text(definitions: &[DefinitionEntry]) -> String {
    if definitions.is_empty() {
        return NO_ENGLISH_TEXT.to_string();
    }

    definitions
        .iter()
        .map(|entry| match &entry.example {
            Some(example) => format!(
                "{}: {}\n  Example: {}",
                entry.part_of_speech, entry.definition, example
            ),
            None => format!("{}: {}", entry.part_of_speech, entry.definition),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
