use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::message::SaveResponse;

/// Definitions kept per lookup
pub const MAX_DEFINITIONS: usize = 3;

/// Shown in place of a translation that could not be fetched
pub const TRANSLATION_FALLBACK: &str = "Hindi meaning not available";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEvent {
    pub text: String,
}

impl SelectionEvent {
    /// Build an event from raw selected text.
    ///
    /// Returns `None` for selections that are empty after trimming.
    pub fn from_selection(raw: &str) -> Option<Self> {
        let text: String = raw.trim().nfc().collect();
        if text.is_empty() {
            return None;
        }

        Some(Self { text })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionEntry {
    pub part_of_speech: String,
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResult {
    pub word: String,
    pub definitions: Vec<DefinitionEntry>,
    pub translation: String,
}

impl LookupResult {
    pub fn has_translation(&self) -> bool {
        self.translation != TRANSLATION_FALLBACK
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDocument {
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

impl Key {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "escape" | "esc" => Key::Escape,
            _ => Key::Other,
        }
    }
}

/// Everything the lookup overlay reacts to
#[derive(Debug, Clone)]
pub enum AppEvent {
    Selection(SelectionEvent),
    LookupResolved {
        generation: u64,
        result: Result<LookupResult, String>,
    },
    BackdropClicked,
    CloseClicked,
    KeyPressed(Key),
    SaveClicked,
    SaveFinished(SaveResponse),
    Tick,
    Quit,
}
