pub mod message;
pub mod types;

pub use message::{HostMessage, SaveReceipt, SaveResponse};
pub use types::{
    AppEvent, DefinitionEntry, Key, LookupResult, MAX_DEFINITIONS, SelectionEvent,
    TRANSLATION_FALLBACK, TargetDocument,
};
