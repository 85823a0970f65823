use std::sync::Arc;

use dictdoc_dictionary::DictionaryClient;
use dictdoc_types::AppEvent;
use kanal::AsyncSender;
use tokio_util::sync::CancellationToken;

use crate::service::SaveEnvelope;
use crate::state::AppState;

/// Shared handles the event handlers need
#[derive(Clone)]
pub struct AppContext {
    pub state: Arc<AppState>,
    pub dictionary: Arc<DictionaryClient>,
    /// Back into the event loop, used by spawned lookups and saves
    pub event_tx: AsyncSender<AppEvent>,
    pub host_tx: AsyncSender<SaveEnvelope>,
    pub cancel: CancellationToken,
}
