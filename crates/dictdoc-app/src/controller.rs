use std::sync::Arc;
use std::time::Duration;

use dictdoc_dictionary::DictionaryClient;
use dictdoc_types::AppEvent;
use kanal::{AsyncReceiver, AsyncSender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;
use crate::events::event_loop;
use crate::io::{tick_loop, watcher_io};
use crate::modal::ModalView;
use crate::service::{SaveEnvelope, SaveService};
use crate::state::AppState;
use crate::ui::ui_loop;

const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Centralized channel management
pub struct ChannelSet {
    pub ui_to_app: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    pub app_to_ui: (AsyncSender<ModalView>, AsyncReceiver<ModalView>),
    /// Overlay to save service
    pub host: (AsyncSender<SaveEnvelope>, AsyncReceiver<SaveEnvelope>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            ui_to_app: kanal::bounded_async(64),
            app_to_ui: kanal::bounded_async(16),
            host: kanal::bounded_async(8),
        }
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            channels: ChannelSet::new(),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn context(&self, dictionary: Arc<DictionaryClient>) -> AppContext {
        AppContext {
            state: self.state.clone(),
            dictionary,
            event_tx: self.channels.ui_to_app.0.clone(),
            host_tx: self.channels.host.0.clone(),
            cancel: self.cancel_token.clone(),
        }
    }

    /// Overlay loop, save service and the banner ticker
    pub fn spawn_core(
        &self,
        dictionary: Arc<DictionaryClient>,
        service: Arc<SaveService>,
    ) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        tasks.spawn(event_loop(
            self.context(dictionary),
            self.channels.ui_to_app.1.clone(),
            self.channels.app_to_ui.0.clone(),
        ));

        tasks.spawn(service.run(
            self.channels.host.1.clone(),
            self.cancel_token.child_token(),
        ));

        tasks.spawn(tick_loop(
            TICK_INTERVAL,
            self.cancel_token.child_token(),
            self.channels.ui_to_app.0.clone(),
        ));

        tasks
    }

    /// Core tasks plus terminal input and output
    pub fn spawn_tasks(
        &self,
        dictionary: Arc<DictionaryClient>,
        service: Arc<SaveService>,
    ) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = self.spawn_core(dictionary, service);

        tasks.spawn(ui_loop(self.channels.app_to_ui.1.clone()));

        tasks.spawn(watcher_io(
            self.cancel_token.child_token(),
            self.channels.ui_to_app.0.clone(),
        ));

        tasks
    }

    pub fn events(&self) -> AsyncSender<AppEvent> {
        self.channels.ui_to_app.0.clone()
    }

    pub fn views(&self) -> AsyncReceiver<ModalView> {
        self.channels.app_to_ui.1.clone()
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
