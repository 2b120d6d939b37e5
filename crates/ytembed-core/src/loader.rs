//! Embed API loader
//!
//! One loader serves every adapter of a process: it requests the provider's
//! bootstrap script once and holds player creation requests until the
//! provider reports that its API is loaded.
//!
//! Lifecycle: created once, shared through an `Arc`, never torn down within
//! a run. Nothing watches the script request: if the script never loads, the
//! queue is never drained and callers need their own timeout.

use crate::{
    config::{LoaderConfig, PlayerVars},
    host::{PlayerEvents, ProviderApi, RemotePlayerHandle},
    Result,
};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

/// Everything needed to construct one remote player
#[derive(Debug, Clone)]
pub struct CreationRequest {
    /// Id of the placeholder container the player replaces
    pub container_id: String,
    /// Provider content id, possibly empty
    pub content_id: String,
    pub width: u32,
    pub height: u32,
    pub player_vars: PlayerVars,
    /// Host announced to the provider
    pub origin: Option<String>,
    /// Callbacks bound to the requesting adapter
    pub events: PlayerEvents,
}

#[derive(Debug, Default)]
struct LoaderState {
    /// Latch, set at most once
    script_injected: bool,
    /// Monotone, never reverts
    api_ready: bool,
    pending: VecDeque<CreationRequest>,
}

/// Process-wide embed API loader
pub struct EmbedApiLoader {
    config: LoaderConfig,
    provider: Arc<dyn ProviderApi>,
    state: Mutex<LoaderState>,
}

impl EmbedApiLoader {
    pub fn new(config: LoaderConfig, provider: Arc<dyn ProviderApi>) -> Self {
        Self {
            config,
            provider,
            state: Mutex::new(LoaderState::default()),
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Name of the global callback the host must route to [`Self::on_global_ready`]
    pub fn ready_callback(&self) -> &str {
        &self.config.ready_callback
    }

    pub async fn is_api_ready(&self) -> bool {
        self.state.lock().await.api_ready
    }

    pub async fn is_script_injected(&self) -> bool {
        self.state.lock().await.script_injected
    }

    /// Number of requests waiting for the API
    pub async fn pending_count(&self) -> usize {
        self.state.lock().await.pending.len()
    }

    /// Create the player now if the API is ready, otherwise queue the request
    ///
    /// Returns the handle when the player was created immediately.
    #[instrument(skip(self, request), fields(container_id = %request.container_id))]
    pub async fn enqueue_creation(
        &self,
        request: CreationRequest,
    ) -> Result<Option<RemotePlayerHandle>> {
        let first_request = {
            let mut state = self.state.lock().await;

            if state.api_ready {
                drop(state);
                return self.create_player(request).await.map(Some);
            }

            state.pending.push_back(request);
            debug!(pending = state.pending.len(), "Creation request queued");

            let first = !state.script_injected;
            state.script_injected = true;
            first
        };

        if first_request {
            self.inject_script().await;
        }

        Ok(None)
    }

    /// The provider's global ready callback
    ///
    /// Drains the queue in arrival order, creating one player per request.
    /// Returns how many players were created.
    #[instrument(skip(self))]
    pub async fn on_global_ready(&self) -> usize {
        let queued: Vec<CreationRequest> = {
            let mut state = self.state.lock().await;
            if state.api_ready {
                warn!("Embed API reported ready more than once");
            }
            state.api_ready = true;
            state.pending.drain(..).collect()
        };

        info!(queued = queued.len(), "Embed API ready");

        let mut created = 0;
        for request in queued {
            let container_id = request.container_id.clone();
            match self.create_player(request).await {
                Ok(_) => created += 1,
                Err(e) => {
                    error!(
                        container_id = %container_id,
                        error = %e,
                        code = e.error_code(),
                        recoverable = e.is_recoverable(),
                        "Queued player creation failed"
                    );
                }
            }
        }

        created
    }

    async fn inject_script(&self) {
        info!(url = %self.config.script_url, "Injecting embed API script");

        if let Err(e) = self.provider.inject_script(&self.config.script_url).await {
            error!(
                url = %self.config.script_url,
                error = %e,
                "Embed API script injection failed, queued players will not be created"
            );
        }
    }

    async fn create_player(&self, request: CreationRequest) -> Result<RemotePlayerHandle> {
        info!(
            container_id = %request.container_id,
            content_id = %request.content_id,
            "Creating remote player"
        );
        self.provider.create_player(request).await
    }
}
