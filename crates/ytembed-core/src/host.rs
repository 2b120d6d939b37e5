//! Seams to the host environment
//!
//! The adapter never touches a document, a script tag or the provider's
//! player object directly. It goes through the traits below, which a WASM
//! binding, a webview bridge or a test double implements.

use crate::{events::MediaEvent, loader::CreationRequest, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::debug;

/// Shared handle to a constructed remote player
pub type RemotePlayerHandle = Arc<dyn RemotePlayer>;

/// Handle exposed by the provider for one embedded player
///
/// Queries answer synchronously; commands take effect asynchronously on the
/// provider side and are observed through state change notifications.
pub trait RemotePlayer: Send + Sync {
    fn get_current_time(&self) -> f64;
    fn get_duration(&self) -> f64;
    fn get_volume(&self) -> f64;
    fn is_muted(&self) -> bool;
    /// Fraction of the video loaded so far, in `[0, 1]`
    fn get_video_loaded_fraction(&self) -> f64;
    fn get_video_url(&self) -> String;

    fn seek_to(&self, seconds: f64);
    fn mute(&self);
    fn un_mute(&self);
    fn set_volume(&self, volume: f64);
    /// Load and start playing
    fn load_video_by_id(&self, content_id: &str);
    /// Load without starting playback
    fn cue_video_by_id(&self, content_id: &str);
    fn play_video(&self);
    fn pause_video(&self);
    fn set_size(&self, width: u32, height: u32);
    fn destroy(&self);

    /// Element the provider renders into
    fn surface(&self) -> Arc<dyn RenderSurface>;
}

/// The provider's rendering surface (its iframe)
pub trait RenderSurface: Send + Sync {
    /// Forward pointer enter/leave on the surface to `events`
    fn watch_pointer(&self, events: PlayerEvents);
    fn set_visible(&self, visible: bool);
}

/// Provider bootstrap and player construction
#[async_trait]
pub trait ProviderApi: Send + Sync {
    /// Request the provider's bootstrap script
    ///
    /// Completion of the request is not readiness: the provider signals that
    /// separately through its global ready callback.
    async fn inject_script(&self, script_url: &str) -> Result<()>;

    /// Construct a remote player
    ///
    /// The returned handle must not be driven before `request.events` has
    /// received [`ProviderEvent::Ready`].
    async fn create_player(&self, request: CreationRequest) -> Result<RemotePlayerHandle>;
}

/// The owning media element, as seen by the adapter
pub trait MediaElement: Send + Sync {
    /// Element id, may be empty
    fn id(&self) -> String;
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Whether the markup requests autoplay
    fn autoplay(&self) -> bool;
    /// Create the placeholder container in front of the original media surface
    fn insert_container(&self, container_id: &str);
    /// Hide the original media surface
    fn hide_original(&self);
    /// Remove the placeholder container and show the original media surface again
    fn restore_original(&self, container_id: &str);
    fn dispatch_event(&self, event: MediaEvent);
}

/// Pointer movement over the rendering surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Enter,
    Leave,
}

/// Notifications the provider sends about one player
#[derive(Clone)]
pub enum ProviderEvent {
    /// The player is usable, carrying its handle
    Ready(RemotePlayerHandle),
    /// Raw provider state code
    StateChange(i32),
    Pointer(PointerKind),
}

impl std::fmt::Debug for ProviderEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderEvent::Ready(_) => write!(f, "Ready"),
            ProviderEvent::StateChange(code) => write!(f, "StateChange({})", code),
            ProviderEvent::Pointer(kind) => write!(f, "Pointer({:?})", kind),
        }
    }
}

/// Callbacks bound to one adapter (`onReady`, `onStateChange`, surface pointer events)
///
/// Sending never fails from the provider's point of view. Once the adapter
/// is released, notifications are dropped and any player reported ready is
/// destroyed, so no embed outlives its owner.
#[derive(Clone)]
pub struct PlayerEvents {
    tx: mpsc::UnboundedSender<ProviderEvent>,
    retirement: Arc<Mutex<Retirement>>,
}

#[derive(Default)]
struct Retirement {
    released: bool,
    /// Players already destroyed for the released adapter
    destroyed: Vec<RemotePlayerHandle>,
}

impl PlayerEvents {
    pub fn new(tx: mpsc::UnboundedSender<ProviderEvent>) -> Self {
        Self {
            tx,
            retirement: Arc::default(),
        }
    }

    pub fn ready(&self, player: RemotePlayerHandle) {
        self.send(ProviderEvent::Ready(player));
    }

    pub fn state_change(&self, code: i32) {
        self.send(ProviderEvent::StateChange(code));
    }

    pub fn pointer(&self, kind: PointerKind) {
        self.send(ProviderEvent::Pointer(kind));
    }

    /// Whether the owning adapter has been released
    pub fn is_released(&self) -> bool {
        self.retirement().released
    }

    /// Mark the owning adapter released, destroying `player` if given
    pub(crate) fn release(&self, player: Option<RemotePlayerHandle>) {
        self.retirement().released = true;
        if let Some(player) = player {
            self.retire(player);
        }
    }

    /// Destroy a player nobody owns any more, at most once per player
    pub(crate) fn retire(&self, player: RemotePlayerHandle) {
        {
            let mut retirement = self.retirement();
            let seen = retirement
                .destroyed
                .iter()
                .any(|p| std::ptr::addr_eq(Arc::as_ptr(p), Arc::as_ptr(&player)));
            if seen {
                return;
            }
            retirement.destroyed.push(player.clone());
        }
        debug!("Destroying remote player without an owner");
        player.destroy();
    }

    /// Drop a notification that can no longer reach its adapter
    pub(crate) fn discard(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::Ready(player) => self.retire(player),
            event => debug!(event = ?event, "Adapter gone, dropping provider notification"),
        }
    }

    fn send(&self, event: ProviderEvent) {
        if self.is_released() {
            self.discard(event);
            return;
        }
        if let Err(err) = self.tx.send(event) {
            self.discard(err.0);
        }
    }

    fn retirement(&self) -> MutexGuard<'_, Retirement> {
        self.retirement.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for PlayerEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerEvents")
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}
