//! In-process provider simulation
//!
//! Recording implementations of the host traits. The provider never loads
//! anything: readiness and state changes are driven by hand, which makes the
//! queueing and replay behaviour observable without a browser.

use crate::{
    events::{EventKind, MediaEvent},
    host::{
        MediaElement, PlayerEvents, PointerKind, ProviderApi, RemotePlayer, RemotePlayerHandle,
        RenderSurface,
    },
    loader::CreationRequest,
    Error, Result,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::debug;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A command received by a [`SimulatedPlayer`]
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    Seek(f64),
    SetVolume(f64),
    Mute,
    UnMute,
    LoadVideo(String),
    CueVideo(String),
    Play,
    Pause,
    SetSize(u32, u32),
    Destroy,
}

#[derive(Debug)]
struct PlayerState {
    current_time: f64,
    duration: f64,
    volume: f64,
    muted: bool,
    loaded_fraction: f64,
    video_url: String,
    calls: Vec<RemoteCall>,
}

/// Remote player recording every command it receives
pub struct SimulatedPlayer {
    state: Mutex<PlayerState>,
    surface: Arc<SimulatedSurface>,
}

impl SimulatedPlayer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PlayerState {
                current_time: 0.0,
                duration: 0.0,
                volume: 100.0,
                muted: false,
                loaded_fraction: 0.0,
                video_url: String::new(),
                calls: Vec::new(),
            }),
            surface: Arc::new(SimulatedSurface::new()),
        }
    }

    /// Commands received so far, in order
    pub fn calls(&self) -> Vec<RemoteCall> {
        lock(&self.state).calls.clone()
    }

    pub fn simulated_surface(&self) -> Arc<SimulatedSurface> {
        self.surface.clone()
    }

    pub fn set_duration(&self, duration: f64) {
        lock(&self.state).duration = duration;
    }

    pub fn set_loaded_fraction(&self, fraction: f64) {
        lock(&self.state).loaded_fraction = fraction;
    }

    pub fn set_current_time(&self, seconds: f64) {
        lock(&self.state).current_time = seconds;
    }

    fn record(&self, call: RemoteCall) {
        debug!(call = ?call, "Simulated player command");
        lock(&self.state).calls.push(call);
    }
}

impl Default for SimulatedPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl RemotePlayer for SimulatedPlayer {
    fn get_current_time(&self) -> f64 {
        lock(&self.state).current_time
    }

    fn get_duration(&self) -> f64 {
        lock(&self.state).duration
    }

    fn get_volume(&self) -> f64 {
        lock(&self.state).volume
    }

    fn is_muted(&self) -> bool {
        lock(&self.state).muted
    }

    fn get_video_loaded_fraction(&self) -> f64 {
        lock(&self.state).loaded_fraction
    }

    fn get_video_url(&self) -> String {
        lock(&self.state).video_url.clone()
    }

    fn seek_to(&self, seconds: f64) {
        lock(&self.state).current_time = seconds;
        self.record(RemoteCall::Seek(seconds));
    }

    fn mute(&self) {
        lock(&self.state).muted = true;
        self.record(RemoteCall::Mute);
    }

    fn un_mute(&self) {
        lock(&self.state).muted = false;
        self.record(RemoteCall::UnMute);
    }

    fn set_volume(&self, volume: f64) {
        lock(&self.state).volume = volume;
        self.record(RemoteCall::SetVolume(volume));
    }

    fn load_video_by_id(&self, content_id: &str) {
        lock(&self.state).video_url = watch_url(content_id);
        self.record(RemoteCall::LoadVideo(content_id.to_string()));
    }

    fn cue_video_by_id(&self, content_id: &str) {
        lock(&self.state).video_url = watch_url(content_id);
        self.record(RemoteCall::CueVideo(content_id.to_string()));
    }

    fn play_video(&self) {
        self.record(RemoteCall::Play);
    }

    fn pause_video(&self) {
        self.record(RemoteCall::Pause);
    }

    fn set_size(&self, width: u32, height: u32) {
        self.record(RemoteCall::SetSize(width, height));
    }

    fn destroy(&self) {
        self.record(RemoteCall::Destroy);
    }

    fn surface(&self) -> Arc<dyn RenderSurface> {
        self.surface.clone()
    }
}

fn watch_url(content_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", content_id)
}

/// Rendering surface remembering its pointer listener and visibility
pub struct SimulatedSurface {
    visible: Mutex<bool>,
    pointer: Mutex<Option<PlayerEvents>>,
}

impl SimulatedSurface {
    pub fn new() -> Self {
        Self {
            visible: Mutex::new(true),
            pointer: Mutex::new(None),
        }
    }

    pub fn is_visible(&self) -> bool {
        *lock(&self.visible)
    }

    pub fn is_watched(&self) -> bool {
        lock(&self.pointer).is_some()
    }

    /// Move the pointer over or off the surface, `false` if nobody listens
    pub fn hover(&self, kind: PointerKind) -> bool {
        match lock(&self.pointer).as_ref() {
            Some(events) => {
                events.pointer(kind);
                true
            }
            None => false,
        }
    }
}

impl Default for SimulatedSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface for SimulatedSurface {
    fn watch_pointer(&self, events: PlayerEvents) {
        *lock(&self.pointer) = Some(events);
    }

    fn set_visible(&self, visible: bool) {
        *lock(&self.visible) = visible;
    }
}

/// Provider whose global readiness and per-player readiness are driven by hand
pub struct SimulatedProvider {
    fail_injection: bool,
    /// Containers whose player construction is refused
    refused: Vec<String>,
    injections: Mutex<Vec<String>>,
    created: Mutex<Vec<(CreationRequest, Arc<SimulatedPlayer>)>>,
}

impl SimulatedProvider {
    pub fn new() -> Self {
        Self {
            fail_injection: false,
            refused: Vec::new(),
            injections: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
        }
    }

    /// Every script injection fails, as with a blocked network or CSP
    pub fn failing_injection(mut self) -> Self {
        self.fail_injection = true;
        self
    }

    /// Player construction fails for `container_id`
    pub fn failing_creation(mut self, container_id: impl Into<String>) -> Self {
        self.refused.push(container_id.into());
        self
    }

    /// Script URLs requested so far
    pub fn script_injections(&self) -> Vec<String> {
        lock(&self.injections).clone()
    }

    pub fn created_count(&self) -> usize {
        lock(&self.created).len()
    }

    /// Container ids of created players, in creation order
    pub fn created_containers(&self) -> Vec<String> {
        lock(&self.created)
            .iter()
            .map(|(request, _)| request.container_id.clone())
            .collect()
    }

    pub fn request(&self, index: usize) -> Option<CreationRequest> {
        lock(&self.created).get(index).map(|(request, _)| request.clone())
    }

    pub fn player(&self, index: usize) -> Option<Arc<SimulatedPlayer>> {
        lock(&self.created).get(index).map(|(_, player)| player.clone())
    }

    /// Fire the ready callback of the `index`-th created player
    pub fn ready(&self, index: usize) -> bool {
        let created = lock(&self.created);
        match created.get(index) {
            Some((request, player)) => {
                let handle: RemotePlayerHandle = player.clone();
                request.events.ready(handle);
                true
            }
            None => false,
        }
    }

    /// Fire the ready callback of every created player, returns how many
    pub fn ready_all(&self) -> usize {
        let count = self.created_count();
        (0..count).filter(|&index| self.ready(index)).count()
    }

    /// Report a raw state code for the `index`-th created player
    pub fn state_change(&self, index: usize, code: i32) -> bool {
        match lock(&self.created).get(index) {
            Some((request, _)) => {
                request.events.state_change(code);
                true
            }
            None => false,
        }
    }
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderApi for SimulatedProvider {
    async fn inject_script(&self, script_url: &str) -> Result<()> {
        lock(&self.injections).push(script_url.to_string());
        if self.fail_injection {
            return Err(Error::ScriptInjection {
                url: script_url.to_string(),
                reason: "blocked".to_string(),
            });
        }
        Ok(())
    }

    async fn create_player(&self, request: CreationRequest) -> Result<RemotePlayerHandle> {
        if self.refused.contains(&request.container_id) {
            return Err(Error::creation(request.container_id, "embed refused"));
        }
        let player = Arc::new(SimulatedPlayer::new());
        lock(&self.created).push((request, player.clone()));
        Ok(player)
    }
}

/// Media element recording containers, visibility and dispatched events
pub struct RecordingElement {
    id: String,
    width: u32,
    height: u32,
    autoplay: bool,
    containers: Mutex<Vec<String>>,
    original_hidden: Mutex<bool>,
    events: Mutex<Vec<MediaEvent>>,
    dispatched: watch::Sender<usize>,
}

impl RecordingElement {
    pub fn new(id: impl Into<String>) -> Self {
        let (dispatched, _) = watch::channel(0);
        Self {
            id: id.into(),
            width: 640,
            height: 360,
            autoplay: false,
            containers: Mutex::new(Vec::new()),
            original_hidden: Mutex::new(false),
            events: Mutex::new(Vec::new()),
            dispatched,
        }
    }

    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn events(&self) -> Vec<MediaEvent> {
        lock(&self.events).clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        lock(&self.events).iter().map(|e| e.kind).collect()
    }

    pub fn count_of(&self, kind: EventKind) -> usize {
        lock(&self.events).iter().filter(|e| e.kind == kind).count()
    }

    pub fn containers(&self) -> Vec<String> {
        lock(&self.containers).clone()
    }

    pub fn is_original_hidden(&self) -> bool {
        *lock(&self.original_hidden)
    }

    /// Wait until at least `count` events have been dispatched
    pub async fn wait_for_events(&self, count: usize) {
        let mut rx = self.dispatched.subscribe();
        let _ = rx.wait_for(|n| *n >= count).await;
    }
}

impl MediaElement for RecordingElement {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn autoplay(&self) -> bool {
        self.autoplay
    }

    fn insert_container(&self, container_id: &str) {
        lock(&self.containers).push(container_id.to_string());
    }

    fn hide_original(&self) {
        *lock(&self.original_hidden) = true;
    }

    fn restore_original(&self, container_id: &str) {
        lock(&self.containers).retain(|c| c != container_id);
        *lock(&self.original_hidden) = false;
    }

    fn dispatch_event(&self, event: MediaEvent) {
        let count = {
            let mut events = lock(&self.events);
            events.push(event);
            events.len()
        };
        self.dispatched.send_replace(count);
    }
}
