//! Instance adapter - one per media element
//!
//! Coordinates:
//! - Placeholder container and creation request
//! - Pending-call queue, replayed in submission order on ready
//! - Property and method bridging once the remote player is bound
//! - Provider state translation and the progress poller
//!
//! Provider callbacks arrive on a channel consumed by a driver task, so they
//! are handled one at a time and in arrival order. Every mutation happens
//! under the adapter's state lock, events are dispatched under it too.
//!
//! After release the driver drains its channel and exits. A player reported
//! ready from then on is destroyed instead of bound.

use crate::{
    bridge::{accessor, BridgeOutcome, Bound, Method, PendingCall, Property, SetEffect},
    config::AdapterOptions,
    events::{EventKind, MediaEvent},
    host::{
        MediaElement, PlayerEvents, PointerKind, ProviderEvent, RemotePlayerHandle, RenderSurface,
    },
    id::extract_id,
    loader::{CreationRequest, EmbedApiLoader},
    poller::ProgressPoller,
    translator::{translate, PollerCommand},
    types::{MediaFile, PropertyValue, ShadowState},
    Error, Result,
};
use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, watch, Mutex, MutexGuard};
use tokio::task::JoinSet;
use tokio::time;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Where an adapter stands with respect to its remote player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Waiting for the provider's ready signal
    Pending,
    /// Remote player bound, pending calls replayed
    Ready,
    /// Released by its owner
    Released,
}

/// Canonical media surface backed by a remote embedded player
pub struct EmbedAdapter {
    inner: Arc<AdapterInner>,
    readiness: watch::Receiver<Readiness>,
}

struct AdapterInner {
    id: String,
    content_id: String,
    options: AdapterOptions,
    element: Arc<dyn MediaElement>,
    /// Callbacks handed to the provider, also used for surface pointer events
    events: PlayerEvents,
    state: Mutex<AdapterState>,
    readiness: watch::Sender<Readiness>,
}

struct AdapterState {
    /// Bound exactly once, on ready
    remote: Option<RemotePlayerHandle>,
    /// Handle returned at creation, before its ready signal
    created: Option<RemotePlayerHandle>,
    surface: Option<Arc<dyn RenderSurface>>,
    shadow: ShadowState,
    pending: VecDeque<PendingCall>,
    poller: ProgressPoller,
    /// Scheduled `volumechange` notifications
    deferred: JoinSet<()>,
    released: bool,
}

impl EmbedAdapter {
    /// Create an adapter for `element` and submit its player to `loader`
    ///
    /// The first media file supplies the content id. An id that cannot be
    /// extracted is passed through empty and surfaces later as a provider
    /// playback failure.
    #[instrument(skip_all, fields(element_id = %element.id()))]
    pub async fn create(
        element: Arc<dyn MediaElement>,
        options: AdapterOptions,
        media_files: &[MediaFile],
        loader: &EmbedApiLoader,
    ) -> Result<Self> {
        options.validate()?;
        let first = media_files.first().ok_or(Error::NoMediaFiles)?;

        let element_id = match element.id() {
            id if !id.is_empty() => id,
            _ => format!("mejs_{}", Uuid::new_v4().simple()),
        };
        let id = format!("{}_{}", element_id, options.prefix);

        element.insert_container(&id);
        element.hide_original();

        let content_id = extract_id(Some(&first.src)).unwrap_or_default();
        if content_id.is_empty() {
            warn!(adapter_id = %id, src = %first.src, "No content id in source URL, passing it through empty");
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let (readiness_tx, readiness) = watch::channel(Readiness::Pending);

        let inner = Arc::new(AdapterInner {
            id: id.clone(),
            content_id: content_id.clone(),
            state: Mutex::new(AdapterState {
                remote: None,
                created: None,
                surface: None,
                shadow: ShadowState::default(),
                pending: VecDeque::new(),
                poller: ProgressPoller::new(
                    id.clone(),
                    element.clone(),
                    options.progress_interval(),
                ),
                deferred: JoinSet::new(),
                released: false,
            }),
            events: PlayerEvents::new(tx),
            readiness: readiness_tx,
            element: element.clone(),
            options,
        });

        tokio::spawn(drive(
            Arc::downgrade(&inner),
            inner.events.clone(),
            rx,
            readiness.clone(),
        ));

        let request = CreationRequest {
            container_id: id.clone(),
            content_id,
            width: element.width(),
            height: element.height(),
            player_vars: inner.options.effective_player_vars(),
            origin: inner.options.origin_host(),
            events: inner.events.clone(),
        };

        let adapter = Self { inner, readiness };

        match loader.enqueue_creation(request).await {
            Ok(Some(player)) => {
                let mut state = adapter.inner.state.lock().await;
                if state.remote.is_none() {
                    state.created = Some(player);
                }
                debug!(adapter_id = %id, "Remote player created, awaiting its ready signal");
            }
            Ok(None) => {
                debug!(adapter_id = %id, "Remote player creation queued until the embed API loads");
            }
            Err(e) => {
                warn!(
                    adapter_id = %id,
                    error = %e,
                    code = e.error_code(),
                    recoverable = e.is_recoverable(),
                    "Remote player creation failed, restoring the original element"
                );
                adapter.inner.events.release(None);
                element.restore_original(&id);
                return Err(e);
            }
        }

        info!(adapter_id = %id, content_id = %adapter.inner.content_id, "Adapter created");
        Ok(adapter)
    }

    /// `<element id>_<prefix>`, also the placeholder container id
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Content id extracted from the first media file
    pub fn content_id(&self) -> &str {
        &self.inner.content_id
    }

    pub fn options(&self) -> &AdapterOptions {
        &self.inner.options
    }

    pub fn readiness(&self) -> Readiness {
        *self.readiness.borrow()
    }

    pub fn is_ready(&self) -> bool {
        self.readiness() == Readiness::Ready
    }

    /// Resolves once the remote player is bound and pending calls are replayed
    ///
    /// Fails if the adapter is released first.
    pub async fn ready(&self) -> Result<()> {
        let mut rx = self.readiness.clone();
        let readiness = *rx
            .wait_for(|r| *r != Readiness::Pending)
            .await
            .map_err(|_| Error::Internal("readiness channel closed".to_string()))?;

        match readiness {
            Readiness::Ready => Ok(()),
            _ => Err(Error::AdapterReleased(self.inner.id.clone())),
        }
    }

    /// Read a property
    ///
    /// Before the remote player is bound every property reads `Null`, except
    /// `paused` and `ended` which answer from the shadow flags.
    pub async fn get(&self, property: Property) -> Result<PropertyValue> {
        let state = self.inner.lock_live().await?;
        Ok(self.inner.read(&state, property))
    }

    /// Read a property by its media name, `Null` for names outside the bridge
    pub async fn get_named(&self, name: &str) -> Result<PropertyValue> {
        match Property::from_name(name) {
            Some(property) => self.get(property).await,
            None => {
                self.inner.lock_live().await?;
                debug!(adapter_id = %self.inner.id, property = name, "Property not bridged");
                Ok(PropertyValue::Null)
            }
        }
    }

    /// Write a property, queued until the remote player is bound
    #[instrument(skip(self, value), fields(adapter_id = %self.inner.id))]
    pub async fn set(
        &self,
        property: Property,
        value: impl Into<PropertyValue>,
    ) -> Result<BridgeOutcome> {
        let value = value.into();
        let mut state = self.inner.lock_live().await?;
        Ok(self.inner.apply_set(&mut state, property, value))
    }

    /// Write a property by its media name, names outside the bridge are ignored
    pub async fn set_named(
        &self,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<BridgeOutcome> {
        match Property::from_name(name) {
            Some(property) => self.set(property, value).await,
            None => {
                self.inner.lock_live().await?;
                warn!(adapter_id = %self.inner.id, property = name, "Unsupported property, ignoring set");
                Ok(BridgeOutcome::NotApplicable)
            }
        }
    }

    /// Call a media method, queued until the remote player is bound
    #[instrument(skip(self), fields(adapter_id = %self.inner.id))]
    pub async fn invoke(&self, method: Method) -> Result<BridgeOutcome> {
        let mut state = self.inner.lock_live().await?;
        Ok(self.inner.apply_invoke(&mut state, method))
    }

    /// Call a media method by name, names outside the bridge are ignored
    pub async fn invoke_named(&self, name: &str) -> Result<BridgeOutcome> {
        match Method::from_name(name) {
            Some(method) => self.invoke(method).await,
            None => {
                self.inner.lock_live().await?;
                warn!(adapter_id = %self.inner.id, method = name, "Unsupported method, ignoring call");
                Ok(BridgeOutcome::NotApplicable)
            }
        }
    }

    pub async fn play(&self) -> Result<BridgeOutcome> {
        self.invoke(Method::Play).await
    }

    pub async fn pause(&self) -> Result<BridgeOutcome> {
        self.invoke(Method::Pause).await
    }

    pub async fn load(&self) -> Result<BridgeOutcome> {
        self.invoke(Method::Load).await
    }

    /// Resize the remote player; not applicable before it is bound
    pub async fn set_size(&self, width: u32, height: u32) -> Result<BridgeOutcome> {
        let state = self.inner.lock_live().await?;
        match &state.remote {
            Some(remote) => {
                remote.set_size(width, height);
                Ok(BridgeOutcome::Applied)
            }
            None => Ok(BridgeOutcome::NotApplicable),
        }
    }

    /// Stop time updates, pause and hide the rendering surface
    pub async fn hide(&self) -> Result<()> {
        let mut state = self.inner.lock_live().await?;
        state.poller.stop();
        self.inner.apply_invoke(&mut state, Method::Pause);
        if let Some(surface) = &state.surface {
            surface.set_visible(false);
        }
        Ok(())
    }

    pub async fn show(&self) -> Result<()> {
        let state = self.inner.lock_live().await?;
        if let Some(surface) = &state.surface {
            surface.set_visible(true);
        }
        Ok(())
    }

    /// Release the adapter
    ///
    /// Stops the poller, cancels scheduled notifications and destroys the
    /// remote player, bound or not. Late provider callbacks are dropped, and
    /// a player reported ready afterwards is destroyed. Calling it again does
    /// nothing.
    #[instrument(skip(self), fields(adapter_id = %self.inner.id))]
    pub async fn destroy(&self) {
        let mut state = self.inner.state.lock().await;
        if state.released {
            return;
        }

        state.released = true;
        state.poller.stop();
        state.deferred.abort_all();

        let dropped = state.pending.len();
        state.pending.clear();
        state.surface = None;
        let player = state.remote.take().or_else(|| state.created.take());
        self.inner.events.release(player);

        self.inner.readiness.send_replace(Readiness::Released);
        info!(dropped_calls = dropped, "Adapter released");
    }

    /// Shadow `paused`/`ended` flags
    pub async fn shadow(&self) -> ShadowState {
        self.inner.state.lock().await.shadow
    }

    /// Number of calls waiting for the remote player
    pub async fn pending_calls(&self) -> usize {
        self.inner.state.lock().await.pending.len()
    }

    /// Whether `timeupdate` notifications are being synthesized
    pub async fn is_polling(&self) -> bool {
        self.inner.state.lock().await.poller.is_armed()
    }
}

/// Consume provider callbacks in arrival order until the adapter is released
/// or dropped, then discard whatever is left in the channel
async fn drive(
    inner: Weak<AdapterInner>,
    events: PlayerEvents,
    mut rx: mpsc::UnboundedReceiver<ProviderEvent>,
    mut readiness: watch::Receiver<Readiness>,
) {
    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else {
                    break;
                };
                match inner.upgrade() {
                    Some(adapter) => adapter.handle_provider_event(event).await,
                    None => {
                        events.discard(event);
                        break;
                    }
                }
            }
            // Also completes when the adapter is dropped and the sender with it
            _ = async {
                let _ = readiness.wait_for(|r| *r == Readiness::Released).await;
            } => break,
        }
    }

    rx.close();
    while let Ok(event) = rx.try_recv() {
        events.discard(event);
    }
}

impl AdapterInner {
    async fn lock_live(&self) -> Result<MutexGuard<'_, AdapterState>> {
        let state = self.state.lock().await;
        if state.released {
            return Err(Error::AdapterReleased(self.id.clone()));
        }
        Ok(state)
    }

    fn read(&self, state: &AdapterState, property: Property) -> PropertyValue {
        match &state.remote {
            Some(remote) => (accessor(property).get)(&Bound {
                remote: remote.as_ref(),
                shadow: state.shadow,
                autoplay: self.element.autoplay(),
            }),
            None => property.unbound_value(state.shadow),
        }
    }

    fn apply_set(
        &self,
        state: &mut AdapterState,
        property: Property,
        value: PropertyValue,
    ) -> BridgeOutcome {
        let Some(setter) = accessor(property).set.as_ref() else {
            warn!(adapter_id = %self.id, property = %property, "Read-only property, ignoring set");
            return BridgeOutcome::NotApplicable;
        };

        if !(setter.accepts)(&value) {
            warn!(adapter_id = %self.id, property = %property, value = ?value, "Unsupported value, ignoring set");
            return BridgeOutcome::NotApplicable;
        }

        let Some(remote) = state.remote.clone() else {
            debug!(adapter_id = %self.id, property = %property, "Remote player not ready, queueing set");
            state.pending.push_back(PendingCall::Set { property, value });
            return BridgeOutcome::Queued;
        };

        let effect = (setter.apply)(
            &Bound {
                remote: remote.as_ref(),
                shadow: state.shadow,
                autoplay: self.element.autoplay(),
            },
            &value,
        );

        if effect == SetEffect::VolumeChanged {
            self.schedule_volume_change(state);
        }

        BridgeOutcome::Applied
    }

    fn apply_invoke(&self, state: &mut AdapterState, method: Method) -> BridgeOutcome {
        match &state.remote {
            Some(remote) => {
                debug!(adapter_id = %self.id, method = %method, "Invoking remote method");
                method.call(remote.as_ref());
                BridgeOutcome::Applied
            }
            None => {
                debug!(adapter_id = %self.id, method = %method, "Remote player not ready, queueing call");
                state.pending.push_back(PendingCall::Invoke(method));
                BridgeOutcome::Queued
            }
        }
    }

    /// The provider gives no synchronous guarantee that a volume or mute
    /// change took effect, so `volumechange` is sent after a settle delay.
    fn schedule_volume_change(&self, state: &mut AdapterState) {
        while state.deferred.try_join_next().is_some() {}

        let element = self.element.clone();
        let target = self.id.clone();
        let delay = self.options.volume_change_delay();

        state.deferred.spawn(async move {
            time::sleep(delay).await;
            element.dispatch_event(MediaEvent::new(EventKind::VolumeChange, target));
        });
    }

    fn dispatch(&self, kind: EventKind) {
        self.element.dispatch_event(MediaEvent::new(kind, self.id.clone()));
    }

    async fn handle_provider_event(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::Ready(remote) => self.on_ready(remote).await,
            ProviderEvent::StateChange(code) => self.on_state_change(code).await,
            ProviderEvent::Pointer(kind) => self.on_pointer(kind).await,
        }
    }

    #[instrument(skip(self, remote), fields(adapter_id = %self.id))]
    async fn on_ready(&self, remote: RemotePlayerHandle) {
        let mut state = self.state.lock().await;
        if state.released {
            debug!("Remote player ready after release");
            self.events.retire(remote);
            return;
        }
        if state.remote.is_some() {
            warn!("Duplicate ready signal ignored");
            return;
        }

        state.remote = Some(remote.clone());
        state.created = None;

        let queued: Vec<PendingCall> = state.pending.drain(..).collect();
        let replayed = queued.len();
        for call in queued {
            match call {
                PendingCall::Set { property, value } => {
                    self.apply_set(&mut state, property, value);
                }
                PendingCall::Invoke(method) => {
                    self.apply_invoke(&mut state, method);
                }
            }
        }

        let surface = remote.surface();
        surface.watch_pointer(self.events.clone());
        state.surface = Some(surface);

        info!(replayed, "Remote player ready");

        for kind in EventKind::READY_SEQUENCE {
            self.dispatch(kind);
        }
        self.readiness.send_replace(Readiness::Ready);
    }

    async fn on_state_change(&self, code: i32) {
        let mut state = self.state.lock().await;
        if state.released {
            return;
        }

        let translation = translate(code, state.shadow);
        let Some(provider_state) = translation.state else {
            debug!(adapter_id = %self.id, code, "Unknown provider state ignored");
            return;
        };

        debug!(adapter_id = %self.id, code, state = %provider_state, "Provider state change");

        state.shadow = translation.shadow;
        match translation.poller {
            PollerCommand::Start => {
                state.poller.start();
            }
            PollerCommand::Stop => {
                state.poller.stop();
            }
            PollerCommand::Unchanged => {}
        }

        for kind in translation.events {
            self.dispatch(*kind);
        }
    }

    async fn on_pointer(&self, kind: PointerKind) {
        let state = self.state.lock().await;
        if state.released {
            return;
        }

        self.dispatch(match kind {
            PointerKind::Enter => EventKind::MouseOver,
            PointerKind::Leave => EventKind::MouseOut,
        });
    }
}
