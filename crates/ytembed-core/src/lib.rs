//! YtEmbed Core - embedded remote player adapter
//!
//! This crate makes a remotely hosted embedded video player behave like a
//! canonical local media element:
//! - One-shot loading of the provider's embed API, with queued creations
//! - Content id extraction from provider URLs
//! - Pending-call queue replayed when the remote player becomes ready
//! - Property and method bridging to the remote player
//! - Provider state translation into canonical media events
//! - Synthesized `timeupdate` notifications while playing
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         YtEmbed Core                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐         ┌──────────────┐                      │
//! │  │  Embed API   │ create  │   Provider   │                      │
//! │  │   Loader     ├────────►│     API      │                      │
//! │  └──────▲───────┘         └──────┬───────┘                      │
//! │         │ enqueue                │ ready / state / pointer      │
//! │  ┌──────┴───────┐  replay ┌──────▼───────┐  ┌──────────────┐    │
//! │  │   Embed      │◄────────┤    Driver    │  │  Translator  │    │
//! │  │   Adapter    ├────────►│     Task     ├─►│   + Poller   │    │
//! │  └──────┬───────┘  bridge └──────────────┘  └──────┬───────┘    │
//! │         │                                          │            │
//! │  ┌──────▼───────┐                           ┌──────▼───────┐    │
//! │  │    Remote    │                           │    Media     │    │
//! │  │    Player    │                           │   Element    │    │
//! │  └──────────────┘                           └──────────────┘    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod config;
pub mod types;
pub mod events;
pub mod id;
pub mod host;
pub mod loader;
pub mod translator;
pub mod poller;
pub mod bridge;
pub mod adapter;
pub mod simulation;

pub use error::{Error, Result};
pub use config::{AdapterOptions, LoaderConfig, PlayerVars, DEFAULT_PREFIX};
pub use types::*;
pub use events::{EventKind, MediaEvent};
pub use id::{can_play_type, detect_media_type, extract_id, PROVIDER_MIME_TYPE, SUPPORTED_MIME_TYPES};
pub use host::{
    MediaElement, PlayerEvents, PointerKind, ProviderApi, ProviderEvent, RemotePlayer,
    RemotePlayerHandle, RenderSurface,
};
pub use loader::{CreationRequest, EmbedApiLoader};
pub use translator::{translate, PollerCommand, Translation};
pub use poller::ProgressPoller;
pub use bridge::{BridgeOutcome, Method, PendingCall, Property};
pub use adapter::{EmbedAdapter, Readiness};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the adapter library with default configuration
pub fn init() {
    tracing::info!(version = VERSION, "YtEmbed Core initialized");
}
