//! Canonical lifecycle events
//!
//! The vocabulary is fixed and decoupled from provider event names. An event
//! carries its type and the id of the adapter that produced it, nothing else.

use serde::{Deserialize, Serialize};

/// Canonical event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    RendererReady,
    LoadedData,
    LoadedMetadata,
    CanPlay,
    Play,
    Playing,
    Pause,
    Ended,
    Progress,
    TimeUpdate,
    VolumeChange,
    /// Pointer entered the remote rendering surface
    MouseOver,
    /// Pointer left the remote rendering surface
    MouseOut,
}

impl EventKind {
    /// Events emitted, in this order, once the remote player reports readiness
    pub const READY_SEQUENCE: [EventKind; 4] = [
        EventKind::RendererReady,
        EventKind::LoadedData,
        EventKind::LoadedMetadata,
        EventKind::CanPlay,
    ];

    /// DOM-style event name
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::RendererReady => "rendererready",
            EventKind::LoadedData => "loadeddata",
            EventKind::LoadedMetadata => "loadedmetadata",
            EventKind::CanPlay => "canplay",
            EventKind::Play => "play",
            EventKind::Playing => "playing",
            EventKind::Pause => "pause",
            EventKind::Ended => "ended",
            EventKind::Progress => "progress",
            EventKind::TimeUpdate => "timeupdate",
            EventKind::VolumeChange => "volumechange",
            EventKind::MouseOver => "mouseover",
            EventKind::MouseOut => "mouseout",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "rendererready" => EventKind::RendererReady,
            "loadeddata" => EventKind::LoadedData,
            "loadedmetadata" => EventKind::LoadedMetadata,
            "canplay" => EventKind::CanPlay,
            "play" => EventKind::Play,
            "playing" => EventKind::Playing,
            "pause" => EventKind::Pause,
            "ended" => EventKind::Ended,
            "progress" => EventKind::Progress,
            "timeupdate" => EventKind::TimeUpdate,
            "volumechange" => EventKind::VolumeChange,
            "mouseover" => EventKind::MouseOver,
            "mouseout" => EventKind::MouseOut,
            _ => return None,
        };
        Some(kind)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A canonical event dispatched to the owning media element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaEvent {
    /// Event type
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Id of the adapter that produced the event
    pub target: String,
}

impl MediaEvent {
    pub fn new(kind: EventKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
        }
    }
}
