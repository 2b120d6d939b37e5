//! Property and method bridge
//!
//! A static table maps each bridged property to a typed getter and, for
//! writable properties, a value check and a setter. Methods get the same
//! treatment. Anything outside the tables is not applicable: never queued,
//! never forwarded.

use crate::{
    host::RemotePlayer,
    id::extract_id,
    types::{PropertyValue, ShadowState, TimeRanges},
};
use serde::{Deserialize, Serialize};

/// Outcome of a bridged get, set or invoke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeOutcome {
    /// Forwarded to the remote player
    Applied,
    /// Stored until the remote player is ready
    Queued,
    /// Unknown name, read-only property or unusable value; nothing happened
    NotApplicable,
}

/// Media properties bridged to the remote player
///
/// Discriminants index [`ACCESSORS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Property {
    CurrentTime = 0,
    Duration = 1,
    Volume = 2,
    Paused = 3,
    Ended = 4,
    Muted = 5,
    Buffered = 6,
    Src = 7,
}

impl Property {
    pub const ALL: [Property; 8] = [
        Property::CurrentTime,
        Property::Duration,
        Property::Volume,
        Property::Paused,
        Property::Ended,
        Property::Muted,
        Property::Buffered,
        Property::Src,
    ];

    pub fn name(&self) -> &'static str {
        accessor(*self).name
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ACCESSORS.iter().find(|a| a.name == name).map(|a| a.property)
    }

    pub fn is_writable(&self) -> bool {
        accessor(*self).set.is_some()
    }

    /// Value answered while no remote player is bound
    pub fn unbound_value(&self, shadow: ShadowState) -> PropertyValue {
        match self {
            Property::Paused => PropertyValue::Bool(shadow.paused),
            Property::Ended => PropertyValue::Bool(shadow.ended),
            _ => PropertyValue::Null,
        }
    }
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Media methods bridged to the remote player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Method {
    Play,
    Pause,
    /// Loading follows `src` changes on the provider side, so this does nothing
    Load,
}

impl Method {
    pub const ALL: [Method; 3] = [Method::Play, Method::Pause, Method::Load];

    pub fn name(&self) -> &'static str {
        match self {
            Method::Play => "play",
            Method::Pause => "pause",
            Method::Load => "load",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Method::ALL.into_iter().find(|m| m.name() == name)
    }

    pub(crate) fn call(&self, remote: &dyn RemotePlayer) {
        match self {
            Method::Play => remote.play_video(),
            Method::Pause => remote.pause_video(),
            Method::Load => {}
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A set or invoke deferred until the remote player is bound
#[derive(Debug, Clone, PartialEq)]
pub enum PendingCall {
    Set {
        property: Property,
        value: PropertyValue,
    },
    Invoke(Method),
}

/// What a bound setter did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SetEffect {
    Applied,
    /// Applied; a `volumechange` must follow once the provider settles
    VolumeChanged,
}

/// View of a bound remote player handed to accessors
pub(crate) struct Bound<'a> {
    pub remote: &'a dyn RemotePlayer,
    pub shadow: ShadowState,
    /// Whether the owning markup requests autoplay
    pub autoplay: bool,
}

pub(crate) struct PropertyAccessor {
    pub property: Property,
    pub name: &'static str,
    pub get: fn(&Bound<'_>) -> PropertyValue,
    /// `None` for read-only properties
    pub set: Option<Setter>,
}

pub(crate) struct Setter {
    pub accepts: fn(&PropertyValue) -> bool,
    pub apply: fn(&Bound<'_>, &PropertyValue) -> SetEffect,
}

pub(crate) fn accessor(property: Property) -> &'static PropertyAccessor {
    &ACCESSORS[property as usize]
}

pub(crate) static ACCESSORS: [PropertyAccessor; 8] = [
    PropertyAccessor {
        property: Property::CurrentTime,
        name: "currentTime",
        get: |b| PropertyValue::Number(b.remote.get_current_time()),
        set: Some(Setter {
            accepts: is_number,
            apply: |b, v| {
                if let Some(seconds) = v.as_f64() {
                    b.remote.seek_to(seconds);
                }
                SetEffect::Applied
            },
        }),
    },
    PropertyAccessor {
        property: Property::Duration,
        name: "duration",
        get: |b| PropertyValue::Number(b.remote.get_duration()),
        set: None,
    },
    PropertyAccessor {
        property: Property::Volume,
        name: "volume",
        get: |b| PropertyValue::Number(b.remote.get_volume()),
        set: Some(Setter {
            accepts: is_number,
            apply: |b, v| {
                if let Some(volume) = v.as_f64() {
                    b.remote.set_volume(volume);
                }
                SetEffect::VolumeChanged
            },
        }),
    },
    PropertyAccessor {
        property: Property::Paused,
        name: "paused",
        get: |b| PropertyValue::Bool(b.shadow.paused),
        set: None,
    },
    PropertyAccessor {
        property: Property::Ended,
        name: "ended",
        get: |b| PropertyValue::Bool(b.shadow.ended),
        set: None,
    },
    PropertyAccessor {
        property: Property::Muted,
        name: "muted",
        get: |b| PropertyValue::Bool(b.remote.is_muted()),
        set: Some(Setter {
            accepts: |v| v.as_bool().is_some(),
            apply: |b, v| {
                if v.as_bool() == Some(true) {
                    b.remote.mute();
                } else {
                    b.remote.un_mute();
                }
                SetEffect::VolumeChanged
            },
        }),
    },
    PropertyAccessor {
        property: Property::Buffered,
        name: "buffered",
        get: |b| {
            let end = b.remote.get_video_loaded_fraction() * b.remote.get_duration();
            PropertyValue::Ranges(TimeRanges::single(0.0, end))
        },
        set: None,
    },
    PropertyAccessor {
        property: Property::Src,
        name: "src",
        get: |b| PropertyValue::Text(b.remote.get_video_url()),
        set: Some(Setter {
            accepts: |v| v.source_url().is_some(),
            apply: |b, v| {
                let content_id = extract_id(v.source_url()).unwrap_or_default();
                if b.autoplay {
                    b.remote.load_video_by_id(&content_id);
                } else {
                    b.remote.cue_video_by_id(&content_id);
                }
                SetEffect::Applied
            },
        }),
    },
];

fn is_number(value: &PropertyValue) -> bool {
    value.as_f64().is_some()
}
