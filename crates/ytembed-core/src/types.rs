//! Core types shared by the loader, the adapter and the host seams

use serde::{Deserialize, Serialize};

/// A candidate source handed to the adapter by the owning media element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    /// Media reference URL
    pub src: String,
    /// MIME type announced by the markup, e.g. `video/youtube`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl MediaFile {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            mime_type: None,
        }
    }

    pub fn with_type(src: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            mime_type: Some(mime_type.into()),
        }
    }
}

/// Locally held flags the provider cannot report directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShadowState {
    pub paused: bool,
    pub ended: bool,
}

impl Default for ShadowState {
    fn default() -> Self {
        Self {
            paused: true,
            ended: false,
        }
    }
}

/// Player states as enumerated by the provider
///
/// Code `4` is not used by the provider and has no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderState {
    /// `-1`, the player has not started yet
    Unstarted,
    /// `0`
    Ended,
    /// `1`
    Playing,
    /// `2`
    Paused,
    /// `3`
    Buffering,
    /// `5`, a video has been cued and is ready to play
    Cued,
}

impl ProviderState {
    /// Map a raw provider code, `None` for codes outside the enumeration
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(ProviderState::Unstarted),
            0 => Some(ProviderState::Ended),
            1 => Some(ProviderState::Playing),
            2 => Some(ProviderState::Paused),
            3 => Some(ProviderState::Buffering),
            5 => Some(ProviderState::Cued),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            ProviderState::Unstarted => -1,
            ProviderState::Ended => 0,
            ProviderState::Playing => 1,
            ProviderState::Paused => 2,
            ProviderState::Buffering => 3,
            ProviderState::Cued => 5,
        }
    }
}

impl std::fmt::Display for ProviderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderState::Unstarted => write!(f, "unstarted"),
            ProviderState::Ended => write!(f, "ended"),
            ProviderState::Playing => write!(f, "playing"),
            ProviderState::Paused => write!(f, "paused"),
            ProviderState::Buffering => write!(f, "buffering"),
            ProviderState::Cued => write!(f, "cued"),
        }
    }
}

/// Buffered ranges, as `(start, end)` pairs in seconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeRanges {
    ranges: Vec<(f64, f64)>,
}

impl TimeRanges {
    /// A single range spanning `[start, end]`
    pub fn single(start: f64, end: f64) -> Self {
        Self {
            ranges: vec![(start, end)],
        }
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn start(&self, index: usize) -> Option<f64> {
        self.ranges.get(index).map(|r| r.0)
    }

    pub fn end(&self, index: usize) -> Option<f64> {
        self.ranges.get(index).map(|r| r.1)
    }
}

/// Value read from or written to a bridged property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Sources(Vec<MediaFile>),
    Ranges(TimeRanges),
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// URL carried by a `src` value: the string itself, or the first file of a list
    pub fn source_url(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(url) => Some(url),
            PropertyValue::Sources(files) => files.first().map(|f| f.src.as_str()),
            _ => None,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<Vec<MediaFile>> for PropertyValue {
    fn from(value: Vec<MediaFile>) -> Self {
        PropertyValue::Sources(value)
    }
}
