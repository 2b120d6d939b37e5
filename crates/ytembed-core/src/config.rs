//! Adapter and loader configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Default prefix used to namespace generated container ids
pub const DEFAULT_PREFIX: &str = "youtube_iframe";

/// Provider player parameters (`playerVars`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerVars(BTreeMap<String, Value>);

impl PlayerVars {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Chromeless playback, no related content, inline playback
    pub fn defaults() -> Self {
        let mut vars = BTreeMap::new();
        vars.insert("controls".to_string(), Value::from(0));
        vars.insert("rel".to_string(), Value::from(0));
        vars.insert("disablekb".to_string(), Value::from(1));
        vars.insert("showinfo".to_string(), Value::from(0));
        vars.insert("modestbranding".to_string(), Value::from(0));
        vars.insert("html5".to_string(), Value::from(1));
        vars.insert("playsinline".to_string(), Value::from(1));
        Self(vars)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `overrides` applied key by key on top of `self`
    pub fn merged(&self, overrides: &PlayerVars) -> PlayerVars {
        let mut vars = self.0.clone();
        for (key, value) in &overrides.0 {
            vars.insert(key.clone(), value.clone());
        }
        PlayerVars(vars)
    }
}

/// Options recognised by the instance adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdapterOptions {
    /// Namespacing for generated ids
    pub prefix: String,
    /// Caller parameters, merged over [`PlayerVars::defaults`]
    #[serde(alias = "providerVars")]
    pub player_vars: PlayerVars,
    /// Page URL whose host is announced to the provider as `origin`
    pub origin: Option<Url>,
    /// Period of the synthesized `timeupdate` notifications
    pub progress_interval_ms: u64,
    /// Delay before `volumechange` is dispatched after a volume or mute change
    pub volume_change_delay_ms: u64,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            player_vars: PlayerVars::new(),
            origin: None,
            progress_interval_ms: 250,
            volume_change_delay_ms: 50,
        }
    }
}

impl AdapterOptions {
    /// Parse options from JSON, missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let options: AdapterOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() {
            return Err(Error::InvalidConfig("prefix must not be empty".to_string()));
        }
        if self.progress_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "progressIntervalMs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Parameters sent to the provider
    pub fn effective_player_vars(&self) -> PlayerVars {
        PlayerVars::defaults().merged(&self.player_vars)
    }

    /// Host of the configured page URL
    pub fn origin_host(&self) -> Option<String> {
        let url = self.origin.as_ref()?;
        let host = url.host_str()?;
        Some(match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn volume_change_delay(&self) -> Duration {
        Duration::from_millis(self.volume_change_delay_ms)
    }
}

/// Configuration of the embed API loader
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoaderConfig {
    /// Bootstrap script requested once per process
    pub script_url: String,
    /// Global callback the provider invokes when its API is loaded
    pub ready_callback: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            script_url: "https://www.youtube.com/player_api".to_string(),
            ready_callback: "onYouTubePlayerAPIReady".to_string(),
        }
    }
}
