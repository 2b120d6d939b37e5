//! Media element printing a timeline of dispatched events

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};
use ytembed_core::{EventKind, MediaElement, MediaEvent};

/// One dispatched event
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub kind: EventKind,
    pub target: String,
}

/// Headless media element
pub struct ConsoleElement {
    id: String,
    width: u32,
    height: u32,
    autoplay: bool,
    started: Instant,
    log: Mutex<Vec<EventRecord>>,
}

impl ConsoleElement {
    pub fn new(id: impl Into<String>, autoplay: bool) -> Self {
        Self {
            id: id.into(),
            width: 640,
            height: 360,
            autoplay,
            started: Instant::now(),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Events dispatched so far
    pub fn records(&self) -> Vec<EventRecord> {
        match self.log.lock() {
            Ok(log) => log.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl MediaElement for ConsoleElement {
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
        info!(container_id, "Placeholder container inserted");
    }

    fn hide_original(&self) {
        debug!(element_id = %self.id, "Original media surface hidden");
    }

    fn restore_original(&self, container_id: &str) {
        info!(container_id, "Placeholder container removed, original media surface shown");
    }

    fn dispatch_event(&self, event: MediaEvent) {
        let record = EventRecord {
            at: Utc::now(),
            elapsed_ms: self.started.elapsed().as_millis() as u64,
            kind: event.kind,
            target: event.target,
        };
        debug!(event = %record.kind, elapsed_ms = record.elapsed_ms, "Event dispatched");

        match self.log.lock() {
            Ok(mut log) => log.push(record),
            Err(poisoned) => poisoned.into_inner().push(record),
        }
    }
}
