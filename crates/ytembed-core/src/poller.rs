//! Progress poller
//!
//! The provider never pushes time changes, so while playback is active a
//! fixed-period timer synthesizes `timeupdate` notifications.

use crate::{
    events::{EventKind, MediaEvent},
    host::MediaElement,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

/// Timer emitting `timeupdate` on every tick while armed
///
/// One per adapter. Dropping the poller disarms it.
pub struct ProgressPoller {
    target: String,
    element: Arc<dyn MediaElement>,
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl ProgressPoller {
    pub fn new(target: impl Into<String>, element: Arc<dyn MediaElement>, period: Duration) -> Self {
        Self {
            target: target.into(),
            element,
            period,
            task: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_armed(&self) -> bool {
        self.task.is_some()
    }

    /// Arm the timer, returns `false` if it already was
    ///
    /// The first tick fires one period after arming. Must be called from
    /// within a tokio runtime.
    pub fn start(&mut self) -> bool {
        if self.is_armed() {
            return false;
        }

        let element = self.element.clone();
        let target = self.target.clone();
        let period = self.period;

        self.task = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                emit_time_update(element.as_ref(), &target);
            }
        }));

        debug!(adapter_id = %self.target, period_ms = self.period.as_millis() as u64, "Progress poller armed");
        true
    }

    /// Disarm the timer, returns `false` if it was not armed
    pub fn stop(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                debug!(adapter_id = %self.target, "Progress poller disarmed");
                true
            }
            None => false,
        }
    }

    /// Run one tick by hand, emitting only while armed
    pub fn tick(&self) -> bool {
        if self.is_armed() {
            emit_time_update(self.element.as_ref(), &self.target);
            true
        } else {
            false
        }
    }
}

impl Drop for ProgressPoller {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn emit_time_update(element: &dyn MediaElement, target: &str) {
    element.dispatch_event(MediaEvent::new(EventKind::TimeUpdate, target));
}
