//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured station events to the
//! `log` facade.

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(time) => info!("START | clock={}", time),
            AppEvent::ClockSet(time) => info!("CLOCK | set to {}", time),
            AppEvent::SampleStored(record) => debug!("SAMPLE | {}", record),
            AppEvent::AlarmFired { at, triggers } => info!("ALARM | fired at {} [{}]", at, triggers),
            AppEvent::AlarmFinished => info!("ALARM | finished"),
            AppEvent::AlarmCleared => info!("ALARM | cleared"),
            AppEvent::ActivitySuspended(activity) => info!("ACTIVITY | {} suspended", activity.name()),
            AppEvent::ActivityResumed(activity) => info!("ACTIVITY | {} resumed", activity.name()),
            AppEvent::RecordsDeleted => info!("RECORDS | deleted"),
        }
    }
}
