//! Outbound application events.
//!
//! The [`Station`](super::service::Station) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::alarm::TriggerFlags;
use crate::clock::WallTime;
use crate::parameters::PeriodicActivity;
use crate::records::Record;

/// Structured events emitted by the station core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The station has started (carries the initial clock).
    Started(WallTime),

    /// The operator set the clock.
    ClockSet(WallTime),

    /// A sample was stored in the history.
    SampleStored(Record),

    /// One or more alarm conditions fired.
    AlarmFired { at: WallTime, triggers: TriggerFlags },

    /// The buzzer countdown ran out.
    AlarmFinished,

    /// The operator cleared the alarm.
    AlarmCleared,

    /// A periodic activity's period was set to zero.
    ActivitySuspended(PeriodicActivity),

    /// A suspended activity's period became nonzero.
    ActivityResumed(PeriodicActivity),

    /// The operator deleted the sample history.
    RecordsDeleted,
}
