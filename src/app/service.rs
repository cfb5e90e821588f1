//! Station service, the hexagonal core.
//!
//! [`Station`] owns the shared aggregates (clock, parameters, record store,
//! alarm engine, display) and exposes one step function per activity plus
//! the operator request surface.  All I/O flows through port traits
//! injected at call sites, so every step is testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │           Station            │
//! DisplayPort ◀── │ Clock · Params · Records ·   │
//!                 │ Alarm · Statistics           │
//!                 └──────────────────────────────┘
//! ```
//!
//! Lock nesting never exceeds two levels: parameters → records,
//! alarm thresholds → alarm runtime and alarm runtime → display.  The
//! display lock is a leaf.

use log::{debug, info};

use crate::alarm::{AlarmEngine, Countdown, TriggerFlags};
use crate::clock::{SharedClock, WallTime};
use crate::config::{PersistedSettings, StationConfig};
use crate::display::SharedDisplay;
use crate::error::ValidationError;
use crate::parameters::{ParameterKind, ParameterStore, PeriodChange, PeriodicActivity};
use crate::records::{Record, RecordStore, Sample};
use crate::statistics::{self, Interval, StatisticsResult};

use super::events::AppEvent;
use super::ports::{DisplayPort, EventSink, SensorPort};

// ───────────────────────────────────────────────────────────────
// Station
// ───────────────────────────────────────────────────────────────

/// Shared state of the monitoring station.  Wrap it in an `Arc` and hand
/// a clone to every activity.
pub struct Station {
    clock: SharedClock,
    parameters: ParameterStore,
    records: RecordStore,
    alarm: AlarmEngine,
    display: SharedDisplay,
}

impl Station {
    /// Build the station from a validated configuration.
    pub fn new(config: &StationConfig, display: impl DisplayPort + Send + 'static) -> Self {
        Self {
            clock: SharedClock::new(config.start_clock),
            parameters: ParameterStore::new(config.parameters()),
            records: RecordStore::new(),
            alarm: AlarmEngine::new(config.thresholds()),
            display: SharedDisplay::new(display),
        }
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    pub fn parameters(&self) -> &ParameterStore {
        &self.parameters
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn alarm(&self) -> &AlarmEngine {
        &self.alarm
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Draw the initial screen and announce the start.
    pub fn start(&self, sink: &mut impl EventSink) {
        let now = self.clock.now();
        self.display.show_clock(now);
        self.display.show_indicators(TriggerFlags::EMPTY);
        self.display.show_alarms_enabled(self.alarm.thresholds().enabled);
        sink.emit(&AppEvent::Started(now));
        info!("Station started at {}", now);
    }

    // ── Activity steps ────────────────────────────────────────

    /// Clock activity: advance one second, evaluate the clock alarm, redraw.
    pub fn clock_step(&self, sink: &mut impl EventSink) -> WallTime {
        let now = self.clock.tick();
        let fired = self.alarm.check_clock(now, self.parameters.alarm_duration());
        self.report_fired(now, fired, sink);
        self.display.show_clock(now);
        now
    }

    /// Fresh sensor read.  Nothing is stored.
    pub fn read_sensors(&self, sensors: &mut impl SensorPort) -> Sample {
        Sample {
            temperature: sensors.read_temperature(),
            luminosity: sensors.read_luminosity(),
        }
    }

    /// Sampler activity: read, timestamp, store, evaluate thresholds.
    ///
    /// Returns `None` without touching the sensors when monitoring was
    /// deactivated after the period started.
    pub fn sample_step(&self, sensors: &mut impl SensorPort, sink: &mut impl EventSink) -> Option<Record> {
        if self.parameters.period(PeriodicActivity::Sampler) == 0 {
            return None;
        }
        let sample = self.read_sensors(sensors);
        let record = Record::new(self.clock.now(), sample);
        self.records.append(record);
        debug!("Sampler: stored {}", record);
        sink.emit(&AppEvent::SampleStored(record));

        let fired = self.alarm.check_sample(&sample, self.parameters.alarm_duration());
        self.report_fired(record.time, fired, sink);
        Some(record)
    }

    /// Processor activity: show the oldest unread record.
    ///
    /// Returns `None` when processing was deactivated or nothing is unread.
    pub fn process_step(&self) -> Option<Record> {
        if self.parameters.period(PeriodicActivity::Processor) == 0 {
            return None;
        }
        let record = self.records.consume_oldest_unread()?;
        self.display.show_record(&record);
        Some(record)
    }

    /// Buzzer activity: one second of ringing elapsed.  Returns whether the
    /// buzzer should keep ringing.
    pub fn countdown_step(&self, sink: &mut impl EventSink) -> bool {
        match self.alarm.countdown_tick() {
            Countdown::Ringing(_) => true,
            Countdown::Finished => {
                sink.emit(&AppEvent::AlarmFinished);
                false
            }
            Countdown::NotRinging => false,
        }
    }

    /// Statistics over the stored history.
    pub fn statistics(&self, interval: Interval) -> Result<StatisticsResult, ValidationError> {
        statistics::compute(&self.records, interval)
    }

    // ── Operator requests ─────────────────────────────────────

    pub fn set_clock(&self, hours: u8, minutes: u8, seconds: u8, sink: &mut impl EventSink) -> Result<WallTime, ValidationError> {
        let time = self.clock.set(hours, minutes, seconds)?;
        self.display.show_clock(time);
        sink.emit(&AppEvent::ClockSet(time));
        info!("Clock set to {}", time);
        Ok(time)
    }

    pub fn set_parameter(&self, kind: ParameterKind, secs: u8, sink: &mut impl EventSink) -> Result<PeriodChange, ValidationError> {
        let change = self.parameters.set(kind, secs)?;
        match change {
            PeriodChange::Suspended(activity) => sink.emit(&AppEvent::ActivitySuspended(activity)),
            PeriodChange::Resumed(activity) => sink.emit(&AppEvent::ActivityResumed(activity)),
            PeriodChange::Retimed | PeriodChange::Unchanged => {}
        }
        Ok(change)
    }

    /// 00:00:00 removes the clock alarm.
    pub fn define_alarm_clock(&self, time: WallTime) {
        self.alarm.set_clock_alarm(time);
    }

    pub fn define_thresholds(&self, temperature: u8, luminosity: u8) -> Result<(), ValidationError> {
        self.alarm.set_sensor_thresholds(temperature, luminosity)
    }

    pub fn set_alarms_enabled(&self, enabled: bool) {
        self.alarm.set_enabled(enabled);
        self.display.show_alarms_enabled(enabled);
    }

    /// Silence the buzzer and erase the indicator letters.
    pub fn clear_alarm(&self, sink: &mut impl EventSink) {
        self.alarm.clear();
        self.redraw_indicators();
        sink.emit(&AppEvent::AlarmCleared);
    }

    pub fn delete_records(&self, sink: &mut impl EventSink) {
        self.records.clear();
        sink.emit(&AppEvent::RecordsDeleted);
        info!("Records deleted");
    }

    /// Current operator-tunable settings.
    pub fn settings_snapshot(&self) -> PersistedSettings {
        PersistedSettings::new(self.parameters.get(), self.alarm.thresholds())
    }

    // ── Internal ──────────────────────────────────────────────

    fn report_fired(&self, at: WallTime, fired: TriggerFlags, sink: &mut impl EventSink) {
        if fired.is_empty() {
            return;
        }
        self.redraw_indicators();
        sink.emit(&AppEvent::AlarmFired { at, triggers: fired });
    }

    /// Draw the indicators under the runtime lock, so a fire and a clear
    /// racing each other leave the letters of whichever ran last.
    fn redraw_indicators(&self) {
        self.alarm.with_runtime(|runtime| self.display.show_indicators(runtime.indicators));
    }
}
