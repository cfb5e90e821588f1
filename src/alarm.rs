//! Alarm engine.
//!
//! Evaluates the clock alarm and the two sensor thresholds, and owns the
//! buzzer state machine:
//!
//! ```text
//!                 fire (duration > 0)
//!   ┌──────┐  ───────────────────────▶  ┌───────────┐     ┌─────────┐
//!   │ Idle │                            │ Triggered │ ──▶ │ Ringing │ ─┐
//!   └──────┘  ◀──── countdown == 0 ──── └───────────┘     └─────────┘  │ fire:
//!      ▲   ◀──────────── clear ────────────────────────────────┘  ◀───┘ refresh
//!      └── fire (duration == 0): indicator only
//! ```
//!
//! ## Trigger lifecycle
//!
//! 1. A condition fires: its bit is set in `indicators`, the countdown is
//!    loaded with the alarm duration and the Buzzer activity is signalled.
//! 2. Sensor conditions are also *latched*: they fire once per crossing
//!    and re-arm only after a sample below the threshold.
//! 3. Redefining the thresholds or re-enabling alarms re-arms both sensor
//!    conditions.  Clearing the alarm does not.
//!
//! Lock order is thresholds → runtime.  The runtime lock is never held
//! while taking the thresholds lock.

use core::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::clock::WallTime;
use crate::error::ValidationError;
use crate::records::{Luminosity, Sample};

/// Highest accepted temperature threshold, in degrees Celsius.
pub const MAX_TEMPERATURE_THRESHOLD: u8 = 50;

// ───────────────────────────────────────────────────────────────
// Triggers
// ───────────────────────────────────────────────────────────────

/// One alarm condition.  The discriminant is its bit in [`TriggerFlags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AlarmTrigger {
    Clock = 0b0000_0001,
    Temperature = 0b0000_0010,
    Luminosity = 0b0000_0100,
}

impl AlarmTrigger {
    pub const ALL: [Self; 3] = [Self::Clock, Self::Temperature, Self::Luminosity];

    pub const fn mask(self) -> u8 {
        self as u8
    }

    /// Indicator letter shown on the display.
    pub const fn letter(self) -> char {
        match self {
            Self::Clock => 'C',
            Self::Temperature => 'T',
            Self::Luminosity => 'L',
        }
    }
}

impl fmt::Display for AlarmTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clock => write!(f, "clock"),
            Self::Temperature => write!(f, "temperature"),
            Self::Luminosity => write!(f, "luminosity"),
        }
    }
}

/// Set of [`AlarmTrigger`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerFlags(u8);

impl TriggerFlags {
    pub const EMPTY: Self = Self(0);

    pub fn contains(self, trigger: AlarmTrigger) -> bool {
        self.0 & trigger.mask() != 0
    }

    pub fn insert(&mut self, trigger: AlarmTrigger) {
        self.0 |= trigger.mask();
    }

    pub fn remove(&mut self, trigger: AlarmTrigger) {
        self.0 &= !trigger.mask();
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = AlarmTrigger> {
        AlarmTrigger::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl From<AlarmTrigger> for TriggerFlags {
    fn from(trigger: AlarmTrigger) -> Self {
        Self(trigger.mask())
    }
}

impl fmt::Display for TriggerFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        for trigger in self.iter() {
            write!(f, "{}", trigger.letter())?;
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// State
// ───────────────────────────────────────────────────────────────

/// Operator-defined alarm configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmThresholds {
    /// 00:00:00 means no clock alarm.
    pub alarm_clock: WallTime,
    /// Degrees Celsius, 0–50.
    pub temperature: u8,
    pub luminosity: Luminosity,
    pub enabled: bool,
}

impl AlarmThresholds {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.alarm_clock.validated()?;
        check_sensor_thresholds(self.temperature, self.luminosity.level())?;
        Ok(())
    }
}

impl Default for AlarmThresholds {
    fn default() -> Self {
        Self {
            alarm_clock: WallTime::MIDNIGHT,
            temperature: 30,
            luminosity: Luminosity::BRIGHT,
            enabled: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlarmState {
    #[default]
    Idle,
    /// A condition fired; the countdown is being armed.
    Triggered,
    Ringing,
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Triggered => write!(f, "triggered"),
            Self::Ringing => write!(f, "ringing"),
        }
    }
}

/// Mutable alarm state shared by the Clock, Sampler and Buzzer activities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlarmRuntime {
    pub state: AlarmState,
    pub remaining_ring_secs: u8,
    /// Conditions that fired since the last clear.
    pub indicators: TriggerFlags,
    /// Sensor conditions waiting for a below-threshold sample.
    pub latched: TriggerFlags,
}

/// Outcome of one [`AlarmEngine::countdown_tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    /// Still ringing, with this many seconds left.
    Ringing(u8),
    /// This tick ended the ringing.
    Finished,
    /// Nothing was ringing (cleared meanwhile).
    NotRinging,
}

/// Command delivered to the Buzzer activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerSignal {
    Ring,
    Silence,
}

// ───────────────────────────────────────────────────────────────
// AlarmEngine
// ───────────────────────────────────────────────────────────────

pub struct AlarmEngine {
    thresholds: Mutex<AlarmThresholds>,
    runtime: Mutex<AlarmRuntime>,
    buzzer: Signal<CriticalSectionRawMutex, BuzzerSignal>,
}

impl AlarmEngine {
    pub fn new(thresholds: AlarmThresholds) -> Self {
        Self {
            thresholds: Mutex::new(thresholds),
            runtime: Mutex::new(AlarmRuntime::default()),
            buzzer: Signal::new(),
        }
    }

    pub fn thresholds(&self) -> AlarmThresholds {
        *self.lock_thresholds()
    }

    pub fn runtime(&self) -> AlarmRuntime {
        *self.lock_runtime()
    }

    /// Run `f` with the runtime locked, so nothing fires or clears until
    /// it returns.
    pub fn with_runtime<R>(&self, f: impl FnOnce(&AlarmRuntime) -> R) -> R {
        f(&self.lock_runtime())
    }

    /// Fire the clock alarm if `now` matches a configured alarm time.
    /// Returns the conditions that fired.
    pub fn check_clock(&self, now: WallTime, duration_secs: u8) -> TriggerFlags {
        let thresholds = self.lock_thresholds();
        let clock = thresholds.alarm_clock;
        if !thresholds.enabled || clock.is_midnight() || clock != now {
            return TriggerFlags::EMPTY;
        }
        let mut runtime = self.lock_runtime();
        self.fire(&mut runtime, AlarmTrigger::Clock, duration_secs);
        AlarmTrigger::Clock.into()
    }

    /// Evaluate both sensor thresholds against a fresh sample.
    /// Returns the conditions that fired.
    pub fn check_sample(&self, sample: &Sample, duration_secs: u8) -> TriggerFlags {
        let thresholds = self.lock_thresholds();
        let mut runtime = self.lock_runtime();
        let mut fired = TriggerFlags::EMPTY;

        let conditions = [
            (AlarmTrigger::Temperature, sample.temperature >= thresholds.temperature),
            (AlarmTrigger::Luminosity, sample.luminosity >= thresholds.luminosity),
        ];
        for (trigger, above) in conditions {
            if !above {
                runtime.latched.remove(trigger);
                continue;
            }
            if !thresholds.enabled || runtime.latched.contains(trigger) {
                continue;
            }
            runtime.latched.insert(trigger);
            self.fire(&mut runtime, trigger, duration_secs);
            fired.insert(trigger);
        }
        fired
    }

    /// One second of ringing has elapsed.
    pub fn countdown_tick(&self) -> Countdown {
        let mut runtime = self.lock_runtime();
        if runtime.state != AlarmState::Ringing {
            return Countdown::NotRinging;
        }
        runtime.remaining_ring_secs = runtime.remaining_ring_secs.saturating_sub(1);
        if runtime.remaining_ring_secs > 0 {
            return Countdown::Ringing(runtime.remaining_ring_secs);
        }
        runtime.state = AlarmState::Idle;
        info!("Alarm: countdown finished");
        Countdown::Finished
    }

    /// Silence the buzzer and erase the indicators.  Latched sensor
    /// conditions stay latched.
    pub fn clear(&self) {
        let mut runtime = self.lock_runtime();
        runtime.state = AlarmState::Idle;
        runtime.remaining_ring_secs = 0;
        runtime.indicators = TriggerFlags::EMPTY;
        drop(runtime);
        self.buzzer.signal(BuzzerSignal::Silence);
        info!("Alarm: cleared");
    }

    /// Set the alarm clock.  00:00:00 disables the clock alarm.
    pub fn set_clock_alarm(&self, time: WallTime) {
        self.lock_thresholds().alarm_clock = time;
        info!("Alarm: clock alarm set to {}", time);
    }

    /// Set both sensor thresholds and re-arm the sensor conditions.
    pub fn set_sensor_thresholds(&self, temperature: u8, luminosity: u8) -> Result<(), ValidationError> {
        check_sensor_thresholds(temperature, luminosity)?;
        let mut thresholds = self.lock_thresholds();
        thresholds.temperature = temperature;
        thresholds.luminosity = Luminosity::new(luminosity)?;
        self.lock_runtime().latched = TriggerFlags::EMPTY;
        drop(thresholds);
        info!("Alarm: thresholds T>={} L>={}", temperature, luminosity);
        Ok(())
    }

    /// Enable or disable every alarm condition.  Enabling re-arms the
    /// sensor conditions.
    pub fn set_enabled(&self, enabled: bool) {
        let mut thresholds = self.lock_thresholds();
        if enabled && !thresholds.enabled {
            self.lock_runtime().latched = TriggerFlags::EMPTY;
        }
        thresholds.enabled = enabled;
        drop(thresholds);
        info!("Alarm: {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Wait for the next command addressed to the Buzzer activity.
    pub async fn next_buzzer_signal(&self) -> BuzzerSignal {
        self.buzzer.wait().await
    }

    // ── Internal ──────────────────────────────────────────────────

    /// Idle/Ringing → Triggered → Ringing, or back to Idle when the
    /// duration is zero.  Caller holds the runtime lock.
    fn fire(&self, runtime: &mut AlarmRuntime, trigger: AlarmTrigger, duration_secs: u8) {
        runtime.indicators.insert(trigger);
        runtime.state = AlarmState::Triggered;
        runtime.remaining_ring_secs = duration_secs;
        if duration_secs == 0 {
            runtime.state = AlarmState::Idle;
            debug!("Alarm: {} fired with zero duration", trigger);
            return;
        }
        runtime.state = AlarmState::Ringing;
        self.buzzer.signal(BuzzerSignal::Ring);
        info!("Alarm: {} fired, ringing {}s", trigger, duration_secs);
    }

    fn lock_thresholds(&self) -> MutexGuard<'_, AlarmThresholds> {
        self.thresholds.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_runtime(&self) -> MutexGuard<'_, AlarmRuntime> {
        self.runtime.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn check_sensor_thresholds(temperature: u8, luminosity: u8) -> Result<(), ValidationError> {
    if temperature > MAX_TEMPERATURE_THRESHOLD {
        return Err(ValidationError::InvalidTemperature);
    }
    if luminosity > Luminosity::MAX {
        return Err(ValidationError::InvalidLuminosity);
    }
    Ok(())
}
