//! Parameter store.
//!
//! Holds the three operator-tunable timings behind one lock:
//!
//! | Parameter          | Range  | Zero means              |
//! |--------------------|--------|-------------------------|
//! | monitoring period  | 0–59 s | Sampler suspended       |
//! | alarm duration     | 0–59 s | alarms never ring       |
//! | processing period  | 0–59 s | Processor suspended     |
//!
//! Writing a period also drives the matching [`ActivityGate`] inside the
//! same critical section, so there is no window where an activity sees the
//! new value but misses the resume notification.

use std::sync::{Mutex, MutexGuard};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::scheduler::ActivityGate;

/// Largest accepted value for any parameter, in seconds.
pub const MAX_PARAMETER_SECS: u8 = 59;

/// Snapshot of the three timing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameters {
    pub monitoring_period_secs: u8,
    pub alarm_duration_secs: u8,
    pub processing_period_secs: u8,
}

impl Parameters {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for secs in [
            self.monitoring_period_secs,
            self.alarm_duration_secs,
            self.processing_period_secs,
        ] {
            check_secs(secs)?;
        }
        Ok(())
    }
}

/// Which parameter a write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    MonitoringPeriod,
    AlarmDuration,
    ProcessingPeriod,
}

/// The periodic activities whose period lives in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodicActivity {
    Sampler,
    Processor,
}

impl PeriodicActivity {
    pub fn name(self) -> &'static str {
        match self {
            Self::Sampler => "sampler",
            Self::Processor => "processor",
        }
    }
}

/// Effect of a parameter write on the periodic activity it controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodChange {
    /// Not a period, or the value did not change.
    Unchanged,
    /// Nonzero → nonzero: applies from the next period.
    Retimed,
    /// Nonzero → zero.
    Suspended(PeriodicActivity),
    /// Zero → nonzero.
    Resumed(PeriodicActivity),
}

/// Lock-guarded parameters plus the resume gates they control.
pub struct ParameterStore {
    values: Mutex<Parameters>,
    sampler_gate: ActivityGate,
    processor_gate: ActivityGate,
}

impl ParameterStore {
    pub fn new(initial: Parameters) -> Self {
        Self {
            values: Mutex::new(initial),
            sampler_gate: ActivityGate::new(),
            processor_gate: ActivityGate::new(),
        }
    }

    /// Current parameter triple.
    pub fn get(&self) -> Parameters {
        *self.lock()
    }

    /// Current period of one activity, in seconds (0 = suspended).
    pub fn period(&self, activity: PeriodicActivity) -> u8 {
        let values = self.lock();
        match activity {
            PeriodicActivity::Sampler => values.monitoring_period_secs,
            PeriodicActivity::Processor => values.processing_period_secs,
        }
    }

    pub fn alarm_duration(&self) -> u8 {
        self.lock().alarm_duration_secs
    }

    /// The resume gate of one activity.
    pub fn gate(&self, activity: PeriodicActivity) -> &ActivityGate {
        match activity {
            PeriodicActivity::Sampler => &self.sampler_gate,
            PeriodicActivity::Processor => &self.processor_gate,
        }
    }

    /// Validate and store one parameter.
    pub fn set(&self, kind: ParameterKind, secs: u8) -> Result<PeriodChange, ValidationError> {
        check_secs(secs)?;

        let mut values = self.lock();
        let (slot, activity) = match kind {
            ParameterKind::MonitoringPeriod => {
                (&mut values.monitoring_period_secs, Some(PeriodicActivity::Sampler))
            }
            ParameterKind::ProcessingPeriod => {
                (&mut values.processing_period_secs, Some(PeriodicActivity::Processor))
            }
            ParameterKind::AlarmDuration => (&mut values.alarm_duration_secs, None),
        };
        let previous = core::mem::replace(slot, secs);

        let Some(activity) = activity else {
            return Ok(PeriodChange::Unchanged);
        };

        // Gate updates stay inside the critical section.
        let change = match (previous, secs) {
            (old, new) if old == new => PeriodChange::Unchanged,
            (_, 0) => {
                self.gate(activity).close();
                PeriodChange::Suspended(activity)
            }
            (0, _) => {
                self.gate(activity).open();
                PeriodChange::Resumed(activity)
            }
            _ => PeriodChange::Retimed,
        };
        drop(values);

        match change {
            PeriodChange::Suspended(a) => info!("Parameters: {} suspended", a.name()),
            PeriodChange::Resumed(a) => info!("Parameters: {} resumed ({}s)", a.name(), secs),
            PeriodChange::Retimed => info!("Parameters: {} period {}s -> {}s", activity.name(), previous, secs),
            PeriodChange::Unchanged => {}
        }
        Ok(change)
    }

    fn lock(&self) -> MutexGuard<'_, Parameters> {
        self.values.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn check_secs(secs: u8) -> Result<(), ValidationError> {
    if secs > MAX_PARAMETER_SECS {
        return Err(ValidationError::InvalidPeriod);
    }
    Ok(())
}
