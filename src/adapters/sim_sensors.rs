//! Simulated temperature and light sensors.
//!
//! Implements [`SensorPort`] for host runs and tests.  Each read advances
//! a deterministic drift pattern; a [`SensorControls`] handle can pin
//! either channel to a fixed value from another thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use crate::app::ports::SensorPort;
use crate::records::Luminosity;

/// Marks a channel as not overridden.
const UNSET: u16 = u16::MAX;

const BASE_TEMPERATURE_C: u8 = 22;
const TEMPERATURE_SWING_C: u32 = 4;
const LIGHT_CYCLE_STEPS: u32 = 20;

/// Shared override handle.
#[derive(Debug, Clone)]
pub struct SensorControls {
    temperature: Arc<AtomicU16>,
    light_permille: Arc<AtomicU16>,
}

impl SensorControls {
    fn new() -> Self {
        Self {
            temperature: Arc::new(AtomicU16::new(UNSET)),
            light_permille: Arc::new(AtomicU16::new(UNSET)),
        }
    }

    /// Pin the temperature reading, or release it with `None`.
    pub fn set_temperature(&self, celsius: Option<u8>) {
        let raw = celsius.map_or(UNSET, u16::from);
        self.temperature.store(raw, Ordering::Relaxed);
    }

    /// Pin the light fraction (0.0–1.0), or release it with `None`.
    pub fn set_light_fraction(&self, fraction: Option<f32>) {
        let raw = fraction.map_or(UNSET, |f| (f.clamp(0.0, 1.0) * 1000.0) as u16);
        self.light_permille.store(raw, Ordering::Relaxed);
    }
}

pub struct SimulatedSensors {
    controls: SensorControls,
    step: u32,
}

impl SimulatedSensors {
    pub fn new() -> Self {
        Self {
            controls: SensorControls::new(),
            step: 0,
        }
    }

    /// Handle for overriding readings.
    pub fn controls(&self) -> SensorControls {
        self.controls.clone()
    }

    fn next_step(&mut self) -> u32 {
        let step = self.step;
        self.step = self.step.wrapping_add(1);
        step
    }
}

impl Default for SimulatedSensors {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for SimulatedSensors {
    fn read_temperature(&mut self) -> u8 {
        let forced = self.controls.temperature.load(Ordering::Relaxed);
        if forced != UNSET {
            return forced as u8;
        }
        // Triangle wave around the base temperature.
        let phase = self.next_step() % (4 * TEMPERATURE_SWING_C);
        let offset = if phase < 2 * TEMPERATURE_SWING_C {
            phase
        } else {
            4 * TEMPERATURE_SWING_C - phase
        };
        BASE_TEMPERATURE_C - TEMPERATURE_SWING_C as u8 + offset as u8
    }

    fn read_luminosity(&mut self) -> Luminosity {
        let forced = self.controls.light_permille.load(Ordering::Relaxed);
        let fraction = if forced == UNSET {
            (self.step % LIGHT_CYCLE_STEPS) as f32 / LIGHT_CYCLE_STEPS as f32
        } else {
            f32::from(forced) / 1000.0
        };
        Luminosity::from_fraction(fraction)
    }
}
