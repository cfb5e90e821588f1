//! Station configuration.
//!
//! [`StationConfig`] holds the startup values of every tunable setting.
//! It is read from an optional JSON file; settings persisted by the
//! operator ([`PersistedSettings`]) override it at startup.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::alarm::AlarmThresholds;
use crate::app::ports::StorageError;
use crate::clock::WallTime;
use crate::error::{Error, ValidationError};
use crate::parameters::Parameters;
use crate::records::Luminosity;

/// Startup configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    // --- Timing ---
    /// Sampler period in seconds (0 = deactivated)
    pub monitoring_period_secs: u8,
    /// Buzzer ringing time in seconds
    pub alarm_duration_secs: u8,
    /// Processor period in seconds (0 = deactivated)
    pub processing_period_secs: u8,

    // --- Alarms ---
    /// Alarm clock; 00:00:00 means none
    pub alarm_clock: WallTime,
    /// Temperature threshold in degrees Celsius (0-50)
    pub temperature_threshold: u8,
    /// Luminosity threshold (0-3)
    pub luminosity_threshold: u8,
    pub alarms_enabled: bool,

    // --- Clock ---
    /// Wall time at power-up
    pub start_clock: WallTime,

    // --- Storage ---
    /// File holding the persisted settings; in-memory only when absent
    pub settings_path: Option<String>,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            // Timing
            monitoring_period_secs: 5,
            alarm_duration_secs: 10,
            processing_period_secs: 10,

            // Alarms
            alarm_clock: WallTime::MIDNIGHT,
            temperature_threshold: 30,
            luminosity_threshold: Luminosity::MAX,
            alarms_enabled: false,

            // Clock
            start_clock: WallTime::MIDNIGHT,

            settings_path: None,
        }
    }
}

impl StationConfig {
    /// Parse a JSON document.  Missing fields take their default.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(text).map_err(|e| {
            warn!("Config: {}", e);
            Error::Config {
                line: e.line(),
                column: e.column(),
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply the console's range checks to every field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.parameters().validate()?;
        self.start_clock.validated()?;
        Luminosity::new(self.luminosity_threshold)?;
        self.thresholds().validate()
    }

    pub fn parameters(&self) -> Parameters {
        Parameters {
            monitoring_period_secs: self.monitoring_period_secs,
            alarm_duration_secs: self.alarm_duration_secs,
            processing_period_secs: self.processing_period_secs,
        }
    }

    pub fn thresholds(&self) -> AlarmThresholds {
        AlarmThresholds {
            alarm_clock: self.alarm_clock,
            temperature: self.temperature_threshold,
            luminosity: Luminosity::new(self.luminosity_threshold).unwrap_or(Luminosity::BRIGHT),
            enabled: self.alarms_enabled,
        }
    }

    /// Override the tunable settings with a persisted snapshot.
    pub fn apply(&mut self, settings: &PersistedSettings) {
        let p = settings.parameters;
        self.monitoring_period_secs = p.monitoring_period_secs;
        self.alarm_duration_secs = p.alarm_duration_secs;
        self.processing_period_secs = p.processing_period_secs;

        let t = settings.thresholds;
        self.alarm_clock = t.alarm_clock;
        self.temperature_threshold = t.temperature;
        self.luminosity_threshold = t.luminosity.level();
        self.alarms_enabled = t.enabled;
    }
}

// ───────────────────────────────────────────────────────────────
// Persisted settings
// ───────────────────────────────────────────────────────────────

/// Blob layout version.  Bump when the layout changes.
pub const SETTINGS_VERSION: u8 = 1;

/// Operator-tunable settings as stored by a [`SettingsPort`](crate::app::ports::SettingsPort).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSettings {
    pub version: u8,
    pub parameters: Parameters,
    pub thresholds: AlarmThresholds,
}

impl PersistedSettings {
    pub fn new(parameters: Parameters, thresholds: AlarmThresholds) -> Self {
        Self {
            version: SETTINGS_VERSION,
            parameters,
            thresholds,
        }
    }

    /// Encode as a postcard blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>, StorageError> {
        postcard::to_allocvec(self).map_err(|_| StorageError::Corrupted)
    }

    /// Decode and range-check a postcard blob.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        let settings: Self = postcard::from_bytes(bytes).map_err(|_| StorageError::Corrupted)?;
        if settings.version != SETTINGS_VERSION {
            return Err(StorageError::Corrupted);
        }
        settings.parameters.validate().map_err(|_| StorageError::Corrupted)?;
        settings.thresholds.validate().map_err(|_| StorageError::Corrupted)?;
        Ok(settings)
    }
}
