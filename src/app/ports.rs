//! Port traits: the hexagonal boundary between the station core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Station (domain)
//! ```
//!
//! Driven adapters (sensors, display, buzzer, event sinks, settings storage)
//! implement these traits.  Activities own the adapter they drive and pass
//! it to the [`Station`](super::service::Station) step functions, so the
//! domain core never touches hardware directly.

use core::fmt;

use crate::config::PersistedSettings;
use crate::records::Luminosity;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the Sampler calls this to obtain a fresh sample.
pub trait SensorPort {
    /// Temperature in whole degrees Celsius.
    fn read_temperature(&mut self) -> u8;

    /// Bucketed light level.
    fn read_luminosity(&mut self) -> Luminosity;
}

// ───────────────────────────────────────────────────────────────
// Display and buzzer ports (driven adapters: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Character display addressed by row and column.
pub trait DisplayPort {
    fn render_at(&mut self, row: u8, col: u8, text: &str);
}

/// Alarm buzzer.
pub trait BuzzerPort {
    fn set_buzzer(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Settings port (driven adapter: domain ↔ persistent storage)
// ───────────────────────────────────────────────────────────────

/// Persists the operator-tunable settings across restarts.
///
/// Implementations store whatever they are given; range validation happens
/// before a snapshot reaches the port, and again after loading.
pub trait SettingsPort {
    /// Load the last saved snapshot.  `Ok(None)` on first start.
    fn load_settings(&self) -> Result<Option<PersistedSettings>, StorageError>;

    /// Replace the stored snapshot.
    fn save_settings(&mut self, settings: &PersistedSettings) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`SettingsPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Stored blob failed to decode or validate.
    Corrupted,
    /// Generic I/O error from the storage backend.
    Io,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted => write!(f, "settings corrupted"),
            Self::Io => write!(f, "I/O error"),
        }
    }
}
