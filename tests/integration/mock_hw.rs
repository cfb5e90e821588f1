//! Mock ports for integration tests.
//!
//! Every mock shares its state through an `Arc` so tests can keep a handle
//! after the mock has been moved into the station or an activity thread.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use envmon::app::events::AppEvent;
use envmon::app::ports::{BuzzerPort, DisplayPort, EventSink, SensorPort, SettingsPort, StorageError};
use envmon::config::PersistedSettings;
use envmon::records::Luminosity;

// ── Sensors ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockSensors {
    pub temperature: Arc<AtomicU8>,
    pub luminosity: Arc<AtomicU8>,
    pub reads: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MockSensors {
    pub fn new(temperature: u8, luminosity: u8) -> Self {
        Self {
            temperature: Arc::new(AtomicU8::new(temperature)),
            luminosity: Arc::new(AtomicU8::new(luminosity)),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set(&self, temperature: u8, luminosity: u8) {
        self.temperature.store(temperature, Ordering::Relaxed);
        self.luminosity.store(luminosity, Ordering::Relaxed);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

impl SensorPort for MockSensors {
    fn read_temperature(&mut self) -> u8 {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.temperature.load(Ordering::Relaxed)
    }

    fn read_luminosity(&mut self) -> Luminosity {
        Luminosity::new(self.luminosity.load(Ordering::Relaxed)).unwrap()
    }
}

// ── Display ───────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockDisplay {
    pub writes: Arc<Mutex<Vec<(u8, u8, String)>>>,
}

#[allow(dead_code)]
impl MockDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last text written at `(row, col)`.
    pub fn at(&self, row: u8, col: u8) -> Option<String> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(r, c, _)| *r == row && *c == col)
            .map(|(_, _, text)| text.clone())
    }
}

impl DisplayPort for MockDisplay {
    fn render_at(&mut self, row: u8, col: u8, text: &str) {
        self.writes.lock().unwrap().push((row, col, text.to_owned()));
    }
}

// ── Buzzer ────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockBuzzer {
    pub on: Arc<AtomicBool>,
    pub switched_on: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MockBuzzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_on(&self) -> bool {
        self.on.load(Ordering::Relaxed)
    }
}

impl BuzzerPort for MockBuzzer {
    fn set_buzzer(&mut self, on: bool) {
        if on {
            self.switched_on.fetch_add(1, Ordering::Relaxed);
        }
        self.on.store(on, Ordering::Relaxed);
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink {
    pub events: Arc<Mutex<Vec<AppEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AppEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn contains(&self, wanted: impl Fn(&AppEvent) -> bool) -> bool {
        self.events.lock().unwrap().iter().any(wanted)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ── Settings ──────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockSettings {
    pub saved: Arc<Mutex<Option<PersistedSettings>>>,
    pub saves: Arc<AtomicUsize>,
    pub fail: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl MockSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    pub fn last(&self) -> Option<PersistedSettings> {
        *self.saved.lock().unwrap()
    }
}

impl SettingsPort for MockSettings {
    fn load_settings(&self) -> Result<Option<PersistedSettings>, StorageError> {
        Ok(self.last())
    }

    fn save_settings(&mut self, settings: &PersistedSettings) -> Result<(), StorageError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(StorageError::Io);
        }
        self.saves.fetch_add(1, Ordering::Relaxed);
        *self.saved.lock().unwrap() = Some(*settings);
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────

/// Poll `condition` every 20 ms until it holds or `timeout` elapses.
#[allow(dead_code)]
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    condition()
}
