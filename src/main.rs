//! Monitoring station main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SimulatedSensors  LogDisplay   LogBuzzer   LogEventSink       │
//! │  (SensorPort)      (Display)    (Buzzer)    (EventSink)        │
//! │  File/MemorySettingsStore (SettingsPort)                       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │                 Station (shared core)                  │    │
//! │  │  Clock · Parameters · Records · Alarm · Display        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Activities: Buzzer · Clock · Sampler · Processor (threads)    │
//! │  Console: stdin loop on the main thread                        │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `envmon [config.json]`.  Log level follows `RUST_LOG`
//! (default `info`).
#![deny(unused_must_use)]

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};

use envmon::activities;
use envmon::adapters::log_display::{LogBuzzer, LogDisplay};
use envmon::adapters::log_sink::LogEventSink;
use envmon::adapters::settings_store::{FileSettingsStore, MemorySettingsStore};
use envmon::adapters::sim_sensors::SimulatedSensors;
use envmon::app::ports::SettingsPort;
use envmon::app::service::Station;
use envmon::config::StationConfig;
use envmon::console::Console;

const PROMPT: &str = "CMD> ";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = load_config()?;
    match config.settings_path.clone() {
        Some(path) => run(&mut config, FileSettingsStore::new(path)),
        None => run(&mut config, MemorySettingsStore::new()),
    }
}

fn load_config() -> Result<StationConfig> {
    let Some(path) = std::env::args().nth(1) else {
        info!("No config file given, using defaults");
        return Ok(StationConfig::default());
    };
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let config = StationConfig::from_json(&text).with_context(|| format!("parsing {path}"))?;
    info!("Config loaded from {}", path);
    Ok(config)
}

fn run(config: &mut StationConfig, settings: impl SettingsPort) -> Result<()> {
    // ── Restore persisted settings ────────────────────────────
    match settings.load_settings() {
        Ok(Some(saved)) => {
            config.apply(&saved);
            info!("Persisted settings restored");
        }
        Ok(None) => {}
        Err(e) => warn!("Persisted settings ignored: {}", e),
    }

    // ── Core + activities ─────────────────────────────────────
    let mut sink = LogEventSink::new();
    let station = Arc::new(Station::new(config, LogDisplay::new()));
    station.start(&mut sink);

    let (links, _handles) = activities::spawn_all(&station, SimulatedSensors::new(), LogBuzzer::new(), sink)
        .context("spawning activities")?;

    let mut console = Console::new(station, links.sensor, links.processor, settings, sink);

    // ── Console loop ──────────────────────────────────────────
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "{PROMPT}")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            info!("Console input closed, exiting");
            return Ok(());
        }
        match console.execute_line(&line) {
            None => {}
            Some(Ok(reply)) => writeln!(stdout, "{reply}")?,
            Some(Err(e)) => writeln!(stdout, "Error: {e}")?,
        }
    }
}
