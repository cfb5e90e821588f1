//! Integration tests for the Station step functions against mock ports.
//!
//! Steps are driven by hand here, one call per activity iteration, so
//! every assertion is deterministic.

use std::sync::Arc;

use crate::mock_hw::{MockDisplay, MockSensors, RecordingSink};

use envmon::alarm::{AlarmState, AlarmTrigger};
use envmon::app::events::AppEvent;
use envmon::app::service::Station;
use envmon::clock::WallTime;
use envmon::config::StationConfig;
use envmon::display as layout;
use envmon::parameters::{ParameterKind, PeriodicActivity};
use envmon::records::RECORD_CAPACITY;
use envmon::statistics::{Interval, StatisticsResult};

fn t(h: u8, m: u8, s: u8) -> WallTime {
    WallTime::new(h, m, s).unwrap()
}

fn make_station(config: StationConfig) -> (Station, MockDisplay, RecordingSink) {
    let display = MockDisplay::new();
    let station = Station::new(&config, display.clone());
    let mut sink = RecordingSink::new();
    station.start(&mut sink);
    (station, display, sink)
}

fn alarm_config() -> StationConfig {
    StationConfig {
        temperature_threshold: 25,
        alarms_enabled: true,
        alarm_duration_secs: 3,
        ..StationConfig::default()
    }
}

// ── Start-up ─────────────────────────────────────────────────

#[test]
fn start_draws_clock_and_enabled_flag() {
    let (_station, display, sink) = make_station(StationConfig {
        start_clock: t(8, 15, 0),
        ..StationConfig::default()
    });
    assert_eq!(display.at(0, 0).as_deref(), Some("08:15:00"));
    assert_eq!(display.at(layout::ENABLED_FLAG_ROW, layout::ENABLED_FLAG_COL).as_deref(), Some("a"));
    assert_eq!(sink.events(), vec![AppEvent::Started(t(8, 15, 0))]);
}

// ── Sampler ──────────────────────────────────────────────────

#[test]
fn sample_is_timestamped_with_the_shared_clock() {
    let (station, _display, mut sink) = make_station(StationConfig {
        start_clock: t(9, 0, 0),
        ..StationConfig::default()
    });
    let mut sensors = MockSensors::new(21, 2);
    station.clock_step(&mut sink);
    let record = station.sample_step(&mut sensors, &mut sink).unwrap();
    assert_eq!(record.time, t(9, 0, 1));
    assert_eq!(record.temperature, 21);
    assert_eq!(station.records().len(), 1);
}

#[test]
fn deactivated_sampler_does_no_work() {
    let (station, _display, mut sink) = make_station(StationConfig::default());
    let mut sensors = MockSensors::new(21, 2);
    station.set_parameter(ParameterKind::MonitoringPeriod, 0, &mut sink).unwrap();
    assert_eq!(station.sample_step(&mut sensors, &mut sink), None);
    assert_eq!(sensors.reads(), 0);
    assert!(station.records().is_empty());
    assert!(sink.contains(|e| *e == AppEvent::ActivitySuspended(PeriodicActivity::Sampler)));
}

#[test]
fn history_keeps_only_the_latest_records() {
    let (station, _display, mut sink) = make_station(StationConfig::default());
    let mut sensors = MockSensors::new(0, 0);
    for temperature in 0..=RECORD_CAPACITY as u8 {
        sensors.set(temperature, 0);
        station.sample_step(&mut sensors, &mut sink);
    }
    let info = station.records().info();
    assert_eq!(info.valid, RECORD_CAPACITY);
    let mut temps = Vec::new();
    station.records().scan(|r| temps.push(r.temperature));
    assert_eq!(temps, (1..=RECORD_CAPACITY as u8).collect::<Vec<_>>());
}

// ── Alarms ───────────────────────────────────────────────────

#[test]
fn hot_sample_rings_for_alarm_duration() {
    let (station, display, mut sink) = make_station(alarm_config());
    let mut sensors = MockSensors::new(30, 0);
    station.sample_step(&mut sensors, &mut sink);

    let rt = station.alarm().runtime();
    assert_eq!(rt.state, AlarmState::Ringing);
    assert_eq!(rt.remaining_ring_secs, 3);
    assert_eq!(
        display.at(layout::INDICATOR_ROW, layout::indicator_col(AlarmTrigger::Temperature)).as_deref(),
        Some("T")
    );
    assert!(sink.contains(|e| matches!(e, AppEvent::AlarmFired { triggers, .. } if triggers.contains(AlarmTrigger::Temperature))));

    assert!(station.countdown_step(&mut sink));
    assert!(station.countdown_step(&mut sink));
    assert!(!station.countdown_step(&mut sink));
    assert_eq!(station.alarm().runtime().state, AlarmState::Idle);
    assert!(sink.contains(|e| *e == AppEvent::AlarmFinished));
}

#[test]
fn clear_silences_and_erases_indicators() {
    let (station, display, mut sink) = make_station(alarm_config());
    let mut sensors = MockSensors::new(30, 0);
    station.sample_step(&mut sensors, &mut sink);
    station.clear_alarm(&mut sink);

    assert_eq!(station.alarm().runtime().state, AlarmState::Idle);
    assert_eq!(
        display.at(layout::INDICATOR_ROW, layout::indicator_col(AlarmTrigger::Temperature)).as_deref(),
        Some(" ")
    );
    // Cleared mid-ring: the countdown has nothing left to do.
    assert!(!station.countdown_step(&mut sink));
    assert!(!sink.contains(|e| *e == AppEvent::AlarmFinished));
}

#[test]
fn indicators_match_runtime_after_fires_race_clears() {
    let display = MockDisplay::new();
    let station = Arc::new(Station::new(&alarm_config(), display.clone()));

    let sampler = {
        let station = Arc::clone(&station);
        std::thread::spawn(move || {
            let mut sensors = MockSensors::new(30, 0);
            let mut sink = RecordingSink::new();
            for i in 0..500 {
                // Alternate hot and cold so every hot sample fires again.
                sensors.set(if i % 2 == 0 { 30 } else { 20 }, 0);
                station.sample_step(&mut sensors, &mut sink);
            }
        })
    };
    let mut sink = RecordingSink::new();
    for _ in 0..500 {
        station.clear_alarm(&mut sink);
    }
    sampler.join().unwrap();

    let lit = station.alarm().runtime().indicators.contains(AlarmTrigger::Temperature);
    assert_eq!(
        display.at(layout::INDICATOR_ROW, layout::indicator_col(AlarmTrigger::Temperature)).as_deref(),
        Some(if lit { "T" } else { " " })
    );
}

#[test]
fn clock_alarm_fires_when_the_time_is_reached() {
    let (station, display, mut sink) = make_station(StationConfig {
        start_clock: t(6, 59, 58),
        alarms_enabled: true,
        ..StationConfig::default()
    });
    station.define_alarm_clock(t(7, 0, 0));
    station.clock_step(&mut sink);
    assert_eq!(station.alarm().runtime().state, AlarmState::Idle);
    station.clock_step(&mut sink);
    assert_eq!(station.alarm().runtime().state, AlarmState::Ringing);
    assert_eq!(display.at(0, 11).as_deref(), Some("C"));
    assert_eq!(display.at(0, 0).as_deref(), Some("07:00:00"));
}

#[test]
fn clock_wraps_at_midnight() {
    let (station, _display, mut sink) = make_station(StationConfig {
        start_clock: t(23, 59, 59),
        ..StationConfig::default()
    });
    assert_eq!(station.clock_step(&mut sink), WallTime::MIDNIGHT);
}

// ── Processor ────────────────────────────────────────────────

#[test]
fn processor_shows_records_oldest_first() {
    let (station, display, mut sink) = make_station(StationConfig {
        start_clock: t(12, 0, 0),
        ..StationConfig::default()
    });
    let mut sensors = MockSensors::new(18, 1);
    station.sample_step(&mut sensors, &mut sink);
    sensors.set(19, 2);
    station.sample_step(&mut sensors, &mut sink);

    assert_eq!(station.process_step().map(|r| r.temperature), Some(18));
    assert_eq!(display.at(1, 0).as_deref(), Some("12:00:00 T:18C L:1"));
    assert_eq!(station.process_step().map(|r| r.temperature), Some(19));
    assert_eq!(station.process_step(), None);
}

#[test]
fn statistics_over_stored_samples() {
    let (station, _display, mut sink) = make_station(StationConfig::default());
    let mut sensors = MockSensors::new(0, 0);
    for temperature in [10, 20, 30] {
        sensors.set(temperature, 1);
        station.sample_step(&mut sensors, &mut sink);
    }
    match station.statistics(Interval::All).unwrap() {
        StatisticsResult::Summary { count, temperature, .. } => {
            assert_eq!(count, 3);
            assert_eq!((temperature.max, temperature.min), (30, 10));
            assert!((temperature.mean - 20.0).abs() < f32::EPSILON);
        }
        StatisticsResult::NoData => panic!("expected a summary"),
    }
    assert_eq!(station.statistics(Interval::From(t(1, 0, 0))), Ok(StatisticsResult::NoData));
}

#[test]
fn delete_records_empties_history() {
    let (station, _display, mut sink) = make_station(StationConfig::default());
    let mut sensors = MockSensors::new(20, 0);
    station.sample_step(&mut sensors, &mut sink);
    station.delete_records(&mut sink);
    assert!(station.records().is_empty());
    assert_eq!(station.process_step(), None);
    assert!(sink.contains(|e| *e == AppEvent::RecordsDeleted));
}
