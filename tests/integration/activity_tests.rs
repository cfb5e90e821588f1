//! Threaded tests: the real activity loops running against mock ports.
//!
//! These take a few seconds each because the activities run on
//! one-second periods.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::mock_hw::{MockBuzzer, MockDisplay, MockSensors, RecordingSink, wait_until};

use envmon::activities;
use envmon::alarm::AlarmState;
use envmon::app::events::AppEvent;
use envmon::app::service::Station;
use envmon::clock::WallTime;
use envmon::config::StationConfig;
use envmon::parameters::{ParameterKind, PeriodChange, PeriodicActivity};
use envmon::records::{Luminosity, Sample};

struct Running {
    station: Arc<Station>,
    sensors: MockSensors,
    buzzer: MockBuzzer,
    sink: RecordingSink,
}

fn start(config: StationConfig, sensors: MockSensors) -> Running {
    let station = Arc::new(Station::new(&config, MockDisplay::new()));
    let buzzer = MockBuzzer::new();
    let sink = RecordingSink::new();
    let (_links, _handles) =
        activities::spawn_all(&station, sensors.clone(), buzzer.clone(), sink.clone()).unwrap();
    Running {
        station,
        sensors,
        buzzer,
        sink,
    }
}

#[test]
fn clock_activity_ticks_every_second() {
    let rig = start(
        StationConfig {
            start_clock: WallTime::new(1, 0, 0).unwrap(),
            ..StationConfig::default()
        },
        MockSensors::new(20, 0),
    );
    assert!(wait_until(Duration::from_secs(3), || {
        rig.station.clock().now() >= WallTime::new(1, 0, 2).unwrap()
    }));
}

#[test]
fn zero_period_suspends_sampler_and_nonzero_resumes_it() {
    let rig = start(
        StationConfig {
            monitoring_period_secs: 1,
            processing_period_secs: 0,
            ..StationConfig::default()
        },
        MockSensors::new(20, 0),
    );
    let mut sink = rig.sink.clone();

    assert!(wait_until(Duration::from_secs(3), || rig.station.records().len() >= 1));

    let change = rig
        .station
        .set_parameter(ParameterKind::MonitoringPeriod, 0, &mut sink)
        .unwrap();
    assert_eq!(change, PeriodChange::Suspended(PeriodicActivity::Sampler));
    // Let a step that was already past its period check finish.
    std::thread::sleep(Duration::from_millis(100));
    let suspended_at = rig.station.records().len();
    let reads_at = rig.sensors.reads();
    std::thread::sleep(Duration::from_millis(2500));
    assert_eq!(rig.station.records().len(), suspended_at);
    assert_eq!(rig.sensors.reads(), reads_at);

    let change = rig
        .station
        .set_parameter(ParameterKind::MonitoringPeriod, 1, &mut sink)
        .unwrap();
    assert_eq!(change, PeriodChange::Resumed(PeriodicActivity::Sampler));
    assert!(wait_until(Duration::from_secs(3), || {
        rig.station.records().len() > suspended_at
    }));
}

#[test]
fn shortened_monitoring_period_applies_from_the_next_period() {
    let rig = start(
        StationConfig {
            monitoring_period_secs: 2,
            processing_period_secs: 0,
            ..StationConfig::default()
        },
        MockSensors::new(20, 0),
    );
    let mut sink = rig.sink.clone();

    let change = rig
        .station
        .set_parameter(ParameterKind::MonitoringPeriod, 1, &mut sink)
        .unwrap();
    assert_eq!(change, PeriodChange::Retimed);

    // The pending 2 s period runs out, then samples follow 1 s apart.
    assert!(wait_until(Duration::from_millis(2500), || rig.station.records().len() >= 1));
    let first = Instant::now();
    assert!(
        wait_until(Duration::from_millis(2400), || rig.station.records().len() >= 3),
        "only {} records {:?} after the first",
        rig.station.records().len(),
        first.elapsed()
    );
}

#[test]
fn processor_drains_unread_records() {
    let rig = start(
        StationConfig {
            monitoring_period_secs: 0,
            processing_period_secs: 1,
            ..StationConfig::default()
        },
        MockSensors::new(20, 0),
    );
    for s in 0..2 {
        rig.station.records().append(envmon::records::Record {
            time: WallTime::new(0, 0, s).unwrap(),
            temperature: 20,
            luminosity: envmon::records::Luminosity::default(),
        });
    }
    assert!(wait_until(Duration::from_secs(4), || rig.station.records().info().unread == 0));
    // Draining does not shrink the history.
    assert_eq!(rig.station.records().len(), 2);
}

#[test]
fn buzzer_rings_for_alarm_duration_then_stops() {
    let rig = start(
        StationConfig {
            monitoring_period_secs: 1,
            processing_period_secs: 0,
            alarm_duration_secs: 2,
            temperature_threshold: 25,
            alarms_enabled: true,
            ..StationConfig::default()
        },
        MockSensors::new(30, 0),
    );

    assert!(wait_until(Duration::from_secs(3), || rig.buzzer.is_on()));
    assert!(wait_until(Duration::from_secs(4), || !rig.buzzer.is_on()));
    assert_eq!(rig.station.alarm().runtime().state, AlarmState::Idle);
    assert!(rig.sink.contains(|e| *e == AppEvent::AlarmFinished));
}

#[test]
fn clear_stops_the_buzzer_immediately() {
    let rig = start(
        StationConfig {
            monitoring_period_secs: 1,
            processing_period_secs: 0,
            alarm_duration_secs: 30,
            temperature_threshold: 25,
            alarms_enabled: true,
            ..StationConfig::default()
        },
        MockSensors::new(30, 0),
    );
    let mut sink = rig.sink.clone();

    assert!(wait_until(Duration::from_secs(3), || rig.buzzer.is_on()));
    rig.station.clear_alarm(&mut sink);
    assert!(wait_until(Duration::from_millis(500), || !rig.buzzer.is_on()));
    assert_eq!(rig.station.alarm().runtime().state, AlarmState::Idle);
}

#[test]
fn refreshed_alarm_rings_a_full_duration_from_the_refresh() {
    let rig = start(
        StationConfig {
            monitoring_period_secs: 0,
            processing_period_secs: 0,
            alarm_duration_secs: 2,
            temperature_threshold: 25,
            alarms_enabled: true,
            ..StationConfig::default()
        },
        MockSensors::new(20, 0),
    );
    let alarm = rig.station.alarm();
    let hot = Sample {
        temperature: 30,
        luminosity: Luminosity::default(),
    };
    let cold = Sample { temperature: 20, ..hot };

    assert!(!alarm.check_sample(&hot, 2).is_empty());
    assert!(wait_until(Duration::from_secs(1), || rig.buzzer.is_on()));

    // One decrement has happened; fire again to restart the countdown.
    std::thread::sleep(Duration::from_millis(1500));
    alarm.check_sample(&cold, 2);
    assert!(!alarm.check_sample(&hot, 2).is_empty());
    let refreshed = Instant::now();

    std::thread::sleep(Duration::from_millis(1750));
    assert!(rig.buzzer.is_on(), "stopped within {:?} of the refresh", refreshed.elapsed());
    assert!(wait_until(Duration::from_secs(1), || !rig.buzzer.is_on()));
    assert_eq!(alarm.runtime().state, AlarmState::Idle);
}
