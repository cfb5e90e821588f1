//! Console integration tests: parse → execute → reply, with the
//! background activities running and both periodic activities suspended.

use std::sync::Arc;

use crate::mock_hw::{MockBuzzer, MockDisplay, MockSensors, MockSettings, RecordingSink};

use envmon::activities;
use envmon::app::service::Station;
use envmon::clock::WallTime;
use envmon::config::StationConfig;
use envmon::console::{Console, ConsoleError, Reply};
use envmon::error::{Error, ValidationError};
use envmon::records::{Luminosity, Record, RECORD_CAPACITY};
use envmon::statistics::StatisticsResult;

struct Rig {
    console: Console<MockSettings, RecordingSink>,
    station: Arc<Station>,
    sensors: MockSensors,
    settings: MockSettings,
}

fn rig() -> Rig {
    let config = StationConfig {
        monitoring_period_secs: 0,
        processing_period_secs: 0,
        ..StationConfig::default()
    };
    let station = Arc::new(Station::new(&config, MockDisplay::new()));
    let sensors = MockSensors::new(23, 2);
    let sink = RecordingSink::new();
    let (links, _handles) =
        activities::spawn_all(&station, sensors.clone(), MockBuzzer::new(), sink.clone()).unwrap();
    let settings = MockSettings::new();
    let console = Console::new(Arc::clone(&station), links.sensor, links.processor, settings.clone(), sink);
    Rig {
        console,
        station,
        sensors,
        settings,
    }
}

fn run(rig: &mut Rig, line: &str) -> Result<Reply, Error> {
    rig.console.execute_line(line).expect("non-blank line")
}

fn store(rig: &Rig, seconds: u8, temperature: u8) {
    rig.station.records().append(Record {
        time: WallTime::new(10, 0, seconds).unwrap(),
        temperature,
        luminosity: Luminosity::new(1).unwrap(),
    });
}

#[test]
fn blank_line_is_ignored() {
    let mut rig = rig();
    assert!(rig.console.execute_line("   \n").is_none());
}

#[test]
fn set_then_read_clock() {
    let mut rig = rig();
    assert_eq!(run(&mut rig, "sc 10 20 30"), Ok(Reply::ClockSet));
    let Ok(Reply::Clock(now)) = run(&mut rig, "rc") else {
        panic!("expected the clock");
    };
    // The clock activity may have ticked in between.
    assert_eq!((now.hours(), now.minutes()), (10, 20));
    assert!(now.seconds() >= 30);
}

#[test]
fn invalid_inputs_leave_state_unchanged() {
    let mut rig = rig();
    let before = rig.station.parameters().get();
    assert_eq!(run(&mut rig, "mmp 60"), Err(Error::Validation(ValidationError::InvalidPeriod)));
    assert_eq!(run(&mut rig, "sc 24 0 0"), Err(Error::Validation(ValidationError::InvalidTime)));
    assert_eq!(run(&mut rig, "dtl 51 0"), Err(Error::Validation(ValidationError::InvalidTemperature)));
    assert_eq!(run(&mut rig, "dtl 20 4"), Err(Error::Validation(ValidationError::InvalidLuminosity)));
    assert_eq!(run(&mut rig, "rp 1"), Err(Error::Console(ConsoleError::WrongArgumentCount)));
    assert_eq!(run(&mut rig, "zz"), Err(Error::Console(ConsoleError::UnknownCommand)));
    assert_eq!(rig.station.parameters().get(), before);
    assert_eq!(rig.station.alarm().thresholds().temperature, 30);
    assert_eq!(rig.settings.saves(), 0);
}

#[test]
fn read_sensors_is_answered_while_sampler_is_suspended() {
    let mut rig = rig();
    rig.sensors.set(27, 3);
    let Ok(Reply::Sensors(sample)) = run(&mut rig, "rtl") else {
        panic!("expected a sample");
    };
    assert_eq!(sample.temperature, 27);
    assert_eq!(sample.luminosity, Luminosity::BRIGHT);
    // A console read is not stored.
    assert!(rig.station.records().is_empty());
}

#[test]
fn statistics_are_answered_while_processor_is_suspended() {
    let mut rig = rig();
    assert_eq!(run(&mut rig, "pr"), Ok(Reply::Statistics(StatisticsResult::NoData)));
    store(&rig, 0, 10);
    store(&rig, 1, 20);
    store(&rig, 2, 30);

    let Ok(Reply::Statistics(StatisticsResult::Summary { count, temperature, .. })) = run(&mut rig, "pr") else {
        panic!("expected a summary");
    };
    assert_eq!(count, 3);
    assert!((temperature.mean - 20.0).abs() < f32::EPSILON);

    let Ok(Reply::Statistics(StatisticsResult::Summary { count, .. })) = run(&mut rig, "pr 10 0 1") else {
        panic!("expected a summary");
    };
    assert_eq!(count, 2);

    let Ok(Reply::Statistics(StatisticsResult::Summary { count, .. })) = run(&mut rig, "pr 10 0 0 10 0 1") else {
        panic!("expected a summary");
    };
    assert_eq!(count, 2);

    assert_eq!(
        run(&mut rig, "pr 10 0 1 10 0 0"),
        Err(Error::Validation(ValidationError::InvalidInterval))
    );
}

#[test]
fn record_listing_and_info() {
    let mut rig = rig();
    for s in 0..4 {
        store(&rig, s, 20 + s);
    }
    let Ok(Reply::Records(listed)) = run(&mut rig, "lr 2 1") else {
        panic!("expected records");
    };
    assert_eq!(listed.iter().map(|(i, r)| (*i, r.temperature)).collect::<Vec<_>>(), vec![(1, 21), (2, 22)]);

    let Ok(Reply::RecordInfo(info)) = run(&mut rig, "ir") else {
        panic!("expected info");
    };
    assert_eq!((info.capacity, info.valid, info.unread), (RECORD_CAPACITY, 4, 4));

    assert_eq!(
        run(&mut rig, &format!("lr {} 0", RECORD_CAPACITY + 1)),
        Err(Error::Validation(ValidationError::InvalidRecordCount))
    );
    assert_eq!(
        run(&mut rig, &format!("lr 1 {RECORD_CAPACITY}")),
        Err(Error::Validation(ValidationError::InvalidRecordIndex))
    );

    assert_eq!(run(&mut rig, "dr"), Ok(Reply::RecordsDeleted));
    assert!(rig.station.records().is_empty());
}

#[test]
fn alarm_commands_update_thresholds_and_persist() {
    let mut rig = rig();
    assert_eq!(run(&mut rig, "dac 7 30 0"), Ok(Reply::AlarmClockSet));
    assert_eq!(run(&mut rig, "dtl 28 2"), Ok(Reply::ThresholdsSet));
    assert_eq!(run(&mut rig, "aa A"), Ok(Reply::AlarmModeSet));
    assert_eq!(rig.settings.saves(), 3);

    let thresholds = rig.station.alarm().thresholds();
    assert!(thresholds.enabled);
    assert_eq!(thresholds.temperature, 28);
    assert_eq!(thresholds.alarm_clock, WallTime::new(7, 30, 0).unwrap());
    assert_eq!(rig.settings.last().map(|s| s.thresholds), Some(thresholds));

    let Ok(reply @ Reply::AlarmInfo { .. }) = run(&mut rig, "rai") else {
        panic!("expected alarm info");
    };
    let text = reply.to_string();
    assert!(text.contains("ALAH = 7, ALAM = 30, ALAS = 0"));
    assert!(text.contains("ALAT = 28, ALAL = 2, ALAF = A"));

    assert_eq!(run(&mut rig, "cai"), Ok(Reply::AlarmCleared));
}

#[test]
fn parameters_round_trip_and_persist() {
    let mut rig = rig();
    assert_eq!(run(&mut rig, "mta 4"), Ok(Reply::ParameterSet(envmon::parameters::ParameterKind::AlarmDuration)));
    let Ok(reply @ Reply::Parameters(_)) = run(&mut rig, "rp") else {
        panic!("expected parameters");
    };
    assert_eq!(reply.to_string(), "PMON = 0, TALA = 4, PPROC = 0 seconds");
    assert_eq!(rig.settings.last().map(|s| s.parameters.alarm_duration_secs), Some(4));
}

#[test]
fn persistence_failure_does_not_fail_the_command() {
    let mut rig = rig();
    rig.settings.fail.store(true, std::sync::atomic::Ordering::Relaxed);
    assert_eq!(run(&mut rig, "aa a"), Ok(Reply::AlarmModeSet));
    assert_eq!(rig.settings.saves(), 0);
}
