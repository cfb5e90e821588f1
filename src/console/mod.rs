//! Operator console.
//!
//! ```text
//!  stdin line ──▶ parse_command ──▶ Console::execute ──▶ Reply (Display)
//!                                        │
//!                     ┌──────────────────┼───────────────────┐
//!                     ▼                  ▼                   ▼
//!                  Station      Sensor/Processor link   SettingsPort
//!               (direct reads    (rendezvous, blocks)    (after writes)
//!                and writes)
//! ```
//!
//! Queries that need a fresh sensor reading or a statistics pass go through
//! the rendezvous links, so they are answered by the activity that owns
//! that work, even while its period is zero.

use core::fmt;
use std::sync::Arc;

use log::warn;

use crate::alarm::{AlarmRuntime, AlarmThresholds};
use crate::app::commands::{Command, IntervalArgs};
use crate::app::ports::{EventSink, SettingsPort};
use crate::app::service::Station;
use crate::channels::{ProcessorRequest, ProcessorRequester, SensorRequest, SensorRequester};
use crate::clock::WallTime;
use crate::error::{Error, ValidationError};
use crate::parameters::{ParameterKind, Parameters};
use crate::records::{BufferInfo, Record, Sample};
use crate::statistics::{Interval, StatisticsResult};

mod parser;

pub use parser::{MAX_ARGS, parse_command};

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

/// A console line that could not be turned into a [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleError {
    UnknownCommand,
    WrongArgumentCount,
    /// An argument is not an unsigned decimal number.
    InvalidNumber,
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCommand => write!(f, "unknown command"),
            Self::WrongArgumentCount => write!(f, "invalid number of arguments"),
            Self::InvalidNumber => write!(f, "invalid number"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Replies
// ───────────────────────────────────────────────────────────────

/// One line in the help listing.
pub const HELP: &[(&str, &str)] = &[
    ("sos", "list commands"),
    ("rc", "read clock"),
    ("sc h m s", "set clock"),
    ("rtl", "read temperature and luminosity"),
    ("rp", "read parameters (pmon, tala, pproc)"),
    ("mmp p", "set monitoring period (0 deactivates)"),
    ("mta t", "set alarm duration"),
    ("mpp p", "set processing period (0 deactivates)"),
    ("rai", "read alarm info"),
    ("dac h m s", "define alarm clock (0 0 0 = none)"),
    ("dtl T L", "define temperature and luminosity thresholds"),
    ("aa A|a", "activate/deactivate alarms"),
    ("cai", "clear alarm info"),
    ("ir", "record store info"),
    ("lr n i", "list n records from index i (0 = oldest)"),
    ("dr", "delete records"),
    ("pr [h m s [h m s]]", "process records (all, from t1, t1 to t2)"),
];

/// Successful outcome of a console command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Help,
    Clock(WallTime),
    ClockSet,
    Sensors(Sample),
    Parameters(Parameters),
    ParameterSet(ParameterKind),
    AlarmInfo {
        thresholds: AlarmThresholds,
        runtime: AlarmRuntime,
    },
    AlarmClockSet,
    ThresholdsSet,
    AlarmModeSet,
    AlarmCleared,
    RecordInfo(BufferInfo),
    Records(Vec<(usize, Record)>),
    RecordsDeleted,
    Statistics(StatisticsResult),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Help => {
                for (usage, meaning) in HELP {
                    writeln!(f, "{usage:<20} {meaning}")?;
                }
                Ok(())
            }
            Self::Clock(time) => write!(f, "Current clock: {time}"),
            Self::ClockSet => write!(f, "Clock correctly set!"),
            Self::Sensors(sample) => write!(
                f,
                "Temperature = {} C, Luminosity = {}",
                sample.temperature, sample.luminosity
            ),
            Self::Parameters(p) => write!(
                f,
                "PMON = {}, TALA = {}, PPROC = {} seconds",
                p.monitoring_period_secs, p.alarm_duration_secs, p.processing_period_secs
            ),
            Self::ParameterSet(kind) => match kind {
                ParameterKind::MonitoringPeriod => write!(f, "Monitoring period correctly set!"),
                ParameterKind::AlarmDuration => write!(f, "Alarm duration correctly set!"),
                ParameterKind::ProcessingPeriod => write!(f, "Processing period correctly set!"),
            },
            Self::AlarmInfo { thresholds, runtime } => {
                let clock = thresholds.alarm_clock;
                writeln!(
                    f,
                    "ALAH = {}, ALAM = {}, ALAS = {}",
                    clock.hours(),
                    clock.minutes(),
                    clock.seconds()
                )?;
                writeln!(
                    f,
                    "ALAT = {}, ALAL = {}, ALAF = {}",
                    thresholds.temperature,
                    thresholds.luminosity,
                    if thresholds.enabled { 'A' } else { 'a' }
                )?;
                write!(
                    f,
                    "State = {}, remaining = {} s, indicators = {}",
                    runtime.state, runtime.remaining_ring_secs, runtime.indicators
                )
            }
            Self::AlarmClockSet => write!(f, "Alarm clock correctly set!"),
            Self::ThresholdsSet => write!(f, "Sensor thresholds correctly set!"),
            Self::AlarmModeSet => write!(f, "Alarm mode correctly set!"),
            Self::AlarmCleared => write!(f, "Alarm info cleared!"),
            Self::RecordInfo(info) => write!(
                f,
                "NR = {}, nr = {}, wi = {}, ri = {}, unread = {}",
                info.capacity, info.valid, info.write_index, info.read_index, info.unread
            ),
            Self::Records(records) => {
                if records.is_empty() {
                    return write!(f, "No records");
                }
                for (i, (index, record)) in records.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "Record {index}: {record}")?;
                }
                Ok(())
            }
            Self::RecordsDeleted => write!(f, "Records deleted!"),
            Self::Statistics(StatisticsResult::NoData) => write!(f, "No records in the interval"),
            Self::Statistics(StatisticsResult::Summary {
                count,
                temperature,
                luminosity,
            }) => {
                writeln!(f, "Records = {count}")?;
                writeln!(
                    f,
                    "Temperature (max, min, mean) = {}, {}, {:.6}",
                    temperature.max, temperature.min, temperature.mean
                )?;
                write!(
                    f,
                    "Luminosity (max, min, mean) = {}, {}, {:.6}",
                    luminosity.max, luminosity.min, luminosity.mean
                )
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Console
// ───────────────────────────────────────────────────────────────

/// Executes operator commands against the station.
pub struct Console<P: SettingsPort, E: EventSink> {
    station: Arc<Station>,
    sensor: SensorRequester,
    processor: ProcessorRequester,
    settings: P,
    sink: E,
}

impl<P: SettingsPort, E: EventSink> Console<P, E> {
    pub fn new(
        station: Arc<Station>,
        sensor: SensorRequester,
        processor: ProcessorRequester,
        settings: P,
        sink: E,
    ) -> Self {
        Self {
            station,
            sensor,
            processor,
            settings,
            sink,
        }
    }

    /// Parse and run one line.  Blank lines yield `None`.
    pub fn execute_line(&mut self, line: &str) -> Option<Result<Reply, Error>> {
        if line.trim().is_empty() {
            return None;
        }
        Some(parse_command(line).and_then(|command| self.execute(command)))
    }

    /// Run one command.  Failed commands leave every aggregate unchanged.
    pub fn execute(&mut self, command: Command) -> Result<Reply, Error> {
        let reply = self.dispatch(command)?;
        if command.changes_settings() {
            self.persist();
        }
        Ok(reply)
    }

    fn dispatch(&mut self, command: Command) -> Result<Reply, Error> {
        let station = &self.station;
        let reply = match command {
            Command::Help => Reply::Help,
            Command::ReadClock => Reply::Clock(station.clock().now()),
            Command::SetClock(t) => {
                station.set_clock(t.hours, t.minutes, t.seconds, &mut self.sink)?;
                Reply::ClockSet
            }
            Command::ReadSensors => Reply::Sensors(self.sensor.request(SensorRequest::Read)),
            Command::ReadParameters => Reply::Parameters(station.parameters().get()),
            Command::SetParameter(kind, secs) => {
                station.set_parameter(kind, secs, &mut self.sink)?;
                Reply::ParameterSet(kind)
            }
            Command::ReadAlarmInfo => Reply::AlarmInfo {
                thresholds: station.alarm().thresholds(),
                runtime: station.alarm().runtime(),
            },
            Command::DefineAlarmClock(t) => {
                station.define_alarm_clock(t.to_wall_time()?);
                Reply::AlarmClockSet
            }
            Command::DefineThresholds {
                temperature,
                luminosity,
            } => {
                station.define_thresholds(temperature, luminosity)?;
                Reply::ThresholdsSet
            }
            Command::SetAlarms(enabled) => {
                station.set_alarms_enabled(enabled);
                Reply::AlarmModeSet
            }
            Command::ClearAlarm => {
                station.clear_alarm(&mut self.sink);
                Reply::AlarmCleared
            }
            Command::RecordInfo => Reply::RecordInfo(station.records().info()),
            Command::ListRecords { count, start } => Reply::Records(station.records().list(start, count)?),
            Command::DeleteRecords => {
                station.delete_records(&mut self.sink);
                Reply::RecordsDeleted
            }
            Command::ProcessRecords(args) => {
                let interval = interval(args)?;
                let result = self.processor.request(ProcessorRequest::Statistics(interval))?;
                Reply::Statistics(result)
            }
        };
        Ok(reply)
    }

    fn persist(&mut self) {
        let snapshot = self.station.settings_snapshot();
        if let Err(e) = self.settings.save_settings(&snapshot) {
            warn!("Console: settings not saved: {}", e);
        }
    }
}

fn interval(args: IntervalArgs) -> Result<Interval, ValidationError> {
    Ok(match args {
        IntervalArgs::All => Interval::All,
        IntervalArgs::From(start) => Interval::From(start.to_wall_time()?),
        IntervalArgs::Between(start, end) => Interval::between(start.to_wall_time()?, end.to_wall_time()?)?,
    })
}
