//! Inbound operator commands.
//!
//! Produced by [`parse_command`](crate::console::parse_command) and
//! executed by the [`Console`](crate::console::Console).  Arguments are
//! kept as the operator typed them; range checks happen on execution so
//! every rejection carries its domain error.

use crate::clock::WallTime;
use crate::error::ValidationError;
use crate::parameters::ParameterKind;

/// Raw `h m s` argument triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeArgs {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl TimeArgs {
    pub fn to_wall_time(self) -> Result<WallTime, ValidationError> {
        WallTime::new(self.hours, self.minutes, self.seconds)
    }
}

/// Range selector of the `pr` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalArgs {
    All,
    From(TimeArgs),
    Between(TimeArgs, TimeArgs),
}

/// Commands the operator console can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `sos` / `help`
    Help,
    /// `rc`
    ReadClock,
    /// `sc h m s`
    SetClock(TimeArgs),
    /// `rtl`
    ReadSensors,
    /// `rp`
    ReadParameters,
    /// `mmp p`, `mta t`, `mpp p`
    SetParameter(ParameterKind, u8),
    /// `rai`
    ReadAlarmInfo,
    /// `dac h m s`
    DefineAlarmClock(TimeArgs),
    /// `dtl T L`
    DefineThresholds { temperature: u8, luminosity: u8 },
    /// `aa A|a`
    SetAlarms(bool),
    /// `cai`
    ClearAlarm,
    /// `ir`
    RecordInfo,
    /// `lr n i`
    ListRecords { count: usize, start: usize },
    /// `dr`
    DeleteRecords,
    /// `pr [h m s [h m s]]`
    ProcessRecords(IntervalArgs),
}

impl Command {
    /// Whether a successful run changes persisted settings.
    pub fn changes_settings(&self) -> bool {
        matches!(
            self,
            Self::SetParameter(..) | Self::DefineAlarmClock(_) | Self::DefineThresholds { .. } | Self::SetAlarms(_)
        )
    }
}
