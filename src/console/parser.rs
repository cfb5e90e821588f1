//! Command line parser.
//!
//! Splits on whitespace, matches the command name case-insensitively and
//! checks argument count and numeric format.  Ranges are checked later,
//! when the command runs.

use core::str::FromStr;

use heapless::Vec;

use crate::app::commands::{Command, IntervalArgs, TimeArgs};
use crate::error::{Error, ValidationError};
use crate::parameters::ParameterKind;

use super::ConsoleError;

/// Most arguments any command takes (`pr h m s h m s`).
pub const MAX_ARGS: usize = 6;

/// Parse one console line into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, Error> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next().ok_or(ConsoleError::UnknownCommand)?.to_ascii_lowercase();

    let mut args: Vec<&str, MAX_ARGS> = Vec::new();
    for token in tokens {
        args.push(token).map_err(|_| ConsoleError::WrongArgumentCount)?;
    }

    let command = match name.as_str() {
        "sos" | "help" => {
            expect_args(&args, 0)?;
            Command::Help
        }
        "rc" => {
            expect_args(&args, 0)?;
            Command::ReadClock
        }
        "sc" => {
            expect_args(&args, 3)?;
            Command::SetClock(time_args(&args[0..3])?)
        }
        "rtl" => {
            expect_args(&args, 0)?;
            Command::ReadSensors
        }
        "rp" => {
            expect_args(&args, 0)?;
            Command::ReadParameters
        }
        "mmp" => parameter(&args, ParameterKind::MonitoringPeriod)?,
        "mta" => parameter(&args, ParameterKind::AlarmDuration)?,
        "mpp" => parameter(&args, ParameterKind::ProcessingPeriod)?,
        "rai" => {
            expect_args(&args, 0)?;
            Command::ReadAlarmInfo
        }
        "dac" => {
            expect_args(&args, 3)?;
            Command::DefineAlarmClock(time_args(&args[0..3])?)
        }
        "dtl" => {
            expect_args(&args, 2)?;
            Command::DefineThresholds {
                temperature: number(args[0], ValidationError::InvalidTemperature)?,
                luminosity: number(args[1], ValidationError::InvalidLuminosity)?,
            }
        }
        "aa" => {
            expect_args(&args, 1)?;
            Command::SetAlarms(alarm_flag(args[0])?)
        }
        "cai" => {
            expect_args(&args, 0)?;
            Command::ClearAlarm
        }
        "ir" => {
            expect_args(&args, 0)?;
            Command::RecordInfo
        }
        "lr" => {
            expect_args(&args, 2)?;
            Command::ListRecords {
                count: number(args[0], ValidationError::InvalidRecordCount)?,
                start: number(args[1], ValidationError::InvalidRecordIndex)?,
            }
        }
        "dr" => {
            expect_args(&args, 0)?;
            Command::DeleteRecords
        }
        "pr" => Command::ProcessRecords(match args.len() {
            0 => IntervalArgs::All,
            3 => IntervalArgs::From(time_args(&args[0..3])?),
            6 => IntervalArgs::Between(time_args(&args[0..3])?, time_args(&args[3..6])?),
            _ => return Err(ConsoleError::WrongArgumentCount.into()),
        }),
        _ => return Err(ConsoleError::UnknownCommand.into()),
    };
    Ok(command)
}

// ── Helpers ──────────────────────────────────────────────────

fn expect_args(args: &[&str], count: usize) -> Result<(), ConsoleError> {
    if args.len() == count {
        Ok(())
    } else {
        Err(ConsoleError::WrongArgumentCount)
    }
}

/// Unsigned decimal.  A run of digits too large for `T`, however long,
/// is a range error.
fn number<T: FromStr>(token: &str, out_of_range: ValidationError) -> Result<T, Error> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConsoleError::InvalidNumber.into());
    }
    token.parse().map_err(|_| out_of_range.into())
}

fn time_args(tokens: &[&str]) -> Result<TimeArgs, Error> {
    Ok(TimeArgs {
        hours: number(tokens[0], ValidationError::InvalidTime)?,
        minutes: number(tokens[1], ValidationError::InvalidTime)?,
        seconds: number(tokens[2], ValidationError::InvalidTime)?,
    })
}

fn parameter(args: &[&str], kind: ParameterKind) -> Result<Command, Error> {
    expect_args(args, 1)?;
    Ok(Command::SetParameter(kind, number(args[0], ValidationError::InvalidPeriod)?))
}

/// `A` activates, `a` deactivates.  The ASCII codes 65/97 are accepted too.
fn alarm_flag(token: &str) -> Result<bool, Error> {
    match token {
        "A" | "65" => Ok(true),
        "a" | "97" => Ok(false),
        _ => Err(ValidationError::InvalidAlarmFlag.into()),
    }
}
