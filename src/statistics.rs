//! Statistics over the sample history.
//!
//! One pass over the record store, filtered by a time-of-day interval,
//! accumulating max/min/sum per channel.  Bounds are inclusive and an
//! interval never wraps across midnight.

use core::fmt;

use crate::clock::WallTime;
use crate::error::ValidationError;
use crate::records::{Record, RecordStore};

/// Which records a statistics query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    All,
    /// Timestamp at or after the start.
    From(WallTime),
    /// `start <= timestamp <= end`, with `start < end`.
    Between(WallTime, WallTime),
}

impl Interval {
    /// Build a two-bound interval.  The end must be strictly later.
    pub fn between(start: WallTime, end: WallTime) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::InvalidInterval);
        }
        Ok(Self::Between(start, end))
    }

    pub fn contains(&self, time: WallTime) -> bool {
        match *self {
            Self::All => true,
            Self::From(start) => time >= start,
            Self::Between(start, end) => start <= time && time <= end,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match *self {
            Self::Between(start, end) if end <= start => Err(ValidationError::InvalidInterval),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all records"),
            Self::From(start) => write!(f, "from {start}"),
            Self::Between(start, end) => write!(f, "{start} to {end}"),
        }
    }
}

/// Max/min/mean of one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSummary {
    pub max: u8,
    pub min: u8,
    pub mean: f32,
}

impl fmt::Display for ChannelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "max {} min {} mean {:.2}", self.max, self.min, self.mean)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatisticsResult {
    /// No record fell inside the interval.
    NoData,
    Summary {
        count: usize,
        temperature: ChannelSummary,
        luminosity: ChannelSummary,
    },
}

// ── Accumulation ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct ChannelAccumulator {
    max: u8,
    min: u8,
    sum: u32,
}

impl ChannelAccumulator {
    const fn new() -> Self {
        Self {
            max: u8::MIN,
            min: u8::MAX,
            sum: 0,
        }
    }

    fn add(&mut self, value: u8) {
        self.max = self.max.max(value);
        self.min = self.min.min(value);
        self.sum += u32::from(value);
    }

    fn finish(&self, count: usize) -> ChannelSummary {
        ChannelSummary {
            max: self.max,
            min: self.min,
            mean: self.sum as f32 / count as f32,
        }
    }
}

/// Running totals for both channels.
#[derive(Debug, Clone, Copy)]
pub struct StatisticsAccumulator {
    count: usize,
    temperature: ChannelAccumulator,
    luminosity: ChannelAccumulator,
}

impl StatisticsAccumulator {
    pub const fn new() -> Self {
        Self {
            count: 0,
            temperature: ChannelAccumulator::new(),
            luminosity: ChannelAccumulator::new(),
        }
    }

    pub fn add(&mut self, record: &Record) {
        self.count += 1;
        self.temperature.add(record.temperature);
        self.luminosity.add(record.luminosity.level());
    }

    pub fn finish(&self) -> StatisticsResult {
        if self.count == 0 {
            return StatisticsResult::NoData;
        }
        StatisticsResult::Summary {
            count: self.count,
            temperature: self.temperature.finish(self.count),
            luminosity: self.luminosity.finish(self.count),
        }
    }
}

impl Default for StatisticsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Summarise every record of `store` whose timestamp lies in `interval`.
pub fn compute<const N: usize>(
    store: &RecordStore<N>,
    interval: Interval,
) -> Result<StatisticsResult, ValidationError> {
    interval.validate()?;
    let mut acc = StatisticsAccumulator::new();
    store.scan(|record| {
        if interval.contains(record.time) {
            acc.add(record);
        }
    });
    Ok(acc.finish())
}
