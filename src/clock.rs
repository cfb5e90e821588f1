//! Shared wall clock.
//!
//! [`WallTime`] is the hour/minute/second triple used for the clock itself,
//! for record timestamps, for the alarm clock, and for statistics
//! intervals.  Its derived ordering is lexicographic on
//! `(hours, minutes, seconds)`, which is exactly the "earlier in the day"
//! order; there is no notion of crossing midnight.
//!
//! [`SharedClock`] guards the station time with a single lock so that an
//! operator `set` can never interleave with the per-second `tick`.

use core::fmt;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const HOURS_PER_DAY: u8 = 24;
pub const MINUTES_PER_HOUR: u8 = 60;
pub const SECONDS_PER_MINUTE: u8 = 60;

// ───────────────────────────────────────────────────────────────
// WallTime
// ───────────────────────────────────────────────────────────────

/// Time of day with one-second resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WallTime {
    hours: u8,
    minutes: u8,
    seconds: u8,
}

impl WallTime {
    pub const MIDNIGHT: Self = Self {
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Build a validated time of day.
    pub fn new(hours: u8, minutes: u8, seconds: u8) -> Result<Self, ValidationError> {
        if hours >= HOURS_PER_DAY || minutes >= MINUTES_PER_HOUR || seconds >= SECONDS_PER_MINUTE {
            return Err(ValidationError::InvalidTime);
        }
        Ok(Self {
            hours,
            minutes,
            seconds,
        })
    }

    pub fn hours(&self) -> u8 {
        self.hours
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }

    /// Seconds elapsed since 00:00:00.
    pub fn seconds_since_midnight(&self) -> u32 {
        self.hours as u32 * 3600 + self.minutes as u32 * 60 + self.seconds as u32
    }

    /// True for 00:00:00, the "not configured" alarm-clock sentinel.
    pub fn is_midnight(&self) -> bool {
        *self == Self::MIDNIGHT
    }

    /// The time one second later.  Hours wrap modulo 24.
    #[must_use]
    pub fn next_second(self) -> Self {
        let mut t = self;
        t.seconds += 1;
        if t.seconds >= SECONDS_PER_MINUTE {
            t.seconds = 0;
            t.minutes += 1;
            if t.minutes >= MINUTES_PER_HOUR {
                t.minutes = 0;
                t.hours = (t.hours + 1) % HOURS_PER_DAY;
            }
        }
        t
    }

    /// Validate a deserialised value (serde bypasses [`WallTime::new`]).
    pub fn validated(self) -> Result<Self, ValidationError> {
        Self::new(self.hours, self.minutes, self.seconds)
    }
}

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

// ───────────────────────────────────────────────────────────────
// SharedClock
// ───────────────────────────────────────────────────────────────

/// The authoritative station time, advanced once per second.
pub struct SharedClock {
    time: Mutex<WallTime>,
}

impl SharedClock {
    pub fn new(start: WallTime) -> Self {
        Self {
            time: Mutex::new(start),
        }
    }

    /// Advance by one second and return the new time.
    pub fn tick(&self) -> WallTime {
        let mut time = self.lock();
        *time = time.next_second();
        *time
    }

    /// Current time.
    pub fn now(&self) -> WallTime {
        *self.lock()
    }

    /// Validate and apply an operator-supplied time.
    pub fn set(&self, hours: u8, minutes: u8, seconds: u8) -> Result<WallTime, ValidationError> {
        let new_time = WallTime::new(hours, minutes, seconds)?;
        *self.lock() = new_time;
        Ok(new_time)
    }

    fn lock(&self) -> MutexGuard<'_, WallTime> {
        self.time.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
