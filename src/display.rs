//! Shared character display.
//!
//! Fixed 2×20 layout:
//!
//! ```text
//!   col  0         1
//!        01234567890123456789
//!   row0 hh:mm:ss   C T L
//!   row1 hh:mm:ss T:xxC L:x A
//! ```
//!
//! Every writer goes through [`SharedDisplay`]; the display lock is a leaf
//! lock and is never held while taking another one.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::debug;

use crate::alarm::{AlarmTrigger, TriggerFlags};
use crate::app::ports::DisplayPort;
use crate::clock::WallTime;
use crate::records::Record;

pub const COLUMNS: u8 = 20;
pub const CLOCK_ROW: u8 = 0;
pub const CLOCK_COL: u8 = 0;
pub const INDICATOR_ROW: u8 = 0;
pub const RECORD_ROW: u8 = 1;
pub const RECORD_COL: u8 = 0;
pub const ENABLED_FLAG_ROW: u8 = 1;
pub const ENABLED_FLAG_COL: u8 = 19;

/// Column of one alarm indicator letter.
pub const fn indicator_col(trigger: AlarmTrigger) -> u8 {
    match trigger {
        AlarmTrigger::Clock => 11,
        AlarmTrigger::Temperature => 13,
        AlarmTrigger::Luminosity => 15,
    }
}

/// Text of the last-processed-record line.
pub fn record_line(record: &Record) -> String {
    format!("{} T:{:02}C L:{}", record.time, record.temperature, record.luminosity)
}

pub struct SharedDisplay {
    port: Mutex<Box<dyn DisplayPort + Send>>,
}

impl SharedDisplay {
    pub fn new(port: impl DisplayPort + Send + 'static) -> Self {
        Self {
            port: Mutex::new(Box::new(port)),
        }
    }

    pub fn show_clock(&self, time: WallTime) {
        self.lock().render_at(CLOCK_ROW, CLOCK_COL, &time.to_string());
    }

    /// Draw the letter of every active indicator and blank the others.
    pub fn show_indicators(&self, indicators: TriggerFlags) {
        let mut port = self.lock();
        for trigger in AlarmTrigger::ALL {
            let text = if indicators.contains(trigger) {
                trigger.letter().to_string()
            } else {
                " ".to_owned()
            };
            port.render_at(INDICATOR_ROW, indicator_col(trigger), &text);
        }
    }

    pub fn show_record(&self, record: &Record) {
        let line = record_line(record);
        debug!("Display: {}", line);
        self.lock().render_at(RECORD_ROW, RECORD_COL, &line);
    }

    pub fn show_alarms_enabled(&self, enabled: bool) {
        let flag = if enabled { "A" } else { "a" };
        self.lock().render_at(ENABLED_FLAG_ROW, ENABLED_FLAG_COL, flag);
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn DisplayPort + Send>> {
        self.port.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
