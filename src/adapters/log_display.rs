//! Log-backed display and buzzer adapters.
//!
//! [`LogDisplay`] keeps an in-memory copy of the character grid (readable
//! through a [`FrameHandle`]) and logs every write at debug level.
//! [`LogBuzzer`] logs on/off transitions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, info};

use crate::app::ports::{BuzzerPort, DisplayPort};
use crate::display::COLUMNS;

const ROWS: usize = 2;

type Grid = [[char; COLUMNS as usize]; ROWS];

/// Read access to the grid held by a [`LogDisplay`].
#[derive(Debug, Clone)]
pub struct FrameHandle(Arc<Mutex<Grid>>);

impl FrameHandle {
    /// Current contents of one row.
    pub fn row(&self, row: usize) -> String {
        let grid = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        grid.get(row).map(|cells| cells.iter().collect()).unwrap_or_default()
    }
}

pub struct LogDisplay {
    grid: Arc<Mutex<Grid>>,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self {
            grid: Arc::new(Mutex::new([[' '; COLUMNS as usize]; ROWS])),
        }
    }

    pub fn frame(&self) -> FrameHandle {
        FrameHandle(Arc::clone(&self.grid))
    }
}

impl Default for LogDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayPort for LogDisplay {
    fn render_at(&mut self, row: u8, col: u8, text: &str) {
        debug!("LCD[{},{}] {:?}", row, col, text);
        let mut grid = self.grid.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(cells) = grid.get_mut(usize::from(row)) else {
            return;
        };
        // Text past the last column is clipped.
        for (cell, ch) in cells.iter_mut().skip(usize::from(col)).zip(text.chars()) {
            *cell = ch;
        }
    }
}

/// Buzzer that only logs.
#[derive(Debug, Default)]
pub struct LogBuzzer {
    on: Arc<AtomicBool>,
}

impl LogBuzzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared view of the buzzer state.
    pub fn state(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.on)
    }
}

impl BuzzerPort for LogBuzzer {
    fn set_buzzer(&mut self, on: bool) {
        if self.on.swap(on, Ordering::Relaxed) != on {
            info!("BUZZER | {}", if on { "on" } else { "off" });
        }
    }
}
