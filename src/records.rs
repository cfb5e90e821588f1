//! Sample history: a fixed-capacity ring buffer of timestamped records.
//!
//! ```text
//!            read_index (oldest unread)
//!                 │
//!   ┌────┬────┬───▼┬────┬────┬────┬────┬────┐
//!   │ r5 │ r6 │ r7 │ r8 │ r9 │ r2 │ r3 │ r4 │   valid = 8 (full)
//!   └────┴────┴────┴────┴────┴──▲─┴────┴────┘   unread = 3 (r7..r9)
//!                               │
//!                          write_index (next slot, also the oldest record)
//! ```
//!
//! Two independent cursors share the storage:
//!
//! * the **valid window** (`valid` records ending just before
//!   `write_index`), read by statistics and record listing;
//! * the **unread queue** (`unread` records starting at `read_index`),
//!   drained one record at a time by the Processor.
//!
//! Once full the buffer is a pure sliding window: each append overwrites
//! the oldest slot.  If that pushes the unread count past N, the read
//! index is moved up to just behind the newest N−1 records and the count
//! is clamped to N−1.

use core::fmt;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::clock::WallTime;
use crate::error::ValidationError;

/// Reference history depth.
pub const RECORD_CAPACITY: usize = 20;

// ───────────────────────────────────────────────────────────────
// Samples
// ───────────────────────────────────────────────────────────────

/// Discrete light level, 0 (dark) to 3 (bright).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Luminosity(u8);

impl Luminosity {
    pub const MAX: u8 = 3;
    pub const BRIGHT: Self = Self(Self::MAX);

    pub fn new(level: u8) -> Result<Self, ValidationError> {
        if level > Self::MAX {
            return Err(ValidationError::InvalidLuminosity);
        }
        Ok(Self(level))
    }

    /// Bucket a light fraction in `[0, 1]` into four equal bands.
    pub fn from_fraction(fraction: f32) -> Self {
        let clamped = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        Self(((clamped * 4.0) as u8).min(Self::MAX))
    }

    pub fn level(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Luminosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A live sensor reading, not yet timestamped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sample {
    /// Degrees Celsius.
    pub temperature: u8,
    pub luminosity: Luminosity,
}

/// Immutable timestamped sample stored in the history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub time: WallTime,
    /// Degrees Celsius.
    pub temperature: u8,
    pub luminosity: Luminosity,
}

impl Record {
    pub fn new(time: WallTime, sample: Sample) -> Self {
        Self {
            time,
            temperature: sample.temperature,
            luminosity: sample.luminosity,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} C, L {}", self.time, self.temperature, self.luminosity)
    }
}

// ───────────────────────────────────────────────────────────────
// RingBuffer
// ───────────────────────────────────────────────────────────────

/// Metadata reported by the `ir` console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferInfo {
    pub capacity: usize,
    pub valid: usize,
    pub write_index: usize,
    pub read_index: usize,
    pub unread: usize,
}

/// Unsynchronised ring buffer.  Wrap it in a [`RecordStore`] to share it.
#[derive(Debug, Clone)]
pub struct RingBuffer<const N: usize> {
    slots: [Record; N],
    write_index: usize,
    read_index: usize,
    valid: usize,
    unread: usize,
}

impl<const N: usize> RingBuffer<N> {
    pub fn new() -> Self {
        Self {
            slots: [Record::default(); N],
            write_index: 0,
            read_index: 0,
            valid: 0,
            unread: 0,
        }
    }

    /// Store a record, overwriting the oldest one when full.
    pub fn append(&mut self, record: Record) {
        self.slots[self.write_index] = record;
        self.write_index = (self.write_index + 1) % N;
        if self.valid < N {
            self.valid += 1;
        }
        self.unread += 1;
        if self.unread > N {
            self.unread = N - 1;
            self.read_index = (self.write_index + 1) % N;
        }
    }

    /// Take the oldest record not yet consumed by the Processor.
    pub fn consume_oldest_unread(&mut self) -> Option<Record> {
        if self.unread == 0 {
            return None;
        }
        let record = self.slots[self.read_index];
        self.read_index = (self.read_index + 1) % N;
        self.unread -= 1;
        Some(record)
    }

    /// Record at logical position `index` (0 = oldest valid record).
    pub fn get(&self, index: usize) -> Option<Record> {
        if index >= self.valid {
            return None;
        }
        Some(self.slots[self.slot_of(index)])
    }

    /// Forget every record.  Storage is left as is.
    pub fn clear(&mut self) {
        self.write_index = 0;
        self.read_index = 0;
        self.valid = 0;
        self.unread = 0;
    }

    pub fn len(&self) -> usize {
        self.valid
    }

    pub fn is_empty(&self) -> bool {
        self.valid == 0
    }

    pub fn unread(&self) -> usize {
        self.unread
    }

    pub fn info(&self) -> BufferInfo {
        BufferInfo {
            capacity: N,
            valid: self.valid,
            write_index: self.write_index,
            read_index: self.read_index,
            unread: self.unread,
        }
    }

    /// Valid records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = Record> + '_ {
        (0..self.valid).map(move |i| self.slots[self.slot_of(i)])
    }

    /// Physical slot holding logical position `index`.
    fn slot_of(&self, index: usize) -> usize {
        (self.oldest_index() + index) % N
    }

    fn oldest_index(&self) -> usize {
        if self.valid < N { (self.write_index + N - self.valid) % N } else { self.write_index }
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// RecordStore
// ───────────────────────────────────────────────────────────────

/// The shared history.  Every operation takes the buffer lock; scans and
/// listings take it once per element so the Sampler can append between
/// element reads.
///
/// Scans walk physical slots from the position of their first element.
/// An append during the walk overwrites a slot already visited, so every
/// record valid for the whole walk is seen exactly once.
pub struct RecordStore<const N: usize = RECORD_CAPACITY> {
    buffer: Mutex<RingBuffer<N>>,
}

impl<const N: usize> RecordStore<N> {
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(RingBuffer::new()),
        }
    }

    pub fn append(&self, record: Record) {
        self.lock().append(record);
    }

    pub fn consume_oldest_unread(&self) -> Option<Record> {
        self.lock().consume_oldest_unread()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn info(&self) -> BufferInfo {
        self.lock().info()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Visit the valid records oldest first and return how many were seen.
    ///
    /// The valid count is re-read under the lock before each element, so
    /// the pass stops at whatever the count is at that moment.
    pub fn scan(&self, mut visit: impl FnMut(&Record)) -> usize {
        let mut slot = self.lock().slot_of(0);
        let mut seen = 0;
        while let Some(record) = self.read_slot(slot, seen) {
            visit(&record);
            seen += 1;
            slot = (slot + 1) % N;
        }
        seen
    }

    /// Up to `count` records starting at logical index `start`
    /// (0 = oldest), each paired with its logical index.
    pub fn list(&self, start: usize, count: usize) -> Result<Vec<(usize, Record)>, ValidationError> {
        if count > N {
            return Err(ValidationError::InvalidRecordCount);
        }
        if start >= N {
            return Err(ValidationError::InvalidRecordIndex);
        }
        let mut out = Vec::with_capacity(count);
        let mut slot = self.lock().slot_of(start);
        for index in start..start + count {
            let Some(record) = self.read_slot(slot, index) else {
                break;
            };
            out.push((index, record));
            slot = (slot + 1) % N;
        }
        Ok(out)
    }

    /// Record in physical `slot`, provided the valid count still covers
    /// `position` elements of the walk.
    fn read_slot(&self, slot: usize, position: usize) -> Option<Record> {
        let buffer = self.lock();
        (position < buffer.valid).then(|| buffer.slots[slot])
    }

    fn lock(&self) -> MutexGuard<'_, RingBuffer<N>> {
        self.buffer.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<const N: usize> Default for RecordStore<N> {
    fn default() -> Self {
        Self::new()
    }
}
