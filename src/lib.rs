//! Environmental monitoring station library.
//!
//! Exposes the station core, its activities, the operator console and
//! the host adapters for the binary and for integration testing.

#![deny(unused_must_use)]

pub mod activities;
pub mod adapters;
pub mod alarm;
pub mod app;
pub mod channels;
pub mod clock;
pub mod config;
pub mod console;
pub mod display;
pub mod error;
pub mod parameters;
pub mod records;
pub mod scheduler;
pub mod statistics;
pub mod tasks;

pub use error::{Error, Result, ValidationError};
