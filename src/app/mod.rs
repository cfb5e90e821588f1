//! Station core: domain orchestration, zero I/O.
//!
//! The [`service::Station`] owns every shared aggregate and exposes one
//! step per activity plus the operator request surface.  All interaction
//! with hardware happens through the **port traits** in [`ports`], keeping
//! this layer testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
