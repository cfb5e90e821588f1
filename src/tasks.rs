//! Named activity threads.
//!
//! Every station activity runs on its own OS thread.  The priority table
//! orders them Buzzer highest and Console lowest; on the
//! host it is recorded and logged, and the OS scheduler decides.

use std::io;
use std::thread::JoinHandle;

/// Relative activity priority, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Priority {
    Console = 1,
    Processor = 2,
    Sampler = 3,
    Clock = 4,
    Buzzer = 5,
}

/// Default stack for an activity thread.
pub const ACTIVITY_STACK_KB: usize = 64;

/// Spawn a named activity thread.
pub fn spawn_activity(
    name: &'static str,
    priority: Priority,
    stack_kb: usize,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    log::info!(
        "Spawning '{}' (pri={}, stack={}KB)",
        name,
        priority as u8,
        stack_kb
    );

    std::thread::Builder::new()
        .name(name.into())
        .stack_size(stack_kb * 1024)
        .spawn(f)
}
