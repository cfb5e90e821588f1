//! Periodic activity pacing.
//!
//! Each periodic activity (Sampler, Processor) runs the same wait step:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Wake Sources                           │
//! │                                                              │
//! │  ┌─────────────┐   ┌─────────────────┐   ┌───────────────┐   │
//! │  │ Pacer       │   │ ActivityGate    │   │ Inbox         │   │
//! │  │ (deadline)  │   │ (period 0 → >0) │   │ (console req) │   │
//! │  └──────┬──────┘   └────────┬────────┘   └───────┬───────┘   │
//! │         │ period > 0        │ period == 0        │ always    │
//! │         ▼                   ▼                    ▼           │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │                    next_wake()                         │  │
//! │  │       Wake::Period · Wake::Resumed · Wake::Request     │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deadlines are "delay until", not "delay for": a slow iteration does not
//! push the following ones back.  Missed deadlines are skipped rather than
//! replayed in a burst.

use core::future::Future;
use core::time::Duration;
use std::time::Instant;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use futures_lite::future;

// ═══════════════════════════════════════════════════════════════
//  Activity gate
// ═══════════════════════════════════════════════════════════════

/// Resume signal for an activity whose period has been set to zero.
///
/// The parameter store opens the gate inside its critical section when a
/// period goes from zero to nonzero, and closes it when the period drops
/// to zero.  A suspended activity waits on the gate instead of polling its
/// period.
pub struct ActivityGate {
    resume: Signal<CriticalSectionRawMutex, ()>,
}

impl ActivityGate {
    pub const fn new() -> Self {
        Self {
            resume: Signal::new(),
        }
    }

    /// Wake the suspended activity.
    pub fn open(&self) {
        self.resume.signal(());
    }

    /// Discard any pending resume notification.
    pub fn close(&self) {
        self.resume.reset();
    }

    /// Whether a resume notification is pending.
    pub fn is_open(&self) -> bool {
        self.resume.signaled()
    }

    async fn wait_open(&self) {
        self.resume.wait().await;
    }
}

impl Default for ActivityGate {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Pacer
// ═══════════════════════════════════════════════════════════════

/// Delay-until deadline tracker for one periodic activity.
///
/// A deadline is fixed when its period is first awaited; the following
/// period starts at that deadline and uses whatever period is current
/// then.
#[derive(Debug, Default)]
pub struct Pacer {
    /// Start of the pending period.
    start: Option<Instant>,
    /// End of the pending period, once awaited.
    deadline: Option<Instant>,
}

impl Pacer {
    pub fn new() -> Self {
        Self {
            start: None,
            deadline: None,
        }
    }

    /// Forget the schedule; the next period starts from "now".
    pub fn reset(&mut self) {
        self.start = None;
        self.deadline = None;
    }

    /// Deadline of the pending period.  The first call for a period fixes
    /// it one `period` after the period's start; later calls return the
    /// same instant, so a period change never cuts a period short.
    pub fn deadline(&mut self, period: Duration, now: Instant) -> Instant {
        let start = *self.start.get_or_insert(now);
        *self.deadline.get_or_insert(start + period)
    }

    /// Close the pending period; the next one starts at its deadline.
    pub fn complete(&mut self, period: Duration, now: Instant) {
        let end = self.deadline(period, now);
        self.deadline = None;
        // Behind schedule: skip the missed periods.
        self.start = Some(if end + period <= now { now } else { end });
    }
}

// ═══════════════════════════════════════════════════════════════
//  Wait step
// ═══════════════════════════════════════════════════════════════

/// Why a periodic activity woke up.
#[derive(Debug, PartialEq, Eq)]
pub enum Wake<R> {
    /// The period elapsed.
    Period,
    /// The activity was suspended and its period is nonzero again.
    Resumed,
    /// An operator request arrived on the activity's inbox.
    Request(R),
}

/// Wait for the next reason to run.
///
/// `period_secs == 0` means the activity is suspended: only the gate or
/// an inbox request can wake it.  Inbox requests are served in both
/// modes and take precedence when both are ready.
pub async fn next_wake<R>(
    pacer: &mut Pacer,
    gate: &ActivityGate,
    period_secs: u8,
    inbox: impl Future<Output = R>,
) -> Wake<R> {
    let request = async { Wake::Request(inbox.await) };

    if period_secs == 0 {
        pacer.reset();
        let resumed = async {
            gate.wait_open().await;
            Wake::Resumed
        };
        return future::or(request, resumed).await;
    }

    let period = Duration::from_secs(period_secs.into());
    let deadline = pacer.deadline(period, Instant::now());
    let expired = async {
        async_io_mini::Timer::after(deadline.saturating_duration_since(Instant::now())).await;
        Wake::Period
    };

    let wake = future::or(request, expired).await;
    if matches!(wake, Wake::Period) {
        pacer.complete(period, Instant::now());
    }
    wake
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
