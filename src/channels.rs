//! Request/response rendezvous between the console and an activity.
//!
//! Each link is a pair of depth-one `embassy-sync` channels shared through
//! an `Arc`.  The console side blocks until the activity answers; the
//! activity side is async so it can race the inbox against its period
//! timer (see [`next_wake`](crate::scheduler::next_wake)).
//!
//! ```text
//! ┌──────────────┐   Req (depth 1)    ┌──────────────┐
//! │  Requester   │───────────────────▶│  Responder   │
//! │  (console,   │◀───────────────────│  (activity,  │
//! │   blocking)  │   Resp (depth 1)   │   async)     │
//! └──────────────┘                    └──────────────┘
//! ```
//!
//! The [`Requester`] is not `Clone` and `request` takes `&mut self`, so at
//! most one request per link is ever in flight.

use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use futures_lite::future;

use crate::error::ValidationError;
use crate::records::Sample;
use crate::statistics::{Interval, StatisticsResult};

struct Link<Req, Resp> {
    requests: Channel<CriticalSectionRawMutex, Req, 1>,
    responses: Channel<CriticalSectionRawMutex, Resp, 1>,
}

/// Console end of a rendezvous link.
pub struct Requester<Req, Resp> {
    link: Arc<Link<Req, Resp>>,
}

/// Activity end of a rendezvous link.
pub struct Responder<Req, Resp> {
    link: Arc<Link<Req, Resp>>,
}

/// Create a connected requester/responder pair.
pub fn rendezvous<Req, Resp>() -> (Requester<Req, Resp>, Responder<Req, Resp>) {
    let link = Arc::new(Link {
        requests: Channel::new(),
        responses: Channel::new(),
    });
    (
        Requester {
            link: Arc::clone(&link),
        },
        Responder { link },
    )
}

impl<Req, Resp> Requester<Req, Resp> {
    /// Send `request` and block the calling thread until the response
    /// arrives.  There is no timeout.
    pub fn request(&mut self, request: Req) -> Resp {
        future::block_on(async {
            self.link.requests.send(request).await;
            self.link.responses.receive().await
        })
    }
}

impl<Req, Resp> Responder<Req, Resp> {
    /// Wait for the next request.
    pub async fn next_request(&self) -> Req {
        self.link.requests.receive().await
    }

    pub async fn respond(&self, response: Resp) {
        self.link.responses.send(response).await;
    }
}

// ── Station links ─────────────────────────────────────────────

/// Requests served by the Sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorRequest {
    /// Fresh sensor read; the result is not stored.
    Read,
}

/// Requests served by the Processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorRequest {
    Statistics(Interval),
}

pub type SensorRequester = Requester<SensorRequest, Sample>;
pub type SensorResponder = Responder<SensorRequest, Sample>;
pub type ProcessorRequester = Requester<ProcessorRequest, Result<StatisticsResult, ValidationError>>;
pub type ProcessorResponder = Responder<ProcessorRequest, Result<StatisticsResult, ValidationError>>;
