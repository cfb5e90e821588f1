//! The four background activities of the station.
//!
//! Each activity runs in its own thread under
//! `futures_lite::future::block_on`, with `async-io-mini` timers for
//! delays and `embassy-sync` signals/channels for wake-ups.  No activity
//! busy-polls.
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────────────────┐
//!  │  Buzzer    ◀── BuzzerSignal ── AlarmEngine          (pri 5)      │
//!  │  Clock     1 s delay-until ─▶ tick · clock alarm    (pri 4)      │
//!  │  Sampler   monitoring period ─▶ read · store · thresholds (pri 3)│
//!  │            ◀── SensorRequest  (console `rtl`)                    │
//!  │  Processor processing period ─▶ show oldest unread  (pri 2)      │
//!  │            ◀── ProcessorRequest (console `pr`)                   │
//!  └──────────────────────────────────────────────────────────────────┘
//! ```

use core::time::Duration;
use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use futures_lite::future;
use log::info;

use crate::alarm::{AlarmState, BuzzerSignal};
use crate::app::ports::{BuzzerPort, EventSink, SensorPort};
use crate::app::service::Station;
use crate::channels::{
    self, ProcessorRequest, ProcessorRequester, ProcessorResponder, SensorRequest, SensorRequester,
    SensorResponder,
};
use crate::parameters::PeriodicActivity;
use crate::scheduler::{Pacer, Wake, next_wake};
use crate::tasks::{ACTIVITY_STACK_KB, Priority, spawn_activity};

const SECOND: Duration = Duration::from_secs(1);

// ── Activity loops ───────────────────────────────────────────

/// Tick the clock once per second, delay-until style.
pub async fn clock_loop(station: &Station, sink: &mut impl EventSink) {
    let mut pacer = Pacer::new();
    loop {
        let deadline = pacer.deadline(SECOND, Instant::now());
        async_io_mini::Timer::after(deadline.saturating_duration_since(Instant::now())).await;
        pacer.complete(SECOND, Instant::now());
        station.clock_step(sink);
    }
}

/// Sample every monitoring period and answer `rtl` requests, even while
/// suspended.
pub async fn sampler_loop(
    station: &Station,
    sensors: &mut impl SensorPort,
    inbox: &SensorResponder,
    sink: &mut impl EventSink,
) {
    let params = station.parameters();
    let gate = params.gate(PeriodicActivity::Sampler);
    let mut pacer = Pacer::new();
    loop {
        let period = params.period(PeriodicActivity::Sampler);
        match next_wake(&mut pacer, gate, period, inbox.next_request()).await {
            Wake::Period => {
                station.sample_step(sensors, sink);
            }
            Wake::Resumed => info!("Sampler: resumed"),
            Wake::Request(SensorRequest::Read) => {
                let sample = station.read_sensors(sensors);
                inbox.respond(sample).await;
            }
        }
    }
}

/// Drain one unread record every processing period and answer `pr`
/// requests, even while suspended.
pub async fn processor_loop(station: &Station, inbox: &ProcessorResponder) {
    let params = station.parameters();
    let gate = params.gate(PeriodicActivity::Processor);
    let mut pacer = Pacer::new();
    loop {
        let period = params.period(PeriodicActivity::Processor);
        match next_wake(&mut pacer, gate, period, inbox.next_request()).await {
            Wake::Period => {
                station.process_step();
            }
            Wake::Resumed => info!("Processor: resumed"),
            Wake::Request(ProcessorRequest::Statistics(interval)) => {
                let result = station.statistics(interval);
                inbox.respond(result).await;
            }
        }
    }
}

/// Drive the buzzer from the alarm engine's signals and run the
/// per-second countdown while ringing.
pub async fn buzzer_loop(station: &Station, buzzer: &mut impl BuzzerPort, sink: &mut impl EventSink) {
    let alarm = station.alarm();
    loop {
        if alarm.next_buzzer_signal().await == BuzzerSignal::Silence {
            continue;
        }
        if alarm.runtime().state != AlarmState::Ringing {
            continue;
        }

        buzzer.set_buzzer(true);
        let mut pacer = Pacer::new();
        loop {
            let deadline = pacer.deadline(SECOND, Instant::now());
            let signal = async { Some(alarm.next_buzzer_signal().await) };
            let second = async {
                async_io_mini::Timer::after(deadline.saturating_duration_since(Instant::now())).await;
                None
            };
            match future::or(signal, second).await {
                None => {
                    pacer.complete(SECOND, Instant::now());
                    if !station.countdown_step(sink) {
                        break;
                    }
                }
                Some(BuzzerSignal::Silence) => break,
                // Countdown was refreshed; a full second precedes the
                // next decrement.
                Some(BuzzerSignal::Ring) => pacer.reset(),
            }
        }
        buzzer.set_buzzer(false);
    }
}

// ── Spawn ────────────────────────────────────────────────────

/// Console ends of the two rendezvous links.
pub struct ConsoleLinks {
    pub sensor: SensorRequester,
    pub processor: ProcessorRequester,
}

/// Start the four background activities.  Threads run for the lifetime
/// of the process.
pub fn spawn_all<S, B, E>(
    station: &Arc<Station>,
    sensors: S,
    buzzer: B,
    sink: E,
) -> io::Result<(ConsoleLinks, Vec<JoinHandle<()>>)>
where
    S: SensorPort + Send + 'static,
    B: BuzzerPort + Send + 'static,
    E: EventSink + Clone + Send + 'static,
{
    let (sensor_requester, sensor_responder) = channels::rendezvous();
    let (processor_requester, processor_responder) = channels::rendezvous();
    let mut handles = Vec::with_capacity(4);

    {
        let station = Arc::clone(station);
        let mut sink = sink.clone();
        let mut buzzer = buzzer;
        handles.push(spawn_activity("buzzer", Priority::Buzzer, ACTIVITY_STACK_KB, move || {
            future::block_on(buzzer_loop(&station, &mut buzzer, &mut sink));
        })?);
    }
    {
        let station = Arc::clone(station);
        let mut sink = sink.clone();
        handles.push(spawn_activity("clock", Priority::Clock, ACTIVITY_STACK_KB, move || {
            future::block_on(clock_loop(&station, &mut sink));
        })?);
    }
    {
        let station = Arc::clone(station);
        let mut sink = sink;
        let mut sensors = sensors;
        handles.push(spawn_activity("sampler", Priority::Sampler, ACTIVITY_STACK_KB, move || {
            future::block_on(sampler_loop(&station, &mut sensors, &sensor_responder, &mut sink));
        })?);
    }
    {
        let station = Arc::clone(station);
        handles.push(spawn_activity("processor", Priority::Processor, ACTIVITY_STACK_KB, move || {
            future::block_on(processor_loop(&station, &processor_responder));
        })?);
    }

    Ok((
        ConsoleLinks {
            sensor: sensor_requester,
            processor: processor_requester,
        },
        handles,
    ))
}
