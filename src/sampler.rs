//! Input gate and tick sampler, one per player.
//!
//! Raw move codes arrive whenever the held key combination changes. The
//! sampler turns that into a steady stream:
//!
//! - Nothing passes until the clock reports `Ongoing`; earlier codes are
//!   dropped, not buffered.
//! - The first non-neutral code after idling is emitted at once and then
//!   repeated every tick for as long as it stays held.
//! - Switching to a different non-neutral code restarts the cadence: the new
//!   code is emitted one tick later and every tick after that.
//! - Releasing to neutral emits a single neutral code and stops the cadence.
//!
//! [`Sampler`] is the pure state machine; [`spawn`] runs one on its own thread.

use std::io;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::clock::Status;
use crate::step::MoveCode;

/// Input to a sampler thread.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SamplerEvent {
    /// A new raw code from the input collaborator.
    Raw(MoveCode),
    /// A lifecycle transition.
    Status(Status),
    /// The raw stream has ended.
    Closed,
}

#[derive(Debug, Clone)]
pub struct Sampler {
    interval: Duration,
    open: bool,
    held: MoveCode,
    next_tick: Option<Instant>,
}

impl Sampler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            open: false,
            held: MoveCode::NEUTRAL,
            next_tick: None,
        }
    }

    /// Whether raw codes currently pass the gate.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// When the next repeat is due, if a code is being held.
    pub fn deadline(&self) -> Option<Instant> {
        self.next_tick
    }

    /// Open the gate on `Ongoing`; close it and go idle on anything else.
    pub fn on_status(&mut self, status: Status) {
        self.open = status == Status::Ongoing;
        if !self.open {
            self.held = MoveCode::NEUTRAL;
            self.next_tick = None;
        }
    }

    /// Feed a raw code; returns a code to emit right away, if any.
    pub fn on_raw(&mut self, code: MoveCode, now: Instant) -> Option<MoveCode> {
        if !self.open || code == self.held {
            return None;
        }
        let was_idle = self.held.is_neutral();
        self.held = code;

        if code.is_neutral() {
            self.next_tick = None;
            return Some(code);
        }
        self.next_tick = Some(now + self.interval);
        was_idle.then_some(code)
    }

    /// Called once the deadline has passed; returns the held code if a tick
    /// is due.
    pub fn on_tick(&mut self, now: Instant) -> Option<MoveCode> {
        let due = self.next_tick?;
        if now < due {
            return None;
        }
        let next = due + self.interval;
        // after a long stall, resume from now rather than firing a burst
        self.next_tick = Some(if next > now { next } else { now + self.interval });
        Some(self.held)
    }
}

/// Run a sampler on its own thread.
///
/// Every emitted code is passed to `emit`; when `emit` returns `false` (its
/// consumer has gone away) the thread exits. It also exits once the raw
/// stream closes or every event sender is dropped.
pub fn spawn<F>(
    name: String,
    interval: Duration,
    events: Receiver<SamplerEvent>,
    mut emit: F,
) -> io::Result<JoinHandle<()>>
where
    F: FnMut(MoveCode) -> bool + Send + 'static,
{
    thread::Builder::new().name(name).spawn(move || {
        let mut sampler = Sampler::new(interval);
        loop {
            // a due tick fires before the next event, however busy the stream is
            let emitted = match sampler.deadline() {
                Some(due) if Instant::now() >= due => sampler.on_tick(Instant::now()),
                deadline => {
                    let event = match deadline {
                        Some(due) => {
                            events.recv_timeout(due.saturating_duration_since(Instant::now()))
                        }
                        None => events.recv().map_err(|_| RecvTimeoutError::Disconnected),
                    };
                    match event {
                        Ok(SamplerEvent::Raw(code)) => sampler.on_raw(code, Instant::now()),
                        Ok(SamplerEvent::Status(status)) => {
                            sampler.on_status(status);
                            None
                        }
                        Ok(SamplerEvent::Closed) | Err(RecvTimeoutError::Disconnected) => break,
                        Err(RecvTimeoutError::Timeout) => sampler.on_tick(Instant::now()),
                    }
                }
            };
            if let Some(code) = emitted {
                log::debug!("{} emits {code}", thread::current().name().unwrap_or("sampler"));
                if !emit(code) {
                    break;
                }
            }
        }
    })
}
