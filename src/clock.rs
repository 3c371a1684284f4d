//! Lifecycle clock: `Initial -> Standby -> Ongoing -> Ended`.
//!
//! The clock is a plain state machine. It does not sleep; instead each
//! transition hands back a [`Phase`] describing the next transition and how
//! long to wait for it, and whoever drives the clock (the engine worker, or a
//! test) calls [`Clock::advance`] when that time has passed.
//!
//! Every phase is tagged with the clock's epoch. [`Clock::reset`] bumps the
//! epoch, so a phase scheduled before the reset is recognised as stale and
//! ignored.

use std::fmt;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use crate::config::Timings;

/// Coarse game phase.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    #[default]
    Initial,
    Standby,
    Ongoing,
    Ended,
}

impl Status {
    /// The phase that follows this one, if any.
    pub fn successor(self) -> Option<Status> {
        match self {
            Status::Initial => Some(Status::Standby),
            Status::Standby => Some(Status::Ongoing),
            Status::Ongoing => Some(Status::Ended),
            Status::Ended => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Initial => "initial",
            Status::Standby => "standby",
            Status::Ongoing => "ongoing",
            Status::Ended => "ended",
        };
        f.write_str(s)
    }
}

/// A pending transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Phase {
    pub epoch: u64,
    pub next: Status,
    pub delay: Duration,
}

/// Status observer. Returning `false` unsubscribes it.
pub type Subscriber = Box<dyn FnMut(Status) -> bool + Send>;

/// Wrap a channel sender as a [`Subscriber`].
pub fn channel_subscriber() -> (Subscriber, Receiver<Status>) {
    let (tx, rx) = mpsc::channel();
    (Box::new(move |status| tx.send(status).is_ok()), rx)
}

pub struct Clock {
    status: Status,
    epoch: u64,
    timings: Timings,
    subscribers: Vec<Subscriber>,
}

impl Clock {
    pub fn new(timings: Timings) -> Self {
        Self {
            status: Status::Initial,
            epoch: 0,
            timings,
            subscribers: Vec::new(),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Register an observer. It immediately receives the current status, then
    /// every transition after that.
    pub fn subscribe(&mut self, mut subscriber: Subscriber) {
        if subscriber(self.status) {
            self.subscribers.push(subscriber);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Enter `Standby`. Only valid from `Initial`.
    pub fn start(&mut self) -> Option<Phase> {
        if self.status != Status::Initial {
            log::warn!("start ignored: game is already {}", self.status);
            return None;
        }
        self.transition(Status::Standby);
        Some(self.phase(Status::Ongoing, self.timings.standby))
    }

    /// Apply a scheduled transition.
    ///
    /// Returns the follow-up phase, if there is one. Stale phases (from an
    /// older epoch) and phases that do not follow the current status are
    /// dropped and yield `None`.
    pub fn advance(&mut self, phase: Phase) -> Option<Phase> {
        if phase.epoch != self.epoch {
            log::debug!(
                "dropping stale {} transition from epoch {} (now {})",
                phase.next,
                phase.epoch,
                self.epoch
            );
            return None;
        }
        if self.status.successor() != Some(phase.next) {
            log::warn!("refusing transition {} -> {}", self.status, phase.next);
            return None;
        }
        self.transition(phase.next);
        match phase.next {
            Status::Ongoing => Some(self.phase(Status::Ended, self.timings.play)),
            _ => None,
        }
    }

    /// Return to `Initial`, invalidating every outstanding phase.
    pub fn reset(&mut self) {
        self.epoch += 1;
        if self.status != Status::Initial {
            self.transition(Status::Initial);
        }
    }

    fn phase(&self, next: Status, delay: Duration) -> Phase {
        Phase {
            epoch: self.epoch,
            next,
            delay,
        }
    }

    fn transition(&mut self, to: Status) {
        log::info!("status {} -> {}", self.status, to);
        self.status = to;
        self.subscribers.retain_mut(|s| s(to));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> Clock {
        Clock::new(Timings::from_millis(100, 1_000, 10))
    }

    #[test]
    fn test_full_sequence() {
        let mut clock = clock();
        let (sub, rx) = channel_subscriber();
        clock.subscribe(sub);

        let standby = clock.start().unwrap();
        assert_eq!(standby.next, Status::Ongoing);
        assert_eq!(standby.delay, Duration::from_millis(100));

        let play = clock.advance(standby).unwrap();
        assert_eq!(play.next, Status::Ended);
        assert_eq!(play.delay, Duration::from_millis(1_000));

        assert_eq!(clock.advance(play), None);
        assert_eq!(clock.status(), Status::Ended);

        let seen: Vec<Status> = rx.try_iter().collect();
        assert_eq!(
            seen,
            vec![Status::Initial, Status::Standby, Status::Ongoing, Status::Ended]
        );
    }

    #[test]
    fn test_start_twice_is_ignored() {
        let mut clock = clock();
        assert!(clock.start().is_some());
        assert!(clock.start().is_none());
        assert_eq!(clock.status(), Status::Standby);
    }

    #[test]
    fn test_stale_phase_after_reset() {
        let mut clock = clock();
        let standby = clock.start().unwrap();
        clock.reset();
        assert_eq!(clock.status(), Status::Initial);
        assert_eq!(clock.advance(standby), None);
        assert_eq!(clock.status(), Status::Initial);

        // a fresh start works and its phase is honoured
        let fresh = clock.start().unwrap();
        assert_eq!(fresh.epoch, standby.epoch + 1);
        assert!(clock.advance(fresh).is_some());
        assert_eq!(clock.status(), Status::Ongoing);
    }

    #[test]
    fn test_phase_cannot_skip() {
        let mut clock = clock();
        clock.start();
        let skip = Phase {
            epoch: clock.epoch(),
            next: Status::Ended,
            delay: Duration::ZERO,
        };
        assert_eq!(clock.advance(skip), None);
        assert_eq!(clock.status(), Status::Standby);
    }

    #[test]
    fn test_reset_broadcasts_initial_once() {
        let mut clock = clock();
        let (sub, rx) = channel_subscriber();
        clock.subscribe(sub);
        clock.reset();
        clock.start();
        clock.reset();
        let seen: Vec<Status> = rx.try_iter().collect();
        assert_eq!(
            seen,
            vec![Status::Initial, Status::Standby, Status::Initial]
        );
    }

    #[test]
    fn test_dropped_subscribers_are_removed() {
        let mut clock = clock();
        let (sub, rx) = channel_subscriber();
        clock.subscribe(sub);
        assert_eq!(clock.subscriber_count(), 1);
        drop(rx);
        clock.start();
        assert_eq!(clock.subscriber_count(), 0);
    }
}
