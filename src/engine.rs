//! Threaded engine.
//!
//! A single worker thread owns the [`Game`] and applies every mutation in the
//! order it arrives on the command channel: direct moves, sampler ticks,
//! phase transitions, resets. Phase timers are deadlines kept by the worker
//! and fired between commands, so a transition can never interleave with a
//! half-applied move.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::clock::{Phase, Status, Subscriber, channel_subscriber};
use crate::config::GameConfig;
use crate::error::EngineError;
use crate::game::{Game, Snapshot};
use crate::grid::Occupation;
use crate::sampler::{self, SamplerEvent};
use crate::score::Scores;
use crate::step::MoveCode;

/// Commands sent to the worker thread.
pub enum Command {
    /// Apply a move; the result goes to `reply` when one is given.
    Move {
        player: usize,
        code: MoveCode,
        reply: Option<Sender<bool>>,
    },
    Start,
    Reset,
    Subscribe(Subscriber),
    Snapshot(Sender<Snapshot>),
    Shutdown,
}

/// A phase waiting for its deadline.
#[derive(Debug, Clone, Copy)]
struct Scheduled {
    phase: Phase,
    due: Instant,
}

impl Scheduled {
    fn new(phase: Phase) -> Self {
        Self {
            phase,
            due: Instant::now() + phase.delay,
        }
    }
}

/// Forwarder and sampler threads started by [`Engine::bind`].
struct Binding {
    stop: Arc<AtomicBool>,
    events: Vec<Sender<SamplerEvent>>,
    threads: Vec<JoinHandle<()>>,
}

impl Binding {
    fn close(self) {
        self.stop.store(true, Ordering::Relaxed);
        for events in &self.events {
            let _ = events.send(SamplerEvent::Closed);
        }
        for thread in self.threads {
            if thread.join().is_err() {
                log::error!("input thread panicked");
            }
        }
    }
}

/// Handle to the worker thread.
pub struct Engine {
    control_tx: Sender<Command>,
    player_count: usize,
    tick: Duration,
    thread: Option<JoinHandle<()>>,
    binding: Option<Binding>,
}

impl Engine {
    /// Validate `config` and start the worker.
    pub fn spawn(config: GameConfig) -> Result<Self, EngineError> {
        let game = Game::with_config(&config)?;
        Self::spawn_game(game, config)
    }

    /// Start a worker around an already-built game (e.g. one with a custom
    /// victory rule). `config` must be the one the game was built from.
    pub fn spawn_game(game: Game, config: GameConfig) -> Result<Self, EngineError> {
        let (control_tx, control_rx) = mpsc::channel::<Command>();
        let thread = thread::Builder::new()
            .name("engine".to_string())
            .spawn(move || worker_main(game, control_rx))
            .map_err(|source| EngineError::Spawn {
                name: "engine".to_string(),
                source,
            })?;

        Ok(Self {
            control_tx,
            player_count: config.player_count,
            tick: config.timings.tick,
            thread: Some(thread),
            binding: None,
        })
    }

    /// Number of players the game was configured with.
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    fn send(&self, cmd: Command) -> Result<(), EngineError> {
        self.control_tx.send(cmd).map_err(|_| EngineError::Disconnected)
    }

    /// Begin the `Standby -> Ongoing -> Ended` sequence. Returns immediately.
    pub fn start(&self) -> Result<(), EngineError> {
        self.send(Command::Start)
    }

    /// Reinitialize the game; pending phase timers are discarded.
    pub fn reset(&self) -> Result<(), EngineError> {
        self.send(Command::Reset)
    }

    /// Apply a move and wait for the result.
    pub fn move_player(&self, player: usize, code: MoveCode) -> bool {
        let (reply_tx, reply_rx) = mpsc::channel();
        let cmd = Command::Move {
            player,
            code,
            reply: Some(reply_tx),
        };
        if self.control_tx.send(cmd).is_err() {
            return false;
        }
        reply_rx.recv().unwrap_or(false)
    }

    /// Copy of the current game state, taken between commands.
    pub fn snapshot(&self) -> Result<Snapshot, EngineError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.send(Command::Snapshot(reply_tx))?;
        reply_rx.recv().map_err(|_| EngineError::Disconnected)
    }

    pub fn status(&self) -> Result<Status, EngineError> {
        Ok(self.snapshot()?.status)
    }

    pub fn scores(&self) -> Result<Scores, EngineError> {
        Ok(self.snapshot()?.scores)
    }

    pub fn occupation(&self) -> Result<Vec<Occupation>, EngineError> {
        Ok(self.snapshot()?.grid.occupation().to_vec())
    }

    pub fn positions(&self) -> Result<Vec<usize>, EngineError> {
        Ok(self.snapshot()?.grid.positions().to_vec())
    }

    /// Subscribe to status changes. The current status arrives first.
    pub fn subscribe(&self) -> Result<Receiver<Status>, EngineError> {
        let (subscriber, rx) = channel_subscriber();
        self.send(Command::Subscribe(subscriber))?;
        Ok(rx)
    }

    /// Route one raw move stream per player through a gate/sampler into the
    /// worker.
    ///
    /// Returns the gated stream for each player, carrying exactly the codes
    /// that were submitted as moves. An engine can only be bound once.
    pub fn bind(
        &mut self,
        raw: Vec<Receiver<MoveCode>>,
    ) -> Result<Vec<Receiver<MoveCode>>, EngineError> {
        if self.binding.is_some() {
            return Err(EngineError::AlreadyBound);
        }
        if raw.len() != self.player_count {
            return Err(EngineError::StreamCount {
                expected: self.player_count,
                got: raw.len(),
            });
        }

        let mut binding = Binding {
            stop: Arc::new(AtomicBool::new(false)),
            events: Vec::with_capacity(raw.len()),
            threads: Vec::with_capacity(raw.len() * 2),
        };
        let mut gated = Vec::with_capacity(raw.len());
        for (player, raw_rx) in raw.into_iter().enumerate() {
            match self.bind_player(player, raw_rx, &mut binding) {
                Ok(gated_rx) => gated.push(gated_rx),
                Err(err) => {
                    binding.close();
                    return Err(err);
                }
            }
        }
        self.binding = Some(binding);
        Ok(gated)
    }

    fn bind_player(
        &self,
        player: usize,
        raw_rx: Receiver<MoveCode>,
        binding: &mut Binding,
    ) -> Result<Receiver<MoveCode>, EngineError> {
        let (events_tx, events_rx) = mpsc::channel::<SamplerEvent>();
        let (gated_tx, gated_rx) = mpsc::channel::<MoveCode>();

        // status first: registration is ordered with start/reset on the
        // control channel, so no transition is missed
        let status_tx = events_tx.clone();
        self.send(Command::Subscribe(Box::new(move |status| {
            status_tx.send(SamplerEvent::Status(status)).is_ok()
        })))?;

        let control_tx = self.control_tx.clone();
        let name = format!("sampler-{player}");
        let sampler = sampler::spawn(name.clone(), self.tick, events_rx, move |code| {
            let _ = gated_tx.send(code);
            control_tx
                .send(Command::Move {
                    player,
                    code,
                    reply: None,
                })
                .is_ok()
        })
        .map_err(|source| EngineError::Spawn { name, source })?;
        binding.threads.push(sampler);
        binding.events.push(events_tx.clone());

        let name = format!("raw-{player}");
        let stop = Arc::clone(&binding.stop);
        let poll = self.tick;
        let forwarder = thread::Builder::new()
            .name(name.clone())
            .spawn(move || forward_raw(raw_rx, events_tx, stop, poll))
            .map_err(|source| EngineError::Spawn { name, source })?;
        binding.threads.push(forwarder);

        Ok(gated_rx)
    }

    /// Stop the input threads and the worker, and wait for them to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(binding) = self.binding.take() {
            binding.close();
        }
        let _ = self.control_tx.send(Command::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("engine worker panicked");
            }
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Copy raw codes into a sampler's event channel until the raw stream closes
/// or `stop` is raised. `stop` is checked at least every `poll`.
fn forward_raw(
    raw: Receiver<MoveCode>,
    events: Sender<SamplerEvent>,
    stop: Arc<AtomicBool>,
    poll: Duration,
) {
    while !stop.load(Ordering::Relaxed) {
        match raw.recv_timeout(poll) {
            Ok(code) => {
                if events.send(SamplerEvent::Raw(code)).is_err() {
                    return;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    let _ = events.send(SamplerEvent::Closed);
}

/// Main loop for the worker thread.
fn worker_main(mut game: Game, control_rx: Receiver<Command>) {
    let mut pending: Option<Scheduled> = None;

    loop {
        // fire a due phase before taking the next command
        if let Some(scheduled) = pending {
            if Instant::now() >= scheduled.due {
                pending = game.advance(scheduled.phase).map(Scheduled::new);
                continue;
            }
        }

        let cmd = match pending {
            Some(scheduled) => {
                control_rx.recv_timeout(scheduled.due.saturating_duration_since(Instant::now()))
            }
            None => control_rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match cmd {
            Ok(Command::Move {
                player,
                code,
                reply,
            }) => {
                let applied = game.move_player(player, code);
                if let Some(reply) = reply {
                    let _ = reply.send(applied);
                }
            }
            Ok(Command::Start) => {
                if let Some(phase) = game.start() {
                    pending = Some(Scheduled::new(phase));
                }
            }
            Ok(Command::Reset) => {
                game.reset();
                pending = None;
            }
            Ok(Command::Subscribe(subscriber)) => game.subscribe(subscriber),
            Ok(Command::Snapshot(reply)) => {
                let _ = reply.send(game.snapshot());
            }
            Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                log::debug!("engine worker shutting down");
                return;
            }
            Err(RecvTimeoutError::Timeout) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timings;

    fn fast_config() -> GameConfig {
        GameConfig::new(9, 2).with_timings(Timings::from_millis(20, 200, 10))
    }

    #[test]
    fn test_snapshot_of_fresh_engine() {
        let engine = Engine::spawn(fast_config()).unwrap();
        let snap = engine.snapshot().unwrap();
        assert_eq!(snap.status, Status::Initial);
        assert_eq!(snap.scores, Scores { team_a: 1, team_b: 1 });
        assert_eq!(engine.positions().unwrap(), vec![37, 43]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = Engine::spawn(GameConfig::new(1, 2)).err().unwrap();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_bind_checks_stream_count() {
        let mut engine = Engine::spawn(fast_config()).unwrap();
        let (_tx, rx) = mpsc::channel();
        let err = engine.bind(vec![rx]).err().unwrap();
        assert!(matches!(
            err,
            EngineError::StreamCount {
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn test_reset_discards_pending_phase() {
        let config = GameConfig::new(9, 2).with_timings(Timings::from_millis(50, 200, 10));
        let engine = Engine::spawn(config).unwrap();
        engine.start().unwrap();
        engine.reset().unwrap();
        thread::sleep(Duration::from_millis(120));
        assert_eq!(engine.status().unwrap(), Status::Initial);
    }

    #[test]
    fn test_shutdown_joins_worker() {
        let engine = Engine::spawn(fast_config()).unwrap();
        engine.shutdown();
    }

    #[test]
    fn test_second_bind_is_refused() {
        let mut engine = Engine::spawn(fast_config()).unwrap();
        let (_tx0, rx0) = mpsc::channel();
        let (_tx1, rx1) = mpsc::channel();
        engine.bind(vec![rx0, rx1]).unwrap();

        let (_tx2, rx2) = mpsc::channel();
        let (_tx3, rx3) = mpsc::channel();
        let err = engine.bind(vec![rx2, rx3]).err().unwrap();
        assert!(matches!(err, EngineError::AlreadyBound));
    }

    #[test]
    fn test_shutdown_stops_input_threads_while_senders_live() {
        let mut engine = Engine::spawn(fast_config()).unwrap();
        let (raw0_tx, raw0_rx) = mpsc::channel();
        let (raw1_tx, raw1_rx) = mpsc::channel();
        let gated = engine.bind(vec![raw0_rx, raw1_rx]).unwrap();

        // returns even though both raw senders are still held
        engine.shutdown();
        for gated_rx in gated {
            assert_eq!(gated_rx.recv(), Err(mpsc::RecvError));
        }
        drop((raw0_tx, raw1_tx));
    }

    #[test]
    fn test_commands_after_worker_exit_report_disconnect() {
        let mut engine = Engine::spawn(fast_config()).unwrap();
        engine.stop();
        assert!(matches!(engine.start(), Err(EngineError::Disconnected)));
        assert!(matches!(engine.reset(), Err(EngineError::Disconnected)));
        assert!(matches!(engine.subscribe(), Err(EngineError::Disconnected)));
        assert!(matches!(engine.snapshot(), Err(EngineError::Disconnected)));
    }
}
