//! Splix-Rust: grid territory game simulation.
//!
//! ## Usage
//!
//! - `splix-rust` - Run the enclosure demo
//! - `splix-rust simulate` - Play a timed game between random walkers
//! - `splix-rust console` - Drive a game from stdin

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use splix_rust::bot::RandomWalker;
use splix_rust::clock::Status;
use splix_rust::config::{GameConfig, Timings};
use splix_rust::console::Console;
use splix_rust::constants::{DEFAULT_PLAYERS, DEFAULT_SIZE, PLAY_MS, STANDBY_MS, TICK_MS};
use splix_rust::engine::Engine;
use splix_rust::game::Game;
use splix_rust::step::MoveCode;

/// Splix-Rust: grid territory game simulation
#[derive(Parser)]
#[command(name = "splix-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Enclose a region on a small grid, step by step
    Demo,
    /// Run a timed game with random walkers on every input stream
    Simulate {
        #[command(flatten)]
        game: GameArgs,
        /// Seed for the walkers
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
    /// Read commands from stdin (start, hold, move, show, ...)
    Console {
        #[command(flatten)]
        game: GameArgs,
    },
}

#[derive(Args)]
struct GameArgs {
    /// Grid side length
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    size: usize,
    /// Number of players (even ids are team A, odd ids team B)
    #[arg(long, default_value_t = DEFAULT_PLAYERS)]
    players: usize,
    /// Standby countdown in milliseconds
    #[arg(long, default_value_t = STANDBY_MS)]
    standby_ms: u64,
    /// Play time in milliseconds
    #[arg(long, default_value_t = PLAY_MS)]
    play_ms: u64,
    /// Sampler tick in milliseconds
    #[arg(long, default_value_t = TICK_MS)]
    tick_ms: u64,
}

impl GameArgs {
    fn config(&self) -> GameConfig {
        GameConfig::new(self.size, self.players).with_timings(Timings::from_millis(
            self.standby_ms,
            self.play_ms,
            self.tick_ms,
        ))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = std::str::FromStr::from_str(&cli.log_level).unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    match cli.command {
        Some(Commands::Simulate { game, seed }) => run_simulation(game.config(), seed),
        Some(Commands::Console { game }) => {
            let mut console = Console::new(game.config())?;
            console.run().context("console I/O failed")
        }
        Some(Commands::Demo) | None => run_demo(),
    }
}

/// Walk player 0 around the border of a 5x5 grid so the interior is enclosed.
fn run_demo() -> Result<()> {
    println!("Splix-Rust: enclosure demo\n");

    let mut game = Game::new(5, 2)?;
    let standby = game.start().context("fresh game refused to start")?;
    game.advance(standby);
    println!("{}", game.snapshot());

    // player 0 starts at (4, 1): up, left along the top, down, right, up
    let route = [
        (MoveCode::UP, 1),
        (MoveCode::LEFT, 4),
        (MoveCode::DOWN, 4),
        (MoveCode::RIGHT, 4),
        (MoveCode::UP, 2),
    ];
    for (code, times) in route {
        for _ in 0..times {
            game.move_player(0, code);
        }
        println!("{}", game.snapshot());
    }
    Ok(())
}

/// Drive one raw input stream from a random walker until `stop` is set.
fn spawn_walker(
    player: usize,
    seed: u64,
    tick: Duration,
    raw: Sender<MoveCode>,
    stop: Arc<AtomicBool>,
) -> Result<thread::JoinHandle<()>> {
    let handle = thread::Builder::new()
        .name(format!("walker-{player}"))
        .spawn(move || {
            let mut walker = RandomWalker::new(seed);
            while !stop.load(Ordering::Relaxed) {
                if raw.send(walker.next_code()).is_err() {
                    return;
                }
                thread::sleep(tick * walker.hold_ticks());
            }
        })?;
    Ok(handle)
}

fn run_simulation(config: GameConfig, seed: u64) -> Result<()> {
    let mut engine = Engine::spawn(config)?;
    let status_rx = engine.subscribe()?;

    let stop = Arc::new(AtomicBool::new(false));
    let mut raw_rx = Vec::with_capacity(config.player_count);
    let mut walkers = Vec::with_capacity(config.player_count);
    for player in 0..config.player_count {
        let (tx, rx) = mpsc::channel();
        raw_rx.push(rx);
        walkers.push(spawn_walker(
            player,
            seed.wrapping_add(player as u64),
            config.timings.tick,
            tx,
            Arc::clone(&stop),
        )?);
    }
    let _gated = engine.bind(raw_rx)?;

    engine.start()?;
    for status in status_rx {
        match status {
            Status::Ongoing => println!("{}", engine.snapshot()?),
            Status::Ended => break,
            _ => {}
        }
    }

    stop.store(true, Ordering::Relaxed);
    for walker in walkers {
        let _ = walker.join();
    }
    let snapshot = engine.snapshot()?;
    println!("{snapshot}");
    engine.shutdown();
    Ok(())
}
