//! Line-oriented text console for driving an [`Engine`].
//!
//! The framing follows GTP: each request is one line, optionally prefixed by
//! a numeric id; each response is `=` (success) or `?` (failure), the id if
//! one was given, the response text, and a blank line.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `list_commands`, `known_command <cmd>`, `quit`
//! - `start` - Begin the standby countdown
//! - `reset` - Clear the grid and return to `initial`
//! - `status` - Current lifecycle status
//! - `scores` - Cells per team
//! - `show` - Render the grid
//! - `move <player> <code>` - Apply one move immediately; answers `true` if a
//!   cell was claimed
//! - `hold <player> <code>` - Hold a direction on the player's raw input
//!   stream (goes through the gate and sampler)
//! - `release <player>` - Same as `hold <player> 0`
//!
//! ## Example
//!
//! ```ignore
//! use splix_rust::config::GameConfig;
//! use splix_rust::console::Console;
//! let mut console = Console::new(GameConfig::default())?;
//! console.run()?;
//! ```

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Sender};

use crate::config::GameConfig;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::step::MoveCode;

/// The list of known console commands.
const KNOWN_COMMANDS: &[&str] = &[
    "hold",
    "known_command",
    "list_commands",
    "move",
    "name",
    "quit",
    "release",
    "reset",
    "scores",
    "show",
    "start",
    "status",
    "version",
];

pub struct Console {
    engine: Engine,
    /// One raw input stream per player, bound through the sampler.
    raw: Vec<Sender<MoveCode>>,
}

impl Console {
    pub fn new(config: GameConfig) -> Result<Self, EngineError> {
        let mut engine = Engine::spawn(config)?;
        let (raw, raw_rx): (Vec<_>, Vec<_>) = (0..config.player_count)
            .map(|_| mpsc::channel::<MoveCode>())
            .unzip();
        // the gated copies are not needed here; moves still reach the engine
        engine.bind(raw_rx)?;
        Ok(Self { engine, raw })
    }

    /// Run the command loop, reading from stdin and writing to stdout.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        for line in stdin.lock().lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }

            let command = parts[0].to_lowercase();
            let (success, message) = self.execute(&command, &parts[1..]);

            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            writeln!(stdout, "{prefix}{id_str} {message}\n")?;
            stdout.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    fn parse_player(&self, arg: Option<&&str>) -> Result<usize, String> {
        let arg = arg.ok_or("missing player")?;
        match arg.parse::<usize>() {
            Ok(p) if p < self.engine.player_count() => Ok(p),
            Ok(p) => Err(format!("no player {p}")),
            Err(_) => Err("invalid player".to_string()),
        }
    }

    fn parse_code(arg: Option<&&str>) -> Result<MoveCode, String> {
        let arg = arg.ok_or("missing move code")?;
        let value = arg
            .parse::<i32>()
            .map_err(|_| "invalid move code".to_string())?;
        MoveCode::try_from(value).map_err(|e| e.to_string())
    }

    fn hold(&self, player: usize, code: MoveCode) -> (bool, String) {
        match self.raw[player].send(code) {
            Ok(()) => (true, String::new()),
            Err(_) => (false, "input stream closed".to_string()),
        }
    }

    /// Execute a command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, "splix-rust".to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                let known = KNOWN_COMMANDS.contains(&args[0].to_lowercase().as_str());
                (true, if known { "true" } else { "false" }.to_string())
            }

            "quit" => (true, String::new()),

            "start" => match self.engine.start() {
                Ok(()) => (true, String::new()),
                Err(e) => (false, e.to_string()),
            },

            "reset" => match self.engine.reset() {
                Ok(()) => (true, String::new()),
                Err(e) => (false, e.to_string()),
            },

            "status" => match self.engine.status() {
                Ok(status) => (true, status.to_string()),
                Err(e) => (false, e.to_string()),
            },

            "scores" => match self.engine.scores() {
                Ok(scores) => (true, scores.to_string()),
                Err(e) => (false, e.to_string()),
            },

            "show" => match self.engine.snapshot() {
                Ok(snapshot) => (true, format!("\n{snapshot}")),
                Err(e) => (false, e.to_string()),
            },

            "move" => {
                let parsed = self
                    .parse_player(args.first())
                    .and_then(|p| Ok((p, Self::parse_code(args.get(1))?)));
                match parsed {
                    Ok((player, code)) => {
                        let applied = self.engine.move_player(player, code);
                        (true, applied.to_string())
                    }
                    Err(e) => (false, e),
                }
            }

            "hold" => {
                let parsed = self
                    .parse_player(args.first())
                    .and_then(|p| Ok((p, Self::parse_code(args.get(1))?)));
                match parsed {
                    Ok((player, code)) => self.hold(player, code),
                    Err(e) => (false, e),
                }
            }

            "release" => match self.parse_player(args.first()) {
                Ok(player) => self.hold(player, MoveCode::NEUTRAL),
                Err(e) => (false, e),
            },

            _ => (false, format!("unknown command: {command}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timings;
    use std::thread;
    use std::time::{Duration, Instant};

    fn console(standby_ms: u64) -> Console {
        let config =
            GameConfig::new(9, 2).with_timings(Timings::from_millis(standby_ms, 5_000, 20));
        Console::new(config).unwrap()
    }

    fn wait_for_status(console: &mut Console, want: &str) {
        let deadline = Instant::now() + Duration::from_secs(3);
        while console.execute("status", &[]).1 != want {
            assert!(Instant::now() < deadline, "never reached {want}");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = Console::parse_id("123 status");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "status");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = Console::parse_id("status");
        assert_eq!(id, None);
        assert_eq!(cmd, "status");
    }

    #[test]
    fn test_name_and_known_command() {
        let mut console = console(1_000);
        assert_eq!(console.execute("name", &[]), (true, "splix-rust".to_string()));
        assert_eq!(console.execute("known_command", &["hold"]), (true, "true".to_string()));
        assert_eq!(console.execute("known_command", &["genmove"]), (true, "false".to_string()));
    }

    #[test]
    fn test_start_and_reset() {
        let mut console = console(1_000);
        assert_eq!(console.execute("status", &[]), (true, "initial".to_string()));
        console.execute("start", &[]);
        assert_eq!(console.execute("status", &[]), (true, "standby".to_string()));
        // no moves during standby
        assert_eq!(console.execute("move", &["0", "1"]), (true, "false".to_string()));
        console.execute("reset", &[]);
        assert_eq!(console.execute("status", &[]), (true, "initial".to_string()));
    }

    #[test]
    fn test_move_argument_errors() {
        let mut console = console(1_000);
        assert!(!console.execute("move", &[]).0);
        assert!(!console.execute("move", &["7", "1"]).0);
        assert!(!console.execute("move", &["0", "9"]).0);
        assert!(!console.execute("hold", &["0", "x"]).0);
        assert!(!console.execute("frobnicate", &[]).0);
    }

    #[test]
    fn test_move_and_hold_during_play() {
        let mut console = console(10);
        console.execute("start", &[]);
        wait_for_status(&mut console, "ongoing");
        assert_eq!(console.execute("move", &["0", "1"]), (true, "true".to_string()));
        assert_eq!(console.execute("scores", &[]), (true, "A 2 : B 1".to_string()));

        assert!(console.execute("hold", &["1", "-3"]).0);
        let deadline = Instant::now() + Duration::from_secs(3);
        while console.execute("scores", &[]).1 == "A 2 : B 1" {
            assert!(Instant::now() < deadline, "held direction never moved");
            thread::sleep(Duration::from_millis(5));
        }
        assert!(console.execute("release", &["1"]).0);
        let (ok, board) = console.execute("show", &[]);
        assert!(ok);
        assert!(board.contains('O'));
    }
}
