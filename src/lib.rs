//! Splix-Rust: the simulation core of a grid territory-claiming game.
//!
//! Players steer markers across a square grid. Every cell a marker enters is
//! claimed for the player's team, and any region a team fully encloses (one
//! that does not reach the grid edge) is claimed along with it.
//!
//! ## Modules
//!
//! - [`constants`] - Default geometry, timings and limits
//! - [`config`] - Per-game construction parameters
//! - [`step`] - Move codes and their decoding
//! - [`grid`] - Occupation and marker positions
//! - [`fill`] - Enclosure detection
//! - [`score`] - Per-team cell counts
//! - [`clock`] - Lifecycle state machine and status broadcast
//! - [`victory`] - Victory-check hook
//! - [`game`] - Move resolution tying the above together
//! - [`sampler`] - Per-player input gate and tick sampler
//! - [`engine`] - Worker thread that serializes all mutation
//! - [`bot`] - Random-walk input for simulations
//! - [`console`] - Text command protocol
//!
//! ## Example
//!
//! ```
//! use splix_rust::game::Game;
//! use splix_rust::step::MoveCode;
//!
//! let mut game = Game::new(13, 2).unwrap();
//!
//! // moves only count once play has begun
//! let standby = game.start().unwrap();
//! game.advance(standby);
//!
//! assert!(game.move_player(0, MoveCode::RIGHT));
//! println!("{}", game.snapshot());
//! ```

pub mod bot;
pub mod clock;
pub mod config;
pub mod console;
pub mod constants;
pub mod engine;
pub mod error;
pub mod fill;
pub mod game;
pub mod grid;
pub mod sampler;
pub mod score;
pub mod step;
pub mod victory;
