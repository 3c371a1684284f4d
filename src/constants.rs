//! Default grid geometry, timings and limits.
//!
//! These are only defaults: every value that varies per game is carried in
//! [`GameConfig`](crate::config::GameConfig) so two engines can run side by
//! side with different settings.

// =============================================================================
// Grid Geometry
// =============================================================================

/// Default grid side length (NxN).
pub const DEFAULT_SIZE: usize = 13;

/// Smallest grid that can hold both seed positions.
pub const MIN_SIZE: usize = 3;

/// Distance (in linear cells) of the two seed players from the centre cell.
pub const SEED_OFFSET: usize = 3;

// =============================================================================
// Players
// =============================================================================

/// Default number of players.
pub const DEFAULT_PLAYERS: usize = 2;

/// At least two players are always seeded.
pub const MIN_PLAYERS: usize = 2;

/// Team colouring is by player parity, so more players only crowd the teams.
pub const MAX_PLAYERS: usize = 8;

// =============================================================================
// Timings (milliseconds)
// =============================================================================

/// Countdown between `start` and the first accepted move.
pub const STANDBY_MS: u64 = 3_000;

/// Length of active play.
pub const PLAY_MS: u64 = 60_000;

/// Sampler tick: a held direction moves once per tick.
pub const TICK_MS: u64 = 500;
