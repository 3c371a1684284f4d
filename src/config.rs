//! Construction parameters for a game instance.

use std::time::Duration;

use crate::constants::{
    DEFAULT_PLAYERS, DEFAULT_SIZE, MAX_PLAYERS, MIN_PLAYERS, MIN_SIZE, PLAY_MS, STANDBY_MS,
    TICK_MS,
};
use crate::error::ConfigError;

/// Phase and sampling durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Countdown from `Standby` to `Ongoing`.
    pub standby: Duration,
    /// Length of `Ongoing` before `Ended`.
    pub play: Duration,
    /// Sampler repeat interval.
    pub tick: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            standby: Duration::from_millis(STANDBY_MS),
            play: Duration::from_millis(PLAY_MS),
            tick: Duration::from_millis(TICK_MS),
        }
    }
}

impl Timings {
    /// Build timings from millisecond counts.
    pub fn from_millis(standby: u64, play: u64, tick: u64) -> Self {
        Self {
            standby: Duration::from_millis(standby),
            play: Duration::from_millis(play),
            tick: Duration::from_millis(tick),
        }
    }
}

/// Everything needed to build a [`Game`](crate::game::Game).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub size: usize,
    pub player_count: usize,
    pub timings: Timings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            player_count: DEFAULT_PLAYERS,
            timings: Timings::default(),
        }
    }
}

impl GameConfig {
    /// A config with default timings.
    pub fn new(size: usize, player_count: usize) -> Self {
        Self {
            size,
            player_count,
            ..Self::default()
        }
    }

    /// Replace the phase and tick timings.
    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// Check the invariants the grid and sampler rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size < MIN_SIZE {
            return Err(ConfigError::SizeTooSmall(self.size));
        }
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.player_count) {
            return Err(ConfigError::PlayerCount(self.player_count));
        }
        if self.timings.tick.is_zero() {
            return Err(ConfigError::ZeroTick);
        }
        Ok(())
    }
}
