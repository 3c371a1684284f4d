//! Error types for construction and engine plumbing.
//!
//! Gameplay itself never errors: a rejected move is just `false`.

use std::io;

use thiserror::Error;

use crate::constants::{MAX_PLAYERS, MIN_PLAYERS, MIN_SIZE};

/// Invalid [`GameConfig`](crate::config::GameConfig).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid size {0} is below the minimum of {MIN_SIZE}")]
    SizeTooSmall(usize),
    #[error("player count {0} is outside {MIN_PLAYERS}..={MAX_PLAYERS}")]
    PlayerCount(usize),
    #[error("tick interval must be non-zero")]
    ZeroTick,
}

/// A raw integer that is not one of the nine move codes.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("move code {0} is outside -4..=4")]
pub struct CodeError(pub i32);

/// Errors raised by the threaded [`Engine`](crate::engine::Engine).
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("expected {expected} move streams, got {got}")]
    StreamCount { expected: usize, got: usize },
    #[error("move streams are already bound")]
    AlreadyBound,
    #[error("engine worker has shut down")]
    Disconnected,
}
