//! Error types for the dicepot engine
//!
//! Very little here can fail at runtime: randomness and settlement
//! arithmetic are infallible, and bad configuration input is repaired
//! rather than rejected. What remains is config-file loading and commands
//! that arrive in a phase that cannot honor them.

use crate::game::types::Phase;

/// Errors raised while loading configuration from disk.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors surfaced through the engine handle.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The command is not valid in the session's current phase, e.g. a
    /// configure call after the game has started, or any mutating call in
    /// the terminal `Victory` phase other than a reset.
    #[error("command rejected in {phase} phase")]
    Rejected { phase: Phase },

    /// The engine task has shut down and the handle is stale.
    #[error("engine task has stopped")]
    Closed,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Convenience alias for engine results.
pub type DicepotResult<T> = Result<T, EngineError>;
