//! Dicepot - Turn Resolution Engine for a Match-the-Pot Dice Game
//!
//! A session is a fixed ring of players around a shared pot. Each turn a
//! player throws six dice; the rolled value is taken from the pot if it
//! falls short, the overshoot is paid back in if it runs over, and an
//! exact match wins the pot outright and ends the session. Turns are
//! triggered manually or by a throw gesture recovered from an
//! accelerometer stream.
//!
//! The engine runs as a single tokio task behind an [`EngineHandle`];
//! presentation layers subscribe to its [`GameEvent`] broadcast and never
//! get called into.

pub mod config;
pub mod errors;
pub mod game;

pub use config::GameConfig;
pub use errors::{ConfigError, DicepotResult, EngineError};
pub use game::engine::{EngineHandle, EngineOptions, TurnEngine};
pub use game::events::GameEvent;
pub use game::types::{DicePolicy, Phase, SessionSnapshot};
