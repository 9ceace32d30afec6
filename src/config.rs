//! Engine configuration with validation and defaults
//!
//! Every tunable of the engine lives here: table rules, gesture
//! thresholds, and the turn choreography timings. Out-of-range values are
//! repaired to safe defaults rather than rejected, so a bad config file
//! can degrade but never brick a session.

use crate::errors::ConfigError;
use crate::game::types::DicePolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration for a dicepot engine instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub session: SessionConfig,
    pub economy: EconomyConfig,
    pub motion: MotionConfig,
    pub timing: TimingConfig,
    pub events: EventBusConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            economy: EconomyConfig::default(),
            motion: MotionConfig::default(),
            timing: TimingConfig::default(),
            events: EventBusConfig::default(),
        }
    }
}

impl GameConfig {
    /// Default configuration with the pot sizing that matches `policy`.
    pub fn for_policy(policy: DicePolicy) -> Self {
        let mut config = Self::default();
        config.session.dice_policy = policy;
        config.economy = EconomyConfig::for_policy(policy);
        config
    }

    /// Load configuration from a TOML file. Missing sections fall back to
    /// defaults; the result is sanitized before use.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&raw)?;
        config.sanitize();
        Ok(config)
    }

    /// Repair out-of-range values in place, logging every fix.
    pub fn sanitize(&mut self) {
        self.session.sanitize();
        self.economy.sanitize(self.session.dice_policy);
        self.motion.sanitize();
        self.events.sanitize();
    }
}

/// Player-table rules and the dice generation policy.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub min_players: u32,
    pub max_players: u32,
    pub dice_policy: DicePolicy,
    /// Avatar glyphs assigned to players in seating order.
    pub avatar_glyphs: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 20,
            dice_policy: DicePolicy::Standard,
            avatar_glyphs: ["🐲", "🦁", "🧧", "💰", "🍊", "🍍", "🧨", "🏮"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl SessionConfig {
    /// Clamp a requested player count into the configured range.
    pub fn clamp_player_count(&self, requested: u32) -> u32 {
        requested.clamp(self.min_players, self.max_players)
    }

    fn sanitize(&mut self) {
        if self.min_players < 2 {
            tracing::warn!(min_players = self.min_players, "min_players below 2, raising");
            self.min_players = 2;
        }
        if self.max_players < self.min_players {
            tracing::warn!(
                max_players = self.max_players,
                min_players = self.min_players,
                "max_players below min_players, raising"
            );
            self.max_players = self.min_players;
        }
        if self.avatar_glyphs.is_empty() {
            self.avatar_glyphs = SessionConfig::default().avatar_glyphs;
        }
    }
}

/// Money rules for the pot economy.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Cash value of one rolled point.
    pub cash_per_point: i64,
    /// Initial pot contribution per seat when no explicit pot is given.
    pub base_pot_per_player: i64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            cash_per_point: 10,
            base_pot_per_player: 100,
        }
    }
}

impl EconomyConfig {
    /// Pot sizing tuned to the dice policy: 210 per seat under the sparse
    /// policy ((1+2+...+6) * 10, the full sparse board at the default
    /// cash rate), 100 per seat under the standard one.
    pub fn for_policy(policy: DicePolicy) -> Self {
        match policy {
            DicePolicy::Standard => Self::default(),
            DicePolicy::Sparse => Self {
                cash_per_point: 10,
                base_pot_per_player: 210,
            },
        }
    }

    fn sanitize(&mut self, policy: DicePolicy) {
        let defaults = Self::for_policy(policy);
        if self.cash_per_point <= 0 {
            tracing::warn!(cash_per_point = self.cash_per_point, "non-positive cash_per_point, resetting");
            self.cash_per_point = defaults.cash_per_point;
        }
        if self.base_pot_per_player <= 0 {
            tracing::warn!(
                base_pot_per_player = self.base_pot_per_player,
                "non-positive base_pot_per_player, resetting"
            );
            self.base_pot_per_player = defaults.base_pot_per_player;
        }
    }
}

/// Gesture detector thresholds.
///
/// `shake_threshold` and `throw_threshold` apply to the L1 norm of the
/// delta between consecutive accelerometer samples.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub shake_threshold: f64,
    pub throw_threshold: f64,
    /// Samples closer together than this are dropped.
    pub sample_throttle_ms: u64,
    /// Sustained low speed required before a shake is considered stopped.
    pub shake_hysteresis_ms: u64,
    /// Dead time after a throw during which all samples are ignored.
    pub throw_cooldown_ms: u64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            shake_threshold: 15.0,
            throw_threshold: 40.0,
            sample_throttle_ms: 100,
            shake_hysteresis_ms: 300,
            throw_cooldown_ms: 1000,
        }
    }
}

impl MotionConfig {
    fn sanitize(&mut self) {
        let defaults = Self::default();
        if !(self.shake_threshold > 0.0) {
            tracing::warn!(shake_threshold = self.shake_threshold, "invalid shake_threshold, resetting");
            self.shake_threshold = defaults.shake_threshold;
        }
        if !(self.throw_threshold > self.shake_threshold) {
            tracing::warn!(
                throw_threshold = self.throw_threshold,
                shake_threshold = self.shake_threshold,
                "throw_threshold must exceed shake_threshold, resetting both"
            );
            self.shake_threshold = defaults.shake_threshold;
            self.throw_threshold = defaults.throw_threshold;
        }
    }
}

/// Fixed durations of the turn choreography.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Shake-feedback window before the dice land.
    pub shake_window_ms: u64,
    /// Suspense gap between the dice landing and the point reveal.
    pub reveal_suspense_ms: u64,
    /// Pause after the point reveal before the settlement is applied.
    pub points_linger_ms: u64,
    /// Pause on a zero-point turn before play advances (no acknowledgment
    /// is asked for a no-op settlement).
    pub zero_roll_pause_ms: u64,
    /// Bounded wait for a settlement acknowledgment before auto-advancing.
    pub ack_timeout_ms: u64,
    /// Window after each turn during which gesture throws are ignored.
    pub trigger_cooldown_ms: u64,
    /// Display time of a transient (snackbar-style) settlement notice.
    pub snackbar_linger_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            shake_window_ms: 800,
            reveal_suspense_ms: 4000,
            points_linger_ms: 2000,
            zero_roll_pause_ms: 1000,
            ack_timeout_ms: 10_000,
            trigger_cooldown_ms: 1000,
            snackbar_linger_ms: 2500,
        }
    }
}

/// Notification fan-out settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EventBusConfig {
    /// Broadcast channel capacity; slow subscribers lag past this.
    pub capacity: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

impl EventBusConfig {
    fn sanitize(&mut self) {
        if self.capacity == 0 {
            tracing::warn!("event bus capacity of 0 is not usable, resetting");
            self.capacity = Self::default().capacity;
        }
    }
}
