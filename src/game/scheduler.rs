//! Turn choreography delays
//!
//! The fixed pauses of a turn live in one table so the state machine can
//! be driven in real time or instantly (tests, fast simulations) without
//! touching its logic.

use crate::config::TimingConfig;
use std::time::Duration;

/// Fixed pauses in the turn choreography.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagePause {
    /// Dice-shaking feedback window before the dice land.
    ShakeWindow,
    /// Suspense between the dice landing and the point reveal.
    RevealSuspense,
    /// Pause between the point reveal and the settlement.
    PointsLinger,
    /// Pause on a no-op zero-point turn before play advances.
    ZeroRoll,
    /// Display time of a transient settlement notice.
    SnackbarLinger,
}

/// How delays are served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerMode {
    /// Real wall-clock sleeps.
    #[default]
    Realtime,
    /// No waiting, just a yield so other tasks keep running.
    Instant,
}

/// Serves the choreography pauses for the turn engine.
#[derive(Debug, Clone)]
pub struct TurnScheduler {
    timing: TimingConfig,
    mode: SchedulerMode,
}

impl TurnScheduler {
    pub fn new(timing: TimingConfig, mode: SchedulerMode) -> Self {
        Self { timing, mode }
    }

    pub fn realtime(timing: TimingConfig) -> Self {
        Self::new(timing, SchedulerMode::Realtime)
    }

    pub fn instant(timing: TimingConfig) -> Self {
        Self::new(timing, SchedulerMode::Instant)
    }

    pub fn mode(&self) -> SchedulerMode {
        self.mode
    }

    pub fn duration_of(&self, stage: StagePause) -> Duration {
        let ms = match stage {
            StagePause::ShakeWindow => self.timing.shake_window_ms,
            StagePause::RevealSuspense => self.timing.reveal_suspense_ms,
            StagePause::PointsLinger => self.timing.points_linger_ms,
            StagePause::ZeroRoll => self.timing.zero_roll_pause_ms,
            StagePause::SnackbarLinger => self.timing.snackbar_linger_ms,
        };
        Duration::from_millis(ms)
    }

    /// Bounded wait for a settlement acknowledgment.
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.timing.ack_timeout_ms)
    }

    /// Post-turn window during which gesture throws are ignored.
    pub fn trigger_cooldown(&self) -> Duration {
        Duration::from_millis(self.timing.trigger_cooldown_ms)
    }

    pub async fn pause(&self, stage: StagePause) {
        self.pause_for(self.duration_of(stage)).await;
    }

    pub async fn pause_for(&self, duration: Duration) {
        match self.mode {
            SchedulerMode::Realtime => tokio::time::sleep(duration).await,
            SchedulerMode::Instant => tokio::task::yield_now().await,
        }
    }
}
