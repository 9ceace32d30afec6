//! Turn state machine
//!
//! The engine is one tokio task that owns the session and everything that
//! touches it: commands arrive on an unbounded channel, notifications
//! leave on the broadcast bus, and a turn runs as a strictly ordered
//! sequence of choreography pauses between them. The `phase` field plus
//! the post-turn gesture cooldown are the only mutual exclusion: there
//! is exactly one flow of control, so there is nothing to lock.
//!
//! Commands that arrive while a turn is in flight stay queued. At the
//! next intake point they are served, deferred, or dropped by phase:
//! triggers submitted against a non-idle table are discarded, motion
//! samples keep feeding the detector with their events ignored, and a
//! reset is honored only once the running turn has completed (there is no
//! mid-roll cancellation).

use crate::config::GameConfig;
use crate::errors::{DicepotResult, EngineError};
use crate::game::dice::{DiceRoller, DICE_COUNT};
use crate::game::economy;
use crate::game::events::{EventBus, GameEvent};
use crate::game::motion::{MotionDetector, MotionEvent, MotionSample};
use crate::game::presentation::{OverlayPresentation, PresentationPolicy, SettlementDisplay};
use crate::game::scheduler::{SchedulerMode, StagePause, TurnScheduler};
use crate::game::session::Session;
use crate::game::types::{Phase, SessionSnapshot, SettlementKind, TriggerSource};
use rand::rngs::StdRng;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::Instant;
use tokio_stream::wrappers::BroadcastStream;

/// Commands accepted by the engine task.
#[derive(Debug)]
enum Command {
    Configure {
        player_count: u32,
        initial_pot_override: Option<i64>,
        reply: oneshot::Sender<DicepotResult<SessionSnapshot>>,
    },
    Trigger {
        source: TriggerSource,
    },
    MotionSample(MotionSample),
    Acknowledge,
    Reset {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Shutdown,
}

/// Construction options for [`TurnEngine::spawn`].
pub struct EngineOptions {
    pub scheduler_mode: SchedulerMode,
    /// Seed for the dice RNG; OS entropy when absent.
    pub rng_seed: Option<u64>,
    pub presentation: Box<dyn PresentationPolicy>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            scheduler_mode: SchedulerMode::default(),
            rng_seed: None,
            presentation: Box::new(OverlayPresentation),
        }
    }
}

/// Cloneable handle to a running engine task.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
    events: EventBus,
}

impl EngineHandle {
    /// Build a session: clamps the player count into the configured range
    /// and defaults the pot when no valid override is given. Only valid
    /// in the `Setup` phase.
    pub async fn configure_session(
        &self,
        player_count: u32,
        initial_pot_override: Option<i64>,
    ) -> DicepotResult<SessionSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Configure {
            player_count,
            initial_pot_override,
            reply,
        })?;
        rx.await.map_err(|_| EngineError::Closed)?
    }

    /// Manual roll request; honored only while the table is idle.
    pub fn submit_trigger(&self) -> DicepotResult<()> {
        self.send(Command::Trigger {
            source: TriggerSource::Manual,
        })
    }

    /// Forward one accelerometer sample to the gesture detector.
    pub fn feed_motion_sample(
        &self,
        x: f64,
        y: f64,
        z: f64,
        timestamp_ms: u64,
    ) -> DicepotResult<()> {
        self.send(Command::MotionSample(MotionSample {
            x,
            y,
            z,
            timestamp_ms,
        }))
    }

    /// Dismiss a displayed settlement so play can advance.
    pub fn acknowledge_settlement(&self) -> DicepotResult<()> {
        self.send(Command::Acknowledge)
    }

    /// Tear the session down to `Setup`, discarding all state. If a turn
    /// is running it completes first.
    pub async fn reset_session(&self) -> DicepotResult<SessionSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Reset { reply })?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    pub async fn snapshot(&self) -> DicepotResult<SessionSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply })?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    /// The notification feed as a `Stream`.
    pub fn events(&self) -> BroadcastStream<GameEvent> {
        self.events.stream()
    }

    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(Command::Shutdown);
    }

    fn send(&self, command: Command) -> DicepotResult<()> {
        self.cmd_tx.send(command).map_err(|_| EngineError::Closed)
    }
}

/// The engine task. Constructed and spawned via [`TurnEngine::spawn`];
/// all interaction goes through the returned [`EngineHandle`].
pub struct TurnEngine {
    config: GameConfig,
    session: Session,
    roller: DiceRoller<StdRng>,
    detector: MotionDetector,
    scheduler: TurnScheduler,
    events: EventBus,
    presentation: Box<dyn PresentationPolicy>,
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    /// Gesture throws are ignored until this instant, so an in-flight
    /// motion signal cannot double-fire the next player's turn.
    gesture_cooldown_until: Option<Instant>,
    pending_reset: Option<oneshot::Sender<SessionSnapshot>>,
    stopping: bool,
}

impl TurnEngine {
    /// Spawn the engine task and return its handle.
    pub fn spawn(mut config: GameConfig, options: EngineOptions) -> EngineHandle {
        config.sanitize();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let events = EventBus::new(config.events.capacity);
        let roller = match options.rng_seed {
            Some(seed) => DiceRoller::seeded(config.session.dice_policy, seed),
            None => DiceRoller::from_entropy(config.session.dice_policy),
        };
        let engine = TurnEngine {
            session: Session::setup(),
            roller,
            detector: MotionDetector::new(config.motion.clone()),
            scheduler: TurnScheduler::new(config.timing.clone(), options.scheduler_mode),
            events: events.clone(),
            presentation: options.presentation,
            cmd_rx,
            gesture_cooldown_until: None,
            pending_reset: None,
            stopping: false,
            config,
        };
        tokio::spawn(engine.run());
        EngineHandle { cmd_tx, events }
    }

    async fn run(mut self) {
        tracing::info!(policy = %self.config.session.dice_policy, "turn engine started");
        while !self.stopping {
            let Some(command) = self.cmd_rx.recv().await else {
                break;
            };
            self.handle_command(command).await;
        }
        tracing::info!("turn engine stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Shutdown => self.stopping = true,
            Command::Snapshot { reply } => {
                let _ = reply.send(self.session.snapshot());
            }
            Command::Configure {
                player_count,
                initial_pot_override,
                reply,
            } => {
                let _ = reply.send(self.configure(player_count, initial_pot_override));
            }
            Command::Reset { reply } => {
                self.reset();
                let _ = reply.send(self.session.snapshot());
            }
            Command::Acknowledge => {
                tracing::debug!("acknowledgment with no settlement pending ignored");
            }
            Command::MotionSample(sample) => self.on_motion_sample(sample).await,
            Command::Trigger { source } => self.on_trigger(source).await,
        }
    }

    fn configure(
        &mut self,
        player_count: u32,
        initial_pot_override: Option<i64>,
    ) -> DicepotResult<SessionSnapshot> {
        if self.session.phase() != Phase::Setup {
            tracing::warn!(phase = %self.session.phase(), "configure rejected");
            return Err(EngineError::Rejected {
                phase: self.session.phase(),
            });
        }
        self.session = Session::configured(
            &self.config.session,
            &self.config.economy,
            player_count,
            initial_pot_override,
        );
        Ok(self.session.snapshot())
    }

    fn reset(&mut self) {
        tracing::info!("session reset to setup");
        self.session = Session::setup();
        self.detector.reset();
        self.gesture_cooldown_until = None;
        self.events.emit(GameEvent::SessionReset);
    }

    /// The detector sees every sample; the table only listens while idle.
    async fn on_motion_sample(&mut self, sample: MotionSample) {
        let motion_events = self.detector.on_sample(sample);
        if motion_events.is_empty() {
            return;
        }
        if self.session.phase() != Phase::Idle {
            tracing::trace!(phase = %self.session.phase(), "motion events outside idle discarded");
            return;
        }
        let mut throw = false;
        for event in &motion_events {
            match event {
                MotionEvent::ShakeStarted => self.events.emit(GameEvent::ShakeStarted),
                MotionEvent::ShakeStopped => self.events.emit(GameEvent::ShakeStopped),
                MotionEvent::ThrowTriggered => throw = true,
            }
        }
        if throw {
            self.on_trigger(TriggerSource::Gesture).await;
        }
    }

    async fn on_trigger(&mut self, source: TriggerSource) {
        if self.session.phase() != Phase::Idle {
            tracing::debug!(%source, phase = %self.session.phase(), "trigger ignored");
            return;
        }
        if source == TriggerSource::Gesture {
            if let Some(until) = self.gesture_cooldown_until {
                if Instant::now() < until {
                    tracing::debug!("gesture trigger inside cooldown window ignored");
                    return;
                }
            }
        }

        self.run_turn().await;

        self.gesture_cooldown_until = Some(Instant::now() + self.scheduler.trigger_cooldown());
        self.drain_stale_commands();
        if let Some(reply) = self.pending_reset.take() {
            self.reset();
            let _ = reply.send(self.session.snapshot());
        }
    }

    /// One full turn, strictly ordered: shake window, roll, reveal
    /// suspense, point disclosure, settlement, then either victory or the
    /// advance to the next seat.
    async fn run_turn(&mut self) {
        self.session.begin_turn();
        let player = self.session.current_player().clone();
        tracing::info!(
            player = %player.display_name,
            pot = self.session.pot_balance(),
            "turn started"
        );
        self.events.emit(GameEvent::RollStarted {
            player_id: player.id,
        });
        self.scheduler.pause(StagePause::ShakeWindow).await;

        let outcome = self.roller.roll_six();
        let positions = self.roller.scatter_positions(DICE_COUNT);
        self.events.emit(GameEvent::DiceLanded {
            faces: outcome.faces,
            positions,
        });

        self.scheduler.pause(StagePause::RevealSuspense).await;
        self.events.emit(GameEvent::PointsRevealed {
            total: outcome.point_total,
        });
        self.scheduler.pause(StagePause::PointsLinger).await;

        let settlement = economy::settle(
            outcome.point_total,
            self.config.economy.cash_per_point,
            self.session.pot_balance(),
            &self.session.other_player_ids(),
        );
        self.session
            .apply_settlement(outcome.point_total, &settlement);
        self.events.emit(GameEvent::SettlementApplied {
            player_id: player.id,
            point_total: outcome.point_total,
            settlement: settlement.clone(),
            pot_after: self.session.pot_balance(),
        });

        if settlement.kind == SettlementKind::ExactWin {
            self.session.declare_victory();
            tracing::info!(winner = %player.display_name, "exact win, session over");
            self.events.emit(GameEvent::VictoryReached {
                ranking: self.session.ranking(),
            });
            return;
        }

        if outcome.point_total == 0 {
            // Nothing moved; nobody is asked to acknowledge a no-op turn.
            self.scheduler.pause(StagePause::ZeroRoll).await;
        } else {
            match self.presentation.settlement_display(&settlement) {
                SettlementDisplay::Overlay => self.wait_for_acknowledgment().await,
                SettlementDisplay::Snackbar { linger_ms } => {
                    self.scheduler
                        .pause_for(Duration::from_millis(linger_ms))
                        .await;
                }
            }
        }

        self.session.finish_turn();
        self.events.emit(GameEvent::TurnAdvanced {
            player_index: self.session.current_player_index(),
            player_id: self.session.current_player().id,
        });
    }

    /// Hold the turn open until the presentation layer acknowledges the
    /// settlement, bounded by the configured timeout so an absent UI can
    /// never stall the table.
    async fn wait_for_acknowledgment(&mut self) {
        let deadline = Instant::now() + self.scheduler.ack_timeout();
        loop {
            let command = match tokio::time::timeout_at(deadline, self.cmd_rx.recv()).await {
                Err(_) => {
                    tracing::debug!("settlement acknowledgment timed out, advancing");
                    return;
                }
                Ok(None) => {
                    self.stopping = true;
                    return;
                }
                Ok(Some(command)) => command,
            };
            match command {
                Command::Acknowledge => return,
                Command::Shutdown => {
                    self.stopping = true;
                    return;
                }
                Command::Snapshot { reply } => {
                    let _ = reply.send(self.session.snapshot());
                }
                Command::MotionSample(sample) => {
                    // Keep the detector current; its events describe a
                    // table that is not idle.
                    let _ = self.detector.on_sample(sample);
                }
                Command::Trigger { source } => {
                    tracing::debug!(%source, "trigger during settlement wait dropped");
                }
                Command::Configure { reply, .. } => {
                    let _ = reply.send(Err(EngineError::Rejected {
                        phase: self.session.phase(),
                    }));
                }
                Command::Reset { reply } => {
                    // No mid-roll cancellation: stop waiting, let the turn
                    // complete, and apply the reset right after.
                    self.pending_reset = Some(reply);
                    return;
                }
            }
        }
    }

    /// Flush commands that piled up while a turn was in flight.
    fn drain_stale_commands(&mut self) {
        while let Ok(command) = self.cmd_rx.try_recv() {
            match command {
                Command::Trigger { source } => {
                    tracing::debug!(%source, "trigger submitted mid-turn dropped");
                }
                Command::MotionSample(sample) => {
                    let _ = self.detector.on_sample(sample);
                }
                Command::Acknowledge => {
                    tracing::debug!("stale acknowledgment dropped");
                }
                Command::Snapshot { reply } => {
                    let _ = reply.send(self.session.snapshot());
                }
                Command::Configure {
                    player_count,
                    initial_pot_override,
                    reply,
                } => {
                    let _ = reply.send(self.configure(player_count, initial_pot_override));
                }
                Command::Reset { reply } => {
                    self.reset();
                    let _ = reply.send(self.session.snapshot());
                }
                Command::Shutdown => self.stopping = true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn snapshot_before_configure_shows_setup() {
        let handle = TurnEngine::spawn(GameConfig::default(), EngineOptions::default());
        let snapshot = handle.snapshot().await.expect("snapshot");
        assert_eq!(snapshot.phase, Phase::Setup);
        assert!(snapshot.players.is_empty());
        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn configure_is_rejected_once_the_game_started() {
        let handle = TurnEngine::spawn(GameConfig::default(), EngineOptions::default());
        handle.configure_session(4, None).await.expect("configure");
        let err = handle.configure_session(4, None).await.unwrap_err();
        assert!(matches!(err, EngineError::Rejected { phase: Phase::Idle }));
        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn reset_returns_to_setup() {
        let handle = TurnEngine::spawn(GameConfig::default(), EngineOptions::default());
        handle.configure_session(3, None).await.expect("configure");
        let snapshot = handle.reset_session().await.expect("reset");
        assert_eq!(snapshot.phase, Phase::Setup);
        // A fresh configure works again after the reset.
        let snapshot = handle.configure_session(3, None).await.expect("configure");
        assert_eq!(snapshot.players.len(), 3);
        handle.shutdown();
    }
}
