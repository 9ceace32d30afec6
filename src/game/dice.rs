//! Dice outcome generation
//!
//! Produces the per-turn [`RollOutcome`] under one of the two supported
//! probability policies, plus the presentation-only scatter placement of
//! the landed dice. Pure with respect to the injected RNG, so outcomes
//! are fully replayable from a seed.

use crate::game::types::{DicePolicy, DiePlacement, RollOutcome};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of dice thrown each turn.
pub const DICE_COUNT: usize = 6;

// Landing-tray geometry for scatter placement. Presentation only; the
// engine never reads these positions back.
const TRAY_WIDTH: f32 = 320.0;
const TRAY_HEIGHT: f32 = 240.0;
const TRAY_PADDING: f32 = 20.0;
const DIE_SIZE: f32 = 50.0;
const MIN_SPACING: f32 = DIE_SIZE * 0.9;
const MAX_PLACEMENT_RETRIES: usize = 100;

/// Generates per-turn dice outcomes under the configured policy.
pub struct DiceRoller<R: Rng> {
    policy: DicePolicy,
    rng: R,
}

impl DiceRoller<StdRng> {
    /// Roller seeded from OS entropy.
    pub fn from_entropy(policy: DicePolicy) -> Self {
        Self::new(policy, StdRng::from_entropy())
    }

    /// Deterministic roller for tests and replayable simulations.
    pub fn seeded(policy: DicePolicy, seed: u64) -> Self {
        Self::new(policy, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> DiceRoller<R> {
    pub fn new(policy: DicePolicy, rng: R) -> Self {
        Self { policy, rng }
    }

    pub fn policy(&self) -> DicePolicy {
        self.policy
    }

    /// Throw all six dice and total the faces.
    pub fn roll_six(&mut self) -> RollOutcome {
        let mut faces = [0u8; DICE_COUNT];
        for (i, face) in faces.iter_mut().enumerate() {
            *face = match self.policy {
                DicePolicy::Standard => self.rng.gen_range(1..=6),
                // Die i pays its own index or nothing.
                DicePolicy::Sparse => {
                    if self.rng.gen_range(0..6) == 0 {
                        (i + 1) as u8
                    } else {
                        0
                    }
                }
            };
        }
        let point_total = faces.iter().map(|&f| f as u32).sum();
        RollOutcome { faces, point_total }
    }

    /// Random non-overlapping placements for `count` dice in the landing
    /// tray. Placement retries a bounded number of times per die and then
    /// accepts the overlap; a crowded tray beats an unplaced die.
    pub fn scatter_positions(&mut self, count: usize) -> Vec<DiePlacement> {
        let mut placed: Vec<DiePlacement> = Vec::with_capacity(count);
        for _ in 0..count {
            let mut x = TRAY_PADDING;
            let mut y = TRAY_PADDING;
            for _ in 0..MAX_PLACEMENT_RETRIES {
                x = TRAY_PADDING
                    + self.rng.gen::<f32>() * (TRAY_WIDTH - DIE_SIZE - TRAY_PADDING * 2.0);
                y = TRAY_PADDING
                    + self.rng.gen::<f32>() * (TRAY_HEIGHT - DIE_SIZE - TRAY_PADDING * 2.0);
                let overlaps = placed.iter().any(|other| {
                    let dx = x - other.x;
                    let dy = y - other.y;
                    (dx * dx + dy * dy).sqrt() < MIN_SPACING
                });
                if !overlaps {
                    break;
                }
            }
            placed.push(DiePlacement {
                x,
                y,
                rotation_deg: self.rng.gen::<f32>() * 360.0,
            });
        }
        placed
    }
}
