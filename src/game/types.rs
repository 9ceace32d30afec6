use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable 1-based player identifier, fixed for the life of a session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A seat at the table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
    pub avatar: String,
    /// Running balance; repeated bounce-backs can push it negative.
    pub balance: i64,
}

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Setup,
    Idle,
    Rolling,
    Victory,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Setup => write!(f, "setup"),
            Phase::Idle => write!(f, "idle"),
            Phase::Rolling => write!(f, "rolling"),
            Phase::Victory => write!(f, "victory"),
        }
    }
}

/// Dice generation policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DicePolicy {
    /// Six independent dice, each uniform over 1..=6.
    Standard,
    /// Die `i` shows value `i` with probability 1/6, otherwise blank.
    Sparse,
}

impl fmt::Display for DicePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DicePolicy::Standard => write!(f, "standard"),
            DicePolicy::Sparse => write!(f, "sparse"),
        }
    }
}

/// One throw of the six dice. Ephemeral: produced per turn, settled, gone.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RollOutcome {
    /// Face values in die order; 0 marks a blank under the sparse policy.
    pub faces: [u8; 6],
    pub point_total: u32,
}

/// How a roll settled against the pot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SettlementKind {
    /// Roll value below the pot: player takes it out.
    Take,
    /// Roll value above the pot: player pays the overshoot back in.
    BounceBack,
    /// Roll value equal to the pot: the player wins the session.
    ExactWin,
}

impl fmt::Display for SettlementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettlementKind::Take => write!(f, "take"),
            SettlementKind::BounceBack => write!(f, "bounce-back"),
            SettlementKind::ExactWin => write!(f, "exact-win"),
        }
    }
}

/// One per-player line of the exact-win payout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BonusTransfer {
    pub player_id: PlayerId,
    /// Signed from that player's perspective (always negative today).
    pub amount: i64,
}

/// Balance movements produced by settling one roll.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settlement {
    pub kind: SettlementKind,
    pub pot_delta: i64,
    /// Delta applied to the acting player.
    pub player_delta: i64,
    /// Extra transfers charged to the other players; empty unless the
    /// settlement is an exact win.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bonus_transfers: Vec<BonusTransfer>,
}

impl Settlement {
    /// Net money created across pot and all players. Zero for every legal
    /// settlement: the economy moves money, it never mints it.
    pub fn net_flow(&self) -> i64 {
        self.pot_delta
            + self.player_delta
            + self.bonus_transfers.iter().map(|t| t.amount).sum::<i64>()
    }
}

/// Where a roll trigger came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TriggerSource {
    /// An explicit roll request from the presentation layer.
    Manual,
    /// A throw event from the motion gesture detector.
    Gesture,
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerSource::Manual => write!(f, "manual"),
            TriggerSource::Gesture => write!(f, "gesture"),
        }
    }
}

/// Presentation-only placement of a die inside the landing tray.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DiePlacement {
    pub x: f32,
    pub y: f32,
    pub rotation_deg: f32,
}

/// One line of the running game log, newest first in snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnRecord {
    pub turn: u32,
    pub player_id: PlayerId,
    pub display_name: String,
    pub avatar: String,
    pub point_total: u32,
    /// Signed change to the acting player's balance.
    pub amount_change: i64,
    pub kind: SettlementKind,
    pub at: DateTime<Utc>,
}

/// Victory ranking entry: descending balance, ties broken by seat order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankedPlayer {
    pub rank: u32,
    pub player: Player,
    pub is_winner: bool,
}

/// Read-only view of the session for the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub phase: Phase,
    pub pot_balance: i64,
    pub initial_pot: i64,
    pub current_player_index: usize,
    pub players: Vec<Player>,
    /// Turn history, newest first.
    pub history: Vec<TurnRecord>,
}
