//! Session state: players, pot, phase, and the running turn log
//!
//! The session is a plain data holder owned exclusively by the turn
//! engine. Settlement application is the only mutation path for money,
//! and it applies pot and player deltas together so no reader can
//! observe a half-applied settlement.

use crate::config::{EconomyConfig, SessionConfig};
use crate::game::types::{
    Phase, Player, PlayerId, RankedPlayer, SessionSnapshot, Settlement, TurnRecord,
};
use chrono::Utc;
use uuid::Uuid;

pub struct Session {
    session_id: Uuid,
    players: Vec<Player>,
    current_player_index: usize,
    pot_balance: i64,
    phase: Phase,
    history: Vec<TurnRecord>,
    /// Money put on the table at configure time; conserved across every
    /// settlement thereafter.
    total_money_injected: i64,
    turns_played: u32,
}

impl Session {
    /// Empty pre-game session: no players, no pot, `Setup` phase.
    pub fn setup() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            players: Vec::new(),
            current_player_index: 0,
            pot_balance: 0,
            phase: Phase::Setup,
            history: Vec::new(),
            total_money_injected: 0,
            turns_played: 0,
        }
    }

    /// Build a live session. The player count is clamped into the
    /// configured range; an absent or non-positive pot override falls
    /// back to `player_count * base_pot_per_player`.
    pub fn configured(
        session_config: &SessionConfig,
        economy: &EconomyConfig,
        requested_players: u32,
        pot_override: Option<i64>,
    ) -> Self {
        let player_count = session_config.clamp_player_count(requested_players);
        if player_count != requested_players {
            tracing::warn!(requested_players, player_count, "player count clamped");
        }

        let players = (1..=player_count)
            .map(|i| Player {
                id: PlayerId(i),
                display_name: format!("Player {}", i),
                avatar: session_config.avatar_glyphs
                    [(i as usize - 1) % session_config.avatar_glyphs.len()]
                .clone(),
                balance: 0,
            })
            .collect();

        let default_pot = player_count as i64 * economy.base_pot_per_player;
        let pot_balance = match pot_override {
            Some(pot) if pot > 0 => pot,
            Some(pot) => {
                tracing::warn!(pot, default_pot, "invalid pot override, using default");
                default_pot
            }
            None => default_pot,
        };

        let session = Self {
            session_id: Uuid::new_v4(),
            players,
            current_player_index: 0,
            pot_balance,
            phase: Phase::Idle,
            history: Vec::new(),
            total_money_injected: pot_balance,
            turns_played: 0,
        };
        session.assert_idle_ready();
        tracing::info!(
            session_id = %session.session_id,
            players = player_count,
            pot = pot_balance,
            "session configured"
        );
        session
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pot_balance(&self) -> i64 {
        self.pot_balance
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player_index
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn turns_played(&self) -> u32 {
        self.turns_played
    }

    /// The seat whose turn it is. Only meaningful once configured.
    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player_index]
    }

    /// Every seat except the acting one, in seating order.
    pub fn other_player_ids(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != self.current_player_index)
            .map(|(_, p)| p.id)
            .collect()
    }

    /// Pot plus all player balances.
    pub fn total_money(&self) -> i64 {
        self.pot_balance + self.players.iter().map(|p| p.balance).sum::<i64>()
    }

    pub fn begin_turn(&mut self) {
        debug_assert_eq!(self.phase, Phase::Idle);
        self.phase = Phase::Rolling;
    }

    /// Apply a settlement to the acting player, the pot, and any bonus
    /// counterparties in one step, and append the turn record.
    pub fn apply_settlement(&mut self, point_total: u32, settlement: &Settlement) {
        self.pot_balance += settlement.pot_delta;
        self.players[self.current_player_index].balance += settlement.player_delta;
        for transfer in &settlement.bonus_transfers {
            if let Some(player) = self.players.iter_mut().find(|p| p.id == transfer.player_id) {
                player.balance += transfer.amount;
            }
        }

        self.turns_played += 1;
        let acting = &self.players[self.current_player_index];
        self.history.push(TurnRecord {
            turn: self.turns_played,
            player_id: acting.id,
            display_name: acting.display_name.clone(),
            avatar: acting.avatar.clone(),
            point_total,
            amount_change: settlement.player_delta,
            kind: settlement.kind,
            at: Utc::now(),
        });

        tracing::info!(
            player = %acting.display_name,
            kind = %settlement.kind,
            point_total,
            pot = self.pot_balance,
            "settlement applied"
        );
        debug_assert!(self.pot_balance >= 0);
        debug_assert_eq!(self.total_money(), self.total_money_injected);
    }

    pub fn declare_victory(&mut self) {
        debug_assert_eq!(self.phase, Phase::Rolling);
        self.phase = Phase::Victory;
    }

    /// Advance to the next seat and reopen the table for triggers.
    pub fn finish_turn(&mut self) {
        debug_assert_eq!(self.phase, Phase::Rolling);
        self.current_player_index = (self.current_player_index + 1) % self.players.len();
        self.phase = Phase::Idle;
        self.assert_idle_ready();
    }

    /// Players sorted by descending balance, ties kept in seating order.
    /// Rank 1 is the winner.
    pub fn ranking(&self) -> Vec<RankedPlayer> {
        let mut sorted: Vec<Player> = self.players.clone();
        sorted.sort_by(|a, b| b.balance.cmp(&a.balance));
        sorted
            .into_iter()
            .enumerate()
            .map(|(i, player)| RankedPlayer {
                rank: i as u32 + 1,
                player,
                is_winner: i == 0,
            })
            .collect()
    }

    /// Read-only view for presentation; history newest first.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            phase: self.phase,
            pot_balance: self.pot_balance,
            initial_pot: self.total_money_injected,
            current_player_index: self.current_player_index,
            players: self.players.clone(),
            history: self.history.iter().rev().cloned().collect(),
        }
    }

    /// A pot that has hit zero without a win would make every later turn
    /// a bounce-back or a degenerate tie; the economy cannot produce that
    /// state, so entering `Idle` with an empty pot is a logic error.
    fn assert_idle_ready(&self) {
        debug_assert!(self.pot_balance > 0, "idle with empty pot");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::economy::settle;

    fn configured(players: u32, pot: Option<i64>) -> Session {
        Session::configured(
            &SessionConfig::default(),
            &EconomyConfig::default(),
            players,
            pot,
        )
    }

    #[test]
    fn setup_session_is_empty() {
        let session = Session::setup();
        assert_eq!(session.phase(), Phase::Setup);
        assert!(session.players().is_empty());
        assert_eq!(session.pot_balance(), 0);
    }

    #[test]
    fn configure_defaults_pot_from_player_count() {
        let session = configured(4, None);
        assert_eq!(session.players().len(), 4);
        assert_eq!(session.pot_balance(), 400);
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.current_player().id, PlayerId(1));
        assert!(session.players().iter().all(|p| p.balance == 0));
    }

    #[test]
    fn configure_clamps_player_count() {
        assert_eq!(configured(1, None).players().len(), 2);
        assert_eq!(configured(50, None).players().len(), 20);
    }

    #[test]
    fn invalid_pot_override_falls_back_to_default() {
        assert_eq!(configured(3, Some(-7)).pot_balance(), 300);
        assert_eq!(configured(3, Some(0)).pot_balance(), 300);
        assert_eq!(configured(3, Some(777)).pot_balance(), 777);
    }

    #[test]
    fn take_settlement_moves_money_and_logs_the_turn() {
        let mut session = configured(2, Some(200));
        session.begin_turn();
        let settlement = settle(10, 10, session.pot_balance(), &session.other_player_ids());
        session.apply_settlement(10, &settlement);
        assert_eq!(session.pot_balance(), 100);
        assert_eq!(session.players()[0].balance, 100);
        assert_eq!(session.players()[1].balance, 0);
        session.finish_turn();
        assert_eq!(session.current_player_index(), 1);
        assert_eq!(session.phase(), Phase::Idle);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.history.len(), 1);
        assert_eq!(snapshot.history[0].turn, 1);
        assert_eq!(snapshot.history[0].amount_change, 100);
    }

    #[test]
    fn bounce_back_can_push_a_balance_negative() {
        let mut session = configured(2, Some(100));
        session.begin_turn();
        let settlement = settle(20, 10, session.pot_balance(), &session.other_player_ids());
        session.apply_settlement(20, &settlement);
        assert_eq!(session.pot_balance(), 200);
        assert_eq!(session.players()[0].balance, -100);
        assert_eq!(session.total_money(), 100);
    }

    #[test]
    fn exact_win_pays_pot_and_bonuses() {
        let mut session = configured(4, Some(100));
        session.begin_turn();
        let settlement = settle(10, 10, session.pot_balance(), &session.other_player_ids());
        session.apply_settlement(10, &settlement);
        session.declare_victory();

        assert_eq!(session.pot_balance(), 0);
        assert_eq!(session.players()[0].balance, 400);
        for loser in &session.players()[1..] {
            assert_eq!(loser.balance, -100);
        }
        assert_eq!(session.total_money(), 100);
        assert_eq!(session.phase(), Phase::Victory);

        let ranking = session.ranking();
        assert_eq!(ranking[0].player.id, PlayerId(1));
        assert!(ranking[0].is_winner);
        assert_eq!(ranking[0].rank, 1);
        // Tied losers keep seating order.
        assert_eq!(ranking[1].player.id, PlayerId(2));
        assert_eq!(ranking[2].player.id, PlayerId(3));
        assert_eq!(ranking[3].player.id, PlayerId(4));
        assert!(!ranking[1].is_winner);
    }

    #[test]
    fn money_is_conserved_over_many_turns() {
        let mut session = configured(5, None);
        let injected = session.total_money();
        // Deterministic mix of takes and bounce-backs.
        for points in [3u32, 30, 12, 36, 1, 25, 8, 33, 2, 29] {
            session.begin_turn();
            let settlement = settle(
                points,
                10,
                session.pot_balance(),
                &session.other_player_ids(),
            );
            if settlement.kind == crate::game::types::SettlementKind::ExactWin {
                session.apply_settlement(points, &settlement);
                session.declare_victory();
                break;
            }
            session.apply_settlement(points, &settlement);
            session.finish_turn();
        }
        assert_eq!(session.total_money(), injected);
    }

    #[test]
    fn snapshot_history_is_newest_first() {
        let mut session = configured(2, Some(1000));
        for points in [1u32, 2, 3] {
            session.begin_turn();
            let settlement = settle(
                points,
                10,
                session.pot_balance(),
                &session.other_player_ids(),
            );
            session.apply_settlement(points, &settlement);
            session.finish_turn();
        }
        let snapshot = session.snapshot();
        assert_eq!(snapshot.history[0].turn, 3);
        assert_eq!(snapshot.history[2].turn, 1);
    }
}
