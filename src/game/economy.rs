//! Pot settlement rules
//!
//! Pure mapping from a rolled point total and the current pot to the
//! balance movements of one turn. Three outcomes: take (roll below pot),
//! bounce-back (roll above pot, player pays only the overshoot), and
//! exact win (roll matches pot, session over, everyone else pays up).

use crate::game::types::{BonusTransfer, PlayerId, Settlement, SettlementKind};

/// Settle one roll against the pot.
///
/// `other_players` are the non-acting seats; they are only charged on an
/// exact win. The caller guarantees `pot_balance >= 0`.
pub fn settle(
    point_total: u32,
    cash_per_point: i64,
    pot_balance: i64,
    other_players: &[PlayerId],
) -> Settlement {
    let roll_value = point_total as i64 * cash_per_point;

    if roll_value == pot_balance {
        // Match the pot exactly: take it all, and every other player pays
        // the roll value on top.
        let bonus_transfers: Vec<BonusTransfer> = other_players
            .iter()
            .map(|&player_id| BonusTransfer {
                player_id,
                amount: -roll_value,
            })
            .collect();
        let bonus_total = roll_value * other_players.len() as i64;
        Settlement {
            kind: SettlementKind::ExactWin,
            pot_delta: -pot_balance,
            player_delta: pot_balance + bonus_total,
            bonus_transfers,
        }
    } else if roll_value < pot_balance {
        Settlement {
            kind: SettlementKind::Take,
            pot_delta: -roll_value,
            player_delta: roll_value,
            bonus_transfers: Vec::new(),
        }
    } else {
        // The player is charged the overshoot only, never the full roll.
        let bounce_back = roll_value - pot_balance;
        Settlement {
            kind: SettlementKind::BounceBack,
            pot_delta: bounce_back,
            player_delta: -bounce_back,
            bonus_transfers: Vec::new(),
        }
    }
}
