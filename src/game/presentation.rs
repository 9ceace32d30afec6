//! Settlement surfacing styles
//!
//! The table can surface a settlement as a blocking overlay the player
//! dismisses, or as a transient snackbar that clears itself. The choice
//! is an injected capability so the turn engine never branches on a UI
//! mode flag.

use crate::game::types::Settlement;

/// How a non-winning settlement is surfaced to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementDisplay {
    /// Blocking notice; the engine waits for an acknowledgment, bounded
    /// by the configured timeout.
    Overlay,
    /// Transient notice; the engine lingers for `linger_ms` and advances
    /// on its own.
    Snackbar { linger_ms: u64 },
}

/// Injected capability deciding how settlements are surfaced.
pub trait PresentationPolicy: Send + Sync {
    fn settlement_display(&self, settlement: &Settlement) -> SettlementDisplay;
}

/// Acknowledgment-gated settlement notices. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayPresentation;

impl PresentationPolicy for OverlayPresentation {
    fn settlement_display(&self, _settlement: &Settlement) -> SettlementDisplay {
        SettlementDisplay::Overlay
    }
}

/// Self-clearing settlement notices.
#[derive(Debug, Clone, Copy)]
pub struct SnackbarPresentation {
    pub linger_ms: u64,
}

impl SnackbarPresentation {
    pub fn new(linger_ms: u64) -> Self {
        Self { linger_ms }
    }
}

impl PresentationPolicy for SnackbarPresentation {
    fn settlement_display(&self, _settlement: &Settlement) -> SettlementDisplay {
        SettlementDisplay::Snackbar {
            linger_ms: self.linger_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::SettlementKind;

    fn any_settlement() -> Settlement {
        Settlement {
            kind: SettlementKind::Take,
            pot_delta: -10,
            player_delta: 10,
            bonus_transfers: Vec::new(),
        }
    }

    #[test]
    fn overlay_always_waits_for_acknowledgment() {
        assert_eq!(
            OverlayPresentation.settlement_display(&any_settlement()),
            SettlementDisplay::Overlay
        );
    }

    #[test]
    fn snackbar_clears_itself() {
        assert_eq!(
            SnackbarPresentation::new(1500).settlement_display(&any_settlement()),
            SettlementDisplay::Snackbar { linger_ms: 1500 }
        );
    }
}
