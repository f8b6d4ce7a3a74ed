//! Events for off-chain observers.

use plasma_exit_core::{Address, ExitId, UtxoPos};
use serde::{Deserialize, Serialize};

/// Something an exit game did, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum ExitEvent {
    ExitStarted { owner: Address, exit_id: ExitId },
    ExitChallenged { utxo_pos: UtxoPos },
    ExitFinalized { exit_id: ExitId },
}

impl ExitEvent {
    /// Event name as observers see it.
    pub fn name(&self) -> &'static str {
        match self {
            ExitEvent::ExitStarted { .. } => "ExitStarted",
            ExitEvent::ExitChallenged { .. } => "ExitChallenged",
            ExitEvent::ExitFinalized { .. } => "ExitFinalized",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_is_tagged() {
        let event = ExitEvent::ExitChallenged {
            utxo_pos: UtxoPos::new(1000, 0, 0).unwrap(),
        };
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["event"], "ExitChallenged");
        assert_eq!(event.name(), "ExitChallenged");
        assert_eq!(serde_json::from_value::<ExitEvent>(json).unwrap(), event);
    }
}
