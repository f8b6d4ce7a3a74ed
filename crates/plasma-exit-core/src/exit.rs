//! The standard exit record.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// A standard exit, keyed by its [`ExitId`](crate::ExitId).
///
/// Only a commitment to the exited output is kept; a challenger must resupply
/// the output data and it is checked against `output_related_data_hash`.
/// The all-zero value is the absent record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StandardExit {
    /// Whether the exit can still be processed or challenged.
    pub exitable: bool,

    /// `keccak256(utxoPos || outputId || outputType || outputGuard)`.
    pub output_related_data_hash: B256,

    /// The exited asset.
    pub token: Address,

    /// Who receives the funds on finalization.
    pub exit_target: Address,

    /// The exited amount.
    pub amount: U256,
}

impl StandardExit {
    /// Check whether this is the absent (all-zero) record.
    pub fn is_absent(&self) -> bool {
        *self == Self::default()
    }
}
