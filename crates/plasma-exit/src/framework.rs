//! Collaborators the exit game relies on but does not own.
//!
//! The plasma framework stores block roots and runs the exit queue; the vault
//! holds funds. The game only talks to them through these traits.

use std::sync::Arc;

use plasma_exit_core::{Address, B256, ExitId, ExitPriority, OutputId, U256};
use serde::{Deserialize, Serialize};

/// A submitted block as the framework records it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Merkle root of the block's transactions.
    pub root: B256,
    /// Base-chain timestamp at submission, in seconds.
    pub timestamp: u64,
}

/// Read access to submitted block roots.
pub trait BlockRootStore: Send + Sync {
    /// The block with this number, if one was submitted.
    fn block(&self, block_num: u64) -> Option<BlockHeader>;
}

/// An exit waiting in the priority queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedExit {
    /// Uniqueness key, `keccak256(utxoPos || token)`.
    pub key: B256,
    pub priority: ExitPriority,
    pub exit_id: ExitId,
    /// The exited output, flagged as spent once the exit is paid.
    pub output_id: OutputId,
    /// Who the queue calls back when the exit is due.
    pub processor: Address,
}

/// The framework's exit priority queue.
pub trait PriorityQueue: Send + Sync {
    /// Queue an exit. Fails if the key is already queued.
    fn enqueue(&self, exit: QueuedExit) -> anyhow::Result<()>;
}

/// Outputs that have already left the plasma chain.
///
/// An output flagged here can never be exited again.
pub trait SpentOutputs: Send + Sync {
    fn is_output_spent(&self, output_id: &OutputId) -> bool;

    fn flag_output_spent(&self, output_id: OutputId);
}

/// A single movement of funds out of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub to: Address,
    /// Asset to pay; `Address::ZERO` is ETH.
    pub token: Address,
    pub amount: U256,
}

impl Payout {
    /// An ETH payout.
    pub fn eth(to: Address, amount: U256) -> Self {
        Self {
            to,
            token: Address::ZERO,
            amount,
        }
    }
}

/// Holder of bonds and exited funds.
pub trait Treasury: Send + Sync {
    /// Make every payout, or none of them.
    fn pay(&self, payouts: &[Payout]) -> anyhow::Result<()>;
}

/// Handles to every collaborator a game talks to.
#[derive(Clone)]
pub struct Framework {
    pub blocks: Arc<dyn BlockRootStore>,
    pub queue: Arc<dyn PriorityQueue>,
    pub treasury: Arc<dyn Treasury>,
    pub outputs: Arc<dyn SpentOutputs>,
}

impl Framework {
    pub fn new(
        blocks: Arc<dyn BlockRootStore>,
        queue: Arc<dyn PriorityQueue>,
        treasury: Arc<dyn Treasury>,
        outputs: Arc<dyn SpentOutputs>,
    ) -> Self {
        Self {
            blocks,
            queue,
            treasury,
            outputs,
        }
    }
}

impl std::fmt::Debug for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Framework").finish_non_exhaustive()
    }
}
