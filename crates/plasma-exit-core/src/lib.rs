//! # Plasma Exit Core
//!
//! Pure primitives for plasma standard exits: transactions, positions,
//! Merkle proofs, and identities.
//!
//! This crate contains no I/O, no storage, no networking. It is pure computation
//! over the commitments a plasma operator anchors on the base chain.
//!
//! ## Key Types
//!
//! - [`Transaction`] - The generic plasma transaction
//! - [`UtxoPos`] - Packed `(blockNum, txIndex, outputIndex)` position
//! - [`OutputId`] - Position-aware output identifier
//! - [`ExitId`] - 192-bit standard exit identifier
//! - [`MerkleProof`] - Inclusion proof against a block root
//! - [`StandardExit`] - The committed exit record
//!
//! ## Canonicalization
//!
//! Transactions are encoded as canonical RLP. See [`canonical`] module.

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod exit;
pub mod exitable;
pub mod identity;
pub mod merkle;
pub mod transaction;
pub mod types;

pub use canonical::{decode_output, decode_transaction, encode_output, encode_transaction};
pub use crypto::{address_to_output_guard, output_guard_to_address, Packed};
pub use error::{CodecError, MerkleError, PositionError};
pub use exit::StandardExit;
pub use exitable::{ExitPriority, ExitableTimestamp};
pub use identity::{exit_id, is_deposit, output_guard, output_id, output_related_data_hash, queue_key};
pub use merkle::{build_proof, check_membership, MerkleProof, MerkleTree, DEFAULT_TREE_DEPTH};
pub use transaction::{FeeClaimOutput, Output, PaymentOutput, Transaction, TransactionBuilder};
pub use types::{output_type, tx_type, ExitId, OutputId, UtxoPos, MAX_INPUTS, MAX_OUTPUTS};

pub use alloy_primitives::{Address, B256, U256};
