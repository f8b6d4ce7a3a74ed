//! Error types for the plasma exit core.

use thiserror::Error;

/// Errors raised while decoding or validating a transaction.
///
/// Every variant is detected before any exit state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid encoding of transaction: {0}")]
    MalformedEncoding(String),

    #[error("transaction inputs num exceeds limit: {0}")]
    TooManyInputs(usize),

    #[error("transaction outputs num exceeds limit: {0}")]
    TooManyOutputs(usize),

    #[error("transaction cannot have 0 outputs")]
    NoOutputs,

    #[error("null input not allowed (input {0})")]
    NullInput(usize),

    #[error("transaction type must not be 0")]
    ZeroTxType,

    #[error("output type must not be 0")]
    ZeroOutputType,

    #[error("output amount must not be 0")]
    ZeroAmount,

    #[error("output must have {expected} items, got {got}")]
    BadOutputArity { expected: usize, got: usize },

    #[error("output type {0} is reserved for fee-claim outputs")]
    ReservedOutputType(u64),
}

impl From<alloy_rlp::Error> for CodecError {
    fn from(e: alloy_rlp::Error) -> Self {
        CodecError::MalformedEncoding(e.to_string())
    }
}

/// Errors raised when building or decomposing a UTXO position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("tx index {0} out of range (max 99999)")]
    TxIndexOutOfRange(u32),

    #[error("output index {0} out of range (max 9999)")]
    OutputIndexOutOfRange(u16),

    #[error("block number {0} overflows the position encoding")]
    BlockNumOverflow(u64),

    #[error("input reference does not encode a utxo position")]
    NotAPosition,
}

/// Errors raised by off-chain Merkle tree tooling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    #[error("length of merkle proof must be a multiple of 32, got {0}")]
    InvalidProofLength(usize),

    #[error("{leaves} leaves do not fit in a tree of depth {depth}")]
    TooManyLeaves { leaves: usize, depth: usize },

    #[error("leaf index {index} out of range for depth {depth}")]
    IndexOutOfRange { index: u64, depth: usize },

    #[error("unsupported tree depth: {0}")]
    UnsupportedDepth(usize),
}
