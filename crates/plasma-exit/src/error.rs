//! Error types for the standard exit game.

use plasma_exit_core::{CodecError, ExitId, OutputId};
use plasma_exit_store::StoreError;
use thiserror::Error;

/// Errors that can occur during exit game operations.
///
/// Every failure aborts the whole operation: no record is written and no
/// funds move.
#[derive(Debug, Error)]
pub enum ExitGameError {
    /// The exited transaction does not decode.
    #[error("malformed transaction: {0}")]
    MalformedTransaction(#[from] CodecError),

    #[error("transaction inclusion proof failed")]
    TxNotIncluded,

    #[error("output index {index} out of range ({outputs} outputs)")]
    OutputIndexOutOfRange { index: u16, outputs: usize },

    #[error("output {0} is not a payment output")]
    NotPaymentOutput(u16),

    #[error("should not exit with amount 0")]
    InvalidOutputAmount,

    #[error("output type 0 takes no output guard pre-image")]
    UnexpectedGuardPreimage,

    #[error("no output guard parser registered for output type {0}")]
    NoGuardParser(u64),

    #[error("output guard data does not match pre-image")]
    GuardPreimageMismatch,

    #[error("output guard parser failed: {0}")]
    GuardParserFailed(anyhow::Error),

    #[error("only exit target can start an exit")]
    NotExitTarget,

    #[error("input value mismatches with the exit bond")]
    BondMismatch,

    #[error("exit already started: {0}")]
    ExitAlreadyStarted(ExitId),

    /// The output was already withdrawn by an earlier exit.
    #[error("output already spent: {0:?}")]
    OutputAlreadySpent(OutputId),

    #[error("only the exit queue can process exits")]
    NotExitQueue,

    #[error("exit is not due until {exitable_at} (now {now})")]
    ExitNotDue { exitable_at: u64, now: u64 },

    #[error("exit not found or not exitable: {0}")]
    ExitNotFound(ExitId),

    #[error("output related data does not match the exit")]
    ChallengeDataMismatch,

    #[error("spending condition not registered for output type {output_type} and tx type {tx_type}")]
    NoSpendingCondition { output_type: u64, tx_type: u64 },

    #[error("spending condition failed")]
    SpendingConditionFailed,

    /// The spending condition aborted. Its message is surfaced as-is.
    #[error("{0}")]
    SpendingConditionAborted(anyhow::Error),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("priority queue error: {0}")]
    Queue(anyhow::Error),

    #[error("treasury error: {0}")]
    Treasury(anyhow::Error),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Broad failure categories, for callers that only need to know who to blame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or out-of-range input, caught before any state is read.
    InputValidation,
    /// A proof or commitment did not verify.
    ProofOrCommitment,
    /// Wrong caller or wrong bond.
    Authorization,
    /// A verifier is missing or misregistered.
    Registry,
    /// The request conflicts with the exit's current state.
    GameLogic,
    /// A storage backend or external collaborator failed.
    Infrastructure,
}

impl ExitGameError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        use ExitGameError::*;
        match self {
            MalformedTransaction(_)
            | OutputIndexOutOfRange { .. }
            | NotPaymentOutput(_)
            | InvalidOutputAmount
            | UnexpectedGuardPreimage => ErrorKind::InputValidation,
            TxNotIncluded | GuardPreimageMismatch | GuardParserFailed(_) | ChallengeDataMismatch => {
                ErrorKind::ProofOrCommitment
            }
            NotExitTarget | BondMismatch | NotExitQueue => ErrorKind::Authorization,
            NoGuardParser(_) | NoSpendingCondition { .. } | Registry(_) => ErrorKind::Registry,
            ExitAlreadyStarted(_)
            | OutputAlreadySpent(_)
            | ExitNotDue { .. }
            | ExitNotFound(_)
            | SpendingConditionFailed
            | SpendingConditionAborted(_) => ErrorKind::GameLogic,
            Store(_) | Queue(_) | Treasury(_) | Config(_) => ErrorKind::Infrastructure,
        }
    }
}

/// Errors raised while registering a verifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("should not register with tx type 0")]
    ZeroTxType,

    #[error("should not register with output type 0")]
    ZeroOutputType,

    #[error("spending condition already registered for output type {output_type} and tx type {tx_type}")]
    ConditionAlreadyRegistered { output_type: u64, tx_type: u64 },

    #[error("output guard parser already registered for output type {0}")]
    ParserAlreadyRegistered(u64),
}

/// Errors raised by configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("standard exit bond must not be 0")]
    ZeroBond,

    #[error("child block interval must not be 0")]
    ZeroChildBlockInterval,

    #[error("min exit period must not be 0")]
    ZeroMinExitPeriod,

    #[error("merkle tree depth {0} out of range (1..=64)")]
    UnsupportedTreeDepth(usize),

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for exit game operations.
pub type Result<T> = std::result::Result<T, ExitGameError>;
