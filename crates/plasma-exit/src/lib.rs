//! # Plasma Exit
//!
//! The standard exit game of a plasma chain.
//!
//! ## Overview
//!
//! A holder of an unspent output on the plasma chain can withdraw it to the
//! base chain without the operator's cooperation:
//!
//! - **Start**: prove the output's transaction is included in a submitted
//!   block, post a bond, and queue the exit
//! - **Challenge**: anyone proving the output was spent cancels the exit and
//!   takes the bond
//! - **Finalize**: once the exit period passes unchallenged, the queue calls
//!   back and the exit target is paid
//!
//! The game keeps only a commitment to the exited output. A challenger
//! resupplies the output data and the game checks it against the commitment.
//!
//! ## Collaborators
//!
//! Block roots, the exit priority queue, the spent-output flags, and funds
//! belong to the surrounding framework and are reached through
//! [`BlockRootStore`], [`PriorityQueue`], [`SpentOutputs`], and [`Treasury`].
//! Spending conditions and output guard parsers are pluggable per output type.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use plasma_exit::{CallContext, ExitGameConfig, StandardExitGame, StartExitArgs};
//! use plasma_exit::store::SqliteStore;
//!
//! let store = SqliteStore::open("exits.db")?;
//! let mut game = StandardExitGame::new(ExitGameConfig::default(), store, framework)?;
//!
//! let ctx = CallContext::new(owner, now).with_value(game.config().standard_exit_bond);
//! let exit_id = game.start_standard_exit(&ctx, &args)?;
//! for event in game.drain_events() {
//!     println!("{}", event.name());
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `plasma_exit::core` - Transactions, proofs, and identities
//! - `plasma_exit::store` - Exit record storage

pub mod config;
pub mod error;
pub mod events;
pub mod exit_game;
pub mod framework;
pub mod registry;

// Re-export component crates
pub use plasma_exit_core as core;
pub use plasma_exit_store as store;

pub use config::ExitGameConfig;
pub use error::{ConfigError, ErrorKind, ExitGameError, RegistryError, Result};
pub use events::ExitEvent;
pub use exit_game::{
    CallContext, ChallengeExitArgs, ProcessOutcome, StandardExitGame, StartExitArgs,
};
pub use framework::{
    BlockHeader, BlockRootStore, Framework, Payout, PriorityQueue, QueuedExit, SpentOutputs, Treasury,
};
pub use registry::{
    OutputGuardParser, OutputGuardParserRegistry, SpendingCondition, SpendingConditionArgs,
    SpendingConditionRegistry,
};

// Re-export commonly used core types
pub use plasma_exit_core::{
    Address, ExitId, OutputId, StandardExit, Transaction, TransactionBuilder, UtxoPos, B256, U256,
};
