//! # Plasma Exit Store
//!
//! Storage abstraction for standard exit records. Provides a trait-based
//! interface with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The exit game owns a map from exit id to [`StandardExit`] record. This
//! crate abstracts that map behind the [`ExitStore`] trait so the game is
//! storage-agnostic. The primary implementation is [`SqliteStore`], with
//! [`MemoryStore`] for testing.
//!
//! ## Key Types
//!
//! - [`ExitStore`] - The trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`InsertResult`] - Result of inserting an exit record
//!
//! ## Usage
//!
//! ```rust
//! use plasma_exit_store::{ExitStore, InsertResult, SqliteStore};
//! use plasma_exit_core::{ExitId, StandardExit, U256};
//!
//! let store = SqliteStore::open_memory().unwrap();
//! let id = ExitId::from_u256(U256::from(1u8)).unwrap();
//! let exit = StandardExit { exitable: true, ..Default::default() };
//!
//! assert_eq!(store.insert(&id, &exit).unwrap(), InsertResult::Inserted);
//! assert_eq!(store.insert(&id, &exit).unwrap(), InsertResult::AlreadyExitable);
//! ```
//!
//! [`StandardExit`]: plasma_exit_core::StandardExit

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{ExitStore, InsertResult};
