//! # Plasma Exit Testkit
//!
//! Testing utilities for the plasma exit game.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known transactions with their expected encodings and ids
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: An in-memory framework, scripted verifiers, and a ready game
//!
//! ## Golden Vectors
//!
//! ```rust
//! use plasma_exit_testkit::vectors::verify_all_vectors;
//!
//! for report in verify_all_vectors() {
//!     assert!(report.matches, "{}", report.name);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use plasma_exit_testkit::{exit_from_params, ExitParams, TestFixture};
//!
//! proptest! {
//!     #[test]
//!     fn owner_can_exit(params: ExitParams) {
//!         let mut fixture = TestFixture::new();
//!         let args = exit_from_params(&fixture, &params);
//!         let ctx = fixture.ctx(params.owner);
//!         prop_assert!(fixture.game.start_standard_exit(&ctx, &args).is_ok());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use plasma_exit_testkit::TestFixture;
//! use plasma_exit_core::Address;
//!
//! let mut fixture = TestFixture::new();
//! let alice = Address::repeat_byte(0xa1);
//! let args = fixture.deposit(1, alice, 1000);
//! let ctx = fixture.ctx(alice);
//! let exit_id = fixture.game.start_standard_exit(&ctx, &args).unwrap();
//! assert!(fixture.game.exit(&exit_id).unwrap().exitable);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{
    spend, BlockRoots, MockFramework, PrefixGuardParser, RecordedSpend, RecordingQueue,
    RecordingTreasury, ScriptedCondition, ScriptedGuardParser, SpentOutputSet, TestFixture,
};
pub use generators::{exit_from_params, ExitParams};
pub use vectors::{all_vectors, check_vector, verify_all_vectors, GoldenVector, VectorReport};
