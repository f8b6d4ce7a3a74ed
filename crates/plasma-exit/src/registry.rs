//! Pluggable verifiers: spending conditions and output guard parsers.
//!
//! Both registries are filled at configuration time and are append-only: an
//! entry can never be replaced once registered.

use std::collections::BTreeMap;
use std::sync::Arc;

use plasma_exit_core::{Address, B256, OutputId, UtxoPos};

use crate::error::RegistryError;

/// What a spending condition is asked to prove: that `spending_tx` spends the
/// output described by the other fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpendingConditionArgs<'a> {
    pub output_guard: B256,
    pub utxo_pos: UtxoPos,
    pub output_id: OutputId,
    pub spending_tx: &'a [u8],
    pub input_index: u16,
    pub witness: &'a [u8],
}

/// Verifies that an output of one type was spent by a transaction of one type.
pub trait SpendingCondition: Send + Sync {
    /// `Ok(true)` if spent, `Ok(false)` if not.
    ///
    /// An `Err` aborts the challenge and its message becomes the challenge's
    /// error message.
    fn verify(&self, args: &SpendingConditionArgs<'_>) -> anyhow::Result<bool>;
}

/// Turns an output guard pre-image into the identity allowed to exit.
pub trait OutputGuardParser: Send + Sync {
    fn parse_exit_target(&self, preimage: &[u8]) -> anyhow::Result<Address>;
}

/// Spending conditions keyed by `(outputType, spendingTxType)`.
#[derive(Default, Clone)]
pub struct SpendingConditionRegistry {
    conditions: BTreeMap<(u64, u64), Arc<dyn SpendingCondition>>,
}

impl SpendingConditionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a condition. Output type 0 is allowed; tx type 0 is not.
    pub fn register(
        &mut self,
        output_type: u64,
        tx_type: u64,
        condition: Arc<dyn SpendingCondition>,
    ) -> Result<(), RegistryError> {
        if tx_type == 0 {
            return Err(RegistryError::ZeroTxType);
        }
        if self.conditions.contains_key(&(output_type, tx_type)) {
            return Err(RegistryError::ConditionAlreadyRegistered {
                output_type,
                tx_type,
            });
        }
        self.conditions.insert((output_type, tx_type), condition);
        Ok(())
    }

    pub fn lookup(&self, output_type: u64, tx_type: u64) -> Option<&Arc<dyn SpendingCondition>> {
        self.conditions.get(&(output_type, tx_type))
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Output guard parsers keyed by output type.
#[derive(Default, Clone)]
pub struct OutputGuardParserRegistry {
    parsers: BTreeMap<u64, Arc<dyn OutputGuardParser>>,
}

impl OutputGuardParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parser. Output type 0 has no parser: its guard is the owner.
    pub fn register(
        &mut self,
        output_type: u64,
        parser: Arc<dyn OutputGuardParser>,
    ) -> Result<(), RegistryError> {
        if output_type == 0 {
            return Err(RegistryError::ZeroOutputType);
        }
        if self.parsers.contains_key(&output_type) {
            return Err(RegistryError::ParserAlreadyRegistered(output_type));
        }
        self.parsers.insert(output_type, parser);
        Ok(())
    }

    pub fn lookup(&self, output_type: u64) -> Option<&Arc<dyn OutputGuardParser>> {
        self.parsers.get(&output_type)
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}
