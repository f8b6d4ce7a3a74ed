//! Transaction: the generic plasma transaction and its outputs.
//!
//! A transaction is immutable once built. Both the builder and the decoder run
//! the same [`Transaction::validate`] check, so any `Transaction` obtained from
//! this crate satisfies the format invariants.

use alloy_primitives::{keccak256, Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::canonical;
use crate::crypto::address_to_output_guard;
use crate::error::CodecError;
use crate::types::{output_type, tx_type, UtxoPos, MAX_INPUTS, MAX_OUTPUTS};

/// A payment output: value owned by whoever the guard resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentOutput {
    /// Output type, never 0 on the wire.
    pub output_type: u64,

    /// Either a left-padded owner address or an opaque commitment that needs
    /// a registered parser.
    pub output_guard: B256,

    /// Asset identifier; the zero address denotes ETH.
    pub token: Address,

    /// Amount, never 0.
    pub amount: U256,
}

impl PaymentOutput {
    /// Create an output owned directly by `owner`.
    pub fn owned_by(owner: Address, token: Address, amount: U256) -> Self {
        Self {
            output_type: output_type::PAYMENT,
            output_guard: address_to_output_guard(&owner),
            token,
            amount,
        }
    }
}

/// A fee-claim output, produced only by fee transactions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeeClaimOutput {
    /// The block whose fees are claimed.
    pub block_num: u64,
}

/// A transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Output {
    Payment(PaymentOutput),
    FeeClaim(FeeClaimOutput),
}

impl Output {
    /// The output type carried in the first field on the wire.
    pub fn output_type(&self) -> u64 {
        match self {
            Output::Payment(o) => o.output_type,
            Output::FeeClaim(_) => output_type::FEE_CLAIM,
        }
    }

    /// Get the payment output, if this is one.
    pub fn as_payment(&self) -> Option<&PaymentOutput> {
        match self {
            Output::Payment(o) => Some(o),
            Output::FeeClaim(_) => None,
        }
    }

    /// Check the per-output invariants.
    pub fn validate(&self) -> Result<(), CodecError> {
        if let Output::Payment(o) = self {
            if o.output_type == 0 {
                return Err(CodecError::ZeroOutputType);
            }
            if o.output_type == output_type::FEE_CLAIM {
                return Err(CodecError::ReservedOutputType(o.output_type));
            }
            if o.amount.is_zero() {
                return Err(CodecError::ZeroAmount);
            }
        }
        Ok(())
    }
}

impl From<PaymentOutput> for Output {
    fn from(o: PaymentOutput) -> Self {
        Output::Payment(o)
    }
}

impl From<FeeClaimOutput> for Output {
    fn from(o: FeeClaimOutput) -> Self {
        Output::FeeClaim(o)
    }
}

/// A generic plasma transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction type, never 0.
    pub tx_type: u64,

    /// Input references (encoded UTXO positions). Empty for deposits.
    pub inputs: Vec<B256>,

    /// Outputs, 1 to 4 of them.
    pub outputs: Vec<Output>,

    /// Opaque 32-byte metadata. Always present on the wire.
    pub meta_data: B256,
}

impl Transaction {
    /// Build a deposit transaction: no inputs, a single payment output.
    pub fn deposit(owner: Address, token: Address, amount: U256) -> Result<Self, CodecError> {
        TransactionBuilder::new(tx_type::PAYMENT)
            .output(PaymentOutput::owned_by(owner, token, amount))
            .build()
    }

    /// Check the transaction-level invariants.
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.tx_type == 0 {
            return Err(CodecError::ZeroTxType);
        }
        if self.inputs.len() > MAX_INPUTS {
            return Err(CodecError::TooManyInputs(self.inputs.len()));
        }
        if let Some(slot) = self.inputs.iter().position(|input| input.is_zero()) {
            return Err(CodecError::NullInput(slot));
        }
        if self.outputs.is_empty() {
            return Err(CodecError::NoOutputs);
        }
        if self.outputs.len() > MAX_OUTPUTS {
            return Err(CodecError::TooManyOutputs(self.outputs.len()));
        }
        for output in &self.outputs {
            output.validate()?;
        }
        Ok(())
    }

    /// Canonical RLP bytes.
    pub fn encode(&self) -> Vec<u8> {
        canonical::encode_transaction(self)
    }

    /// Decode and validate canonical RLP bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        canonical::decode_transaction(bytes)
    }

    /// keccak-256 of the canonical bytes; also the Merkle leaf value.
    pub fn hash(&self) -> B256 {
        keccak256(self.encode())
    }

    /// Get an output by index.
    pub fn output(&self, index: usize) -> Option<&Output> {
        self.outputs.get(index)
    }

    /// Check whether this is a deposit-shaped transaction (no inputs).
    pub fn has_no_inputs(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// Builder for creating validated transactions.
pub struct TransactionBuilder {
    tx_type: u64,
    inputs: Vec<B256>,
    outputs: Vec<Output>,
    meta_data: B256,
}

impl TransactionBuilder {
    /// Start building a transaction of the given type.
    pub fn new(tx_type: u64) -> Self {
        Self {
            tx_type,
            inputs: Vec::new(),
            outputs: Vec::new(),
            meta_data: B256::ZERO,
        }
    }

    /// Add a raw input reference.
    pub fn input(mut self, input: B256) -> Self {
        self.inputs.push(input);
        self
    }

    /// Add an input spending the output at `pos`.
    pub fn spend(self, pos: UtxoPos) -> Self {
        self.input(pos.into())
    }

    /// Add an output.
    pub fn output(mut self, output: impl Into<Output>) -> Self {
        self.outputs.push(output.into());
        self
    }

    /// Set the metadata.
    pub fn meta_data(mut self, meta_data: B256) -> Self {
        self.meta_data = meta_data;
        self
    }

    /// Validate and build the transaction.
    pub fn build(self) -> Result<Transaction, CodecError> {
        let tx = Transaction {
            tx_type: self.tx_type,
            inputs: self.inputs,
            outputs: self.outputs,
            meta_data: self.meta_data,
        };
        tx.validate()?;
        Ok(tx)
    }
}
