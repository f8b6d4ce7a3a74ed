//! Strong type definitions for the plasma exit core.
//!
//! Positions and identifiers are newtypes so they cannot be swapped for one
//! another at call sites.

use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PositionError;

/// Transaction type constants.
pub mod tx_type {
    pub const PAYMENT: u64 = 1;
    pub const PAYMENT_V2: u64 = 2;
    pub const FEE: u64 = 3;
}

/// Output type constants.
pub mod output_type {
    /// Output guard holds the owner address directly.
    pub const RAW_OWNER: u64 = 0;
    pub const PAYMENT: u64 = 1;
    pub const FEE_CLAIM: u64 = 2;
}

/// Maximum number of inputs in a transaction.
pub const MAX_INPUTS: usize = 4;

/// Maximum number of outputs in a transaction.
pub const MAX_OUTPUTS: usize = 4;

/// Position multiplier for the block number.
pub const BLOCK_OFFSET: u128 = 1_000_000_000;

/// Position multiplier for the transaction index.
pub const TX_OFFSET: u128 = 10_000;

const MAX_TX_INDEX: u32 = (BLOCK_OFFSET / TX_OFFSET) as u32 - 1;
const MAX_OUTPUT_INDEX: u16 = TX_OFFSET as u16 - 1;

/// A UTXO position: `(blockNum, txIndex, outputIndex)` packed into one
/// totally ordered integer.
///
/// The packing is `blockNum * 10^9 + txIndex * 10^4 + outputIndex` and always
/// decomposes back into the same triple.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct UtxoPos(u128);

impl UtxoPos {
    /// Pack a position.
    pub fn new(block_num: u64, tx_index: u32, output_index: u16) -> Result<Self, PositionError> {
        if tx_index > MAX_TX_INDEX {
            return Err(PositionError::TxIndexOutOfRange(tx_index));
        }
        if output_index > MAX_OUTPUT_INDEX {
            return Err(PositionError::OutputIndexOutOfRange(output_index));
        }
        let value = (block_num as u128)
            .checked_mul(BLOCK_OFFSET)
            .and_then(|v| v.checked_add(tx_index as u128 * TX_OFFSET + output_index as u128))
            .ok_or(PositionError::BlockNumOverflow(block_num))?;
        Ok(Self(value))
    }

    /// Wrap a raw packed value.
    pub fn from_raw(value: u128) -> Result<Self, PositionError> {
        let block_num = value / BLOCK_OFFSET;
        if block_num > u64::MAX as u128 {
            return Err(PositionError::NotAPosition);
        }
        Ok(Self(value))
    }

    /// The raw packed value.
    pub const fn value(&self) -> u128 {
        self.0
    }

    /// The packed value as a 256-bit word.
    pub fn to_u256(&self) -> U256 {
        U256::from(self.0)
    }

    /// The block the output was created in.
    pub const fn block_num(&self) -> u64 {
        (self.0 / BLOCK_OFFSET) as u64
    }

    /// The index of the transaction within its block.
    pub const fn tx_index(&self) -> u32 {
        ((self.0 % BLOCK_OFFSET) / TX_OFFSET) as u32
    }

    /// The index of the output within its transaction.
    pub const fn output_index(&self) -> u16 {
        (self.0 % TX_OFFSET) as u16
    }

    /// The transaction position, i.e. the position without its output index.
    pub const fn tx_pos(&self) -> u128 {
        self.0 / TX_OFFSET
    }
}

impl fmt::Debug for UtxoPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UtxoPos({}:{}:{})",
            self.block_num(),
            self.tx_index(),
            self.output_index()
        )
    }
}

impl fmt::Display for UtxoPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<B256> for UtxoPos {
    type Error = PositionError;

    /// Read an input reference as a position.
    fn try_from(word: B256) -> Result<Self, Self::Error> {
        let value = u128::try_from(U256::from_be_bytes(word.0))
            .map_err(|_| PositionError::NotAPosition)?;
        Self::from_raw(value)
    }
}

impl From<UtxoPos> for B256 {
    fn from(pos: UtxoPos) -> Self {
        B256::from(pos.to_u256())
    }
}

/// A 32-byte output identifier.
///
/// Unique per output: deposit ids fold in the position, chain ids rely on the
/// transaction spending distinct prior outputs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct OutputId(pub B256);

impl OutputId {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(B256::new(bytes))
    }

    /// Get the raw bytes.
    pub fn as_b256(&self) -> &B256 {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutputId({})", &self.to_hex()[..16])
    }
}

impl From<B256> for OutputId {
    fn from(hash: B256) -> Self {
        Self(hash)
    }
}

/// A standard exit identifier.
///
/// Always fits in 192 bits: the high bits of a transaction hash, with the
/// output index placed above bit 152.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct ExitId(U256);

impl ExitId {
    /// Bit width every exit id fits in.
    pub const BITS: usize = 192;

    /// Wrap a raw value, rejecting anything wider than 192 bits.
    pub fn from_u256(value: U256) -> Option<Self> {
        (value.bit_len() <= Self::BITS).then_some(Self(value))
    }

    /// The raw value.
    pub const fn as_u256(&self) -> &U256 {
        &self.0
    }

    /// Big-endian 32-byte form, used as a storage key.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        self.0.to_be_bytes::<32>()
    }

    /// Read back the 32-byte storage key form.
    pub fn from_be_bytes(bytes: [u8; 32]) -> Option<Self> {
        Self::from_u256(U256::from_be_bytes(bytes))
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        format!("{:#x}", self.0)
    }
}

impl fmt::Debug for ExitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExitId({})", self.to_hex())
    }
}

impl fmt::Display for ExitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utxo_pos_decomposes_losslessly() {
        let pos = UtxoPos::new(1001, 3, 2).unwrap();
        assert_eq!(pos.value(), 1_001_000_030_002);
        assert_eq!(pos.block_num(), 1001);
        assert_eq!(pos.tx_index(), 3);
        assert_eq!(pos.output_index(), 2);
        assert_eq!(pos.tx_pos(), 100_100_003);
    }

    #[test]
    fn test_utxo_pos_total_order() {
        let a = UtxoPos::new(1000, 99_999, 9_999).unwrap();
        let b = UtxoPos::new(1001, 0, 0).unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_utxo_pos_rejects_out_of_range_indices() {
        assert_eq!(
            UtxoPos::new(1, 100_000, 0),
            Err(PositionError::TxIndexOutOfRange(100_000))
        );
        assert_eq!(
            UtxoPos::new(1, 0, 10_000),
            Err(PositionError::OutputIndexOutOfRange(10_000))
        );
    }

    #[test]
    fn test_utxo_pos_word_roundtrip() {
        let pos = UtxoPos::new(u64::MAX, 99_999, 9_999).unwrap();
        let word = B256::from(pos);
        assert_eq!(UtxoPos::try_from(word).unwrap(), pos);
    }

    #[test]
    fn test_oversized_word_is_not_a_position() {
        assert_eq!(
            UtxoPos::try_from(B256::repeat_byte(0xff)),
            Err(PositionError::NotAPosition)
        );
    }

    #[test]
    fn test_exit_id_width() {
        assert!(ExitId::from_u256(U256::MAX).is_none());
        let max = (U256::from(1u8) << 192) - U256::from(1u8);
        let id = ExitId::from_u256(max).unwrap();
        assert_eq!(ExitId::from_be_bytes(id.to_be_bytes()), Some(id));
    }
}
