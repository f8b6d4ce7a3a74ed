//! Hashing primitives shared by every commitment in the exit protocol.
//!
//! All commitments are keccak-256 over a "packed" concatenation of fields,
//! the same layout the base chain uses, so that ids computed here match the
//! ones computed by the block-submission pipeline bit for bit.

use alloy_primitives::{keccak256, Address, B256, U256};

/// Builder for packed hash preimages.
///
/// Integers are written as 32-byte big-endian words, 32-byte values and byte
/// strings verbatim, and addresses as their 20 raw bytes.
#[derive(Debug, Clone, Default)]
pub struct Packed {
    buf: Vec<u8>,
}

impl Packed {
    /// Start an empty preimage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an empty preimage with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Append raw bytes.
    pub fn bytes(mut self, data: &[u8]) -> Self {
        self.buf.extend_from_slice(data);
        self
    }

    /// Append a 256-bit word.
    pub fn word(mut self, value: U256) -> Self {
        self.buf.extend_from_slice(&value.to_be_bytes::<32>());
        self
    }

    /// Append an unsigned integer widened to a 256-bit word.
    pub fn uint(self, value: u128) -> Self {
        self.word(U256::from(value))
    }

    /// Append a 32-byte value.
    pub fn b256(mut self, value: &B256) -> Self {
        self.buf.extend_from_slice(value.as_slice());
        self
    }

    /// Append a 20-byte address.
    pub fn address(mut self, value: &Address) -> Self {
        self.buf.extend_from_slice(value.as_slice());
        self
    }

    /// Hash the accumulated preimage.
    pub fn keccak(&self) -> B256 {
        keccak256(&self.buf)
    }

    /// Get the accumulated preimage.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// keccak-256 of 32 zero bytes, the value of an empty Merkle leaf.
pub fn zero_leaf_hash() -> B256 {
    keccak256(B256::ZERO)
}

/// Left-pad an address into an output guard.
pub fn address_to_output_guard(owner: &Address) -> B256 {
    owner.into_word()
}

/// Interpret an output guard as a padded address (its low 20 bytes).
pub fn output_guard_to_address(guard: &B256) -> Address {
    Address::from_word(*guard)
}
