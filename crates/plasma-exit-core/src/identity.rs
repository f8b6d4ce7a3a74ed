//! Output and exit identity.
//!
//! Identifiers are keccak commitments over the encoded transaction bytes.
//! Deposit transactions can be byte-identical (same owner, token, amount), so
//! every deposit-side identifier folds in the UTXO position.

use alloy_primitives::{Address, B256, U256};

use crate::crypto::Packed;
use crate::types::{ExitId, OutputId, UtxoPos};

/// Right shift applied to the transaction hash in an exit id.
const EXIT_ID_HASH_SHIFT: usize = 105;

/// Bit position of the output index in an exit id.
const EXIT_ID_OUTPUT_INDEX_SHIFT: usize = 152;

/// Whether `block_num` is a deposit block.
///
/// Operator blocks are multiples of the child block interval; deposits take
/// the numbers in between. A zero interval is rejected by configuration
/// validation and treated here as "every block is an operator block".
pub fn is_deposit(block_num: u64, child_block_interval: u64) -> bool {
    block_num.checked_rem(child_block_interval).is_some_and(|r| r != 0)
}

/// Identifier of output `output_index` of the transaction `tx_bytes`.
pub fn output_id(tx_bytes: &[u8], output_index: u16, utxo_pos: UtxoPos, is_deposit: bool) -> OutputId {
    let packed = Packed::with_capacity(tx_bytes.len() + 64)
        .bytes(tx_bytes)
        .uint(u128::from(output_index));
    let packed = if is_deposit {
        packed.uint(utxo_pos.value())
    } else {
        packed
    };
    OutputId(packed.keccak())
}

/// Standard exit identifier for the output at `utxo_pos`.
///
/// The top bits of the transaction commitment are kept and the output index is
/// placed above them, so exits on different outputs of one transaction never
/// collide and deposit exits never alias chain exits.
pub fn exit_id(is_deposit: bool, tx_bytes: &[u8], utxo_pos: UtxoPos) -> ExitId {
    let packed = Packed::with_capacity(tx_bytes.len() + 32).bytes(tx_bytes);
    let hash = if is_deposit {
        packed.uint(utxo_pos.value()).keccak()
    } else {
        packed.keccak()
    };
    let value = (U256::from_be_bytes(hash.0) >> EXIT_ID_HASH_SHIFT)
        | (U256::from(utxo_pos.output_index()) << EXIT_ID_OUTPUT_INDEX_SHIFT);
    // At most 151 hash bits plus a 14-bit output index.
    ExitId::from_u256(value).unwrap_or_default()
}

/// Guard committed in an output of a non-zero `output_type` for `preimage`.
///
/// Output type 0 does not use this: its guard is the owner address itself,
/// see [`crate::crypto::address_to_output_guard`].
pub fn output_guard(output_type: u64, preimage: &[u8]) -> B256 {
    Packed::with_capacity(32 + preimage.len())
        .uint(u128::from(output_type))
        .bytes(preimage)
        .keccak()
}

/// Commitment stored in an exit record in place of the full output.
pub fn output_related_data_hash(
    utxo_pos: UtxoPos,
    output_id: &OutputId,
    output_type: u64,
    output_guard: &B256,
) -> B256 {
    Packed::with_capacity(128)
        .uint(utxo_pos.value())
        .b256(output_id.as_b256())
        .uint(u128::from(output_type))
        .b256(output_guard)
        .keccak()
}

/// Uniqueness key of an exit in the priority queue.
pub fn queue_key(utxo_pos: UtxoPos, token: &Address) -> B256 {
    Packed::with_capacity(52)
        .uint(utxo_pos.value())
        .address(token)
        .keccak()
}
