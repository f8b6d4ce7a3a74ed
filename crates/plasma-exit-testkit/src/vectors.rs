//! Golden test vectors for deterministic verification.
//!
//! These pin the canonical encoding and every keccak identity of a few known
//! transactions, so that ids computed here match the block-submission
//! pipeline's byte for byte.

use alloy_primitives::{address, keccak256};
use plasma_exit_core::{
    exit_id, output_id, tx_type, Address, FeeClaimOutput, PaymentOutput, Transaction,
    TransactionBuilder, UtxoPos, U256,
};

/// Owner of every vector output.
pub const ALICE: Address = address!("00000000000000000000000000000000000a11ce");

/// Recipient in the payment vector.
pub const BOB: Address = address!("0000000000000000000000000000000000000b0b");

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Builds the transaction.
    pub build: fn() -> Transaction,
    /// Position of the output the ids are computed for.
    pub position: (u64, u32, u16),
    /// Whether the position is in a deposit block.
    pub deposit: bool,
    /// Expected canonical encoding (hex).
    pub expected_encoding: &'static str,
    /// Expected keccak of the encoding (hex).
    pub expected_tx_hash: &'static str,
    /// Expected output id (hex).
    pub expected_output_id: &'static str,
    /// Expected exit id (`0x`-prefixed minimal hex), or empty if not exitable.
    pub expected_exit_id: &'static str,
}

fn deposit() -> Transaction {
    Transaction::deposit(ALICE, Address::ZERO, U256::from(1000u64)).expect("valid deposit")
}

fn payment() -> Transaction {
    TransactionBuilder::new(tx_type::PAYMENT)
        .spend(UtxoPos::new(1, 0, 0).expect("valid position"))
        .output(PaymentOutput::owned_by(BOB, Address::ZERO, U256::from(600u64)))
        .output(PaymentOutput::owned_by(ALICE, Address::ZERO, U256::from(400u64)))
        .build()
        .expect("valid payment")
}

fn fee() -> Transaction {
    TransactionBuilder::new(tx_type::FEE)
        .output(FeeClaimOutput { block_num: 1000 })
        .build()
        .expect("valid fee transaction")
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "ETH deposit of 1000 to alice",
            build: deposit,
            position: (1, 0, 0),
            deposit: true,
            expected_encoding: "f86101c0f83cf83a01a000000000000000000000000000000000000000000000000000000000000a11ce9400000000000000000000000000000000000000008203e8a00000000000000000000000000000000000000000000000000000000000000000",
            expected_tx_hash: "6346d975324836db560a1f157a68a855f52442353686d2f7dc8d2bda33fc60a8",
            expected_output_id: "fdaf63e68fa79ae154a9ef5f059d1a02d5a6e0fea13ef89f5fac02ad46c7ceac",
            expected_exit_id: "0x6b1241feddbd61efce4e9a217a2cd902379235",
        },
        GoldenVector {
            name: "Payment spending the deposit, change output",
            build: payment,
            position: (1000, 0, 1),
            deposit: false,
            expected_encoding: "f8be01e1a0000000000000000000000000000000000000000000000000000000003b9aca00f878f83a01a00000000000000000000000000000000000000000000000000000000000000b0b940000000000000000000000000000000000000000820258f83a01a000000000000000000000000000000000000000000000000000000000000a11ce940000000000000000000000000000000000000000820190a00000000000000000000000000000000000000000000000000000000000000000",
            expected_tx_hash: "1c902333a1a3b863e1a018e4b4532bc3c397dcf1b5ec56be115948ad17709a95",
            expected_output_id: "6c3b20ea5bd3c0277aa6fcb3ef3d871c6b5b91591b6e92855c94a0e34c4cf808",
            expected_exit_id: "0x10e481199d0d1dc31f0d00c725a2995e1e1cbee",
        },
        GoldenVector {
            name: "Fee transaction claiming block 1000",
            build: fee,
            position: (2000, 0, 0),
            deposit: false,
            expected_encoding: "e903c0c5c4028203e8a00000000000000000000000000000000000000000000000000000000000000000",
            expected_tx_hash: "15fab40a0c9d8f84892e46904677a71f2daa4c2872e5e0a593217cbd2f04b33c",
            expected_output_id: "",
            expected_exit_id: "",
        },
    ]
}

/// Result of checking one vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorReport {
    pub name: String,
    pub matches: bool,
    /// What was computed, as `(field, hex)` pairs.
    pub computed: Vec<(&'static str, String)>,
}

/// Compute every field of a vector and compare against the expectations.
///
/// Empty expectations are not checked.
pub fn check_vector(vector: &GoldenVector) -> VectorReport {
    let (block, tx_index, output_index) = vector.position;
    let tx = (vector.build)();
    let bytes = tx.encode();
    let pos = UtxoPos::new(block, tx_index, output_index).expect("valid position");

    let computed = vec![
        ("encoding", hex::encode(&bytes)),
        ("tx_hash", hex::encode(keccak256(&bytes))),
        (
            "output_id",
            output_id(&bytes, output_index, pos, vector.deposit).to_hex(),
        ),
        ("exit_id", exit_id(vector.deposit, &bytes, pos).to_hex()),
    ];
    let expected = [
        vector.expected_encoding,
        vector.expected_tx_hash,
        vector.expected_output_id,
        vector.expected_exit_id,
    ];
    let matches = computed
        .iter()
        .zip(expected)
        .all(|((_, got), want)| want.is_empty() || *got == want);

    VectorReport {
        name: vector.name.to_string(),
        matches,
        computed,
    }
}

/// Verify all golden vectors.
pub fn verify_all_vectors() -> Vec<VectorReport> {
    all_vectors().iter().map(check_vector).collect()
}

/// Merkle vector: the zero leaf, `keccak256(0x00 * 32)`.
pub const ZERO_LEAF: &str = "290decd9548b62a8d60345a988386fc84ba6bc95484008f6362f93160ef3e563";

/// Merkle vector: root of an empty depth-16 tree.
pub const EMPTY_ROOT_16: &str = "776a31db34a1a0a7caaf862cffdfff1789297ffadc380bd3d39281d340abd3ad";

/// Merkle vector: root of a depth-16 block holding only the deposit vector.
pub const DEPOSIT_BLOCK_ROOT_16: &str =
    "c640ee4fcb9e5a97012bdde84c2cab6809d67af5b45e37e0b8bd64a3cd0bdc3c";

#[cfg(test)]
mod tests {
    use super::*;
    use plasma_exit_core::{MerkleTree, DEFAULT_TREE_DEPTH};

    #[test]
    fn test_all_vectors_match() {
        for report in verify_all_vectors() {
            assert!(report.matches, "vector '{}' mismatched: {:?}", report.name, report.computed);
        }
    }

    #[test]
    fn test_vectors_decode_to_themselves() {
        for vector in all_vectors() {
            let tx = (vector.build)();
            let bytes = hex::decode(vector.expected_encoding).unwrap();
            assert_eq!(Transaction::decode(&bytes).unwrap(), tx, "{}", vector.name);
        }
    }

    #[test]
    fn test_merkle_vectors() {
        let empty = MerkleTree::new::<Vec<u8>>(&[], DEFAULT_TREE_DEPTH).unwrap();
        assert_eq!(hex::encode(empty.root()), EMPTY_ROOT_16);
        assert_eq!(hex::encode(plasma_exit_core::crypto::zero_leaf_hash()), ZERO_LEAF);

        let block = MerkleTree::new(&[deposit().encode()], DEFAULT_TREE_DEPTH).unwrap();
        assert_eq!(hex::encode(block.root()), DEPOSIT_BLOCK_ROOT_16);
    }

    #[test]
    fn test_tampered_vector_is_reported() {
        let mut vector = all_vectors().remove(0);
        vector.expected_tx_hash = "00";
        assert!(!check_vector(&vector).matches);
    }
}
