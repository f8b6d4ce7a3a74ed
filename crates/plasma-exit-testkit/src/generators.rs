//! Proptest generators for property-based testing.

use proptest::prelude::*;

use plasma_exit::StartExitArgs;
use plasma_exit_core::{
    output_type, Address, FeeClaimOutput, Output, PaymentOutput, Transaction, TransactionBuilder,
    UtxoPos, B256, MAX_INPUTS, MAX_OUTPUTS, U256,
};

use crate::fixtures::TestFixture;

/// Generate a random address.
pub fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from)
}

/// Generate a random 32-byte value.
pub fn b256() -> impl Strategy<Value = B256> {
    any::<[u8; 32]>().prop_map(B256::from)
}

/// Generate a non-zero input reference.
pub fn input() -> impl Strategy<Value = B256> {
    b256().prop_filter("null input", |input| !input.is_zero())
}

/// Generate a non-zero amount, small or full-width.
pub fn amount() -> impl Strategy<Value = U256> {
    prop_oneof![
        (1u64..=u64::MAX).prop_map(U256::from),
        any::<[u8; 32]>()
            .prop_map(U256::from_be_bytes)
            .prop_filter("zero amount", |a| !a.is_zero()),
    ]
}

/// Generate a valid UTXO position.
pub fn utxo_pos() -> impl Strategy<Value = UtxoPos> {
    (0u64..=1 << 40, 0u32..100_000, 0u16..10_000)
        .prop_map(|(block, tx, out)| UtxoPos::new(block, tx, out).expect("in range"))
}

/// Generate a payment output of any non-reserved type.
pub fn payment_output() -> impl Strategy<Value = PaymentOutput> {
    (
        (1u64..=u64::MAX).prop_filter("reserved type", |t| *t != output_type::FEE_CLAIM),
        b256(),
        address(),
        amount(),
    )
        .prop_map(|(output_type, output_guard, token, amount)| PaymentOutput {
            output_type,
            output_guard,
            token,
            amount,
        })
}

/// Generate any valid output.
pub fn output() -> impl Strategy<Value = Output> {
    prop_oneof![
        4 => payment_output().prop_map(Output::Payment),
        1 => any::<u64>().prop_map(|block_num| Output::FeeClaim(FeeClaimOutput { block_num })),
    ]
}

/// Generate a valid transaction.
pub fn transaction() -> impl Strategy<Value = Transaction> {
    (
        1u64..=u64::MAX,
        prop::collection::vec(input(), 0..=MAX_INPUTS),
        prop::collection::vec(output(), 1..=MAX_OUTPUTS),
        b256(),
    )
        .prop_map(|(tx_type, inputs, outputs, meta_data)| Transaction {
            tx_type,
            inputs,
            outputs,
            meta_data,
        })
}

/// Parameters for an exitable output sitting in a submitted block.
#[derive(Debug, Clone)]
pub struct ExitParams {
    pub owner: Address,
    pub amount: u64,
    /// Whether the output sits in a deposit block.
    pub deposit: bool,
    /// Block number in units of the child block interval.
    pub block_slot: u64,
    /// Other transactions in the block before the exited one.
    pub tx_index: u32,
    pub output_index: u16,
}

impl Arbitrary for ExitParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            address().prop_filter("zero owner", |a| !a.is_zero()),
            1u64..=1_000_000_000_000u64,
            any::<bool>(),
            1u64..=10_000u64,
            0u32..8,
            0u16..MAX_OUTPUTS as u16,
        )
            .prop_map(
                |(owner, amount, deposit, block_slot, tx_index, output_index)| ExitParams {
                    owner,
                    amount,
                    deposit,
                    block_slot,
                    // Deposit blocks hold exactly one single-output transaction.
                    tx_index: if deposit { 0 } else { tx_index },
                    output_index: if deposit { 0 } else { output_index },
                },
            )
            .boxed()
    }
}

/// Submit the block described by `params` and return exit arguments for the
/// owner's output.
pub fn exit_from_params(fixture: &TestFixture, params: &ExitParams) -> StartExitArgs {
    let interval = fixture.game.config().child_block_interval;
    let mut block_num = params.block_slot * interval;
    if params.deposit {
        block_num += 1;
    }

    let tx = if params.deposit {
        Transaction::deposit(params.owner, Address::ZERO, U256::from(params.amount))
            .expect("valid deposit")
    } else {
        let filler = Address::repeat_byte(0xfe);
        let mut builder = TransactionBuilder::new(1).input(B256::with_last_byte(1));
        for index in 0..=params.output_index {
            let owner = if index == params.output_index {
                params.owner
            } else {
                filler
            };
            builder = builder.output(PaymentOutput::owned_by(
                owner,
                Address::ZERO,
                U256::from(params.amount),
            ));
        }
        builder.build().expect("valid payment")
    };

    let mut txs: Vec<Transaction> = (0..params.tx_index)
        .map(|i| {
            Transaction::deposit(
                Address::repeat_byte(0xee),
                Address::ZERO,
                U256::from(u64::from(i) + 1),
            )
            .expect("valid filler")
        })
        .collect();
    txs.push(tx.clone());

    let tree = fixture.submit_block(block_num, &txs);
    let pos = UtxoPos::new(block_num, params.tx_index, params.output_index).expect("in range");
    fixture.exit_args(&tree, &tx, pos)
}
