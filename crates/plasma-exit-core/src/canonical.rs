//! Canonical RLP encoding of transactions and outputs.
//!
//! Wire layout:
//! - Transaction: `[txType, [input...], [output...], metaData]`, exactly 4 items
//! - Payment output: `[outputType, outputGuard, token, amount]`
//! - Fee-claim output: `[outputType, blockNum]`, selected by its leading type
//!
//! Integers are minimal big-endian. Decoding rejects leading zeros, oversized
//! integers, wrong fixed widths, and trailing bytes, so every accepted byte
//! string re-encodes to itself.

use alloy_primitives::{Address, B256, U256};
use alloy_rlp::{Encodable, Header};

use crate::error::CodecError;
use crate::transaction::{FeeClaimOutput, Output, PaymentOutput, Transaction};
use crate::types::output_type;

const TX_ITEMS: usize = 4;
const PAYMENT_OUTPUT_ITEMS: usize = 4;
const FEE_CLAIM_OUTPUT_ITEMS: usize = 2;

/// Encode a transaction to its canonical bytes.
pub fn encode_transaction(tx: &Transaction) -> Vec<u8> {
    let mut out = Vec::new();
    list_to(&mut out, |payload| {
        tx.tx_type.encode(payload);
        list_to(payload, |inputs| {
            for input in &tx.inputs {
                input.as_slice().encode(inputs);
            }
        });
        list_to(payload, |outputs| {
            for output in &tx.outputs {
                output_to(outputs, output);
            }
        });
        tx.meta_data.as_slice().encode(payload);
    });
    out
}

/// Encode a single output to its canonical bytes.
pub fn encode_output(output: &Output) -> Vec<u8> {
    let mut out = Vec::new();
    output_to(&mut out, output);
    out
}

/// Decode and validate a transaction.
pub fn decode_transaction(bytes: &[u8]) -> Result<Transaction, CodecError> {
    let fields = expect_list(single_item(bytes)?, "transaction")?;
    let [tx_type, inputs, outputs, meta_data]: [Item<'_>; TX_ITEMS] =
        fields.try_into().map_err(|fields: Vec<Item<'_>>| {
            CodecError::MalformedEncoding(format!(
                "transaction must have {} items, got {}",
                TX_ITEMS,
                fields.len()
            ))
        })?;

    let tx_type = decode_u64(tx_type, "txType")?;
    let inputs = expect_list(inputs, "inputs")?
        .into_iter()
        .map(|item| decode_fixed::<32>(item, "input").map(B256::from))
        .collect::<Result<Vec<_>, _>>()?;
    let outputs = expect_list(outputs, "outputs")?
        .into_iter()
        .map(output_from_item)
        .collect::<Result<Vec<_>, _>>()?;
    let meta_data = B256::from(decode_fixed::<32>(meta_data, "metaData")?);

    let tx = Transaction {
        tx_type,
        inputs,
        outputs,
        meta_data,
    };
    tx.validate()?;
    Ok(tx)
}

/// Decode and validate a single output.
pub fn decode_output(bytes: &[u8]) -> Result<Output, CodecError> {
    output_from_item(single_item(bytes)?)
}

/// Write an RLP list whose payload is produced by `f`.
fn list_to(out: &mut Vec<u8>, f: impl FnOnce(&mut Vec<u8>)) {
    let mut payload = Vec::new();
    f(&mut payload);
    Header {
        list: true,
        payload_length: payload.len(),
    }
    .encode(out);
    out.extend_from_slice(&payload);
}

fn output_to(out: &mut Vec<u8>, output: &Output) {
    list_to(out, |payload| match output {
        Output::Payment(o) => {
            o.output_type.encode(payload);
            o.output_guard.as_slice().encode(payload);
            o.token.as_slice().encode(payload);
            o.amount.encode(payload);
        }
        Output::FeeClaim(o) => {
            output_type::FEE_CLAIM.encode(payload);
            o.block_num.encode(payload);
        }
    });
}

/// One decoded RLP item: its kind and its payload.
#[derive(Clone, Copy)]
struct Item<'a> {
    list: bool,
    payload: &'a [u8],
}

/// Split the next item off the front of `buf`.
fn take_item<'a>(buf: &mut &'a [u8]) -> Result<Item<'a>, CodecError> {
    let header = Header::decode(buf)?;
    let data: &'a [u8] = *buf;
    if data.len() < header.payload_length {
        return Err(alloy_rlp::Error::InputTooShort.into());
    }
    let (payload, rest) = data.split_at(header.payload_length);
    *buf = rest;
    Ok(Item {
        list: header.list,
        payload,
    })
}

/// Decode exactly one item spanning all of `bytes`.
fn single_item(bytes: &[u8]) -> Result<Item<'_>, CodecError> {
    let mut buf = bytes;
    let item = take_item(&mut buf)?;
    if !buf.is_empty() {
        return Err(CodecError::MalformedEncoding(format!(
            "{} trailing bytes",
            buf.len()
        )));
    }
    Ok(item)
}

fn expect_list<'a>(item: Item<'a>, what: &str) -> Result<Vec<Item<'a>>, CodecError> {
    if !item.list {
        return Err(CodecError::MalformedEncoding(format!(
            "{what}: expected list"
        )));
    }
    let mut buf = item.payload;
    let mut items = Vec::new();
    while !buf.is_empty() {
        items.push(take_item(&mut buf)?);
    }
    Ok(items)
}

fn expect_string<'a>(item: Item<'a>, what: &str) -> Result<&'a [u8], CodecError> {
    if item.list {
        return Err(CodecError::MalformedEncoding(format!(
            "{what}: expected string"
        )));
    }
    Ok(item.payload)
}

fn minimal_integer<'a>(item: Item<'a>, what: &str, max_len: usize) -> Result<&'a [u8], CodecError> {
    let bytes = expect_string(item, what)?;
    if bytes.first() == Some(&0) {
        return Err(CodecError::MalformedEncoding(format!(
            "{what}: leading zero"
        )));
    }
    if bytes.len() > max_len {
        return Err(CodecError::MalformedEncoding(format!(
            "{what}: integer overflow"
        )));
    }
    Ok(bytes)
}

fn decode_u64(item: Item<'_>, what: &str) -> Result<u64, CodecError> {
    let bytes = minimal_integer(item, what, 8)?;
    Ok(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

fn decode_u256(item: Item<'_>, what: &str) -> Result<U256, CodecError> {
    let bytes = minimal_integer(item, what, 32)?;
    U256::try_from_be_slice(bytes)
        .ok_or_else(|| CodecError::MalformedEncoding(format!("{what}: integer overflow")))
}

fn decode_fixed<const N: usize>(item: Item<'_>, what: &str) -> Result<[u8; N], CodecError> {
    let bytes = expect_string(item, what)?;
    bytes.try_into().map_err(|_| {
        CodecError::MalformedEncoding(format!(
            "{what}: expected {} bytes, got {}",
            N,
            bytes.len()
        ))
    })
}

fn output_from_item(item: Item<'_>) -> Result<Output, CodecError> {
    let fields = expect_list(item, "output")?;
    let Some(first) = fields.first() else {
        return Err(CodecError::BadOutputArity {
            expected: PAYMENT_OUTPUT_ITEMS,
            got: 0,
        });
    };
    let ty = decode_u64(*first, "outputType")?;

    let output = if ty == output_type::FEE_CLAIM {
        if fields.len() != FEE_CLAIM_OUTPUT_ITEMS {
            return Err(CodecError::BadOutputArity {
                expected: FEE_CLAIM_OUTPUT_ITEMS,
                got: fields.len(),
            });
        }
        Output::FeeClaim(FeeClaimOutput {
            block_num: decode_u64(fields[1], "blockNum")?,
        })
    } else {
        if fields.len() != PAYMENT_OUTPUT_ITEMS {
            return Err(CodecError::BadOutputArity {
                expected: PAYMENT_OUTPUT_ITEMS,
                got: fields.len(),
            });
        }
        Output::Payment(PaymentOutput {
            output_type: ty,
            output_guard: B256::from(decode_fixed::<32>(fields[1], "outputGuard")?),
            token: Address::from(decode_fixed::<20>(fields[2], "token")?),
            amount: decode_u256(fields[3], "amount")?,
        })
    };
    output.validate()?;
    Ok(output)
}
