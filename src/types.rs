//! JSON-RPC wire types: blocks, transactions, receipts, logs, and traces.
//!
//! Decoded by hand from the JSON-RPC result shapes (hex-string quantities as
//! returned by eth_* methods). Chain clients construct these through the
//! decode_* functions; Serialize derives exist for structured output only.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

/// A transaction as carried inside a block fetched with full transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Transaction {
    pub hash: String,
    pub from: String,
    /// None for contract creations.
    pub to: Option<String>,
    pub nonce: u64,
    /// Hex quantity; may exceed u64 so kept as returned.
    pub value: String,
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Block {
    pub hash: String,
    pub parent_hash: String,
    pub number: u64,
    pub timestamp: u64,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Log {
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
    pub log_index: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    pub block_number: u64,
    pub block_hash: String,
    /// EIP-658 status; absent on pre-Byzantium receipts.
    pub status: Option<bool>,
    pub logs: Vec<Log>,
}

/// One entry from trace_transaction. Fields vary by node, so everything past
/// the type is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Trace {
    pub trace_type: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub value: Option<String>,
    pub input: Option<String>,
    pub trace_address: Vec<u64>,
}

pub fn decode_transaction(tx: &Value) -> Result<Transaction> {
    Ok(Transaction {
        hash: field_str(tx, "hash")?.to_string(),
        from: field_str(tx, "from")?.to_string(),
        to: opt_field_str(tx, "to"),
        nonce: parse_hex_u64(field_str(tx, "nonce")?)?,
        value: field_str(tx, "value")?.to_string(),
        input: field_str(tx, "input")?.to_string(),
    })
}

/// Decode an eth_getBlockByNumber/Hash result fetched with full transactions.
pub fn decode_block(block: &Value) -> Result<Block> {
    let transactions = block
        .get("transactions")
        .and_then(|t| t.as_array())
        .ok_or_else(|| anyhow::anyhow!("Missing transactions"))?
        .iter()
        .map(decode_transaction)
        .collect::<Result<Vec<_>>>()
        .context("decode block transactions")?;
    Ok(Block {
        hash: field_str(block, "hash")?.to_string(),
        parent_hash: field_str(block, "parentHash")?.to_string(),
        number: parse_hex_u64(field_str(block, "number")?)?,
        timestamp: parse_hex_u64(field_str(block, "timestamp")?)?,
        transactions,
    })
}

pub fn decode_log(log: &Value) -> Result<Log> {
    let topics = log
        .get("topics")
        .and_then(|t| t.as_array())
        .ok_or_else(|| anyhow::anyhow!("Missing topics"))?
        .iter()
        .map(|t| {
            t.as_str()
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("topic not string"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Log {
        address: field_str(log, "address")?.to_string(),
        topics,
        data: field_str(log, "data")?.to_string(),
        log_index: parse_hex_u64(field_str(log, "logIndex")?)?,
    })
}

pub fn decode_receipt(receipt: &Value) -> Result<TransactionReceipt> {
    let logs = receipt
        .get("logs")
        .and_then(|l| l.as_array())
        .ok_or_else(|| anyhow::anyhow!("Missing logs"))?
        .iter()
        .map(decode_log)
        .collect::<Result<Vec<_>>>()
        .context("decode receipt logs")?;
    let status = match opt_field_str(receipt, "status") {
        Some(s) => Some(parse_hex_u64(&s)? == 1),
        None => None,
    };
    Ok(TransactionReceipt {
        transaction_hash: field_str(receipt, "transactionHash")?.to_string(),
        block_number: parse_hex_u64(field_str(receipt, "blockNumber")?)?,
        block_hash: field_str(receipt, "blockHash")?.to_string(),
        status,
        logs,
    })
}

pub fn decode_trace(trace: &Value) -> Result<Trace> {
    let action = trace.get("action");
    let action_str = |key: &str| {
        action
            .and_then(|a| a.get(key))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };
    let trace_address = trace
        .get("traceAddress")
        .and_then(|t| t.as_array())
        .map(|addrs| addrs.iter().filter_map(|a| a.as_u64()).collect())
        .unwrap_or_default();
    Ok(Trace {
        trace_type: opt_field_str(trace, "type").unwrap_or_default(),
        from: action_str("from"),
        to: action_str("to"),
        value: action_str("value"),
        input: action_str("input"),
        trace_address,
    })
}

fn field_str<'a>(value: &'a Value, key: &str) -> Result<&'a str> {
    value
        .get(key)
        .and_then(|f| f.as_str())
        .ok_or_else(|| anyhow::anyhow!("Missing {}", key))
}

fn opt_field_str(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(|f| f.as_str())
        .map(str::to_string)
}

pub fn parse_hex_u64(s: &str) -> Result<u64> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).context("parse hex u64")
}
