//! Derived read-only event views handed to user handlers.
//!
//! Built per dispatch from already-fetched chain data; never persisted.

use crate::types::{Block, Log, Trace, Transaction};

/// One block plus its network, as seen by a block handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockEvent {
    pub network_id: u64,
    pub block: Block,
}

/// One transaction with its containing block, traces, and receipt logs, as
/// seen by a transaction handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEvent {
    pub network_id: u64,
    pub transaction: Transaction,
    pub block: Block,
    pub traces: Vec<Trace>,
    pub logs: Vec<Log>,
}

impl TransactionEvent {
    pub fn tx_hash(&self) -> &str {
        &self.transaction.hash
    }

    pub fn block_number(&self) -> u64 {
        self.block.number
    }
}

impl BlockEvent {
    pub fn block_number(&self) -> u64 {
        self.block.number
    }
}

pub fn create_block_event(block: Block, network_id: u64) -> BlockEvent {
    BlockEvent { network_id, block }
}

pub fn create_transaction_event(
    transaction: Transaction,
    block: Block,
    network_id: u64,
    traces: Vec<Trace>,
    logs: Vec<Log>,
) -> TransactionEvent {
    TransactionEvent {
        network_id,
        transaction,
        block,
        traces,
        logs,
    }
}
