//! Handler dispatch: one block, transaction, or alert at a time, with the
//! finding cap enforced per invocation.
//!
//! Dispatchers are pure functions of their inputs; they hold no state and
//! perform no publishing. Findings go back to the caller for routing.

use crate::alert::{Alert, AlertError};
use crate::chain::{BlockRef, ChainClient, ChainError};
use crate::event::{create_block_event, create_transaction_event};
use crate::finding::Finding;
use crate::handlers::{HandlerKind, HandlerSet};
use std::ops::RangeInclusive;
use thiserror::Error;

/// Hard cap on findings from a single handler invocation. Exceeding it is an
/// error, never a truncation.
pub const MAX_FINDINGS_PER_DISPATCH: usize = 10;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no block/transaction/alert handler found")]
    NoHandler,
    #[error("no block/transaction handler found")]
    NoBlockScopedHandler,
    #[error("no {0} handler found")]
    MissingHandler(HandlerKind),
    #[error("Found more than 10 findings when executing {0} handler.")]
    TooManyFindings(HandlerKind),
    #[error("transaction {tx_hash} not found in block {block_number}")]
    TransactionNotInBlock { tx_hash: String, block_number: u64 },
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    Alert(#[from] AlertError),
    #[error("{0} handler failed: {1}")]
    Handler(HandlerKind, anyhow::Error),
}

fn check_finding_cap(findings: &[Finding], kind: HandlerKind) -> Result<(), DispatchError> {
    if findings.len() > MAX_FINDINGS_PER_DISPATCH {
        return Err(DispatchError::TooManyFindings(kind));
    }
    Ok(())
}

/// Run the transaction handler against one transaction hash: fetch the
/// receipt, the containing block, and the traces, then build the event.
pub async fn run_handlers_on_transaction<C: ChainClient + ?Sized>(
    chain: &C,
    handlers: &HandlerSet,
    tx_hash: &str,
) -> Result<Vec<Finding>, DispatchError> {
    let handle_transaction = handlers
        .transaction
        .as_ref()
        .ok_or(DispatchError::MissingHandler(HandlerKind::Transaction))?;

    let network_id = chain.network_id().await?;
    let receipt = chain.transaction_receipt(tx_hash).await?;
    let block = chain
        .block_with_transactions(BlockRef::Number(receipt.block_number))
        .await?;
    let traces = chain.trace_data(&receipt.transaction_hash).await?;
    let transaction = block
        .transactions
        .iter()
        .find(|tx| tx.hash.eq_ignore_ascii_case(&receipt.transaction_hash))
        .cloned()
        .ok_or_else(|| DispatchError::TransactionNotInBlock {
            tx_hash: receipt.transaction_hash.clone(),
            block_number: receipt.block_number,
        })?;

    let event = create_transaction_event(transaction, block, network_id, traces, receipt.logs);
    let findings = handle_transaction(event)
        .await
        .map_err(|e| DispatchError::Handler(HandlerKind::Transaction, e))?;
    check_finding_cap(&findings, HandlerKind::Transaction)?;
    tracing::debug!(tx_hash, count = findings.len(), "transaction dispatched");
    Ok(findings)
}

/// Run the block handler (if present) against one block, then every
/// transaction in the block, in native order, through the transaction
/// dispatcher (if a transaction handler is present).
pub async fn run_handlers_on_block<C: ChainClient + ?Sized>(
    chain: &C,
    handlers: &HandlerSet,
    block: BlockRef,
) -> Result<Vec<Finding>, DispatchError> {
    if handlers.block.is_none() && handlers.transaction.is_none() {
        return Err(DispatchError::NoBlockScopedHandler);
    }

    let network_id = chain.network_id().await?;
    let block = chain.block_with_transactions(block).await?;
    let mut findings = Vec::new();

    if let Some(handle_block) = handlers.block.as_ref() {
        let event = create_block_event(block.clone(), network_id);
        let block_findings = handle_block(event)
            .await
            .map_err(|e| DispatchError::Handler(HandlerKind::Block, e))?;
        check_finding_cap(&block_findings, HandlerKind::Block)?;
        findings.extend(block_findings);
    }

    if handlers.transaction.is_some() {
        for tx in &block.transactions {
            findings.extend(run_handlers_on_transaction(chain, handlers, &tx.hash).await?);
        }
    }

    tracing::debug!(
        block_number = block.number,
        count = findings.len(),
        "block dispatched"
    );
    Ok(findings)
}

/// Run the alert handler against one fetched alert.
pub async fn run_handlers_on_alert(
    handlers: &HandlerSet,
    alert: &Alert,
) -> Result<Vec<Finding>, DispatchError> {
    let handle_alert = handlers
        .alert
        .as_ref()
        .ok_or(DispatchError::MissingHandler(HandlerKind::Alert))?;
    let findings = handle_alert(alert.clone())
        .await
        .map_err(|e| DispatchError::Handler(HandlerKind::Alert, e))?;
    check_finding_cap(&findings, HandlerKind::Alert)?;
    tracing::debug!(alert_hash = %alert.hash, count = findings.len(), "alert dispatched");
    Ok(findings)
}

/// Run the block dispatcher over an inclusive range, ascending. Single-shot
/// counterpart of the live loop's drain; findings are concatenated.
pub async fn run_handlers_on_block_range<C: ChainClient + ?Sized>(
    chain: &C,
    handlers: &HandlerSet,
    blocks: RangeInclusive<u64>,
) -> Result<Vec<Finding>, DispatchError> {
    let mut findings = Vec::new();
    for number in blocks {
        findings.extend(run_handlers_on_block(chain, handlers, BlockRef::Number(number)).await?);
    }
    Ok(findings)
}
