//! Resolved handler sets: optional block/transaction/alert handler functions.
//!
//! User bot capabilities are modeled as a fixed struct of optional boxed
//! async functions, checked for presence at dispatch time. How user code is
//! loaded and resolved into these functions is outside this crate; the set
//! arrives here already built.

use crate::alert::{Alert, AlertConfig, AlertSubscription};
use crate::event::{BlockEvent, TransactionEvent};
use crate::finding::Finding;
use futures_util::future::BoxFuture;
use std::fmt;
use std::future::Future;

pub type HandlerResult = Result<Vec<Finding>, anyhow::Error>;

pub type BlockHandlerFn =
    Box<dyn Fn(BlockEvent) -> BoxFuture<'static, HandlerResult> + Send + Sync>;
pub type TransactionHandlerFn =
    Box<dyn Fn(TransactionEvent) -> BoxFuture<'static, HandlerResult> + Send + Sync>;
pub type AlertHandlerFn = Box<dyn Fn(Alert) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Which handler a dispatch targets; used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Block,
    Transaction,
    Alert,
}

impl HandlerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerKind::Block => "block",
            HandlerKind::Transaction => "transaction",
            HandlerKind::Alert => "alert",
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The immutable handler bundle resolved once at startup. Zero or more
/// handlers may be absent; the live loop refuses to start when all are.
#[derive(Default)]
pub struct HandlerSet {
    pub block: Option<BlockHandlerFn>,
    pub transaction: Option<TransactionHandlerFn>,
    pub alert: Option<AlertHandlerFn>,
    pub alert_config: Option<AlertConfig>,
}

impl HandlerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_any_handler(&self) -> bool {
        self.block.is_some() || self.transaction.is_some() || self.alert.is_some()
    }

    /// Subscriptions from the alert config; empty when none was provided.
    pub fn subscriptions(&self) -> &[AlertSubscription] {
        self.alert_config
            .as_ref()
            .map(|c| c.subscriptions.as_slice())
            .unwrap_or(&[])
    }

    pub fn with_block_handler<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(BlockEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.block = Some(Box::new(move |event| Box::pin(handler(event))));
        self
    }

    pub fn with_transaction_handler<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(TransactionEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.transaction = Some(Box::new(move |event| Box::pin(handler(event))));
        self
    }

    pub fn with_alert_handler<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Alert) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.alert = Some(Box::new(move |event| Box::pin(handler(event))));
        self
    }

    pub fn with_alert_config(mut self, config: AlertConfig) -> Self {
        self.alert_config = Some(config);
        self
    }
}
