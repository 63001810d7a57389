//! Live poller: follows the chain head block by block and polls subscription
//! alerts on a block-time cadence, dispatching each unit to the resolved
//! handler set.
//!
//! One cooperative sequential loop. The cursor and the alert fetch watermark
//! live here and are mutated by this loop only; dispatchers are pure
//! functions of their inputs. Any dispatcher or collaborator error
//! terminates the loop; restart policy belongs to the supervising process.

use crate::alert::{AlertClient, HttpAlertClient};
use crate::chain::{BlockRef, ChainClient, HttpChainClient};
use crate::config::PollerConfig;
use crate::cursor::Cursor;
use crate::dispatch::{run_handlers_on_alert, run_handlers_on_block, DispatchError};
use crate::finding::Finding;
use crate::handlers::HandlerSet;
use crate::networks;
use futures_util::future::BoxFuture;
use std::future::Future;
use std::time::{Duration, SystemTime};
use thiserror::Error;

type SleepFn = Box<dyn Fn(Duration) -> BoxFuture<'static, ()> + Send + Sync>;
type ClockFn = Box<dyn Fn() -> SystemTime + Send + Sync>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{0} required")]
    Missing(&'static str),
}

/// Builder for the live poller. The sleep and clock seams default to
/// `tokio::time::sleep` and `SystemTime::now`; tests swap them for a
/// recording sleep and a manual clock.
pub struct PollerBuilder {
    chain: Option<Box<dyn ChainClient>>,
    alerts: Option<Box<dyn AlertClient>>,
    handlers: HandlerSet,
    block_time_override: Option<Duration>,
    sleep: Option<SleepFn>,
    clock: Option<ClockFn>,
}

impl PollerBuilder {
    pub fn new() -> Self {
        Self {
            chain: None,
            alerts: None,
            handlers: HandlerSet::new(),
            block_time_override: None,
            sleep: None,
            clock: None,
        }
    }

    /// Wire the bundled HTTP clients from a config.
    pub fn from_config(config: &PollerConfig) -> Self {
        Self::new()
            .chain_client(HttpChainClient::from_config(config))
            .alert_client(HttpAlertClient::new(config.alerts_url.clone()))
            .block_time_opt(config.block_time_override)
    }

    pub fn chain_client(mut self, chain: impl ChainClient + 'static) -> Self {
        self.chain = Some(Box::new(chain));
        self
    }

    pub fn alert_client(mut self, alerts: impl AlertClient + 'static) -> Self {
        self.alerts = Some(Box::new(alerts));
        self
    }

    pub fn handlers(mut self, handlers: HandlerSet) -> Self {
        self.handlers = handlers;
        self
    }

    /// Fixed polling interval instead of the per-network table.
    pub fn block_time(mut self, interval: Duration) -> Self {
        self.block_time_override = Some(interval);
        self
    }

    fn block_time_opt(mut self, interval: Option<Duration>) -> Self {
        self.block_time_override = interval;
        self
    }

    pub fn sleep_with<F, Fut>(mut self, sleep: F) -> Self
    where
        F: Fn(Duration) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.sleep = Some(Box::new(move |d| Box::pin(sleep(d))));
        self
    }

    pub fn clock_with<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> SystemTime + Send + Sync + 'static,
    {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn build(self) -> Result<LivePoller, BuildError> {
        let chain = self.chain.ok_or(BuildError::Missing("chain client"))?;
        if self.handlers.alert.is_some() && self.alerts.is_none() {
            return Err(BuildError::Missing("alert client"));
        }
        let sleep = self
            .sleep
            .unwrap_or_else(|| Box::new(|d| Box::pin(tokio::time::sleep(d))));
        let clock = self.clock.unwrap_or_else(|| Box::new(SystemTime::now));
        Ok(LivePoller {
            chain,
            alerts: self.alerts,
            handlers: self.handlers,
            block_time_override: self.block_time_override,
            cursor: Cursor::new(),
            sleep,
            clock,
        })
    }
}

impl Default for PollerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The live polling engine. Owns the cursor and the alert fetch watermark.
pub struct LivePoller {
    chain: Box<dyn ChainClient>,
    alerts: Option<Box<dyn AlertClient>>,
    handlers: HandlerSet,
    block_time_override: Option<Duration>,
    cursor: Cursor,
    sleep: SleepFn,
    clock: ClockFn,
}

impl std::fmt::Debug for LivePoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LivePoller")
            .field("has_alerts", &self.alerts.is_some())
            .field("block_time_override", &self.block_time_override)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

impl LivePoller {
    /// Poll until `should_continue` returns false or an error occurs.
    ///
    /// Each outer iteration: read the head; lazily initialize the cursor to
    /// it (no history replay); when caught up, sleep one block interval and
    /// re-check; otherwise drain every due block in ascending order, then
    /// fetch and dispatch alerts if an alert handler exists. The watermark
    /// committed after a fetch is the instant the fetch was issued, so
    /// alerts arriving during a slow fetch surface on the next call.
    pub async fn run_live<F>(&mut self, mut should_continue: F) -> Result<(), DispatchError>
    where
        F: FnMut() -> bool,
    {
        if !self.handlers.has_any_handler() {
            return Err(DispatchError::NoHandler);
        }

        tracing::info!("listening for blockchain data...");
        let network_id = self.chain.network_id().await?;
        let block_time = self
            .block_time_override
            .unwrap_or_else(|| networks::block_time(network_id));
        tracing::debug!(network_id, block_time_secs = block_time.as_secs_f64(), "resolved network");

        let mut last_alert_fetch = (self.clock)();
        while should_continue() {
            let head = self.chain.block_number().await?;
            let next = self.cursor.init_if_unset(head);

            if next > head {
                // Caught up: wait one block interval before re-checking.
                (self.sleep)(block_time).await;
                continue;
            }

            // Drain without sleeping until the cursor passes the head.
            while let Some(number) = self.cursor.due(head) {
                if self.handlers.block.is_some() || self.handlers.transaction.is_some() {
                    let findings = run_handlers_on_block(
                        self.chain.as_ref(),
                        &self.handlers,
                        BlockRef::Number(number),
                    )
                    .await?;
                    report_findings(&findings);
                    tracing::info!(block_number = number, count = findings.len(), "block processed");
                }
                self.cursor.advance();
            }

            if self.handlers.alert.is_some() {
                if let Some(alerts) = self.alerts.as_deref() {
                    let fetch_started = (self.clock)();
                    let batch = alerts
                        .alerts_since(self.handlers.subscriptions(), last_alert_fetch)
                        .await?;
                    last_alert_fetch = fetch_started;
                    for alert in &batch {
                        let findings = run_handlers_on_alert(&self.handlers, alert).await?;
                        report_findings(&findings);
                        tracing::info!(alert_hash = %alert.hash, count = findings.len(), "alert processed");
                    }
                }
            }
        }
        Ok(())
    }

    /// `run_live` with an always-true predicate.
    pub async fn run_forever(&mut self) -> Result<(), DispatchError> {
        self.run_live(|| true).await
    }
}

fn report_findings(findings: &[Finding]) {
    for finding in findings {
        tracing::info!(%finding, "finding");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{Alert, AlertError, AlertSubscription};
    use crate::chain::ChainError;
    use crate::types::{Block, Trace, TransactionReceipt};
    use async_trait::async_trait;

    struct NeverChain;

    #[async_trait]
    impl ChainClient for NeverChain {
        async fn network_id(&self) -> Result<u64, ChainError> {
            Err(ChainError::Rpc("unreachable".into()))
        }
        async fn block_number(&self) -> Result<u64, ChainError> {
            Err(ChainError::Rpc("unreachable".into()))
        }
        async fn block_with_transactions(&self, _block: BlockRef) -> Result<Block, ChainError> {
            Err(ChainError::Rpc("unreachable".into()))
        }
        async fn transaction_receipt(
            &self,
            _tx_hash: &str,
        ) -> Result<TransactionReceipt, ChainError> {
            Err(ChainError::Rpc("unreachable".into()))
        }
        async fn trace_data(&self, _tx_hash: &str) -> Result<Vec<Trace>, ChainError> {
            Err(ChainError::Rpc("unreachable".into()))
        }
    }

    struct NeverAlerts;

    #[async_trait]
    impl AlertClient for NeverAlerts {
        async fn alerts_since(
            &self,
            _subscriptions: &[AlertSubscription],
            _since: SystemTime,
        ) -> Result<Vec<Alert>, AlertError> {
            Err(AlertError::Api("unreachable".into()))
        }
    }

    #[test]
    fn build_requires_chain_client() {
        let err = PollerBuilder::new().build().unwrap_err();
        assert_eq!(err.to_string(), "chain client required");
    }

    #[test]
    fn build_requires_alert_client_with_alert_handler() {
        let handlers = HandlerSet::new().with_alert_handler(|_alert| async { Ok(Vec::new()) });
        let err = PollerBuilder::new()
            .chain_client(NeverChain)
            .handlers(handlers)
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "alert client required");
    }

    #[test]
    fn build_with_alert_client_succeeds() {
        let handlers = HandlerSet::new().with_alert_handler(|_alert| async { Ok(Vec::new()) });
        assert!(PollerBuilder::new()
            .chain_client(NeverChain)
            .alert_client(NeverAlerts)
            .handlers(handlers)
            .build()
            .is_ok());
    }
}
