//! Common helpers for integration tests.
//! Some helpers are only used by specific test binaries; allow dead_code to avoid per-binary warnings.
#![allow(dead_code)]

use async_trait::async_trait;
use sentinel::{
    Alert, AlertClient, AlertError, AlertSubscription, Block, BlockRef, ChainClient, ChainError,
    Finding, FindingType, Log, Severity, Trace, Transaction, TransactionReceipt,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Scripted chain provider. Shares state across clones so tests keep a handle
/// for assertions after the poller takes ownership of its clone.
#[derive(Clone, Default)]
pub struct MockChain {
    network_id: u64,
    heads: Arc<Mutex<Vec<u64>>>,
    head_idx: Arc<Mutex<usize>>,
    blocks: Arc<Mutex<HashMap<u64, Block>>>,
    receipts: Arc<Mutex<HashMap<String, TransactionReceipt>>>,
    traces: Arc<Mutex<HashMap<String, Vec<Trace>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockChain {
    pub fn new(network_id: u64) -> Self {
        Self {
            network_id,
            ..Default::default()
        }
    }

    /// Head values returned by successive block_number calls; the last value
    /// repeats once the script runs out.
    pub fn with_heads(self, heads: &[u64]) -> Self {
        *self.heads.lock().unwrap() = heads.to_vec();
        self
    }

    pub fn insert_block(&self, block: Block) {
        self.blocks.lock().unwrap().insert(block.number, block);
    }

    pub fn insert_receipt(&self, receipt: TransactionReceipt) {
        self.receipts
            .lock()
            .unwrap()
            .insert(receipt.transaction_hash.clone(), receipt);
    }

    pub fn insert_traces(&self, tx_hash: &str, traces: Vec<Trace>) {
        self.traces.lock().unwrap().insert(tx_hash.to_string(), traces);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn network_id(&self) -> Result<u64, ChainError> {
        self.record("network_id".into());
        Ok(self.network_id)
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        self.record("block_number".into());
        let heads = self.heads.lock().unwrap();
        if heads.is_empty() {
            return Err(ChainError::Rpc("head script exhausted".into()));
        }
        let mut idx = self.head_idx.lock().unwrap();
        let head = heads[(*idx).min(heads.len() - 1)];
        *idx += 1;
        Ok(head)
    }

    async fn block_with_transactions(&self, block: BlockRef) -> Result<Block, ChainError> {
        self.record(format!("block:{}", block));
        let blocks = self.blocks.lock().unwrap();
        let found = match &block {
            BlockRef::Number(n) => blocks.get(n).cloned(),
            BlockRef::Hash(h) => blocks.values().find(|b| &b.hash == h).cloned(),
        };
        found.ok_or_else(|| ChainError::NotFound(format!("no block {}", block)))
    }

    async fn transaction_receipt(&self, tx_hash: &str) -> Result<TransactionReceipt, ChainError> {
        self.record(format!("receipt:{}", tx_hash));
        self.receipts
            .lock()
            .unwrap()
            .get(tx_hash)
            .cloned()
            .ok_or_else(|| ChainError::NotFound(format!("no receipt for {}", tx_hash)))
    }

    async fn trace_data(&self, tx_hash: &str) -> Result<Vec<Trace>, ChainError> {
        self.record(format!("trace:{}", tx_hash));
        Ok(self
            .traces
            .lock()
            .unwrap()
            .get(tx_hash)
            .cloned()
            .unwrap_or_default())
    }
}

/// Deterministic clock: each call returns base + step * tick and advances.
#[derive(Clone)]
pub struct TestClock {
    base: SystemTime,
    step: Duration,
    ticks: Arc<Mutex<u32>>,
}

impl TestClock {
    pub fn new(step: Duration) -> Self {
        Self {
            base: UNIX_EPOCH + Duration::from_secs(1_700_000_000),
            step,
            ticks: Arc::new(Mutex::new(0)),
        }
    }

    pub fn now(&self) -> SystemTime {
        let mut ticks = self.ticks.lock().unwrap();
        let now = self.base + self.step * *ticks;
        *ticks += 1;
        now
    }

    /// The instant a given tick produced (does not advance).
    pub fn at(&self, tick: u32) -> SystemTime {
        self.base + self.step * tick
    }
}

/// Scripted alert fetcher: returns one batch per call, recording the `since`
/// bound of every call. With a clock attached, each fetch consumes a tick to
/// simulate fetch latency.
#[derive(Clone, Default)]
pub struct MockAlerts {
    batches: Arc<Mutex<VecDeque<Vec<Alert>>>>,
    since_calls: Arc<Mutex<Vec<SystemTime>>>,
    clock: Option<TestClock>,
}

impl MockAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batches(self, batches: Vec<Vec<Alert>>) -> Self {
        *self.batches.lock().unwrap() = batches.into();
        self
    }

    pub fn with_clock(mut self, clock: TestClock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn since_calls(&self) -> Vec<SystemTime> {
        self.since_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertClient for MockAlerts {
    async fn alerts_since(
        &self,
        _subscriptions: &[AlertSubscription],
        since: SystemTime,
    ) -> Result<Vec<Alert>, AlertError> {
        self.since_calls.lock().unwrap().push(since);
        if let Some(clock) = &self.clock {
            let _ = clock.now();
        }
        Ok(self.batches.lock().unwrap().pop_front().unwrap_or_default())
    }
}

/// Sleep seam that records requested durations and returns immediately.
pub fn recording_sleep() -> (
    Arc<Mutex<Vec<Duration>>>,
    impl Fn(Duration) -> std::future::Ready<()> + Send + Sync + 'static,
) {
    let slept = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&slept);
    (slept, move |d| {
        recorder.lock().unwrap().push(d);
        std::future::ready(())
    })
}

pub fn tx(hash: &str) -> Transaction {
    Transaction {
        hash: hash.to_string(),
        from: "0xf00".to_string(),
        ..Default::default()
    }
}

pub fn block(number: u64, tx_hashes: &[&str]) -> Block {
    Block {
        hash: format!("0xb{:x}", number),
        parent_hash: format!("0xb{:x}", number.saturating_sub(1)),
        number,
        timestamp: 1_700_000_000 + number,
        transactions: tx_hashes.iter().map(|h| tx(h)).collect(),
    }
}

pub fn receipt(tx_hash: &str, block_number: u64, logs: Vec<Log>) -> TransactionReceipt {
    TransactionReceipt {
        transaction_hash: tx_hash.to_string(),
        block_number,
        block_hash: format!("0xb{:x}", block_number),
        status: Some(true),
        logs,
    }
}

pub fn log_entry(data: &str) -> Log {
    Log {
        address: "0xc0ffee".to_string(),
        topics: vec!["0xt0".to_string()],
        data: data.to_string(),
        log_index: 0,
    }
}

pub fn trace(trace_type: &str) -> Trace {
    Trace {
        trace_type: trace_type.to_string(),
        ..Default::default()
    }
}

pub fn alert(hash: &str, name: &str) -> Alert {
    Alert {
        hash: hash.to_string(),
        alert_id: "TEST-1".to_string(),
        name: name.to_string(),
        description: "test alert".to_string(),
        created_at: "2023-01-01T00:00:00Z".to_string(),
        ..Default::default()
    }
}

/// Findings shaped like the canonical fixture: same record repeated n times.
pub fn test_findings(n: usize) -> Vec<Finding> {
    vec![
        Finding::new(
            "test",
            "test description",
            "1234",
            Severity::Medium,
            FindingType::Exploit,
        );
        n
    ]
}
