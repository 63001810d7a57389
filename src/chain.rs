//! Chain data providers: the ChainClient contract and a JSON-RPC
//! implementation over HTTP.
//!
//! Requests are built with serde_json and results decoded by hand (types.rs);
//! no provider framework. Trace data comes from a dedicated trace RPC
//! endpoint when one is configured, otherwise trace lists are empty.

use crate::config::PollerConfig;
use crate::types::{
    decode_block, decode_receipt, decode_trace, parse_hex_u64, Block, Trace, TransactionReceipt,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

/// A block lookup key: number for the live loop, hash for single-shot runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockRef {
    Number(u64),
    Hash(String),
}

impl From<u64> for BlockRef {
    fn from(number: u64) -> Self {
        BlockRef::Number(number)
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockRef::Number(n) => write!(f, "{}", n),
            BlockRef::Hash(h) => write!(f, "{}", h),
        }
    }
}

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("not found: {0}")]
    NotFound(String),
}

/// Chain data provider contract. Each method may fail; failures propagate to
/// the caller unwrapped and are never retried here.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn network_id(&self) -> Result<u64, ChainError>;
    async fn block_number(&self) -> Result<u64, ChainError>;
    async fn block_with_transactions(&self, block: BlockRef) -> Result<Block, ChainError>;
    async fn transaction_receipt(&self, tx_hash: &str) -> Result<TransactionReceipt, ChainError>;
    async fn trace_data(&self, tx_hash: &str) -> Result<Vec<Trace>, ChainError>;
}

/// JSON-RPC chain client over HTTP.
pub struct HttpChainClient {
    client: reqwest::Client,
    rpc_url: String,
    trace_rpc_url: Option<String>,
}

impl HttpChainClient {
    pub fn new(rpc_url: impl Into<String>, trace_rpc_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            rpc_url: rpc_url.into(),
            trace_rpc_url,
        }
    }

    pub fn from_config(config: &PollerConfig) -> Self {
        Self::new(config.rpc_url.clone(), config.trace_rpc_url.clone())
    }
}

async fn http_json_rpc(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: Value,
    id: u64,
) -> Result<Value, ChainError> {
    let body = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params
    });
    let resp = client.post(url).json(&body).send().await?;
    let json: Value = resp.json().await?;
    if let Some(err) = json.get("error") {
        return Err(ChainError::Rpc(err.to_string()));
    }
    json.get("result")
        .cloned()
        .ok_or_else(|| ChainError::Decode("Missing result".into()))
}

#[async_trait]
impl ChainClient for HttpChainClient {
    async fn network_id(&self) -> Result<u64, ChainError> {
        let result = http_json_rpc(&self.client, &self.rpc_url, "eth_chainId", json!([]), 1).await?;
        let s = result
            .as_str()
            .ok_or_else(|| ChainError::Decode("chainId not string".into()))?;
        parse_hex_u64(s).map_err(|e| ChainError::Decode(e.to_string()))
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        let result =
            http_json_rpc(&self.client, &self.rpc_url, "eth_blockNumber", json!([]), 2).await?;
        let s = result
            .as_str()
            .ok_or_else(|| ChainError::Decode("blockNumber not string".into()))?;
        parse_hex_u64(s).map_err(|e| ChainError::Decode(e.to_string()))
    }

    async fn block_with_transactions(&self, block: BlockRef) -> Result<Block, ChainError> {
        let (method, params) = match &block {
            BlockRef::Number(n) => ("eth_getBlockByNumber", json!([format!("0x{:x}", n), true])),
            BlockRef::Hash(h) => ("eth_getBlockByHash", json!([h, true])),
        };
        let result = http_json_rpc(&self.client, &self.rpc_url, method, params, 3).await?;
        if result.is_null() {
            return Err(ChainError::NotFound(format!("no block {}", block)));
        }
        decode_block(&result).map_err(|e| ChainError::Decode(e.to_string()))
    }

    async fn transaction_receipt(&self, tx_hash: &str) -> Result<TransactionReceipt, ChainError> {
        let result = http_json_rpc(
            &self.client,
            &self.rpc_url,
            "eth_getTransactionReceipt",
            json!([tx_hash]),
            4,
        )
        .await?;
        if result.is_null() {
            return Err(ChainError::NotFound(format!("no receipt for {}", tx_hash)));
        }
        decode_receipt(&result).map_err(|e| ChainError::Decode(e.to_string()))
    }

    async fn trace_data(&self, tx_hash: &str) -> Result<Vec<Trace>, ChainError> {
        let trace_url = match &self.trace_rpc_url {
            Some(url) => url,
            None => return Ok(Vec::new()),
        };
        let result = http_json_rpc(
            &self.client,
            trace_url,
            "trace_transaction",
            json!([tx_hash]),
            5,
        )
        .await?;
        let arr = result
            .as_array()
            .ok_or_else(|| ChainError::Decode("traces not array".into()))?;
        arr.iter()
            .map(|t| decode_trace(t).map_err(|e| ChainError::Decode(e.to_string())))
            .collect()
    }
}
