//! Poller configuration.

use std::time::Duration;

/// Configuration for the concrete HTTP path of the runtime. The live loop
/// itself only consumes `block_time_override`; the URLs configure the bundled
/// chain and alert clients.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// HTTP JSON-RPC URL for chain data.
    pub rpc_url: String,
    /// Dedicated trace RPC URL. Trace lists are empty when unset.
    pub trace_rpc_url: Option<String>,
    /// Alerts API URL for subscription alert fetches.
    pub alerts_url: String,
    /// Overrides the per-network block-time table when set.
    pub block_time_override: Option<Duration>,
}

impl PollerConfig {
    pub fn new(rpc_url: impl Into<String>, alerts_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            trace_rpc_url: None,
            alerts_url: alerts_url.into(),
            block_time_override: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_new() {
        let c = PollerConfig::new("http://127.0.0.1:8545", "https://alerts.example/api");
        assert_eq!(c.rpc_url, "http://127.0.0.1:8545");
        assert_eq!(c.trace_rpc_url, None);
        assert_eq!(c.block_time_override, None);
    }
}
