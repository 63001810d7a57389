//! Per-network block-time table used for the polling cadence.

use std::time::Duration;

/// Fallback interval for networks not in the table. Deliberately on the slow
/// side so an unknown chain is polled gently rather than hammered.
pub const DEFAULT_BLOCK_TIME: Duration = Duration::from_secs(15);

/// Expected block interval for a network id.
pub fn block_time(network_id: u64) -> Duration {
    let secs = match network_id {
        1 => 12,     // ethereum mainnet
        10 => 2,     // optimism
        56 => 3,     // bnb chain
        137 => 2,    // polygon
        250 => 2,    // fantom
        8453 => 2,   // base
        42161 => 1,  // arbitrum one
        43114 => 2,  // avalanche c-chain
        _ => return DEFAULT_BLOCK_TIME,
    };
    Duration::from_secs(secs)
}
