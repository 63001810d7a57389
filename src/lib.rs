//! Off-chain sentinel runtime: live polling, handler dispatch, and finding
//! limits for detection bots.
//!
//! - **LivePoller**: follows the chain head block by block (in-memory
//!   cursor, no history replay) and polls subscription alerts on a
//!   block-time cadence, in one cooperative sequential loop.
//! - **Dispatchers**: run the resolved [HandlerSet] against a single block,
//!   transaction, or alert, enforcing the per-invocation finding cap.
//!
//! Chain data and the alerts API sit behind the [ChainClient] and
//! [AlertClient] traits so the loop runs deterministically under test; the
//! bundled implementations speak JSON-RPC and a JSON alerts API over HTTP.

pub mod alert;
pub mod chain;
pub mod config;
pub mod cursor;
pub mod dispatch;
pub mod event;
pub mod finding;
pub mod handlers;
pub mod networks;
pub mod poller;
pub mod types;

pub use alert::{
    Alert, AlertClient, AlertConfig, AlertError, AlertSource, AlertSubscription, HttpAlertClient,
};
pub use chain::{BlockRef, ChainClient, ChainError, HttpChainClient};
pub use config::PollerConfig;
pub use cursor::Cursor;
pub use dispatch::{
    run_handlers_on_alert, run_handlers_on_block, run_handlers_on_block_range,
    run_handlers_on_transaction, DispatchError, MAX_FINDINGS_PER_DISPATCH,
};
pub use event::{create_block_event, create_transaction_event, BlockEvent, TransactionEvent};
pub use finding::{Finding, FindingType, Severity};
pub use handlers::{HandlerKind, HandlerResult, HandlerSet};
pub use networks::block_time;
pub use poller::{BuildError, LivePoller, PollerBuilder};
pub use types::{Block, Log, Trace, Transaction, TransactionReceipt};
