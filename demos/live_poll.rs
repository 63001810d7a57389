//! Example: run the live poller against a node and print findings.
//!
//! Usage: cargo run --example live_poll -- --rpc-url URL --alerts-url URL [--trace-rpc-url URL]

use sentinel::{
    Finding, FindingType, HandlerSet, PollerBuilder, PollerConfig, Severity,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sentinel=info,live_poll=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut rpc_url = String::new();
    let mut alerts_url = String::new();
    let mut trace_rpc_url = None;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--rpc-url" => {
                i += 1;
                rpc_url = args.get(i).cloned().unwrap_or_default();
            }
            "--alerts-url" => {
                i += 1;
                alerts_url = args.get(i).cloned().unwrap_or_default();
            }
            "--trace-rpc-url" => {
                i += 1;
                trace_rpc_url = args.get(i).cloned();
            }
            _ => {}
        }
        i += 1;
    }
    if rpc_url.is_empty() || alerts_url.is_empty() {
        eprintln!("Usage: live_poll --rpc-url URL --alerts-url URL [--trace-rpc-url URL]");
        std::process::exit(1);
    }

    let mut config = PollerConfig::new(rpc_url, alerts_url);
    config.trace_rpc_url = trace_rpc_url;

    // Demo handlers: flag contract creations, summarize each block.
    let handlers = HandlerSet::new()
        .with_block_handler(|event| async move {
            println!(
                "block {} with {} transactions",
                event.block_number(),
                event.block.transactions.len()
            );
            Ok(Vec::new())
        })
        .with_transaction_handler(|event| async move {
            let mut findings = Vec::new();
            if event.transaction.to.is_none() {
                let input = event.transaction.input.trim_start_matches("0x");
                let init_code_bytes = hex::decode(input).map(|b| b.len()).unwrap_or(0);
                findings.push(
                    Finding::new(
                        "Contract Creation",
                        format!("contract created by {}", event.transaction.from),
                        "DEMO-1",
                        Severity::Info,
                        FindingType::Info,
                    )
                    .address(event.transaction.from.clone())
                    .metadata("initCodeBytes", init_code_bytes.to_string()),
                );
            }
            Ok(findings)
        });

    let mut poller = PollerBuilder::from_config(&config).handlers(handlers).build()?;

    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = Arc::clone(&stop);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        stop_flag.store(true, Ordering::SeqCst);
    });

    poller.run_live(|| !stop.load(Ordering::SeqCst)).await?;
    Ok(())
}
