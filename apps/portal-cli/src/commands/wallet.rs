//! Commands that need the user's wallet.

use anyhow::{bail, Result};
use portal_config_and_utils::Config;
use sync_engine::{SyncEngine, SyncNotice};
use tracing::{info, warn};

use super::{build_engine, pending_notices};
use crate::output::{self, OutputFormat};

/// Ask the wallet for an account and print it.
pub async fn connect(config: &Config, format: &OutputFormat) -> Result<()> {
    let engine = build_engine(config)?;
    let mut events = engine.events();

    let account = engine.connect().await?;
    for notice in pending_notices(&mut events) {
        if notice != SyncNotice::Declined {
            output::print_notice(&notice.to_string(), format);
        }
    }

    match account {
        Some(account) => output::print_success(&format!("Connected as {account}"), format),
        None => bail!("{}", SyncNotice::Declined),
    }

    engine.shutdown();
    Ok(())
}

/// Submit a message, connecting first if no account is authorized yet.
pub async fn submit(config: &Config, message: &str, wait: bool, format: &OutputFormat) -> Result<()> {
    let engine = build_engine(config)?;

    engine.start().await?;
    if engine.account().is_none() && engine.connect().await?.is_none() {
        bail!("{}", SyncNotice::Declined);
    }

    log_record_count(&engine, "before").await;

    let pending = engine.submit(message).await?;
    match format {
        OutputFormat::Text => output::print_row("Transaction", &pending.tx_hash),
        OutputFormat::Json if !wait => {
            println!("{}", serde_json::json!({ "tx_hash": pending.tx_hash }))
        }
        OutputFormat::Json => {}
    }

    if wait {
        let confirmation = engine.wait_for_confirmation(&pending).await?;
        match format {
            OutputFormat::Text => output::print_row("Block", &confirmation.block_number.to_string()),
            OutputFormat::Json => println!(
                "{}",
                serde_json::json!({
                    "tx_hash": confirmation.tx_hash,
                    "block_number": confirmation.block_number,
                })
            ),
        }
    }
    log_record_count(&engine, "after").await;

    engine.shutdown();
    Ok(())
}

async fn log_record_count(engine: &SyncEngine, when: &str) {
    match engine.record_count().await {
        Ok(count) => info!(count, when, "Registry record count"),
        Err(e) => warn!(error = %e, when, "Could not read record count"),
    }
}
