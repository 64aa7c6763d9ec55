//! Reading and following the registry.

use std::collections::HashSet;

use anyhow::Result;
use portal_config_and_utils::Config;
use record_store::Record;
use sync_engine::{EngineEvent, SyncEngine, SyncNotice};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::{build_engine, pending_notices, read_only_client};
use crate::output::{self, OutputFormat};

const CONNECT_HINT: &str =
    "Connect your wallet to see records: run `registry-portal connect` or `registry-portal watch --connect`";

/// Print the synced records once.
pub async fn list(config: &Config, format: &OutputFormat) -> Result<()> {
    let engine = build_engine(config)?;
    let mut events = engine.events();

    engine.start().await?;
    for notice in pending_notices(&mut events) {
        output::print_notice(&notice.to_string(), format);
    }

    if engine.account().is_none() {
        if engine.wallet_available() {
            output::print_notice(CONNECT_HINT, format);
        } else {
            output::print_notice(&SyncNotice::NoProvider.to_string(), format);
        }
    } else {
        output::print_records(&engine.snapshot(), format);
    }

    engine.shutdown();
    Ok(())
}

/// Print the synced records, then stream live appends until Ctrl-C.
pub async fn watch(config: &Config, connect: bool, format: &OutputFormat) -> Result<()> {
    let engine = build_engine(config)?;
    let mut events = engine.events();

    if !engine.wallet_available() {
        output::print_notice(&SyncNotice::NoProvider.to_string(), format);
        return Ok(());
    }

    engine.start().await?;
    if connect && engine.account().is_none() {
        engine.connect().await?;
    }

    let mut seen = HashSet::new();
    for record in unseen(&mut seen, &engine.snapshot()) {
        output::print_record(&record, format);
    }
    if engine.account().is_none() {
        output::print_notice(CONNECT_HINT, format);
    }

    let mut rediscover = tokio::time::interval(config.poll_interval());
    rediscover.tick().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!("Watching registry");
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                debug!("Interrupted");
                break;
            }
            _ = rediscover.tick(), if engine.account().is_none() => {
                if let Err(e) = engine.start().await {
                    warn!(error = %e, "Account discovery failed");
                }
            }
            event = events.recv() => match event {
                Ok(event) => handle_event(&engine, event, &mut seen, format),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event stream lagged, resyncing");
                    if let Err(e) = engine.refresh().await {
                        warn!(error = %e, "Resync failed");
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    engine.shutdown();
    Ok(())
}

fn handle_event(
    engine: &SyncEngine,
    event: EngineEvent,
    seen: &mut HashSet<Record>,
    format: &OutputFormat,
) {
    match event {
        EngineEvent::RecordAppended(record) => {
            if seen.insert(record.clone()) {
                output::print_record(&record, format);
            }
        }
        EngineEvent::Synced { .. } => {
            for record in unseen(seen, &engine.snapshot()) {
                output::print_record(&record, format);
            }
        }
        EngineEvent::AccountChanged(account) => {
            output::print_notice(&format!("Connected as {account}"), format);
        }
        EngineEvent::Notice(notice) => output::print_notice(&notice.to_string(), format),
        EngineEvent::StateChanged(state) => debug!(state = %state, "Engine state changed"),
    }
}

/// Records from `snapshot` not printed yet, in snapshot order.
fn unseen(seen: &mut HashSet<Record>, snapshot: &[Record]) -> Vec<Record> {
    snapshot
        .iter()
        .filter(|record| seen.insert((*record).clone()))
        .cloned()
        .collect()
}

/// Print the ledger's own record counter.
pub async fn count(config: &Config, format: &OutputFormat) -> Result<()> {
    let client = read_only_client(config)?;
    let count = client.record_count().await?;

    match format {
        OutputFormat::Text => output::print_row("Records", &count.to_string()),
        OutputFormat::Json => println!("{}", serde_json::json!({ "count": count })),
    }
    Ok(())
}
