//! doceria-monitor: headless order monitor for the shop counter
//!
//! Polls the backend, sounds the terminal bell when new pending orders
//! arrive and logs the dashboard figures after every refresh.
//!
//! Commands on stdin: `ok` acknowledges the alarm, `r` refreshes now,
//! `q` quits.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use chrono_tz::Tz;
use doceria_client::{
    AlarmController, ClientConfig, DashboardMetrics, SyncHandle, SyncWorker, Synchronizer,
    TerminalBell, logger, spawn_alarm_listener,
};
use futures::FutureExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Spawn a task whose panic is logged instead of silently lost
fn spawn_task<F>(name: &'static str, future: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(panic) = AssertUnwindSafe(future).catch_unwind().await {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(task = %name, panic = %message, "Background task panicked");
        }
    })
}

/// Log dashboard figures whenever the snapshot changes
async fn report_metrics(sync: SyncHandle, tz: Tz, shutdown: CancellationToken) {
    let mut snapshots = sync.watch_snapshot();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                let now = Utc::now().with_timezone(&tz);
                let metrics = DashboardMetrics::compute(&snapshot, &now);
                tracing::info!(
                    sales_today = metrics.sales_today,
                    count_today = metrics.count_sales_today,
                    sales_week = metrics.sales_this_week,
                    count_week = metrics.count_sales_this_week,
                    pending_crm = metrics.pending_crm_count,
                    pending_online = metrics.pending_online_count,
                    customers = metrics.active_customer_count,
                    low_stock = metrics.low_stock_count,
                    "Dashboard updated"
                );
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = ClientConfig::from_env();
    logger::init_logger(&config.log).context("Failed to initialize logging")?;

    tracing::info!(
        api = %config.base_url,
        poll_secs = config.poll_interval.as_secs(),
        tz = %config.business_tz,
        "Doceria monitor starting..."
    );

    let http = config
        .build_http_client()
        .context("Failed to build HTTP client")?;
    let synchronizer = Synchronizer::new(http);
    let events = synchronizer.subscribe();
    let (sync, polling) = SyncWorker::spawn(synchronizer, config.poll_interval);
    let shutdown = polling.cancellation_token();

    let alarm = Arc::new(AlarmController::new(
        config.alarm_pulse,
        TerminalBell::factory(),
    ));
    let listener = spawn_alarm_listener(alarm.clone(), events, shutdown.clone());
    let reporter = spawn_task(
        "metrics_reporter",
        report_metrics(sync.clone(), config.business_tz, shutdown.clone()),
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl-C received");
                break;
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match line.trim() {
                    "ok" => {
                        if !alarm.stop() {
                            tracing::info!("No alarm to acknowledge");
                        }
                    }
                    "r" => match sync.refresh().await {
                        Ok(outcome) => tracing::info!(
                            pending = outcome.pending_after,
                            failed = outcome.failed_collections,
                            "Manual refresh completed"
                        ),
                        Err(e) => tracing::error!(error = %e, "Manual refresh failed"),
                    },
                    "q" => break,
                    "" => {}
                    other => tracing::warn!(command = %other, "Unknown command (ok, r, q)"),
                },
                Ok(None) => {
                    tracing::info!("stdin closed, waiting for Ctrl-C");
                    stdin_open = false;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read stdin");
                    stdin_open = false;
                }
            },
        }
    }

    polling.shutdown().await;
    alarm.stop();
    for (name, task) in [("alarm_listener", listener), ("metrics_reporter", reporter)] {
        if let Err(e) = task.await {
            tracing::error!(task = %name, error = %e, "Task failed during shutdown");
        }
    }

    tracing::info!("Doceria monitor stopped");
    Ok(())
}
