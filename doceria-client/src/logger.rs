//! Logging Infrastructure
//!
//! Console output (pretty or JSON) plus, when a log directory is configured:
//! - `app/`: daily rotating application logs, deleted after 14 days
//! - `security/`: daily rotating sign-in/sign-out events, never deleted

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

use crate::config::LogConfig;

/// Days an application log file is kept
const APP_LOG_RETENTION_DAYS: i64 = 14;

const APP_PREFIX: &str = "app";
const SECURITY_TARGET: &str = "security";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// `RUST_LOG` wins over the configured level
fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn daily_appender(dir: &Path, prefix: &str) -> anyhow::Result<RollingFileAppender> {
    Ok(RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(dir)?)
}

fn file_layer(appender: RollingFileAppender, json: bool) -> BoxedLayer {
    let writer = std::sync::Mutex::new(appender);
    if json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_thread_ids(true)
            .with_writer(writer)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_ansi(false)
            .with_writer(writer)
            .boxed()
    }
}

/// Initialize the global subscriber.
///
/// Must run inside a Tokio runtime when `config.dir` is set; the hourly
/// cleanup of old application logs is spawned as a task.
pub fn init_logger(config: &LogConfig) -> anyhow::Result<()> {
    let mut layers: Vec<BoxedLayer> = Vec::new();

    let console = if config.json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };
    layers.push(console.with_filter(level_filter(&config.level)).boxed());

    if let Some(dir) = config.dir.as_deref() {
        let log_dir = Path::new(dir);
        let app_log_dir = log_dir.join(APP_PREFIX);
        let security_log_dir = log_dir.join(SECURITY_TARGET);
        fs::create_dir_all(&app_log_dir)?;
        fs::create_dir_all(&security_log_dir)?;

        let app = file_layer(daily_appender(&app_log_dir, APP_PREFIX)?, config.json)
            .with_filter(filter_fn(|meta| meta.target() != SECURITY_TARGET))
            .with_filter(level_filter(&config.level));
        let security = file_layer(
            daily_appender(&security_log_dir, SECURITY_TARGET)?,
            config.json,
        )
        .with_filter(filter_fn(|meta| meta.target() == SECURITY_TARGET));

        layers.push(app.boxed());
        layers.push(security.boxed());

        tokio::spawn(periodic_cleanup(log_dir.to_path_buf()));
    }

    tracing_subscriber::registry().with(layers).try_init()?;
    Ok(())
}

/// Date of an `app.YYYY-MM-DD.log` file
fn app_log_date(file_name: &str) -> Option<NaiveDate> {
    let date = file_name
        .strip_prefix("app.")
        .and_then(|rest| rest.strip_suffix(".log"))?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Delete application log files older than the retention window.
///
/// Returns the number of deleted files. Security logs are never touched.
pub fn cleanup_old_logs(log_dir: &Path, today: NaiveDate) -> anyhow::Result<usize> {
    let cutoff = today - chrono::Duration::days(APP_LOG_RETENTION_DAYS);
    let app_log_dir = log_dir.join(APP_PREFIX);
    if !app_log_dir.exists() {
        return Ok(0);
    }

    let mut deleted = 0;
    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(date) = app_log_date(name)
            && date < cutoff
        {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
            deleted += 1;
        }
    }
    Ok(deleted)
}

/// Runs every hour
async fn periodic_cleanup(log_dir: PathBuf) {
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(3600));
    loop {
        ticker.tick().await;
        let today = chrono::Local::now().date_naive();
        if let Err(e) = cleanup_old_logs(&log_dir, today) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}
