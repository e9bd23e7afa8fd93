use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "hbdm_dashboard.log";

/// The terminal belongs to the UI, so logs go to `<dir>/hbdm_dashboard.log`.
/// Level comes from `RUST_LOG` (default `info`); `log` records from the
/// client crate are bridged in.
pub fn init_logging(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("create log dir {:?}", dir))?;
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {:?}", path))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))?;

    Ok(path)
}

pub fn log_live_point(ts: i64, price: f64, buffered: usize) {
    static COUNT: AtomicU64 = AtomicU64::new(0);
    let n = COUNT.fetch_add(1, Ordering::Relaxed) + 1;
    if n <= 10 || n % 60 == 0 {
        tracing::debug!(target: "feed.live", "live point #{n} ts={ts} price={price} buffered={buffered}");
    }
}

pub fn log_history_rebuild(chart: usize, interval: &str, points: usize) {
    tracing::debug!(target: "feed.history", "chart {chart} ({interval}) rebuilt with {points} points");
}

pub fn log_fetch_error(what: &str, err: &str) {
    tracing::warn!(target: "feed.error", "{what} failed: {err}");
}

pub fn log_order_skipped(side: &str, reason: &str) {
    tracing::info!(target: "exec.order", "{side} not sent: {reason}");
}

pub fn log_order_reply(side: &str, status: &str) {
    tracing::info!(target: "exec.order", "{side} reply: {status}");
}
