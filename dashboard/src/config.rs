// dashboard/src/config.rs

use anyhow::{Context, Result};
use directories::ProjectDirs;
use hbdm::{CandlestickInterval, ContractType, OrderHistoryQuery};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

/// Bump when you change config schema.
const CONFIG_VERSION: u32 = 1;

pub const PROFILE_ENV: &str = "HBDM_PROFILE";
pub const SYMBOL_ENV: &str = "HBDM_SYMBOL";
pub const REST_URL_ENV: &str = "HBDM_REST_URL";

/// The three dashboard flavours: live + one history chart, live + several
/// history charts, and the full trading screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    ViewOnly,
    MultiChart,
    Trading,
}

impl Profile {
    pub fn orders_enabled(self) -> bool {
        matches!(self, Profile::Trading)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Profile::ViewOnly => "view_only",
            Profile::MultiChart => "multi_chart",
            Profile::Trading => "trading",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "view_only" | "view" => Some(Profile::ViewOnly),
            "multi_chart" | "multi" => Some(Profile::MultiChart),
            "trading" | "trade" => Some(Profile::Trading),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub interval: CandlestickInterval,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub version: u32,

    pub profile: Profile,
    pub symbol: String,

    // --- transport ---
    pub rest_endpoint: String,
    /// Unset: no client-side timeout.
    pub http_timeout_secs: Option<u64>,

    // --- timers ---
    pub live_interval_ms: u64,
    pub history_interval_ms: u64,

    // --- charts ---
    pub live_capacity: usize,
    pub charts: Vec<ChartSpec>,

    // --- orders ---
    pub order_symbol: String,
    pub contract_type: ContractType,
    pub order_price_type: String,
    pub lever_rate: i64,
    pub history_days: i64,
    /// Sent as `type`: 1 all orders, 2 finished only.
    pub history_kind: i64,
    pub history_trade_type: i64,
    pub history_status: i64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,

            profile: Profile::Trading,
            symbol: "ETH_CQ".to_string(),

            rest_endpoint: hbdm::rest::DEFAULT_REST_ENDPOINT.to_string(),
            http_timeout_secs: None,

            live_interval_ms: 1_000,
            history_interval_ms: 10_000,

            live_capacity: crate::live_buffer::DEFAULT_LIVE_CAPACITY,
            charts: vec![
                ChartSpec { interval: CandlestickInterval::Min1, count: 200 },
                ChartSpec { interval: CandlestickInterval::Min5, count: 200 },
            ],

            order_symbol: "ETH".to_string(),
            contract_type: ContractType::NextWeek,
            order_price_type: "limit".to_string(),
            lever_rate: 5,
            history_days: 7,
            history_kind: 1,
            history_trade_type: 0,
            history_status: 0,
        }
    }
}

impl DashboardConfig {
    /// History charts shown for the active profile. View-only keeps the first.
    pub fn visible_charts(&self) -> Vec<ChartSpec> {
        match self.profile {
            Profile::ViewOnly => self.charts.iter().take(1).cloned().collect(),
            Profile::MultiChart | Profile::Trading => self.charts.clone(),
        }
    }

    pub fn live_interval(&self) -> Duration {
        Duration::from_millis(self.live_interval_ms.max(100))
    }

    pub fn history_interval(&self) -> Duration {
        Duration::from_millis(self.history_interval_ms.max(500))
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.filter(|s| *s > 0).map(Duration::from_secs)
    }

    pub fn order_history_query(&self) -> OrderHistoryQuery {
        OrderHistoryQuery {
            kind: self.history_kind,
            trade_type: self.history_trade_type,
            create_date: self.history_days.clamp(1, 90),
            status: self.history_status,
            symbol: self.order_symbol.clone(),
        }
    }

    /// `HBDM_PROFILE`, `HBDM_SYMBOL` and `HBDM_REST_URL` win over the file.
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var(PROFILE_ENV) {
            match Profile::parse(&v) {
                Some(p) => self.profile = p,
                None => tracing::warn!("ignoring unknown {PROFILE_ENV}={v:?}"),
            }
        }
        if let Ok(v) = std::env::var(SYMBOL_ENV) {
            if !v.trim().is_empty() {
                self.symbol = v.trim().to_string();
            }
        }
        if let Ok(v) = std::env::var(REST_URL_ENV) {
            if !v.trim().is_empty() {
                self.rest_endpoint = v.trim().to_string();
            }
        }
    }
}

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new() -> Result<Self> {
        Ok(Self { path: default_config_path()? })
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn config_path(&self) -> &Path {
        &self.path
    }

    /// Missing file gives defaults (and writes them out); a corrupt one is
    /// archived next to itself and defaults are used.
    pub fn load(&self) -> DashboardConfig {
        if !self.path.exists() {
            let cfg = DashboardConfig::default();
            if let Err(err) = self.save_now(&cfg) {
                tracing::warn!("could not write default config: {err:?}");
            }
            return cfg;
        }

        match read_json::<DashboardConfig>(&self.path) {
            Ok(mut cfg) => {
                // simple migration hook
                if cfg.version == 0 {
                    cfg.version = CONFIG_VERSION;
                }
                cfg
            }
            Err(err) => {
                archive_corrupt(&self.path, &err);
                DashboardConfig::default()
            }
        }
    }

    pub fn save_now(&self, cfg: &DashboardConfig) -> Result<()> {
        let parent = self.path.parent().context("config path has no parent")?;
        fs::create_dir_all(parent).with_context(|| format!("create config dir {:?}", parent))?;

        let json = serde_json::to_string_pretty(cfg)?;
        atomic_write(&self.path, json.as_bytes())
    }
}

fn default_config_path() -> Result<PathBuf> {
    let proj =
        ProjectDirs::from("com", "hbdm", "hbdm_dashboard").context("ProjectDirs::from returned None")?;
    Ok(proj.config_dir().join("config.json"))
}

/// Platform data dir for the log file; `./data` when there is none.
pub fn data_dir() -> PathBuf {
    ProjectDirs::from("com", "hbdm", "hbdm_dashboard")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).with_context(|| format!("read {:?}", path))?;
    let value = serde_json::from_slice::<T>(&bytes).with_context(|| "parse json")?;
    Ok(value)
}

fn archive_corrupt(path: &Path, err: &anyhow::Error) {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let archived = path.with_extension(format!("corrupt.{ts}.json"));
    let _ = fs::rename(path, &archived);
    tracing::warn!("config corrupt; archived to {:?}. error: {err:?}", archived);
}

fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().context("no parent dir for config path")?;
    let tmp = dir.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    {
        let mut f = fs::File::create(&tmp).with_context(|| format!("create tmp {:?}", tmp))?;
        f.write_all(bytes).with_context(|| "write tmp")?;
        let _ = f.sync_all();
    }

    fs::rename(&tmp, path).with_context(|| format!("rename {:?} -> {:?}", tmp, path))?;
    Ok(())
}
