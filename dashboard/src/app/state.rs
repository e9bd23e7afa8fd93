use crate::config::{ChartSpec, DashboardConfig, Profile};
use crate::live_buffer::LiveBuffer;
use crate::order_entry::OrderForm;
use chrono::{Local, TimeZone};
use hbdm::{OrderRecord, PricePoint};
use std::time::{SystemTime, UNIX_EPOCH};

/// The four editable inputs, in Tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    BuyPrice,
    BuyQuantity,
    SellPrice,
    SellQuantity,
}

impl Field {
    const ORDER: [Field; 4] = [
        Field::BuyPrice,
        Field::BuyQuantity,
        Field::SellPrice,
        Field::SellQuantity,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::BuyPrice | Field::SellPrice => "price",
            Field::BuyQuantity | Field::SellQuantity => "qty",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistoryChart {
    pub spec: ChartSpec,
    /// Replaced wholesale on every rebuild.
    pub points: Vec<PricePoint>,
    pub rebuilt_at: Option<i64>,
}

impl HistoryChart {
    pub fn new(spec: ChartSpec) -> Self {
        Self { spec, points: Vec::new(), rebuilt_at: None }
    }

    pub fn chart_data(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.ts as f64, p.close)).collect()
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub profile: Profile,
    pub symbol: String,

    pub live: LiveBuffer,
    pub charts: Vec<HistoryChart>,

    pub buy_form: OrderForm,
    pub sell_form: OrderForm,
    pub focus: Field,

    pub orders: Vec<OrderRecord>,
    pub status_line: String,
    pub last_error: Option<String>,

    pub live_ticks: u64,
    pub history_ticks: u64,
    pub now_unix: i64,

    pub quit: bool,
}

impl AppState {
    pub fn from_config(cfg: &DashboardConfig) -> Self {
        Self {
            profile: cfg.profile,
            symbol: cfg.symbol.clone(),

            live: LiveBuffer::new(cfg.live_capacity),
            charts: cfg.visible_charts().into_iter().map(HistoryChart::new).collect(),

            buy_form: OrderForm::default(),
            sell_form: OrderForm::default(),
            focus: Field::BuyPrice,

            orders: Vec::new(),
            status_line: String::new(),
            last_error: None,

            live_ticks: 0,
            history_ticks: 0,
            now_unix: now_unix(),

            quit: false,
        }
    }

    pub fn orders_enabled(&self) -> bool {
        self.profile.orders_enabled()
    }

    pub fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::BuyPrice => &mut self.buy_form.price,
            Field::BuyQuantity => &mut self.buy_form.quantity,
            Field::SellPrice => &mut self.sell_form.price,
            Field::SellQuantity => &mut self.sell_form.quantity,
        }
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::BuyPrice => &self.buy_form.price,
            Field::BuyQuantity => &self.buy_form.quantity,
            Field::SellPrice => &self.sell_form.price,
            Field::SellQuantity => &self.sell_form.quantity,
        }
    }
}

/// unix seconds
pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

pub fn format_ts_local(ts: i64) -> String {
    match Local.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.format("%H:%M:%S").to_string(),
        None => format!("unix:{ts}"),
    }
}

/// Exchange timestamps are unix milliseconds.
pub fn format_ms_local(ms: i64) -> String {
    match Local.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%m-%d %H:%M:%S").to_string(),
        None => format!("unix_ms:{ms}"),
    }
}
