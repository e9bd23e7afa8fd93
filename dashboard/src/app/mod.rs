pub mod commands;
pub mod event;
pub mod reducer;
pub mod render;
pub mod state;

pub use event::*;
pub use state::*;

use crate::config::DashboardConfig;
use crate::{order_entry, poller};
use anyhow::{Context, Result};
use hbdm::{Direction, ExchangeReply, MarketData, OrderGateway};
use ratatui::{backend::Backend, Terminal};
use std::time::{Duration, Instant};
use tokio::runtime::{Builder, Runtime};

/// Owns the state and the exchange handles, and runs every handler to
/// completion on one current-thread runtime. A slow request delays the next
/// tick; nothing is queued behind it.
pub struct AppRuntime<M, G> {
    pub state: AppState,
    cfg: DashboardConfig,
    market: M,
    orders: Option<G>,
    rt: Runtime,

    live_every: Duration,
    history_every: Duration,
    next_live: Instant,
    next_history: Instant,

    dirty: bool,
}

impl<M, G> AppRuntime<M, G>
where
    M: MarketData,
    G: OrderGateway,
{
    /// `orders` is only consulted when the profile allows orders.
    pub fn new(cfg: DashboardConfig, market: M, orders: Option<G>) -> Result<Self> {
        let rt = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("build tokio runtime")?;
        let now = Instant::now();
        Ok(Self {
            state: AppState::from_config(&cfg),
            live_every: cfg.live_interval(),
            history_every: cfg.history_interval(),
            next_live: now,
            next_history: now,
            cfg,
            market,
            orders,
            rt,
            dirty: true,
        })
    }

    pub fn should_quit(&self) -> bool {
        self.state.quit
    }

    pub fn handle_event(&mut self, ev: AppEvent) {
        let effect = match &ev {
            AppEvent::Ui(UiEvent::SubmitOrder { direction }) => Some(Effect::Submit(*direction)),
            AppEvent::Ui(UiEvent::RefreshNow) => Some(Effect::Refresh),
            _ => None,
        };
        self.apply(ev);

        match effect {
            Some(Effect::Submit(direction)) => self.submit_order(direction),
            Some(Effect::Refresh) => {
                self.next_history = Instant::now() + self.history_every;
                self.refresh_history();
            }
            None => {}
        }
    }

    /// Fires whichever timers are due at `now`.
    pub fn tick_if_needed(&mut self, now: Instant) {
        let now_unix = now_unix();

        if now >= self.next_live {
            self.next_live = now + self.live_every;
            self.apply(AppEvent::Timer(TimerEvent::Live { now_unix }));
            self.poll_live(now_unix);
        }

        if now >= self.next_history {
            self.next_history = now + self.history_every;
            self.apply(AppEvent::Timer(TimerEvent::History { now_unix }));
            self.refresh_history();
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn render_if_dirty<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        if self.dirty {
            terminal.draw(|f| render::draw(f, &self.state))?;
            self.dirty = false;
        }
        Ok(())
    }

    fn apply(&mut self, ev: AppEvent) {
        if reducer::reduce(&mut self.state, ev) {
            self.dirty = true;
        }
    }

    fn poll_live(&mut self, now_unix: i64) {
        let res = self
            .rt
            .block_on(poller::live_point(&self.market, &self.state.symbol, now_unix));
        match res {
            Ok(Some(point)) => self.apply(AppEvent::Feed(FeedEvent::LivePoint(point))),
            Ok(None) => self.apply(fetch_failed("live", EMPTY_KLINE.to_string())),
            Err(err) => self.apply(fetch_failed("live", err.to_string())),
        }
    }

    fn refresh_history(&mut self) {
        let specs: Vec<_> = self.state.charts.iter().map(|c| c.spec.clone()).collect();
        for (chart, spec) in specs.iter().enumerate() {
            let res = self
                .rt
                .block_on(poller::history_window(&self.market, &self.state.symbol, spec));
            // An empty reply (the exchange refused the kline request) keeps the
            // previous window on screen.
            let ev = match res {
                Ok(points) if points.is_empty() => {
                    fetch_failed(&format!("history {}", spec.interval), EMPTY_KLINE.to_string())
                }
                Ok(points) => AppEvent::Feed(FeedEvent::HistoryWindow { chart, points }),
                Err(err) => fetch_failed(&format!("history {}", spec.interval), err.to_string()),
            };
            self.apply(ev);
        }

        if !self.state.orders_enabled() {
            return;
        }
        let Some(gateway) = &self.orders else {
            return;
        };
        let query = self.cfg.order_history_query();
        let ev = match self.rt.block_on(gateway.order_history(&query)) {
            Ok(ExchangeReply::Accepted(rows)) => AppEvent::Feed(FeedEvent::OrderHistory(rows)),
            Ok(ExchangeReply::Rejected { message, .. }) => fetch_failed("order history", message),
            Err(err) => fetch_failed("order history", err.to_string()),
        };
        self.apply(ev);
    }

    fn submit_order(&mut self, direction: Direction) {
        if !self.state.orders_enabled() {
            tracing::debug!(target: "exec.order", "{direction} ignored: profile has no orders");
            return;
        }
        let Some(gateway) = &self.orders else {
            tracing::warn!(target: "exec.order", "{direction} ignored: no order gateway");
            return;
        };

        let form = match direction {
            Direction::Buy => &self.state.buy_form,
            Direction::Sell => &self.state.sell_form,
        };
        let outcome = self
            .rt
            .block_on(order_entry::submit(gateway, form, direction, &self.cfg));
        self.apply(AppEvent::Exec(ExecEvent::OrderOutcome { direction, outcome }));
    }
}

const EMPTY_KLINE: &str = "no candles in reply";

enum Effect {
    Submit(Direction),
    Refresh,
}

fn fetch_failed(what: &str, message: String) -> AppEvent {
    AppEvent::Feed(FeedEvent::FetchFailed { what: what.to_string(), message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Profile;
    use crate::order_entry::testing::RecordingGateway;
    use crate::poller::testing::FakeMarket;
    use hbdm::PricePoint;

    fn market() -> FakeMarket {
        FakeMarket {
            candles: (1..=300)
                .map(|i| PricePoint { ts: i * 60, close: 380.0 + i as f64 })
                .collect(),
            ..Default::default()
        }
    }

    fn runtime(profile: Profile) -> AppRuntime<FakeMarket, RecordingGateway> {
        let cfg = DashboardConfig { profile, ..Default::default() };
        AppRuntime::new(cfg, market(), Some(RecordingGateway::default())).unwrap()
    }

    fn type_into(rt: &mut AppRuntime<FakeMarket, RecordingGateway>, text: &str) {
        for c in text.chars() {
            rt.handle_event(AppEvent::Ui(UiEvent::Input(c)));
        }
    }

    #[test]
    fn first_tick_fires_both_timers() {
        let mut rt = runtime(Profile::Trading);
        rt.tick_if_needed(Instant::now());

        assert_eq!(rt.state.live.len(), 1);
        assert_eq!(rt.state.live.last().map(|p| p.close), Some(680.0));
        assert_eq!(rt.state.charts.len(), 2);
        assert!(rt.state.charts.iter().all(|c| c.points.len() == 200));
        assert_eq!(*rt.orders.as_ref().unwrap().history_calls.lock().unwrap(), 1);
    }

    #[test]
    fn timers_run_on_their_own_cadence() {
        let mut rt = runtime(Profile::MultiChart);
        let t0 = Instant::now();
        rt.tick_if_needed(t0);
        rt.tick_if_needed(t0 + Duration::from_millis(10));
        assert_eq!(rt.state.live_ticks, 1);

        rt.tick_if_needed(t0 + Duration::from_millis(1_000));
        assert_eq!(rt.state.live_ticks, 2);
        assert_eq!(rt.state.history_ticks, 1);

        rt.tick_if_needed(t0 + Duration::from_millis(10_000));
        assert_eq!(rt.state.history_ticks, 2);
        assert_eq!(rt.state.live.len(), 3);
    }

    #[test]
    fn bad_buy_form_makes_no_call() {
        let mut rt = runtime(Profile::Trading);
        type_into(&mut rt, "381");
        // quantity left empty
        rt.handle_event(AppEvent::Ui(UiEvent::SubmitOrder { direction: Direction::Buy }));

        assert_eq!(rt.state.status_line, "no order");
        assert!(rt.orders.as_ref().unwrap().placed.lock().unwrap().is_empty());
    }

    #[test]
    fn sell_uses_its_own_quantity() {
        let mut rt = runtime(Profile::Trading);
        type_into(&mut rt, "381");
        rt.handle_event(AppEvent::Ui(UiEvent::FocusNext));
        type_into(&mut rt, "7");
        rt.handle_event(AppEvent::Ui(UiEvent::FocusNext));
        type_into(&mut rt, "390");
        rt.handle_event(AppEvent::Ui(UiEvent::FocusNext));
        type_into(&mut rt, "2");

        rt.handle_event(AppEvent::Ui(UiEvent::SubmitOrder { direction: Direction::Sell }));

        let placed = rt.orders.as_ref().unwrap().placed.lock().unwrap().clone();
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].direction, Direction::Sell);
        assert_eq!(placed[0].price, 390.0);
        assert_eq!(placed[0].volume, 2);
        assert_eq!(rt.state.status_line, "ok (order 1)");
    }

    #[test]
    fn view_only_never_touches_orders() {
        let mut rt = runtime(Profile::ViewOnly);
        rt.tick_if_needed(Instant::now());
        rt.handle_event(AppEvent::Ui(UiEvent::SubmitOrder { direction: Direction::Buy }));

        let gw = rt.orders.as_ref().unwrap();
        assert!(gw.placed.lock().unwrap().is_empty());
        assert_eq!(*gw.history_calls.lock().unwrap(), 0);
        assert_eq!(rt.state.charts.len(), 1);
    }

    #[test]
    fn refresh_key_rebuilds_history_now() {
        let mut rt = runtime(Profile::MultiChart);
        rt.tick_if_needed(Instant::now());
        let before = rt.market.calls.lock().unwrap().len();

        rt.handle_event(AppEvent::Ui(UiEvent::RefreshNow));
        let after = rt.market.calls.lock().unwrap().len();
        assert_eq!(after - before, 2);
    }

    #[test]
    fn fetch_errors_land_in_last_error() {
        let cfg = DashboardConfig { profile: Profile::ViewOnly, ..Default::default() };
        let market = FakeMarket { fail: true, ..Default::default() };
        let mut rt: AppRuntime<FakeMarket, RecordingGateway> =
            AppRuntime::new(cfg, market, None).unwrap();
        rt.tick_if_needed(Instant::now());

        assert!(rt.state.live.is_empty());
        let err = rt.state.last_error.clone().unwrap();
        assert!(err.starts_with("history 1min"), "{err}");
    }

    #[test]
    fn rejected_order_history_goes_to_last_error_only() {
        let cfg = DashboardConfig::default();
        let gateway = RecordingGateway {
            reject_history_with: Some("Abnormal service. Please try again later.".to_string()),
            ..Default::default()
        };
        let mut rt = AppRuntime::new(cfg, market(), Some(gateway)).unwrap();
        rt.tick_if_needed(Instant::now());

        assert_eq!(
            rt.state.last_error.as_deref(),
            Some("order history: Abnormal service. Please try again later.")
        );
        assert_eq!(rt.state.status_line, "");
        assert!(rt.state.orders.is_empty());
    }

    #[test]
    fn failed_order_history_keeps_status_line() {
        let cfg = DashboardConfig::default();
        let gateway = RecordingGateway { fail_history: true, ..Default::default() };
        let mut rt = AppRuntime::new(cfg, market(), Some(gateway)).unwrap();

        type_into(&mut rt, "0");
        rt.handle_event(AppEvent::Ui(UiEvent::SubmitOrder { direction: Direction::Buy }));
        rt.tick_if_needed(Instant::now());

        assert_eq!(rt.state.status_line, "no order");
        let err = rt.state.last_error.clone().unwrap();
        assert!(err.starts_with("order history: "), "{err}");
    }

    #[test]
    fn empty_kline_reply_keeps_previous_window() {
        let mut rt = runtime(Profile::MultiChart);
        let t0 = Instant::now();
        rt.tick_if_needed(t0);
        assert_eq!(rt.state.charts[0].points.len(), 200);

        rt.market.candles.clear();
        rt.tick_if_needed(t0 + Duration::from_millis(10_000));

        assert_eq!(rt.state.charts[0].points.len(), 200);
        assert_eq!(rt.state.live.len(), 1);
        assert_eq!(
            rt.state.last_error.as_deref(),
            Some("history 5min: no candles in reply")
        );
    }

    #[test]
    fn quit_key_stops_loop() {
        let mut rt = runtime(Profile::ViewOnly);
        assert!(!rt.should_quit());
        rt.handle_event(AppEvent::Ui(UiEvent::Quit));
        assert!(rt.should_quit());
    }
}
