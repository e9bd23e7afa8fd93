use super::event::*;
use super::state::*;
use crate::debug_hooks;
use crate::order_entry::OrderOutcome;

/// Applies `ev` to `state`. Returns whether anything visible changed.
///
/// No I/O happens here; `SubmitOrder` and `RefreshNow` are side effects the
/// runtime performs before feeding the results back in as events.
pub fn reduce(state: &mut AppState, ev: AppEvent) -> bool {
    match ev {
        AppEvent::Ui(u) => reduce_ui(state, u),
        AppEvent::Feed(f) => reduce_feed(state, f),
        AppEvent::Exec(x) => reduce_exec(state, x),
        AppEvent::Timer(t) => reduce_timer(state, t),
    }
}

fn reduce_ui(state: &mut AppState, ev: UiEvent) -> bool {
    match ev {
        UiEvent::Quit => {
            state.quit = true;
            true
        }
        UiEvent::FocusNext => {
            if !state.orders_enabled() {
                return false;
            }
            state.focus = state.focus.next();
            true
        }
        UiEvent::FocusPrev => {
            if !state.orders_enabled() {
                return false;
            }
            state.focus = state.focus.prev();
            true
        }
        UiEvent::Input(c) => {
            if !state.orders_enabled() {
                return false;
            }
            let field = state.field_mut(state.focus);
            match c {
                '0'..='9' => {
                    field.push(c);
                    true
                }
                '.' if !field.contains('.') => {
                    field.push(c);
                    true
                }
                _ => false,
            }
        }
        UiEvent::Backspace => {
            if !state.orders_enabled() {
                return false;
            }
            state.field_mut(state.focus).pop().is_some()
        }
        // effects; the runtime handles these
        UiEvent::SubmitOrder { .. } | UiEvent::RefreshNow => false,
    }
}

fn reduce_feed(state: &mut AppState, ev: FeedEvent) -> bool {
    match ev {
        FeedEvent::LivePoint(point) => {
            state.live.push(point);
            debug_hooks::log_live_point(point.ts, point.close, state.live.len());
            true
        }
        FeedEvent::HistoryWindow { chart, points } => {
            let now = state.now_unix;
            let Some(slot) = state.charts.get_mut(chart) else {
                return false;
            };
            debug_hooks::log_history_rebuild(chart, slot.spec.interval.as_ref(), points.len());
            slot.points = points;
            slot.rebuilt_at = Some(now);
            true
        }
        FeedEvent::OrderHistory(rows) => {
            if !state.orders_enabled() {
                return false;
            }
            state.orders = rows;
            true
        }
        FeedEvent::FetchFailed { what, message } => {
            debug_hooks::log_fetch_error(&what, &message);
            state.last_error = Some(format!("{what}: {message}"));
            true
        }
    }
}

fn reduce_exec(state: &mut AppState, ev: ExecEvent) -> bool {
    match ev {
        ExecEvent::OrderOutcome { direction, outcome } => {
            let text = outcome.status_text();
            if let OrderOutcome::Failed(err) = &outcome {
                state.last_error = Some(format!("{direction} order: {err}"));
            }
            state.status_line = text;
            true
        }
    }
}

fn reduce_timer(state: &mut AppState, ev: TimerEvent) -> bool {
    match ev {
        TimerEvent::Live { now_unix } => {
            state.live_ticks += 1;
            state.now_unix = now_unix;
        }
        TimerEvent::History { now_unix } => {
            state.history_ticks += 1;
            state.now_unix = now_unix;
        }
    }
    true
}
