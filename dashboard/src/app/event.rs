use crate::order_entry::OrderOutcome;
use hbdm::{Direction, OrderRecord, PricePoint};

#[derive(Debug, Clone)]
pub enum AppEvent {
    Ui(UiEvent),
    Feed(FeedEvent),
    Exec(ExecEvent),
    Timer(TimerEvent),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Quit,
    FocusNext,
    FocusPrev,
    /// A digit or `.` typed into the focused field.
    Input(char),
    Backspace,
    SubmitOrder { direction: Direction },
    RefreshNow,
}

#[derive(Debug, Clone)]
pub enum FeedEvent {
    LivePoint(PricePoint),
    HistoryWindow {
        chart: usize,
        points: Vec<PricePoint>,
    },
    OrderHistory(Vec<OrderRecord>),
    FetchFailed {
        what: String,
        message: String,
    },
}

#[derive(Debug, Clone)]
pub enum ExecEvent {
    OrderOutcome {
        direction: Direction,
        outcome: OrderOutcome,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Live { now_unix: i64 },
    History { now_unix: i64 },
}
