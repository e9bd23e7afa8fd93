use crate::config::DashboardConfig;
use crate::debug_hooks;
use hbdm::{Direction, ExchangeReply, Offset, OrderGateway, OrderRequest};
use serde_json::Value;

/// Status line text when a form does not hold a usable order.
pub const NO_ORDER: &str = "no order";

/// Price and quantity as typed. Buy and sell each own one; a submission only
/// ever reads its own form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderForm {
    pub price: String,
    pub quantity: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTicket {
    pub direction: Direction,
    pub price: f64,
    pub volume: i64,
}

impl OrderForm {
    /// `None` when price or quantity is missing, unparsable or not > 0.
    pub fn ticket(&self, direction: Direction) -> Option<OrderTicket> {
        let price = self.price.trim().parse::<f64>().ok()?;
        if !price.is_finite() || price <= 0.0 {
            return None;
        }
        let volume = parse_volume(&self.quantity)?;
        if volume <= 0 {
            return None;
        }
        Some(OrderTicket { direction, price, volume })
    }
}

/// Whole contracts only: "2" and "2.0" parse, "2.5" does not. Anything
/// outside the `i64` range is rejected rather than clamped.
fn parse_volume(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let whole = match raw.split_once('.') {
        Some((int, frac)) if frac.bytes().all(|b| b == b'0') => int,
        Some(_) => return None,
        None => raw,
    };
    whole.parse::<i64>().ok()
}

pub fn build_request(ticket: &OrderTicket, cfg: &DashboardConfig) -> OrderRequest {
    OrderRequest {
        volume: ticket.volume,
        direction: ticket.direction,
        offset: Offset::Open,
        lever_rate: cfg.lever_rate,
        symbol: cfg.order_symbol.clone(),
        order_price_type: cfg.order_price_type.clone(),
        contract_type: cfg.contract_type,
        price: ticket.price,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderOutcome {
    /// Rejected locally; nothing was sent.
    NoOrder,
    Replied(ExchangeReply<Value>),
    Failed(String),
}

impl OrderOutcome {
    /// What the status line shows. Exchange messages are passed through verbatim.
    pub fn status_text(&self) -> String {
        match self {
            OrderOutcome::NoOrder => NO_ORDER.to_string(),
            OrderOutcome::Replied(ExchangeReply::Accepted(data)) => {
                match data.get("order_id_str").or_else(|| data.get("order_id")) {
                    Some(Value::String(id)) => format!("ok (order {id})"),
                    Some(id) => format!("ok (order {id})"),
                    None => "ok".to_string(),
                }
            }
            OrderOutcome::Replied(ExchangeReply::Rejected { message, .. }) => message.clone(),
            OrderOutcome::Failed(err) => err.clone(),
        }
    }
}

/// Validates `form` and, only if it holds a usable order, sends it.
pub async fn submit<G>(
    gateway: &G,
    form: &OrderForm,
    direction: Direction,
    cfg: &DashboardConfig,
) -> OrderOutcome
where
    G: OrderGateway + ?Sized,
{
    let Some(ticket) = form.ticket(direction) else {
        debug_hooks::log_order_skipped(direction.as_ref(), "price/quantity not > 0");
        return OrderOutcome::NoOrder;
    };

    let request = build_request(&ticket, cfg);
    let outcome = match gateway.place_order(&request).await {
        Ok(reply) => OrderOutcome::Replied(reply),
        Err(hbdm::HbdmError::InvalidOrder(reason)) => {
            debug_hooks::log_order_skipped(direction.as_ref(), &reason);
            OrderOutcome::NoOrder
        }
        Err(err) => OrderOutcome::Failed(err.to_string()),
    };
    debug_hooks::log_order_reply(direction.as_ref(), &outcome.status_text());
    outcome
}
