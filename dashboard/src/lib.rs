//! Terminal dashboard for Huobi DM futures: a live price chart, rolling
//! history charts and (in the trading profile) order entry with an order table.

pub mod app;
pub mod config;
pub mod debug_hooks;
pub mod live_buffer;
pub mod order_entry;
pub mod poller;
