//! Asynchronous REST client for Huobi DM (coin-margined futures).
//!
//! - [`signer`] builds signature-version-2 (`HmacSHA256`) query strings.
//! - [`HbdmClient`] sends signed and public requests.
//! - [`market::MarketData`] and [`orders::OrderGateway`] are the seams the
//!   dashboard talks to.

pub mod credentials;
pub mod error;
pub mod market;
pub mod orders;
pub mod reply;
pub mod rest;
pub mod signer;
mod telemetry;

pub use credentials::Credentials;
pub use error::{HbdmError, Result};
pub use market::{CandlestickInterval, MarketData, PricePoint};
pub use orders::{ContractType, Direction, Offset, OrderGateway, OrderHistoryQuery, OrderRecord, OrderRequest};
pub use reply::ExchangeReply;
pub use rest::{HbdmClient, RestConfig};
