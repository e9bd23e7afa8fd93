//! Classification of the exchange's `status` envelope.
//!
//! ```json
//! {"status":"ok","data":{...},"ts":1604000000000}
//! {"status":"error","err_code":1047,"err_msg":"Insufficient margin available.","ts":1604000000000}
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

#[derive(Clone, Debug, PartialEq)]
pub enum ExchangeReply<T> {
    Accepted(T),
    Rejected { code: Option<i64>, message: String },
}

impl ExchangeReply<Value> {
    /// Splits a parsed body into accepted payload (`data`) or the exchange's
    /// own error. Anything that is not `"status":"ok"` counts as rejected.
    pub fn classify(body: Value) -> Self {
        let status = body.get("status").and_then(Value::as_str).unwrap_or_default();
        if status.eq_ignore_ascii_case("ok") {
            let data = body.get("data").cloned().unwrap_or(Value::Null);
            return ExchangeReply::Accepted(data);
        }

        let code = body.get("err_code").and_then(Value::as_i64);
        let message = error_message(&body).unwrap_or_else(|| "unknown error".to_string());
        ExchangeReply::Rejected { code, message }
    }

    /// Decodes the accepted payload into `T`; a rejection passes through.
    pub fn decode<T: DeserializeOwned>(self) -> Result<ExchangeReply<T>> {
        match self {
            ExchangeReply::Accepted(v) => Ok(ExchangeReply::Accepted(serde_json::from_value(v)?)),
            ExchangeReply::Rejected { code, message } => {
                Ok(ExchangeReply::Rejected { code, message })
            }
        }
    }
}

impl<T> ExchangeReply<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ExchangeReply::Accepted(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ExchangeReply<U> {
        match self {
            ExchangeReply::Accepted(v) => ExchangeReply::Accepted(f(v)),
            ExchangeReply::Rejected { code, message } => ExchangeReply::Rejected { code, message },
        }
    }
}

/// The exchange's error-message field, as the status line shows it.
pub fn error_message(body: &Value) -> Option<String> {
    body.get("err_msg").and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    })
}
