use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::credentials::Credentials;
use crate::error::{HbdmError, Result};
use crate::signer::{split_host_path, Signer};
use crate::telemetry;

pub const DEFAULT_REST_ENDPOINT: &str = "https://api.hbdm.com";

#[derive(Clone, Debug)]
pub struct RestConfig {
    pub endpoint: String,
    /// `None` means no client-side timeout: a stalled call blocks its caller.
    pub timeout: Option<Duration>,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_REST_ENDPOINT.to_string(),
            timeout: None,
        }
    }
}

/// REST client for one exchange endpoint. Public market data works without
/// credentials; the private API needs [`HbdmClient::with_credentials`].
///
/// There is no retry, rate limiting or idempotency here. Whether and how to
/// retry is the caller's decision.
#[derive(Clone, Debug)]
pub struct HbdmClient {
    http: reqwest::Client,
    config: RestConfig,
    signer: Option<Signer>,
}

impl HbdmClient {
    pub fn new(config: RestConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            config,
            signer: None,
        })
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.signer = Some(Signer::new(credentials));
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Absolute URL for an API path such as `/api/v1/contract_order`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    fn signer(&self) -> Result<&Signer> {
        self.signer
            .as_ref()
            .ok_or(HbdmError::MissingCredential(crate::credentials::ACCESS_KEY_ENV))
    }

    /// Signs and POSTs `body` as JSON to `url`, returning the parsed body.
    ///
    /// The exchange's own error replies are returned like any other JSON;
    /// see [`crate::reply::ExchangeReply::classify`] to tell them apart.
    pub async fn post_signed<B>(&self, url: &str, body: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let signed = self.signer()?.sign(Method::POST, url)?;
        let target = signed.url_for(url);

        log::debug!("POST {}{} (signed)", signed.host, signed.path);

        let started = Instant::now();
        let result = self.send_json(
            self.http
                .post(&target)
                .header(CONTENT_TYPE, "application/json")
                .json(body),
        )
        .await;

        telemetry::record_latency("signed", started.elapsed());
        telemetry::record_request("signed", &signed.path, result.is_ok());
        result
    }

    /// Unsigned GET of `path` with query parameters.
    pub async fn get_public(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = self.url(path);
        // Validates the endpoint the same way the signed path does.
        split_host_path(&url)?;

        log::debug!("GET {path} {query:?}");

        let started = Instant::now();
        let result = self.send_json(self.http.get(&url).query(query)).await;

        telemetry::record_latency("public", started.elapsed());
        telemetry::record_request("public", path, result.is_ok());
        result
    }

    async fn send_json(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        match serde_json::from_str::<Value>(&text) {
            Ok(v) => Ok(v),
            Err(err) => {
                log::warn!(
                    "non-JSON response (HTTP {status}): {}",
                    text.chars().take(200).collect::<String>()
                );
                Err(HbdmError::Decode(err))
            }
        }
    }
}
