//! Huobi signature version 2 (`HmacSHA256`) request signing.
//!
//! The server rebuilds the same canonical query string from the parameters
//! it receives, so key order, percent-encoding and the payload layout below
//! have to match byte for byte:
//!
//! ```text
//! POST\n
//! api.hbdm.com\n
//! /api/v1/contract_order\n
//! AccessKeyId=...&SignatureMethod=HmacSHA256&SignatureVersion=2&Timestamp=...
//! ```

use std::collections::BTreeMap;

use base64::prelude::*;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::{Method, Url};
use sha2::Sha256;

use crate::credentials::Credentials;
use crate::error::{HbdmError, Result};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_METHOD: &str = "HmacSHA256";
pub const SIGNATURE_VERSION: &str = "2";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// `YYYY-MM-DDTHH:MM:SS`, UTC, no fraction and no `Z`.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// The parameter set covered by the signature (everything but `Signature`).
///
/// A `BTreeMap` keeps keys in lexicographic order, which is what the
/// canonical string requires.
pub fn canonical_params(access_key: &str, timestamp: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    params.insert("AccessKeyId".to_string(), access_key.to_string());
    params.insert("SignatureVersion".to_string(), SIGNATURE_VERSION.to_string());
    params.insert("SignatureMethod".to_string(), SIGNATURE_METHOD.to_string());
    params.insert("Timestamp".to_string(), timestamp.to_string());
    params
}

/// Sorted `key=value` pairs joined by `&`. Every value byte outside the
/// unreserved set (`A-Z a-z 0-9 - _ . ~`) is percent-encoded.
pub fn canonical_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Lower-cased host (no port) and path of `url`. Scheme and query are dropped.
pub fn split_host_path(url: &str) -> Result<(String, String)> {
    let parsed = Url::parse(url).map_err(|e| HbdmError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let host = parsed
        .host_str()
        .ok_or_else(|| HbdmError::InvalidUrl {
            url: url.to_string(),
            reason: "no host".to_string(),
        })?
        .to_ascii_lowercase();
    Ok((host, parsed.path().to_string()))
}

/// Method, host, path and canonical query joined by `\n`, no trailing newline.
pub fn signing_payload(method: &str, host: &str, path: &str, canonical_query: &str) -> String {
    [method, host, path, canonical_query].join("\n")
}

/// Base64 of the raw HMAC-SHA256 digest of `payload` keyed with `secret`.
pub fn sign_payload(secret: &[u8], payload: &str) -> Result<String> {
    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|e| HbdmError::Signing(e.to_string()))?;
    mac.update(payload.as_bytes());
    Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
}

#[derive(Clone, Debug)]
pub struct SignedRequest {
    pub method: Method,
    pub host: String,
    pub path: String,
    /// Canonical parameters plus `Signature`.
    pub params: BTreeMap<String, String>,
    pub signature: String,
}

impl SignedRequest {
    /// Urlencoded form of the full parameter set, `Signature` included.
    pub fn query_string(&self) -> String {
        canonical_query(&self.params)
    }

    /// `target + "?" + query_string()`.
    pub fn url_for(&self, target: &str) -> String {
        format!("{target}?{}", self.query_string())
    }
}

#[derive(Clone, Debug)]
pub struct Signer {
    credentials: Credentials,
}

impl Signer {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Signs with a fresh timestamp. Two calls a second apart produce two
    /// different requests.
    pub fn sign(&self, method: Method, url: &str) -> Result<SignedRequest> {
        self.sign_at(method, url, &format_timestamp(Utc::now()))
    }

    /// Deterministic for a fixed `timestamp`.
    pub fn sign_at(&self, method: Method, url: &str, timestamp: &str) -> Result<SignedRequest> {
        let mut params = canonical_params(self.credentials.access_key(), timestamp);
        let (host, path) = split_host_path(url)?;

        let query = canonical_query(&params);
        let payload = signing_payload(method.as_str(), &host, &path, &query);
        let signature = sign_payload(self.credentials.secret_key(), &payload)?;

        params.insert("Signature".to_string(), signature.clone());

        Ok(SignedRequest {
            method,
            host,
            path,
            params,
            signature,
        })
    }
}
