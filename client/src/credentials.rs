use std::fmt;

use crate::error::{HbdmError, Result};

pub const ACCESS_KEY_ENV: &str = "HBDM_ACCESS_KEY";
pub const SECRET_KEY_ENV: &str = "HBDM_SECRET_KEY";

/// Access/secret key pair for the private API.
///
/// Held for the lifetime of the process only. The secret is kept as raw
/// bytes and is never printed, not even by `Debug`.
#[derive(Clone)]
pub struct Credentials {
    access_key: String,
    secret_key: Box<[u8]>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into().into_bytes().into_boxed_slice(),
        }
    }

    /// Reads `HBDM_ACCESS_KEY` / `HBDM_SECRET_KEY`. Empty values count as missing.
    pub fn from_env() -> Result<Self> {
        let access = read_env(ACCESS_KEY_ENV)?;
        let secret = read_env(SECRET_KEY_ENV)?;
        Ok(Self::new(access, secret))
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub(crate) fn secret_key(&self) -> &[u8] {
        &self.secret_key
    }
}

fn read_env(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(HbdmError::MissingCredential(name)),
    }
}
