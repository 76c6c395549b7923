use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::sync::Mutex;

fn default_retries() -> u32 {
    3
}

/// Wire shape of a credentials file
#[derive(Debug, Deserialize)]
struct AuthFile {
    key: String,
    secret: String,
    #[serde(default)]
    token: String,
    #[serde(default = "default_retries")]
    retries: u32,
}

/// Credentials shared by every session talking to one deployment: the
/// consumer key/secret pair, the current access token, and the number of
/// token refreshes a single request may spend before giving up.
///
/// The token is the only mutable part and is guarded by a mutex, so one
/// holder can safely back concurrent sessions; a refresh performed by any
/// of them is visible to all. Share the holder as an `Arc<AuthInfo>`.
pub struct AuthInfo {
    key: String,
    secret: String,
    token: Mutex<String>,
    retries: u32,
}

impl AuthInfo {
    /// Create a credential holder with the default refresh budget of 3
    pub fn new(
        key: impl Into<String>,
        secret: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        AuthInfo {
            key: key.into(),
            secret: secret.into(),
            token: Mutex::new(token.into()),
            retries: default_retries(),
        }
    }

    /// Set the token refresh budget; 0 disables refresh entirely
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Load credentials from a JSON file of the form
    /// `{"key": "...", "secret": "...", "token": "...", "retries": 3}`.
    /// `token` and `retries` are optional.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        let parsed: AuthFile = serde_json::from_str(&raw).map_err(|e| {
            Error::Configuration(format!("invalid credentials file {}: {}", path.display(), e))
        })?;

        Ok(AuthInfo {
            key: parsed.key,
            secret: parsed.secret,
            token: Mutex::new(parsed.token),
            retries: parsed.retries,
        })
    }

    /// The consumer key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The consumer secret
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Number of token refreshes a single request may spend
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// The current access token
    pub fn token(&self) -> String {
        self.token.lock().unwrap().clone()
    }

    /// Replace the access token, e.g. after a refresh
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.lock().unwrap() = token.into();
    }
}

impl fmt::Debug for AuthInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthInfo")
            .field("key", &self.key)
            .field("retries", &self.retries)
            .finish_non_exhaustive()
    }
}
