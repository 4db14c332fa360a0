//! Client configuration.
//!
//! Every knob that the client would otherwise read from process-wide
//! constants lives here and is fixed once the client is built.

use std::time::Duration;

use reqwest::Url;

use crate::error::ClientError;

/// Production Airstack GraphQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.airstack.xyz/gql";

/// Whole-request timeout applied by the HTTP transport.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Client-side throttle on outbound requests. `None` disables it.
    pub requests_per_second: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            requests_per_second: None,
        }
    }
}

impl ClientConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_requests_per_second(mut self, limit: Option<u32>) -> Self {
        self.requests_per_second = limit;
        self
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        parse_endpoint(&self.endpoint)?;
        if self.timeout.is_zero() {
            return Err(ClientError::Config("timeout must be non-zero".to_owned()));
        }
        if self.connect_timeout.is_zero() {
            return Err(ClientError::Config(
                "connect timeout must be non-zero".to_owned(),
            ));
        }
        if self.requests_per_second == Some(0) {
            return Err(ClientError::Config(
                "requests_per_second must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn parse_endpoint(endpoint: &str) -> Result<Url, ClientError> {
    let parsed = Url::parse(endpoint).map_err(|e| {
        ClientError::Config(format!(
            "invalid endpoint `{endpoint}`: expected HTTP(S) URL ({e})"
        ))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ClientError::Config(format!(
            "unsupported endpoint scheme `{other}`; expected http or https"
        ))),
    }
}
