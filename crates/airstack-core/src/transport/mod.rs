//! HTTP exchange layer.
//!
//! Defines the [`Transport`] trait and provides a `reqwest` implementation
//! ([`HttpTransport`]) plus a test mock (`mock::MockTransport`).

mod http;
#[cfg(test)]
pub mod mock;

pub use http::HttpTransport;

use async_trait::async_trait;
use reqwest::Method;

use crate::context::RequestContext;
use crate::error::TransportError;

/// The single success status the Airstack API uses.
pub const SUCCESS_STATUS: u16 = 200;

/// Reserved for callers that want to tell validation failures apart; the
/// client itself formats it like any other failure status.
pub const UNPROCESSABLE_ENTITY_STATUS: u16 = 422;

// ==============================================================================
// Request / Response
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Applied in order with append semantics; repeated names are all sent.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// All values sent under `name`, compared case-insensitively.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A fully buffered response. The connection has already been released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Advisory check that a failure response carries a JSON body.
    ///
    /// Success responses always pass. The body stays readable either way.
    pub fn check_error_body(&self) -> Result<(), TransportError> {
        if self.is_success() {
            return Ok(());
        }
        serde_json::from_slice::<serde_json::Value>(&self.body)
            .map(|_| ())
            .map_err(|e| TransportError::MalformedErrorBody {
                status: self.status,
                message: e.to_string(),
            })
    }
}

// ==============================================================================
// Transport Trait
// ==============================================================================

/// One request/response round trip.
///
/// Implementations must return promptly with [`TransportError::Cancelled`] or
/// [`TransportError::DeadlineExceeded`] when `ctx` is cancelled or expires,
/// and must not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        ctx: &RequestContext,
        request: HttpRequest,
    ) -> Result<HttpResponse, TransportError>;
}
