use std::num::NonZeroU32;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Url;
use tracing::{debug, trace};

use crate::config::ClientConfig;
use crate::context::RequestContext;
use crate::error::{ClientError, TransportError};

use super::{HttpRequest, HttpResponse, Transport};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// `reqwest`-backed transport.
///
/// One pooled `reqwest::Client` is built up front; each `send` borrows a
/// connection for the duration of the exchange and returns it once the body
/// has been read (or the exchange is abandoned).
pub struct HttpTransport {
    client: reqwest::Client,
    limiter: Option<DirectRateLimiter>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .build()
            .map_err(TransportError::from)?;

        let limiter = match config.requests_per_second {
            None => None,
            Some(limit) => {
                let limit = NonZeroU32::new(limit).ok_or_else(|| {
                    ClientError::Config("requests_per_second must be at least 1".to_owned())
                })?;
                Some(RateLimiter::direct(Quota::per_second(limit)))
            }
        };

        Ok(Self { client, limiter })
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    async fn exchange(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = Url::parse(&request.url)
            .map_err(|e| TransportError::InvalidRequest(format!("url `{}`: {e}", request.url)))?;

        let mut builder = self.client.request(request.method.clone(), url);
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::InvalidRequest(format!("header name `{name}`: {e}")))?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                TransportError::InvalidRequest(format!("header value for `{name}`: {e}"))
            })?;
            builder = builder.header(name, value);
        }

        self.wait_for_rate_limit().await;
        debug!(
            http.method = %request.method,
            http.url = %request.url,
            body_len = request.body.len(),
            "http request"
        );

        let response = builder.body(request.body).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(%status, body_len = body.len(), "http response");
        trace!(body = %String::from_utf8_lossy(&body), "http response body");

        Ok(HttpResponse {
            status: status.as_u16(),
            body: body.to_vec(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        ctx: &RequestContext,
        request: HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        if ctx.is_cancelled() {
            return Err(TransportError::Cancelled);
        }
        if ctx.is_expired() {
            return Err(TransportError::DeadlineExceeded);
        }

        let deadline = async {
            match ctx.deadline() {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        // Losing branches are dropped, which aborts the in-flight request and
        // releases its connection.
        tokio::select! {
            biased;
            () = ctx.cancelled() => {
                debug!("http request cancelled");
                Err(TransportError::Cancelled)
            }
            () = deadline => {
                debug!("http request deadline exceeded");
                Err(TransportError::DeadlineExceeded)
            }
            result = self.exchange(request) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn transport() -> HttpTransport {
        HttpTransport::new(&ClientConfig::default()).expect("default config must build")
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = ClientConfig::default().with_endpoint("ftp://example.com");
        assert!(matches!(
            HttpTransport::new(&config),
            Err(ClientError::Config(_))
        ));
    }

    #[tokio::test]
    async fn send_fails_fast_when_already_cancelled() {
        let ctx = RequestContext::background();
        ctx.cancel();
        let err = transport()
            .send(&ctx, HttpRequest::post("http://127.0.0.1:9/gql", Vec::new()))
            .await
            .expect_err("cancelled context must fail");
        assert!(matches!(err, TransportError::Cancelled));
    }

    #[tokio::test]
    async fn send_fails_fast_when_deadline_passed() {
        let ctx = RequestContext::background().with_timeout(Duration::ZERO);
        let err = transport()
            .send(&ctx, HttpRequest::post("http://127.0.0.1:9/gql", Vec::new()))
            .await
            .expect_err("expired context must fail");
        assert!(matches!(err, TransportError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn send_rejects_bad_header_name() {
        let request =
            HttpRequest::post("http://127.0.0.1:9/gql", Vec::new()).header("bad header", "x");
        let err = transport()
            .send(&RequestContext::background(), request)
            .await
            .expect_err("header with a space must be rejected");
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn send_rejects_relative_url() {
        let err = transport()
            .send(
                &RequestContext::background(),
                HttpRequest::post("/gql", Vec::new()),
            )
            .await
            .expect_err("relative url must be rejected");
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }
}
