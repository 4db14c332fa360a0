use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::context::RequestContext;
use crate::error::TransportError;

use super::{HttpRequest, HttpResponse, Transport};

/// A mock transport for testing. Replays canned responses in order and
/// records every request it receives.
///
/// Once the queue is drained, the last response is repeated.
pub struct MockTransport {
    responses: Mutex<VecDeque<MockReply>>,
    last: Mutex<Option<MockReply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

#[derive(Clone)]
enum MockReply {
    Response(HttpResponse),
    Cancelled,
}

impl MockTransport {
    pub fn builder() -> MockTransportBuilder {
        MockTransportBuilder {
            responses: VecDeque::new(),
        }
    }

    pub async fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().await.clone()
    }

    /// Decoded JSON body of the `index`-th recorded request.
    pub async fn request_json(&self, index: usize) -> serde_json::Value {
        let requests = self.requests.lock().await;
        let request = requests.get(index).expect("request index must exist");
        serde_json::from_slice(&request.body).expect("request body must be JSON")
    }
}

pub struct MockTransportBuilder {
    responses: VecDeque<MockReply>,
}

impl MockTransportBuilder {
    pub fn with_response(mut self, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.responses.push_back(MockReply::Response(HttpResponse {
            status,
            body: body.into(),
        }));
        self
    }

    pub fn with_json(self, status: u16, body: serde_json::Value) -> Self {
        self.with_response(status, body.to_string())
    }

    /// Queue a reply that behaves as if the caller's context was cancelled.
    pub fn with_cancellation(mut self) -> Self {
        self.responses.push_back(MockReply::Cancelled);
        self
    }

    pub fn build(self) -> MockTransport {
        MockTransport {
            responses: Mutex::new(self.responses),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        ctx: &RequestContext,
        request: HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        if ctx.is_cancelled() {
            return Err(TransportError::Cancelled);
        }
        self.requests.lock().await.push(request);

        let reply = match self.responses.lock().await.pop_front() {
            Some(reply) => {
                *self.last.lock().await = Some(reply.clone());
                reply
            }
            None => self
                .last
                .lock()
                .await
                .clone()
                .expect("mock transport has no queued responses"),
        };

        match reply {
            MockReply::Response(response) => Ok(response),
            MockReply::Cancelled => Err(TransportError::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_in_order_then_repeats_last() {
        let transport = MockTransport::builder()
            .with_response(500, "first")
            .with_response(200, "second")
            .build();
        let ctx = RequestContext::background();
        let req = || HttpRequest::post("http://mock/gql", Vec::new());

        assert_eq!(transport.send(&ctx, req()).await.unwrap().status, 500);
        assert_eq!(transport.send(&ctx, req()).await.unwrap().status, 200);
        assert_eq!(transport.send(&ctx, req()).await.unwrap().body, b"second");
        assert_eq!(transport.requests().await.len(), 3);
    }
}
