use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use tracing::{debug, trace, warn};

use crate::config::{parse_endpoint, ClientConfig};
use crate::context::RequestContext;
use crate::error::ClientError;
use crate::response::QueryResponse;
use crate::transport::{HttpRequest, HttpTransport, Transport};
use crate::types::Variables;

/// Airstack GraphQL client.
///
/// Holds the API key, the endpoint, and a shared transport. Cloning is cheap
/// and clones are independent; page continuations carry one.
#[derive(Clone)]
pub struct GraphqlClient {
    api_key: Arc<str>,
    endpoint: Arc<str>,
    transport: Arc<dyn Transport>,
}

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: &'a Variables,
}

/// A 200 body. Both fields keep their wire text; `null` reads as absent.
#[derive(Deserialize, Default)]
struct GraphqlEnvelope {
    data: Option<Box<RawValue>>,
    errors: Option<Box<RawValue>>,
}

impl GraphqlClient {
    /// Client for the production endpoint with default settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_config(api_key, ClientConfig::default())
    }

    pub fn with_config(
        api_key: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(&config)?;
        Self::with_transport(api_key, &config.endpoint, Arc::new(transport))
    }

    pub fn with_transport(
        api_key: impl Into<String>,
        endpoint: &str,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ClientError> {
        parse_endpoint(endpoint)?;
        let api_key: String = api_key.into();
        Ok(Self {
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            transport,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run one GraphQL query.
    ///
    /// Transport and envelope-decode failures are returned as `Err`. A
    /// non-200 status or a GraphQL `errors` field is returned as `Ok` with
    /// the failure recorded in the response's [`QueryOutcome`].
    ///
    /// [`QueryOutcome`]: crate::response::QueryOutcome
    pub async fn execute_query(
        &self,
        ctx: &RequestContext,
        query: &str,
        variables: Variables,
    ) -> Result<QueryResponse, ClientError> {
        self.execute_shared(ctx, Arc::from(query), variables).await
    }

    pub(crate) async fn execute_shared(
        &self,
        ctx: &RequestContext,
        query: Arc<str>,
        variables: Variables,
    ) -> Result<QueryResponse, ClientError> {
        let body = serde_json::to_vec(&GraphqlRequest {
            query: &query,
            variables: &variables,
        })
        .map_err(ClientError::Encode)?;

        let request = HttpRequest::post(&*self.endpoint, body)
            .header("Content-Type", "application/json")
            .header("Authorization", &*self.api_key);

        debug!(
            graphql.operation = operation_name(&query).unwrap_or("anonymous"),
            graphql.variables = variables.len(),
            "graphql query"
        );
        let response = self.transport.send(ctx, request).await?;

        if !response.is_success() {
            let detail = match response.check_error_body() {
                Ok(()) => response.body_text(),
                Err(err) => {
                    warn!(status = response.status, error = %err, "non-JSON error body");
                    format!("{err}; body={}", response.body_text())
                }
            };
            debug!(status = response.status, "graphql request failed");
            return Ok(QueryResponse::api_error(
                response.status,
                format!("HTTP error: {detail}, Status Code: {}", response.status),
            ));
        }

        // A bare `null` body carries neither data nor errors.
        let envelope: Option<GraphqlEnvelope> =
            serde_json::from_slice(&response.body).map_err(|e| {
                ClientError::Decode(format!(
                    "GraphQL response envelope: {e}; body={}",
                    response.body_text()
                ))
            })?;
        let GraphqlEnvelope { data, errors } = envelope.unwrap_or_default();

        if let Some(errors) = errors {
            debug!(status = response.status, "graphql errors in response");
            trace!(errors = errors.get(), "graphql errors");
            return Ok(QueryResponse::api_error(
                response.status,
                errors.get().to_owned(),
            ));
        }

        let data = data.unwrap_or_else(|| RawValue::NULL.to_owned());
        Ok(QueryResponse::from_data(response.status, data).with_continuations(
            self,
            ctx,
            query,
            variables,
        ))
    }
}

impl std::fmt::Debug for GraphqlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphqlClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// The name after `query`/`mutation` in a named operation, for logging.
fn operation_name(query: &str) -> Option<&str> {
    let mut words = query.split_whitespace();
    match words.next()? {
        "query" | "mutation" => {}
        _ => return None,
    }
    let name = words.next()?;
    let end = name.find(['(', '{']).unwrap_or(name.len());
    Some(&name[..end]).filter(|name| !name.is_empty())
}
