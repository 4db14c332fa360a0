//! The query result envelope.
//!
//! A [`QueryResponse`] carries exactly one of usable data or an API-level
//! error, the HTTP status, and page metadata. Continuations for adjacent
//! pages exist only when the server reported a cursor for them.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

use crate::client::GraphqlClient;
use crate::context::RequestContext;
use crate::error::ClientError;
use crate::types::Variables;

/// Variable the continuations set when replaying a query.
pub const CURSOR_VARIABLE: &str = "cursor";

// ==============================================================================
// Outcome
// ==============================================================================

#[derive(Debug, Clone)]
pub enum QueryOutcome {
    /// The response's `data` field exactly as it appeared on the wire.
    /// `null` if the server omitted it.
    Data(Box<RawValue>),
    /// A failure status or a GraphQL `errors` field.
    ApiError { status: u16, message: String },
}

impl PartialEq for QueryOutcome {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Data(a), Self::Data(b)) => a.get() == b.get(),
            (
                Self::ApiError { status, message },
                Self::ApiError {
                    status: other_status,
                    message: other_message,
                },
            ) => status == other_status && message == other_message,
            _ => false,
        }
    }
}

// ==============================================================================
// Page Info
// ==============================================================================

/// Cursors reported in a `pageInfo { nextCursor prevCursor }` selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub next_cursor: Option<String>,
    pub prev_cursor: Option<String>,
}

impl PageInfo {
    /// Read the first `pageInfo` object found on a top-level field of `data`.
    ///
    /// Top-level fields are visited in the order the server sent them, so a
    /// query with several paged roots pages the first one. Empty and `null`
    /// cursors count as absent.
    pub fn from_data(data: &RawValue) -> Self {
        serde_json::from_str::<serde_json::Value>(data.get())
            .map(|value| Self::from_value(&value))
            .unwrap_or_default()
    }

    /// Same as [`PageInfo::from_data`], for an already parsed `data` value.
    pub fn from_value(data: &serde_json::Value) -> Self {
        let Some(fields) = data.as_object() else {
            return Self::default();
        };

        fields
            .values()
            .find_map(|field| field.get("pageInfo").filter(|p| p.is_object()))
            .map(|page_info| Self {
                next_cursor: cursor_field(page_info, "nextCursor"),
                prev_cursor: cursor_field(page_info, "prevCursor"),
            })
            .unwrap_or_default()
    }

    pub fn has_next_page(&self) -> bool {
        self.next_cursor.is_some()
    }

    pub fn has_prev_page(&self) -> bool {
        self.prev_cursor.is_some()
    }
}

fn cursor_field(page_info: &serde_json::Value, key: &str) -> Option<String> {
    page_info
        .get(key)
        .and_then(serde_json::Value::as_str)
        .filter(|cursor| !cursor.is_empty())
        .map(str::to_owned)
}

// ==============================================================================
// Query Response
// ==============================================================================

#[derive(Debug)]
pub struct QueryResponse {
    status: u16,
    outcome: QueryOutcome,
    page_info: PageInfo,
    next: Option<PageContinuation>,
    prev: Option<PageContinuation>,
}

impl QueryResponse {
    pub(crate) fn api_error(status: u16, message: String) -> Self {
        Self {
            status,
            outcome: QueryOutcome::ApiError { status, message },
            page_info: PageInfo::default(),
            next: None,
            prev: None,
        }
    }

    pub(crate) fn from_data(status: u16, data: Box<RawValue>) -> Self {
        let page_info = PageInfo::from_data(&data);
        Self {
            status,
            outcome: QueryOutcome::Data(data),
            page_info,
            next: None,
            prev: None,
        }
    }

    /// Attach replayable continuations for whichever cursors are present.
    pub(crate) fn with_continuations(
        mut self,
        client: &GraphqlClient,
        ctx: &RequestContext,
        query: Arc<str>,
        variables: Variables,
    ) -> Self {
        let make = |cursor: &str| PageContinuation {
            client: client.clone(),
            ctx: ctx.clone(),
            query: Arc::clone(&query),
            variables: variables.clone(),
            cursor: cursor.to_owned(),
        };
        self.next = self.page_info.next_cursor.as_deref().map(&make);
        self.prev = self.page_info.prev_cursor.as_deref().map(&make);
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn outcome(&self) -> &QueryOutcome {
        &self.outcome
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, QueryOutcome::Data(_))
    }

    /// The raw `data` text; [`RawValue::get`] returns it byte for byte.
    pub fn data(&self) -> Option<&RawValue> {
        match &self.outcome {
            QueryOutcome::Data(data) => Some(data),
            QueryOutcome::ApiError { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            QueryOutcome::Data(_) => None,
            QueryOutcome::ApiError { message, .. } => Some(message),
        }
    }

    pub fn page_info(&self) -> &PageInfo {
        &self.page_info
    }

    pub fn has_next_page(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_prev_page(&self) -> bool {
        self.prev.is_some()
    }

    pub fn next_page(&self) -> Option<&PageContinuation> {
        self.next.as_ref()
    }

    pub fn prev_page(&self) -> Option<&PageContinuation> {
        self.prev.as_ref()
    }

    /// Collapse the envelope into a single result, turning an API error into
    /// [`ClientError::Api`].
    pub fn into_data(self) -> Result<Box<RawValue>, ClientError> {
        match self.outcome {
            QueryOutcome::Data(data) => Ok(data),
            QueryOutcome::ApiError { status, message } => Err(ClientError::Api { status, message }),
        }
    }

    pub fn decode_data<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        match &self.outcome {
            QueryOutcome::Data(data) => serde_json::from_str(data.get())
                .map_err(|e| ClientError::Decode(format!("unexpected data shape: {e}"))),
            QueryOutcome::ApiError { status, message } => Err(ClientError::Api {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

// ==============================================================================
// Page Continuation
// ==============================================================================

/// A deferred fetch of an adjacent page.
///
/// Replays the same query and variables with `cursor` set, through the
/// same client and under the same [`RequestContext`].
#[derive(Clone)]
pub struct PageContinuation {
    client: GraphqlClient,
    ctx: RequestContext,
    query: Arc<str>,
    variables: Variables,
    cursor: String,
}

impl PageContinuation {
    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    pub fn variables(&self) -> Variables {
        let mut variables = self.variables.clone();
        variables.insert(CURSOR_VARIABLE.to_owned(), self.cursor.clone().into());
        variables
    }

    pub async fn fetch(&self) -> Result<QueryResponse, ClientError> {
        self.client
            .execute_shared(&self.ctx, Arc::clone(&self.query), self.variables())
            .await
    }
}

impl std::fmt::Debug for PageContinuation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageContinuation")
            .field("cursor", &self.cursor)
            .field("variables", &self.variables.len())
            .finish_non_exhaustive()
    }
}
