pub mod balances;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod response;
#[cfg(test)]
mod test_util;
pub mod transport;
pub mod types;

pub use balances::{TokenBalancePage, TOKEN_BALANCES_QUERY};
pub use client::GraphqlClient;
pub use config::{ClientConfig, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
pub use context::RequestContext;
pub use error::{ClientError, TransportError};
pub use response::{PageContinuation, PageInfo, QueryOutcome, QueryResponse};
pub use types::{TokenBalance, TokenBalancesQuery, TokenType, Variables};
