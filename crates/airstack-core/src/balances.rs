//! The `TokenBalances` convenience query.

use serde::Deserialize;
use tracing::debug;

use crate::client::GraphqlClient;
use crate::context::RequestContext;
use crate::error::ClientError;
use crate::response::QueryResponse;
use crate::types::{TokenBalance, Variables};

/// Token holdings of `$identity`, filtered by token type and chain.
///
/// `$cursor` is optional; page continuations set it.
pub const TOKEN_BALANCES_QUERY: &str = r#"
query GetTokensHeldByWalletAddress($identity: Identity, $tokenType: [TokenType!], $blockchain: TokenBlockchain!, $limit: Int, $cursor: String) {
  TokenBalances(
    input: {filter: {owner: {_eq: $identity}, tokenType: {_in: $tokenType}}, blockchain: $blockchain, limit: $limit, cursor: $cursor}
  ) {
    TokenBalance {
      amount
      formattedAmount
      blockchain
      tokenAddress
      tokenId
    }
    pageInfo {
      nextCursor
      prevCursor
    }
  }
}
"#;

#[derive(Deserialize)]
struct TokenBalancesData {
    #[serde(rename = "TokenBalances")]
    token_balances: Option<TokenBalancesField>,
}

#[derive(Deserialize)]
struct TokenBalancesField {
    /// `null` when the owner holds nothing matching the filter.
    #[serde(rename = "TokenBalance")]
    token_balance: Option<Vec<TokenBalance>>,
}

/// One page of balances plus the envelope it came from, for paging on.
#[derive(Debug)]
pub struct TokenBalancePage {
    pub balances: Vec<TokenBalance>,
    pub response: QueryResponse,
}

impl TokenBalancePage {
    /// Fetch and decode the following page, if the server reported one.
    pub async fn next(&self) -> Option<Result<TokenBalancePage, ClientError>> {
        let continuation = self.response.next_page()?;
        Some(continuation.fetch().await.and_then(decode_page))
    }

    pub async fn prev(&self) -> Option<Result<TokenBalancePage, ClientError>> {
        let continuation = self.response.prev_page()?;
        Some(continuation.fetch().await.and_then(decode_page))
    }
}

impl GraphqlClient {
    /// Fetch token balances for the owner and filters in `variables`.
    ///
    /// Expects `identity`, `tokenType`, `blockchain` and `limit`; missing keys
    /// are not checked here and come back as an API or decode error.
    pub async fn get_token_balances(
        &self,
        ctx: &RequestContext,
        variables: Variables,
    ) -> Result<Vec<TokenBalance>, ClientError> {
        Ok(self.get_token_balances_page(ctx, variables).await?.balances)
    }

    pub async fn get_token_balances_page(
        &self,
        ctx: &RequestContext,
        variables: Variables,
    ) -> Result<TokenBalancePage, ClientError> {
        let response = self
            .execute_query(ctx, TOKEN_BALANCES_QUERY, variables)
            .await?;
        decode_page(response)
    }
}

fn decode_page(response: QueryResponse) -> Result<TokenBalancePage, ClientError> {
    let data: TokenBalancesData = response.decode_data()?;
    let balances = data
        .token_balances
        .and_then(|field| field.token_balance)
        .unwrap_or_default();
    debug!(
        balances = balances.len(),
        has_next_page = response.has_next_page(),
        "decoded token balances"
    );
    Ok(TokenBalancePage { balances, response })
}
