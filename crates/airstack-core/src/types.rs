//! Domain types for Airstack queries.
//!
//! Contains the query variable map, the decoded `TokenBalance` record, and a
//! typed builder for the token-balance query's variables.

use serde::{Deserialize, Deserializer, Serialize};

/// GraphQL variables, keyed by name without the leading `$`.
///
/// Values are arbitrary JSON and are only checked when the request body is
/// serialized.
pub type Variables = serde_json::Map<String, serde_json::Value>;

// ==============================================================================
// Token Type
// ==============================================================================

/// Token standard filter accepted by `TokenBalances`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    #[serde(rename = "ERC20")]
    Erc20,
    #[serde(rename = "ERC721")]
    Erc721,
    #[serde(rename = "ERC1155")]
    Erc1155,
}

impl TokenType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Erc20 => "ERC20",
            Self::Erc721 => "ERC721",
            Self::Erc1155 => "ERC1155",
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TokenType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ERC20" => Ok(Self::Erc20),
            "ERC721" => Ok(Self::Erc721),
            "ERC1155" => Ok(Self::Erc1155),
            other => Err(format!(
                "unknown token type `{other}`; expected ERC20, ERC721 or ERC1155"
            )),
        }
    }
}

// ==============================================================================
// Token Balance
// ==============================================================================

/// One token holding as reported by `TokenBalances`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    /// Raw integer amount in the token's base unit.
    pub amount: String,
    /// Amount scaled by the token's decimals. The API may send a number.
    #[serde(default, deserialize_with = "lenient_string")]
    pub formatted_amount: String,
    pub blockchain: String,
    pub token_address: String,
    /// Empty for fungible tokens.
    #[serde(default, deserialize_with = "lenient_string")]
    pub token_id: String,
}

/// Accept a string, a number, or `null` (as an empty string).
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(String::new()),
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

// ==============================================================================
// Token Balances Query Variables
// ==============================================================================

/// Typed construction of the variables `get_token_balances` expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalancesQuery {
    pub identity: String,
    pub token_types: Vec<TokenType>,
    pub blockchain: String,
    pub limit: u32,
    pub cursor: Option<String>,
}

impl TokenBalancesQuery {
    pub fn new(identity: impl Into<String>, blockchain: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            token_types: vec![TokenType::Erc20, TokenType::Erc721],
            blockchain: blockchain.into(),
            limit: 10,
            cursor: None,
        }
    }

    pub fn token_types(mut self, token_types: impl IntoIterator<Item = TokenType>) -> Self {
        self.token_types = token_types.into_iter().collect();
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn into_variables(self) -> Variables {
        let mut vars = Variables::new();
        vars.insert("identity".into(), self.identity.into());
        vars.insert(
            "tokenType".into(),
            self.token_types
                .iter()
                .map(|t| serde_json::Value::from(t.as_str()))
                .collect(),
        );
        vars.insert("blockchain".into(), self.blockchain.into());
        vars.insert("limit".into(), self.limit.into());
        if let Some(cursor) = self.cursor {
            vars.insert("cursor".into(), cursor.into());
        }
        vars
    }
}
