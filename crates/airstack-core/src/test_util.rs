//! Shared test helpers for `airstack-core` unit tests.
//!
//! Builders for canned GraphQL response bodies so tests across modules share
//! one source of truth for fixture shapes.

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_ENDPOINT: &str = "http://mock.airstack.test/gql";

// ==============================================================================
// Token Balance Fixtures
// ==============================================================================

/// One `TokenBalance` object as the API returns it.
pub fn token_balance_json(amount: &str, token_address: &str) -> serde_json::Value {
    serde_json::json!({
        "amount": amount,
        "formattedAmount": "1.0",
        "blockchain": "ethereum",
        "tokenAddress": token_address,
        "tokenId": ""
    })
}

/// A full success body for `TokenBalances`, with optional cursors.
pub fn token_balances_body(
    balances: Vec<serde_json::Value>,
    next_cursor: Option<&str>,
    prev_cursor: Option<&str>,
) -> serde_json::Value {
    serde_json::json!({
        "data": {
            "TokenBalances": {
                "TokenBalance": balances,
                "pageInfo": {
                    "nextCursor": next_cursor.unwrap_or(""),
                    "prevCursor": prev_cursor.unwrap_or("")
                }
            }
        }
    })
}

// ==============================================================================
// Generic Page Fixtures
// ==============================================================================

/// A paged success body whose items are bare strings under `Items.item`.
pub fn page_json(
    items: &[&str],
    next_cursor: Option<&str>,
    prev_cursor: Option<&str>,
) -> serde_json::Value {
    serde_json::json!({
        "data": {
            "Items": {
                "item": items,
                "pageInfo": {
                    "nextCursor": next_cursor,
                    "prevCursor": prev_cursor
                }
            }
        }
    })
}

/// Raw JSON text as the client stores a `data` field.
pub fn raw(text: &str) -> Box<serde_json::value::RawValue> {
    serde_json::value::RawValue::from_string(text.to_owned()).expect("fixture must be valid JSON")
}
