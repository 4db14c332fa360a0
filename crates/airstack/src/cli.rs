use airstack_core::TokenType;
use clap::Parser;

/// Airstack token balances: list the tokens an address or identity holds.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Airstack API key, sent verbatim in the Authorization header.
    #[arg(long, env = "AIRSTACK_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// GraphQL endpoint URL.
    #[arg(
        long,
        default_value = airstack_core::DEFAULT_ENDPOINT,
        env = "AIRSTACK_ENDPOINT"
    )]
    pub endpoint: String,

    /// Owner address, ENS name, or other Airstack identity.
    #[arg(long)]
    pub identity: String,

    /// Token standards to include (repeatable).
    #[arg(long = "token-type", default_values = ["ERC20", "ERC721"])]
    pub token_types: Vec<TokenType>,

    /// Chain to query.
    #[arg(long, default_value = "ethereum")]
    pub blockchain: String,

    /// Maximum balances per page.
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: u32,

    /// Number of pages to fetch, following next-page cursors.
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,

    /// Whole-request timeout in seconds.
    #[arg(long, default_value = "60")]
    pub timeout_secs: u64,

    /// Client-side request rate limit.
    #[arg(long)]
    pub requests_per_second: Option<u32>,

    /// Print balances as JSON lines instead of text.
    #[arg(long)]
    pub json: bool,
}
