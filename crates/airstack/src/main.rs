mod cli;

use std::time::Duration;

use clap::Parser;
use eyre::{eyre, WrapErr};

use airstack_core::transport::UNPROCESSABLE_ENTITY_STATUS;
use airstack_core::{
    ClientConfig, ClientError, GraphqlClient, RequestContext, TokenBalance, TokenBalancesQuery,
};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let config = ClientConfig::default()
        .with_endpoint(args.endpoint.clone())
        .with_timeout(Duration::from_secs(args.timeout_secs))
        .with_requests_per_second(args.requests_per_second);
    let client = GraphqlClient::with_config(args.api_key.as_str(), config)
        .wrap_err("build Airstack client")?;

    let variables = TokenBalancesQuery::new(&args.identity, &args.blockchain)
        .token_types(args.token_types.iter().copied())
        .limit(args.limit)
        .into_variables();

    let ctx = RequestContext::background();
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling token balance lookup");
            interrupt.cancel();
        }
    });

    let mut page = client
        .get_token_balances_page(&ctx, variables)
        .await
        .map_err(|err| query_error(&args.endpoint, err))?;

    let mut fetched = 1;
    let mut total = 0;
    loop {
        total += page.balances.len();
        for balance in &page.balances {
            print_balance(balance, args.json)?;
        }

        if fetched >= args.pages {
            break;
        }
        match page.next().await {
            Some(next) => {
                page = next.map_err(|err| query_error(&args.endpoint, err))?;
                fetched += 1;
            }
            None => break,
        }
    }

    tracing::info!(
        identity = %args.identity,
        blockchain = %args.blockchain,
        pages = fetched,
        balances = total,
        "token balance lookup complete"
    );
    Ok(())
}

fn print_balance(balance: &TokenBalance, json: bool) -> eyre::Result<()> {
    if json {
        let line = serde_json::to_string(balance).wrap_err("encode balance as JSON")?;
        println!("{line}");
    } else {
        println!(
            "Token Address: {}, Amount: {}",
            balance.token_address, balance.amount
        );
    }
    Ok(())
}

fn query_error(endpoint: &str, err: ClientError) -> eyre::Report {
    let hint = match &err {
        ClientError::Transport(transport) if transport.is_cancellation() => {
            Some("hint: the lookup was interrupted before the API answered".into())
        }
        ClientError::Transport(_) => format_connect_hint(&err.to_string()),
        ClientError::Api { status, .. } => format_status_hint(*status),
        _ => None,
    };
    let mut lines = vec![
        format!("token balance query against `{endpoint}` failed"),
        format!("error: {err}"),
    ];
    lines.extend(hint);
    eyre!(lines.join("\n"))
}

fn format_connect_hint(source_error: &str) -> Option<String> {
    if source_error.contains("dns error") || source_error.contains("Could not resolve host") {
        Some("hint: hostname resolution failed; verify the endpoint hostname and your DNS/network".into())
    } else if source_error.contains("certificate") || source_error.contains("tls") {
        Some("hint: TLS handshake failed; verify certificate trust and that the endpoint uses HTTPS".into())
    } else if source_error.contains("timed out") || source_error.contains("deadline") {
        Some("hint: the request timed out; retry later or raise --timeout-secs".into())
    } else if source_error.contains("error sending request for url") {
        Some("hint: request could not be sent; verify URL format, network access, and endpoint reachability".into())
    } else {
        None
    }
}

fn format_status_hint(status: u16) -> Option<String> {
    match status {
        401 | 403 => Some("hint: authentication failed; verify --api-key / AIRSTACK_API_KEY".into()),
        404 => Some("hint: endpoint path is invalid; verify --endpoint".into()),
        UNPROCESSABLE_ENTITY_STATUS => Some("hint: the API rejected the query variables; check --identity and --blockchain".into()),
        429 => Some("hint: rate limited; lower --requests-per-second".into()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_hints_cover_auth_and_validation() {
        assert!(format_status_hint(401).unwrap().contains("api-key"));
        assert!(format_status_hint(UNPROCESSABLE_ENTITY_STATUS)
            .unwrap()
            .contains("variables"));
        assert!(format_status_hint(200).is_none());
    }

    #[test]
    fn connect_hint_recognises_dns_failure() {
        let hint = format_connect_hint("error sending request: dns error: failed to lookup")
            .expect("dns failure must produce a hint");
        assert!(hint.contains("hostname resolution"));
    }

    #[test]
    fn query_error_includes_endpoint_and_hint() {
        let report = query_error(
            "https://api.airstack.xyz/gql",
            ClientError::Api {
                status: 403,
                message: "forbidden".into(),
            },
        );
        let rendered = report.to_string();
        assert!(rendered.contains("https://api.airstack.xyz/gql"));
        assert!(rendered.contains("authentication failed"));
    }

    #[test]
    fn query_error_reports_interruption() {
        let report = query_error(
            "https://api.airstack.xyz/gql",
            ClientError::Transport(airstack_core::TransportError::Cancelled),
        );
        assert!(report.to_string().contains("interrupted"));
        assert!(!report.to_string().contains("hostname resolution"));
    }

    #[test]
    fn cli_parses_repeated_token_types() {
        let args = cli::Cli::try_parse_from([
            "airstack",
            "--api-key",
            "k",
            "--identity",
            "vitalik.eth",
            "--token-type",
            "erc1155",
            "--token-type",
            "ERC20",
        ])
        .expect("arguments must parse");
        assert_eq!(
            args.token_types,
            vec![
                airstack_core::TokenType::Erc1155,
                airstack_core::TokenType::Erc20
            ]
        );
        assert_eq!(args.limit, 10);
        assert_eq!(args.endpoint, airstack_core::DEFAULT_ENDPOINT);
    }
}
