//! Readiness checks and faucet funding for a local network.

use std::time::Duration;

use serde_json::json;
use tracing::{debug, info};
use url::Url;

use crate::{
    error::{Error, Result},
    retry::poll_until,
    types::Address,
};

pub const FULLNODE_URL: &str = "http://127.0.0.1:9000";
pub const FAUCET_URL: &str = "http://127.0.0.1:9123/gas";

pub const POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const STARTUP_TIMEOUT: Duration = Duration::from_secs(60);

/// Waits until the fullnode answers a JSON-RPC request with a 2xx status.
pub async fn wait_for_fullnode(http: &reqwest::Client, url: &Url) -> Result<()> {
    info!(%url, "Waiting for localnet");
    poll_until(POLL_INTERVAL, STARTUP_TIMEOUT, tokio::time::sleep, move || async move {
        let response = http
            .post(url.clone())
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "sui_getLatestCheckpointSequenceNumber",
            }))
            .send()
            .await;
        match response {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(%e, "Fullnode not ready");
                false
            }
        }
    })
    .await
}

/// Waits until the faucet answers at all; error statuses count as up.
pub async fn wait_for_faucet(http: &reqwest::Client, url: &Url) -> Result<()> {
    info!(%url, "Waiting for faucet");
    poll_until(POLL_INTERVAL, STARTUP_TIMEOUT, tokio::time::sleep, move || async move {
        http.post(url.clone()).json(&json!({})).send().await.is_ok()
    })
    .await
}

/// Requests a fixed amount of SUI for `recipient`.
pub async fn fund_address(http: &reqwest::Client, faucet: &Url, recipient: Address) -> Result<()> {
    info!(%recipient, "Requesting faucet funds");
    let response = http
        .post(faucet.clone())
        .json(&json!({ "FixedAmountRequest": { "recipient": recipient } }))
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Faucet(format!("{status}: {body}")));
    }
    info!(%recipient, "Faucet funded successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints_parse() {
        let fullnode = Url::parse(FULLNODE_URL).unwrap();
        assert_eq!(fullnode.port(), Some(9000));
        assert_eq!(fullnode.as_str(), "http://127.0.0.1:9000/");
        let faucet = Url::parse(FAUCET_URL).unwrap();
        assert_eq!(faucet.path(), "/gas");
    }
}
