//! Access to the ledger: the [`SuiApi`] seam and its JSON-RPC implementation.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::{debug, info};
use url::Url;

use crate::{
    Network,
    error::{Error, Result},
    types::{Address, Coin, DryRunResult, ExecutionResult, ObjectId, ObjectInfo, Page, str_u64},
};

/// Read and write operations the toolkit needs from a fullnode.
pub trait SuiApi: Sync {
    /// Returns `None` when the object does not exist or was deleted.
    fn get_object(&self, id: ObjectId) -> impl Future<Output = Result<Option<ObjectInfo>>> + Send;

    /// One page of the coins of the given type owned by `owner`.
    fn get_coins(
        &self,
        owner: Address,
        coin_type: &str,
        cursor: Option<&str>,
    ) -> impl Future<Output = Result<Page<Coin>>> + Send;

    fn latest_epoch(&self) -> impl Future<Output = Result<u64>> + Send;

    fn reference_gas_price(&self) -> impl Future<Output = Result<u64>> + Send;

    fn dry_run(&self, tx_bytes: &[u8]) -> impl Future<Output = Result<DryRunResult>> + Send;

    fn execute(
        &self,
        tx_bytes: &[u8],
        signatures: &[String],
    ) -> impl Future<Output = Result<ExecutionResult>> + Send;

    /// Follows the pagination cursor until every coin is collected.
    fn get_all_coins(
        &self,
        owner: Address,
        coin_type: &str,
    ) -> impl Future<Output = Result<Vec<Coin>>> + Send {
        async move {
            let mut coins = vec![];
            let mut cursor: Option<String> = None;
            loop {
                let page = self.get_coins(owner, coin_type, cursor.as_deref()).await?;
                coins.extend(page.data);
                match page.next_cursor {
                    Some(next) if page.has_next_page => cursor = Some(next),
                    _ => return Ok(coins),
                }
            }
        }
    }
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct ObjectResponse {
    data: Option<ObjectInfo>,
}

#[derive(Deserialize)]
struct SystemState {
    #[serde(deserialize_with = "str_u64::deserialize")]
    epoch: u64,
}

#[derive(Deserialize)]
struct BigInt(#[serde(deserialize_with = "str_u64::deserialize")] u64);

/// JSON-RPC client of a Sui fullnode.
#[derive(Clone, derive_more::Debug)]
pub struct RpcClient {
    #[debug(skip)]
    http: reqwest::Client,
    #[debug("{url}")]
    url: Url,
    mvr_url: Option<Url>,
    network: Option<Network>,
    #[debug(skip)]
    next_id: Arc<AtomicU64>,
}

impl RpcClient {
    pub fn new(url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
            mvr_url: None,
            network: None,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn network(&self) -> Option<Network> {
        self.network
    }

    /// Move registry endpoint used for named package resolution.
    pub fn mvr_url(&self) -> Option<&Url> {
        self.mvr_url.as_ref()
    }

    /// Performs a single JSON-RPC call.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(%method, id, "JSON-RPC request");
        let response: RpcResponse<T> = self
            .http
            .post(self.url.clone())
            .json(&json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": method,
                "params": params,
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if let Some(err) = response.error {
            return Err(Error::from_rpc(err.code, err.message));
        }
        response.result.ok_or(Error::NullResp)
    }
}

impl SuiApi for RpcClient {
    async fn get_object(&self, id: ObjectId) -> Result<Option<ObjectInfo>> {
        let response: ObjectResponse = self
            .call(
                "sui_getObject",
                json!([id, { "showType": true, "showOwner": true }]),
            )
            .await?;
        Ok(response.data)
    }

    async fn get_coins(
        &self,
        owner: Address,
        coin_type: &str,
        cursor: Option<&str>,
    ) -> Result<Page<Coin>> {
        self.call("suix_getCoins", json!([owner, coin_type, cursor, null]))
            .await
    }

    async fn latest_epoch(&self) -> Result<u64> {
        let state: SystemState = self.call("suix_getLatestSuiSystemState", json!([])).await?;
        Ok(state.epoch)
    }

    async fn reference_gas_price(&self) -> Result<u64> {
        let price: BigInt = self.call("suix_getReferenceGasPrice", json!([])).await?;
        Ok(price.0)
    }

    async fn dry_run(&self, tx_bytes: &[u8]) -> Result<DryRunResult> {
        self.call("sui_dryRunTransactionBlock", json!([BASE64.encode(tx_bytes)]))
            .await
    }

    async fn execute(&self, tx_bytes: &[u8], signatures: &[String]) -> Result<ExecutionResult> {
        self.call(
            "sui_executeTransactionBlock",
            json!([
                BASE64.encode(tx_bytes),
                signatures,
                { "showEffects": true, "showObjectChanges": true },
                "WaitForLocalExecution",
            ]),
        )
        .await
    }
}

/// Returns a client for `network`, bound to `rpc_url` when supplied.
pub fn client(network: Network, rpc_url: Option<&Url>) -> Result<RpcClient> {
    let url = match rpc_url {
        Some(url) => url.clone(),
        None => Url::parse(network.fullnode_url())
            .map_err(|e| Error::Config(format!("fullnode url of {network}: {e}")))?,
    };
    let mvr_url = network.mvr_url().and_then(|u| Url::parse(u).ok());
    info!(%network, %url, "Connecting to fullnode");
    Ok(RpcClient {
        mvr_url,
        network: Some(network),
        ..RpcClient::new(url)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_defaults_to_network_url() {
        let client = client(Network::Testnet, None).unwrap();
        assert_eq!(client.url().as_str(), "https://fullnode.testnet.sui.io/");
        assert_eq!(
            client.mvr_url().map(Url::as_str),
            Some("https://testnet.mvr.mystenlabs.com/")
        );
        assert_eq!(client.network(), Some(Network::Testnet));
    }

    #[test]
    fn test_client_honours_override() {
        let custom = Url::parse("http://10.0.0.7:9000").unwrap();
        let client = client(Network::Localnet, Some(&custom)).unwrap();
        assert_eq!(client.url(), &custom);
        assert!(client.mvr_url().is_none());
    }

    #[test]
    fn test_response_envelope() {
        let ok: RpcResponse<BigInt> =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":"750"}"#).unwrap();
        assert_eq!(ok.result.map(|p| p.0), Some(750));

        let err: RpcResponse<BigInt> = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":2,"error":{"code":-32602,"message":"Invalid params"}}"#,
        )
        .unwrap();
        assert!(err.result.is_none());
        assert_eq!(err.error.map(|e| e.code), Some(-32602));

        let state: SystemState =
            serde_json::from_str(r#"{"epoch":"412","protocolVersion":"68"}"#).unwrap();
        assert_eq!(state.epoch, 412);
    }
}
