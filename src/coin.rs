//! Coin consolidation and the per-network coin table.

use itertools::Itertools;
use tracing::{info, warn};

use crate::{
    Network,
    builder::TransactionBuilder,
    crypto::Keypair,
    error::{Error, Result},
    execute::sign_and_execute,
    num::Converter,
    rpc::SuiApi,
    types::{Address, ObjectId, SUI_COIN_TYPE},
};

/// Returns the first coin of `coin_type` owned by `owner`.
pub async fn owned_coin<A: SuiApi>(
    api: &A,
    owner: Address,
    coin_type: &str,
) -> Result<Option<ObjectId>> {
    let page = api.get_coins(owner, coin_type, None).await?;
    Ok(page.data.first().map(|c| c.coin_object_id))
}

/// Largest number of coins merged into the base coin by one transaction.
///
/// Sui caps a single command at 511 arguments.
pub const MAX_MERGE_SOURCES: usize = 500;

/// Merges up to [`MAX_MERGE_SOURCES`] coins of `coin_type` owned by
/// `owner`, except `gas_coin`, into the first one.
///
/// Coins are read page by page only until a full batch is collected.
/// Returns `true` when a merge transaction was executed and another round
/// may be needed, `false` once at most one coin is left.
pub async fn merge_owned_coins<A: SuiApi>(
    api: &A,
    signer: &Keypair,
    owner: Address,
    coin_type: &str,
    gas_coin: ObjectId,
) -> Result<bool> {
    let mut coins = vec![];
    let mut found = 0usize;
    let mut cursor: Option<String> = None;
    loop {
        let page = api.get_coins(owner, coin_type, cursor.as_deref()).await?;
        found += page.data.len();
        coins.extend(page.data.into_iter().filter(|c| c.coin_object_id != gas_coin));
        if coins.len() > MAX_MERGE_SOURCES || !page.has_next_page {
            break;
        }
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    if found == 0 {
        warn!(%owner, %coin_type, "No coins found");
        return Ok(false);
    }
    coins.truncate(MAX_MERGE_SOURCES + 1);
    let Some((base, rest)) = coins.split_first().filter(|(_, rest)| !rest.is_empty()) else {
        return Ok(false);
    };

    let gas = api
        .get_object(gas_coin)
        .await?
        .ok_or(Error::ObjectNotFound(gas_coin))?;

    let mut builder = TransactionBuilder::new();
    builder
        .set_sender(signer.address())
        .set_gas_owner(owner)
        .set_gas_payment(vec![gas.object_ref()]);
    let target = builder.object_ref(base.object_ref())?;
    let sources = rest
        .iter()
        .map(|c| builder.object_ref(c.object_ref()))
        .collect::<Result<Vec<_>>>()?;
    builder.merge_coins(target, sources)?;

    info!(
        %coin_type,
        base = %base.coin_object_id,
        merged = rest.len(),
        "Merging coins"
    );
    let result = sign_and_execute(api, signer, &mut builder).await?;
    info!(
        digest = %result.digest,
        effects = ?result.effects,
        changes = result.object_changes.as_ref().map(Vec::len).unwrap_or_default(),
        "Merge executed"
    );
    Ok(true)
}

/// Repeats [`merge_owned_coins`] until it reports nothing left to merge.
///
/// Every applied round removes at least one coin. There is no bound on the
/// number of rounds: a ledger that acknowledges a merge without applying it
/// keeps the loop going.
pub async fn merge_all_coins<A: SuiApi>(
    api: &A,
    signer: &Keypair,
    coin_type: &str,
    gas_coin: ObjectId,
) -> Result<()> {
    let owner = signer.address();
    let mut rounds = 0usize;
    while merge_owned_coins(api, signer, owner, coin_type, gas_coin).await? {
        rounds += 1;
    }
    info!(%coin_type, rounds, "Coins consolidated");
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoinInfo {
    pub symbol: String,
    pub coin_type: String,
    pub converter: Converter,
    /// Owned coin object, filled in by [`CoinRegistry::init`].
    pub coin_id: Option<ObjectId>,
}

impl CoinInfo {
    pub fn new(symbol: &str, coin_type: &str, converter: Converter) -> Self {
        Self {
            symbol: symbol.to_string(),
            coin_type: coin_type.to_string(),
            converter,
            coin_id: None,
        }
    }

    pub fn scalar(&self) -> u64 {
        self.converter.scalar()
    }
}

/// Coins known on a network, keyed by symbol.
#[derive(Clone, Debug, Default)]
pub struct CoinRegistry {
    coins: Vec<CoinInfo>,
}

impl CoinRegistry {
    pub fn new(coins: Vec<CoinInfo>) -> Self {
        Self { coins }
    }

    pub fn mainnet() -> Self {
        Self::new(vec![
            CoinInfo::new(
                "DEEP",
                "0xdeeb7a4662eec9f2f3def03fb937a663dddaa2e215b8078a284d026b7946c270::deep::DEEP",
                Converter::fixed::<6>(),
            ),
            CoinInfo::new("SUI", SUI_COIN_TYPE, Converter::fixed::<9>()),
            CoinInfo::new(
                "USDC",
                "0xdba34672e30cb065b1f93e3ab55318768fd6fef66c15942c9f7cb846e2f900e7::usdc::USDC",
                Converter::fixed::<6>(),
            ),
            CoinInfo::new(
                "WETH",
                "0xaf8cd5edc19c4512f4259f0bee101a40d41ebed738ade5874359610ef8eeced5::coin::COIN",
                Converter::fixed::<8>(),
            ),
        ])
    }

    pub fn testnet() -> Self {
        Self::new(vec![
            CoinInfo::new(
                "DEEP",
                "0x36dbef866a1d62bf7328989a10fb2f07d769f4ee587c0de4a0a256e57e0a58a8::deep::DEEP",
                Converter::fixed::<6>(),
            ),
            CoinInfo::new("SUI", SUI_COIN_TYPE, Converter::fixed::<9>()),
            CoinInfo::new(
                "DBUSDC",
                "0xd5aa5b65d97ed7fc0c2b063689805353d56f64f7e8407ac3b95b7e6fdea2256f::DBUSDC::DBUSDC",
                Converter::fixed::<6>(),
            ),
            CoinInfo::new(
                "DBWETH",
                "0xd5aa5b65d97ed7fc0c2b063689805353d56f64f7e8407ac3b95b7e6fdea2256f::DBWETH::DBWETH",
                Converter::fixed::<8>(),
            ),
        ])
    }

    /// Devnet and localnet only know the native coin.
    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Mainnet => Self::mainnet(),
            Network::Testnet => Self::testnet(),
            Network::Devnet | Network::Localnet => {
                Self::new(vec![CoinInfo::new("SUI", SUI_COIN_TYPE, Converter::fixed::<9>())])
            }
        }
    }

    pub fn get(&self, symbol: &str) -> Result<&CoinInfo> {
        self.coins
            .iter()
            .find(|c| c.symbol.eq_ignore_ascii_case(symbol))
            .ok_or_else(|| Error::UnknownCoin(symbol.to_string()))
    }

    pub fn coins(&self) -> &[CoinInfo] {
        &self.coins
    }

    /// Optionally consolidates every known coin type, then records one owned
    /// coin object per type.
    ///
    /// The gas coin for consolidation is the first owned SUI coin.
    pub async fn init<A: SuiApi>(&mut self, api: &A, signer: &Keypair, merge: bool) -> Result<()> {
        let owner = signer.address();
        if merge {
            let gas_coin = owned_coin(api, owner, SUI_COIN_TYPE)
                .await?
                .ok_or_else(|| Error::Config("no SUI coin to pay for merging".to_string()))?;
            for coin_type in self.coins.iter().map(|c| c.coin_type.clone()).collect_vec() {
                merge_all_coins(api, signer, &coin_type, gas_coin).await?;
            }
        }
        for coin in self.coins.iter_mut().filter(|c| c.coin_id.is_none()) {
            coin.coin_id = owned_coin(api, owner, &coin.coin_type).await?;
        }
        info!(
            coins = %self.coins.iter().map(|c| format!("{}={:?}", c.symbol, c.coin_id)).join(", "),
            "Coin registry initialized"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, MockLedger};

    const DEEP: &str = "0x36dbef866a1d62bf7328989a10fb2f07d769f4ee587c0de4a0a256e57e0a58a8::deep::DEEP";

    #[tokio::test]
    async fn test_single_coin_needs_no_merge() {
        let ledger = MockLedger::new();
        let signer = testing::keypair(1);
        let gas = ledger.add_coin(signer.address(), SUI_COIN_TYPE, 1_000_000_000);
        ledger.add_coin(signer.address(), DEEP, 10);

        let merged =
            merge_owned_coins(&ledger, &signer, signer.address(), DEEP, gas.object_id).await;
        assert!(!merged.unwrap());
        assert_eq!(ledger.calls("execute"), 0);
    }

    #[tokio::test]
    async fn test_no_coins_returns_false() {
        let ledger = MockLedger::new();
        let signer = testing::keypair(1);
        let merged =
            merge_owned_coins(&ledger, &signer, signer.address(), DEEP, testing::object_id(1))
                .await;
        assert!(!merged.unwrap());
    }

    #[tokio::test]
    async fn test_missing_gas_object() {
        let ledger = MockLedger::new();
        let signer = testing::keypair(1);
        ledger.add_coin(signer.address(), DEEP, 10);
        ledger.add_coin(signer.address(), DEEP, 20);
        let gas = testing::object_id(404);

        let merged = merge_owned_coins(&ledger, &signer, signer.address(), DEEP, gas).await;
        assert!(matches!(merged, Err(Error::ObjectNotFound(id)) if id == gas));
    }

    #[tokio::test]
    async fn test_merge_round_consolidates_balance() {
        let ledger = MockLedger::new();
        let signer = testing::keypair(1);
        let owner = signer.address();
        let gas = ledger.add_coin(owner, SUI_COIN_TYPE, 1_000_000_000);
        for balance in [5, 7, 11] {
            ledger.add_coin(owner, DEEP, balance);
        }

        assert!(
            merge_owned_coins(&ledger, &signer, owner, DEEP, gas.object_id)
                .await
                .unwrap()
        );
        let coins = ledger.coins_of(owner, DEEP);
        assert_eq!(coins.len(), 1);
        assert_eq!(coins[0].balance, 23);

        let tx = &ledger.executed()[0];
        assert_eq!(tx.gas_data().payment, vec![gas]);
    }

    #[tokio::test]
    async fn test_registry_init_with_merge() {
        let ledger = MockLedger::new();
        let signer = testing::keypair(2);
        let owner = signer.address();
        ledger.add_coin(owner, SUI_COIN_TYPE, 3_000_000_000);
        ledger.add_coin(owner, SUI_COIN_TYPE, 1_000);
        ledger.add_coin(owner, SUI_COIN_TYPE, 2_000);
        ledger.add_coin(owner, DEEP, 1);
        ledger.add_coin(owner, DEEP, 2);

        let mut registry = CoinRegistry::testnet();
        registry.init(&ledger, &signer, true).await.unwrap();

        assert_eq!(ledger.coins_of(owner, DEEP).len(), 1);
        assert_eq!(ledger.coins_of(owner, SUI_COIN_TYPE).len(), 2);
        let deep = registry.get("deep").unwrap();
        assert_eq!(deep.coin_id, Some(ledger.coins_of(owner, DEEP)[0].coin_object_id));
        assert_eq!(deep.scalar(), 1_000_000);
        assert!(registry.get("DBUSDC").unwrap().coin_id.is_none());
        assert!(matches!(registry.get("BTC"), Err(Error::UnknownCoin(_))));
    }

    #[tokio::test]
    async fn test_registry_merge_requires_sui() {
        let ledger = MockLedger::new();
        let signer = testing::keypair(2);
        let mut registry = CoinRegistry::mainnet();
        assert!(matches!(
            registry.init(&ledger, &signer, true).await,
            Err(Error::Config(_))
        ));
    }
}
