//! Fan-out submission of independent transactions.

use futures::future::join_all;
use itertools::Itertools;
use tracing::{info, warn};

use crate::{
    builder::TransactionBuilder,
    crypto::Keypair,
    error::{Error, Result},
    execute::sign_and_execute,
    rpc::SuiApi,
    types::{Address, SUI_COIN_TYPE},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    /// Net gas charged across successful transactions.
    pub total_gas_used: i64,
}

/// Gives every builder its own SUI coin as gas payment, largest coins first.
///
/// Concurrent transactions must not share an owned coin version; nothing
/// else prevents that.
pub async fn assign_gas_coins<A: SuiApi>(
    api: &A,
    owner: Address,
    builders: &mut [TransactionBuilder],
) -> Result<()> {
    let coins = api
        .get_all_coins(owner, SUI_COIN_TYPE)
        .await?
        .into_iter()
        .sorted_by_key(|c| std::cmp::Reverse(c.balance))
        .collect::<Vec<_>>();
    if coins.len() < builders.len() {
        return Err(Error::Config(format!(
            "{} transactions need {} gas coins, {owner} owns {}",
            builders.len(),
            builders.len(),
            coins.len()
        )));
    }
    for (builder, coin) in builders.iter_mut().zip(&coins) {
        builder.set_gas_payment(vec![coin.object_ref()]);
    }
    Ok(())
}

/// Builds, signs and submits every transaction concurrently.
///
/// Individual failures are logged and counted, they never abort the batch.
pub async fn submit_batch<A: SuiApi>(
    api: &A,
    signer: &Keypair,
    builders: Vec<TransactionBuilder>,
) -> BatchReport {
    let total = builders.len();
    let results = join_all(builders.into_iter().map(|mut builder| async move {
        sign_and_execute(api, signer, &mut builder).await
    }))
    .await;

    let mut report = BatchReport::default();
    for (idx, result) in results.into_iter().enumerate() {
        match result {
            Ok(result) => match result.effects.filter(|e| e.status.is_success()) {
                Some(effects) => {
                    report.succeeded += 1;
                    report.total_gas_used += effects.gas_used.net_gas_usage();
                }
                None => {
                    warn!(idx, digest = %result.digest, "Transaction failed");
                    report.failed += 1;
                }
            },
            Err(e) => {
                warn!(idx, %e, "Transaction submission failed");
                report.failed += 1;
            }
        }
    }
    info!(
        total,
        succeeded = report.succeeded,
        failed = report.failed,
        gas = report.total_gas_used,
        "Batch completed"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, MOCK_GAS, MockLedger};

    #[tokio::test]
    async fn test_batch_with_distinct_gas_coins() {
        let ledger = MockLedger::new();
        let signer = testing::keypair(6);
        for _ in 0..4 {
            ledger.add_coin(signer.address(), SUI_COIN_TYPE, 1_000_000_000);
        }

        let mut builders = vec![TransactionBuilder::new(); 4];
        assign_gas_coins(&ledger, signer.address(), &mut builders)
            .await
            .unwrap();
        let report = submit_batch(&ledger, &signer, builders).await;
        assert_eq!(report.succeeded, 4);
        assert_eq!(report.failed, 0);
        assert_eq!(report.total_gas_used, 4 * MOCK_GAS.net_gas_usage());
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_the_batch() {
        let ledger = MockLedger::new();
        let signer = testing::keypair(6);
        let coin = ledger.add_coin(signer.address(), SUI_COIN_TYPE, 1_000_000_000);

        // both transactions pay with the same coin version, the second one
        // observes it already consumed
        let mut builder = TransactionBuilder::new();
        builder.set_gas_payment(vec![coin]).set_gas_budget(10_000_000);
        let report = submit_batch(&ledger, &signer, vec![builder.clone(), builder]).await;
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
    }

    #[tokio::test]
    async fn test_not_enough_gas_coins() {
        let ledger = MockLedger::new();
        let signer = testing::keypair(6);
        ledger.add_coin(signer.address(), SUI_COIN_TYPE, 1_000_000_000);
        let mut builders = vec![TransactionBuilder::new(); 2];
        assert!(matches!(
            assign_gas_coins(&ledger, signer.address(), &mut builders).await,
            Err(Error::Config(_))
        ));
    }
}
