use tracing::{info, warn};

use crate::{
    builder::TransactionBuilder, crypto::Keypair, error::Result, rpc::SuiApi,
    types::ExecutionResult,
};

/// Builds the transaction, signs it with `signer` and submits it.
///
/// The sender defaults to the signer's address. A transaction that executes
/// with a failure status is returned as-is, callers inspect the effects.
pub async fn sign_and_execute<A: SuiApi>(
    api: &A,
    signer: &Keypair,
    builder: &mut TransactionBuilder,
) -> Result<ExecutionResult> {
    if builder.sender().is_none() {
        builder.set_sender(signer.address());
    }
    let tx = builder.build(api).await?;
    let tx_bytes = tx.to_bytes()?;
    let signature = signer.sign_transaction(&tx_bytes);
    let result = api.execute(&tx_bytes, &[signature]).await?;
    match &result.effects {
        Some(effects) if effects.status.is_success() => {
            info!(digest = %result.digest, gas = ?effects.gas_used, "Transaction executed");
        }
        Some(effects) => {
            warn!(digest = %result.digest, status = ?effects.status, "Transaction failed");
        }
        None => info!(digest = %result.digest, "Transaction submitted"),
    }
    Ok(result)
}
