//! Preparation of unsigned transactions for offline multisig signing.
//!
//! [`prepare_multisig_tx`] pins every piece of gas data so the bytes stay
//! valid while signatures are collected, dry-runs the result and only then
//! writes the base64 payload for the signing tooling.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{error, info};

use crate::{
    builder::TransactionBuilder,
    error::{Error, Result},
    rpc::SuiApi,
    types::{Address, ObjectId, TransactionData, TransactionEffects, TransactionExpiration},
};

/// Fixed gas price, immune to reference price changes across epochs.
pub const MULTISIG_GAS_PRICE: u64 = 1000;

/// Number of epochs the prepared transaction stays valid.
pub const EXPIRATION_EPOCHS: u64 = 5;

pub const DEFAULT_OUTPUT_DIR: &str = "./tx";

const DEVELOPMENT_ENV: &str = "development";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultisigConfig {
    /// Coin paying for the transaction, reserved by the signers.
    pub gas_object: Option<ObjectId>,
    /// Selects the local output file.
    pub development: bool,
    pub output_dir: PathBuf,
}

impl Default for MultisigConfig {
    fn default() -> Self {
        Self {
            gas_object: None,
            development: false,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl MultisigConfig {
    pub fn new(gas_object: Option<ObjectId>, development: bool) -> Self {
        Self {
            gas_object,
            development,
            ..Self::default()
        }
    }

    /// Builds the configuration from raw `GAS_OBJECT` and `NODE_ENV` values.
    pub fn from_values(gas_object: Option<&str>, node_env: Option<&str>) -> Result<Self> {
        let gas_object = gas_object
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<ObjectId>)
            .transpose()?;
        Ok(Self::new(gas_object, node_env == Some(DEVELOPMENT_ENV)))
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn output_path(&self) -> PathBuf {
        let file = if self.development {
            "tx-data-local.txt"
        } else {
            "tx-data.txt"
        };
        self.output_dir.join(file)
    }
}

/// Pins gas data and expiration, dry-runs the transaction and persists its
/// base64 encoded bytes. Returns the path of the written file.
///
/// Nothing is written unless the dry run succeeds.
pub async fn prepare_multisig_tx<A: SuiApi>(
    api: &A,
    mut builder: TransactionBuilder,
    sender: Address,
    config: &MultisigConfig,
) -> Result<PathBuf> {
    let gas_object = config.gas_object.ok_or(Error::MissingGasObject)?;

    builder.set_gas_price(MULTISIG_GAS_PRICE);

    let epoch = api.latest_epoch().await?;
    builder.set_expiration(TransactionExpiration::Epoch(epoch + EXPIRATION_EPOCHS));

    builder.set_sender(sender);

    setup_gas_payment(api, &mut builder, gas_object).await?;

    let tx = builder.build(api).await?;
    let effects = inspect_transaction(api, &tx).await?;
    if !effects.status.is_success() {
        let reason = effects
            .status
            .error
            .unwrap_or_else(|| effects.status.status.clone());
        error!(%sender, %reason, "Multisig transaction failed the dry run");
        return Err(Error::DryRunFailed(reason));
    }

    let path = config.output_path();
    write_tx(&path, &tx)?;
    info!(%sender, epoch, path = %path.display(), "Multisig transaction written");
    Ok(path)
}

/// Attaches the current reference of `gas_object` as the sole gas payment.
pub async fn setup_gas_payment<A: SuiApi>(
    api: &A,
    builder: &mut TransactionBuilder,
    gas_object: ObjectId,
) -> Result<()> {
    let gas = api
        .get_object(gas_object)
        .await?
        .ok_or(Error::InvalidGasObject(gas_object))?;
    builder.set_gas_payment(vec![gas.object_ref()]);
    Ok(())
}

/// Dry-runs the transaction and logs the simulated effects.
pub async fn inspect_transaction<A: SuiApi>(
    api: &A,
    tx: &TransactionData,
) -> Result<TransactionEffects> {
    let result = api.dry_run(&tx.to_bytes()?).await?;
    info!(effects = ?result.effects, "Dry run");
    Ok(result.effects)
}

fn write_tx(path: &Path, tx: &TransactionData) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, tx.to_base64()?)?;
    Ok(())
}
