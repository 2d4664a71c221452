//! Command execution against a fullnode.

use deepbook_ops::{
    Network,
    bench::{assign_gas_coins, submit_batch},
    builder::TransactionBuilder,
    coin::{CoinRegistry, merge_all_coins, owned_coin},
    crypto::Keypair,
    deepbook::{DeepBookConfig, LimitOrder, Pool, ladder_around_mid},
    execute::sign_and_execute,
    localnet,
    multisig::prepare_multisig_tx,
    num::parse_decimal,
    rpc::{self, RpcClient},
    signer::get_signer,
    types::{Address, ObjectId, SUI_COIN_TYPE},
};
use std::path::PathBuf;
use tracing::{info, warn};
use url::Url;

use crate::{
    config::{
        BalanceManagerAction, BenchWorkload, Command, ConfigError, EnvConfig, LocalnetAction,
        MarketMakerAction, MultisigAction, PoolArgs, parse_address, parse_object_id,
    },
    error::{Error, Result},
};

/// Connection to one network plus the environment it was configured from.
#[derive(Debug)]
pub struct Ops {
    client: RpcClient,
    network: Network,
    env: EnvConfig,
}

impl Ops {
    pub fn new(network: Network, rpc_url: Option<Url>, env: EnvConfig) -> Result<Self> {
        let client = rpc::client(network, rpc_url.as_ref())?;
        Ok(Self {
            client,
            network,
            env,
        })
    }

    fn signer(&self) -> Result<Keypair> {
        Ok(get_signer(
            self.env.private_key.as_deref(),
            self.env.sui_binary(),
        )?)
    }

    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::ActiveAddress => {
                println!("{}", self.signer()?.address());
                Ok(())
            }
            Command::MergeCoins {
                coin_type,
                gas_coin,
            } => self.merge_coins(&coin_type, gas_coin.as_deref()).await,
            Command::Multisig {
                sender,
                output_dir,
                action,
            } => self.multisig(sender.as_deref(), output_dir, action).await,
            Command::BalanceManager { action } => self.balance_manager(action).await,
            Command::MarketMaker { action } => self.market_maker(action).await,
            Command::Bench { count, workload } => self.bench(count, workload).await,
            Command::Localnet { action } => self.localnet(action).await,
        }
    }

    async fn merge_coins(&self, coin_type: &str, gas_coin: Option<&str>) -> Result<()> {
        let signer = self.signer()?;
        let gas_coin = match gas_coin {
            Some(id) => parse_object_id("gas coin", id)?,
            None => owned_coin(&self.client, signer.address(), SUI_COIN_TYPE)
                .await?
                .ok_or_else(|| {
                    deepbook_ops::Error::Config(format!("{} owns no SUI coin", signer.address()))
                })?,
        };
        merge_all_coins(&self.client, &signer, coin_type, gas_coin).await?;
        Ok(())
    }

    async fn multisig(
        &self,
        sender: Option<&str>,
        output_dir: Option<PathBuf>,
        action: MultisigAction,
    ) -> Result<()> {
        let deepbook = DeepBookConfig::for_network(self.network)?;
        let sender = match sender {
            Some(sender) => parse_address("sender", sender)?,
            None => deepbook.admin_cap_owner,
        };
        let mut config = self.env.multisig_config()?;
        if let Some(dir) = output_dir {
            config = config.with_output_dir(dir);
        }

        let mut builder = TransactionBuilder::new();
        match action {
            MultisigAction::EnableVersion { version } => {
                deepbook.enable_version(&mut builder, version)?
            }
            MultisigAction::DisableVersion { version } => {
                deepbook.disable_version(&mut builder, version)?
            }
            MultisigAction::UnregisterPool { base, quote } => {
                deepbook.unregister_pool_admin(&mut builder, &base, &quote)?
            }
            MultisigAction::UpdateAllowedVersions { pool, base, quote } => {
                let pool = parse_object_id("pool", &pool)?;
                deepbook.update_allowed_versions(&mut builder, pool, &base, &quote)?
            }
        }

        let path = prepare_multisig_tx(&self.client, builder, sender, &config).await?;
        println!("{}", path.display());
        Ok(())
    }

    async fn balance_manager(&self, action: BalanceManagerAction) -> Result<()> {
        let deepbook = DeepBookConfig::for_network(self.network)?;
        let signer = self.signer()?;
        let mut coins = CoinRegistry::for_network(self.network);
        let mut builder = TransactionBuilder::new();

        match action {
            BalanceManagerAction::Create => deepbook.create_and_share_balance_manager(&mut builder)?,
            BalanceManagerAction::Deposit {
                manager,
                coin,
                amount,
            } => {
                let manager = parse_object_id("manager", &manager)?;
                coins.init(&self.client, &signer, false).await?;
                let coin = coins.get(&coin)?;
                let amount = coin.converter.parse(&amount)?;
                deepbook.deposit_into_manager(&mut builder, manager, coin, amount)?
            }
            BalanceManagerAction::Withdraw {
                manager,
                coin,
                amount,
                recipient,
            } => {
                let manager = parse_object_id("manager", &manager)?;
                let recipient = self.recipient(recipient.as_deref(), &signer)?;
                let coin = coins.get(&coin)?;
                let amount = coin.converter.parse(&amount)?;
                deepbook.withdraw_from_manager(&mut builder, manager, coin, amount, recipient)?
            }
            BalanceManagerAction::WithdrawAll {
                manager,
                coin,
                recipient,
            } => {
                let manager = parse_object_id("manager", &manager)?;
                let recipient = self.recipient(recipient.as_deref(), &signer)?;
                deepbook.withdraw_all_from_manager(&mut builder, manager, coins.get(&coin)?, recipient)?
            }
        }

        let result = sign_and_execute(&self.client, &signer, &mut builder).await?;
        println!("{}", result.digest);
        Ok(())
    }

    fn recipient(&self, recipient: Option<&str>, signer: &Keypair) -> Result<Address> {
        match recipient {
            Some(recipient) => Ok(parse_address("recipient", recipient)?),
            None => Ok(signer.address()),
        }
    }

    /// Pool with coins from the network registry, and the manager.
    fn pool(&self, args: &PoolArgs) -> Result<(Pool, ObjectId)> {
        let coins = CoinRegistry::for_network(self.network);
        let pool = Pool::new(
            parse_object_id("pool", &args.pool)?,
            coins.get(&args.base)?.clone(),
            coins.get(&args.quote)?.clone(),
        );
        Ok((pool, parse_object_id("manager", &args.manager)?))
    }

    async fn market_maker(&self, action: MarketMakerAction) -> Result<()> {
        let deepbook = DeepBookConfig::for_network(self.network)?;
        let signer = self.signer()?;
        let mut builder = TransactionBuilder::new();

        match action {
            MarketMakerAction::Quote {
                pool,
                mid,
                levels,
                quantity,
            } => {
                let (pool, manager) = self.pool(&pool)?;
                let orders =
                    ladder_around_mid(parse_decimal(&mid)?, levels, parse_decimal(&quantity)?)?;
                deepbook.requote(&mut builder, &pool, manager, &orders)?
            }
            MarketMakerAction::PlaceOrder {
                pool,
                price,
                quantity,
                ask,
                client_order_id,
            } => {
                let (pool, manager) = self.pool(&pool)?;
                let order = LimitOrder::new(
                    client_order_id,
                    parse_decimal(&price)?,
                    parse_decimal(&quantity)?,
                    !ask,
                );
                let proof = deepbook.generate_proof_as_owner(&mut builder, manager)?;
                deepbook.place_limit_order(&mut builder, &pool, manager, proof, &order)?;
            }
            MarketMakerAction::CancelAll { pool } => {
                let (pool, manager) = self.pool(&pool)?;
                let proof = deepbook.generate_proof_as_owner(&mut builder, manager)?;
                deepbook.cancel_all_orders(&mut builder, &pool, manager, proof)?
            }
        }

        let result = sign_and_execute(&self.client, &signer, &mut builder).await?;
        println!("{}", result.digest);
        Ok(())
    }

    async fn bench(&self, count: usize, workload: BenchWorkload) -> Result<()> {
        if count == 0 {
            return Err(ConfigError::ZeroCount.into());
        }
        let signer = self.signer()?;

        let mut builders = match workload {
            BenchWorkload::Call { target } => {
                let mut template = TransactionBuilder::new();
                template.move_call(&target, vec![], vec![])?;
                vec![template; count]
            }
            BenchWorkload::LimitOrder {
                pool,
                price,
                quantity,
                ask,
            } => {
                let deepbook = DeepBookConfig::for_network(self.network)?;
                let (pool, manager) = self.pool(&pool)?;
                let (price, quantity) = (parse_decimal(&price)?, parse_decimal(&quantity)?);
                (1..=count as u64)
                    .map(|client_order_id| {
                        let mut builder = TransactionBuilder::new();
                        let proof = deepbook.generate_proof_as_owner(&mut builder, manager)?;
                        let order = LimitOrder::new(client_order_id, price, quantity, !ask);
                        deepbook.place_limit_order(&mut builder, &pool, manager, proof, &order)?;
                        Ok(builder)
                    })
                    .collect::<deepbook_ops::Result<Vec<_>>>()?
            }
        };
        assign_gas_coins(&self.client, signer.address(), &mut builders).await?;

        let report = submit_batch(&self.client, &signer, builders).await;
        println!(
            "succeeded: {}, failed: {}, gas used: {}",
            report.succeeded, report.failed, report.total_gas_used
        );
        if report.failed > 0 {
            return Err(Error::BenchFailures {
                failed: report.failed,
                total: count,
            });
        }
        Ok(())
    }

    async fn localnet(&self, action: LocalnetAction) -> Result<()> {
        if self.network != Network::Localnet {
            warn!(network = %self.network, "Localnet helpers always target the local endpoints");
        }
        let http = reqwest::Client::new();
        let fullnode = Url::parse(localnet::FULLNODE_URL)?;
        let faucet = Url::parse(localnet::FAUCET_URL)?;

        match action {
            LocalnetAction::Fund { address } => {
                let recipient = match address {
                    Some(address) => parse_address("address", &address)?,
                    None => self.signer()?.address(),
                };
                localnet::wait_for_fullnode(&http, &fullnode).await?;
                localnet::wait_for_faucet(&http, &faucet).await?;
                localnet::fund_address(&http, &faucet, recipient).await?;
                info!(%recipient, "Localnet address funded");
            }
        }
        Ok(())
    }
}
