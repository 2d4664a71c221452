//! DeepBook deployment configuration and transaction helpers.
//!
//! Helpers append Move calls to a [`TransactionBuilder`]. Admin calls take
//! the admin capability and are meant for [`crate::multisig`], balance
//! manager calls are signed directly by their owner. Trading calls act on
//! behalf of a balance manager through a proof generated in the same
//! transaction.

use fastnum::UD128;
use tracing::{debug, info};

use crate::{
    Network,
    builder::TransactionBuilder,
    coin::CoinInfo,
    error::{Error, Result},
    num::Converter,
    types::{Address, Argument, ObjectId, SUI_COIN_TYPE, TypeTag},
};

/// The shared `0x6` clock.
pub const CLOCK_ID: ObjectId = {
    let mut bytes = [0u8; 32];
    bytes[31] = 6;
    Address::new(bytes)
};

/// Order expiration that never passes.
pub const MAX_TIMESTAMP: u64 = 1_844_674_407_370_955_161;

/// Pools quote prices with nine decimals on top of the coin scalars.
pub const FLOAT_SCALAR: u64 = 1_000_000_000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum OrderType {
    #[default]
    NoRestriction = 0,
    ImmediateOrCancel = 1,
    FillOrKill = 2,
    PostOnly = 3,
}

/// What happens when an order would match one of the same manager.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum SelfMatchingOption {
    #[default]
    Allowed = 0,
    CancelTaker = 1,
    CancelMaker = 2,
}

/// A pool and the coins it trades.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pool {
    pub pool_id: ObjectId,
    pub base: CoinInfo,
    pub quote: CoinInfo,
}

impl Pool {
    pub fn new(pool_id: ObjectId, base: CoinInfo, quote: CoinInfo) -> Self {
        Self {
            pool_id,
            base,
            quote,
        }
    }

    fn type_arguments(&self) -> Result<Vec<TypeTag>> {
        DeepBookConfig::pool_types(&self.base.coin_type, &self.quote.coin_type)
    }

    /// On-chain price of one base coin in quote coins.
    ///
    /// Fails when the price is finer than the pool can represent.
    pub fn encode_price(&self, price: UD128) -> Result<u64> {
        let scaled = price * UD128::from(FLOAT_SCALAR) * UD128::from(self.quote.scalar())
            / UD128::from(self.base.scalar());
        Converter::fixed::<0>()
            .to_base_units(scaled)
            .map_err(|_| Error::InvalidAmount(price.to_string()))
    }

    pub fn encode_quantity(&self, quantity: UD128) -> Result<u64> {
        self.base.converter.to_base_units(quantity)
    }
}

/// Limit order in human-readable units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LimitOrder {
    pub client_order_id: u64,
    pub price: UD128,
    pub quantity: UD128,
    pub is_bid: bool,
    pub order_type: OrderType,
    pub self_matching: SelfMatchingOption,
    /// Pay trading fees in DEEP.
    pub pay_with_deep: bool,
    pub expiration: u64,
}

impl LimitOrder {
    /// Good-until-cancelled order paying fees in DEEP.
    pub fn new(client_order_id: u64, price: UD128, quantity: UD128, is_bid: bool) -> Self {
        Self {
            client_order_id,
            price,
            quantity,
            is_bid,
            order_type: OrderType::default(),
            self_matching: SelfMatchingOption::default(),
            pay_with_deep: true,
            expiration: MAX_TIMESTAMP,
        }
    }
}

/// Decimals the ladder rounds the mid price to.
const LADDER_DECIMALS: u8 = 6;
/// Distance of the innermost level from the mid, in ladder units.
const FIRST_LEVEL_OFFSET: u64 = 1_000;
/// Distance of level `i > 1` from the mid is `i * LEVEL_STEP`.
const LEVEL_STEP: u64 = 20_000;

/// Bid and ask orders `levels` deep around `mid`.
///
/// The mid price is rounded to six decimals. Level 1 sits 0.001 away from
/// it and level `i` beyond that at `0.02 * i`. Both sides of a level use
/// `i` as client order id. Bids that would not be positive are left out.
pub fn ladder_around_mid(mid: UD128, levels: u32, quantity: UD128) -> Result<Vec<LimitOrder>> {
    let converter = Converter::fixed::<LADDER_DECIMALS>();
    let mid_units = converter.to_base_units(mid.rescale(LADDER_DECIMALS as i16))?;
    let mut orders = Vec::with_capacity(2 * levels as usize);
    for level in 1..=levels {
        let offset = if level == 1 {
            FIRST_LEVEL_OFFSET
        } else {
            LEVEL_STEP * level as u64
        };
        let id = level as u64;
        if let Some(bid) = mid_units.checked_sub(offset).filter(|b| *b > 0) {
            orders.push(LimitOrder::new(id, converter.from_base_units(bid), quantity, true));
        }
        let ask = mid_units
            .checked_add(offset)
            .ok_or_else(|| Error::InvalidAmount(mid.to_string()))?;
        orders.push(LimitOrder::new(id, converter.from_base_units(ask), quantity, false));
    }
    Ok(orders)
}

/// Addresses of a DeepBook deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeepBookConfig {
    pub package_id: ObjectId,
    pub registry_id: ObjectId,
    pub admin_cap: ObjectId,
    /// Multisig address holding the admin capability.
    pub admin_cap_owner: Address,
}

const fn hex_id(s: &str) -> ObjectId {
    let bytes = s.as_bytes();
    let mut out = [0u8; 32];
    let mut i = 0;
    while i < 32 {
        out[i] = (nibble(bytes[2 + 2 * i]) << 4) | nibble(bytes[3 + 2 * i]);
        i += 1;
    }
    Address::new(out)
}

const fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        _ => panic!("invalid hex digit"),
    }
}

impl DeepBookConfig {
    pub const MAINNET: Self = Self {
        package_id: hex_id("0x2c8d603bc51326b8c13cef9dd07031a408a48dddb541963357661df5d3204809"),
        registry_id: hex_id("0xaf16199a2dff736e9f07a845f23c5da6df6f756eddb631aed9d24a93efc4549d"),
        admin_cap: hex_id("0xd542cd47d94009452de200032ac80ff1ceb31bb5f9ed6df5d97c9ae54a1976dd"),
        admin_cap_owner: hex_id(
            "0xd0ec0b201de6b4e7f425918bbd7151c37fc1b06c59b3961a2a00db74f6ea865e",
        ),
    };

    pub const TESTNET: Self = Self {
        package_id: hex_id("0x22ed917fa56afe09677314871a2997a111ebacd1f622b6cfed3a4422aa4d2e06"),
        registry_id: hex_id("0x14614dfc9243fcb2ef7ac51efed5c6284ca701d55216e1f42b3eb22c541feaa6"),
        admin_cap: hex_id("0x014e6a65f60936177820141ad64430290b6ad5e16421691dc9f3fa9907154b2e"),
        admin_cap_owner: hex_id(
            "0xb3d277c50f7b846a5f609a8d13428ae482b5826bb98437997373f3a0d60d280e",
        ),
    };

    pub fn mainnet() -> Self {
        Self::MAINNET
    }

    pub fn testnet() -> Self {
        Self::TESTNET
    }

    pub fn custom(
        package_id: ObjectId,
        registry_id: ObjectId,
        admin_cap: ObjectId,
        admin_cap_owner: Address,
    ) -> Self {
        Self {
            package_id,
            registry_id,
            admin_cap,
            admin_cap_owner,
        }
    }

    /// Only mainnet and testnet have a known deployment.
    pub fn for_network(network: Network) -> Result<Self> {
        match network {
            Network::Mainnet => Ok(Self::mainnet()),
            Network::Testnet => Ok(Self::testnet()),
            other => Err(Error::Config(format!("no DeepBook deployment on {other}"))),
        }
    }

    fn target(&self, module: &str, function: &str) -> String {
        format!("{}::{module}::{function}", self.package_id)
    }

    fn pool_types(base: &str, quote: &str) -> Result<Vec<TypeTag>> {
        Ok(vec![base.parse()?, quote.parse()?])
    }

    fn registry_version_call(
        &self,
        builder: &mut TransactionBuilder,
        function: &str,
        version: u64,
    ) -> Result<()> {
        let registry = builder.object(self.registry_id)?;
        let version_arg = builder.pure(&version)?;
        let admin_cap = builder.object(self.admin_cap)?;
        builder.move_call(
            &self.target("registry", function),
            vec![],
            vec![registry, version_arg, admin_cap],
        )?;
        Ok(())
    }

    pub fn enable_version(&self, builder: &mut TransactionBuilder, version: u64) -> Result<()> {
        self.registry_version_call(builder, "enable_version", version)
    }

    pub fn disable_version(&self, builder: &mut TransactionBuilder, version: u64) -> Result<()> {
        self.registry_version_call(builder, "disable_version", version)
    }

    pub fn unregister_pool_admin(
        &self,
        builder: &mut TransactionBuilder,
        base: &str,
        quote: &str,
    ) -> Result<()> {
        let registry = builder.object(self.registry_id)?;
        let admin_cap = builder.object(self.admin_cap)?;
        builder.move_call(
            &self.target("pool", "unregister_pool_admin"),
            Self::pool_types(base, quote)?,
            vec![registry, admin_cap],
        )?;
        Ok(())
    }

    /// Syncs the pool's allowed versions with the registry.
    pub fn update_allowed_versions(
        &self,
        builder: &mut TransactionBuilder,
        pool: ObjectId,
        base: &str,
        quote: &str,
    ) -> Result<()> {
        let pool = builder.object(pool)?;
        let registry = builder.object(self.registry_id)?;
        let admin_cap = builder.object(self.admin_cap)?;
        builder.move_call(
            &self.target("pool", "update_allowed_versions"),
            Self::pool_types(base, quote)?,
            vec![pool, registry, admin_cap],
        )?;
        Ok(())
    }

    pub fn create_and_share_balance_manager(&self, builder: &mut TransactionBuilder) -> Result<()> {
        let manager = builder.move_call(&self.target("balance_manager", "new"), vec![], vec![])?;
        let manager_type: TypeTag = format!("{}::balance_manager::BalanceManager", self.package_id).parse()?;
        builder.move_call(
            "0x2::transfer::public_share_object",
            vec![manager_type],
            vec![manager],
        )?;
        Ok(())
    }

    /// Deposits `amount` base units, split from the gas coin for SUI and
    /// from the coin's owned object otherwise.
    pub fn deposit_into_manager(
        &self,
        builder: &mut TransactionBuilder,
        manager: ObjectId,
        coin: &CoinInfo,
        amount: u64,
    ) -> Result<()> {
        let source = if coin.coin_type == SUI_COIN_TYPE {
            Argument::GasCoin
        } else {
            let coin_id = coin
                .coin_id
                .ok_or_else(|| Error::Config(format!("no owned {} coin to deposit", coin.symbol)))?;
            builder.object(coin_id)?
        };
        let amount_arg = builder.pure(&amount)?;
        let deposit = builder.split_coins(source, vec![amount_arg])?;
        let manager_arg = builder.object(manager)?;
        builder.move_call(
            &self.target("balance_manager", "deposit"),
            vec![coin.coin_type.parse()?],
            vec![manager_arg, deposit[0]],
        )?;
        info!(%manager, coin = %coin.symbol, amount, "Deposit into manager");
        Ok(())
    }

    pub fn withdraw_from_manager(
        &self,
        builder: &mut TransactionBuilder,
        manager: ObjectId,
        coin: &CoinInfo,
        amount: u64,
        recipient: Address,
    ) -> Result<()> {
        let manager_arg = builder.object(manager)?;
        let amount_arg = builder.pure(&amount)?;
        let withdrawn = builder.move_call(
            &self.target("balance_manager", "withdraw"),
            vec![coin.coin_type.parse()?],
            vec![manager_arg, amount_arg],
        )?;
        let recipient = builder.pure(&recipient)?;
        builder.transfer_objects(vec![withdrawn], recipient)?;
        info!(%manager, coin = %coin.symbol, amount, "Withdraw from manager");
        Ok(())
    }

    pub fn withdraw_all_from_manager(
        &self,
        builder: &mut TransactionBuilder,
        manager: ObjectId,
        coin: &CoinInfo,
        recipient: Address,
    ) -> Result<()> {
        let manager_arg = builder.object(manager)?;
        let withdrawn = builder.move_call(
            &self.target("balance_manager", "withdraw_all"),
            vec![coin.coin_type.parse()?],
            vec![manager_arg],
        )?;
        let recipient = builder.pure(&recipient)?;
        builder.transfer_objects(vec![withdrawn], recipient)?;
        info!(%manager, coin = %coin.symbol, "Withdraw all from manager");
        Ok(())
    }

    /// Proof that the sender owns `manager`, passed to trading calls.
    pub fn generate_proof_as_owner(
        &self,
        builder: &mut TransactionBuilder,
        manager: ObjectId,
    ) -> Result<Argument> {
        let manager = builder.object(manager)?;
        builder.move_call(
            &self.target("balance_manager", "generate_proof_as_owner"),
            vec![],
            vec![manager],
        )
    }

    pub fn place_limit_order(
        &self,
        builder: &mut TransactionBuilder,
        pool: &Pool,
        manager: ObjectId,
        proof: Argument,
        order: &LimitOrder,
    ) -> Result<Argument> {
        let price = pool.encode_price(order.price)?;
        let quantity = pool.encode_quantity(order.quantity)?;
        let arguments = vec![
            builder.object(pool.pool_id)?,
            builder.object(manager)?,
            proof,
            builder.pure(&order.client_order_id)?,
            builder.pure(&(order.order_type as u8))?,
            builder.pure(&(order.self_matching as u8))?,
            builder.pure(&price)?,
            builder.pure(&quantity)?,
            builder.pure(&order.is_bid)?,
            builder.pure(&order.pay_with_deep)?,
            builder.pure(&order.expiration)?,
            builder.shared_object(CLOCK_ID, false)?,
        ];
        let placed = builder.move_call(
            &self.target("pool", "place_limit_order"),
            pool.type_arguments()?,
            arguments,
        )?;
        debug!(
            pool = %pool.pool_id,
            client_order_id = order.client_order_id,
            price,
            quantity,
            is_bid = order.is_bid,
            "Place limit order"
        );
        Ok(placed)
    }

    pub fn cancel_all_orders(
        &self,
        builder: &mut TransactionBuilder,
        pool: &Pool,
        manager: ObjectId,
        proof: Argument,
    ) -> Result<()> {
        let arguments = vec![
            builder.object(pool.pool_id)?,
            builder.object(manager)?,
            proof,
            builder.shared_object(CLOCK_ID, false)?,
        ];
        builder.move_call(
            &self.target("pool", "cancel_all_orders"),
            pool.type_arguments()?,
            arguments,
        )?;
        Ok(())
    }

    /// Replaces every open order of `manager` on `pool` with `orders`
    /// under a single proof.
    pub fn requote(
        &self,
        builder: &mut TransactionBuilder,
        pool: &Pool,
        manager: ObjectId,
        orders: &[LimitOrder],
    ) -> Result<()> {
        let proof = self.generate_proof_as_owner(builder, manager)?;
        self.cancel_all_orders(builder, pool, manager, proof)?;
        for order in orders {
            self.place_limit_order(builder, pool, manager, proof, order)?;
        }
        info!(pool = %pool.pool_id, %manager, orders = orders.len(), "Requote");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use fastnum::udec128;

    use super::*;
    use crate::{
        coin::CoinRegistry,
        testing,
        types::{Command, ProgrammableMoveCall},
    };

    fn move_calls(builder: &TransactionBuilder) -> Vec<&ProgrammableMoveCall> {
        builder
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::MoveCall(call) => Some(call.as_ref()),
                _ => None,
            })
            .collect()
    }

    fn sui_usdc_pool() -> Pool {
        let registry = CoinRegistry::testnet();
        Pool::new(
            testing::object_id(42),
            registry.get("SUI").unwrap().clone(),
            registry.get("DBUSDC").unwrap().clone(),
        )
    }

    #[test]
    fn test_constants_match_their_text_form() {
        assert_eq!(
            DeepBookConfig::MAINNET.admin_cap.to_string(),
            "0xd542cd47d94009452de200032ac80ff1ceb31bb5f9ed6df5d97c9ae54a1976dd"
        );
        assert_eq!(
            DeepBookConfig::TESTNET.package_id,
            "0x22ed917fa56afe09677314871a2997a111ebacd1f622b6cfed3a4422aa4d2e06"
                .parse()
                .unwrap()
        );
        assert!(DeepBookConfig::for_network(Network::Localnet).is_err());
    }

    #[test]
    fn test_enable_version_call() {
        let config = DeepBookConfig::mainnet();
        let mut builder = TransactionBuilder::new();
        config.enable_version(&mut builder, 3).unwrap();

        let calls = move_calls(&builder);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].package, config.package_id);
        assert_eq!(calls[0].module, "registry");
        assert_eq!(calls[0].function, "enable_version");
        assert_eq!(
            calls[0].arguments,
            vec![Argument::Input(0), Argument::Input(1), Argument::Input(2)]
        );
    }

    #[test]
    fn test_pool_calls_carry_type_arguments() {
        let config = DeepBookConfig::mainnet();
        let registry = CoinRegistry::mainnet();
        let mut builder = TransactionBuilder::new();
        let pool = testing::object_id(42);
        config
            .update_allowed_versions(
                &mut builder,
                pool,
                &registry.get("DEEP").unwrap().coin_type,
                SUI_COIN_TYPE,
            )
            .unwrap();
        config
            .unregister_pool_admin(&mut builder, SUI_COIN_TYPE, &registry.get("USDC").unwrap().coin_type)
            .unwrap();

        let calls = move_calls(&builder);
        assert_eq!(calls[0].function, "update_allowed_versions");
        assert_eq!(calls[0].type_arguments.len(), 2);
        // registry and admin cap inputs are shared between both calls
        assert_eq!(calls[1].arguments, vec![Argument::Input(1), Argument::Input(2)]);
        assert!(matches!(
            config.unregister_pool_admin(&mut builder, "DEEP", SUI_COIN_TYPE),
            Err(Error::InvalidTypeTag(_))
        ));
    }

    #[test]
    fn test_deposit_sources() {
        let config = DeepBookConfig::testnet();
        let registry = CoinRegistry::testnet();
        let manager = testing::object_id(7);

        let mut builder = TransactionBuilder::new();
        config
            .deposit_into_manager(&mut builder, manager, registry.get("SUI").unwrap(), 5)
            .unwrap();
        assert!(matches!(
            &builder.commands()[0],
            Command::SplitCoins(Argument::GasCoin, _)
        ));

        let mut deep = registry.get("DEEP").unwrap().clone();
        assert!(matches!(
            config.deposit_into_manager(&mut TransactionBuilder::new(), manager, &deep, 5),
            Err(Error::Config(_))
        ));
        deep.coin_id = Some(testing::object_id(8));
        let mut builder = TransactionBuilder::new();
        config
            .deposit_into_manager(&mut builder, manager, &deep, 5)
            .unwrap();
        assert!(matches!(
            &builder.commands()[0],
            Command::SplitCoins(Argument::Input(0), _)
        ));
    }

    #[test]
    fn test_withdraw_transfers_to_recipient() {
        let config = DeepBookConfig::testnet();
        let registry = CoinRegistry::testnet();
        let mut builder = TransactionBuilder::new();
        config
            .withdraw_all_from_manager(
                &mut builder,
                testing::object_id(7),
                registry.get("DEEP").unwrap(),
                testing::keypair(1).address(),
            )
            .unwrap();
        assert!(matches!(
            &builder.commands()[1],
            Command::TransferObjects(objects, Argument::Input(1)) if objects == &vec![Argument::Result(0)]
        ));
    }

    #[test]
    fn test_share_balance_manager() {
        let config = DeepBookConfig::testnet();
        let mut builder = TransactionBuilder::new();
        config.create_and_share_balance_manager(&mut builder).unwrap();
        let calls = move_calls(&builder);
        assert_eq!(calls[1].function, "public_share_object");
        assert_eq!(calls[1].arguments, vec![Argument::Result(0)]);
    }

    #[test]
    fn test_price_and_quantity_encoding() {
        let pool = sui_usdc_pool();
        assert_eq!(pool.encode_price(udec128!(3.25)).unwrap(), 3_250_000);
        assert_eq!(pool.encode_quantity(udec128!(10)).unwrap(), 10_000_000_000);
        assert!(matches!(
            pool.encode_price(udec128!(3.2500001)),
            Err(Error::InvalidAmount(_))
        ));

        let registry = CoinRegistry::testnet();
        let deep_sui = Pool::new(
            testing::object_id(43),
            registry.get("DEEP").unwrap().clone(),
            registry.get("SUI").unwrap().clone(),
        );
        assert_eq!(deep_sui.encode_price(udec128!(0.02)).unwrap(), 20_000_000_000);
    }

    #[test]
    fn test_ladder_around_mid() {
        let orders = ladder_around_mid(udec128!(3.5), 3, udec128!(1)).unwrap();
        let quotes = orders
            .iter()
            .map(|o| (o.client_order_id, o.is_bid, o.price))
            .collect::<Vec<_>>();
        assert_eq!(
            quotes,
            vec![
                (1, true, udec128!(3.499)),
                (1, false, udec128!(3.501)),
                (2, true, udec128!(3.46)),
                (2, false, udec128!(3.54)),
                (3, true, udec128!(3.44)),
                (3, false, udec128!(3.56)),
            ]
        );
        assert!(orders.iter().all(|o| o.expiration == MAX_TIMESTAMP && o.pay_with_deep));

        // the mid is rounded to six decimals first
        let orders = ladder_around_mid(udec128!(3.1234567), 1, udec128!(1)).unwrap();
        assert_eq!(orders[1].price, udec128!(3.124457));

        // bids at or below zero are skipped
        let orders = ladder_around_mid(udec128!(0.01), 2, udec128!(1)).unwrap();
        assert_eq!(orders.len(), 3);
        assert_eq!(orders.iter().filter(|o| o.is_bid).count(), 1);
    }

    #[test]
    fn test_requote_commands() {
        let config = DeepBookConfig::testnet();
        let pool = sui_usdc_pool();
        let manager = testing::object_id(7);
        let orders = ladder_around_mid(udec128!(3.5), 2, udec128!(10)).unwrap();
        let mut builder = TransactionBuilder::new();
        config.requote(&mut builder, &pool, manager, &orders).unwrap();

        let calls = move_calls(&builder);
        assert_eq!(calls.len(), 2 + orders.len());
        assert_eq!(calls[0].module, "balance_manager");
        assert_eq!(calls[0].function, "generate_proof_as_owner");
        assert_eq!(calls[0].arguments, vec![Argument::Input(0)]);

        // pool, manager, proof, clock
        assert_eq!(calls[1].function, "cancel_all_orders");
        assert_eq!(
            calls[1].arguments,
            vec![
                Argument::Input(1),
                Argument::Input(0),
                Argument::Result(0),
                Argument::Input(2),
            ]
        );

        for call in &calls[2..] {
            assert_eq!(call.module, "pool");
            assert_eq!(call.function, "place_limit_order");
            assert_eq!(call.type_arguments.len(), 2);
            assert_eq!(call.arguments.len(), 12);
            assert_eq!(
                call.arguments[..3].to_vec(),
                vec![Argument::Input(1), Argument::Input(0), Argument::Result(0)]
            );
            assert_eq!(call.arguments[11], Argument::Input(2));
        }
        // eight fresh pure inputs per order after the three object inputs
        assert_eq!(calls[2].arguments[3], Argument::Input(3));
        assert_eq!(calls[3].arguments[3], Argument::Input(11));
    }

    #[test]
    fn test_unrepresentable_order_adds_nothing() {
        let config = DeepBookConfig::testnet();
        let pool = sui_usdc_pool();
        let mut builder = TransactionBuilder::new();
        let proof = config
            .generate_proof_as_owner(&mut builder, testing::object_id(7))
            .unwrap();
        let order = LimitOrder::new(1, udec128!(3.5), udec128!(0.0000000001), true);
        assert!(matches!(
            config.place_limit_order(&mut builder, &pool, testing::object_id(7), proof, &order),
            Err(Error::InvalidAmount(_))
        ));
        assert_eq!(builder.commands().len(), 1);
    }
}
