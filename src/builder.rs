//! Programmable transaction builder.
//!
//! Collects inputs and commands, then [`TransactionBuilder::build`] resolves
//! object inputs against the ledger and fills in whatever gas data the
//! caller left unset: reference gas price, a dry-run based budget, and
//! payment coins picked from the sender's SUI balance.

use std::collections::HashSet;

use itertools::Itertools;
use serde::Serialize;
use tracing::debug;

use crate::{
    error::{Error, Result},
    rpc::SuiApi,
    types::{
        Address, Argument, CallArg, Coin, Command, GasData, ObjectArg, ObjectId, ObjectRef, Owner,
        ProgrammableMoveCall, ProgrammableTransaction, SUI_COIN_TYPE, TransactionData,
        TransactionExpiration, TransactionKind, TypeTag,
    },
};

/// Budget used for the estimation dry run.
pub const MAX_GAS_BUDGET: u64 = 50_000_000_000;

/// Extra computation units added on top of the dry-run estimate, scaled by
/// the gas price.
pub const GAS_SAFE_OVERHEAD: u64 = 1000;

/// Upper bound on the number of coins in a gas payment.
pub const MAX_GAS_OBJECTS: usize = 255;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Input {
    Resolved(CallArg),
    Unresolved { id: ObjectId, mutable: bool },
}

impl Input {
    fn object_id(&self) -> Option<ObjectId> {
        match self {
            Input::Resolved(CallArg::Object(arg)) => Some(arg.id()),
            Input::Unresolved { id, .. } => Some(*id),
            Input::Resolved(CallArg::Pure(_)) => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TransactionBuilder {
    inputs: Vec<Input>,
    commands: Vec<Command>,
    sender: Option<Address>,
    gas_owner: Option<Address>,
    gas_price: Option<u64>,
    gas_budget: Option<u64>,
    gas_payment: Option<Vec<ObjectRef>>,
    expiration: TransactionExpiration,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_input(&mut self, input: Input) -> Result<Argument> {
        if let Some(id) = input.object_id()
            && let Some(pos) = self.inputs.iter().position(|i| i.object_id() == Some(id))
        {
            if let (Input::Unresolved { mutable: existing, .. }, Input::Unresolved { mutable, .. }) =
                (&mut self.inputs[pos], &input)
            {
                *existing |= *mutable;
            }
            return Ok(Argument::Input(index(pos, "inputs")?));
        }
        let idx = index(self.inputs.len(), "inputs")?;
        self.inputs.push(input);
        Ok(Argument::Input(idx))
    }

    fn push_command(&mut self, command: Command) -> Result<u16> {
        let idx = index(self.commands.len(), "commands")?;
        self.commands.push(command);
        Ok(idx)
    }

    /// BCS-encoded pure input.
    pub fn pure<T: Serialize>(&mut self, value: &T) -> Result<Argument> {
        self.pure_bytes(bcs::to_bytes(value)?)
    }

    pub fn pure_bytes(&mut self, bytes: Vec<u8>) -> Result<Argument> {
        self.push_input(Input::Resolved(CallArg::Pure(bytes)))
    }

    /// Object input resolved from the ledger at build time.
    pub fn object(&mut self, id: ObjectId) -> Result<Argument> {
        self.push_input(Input::Unresolved { id, mutable: true })
    }

    /// Owned or immutable object at a known version.
    pub fn object_ref(&mut self, object_ref: ObjectRef) -> Result<Argument> {
        self.push_input(Input::Resolved(CallArg::Object(ObjectArg::ImmOrOwnedObject(
            object_ref,
        ))))
    }

    pub fn shared_object(&mut self, id: ObjectId, mutable: bool) -> Result<Argument> {
        self.push_input(Input::Unresolved { id, mutable })
    }

    pub fn gas(&self) -> Argument {
        Argument::GasCoin
    }

    /// Adds a Move call to `target` of the form `package::module::function`.
    pub fn move_call(
        &mut self,
        target: &str,
        type_arguments: Vec<TypeTag>,
        arguments: Vec<Argument>,
    ) -> Result<Argument> {
        let invalid = || Error::InvalidTarget(target.to_string());
        let (package, module, function) = target
            .split("::")
            .collect_tuple()
            .ok_or_else(invalid)?;
        if module.is_empty() || function.is_empty() {
            return Err(invalid());
        }
        let package = package.parse().map_err(|_| invalid())?;
        let idx = self.push_command(Command::MoveCall(Box::new(ProgrammableMoveCall {
            package,
            module: module.to_string(),
            function: function.to_string(),
            type_arguments,
            arguments,
        })))?;
        Ok(Argument::Result(idx))
    }

    pub fn transfer_objects(&mut self, objects: Vec<Argument>, recipient: Argument) -> Result<()> {
        self.push_command(Command::TransferObjects(objects, recipient))?;
        Ok(())
    }

    /// Returns one coin argument per requested amount.
    pub fn split_coins(&mut self, coin: Argument, amounts: Vec<Argument>) -> Result<Vec<Argument>> {
        let count = index(amounts.len(), "split amounts")?;
        let idx = self.push_command(Command::SplitCoins(coin, amounts))?;
        Ok((0..count).map(|i| Argument::NestedResult(idx, i)).collect())
    }

    pub fn merge_coins(&mut self, target: Argument, sources: Vec<Argument>) -> Result<()> {
        self.push_command(Command::MergeCoins(target, sources))?;
        Ok(())
    }

    pub fn set_sender(&mut self, sender: Address) -> &mut Self {
        self.sender = Some(sender);
        self
    }

    pub fn set_gas_owner(&mut self, owner: Address) -> &mut Self {
        self.gas_owner = Some(owner);
        self
    }

    pub fn set_gas_price(&mut self, price: u64) -> &mut Self {
        self.gas_price = Some(price);
        self
    }

    pub fn set_gas_budget(&mut self, budget: u64) -> &mut Self {
        self.gas_budget = Some(budget);
        self
    }

    pub fn set_gas_payment(&mut self, payment: Vec<ObjectRef>) -> &mut Self {
        self.gas_payment = Some(payment);
        self
    }

    pub fn set_expiration(&mut self, expiration: TransactionExpiration) -> &mut Self {
        self.expiration = expiration;
        self
    }

    pub fn sender(&self) -> Option<Address> {
        self.sender
    }

    pub fn gas_price(&self) -> Option<u64> {
        self.gas_price
    }

    pub fn gas_payment(&self) -> Option<&[ObjectRef]> {
        self.gas_payment.as_deref()
    }

    pub fn expiration(&self) -> TransactionExpiration {
        self.expiration
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Resolves inputs and gas data into transaction data ready to sign.
    pub async fn build<A: SuiApi>(&self, api: &A) -> Result<TransactionData> {
        let sender = self.sender.ok_or(Error::MissingSender)?;
        let gas_owner = self.gas_owner.unwrap_or(sender);

        let mut inputs = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            inputs.push(match input {
                Input::Resolved(arg) => arg.clone(),
                Input::Unresolved { id, mutable } => resolve_object(api, *id, *mutable).await?,
            });
        }
        let kind = TransactionKind::ProgrammableTransaction(ProgrammableTransaction {
            inputs,
            commands: self.commands.clone(),
        });

        let price = match self.gas_price {
            Some(price) => price,
            None => api.reference_gas_price().await?,
        };

        let budget = match self.gas_budget {
            Some(budget) => budget,
            None => {
                let draft = TransactionData::new(
                    kind.clone(),
                    sender,
                    GasData {
                        payment: vec![],
                        owner: gas_owner,
                        price,
                        budget: MAX_GAS_BUDGET,
                    },
                    self.expiration,
                );
                estimate_budget(api, &draft, price).await?
            }
        };

        let payment = match &self.gas_payment {
            Some(payment) => payment.clone(),
            None => {
                let TransactionKind::ProgrammableTransaction(pt) = &kind;
                let excluded = pt
                    .inputs
                    .iter()
                    .filter_map(|i| match i {
                        CallArg::Object(arg) => Some(arg.id()),
                        CallArg::Pure(_) => None,
                    })
                    .collect::<HashSet<_>>();
                select_gas(api, gas_owner, budget, &excluded).await?
            }
        };

        debug!(%sender, price, budget, payment = payment.len(), "Built transaction");
        Ok(TransactionData::new(
            kind,
            sender,
            GasData {
                payment,
                owner: gas_owner,
                price,
                budget,
            },
            self.expiration,
        ))
    }
}

/// Arguments address inputs, commands and nested results with a `u16`.
fn index(len: usize, what: &str) -> Result<u16> {
    u16::try_from(len).map_err(|_| Error::TooLarge(format!("more than {} {what}", u16::MAX)))
}

async fn resolve_object<A: SuiApi>(api: &A, id: ObjectId, mutable: bool) -> Result<CallArg> {
    let info = api.get_object(id).await?.ok_or(Error::ObjectNotFound(id))?;
    let arg = match info.owner {
        Some(Owner::Shared {
            initial_shared_version,
        }) => ObjectArg::SharedObject {
            id,
            initial_shared_version,
            mutable,
        },
        _ => ObjectArg::ImmOrOwnedObject(info.object_ref()),
    };
    Ok(CallArg::Object(arg))
}

/// Dry-runs the transaction and derives a budget from the reported costs.
async fn estimate_budget<A: SuiApi>(api: &A, draft: &TransactionData, price: u64) -> Result<u64> {
    let result = api.dry_run(&draft.to_bytes()?).await?;
    let status = &result.effects.status;
    if !status.is_success() {
        return Err(Error::DryRunFailed(
            status.error.clone().unwrap_or_else(|| status.status.clone()),
        ));
    }
    let gas = result.effects.gas_used;
    let base = gas.computation_cost + GAS_SAFE_OVERHEAD * price;
    let budget = (base + gas.storage_cost)
        .saturating_sub(gas.storage_rebate)
        .max(base);
    debug!(?gas, budget, "Estimated gas budget");
    Ok(budget)
}

/// Picks the largest SUI coins of `owner` until they cover `budget`.
async fn select_gas<A: SuiApi>(
    api: &A,
    owner: Address,
    budget: u64,
    excluded: &HashSet<ObjectId>,
) -> Result<Vec<ObjectRef>> {
    let coins = api.get_all_coins(owner, SUI_COIN_TYPE).await?;
    let mut selected = vec![];
    let mut total = 0u64;
    for coin in coins
        .iter()
        .filter(|c| !excluded.contains(&c.coin_object_id))
        .sorted_by_key(|c: &&Coin| std::cmp::Reverse(c.balance))
        .take(MAX_GAS_OBJECTS)
    {
        selected.push(coin.object_ref());
        total = total.saturating_add(coin.balance);
        if total >= budget {
            return Ok(selected);
        }
    }
    Err(Error::InsufficientGas {
        needed: budget,
        available: total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, MOCK_GAS, MockLedger};

    #[tokio::test]
    async fn test_build_resolves_inputs_and_gas() {
        let ledger = MockLedger::new();
        let sender = testing::keypair(1).address();
        let small = ledger.add_coin(sender, SUI_COIN_TYPE, 1_000_000);
        let large = ledger.add_coin(sender, SUI_COIN_TYPE, 5_000_000_000);
        let pool = ledger.add_shared("0xdee9::pool::Pool", 12);
        let cap = ledger.add_owned(sender, "0xdee9::admin::Cap");

        let mut builder = TransactionBuilder::new();
        let pool_arg = builder.shared_object(pool, false).unwrap();
        let cap_arg = builder.object(cap.object_id).unwrap();
        let amount = builder.pure(&10u64).unwrap();
        builder
            .move_call("0xdee9::pool::touch", vec![], vec![pool_arg, cap_arg, amount])
            .unwrap();
        builder.set_sender(sender);

        let tx = builder.build(&ledger).await.unwrap();
        let inputs = &tx.programmable().inputs;
        assert_eq!(
            inputs[0],
            CallArg::Object(ObjectArg::SharedObject {
                id: pool,
                initial_shared_version: 12,
                mutable: false
            })
        );
        assert_eq!(inputs[1], CallArg::Object(ObjectArg::ImmOrOwnedObject(cap)));

        let gas = tx.gas_data();
        assert_eq!(gas.price, 1000);
        assert_eq!(
            gas.budget,
            MOCK_GAS.computation_cost + 1000 * 1000 + MOCK_GAS.storage_cost
                - MOCK_GAS.storage_rebate
        );
        assert_eq!(gas.payment, vec![large]);
        assert_ne!(gas.payment[0], small);
    }

    #[tokio::test]
    async fn test_object_inputs_are_deduplicated() {
        let mut builder = TransactionBuilder::new();
        let id = testing::object_id(9);
        let first = builder.shared_object(id, false).unwrap();
        let second = builder.shared_object(id, true).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            builder.inputs,
            vec![Input::Unresolved { id, mutable: true }]
        );
    }

    #[tokio::test]
    async fn test_build_requires_sender() {
        let ledger = MockLedger::new();
        let builder = TransactionBuilder::new();
        assert!(matches!(
            builder.build(&ledger).await,
            Err(Error::MissingSender)
        ));
    }

    #[tokio::test]
    async fn test_gas_selection_skips_input_coins() {
        let ledger = MockLedger::new();
        let sender = testing::keypair(2).address();
        let only = ledger.add_coin(sender, SUI_COIN_TYPE, 9_000_000_000);

        let mut builder = TransactionBuilder::new();
        let coin = builder.object_ref(only).unwrap();
        builder.transfer_objects(vec![coin], builder.gas()).unwrap();
        builder.set_sender(sender).set_gas_budget(10_000_000);
        assert!(matches!(
            builder.build(&ledger).await,
            Err(Error::InsufficientGas {
                needed: 10_000_000,
                available: 0
            })
        ));
    }

    #[tokio::test]
    async fn test_failed_estimate() {
        let ledger = MockLedger::new();
        ledger.fail_dry_run("MoveAbort(0x2::coin, 2)");
        let sender = testing::keypair(3).address();
        ledger.add_coin(sender, SUI_COIN_TYPE, 1_000_000_000);

        let mut builder = TransactionBuilder::new();
        builder.set_sender(sender);
        assert!(matches!(
            builder.build(&ledger).await,
            Err(Error::DryRunFailed(reason)) if reason.contains("MoveAbort")
        ));
    }

    #[test]
    fn test_move_call_target() {
        let mut builder = TransactionBuilder::new();
        assert_eq!(
            builder.move_call("0x2::coin::zero", vec![], vec![]).unwrap(),
            Argument::Result(0)
        );
        assert!(matches!(
            builder.move_call("0x2::coin", vec![], vec![]),
            Err(Error::InvalidTarget(_))
        ));
        assert!(matches!(
            builder.move_call("pkg::coin::zero", vec![], vec![]),
            Err(Error::InvalidTarget(_))
        ));
        let coins = builder
            .split_coins(Argument::GasCoin, vec![Argument::Input(0); 3])
            .unwrap();
        assert_eq!(coins[2], Argument::NestedResult(1, 2));
    }

    #[test]
    fn test_argument_indexes_do_not_wrap() {
        let mut builder = TransactionBuilder::new();
        let amounts = vec![Argument::Input(0); u16::MAX as usize + 1];
        assert!(matches!(
            builder.split_coins(Argument::GasCoin, amounts),
            Err(Error::TooLarge(_))
        ));
        assert!(builder.commands().is_empty());

        for _ in 0..=u16::MAX {
            builder.pure_bytes(vec![]).unwrap();
        }
        assert_eq!(builder.inputs.len(), u16::MAX as usize + 1);
        assert!(matches!(builder.pure(&1u64), Err(Error::TooLarge(_))));
        assert_eq!(builder.inputs.len(), u16::MAX as usize + 1);
    }
}
