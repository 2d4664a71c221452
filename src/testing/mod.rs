//! In-memory ledger and test utilities.
//!
//! [`MockLedger`] implements [`SuiApi`] over a map of objects and applies the
//! subset of transaction semantics the toolkit relies on: owned object
//! versions are checked and bumped, `MergeCoins` moves balances, gas is
//! charged to the first payment coin. Knobs allow simulating a failing dry
//! run and a ledger that acknowledges transactions without applying them.
//!
//! [`keypair`] and [`object_id`] produce deterministic fixtures.

use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use dashmap::DashMap;
use itertools::Itertools;

use crate::{
    crypto::{Keypair, blake2b256},
    error::{Error, Result},
    rpc::SuiApi,
    types::{
        Address, Argument, CallArg, Coin, Command, Digest, DryRunResult, ExecutionResult,
        ExecutionStatus, GasCostSummary, ObjectArg, ObjectId, ObjectInfo, ObjectRef, Owner, Page,
        SequenceNumber, TransactionData, TransactionEffects,
    },
};

const PAGE_SIZE: usize = 50;
const DEFAULT_GAS_PRICE: u64 = 1000;

/// Gas charged for every transaction the mock ledger runs.
pub const MOCK_GAS: GasCostSummary = GasCostSummary {
    computation_cost: 750_000,
    storage_cost: 1_976_000,
    storage_rebate: 978_120,
    non_refundable_storage_fee: 9_880,
};

/// Deterministic Ed25519 keypair.
pub fn keypair(seed: u8) -> Keypair {
    Keypair::ed25519([seed; 32])
}

/// Deterministic object id with `n` in the low bytes.
pub fn object_id(n: u64) -> ObjectId {
    let mut bytes = [0u8; 32];
    bytes[24..].copy_from_slice(&n.to_be_bytes());
    Address::new(bytes)
}

fn object_digest(id: ObjectId, version: SequenceNumber) -> Digest {
    Digest::new(blake2b256(&[id.as_bytes(), &version.to_le_bytes()]))
}

#[derive(Clone, Debug)]
pub struct MockObject {
    pub object_ref: ObjectRef,
    pub owner: Owner,
    pub type_: String,
    pub coin: Option<MockCoin>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockCoin {
    pub coin_type: String,
    pub balance: u64,
}

#[derive(Debug)]
pub struct MockLedger {
    objects: Arc<DashMap<ObjectId, MockObject>>,
    calls: Arc<DashMap<&'static str, usize>>,
    executed: Mutex<Vec<TransactionData>>,
    dry_run_failure: Mutex<Option<String>>,
    inert_execution: AtomicBool,
    epoch: AtomicU64,
    gas_price: AtomicU64,
    next_id: AtomicU64,
    lamport: AtomicU64,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(DashMap::new()),
            calls: Arc::new(DashMap::new()),
            executed: Mutex::new(vec![]),
            dry_run_failure: Mutex::new(None),
            inert_execution: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            gas_price: AtomicU64::new(DEFAULT_GAS_PRICE),
            next_id: AtomicU64::new(0x1000),
            lamport: AtomicU64::new(1),
        }
    }

    pub fn with_epoch(self, epoch: u64) -> Self {
        self.set_epoch(epoch);
        self
    }

    pub fn set_epoch(&self, epoch: u64) {
        self.epoch.store(epoch, Ordering::SeqCst);
    }

    pub fn set_gas_price(&self, price: u64) {
        self.gas_price.store(price, Ordering::SeqCst);
    }

    /// Makes every subsequent dry run report a failure with `reason`.
    pub fn fail_dry_run(&self, reason: impl Into<String>) {
        *lock(&self.dry_run_failure) = Some(reason.into());
    }

    /// When set, `execute` reports success without touching any object.
    pub fn set_inert_execution(&self, inert: bool) {
        self.inert_execution.store(inert, Ordering::SeqCst);
    }

    fn fresh_id(&self) -> ObjectId {
        object_id(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn insert(&self, id: ObjectId, version: SequenceNumber, owner: Owner, type_: String, coin: Option<MockCoin>) -> ObjectRef {
        let object_ref = ObjectRef::new(id, version, object_digest(id, version));
        self.objects.insert(
            id,
            MockObject {
                object_ref,
                owner,
                type_,
                coin,
            },
        );
        object_ref
    }

    pub fn add_coin(&self, owner: Address, coin_type: &str, balance: u64) -> ObjectRef {
        self.insert(
            self.fresh_id(),
            1,
            Owner::AddressOwner(owner),
            format!("0x2::coin::Coin<{coin_type}>"),
            Some(MockCoin {
                coin_type: coin_type.to_string(),
                balance,
            }),
        )
    }

    pub fn add_owned(&self, owner: Address, type_: &str) -> ObjectRef {
        self.insert(self.fresh_id(), 1, Owner::AddressOwner(owner), type_.to_string(), None)
    }

    pub fn add_shared(&self, type_: &str, initial_shared_version: SequenceNumber) -> ObjectId {
        let id = self.fresh_id();
        self.insert(
            id,
            initial_shared_version,
            Owner::Shared {
                initial_shared_version,
            },
            type_.to_string(),
            None,
        );
        id
    }

    pub fn object(&self, id: ObjectId) -> Option<MockObject> {
        self.objects.get(&id).map(|o| o.clone())
    }

    /// Coins of `coin_type` owned by `owner`, ordered by object id.
    pub fn coins_of(&self, owner: Address, coin_type: &str) -> Vec<Coin> {
        self.objects
            .iter()
            .filter(|o| o.owner == Owner::AddressOwner(owner))
            .filter_map(|o| {
                let coin = o.coin.as_ref().filter(|c| c.coin_type == coin_type)?;
                Some(Coin {
                    coin_type: coin.coin_type.clone(),
                    coin_object_id: o.object_ref.object_id,
                    version: o.object_ref.version,
                    digest: o.object_ref.digest,
                    balance: coin.balance,
                })
            })
            .sorted_by_key(|c| c.coin_object_id)
            .collect()
    }

    pub fn balance(&self, owner: Address, coin_type: &str) -> u64 {
        self.coins_of(owner, coin_type).iter().map(|c| c.balance).sum()
    }

    /// Number of times the given `SuiApi` method was called.
    pub fn calls(&self, method: &str) -> usize {
        self.calls.get(method).map(|c| *c).unwrap_or_default()
    }

    pub fn executed(&self) -> Vec<TransactionData> {
        lock(&self.executed).clone()
    }

    fn record(&self, method: &'static str) {
        *self.calls.entry(method).or_default() += 1;
    }

    fn stale(id: ObjectId) -> Error {
        Error::Rpc {
            code: -32002,
            message: format!("Object {id} is not available for consumption"),
        }
    }

    /// Checks object references against the current state.
    fn validate(&self, tx: &TransactionData) -> Result<()> {
        let sender = tx.sender();
        for input in &tx.programmable().inputs {
            match input {
                CallArg::Object(ObjectArg::ImmOrOwnedObject(r)) => {
                    let object = self.objects.get(&r.object_id).ok_or(Self::stale(r.object_id))?;
                    if object.object_ref != *r {
                        return Err(Self::stale(r.object_id));
                    }
                    if !matches!(object.owner, Owner::AddressOwner(o) if o == sender)
                        && object.owner != Owner::Immutable
                    {
                        return Err(Error::Rpc {
                            code: -32002,
                            message: format!("Object {} is not owned by {sender}", r.object_id),
                        });
                    }
                }
                CallArg::Object(ObjectArg::SharedObject { id, .. }) => {
                    let object = self.objects.get(id).ok_or(Self::stale(*id))?;
                    if !matches!(object.owner, Owner::Shared { .. }) {
                        return Err(Self::stale(*id));
                    }
                }
                _ => {}
            }
        }
        let gas = tx.gas_data();
        for payment in &gas.payment {
            let object = self.objects.get(&payment.object_id).ok_or(Self::stale(payment.object_id))?;
            if object.object_ref != *payment || object.owner != Owner::AddressOwner(gas.owner) {
                return Err(Self::stale(payment.object_id));
            }
        }
        Ok(())
    }

    fn payment_balance(&self, tx: &TransactionData) -> u64 {
        tx.gas_data()
            .payment
            .iter()
            .filter_map(|p| self.objects.get(&p.object_id).and_then(|o| o.coin.as_ref().map(|c| c.balance)))
            .sum()
    }

    fn effects(&self, tx: &TransactionData, digest: Option<String>) -> TransactionEffects {
        let gas = tx.gas_data();
        let status = match lock(&self.dry_run_failure).clone() {
            Some(reason) => ExecutionStatus::failure(reason),
            None if !gas.payment.is_empty() && self.payment_balance(tx) < gas.budget => {
                ExecutionStatus::failure("InsufficientCoinBalance")
            }
            None if !gas.payment.is_empty() && gas.budget < MOCK_GAS.computation_cost => {
                ExecutionStatus::failure("InsufficientGas")
            }
            None => ExecutionStatus::success(),
        };
        TransactionEffects {
            status,
            gas_used: MOCK_GAS,
            transaction_digest: digest,
        }
    }

    fn resolve(tx: &TransactionData, arg: &Argument) -> Option<ObjectId> {
        match arg {
            Argument::GasCoin => tx.gas_data().payment.first().map(|p| p.object_id),
            Argument::Input(i) => match tx.programmable().inputs.get(*i as usize)? {
                CallArg::Object(object) => Some(object.id()),
                CallArg::Pure(_) => None,
            },
            Argument::Result(_) | Argument::NestedResult(..) => None,
        }
    }

    fn apply(&self, tx: &TransactionData) {
        for command in &tx.programmable().commands {
            if let Command::MergeCoins(target, sources) = command {
                let Some(target) = Self::resolve(tx, target) else {
                    continue;
                };
                let mut merged = 0;
                for source in sources.iter().filter_map(|s| Self::resolve(tx, s)) {
                    if let Some((_, object)) = self.objects.remove(&source) {
                        merged += object.coin.map(|c| c.balance).unwrap_or_default();
                    }
                }
                if let Some(mut object) = self.objects.get_mut(&target)
                    && let Some(coin) = object.coin.as_mut()
                {
                    coin.balance += merged;
                }
            }
        }

        let version = self.lamport.fetch_add(1, Ordering::SeqCst)
            + tx
                .owned_object_refs()
                .iter()
                .map(|r| r.version)
                .max()
                .unwrap_or_default();
        for r in tx.owned_object_refs() {
            if let Some(mut object) = self.objects.get_mut(&r.object_id) {
                object.object_ref = ObjectRef::new(r.object_id, version, object_digest(r.object_id, version));
            }
        }

        let charge = MOCK_GAS.net_gas_usage().max(0) as u64;
        if let Some(payment) = tx.gas_data().payment.first()
            && let Some(mut object) = self.objects.get_mut(&payment.object_id)
            && let Some(coin) = object.coin.as_mut()
        {
            coin.balance = coin.balance.saturating_sub(charge);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SuiApi for MockLedger {
    async fn get_object(&self, id: ObjectId) -> Result<Option<ObjectInfo>> {
        self.record("get_object");
        Ok(self.objects.get(&id).map(|o| ObjectInfo {
            object_id: id,
            version: o.object_ref.version,
            digest: o.object_ref.digest,
            type_: Some(o.type_.clone()),
            owner: Some(o.owner.clone()),
        }))
    }

    async fn get_coins(
        &self,
        owner: Address,
        coin_type: &str,
        cursor: Option<&str>,
    ) -> Result<Page<Coin>> {
        self.record("get_coins");
        let after = cursor.map(str::parse::<ObjectId>).transpose()?;
        let mut remaining = self
            .coins_of(owner, coin_type)
            .into_iter()
            .filter(|c| after.is_none_or(|a| c.coin_object_id > a))
            .collect::<Vec<_>>();
        let has_next_page = remaining.len() > PAGE_SIZE;
        remaining.truncate(PAGE_SIZE);
        Ok(Page {
            next_cursor: remaining.last().map(|c| c.coin_object_id.to_string()),
            data: remaining,
            has_next_page,
        })
    }

    async fn latest_epoch(&self) -> Result<u64> {
        self.record("latest_epoch");
        Ok(self.epoch.load(Ordering::SeqCst))
    }

    async fn reference_gas_price(&self) -> Result<u64> {
        self.record("reference_gas_price");
        Ok(self.gas_price.load(Ordering::SeqCst))
    }

    async fn dry_run(&self, tx_bytes: &[u8]) -> Result<DryRunResult> {
        self.record("dry_run");
        let tx = TransactionData::from_bytes(tx_bytes)?;
        self.validate(&tx)?;
        Ok(DryRunResult {
            effects: self.effects(&tx, None),
        })
    }

    async fn execute(&self, tx_bytes: &[u8], signatures: &[String]) -> Result<ExecutionResult> {
        self.record("execute");
        if signatures.is_empty() {
            return Err(Error::InvalidRequest("missing signatures".to_string()));
        }
        let tx = TransactionData::from_bytes(tx_bytes)?;
        if tx.gas_data().payment.is_empty() {
            return Err(Error::InvalidRequest("missing gas payment".to_string()));
        }
        self.validate(&tx)?;

        let digest = Digest::new(blake2b256(&[tx_bytes])).to_string();
        let effects = self.effects(&tx, Some(digest.clone()));
        if effects.status.is_success() && !self.inert_execution.load(Ordering::SeqCst) {
            self.apply(&tx);
        }
        lock(&self.executed).push(tx);
        Ok(ExecutionResult {
            digest,
            effects: Some(effects),
            object_changes: None,
        })
    }
}
