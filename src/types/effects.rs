use serde::Deserialize;

use super::str_u64;

/// Outcome of executing or simulating a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEffects {
    pub status: ExecutionStatus,
    pub gas_used: GasCostSummary,
    #[serde(default)]
    pub transaction_digest: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ExecutionStatus {
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl ExecutionStatus {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            status: "failure".to_string(),
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasCostSummary {
    #[serde(deserialize_with = "str_u64::deserialize")]
    pub computation_cost: u64,
    #[serde(deserialize_with = "str_u64::deserialize")]
    pub storage_cost: u64,
    #[serde(deserialize_with = "str_u64::deserialize")]
    pub storage_rebate: u64,
    #[serde(default, deserialize_with = "str_u64::deserialize")]
    pub non_refundable_storage_fee: u64,
}

impl GasCostSummary {
    /// Net gas charged to the payer, negative when the rebate outweighs
    /// the costs.
    pub fn net_gas_usage(&self) -> i64 {
        self.computation_cost as i64 + self.storage_cost as i64 - self.storage_rebate as i64
    }
}

/// Response of `sui_dryRunTransactionBlock`.
#[derive(Clone, Debug, Deserialize)]
pub struct DryRunResult {
    pub effects: TransactionEffects,
}

/// Response of `sui_executeTransactionBlock`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub digest: String,
    #[serde(default)]
    pub effects: Option<TransactionEffects>,
    #[serde(default)]
    pub object_changes: Option<Vec<serde_json::Value>>,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.effects.as_ref().is_some_and(|e| e.status.is_success())
    }
}
