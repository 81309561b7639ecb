//! EIP-1559 fee estimation

use crate::chain::ChainRpc;
use crate::error::MinterResult;

use ethers::types::U256;
use tracing::debug;

/// Fee caps for a fee-market transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeEstimate {
    pub max_priority_fee_per_gas: U256,
    pub max_fee_per_gas: U256,
}

/// Derives fee caps from the node's current base and priority fee
#[derive(Debug, Clone, Copy, Default)]
pub struct FeeEstimator;

impl FeeEstimator {
    /// Create a new fee estimator
    pub fn new() -> Self {
        Self
    }

    /// max fee = base fee + priority fee
    pub async fn estimate(&self, rpc: &dyn ChainRpc) -> MinterResult<FeeEstimate> {
        let (base_fee, priority_fee) = tokio::try_join!(rpc.gas_price(), rpc.max_priority_fee())?;

        let estimate = FeeEstimate {
            max_priority_fee_per_gas: priority_fee,
            max_fee_per_gas: base_fee.saturating_add(priority_fee),
        };

        debug!(
            "Fee estimate: base {} wei, priority {} wei, max {} wei",
            base_fee, priority_fee, estimate.max_fee_per_gas
        );
        Ok(estimate)
    }
}
