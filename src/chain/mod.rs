//! Chain module - RPC access and the minted contract
//!
//! This module provides:
//! - The `ChainRpc` seam over the handful of JSON-RPC calls the minter needs
//! - An HTTP provider implementation with optional proxy
//! - The `MintContract` seam and its ABI-backed implementation

pub mod contract;
pub mod provider;

pub use contract::{L2PassContract, MintContract};
#[cfg(test)]
pub use contract::MockMintContract;
pub use provider::ChainProvider;

use crate::error::MinterResult;

use async_trait::async_trait;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, H256, U256};

/// Outcome of a single receipt lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    /// Node has not seen the transaction yet
    NotFound,
    /// Receipt exists but carries no status yet
    Pending,
    Success,
    Failure,
}

impl ReceiptStatus {
    /// Interpret the `status` field of a receipt
    pub fn from_status(status: Option<u64>) -> Self {
        match status {
            None => ReceiptStatus::Pending,
            Some(1) => ReceiptStatus::Success,
            Some(_) => ReceiptStatus::Failure,
        }
    }
}

/// JSON-RPC calls used across the transaction lifecycle
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// `eth_chainId`
    async fn chain_id(&self) -> MinterResult<u64>;

    /// `eth_getTransactionCount` at the latest block
    async fn transaction_count(&self, address: Address) -> MinterResult<U256>;

    /// `eth_gasPrice`, used as the base fee
    async fn gas_price(&self) -> MinterResult<U256>;

    /// `eth_maxPriorityFeePerGas`
    async fn max_priority_fee(&self) -> MinterResult<U256>;

    /// `eth_estimateGas`
    async fn estimate_gas(&self, tx: &TypedTransaction) -> MinterResult<U256>;

    /// `eth_sendRawTransaction`
    async fn send_raw_transaction(&self, raw: Bytes) -> MinterResult<H256>;

    /// `eth_getTransactionReceipt`
    async fn transaction_receipt(&self, tx_hash: H256) -> MinterResult<ReceiptStatus>;
}
