//! HTTP chain provider with optional proxy

use super::{ChainRpc, ReceiptStatus};
use crate::config::ChainConfig;
use crate::error::{MinterError, MinterResult};

use async_trait::async_trait;
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, H256, U256};
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// JSON-RPC provider for a single chain
pub struct ChainProvider {
    /// Chain configuration
    config: ChainConfig,
    /// HTTP provider
    http: Arc<Provider<Http>>,
}

impl ChainProvider {
    /// Create a new chain provider, routing requests through `proxy` when given
    pub fn new(config: ChainConfig, proxy: Option<&str>) -> MinterResult<Self> {
        let url = Url::parse(&config.rpc_url).map_err(|e| {
            MinterError::Config(format!("Invalid RPC URL for {}: {}", config.name, e))
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(format!("http://{}", proxy))
                .map_err(|e| MinterError::Config(format!("Invalid proxy {}: {}", proxy, e)))?;
            builder = builder.proxy(proxy);
            debug!("Routing RPC traffic for {} through proxy", config.name);
        }
        let client = builder
            .build()
            .map_err(|e| MinterError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let http = Arc::new(Provider::new(Http::new_with_client(url, client)));
        info!("Connected provider for chain {}", config.name);

        Ok(Self { config, http })
    }

    /// Get the underlying HTTP provider
    pub fn http(&self) -> Arc<Provider<Http>> {
        self.http.clone()
    }
}

#[async_trait]
impl ChainRpc for ChainProvider {
    async fn chain_id(&self) -> MinterResult<u64> {
        self.http
            .get_chainid()
            .await
            .map(|id| id.as_u64())
            .map_err(|e| MinterError::rpc("eth_chainId", e))
    }

    async fn transaction_count(&self, address: Address) -> MinterResult<U256> {
        self.http
            .get_transaction_count(address, None)
            .await
            .map_err(|e| MinterError::rpc("eth_getTransactionCount", e))
    }

    async fn gas_price(&self) -> MinterResult<U256> {
        self.http
            .get_gas_price()
            .await
            .map_err(|e| MinterError::rpc("eth_gasPrice", e))
    }

    async fn max_priority_fee(&self) -> MinterResult<U256> {
        self.http
            .request::<_, U256>("eth_maxPriorityFeePerGas", ())
            .await
            .map_err(|e| MinterError::rpc("eth_maxPriorityFeePerGas", e))
    }

    async fn estimate_gas(&self, tx: &TypedTransaction) -> MinterResult<U256> {
        self.http
            .estimate_gas(tx, None)
            .await
            .map_err(|e| MinterError::rpc("eth_estimateGas", e))
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> MinterResult<H256> {
        let pending = self
            .http
            .send_raw_transaction(raw)
            .await
            .map_err(|e| MinterError::TransactionRejected(e.to_string()))?;
        Ok(pending.tx_hash())
    }

    async fn transaction_receipt(&self, tx_hash: H256) -> MinterResult<ReceiptStatus> {
        let receipt = self
            .http
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| MinterError::rpc("eth_getTransactionReceipt", e))?;

        let status = match receipt {
            Some(receipt) => ReceiptStatus::from_status(receipt.status.map(|s| s.as_u64())),
            None => ReceiptStatus::NotFound,
        };
        debug!("Receipt for {:?} on {}: {:?}", tx_hash, self.config.name, status);
        Ok(status)
    }
}
