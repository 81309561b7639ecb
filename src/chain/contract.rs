//! Mint contract binding built from a JSON ABI

use crate::config::read_file;
use crate::error::{MinterError, MinterResult};

use async_trait::async_trait;
use ethers::abi::Abi;
use ethers::contract::Contract;
use ethers::providers::{Http, Provider};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Eip1559TransactionRequest, U256};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const MINT_PRICE_FN: &str = "mintPrice";
const MINT_FN: &str = "mint";

/// The two contract entry points the minter relies on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MintContract: Send + Sync {
    /// Current price of one token, in wei
    async fn mint_price(&self) -> MinterResult<U256>;

    /// Unsigned `mint(count)` call: target and calldata, no value or fees
    fn mint_call(&self, count: u64) -> MinterResult<TypedTransaction>;
}

/// L2Pass-style contract exposing `mintPrice()` and payable `mint(uint256)`
pub struct L2PassContract {
    contract: Contract<Provider<Http>>,
}

impl L2PassContract {
    /// Bind `address` using the ABI stored at `abi_path`
    pub fn load(
        abi_path: &Path,
        address: Address,
        client: Arc<Provider<Http>>,
    ) -> MinterResult<Self> {
        let raw = read_file(abi_path)?;
        let abi = parse_abi(&raw)?;
        debug!("Loaded ABI from {:?} for contract {:?}", abi_path, address);

        Ok(Self {
            contract: Contract::new(address, abi, client),
        })
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }
}

/// Parse an ABI and make sure both entry points are present
fn parse_abi(raw: &str) -> MinterResult<Abi> {
    let abi: Abi = serde_json::from_str(raw)
        .map_err(|e| MinterError::Config(format!("Failed to parse contract ABI: {}", e)))?;

    for name in [MINT_PRICE_FN, MINT_FN] {
        if abi.function(name).is_err() {
            return Err(MinterError::Config(format!(
                "Contract ABI has no {} function",
                name
            )));
        }
    }

    Ok(abi)
}

#[async_trait]
impl MintContract for L2PassContract {
    async fn mint_price(&self) -> MinterResult<U256> {
        self.contract
            .method::<_, U256>(MINT_PRICE_FN, ())
            .map_err(|e| MinterError::Contract(e.to_string()))?
            .call()
            .await
            .map_err(|e| MinterError::rpc("eth_call", e))
    }

    fn mint_call(&self, count: u64) -> MinterResult<TypedTransaction> {
        let data = self
            .contract
            .encode(MINT_FN, U256::from(count))
            .map_err(|e| MinterError::Contract(e.to_string()))?;

        Ok(Eip1559TransactionRequest::new()
            .to(self.contract.address())
            .data(data)
            .into())
    }
}
