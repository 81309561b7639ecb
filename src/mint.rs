//! Mint orchestration: price lookup, payment, submission and confirmation

use crate::chain::{ChainRpc, MintContract};
use crate::config::{ChainConfig, PollConfig};
use crate::error::{MinterError, MinterResult};
use crate::tx::{Account, Confirmation, ConfirmationPoller, TransactionBuilder, TransactionSender};
use crate::units::{from_base_units, ETHER_DECIMALS};

use ethers::types::{H256, U256};
use std::sync::Arc;
use tracing::info;

/// What a single mint produced
#[derive(Debug, Clone, PartialEq)]
pub struct MintReport {
    pub count: u64,
    pub unit_price: U256,
    pub total_price: U256,
    pub tx_hash: H256,
    pub tx_url: String,
    pub confirmation: Confirmation,
}

/// Mints tokens on one chain from one account
pub struct Minter {
    rpc: Arc<dyn ChainRpc>,
    contract: Arc<dyn MintContract>,
    chain: ChainConfig,
    builder: TransactionBuilder,
    sender: TransactionSender,
    poller: ConfirmationPoller,
    /// Refuse payments above this many wei
    spend_limit: Option<U256>,
}

impl Minter {
    pub fn new(
        rpc: Arc<dyn ChainRpc>,
        contract: Arc<dyn MintContract>,
        account: Account,
        chain: ChainConfig,
        poll: PollConfig,
    ) -> Self {
        Self {
            rpc,
            contract,
            chain,
            builder: TransactionBuilder::new(),
            sender: TransactionSender::new(account),
            poller: ConfirmationPoller::new(poll),
            spend_limit: None,
        }
    }

    pub fn with_spend_limit(mut self, limit: Option<U256>) -> Self {
        self.spend_limit = limit;
        self
    }

    /// Mint `count` tokens and wait for the outcome.
    ///
    /// A zero count does nothing and returns `None`. Every other call submits
    /// a new transaction.
    pub async fn mint(&self, count: u64) -> MinterResult<Option<MintReport>> {
        if count == 0 {
            return Ok(None);
        }

        let unit_price = self.contract.mint_price().await?;
        let total_price = unit_price
            .checked_mul(U256::from(count))
            .ok_or_else(|| MinterError::InvalidAmount("Total mint price overflows".to_string()))?;

        println!(
            "Mint one nft price is: {:.5} ETH",
            from_base_units(unit_price, ETHER_DECIMALS)?
        );
        println!(
            "Total mint price is: {:.5} ETH",
            from_base_units(total_price, ETHER_DECIMALS)?
        );

        if let Some(limit) = self.spend_limit {
            if total_price > limit {
                return Err(MinterError::SpendLimitExceeded {
                    total: total_price.to_string(),
                    limit: limit.to_string(),
                });
            }
        }

        let from = self.sender.account().address();
        let call = self.contract.mint_call(count)?;
        let params = self.builder.params(self.rpc.as_ref(), from, total_price).await?;
        let tx = self.builder.build(self.rpc.as_ref(), &call, &params).await?;

        let tx_hash = self.sender.send(self.rpc.as_ref(), &tx).await?;
        println!("Transaction: 0x{}", hex::encode(tx_hash));

        let confirmation = self.poller.wait(self.rpc.as_ref(), tx_hash).await?;
        let tx_url = self.chain.tx_url(tx_hash);
        match confirmation {
            Confirmation::Success => println!("Transaction was successful: {}", tx_url),
            Confirmation::Failure => println!("Transaction failed: {}", tx_url),
            Confirmation::TimedOut => println!(
                "Transaction isn't in the chain after {} seconds",
                self.poller.config().timeout.as_secs()
            ),
        }
        info!("Mint of {} on {} finished: {:?}", count, self.chain.name, confirmation);

        Ok(Some(MintReport {
            count,
            unit_price,
            total_price,
            tx_hash,
            tx_url,
            confirmation,
        }))
    }
}
