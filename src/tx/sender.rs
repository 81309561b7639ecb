//! Transaction signing and broadcast
//!
//! A rejected transaction is fatal for the invocation; nothing is retried.

use super::signer::Account;
use crate::chain::ChainRpc;
use crate::error::MinterResult;

use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::H256;
use tracing::{info, warn};

/// Signs transactions with the account key and submits them
pub struct TransactionSender {
    /// Signing account
    account: Account,
}

impl TransactionSender {
    /// Create a new transaction sender
    pub fn new(account: Account) -> Self {
        Self { account }
    }

    /// Sign `tx` and submit the raw bytes, returning the transaction hash
    pub async fn send(&self, rpc: &dyn ChainRpc, tx: &TypedTransaction) -> MinterResult<H256> {
        let signed = self.account.sign(tx).await?;

        let tx_hash = rpc.send_raw_transaction(signed.raw).await?;
        if tx_hash != signed.hash {
            warn!(
                "Node returned hash {:?}, locally computed {:?}",
                tx_hash, signed.hash
            );
        }

        info!(
            "Transaction sent: {:?} (chain {}, nonce {})",
            tx_hash, signed.chain_id, signed.nonce
        );
        Ok(tx_hash)
    }

    /// Get the sending account
    pub fn account(&self) -> &Account {
        &self.account
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MockChainRpc;
    use crate::error::MinterError;
    use ethers::types::{Address, Eip1559TransactionRequest};
    use ethers::utils::keccak256;

    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn tx() -> TypedTransaction {
        Eip1559TransactionRequest::new()
            .to(Address::repeat_byte(0x42))
            .chain_id(1u64)
            .nonce(0u64)
            .gas(100_000u64)
            .max_priority_fee_per_gas(1u64)
            .max_fee_per_gas(2u64)
            .into()
    }

    #[tokio::test]
    async fn test_send_submits_signed_bytes() {
        let account = Account::from_private_key(DEV_KEY).unwrap();
        let expected = account.sign(&tx()).await.unwrap();
        let expected_raw = expected.raw.clone();

        let mut rpc = MockChainRpc::new();
        rpc.expect_send_raw_transaction()
            .withf(move |raw| *raw == expected_raw)
            .times(1)
            .returning(|raw| Ok(H256::from(keccak256(&raw))));

        let sender = TransactionSender::new(account);
        let hash = sender.send(&rpc, &tx()).await.unwrap();
        assert_eq!(hash, expected.hash);
    }

    #[tokio::test]
    async fn test_rejection_is_not_retried() {
        let account = Account::from_private_key(DEV_KEY).unwrap();

        let mut rpc = MockChainRpc::new();
        rpc.expect_send_raw_transaction().times(1).returning(|_| {
            Err(MinterError::TransactionRejected(
                "insufficient funds for gas * price + value".into(),
            ))
        });

        let sender = TransactionSender::new(account);
        let err = sender.send(&rpc, &tx()).await.unwrap_err();
        assert!(matches!(err, MinterError::TransactionRejected(_)));
    }
}
