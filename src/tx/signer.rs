//! Account derivation and transaction signing
//!
//! The private key lives only inside the wallet and is never logged.

use crate::error::{MinterError, MinterResult};

use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, H256, U256};
use ethers::utils::{keccak256, to_checksum};

/// Derive the sender address for a hex-encoded secret key
pub fn derive_address(secret: &str) -> MinterResult<Address> {
    Ok(parse_wallet(secret)?.address())
}

fn parse_wallet(secret: &str) -> MinterResult<LocalWallet> {
    secret
        .trim()
        .parse::<LocalWallet>()
        .map_err(|e| MinterError::Wallet(format!("Invalid private key: {}", e)))
}

/// Signing account for the process lifetime
#[derive(Debug, Clone)]
pub struct Account {
    wallet: LocalWallet,
    address: Address,
}

/// Raw signed bytes plus the fields they commit to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub raw: Bytes,
    pub hash: H256,
    pub nonce: U256,
    pub chain_id: u64,
}

impl Account {
    /// Create an account from a hex-encoded private key (with or without 0x)
    pub fn from_private_key(secret: &str) -> MinterResult<Self> {
        Ok(Self {
            address: derive_address(secret)?,
            wallet: parse_wallet(secret)?,
        })
    }

    /// Create an account from an optional secret, failing when it is absent
    pub fn from_secret(secret: Option<&str>) -> MinterResult<Self> {
        match secret {
            Some(secret) if !secret.trim().is_empty() => Self::from_private_key(secret),
            _ => Err(MinterError::Wallet(format!(
                "No private key configured. Set {}",
                crate::config::PRIVATE_KEY_ENV
            ))),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// EIP-55 mixed-case address
    pub fn checksum_address(&self) -> String {
        to_checksum(&self.address(), None)
    }

    /// Sign a fully built transaction
    pub async fn sign(&self, tx: &TypedTransaction) -> MinterResult<SignedTransaction> {
        let chain_id = tx
            .chain_id()
            .ok_or_else(|| MinterError::Wallet("Transaction has no chain id".to_string()))?
            .as_u64();
        let nonce = *tx
            .nonce()
            .ok_or_else(|| MinterError::Wallet("Transaction has no nonce".to_string()))?;

        let wallet = self.wallet.clone().with_chain_id(chain_id);
        let signature = wallet
            .sign_transaction(tx)
            .await
            .map_err(|e| MinterError::Wallet(e.to_string()))?;

        let raw = tx.rlp_signed(&signature);
        let hash = H256::from(keccak256(&raw));

        Ok(SignedTransaction {
            raw,
            hash,
            nonce,
            chain_id,
        })
    }
}
