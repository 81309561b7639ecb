//! Transaction parameter assembly

use super::gas::FeeEstimator;
use crate::chain::ChainRpc;
use crate::error::MinterResult;

use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Eip1559TransactionRequest, U256};
use tracing::debug;

/// Type tag of fee-market transactions
pub const EIP1559_TX_TYPE: u8 = 2;

/// Everything needed to turn a contract call into a signable transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxParams {
    pub from: Address,
    pub chain_id: u64,
    pub nonce: U256,
    pub max_priority_fee_per_gas: U256,
    pub max_fee_per_gas: U256,
    pub tx_type: u8,
    pub value: U256,
}

impl TxParams {
    /// Merge these parameters into an unsigned call (`to` + `data`)
    pub fn apply(&self, call: &TypedTransaction) -> TypedTransaction {
        let mut request = Eip1559TransactionRequest::new()
            .from(self.from)
            .chain_id(self.chain_id)
            .nonce(self.nonce)
            .max_priority_fee_per_gas(self.max_priority_fee_per_gas)
            .max_fee_per_gas(self.max_fee_per_gas)
            .value(self.value);

        if let Some(to) = call.to() {
            request = request.to(to.clone());
        }
        if let Some(data) = call.data() {
            request = request.data(data.clone());
        }

        TypedTransaction::Eip1559(request)
    }
}

/// Builds fee-market transactions from live chain state
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    fees: FeeEstimator,
}

impl TransactionBuilder {
    /// Create a new transaction builder
    pub fn new() -> Self {
        Self {
            fees: FeeEstimator::new(),
        }
    }

    /// Read chain id, nonce and fees for a transaction from `from` paying `value`
    pub async fn params(
        &self,
        rpc: &dyn ChainRpc,
        from: Address,
        value: U256,
    ) -> MinterResult<TxParams> {
        let (chain_id, nonce, fees) = tokio::try_join!(
            rpc.chain_id(),
            rpc.transaction_count(from),
            self.fees.estimate(rpc)
        )?;

        debug!("Built params for {:?}: chain {}, nonce {}", from, chain_id, nonce);

        Ok(TxParams {
            from,
            chain_id,
            nonce,
            max_priority_fee_per_gas: fees.max_priority_fee_per_gas,
            max_fee_per_gas: fees.max_fee_per_gas,
            tx_type: EIP1559_TX_TYPE,
            value,
        })
    }

    /// Apply `params` to `call` and fill in the estimated gas limit
    pub async fn build(
        &self,
        rpc: &dyn ChainRpc,
        call: &TypedTransaction,
        params: &TxParams,
    ) -> MinterResult<TypedTransaction> {
        let mut tx = params.apply(call);
        let gas = rpc.estimate_gas(&tx).await?;
        tx.set_gas(gas);

        debug!("Estimated gas limit {}", gas);
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MockChainRpc;
    use ethers::types::{Bytes, NameOrAddress, U64};

    fn sender() -> Address {
        Address::repeat_byte(0x11)
    }

    fn mock_chain_state() -> MockChainRpc {
        let mut rpc = MockChainRpc::new();
        rpc.expect_chain_id().times(1).returning(|| Ok(59144));
        rpc.expect_transaction_count()
            .withf(|address| *address == Address::repeat_byte(0x11))
            .times(1)
            .returning(|_| Ok(U256::from(7)));
        rpc.expect_gas_price()
            .times(1)
            .returning(|| Ok(U256::from(100)));
        rpc.expect_max_priority_fee()
            .times(1)
            .returning(|| Ok(U256::from(5)));
        rpc
    }

    #[tokio::test]
    async fn test_params_from_chain_state() {
        let rpc = mock_chain_state();
        let value = U256::from(2_000_000_000_000_000_000u64);

        let params = TransactionBuilder::new()
            .params(&rpc, sender(), value)
            .await
            .unwrap();

        assert_eq!(
            params,
            TxParams {
                from: sender(),
                chain_id: 59144,
                nonce: U256::from(7),
                max_priority_fee_per_gas: U256::from(5),
                max_fee_per_gas: U256::from(105),
                tx_type: EIP1559_TX_TYPE,
                value,
            }
        );
    }

    #[tokio::test]
    async fn test_build_fills_gas_and_keeps_call() {
        let target = Address::repeat_byte(0x22);
        let call: TypedTransaction = Eip1559TransactionRequest::new()
            .to(target)
            .data(Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]))
            .into();

        let params = TxParams {
            from: sender(),
            chain_id: 10,
            nonce: U256::from(3),
            max_priority_fee_per_gas: U256::from(1),
            max_fee_per_gas: U256::from(2),
            tx_type: EIP1559_TX_TYPE,
            value: U256::from(500),
        };

        let mut rpc = MockChainRpc::new();
        rpc.expect_estimate_gas()
            .withf(|tx| tx.value() == Some(&U256::from(500)) && tx.gas().is_none())
            .times(1)
            .returning(|_| Ok(U256::from(120_000)));

        let tx = TransactionBuilder::new()
            .build(&rpc, &call, &params)
            .await
            .unwrap();

        assert!(matches!(tx, TypedTransaction::Eip1559(_)));
        assert_eq!(tx.to(), Some(&NameOrAddress::Address(target)));
        assert_eq!(tx.data(), Some(&Bytes::from(vec![0xde, 0xad, 0xbe, 0xef])));
        assert_eq!(tx.from(), Some(&sender()));
        assert_eq!(tx.nonce(), Some(&U256::from(3)));
        assert_eq!(tx.chain_id(), Some(U64::from(10)));
        assert_eq!(tx.gas(), Some(&U256::from(120_000)));
        assert_eq!(tx.value(), Some(&U256::from(500)));
    }
}
