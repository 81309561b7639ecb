//! Receipt polling until the transaction reaches a terminal state

use crate::chain::{ChainRpc, ReceiptStatus};
use crate::config::PollConfig;
use crate::error::MinterResult;

use ethers::types::H256;
use std::time::Duration;
use tracing::debug;

/// Terminal outcome of polling a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Mined with status 1
    Success,
    /// Mined and reverted
    Failure,
    /// Never seen by the node within the timeout budget
    TimedOut,
}

/// Polls for a receipt at a fixed interval
#[derive(Debug, Clone, Copy)]
pub struct ConfirmationPoller {
    config: PollConfig,
}

impl ConfirmationPoller {
    pub fn new(config: PollConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> PollConfig {
        self.config
    }

    /// Block until `tx_hash` succeeds, fails or stays unseen past the timeout.
    ///
    /// Only not-found responses consume the timeout budget. While the receipt
    /// exists without a status, polling continues without counting the wait.
    pub async fn wait(&self, rpc: &dyn ChainRpc, tx_hash: H256) -> MinterResult<Confirmation> {
        let mut unseen_for = Duration::ZERO;

        loop {
            match rpc.transaction_receipt(tx_hash).await? {
                ReceiptStatus::Success => return Ok(Confirmation::Success),
                ReceiptStatus::Failure => return Ok(Confirmation::Failure),
                ReceiptStatus::Pending => {
                    debug!("Transaction {:?} mined, status pending", tx_hash);
                }
                ReceiptStatus::NotFound => {
                    unseen_for += self.config.interval;
                    if unseen_for > self.config.timeout {
                        return Ok(Confirmation::TimedOut);
                    }
                    debug!(
                        "Transaction {:?} not found ({:?} / {:?})",
                        tx_hash, unseen_for, self.config.timeout
                    );
                }
            }

            tokio::time::sleep(self.config.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MockChainRpc;
    use crate::error::MinterError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn poller() -> ConfirmationPoller {
        ConfirmationPoller::new(PollConfig::default())
    }

    /// Mock returning `responses` in order, repeating the last one
    fn scripted(responses: Vec<ReceiptStatus>, calls: Arc<AtomicUsize>) -> MockChainRpc {
        let mut rpc = MockChainRpc::new();
        rpc.expect_transaction_receipt().returning(move |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Ok(responses[n.min(responses.len() - 1)])
        });
        rpc
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_stops_polling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let rpc = scripted(
            vec![
                ReceiptStatus::NotFound,
                ReceiptStatus::Pending,
                ReceiptStatus::Success,
                ReceiptStatus::Failure,
            ],
            calls.clone(),
        );

        let outcome = poller().wait(&rpc, H256::zero()).await.unwrap();
        assert_eq!(outcome, Confirmation::Success);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_stops_polling() {
        let mut rpc = MockChainRpc::new();
        rpc.expect_transaction_receipt()
            .times(1)
            .returning(|_| Ok(ReceiptStatus::Failure));

        let start = Instant::now();
        let outcome = poller().wait(&rpc, H256::zero()).await.unwrap();
        assert_eq!(outcome, Confirmation::Failure);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_on_eleventh_not_found() {
        let mut rpc = MockChainRpc::new();
        rpc.expect_transaction_receipt()
            .times(11)
            .returning(|_| Ok(ReceiptStatus::NotFound));

        let start = Instant::now();
        let outcome = poller().wait(&rpc, H256::zero()).await.unwrap();
        assert_eq!(outcome, Confirmation::TimedOut);

        // ten sleeps of one interval between the eleven queries
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(100));
        assert!(elapsed < Duration::from_secs(110));
    }

    #[tokio::test(start_paused = true)]
    async fn test_compressed_budget() {
        let config = PollConfig {
            timeout: Duration::from_millis(30),
            interval: Duration::from_millis(10),
        };
        let mut rpc = MockChainRpc::new();
        rpc.expect_transaction_receipt()
            .times(4)
            .returning(|_| Ok(ReceiptStatus::NotFound));

        let outcome = ConfirmationPoller::new(config)
            .wait(&rpc, H256::zero())
            .await
            .unwrap();
        assert_eq!(outcome, Confirmation::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_does_not_reset_budget() {
        // 100s unseen, then pending, then the next not-found exceeds the budget
        let mut responses = vec![ReceiptStatus::NotFound; 10];
        responses.extend(vec![ReceiptStatus::Pending; 20]);
        responses.extend(vec![ReceiptStatus::NotFound; 10]);
        responses.push(ReceiptStatus::Success);

        let calls = Arc::new(AtomicUsize::new(0));
        let rpc = scripted(responses, calls.clone());

        let outcome = poller().wait(&rpc, H256::zero()).await.unwrap();
        assert_eq!(outcome, Confirmation::TimedOut);
        assert_eq!(calls.load(Ordering::SeqCst), 31);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_time_not_counted() {
        // 500s spent pending would time out if it counted
        let mut responses = vec![ReceiptStatus::NotFound; 5];
        responses.extend(vec![ReceiptStatus::Pending; 50]);
        responses.extend(vec![ReceiptStatus::NotFound; 5]);
        responses.push(ReceiptStatus::Success);

        let calls = Arc::new(AtomicUsize::new(0));
        let rpc = scripted(responses, calls.clone());

        let outcome = poller().wait(&rpc, H256::zero()).await.unwrap();
        assert_eq!(outcome, Confirmation::Success);
        assert_eq!(calls.load(Ordering::SeqCst), 61);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rpc_error_propagates() {
        let mut rpc = MockChainRpc::new();
        rpc.expect_transaction_receipt()
            .times(1)
            .returning(|_| Err(MinterError::rpc("eth_getTransactionReceipt", "bad response")));

        let err = poller().wait(&rpc, H256::zero()).await.unwrap_err();
        assert!(matches!(err, MinterError::Rpc { .. }));
    }
}
