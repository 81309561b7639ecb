//! Transaction lifecycle: fees, parameters, signing, broadcast and confirmation

mod builder;
mod gas;
mod poller;
mod sender;
mod signer;

pub use builder::TransactionBuilder;
pub use poller::{Confirmation, ConfirmationPoller};
pub use sender::TransactionSender;
pub use signer::Account;
