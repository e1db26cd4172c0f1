//! Core wallet engine
//!
//! - Addresses (20-byte identities)
//! - Proposals (quorum changes and transfers sharing one lifecycle)
//! - Multi-signature wallets
//! - Events and the host collaborators wallets call out to

pub mod address;
pub mod error;
pub mod events;
pub mod host;
pub mod proposal;
pub mod wallet;

pub use address::{Address, AddressError, ADDRESS_LEN};
pub use error::WalletError;
pub use events::{EventLog, EventSink, LogSink, WalletEvent};
pub use host::{AssetLedger, Host, NoAssets, TransferFailure};
pub use proposal::{ApprovalResult, Proposal, ProposalId, ProposalKind, ProposalStatus};
pub use wallet::MultisigWallet;
