//! Multisig Factory: quorum-based multi-signature wallets in Rust
//!
//! This crate provides:
//! - A wallet engine where every change (quorum updates, asset transfers) is a
//!   proposal that executes once `quorum` distinct signers approve it
//! - A factory that creates isolated wallets and counts them
//! - An in-process asset ledger used as the transfer primitive
//! - JSON persistence, a CLI and a REST/WebSocket API
//!
//! # Example
//!
//! ```rust
//! use multisig_factory::core::{Address, EventLog, Host, NoAssets};
//! use multisig_factory::factory::WalletFactory;
//!
//! let events = EventLog::new();
//! let mut factory = WalletFactory::new(Address::from_label("factory"));
//!
//! let alice = Address::from_label("alice");
//! let bob = Address::from_label("bob");
//! let carol = Address::from_label("carol");
//!
//! // 2-of-3 wallet: alice plus two explicit signers
//! let address = factory.create_wallet(2, &[bob, carol], alice, &events).unwrap();
//! assert_eq!(factory.get_cloned_contract_count(), 1);
//!
//! // Raise the quorum to 3; proposing counts as alice's approval
//! let mut ledger = NoAssets;
//! let mut host = Host::new(&mut ledger, &events);
//! let wallet = factory.wallet_mut(&address).unwrap();
//! let id = wallet.propose_quorum_change(3, &alice, &mut host).unwrap();
//! let result = wallet.approve_tx(id, &bob, &mut host).unwrap();
//!
//! assert!(result.executed);
//! assert_eq!(wallet.quorum(), 3);
//! ```

pub mod api;
pub mod cli;
pub mod core;
pub mod crypto;
pub mod factory;
pub mod ledger;
pub mod storage;

// Re-export commonly used types
pub use api::{create_router, ApiState};
pub use crate::core::{
    Address, ApprovalResult, AssetLedger, EventSink, Host, MultisigWallet, Proposal, ProposalId,
    ProposalKind, WalletError, WalletEvent,
};
pub use factory::WalletFactory;
pub use ledger::TokenLedger;
pub use storage::{HostState, Storage, StorageConfig};
