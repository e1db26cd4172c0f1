//! Wallet factory
//!
//! Stamps out independent [`crate::core::MultisigWallet`] instances and tracks
//! how many were created.
//!
//! # Example
//!
//! ```ignore
//! use multisig_factory::core::{Address, LogSink};
//! use multisig_factory::factory::WalletFactory;
//!
//! let mut factory = WalletFactory::new(Address::from_label("factory"));
//! let signers = vec![Address::from_label("bob"), Address::from_label("carol")];
//!
//! let wallet = factory.create_wallet(2, &signers, Address::from_label("alice"), &LogSink)?;
//! assert_eq!(factory.get_cloned_contract_count(), 1);
//! ```

pub mod registry;

pub use registry::WalletFactory;
