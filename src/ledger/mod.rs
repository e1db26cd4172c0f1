//! Fungible asset ledger
//!
//! Balances per `(asset, holder)` with a bounded transfer history. The ledger
//! implements [`crate::core::AssetLedger`], so executed transfer proposals move
//! real balances out of the wallet's account.

pub mod asset;
pub mod manager;

pub use asset::{Asset, AssetMetadata, LedgerError, TransferRecord, MAX_HISTORY};
pub use manager::TokenLedger;
