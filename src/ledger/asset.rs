//! Fungible asset balances
//!
//! A single asset: fixed metadata, balances per holder and a bounded record of
//! recent transfers.

use crate::core::address::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Transfers kept per asset
pub const MAX_HISTORY: usize = 100;

/// Asset ledger errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u128, need: u128 },
    #[error("Invalid amount: amount must be greater than 0")]
    InvalidAmount,
    #[error("Asset not found: {0}")]
    AssetNotFound(Address),
    #[error("Asset already exists: {0}")]
    AssetAlreadyExists(Address),
    #[error("Invalid address: cannot transfer to self")]
    SelfTransfer,
    #[error("Invalid symbol: must be 1-10 characters")]
    InvalidSymbol,
    #[error("Only the issuer {0} may mint")]
    NotIssuer(Address),
    #[error("Supply overflow")]
    SupplyOverflow,
}

/// Asset metadata (immutable after registration)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetMetadata {
    /// Ticker, e.g. "USD"
    pub symbol: String,
    /// Account that received the initial supply and may mint more
    pub issuer: Address,
}

impl AssetMetadata {
    pub fn new(symbol: String, issuer: Address) -> Result<Self, LedgerError> {
        if symbol.is_empty() || symbol.len() > 10 {
            return Err(LedgerError::InvalidSymbol);
        }
        Ok(Self { symbol, issuer })
    }
}

/// A completed balance movement
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferRecord {
    pub asset: Address,
    pub from: Address,
    pub to: Address,
    pub amount: u128,
}

/// A fungible asset
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Asset {
    pub address: Address,
    pub metadata: AssetMetadata,
    total_supply: u128,
    balances: BTreeMap<Address, u128>,
    /// Most recent transfers (last 100)
    pub transfer_history: Vec<TransferRecord>,
}

impl Asset {
    /// Create an asset with the whole initial supply held by the issuer
    pub fn new(address: Address, metadata: AssetMetadata, supply: u128) -> Self {
        let mut balances = BTreeMap::new();
        if supply > 0 {
            balances.insert(metadata.issuer, supply);
        }

        Self {
            address,
            metadata,
            total_supply: supply,
            balances,
            transfer_history: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn balance_of(&self, holder: &Address) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Holders with a non-zero balance
    pub fn holders(&self) -> Vec<(Address, u128)> {
        self.balances
            .iter()
            .filter(|(_, &b)| b > 0)
            .map(|(a, &b)| (*a, b))
            .collect()
    }

    /// Move `amount` from `from` to `to`; all checks run before any balance changes
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<TransferRecord, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }

        if from == to {
            return Err(LedgerError::SelfTransfer);
        }

        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(LedgerError::InsufficientBalance {
                have: from_balance,
                need: amount,
            });
        }

        *self.balances.entry(*from).or_insert(0) -= amount;
        *self.balances.entry(*to).or_insert(0) += amount;

        let record = TransferRecord {
            asset: self.address,
            from: *from,
            to: *to,
            amount,
        };

        self.transfer_history.push(record.clone());
        if self.transfer_history.len() > MAX_HISTORY {
            self.transfer_history.remove(0);
        }

        Ok(record)
    }

    /// Issue new units to `to`; only the issuer may mint
    pub fn mint(&mut self, caller: &Address, to: &Address, amount: u128) -> Result<u128, LedgerError> {
        if caller != &self.metadata.issuer {
            return Err(LedgerError::NotIssuer(self.metadata.issuer));
        }
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }

        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow)?;
        self.total_supply = supply;
        *self.balances.entry(*to).or_insert(0) += amount;

        Ok(self.balance_of(to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_asset() -> (Asset, Address) {
        let issuer = Address::from_label("issuer");
        let metadata = AssetMetadata::new("USD".to_string(), issuer).unwrap();
        (
            Asset::new(Address::from_label("USD-asset"), metadata, 1_000_000),
            issuer,
        )
    }

    #[test]
    fn test_asset_creation() {
        let (asset, issuer) = create_test_asset();

        assert_eq!(asset.symbol(), "USD");
        assert_eq!(asset.total_supply(), 1_000_000);
        assert_eq!(asset.balance_of(&issuer), 1_000_000);
        assert_eq!(asset.holders().len(), 1);
    }

    #[test]
    fn test_symbol_validation() {
        let issuer = Address::from_label("issuer");
        assert_eq!(
            AssetMetadata::new(String::new(), issuer),
            Err(LedgerError::InvalidSymbol)
        );
        assert_eq!(
            AssetMetadata::new("TOOLONGSYMBOL".to_string(), issuer),
            Err(LedgerError::InvalidSymbol)
        );
    }

    #[test]
    fn test_transfer() {
        let (mut asset, issuer) = create_test_asset();
        let bob = Address::from_label("bob");

        let record = asset.transfer(&issuer, &bob, 1000).unwrap();

        assert_eq!(record.amount, 1000);
        assert_eq!(asset.balance_of(&issuer), 999_000);
        assert_eq!(asset.balance_of(&bob), 1000);
        assert_eq!(asset.transfer_history.len(), 1);
    }

    #[test]
    fn test_transfer_rejections() {
        let (mut asset, issuer) = create_test_asset();
        let bob = Address::from_label("bob");

        assert!(matches!(
            asset.transfer(&issuer, &bob, 2_000_000),
            Err(LedgerError::InsufficientBalance { .. })
        ));
        assert_eq!(
            asset.transfer(&issuer, &bob, 0),
            Err(LedgerError::InvalidAmount)
        );
        assert_eq!(
            asset.transfer(&issuer, &issuer, 5),
            Err(LedgerError::SelfTransfer)
        );
        assert_eq!(asset.balance_of(&issuer), 1_000_000);
        assert!(asset.transfer_history.is_empty());
    }

    #[test]
    fn test_history_is_bounded() {
        let (mut asset, issuer) = create_test_asset();
        let bob = Address::from_label("bob");

        for _ in 0..(MAX_HISTORY + 5) {
            asset.transfer(&issuer, &bob, 1).unwrap();
        }
        assert_eq!(asset.transfer_history.len(), MAX_HISTORY);
    }

    #[test]
    fn test_mint_only_by_issuer() {
        let (mut asset, issuer) = create_test_asset();
        let bob = Address::from_label("bob");

        assert_eq!(
            asset.mint(&bob, &bob, 10),
            Err(LedgerError::NotIssuer(issuer))
        );
        assert_eq!(asset.mint(&issuer, &bob, 10), Ok(10));
        assert_eq!(asset.total_supply(), 1_000_010);
    }
}
