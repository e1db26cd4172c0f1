//! In-process asset ledger
//!
//! Registers assets and moves balances between accounts. This is the transfer
//! primitive the CLI and API hosts hand to wallets when a transfer proposal
//! executes.

use crate::core::address::Address;
use crate::core::host::{AssetLedger, TransferFailure};
use crate::ledger::asset::{Asset, AssetMetadata, LedgerError, TransferRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All assets known to the host
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLedger {
    /// Assets by address
    assets: BTreeMap<Address, Asset>,
    /// Registration counter for address generation
    nonce: u64,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new asset; the whole initial supply goes to `issuer`
    pub fn register_asset(
        &mut self,
        symbol: &str,
        issuer: Address,
        supply: u128,
    ) -> Result<Address, LedgerError> {
        let metadata = AssetMetadata::new(symbol.to_string(), issuer)?;

        if let Some(existing) = self.find_by_symbol(symbol) {
            return Err(LedgerError::AssetAlreadyExists(existing.address));
        }

        let address = self.generate_address(&issuer, symbol);
        if self.assets.contains_key(&address) {
            return Err(LedgerError::AssetAlreadyExists(address));
        }
        self.nonce += 1;

        self.assets
            .insert(address, Asset::new(address, metadata, supply));

        log::info!("Asset registered: {} at {}", symbol, address);

        Ok(address)
    }

    /// Asset address from issuer, symbol and registration nonce
    fn generate_address(&self, issuer: &Address, symbol: &str) -> Address {
        let nonce = self.nonce.to_be_bytes();
        Address::derive(&[
            &b"asset"[..],
            &issuer.as_bytes()[..],
            symbol.as_bytes(),
            &nonce[..],
        ])
    }

    pub fn get(&self, asset: &Address) -> Option<&Asset> {
        self.assets.get(asset)
    }

    /// All assets in address order
    pub fn list(&self) -> Vec<&Asset> {
        self.assets.values().collect()
    }

    pub fn count(&self) -> usize {
        self.assets.len()
    }

    /// Symbols are unique, ignoring case
    pub fn find_by_symbol(&self, symbol: &str) -> Option<&Asset> {
        self.assets
            .values()
            .find(|a| a.symbol().eq_ignore_ascii_case(symbol))
    }

    pub fn mint(
        &mut self,
        asset: &Address,
        caller: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<u128, LedgerError> {
        self.asset_mut(asset)?.mint(caller, to, amount)
    }

    pub fn balance_of(&self, asset: &Address, holder: &Address) -> Result<u128, LedgerError> {
        self.assets
            .get(asset)
            .map(|a| a.balance_of(holder))
            .ok_or(LedgerError::AssetNotFound(*asset))
    }

    pub fn transfer(
        &mut self,
        asset: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<TransferRecord, LedgerError> {
        self.asset_mut(asset)?.transfer(from, to, amount)
    }

    /// Recent transfers of one asset
    pub fn history(&self, asset: &Address) -> Result<Vec<TransferRecord>, LedgerError> {
        self.assets
            .get(asset)
            .map(|a| a.transfer_history.clone())
            .ok_or(LedgerError::AssetNotFound(*asset))
    }

    /// Non-zero balances held by one account
    pub fn balances_for(&self, holder: &Address) -> Vec<(&Asset, u128)> {
        self.assets
            .values()
            .filter_map(|asset| {
                let balance = asset.balance_of(holder);
                if balance > 0 {
                    Some((asset, balance))
                } else {
                    None
                }
            })
            .collect()
    }

    fn asset_mut(&mut self, asset: &Address) -> Result<&mut Asset, LedgerError> {
        self.assets
            .get_mut(asset)
            .ok_or(LedgerError::AssetNotFound(*asset))
    }
}

impl AssetLedger for TokenLedger {
    fn transfer(
        &mut self,
        asset: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), TransferFailure> {
        TokenLedger::transfer(self, asset, from, to, amount)
            .map(|_| ())
            .map_err(|e| TransferFailure::new(e.to_string()))
    }
}
