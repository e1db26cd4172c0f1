//! Wallet factory
//!
//! Creates isolated wallet instances and keeps the registry of everything it
//! created: a counter, an address-to-wallet map and the creation order.

use crate::core::address::Address;
use crate::core::error::WalletError;
use crate::core::events::{EventSink, WalletEvent};
use crate::core::wallet::MultisigWallet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Registry of wallets created by one factory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletFactory {
    /// Identity of this factory; seeds the addresses of created wallets
    address: Address,
    /// Created wallets by address
    wallets: BTreeMap<Address, MultisigWallet>,
    /// Wallet addresses in creation order
    order: Vec<Address>,
}

impl WalletFactory {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            wallets: BTreeMap::new(),
            order: Vec::new(),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Create and register a new wallet
    ///
    /// Construction errors are returned unchanged; the registry is only touched
    /// once the wallet is fully built, and `WalletCreated` is emitted after it.
    pub fn create_wallet(
        &mut self,
        quorum: u32,
        signers: &[Address],
        creator: Address,
        events: &dyn EventSink,
    ) -> Result<Address, WalletError> {
        let address = self.next_address();
        let wallet = MultisigWallet::deploy(address, quorum, signers, creator)?;

        self.wallets.insert(address, wallet);
        self.order.push(address);

        log::info!(
            "Wallet #{} created at {} ({}-of-{}) by {}",
            self.order.len(),
            address,
            quorum,
            signers.len() + 1,
            creator.short()
        );

        events.publish(WalletEvent::WalletCreated {
            factory: self.address,
            wallet: address,
            creator,
            quorum,
            signers: signers.to_vec(),
        });

        Ok(address)
    }

    /// Address = first 20 bytes of SHA256(factory || nonce)
    ///
    /// The nonce is the number of wallets created so far, so two wallets with
    /// identical parameters still get distinct addresses.
    fn next_address(&self) -> Address {
        let nonce = (self.order.len() as u64).to_be_bytes();
        Address::derive(&[&b"clone"[..], &self.address.as_bytes()[..], &nonce[..]])
    }

    /// Number of wallets successfully created
    pub fn get_cloned_contract_count(&self) -> u64 {
        self.order.len() as u64
    }

    pub fn wallet(&self, address: &Address) -> Option<&MultisigWallet> {
        self.wallets.get(address)
    }

    pub fn wallet_mut(&mut self, address: &Address) -> Option<&mut MultisigWallet> {
        self.wallets.get_mut(address)
    }

    /// Like [`WalletFactory::wallet_mut`] but failing with `WalletNotFound`
    pub fn require_wallet_mut(
        &mut self,
        address: &Address,
    ) -> Result<&mut MultisigWallet, WalletError> {
        self.wallets
            .get_mut(address)
            .ok_or(WalletError::WalletNotFound(*address))
    }

    /// All wallets in creation order
    pub fn wallets(&self) -> Vec<&MultisigWallet> {
        self.order
            .iter()
            .filter_map(|address| self.wallets.get(address))
            .collect()
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.wallets.contains_key(address)
    }

    /// Wallets in which `signer` is a valid signer, in creation order
    pub fn wallets_for_signer(&self, signer: &Address) -> Vec<&MultisigWallet> {
        self.wallets()
            .into_iter()
            .filter(|wallet| wallet.is_valid_signer(signer))
            .collect()
    }
}
