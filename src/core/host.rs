//! Host collaborators
//!
//! The engine never moves assets or delivers notifications itself. Mutating
//! calls receive a [`Host`] bundling the asset-transfer primitive and the
//! event sink supplied by whatever environment runs the wallet.

use crate::core::address::Address;
use crate::core::events::EventSink;
use thiserror::Error;

/// Failure reported by an asset-transfer primitive
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransferFailure(pub String);

impl TransferFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Asset-transfer primitive invoked exactly once per executed transfer proposal
pub trait AssetLedger {
    fn transfer(
        &mut self,
        asset: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), TransferFailure>;
}

/// Ledger for hosts without an asset primitive; every transfer fails
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAssets;

impl AssetLedger for NoAssets {
    fn transfer(
        &mut self,
        _asset: &Address,
        _from: &Address,
        _to: &Address,
        _amount: u128,
    ) -> Result<(), TransferFailure> {
        Err(TransferFailure::new("no asset ledger attached"))
    }
}

/// Environment handed to every mutating wallet call
pub struct Host<'a> {
    pub assets: &'a mut dyn AssetLedger,
    pub events: &'a dyn EventSink,
}

impl<'a> Host<'a> {
    pub fn new(assets: &'a mut dyn AssetLedger, events: &'a dyn EventSink) -> Self {
        Self { assets, events }
    }
}
