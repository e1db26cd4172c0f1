//! Persisted host state
//!
//! Everything a host needs between runs: the factory (and through it every
//! wallet with its proposal log) plus the asset ledger.

use crate::core::address::Address;
use crate::core::error::WalletError;
use crate::core::events::EventSink;
use crate::core::host::Host;
use crate::core::wallet::MultisigWallet;
use crate::factory::WalletFactory;
use crate::ledger::TokenLedger;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label the default factory address is derived from
pub const DEFAULT_FACTORY_LABEL: &str = "factory";

/// Factory plus ledger, as written to the state file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostState {
    pub factory: WalletFactory,
    pub ledger: TokenLedger,
    /// Time of the last save; host metadata only, never read by the engine
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl HostState {
    pub fn new(factory_address: Address) -> Self {
        Self {
            factory: WalletFactory::new(factory_address),
            ledger: TokenLedger::new(),
            saved_at: None,
        }
    }

    /// Run a mutating call on one wallet, with the ledger as its asset primitive
    pub fn with_wallet<T>(
        &mut self,
        wallet: &Address,
        events: &dyn EventSink,
        call: impl FnOnce(&mut MultisigWallet, &mut Host<'_>) -> Result<T, WalletError>,
    ) -> Result<T, WalletError> {
        let wallet = self.factory.require_wallet_mut(wallet)?;
        let mut host = Host::new(&mut self.ledger, events);
        call(wallet, &mut host)
    }
}

impl Default for HostState {
    fn default() -> Self {
        Self::new(Address::from_label(DEFAULT_FACTORY_LABEL))
    }
}
