//! Wallet notifications
//!
//! Events are observational only: no engine behaviour depends on whether a
//! sink delivers them.

use crate::core::address::Address;
use crate::core::proposal::{ProposalId, ProposalKind};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Notifications emitted by the factory and by wallets
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum WalletEvent {
    /// The factory created and registered a new wallet
    WalletCreated {
        factory: Address,
        wallet: Address,
        creator: Address,
        quorum: u32,
        signers: Vec<Address>,
    },
    /// A signer submitted a proposal (counts as its first approval)
    ProposalSubmitted {
        wallet: Address,
        proposal_id: ProposalId,
        proposer: Address,
        kind: ProposalKind,
    },
    /// A further signer approved a pending proposal
    ProposalApproved {
        wallet: Address,
        proposal_id: ProposalId,
        approver: Address,
        approvals: u32,
    },
    /// A proposal reached quorum and its effect was applied
    ProposalExecuted {
        wallet: Address,
        proposal_id: ProposalId,
        kind: ProposalKind,
    },
}

impl WalletEvent {
    /// Address of the wallet the event concerns
    pub fn wallet(&self) -> &Address {
        match self {
            WalletEvent::WalletCreated { wallet, .. }
            | WalletEvent::ProposalSubmitted { wallet, .. }
            | WalletEvent::ProposalApproved { wallet, .. }
            | WalletEvent::ProposalExecuted { wallet, .. } => wallet,
        }
    }
}

/// Receiver of wallet notifications
pub trait EventSink {
    fn publish(&self, event: WalletEvent);
}

/// Sink that writes every event to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn publish(&self, event: WalletEvent) {
        match &event {
            WalletEvent::WalletCreated {
                wallet,
                quorum,
                signers,
                ..
            } => log::info!(
                "Wallet created: {} ({}-of-{})",
                wallet,
                quorum,
                signers.len() + 1
            ),
            WalletEvent::ProposalSubmitted {
                wallet,
                proposal_id,
                kind,
                ..
            } => log::info!("Proposal {} submitted on {}: {}", proposal_id, wallet, kind),
            WalletEvent::ProposalApproved {
                wallet,
                proposal_id,
                approvals,
                ..
            } => log::debug!(
                "Proposal {} on {} now has {} approvals",
                proposal_id,
                wallet,
                approvals
            ),
            WalletEvent::ProposalExecuted {
                wallet,
                proposal_id,
                kind,
            } => log::info!("Proposal {} executed on {}: {}", proposal_id, wallet, kind),
        }
    }
}

/// Sink that keeps every event in memory, in publication order
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<WalletEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events
    pub fn events(&self) -> Vec<WalletEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take all recorded events, leaving the log empty
    pub fn drain(&self) -> Vec<WalletEvent> {
        std::mem::take(
            &mut *self
                .events
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

impl EventSink for EventLog {
    fn publish(&self, event: WalletEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}
