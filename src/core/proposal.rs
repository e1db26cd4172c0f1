//! Wallet proposals
//!
//! Quorum changes and transfers share one record type and one lifecycle:
//! `Pending --(approval count reaches quorum)--> Executed`. Executed proposals
//! are immutable.

use crate::core::address::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Proposal identifier, 1-based and increasing in submission order
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, Hash, Eq, PartialEq, PartialOrd, Ord,
)]
#[serde(transparent)]
pub struct ProposalId(pub u64);

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a proposal does once executed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalKind {
    /// Replace the wallet quorum
    QuorumChange { new_quorum: u32 },
    /// Release `amount` of `asset` to `recipient`
    Transfer {
        recipient: Address,
        amount: u128,
        asset: Address,
    },
}

impl ProposalKind {
    /// Short label used in events and CLI output
    pub fn label(&self) -> &'static str {
        match self {
            ProposalKind::QuorumChange { .. } => "quorum_change",
            ProposalKind::Transfer { .. } => "transfer",
        }
    }
}

impl fmt::Display for ProposalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProposalKind::QuorumChange { new_quorum } => write!(f, "set quorum to {}", new_quorum),
            ProposalKind::Transfer {
                recipient,
                amount,
                asset,
            } => write!(f, "transfer {} of {} to {}", amount, asset, recipient),
        }
    }
}

/// Lifecycle state of a proposal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    Pending,
    Executed,
}

/// A request awaiting (or having reached) quorum
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub kind: ProposalKind,
    /// Signer who submitted the proposal; their submission is the first approval
    pub creator: Address,
    /// Signers who approved, creator included
    approvals: BTreeSet<Address>,
    pub executed: bool,
    /// Reason of the most recent failed execution attempt, if any
    pub last_failure: Option<String>,
}

impl Proposal {
    pub(crate) fn new(id: ProposalId, kind: ProposalKind, creator: Address) -> Self {
        let mut approvals = BTreeSet::new();
        approvals.insert(creator);

        Self {
            id,
            kind,
            creator,
            approvals,
            executed: false,
            last_failure: None,
        }
    }

    /// Number of distinct signers that approved
    pub fn approval_count(&self) -> u32 {
        self.approvals.len() as u32
    }

    pub fn has_approved(&self, signer: &Address) -> bool {
        self.approvals.contains(signer)
    }

    /// Approving signers in address order
    pub fn approved_by(&self) -> Vec<Address> {
        self.approvals.iter().copied().collect()
    }

    pub fn status(&self) -> ProposalStatus {
        if self.executed {
            ProposalStatus::Executed
        } else {
            ProposalStatus::Pending
        }
    }

    /// Record an approval; false if the signer had already approved
    pub(crate) fn record_approval(&mut self, signer: Address) -> bool {
        self.approvals.insert(signer)
    }

    pub(crate) fn mark_executed(&mut self) {
        self.executed = true;
        self.last_failure = None;
    }

    pub(crate) fn mark_failed(&mut self, reason: String) {
        self.last_failure = Some(reason);
    }
}

/// Outcome of an approval or execution call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalResult {
    pub proposal_id: ProposalId,
    pub approvals: u32,
    pub executed: bool,
}

impl From<&Proposal> for ApprovalResult {
    fn from(proposal: &Proposal) -> Self {
        Self {
            proposal_id: proposal.id,
            approvals: proposal.approval_count(),
            executed: proposal.executed,
        }
    }
}
