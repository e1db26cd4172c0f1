//! Quorum-based multi-signature wallet
//!
//! A wallet owns its signer set, its quorum and an append-only proposal log.
//! Every state change goes through a proposal that must collect approvals from
//! `quorum` distinct signers; reaching the quorum executes the proposal in the
//! same call. Nothing in here reads a clock or a random source, so replaying
//! the same calls always rebuilds the same state.

use crate::core::address::Address;
use crate::core::error::WalletError;
use crate::core::events::WalletEvent;
use crate::core::host::Host;
use crate::core::proposal::{ApprovalResult, Proposal, ProposalId, ProposalKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A multi-signature wallet instance
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisigWallet {
    /// Identity of this wallet; source account of executed transfers
    address: Address,
    /// Deploying account, always a valid signer
    creator: Address,
    /// Valid signers, creator included
    signers: BTreeSet<Address>,
    /// Approvals required to execute a proposal
    quorum: u32,
    /// Proposal log; the proposal with id `n` lives at index `n - 1`
    proposals: Vec<Proposal>,
}

impl MultisigWallet {
    /// Create a wallet whose address is derived from its configuration
    ///
    /// # Errors
    /// Checks run in this order and the first failure wins:
    /// `QuorumTooSmall`, `TooFewSigners`, `QuorumTooLarge`, then
    /// `ZeroAddress` / `DuplicateSigner` for malformed signer lists.
    pub fn create(quorum: u32, signers: &[Address], creator: Address) -> Result<Self, WalletError> {
        let address = Self::derive_address(quorum, signers, &creator);
        Self::deploy(address, quorum, signers, creator)
    }

    /// Create a wallet at a caller-chosen address
    pub fn deploy(
        address: Address,
        quorum: u32,
        signers: &[Address],
        creator: Address,
    ) -> Result<Self, WalletError> {
        Self::validate_config(quorum, signers, &creator)?;

        let mut registered = BTreeSet::new();
        registered.insert(creator);
        registered.extend(signers.iter().copied());

        Ok(Self {
            address,
            creator,
            signers: registered,
            quorum,
            proposals: Vec::new(),
        })
    }

    /// Validate constructor parameters without building a wallet
    pub fn validate_config(
        quorum: u32,
        signers: &[Address],
        creator: &Address,
    ) -> Result<(), WalletError> {
        if quorum <= 1 {
            return Err(WalletError::QuorumTooSmall);
        }

        let total = signers.len() + 1;
        if total < 2 {
            return Err(WalletError::TooFewSigners);
        }

        if quorum as usize > total {
            return Err(WalletError::QuorumTooLarge);
        }

        if creator.is_zero() {
            return Err(WalletError::ZeroAddress);
        }

        let mut seen = BTreeSet::new();
        seen.insert(*creator);
        for signer in signers {
            if signer.is_zero() {
                return Err(WalletError::ZeroAddress);
            }
            if !seen.insert(*signer) {
                return Err(WalletError::DuplicateSigner(*signer));
            }
        }

        Ok(())
    }

    /// Address = first 20 bytes of SHA256(creator || quorum || signers...)
    fn derive_address(quorum: u32, signers: &[Address], creator: &Address) -> Address {
        let quorum_bytes = quorum.to_be_bytes();
        let mut parts: Vec<&[u8]> = vec![&b"wallet"[..], &creator.as_bytes()[..], &quorum_bytes[..]];
        parts.extend(signers.iter().map(|s| &s.as_bytes()[..]));
        Address::derive(&parts)
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn creator(&self) -> &Address {
        &self.creator
    }

    pub fn quorum(&self) -> u32 {
        self.quorum
    }

    pub fn no_of_valid_signers(&self) -> u32 {
        self.signers.len() as u32
    }

    pub fn is_valid_signer(&self, address: &Address) -> bool {
        self.signers.contains(address)
    }

    /// All valid signers in address order
    pub fn signers(&self) -> Vec<Address> {
        self.signers.iter().copied().collect()
    }

    /// Point lookup by proposal id
    pub fn proposal(&self, id: ProposalId) -> Option<&Proposal> {
        let index = self.index_of(id).ok()?;
        self.proposals.get(index)
    }

    /// Full proposal log in id order
    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals
    }

    pub fn pending_proposals(&self) -> Vec<&Proposal> {
        self.proposals.iter().filter(|p| !p.executed).collect()
    }

    pub fn proposal_count(&self) -> usize {
        self.proposals.len()
    }

    pub fn has_approved(&self, id: ProposalId, signer: &Address) -> bool {
        self.proposal(id)
            .map(|p| p.has_approved(signer))
            .unwrap_or(false)
    }

    /// Human-readable description like "3-of-5"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.quorum, self.signers.len())
    }

    // =========================================================================
    // Proposals
    // =========================================================================

    /// Propose a new quorum; the proposer's submission is the first approval
    pub fn propose_quorum_change(
        &mut self,
        new_quorum: u32,
        proposer: &Address,
        host: &mut Host<'_>,
    ) -> Result<ProposalId, WalletError> {
        self.ensure_signer(proposer)?;
        self.check_quorum(new_quorum)?;

        self.submit(ProposalKind::QuorumChange { new_quorum }, *proposer, host)
    }

    /// Propose releasing `amount` of `asset` to `recipient`
    pub fn propose_transfer(
        &mut self,
        recipient: Address,
        amount: u128,
        asset: Address,
        proposer: &Address,
        host: &mut Host<'_>,
    ) -> Result<ProposalId, WalletError> {
        self.ensure_signer(proposer)?;

        if amount == 0 {
            return Err(WalletError::InvalidAmount);
        }
        if recipient.is_zero() || asset.is_zero() {
            return Err(WalletError::ZeroAddress);
        }
        // The ledger never lets a holder pay itself
        if recipient == self.address {
            return Err(WalletError::InvalidRecipient(recipient));
        }

        let kind = ProposalKind::Transfer {
            recipient,
            amount,
            asset,
        };
        self.submit(kind, *proposer, host)
    }

    /// Approve a pending proposal, executing it if the quorum is reached
    ///
    /// # Errors
    /// `NotFound`, `AlreadyExecuted`, `InvalidSigner`, `AlreadyApproved`, checked
    /// in that order before anything is written. `ExecutionFailed` if the quorum
    /// was reached but the transfer primitive refused; the approval is kept and
    /// the proposal stays pending for [`MultisigWallet::execute_proposal`].
    pub fn approve_tx(
        &mut self,
        id: ProposalId,
        approver: &Address,
        host: &mut Host<'_>,
    ) -> Result<ApprovalResult, WalletError> {
        let is_signer = self.is_valid_signer(approver);
        let index = self.index_of(id)?;
        let proposal = &mut self.proposals[index];

        if proposal.executed {
            return Err(WalletError::AlreadyExecuted(id));
        }
        if !is_signer {
            return Err(WalletError::InvalidSigner(*approver));
        }
        if !proposal.record_approval(*approver) {
            return Err(WalletError::AlreadyApproved);
        }

        let approvals = proposal.approval_count();
        log::debug!(
            "Proposal {} on {} approved by {} ({}/{})",
            id,
            self.address.short(),
            approver.short(),
            approvals,
            self.quorum
        );
        host.events.publish(WalletEvent::ProposalApproved {
            wallet: self.address,
            proposal_id: id,
            approver: *approver,
            approvals,
        });

        self.execute_if_ready(index, host)
    }

    /// Retry execution of a proposal that already holds enough approvals
    ///
    /// Used after a failed transfer, or when a quorum decrease left a pending
    /// proposal above the new threshold.
    pub fn execute_proposal(
        &mut self,
        id: ProposalId,
        caller: &Address,
        host: &mut Host<'_>,
    ) -> Result<ApprovalResult, WalletError> {
        let index = self.index_of(id)?;
        let proposal = &self.proposals[index];

        if proposal.executed {
            return Err(WalletError::AlreadyExecuted(id));
        }
        self.ensure_signer(caller)?;

        let have = proposal.approval_count();
        if have < self.quorum {
            return Err(WalletError::NotReady {
                id,
                have,
                need: self.quorum,
            });
        }

        self.execute_if_ready(index, host)
    }

    fn submit(
        &mut self,
        kind: ProposalKind,
        proposer: Address,
        host: &mut Host<'_>,
    ) -> Result<ProposalId, WalletError> {
        let id = ProposalId(self.proposals.len() as u64 + 1);
        self.proposals.push(Proposal::new(id, kind.clone(), proposer));

        host.events.publish(WalletEvent::ProposalSubmitted {
            wallet: self.address,
            proposal_id: id,
            proposer,
            kind,
        });

        self.execute_if_ready(self.proposals.len() - 1, host)?;
        Ok(id)
    }

    /// Shared threshold path for every proposal kind
    ///
    /// Compares against the live quorum, which an earlier proposal may have
    /// changed since this one was submitted.
    fn execute_if_ready(
        &mut self,
        index: usize,
        host: &mut Host<'_>,
    ) -> Result<ApprovalResult, WalletError> {
        let proposal = &self.proposals[index];
        if proposal.executed || proposal.approval_count() < self.quorum {
            return Ok(proposal.into());
        }

        let id = proposal.id;
        let kind = proposal.kind.clone();

        match self.apply(&kind, host) {
            Ok(()) => {
                let proposal = &mut self.proposals[index];
                proposal.mark_executed();
                let result = ApprovalResult::from(&*proposal);

                log::info!(
                    "Proposal {} executed on {}: {}",
                    id,
                    self.address.short(),
                    kind
                );
                host.events.publish(WalletEvent::ProposalExecuted {
                    wallet: self.address,
                    proposal_id: id,
                    kind,
                });

                Ok(result)
            }
            Err(err) => {
                log::warn!(
                    "Proposal {} on {} failed to execute: {}",
                    id,
                    self.address.short(),
                    err
                );
                self.proposals[index].mark_failed(err.to_string());
                Err(err)
            }
        }
    }

    /// Apply a proposal's effect; on error nothing has been changed
    fn apply(&mut self, kind: &ProposalKind, host: &mut Host<'_>) -> Result<(), WalletError> {
        match *kind {
            ProposalKind::QuorumChange { new_quorum } => {
                self.check_quorum(new_quorum)?;
                self.quorum = new_quorum;
            }
            ProposalKind::Transfer {
                recipient,
                amount,
                asset,
            } => {
                host.assets
                    .transfer(&asset, &self.address, &recipient, amount)
                    .map_err(|failure| WalletError::ExecutionFailed(failure.0))?;
            }
        }
        Ok(())
    }

    fn ensure_signer(&self, caller: &Address) -> Result<(), WalletError> {
        if self.is_valid_signer(caller) {
            Ok(())
        } else {
            Err(WalletError::InvalidSigner(*caller))
        }
    }

    fn check_quorum(&self, quorum: u32) -> Result<(), WalletError> {
        if quorum <= 1 {
            return Err(WalletError::QuorumTooSmall);
        }
        if quorum > self.no_of_valid_signers() {
            return Err(WalletError::QuorumTooLarge);
        }
        Ok(())
    }

    fn index_of(&self, id: ProposalId) -> Result<usize, WalletError> {
        match id.0.checked_sub(1) {
            Some(index) => usize::try_from(index)
                .ok()
                .filter(|index| *index < self.proposals.len())
                .ok_or(WalletError::NotFound(id)),
            None => Err(WalletError::NotFound(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::EventLog;
    use crate::core::host::{AssetLedger, NoAssets, TransferFailure};

    /// Ledger double that records calls and can be told to refuse them
    #[derive(Default)]
    struct RecordingLedger {
        calls: Vec<(Address, Address, Address, u128)>,
        fail_with: Option<String>,
    }

    impl AssetLedger for RecordingLedger {
        fn transfer(
            &mut self,
            asset: &Address,
            from: &Address,
            to: &Address,
            amount: u128,
        ) -> Result<(), TransferFailure> {
            if let Some(reason) = &self.fail_with {
                return Err(TransferFailure::new(reason.clone()));
            }
            self.calls.push((*asset, *from, *to, amount));
            Ok(())
        }
    }

    fn accounts(n: usize) -> Vec<Address> {
        (1..=n)
            .map(|i| Address::from_label(&format!("account{}", i)))
            .collect()
    }

    /// Owner plus four explicit signers, quorum 3
    fn create_test_wallet() -> (MultisigWallet, Address, Vec<Address>) {
        let owner = Address::from_label("owner");
        let signers = accounts(4);
        let wallet = MultisigWallet::create(3, &signers, owner).unwrap();
        (wallet, owner, signers)
    }

    fn assert_quorum_invariant(wallet: &MultisigWallet) {
        assert!(wallet.quorum() > 1);
        assert!(wallet.quorum() <= wallet.no_of_valid_signers());
    }

    #[test]
    fn test_wallet_creation() {
        let (wallet, owner, signers) = create_test_wallet();

        assert_eq!(wallet.no_of_valid_signers(), 5);
        assert_eq!(wallet.quorum(), 3);
        assert_eq!(wallet.description(), "3-of-5");
        assert!(wallet.is_valid_signer(&owner));
        for signer in &signers {
            assert!(wallet.is_valid_signer(signer));
        }
        assert!(!wallet.is_valid_signer(&Address::from_label("stranger")));
        assert_eq!(wallet.proposal_count(), 0);
        assert_quorum_invariant(&wallet);
    }

    #[test]
    fn test_creation_validation_order() {
        let owner = Address::from_label("owner");
        let signers = accounts(4);

        assert_eq!(
            MultisigWallet::create(0, &signers, owner),
            Err(WalletError::QuorumTooSmall)
        );
        assert_eq!(
            MultisigWallet::create(1, &signers, owner),
            Err(WalletError::QuorumTooSmall)
        );
        // quorum check wins over the signer-count check
        assert_eq!(
            MultisigWallet::create(0, &[], owner),
            Err(WalletError::QuorumTooSmall)
        );
        assert_eq!(
            MultisigWallet::create(2, &[], owner),
            Err(WalletError::TooFewSigners)
        );
        assert_eq!(
            MultisigWallet::create(10, &signers, owner),
            Err(WalletError::QuorumTooLarge)
        );
        assert_eq!(
            MultisigWallet::create(6, &signers, owner),
            Err(WalletError::QuorumTooLarge)
        );
        assert!(MultisigWallet::create(5, &signers, owner).is_ok());
    }

    #[test]
    fn test_creation_rejects_bad_signer_lists() {
        let owner = Address::from_label("owner");
        let a = Address::from_label("a");

        assert_eq!(
            MultisigWallet::create(2, &[a, a], owner),
            Err(WalletError::DuplicateSigner(a))
        );
        assert_eq!(
            MultisigWallet::create(2, &[owner, a], owner),
            Err(WalletError::DuplicateSigner(owner))
        );
        assert_eq!(
            MultisigWallet::create(2, &[a, Address::ZERO], owner),
            Err(WalletError::ZeroAddress)
        );
        assert_eq!(
            MultisigWallet::create(2, &[a], Address::ZERO),
            Err(WalletError::ZeroAddress)
        );
    }

    #[test]
    fn test_address_is_deterministic() {
        let (first, _, _) = create_test_wallet();
        let (second, _, _) = create_test_wallet();
        assert_eq!(first.address(), second.address());

        let other = MultisigWallet::create(2, &accounts(4), Address::from_label("owner")).unwrap();
        assert_ne!(first.address(), other.address());
    }

    #[test]
    fn test_quorum_change_executes_at_third_approval() {
        let (mut wallet, owner, signers) = create_test_wallet();
        let events = EventLog::new();
        let mut ledger = NoAssets;
        let mut host = Host::new(&mut ledger, &events);

        let id = wallet.propose_quorum_change(4, &owner, &mut host).unwrap();
        assert_eq!(id, ProposalId(1));
        assert_eq!(wallet.proposal(id).unwrap().approval_count(), 1);

        let result = wallet.approve_tx(id, &signers[0], &mut host).unwrap();
        assert_eq!(result.approvals, 2);
        assert!(!result.executed);
        assert_eq!(wallet.quorum(), 3);

        let result = wallet.approve_tx(id, &signers[1], &mut host).unwrap();
        assert_eq!(result.approvals, 3);
        assert!(result.executed);
        assert_eq!(wallet.quorum(), 4);
        assert!(wallet.proposal(id).unwrap().executed);
        assert_quorum_invariant(&wallet);

        let executed = events
            .events()
            .into_iter()
            .filter(|e| matches!(e, WalletEvent::ProposalExecuted { .. }))
            .count();
        assert_eq!(executed, 1);
    }

    #[test]
    fn test_quorum_change_to_current_value() {
        let (mut wallet, owner, signers) = create_test_wallet();
        let events = EventLog::new();
        let mut ledger = NoAssets;
        let mut host = Host::new(&mut ledger, &events);

        let id = wallet.propose_quorum_change(3, &owner, &mut host).unwrap();
        wallet.approve_tx(id, &signers[0], &mut host).unwrap();
        assert!(!wallet.proposal(id).unwrap().executed);

        wallet.approve_tx(id, &signers[1], &mut host).unwrap();
        assert!(wallet.proposal(id).unwrap().executed);
        assert_eq!(wallet.quorum(), 3);
    }

    #[test]
    fn test_double_approval_rejected() {
        let (mut wallet, owner, signers) = create_test_wallet();
        let events = EventLog::new();
        let mut ledger = NoAssets;
        let mut host = Host::new(&mut ledger, &events);

        let id = wallet.propose_quorum_change(3, &owner, &mut host).unwrap();
        wallet.approve_tx(id, &signers[1], &mut host).unwrap();

        assert_eq!(
            wallet.approve_tx(id, &signers[1], &mut host),
            Err(WalletError::AlreadyApproved)
        );
        assert_eq!(
            wallet.approve_tx(id, &owner, &mut host),
            Err(WalletError::AlreadyApproved)
        );
        assert_eq!(wallet.proposal(id).unwrap().approval_count(), 2);
        assert!(!wallet.proposal(id).unwrap().executed);
    }

    #[test]
    fn test_executed_proposal_is_frozen() {
        let (mut wallet, owner, signers) = create_test_wallet();
        let events = EventLog::new();
        let mut ledger = NoAssets;
        let mut host = Host::new(&mut ledger, &events);

        let id = wallet.propose_quorum_change(2, &owner, &mut host).unwrap();
        wallet.approve_tx(id, &signers[0], &mut host).unwrap();
        wallet.approve_tx(id, &signers[1], &mut host).unwrap();
        assert_eq!(wallet.quorum(), 2);

        assert_eq!(
            wallet.approve_tx(id, &signers[2], &mut host),
            Err(WalletError::AlreadyExecuted(id))
        );
        assert_eq!(
            wallet.execute_proposal(id, &signers[2], &mut host),
            Err(WalletError::AlreadyExecuted(id))
        );
        assert_eq!(wallet.proposal(id).unwrap().approval_count(), 3);
    }

    #[test]
    fn test_approval_guard_order() {
        let (mut wallet, owner, _) = create_test_wallet();
        let stranger = Address::from_label("stranger");
        let events = EventLog::new();
        let mut ledger = NoAssets;
        let mut host = Host::new(&mut ledger, &events);

        assert_eq!(
            wallet.approve_tx(ProposalId(1), &stranger, &mut host),
            Err(WalletError::NotFound(ProposalId(1)))
        );
        assert_eq!(
            wallet.approve_tx(ProposalId(0), &owner, &mut host),
            Err(WalletError::NotFound(ProposalId(0)))
        );

        let id = wallet.propose_quorum_change(2, &owner, &mut host).unwrap();
        assert_eq!(
            wallet.approve_tx(id, &stranger, &mut host),
            Err(WalletError::InvalidSigner(stranger))
        );
        assert_eq!(wallet.proposal(id).unwrap().approval_count(), 1);
    }

    #[test]
    fn test_propose_quorum_validation() {
        let (mut wallet, owner, _) = create_test_wallet();
        let stranger = Address::from_label("stranger");
        let events = EventLog::new();
        let mut ledger = NoAssets;
        let mut host = Host::new(&mut ledger, &events);

        assert_eq!(
            wallet.propose_quorum_change(1, &owner, &mut host),
            Err(WalletError::QuorumTooSmall)
        );
        assert_eq!(
            wallet.propose_quorum_change(8, &owner, &mut host),
            Err(WalletError::QuorumTooLarge)
        );
        // signer check comes first
        assert_eq!(
            wallet.propose_quorum_change(1, &stranger, &mut host),
            Err(WalletError::InvalidSigner(stranger))
        );
        assert_eq!(wallet.proposal_count(), 0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_live_quorum_governs_in_flight_proposals() {
        let (mut wallet, owner, signers) = create_test_wallet();
        let events = EventLog::new();
        let mut ledger = NoAssets;
        let mut host = Host::new(&mut ledger, &events);

        let lower = wallet.propose_quorum_change(2, &owner, &mut host).unwrap();
        let raise = wallet.propose_quorum_change(4, &signers[3], &mut host).unwrap();

        wallet.approve_tx(lower, &signers[0], &mut host).unwrap();
        wallet.approve_tx(lower, &signers[1], &mut host).unwrap();
        assert_eq!(wallet.quorum(), 2);

        // second approval meets the new quorum of 2
        let result = wallet.approve_tx(raise, &signers[0], &mut host).unwrap();
        assert!(result.executed);
        assert_eq!(wallet.quorum(), 4);
        assert_quorum_invariant(&wallet);
    }

    #[test]
    fn test_execute_proposal_after_quorum_decrease() {
        let (mut wallet, owner, signers) = create_test_wallet();
        let events = EventLog::new();
        let mut ledger = NoAssets;
        let mut host = Host::new(&mut ledger, &events);

        let waiting = wallet.propose_quorum_change(5, &owner, &mut host).unwrap();
        wallet.approve_tx(waiting, &signers[0], &mut host).unwrap();

        assert_eq!(
            wallet.execute_proposal(waiting, &owner, &mut host),
            Err(WalletError::NotReady {
                id: waiting,
                have: 2,
                need: 3
            })
        );

        let lower = wallet.propose_quorum_change(2, &signers[1], &mut host).unwrap();
        wallet.approve_tx(lower, &signers[2], &mut host).unwrap();
        wallet.approve_tx(lower, &signers[3], &mut host).unwrap();
        assert_eq!(wallet.quorum(), 2);

        let result = wallet.execute_proposal(waiting, &signers[3], &mut host).unwrap();
        assert!(result.executed);
        assert_eq!(wallet.quorum(), 5);
    }

    #[test]
    fn test_transfer_executes_once() {
        let (mut wallet, owner, signers) = create_test_wallet();
        let events = EventLog::new();
        let mut ledger = RecordingLedger::default();
        let asset = Address::from_label("USD");
        let recipient = Address::from_label("recipient");

        {
            let mut host = Host::new(&mut ledger, &events);
            let id = wallet
                .propose_transfer(recipient, 100, asset, &owner, &mut host)
                .unwrap();
            wallet.approve_tx(id, &signers[0], &mut host).unwrap();
            let result = wallet.approve_tx(id, &signers[1], &mut host).unwrap();
            assert!(result.executed);

            assert_eq!(
                wallet.approve_tx(id, &signers[2], &mut host),
                Err(WalletError::AlreadyExecuted(id))
            );
        }

        assert_eq!(
            ledger.calls,
            vec![(asset, *wallet.address(), recipient, 100)]
        );
    }

    #[test]
    fn test_failed_transfer_keeps_approvals_and_can_retry() {
        let (mut wallet, owner, signers) = create_test_wallet();
        let events = EventLog::new();
        let mut ledger = RecordingLedger {
            fail_with: Some("insufficient balance".to_string()),
            ..Default::default()
        };
        let asset = Address::from_label("USD");
        let recipient = Address::from_label("recipient");

        let id = {
            let mut host = Host::new(&mut ledger, &events);
            let id = wallet
                .propose_transfer(recipient, 100, asset, &owner, &mut host)
                .unwrap();
            wallet.approve_tx(id, &signers[0], &mut host).unwrap();

            assert_eq!(
                wallet.approve_tx(id, &signers[1], &mut host),
                Err(WalletError::ExecutionFailed(
                    "insufficient balance".to_string()
                ))
            );
            id
        };

        let proposal = wallet.proposal(id).unwrap();
        assert!(!proposal.executed);
        assert_eq!(proposal.approval_count(), 3);
        assert!(proposal.last_failure.is_some());
        assert!(ledger.calls.is_empty());

        ledger.fail_with = None;
        {
            let mut host = Host::new(&mut ledger, &events);
            let result = wallet.execute_proposal(id, &signers[2], &mut host).unwrap();
            assert!(result.executed);
            assert_eq!(result.approvals, 3);
        }

        assert_eq!(ledger.calls.len(), 1);
        assert!(wallet.proposal(id).unwrap().last_failure.is_none());
    }

    #[test]
    fn test_propose_transfer_validation() {
        let (mut wallet, owner, _) = create_test_wallet();
        let stranger = Address::from_label("stranger");
        let asset = Address::from_label("USD");
        let events = EventLog::new();
        let mut ledger = RecordingLedger::default();
        let mut host = Host::new(&mut ledger, &events);

        assert_eq!(
            wallet.propose_transfer(stranger, 10, asset, &stranger, &mut host),
            Err(WalletError::InvalidSigner(stranger))
        );
        assert_eq!(
            wallet.propose_transfer(stranger, 0, asset, &owner, &mut host),
            Err(WalletError::InvalidAmount)
        );
        assert_eq!(
            wallet.propose_transfer(Address::ZERO, 10, asset, &owner, &mut host),
            Err(WalletError::ZeroAddress)
        );
        assert_eq!(
            wallet.propose_transfer(stranger, 10, Address::ZERO, &owner, &mut host),
            Err(WalletError::ZeroAddress)
        );
        let own = *wallet.address();
        assert_eq!(
            wallet.propose_transfer(own, 10, asset, &owner, &mut host),
            Err(WalletError::InvalidRecipient(own))
        );
        assert_eq!(wallet.proposal_count(), 0);
        assert!(wallet.pending_proposals().is_empty());
        assert!(ledger.calls.is_empty());
    }

    #[test]
    fn test_unknown_proposal_ids_not_found() {
        let (mut wallet, owner, _) = create_test_wallet();
        let events = EventLog::new();
        let mut ledger = NoAssets;
        let mut host = Host::new(&mut ledger, &events);
        wallet.propose_quorum_change(2, &owner, &mut host).unwrap();

        for raw in [0, 2, (1u64 << 32) + 1, u64::MAX] {
            let id = ProposalId(raw);
            assert!(wallet.proposal(id).is_none());
            assert_eq!(
                wallet.approve_tx(id, &owner, &mut host),
                Err(WalletError::NotFound(id))
            );
        }
    }

    #[test]
    fn test_shared_id_sequence_and_scan() {
        let (mut wallet, owner, signers) = create_test_wallet();
        let events = EventLog::new();
        let mut ledger = RecordingLedger::default();
        let mut host = Host::new(&mut ledger, &events);

        let first = wallet.propose_quorum_change(4, &owner, &mut host).unwrap();
        let second = wallet
            .propose_transfer(
                signers[0],
                5,
                Address::from_label("USD"),
                &signers[1],
                &mut host,
            )
            .unwrap();

        assert_eq!(first, ProposalId(1));
        assert_eq!(second, ProposalId(2));
        let ids: Vec<ProposalId> = wallet.proposals().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![ProposalId(1), ProposalId(2)]);
        assert_eq!(wallet.pending_proposals().len(), 2);
        assert!(wallet.has_approved(second, &signers[1]));
        assert!(!wallet.has_approved(second, &owner));
        assert!(wallet.proposal(ProposalId(3)).is_none());
    }

    #[test]
    fn test_replay_is_deterministic() {
        fn run() -> MultisigWallet {
            let (mut wallet, owner, signers) = create_test_wallet();
            let events = EventLog::new();
            let mut ledger = NoAssets;
            let mut host = Host::new(&mut ledger, &events);

            let id = wallet.propose_quorum_change(2, &owner, &mut host).unwrap();
            wallet.approve_tx(id, &signers[2], &mut host).unwrap();
            let _ = wallet.approve_tx(id, &signers[2], &mut host);
            wallet.approve_tx(id, &signers[0], &mut host).unwrap();
            wallet
        }

        assert_eq!(run(), run());
    }

    #[test]
    fn test_serde_roundtrip_preserves_state() {
        let (mut wallet, owner, signers) = create_test_wallet();
        let events = EventLog::new();
        let mut ledger = NoAssets;
        let mut host = Host::new(&mut ledger, &events);
        let id = wallet.propose_quorum_change(2, &owner, &mut host).unwrap();
        wallet.approve_tx(id, &signers[0], &mut host).unwrap();

        let json = serde_json::to_string(&wallet).unwrap();
        let restored: MultisigWallet = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, wallet);
    }
}
