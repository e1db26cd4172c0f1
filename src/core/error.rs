//! Wallet error taxonomy
//!
//! Every rejection carries a stable, matchable variant. Validation always runs
//! before state is touched, so an error never leaves a half-applied call behind.
//! The one documented exception is [`WalletError::ExecutionFailed`]: the approval
//! that triggered the failed execution stays recorded.

use crate::core::address::Address;
use crate::core::proposal::ProposalId;
use thiserror::Error;

/// Errors returned by wallet and factory operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("quorum is too small")]
    QuorumTooSmall,
    #[error("few valid signers")]
    TooFewSigners,
    #[error("quorum greater than valid signers")]
    QuorumTooLarge,
    #[error("duplicate signer: {0}")]
    DuplicateSigner(Address),
    #[error("zero address is not allowed")]
    ZeroAddress,
    #[error("invalid signer: {0}")]
    InvalidSigner(Address),
    #[error("can't sign twice")]
    AlreadyApproved,
    #[error("proposal {0} already executed")]
    AlreadyExecuted(ProposalId),
    #[error("proposal {0} not found")]
    NotFound(ProposalId),
    #[error("invalid amount: must be greater than 0")]
    InvalidAmount,
    #[error("invalid recipient: {0}")]
    InvalidRecipient(Address),
    #[error("proposal {id} not ready: have {have} approvals, need {need}")]
    NotReady { id: ProposalId, have: u32, need: u32 },
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
    #[error("wallet not found: {0}")]
    WalletNotFound(Address),
}

impl WalletError {
    /// Stable machine-readable code for this error
    pub fn kind(&self) -> &'static str {
        match self {
            WalletError::QuorumTooSmall => "quorum_too_small",
            WalletError::TooFewSigners => "too_few_signers",
            WalletError::QuorumTooLarge => "quorum_too_large",
            WalletError::DuplicateSigner(_) => "duplicate_signer",
            WalletError::ZeroAddress => "zero_address",
            WalletError::InvalidSigner(_) => "invalid_signer",
            WalletError::AlreadyApproved => "already_approved",
            WalletError::AlreadyExecuted(_) => "already_executed",
            WalletError::NotFound(_) => "not_found",
            WalletError::InvalidAmount => "invalid_amount",
            WalletError::InvalidRecipient(_) => "invalid_recipient",
            WalletError::NotReady { .. } => "not_ready",
            WalletError::ExecutionFailed(_) => "execution_failed",
            WalletError::WalletNotFound(_) => "wallet_not_found",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_revert_strings() {
        assert_eq!(WalletError::QuorumTooSmall.to_string(), "quorum is too small");
        assert_eq!(WalletError::TooFewSigners.to_string(), "few valid signers");
        assert_eq!(
            WalletError::QuorumTooLarge.to_string(),
            "quorum greater than valid signers"
        );
        assert_eq!(WalletError::AlreadyApproved.to_string(), "can't sign twice");
    }

    #[test]
    fn test_kinds_are_distinct() {
        let errors = [
            WalletError::QuorumTooSmall,
            WalletError::TooFewSigners,
            WalletError::QuorumTooLarge,
            WalletError::DuplicateSigner(Address::ZERO),
            WalletError::ZeroAddress,
            WalletError::InvalidSigner(Address::ZERO),
            WalletError::AlreadyApproved,
            WalletError::AlreadyExecuted(ProposalId(1)),
            WalletError::NotFound(ProposalId(1)),
            WalletError::InvalidAmount,
            WalletError::InvalidRecipient(Address::ZERO),
            WalletError::NotReady {
                id: ProposalId(1),
                have: 1,
                need: 2,
            },
            WalletError::ExecutionFailed("boom".to_string()),
            WalletError::WalletNotFound(Address::ZERO),
        ];

        let mut kinds: Vec<&str> = errors.iter().map(|e| e.kind()).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }
}
