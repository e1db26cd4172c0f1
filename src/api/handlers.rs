//! REST API handlers for wallet factory operations

use crate::api::websocket::WsBroadcaster;
use crate::core::{
    Address, ApprovalResult, Host, MultisigWallet, Proposal, ProposalId, ProposalKind,
    ProposalStatus, WalletError,
};
use crate::storage::{HostState, Storage};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub host: Arc<RwLock<HostState>>,
    pub storage: Arc<Storage>,
    pub ws_broadcaster: Arc<WsBroadcaster>,
}

impl ApiState {
    pub fn new(host: HostState, storage: Storage) -> Self {
        Self {
            host: Arc::new(RwLock::new(host)),
            storage: Arc::new(storage),
            ws_broadcaster: Arc::new(WsBroadcaster::new()),
        }
    }
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct FactoryInfo {
    pub address: Address,
    pub wallet_count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WalletInfo {
    pub address: Address,
    pub creator: Address,
    pub quorum: u32,
    pub no_of_valid_signers: u32,
    pub signers: Vec<Address>,
    pub description: String,
    pub proposal_count: usize,
    pub pending_proposals: usize,
}

impl From<&MultisigWallet> for WalletInfo {
    fn from(wallet: &MultisigWallet) -> Self {
        Self {
            address: *wallet.address(),
            creator: *wallet.creator(),
            quorum: wallet.quorum(),
            no_of_valid_signers: wallet.no_of_valid_signers(),
            signers: wallet.signers(),
            description: wallet.description(),
            proposal_count: wallet.proposal_count(),
            pending_proposals: wallet.pending_proposals().len(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProposalInfo {
    pub id: ProposalId,
    pub kind: ProposalKind,
    pub creator: Address,
    pub approvals: u32,
    pub approved_by: Vec<Address>,
    pub status: ProposalStatus,
    pub executed: bool,
    pub last_failure: Option<String>,
}

impl From<&Proposal> for ProposalInfo {
    fn from(proposal: &Proposal) -> Self {
        Self {
            id: proposal.id,
            kind: proposal.kind.clone(),
            creator: proposal.creator,
            approvals: proposal.approval_count(),
            approved_by: proposal.approved_by(),
            status: proposal.status(),
            executed: proposal.executed,
            last_failure: proposal.last_failure.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    /// Stable error code, present for wallet errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateWalletRequest {
    pub creator: Address,
    pub quorum: u32,
    pub signers: Vec<Address>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProposeQuorumRequest {
    pub caller: Address,
    pub new_quorum: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProposeTransferRequest {
    pub caller: Address,
    pub recipient: Address,
    pub amount: u128,
    pub asset: Address,
}

/// Body of approve/execute calls; `caller` is the acting signer
#[derive(Debug, Serialize, Deserialize)]
pub struct CallerRequest {
    pub caller: Address,
}

// ============================================================================
// Helpers
// ============================================================================

/// Map a wallet error to its HTTP status and JSON body
pub fn wallet_error(err: WalletError) -> (StatusCode, Json<ApiError>) {
    let status = match err {
        WalletError::WalletNotFound(_) | WalletError::NotFound(_) => StatusCode::NOT_FOUND,
        WalletError::InvalidSigner(_) => StatusCode::FORBIDDEN,
        WalletError::AlreadyApproved
        | WalletError::AlreadyExecuted(_)
        | WalletError::NotReady { .. } => StatusCode::CONFLICT,
        WalletError::ExecutionFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::BAD_REQUEST,
    };

    (
        status,
        Json(ApiError {
            error: err.to_string(),
            kind: Some(err.kind().to_string()),
        }),
    )
}

/// Error kind for calls that were applied in memory but could not be saved
pub const NOT_PERSISTED: &str = "not_persisted";

fn api_error(status: StatusCode, error: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            error: error.into(),
            kind: None,
        }),
    )
}

fn parse_address(input: &str) -> Result<Address, (StatusCode, Json<ApiError>)> {
    input
        .parse()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Invalid address: {}", e)))
}

/// Save the host state after a change has been applied in memory.
///
/// A save failure does not roll the change back: events for it are already
/// out. The 500 response carries kind `not_persisted` so clients know the call
/// took effect and must not be retried. The next successful save writes it.
fn persist(storage: &Storage, host: &mut HostState) -> Result<(), (StatusCode, Json<ApiError>)> {
    storage.save(host).map_err(|e| {
        log::error!("Failed to save state: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: format!("change applied but not saved: {}", e),
                kind: Some(NOT_PERSISTED.to_string()),
            }),
        )
    })
}

/// Run a mutating wallet call, broadcasting its events and saving the result
async fn wallet_call<T>(
    state: &ApiState,
    address: &str,
    call: impl FnOnce(&mut MultisigWallet, &mut Host<'_>) -> Result<T, WalletError>,
) -> Result<T, (StatusCode, Json<ApiError>)> {
    let address = parse_address(address)?;
    let mut host = state.host.write().await;

    let result = host.with_wallet(&address, state.ws_broadcaster.as_ref(), call);

    // A failed execution keeps its approval, so it is saved too
    if matches!(result, Ok(_) | Err(WalletError::ExecutionFailed(_))) {
        persist(&state.storage, &mut host)?;
    }

    result.map_err(wallet_error)
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check
pub async fn health_check() -> &'static str {
    "OK"
}

/// Factory identity and creation count
pub async fn get_factory(State(state): State<ApiState>) -> Json<FactoryInfo> {
    let host = state.host.read().await;

    Json(FactoryInfo {
        address: *host.factory.address(),
        wallet_count: host.factory.get_cloned_contract_count(),
    })
}

/// Create a wallet through the factory
pub async fn create_wallet(
    State(state): State<ApiState>,
    Json(req): Json<CreateWalletRequest>,
) -> ApiResult<WalletInfo> {
    let mut host = state.host.write().await;

    let address = host
        .factory
        .create_wallet(
            req.quorum,
            &req.signers,
            req.creator,
            state.ws_broadcaster.as_ref(),
        )
        .map_err(wallet_error)?;

    persist(&state.storage, &mut host)?;

    let wallet = host
        .factory
        .wallet(&address)
        .ok_or_else(|| wallet_error(WalletError::WalletNotFound(address)))?;
    Ok(Json(wallet.into()))
}

/// List wallets in creation order
pub async fn list_wallets(State(state): State<ApiState>) -> Json<Vec<WalletInfo>> {
    let host = state.host.read().await;
    Json(host.factory.wallets().into_iter().map(WalletInfo::from).collect())
}

/// Get one wallet
pub async fn get_wallet(
    State(state): State<ApiState>,
    Path(address): Path<String>,
) -> ApiResult<WalletInfo> {
    let address = parse_address(&address)?;
    let host = state.host.read().await;

    host.factory
        .wallet(&address)
        .map(|wallet| Json(wallet.into()))
        .ok_or_else(|| wallet_error(WalletError::WalletNotFound(address)))
}

/// List a wallet's proposals in id order
pub async fn list_proposals(
    State(state): State<ApiState>,
    Path(address): Path<String>,
) -> ApiResult<Vec<ProposalInfo>> {
    let address = parse_address(&address)?;
    let host = state.host.read().await;

    let wallet = host
        .factory
        .wallet(&address)
        .ok_or_else(|| wallet_error(WalletError::WalletNotFound(address)))?;

    Ok(Json(
        wallet.proposals().iter().map(ProposalInfo::from).collect(),
    ))
}

/// Get one proposal
pub async fn get_proposal(
    State(state): State<ApiState>,
    Path((address, id)): Path<(String, u64)>,
) -> ApiResult<ProposalInfo> {
    let address = parse_address(&address)?;
    let host = state.host.read().await;

    let wallet = host
        .factory
        .wallet(&address)
        .ok_or_else(|| wallet_error(WalletError::WalletNotFound(address)))?;

    wallet
        .proposal(ProposalId(id))
        .map(|p| Json(p.into()))
        .ok_or_else(|| wallet_error(WalletError::NotFound(ProposalId(id))))
}

/// Submit a quorum-change proposal
pub async fn propose_quorum(
    State(state): State<ApiState>,
    Path(address): Path<String>,
    Json(req): Json<ProposeQuorumRequest>,
) -> ApiResult<ApprovalResult> {
    let result = wallet_call(&state, &address, |wallet, host| {
        let id = wallet.propose_quorum_change(req.new_quorum, &req.caller, host)?;
        wallet
            .proposal(id)
            .map(ApprovalResult::from)
            .ok_or(WalletError::NotFound(id))
    })
    .await?;

    Ok(Json(result))
}

/// Submit a transfer proposal
pub async fn propose_transfer(
    State(state): State<ApiState>,
    Path(address): Path<String>,
    Json(req): Json<ProposeTransferRequest>,
) -> ApiResult<ApprovalResult> {
    let result = wallet_call(&state, &address, |wallet, host| {
        let id = wallet.propose_transfer(req.recipient, req.amount, req.asset, &req.caller, host)?;
        wallet
            .proposal(id)
            .map(ApprovalResult::from)
            .ok_or(WalletError::NotFound(id))
    })
    .await?;

    Ok(Json(result))
}

/// Approve a proposal (executes it once quorum is reached)
pub async fn approve_proposal(
    State(state): State<ApiState>,
    Path((address, id)): Path<(String, u64)>,
    Json(req): Json<CallerRequest>,
) -> ApiResult<ApprovalResult> {
    let result = wallet_call(&state, &address, |wallet, host| {
        wallet.approve_tx(ProposalId(id), &req.caller, host)
    })
    .await?;

    Ok(Json(result))
}

/// Retry execution of a proposal that already holds enough approvals
pub async fn execute_proposal(
    State(state): State<ApiState>,
    Path((address, id)): Path<(String, u64)>,
    Json(req): Json<CallerRequest>,
) -> ApiResult<ApprovalResult> {
    let result = wallet_call(&state, &address, |wallet, host| {
        wallet.execute_proposal(ProposalId(id), &req.caller, host)
    })
    .await?;

    Ok(Json(result))
}
