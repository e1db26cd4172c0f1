//! CLI commands for the wallet factory
//!
//! Implements all command handlers for the CLI interface.

use crate::core::{
    Address, Host, LogSink, MultisigWallet, Proposal, ProposalId, ProposalKind, WalletError,
};
use crate::storage::{HostState, Storage, StorageConfig};
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub state: HostState,
    pub storage: Storage,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize application state
    pub fn new(data_dir: PathBuf) -> CliResult<Self> {
        let storage = Storage::new(StorageConfig::in_dir(&data_dir))?;

        let state = if storage.exists() {
            log::debug!("Loading state from {:?}", data_dir);
            storage.load()?
        } else {
            println!("🆕 No saved state found, starting fresh...");
            HostState::default()
        };

        Ok(Self {
            state,
            storage,
            data_dir,
        })
    }

    /// Save the current state
    pub fn save(&mut self) -> CliResult<()> {
        self.storage.save(&mut self.state)?;
        Ok(())
    }

    /// Run a mutating wallet call and persist whatever it changed
    ///
    /// A failed execution still records the triggering approval, so the state is
    /// saved for `ExecutionFailed` as well as for success.
    fn wallet_call<T>(
        &mut self,
        wallet: &Address,
        call: impl FnOnce(&mut MultisigWallet, &mut Host<'_>) -> Result<T, WalletError>,
    ) -> CliResult<T> {
        let result = self.state.with_wallet(wallet, &LogSink, call);

        if matches!(result, Ok(_) | Err(WalletError::ExecutionFailed(_))) {
            self.save()?;
        }

        Ok(result?)
    }

    fn wallet(&self, address: &Address) -> CliResult<&MultisigWallet> {
        self.state
            .factory
            .wallet(address)
            .ok_or_else(|| WalletError::WalletNotFound(*address).into())
    }

    /// Resolve an asset given either its address or its symbol
    pub fn resolve_asset(&self, asset: &str) -> CliResult<Address> {
        if asset.starts_with("0x") || asset.starts_with("0X") {
            let address: Address = asset.parse()?;
            return self
                .state
                .ledger
                .get(&address)
                .map(|a| a.address)
                .ok_or_else(|| format!("Unknown asset: {}", address).into());
        }

        self.state
            .ledger
            .find_by_symbol(asset)
            .map(|a| a.address)
            .ok_or_else(|| format!("Unknown asset symbol: {}", asset).into())
    }
}

/// Parse an account argument: `0x`-prefixed hex, or a label to derive one from
pub fn parse_account(input: &str) -> CliResult<Address> {
    let input = input.trim();
    if input.is_empty() {
        return Err("Empty account".into());
    }

    if input.starts_with("0x") || input.starts_with("0X") {
        Ok(input.parse()?)
    } else {
        Ok(Address::from_label(input))
    }
}

/// Parse a comma-separated list of accounts
pub fn parse_accounts(input: &str) -> CliResult<Vec<Address>> {
    input
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(parse_account)
        .collect()
}

/// Initialize a new data directory
pub fn cmd_init(data_dir: &Path, factory: Option<&str>, force: bool) -> CliResult<()> {
    let storage = Storage::new(StorageConfig::in_dir(data_dir))?;

    if storage.exists() && !force {
        println!("⚠️  State already exists at {:?}", data_dir);
        println!("   Use --force to reinitialize (this will delete existing data)");
        return Ok(());
    }

    let mut state = match factory {
        Some(label) => HostState::new(parse_account(label)?),
        None => HostState::default(),
    };

    storage.save(&mut state)?;

    println!("✅ Wallet factory initialized!");
    println!("   📁 Data directory: {:?}", data_dir);
    println!("   🏭 Factory address: {}", state.factory.address());

    Ok(())
}

/// Create a wallet through the factory
pub fn cmd_wallet_create(
    app: &mut AppState,
    quorum: u32,
    signers: &[Address],
    creator: &Address,
) -> CliResult<()> {
    let address = app
        .state
        .factory
        .create_wallet(quorum, signers, *creator, &LogSink)?;
    app.save()?;

    let wallet = app.wallet(&address)?;
    println!("🔐 Multisig wallet created!");
    println!("   📍 Address: {}", address);
    println!("   👥 Policy: {}", wallet.description());
    println!(
        "   🔢 Wallets created by this factory: {}",
        app.state.factory.get_cloned_contract_count()
    );

    Ok(())
}

/// Show one wallet
pub fn cmd_wallet_show(app: &AppState, address: &Address) -> CliResult<()> {
    let wallet = app.wallet(address)?;

    println!("🔐 Wallet {}", wallet.address());
    println!("   ├─ Creator: {}", wallet.creator());
    println!("   ├─ Quorum: {}", wallet.quorum());
    println!("   ├─ Valid signers: {}", wallet.no_of_valid_signers());
    for signer in wallet.signers() {
        println!("   │   └─ {}", signer);
    }
    println!("   ├─ Proposals: {}", wallet.proposal_count());
    println!("   ├─ Pending: {}", wallet.pending_proposals().len());

    let balances = app.state.ledger.balances_for(wallet.address());
    if balances.is_empty() {
        println!("   └─ Balances: none");
    } else {
        println!("   └─ Balances:");
        for (asset, amount) in balances {
            println!("       └─ {} {}", amount, asset.symbol());
        }
    }

    Ok(())
}

/// List wallets, optionally only those a signer belongs to
pub fn cmd_wallet_list(app: &AppState, signer: Option<&Address>) -> CliResult<()> {
    let wallets = match signer {
        Some(signer) => app.state.factory.wallets_for_signer(signer),
        None => app.state.factory.wallets(),
    };

    if wallets.is_empty() {
        println!("📭 No wallets found. Create one with: multisig wallet create");
        return Ok(());
    }

    println!("📋 Wallets ({}):", wallets.len());
    for wallet in wallets {
        println!(
            "   {} ({}) - {} pending",
            wallet.address(),
            wallet.description(),
            wallet.pending_proposals().len()
        );
    }

    Ok(())
}

/// Propose a quorum change
pub fn cmd_propose_quorum(
    app: &mut AppState,
    wallet: &Address,
    new_quorum: u32,
    proposer: &Address,
) -> CliResult<()> {
    let id = app.wallet_call(wallet, |w, host| {
        w.propose_quorum_change(new_quorum, proposer, host)
    })?;

    println!("📝 Proposal {} submitted: set quorum to {}", id, new_quorum);
    print_progress(app.wallet(wallet)?, id);

    Ok(())
}

/// Propose an asset transfer out of the wallet
pub fn cmd_propose_transfer(
    app: &mut AppState,
    wallet: &Address,
    recipient: &Address,
    amount: u128,
    asset: &str,
    proposer: &Address,
) -> CliResult<()> {
    let asset = app.resolve_asset(asset)?;
    let id = app.wallet_call(wallet, |w, host| {
        w.propose_transfer(*recipient, amount, asset, proposer, host)
    })?;

    println!("📝 Proposal {} submitted: transfer {} to {}", id, amount, recipient);
    print_progress(app.wallet(wallet)?, id);

    Ok(())
}

/// Approve a proposal
pub fn cmd_approve(
    app: &mut AppState,
    wallet: &Address,
    id: u64,
    approver: &Address,
) -> CliResult<()> {
    let id = ProposalId(id);
    let result = app.wallet_call(wallet, |w, host| w.approve_tx(id, approver, host))?;

    println!("✍️  Proposal {} approved by {}", id, approver);
    if result.executed {
        println!("✅ Quorum reached, proposal executed!");
    }
    print_progress(app.wallet(wallet)?, id);

    Ok(())
}

/// Retry execution of a proposal that already has enough approvals
pub fn cmd_execute(
    app: &mut AppState,
    wallet: &Address,
    id: u64,
    caller: &Address,
) -> CliResult<()> {
    let id = ProposalId(id);
    app.wallet_call(wallet, |w, host| w.execute_proposal(id, caller, host))?;

    println!("✅ Proposal {} executed!", id);
    Ok(())
}

/// List a wallet's proposals
pub fn cmd_proposals(app: &AppState, wallet: &Address, pending_only: bool) -> CliResult<()> {
    let wallet = app.wallet(wallet)?;

    let proposals: Vec<&Proposal> = if pending_only {
        wallet.pending_proposals()
    } else {
        wallet.proposals().iter().collect()
    };

    if proposals.is_empty() {
        println!("📭 No proposals.");
        return Ok(());
    }

    println!(
        "📋 Proposals for {} (quorum {}):",
        wallet.address(),
        wallet.quorum()
    );
    for proposal in proposals {
        let status = if proposal.executed {
            "executed"
        } else {
            "pending"
        };
        println!(
            "   #{} | {} | {}/{} | {}",
            proposal.id,
            status,
            proposal.approval_count(),
            wallet.quorum(),
            describe(app, &proposal.kind)
        );
        if let Some(reason) = &proposal.last_failure {
            println!("      ⚠️  last attempt failed: {}", reason);
        }
    }

    Ok(())
}

/// Register a new asset
pub fn cmd_asset_register(
    app: &mut AppState,
    symbol: &str,
    issuer: &Address,
    supply: u128,
) -> CliResult<()> {
    let address = app.state.ledger.register_asset(symbol, *issuer, supply)?;
    app.save()?;

    println!("🪙 Asset {} registered!", symbol);
    println!("   📍 Address: {}", address);
    println!("   💰 Initial supply: {} (held by {})", supply, issuer);

    Ok(())
}

/// Mint new units of an asset
pub fn cmd_asset_mint(
    app: &mut AppState,
    asset: &str,
    caller: &Address,
    to: &Address,
    amount: u128,
) -> CliResult<()> {
    let asset = app.resolve_asset(asset)?;
    let balance = app.state.ledger.mint(&asset, caller, to, amount)?;
    app.save()?;

    println!("🪙 Minted {} to {}", amount, to);
    println!("   New balance: {}", balance);

    Ok(())
}

/// Show an account's balance of one asset
pub fn cmd_asset_balance(app: &AppState, asset: &str, holder: &Address) -> CliResult<()> {
    let asset = app.resolve_asset(asset)?;
    let balance = app.state.ledger.balance_of(&asset, holder)?;

    println!("💰 Balance for {}", holder);
    println!("   {} of {}", balance, asset);

    Ok(())
}

/// List registered assets
pub fn cmd_asset_list(app: &AppState) -> CliResult<()> {
    let assets = app.state.ledger.list();
    if assets.is_empty() {
        println!("📭 No assets registered");
        return Ok(());
    }

    println!("🪙 Assets ({}):", assets.len());
    for asset in assets {
        println!(
            "   {} {} supply {} ({} holders)",
            asset.symbol(),
            asset.address,
            asset.total_supply(),
            asset.holders().len()
        );
    }

    Ok(())
}

/// Show recent transfers of an asset
pub fn cmd_asset_history(app: &AppState, asset: &str) -> CliResult<()> {
    let address = app.resolve_asset(asset)?;
    let history = app.state.ledger.history(&address)?;

    if history.is_empty() {
        println!("📭 No transfers of {}", asset);
        return Ok(());
    }

    println!("📜 Transfers of {} ({}):", asset, history.len());
    for record in &history {
        println!("   {} → {}: {}", record.from.short(), record.to.short(), record.amount);
    }

    Ok(())
}

fn print_progress(wallet: &MultisigWallet, id: ProposalId) {
    if let Some(proposal) = wallet.proposal(id) {
        println!(
            "   Approvals: {}/{}{}",
            proposal.approval_count(),
            wallet.quorum(),
            if proposal.executed { " (executed)" } else { "" }
        );
    }
}

fn describe(app: &AppState, kind: &ProposalKind) -> String {
    match kind {
        ProposalKind::Transfer {
            recipient,
            amount,
            asset,
        } => {
            let symbol = app
                .state
                .ledger
                .get(asset)
                .map(|a| a.symbol().to_string())
                .unwrap_or_else(|| asset.short());
            format!("transfer {} {} to {}", amount, symbol, recipient.short())
        }
        other => other.to_string(),
    }
}
