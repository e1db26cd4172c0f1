//! Multisig wallet factory CLI
//!
//! A command-line interface for creating and operating quorum wallets.

use clap::{Parser, Subcommand};
use multisig_factory::api::{create_router, ApiState};
use multisig_factory::cli::{self, parse_account, parse_accounts, AppState};
use multisig_factory::storage::{Storage, StorageConfig};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "multisig")]
#[command(version = "0.1.0")]
#[command(about = "Quorum-based multi-signature wallets and their factory", long_about = None)]
struct Cli {
    /// Data directory for wallet storage
    #[arg(short, long, default_value = ".multisig_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new data directory
    Init {
        /// Factory account (label or 0x address)
        #[arg(long)]
        factory: Option<String>,

        /// Overwrite existing state
        #[arg(long)]
        force: bool,
    },

    /// Wallet operations
    Wallet {
        #[command(subcommand)]
        action: WalletCommands,
    },

    /// Submit a proposal
    Propose {
        #[command(subcommand)]
        action: ProposeCommands,
    },

    /// Approve a pending proposal
    Approve {
        /// Wallet address
        #[arg(short, long)]
        wallet: String,

        /// Proposal id
        #[arg(short, long)]
        id: u64,

        /// Approving signer
        #[arg(short, long)]
        from: String,
    },

    /// Retry execution of a proposal that has reached quorum
    Execute {
        /// Wallet address
        #[arg(short, long)]
        wallet: String,

        /// Proposal id
        #[arg(short, long)]
        id: u64,

        /// Calling signer
        #[arg(short, long)]
        from: String,
    },

    /// List a wallet's proposals
    Proposals {
        /// Wallet address
        #[arg(short, long)]
        wallet: String,

        /// Only show pending proposals
        #[arg(long)]
        pending: bool,
    },

    /// Asset ledger operations
    Asset {
        #[command(subcommand)]
        action: AssetCommands,
    },

    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[derive(Subcommand)]
enum WalletCommands {
    /// Create a wallet through the factory
    Create {
        /// Approvals required to execute a proposal
        #[arg(short, long)]
        quorum: u32,

        /// Signers besides the creator (comma-separated)
        #[arg(short, long)]
        signers: String,

        /// Creating account, always a signer
        #[arg(short, long)]
        creator: String,
    },

    /// Show wallet details
    Show {
        /// Wallet address
        #[arg(short, long)]
        address: String,
    },

    /// List wallets
    List {
        /// Only wallets this account can sign for
        #[arg(long)]
        signer: Option<String>,
    },
}

#[derive(Subcommand)]
enum ProposeCommands {
    /// Propose a new quorum
    Quorum {
        /// Wallet address
        #[arg(short, long)]
        wallet: String,

        /// New quorum
        #[arg(short, long)]
        quorum: u32,

        /// Proposing signer
        #[arg(short, long)]
        from: String,
    },

    /// Propose an asset transfer out of the wallet
    Transfer {
        /// Wallet address
        #[arg(short, long)]
        wallet: String,

        /// Recipient account
        #[arg(short, long)]
        to: String,

        /// Amount to transfer
        #[arg(short, long)]
        amount: u128,

        /// Asset symbol or address
        #[arg(long)]
        asset: String,

        /// Proposing signer
        #[arg(short, long)]
        from: String,
    },
}

#[derive(Subcommand)]
enum AssetCommands {
    /// Register a new asset
    Register {
        /// Ticker symbol
        #[arg(short, long)]
        symbol: String,

        /// Issuer, receives the initial supply
        #[arg(short, long)]
        issuer: String,

        /// Initial supply
        #[arg(long, default_value = "0")]
        supply: u128,
    },

    /// Mint new units (issuer only)
    Mint {
        /// Asset symbol or address
        #[arg(long)]
        asset: String,

        /// Issuer
        #[arg(short, long)]
        from: String,

        /// Receiving account
        #[arg(short, long)]
        to: String,

        /// Amount to mint
        #[arg(short, long)]
        amount: u128,
    },

    /// List registered assets
    List,

    /// Show recent transfers of an asset
    History {
        /// Asset symbol or address
        #[arg(long)]
        asset: String,
    },

    /// Show a balance
    Balance {
        /// Asset symbol or address
        #[arg(long)]
        asset: String,

        /// Holder account
        #[arg(long)]
        holder: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Handle init command separately (doesn't need full state)
    if let Commands::Init { factory, force } = &cli.command {
        return cli::cmd_init(&cli.data_dir, factory.as_deref(), *force);
    }

    // Handle serve command with tokio runtime
    if let Commands::Serve { port } = cli.command {
        return run_server(port, &cli.data_dir);
    }

    let mut state = AppState::new(cli.data_dir.clone())?;

    match cli.command {
        Commands::Init { .. } => unreachable!(),
        Commands::Serve { .. } => unreachable!(),

        Commands::Wallet { action } => match action {
            WalletCommands::Create {
                quorum,
                signers,
                creator,
            } => {
                let signers = parse_accounts(&signers)?;
                let creator = parse_account(&creator)?;
                cli::cmd_wallet_create(&mut state, quorum, &signers, &creator)?;
            }
            WalletCommands::Show { address } => {
                cli::cmd_wallet_show(&state, &parse_account(&address)?)?;
            }
            WalletCommands::List { signer } => {
                let signer = signer.as_deref().map(parse_account).transpose()?;
                cli::cmd_wallet_list(&state, signer.as_ref())?;
            }
        },

        Commands::Propose { action } => match action {
            ProposeCommands::Quorum {
                wallet,
                quorum,
                from,
            } => {
                cli::cmd_propose_quorum(
                    &mut state,
                    &parse_account(&wallet)?,
                    quorum,
                    &parse_account(&from)?,
                )?;
            }
            ProposeCommands::Transfer {
                wallet,
                to,
                amount,
                asset,
                from,
            } => {
                cli::cmd_propose_transfer(
                    &mut state,
                    &parse_account(&wallet)?,
                    &parse_account(&to)?,
                    amount,
                    &asset,
                    &parse_account(&from)?,
                )?;
            }
        },

        Commands::Approve { wallet, id, from } => {
            cli::cmd_approve(
                &mut state,
                &parse_account(&wallet)?,
                id,
                &parse_account(&from)?,
            )?;
        }

        Commands::Execute { wallet, id, from } => {
            cli::cmd_execute(
                &mut state,
                &parse_account(&wallet)?,
                id,
                &parse_account(&from)?,
            )?;
        }

        Commands::Proposals { wallet, pending } => {
            cli::cmd_proposals(&state, &parse_account(&wallet)?, pending)?;
        }

        Commands::Asset { action } => match action {
            AssetCommands::Register {
                symbol,
                issuer,
                supply,
            } => {
                cli::cmd_asset_register(&mut state, &symbol, &parse_account(&issuer)?, supply)?;
            }
            AssetCommands::Mint {
                asset,
                from,
                to,
                amount,
            } => {
                cli::cmd_asset_mint(
                    &mut state,
                    &asset,
                    &parse_account(&from)?,
                    &parse_account(&to)?,
                    amount,
                )?;
            }
            AssetCommands::List => {
                cli::cmd_asset_list(&state)?;
            }
            AssetCommands::History { asset } => {
                cli::cmd_asset_history(&state, &asset)?;
            }
            AssetCommands::Balance { asset, holder } => {
                cli::cmd_asset_balance(&state, &asset, &parse_account(&holder)?)?;
            }
        },
    }

    Ok(())
}

fn run_server(port: u16, data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let storage = Storage::new(StorageConfig::in_dir(data_dir))?;

        if storage.exists() {
            println!("📂 Loading existing state...");
        } else {
            println!("📂 Starting with an empty factory...");
        }
        let host = storage.load_or_default()?;

        let state = ApiState::new(host, storage);
        let shutdown_state = state.clone();

        let app = create_router(state);

        let addr = format!("0.0.0.0:{}", port);
        println!("🚀 REST API server starting on http://localhost:{}", port);
        println!();
        println!("📖 Available endpoints:");
        println!("   GET  /health                                   - Health check");
        println!("   GET  /ws                                       - WebSocket events");
        println!("   GET  /api/factory                              - Factory info");
        println!("   GET  /api/wallets                              - List wallets");
        println!("   POST /api/wallets                              - Create wallet");
        println!("   GET  /api/wallets/{{addr}}                       - Get wallet");
        println!("   GET  /api/wallets/{{addr}}/proposals             - List proposals");
        println!("   GET  /api/wallets/{{addr}}/proposals/{{id}}        - Get proposal");
        println!("   POST /api/wallets/{{addr}}/proposals/quorum      - Propose quorum change");
        println!("   POST /api/wallets/{{addr}}/proposals/transfer    - Propose transfer");
        println!("   POST /api/wallets/{{addr}}/proposals/{{id}}/approve - Approve proposal");
        println!("   POST /api/wallets/{{addr}}/proposals/{{id}}/execute - Retry execution");
        println!();

        // Handle Ctrl+C with a final save
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            println!("\n📴 Shutting down API server...");

            let mut host = shutdown_state.host.write().await;
            match shutdown_state.storage.save(&mut host) {
                Ok(()) => println!("✅ State saved"),
                Err(e) => log::error!("Failed to save state on shutdown: {}", e),
            }
            std::process::exit(0);
        });

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
