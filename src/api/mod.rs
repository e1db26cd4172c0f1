//! REST API module
//!
//! Provides HTTP REST API access to the wallet factory. The acting signer is
//! named in each mutating request body as `caller`.
//!
//! # Endpoints
//!
//! ## Factory
//! - `GET /api/factory` - Factory address and creation count
//!
//! ## Wallets
//! - `GET /api/wallets` - List wallets
//! - `POST /api/wallets` - Create wallet
//! - `GET /api/wallets/{address}` - Get wallet
//!
//! ## Proposals
//! - `GET /api/wallets/{address}/proposals` - List proposals
//! - `GET /api/wallets/{address}/proposals/{id}` - Get proposal
//! - `POST /api/wallets/{address}/proposals/quorum` - Propose quorum change
//! - `POST /api/wallets/{address}/proposals/transfer` - Propose transfer
//! - `POST /api/wallets/{address}/proposals/{id}/approve` - Approve
//! - `POST /api/wallets/{address}/proposals/{id}/execute` - Retry execution
//!
//! ## WebSocket
//! - `GET /ws` - Real-time wallet events

pub mod handlers;
pub mod routes;
pub mod websocket;

pub use handlers::ApiState;
pub use routes::create_router;
pub use websocket::{WsBroadcaster, WsEvent};
