//! Remote ledger gateway clients.
//!
//! # Architecture
//!
//! The crate is organized around two contract-backed gateways plus the wallet
//! seam that signs their change calls:
//!
//! - [`ResourceGateway`] / [`ContractResourceGateway`] - the resource
//!   contract: fleet size, per-resource availability/holder/inspector, the
//!   per-use fee, and the inspect/return/seed change methods.
//! - [`TokenGateway`] / [`ContractTokenGateway`] - the fungible-token
//!   contract: balances, storage registration, transfers, and
//!   transfer-with-call.
//! - [`WalletConnection`] - the external wallet/identity provider. View calls
//!   never touch it; every change call is described as a
//!   [`FunctionCallRequest`](spoke_types::FunctionCallRequest) and handed to
//!   the wallet to sign and submit.
//!
//! Read traffic goes over JSON-RPC through [`rpc::RpcClient`], with bounded
//! retry for transient HTTP failures in [`retry`].
//!
//! # Error Handling
//!
//! Everything surfaces as [`GatewayError`]. Read-side callers treat any
//! failure as fatal to the current refresh; write-side callers report and
//! re-query ground truth.

// Gateways run on a single-threaded cooperative scheduler; trait futures do
// not need Send bounds.
#![allow(async_fn_in_trait)]

pub mod retry;
pub mod rpc;

mod resource;
mod token;
mod wallet;

pub use resource::{ContractResourceGateway, ResourceGateway};
pub use token::{ContractTokenGateway, TokenGateway};
pub use wallet::WalletConnection;

use std::sync::OnceLock;
use std::time::Duration;

use thiserror::Error;

const CONNECT_TIMEOUT_SECS: u64 = 30;
const REQUEST_TIMEOUT_SECS: u64 = 30;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

/// Failure talking to a remote gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP-level failure: connect, timeout, or a non-success status that
    /// survived retry.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The RPC node answered with an error object.
    #[error("rpc error {name}: {message}")]
    Rpc { name: String, message: String },
    /// The contract itself rejected the call.
    #[error("contract execution failed: {0}")]
    ContractPanic(String),
    /// The response arrived but could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// The wallet refused to sign the transaction.
    #[error("signing declined by wallet")]
    SigningDeclined,
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}

/// Shared HTTP client for all RPC traffic.
///
/// Plain-HTTP endpoints stay allowed: the local sandbox environment serves
/// RPC on `http://localhost:3030`.
pub fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::none())
            .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
            .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
            .build()
            .unwrap_or_else(|e| {
                tracing::error!("failed to build tuned HTTP client: {e}. Falling back to defaults.");
                reqwest::Client::new()
            })
    })
}
