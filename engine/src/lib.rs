//! Session state machine and transaction orchestration.
//!
//! This crate is the client's core: it reconciles N independently-queried
//! remote resource states into one [`Snapshot`](spoke_types::Snapshot), gates
//! every state-changing action behind prerequisite checks, and drives the
//! phase state machine the view renders.
//!
//! The engine is generic over the gateway traits in [`spoke_gateways`]; the
//! composition root wires in the contract-backed implementations, tests wire
//! in mocks. Nothing here touches a UI framework, ambient globals, or the
//! network directly.

// Single-threaded cooperative scheduling: the session is driven from one
// task, so gateway futures carry no Send bounds.
#![allow(async_fn_in_trait)]

mod error;
mod registration;
mod session;
mod snapshot;

pub use error::WorkflowError;
pub use registration::RegistrationGate;
pub use session::Session;
pub use snapshot::SnapshotBuilder;

pub use spoke_gateways::{GatewayError, ResourceGateway, TokenGateway, WalletConnection};
pub use spoke_types::{
    AccountId, BalanceView, CallReceipt, Phase, RegistrationStatus, ResourceRecord, Snapshot,
    TokenAmount,
};
