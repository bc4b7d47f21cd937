//! Core domain types for Spoke.
//!
//! This crate contains pure domain types with no IO, no async, and minimal
//! dependencies. Everything here can be used from any layer of the client.

mod account;
mod amount;
mod call;
mod phase;
mod resource;

pub use account::{AccountId, InvalidAccountId, MAX_ACCOUNT_ID_LEN, MIN_ACCOUNT_ID_LEN};
pub use amount::{Gas, InvalidAmount, TokenAmount, Yocto};
pub use call::{CallReceipt, FunctionCallRequest};
pub use phase::Phase;
pub use resource::{ResourceRecord, Snapshot};

use serde::{Deserialize, Serialize};

// ============================================================================
// Registration
// ============================================================================

/// Whether an identity has paid the token ledger's one-time storage deposit.
///
/// Derived from the storage-balance query: a `null` response means the
/// identity is unregistered; any non-null balance means registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    #[default]
    Unknown,
    Registered,
    Unregistered,
}

impl RegistrationStatus {
    #[must_use]
    pub fn is_registered(self) -> bool {
        self == RegistrationStatus::Registered
    }
}

/// Storage balance held on the token ledger for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageBalance {
    pub total: Yocto,
    pub available: Yocto,
}

// ============================================================================
// Balance checks
// ============================================================================

/// Result of one balance query. Ephemeral: overwritten on each new check,
/// not accumulated history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceView {
    pub account: AccountId,
    pub amount: TokenAmount,
}
