//! Workflow error taxonomy.

use thiserror::Error;

use spoke_gateways::GatewayError;
use spoke_types::{Phase, TokenAmount};

/// Everything an action or refresh can report to the view.
///
/// Read failures abort the current refresh only; write failures are caught
/// per-action and the workflow still settles back to ground truth, so none of
/// these corrupt the session's prior snapshot.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A read-side query failed while building or refreshing state. The
    /// previous snapshot stays as it was: stale, not corrupted.
    #[error("snapshot unavailable: {0}")]
    SnapshotUnavailable(#[source] GatewayError),

    /// Pre-check veto: the reserve fee exceeds the identity's balance. No
    /// remote write was attempted.
    #[error("insufficient balance: have {available}, need {required}")]
    InsufficientBalance {
        available: TokenAmount,
        required: TokenAmount,
    },

    /// A change call failed remotely (signing declined, contract assertion,
    /// transport). The session re-queried ground truth before reporting.
    #[error("transaction rejected: {0}")]
    TransactionRejected(#[source] GatewayError),

    /// The storage deposit succeeded but the follow-up seed transfer failed.
    /// Non-fatal: the identity is registered, just without seed funds, and
    /// the remote deposit cannot be undone from this client.
    #[error("registration incomplete, seed transfer failed: {0}")]
    RegistrationIncomplete(#[source] GatewayError),

    /// An action was requested while another is in flight. Explicit
    /// rejection; there is never a second concurrent submit.
    #[error("another action is already in flight")]
    ActionInFlight,

    /// The requested operation is not available in the current phase.
    #[error("operation requires phase {required}, session is in {actual}")]
    WrongPhase { required: Phase, actual: Phase },

    /// No identity is signed in.
    #[error("no identity is signed in")]
    NotSignedIn,
}
