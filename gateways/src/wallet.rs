//! The wallet/identity seam.
//!
//! The wallet is an external collaborator: it authenticates the user, holds
//! the session keys, and signs every change call. This client only describes
//! what to call; it never sees key material. Sign-in and sign-out redirect
//! through the wallet and reload the session by contract, so neither is
//! modeled as producing a result here.

use spoke_types::{AccountId, CallReceipt, FunctionCallRequest};

use crate::GatewayError;

pub trait WalletConnection {
    /// Whether an identity is authenticated for this session.
    fn is_signed_in(&self) -> bool;

    /// The authenticated identity, if any. Immutable once signed in for the
    /// lifetime of the session.
    fn active_identity(&self) -> Option<AccountId>;

    /// Start the external sign-in flow, granting the app a key scoped to
    /// `contract`. Completion arrives as a full session reload.
    fn request_sign_in(&self, contract: &AccountId);

    /// End the session. Triggers a full client reload by contract.
    fn sign_out(&self);

    /// Sign and submit one state-changing contract call.
    ///
    /// No cancellation: once submitted, the call runs to completion or
    /// failure on the ledger. A declined signature surfaces as
    /// [`GatewayError::SigningDeclined`].
    async fn function_call(&self, request: FunctionCallRequest)
    -> Result<CallReceipt, GatewayError>;
}
