//! Storage-registration gate.
//!
//! The token ledger requires a one-time storage deposit before an identity
//! can hold a balance or receive transfers. Every resource action is blocked
//! until the gate is satisfied.

use spoke_gateways::{ResourceGateway, TokenGateway};
use spoke_types::{AccountId, RegistrationStatus};

use crate::error::WorkflowError;

pub struct RegistrationGate<'a, T, R> {
    tokens: &'a T,
    resources: &'a R,
}

impl<'a, T: TokenGateway, R: ResourceGateway> RegistrationGate<'a, T, R> {
    pub fn new(tokens: &'a T, resources: &'a R) -> Self {
        Self { tokens, resources }
    }

    /// Whether `identity` has paid the storage deposit.
    ///
    /// A `null` storage balance means unregistered; any non-null balance
    /// means registered.
    pub async fn check(&self, identity: &AccountId) -> Result<RegistrationStatus, WorkflowError> {
        let balance = self
            .tokens
            .storage_balance_of(identity)
            .await
            .map_err(WorkflowError::SnapshotUnavailable)?;
        Ok(match balance {
            Some(_) => RegistrationStatus::Registered,
            None => RegistrationStatus::Unregistered,
        })
    }

    /// Pay the storage deposit, then seed the new identity with the per-use
    /// fee so it can immediately afford one reservation.
    ///
    /// If the deposit fails the seed transfer never runs. If the seed
    /// transfer fails after a successful deposit, the registration stands and
    /// [`WorkflowError::RegistrationIncomplete`] reports the degraded
    /// outcome.
    pub async fn register(&self, identity: &AccountId) -> Result<(), WorkflowError> {
        self.tokens
            .register_storage()
            .await
            .map_err(WorkflowError::TransactionRejected)?;

        if let Err(source) = self.resources.seed_new_user(identity).await {
            tracing::warn!(
                identity = %identity,
                error = %source,
                "storage deposit succeeded but seed transfer failed"
            );
            return Err(WorkflowError::RegistrationIncomplete(source));
        }

        tracing::info!(identity = %identity, "identity registered and seeded");
        Ok(())
    }
}
