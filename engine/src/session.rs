//! The session orchestrator.
//!
//! One [`Session`] owns the phase state machine and wraps every
//! state-changing action in the same pre-check → submit → settle sequence.
//! Collaborators are injected at construction; there is no ambient global
//! state.

use spoke_gateways::{ResourceGateway, TokenGateway, WalletConnection};
use spoke_types::{
    AccountId, BalanceView, CallReceipt, Phase, RegistrationStatus, Snapshot, TokenAmount,
};

use crate::error::WorkflowError;
use crate::registration::RegistrationGate;
use crate::snapshot::SnapshotBuilder;

/// A resource action's change call, for the shared submit/settle template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResourceAction {
    Inspect,
    Return,
}

impl ResourceAction {
    fn as_str(self) -> &'static str {
        match self {
            ResourceAction::Inspect => "inspect",
            ResourceAction::Return => "return",
        }
    }
}

/// One user's session against the two contracts.
///
/// The session owns the [`Phase`] exclusively: consumers read it to decide
/// which controls to enable, and every mutation goes through the transition
/// rules. While an action is in flight the phase is `Transaction` and any
/// further action request is rejected with [`WorkflowError::ActionInFlight`].
pub struct Session<R, T, W> {
    resources: R,
    tokens: T,
    wallet: W,
    resource_contract: AccountId,
    identity: Option<AccountId>,
    fee: TokenAmount,
    phase: Phase,
    snapshot: Snapshot,
    registration: RegistrationStatus,
    last_balance: Option<BalanceView>,
}

impl<R, T, W> Session<R, T, W>
where
    R: ResourceGateway,
    T: TokenGateway,
    W: WalletConnection,
{
    /// The single composition-root entry point.
    ///
    /// Resolves the active identity, fetches the per-use fee once (it is
    /// authoritative configuration for the rest of the session), builds the
    /// initial snapshot, evaluates registration, and lands on the initial
    /// phase: no identity ⇒ `SignIn`; unregistered ⇒ `Registry`; otherwise
    /// `Home`. Returned as one consistent result — there is no partially
    /// initialized session.
    pub async fn initialize(
        resources: R,
        tokens: T,
        wallet: W,
        resource_contract: AccountId,
    ) -> Result<Self, WorkflowError> {
        let identity = if wallet.is_signed_in() {
            wallet.active_identity()
        } else {
            None
        };

        let fee = resources
            .fee_amount()
            .await
            .map_err(WorkflowError::SnapshotUnavailable)?;
        let snapshot = SnapshotBuilder::new(&resources).build().await?;

        let (phase, registration) = match &identity {
            None => (Phase::SignIn, RegistrationStatus::Unknown),
            Some(identity) => {
                let status = RegistrationGate::new(&tokens, &resources)
                    .check(identity)
                    .await?;
                let phase = if status.is_registered() {
                    Phase::Home
                } else {
                    Phase::Registry
                };
                (phase, status)
            }
        };

        tracing::info!(
            phase = %phase,
            identity = identity.as_ref().map(AccountId::as_str).unwrap_or(""),
            fee = %fee,
            resources = snapshot.len(),
            "session initialized"
        );

        Ok(Self {
            resources,
            tokens,
            wallet,
            resource_contract,
            identity,
            fee,
            phase,
            snapshot,
            registration,
            last_balance: None,
        })
    }

    // ------------------------------------------------------------------
    // Read-side surface for the view
    // ------------------------------------------------------------------

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn identity(&self) -> Option<&AccountId> {
        self.identity.as_ref()
    }

    /// Cheap clone: consumers keep a coherent view across later settles.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.clone()
    }

    #[must_use]
    pub fn registration(&self) -> RegistrationStatus {
        self.registration
    }

    /// The per-use fee fetched at initialization.
    #[must_use]
    pub fn fee(&self) -> TokenAmount {
        self.fee
    }

    /// Result of the most recent balance check, if any.
    #[must_use]
    pub fn last_balance(&self) -> Option<&BalanceView> {
        self.last_balance.as_ref()
    }

    // ------------------------------------------------------------------
    // Identity provider passthrough
    // ------------------------------------------------------------------

    /// Start the wallet sign-in flow scoped to the resource contract.
    /// Completion arrives as a full session reload.
    pub fn request_sign_in(&self) {
        self.wallet.request_sign_in(&self.resource_contract);
    }

    /// Sign out; the wallet reloads the client by contract.
    pub fn sign_out(&self) {
        self.wallet.sign_out();
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    /// Reserve a resource: pay the fee via transfer-with-call, with the
    /// resource index as payload so the resource contract reserves atomically
    /// with the transfer.
    ///
    /// Pre-check: the identity's token balance is read first, and a balance
    /// below the fee vetoes the action before any remote write — saving the
    /// user a transaction the contract would reject. Settle for a successful
    /// reserve comes from the session reload the wallet signing flow
    /// triggers, not from a local refresh.
    pub async fn reserve(&mut self, index: u32) -> Result<CallReceipt, WorkflowError> {
        let identity = self.require_identity()?;
        self.require_home()?;

        let balance = self
            .tokens
            .balance_of(&identity)
            .await
            .map_err(WorkflowError::SnapshotUnavailable)?;
        if balance < self.fee {
            tracing::warn!(
                index,
                balance = %balance,
                fee = %self.fee,
                "reserve vetoed by balance pre-check"
            );
            return Err(WorkflowError::InsufficientBalance {
                available: balance,
                required: self.fee,
            });
        }

        self.set_phase(Phase::Transaction);
        let result = self
            .tokens
            .transfer_and_invoke(&self.resource_contract, self.fee, index.to_string())
            .await
            .map_err(WorkflowError::TransactionRejected);
        self.set_phase(Phase::Home);

        if let Err(error) = &result {
            tracing::warn!(index, %error, "reserve submit failed");
        }
        result
    }

    /// Put a resource under inspection, then settle from ground truth.
    pub async fn inspect(&mut self, index: u32) -> Result<(), WorkflowError> {
        self.resource_action(ResourceAction::Inspect, index).await
    }

    /// Return a held or inspected resource, then settle from ground truth.
    pub async fn return_resource(&mut self, index: u32) -> Result<(), WorkflowError> {
        self.resource_action(ResourceAction::Return, index).await
    }

    /// Pay the storage deposit and seed the new identity with one fee's worth
    /// of tokens. Only valid from the `Registry` phase.
    ///
    /// A failed deposit leaves the session in `Registry`. A failed seed
    /// transfer after a successful deposit still registers the identity and
    /// moves to `Home`; the degraded outcome is reported as
    /// [`WorkflowError::RegistrationIncomplete`].
    pub async fn register(&mut self) -> Result<(), WorkflowError> {
        let identity = self.require_identity()?;
        match self.phase {
            Phase::Registry => {}
            Phase::Transaction => return Err(WorkflowError::ActionInFlight),
            actual => {
                return Err(WorkflowError::WrongPhase {
                    required: Phase::Registry,
                    actual,
                });
            }
        }

        let outcome = RegistrationGate::new(&self.tokens, &self.resources)
            .register(&identity)
            .await;

        match outcome {
            Ok(()) => {
                self.registration = RegistrationStatus::Registered;
                self.set_phase(Phase::Home);
                Ok(())
            }
            Err(error @ WorkflowError::RegistrationIncomplete(_)) => {
                // Registered, just unseeded; the deposit is not undoable.
                self.registration = RegistrationStatus::Registered;
                self.set_phase(Phase::Home);
                Err(error)
            }
            Err(error) => Err(error),
        }
    }

    /// Drop the identity's storage registration, burning any remaining token
    /// balance. The phase stays `Home`: `Registry` is only entered at
    /// initialization, so the registration form reappears on the next reload.
    pub async fn unregister(&mut self) -> Result<(), WorkflowError> {
        self.require_identity()?;
        self.require_home()?;

        self.set_phase(Phase::Transaction);
        let result = self
            .tokens
            .unregister_storage(true)
            .await
            .map_err(WorkflowError::TransactionRejected);
        self.set_phase(Phase::Home);

        if result.is_ok() {
            self.registration = RegistrationStatus::Unregistered;
        }
        result.map(|_| ())
    }

    /// Plain token transfer to any account.
    pub async fn transfer(
        &mut self,
        receiver: &AccountId,
        amount: TokenAmount,
    ) -> Result<(), WorkflowError> {
        self.require_identity()?;
        self.require_home()?;

        self.set_phase(Phase::Transaction);
        let result = self
            .tokens
            .transfer(receiver, amount)
            .await
            .map_err(WorkflowError::TransactionRejected);
        self.set_phase(Phase::Home);

        result.map(|_| ())
    }

    /// Query any account's token balance. The result overwrites the session's
    /// last balance view; no history is kept.
    pub async fn check_balance(
        &mut self,
        account: &AccountId,
    ) -> Result<BalanceView, WorkflowError> {
        let amount = self
            .tokens
            .balance_of(account)
            .await
            .map_err(WorkflowError::SnapshotUnavailable)?;
        let view = BalanceView {
            account: account.clone(),
            amount,
        };
        self.last_balance = Some(view.clone());
        Ok(view)
    }

    /// Rebuild the whole snapshot from ground truth. On failure the prior
    /// snapshot is kept unchanged.
    pub async fn rebuild_snapshot(&mut self) -> Result<(), WorkflowError> {
        let snapshot = SnapshotBuilder::new(&self.resources).build().await?;
        self.snapshot = snapshot;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Shared action template
    // ------------------------------------------------------------------

    /// Submit → settle → Home, for the direct resource-contract actions.
    ///
    /// The settle re-query runs whether or not the submit succeeded: the
    /// local snapshot is never assumed correct after a write, it is always
    /// re-derived from the gateway. A submit failure outranks a settle
    /// failure in the reported error.
    async fn resource_action(
        &mut self,
        action: ResourceAction,
        index: u32,
    ) -> Result<(), WorkflowError> {
        self.require_identity()?;
        self.require_home()?;

        self.set_phase(Phase::Transaction);

        let submit = match action {
            ResourceAction::Inspect => self.resources.inspect(index).await,
            ResourceAction::Return => self.resources.return_resource(index).await,
        };
        if let Err(error) = &submit {
            tracing::warn!(action = action.as_str(), index, %error, "submit failed");
        }

        let settle = SnapshotBuilder::new(&self.resources)
            .refresh_one(index)
            .await;
        match &settle {
            Ok(record) => {
                self.snapshot = self.snapshot.with_updated(index, record.clone());
            }
            Err(error) => {
                // Stale record kept as-is; staleness beats corruption.
                tracing::warn!(action = action.as_str(), index, %error, "settle re-query failed");
            }
        }

        self.set_phase(Phase::Home);

        submit.map_err(WorkflowError::TransactionRejected)?;
        settle.map(|_| ())
    }

    fn require_identity(&self) -> Result<AccountId, WorkflowError> {
        self.identity.clone().ok_or(WorkflowError::NotSignedIn)
    }

    fn require_home(&self) -> Result<(), WorkflowError> {
        match self.phase {
            Phase::Home => Ok(()),
            Phase::Transaction => Err(WorkflowError::ActionInFlight),
            actual => Err(WorkflowError::WrongPhase {
                required: Phase::Home,
                actual,
            }),
        }
    }

    fn set_phase(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal phase transition {} -> {next}",
            self.phase
        );
        tracing::info!(from = %self.phase, to = %next, "phase transition");
        self.phase = next;
    }
}
