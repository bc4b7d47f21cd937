//! The UI-visible phase state machine.

use serde::{Deserialize, Serialize};

/// Where the session currently is, from the view's perspective.
///
/// Owned exclusively by the session orchestrator; consumers only read it.
///
/// Transitions:
/// - `SignIn → Registry | Home` (initial evaluation only),
/// - `Registry → Home` (successful registration),
/// - `Home → Transaction → Home` (any resource action).
///
/// `SignIn` is terminal until an external sign-in completes, which reloads
/// the session and re-evaluates from scratch. `Transaction` is entered only
/// from `Home` and always returns there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    SignIn,
    Registry,
    Home,
    Transaction,
}

impl Phase {
    /// Whether the state machine permits moving from `self` to `next`.
    #[must_use]
    pub fn can_transition_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::SignIn, Phase::Registry | Phase::Home)
                | (Phase::Registry, Phase::Home)
                | (Phase::Home, Phase::Transaction)
                | (Phase::Transaction, Phase::Home)
        )
    }

    /// Whether a new action may be dispatched in this phase.
    #[must_use]
    pub fn accepts_actions(self) -> bool {
        self == Phase::Home
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::SignIn => "sign_in",
            Phase::Registry => "registry",
            Phase::Home => "home",
            Phase::Transaction => "transaction",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
