//! Network and contract configuration.
//!
//! Resolution order mirrors the rest of the client's layering: built-in
//! environment presets, then an optional TOML file, then environment
//! variables. Nothing here is queried from the network; the per-use fee is
//! fetched at session initialization, not configured.

use serde::Deserialize;
use thiserror::Error;

use spoke_types::{AccountId, Gas, InvalidAccountId, Yocto};

/// Gas budget attached to every change call.
pub const FUNCTION_CALL_GAS: Gas = Gas::tera(300);

/// One-time deposit paid to the token ledger's storage registration.
pub const STORAGE_DEPOSIT: Yocto = Yocto::new(1_250_000_000_000_000_000_000);

/// The one-yocto attachment required by transfer-style token methods.
pub const ONE_YOCTO: Yocto = Yocto::new(1);

const DEFAULT_RESOURCE_CONTRACT: &str = "sub.bike_share.testnet";
const DEFAULT_TOKEN_CONTRACT: &str = "my_ft.testnet";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown network environment {0:?}")]
    UnknownNetwork(String),
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid contract account: {0}")]
    InvalidAccount(#[from] InvalidAccountId),
}

/// Named ledger environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
    Betanet,
    Local,
    Ci,
}

impl Network {
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name {
            "production" | "mainnet" => Ok(Network::Mainnet),
            "development" | "testnet" => Ok(Network::Testnet),
            "betanet" => Ok(Network::Betanet),
            "local" => Ok(Network::Local),
            "test" | "ci" => Ok(Network::Ci),
            other => Err(ConfigError::UnknownNetwork(other.to_string())),
        }
    }

    #[must_use]
    pub fn network_id(self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Betanet => "betanet",
            Network::Local => "local",
            Network::Ci => "shared-test",
        }
    }

    #[must_use]
    pub fn node_url(self) -> &'static str {
        match self {
            Network::Mainnet => "https://rpc.mainnet.near.org",
            Network::Testnet => "https://rpc.testnet.near.org",
            Network::Betanet => "https://rpc.betanet.near.org",
            Network::Local => "http://localhost:3030",
            Network::Ci => "https://rpc.ci-testnet.near.org",
        }
    }

    #[must_use]
    pub fn wallet_url(self) -> Option<&'static str> {
        match self {
            Network::Mainnet => Some("https://wallet.near.org"),
            Network::Testnet => Some("https://wallet.testnet.near.org"),
            Network::Betanet => Some("https://wallet.betanet.near.org"),
            Network::Local => Some("http://localhost:4000/wallet"),
            Network::Ci => None,
        }
    }

    #[must_use]
    pub fn explorer_url(self) -> Option<&'static str> {
        match self {
            Network::Mainnet => Some("https://explorer.mainnet.near.org"),
            Network::Testnet => Some("https://explorer.testnet.near.org"),
            Network::Betanet | Network::Local | Network::Ci => None,
        }
    }
}

/// The two contracts one session talks to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawContracts")]
pub struct ContractAccounts {
    pub resource: AccountId,
    pub token: AccountId,
}

#[derive(Debug, Deserialize)]
struct RawContracts {
    resource: String,
    token: String,
}

impl TryFrom<RawContracts> for ContractAccounts {
    type Error = InvalidAccountId;

    fn try_from(raw: RawContracts) -> Result<Self, Self::Error> {
        Ok(Self {
            resource: AccountId::new(raw.resource)?,
            token: AccountId::new(raw.token)?,
        })
    }
}

impl Default for ContractAccounts {
    fn default() -> Self {
        Self {
            resource: AccountId::new(DEFAULT_RESOURCE_CONTRACT)
                .expect("default resource contract id is valid"),
            token: AccountId::new(DEFAULT_TOKEN_CONTRACT)
                .expect("default token contract id is valid"),
        }
    }
}

/// Fully resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub network: Network,
    pub contracts: ContractAccounts,
    /// Overrides the network preset's node URL when set.
    pub node_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            contracts: ContractAccounts::default(),
            node_url: None,
        }
    }
}

impl AppConfig {
    /// The RPC endpoint view calls go to.
    #[must_use]
    pub fn node_url(&self) -> &str {
        self.node_url
            .as_deref()
            .unwrap_or_else(|| self.network.node_url())
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(raw)?;
        Ok(config)
    }

    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), network = config.network.network_id(), "loaded config file");
        Ok(config)
    }

    /// Defaults overlaid with `SPOKE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Applies `SPOKE_NETWORK`, `SPOKE_NODE_URL`, `SPOKE_RESOURCE_CONTRACT`
    /// and `SPOKE_TOKEN_CONTRACT` on top of the current values.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(name) = env_nonempty("SPOKE_NETWORK") {
            self.network = Network::parse(&name)?;
        }
        if let Some(url) = env_nonempty("SPOKE_NODE_URL") {
            self.node_url = Some(url);
        }
        if let Some(account) = env_nonempty("SPOKE_RESOURCE_CONTRACT") {
            self.contracts.resource = AccountId::new(account)?;
        }
        if let Some(account) = env_nonempty("SPOKE_TOKEN_CONTRACT") {
            self.contracts.token = AccountId::new(account)?;
        }
        Ok(())
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_parse_accepts_aliases() {
        assert_eq!(Network::parse("production").unwrap(), Network::Mainnet);
        assert_eq!(Network::parse("development").unwrap(), Network::Testnet);
        assert_eq!(Network::parse("ci").unwrap(), Network::Ci);
    }

    #[test]
    fn network_parse_rejects_unknown() {
        assert!(matches!(
            Network::parse("devnet"),
            Err(ConfigError::UnknownNetwork(_))
        ));
    }

    #[test]
    fn defaults_point_at_testnet() {
        let config = AppConfig::default();
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.node_url(), "https://rpc.testnet.near.org");
        assert_eq!(config.contracts.resource.as_str(), "sub.bike_share.testnet");
        assert_eq!(config.contracts.token.as_str(), "my_ft.testnet");
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            network = "local"

            [contracts]
            resource = "bikes.test.near"
            token = "ft.test.near"
            "#,
        )
        .unwrap();
        assert_eq!(config.network, Network::Local);
        assert_eq!(config.node_url(), "http://localhost:3030");
        assert_eq!(config.contracts.resource.as_str(), "bikes.test.near");
    }

    #[test]
    fn node_url_override_beats_preset() {
        let config = AppConfig::from_toml_str(
            r#"
            network = "testnet"
            node_url = "http://127.0.0.1:3030"
            "#,
        )
        .unwrap();
        assert_eq!(config.node_url(), "http://127.0.0.1:3030");
    }

    #[test]
    fn toml_rejects_invalid_contract_account() {
        let result = AppConfig::from_toml_str(
            r#"
            [contracts]
            resource = "Not Valid"
            token = "ft.test.near"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn protocol_constants_match_the_ledger() {
        assert_eq!(FUNCTION_CALL_GAS.get(), 300_000_000_000_000);
        assert_eq!(STORAGE_DEPOSIT.get(), 1_250_000_000_000_000_000_000);
        assert_eq!(ONE_YOCTO.get(), 1);
    }
}
