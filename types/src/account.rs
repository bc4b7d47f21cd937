//! Ledger account identifiers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of an account id on the ledger.
pub const MAX_ACCOUNT_ID_LEN: usize = 64;
/// Minimum length of an account id on the ledger.
pub const MIN_ACCOUNT_ID_LEN: usize = 2;

/// An opaque account handle, validated against the ledger's naming rules.
///
/// Account ids are 2..=64 characters of lowercase alphanumeric segments
/// joined by `.`, `_` or `-`. Separators may not lead, trail, or repeat.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidAccountId {
    #[error("account id must be {MIN_ACCOUNT_ID_LEN}..={MAX_ACCOUNT_ID_LEN} characters, got {0}")]
    Length(usize),
    #[error("account id contains invalid character {0:?}")]
    Character(char),
    #[error("account id separators may not lead, trail, or repeat")]
    Separator,
}

impl AccountId {
    pub fn new(value: impl Into<String>) -> Result<Self, InvalidAccountId> {
        let value = value.into();
        if value.len() < MIN_ACCOUNT_ID_LEN || value.len() > MAX_ACCOUNT_ID_LEN {
            return Err(InvalidAccountId::Length(value.len()));
        }

        let mut prev_separator = true; // leading separator is invalid
        for c in value.chars() {
            match c {
                'a'..='z' | '0'..='9' => prev_separator = false,
                '.' | '_' | '-' => {
                    if prev_separator {
                        return Err(InvalidAccountId::Separator);
                    }
                    prev_separator = true;
                }
                other => return Err(InvalidAccountId::Character(other)),
            }
        }
        if prev_separator {
            return Err(InvalidAccountId::Separator);
        }

        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for AccountId {
    type Error = InvalidAccountId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for AccountId {
    type Error = InvalidAccountId;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::str::FromStr for AccountId {
    type Err = InvalidAccountId;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl From<AccountId> for String {
    fn from(value: AccountId) -> Self {
        value.0
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
