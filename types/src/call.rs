//! Wallet-facing descriptions of change calls and their receipts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AccountId, Gas, Yocto};

/// One state-changing contract call, ready for the wallet to sign and submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCallRequest {
    pub receiver: AccountId,
    pub method: String,
    pub args: Value,
    pub gas: Gas,
    pub deposit: Yocto,
}

impl FunctionCallRequest {
    #[must_use]
    pub fn new(receiver: AccountId, method: impl Into<String>, args: Value) -> Self {
        Self {
            receiver,
            method: method.into(),
            args,
            gas: Gas::default(),
            deposit: Yocto::default(),
        }
    }

    #[must_use]
    pub fn gas(mut self, gas: Gas) -> Self {
        self.gas = gas;
        self
    }

    #[must_use]
    pub fn deposit(mut self, deposit: Yocto) -> Self {
        self.deposit = deposit;
        self
    }
}

/// What came back from a signed, submitted call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CallReceipt {
    pub transaction_hash: Option<String>,
    pub logs: Vec<String>,
}

impl CallReceipt {
    #[must_use]
    pub fn with_hash(hash: impl Into<String>) -> Self {
        Self {
            transaction_hash: Some(hash.into()),
            logs: Vec::new(),
        }
    }
}
