//! Fungible-token contract gateway.

use std::sync::Arc;

use serde_json::{Value, json};

use spoke_config::{FUNCTION_CALL_GAS, ONE_YOCTO, STORAGE_DEPOSIT};
use spoke_types::{AccountId, CallReceipt, FunctionCallRequest, StorageBalance, TokenAmount, Yocto};

use crate::rpc::RpcClient;
use crate::wallet::WalletConnection;
use crate::GatewayError;

/// Read/write operations against the fungible-token contract.
pub trait TokenGateway {
    async fn balance_of(&self, account: &AccountId) -> Result<TokenAmount, GatewayError>;
    /// `None` means the account has never paid the storage deposit.
    async fn storage_balance_of(
        &self,
        account: &AccountId,
    ) -> Result<Option<StorageBalance>, GatewayError>;

    /// Pay the one-time storage deposit registering the caller.
    async fn register_storage(&self) -> Result<CallReceipt, GatewayError>;
    /// Drop the caller's registration. With `force`, any remaining token
    /// balance is burned by the contract.
    async fn unregister_storage(&self, force: bool) -> Result<CallReceipt, GatewayError>;
    async fn transfer(
        &self,
        receiver: &AccountId,
        amount: TokenAmount,
    ) -> Result<CallReceipt, GatewayError>;
    /// Transfer that also invokes `receiver`'s transfer handler with
    /// `payload`. The reserve action rides on this: the payload is the
    /// resource index, so the resource contract reserves atomically with the
    /// fee transfer.
    async fn transfer_and_invoke(
        &self,
        receiver: &AccountId,
        amount: TokenAmount,
        payload: String,
    ) -> Result<CallReceipt, GatewayError>;
}

/// [`TokenGateway`] backed by the deployed token contract.
#[derive(Debug)]
pub struct ContractTokenGateway<W> {
    rpc: Arc<RpcClient>,
    contract: AccountId,
    wallet: Arc<W>,
}

impl<W: WalletConnection> ContractTokenGateway<W> {
    pub fn new(rpc: Arc<RpcClient>, contract: AccountId, wallet: Arc<W>) -> Self {
        Self {
            rpc,
            contract,
            wallet,
        }
    }

    #[must_use]
    pub fn contract(&self) -> &AccountId {
        &self.contract
    }

    async fn view<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        args: Value,
    ) -> Result<T, GatewayError> {
        let value = self.rpc.view_call(&self.contract, method, &args).await?;
        serde_json::from_value(value)
            .map_err(|e| GatewayError::Malformed(format!("{method}: {e}")))
    }

    async fn change(
        &self,
        method: &str,
        args: Value,
        deposit: Yocto,
    ) -> Result<CallReceipt, GatewayError> {
        let request = FunctionCallRequest::new(self.contract.clone(), method, args)
            .gas(FUNCTION_CALL_GAS)
            .deposit(deposit);
        self.wallet.function_call(request).await
    }
}

impl<W: WalletConnection> TokenGateway for ContractTokenGateway<W> {
    async fn balance_of(&self, account: &AccountId) -> Result<TokenAmount, GatewayError> {
        self.view("ft_balance_of", json!({ "account_id": account }))
            .await
    }

    async fn storage_balance_of(
        &self,
        account: &AccountId,
    ) -> Result<Option<StorageBalance>, GatewayError> {
        self.view("storage_balance_of", json!({ "account_id": account }))
            .await
    }

    async fn register_storage(&self) -> Result<CallReceipt, GatewayError> {
        // Empty args register the calling account itself.
        self.change("storage_deposit", json!({}), STORAGE_DEPOSIT)
            .await
    }

    async fn unregister_storage(&self, force: bool) -> Result<CallReceipt, GatewayError> {
        self.change("storage_unregister", json!({ "force": force }), ONE_YOCTO)
            .await
    }

    async fn transfer(
        &self,
        receiver: &AccountId,
        amount: TokenAmount,
    ) -> Result<CallReceipt, GatewayError> {
        self.change(
            "ft_transfer",
            json!({ "receiver_id": receiver, "amount": amount }),
            ONE_YOCTO,
        )
        .await
    }

    async fn transfer_and_invoke(
        &self,
        receiver: &AccountId,
        amount: TokenAmount,
        payload: String,
    ) -> Result<CallReceipt, GatewayError> {
        self.change(
            "ft_transfer_call",
            json!({ "receiver_id": receiver, "amount": amount, "msg": payload }),
            ONE_YOCTO,
        )
        .await
    }
}
