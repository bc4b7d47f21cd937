//! Resource-contract gateway.

use std::sync::Arc;

use serde_json::{Value, json};

use spoke_config::FUNCTION_CALL_GAS;
use spoke_types::{AccountId, CallReceipt, FunctionCallRequest, TokenAmount};

use crate::rpc::RpcClient;
use crate::wallet::WalletConnection;
use crate::GatewayError;

/// Read/write operations against the resource-ledger contract.
pub trait ResourceGateway {
    async fn resource_count(&self) -> Result<u32, GatewayError>;
    async fn is_available(&self, index: u32) -> Result<bool, GatewayError>;
    async fn current_holder(&self, index: u32) -> Result<Option<AccountId>, GatewayError>;
    async fn current_inspector(&self, index: u32) -> Result<Option<AccountId>, GatewayError>;
    /// The per-use token fee. Fetched once per session and treated as
    /// authoritative configuration thereafter.
    async fn fee_amount(&self) -> Result<TokenAmount, GatewayError>;
    /// The token reward paid out per completed inspection.
    async fn inspection_reward(&self) -> Result<TokenAmount, GatewayError>;

    async fn inspect(&self, index: u32) -> Result<CallReceipt, GatewayError>;
    async fn return_resource(&self, index: u32) -> Result<CallReceipt, GatewayError>;
    /// Transfer the per-use fee to a freshly registered identity so it can
    /// immediately afford one reservation.
    async fn seed_new_user(&self, account: &AccountId) -> Result<CallReceipt, GatewayError>;
}

/// [`ResourceGateway`] backed by the deployed contract: views over JSON-RPC,
/// change calls signed by the wallet.
#[derive(Debug)]
pub struct ContractResourceGateway<W> {
    rpc: Arc<RpcClient>,
    contract: AccountId,
    wallet: Arc<W>,
}

impl<W: WalletConnection> ContractResourceGateway<W> {
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

    async fn change(&self, method: &str, args: Value) -> Result<CallReceipt, GatewayError> {
        let request = FunctionCallRequest::new(self.contract.clone(), method, args)
            .gas(FUNCTION_CALL_GAS);
        self.wallet.function_call(request).await
    }
}

impl<W: WalletConnection> ResourceGateway for ContractResourceGateway<W> {
    async fn resource_count(&self) -> Result<u32, GatewayError> {
        self.view("num_of_bikes", json!({})).await
    }

    async fn is_available(&self, index: u32) -> Result<bool, GatewayError> {
        self.view("is_available", json!({ "index": index })).await
    }

    async fn current_holder(&self, index: u32) -> Result<Option<AccountId>, GatewayError> {
        self.view("who_is_using", json!({ "index": index })).await
    }

    async fn current_inspector(&self, index: u32) -> Result<Option<AccountId>, GatewayError> {
        self.view("who_is_inspecting", json!({ "index": index })).await
    }

    async fn fee_amount(&self) -> Result<TokenAmount, GatewayError> {
        self.view("amount_to_use_bike", json!({})).await
    }

    async fn inspection_reward(&self) -> Result<TokenAmount, GatewayError> {
        self.view("amount_reward_for_inspections", json!({})).await
    }

    async fn inspect(&self, index: u32) -> Result<CallReceipt, GatewayError> {
        self.change("inspect_bike", json!({ "index": index })).await
    }

    async fn return_resource(&self, index: u32) -> Result<CallReceipt, GatewayError> {
        self.change("return_bike", json!({ "index": index })).await
    }

    async fn seed_new_user(&self, account: &AccountId) -> Result<CallReceipt, GatewayError> {
        self.change("transfer_ft_to_new_user", json!({ "new_user_id": account }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingWallet;
    use serde_json::json;
    use spoke_types::Gas;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn view_result_body(value: &Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {"result": serde_json::to_vec(value).unwrap(), "logs": []},
        })
    }

    async fn gateway_against(
        server: &MockServer,
        wallet: Arc<RecordingWallet>,
    ) -> ContractResourceGateway<RecordingWallet> {
        ContractResourceGateway::new(
            Arc::new(RpcClient::new(server.uri())),
            AccountId::new("sub.bike_share.testnet").unwrap(),
            wallet,
        )
    }

    #[tokio::test]
    async fn holder_view_maps_null_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "params": {"method_name": "who_is_using"},
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(view_result_body(&Value::Null)))
            .mount(&server)
            .await;

        let wallet = Arc::new(RecordingWallet::signed_in("alice.testnet"));
        let gateway = gateway_against(&server, wallet).await;

        assert_eq!(gateway.current_holder(0).await.unwrap(), None);
    }

    #[tokio::test]
    async fn fee_amount_decodes_string_u128() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(view_result_body(&json!("30"))))
            .mount(&server)
            .await;

        let wallet = Arc::new(RecordingWallet::signed_in("alice.testnet"));
        let gateway = gateway_against(&server, wallet).await;

        assert_eq!(gateway.fee_amount().await.unwrap(), TokenAmount::new(30));
    }

    #[tokio::test]
    async fn inspect_routes_through_wallet_with_gas_budget() {
        let server = MockServer::start().await;
        let wallet = Arc::new(RecordingWallet::signed_in("alice.testnet"));
        let gateway = gateway_against(&server, Arc::clone(&wallet)).await;

        gateway.inspect(1).await.unwrap();

        let calls = wallet.recorded();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "inspect_bike");
        assert_eq!(calls[0].args, json!({"index": 1}));
        assert_eq!(calls[0].gas, Gas::tera(300));
        assert!(calls[0].deposit.is_zero());
    }

    #[tokio::test]
    async fn seed_new_user_targets_resource_contract() {
        let server = MockServer::start().await;
        let wallet = Arc::new(RecordingWallet::signed_in("alice.testnet"));
        let gateway = gateway_against(&server, Arc::clone(&wallet)).await;

        let new_user = AccountId::new("carol.testnet").unwrap();
        gateway.seed_new_user(&new_user).await.unwrap();

        let calls = wallet.recorded();
        assert_eq!(calls[0].receiver.as_str(), "sub.bike_share.testnet");
        assert_eq!(calls[0].method, "transfer_ft_to_new_user");
        assert_eq!(calls[0].args, json!({"new_user_id": "carol.testnet"}));
    }
}
