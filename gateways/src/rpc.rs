//! JSON-RPC view-call client.
//!
//! All read traffic goes through here: one `query`/`call_function` request
//! per contract view method, args base64-encoded, the result decoded from the
//! returned byte array back into JSON.

use std::sync::atomic::{AtomicU64, Ordering};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::{Value, json};

use spoke_types::AccountId;

use crate::retry::{RetryConfig, RetryOutcome, send_with_retry};
use crate::{GatewayError, http_client};

/// Client for one RPC node.
#[derive(Debug)]
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: String,
    retry: RetryConfig,
    next_id: AtomicU64,
}

impl RpcClient {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: http_client().clone(),
            endpoint: endpoint.into(),
            retry: RetryConfig::default(),
            next_id: AtomicU64::new(1),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Invoke a read-only contract method and decode its JSON result.
    ///
    /// A `null` contract response decodes to `Value::Null`; callers that
    /// distinguish "absent" from "present" (storage balances, holders) match
    /// on that.
    pub async fn view_call(
        &self,
        contract: &AccountId,
        method: &str,
        args: &Value,
    ) -> Result<Value, GatewayError> {
        let args_base64 = BASE64.encode(
            serde_json::to_vec(args)
                .map_err(|e| GatewayError::Malformed(format!("unencodable args: {e}")))?,
        );
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "query",
            "params": {
                "request_type": "call_function",
                "finality": "optimistic",
                "account_id": contract,
                "method_name": method,
                "args_base64": args_base64,
            },
        });

        tracing::debug!(contract = %contract, method, "rpc view call");

        let outcome = send_with_retry(|| self.http.post(&self.endpoint).json(&body), &self.retry);
        let response = match outcome.await {
            RetryOutcome::Success(response) => response,
            RetryOutcome::HttpError(response) => {
                return Err(GatewayError::Transport(format!(
                    "rpc node returned HTTP {}",
                    response.status()
                )));
            }
            RetryOutcome::ConnectionError { attempts, source } => {
                return Err(GatewayError::Transport(format!(
                    "connection failed after {attempts} attempts: {source}"
                )));
            }
        };

        let envelope: RpcEnvelope = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(format!("undecodable rpc envelope: {e}")))?;

        if let Some(error) = envelope.error {
            return Err(error.into_gateway_error());
        }

        let result = envelope.result.ok_or_else(|| {
            GatewayError::Malformed("rpc response carried neither result nor error".to_string())
        })?;

        for log in &result.logs {
            tracing::debug!(contract = %contract, method, log, "contract log");
        }

        serde_json::from_slice(&result.result)
            .map_err(|e| GatewayError::Malformed(format!("undecodable view result: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<CallFunctionResult>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct CallFunctionResult {
    result: Vec<u8>,
    #[serde(default)]
    logs: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    cause: Option<RpcErrorCause>,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorCause {
    #[serde(default)]
    name: Option<String>,
}

impl RpcErrorObject {
    fn into_gateway_error(self) -> GatewayError {
        let name = self
            .cause
            .and_then(|cause| cause.name)
            .or(self.name)
            .unwrap_or_else(|| "UNKNOWN".to_string());
        let message = match self.data {
            Some(Value::String(data)) => data,
            _ => self.message.unwrap_or_default(),
        };
        if name == "CONTRACT_EXECUTION_ERROR" {
            GatewayError::ContractPanic(message)
        } else {
            GatewayError::Rpc { name, message }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn contract() -> AccountId {
        AccountId::new("sub.bike_share.testnet").unwrap()
    }

    /// A `call_function` envelope whose result bytes encode `value`.
    fn view_result_body(value: &Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "result": serde_json::to_vec(value).unwrap(),
                "logs": [],
                "block_height": 1,
                "block_hash": "11111111111111111111111111111111",
            },
        })
    }

    async fn mock_node(body: Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn decodes_numeric_view_result() {
        let server = mock_node(view_result_body(&json!(5))).await;
        let client = RpcClient::new(server.uri());

        let value = client
            .view_call(&contract(), "num_of_bikes", &json!({}))
            .await
            .unwrap();
        assert_eq!(value, json!(5));
    }

    #[tokio::test]
    async fn null_view_result_decodes_to_null() {
        let server = mock_node(view_result_body(&Value::Null)).await;
        let client = RpcClient::new(server.uri());

        let value = client
            .view_call(&contract(), "storage_balance_of", &json!({"account_id": "a.b"}))
            .await
            .unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn sends_query_with_base64_args() {
        let args = json!({"index": 2});
        let args_base64 = BASE64.encode(serde_json::to_vec(&args).unwrap());
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(json!({
                "method": "query",
                "params": {
                    "request_type": "call_function",
                    "account_id": "sub.bike_share.testnet",
                    "method_name": "is_available",
                    "args_base64": args_base64,
                },
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(view_result_body(&json!(true))))
            .expect(1)
            .mount(&server)
            .await;

        let client = RpcClient::new(server.uri());
        let value = client
            .view_call(&contract(), "is_available", &args)
            .await
            .unwrap();
        assert_eq!(value, json!(true));
    }

    #[tokio::test]
    async fn rpc_error_object_surfaces_as_rpc_error() {
        let server = mock_node(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {
                "name": "HANDLER_ERROR",
                "cause": {"name": "UNKNOWN_ACCOUNT", "info": {}},
                "code": -32000,
                "message": "Server error",
            },
        }))
        .await;
        let client = RpcClient::new(server.uri());

        let err = client
            .view_call(&contract(), "num_of_bikes", &json!({}))
            .await
            .unwrap_err();
        match err {
            GatewayError::Rpc { name, .. } => assert_eq!(name, "UNKNOWN_ACCOUNT"),
            other => panic!("expected Rpc error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn contract_execution_error_surfaces_as_panic() {
        let server = mock_node(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {
                "name": "HANDLER_ERROR",
                "cause": {"name": "CONTRACT_EXECUTION_ERROR"},
                "code": -32000,
                "message": "Server error",
                "data": "Smart contract panicked: index out of bounds",
            },
        }))
        .await;
        let client = RpcClient::new(server.uri());

        let err = client
            .view_call(&contract(), "who_is_using", &json!({"index": 9}))
            .await
            .unwrap_err();
        match err {
            GatewayError::ContractPanic(message) => {
                assert!(message.contains("panicked"), "{message}");
            }
            other => panic!("expected ContractPanic, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn undecodable_result_bytes_are_malformed() {
        // 0xFF is not valid JSON.
        let server = mock_node(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {"result": [255], "logs": []},
        }))
        .await;
        let client = RpcClient::new(server.uri());

        let err = client
            .view_call(&contract(), "num_of_bikes", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Malformed(_)));
    }

    #[tokio::test]
    async fn http_failure_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = RpcClient::new(server.uri()).with_retry(RetryConfig::none());
        let err = client
            .view_call(&contract(), "num_of_bikes", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }
}
