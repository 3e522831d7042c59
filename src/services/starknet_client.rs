use crate::error::{AppError, Result};
use serde_json::Value;
use starknet_core::utils::get_selector_from_name;

fn rpc_request(method: &str, params: Value) -> Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": 1
    })
}

fn call_contract_params(contract_address: &str, entry_point_selector: &str, calldata: Vec<String>) -> Value {
    serde_json::json!({
        "contract_address": contract_address,
        "entry_point_selector": entry_point_selector,
        "calldata": calldata
    })
}

fn resolve_entry_point_selector(function: &str) -> Result<String> {
    if function.starts_with("0x") {
        return Ok(function.to_string());
    }
    let selector = get_selector_from_name(function)
        .map_err(|e| AppError::Internal(format!("Selector error: {}", e)))?;
    Ok(format!("{selector:#x}"))
}

fn rpc_error(envelope: &Value) -> Option<String> {
    let error = envelope.get("error")?;
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string());
    Some(match error.get("code").and_then(Value::as_i64) {
        Some(code) => format!("{message} (code {code})"),
        None => message,
    })
}

/// Raw Starknet JSON-RPC client. Calls go out by entrypoint name and calldata only,
/// no ABI involved.
pub struct StarknetClient {
    rpc_url: String,
    client: reqwest::Client,
}

impl StarknetClient {
    pub fn new(rpc_url: String) -> Self {
        Self {
            rpc_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Call contract view function. Returns the whole JSON-RPC envelope.
    pub async fn call_contract(
        &self,
        contract_address: &str,
        function: &str,
        calldata: Vec<String>,
    ) -> Result<Value> {
        let entry_point_selector = resolve_entry_point_selector(function)?;
        let request = rpc_request(
            "starknet_call",
            serde_json::json!([
                call_contract_params(contract_address, &entry_point_selector, calldata),
                "latest"
            ]),
        );

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::BlockchainRPC(e.to_string()))?;

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| AppError::BlockchainRPC(e.to_string()))?;

        if let Some(message) = rpc_error(&envelope) {
            return Err(AppError::BlockchainRPC(format!(
                "starknet_call {function} failed: {message}"
            )));
        }

        Ok(envelope)
    }
}
