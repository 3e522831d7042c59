use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    constants::ETH_DECIMALS,
    error::{AppError, Result},
    services::{
        uint256::{extract_uint256, is_empty_response},
        units::format_units,
    },
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResult {
    pub address: String,
    pub contract_address: String,
    pub wei: String,
    pub formatted: String,
    pub decimals: u8,
}

/// The two ways of asking the token contract for a balance.
#[async_trait]
pub trait BalanceBackend: Send + Sync {
    fn contract_address(&self) -> Result<String>;

    /// ABI-bound call. `Ok(None)` means the call produced nothing usable.
    async fn contract_balance_of(&self, owner: &str) -> Result<Option<Value>>;

    /// Raw `starknet_call` by entrypoint name; returns the response envelope.
    async fn raw_balance_of(&self, owner: &str) -> Result<Value>;
}

#[derive(Debug)]
pub enum PrimaryOutcome {
    Response(Value),
    Empty,
    Failed(AppError),
}

/// Runs the ABI-bound call. Errors are logged and handed back, never raised.
pub async fn primary_attempt<B>(backend: &B, address: &str) -> PrimaryOutcome
where
    B: BalanceBackend + ?Sized,
{
    match backend.contract_balance_of(address).await {
        Ok(Some(value)) if !is_empty_response(&value) => PrimaryOutcome::Response(value),
        Ok(_) => {
            tracing::warn!(
                "balanceOf returned empty response via contract helper for {}",
                address
            );
            PrimaryOutcome::Empty
        }
        Err(err) => {
            tracing::warn!(
                "balanceOf call failed via contract helper for {}: {}",
                address,
                err
            );
            PrimaryOutcome::Failed(err)
        }
    }
}

/// Runs the raw call and unwraps the JSON-RPC envelope.
pub async fn fallback_attempt<B>(backend: &B, address: &str) -> Result<Value>
where
    B: BalanceBackend + ?Sized,
{
    tracing::info!("Falling back to raw balanceOf call for {}", address);
    let raw = backend.raw_balance_of(address).await?;
    Ok(unwrap_envelope(raw))
}

/// `result` when the envelope carries one, otherwise the response itself.
pub fn unwrap_envelope(raw: Value) -> Value {
    match raw {
        Value::Object(mut fields) if fields.get("result").is_some_and(|r| !r.is_null()) => {
            fields.remove("result").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Reads the ETH balance of `address`, trying the contract call first and the raw
/// call once if that yields nothing.
pub async fn fetch_eth_balance<B>(backend: &B, address: &str) -> Result<BalanceResult>
where
    B: BalanceBackend + ?Sized,
{
    let contract_address = backend.contract_address()?;

    let response = match primary_attempt(backend, address).await {
        PrimaryOutcome::Response(value) => value,
        PrimaryOutcome::Empty => fallback_attempt(backend, address).await?,
        PrimaryOutcome::Failed(primary) => fallback_attempt(backend, address)
            .await
            .map_err(|fallback| AppError::BalanceUnavailable {
                primary: primary.to_string(),
                fallback: fallback.to_string(),
            })?,
    };

    let limbs = extract_uint256(&response)?;
    let wei = limbs.to_u256()?;

    Ok(BalanceResult {
        address: address.to_string(),
        contract_address,
        wei: wei.to_string(),
        formatted: format_units(wei, ETH_DECIMALS),
        decimals: ETH_DECIMALS as u8,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const CONTRACT: &str = "0x49d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7";

    enum Primary {
        Value(Value),
        Nothing,
        Fail(&'static str),
    }

    enum Fallback {
        Value(Value),
        Fail(&'static str),
    }

    struct ScriptedBackend {
        primary: Primary,
        fallback: Fallback,
        primary_calls: AtomicUsize,
        fallback_calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new(primary: Primary, fallback: Fallback) -> Self {
            Self {
                primary,
                fallback,
                primary_calls: AtomicUsize::new(0),
                fallback_calls: AtomicUsize::new(0),
            }
        }

        fn fallback_calls(&self) -> usize {
            self.fallback_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BalanceBackend for ScriptedBackend {
        fn contract_address(&self) -> Result<String> {
            Ok(CONTRACT.to_string())
        }

        async fn contract_balance_of(&self, _owner: &str) -> Result<Option<Value>> {
            self.primary_calls.fetch_add(1, Ordering::SeqCst);
            match &self.primary {
                Primary::Value(value) => Ok(Some(value.clone())),
                Primary::Nothing => Ok(None),
                Primary::Fail(msg) => Err(AppError::AbiDiscovery(msg.to_string())),
            }
        }

        async fn raw_balance_of(&self, _owner: &str) -> Result<Value> {
            self.fallback_calls.fetch_add(1, Ordering::SeqCst);
            match &self.fallback {
                Fallback::Value(value) => Ok(value.clone()),
                Fallback::Fail(msg) => Err(AppError::BlockchainRPC(msg.to_string())),
            }
        }
    }

    fn fifty_eth_envelope() -> Value {
        json!({ "jsonrpc": "2.0", "id": 1, "result": ["0x2b5e3af16b1880000", "0x0"] })
    }

    #[tokio::test]
    async fn primary_result_is_used_without_fallback() {
        let backend = ScriptedBackend::new(
            Primary::Value(json!({ "low": "1000000000000000000", "high": "0" })),
            Fallback::Fail("should not be called"),
        );
        let result = fetch_eth_balance(&backend, "0x1").await.unwrap();

        assert_eq!(result.address, "0x1");
        assert_eq!(result.contract_address, CONTRACT);
        assert_eq!(result.wei, "1000000000000000000");
        assert_eq!(result.formatted, "1");
        assert_eq!(result.decimals, 18);
        assert_eq!(backend.fallback_calls(), 0);
    }

    #[tokio::test]
    async fn primary_error_triggers_single_fallback() {
        let backend = ScriptedBackend::new(
            Primary::Fail("ETH contract ABI not found"),
            Fallback::Value(fifty_eth_envelope()),
        );
        let result = fetch_eth_balance(&backend, "0xabc").await.unwrap();

        assert_eq!(result.wei, "50000000000000000000");
        assert_eq!(result.formatted, "50");
        assert_eq!(backend.primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.fallback_calls(), 1);
    }

    #[tokio::test]
    async fn falsy_primary_still_triggers_fallback() {
        for primary in [Primary::Nothing, Primary::Value(Value::Null), Primary::Value(json!(0))] {
            let backend = ScriptedBackend::new(primary, Fallback::Value(fifty_eth_envelope()));
            let result = fetch_eth_balance(&backend, "0xabc").await.unwrap();
            assert_eq!(result.formatted, "50");
            assert_eq!(backend.fallback_calls(), 1);
        }
    }

    #[tokio::test]
    async fn both_paths_failing_reports_both_contexts() {
        let backend = ScriptedBackend::new(
            Primary::Fail("ETH contract ABI not found"),
            Fallback::Fail("connection refused"),
        );
        let err = fetch_eth_balance(&backend, "0xabc").await.unwrap_err();

        match err {
            AppError::BalanceUnavailable { primary, fallback } => {
                assert!(primary.contains("ETH contract ABI not found"));
                assert!(fallback.contains("connection refused"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(backend.fallback_calls(), 1);
    }

    #[tokio::test]
    async fn empty_primary_then_failed_fallback_propagates_fallback_error() {
        let backend = ScriptedBackend::new(Primary::Nothing, Fallback::Fail("timeout"));
        let err = fetch_eth_balance(&backend, "0xabc").await.unwrap_err();
        assert!(matches!(err, AppError::BlockchainRPC(ref msg) if msg == "timeout"));
    }

    #[tokio::test]
    async fn malformed_primary_response_is_terminal() {
        let backend = ScriptedBackend::new(
            Primary::Value(json!(["0x1"])),
            Fallback::Value(fifty_eth_envelope()),
        );
        let err = fetch_eth_balance(&backend, "0xabc").await.unwrap_err();
        assert!(matches!(err, AppError::ResponseShape(_)));
        assert_eq!(backend.fallback_calls(), 0);
    }

    #[tokio::test]
    async fn bare_fallback_response_is_used_as_is() {
        let backend = ScriptedBackend::new(
            Primary::Nothing,
            Fallback::Value(json!({ "balance": { "low": "0x1", "high": "0x0" } })),
        );
        let result = fetch_eth_balance(&backend, "0xabc").await.unwrap();
        assert_eq!(result.wei, "1");
        assert_eq!(result.formatted, "0.000000000000000001");
    }

    #[test]
    fn high_limb_contributes_above_128_bits() {
        let limbs = extract_uint256(&json!(["0x0", "0x1"])).unwrap();
        assert_eq!(
            limbs.to_u256().unwrap().to_string(),
            "340282366920938463463374607431768211456"
        );
    }

    #[test]
    fn balance_result_serializes_camel_case() {
        let result = BalanceResult {
            address: "0x1".into(),
            contract_address: CONTRACT.into(),
            wei: "0".into(),
            formatted: "0".into(),
            decimals: 18,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["contractAddress"], CONTRACT);
        assert_eq!(value["decimals"], 18);
    }

    #[test]
    fn envelope_result_is_unwrapped() {
        assert_eq!(unwrap_envelope(fifty_eth_envelope()), json!(["0x2b5e3af16b1880000", "0x0"]));
        assert_eq!(unwrap_envelope(json!(["0x1", "0x0"])), json!(["0x1", "0x0"]));
    }
}
