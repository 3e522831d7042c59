use axum::{
    extract::{Path, State},
    Json,
};

use super::AppState;
use crate::{
    error::{AppError, Result},
    models::{AgentManifest, ApiResponse, EntrypointDescriptor, InvokeRequest, InvokeResponse},
};

fn entrypoint_price(state: &AppState) -> Option<&str> {
    state
        .config
        .payments
        .as_ref()
        .map(|payments| payments.default_price.as_str())
}

/// GET /.well-known/agent.json
pub async fn get_manifest(State(state): State<AppState>) -> Json<AgentManifest> {
    Json(AgentManifest {
        name: state.config.agent_name.clone(),
        version: state.config.agent_version.clone(),
        description: state.config.agent_description.clone(),
        entrypoints: state.registry.descriptors(entrypoint_price(&state)),
        payments: state.config.payments.clone(),
    })
}

/// GET /entrypoints
pub async fn list_entrypoints(
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<EntrypointDescriptor>>> {
    Json(ApiResponse::success(
        state.registry.descriptors(entrypoint_price(&state)),
    ))
}

/// POST /entrypoints/{key}/invoke
pub async fn invoke_entrypoint(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<InvokeRequest>,
) -> Result<Json<ApiResponse<InvokeResponse>>> {
    let entrypoint = state
        .registry
        .get(&key)
        .ok_or_else(|| AppError::NotFound(format!("Unknown entrypoint: {key}")))?;

    let output = entrypoint.invoke(req.input).await.map_err(|err| {
        tracing::warn!("Entrypoint {} failed: {}", key, err);
        err
    })?;

    Ok(Json(ApiResponse::success(InvokeResponse::succeeded(output))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{starknet_config, state};
    use crate::config::PaymentsConfig;
    use serde_json::json;

    fn payments() -> PaymentsConfig {
        PaymentsConfig {
            facilitator_url: Some("https://facilitator.example".into()),
            pay_to: Some("0xpay".into()),
            network: Some("base-sepolia".into()),
            default_price: "1000".into(),
        }
    }

    #[tokio::test]
    async fn manifest_lists_entrypoints_without_payments() {
        let Json(manifest) = get_manifest(State(state(starknet_config(None), None))).await;
        assert_eq!(manifest.name, "starknet-agent");
        assert_eq!(manifest.entrypoints.len(), 2);
        assert!(manifest.payments.is_none());
        assert!(manifest.entrypoints.iter().all(|e| e.price.is_none()));
    }

    #[tokio::test]
    async fn manifest_prices_entrypoints_when_payments_enabled() {
        let Json(manifest) =
            get_manifest(State(state(starknet_config(None), Some(payments())))).await;
        assert_eq!(manifest.payments, Some(payments()));
        assert!(manifest
            .entrypoints
            .iter()
            .all(|e| e.price.as_deref() == Some("1000")));
    }

    #[tokio::test]
    async fn list_returns_descriptors() {
        let Json(response) = list_entrypoints(State(state(starknet_config(None), None))).await;
        assert!(response.success);
        assert_eq!(response.data[0].key, "echo");
        assert_eq!(response.data[1].key, "starknet-balance");
    }

    #[tokio::test]
    async fn invoke_echo_wraps_output() {
        let Json(response) = invoke_entrypoint(
            State(state(starknet_config(None), None)),
            Path("echo".to_string()),
            Json(InvokeRequest {
                input: json!({ "text": "hello" }),
            }),
        )
        .await
        .unwrap();
        assert!(response.success);
        assert_eq!(response.data.status, "succeeded");
        assert_eq!(response.data.output, json!({ "text": "hello" }));
    }

    #[tokio::test]
    async fn invoke_unknown_key_is_not_found() {
        let err = invoke_entrypoint(
            State(state(starknet_config(None), None)),
            Path("missing".to_string()),
            Json(InvokeRequest::default()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn invoke_balance_without_address_is_validation_error() {
        let err = invoke_entrypoint(
            State(state(starknet_config(None), None)),
            Path("starknet-balance".to_string()),
            Json(InvokeRequest::default()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
