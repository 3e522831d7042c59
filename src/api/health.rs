use axum::{extract::State, Json};
use serde::Serialize;
use starknet_accounts::Account;
use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub starknet: String,
    pub account: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_address: Option<String>,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // Provider construction needs a complete Starknet config
    let starknet_status = match state.starknet.provider() {
        Ok(_) => "configured".to_string(),
        Err(err) => {
            tracing::debug!("Starknet not configured: {}", err);
            "unconfigured".to_string()
        }
    };

    let (account_status, account_address) = match state.starknet.account() {
        Ok(account) => ("ready".to_string(), Some(format!("{:#x}", account.address()))),
        Err(_) => ("unavailable".to_string(), None),
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        starknet: starknet_status,
        account: account_status,
        account_address,
    })
}
