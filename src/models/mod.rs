// src/models/mod.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::PaymentsConfig;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EntrypointDescriptor {
    pub key: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

/// Served at `/.well-known/agent.json`.
#[derive(Debug, Serialize)]
pub struct AgentManifest {
    pub name: String,
    pub version: String,
    pub description: String,
    pub entrypoints: Vec<EntrypointDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payments: Option<PaymentsConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InvokeRequest {
    #[serde(default)]
    pub input: Value,
}

#[derive(Debug, Serialize)]
pub struct InvokeResponse {
    pub status: String,
    pub output: Value,
}

impl InvokeResponse {
    pub fn succeeded(output: Value) -> Self {
        Self {
            status: "succeeded".to_string(),
            output,
        }
    }
}
