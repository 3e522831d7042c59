// Entrypoint runtime: named, schema-checked operations the HTTP layer can invoke.

pub mod echo;
pub mod starknet_balance;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    error::{AppError, Result},
    models::EntrypointDescriptor,
    services::onchain::StarknetContext,
};

pub use echo::EchoEntrypoint;
pub use starknet_balance::StarknetBalanceEntrypoint;

#[async_trait]
pub trait Entrypoint: Send + Sync {
    fn key(&self) -> &'static str;

    fn description(&self) -> &'static str;

    async fn invoke(&self, input: Value) -> Result<Value>;
}

#[derive(Clone, Default)]
pub struct EntrypointRegistry {
    entrypoints: Vec<Arc<dyn Entrypoint>>,
}

impl EntrypointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entrypoint: Arc<dyn Entrypoint>) -> Result<()> {
        if self.get(entrypoint.key()).is_some() {
            return Err(AppError::Internal(format!(
                "Entrypoint {} registered twice",
                entrypoint.key()
            )));
        }
        tracing::debug!("Registered entrypoint {}", entrypoint.key());
        self.entrypoints.push(entrypoint);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn Entrypoint>> {
        self.entrypoints.iter().find(|e| e.key() == key).cloned()
    }

    pub fn descriptors(&self, price: Option<&str>) -> Vec<EntrypointDescriptor> {
        self.entrypoints
            .iter()
            .map(|e| EntrypointDescriptor {
                key: e.key().to_string(),
                description: e.description().to_string(),
                price: price.map(str::to_string),
            })
            .collect()
    }
}

/// Registers every entrypoint this agent serves.
pub fn build_registry(starknet: Arc<StarknetContext>) -> Result<EntrypointRegistry> {
    let mut registry = EntrypointRegistry::new();
    registry.register(Arc::new(EchoEntrypoint))?;
    registry.register(Arc::new(StarknetBalanceEntrypoint::new(starknet)))?;
    Ok(registry)
}

/// Missing input is read as an empty object; shape errors become validation errors.
pub fn parse_input<T: DeserializeOwned>(input: Value) -> Result<T> {
    let input = match input {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(input).map_err(|e| AppError::Validation(format!("Invalid input: {e}")))
}
