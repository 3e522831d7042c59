// src/api/mod.rs

pub mod entrypoints;
pub mod health;

use std::sync::Arc;

use crate::agent::{build_registry, EntrypointRegistry};
use crate::config::Config;
use crate::error::Result;
use crate::services::onchain::StarknetContext;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub starknet: Arc<StarknetContext>,
    pub registry: Arc<EntrypointRegistry>,
}

impl AppState {
    pub fn new(config: Config, starknet: StarknetContext) -> Result<Self> {
        let starknet = Arc::new(starknet);
        let registry = build_registry(starknet.clone())?;
        Ok(Self {
            config,
            starknet,
            registry: Arc::new(registry),
        })
    }
}
