use serde::Deserialize;
use std::env;

use crate::constants::{
    DEFAULT_AGENT_DESCRIPTION, DEFAULT_AGENT_NAME, DEFAULT_STARKNET_CHAIN_ID,
};
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,

    // Agent metadata
    pub agent_name: String,
    pub agent_version: String,
    pub agent_description: String,

    // Payments (pass-through, never enforced here)
    pub payments: Option<PaymentsConfig>,

    // CORS
    pub cors_allowed_origins: String,
}

#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq)]
pub struct PaymentsConfig {
    pub facilitator_url: Option<String>,
    pub pay_to: Option<String>,
    pub network: Option<String>,
    pub default_price: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,

            agent_name: env::var("AGENT_NAME").unwrap_or_else(|_| DEFAULT_AGENT_NAME.to_string()),
            agent_version: env::var("AGENT_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            agent_description: env::var("AGENT_DESCRIPTION")
                .unwrap_or_else(|_| DEFAULT_AGENT_DESCRIPTION.to_string()),

            payments: PaymentsConfig::from_lookup(|key| env::var(key).ok()),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.agent_name.trim().is_empty() {
            anyhow::bail!("AGENT_NAME is empty");
        }

        if let Some(payments) = &self.payments {
            if payments.pay_to.is_none() {
                tracing::warn!("PAYMENTS_DEFAULT_PRICE set without PAYMENTS_RECEIVABLE_ADDRESS");
            }
            if payments.facilitator_url.is_none() {
                tracing::warn!("PAYMENTS_DEFAULT_PRICE set without PAYMENTS_FACILITATOR_URL");
            }
        }

        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    pub fn payments_enabled(&self) -> bool {
        self.payments.is_some()
    }
}

impl PaymentsConfig {
    /// Payments are enabled only when a default price is configured.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let default_price = non_empty("PAYMENTS_DEFAULT_PRICE")?;
        Some(Self {
            facilitator_url: non_empty("PAYMENTS_FACILITATOR_URL"),
            pay_to: non_empty("PAYMENTS_RECEIVABLE_ADDRESS"),
            network: non_empty("PAYMENTS_NETWORK"),
            default_price,
        })
    }
}

/// Starknet settings used by the balance path. Read fresh on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct StarknetConfig {
    pub rpc_url: String,
    pub eth_contract_address: String,
    pub account_address: Option<String>,
    pub private_key: Option<String>,
    pub chain_id: String,
}

/// Validated signer pair for account features.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountCredentials {
    pub address: String,
    pub private_key: String,
}

impl StarknetConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| {
            optional(key).ok_or_else(|| AppError::Configuration(format!("{key} must be set")))
        };

        Ok(StarknetConfig {
            rpc_url: required("STARKNET_RPC_URL")?,
            eth_contract_address: required("STARKNET_ETH_CONTRACT_ADDRESS")?,
            account_address: optional("STARKNET_ACCOUNT_ADDRESS"),
            private_key: optional("STARKNET_PRIVATE_KEY"),
            chain_id: optional("STARKNET_CHAIN_ID")
                .unwrap_or_else(|| DEFAULT_STARKNET_CHAIN_ID.to_string()),
        })
    }

    pub fn account_credentials(&self) -> Result<AccountCredentials> {
        match (&self.account_address, &self.private_key) {
            (Some(address), Some(private_key)) => Ok(AccountCredentials {
                address: address.clone(),
                private_key: private_key.clone(),
            }),
            _ => Err(AppError::Configuration(
                "STARKNET_ACCOUNT_ADDRESS and STARKNET_PRIVATE_KEY must be set to use Account features"
                    .to_string(),
            )),
        }
    }
}

/// Where the balance path reads its settings from.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    Env,
    Fixed(StarknetConfig),
}

impl ConfigSource {
    pub fn read(&self) -> Result<StarknetConfig> {
        match self {
            ConfigSource::Env => StarknetConfig::from_env(),
            ConfigSource::Fixed(config) => Ok(config.clone()),
        }
    }
}
