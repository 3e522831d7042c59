use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{parse_input, Entrypoint};
use crate::{
    constants::{ENTRYPOINT_STARKNET_BALANCE, ETH_DECIMALS, ETH_SYMBOL},
    error::{AppError, Result},
    services::{
        balance_reader::{fetch_eth_balance, BalanceResult},
        onchain::StarknetContext,
    },
    utils::{clean_address, is_hex_address},
};

#[derive(Debug, Default, Deserialize)]
pub struct StarknetBalanceInput {
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressSource {
    Input,
    Env,
}

#[derive(Debug, Serialize)]
pub struct StarknetBalanceOutput {
    pub resolved_address: String,
    pub address_source: AddressSource,
    pub balance: BalanceResult,
    pub summary: String,
}

pub struct StarknetBalanceEntrypoint {
    starknet: Arc<StarknetContext>,
}

impl StarknetBalanceEntrypoint {
    pub fn new(starknet: Arc<StarknetContext>) -> Self {
        Self { starknet }
    }
}

fn check_requested_address(requested: Option<&str>) -> Result<()> {
    match requested {
        Some(address) if !is_hex_address(address) => Err(AppError::Validation(
            "Address must be 0x-prefixed hex".to_string(),
        )),
        _ => Ok(()),
    }
}

// Picks the requested address, or the configured account when none was given.
fn resolve_address(
    requested: Option<&str>,
    default_account: Option<&str>,
) -> Result<(String, AddressSource)> {
    check_requested_address(requested)?;

    let source = if requested.is_some() {
        AddressSource::Input
    } else {
        AddressSource::Env
    };

    clean_address(requested)
        .or_else(|| clean_address(default_account))
        .map(|address| (address, source))
        .ok_or_else(|| {
            AppError::Validation(
                "Provide an address in the request or set STARKNET_ACCOUNT_ADDRESS".to_string(),
            )
        })
}

fn summarize(balance: &BalanceResult) -> String {
    format!(
        "Address {} holds {} {} ({} decimals).",
        balance.address, balance.formatted, ETH_SYMBOL, ETH_DECIMALS
    )
}

#[async_trait]
impl Entrypoint for StarknetBalanceEntrypoint {
    fn key(&self) -> &'static str {
        ENTRYPOINT_STARKNET_BALANCE
    }

    fn description(&self) -> &'static str {
        "Read an ETH balance from Starknet"
    }

    async fn invoke(&self, input: Value) -> Result<Value> {
        let input: StarknetBalanceInput = parse_input(input)?;
        check_requested_address(input.address.as_deref())?;
        let config = self.starknet.config()?;

        let (resolved_address, address_source) =
            resolve_address(input.address.as_deref(), config.account_address.as_deref())?;

        let balance = fetch_eth_balance(self.starknet.as_ref(), &resolved_address).await?;
        let summary = summarize(&balance);
        tracing::info!("{}", summary);

        serde_json::to_value(StarknetBalanceOutput {
            resolved_address,
            address_source,
            balance,
            summary,
        })
        .map_err(|e| AppError::Internal(e.to_string()))
    }
}
