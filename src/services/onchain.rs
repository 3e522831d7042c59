use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serde_json::Value;
use starknet_accounts::{ExecutionEncoding, SingleOwnerAccount};
use starknet_core::types::{BlockId, BlockTag, ContractClass, Felt, FunctionCall};
use starknet_core::utils::get_selector_from_name;
use starknet_providers::jsonrpc::{HttpTransport, JsonRpcClient};
use starknet_providers::Provider;
use starknet_signers::{LocalWallet, SigningKey};
use tokio::sync::OnceCell;
use url::Url;

use crate::{
    config::{ConfigSource, StarknetConfig},
    constants::{BALANCE_OF_ABI_NAMES, BALANCE_OF_ENTRYPOINT},
    error::{AppError, Result},
    services::{
        balance_reader::BalanceBackend, contract_abi::ContractAbi,
        starknet_client::StarknetClient,
    },
};

pub type StarknetAccount = SingleOwnerAccount<JsonRpcClient<HttpTransport>, LocalWallet>;

/// Typed and raw RPC clients bound to the same endpoint.
pub struct StarknetProvider {
    rpc: JsonRpcClient<HttpTransport>,
    raw: StarknetClient,
}

/// The ETH token contract bound to its discovered ABI.
pub struct EthContract {
    address_felt: Felt,
    abi: ContractAbi,
}

/// Per-application Starknet state. Settings are re-read on every call; the provider,
/// contract and account handles are built once and reused.
pub struct StarknetContext {
    source: ConfigSource,
    provider: OnceLock<Arc<StarknetProvider>>,
    eth_contract: OnceCell<Arc<EthContract>>,
    account: OnceLock<Arc<StarknetAccount>>,
}

impl StarknetProvider {
    pub fn from_config(config: &StarknetConfig) -> Result<Self> {
        let rpc_url = parse_rpc_url(&config.rpc_url)?;
        Ok(Self {
            rpc: JsonRpcClient::new(HttpTransport::new(rpc_url)),
            raw: StarknetClient::new(config.rpc_url.clone()),
        })
    }

    pub fn rpc_url(&self) -> &str {
        self.raw.rpc_url()
    }

    pub async fn call(&self, call: FunctionCall) -> Result<Vec<Felt>> {
        self.rpc
            .call(call, BlockId::Tag(BlockTag::Latest))
            .await
            .map_err(|e| AppError::BlockchainRPC(e.to_string()))
    }

    pub async fn get_class_at(&self, contract_address: Felt) -> Result<ContractClass> {
        self.rpc
            .get_class_at(BlockId::Tag(BlockTag::Latest), contract_address)
            .await
            .map_err(|e| AppError::BlockchainRPC(e.to_string()))
    }

    pub async fn call_contract_raw(
        &self,
        contract_address: &str,
        entrypoint: &str,
        calldata: Vec<String>,
    ) -> Result<Value> {
        self.raw
            .call_contract(contract_address, entrypoint, calldata)
            .await
    }
}

impl EthContract {
    pub async fn discover(provider: &StarknetProvider, address: &str) -> Result<Self> {
        let address_felt = parse_felt(address)?;
        let class = provider.get_class_at(address_felt).await?;
        let abi = ContractAbi::from_class(&class)?;
        tracing::debug!(
            "Discovered ETH contract ABI at {} ({} entries)",
            address,
            abi.entry_count()
        );
        Ok(Self { address_felt, abi })
    }

    /// ABI-bound `balanceOf(owner)`; the output is decoded with the declared types.
    pub async fn balance_of(&self, provider: &StarknetProvider, owner: &str) -> Result<Value> {
        let function = self.abi.function(&BALANCE_OF_ABI_NAMES).ok_or_else(|| {
            AppError::AbiDiscovery("balanceOf is not declared in the ETH contract ABI".to_string())
        })?;
        let selector = get_selector_from_name(&function.name)
            .map_err(|e| AppError::Internal(format!("Selector error: {}", e)))?;
        let call = FunctionCall {
            contract_address: self.address_felt,
            entry_point_selector: selector,
            calldata: vec![parse_felt(owner)?],
        };
        let felts = provider.call(call).await?;
        function.decode_outputs(&felts)
    }
}

impl StarknetContext {
    pub fn new(source: ConfigSource) -> Self {
        Self {
            source,
            provider: OnceLock::new(),
            eth_contract: OnceCell::new(),
            account: OnceLock::new(),
        }
    }

    pub fn config(&self) -> Result<StarknetConfig> {
        self.source.read()
    }

    /// Construction is pure, so a racing duplicate is simply dropped.
    pub fn provider(&self) -> Result<Arc<StarknetProvider>> {
        if let Some(provider) = self.provider.get() {
            return Ok(provider.clone());
        }
        let config = self.config()?;
        let built = Arc::new(StarknetProvider::from_config(&config)?);
        tracing::debug!("Starknet provider bound to {}", built.rpc_url());
        Ok(self.provider.get_or_init(|| built).clone())
    }

    /// At most one ABI discovery runs at a time; failures are not cached.
    pub async fn eth_contract(&self) -> Result<Arc<EthContract>> {
        self.eth_contract
            .get_or_try_init(|| async {
                let config = self.config()?;
                let provider = self.provider()?;
                let contract = EthContract::discover(&provider, &config.eth_contract_address).await?;
                Ok::<_, AppError>(Arc::new(contract))
            })
            .await
            .cloned()
    }

    /// Signs through the cached provider's client.
    pub fn account(&self) -> Result<Arc<StarknetAccount>> {
        if let Some(account) = self.account.get() {
            return Ok(account.clone());
        }
        let config = self.config()?;
        let credentials = config.account_credentials()?;
        let provider = self.provider()?;

        let private_key = parse_felt(&credentials.private_key)?;
        let signer = LocalWallet::from_signing_key(SigningKey::from_secret_scalar(private_key));

        let account_address = parse_felt(&credentials.address)?;
        let chain_id = parse_chain_id(&config.chain_id)?;

        let mut account = SingleOwnerAccount::new(
            provider.rpc.clone(),
            signer,
            account_address,
            chain_id,
            ExecutionEncoding::New,
        );
        // Some public RPC providers don't support "pre_confirmed" yet.
        account.set_block_id(BlockId::Tag(BlockTag::Latest));

        Ok(self.account.get_or_init(|| Arc::new(account)).clone())
    }
}

#[async_trait]
impl BalanceBackend for StarknetContext {
    fn contract_address(&self) -> Result<String> {
        Ok(self.config()?.eth_contract_address)
    }

    async fn contract_balance_of(&self, owner: &str) -> Result<Option<Value>> {
        let contract = self.eth_contract().await?;
        let provider = self.provider()?;
        contract.balance_of(&provider, owner).await.map(Some)
    }

    async fn raw_balance_of(&self, owner: &str) -> Result<Value> {
        let config = self.config()?;
        let provider = self.provider()?;
        provider
            .call_contract_raw(
                &config.eth_contract_address,
                BALANCE_OF_ENTRYPOINT,
                vec![owner.to_string()],
            )
            .await
    }
}

fn parse_rpc_url(rpc_url: &str) -> Result<Url> {
    Url::parse(rpc_url)
        .map_err(|e| AppError::Configuration(format!("Invalid STARKNET_RPC_URL: {}", e)))
}

pub fn parse_chain_id(chain_id: &str) -> Result<Felt> {
    if chain_id.starts_with("0x") {
        return parse_felt(chain_id);
    }
    let hex = hex::encode(chain_id.as_bytes());
    parse_felt(&format!("0x{hex}"))
}

pub fn parse_felt(value: &str) -> Result<Felt> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Empty field element".to_string()));
    }
    if trimmed.starts_with("0x") {
        return Felt::from_hex(trimmed)
            .map_err(|e| AppError::Validation(format!("Invalid felt hex: {}", e)));
    }
    Felt::from_dec_str(trimmed)
        .map_err(|e| AppError::Validation(format!("Invalid felt dec: {}", e)))
}
