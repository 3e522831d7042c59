/// Application constants

pub const API_VERSION: &str = "v1";

// Agent defaults
pub const DEFAULT_AGENT_NAME: &str = "starknet-agent";
pub const DEFAULT_AGENT_DESCRIPTION: &str = "Agent that can inspect Starknet ETH balances";

// Starknet
pub const DEFAULT_STARKNET_CHAIN_ID: &str = "SN_MAIN";
pub const BALANCE_OF_ENTRYPOINT: &str = "balanceOf";
pub const BALANCE_OF_ABI_NAMES: [&str; 2] = ["balanceOf", "balance_of"];

// Token
pub const ETH_DECIMALS: usize = 18;
pub const ETH_SYMBOL: &str = "ETH";

// Entrypoint keys
pub const ENTRYPOINT_ECHO: &str = "echo";
pub const ENTRYPOINT_STARKNET_BALANCE: &str = "starknet-balance";
