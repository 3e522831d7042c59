// Balance lookup services
pub mod balance_reader;
pub mod contract_abi;
pub mod onchain;
pub mod starknet_client;
pub mod uint256;
pub mod units;

// Re-export for convenience
pub use balance_reader::{fetch_eth_balance, BalanceBackend, BalanceResult};
