//! Agent runtime serving an echo entrypoint and a Starknet ETH balance lookup.

pub mod agent;
pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
