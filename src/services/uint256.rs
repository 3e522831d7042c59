use ethers::types::U256;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::utils::truncate_chars;

/// Two 128-bit limbs of a 256-bit integer, least significant first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uint256Like {
    pub low: String,
    pub high: String,
}

impl Uint256Like {
    pub fn from_u256(value: U256) -> Self {
        let (low, high) = split(value);
        Self {
            low: format!("{low:#x}"),
            high: format!("{high:#x}"),
        }
    }

    pub fn to_u256(&self) -> Result<U256> {
        let low = parse_limb(&self.low)?;
        let high = parse_limb(&self.high)?;
        Ok(reconstruct(low, high))
    }
}

/// `low + high * 2^128`
pub fn reconstruct(low: u128, high: u128) -> U256 {
    (U256::from(high) << 128) + U256::from(low)
}

pub fn split(value: U256) -> (u128, u128) {
    (value.low_u128(), (value >> 128).low_u128())
}

/// Accepts `0x`-prefixed hex or plain decimal; anything wider than 128 bits is rejected.
pub fn parse_limb(text: &str) -> Result<u128> {
    let trimmed = text.trim();
    let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex) => u128::from_str_radix(hex, 16),
        None => trimmed.parse::<u128>(),
    };
    parsed.map_err(|e| AppError::ResponseShape(format!("invalid uint256 limb '{trimmed}': {e}")))
}

/// Mirrors loose truthiness: null, false, zero and "" count as no response.
pub fn is_empty_response(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Pulls a uint256 out of the shapes a `balanceOf` call can come back in.
///
/// Checked in order: `[low, high, ..]`, `{ "balance": <shape> }`, `{ "low", "high" }`.
pub fn extract_uint256(value: &Value) -> Result<Uint256Like> {
    if is_empty_response(value) {
        return Err(AppError::ResponseShape("balanceOf response is empty".to_string()));
    }

    if let Value::Array(items) = value {
        if items.len() >= 2 {
            return Ok(Uint256Like {
                low: limb_text(&items[0])?,
                high: limb_text(&items[1])?,
            });
        }
        return Err(AppError::ResponseShape(format!(
            "balanceOf response array must contain at least two elements, received {}",
            items.len()
        )));
    }

    if let Value::Object(fields) = value {
        if let Some(balance) = fields.get("balance") {
            return extract_uint256(balance);
        }
        if let (Some(low), Some(high)) = (fields.get("low"), fields.get("high")) {
            return Ok(Uint256Like {
                low: limb_text(low)?,
                high: limb_text(high)?,
            });
        }
    }

    Err(AppError::ResponseShape(format!(
        "Unsupported balanceOf response type: {}",
        truncate_chars(&value.to_string(), 200)
    )))
}

fn limb_text(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => number_limb_text(n),
        other => Err(AppError::ResponseShape(format!(
            "uint256 limb must be a string or number, received {}",
            truncate_chars(&other.to_string(), 200)
        ))),
    }
}

// Integers past u64 arrive as f64; they are accepted only when integral and in range.
fn number_limb_text(n: &serde_json::Number) -> Result<String> {
    if let Some(value) = n.as_u64() {
        return Ok(value.to_string());
    }
    match n.as_f64() {
        Some(value) if value >= 0.0 && value.fract() == 0.0 && value < 2f64.powi(128) => {
            Ok((value as u128).to_string())
        }
        _ => Err(AppError::ResponseShape(format!(
            "uint256 limb must be a non-negative integer below 2^128, received {n}"
        ))),
    }
}
