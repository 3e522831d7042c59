use serde::Deserialize;
use serde_json::{Map, Value};
use starknet_core::types::{ContractClass, Felt};

use crate::error::{AppError, Result};

const UINT256_TYPES: [&str; 3] = ["core::integer::u256", "Uint256", "u256"];
const SCALAR_TYPES: [&str; 5] = [
    "felt",
    "core::felt252",
    "core::bool",
    "ContractAddress",
    "core::starknet::contract_address::ContractAddress",
];

/// ABI entries discovered from a deployed contract class.
#[derive(Debug, Clone)]
pub struct ContractAbi {
    entries: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AbiFunction {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub outputs: Vec<AbiParam>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AbiParam {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: String,
}

impl ContractAbi {
    pub fn from_class(class: &ContractClass) -> Result<Self> {
        let entries = match class {
            ContractClass::Sierra(sierra) => parse_sierra_abi(&sierra.abi)?,
            ContractClass::Legacy(legacy) => match &legacy.abi {
                Some(entries) => match serde_json::to_value(entries) {
                    Ok(Value::Array(items)) => items,
                    Ok(_) => Vec::new(),
                    Err(e) => {
                        return Err(AppError::AbiDiscovery(format!(
                            "Legacy ABI could not be read: {e}"
                        )))
                    }
                },
                None => Vec::new(),
            },
        };
        Self::from_entries(entries)
    }

    pub fn from_entries(entries: Vec<Value>) -> Result<Self> {
        if entries.is_empty() {
            return Err(AppError::AbiDiscovery("ETH contract ABI not found".to_string()));
        }
        Ok(Self { entries })
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// First function matching one of `names`, in preference order. Functions nested
    /// inside Cairo 1 `interface` entries are searched too.
    pub fn function(&self, names: &[&str]) -> Option<AbiFunction> {
        let functions: Vec<&Value> = self
            .entries
            .iter()
            .flat_map(|entry| match entry.get("type").and_then(Value::as_str) {
                Some("interface") => entry
                    .get("items")
                    .and_then(Value::as_array)
                    .map(|items| items.iter().collect::<Vec<_>>())
                    .unwrap_or_default(),
                _ => vec![entry],
            })
            .filter(|entry| entry.get("type").and_then(Value::as_str) == Some("function"))
            .collect();

        names.iter().find_map(|name| {
            functions
                .iter()
                .find(|entry| entry.get("name").and_then(Value::as_str) == Some(*name))
                .and_then(|entry| serde_json::from_value::<AbiFunction>((*entry).clone()).ok())
        })
    }
}

impl AbiFunction {
    /// Decodes raw call output felts using the declared output types.
    ///
    /// Named outputs (Cairo 0) become an object keyed by name, a single unnamed output
    /// (Cairo 1) is returned as-is, several unnamed outputs become an array.
    pub fn decode_outputs(&self, felts: &[Felt]) -> Result<Value> {
        let mut cursor = felts.iter();
        let mut decoded = Vec::with_capacity(self.outputs.len());
        for output in &self.outputs {
            decoded.push(decode_param(&output.ty, &mut cursor)?);
        }

        let all_named = !self.outputs.is_empty()
            && self
                .outputs
                .iter()
                .all(|o| o.name.as_deref().map(|n| !n.is_empty()).unwrap_or(false));

        if all_named {
            let mut object = Map::new();
            for (output, value) in self.outputs.iter().zip(decoded) {
                if let Some(name) = &output.name {
                    object.insert(name.clone(), value);
                }
            }
            return Ok(Value::Object(object));
        }

        if decoded.len() == 1 {
            return Ok(decoded.remove(0));
        }
        Ok(Value::Array(decoded))
    }
}

fn parse_sierra_abi(raw: &str) -> Result<Vec<Value>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str::<Vec<Value>>(trimmed)
        .map_err(|e| AppError::AbiDiscovery(format!("Sierra ABI is not valid JSON: {e}")))
}

fn decode_param<'a, I>(ty: &str, cursor: &mut I) -> Result<Value>
where
    I: Iterator<Item = &'a Felt>,
{
    let mut next = || {
        cursor.next().map(|felt| format!("{felt:#x}")).ok_or_else(|| {
            AppError::ResponseShape(format!(
                "contract returned fewer felts than the ABI declares for {ty}"
            ))
        })
    };

    if UINT256_TYPES.contains(&ty) {
        let low = next()?;
        let high = next()?;
        return Ok(serde_json::json!({ "low": low, "high": high }));
    }

    if SCALAR_TYPES.contains(&ty) || ty.starts_with("core::integer::") {
        return Ok(Value::String(next()?));
    }

    Err(AppError::ResponseShape(format!(
        "unsupported ABI output type {ty}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cairo1_abi() -> Vec<Value> {
        serde_json::from_str(
            r#"[
                {"type": "impl", "name": "ERC20Impl", "interface_name": "IERC20"},
                {"type": "interface", "name": "IERC20", "items": [
                    {"type": "function", "name": "balance_of",
                     "inputs": [{"name": "account", "type": "core::starknet::contract_address::ContractAddress"}],
                     "outputs": [{"type": "core::integer::u256"}],
                     "state_mutability": "view"},
                    {"type": "function", "name": "balanceOf",
                     "inputs": [{"name": "account", "type": "core::starknet::contract_address::ContractAddress"}],
                     "outputs": [{"type": "core::integer::u256"}],
                     "state_mutability": "view"}
                ]}
            ]"#,
        )
        .unwrap()
    }

    fn legacy_abi() -> Vec<Value> {
        vec![json!({
            "type": "function",
            "name": "balanceOf",
            "inputs": [{"name": "account", "type": "felt"}],
            "outputs": [{"name": "balance", "type": "Uint256"}],
            "stateMutability": "view"
        })]
    }

    #[test]
    fn empty_abi_is_reported_missing() {
        let err = ContractAbi::from_entries(Vec::new()).unwrap_err();
        assert!(matches!(err, AppError::AbiDiscovery(ref msg) if msg.contains("ABI not found")));
        assert!(parse_sierra_abi("  ").unwrap().is_empty());
        assert!(parse_sierra_abi("{not json").is_err());
    }

    #[test]
    fn function_lookup_prefers_first_name_and_searches_interfaces() {
        let abi = ContractAbi::from_entries(cairo1_abi()).unwrap();
        let function = abi.function(&["balanceOf", "balance_of"]).unwrap();
        assert_eq!(function.name, "balanceOf");
        assert_eq!(function.inputs.len(), 1);

        let snake = abi.function(&["balance_of"]).unwrap();
        assert_eq!(snake.name, "balance_of");
        assert!(abi.function(&["transfer"]).is_none());
    }

    #[test]
    fn cairo1_u256_output_decodes_to_limb_object() {
        let abi = ContractAbi::from_entries(cairo1_abi()).unwrap();
        let function = abi.function(&["balanceOf"]).unwrap();
        let value = function
            .decode_outputs(&[Felt::from(1_000u64), Felt::from(2u64)])
            .unwrap();
        assert_eq!(value, json!({ "low": "0x3e8", "high": "0x2" }));
    }

    #[test]
    fn legacy_named_output_nests_under_balance() {
        let abi = ContractAbi::from_entries(legacy_abi()).unwrap();
        let function = abi.function(&["balanceOf"]).unwrap();
        let value = function
            .decode_outputs(&[Felt::from(16u64), Felt::ZERO])
            .unwrap();
        assert_eq!(value, json!({ "balance": { "low": "0x10", "high": "0x0" } }));
    }

    #[test]
    fn short_output_is_a_shape_error() {
        let abi = ContractAbi::from_entries(legacy_abi()).unwrap();
        let function = abi.function(&["balanceOf"]).unwrap();
        let err = function.decode_outputs(&[Felt::from(16u64)]).unwrap_err();
        assert!(matches!(err, AppError::ResponseShape(_)));
    }

    #[test]
    fn unknown_output_type_is_rejected() {
        let function: AbiFunction = serde_json::from_value(json!({
            "name": "balanceOf",
            "outputs": [{"type": "my::Struct"}]
        }))
        .unwrap();
        assert!(function.decode_outputs(&[Felt::ONE]).is_err());
    }
}
