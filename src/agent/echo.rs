use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{parse_input, Entrypoint};
use crate::{
    constants::ENTRYPOINT_ECHO,
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct EchoInput {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct EchoOutput {
    pub text: String,
}

pub struct EchoEntrypoint;

#[async_trait]
impl Entrypoint for EchoEntrypoint {
    fn key(&self) -> &'static str {
        ENTRYPOINT_ECHO
    }

    fn description(&self) -> &'static str {
        "Echo input text"
    }

    async fn invoke(&self, input: Value) -> Result<Value> {
        let input: EchoInput = parse_input(input)?;
        if input.text.is_empty() {
            return Err(AppError::Validation("Please provide some text.".to_string()));
        }
        serde_json::to_value(EchoOutput { text: input.text })
            .map_err(|e| AppError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn echo_returns_text_unchanged() {
        let output = EchoEntrypoint.invoke(json!({ "text": "gm starknet" })).await.unwrap();
        assert_eq!(output, json!({ "text": "gm starknet" }));
    }

    #[tokio::test]
    async fn echo_rejects_empty_text() {
        let err = EchoEntrypoint.invoke(json!({ "text": "" })).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref msg) if msg == "Please provide some text."));
    }

    #[tokio::test]
    async fn echo_rejects_missing_text() {
        let err = EchoEntrypoint.invoke(json!({})).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
