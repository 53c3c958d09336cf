use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GenError, Result};

/// Normalized error body returned to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: String,
    pub text_provider: String,
    pub image_provider: String,
    pub schema_misses: u64,
}

/// Rejects an absent or whitespace-only field. Present values are returned untrimmed.
pub(crate) fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(GenError::MissingField(field)),
    }
}
