use serde::{Deserialize, Serialize};

use super::common::required;
use crate::error::Result;

/// Returned when the provider answered but the expected text field was absent.
pub const NO_RESPONSE_FALLBACK: &str = "No response received.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateTextRequest {
    #[serde(default)]
    pub input: Option<String>,
}

impl GenerateTextRequest {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: Some(input.into()),
        }
    }

    /// The prompt to forward, rejecting absent or blank input.
    pub fn prompt(&self) -> Result<&str> {
        required(self.input.as_deref(), "input")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateTextResult {
    pub response: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenError;

    #[test]
    fn test_prompt_validation() {
        assert_eq!(GenerateTextRequest::new("rust").prompt().unwrap(), "rust");
        assert!(matches!(
            GenerateTextRequest::default().prompt(),
            Err(GenError::MissingField("input"))
        ));
        assert!(GenerateTextRequest::new("   \n").prompt().is_err());
    }

    #[test]
    fn test_prompt_is_not_trimmed() {
        let request: GenerateTextRequest =
            serde_json::from_str(r#"{"input": "  spaced  "}"#).unwrap();
        assert_eq!(request.prompt().unwrap(), "  spaced  ");
    }
}
