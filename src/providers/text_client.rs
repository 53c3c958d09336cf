use crate::{
    config::{GeminiConfig, OpenAiConfig},
    error::UpstreamError,
    providers::{read_failure, TextProvider},
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

#[derive(Clone)]
pub struct GeminiTextProvider {
    http: Client,
    config: GeminiConfig,
}

impl GeminiTextProvider {
    pub const NAME: &'static str = "Gemini";

    pub fn new(http: Client, config: GeminiConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// One user content part holding the raw prompt.
    pub fn build_payload(prompt: &str) -> Value {
        json!({
            "contents": [
                {
                    "parts": [{ "text": prompt }]
                }
            ]
        })
    }

    pub fn extract_text(body: &Value) -> Option<String> {
        non_empty(&body["candidates"][0]["content"]["parts"][0]["text"])
    }
}

#[async_trait]
impl TextProvider for GeminiTextProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn complete(&self, prompt: &str) -> Result<Option<String>, UpstreamError> {
        log::info!("Invoking Gemini model: {}", self.config.model);

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_deref().unwrap_or_default())])
            .json(&Self::build_payload(prompt))
            .send()
            .await
            .map_err(|e| UpstreamError::transport(Self::NAME, e))?;

        if !response.status().is_success() {
            return Err(read_failure(Self::NAME, response).await);
        }

        let body = read_json(Self::NAME, response).await?;
        Ok(Self::extract_text(&body))
    }
}

#[derive(Clone)]
pub struct OpenAiTextProvider {
    http: Client,
    config: OpenAiConfig,
}

impl OpenAiTextProvider {
    pub const NAME: &'static str = "OpenAI";

    pub fn new(http: Client, config: OpenAiConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    pub fn build_payload(model: &str, prompt: &str) -> Value {
        json!({
            "model": model,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        })
    }

    pub fn extract_text(body: &Value) -> Option<String> {
        non_empty(&body["choices"][0]["message"]["content"])
    }
}

#[async_trait]
impl TextProvider for OpenAiTextProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn complete(&self, prompt: &str) -> Result<Option<String>, UpstreamError> {
        log::info!("Invoking OpenAI model: {}", self.config.model);

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(self.config.api_key.as_deref().unwrap_or_default())
            .json(&Self::build_payload(&self.config.model, prompt))
            .send()
            .await
            .map_err(|e| UpstreamError::transport(Self::NAME, e))?;

        if !response.status().is_success() {
            return Err(read_failure(Self::NAME, response).await);
        }

        let body = read_json(Self::NAME, response).await?;
        Ok(Self::extract_text(&body))
    }
}

/// A success body that is not JSON is treated like a body missing the text field.
async fn read_json(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<Value, UpstreamError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| UpstreamError::transport(provider, e))?;
    Ok(serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        log::debug!("{} returned a non-JSON success body: {}", provider, e);
        Value::Null
    }))
}

fn non_empty(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|text| !text.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::GenError, models::ErrorBody};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gemini(server: &MockServer) -> GeminiTextProvider {
        GeminiTextProvider::new(
            Client::new(),
            GeminiConfig::new()
                .with_credentials("gm-key")
                .with_base_url(server.uri()),
        )
    }

    fn openai(server: &MockServer) -> OpenAiTextProvider {
        OpenAiTextProvider::new(
            Client::new(),
            OpenAiConfig::new()
                .with_credentials("sk-test")
                .with_base_url(server.uri()),
        )
    }

    #[tokio::test]
    async fn test_gemini_returns_nested_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-pro:generateContent"))
            .and(query_param("key", "gm-key"))
            .and(body_json(json!({"contents": [{"parts": [{"text": "Write about tides"}]}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {
                        "parts": [{"text": "## Tides\n\nThe moon pulls *gently*."}],
                        "role": "model"
                    },
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = gemini(&server).complete("Write about tides").await.unwrap();
        assert_eq!(text.as_deref(), Some("## Tides\n\nThe moon pulls *gently*."));
    }

    #[tokio::test]
    async fn test_gemini_schema_miss_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"finishReason": "SAFETY"}]
            })))
            .mount(&server)
            .await;

        assert_eq!(gemini(&server).complete("anything").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_a_schema_miss() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        assert_eq!(gemini(&server).complete("anything").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_gemini_error_status_carries_payload() {
        let server = MockServer::start().await;
        let payload = json!({
            "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
        });
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(payload.clone()))
            .mount(&server)
            .await;

        match gemini(&server).complete("anything").await {
            Err(UpstreamError::Status {
                provider,
                status,
                body,
            }) => {
                assert_eq!(provider, "Gemini");
                assert_eq!(status, 400);
                assert_eq!(body, payload);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_transport_error() {
        let provider = GeminiTextProvider::new(
            Client::new(),
            GeminiConfig::new().with_base_url("http://127.0.0.1:9"),
        );
        let err = provider.complete("anything").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Transport { provider: "Gemini", .. }));
    }

    #[tokio::test]
    async fn test_unreachable_gemini_keeps_key_out_of_errors() {
        let provider = GeminiTextProvider::new(
            Client::new(),
            GeminiConfig::new()
                .with_credentials("secret-key")
                .with_base_url("http://127.0.0.1:9"),
        );
        let err = provider.complete("anything").await.unwrap_err();
        assert!(!err.to_string().contains("secret-key"));
        assert!(!format!("{:?}", err).contains("secret-key"));

        let err = GenError::from(err);
        let detail = err.log_detail().unwrap();
        assert!(!detail.contains("secret-key"));

        let body = serde_json::to_string(&ErrorBody {
            error: err.to_string(),
            details: err.details().cloned(),
        })
        .unwrap();
        assert_eq!(body, r#"{"error":"Failed to reach Gemini"}"#);
    }

    #[tokio::test]
    async fn test_openai_chat_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_json(json!({
                "model": "gpt-3.5-turbo",
                "messages": [{"role": "user", "content": "Hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-123",
                "object": "chat.completion",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "Hello! How can I help you today?"},
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = openai(&server).complete("Hello").await.unwrap();
        assert_eq!(text.as_deref(), Some("Hello! How can I help you today?"));
    }

    #[test]
    fn test_empty_text_counts_as_missing() {
        let body = json!({"candidates": [{"content": {"parts": [{"text": ""}]}}]});
        assert_eq!(GeminiTextProvider::extract_text(&body), None);
        let body = json!({"choices": [{"message": {"content": null}}]});
        assert_eq!(OpenAiTextProvider::extract_text(&body), None);
    }
}
