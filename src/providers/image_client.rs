use crate::{
    config::{HuggingFaceConfig, StabilityConfig},
    error::UpstreamError,
    models::IMAGE_SPEC,
    providers::{read_failure, ImageProvider},
};
use async_trait::async_trait;
use reqwest::{header::ACCEPT, multipart::Form, Client};

#[derive(Clone)]
pub struct StabilityImageProvider {
    http: Client,
    config: StabilityConfig,
}

impl StabilityImageProvider {
    pub const NAME: &'static str = "Stability";

    pub fn new(http: Client, config: StabilityConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v2beta/stable-image/generate/core",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ImageProvider for StabilityImageProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn render(&self, prompt: &str) -> Result<Vec<u8>, UpstreamError> {
        request_image(
            &self.http,
            Self::NAME,
            &self.endpoint(),
            self.config.api_key.as_deref(),
            prompt,
        )
        .await
    }
}

#[derive(Clone)]
pub struct HuggingFaceImageProvider {
    http: Client,
    config: HuggingFaceConfig,
}

impl HuggingFaceImageProvider {
    pub const NAME: &'static str = "Hugging Face";

    pub fn new(http: Client, config: HuggingFaceConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl ImageProvider for HuggingFaceImageProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn render(&self, prompt: &str) -> Result<Vec<u8>, UpstreamError> {
        request_image(
            &self.http,
            Self::NAME,
            &self.endpoint(),
            self.config.api_key.as_deref(),
            prompt,
        )
        .await
    }
}

pub fn build_form(prompt: &str) -> Form {
    Form::new()
        .text("prompt", prompt.to_string())
        .text("width", IMAGE_SPEC.width.to_string())
        .text("height", IMAGE_SPEC.height.to_string())
        .text("output_format", IMAGE_SPEC.output_format)
}

/// Posts the multipart form and returns the raw image bytes.
async fn request_image(
    http: &Client,
    provider: &'static str,
    url: &str,
    api_key: Option<&str>,
    prompt: &str,
) -> Result<Vec<u8>, UpstreamError> {
    log::info!("Generating image with {} at {}", provider, url);

    let response = http
        .post(url)
        .bearer_auth(api_key.unwrap_or_default())
        .header(ACCEPT, "image/*")
        .multipart(build_form(prompt))
        .send()
        .await
        .map_err(|e| UpstreamError::transport(provider, e))?;

    if !response.status().is_success() {
        return Err(read_failure(provider, response).await);
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| UpstreamError::transport(provider, e))?;
    log::debug!("{} returned {} image bytes", provider, bytes.len());
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const JPEG_BYTES: &[u8] = &[
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0xFF, 0xD9,
    ];

    fn huggingface(server: &MockServer) -> HuggingFaceImageProvider {
        HuggingFaceImageProvider::new(
            Client::new(),
            HuggingFaceConfig::new()
                .with_credentials("hf-key")
                .with_base_url(server.uri()),
        )
    }

    #[tokio::test]
    async fn test_huggingface_returns_raw_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/stabilityai/stable-diffusion-2"))
            .and(header("Authorization", "Bearer hf-key"))
            .and(header("Accept", "image/*"))
            .and(body_string_contains("name=\"prompt\""))
            .and(body_string_contains("a red fox in snow"))
            .and(body_string_contains("name=\"output_format\""))
            .and(body_string_contains("jpeg"))
            .and(body_string_contains("1024"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(JPEG_BYTES)
                    .insert_header("Content-Type", "image/jpeg"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let bytes = huggingface(&server).render("a red fox in snow").await.unwrap();
        assert_eq!(bytes, JPEG_BYTES);
    }

    #[tokio::test]
    async fn test_stability_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2beta/stable-image/generate/core"))
            .and(header("Authorization", "Bearer st-key"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(JPEG_BYTES))
            .expect(1)
            .mount(&server)
            .await;

        let provider = StabilityImageProvider::new(
            Client::new(),
            StabilityConfig::new()
                .with_credentials("st-key")
                .with_base_url(server.uri()),
        );
        assert_eq!(provider.render("mountains").await.unwrap(), JPEG_BYTES);
    }

    #[tokio::test]
    async fn test_unauthorized_error_is_parsed_as_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "Invalid credentials in Authorization header"
            })))
            .mount(&server)
            .await;

        match huggingface(&server).render("anything").await {
            Err(UpstreamError::Status { status, body, .. }) => {
                assert_eq!(status, 401);
                assert_eq!(body["error"], "Invalid credentials in Authorization header");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_plain_text_error_body_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Model is loading"))
            .mount(&server)
            .await;

        let err = huggingface(&server).render("anything").await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        match err {
            UpstreamError::Status { body, .. } => assert_eq!(body, json!("Model is loading")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
