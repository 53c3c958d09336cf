pub mod image_client;
pub mod text_client;

use crate::{
    config::{Config, ImageProviderKind, TextProviderKind},
    error::{GenError, Result, UpstreamError},
    logger,
    models::{
        to_data_uri, ArticleStructure, BlogArticle, BlogParams, IMAGE_SPEC, NO_RESPONSE_FALLBACK,
    },
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

pub use image_client::{HuggingFaceImageProvider, StabilityImageProvider};
pub use text_client::{GeminiTextProvider, OpenAiTextProvider};

#[async_trait]
pub trait TextProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Sends the prompt as a single user message. `Ok(None)` means the provider
    /// answered but the completion text was not where it was expected.
    async fn complete(&self, prompt: &str) -> std::result::Result<Option<String>, UpstreamError>;
}

#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the raw bytes of a 1024x1024 jpeg.
    async fn render(&self, prompt: &str) -> std::result::Result<Vec<u8>, UpstreamError>;
}

/// Reads a non-2xx response into an error, keeping the payload as JSON when it parses.
pub(crate) async fn read_failure(
    provider: &'static str,
    response: reqwest::Response,
) -> UpstreamError {
    let status = response.status().as_u16();
    let body = match response.bytes().await {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) => {
            log::debug!("Failed to read {} error body: {}", provider, e);
            Value::Null
        }
    };
    UpstreamError::Status {
        provider,
        status,
        body,
    }
}

#[derive(Clone)]
pub struct GenerationClient {
    text_provider: Arc<dyn TextProvider>,
    image_provider: Arc<dyn ImageProvider>,
    schema_misses: Arc<AtomicU64>,
}

impl GenerationClient {
    pub fn new(
        text_provider: Arc<dyn TextProvider>,
        image_provider: Arc<dyn ImageProvider>,
    ) -> Self {
        Self {
            text_provider,
            image_provider,
            schema_misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Builds the providers selected by `config` around one shared HTTP client.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GenError::ConfigError(format!("HTTP client: {}", e)))?;

        let text_provider: Arc<dyn TextProvider> = match config.text_provider {
            TextProviderKind::Gemini => {
                Arc::new(GeminiTextProvider::new(http.clone(), config.gemini.clone()))
            }
            TextProviderKind::OpenAi => {
                Arc::new(OpenAiTextProvider::new(http.clone(), config.openai.clone()))
            }
        };

        let image_provider: Arc<dyn ImageProvider> = match config.image_provider {
            ImageProviderKind::Stability => Arc::new(StabilityImageProvider::new(
                http.clone(),
                config.stability.clone(),
            )),
            ImageProviderKind::HuggingFace => Arc::new(HuggingFaceImageProvider::new(
                http,
                config.huggingface.clone(),
            )),
        };

        Ok(Self::new(text_provider, image_provider))
    }

    pub fn text(&self) -> &dyn TextProvider {
        self.text_provider.as_ref()
    }

    pub fn image(&self) -> &dyn ImageProvider {
        self.image_provider.as_ref()
    }

    /// Number of successful text responses that lacked the expected field.
    pub fn schema_misses(&self) -> u64 {
        self.schema_misses.load(Ordering::Relaxed)
    }

    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        let provider = self.text_provider.name();
        let completion = {
            let _timer = logger::timer(&format!("{} text generation", provider));
            self.text_provider.complete(prompt).await
        };

        match completion {
            Ok(Some(text)) => Ok(text),
            Ok(None) => {
                let total = self.schema_misses.fetch_add(1, Ordering::Relaxed) + 1;
                log::warn!(
                    "{} response had no completion text, substituting fallback (schema misses: {})",
                    provider,
                    total
                );
                Ok(NO_RESPONSE_FALLBACK.to_string())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Generates an image and returns it inlined as a jpeg data URI.
    pub async fn generate_image(&self, prompt: &str) -> Result<String> {
        let provider = self.image_provider.name();
        let rendered = {
            let _timer = logger::timer(&format!("{} image generation", provider));
            self.image_provider.render(prompt).await
        };

        let bytes = rendered?;
        Ok(to_data_uri(IMAGE_SPEC.mime_type, &bytes))
    }

    /// Two sequential text generations: an outline as JSON, then the article body.
    pub async fn generate_blog(&self, params: &BlogParams) -> Result<BlogArticle> {
        let reply = self.generate_text(&params.structure_prompt()).await?;
        let structure = ArticleStructure::parse(&reply).map_err(|e| {
            log::debug!("Structure reply was: {}", reply);
            e
        })?;

        if structure.subheadings.len() != params.subheadings_count as usize {
            log::warn!(
                "Requested {} subheadings, structure has {}",
                params.subheadings_count,
                structure.subheadings.len()
            );
        }

        let content = self
            .generate_text(&params.article_prompt(&structure))
            .await?;

        Ok(BlogArticle {
            title: structure.title,
            content,
        })
    }
}
