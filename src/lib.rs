//! Quillforge forwards article and illustration prompts to a configured text
//! generation provider (Gemini or OpenAI) and image generation provider
//! (Stability or Hugging Face), normalizes their answers and serves the
//! prebuilt frontend.

pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod providers;
#[cfg(feature = "server")]
pub mod server;

pub use config::{
    Config, GeminiConfig, HuggingFaceConfig, ImageProviderKind, OpenAiConfig, StabilityConfig,
    TextProviderKind,
};
pub use error::{GenError, Result, UpstreamError};
pub use models::*;
pub use providers::{
    GeminiTextProvider, GenerationClient, HuggingFaceImageProvider, ImageProvider,
    OpenAiTextProvider, StabilityImageProvider, TextProvider,
};
