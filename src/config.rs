use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_STATIC_DIR: &str = "front-end/dist";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextProviderKind {
    #[default]
    Gemini,
    OpenAi,
}

impl FromStr for TextProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(TextProviderKind::Gemini),
            "openai" | "chatgpt" => Ok(TextProviderKind::OpenAi),
            other => Err(format!("unknown text provider '{}'", other)),
        }
    }
}

impl fmt::Display for TextProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextProviderKind::Gemini => write!(f, "gemini"),
            TextProviderKind::OpenAi => write!(f, "openai"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageProviderKind {
    Stability,
    #[default]
    HuggingFace,
}

impl FromStr for ImageProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stability" | "stabilityai" => Ok(ImageProviderKind::Stability),
            "huggingface" | "hugging_face" | "hf" => Ok(ImageProviderKind::HuggingFace),
            other => Err(format!("unknown image provider '{}'", other)),
        }
    }
}

impl fmt::Display for ImageProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageProviderKind::Stability => write!(f, "stability"),
            ImageProviderKind::HuggingFace => write!(f, "huggingface"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct StabilityConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub static_dir: Option<PathBuf>,
    /// `None` allows any origin.
    pub cors_origin: Option<String>,
    pub text_provider: TextProviderKind,
    pub image_provider: ImageProviderKind,
    pub gemini: GeminiConfig,
    pub openai: OpenAiConfig,
    pub stability: StabilityConfig,
    pub huggingface: HuggingFaceConfig,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            model: "gemini-1.5-pro".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: &F) -> Self {
        let defaults = Self::default();
        GeminiConfig {
            api_key: lookup("GEMINI_API_KEY"),
            model: lookup("GEMINI_MODEL").unwrap_or(defaults.model),
            base_url: lookup("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
        }
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        OpenAiConfig {
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
            base_url: "https://api.openai.com".to_string(),
        }
    }
}

impl OpenAiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: &F) -> Self {
        let defaults = Self::default();
        OpenAiConfig {
            api_key: lookup("OPENAI_API_KEY"),
            model: lookup("OPENAI_MODEL").unwrap_or(defaults.model),
            base_url: lookup("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
        }
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for StabilityConfig {
    fn default() -> Self {
        StabilityConfig {
            api_key: None,
            base_url: "https://api.stability.ai".to_string(),
        }
    }
}

impl StabilityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: &F) -> Self {
        StabilityConfig {
            api_key: lookup("STABILITY_API_KEY"),
            base_url: lookup("STABILITY_BASE_URL").unwrap_or(Self::default().base_url),
        }
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        HuggingFaceConfig {
            api_key: None,
            model: "stabilityai/stable-diffusion-2".to_string(),
            base_url: "https://api-inference.huggingface.co".to_string(),
        }
    }
}

impl HuggingFaceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: &F) -> Self {
        let defaults = Self::default();
        HuggingFaceConfig {
            api_key: lookup("HUGGING_FACE_API_KEY")
                .or_else(|| lookup("Hugging_Face_Ai_Image_Generation")),
            model: lookup("HUGGING_FACE_MODEL").unwrap_or(defaults.model),
            base_url: lookup("HUGGING_FACE_BASE_URL").unwrap_or(defaults.base_url),
        }
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: None,
            port: None,
            static_dir: Some(PathBuf::from(DEFAULT_STATIC_DIR)),
            cors_origin: Some(DEFAULT_CORS_ORIGIN.to_string()),
            text_provider: TextProviderKind::default(),
            image_provider: ImageProviderKind::default(),
            gemini: GeminiConfig::default(),
            openai: OpenAiConfig::default(),
            stability: StabilityConfig::default(),
            huggingface: HuggingFaceConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = lookup("PORT").and_then(|port| match port.parse() {
            Ok(port) => Some(port),
            Err(_) => {
                log::warn!("Ignoring invalid PORT value '{}'", port);
                None
            }
        });

        let text_provider: TextProviderKind = lookup("TEXT_PROVIDER")
            .map(|value| {
                value.parse().unwrap_or_else(|e: String| {
                    log::warn!("{}, falling back to {}", e, TextProviderKind::default());
                    TextProviderKind::default()
                })
            })
            .unwrap_or_default();

        let image_provider: ImageProviderKind = lookup("IMAGE_PROVIDER")
            .map(|value| {
                value.parse().unwrap_or_else(|e: String| {
                    log::warn!("{}, falling back to {}", e, ImageProviderKind::default());
                    ImageProviderKind::default()
                })
            })
            .unwrap_or_default();

        let cors_origin = match lookup("CORS_ORIGIN") {
            Some(origin) if origin.trim() == "*" => None,
            Some(origin) => match parse_origin(&origin) {
                Some(origin) => Some(origin),
                None => {
                    log::warn!(
                        "Ignoring invalid CORS_ORIGIN value '{}', falling back to {}",
                        origin,
                        DEFAULT_CORS_ORIGIN
                    );
                    Some(DEFAULT_CORS_ORIGIN.to_string())
                }
            },
            None => Some(DEFAULT_CORS_ORIGIN.to_string()),
        };

        Config {
            host: lookup("HOST"),
            port,
            static_dir: Some(
                lookup("STATIC_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
            ),
            cors_origin,
            text_provider,
            image_provider,
            gemini: GeminiConfig::from_lookup(&lookup),
            openai: OpenAiConfig::from_lookup(&lookup),
            stability: StabilityConfig::from_lookup(&lookup),
            huggingface: HuggingFaceConfig::from_lookup(&lookup),
        }
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    pub fn without_static_dir(mut self) -> Self {
        self.static_dir = None;
        self
    }

    pub fn with_cors_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_origin = Some(origin.into());
        self
    }

    pub fn with_any_origin(mut self) -> Self {
        self.cors_origin = None;
        self
    }

    pub fn with_text_provider(mut self, kind: TextProviderKind) -> Self {
        self.text_provider = kind;
        self
    }

    pub fn with_image_provider(mut self, kind: ImageProviderKind) -> Self {
        self.image_provider = kind;
        self
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self.text_provider = TextProviderKind::Gemini;
        self
    }

    pub fn with_openai(mut self, config: OpenAiConfig) -> Self {
        self.openai = config;
        self.text_provider = TextProviderKind::OpenAi;
        self
    }

    pub fn with_stability(mut self, config: StabilityConfig) -> Self {
        self.stability = config;
        self.image_provider = ImageProviderKind::Stability;
        self
    }

    pub fn with_huggingface(mut self, config: HuggingFaceConfig) -> Self {
        self.huggingface = config;
        self.image_provider = ImageProviderKind::HuggingFace;
        self
    }

    pub fn text_api_key(&self) -> Option<&str> {
        match self.text_provider {
            TextProviderKind::Gemini => self.gemini.api_key.as_deref(),
            TextProviderKind::OpenAi => self.openai.api_key.as_deref(),
        }
    }

    pub fn image_api_key(&self) -> Option<&str> {
        match self.image_provider {
            ImageProviderKind::Stability => self.stability.api_key.as_deref(),
            ImageProviderKind::HuggingFace => self.huggingface.api_key.as_deref(),
        }
    }

    /// Human readable problems that do not prevent startup.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.text_api_key().is_none() {
            warnings.push(format!(
                "No API key configured for text provider '{}'",
                self.text_provider
            ));
        }
        if self.image_api_key().is_none() {
            warnings.push(format!(
                "No API key configured for image provider '{}'",
                self.image_provider
            ));
        }
        warnings
    }
}

/// Accepts `scheme://host[:port]` with an http(s) scheme and nothing after the authority.
fn parse_origin(value: &str) -> Option<String> {
    let value = value.trim().trim_end_matches('/');
    let url = reqwest::Url::parse(value).ok()?;
    let bare = matches!(url.scheme(), "http" | "https")
        && url.host_str().is_some()
        && url.username().is_empty()
        && url.password().is_none()
        && url.path() == "/"
        && url.query().is_none()
        && url.fragment().is_none();
    bare.then(|| value.to_string())
}
