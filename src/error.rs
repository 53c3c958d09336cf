use serde_json::Value;
use thiserror::Error;

/// Failure reported by a provider adapter.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{provider} request failed: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },
    #[error("{provider} returned status {status}")]
    Status {
        provider: &'static str,
        status: u16,
        body: Value,
    },
}

impl UpstreamError {
    /// Drops the request URL first: query-string credentials must not reach logs or clients.
    pub fn transport(provider: &'static str, err: reqwest::Error) -> Self {
        UpstreamError::Transport {
            provider,
            message: err.without_url().to_string(),
        }
    }

    pub fn provider(&self) -> &'static str {
        match self {
            UpstreamError::Transport { provider, .. } | UpstreamError::Status { provider, .. } => {
                provider
            }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Transport { .. } => None,
            UpstreamError::Status { status, .. } => Some(*status),
        }
    }
}

#[derive(Debug, Error)]
pub enum GenError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid input parameters: {0}")]
    InvalidInput(String),
    #[error("Failed to reach {provider}")]
    UpstreamUnavailable {
        provider: &'static str,
        message: String,
    },
    #[error("Invalid API credentials for {provider}, check the configured API key")]
    InvalidCredentials {
        provider: &'static str,
        details: Value,
    },
    #[error("{provider} endpoint not found, check the configured model and base URL")]
    EndpointNotFound {
        provider: &'static str,
        details: Value,
    },
    #[error("{provider} rejected the request with status {status}")]
    UpstreamRejected {
        provider: &'static str,
        status: u16,
        details: Value,
    },
    #[error("Malformed article structure: {0}")]
    MalformedStructure(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Server error: {0}")]
    ServerError(String),
}

impl GenError {
    pub fn status_code(&self) -> u16 {
        match self {
            GenError::MissingField(_) | GenError::InvalidInput(_) => 400,
            GenError::InvalidCredentials { .. } => 401,
            GenError::EndpointNotFound { .. } => 404,
            GenError::UpstreamRejected { status, .. } => *status,
            GenError::UpstreamUnavailable { .. }
            | GenError::MalformedStructure(_)
            | GenError::ConfigError(_)
            | GenError::ServerError(_) => 500,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GenError::MissingField(_) => "MissingField",
            GenError::InvalidInput(_) => "InvalidInput",
            GenError::UpstreamUnavailable { .. } => "UpstreamUnavailable",
            GenError::InvalidCredentials { .. } => "InvalidCredentials",
            GenError::EndpointNotFound { .. } => "EndpointNotFound",
            GenError::UpstreamRejected { .. } => "UpstreamRejected",
            GenError::MalformedStructure(_) => "MalformedStructure",
            GenError::ConfigError(_) => "ConfigError",
            GenError::ServerError(_) => "ServerError",
        }
    }

    pub fn provider(&self) -> Option<&'static str> {
        match self {
            GenError::UpstreamUnavailable { provider, .. }
            | GenError::InvalidCredentials { provider, .. }
            | GenError::EndpointNotFound { provider, .. }
            | GenError::UpstreamRejected { provider, .. } => Some(provider),
            _ => None,
        }
    }

    /// Provider payload attached for diagnostics.
    pub fn details(&self) -> Option<&Value> {
        match self {
            GenError::InvalidCredentials { details, .. }
            | GenError::EndpointNotFound { details, .. }
            | GenError::UpstreamRejected { details, .. } => Some(details),
            _ => None,
        }
    }

    /// Extra context for the server log. Transport detail stays out of client responses.
    pub fn log_detail(&self) -> Option<String> {
        match self {
            GenError::UpstreamUnavailable { message, .. } => Some(message.clone()),
            _ => self.details().map(Value::to_string),
        }
    }
}

impl From<UpstreamError> for GenError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Transport { provider, message } => {
                GenError::UpstreamUnavailable { provider, message }
            }
            UpstreamError::Status {
                provider,
                status: 401,
                body,
            } => GenError::InvalidCredentials {
                provider,
                details: body,
            },
            UpstreamError::Status {
                provider,
                status: 404,
                body,
            } => GenError::EndpointNotFound {
                provider,
                details: body,
            },
            UpstreamError::Status {
                provider,
                status,
                body,
            } => GenError::UpstreamRejected {
                provider,
                status,
                details: body,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, GenError>;
