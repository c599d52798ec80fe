use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the marketplace, boundary or geocoding services
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned status {status}")]
    Status { endpoint: String, status: StatusCode },

    #[error("invalid response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("invalid data: {0}")]
    Validation(String),
}

impl ApiError {
    pub fn transport(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        ApiError::Transport {
            endpoint: endpoint.into(),
            source,
        }
    }

    pub fn decode(endpoint: impl Into<String>, message: impl std::fmt::Display) -> Self {
        ApiError::Decode {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    /// True for errors worth retrying with the same request.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport { .. } => true,
            ApiError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            ApiError::Decode { .. } | ApiError::Validation(_) => false,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
