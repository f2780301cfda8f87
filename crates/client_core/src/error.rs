//! Failure taxonomy for calls against the project service.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("invalid service base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("transport failure on {path}: {message}")]
    Transport { path: String, message: String },
    #[error("server answered {status} on {path}")]
    Status { path: String, status: u16 },
    #[error("malformed response body on {path}: {message}")]
    Decode { path: String, message: String },
}

impl ServiceError {
    pub fn from_reqwest(path: &str, err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::Status {
                path: path.to_string(),
                status: status.as_u16(),
            };
        }
        if err.is_decode() {
            return Self::Decode {
                path: path.to_string(),
                message: err.to_string(),
            };
        }
        Self::Transport {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::InvalidBaseUrl { url, .. } => url,
            Self::Transport { path, .. } | Self::Status { path, .. } | Self::Decode { path, .. } => {
                path
            }
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
