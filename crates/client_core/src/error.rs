use shared::error::ValidationError;
use thiserror::Error;

/// Every failure the console can surface, tagged by where it happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("request failed: {message}")]
    Transport { message: String },
    #[error("{}", describe_status(*status, status_text, message.as_deref()))]
    Status {
        status: u16,
        status_text: String,
        message: Option<String>,
    },
    #[error("unexpected response body: {message}")]
    Decode { message: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("invalid API base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

fn describe_status(status: u16, status_text: &str, message: Option<&str>) -> String {
    match message {
        Some(message) => format!("{message} ({status} {status_text})"),
        None => format!("request failed: {status} {status_text}"),
    }
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// The backend's own `message`, when the error body carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode {
                message: err.to_string(),
            }
        } else {
            ClientError::Transport {
                message: err.to_string(),
            }
        }
    }
}
