use async_trait::async_trait;

use crate::model::schedule::ScheduleFailure;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("text generation is not configured: {0}")]
    NotConfigured(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("request failed: {0}")]
    Network(String),

    #[error("rate limited (HTTP 429): {body}")]
    RateLimited { body: String },

    #[error("server error (HTTP {status}): {body}")]
    Server { status: u16, body: String },

    #[error("client error (HTTP {status}): {body}")]
    Client { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl GenerationError {
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            429 => GenerationError::RateLimited { body },
            400..=499 => GenerationError::Client { status, body },
            _ => GenerationError::Server { status, body },
        }
    }

    pub fn failure(&self) -> ScheduleFailure {
        match self {
            GenerationError::NotConfigured(_) => ScheduleFailure::NotConfigured,
            GenerationError::Timeout(_) => ScheduleFailure::Timeout,
            GenerationError::Network(_) => ScheduleFailure::Network,
            GenerationError::RateLimited { .. } => ScheduleFailure::Service { status: 429 },
            GenerationError::Server { status, .. } | GenerationError::Client { status, .. } => {
                ScheduleFailure::Service { status: *status }
            }
            GenerationError::Malformed(_) => ScheduleFailure::Malformed,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenerationError::Timeout(e.to_string())
        } else if e.is_decode() {
            GenerationError::Malformed(e.to_string())
        } else {
            GenerationError::Network(e.to_string())
        }
    }
}

/// The external text-generation service.
#[async_trait]
pub trait ScheduleGenerator: Send + Sync {
    /// Returns the model's free-text reply to `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            GenerationError::from_status(429, String::new()),
            GenerationError::RateLimited { .. }
        ));
        assert!(matches!(
            GenerationError::from_status(401, String::new()),
            GenerationError::Client { status: 401, .. }
        ));
        assert!(matches!(
            GenerationError::from_status(503, String::new()),
            GenerationError::Server { status: 503, .. }
        ));
    }

    #[test]
    fn test_failure_tags() {
        assert_eq!(
            GenerationError::NotConfigured("no key".into()).failure(),
            ScheduleFailure::NotConfigured
        );
        assert_eq!(
            GenerationError::from_status(500, "boom".into()).failure(),
            ScheduleFailure::Service { status: 500 }
        );
    }
}
