//! Sign-in collaborator: anonymous and email/password accounts.

pub mod identity;
pub mod messages;
pub mod offline;
pub mod validate;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use identity::{IdentityConfig, IdentityToolkitProvider};
pub use messages::{AuthFailureKind, AuthMessage};
pub use offline::OfflineAuthProvider;
pub use validate::{validate_sign_in, validate_sign_up, CredentialError};

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
    pub anonymous: bool,
    pub id_token: String,
    pub signed_in_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn display_name(&self) -> &str {
        match &self.email {
            Some(email) if !self.anonymous => email,
            _ => "guest",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Error reported by the provider, with its error code.
    #[error("{code}: {message}")]
    Provider { code: String, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl AuthError {
    pub fn code(&self) -> Option<&str> {
        match self {
            AuthError::Provider { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AuthError::Malformed(e.to_string())
        } else {
            AuthError::Network(e.to_string())
        }
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in_anonymously(&self) -> Result<Session, AuthError>;
    async fn sign_in_with_email(&self, email: &str, password: &str) -> Result<Session, AuthError>;
    async fn sign_up_with_email(&self, email: &str, password: &str) -> Result<Session, AuthError>;
    async fn sign_out(&self, session: &Session) -> Result<(), AuthError>;
}
