//! Identity Toolkit REST client (the account API behind Firebase Auth).

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{AuthError, AuthProvider, Session};

pub const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    id_token: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct IdentityToolkitProvider {
    client: Client,
    config: IdentityConfig,
}

impl IdentityToolkitProvider {
    pub fn new(config: IdentityConfig) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthError::Network(format!("http client: {e}")))?;
        Ok(Self { client, config })
    }

    fn url(&self, method: &str) -> String {
        format!(
            "{}/accounts:{}",
            self.config.base_url.trim_end_matches('/'),
            method
        )
    }

    async fn call(
        &self,
        method: &str,
        request: &AccountRequest<'_>,
        anonymous: bool,
    ) -> Result<Session, AuthError> {
        let response = self
            .client
            .post(self.url(method))
            .query(&[("key", self.config.api_key.as_str())])
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(parse_error(&body, status.as_u16()));
        }

        let account: AccountResponse =
            serde_json::from_str(&body).map_err(|e| AuthError::Malformed(e.to_string()))?;
        let signed_in_at = Utc::now();
        let expires_at = account
            .expires_in
            .as_deref()
            .and_then(|s| s.parse::<i64>().ok())
            .map(|secs| signed_in_at + chrono::Duration::seconds(secs));

        Ok(Session {
            user_id: account.local_id,
            email: account.email.filter(|e| !e.is_empty()),
            anonymous,
            id_token: account.id_token,
            signed_in_at,
            expires_at,
        })
    }
}

/// Messages look like `WEAK_PASSWORD : Password should be at least 6
/// characters`; the part before ` : ` is the code.
fn parse_error(body: &str, status: u16) -> AuthError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let raw = envelope.error.message;
            let (code, message) = match raw.split_once(" : ") {
                Some((code, detail)) => (code.trim().to_string(), detail.trim().to_string()),
                None => (raw.trim().to_string(), String::new()),
            };
            AuthError::Provider { code, message }
        }
        Err(_) => AuthError::Malformed(format!("HTTP {status}: {body}")),
    }
}

#[async_trait]
impl AuthProvider for IdentityToolkitProvider {
    async fn sign_in_anonymously(&self) -> Result<Session, AuthError> {
        let request = AccountRequest {
            email: None,
            password: None,
            return_secure_token: true,
        };
        let session = self.call("signUp", &request, true).await?;
        tracing::info!(user_id = %session.user_id, "signed in anonymously");
        Ok(session)
    }

    async fn sign_in_with_email(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let request = AccountRequest {
            email: Some(email),
            password: Some(password),
            return_secure_token: true,
        };
        let session = self.call("signInWithPassword", &request, false).await?;
        tracing::info!(user_id = %session.user_id, "signed in with email");
        Ok(session)
    }

    async fn sign_up_with_email(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let request = AccountRequest {
            email: Some(email),
            password: Some(password),
            return_secure_token: true,
        };
        let session = self.call("signUp", &request, false).await?;
        tracing::info!(user_id = %session.user_id, "account created");
        Ok(session)
    }

    async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        // ID tokens are stateless; dropping the session is the sign-out.
        tracing::info!(user_id = %session.user_id, "signed out");
        Ok(())
    }
}
