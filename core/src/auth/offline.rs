use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{AuthError, AuthProvider, Session};

/// Used when no identity service is configured. Only guest sessions are
/// available; email accounts fail with a provider code that maps to the
/// generic message.
#[derive(Debug, Default, Clone)]
pub struct OfflineAuthProvider;

const UNAVAILABLE: &str = "OPERATION_NOT_ALLOWED";

#[async_trait]
impl AuthProvider for OfflineAuthProvider {
    async fn sign_in_anonymously(&self) -> Result<Session, AuthError> {
        let user_id = Uuid::new_v4().to_string();
        tracing::info!(user_id = %user_id, "offline guest session");
        Ok(Session {
            user_id,
            email: None,
            anonymous: true,
            id_token: String::new(),
            signed_in_at: Utc::now(),
            expires_at: None,
        })
    }

    async fn sign_in_with_email(&self, _email: &str, _password: &str) -> Result<Session, AuthError> {
        Err(AuthError::Provider {
            code: UNAVAILABLE.to_string(),
            message: "email accounts need an identity service".to_string(),
        })
    }

    async fn sign_up_with_email(&self, _email: &str, _password: &str) -> Result<Session, AuthError> {
        Err(AuthError::Provider {
            code: UNAVAILABLE.to_string(),
            message: "email accounts need an identity service".to_string(),
        })
    }

    async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        tracing::info!(user_id = %session.user_id, "signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthFailureKind, AuthMessage};

    #[tokio::test]
    async fn test_guest_session() {
        let provider = OfflineAuthProvider;
        let session = provider.sign_in_anonymously().await.unwrap();
        assert!(session.anonymous);
        assert_eq!(session.display_name(), "guest");
        assert!(provider.sign_out(&session).await.is_ok());
    }

    #[tokio::test]
    async fn test_email_sign_in_is_generic_failure() {
        let err = OfflineAuthProvider
            .sign_in_with_email("ana@example.com", "secret")
            .await
            .unwrap_err();
        assert_eq!(AuthMessage::from_error(&err).kind, AuthFailureKind::Generic);
    }
}
