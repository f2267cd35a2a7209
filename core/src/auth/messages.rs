use super::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailureKind {
    InvalidCredentials,
    EmailInUse,
    WeakPassword,
    InvalidEmail,
    Generic,
}

/// User-facing title and description for a failed sign-in or sign-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthMessage {
    pub kind: AuthFailureKind,
    pub title: &'static str,
    pub description: &'static str,
}

impl AuthMessage {
    pub fn from_error(error: &AuthError) -> Self {
        Self::for_kind(error.code().map(classify_code).unwrap_or(AuthFailureKind::Generic))
    }

    pub fn for_kind(kind: AuthFailureKind) -> Self {
        let (title, description) = match kind {
            AuthFailureKind::InvalidCredentials => (
                "Invalid credentials",
                "The email or password is incorrect. Please check and try again.",
            ),
            AuthFailureKind::EmailInUse => (
                "Email already registered",
                "This email address is already in use. Please sign in or use a different email.",
            ),
            AuthFailureKind::WeakPassword => (
                "Weak password",
                "Your password is too weak. Please choose a password with at least 6 characters.",
            ),
            AuthFailureKind::InvalidEmail => (
                "Invalid email",
                "The email format provided is not valid.",
            ),
            AuthFailureKind::Generic => (
                "Authentication error",
                "An error occurred. Please try again.",
            ),
        };
        Self {
            kind,
            title,
            description,
        }
    }
}

/// Accepts both REST codes (`EMAIL_EXISTS`) and SDK codes
/// (`auth/email-already-in-use`).
pub fn classify_code(code: &str) -> AuthFailureKind {
    match code {
        "EMAIL_NOT_FOUND"
        | "INVALID_PASSWORD"
        | "INVALID_LOGIN_CREDENTIALS"
        | "auth/user-not-found"
        | "auth/wrong-password" => AuthFailureKind::InvalidCredentials,
        "EMAIL_EXISTS" | "auth/email-already-in-use" => AuthFailureKind::EmailInUse,
        "WEAK_PASSWORD" | "auth/weak-password" => AuthFailureKind::WeakPassword,
        "INVALID_EMAIL" | "auth/invalid-email" => AuthFailureKind::InvalidEmail,
        _ => AuthFailureKind::Generic,
    }
}
