pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("Please enter a valid email.")]
    InvalidEmail,
    #[error("Password must be at least 6 characters.")]
    PasswordTooShort,
    #[error("Passwords do not match.")]
    PasswordMismatch,
}

pub fn validate_sign_in(email: &str, password: &str) -> Result<(), CredentialError> {
    if !looks_like_email(email) {
        return Err(CredentialError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CredentialError::PasswordTooShort);
    }
    Ok(())
}

pub fn validate_sign_up(email: &str, password: &str, confirm: &str) -> Result<(), CredentialError> {
    validate_sign_in(email, password)?;
    if password != confirm {
        return Err(CredentialError::PasswordMismatch);
    }
    Ok(())
}

/// `local@domain.tld` with no whitespace.
fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(looks_like_email("ana@example.com"));
        assert!(looks_like_email("a.b+c@mail.example.org"));
        assert!(!looks_like_email("ana"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("ana@example"));
        assert!(!looks_like_email("ana@.com"));
        assert!(!looks_like_email("ana @example.com"));
        assert!(!looks_like_email("a@b@c.com"));
    }

    #[test]
    fn test_sign_in_rules() {
        assert_eq!(validate_sign_in("ana@example.com", "secret"), Ok(()));
        assert_eq!(
            validate_sign_in("ana@example.com", "12345"),
            Err(CredentialError::PasswordTooShort)
        );
        assert_eq!(validate_sign_in("nope", "secret"), Err(CredentialError::InvalidEmail));
    }

    #[test]
    fn test_sign_up_requires_matching_confirmation() {
        assert_eq!(
            validate_sign_up("ana@example.com", "secret", "secrex"),
            Err(CredentialError::PasswordMismatch)
        );
        assert_eq!(validate_sign_up("ana@example.com", "secret", "secret"), Ok(()));
    }
}
