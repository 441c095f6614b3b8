//! Session identity
//!
//! Email/password accounts live at an external identity provider; the role
//! of each account lives in a side profile store keyed by account id.

mod profile;
mod provider;
mod session;

pub use profile::ProfileStore;
pub use provider::{HttpIdentityProvider, IdentityProvider};
pub use session::SessionManager;

use serde::Deserialize;
use shared::Role;
use thiserror::Error;

/// Authenticated account as returned by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identity {
    #[serde(rename = "localId")]
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "idToken")]
    pub id_token: String,
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
}

/// Signed-in identity plus the role resolved at sign-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: Identity,
    pub role: Role,
}

/// Which user-facing flow produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    SignIn,
    Register,
    SignOut,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already in use")]
    EmailInUse,

    /// Any other provider error code
    #[error("Identity provider rejected the request: {0}")]
    Rejected(String),

    #[error("Malformed identity response: {0}")]
    MalformedResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl AuthError {
    /// Classify an identity provider error code such as
    /// `INVALID_PASSWORD` or `WEAK_PASSWORD : Password should be ...`
    pub fn from_code(message: &str) -> Self {
        let code = message
            .split([' ', ':'])
            .find(|part| !part.is_empty())
            .unwrap_or_default();
        match code {
            "EMAIL_EXISTS" => Self::EmailInUse,
            "EMAIL_NOT_FOUND"
            | "INVALID_PASSWORD"
            | "INVALID_LOGIN_CREDENTIALS"
            | "USER_DISABLED" => Self::InvalidCredentials,
            _ => Self::Rejected(message.to_string()),
        }
    }

    /// Generic message shown to the operator.
    ///
    /// Sign-in never reveals whether the account exists.
    pub fn user_message(&self, action: AuthAction) -> &'static str {
        match action {
            AuthAction::SignIn => "Email ou senha inválidos.",
            AuthAction::Register => match self {
                Self::EmailInUse => "Este email já está em uso.",
                _ => "Erro ao registrar. Tente novamente.",
            },
            AuthAction::SignOut => "Erro ao fazer logout.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_classified() {
        assert!(matches!(AuthError::from_code("EMAIL_EXISTS"), AuthError::EmailInUse));
        assert!(matches!(
            AuthError::from_code("INVALID_LOGIN_CREDENTIALS"),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            AuthError::from_code("USER_DISABLED"),
            AuthError::InvalidCredentials
        ));
        match AuthError::from_code("WEAK_PASSWORD : Password should be at least 6 characters") {
            AuthError::Rejected(message) => assert!(message.starts_with("WEAK_PASSWORD")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            AuthError::EmailInUse.user_message(AuthAction::SignIn),
            "Email ou senha inválidos."
        );
        assert_eq!(
            AuthError::EmailInUse.user_message(AuthAction::Register),
            "Este email já está em uso."
        );
        assert_eq!(
            AuthError::Rejected("WEAK_PASSWORD".into()).user_message(AuthAction::Register),
            "Erro ao registrar. Tente novamente."
        );
    }
}
